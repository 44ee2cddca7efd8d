//! Settings event routing.
//!
//! Every input event coming out of a settings editor lands here. The event
//! carries the encoded identity of the control that fired it; the router
//! decodes it into a [`StructuralKey`], looks up the handler for the key's
//! kind, and applies the new value to the addressed card. When the edited
//! field governs a dependent region (a filter container, a choice list), the
//! region is rebuilt for the new value and its stale selection is cleared.
//!
//! Routing never fails outward. Anything that cannot be applied is logged
//! and dropped; usually that is an edit for a card removed in the meantime.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::card_manager::CardManager;
use crate::application::card_type::DependentRegion;
use crate::application::dataset_provider::{DatasetProvider, Datasets};
use crate::application::filter_generator::FilterGenerator;
use crate::application::registry::CardRegistry;
use crate::domain::card::CardId;
use crate::domain::event_key::{KeyKind, StructuralKey};
use crate::domain::filter::filter_field;
use crate::domain::settings::SettingValue;
use crate::domain::view::Control;
use crate::error::{DashboardError, Result};

/// One input event from a settings editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Encoded structural key of the control that fired
    pub id: String,
    pub value: SettingValue,
}

impl InputEvent {
    pub fn new(key: &StructuralKey, value: impl Into<SettingValue>) -> Self {
        Self {
            id: key.encode(),
            value: value.into(),
        }
    }
}

/// Targeted replacement of one part of an already rendered editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RegionUpdate {
    /// Replace the children of a filter container
    ReplaceContainer {
        id: StructuralKey,
        children: Vec<Control>,
    },
    /// Replace the options of a select and clear its value
    ReplaceOptions {
        id: StructuralKey,
        options: Vec<String>,
    },
}

impl RegionUpdate {
    pub fn id(&self) -> &StructuralKey {
        match self {
            RegionUpdate::ReplaceContainer { id, .. } | RegionUpdate::ReplaceOptions { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutcome {
    pub card_id: CardId,
    /// Settings revision after the event was applied
    pub revision: u64,
    pub regions: Vec<RegionUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Routed {
    Applied(RouteOutcome),
    Dropped { id: String, reason: String },
}

type Handler = fn(&EventRouter, &mut CardManager, &StructuralKey, SettingValue) -> Result<RouteOutcome>;

pub struct EventRouter {
    handlers: HashMap<KeyKind, Handler>,
    /// (card type, governing field) -> regions to rebuild
    dependents: HashMap<(String, String), Vec<DependentRegion>>,
    /// (card type, container field) -> filter region
    containers: HashMap<(String, String), DependentRegion>,
    filters: FilterGenerator,
    dataset: Arc<dyn DatasetProvider>,
}

impl EventRouter {
    pub fn new(registry: &CardRegistry, datasets: &Datasets, filters: FilterGenerator) -> Self {
        let mut handlers: HashMap<KeyKind, Handler> = HashMap::new();
        handlers.insert(KeyKind::SettingsField, Self::handle_settings_field);
        handlers.insert(KeyKind::FilterContainer, Self::handle_filter_container);

        let mut dependents: HashMap<(String, String), Vec<DependentRegion>> = HashMap::new();
        let mut containers = HashMap::new();
        for descriptor in registry.iter() {
            for region in descriptor.renderer.dependents() {
                dependents
                    .entry((descriptor.name.clone(), region.governing().to_string()))
                    .or_default()
                    .push(*region);
                if let DependentRegion::Filter { .. } = region {
                    containers.insert((descriptor.name.clone(), region.dependent_field()), *region);
                }
            }
        }

        Self {
            handlers,
            dependents,
            containers,
            filters,
            dataset: datasets.main.clone(),
        }
    }

    /// Route one event. Never fails: anything that cannot be applied is
    /// logged and reported as dropped.
    pub fn route(&self, manager: &mut CardManager, event: InputEvent) -> Routed {
        let key = match StructuralKey::decode(&event.id) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Dropping event: {}", e);
                return Routed::Dropped {
                    id: event.id,
                    reason: e.to_string(),
                };
            }
        };

        let result = match self.handlers.get(&key.kind) {
            Some(handler) => handler(self, manager, &key, event.value),
            None => Err(DashboardError::UnroutableEvent(event.id.clone())),
        };

        match result {
            Ok(outcome) => Routed::Applied(outcome),
            Err(e) => {
                if e.is_stale() {
                    tracing::debug!("Dropping stale event {}: card was removed", event.id);
                } else {
                    tracing::warn!("Dropping event {}: {}", event.id, e);
                }
                Routed::Dropped {
                    id: event.id,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn handle_settings_field(
        &self,
        manager: &mut CardManager,
        key: &StructuralKey,
        value: SettingValue,
    ) -> Result<RouteOutcome> {
        let field = key.field();
        let (type_name, changed) = {
            let card = manager.get_card(&key.card_id)?;
            let previous = card.settings.get(field);
            let changed = match previous {
                Some(previous) => *previous != value,
                None => !value.is_null(),
            };
            (card.type_name.clone(), changed)
        };

        let mut revision = manager.update_settings(&key.card_id, field, value.clone())?;
        tracing::debug!("Card {} field {} updated (revision {})", key.card_id, field, revision);

        let mut regions = Vec::new();
        if changed {
            if let Some(dependents) = self.dependents.get(&(type_name, field.to_string())) {
                for region in dependents {
                    let (update, rev) = self.refresh(manager, &key.card_id, region, &value)?;
                    regions.push(update);
                    revision = rev;
                }
            }
        }

        Ok(RouteOutcome {
            card_id: key.card_id.clone(),
            revision,
            regions,
        })
    }

    fn handle_filter_container(
        &self,
        manager: &mut CardManager,
        key: &StructuralKey,
        value: SettingValue,
    ) -> Result<RouteOutcome> {
        let type_name = manager.get_card(&key.card_id)?.type_name.clone();
        let region = self
            .containers
            .get(&(type_name, key.field().to_string()))
            .ok_or_else(|| DashboardError::UnroutableEvent(key.encode()))?;

        let (update, revision) = self.refresh(manager, &key.card_id, region, &value)?;
        Ok(RouteOutcome {
            card_id: key.card_id.clone(),
            revision,
            regions: vec![update],
        })
    }

    /// Rebuild a dependent region for a new governing value. The previous
    /// selection belonged to another column and is discarded.
    fn refresh(
        &self,
        manager: &mut CardManager,
        card_id: &CardId,
        region: &DependentRegion,
        governing_value: &SettingValue,
    ) -> Result<(RegionUpdate, u64)> {
        let dependent_field = region.dependent_field();
        let revision = manager.clear_setting(card_id, &dependent_field)?;
        let column = governing_value.as_str();

        let update = match region {
            DependentRegion::Filter { governing } => {
                let children = match column {
                    Some(column) => {
                        let outcome = self.filters.for_column(
                            column,
                            StructuralKey::settings_field(card_id, filter_field(governing)),
                            None,
                        );
                        Control::filter_children(&outcome)
                    }
                    None => vec![Control::Notice {
                        text: "Select a column to filter".to_string(),
                    }],
                };
                RegionUpdate::ReplaceContainer {
                    id: StructuralKey::filter_container(card_id, dependent_field),
                    children,
                }
            }
            DependentRegion::Choices { field, .. } => {
                let options = column
                    .and_then(|c| self.dataset.unique_values(c))
                    .unwrap_or_default()
                    .iter()
                    .map(|v| v.label())
                    .collect();
                RegionUpdate::ReplaceOptions {
                    id: StructuralKey::settings_field(card_id, *field),
                    options,
                }
            }
        };

        tracing::debug!("Refreshed {} of card {}", update.id(), card_id);
        Ok((update, revision))
    }
}
