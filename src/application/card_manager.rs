// Card manager - live card instances, their settings and placement
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;

use crate::application::registry::CardRegistry;
use crate::domain::card::{Card, CardId, GridPlacement};
use crate::domain::layout::{LayoutDocument, LayoutEntry};
use crate::domain::settings::{SettingValue, Settings};
use crate::error::{DashboardError, Result};

pub struct CardManager {
    registry: Arc<CardRegistry>,
    cards: IndexMap<CardId, Card>,
    dirty: bool,
}

impl CardManager {
    pub fn new(registry: Arc<CardRegistry>) -> Self {
        Self {
            registry,
            cards: IndexMap::new(),
            dirty: false,
        }
    }

    pub fn registry(&self) -> &Arc<CardRegistry> {
        &self.registry
    }

    pub fn create_card(&mut self, type_name: &str, initial_settings: Settings) -> Result<&Card> {
        let descriptor = self.registry.resolve(type_name)?;
        let id = CardId::generate();
        let placement = GridPlacement::at(0, self.next_free_row(), descriptor.grid);

        tracing::info!("Created {} card {}", type_name, id);
        let card = Card::new(id.clone(), type_name.to_string(), initial_settings, placement);
        self.dirty = true;
        Ok(self.cards.entry(id).or_insert(card))
    }

    /// Removing an absent card is a no-op
    pub fn remove_card(&mut self, id: &CardId) -> bool {
        let removed = self.cards.shift_remove(id).is_some();
        if removed {
            tracing::info!("Removed card {}", id);
            self.dirty = true;
        }
        removed
    }

    /// Merge one field into a card's settings. Returns the new revision.
    pub fn update_settings(&mut self, id: &CardId, field: &str, value: SettingValue) -> Result<u64> {
        let card = self.card_mut(id)?;
        card.settings.set(field, value);
        card.revision += 1;
        let revision = card.revision;
        self.dirty = true;
        Ok(revision)
    }

    /// Drop a field so reads fall back to their default
    pub fn clear_setting(&mut self, id: &CardId, field: &str) -> Result<u64> {
        let card = self.card_mut(id)?;
        if card.settings.remove(field).is_none() {
            return Ok(card.revision);
        }
        card.revision += 1;
        let revision = card.revision;
        self.dirty = true;
        Ok(revision)
    }

    pub fn update_placement(&mut self, id: &CardId, placement: GridPlacement) -> Result<GridPlacement> {
        let grid = {
            let card = self.get_card(id)?;
            self.registry.resolve(&card.type_name)?.grid
        };
        let card = self.card_mut(id)?;
        card.placement = GridPlacement {
            min_w: grid.min_w,
            min_h: grid.min_h,
            ..placement
        }
        .clamped();
        let placement = card.placement;
        self.dirty = true;
        Ok(placement)
    }

    pub fn get_card(&self, id: &CardId) -> Result<&Card> {
        self.cards
            .get(id)
            .ok_or_else(|| DashboardError::UnknownCard(id.to_string()))
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    pub fn list_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Rebuild the live set from a saved layout. Entries whose type is no
    /// longer registered are skipped.
    pub fn restore(&mut self, layout: LayoutDocument) -> usize {
        self.cards.clear();
        for (id, entry) in layout.cards {
            if !self.registry.contains(&entry.type_name) {
                tracing::warn!("Skipping card {} of unregistered type {}", id, entry.type_name);
                continue;
            }
            let card = Card::new(id.clone(), entry.type_name, entry.settings, entry.placement);
            self.cards.insert(id, card);
        }
        self.dirty = false;
        self.cards.len()
    }

    pub fn snapshot(&self) -> LayoutDocument {
        LayoutDocument {
            saved_at: Some(Utc::now()),
            cards: self
                .cards
                .iter()
                .map(|(id, card)| {
                    let entry = LayoutEntry {
                        type_name: card.type_name.clone(),
                        settings: card.settings.clone(),
                        placement: card.placement,
                    };
                    (id.clone(), entry)
                })
                .collect(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether anything changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Flag the layout for saving again, e.g. after a failed save
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn card_mut(&mut self, id: &CardId) -> Result<&mut Card> {
        self.cards
            .get_mut(id)
            .ok_or_else(|| DashboardError::UnknownCard(id.to_string()))
    }

    fn next_free_row(&self) -> u32 {
        self.cards
            .values()
            .map(|c| c.placement.bottom())
            .max()
            .unwrap_or(0)
    }
}
