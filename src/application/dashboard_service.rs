// Dashboard service - Use cases over the live card set
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::application::card_manager::CardManager;
use crate::application::card_type::{CardDefaults, CardTypeDescriptor, CardTypeInfo, RenderContext};
use crate::application::dataset_provider::Datasets;
use crate::application::event_router::{EventRouter, InputEvent, Routed};
use crate::application::filter_generator::FilterGenerator;
use crate::application::layout_store::LayoutStore;
use crate::application::patch_engine::{FigureMutation, Patch, PatchEngine};
use crate::application::registry::CardRegistry;
use crate::domain::card::{Card, CardId, GridPlacement};
use crate::domain::event_key::StructuralKey;
use crate::domain::settings::Settings;
use crate::domain::theme::Theme;
use crate::domain::view::{CardView, EditorView};
use crate::error::Result;

/// Last output rendered for a card, tagged with the settings revision it
/// was rendered from
struct Retained {
    revision: u64,
    view: CardView,
}

/// Result of dispatching one input event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispatched {
    pub routed: Routed,
    /// Fresh view of the edited card, absent when the event was dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<CardView>,
}

pub struct DashboardService {
    registry: Arc<CardRegistry>,
    manager: RwLock<CardManager>,
    router: EventRouter,
    patch_engine: PatchEngine,
    datasets: Datasets,
    filters: FilterGenerator,
    defaults: CardDefaults,
    theme: RwLock<Theme>,
    retained: Mutex<IndexMap<CardId, Retained>>,
    store: Arc<dyn LayoutStore>,
    /// Held from snapshot until the save completes, so saves land in order
    save_lock: tokio::sync::Mutex<()>,
}

impl DashboardService {
    pub fn new(
        registry: Arc<CardRegistry>,
        datasets: Datasets,
        defaults: CardDefaults,
        store: Arc<dyn LayoutStore>,
    ) -> Self {
        let filters = FilterGenerator::new(datasets.main.clone());
        let router = EventRouter::new(&registry, &datasets, filters.clone());
        Self {
            manager: RwLock::new(CardManager::new(registry.clone())),
            registry,
            router,
            patch_engine: PatchEngine::new(),
            datasets,
            filters,
            defaults,
            theme: RwLock::new(Theme::default()),
            retained: Mutex::new(IndexMap::new()),
            store,
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Restore cards from the layout store. Returns how many were restored.
    pub async fn load_layout(&self) -> Result<usize> {
        let Some(layout) = self.store.load().await? else {
            tracing::info!("No saved layout, starting with an empty dashboard");
            return Ok(0);
        };
        let restored = self.manager.write().restore(layout);
        self.retained.lock().clear();
        tracing::info!("Restored {} cards from saved layout", restored);
        Ok(restored)
    }

    /// Write the layout through to the store if anything changed since the
    /// last save
    pub async fn persist_if_dirty(&self) -> Result<bool> {
        let _saving = self.save_lock.lock().await;
        let snapshot = {
            let mut manager = self.manager.write();
            if !manager.take_dirty() {
                return Ok(false);
            }
            manager.snapshot()
        };

        if let Err(e) = self.store.save(&snapshot).await {
            self.manager.write().mark_dirty();
            return Err(e);
        }
        tracing::debug!("Saved layout with {} cards", snapshot.cards.len());
        Ok(true)
    }

    pub fn list_types(&self) -> Vec<CardTypeInfo> {
        self.registry.list_types()
    }

    pub fn cards(&self) -> Vec<Card> {
        self.manager.read().list_cards().cloned().collect()
    }

    pub fn card(&self, id: &CardId) -> Result<Card> {
        self.manager.read().get_card(id).cloned()
    }

    pub fn theme(&self) -> Theme {
        *self.theme.read()
    }

    pub fn create_card(&self, type_name: &str, settings: Settings) -> Result<(Card, CardView)> {
        let card = self.manager.write().create_card(type_name, settings)?.clone();
        let view = self.render_card(&card.id)?;
        Ok((card, view))
    }

    pub fn remove_card(&self, id: &CardId) -> bool {
        let removed = self.manager.write().remove_card(id);
        self.retained.lock().shift_remove(id);
        removed
    }

    pub fn update_placement(&self, id: &CardId, placement: GridPlacement) -> Result<GridPlacement> {
        self.manager.write().update_placement(id, placement)
    }

    /// Render one card from its current settings. A failing render yields an
    /// error placeholder, not an error.
    pub fn render_card(&self, id: &CardId) -> Result<CardView> {
        let (card, descriptor) = self.snapshot_card(id)?;
        let theme = self.theme();
        let ctx = self.context(&card.id, theme);

        let view = match descriptor.renderer.render(&ctx, &card.settings) {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!("Render of {} card {} failed: {}", card.type_name, card.id, e);
                CardView::placeholder(&card.id, e.to_string())
            }
        };

        Ok(self.retain(&card.id, card.revision, theme, view))
    }

    /// Render every card. One card failing never prevents the others from
    /// rendering.
    pub fn render_grid(&self) -> Vec<CardView> {
        let ids: Vec<CardId> = self.manager.read().list_cards().map(|c| c.id.clone()).collect();
        ids.iter()
            .filter_map(|id| match self.render_card(id) {
                Ok(view) => Some(view),
                Err(e) if e.is_stale() => None,
                Err(e) => Some(CardView::placeholder(id, e.to_string())),
            })
            .collect()
    }

    pub fn render_settings(&self, id: &CardId) -> Result<EditorView> {
        let (card, descriptor) = self.snapshot_card(id)?;
        let ctx = self.context(&card.id, self.theme());
        descriptor.renderer.render_settings(&ctx, &card.settings)
    }

    /// Route an input event and re-render the card it edited
    pub fn dispatch(&self, event: InputEvent) -> Dispatched {
        let routed = {
            let mut manager = self.manager.write();
            self.router.route(&mut manager, event)
        };

        let view = match &routed {
            Routed::Applied(outcome) => match self.render_card(&outcome.card_id) {
                Ok(view) => Some(view),
                Err(e) => {
                    tracing::debug!("Card {} gone before re-render: {}", outcome.card_id, e);
                    None
                }
            },
            Routed::Dropped { .. } => None,
        };

        Dispatched { routed, view }
    }

    /// Switch the global theme and patch every retained chart in place.
    /// Returns the patches so callers can apply them to their own copies.
    pub fn set_theme(&self, theme: Theme) -> Vec<Patch> {
        let mut retained = self.retained.lock();
        *self.theme.write() = theme;

        let keys: Vec<StructuralKey> = retained
            .values()
            .filter_map(|r| r.view.figure().map(|f| f.key.clone()))
            .collect();
        let patches = self.patch_engine.compute_patches(theme, &keys);

        for patch in &patches {
            if let Some(figure) = retained
                .get_mut(&patch.target.card_id)
                .and_then(|r| r.view.figure_mut())
            {
                patch.apply(figure);
            }
        }

        tracing::info!("Theme set to {:?}, patched {} charts", theme, patches.len());
        patches
    }

    /// Chart keys of every retained chart, in render order
    pub fn live_chart_keys(&self) -> Vec<StructuralKey> {
        self.retained
            .lock()
            .values()
            .filter_map(|r| r.view.figure().map(|f| f.key.clone()))
            .collect()
    }

    pub fn retained_view(&self, id: &CardId) -> Option<CardView> {
        self.retained.lock().get(id).map(|r| r.view.clone())
    }

    fn snapshot_card(&self, id: &CardId) -> Result<(Card, CardTypeDescriptor)> {
        let manager = self.manager.read();
        let card = manager.get_card(id)?.clone();
        let descriptor = self.registry.resolve(&card.type_name)?.clone();
        Ok((card, descriptor))
    }

    fn context<'a>(&'a self, card_id: &'a CardId, theme: Theme) -> RenderContext<'a> {
        RenderContext {
            card_id,
            datasets: &self.datasets,
            filters: &self.filters,
            theme,
            defaults: &self.defaults,
        }
    }

    /// Keep `view` as the card's current output unless a render from newer
    /// settings got there first. Returns whichever view is current.
    fn retain(&self, id: &CardId, revision: u64, rendered_with: Theme, mut view: CardView) -> CardView {
        let mut retained = self.retained.lock();

        if !self.manager.read().contains(id) {
            return view;
        }
        if let Some(existing) = retained.get(id) {
            if existing.revision > revision {
                tracing::debug!("Discarding stale render of card {} (revision {})", id, revision);
                return existing.view.clone();
            }
        }

        // theme switched while this render was in flight
        let current = *self.theme.read();
        if current != rendered_with {
            if let Some(figure) = view.figure_mut() {
                FigureMutation::SetTemplate {
                    template: current.template(),
                }
                .apply(figure);
            }
        }

        retained.insert(
            id.clone(),
            Retained {
                revision,
                view: view.clone(),
            },
        );
        view
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;
    use crate::cards::{fixtures, register_builtin};
    use crate::domain::layout::LayoutDocument;
    use crate::error::DashboardError;
    use crate::infrastructure::layout_file::MemoryLayoutStore;

    fn service_with(store: Arc<dyn LayoutStore>) -> DashboardService {
        let mut registry = CardRegistry::new();
        register_builtin(&mut registry).unwrap();
        DashboardService::new(Arc::new(registry), fixtures::datasets(), CardDefaults::default(), store)
    }

    fn service() -> DashboardService {
        service_with(Arc::new(MemoryLayoutStore::new()))
    }

    /// Records every save; the first one stalls after it has started
    #[derive(Default)]
    struct SlowFirstSaveStore {
        started: Notify,
        stalled: AtomicBool,
        saves: Mutex<Vec<LayoutDocument>>,
    }

    #[async_trait::async_trait]
    impl LayoutStore for SlowFirstSaveStore {
        async fn load(&self) -> Result<Option<LayoutDocument>> {
            Ok(None)
        }

        async fn save(&self, layout: &LayoutDocument) -> Result<()> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                self.started.notify_one();
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.saves.lock().push(layout.clone());
            Ok(())
        }
    }

    #[test]
    fn test_stale_render_never_replaces_newer_output() {
        let service = service();
        let (card, _) = service.create_card("histogram", Settings::new()).unwrap();
        service.dispatch(InputEvent::new(&StructuralKey::settings_field(&card.id, "title"), "Newer"));

        // a render that started from revision 0 finishes late
        let late = CardView::placeholder(&card.id, "late");
        let current = service.retain(&card.id, 0, Theme::Light, late);
        assert_eq!(current.title, "Newer");
        assert_eq!(service.retained_view(&card.id).unwrap().title, "Newer");
    }

    #[test]
    fn test_render_for_removed_card_is_not_retained() {
        let service = service();
        let (card, view) = service.create_card("violin", Settings::new()).unwrap();
        service.remove_card(&card.id);

        service.retain(&card.id, 1, Theme::Light, view);
        assert!(service.retained_view(&card.id).is_none());
        assert!(service.live_chart_keys().is_empty());
    }

    #[test]
    fn test_theme_switch_during_render_is_applied() {
        let service = service();
        let (card, view) = service.create_card("violin", Settings::new()).unwrap();
        service.set_theme(Theme::Dark);

        // rendered with the light template before the switch landed
        let retained = service.retain(&card.id, 1, Theme::Light, view);
        assert_eq!(retained.figure().unwrap().layout.template, Theme::Dark.template());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_layout_dirty() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl LayoutStore for FailingStore {
            async fn load(&self) -> Result<Option<LayoutDocument>> {
                Ok(None)
            }

            async fn save(&self, _: &LayoutDocument) -> Result<()> {
                Err(DashboardError::Persistence("disk full".into()))
            }
        }

        let service = service_with(Arc::new(FailingStore));
        service.create_card("highlight", Settings::new()).unwrap();

        assert!(service.persist_if_dirty().await.is_err());
        assert!(service.manager.read().is_dirty());
    }

    #[tokio::test]
    async fn test_concurrent_saves_land_in_order() {
        let store = Arc::new(SlowFirstSaveStore::default());
        let service = Arc::new(service_with(store.clone()));
        service.create_card("histogram", Settings::new()).unwrap();

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.persist_if_dirty().await }
        });
        store.started.notified().await;

        // edited while the first save is still being written
        service.create_card("violin", Settings::new()).unwrap();
        assert!(service.persist_if_dirty().await.unwrap());
        assert!(first.await.unwrap().unwrap());

        let saves = store.saves.lock();
        let sizes: Vec<_> = saves.iter().map(|l| l.cards.len()).collect();
        assert_eq!(sizes, [1, 2]);
    }
}
