// Application layer - Card framework use cases
pub mod card_manager;
pub mod card_type;
pub mod dashboard_service;
pub mod dataset_provider;
pub mod event_router;
pub mod filter_generator;
pub mod layout_store;
pub mod patch_engine;
pub mod registry;
