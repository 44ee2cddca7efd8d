// Domain layer - Card framework data model
pub mod card;
pub mod dataset;
pub mod event_key;
pub mod filter;
pub mod layout;
pub mod settings;
pub mod theme;
pub mod view;
