//! # card-canvas: a dashboard of configurable cards
//!
//! Cards are instances of registered card types. Each type renders a chart
//! or a summary statistic over an immutable dataset and exposes a settings
//! editor. Edits arrive as input events addressed by structural keys; theme
//! changes patch already rendered charts instead of re-rendering them.
//!
//! ## Architecture
//!
//! - **Domain**: cards, settings, structural keys, views, layout documents
//! - **Application**: registry, card manager, filter generator, event router,
//!   patch engine and the [`DashboardService`] facade tying them together
//! - **Cards**: the built-in racing, histogram, heatmap, violin and highlight
//!   card types
//! - **Infrastructure**: JSON dataset tables, layout stores, configuration
//! - **Presentation**: the axum HTTP surface
//!
//! ## Example
//!
//! ```ignore
//! let mut registry = CardRegistry::new();
//! card_canvas::cards::register_builtin(&mut registry)?;
//!
//! let datasets = Datasets::new(Arc::new(main), Arc::new(positions));
//! let service = DashboardService::new(
//!     Arc::new(registry),
//!     datasets,
//!     CardDefaults::default(),
//!     Arc::new(MemoryLayoutStore::new()),
//! );
//!
//! let (card, view) = service.create_card("histogram", Settings::new())?;
//! let patches = service.set_theme(Theme::Dark);
//! ```

pub mod application;
pub mod cards;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

pub use application::dashboard_service::DashboardService;
pub use application::registry::CardRegistry;
pub use error::{DashboardError, Result};
