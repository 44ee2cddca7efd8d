//! Error types for the card framework.

use thiserror::Error;

/// Errors raised by the registry, the card manager, the event router and
/// card renderers.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A card type was looked up that was never registered
    #[error("unknown card type: {0}")]
    UnknownType(String),

    /// A card type name was registered twice
    #[error("card type already registered: {0}")]
    DuplicateType(String),

    /// The addressed card no longer exists
    #[error("unknown card: {0}")]
    UnknownCard(String),

    /// An element identity could not be decoded into a structural key
    #[error("invalid event key {key:?}: {reason}")]
    InvalidEventKey { key: String, reason: String },

    /// A well-formed key that no handler accepts
    #[error("no route for event key {0}")]
    UnroutableEvent(String),

    /// A column referenced by settings is not in the dataset
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A render failed for a reason other than a missing column
    #[error("render failed: {0}")]
    Render(String),

    /// Layout store failures
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    /// Errors that are expected during normal operation and must not be
    /// surfaced to the user (an edit racing with the removal of its card).
    pub fn is_stale(&self) -> bool {
        matches!(self, DashboardError::UnknownCard(_))
    }
}

/// Result type alias for card framework operations
pub type Result<T> = std::result::Result<T, DashboardError>;
