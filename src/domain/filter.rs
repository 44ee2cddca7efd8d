// Filter control domain model
use serde::{Deserialize, Serialize};

use super::event_key::StructuralKey;

/// More distinct categories than this and no filter control is offered
pub const MAX_FILTER_CHOICES: usize = 300;

/// A filter control derived from a column. Never persisted; only its
/// current value lives in the card settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Settings field the current value is written back to
    pub key: StructuralKey,
    pub column: String,
    pub control: FilterControl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterControl {
    #[serde(rename_all = "camelCase")]
    Categorical {
        choices: Vec<String>,
        selected: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Numeric {
        min: f64,
        max: f64,
        min_span: f64,
        value: [f64; 2],
        /// Set when the column holds a single value and the slider
        /// cannot be dragged
        disabled: bool,
    },
}

/// What the filter generator hands back: a control, or a read-only notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum FilterOutcome {
    Control(FilterSpec),
    Notice { text: String },
}

impl FilterOutcome {
    pub fn too_many_values() -> Self {
        FilterOutcome::Notice {
            text: "Too many unique values to show filter".to_string(),
        }
    }

    pub fn no_values() -> Self {
        FilterOutcome::Notice {
            text: "No values to filter".to_string(),
        }
    }

    pub fn spec(&self) -> Option<&FilterSpec> {
        match self {
            FilterOutcome::Control(spec) => Some(spec),
            FilterOutcome::Notice { .. } => None,
        }
    }
}

/// Settings field holding the filter of `field`
pub fn filter_field(field: &str) -> String {
    format!("{field}-filter")
}
