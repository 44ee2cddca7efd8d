//! Filter generation.
//!
//! A filter is derived from a column: a checkbox list of its distinct values
//! for categorical columns, a two-ended range over `[min, max]` for numeric
//! ones. The generated default is always "unfiltered" unless the caller
//! passes the card's current selection.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::application::dataset_provider::DatasetProvider;
use crate::domain::dataset::{Column, ColumnKind, Value};
use crate::domain::event_key::StructuralKey;
use crate::domain::filter::{FilterControl, FilterOutcome, FilterSpec, MAX_FILTER_CHOICES};
use crate::domain::settings::SettingValue;

/// Build the filter for `column`. `key` names the settings field the
/// selection is written to.
pub fn generate_filter(
    column: &Column,
    key: StructuralKey,
    default_value: Option<&SettingValue>,
) -> FilterOutcome {
    let present: Vec<&Value> = column.values.iter().filter(|v| !v.is_missing()).collect();
    if present.is_empty() {
        return FilterOutcome::no_values();
    }

    let control = match column.kind {
        ColumnKind::Categorical => {
            let mut sorted: Vec<&Value> = present;
            sorted.sort_by(|a, b| a.total_cmp(b));
            // values of different types can share a label
            let distinct: IndexSet<String> = sorted.iter().map(|v| v.label()).collect();
            if distinct.len() > MAX_FILTER_CHOICES {
                return FilterOutcome::too_many_values();
            }

            let choices: Vec<String> = distinct.into_iter().collect();
            let selected = match default_value.and_then(SettingValue::as_labels) {
                Some(labels) if !labels.is_empty() => labels.to_vec(),
                _ => choices.clone(),
            };
            FilterControl::Categorical { choices, selected }
        }
        ColumnKind::Numeric => {
            let (min, max) = present
                .iter()
                .filter_map(|v| v.as_f64())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| (lo.min(n), hi.max(n)));
            if !min.is_finite() || !max.is_finite() {
                return FilterOutcome::no_values();
            }

            let value = match default_value.and_then(SettingValue::as_range) {
                Some((lo, hi)) => [lo, hi],
                None => [min, max],
            };
            FilterControl::Numeric {
                min,
                max,
                min_span: (max - min) / 100.0,
                value,
                disabled: min == max,
            }
        }
    };

    FilterOutcome::Control(FilterSpec {
        key,
        column: column.name.clone(),
        control,
    })
}

/// Filter generator bound to the session's main dataset
#[derive(Clone)]
pub struct FilterGenerator {
    dataset: Arc<dyn DatasetProvider>,
}

impl FilterGenerator {
    pub fn new(dataset: Arc<dyn DatasetProvider>) -> Self {
        Self { dataset }
    }

    /// Filter for a column looked up by name. An unknown column produces a
    /// notice instead of a control.
    pub fn for_column(
        &self,
        column_name: &str,
        key: StructuralKey,
        default_value: Option<&SettingValue>,
    ) -> FilterOutcome {
        match self.dataset.column(column_name) {
            Some(column) => generate_filter(column, key, default_value),
            None => {
                tracing::debug!("No filter for unknown column {}", column_name);
                FilterOutcome::Notice {
                    text: format!("Unknown column {column_name}"),
                }
            }
        }
    }
}

/// Whether `value` passes a stored filter selection for a column of `kind`.
/// Selections of the wrong shape for the column let every value through.
pub fn passes_filter(kind: ColumnKind, selection: Option<&SettingValue>, value: &Value) -> bool {
    let Some(selection) = selection else {
        return true;
    };
    match kind {
        ColumnKind::Categorical => match selection.as_labels() {
            Some(labels) => {
                let label = value.label();
                labels.iter().any(|l| *l == label)
            }
            None => true,
        },
        ColumnKind::Numeric => match (selection.as_range(), value.as_f64()) {
            (Some((lo, hi)), Some(n)) => n >= lo && n <= hi,
            (Some(_), None) => false,
            (None, _) => true,
        },
    }
}
