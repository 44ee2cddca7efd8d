// Dataset provider trait - read-only tabular data queried by cards
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::dataset::{Column, ColumnInfo, ColumnKind, Value};
use crate::error::{DashboardError, Result};

pub trait DatasetProvider: Send + Sync {
    /// All columns with their declared kind, in dataset order
    fn columns(&self) -> Vec<ColumnInfo>;

    fn column(&self, name: &str) -> Option<&Column>;

    fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| DashboardError::UnknownColumn(name.to_string()))
    }

    /// Distinct non-missing values in order of first appearance
    fn unique_values(&self, name: &str) -> Option<Vec<Value>> {
        let column = self.column(name)?;
        let mut seen = HashSet::new();
        Some(
            column
                .values
                .iter()
                .filter(|v| !v.is_missing())
                .filter(|v| seen.insert(v.label()))
                .cloned()
                .collect(),
        )
    }

    fn column_names(&self) -> Vec<String> {
        self.columns().into_iter().map(|c| c.name).collect()
    }

    fn column_names_of(&self, kind: ColumnKind) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name)
            .collect()
    }
}

/// The datasets a dashboard session is built over. Loaded once before any
/// card exists and never reloaded.
#[derive(Clone)]
pub struct Datasets {
    /// One row per participant
    pub main: Arc<dyn DatasetProvider>,
    /// Group positions over time, used by the racing card
    pub positions: Arc<dyn DatasetProvider>,
}

impl Datasets {
    pub fn new(main: Arc<dyn DatasetProvider>, positions: Arc<dyn DatasetProvider>) -> Self {
        Self { main, positions }
    }
}
