//! Test data builders for datasets and dashboard services

use std::sync::Arc;

use card_canvas::application::card_type::CardDefaults;
use card_canvas::application::dataset_provider::Datasets;
use card_canvas::application::layout_store::LayoutStore;
use card_canvas::cards::register_builtin;
use card_canvas::domain::dataset::{Column, ColumnKind, Value};
use card_canvas::infrastructure::layout_file::MemoryLayoutStore;
use card_canvas::infrastructure::memory_dataset::Table;
use card_canvas::{CardRegistry, DashboardService};

/// Participant table with two numeric and two categorical columns
pub fn main_table() -> Table {
    Table::new(vec![
        Column::numeric("overallTimeMinutes", [180.0, 240.0, 300.0, 210.0, 270.0, 330.0, 255.0, 195.0]),
        Column::numeric("minutesPerKM", [4.3, 5.7, 7.1, 5.0, 6.4, 7.8, 6.0, 4.6]),
        Column::new(
            "ageBand",
            ColumnKind::Categorical,
            ["30-39", "20-29", "30-39", "", "40-49", "20-29", "50-59", "40-49"]
                .into_iter()
                .map(|s| if s.is_empty() { Value::Missing } else { Value::Text(s.to_string()) })
                .collect(),
        ),
        Column::categorical("gender", ["M", "F", "M", "F", "X", "F", "M", "F"]),
    ])
    .unwrap()
}

pub fn positions_table() -> Table {
    Table::new(vec![
        Column::categorical("name", ["Average Person", "Fast Group", "Average Person", "Fast Group"]),
        Column::numeric("time", [0.0, 0.0, 1.0, 1.0]),
        Column::numeric("position", [0.0, 0.0, 10.0, 20.0]),
        Column::numeric("count", [100.0, 10.0, 100.0, 10.0]),
        Column::categorical("gender", ["F", "M", "F", "M"]),
    ])
    .unwrap()
}

pub fn datasets() -> Datasets {
    Datasets::new(Arc::new(main_table()), Arc::new(positions_table()))
}

/// Builder for a dashboard service over the test datasets
pub struct ServiceBuilder {
    defaults: CardDefaults,
    store: Arc<dyn LayoutStore>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            defaults: CardDefaults::default(),
            store: Arc::new(MemoryLayoutStore::new()),
        }
    }

    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.defaults.histogram_bins = bins;
        self
    }

    pub fn store(mut self, store: Arc<dyn LayoutStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> DashboardService {
        let mut registry = CardRegistry::new();
        register_builtin(&mut registry).unwrap();
        DashboardService::new(Arc::new(registry), datasets(), self.defaults, self.store)
    }
}
