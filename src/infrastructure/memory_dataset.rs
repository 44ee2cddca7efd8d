// In-memory dataset table loaded from a JSON records file
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use tracing::info;

use crate::application::dataset_provider::DatasetProvider;
use crate::domain::dataset::{Column, ColumnInfo, ColumnKind, Value};
use crate::error::{DashboardError, Result};

/// Immutable column store. Every column has the same number of rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: IndexMap<String, Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, |c| c.values.len());
        let mut table = IndexMap::with_capacity(columns.len());
        for column in columns {
            if column.values.len() != rows {
                return Err(DashboardError::Persistence(format!(
                    "column {} has {} rows, expected {rows}",
                    column.name,
                    column.values.len()
                )));
            }
            if table.contains_key(&column.name) {
                return Err(DashboardError::Persistence(format!("duplicate column {}", column.name)));
            }
            table.insert(column.name.clone(), column);
        }
        Ok(Self { columns: table, rows })
    }

    /// Parse an array of row objects. Columns keep the order they first appear in;
    /// a column is numeric when every present value is a number.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<IndexMap<String, Value>> = serde_json::from_str(json)?;

        let names: IndexSet<&String> = records.iter().flat_map(|r| r.keys()).collect();

        let columns = names
            .into_iter()
            .map(|name| {
                let values: Vec<Value> = records
                    .iter()
                    .map(|r| r.get(name).cloned().unwrap_or(Value::Missing))
                    .collect();
                let numeric = values
                    .iter()
                    .all(|v| matches!(v, Value::Missing | Value::Number(_)));
                let kind = if numeric { ColumnKind::Numeric } else { ColumnKind::Categorical };
                Column::new(name.clone(), kind, values)
            })
            .collect();

        Self::new(columns)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let table = Self::from_json_str(&json)?;
        info!(path = %path.display(), rows = table.rows, columns = table.columns.len(), "dataset loaded");
        Ok(table)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl DatasetProvider for Table {
    fn columns(&self) -> Vec<ColumnInfo> {
        self.columns.values().map(Column::info).collect()
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infers_kinds_and_keeps_order() {
        let table = Table::from_json_str(
            r#"[
                {"overallTimeMinutes": 180, "gender": "M", "ageBand": "30-39"},
                {"overallTimeMinutes": null, "gender": "F"},
                {"overallTimeMinutes": 240.5, "gender": "F", "ageBand": 20}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.rows(), 3);
        assert_eq!(table.column_names(), ["overallTimeMinutes", "gender", "ageBand"]);
        assert_eq!(table.column_names_of(ColumnKind::Numeric), ["overallTimeMinutes"]);
        // mixed text and numbers is categorical
        assert_eq!(table.column("ageBand").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(table.column("ageBand").unwrap().values[1], Value::Missing);
    }

    #[test]
    fn test_unique_values_in_appearance_order() {
        let table = Table::new(vec![Column::categorical("gender", ["M", "F", "M", "X"])]).unwrap();
        let unique: Vec<_> = table.unique_values("gender").unwrap().iter().map(Value::label).collect();
        assert_eq!(unique, ["M", "F", "X"]);
        assert!(table.unique_values("missing").is_none());
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::numeric("a", [1.0, 2.0]),
            Column::numeric("b", [1.0]),
        ]);
        assert!(result.is_err());
        assert!(Table::new(vec![Column::numeric("a", [1.0]), Column::numeric("a", [2.0])]).is_err());
    }

    #[test]
    fn test_require_unknown_column() {
        let table = Table::default();
        assert!(matches!(table.require("x"), Err(DashboardError::UnknownColumn(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.json");
        std::fs::write(&path, r#"[{"minutesPerKM": 4.3}, {"minutesPerKM": 5.7}]"#).unwrap();

        let table = Table::load(&path).await.unwrap();
        assert_eq!(table.rows(), 2);
    }
}
