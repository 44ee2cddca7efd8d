// Layout store implementations: a JSON file on disk and an in-memory slot
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::application::layout_store::LayoutStore;
use crate::domain::layout::LayoutDocument;
use crate::error::{DashboardError, Result};

/// Stores the layout as pretty-printed JSON. Writes go to a sibling temp
/// file first and are renamed into place, so a crash never leaves a
/// truncated layout behind.
#[derive(Debug, Clone)]
pub struct JsonFileLayoutStore {
    path: PathBuf,
}

impl JsonFileLayoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LayoutStore for JsonFileLayoutStore {
    async fn load(&self) -> Result<Option<LayoutDocument>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved layout");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let layout = serde_json::from_str(&json)
            .map_err(|e| DashboardError::Persistence(format!("{}: {e}", self.path.display())))?;
        Ok(Some(layout))
    }

    async fn save(&self, layout: &LayoutDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(layout)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

/// Keeps the last saved layout in memory; used when no layout path is
/// configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    saved: Mutex<Option<LayoutDocument>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: LayoutDocument) -> Self {
        Self {
            saved: Mutex::new(Some(layout)),
        }
    }

    pub fn saved(&self) -> Option<LayoutDocument> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl LayoutStore for MemoryLayoutStore {
    async fn load(&self) -> Result<Option<LayoutDocument>> {
        Ok(self.saved.lock().clone())
    }

    async fn save(&self, layout: &LayoutDocument) -> Result<()> {
        *self.saved.lock() = Some(layout.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{CardId, GridPlacement};
    use crate::domain::layout::LayoutEntry;
    use crate::domain::settings::Settings;

    fn layout() -> LayoutDocument {
        let mut doc = LayoutDocument::default();
        doc.cards.insert(
            CardId::from("c1"),
            LayoutEntry {
                type_name: "histogram".to_string(),
                settings: Settings::new().with("bins", 10.0),
                placement: GridPlacement::default(),
            },
        );
        doc
    }

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLayoutStore::new(dir.path().join("layout.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("layout.json");
        let store = JsonFileLayoutStore::new(&path);

        store.save(&layout()).await.unwrap();
        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().await.unwrap(), Some(layout()));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileLayoutStore::new(&path);
        assert!(matches!(store.load().await, Err(DashboardError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryLayoutStore::new();
        assert!(store.load().await.unwrap().is_none());
        store.save(&layout()).await.unwrap();
        assert_eq!(store.saved(), Some(layout()));
    }
}
