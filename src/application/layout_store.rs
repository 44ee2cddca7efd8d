// Layout store trait for dashboard persistence
use async_trait::async_trait;

use crate::domain::layout::LayoutDocument;
use crate::error::Result;

#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Saved layout, or `None` when nothing was saved yet
    async fn load(&self) -> Result<Option<LayoutDocument>>;

    /// Replace the saved layout
    async fn save(&self, layout: &LayoutDocument) -> Result<()>;
}
