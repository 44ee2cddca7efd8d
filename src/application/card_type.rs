//! Card type capability bundles.
//!
//! A card type is metadata plus a [`CardRenderer`]: the two capabilities
//! every card has (render the card, render its settings editor) and the
//! static list of editor regions that depend on another field.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::dataset_provider::Datasets;
use crate::application::filter_generator::FilterGenerator;
use crate::domain::card::{CardId, GridSize};
use crate::domain::filter::filter_field;
use crate::domain::settings::Settings;
use crate::domain::theme::Theme;
use crate::domain::view::{CardView, EditorView};
use crate::error::Result;

/// Everything a renderer may read besides the card's own settings
pub struct RenderContext<'a> {
    pub card_id: &'a CardId,
    pub datasets: &'a Datasets,
    pub filters: &'a FilterGenerator,
    pub theme: Theme,
    pub defaults: &'a CardDefaults,
}

/// Configurable render defaults shared by all card types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDefaults {
    pub histogram_bins: usize,
    pub heatmap_bins: usize,
}

impl Default for CardDefaults {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            heatmap_bins: 20,
        }
    }
}

/// An editor region whose contents are derived from another field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentRegion {
    /// Filter container `<governing>-filter`, regenerated by the filter
    /// generator for the column named by `governing`
    Filter { governing: &'static str },
    /// Options of the select bound to `field`, listing the distinct values
    /// of the column named by `governing`
    Choices {
        governing: &'static str,
        field: &'static str,
    },
}

impl DependentRegion {
    pub fn governing(&self) -> &'static str {
        match self {
            DependentRegion::Filter { governing } => governing,
            DependentRegion::Choices { governing, .. } => governing,
        }
    }

    /// Settings field holding the dependent selection
    pub fn dependent_field(&self) -> String {
        match self {
            DependentRegion::Filter { governing } => filter_field(governing),
            DependentRegion::Choices { field, .. } => field.to_string(),
        }
    }
}

pub trait CardRenderer: Send + Sync {
    /// Build the card view. Every settings read has a default, so a missing
    /// key never fails; errors come from the data (e.g. an unknown column).
    fn render(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<CardView>;

    /// Build the settings editor, one control per editable field
    fn render_settings(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<EditorView>;

    fn dependents(&self) -> &'static [DependentRegion] {
        &[]
    }
}

#[derive(Clone)]
pub struct CardTypeDescriptor {
    pub name: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub grid: GridSize,
    pub renderer: Arc<dyn CardRenderer>,
}

impl CardTypeDescriptor {
    pub fn new(name: impl Into<String>, title: impl Into<String>, renderer: impl CardRenderer + 'static) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: String::new(),
            icon: "mdi:file-document-edit".to_string(),
            grid: GridSize::default(),
            renderer: Arc::new(renderer),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn grid(mut self, grid: GridSize) -> Self {
        self.grid = grid;
        self
    }

    pub fn info(&self) -> CardTypeInfo {
        CardTypeInfo {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            grid: self.grid,
        }
    }
}

impl fmt::Debug for CardTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardTypeDescriptor")
            .field("name", &self.name)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Serializable summary of a card type, used for the "add card" menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardTypeInfo {
    pub name: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub grid: GridSize,
}
