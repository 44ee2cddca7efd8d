// Persisted dashboard layout: placement and settings blob per card
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::card::{CardId, GridPlacement};
use super::settings::Settings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cards: IndexMap<CardId, LayoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub placement: GridPlacement,
}
