// Card domain model
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Fresh random id, never handed out twice in a session
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CardId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default size and minimum size of a card type on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSize {
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl Default for GridSize {
    fn default() -> Self {
        Self { w: 2, h: 1, min_w: 1, min_h: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPlacement {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl GridPlacement {
    pub fn at(x: u32, y: u32, size: GridSize) -> Self {
        Self {
            x,
            y,
            w: size.w,
            h: size.h,
            min_w: size.min_w,
            min_h: size.min_h,
        }
    }

    /// Row just below this placement
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Width and height never shrink below the minimums
    pub fn clamped(mut self) -> Self {
        self.w = self.w.max(self.min_w);
        self.h = self.h.max(self.min_h);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    #[serde(rename = "type")]
    pub type_name: String,
    pub settings: Settings,
    pub placement: GridPlacement,
    pub revision: u64,
}

impl Card {
    pub fn new(id: CardId, type_name: String, settings: Settings, placement: GridPlacement) -> Self {
        Self {
            id,
            type_name,
            settings,
            placement,
            revision: 0,
        }
    }
}
