//! Structural element keys.
//!
//! Every control in a settings editor and every rendered chart carries a key
//! naming the card it belongs to and, for controls, the settings field it
//! edits. The key doubles as the routing address of input events, so the
//! string encoding must round-trip exactly:
//!
//! ```text
//! settings-field/<card id>/<field id>
//! filter-container/<card id>/<field id>
//! chart/<card id>
//! ```
//!
//! Segments are percent-encoded, so a `/` inside a field id cannot be
//! confused with a separator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::card::CardId;
use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// An input control bound to one settings field
    SettingsField,
    /// A dependent region rebuilt when its governing field changes
    FilterContainer,
    /// The chart element of a rendered card
    Chart,
}

impl KeyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyKind::SettingsField => "settings-field",
            KeyKind::FilterContainer => "filter-container",
            KeyKind::Chart => "chart",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "settings-field" => Some(KeyKind::SettingsField),
            "filter-container" => Some(KeyKind::FilterContainer),
            "chart" => Some(KeyKind::Chart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuralKey {
    pub kind: KeyKind,
    pub card_id: CardId,
    /// Absent for chart keys only
    pub field_id: Option<String>,
}

impl StructuralKey {
    pub fn settings_field(card_id: &CardId, field: impl Into<String>) -> Self {
        Self {
            kind: KeyKind::SettingsField,
            card_id: card_id.clone(),
            field_id: Some(field.into()),
        }
    }

    pub fn filter_container(card_id: &CardId, field: impl Into<String>) -> Self {
        Self {
            kind: KeyKind::FilterContainer,
            card_id: card_id.clone(),
            field_id: Some(field.into()),
        }
    }

    pub fn chart(card_id: &CardId) -> Self {
        Self {
            kind: KeyKind::Chart,
            card_id: card_id.clone(),
            field_id: None,
        }
    }

    pub fn field(&self) -> &str {
        self.field_id.as_deref().unwrap_or_default()
    }

    pub fn encode(&self) -> String {
        let mut out = format!(
            "{}/{}",
            self.kind.as_str(),
            urlencoding::encode(self.card_id.as_str())
        );
        if let Some(field) = &self.field_id {
            out.push('/');
            out.push_str(&urlencoding::encode(field));
        }
        out
    }

    pub fn decode(encoded: &str) -> Result<Self, DashboardError> {
        let invalid = |reason: &str| DashboardError::InvalidEventKey {
            key: encoded.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = encoded.split('/').collect();
        let kind = KeyKind::parse(segments[0]).ok_or_else(|| invalid("unknown key kind"))?;

        let expected = if kind == KeyKind::Chart { 2 } else { 3 };
        if segments.len() != expected {
            return Err(invalid("wrong number of segments"));
        }

        let card_id = urlencoding::decode(segments[1])
            .map_err(|_| invalid("card id is not valid UTF-8"))?;
        if card_id.is_empty() {
            return Err(invalid("missing card id"));
        }

        let field_id = match segments.get(2) {
            Some(raw) => {
                let field = urlencoding::decode(raw)
                    .map_err(|_| invalid("field id is not valid UTF-8"))?;
                if field.is_empty() {
                    return Err(invalid("missing field id"));
                }
                Some(field.into_owned())
            }
            None => None,
        };

        Ok(Self {
            kind,
            card_id: CardId::from(card_id.into_owned()),
            field_id,
        })
    }
}

impl fmt::Display for StructuralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for StructuralKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for StructuralKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for StructuralKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::decode(&raw).map_err(serde::de::Error::custom)
    }
}
