// Card settings domain model
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single settings value. Lists only ever hold category labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Range([f64; 2]),
    Labels(Vec<String>),
}

impl SettingValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SettingValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            SettingValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            SettingValue::Range([lo, hi]) => Some((*lo, *hi)),
            _ => None,
        }
    }

    pub fn as_labels(&self) -> Option<&[String]> {
        match self {
            SettingValue::Labels(labels) => Some(labels),
            _ => None,
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::Labels(value)
    }
}

/// Ordered settings map owned by one card.
///
/// Every typed read takes a default: a missing key, an explicit null and a
/// value of the wrong shape all read as the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(IndexMap<String, SettingValue>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for initial settings
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a key, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.0.shift_remove(key)
    }

    /// Raw access; `None` for missing keys and explicit nulls
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(SettingValue::as_str).unwrap_or(default)
    }

    pub fn opt_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SettingValue::as_str)
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get(key)
            .and_then(SettingValue::as_f64)
            .filter(|n| n.is_finite())
            .unwrap_or(default)
    }

    /// Positive integer read; values below one clamp to one
    pub fn count_or(&self, key: &str, default: usize) -> usize {
        let n = self.f64_or(key, default as f64);
        if n < 1.0 { 1 } else { n as usize }
    }

    pub fn range(&self, key: &str) -> Option<(f64, f64)> {
        self.get(key).and_then(SettingValue::as_range)
    }

    pub fn labels(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(SettingValue::as_labels)
    }

    pub fn labels_or(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.labels(key) {
            Some(labels) => labels.to_vec(),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.0.iter()
    }
}
