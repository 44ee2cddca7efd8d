// Rendered view descriptions: what a card shows and what its settings editor offers
use serde::{Deserialize, Serialize};

use super::card::CardId;
use super::event_key::StructuralKey;
use super::filter::{FilterControl, FilterOutcome};
use super::theme::Template;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub card_id: CardId,
    pub title: String,
    pub subtitle: String,
    pub body: CardBody,
}

impl CardView {
    /// Shown in place of a card whose render failed
    pub fn placeholder(card_id: &CardId, message: impl Into<String>) -> Self {
        Self {
            card_id: card_id.clone(),
            title: "Unable to render card".to_string(),
            subtitle: String::new(),
            body: CardBody::Error { message: message.into() },
        }
    }

    pub fn figure(&self) -> Option<&ChartFigure> {
        match &self.body {
            CardBody::Chart(figure) => Some(figure),
            _ => None,
        }
    }

    pub fn figure_mut(&mut self) -> Option<&mut ChartFigure> {
        match &mut self.body {
            CardBody::Chart(figure) => Some(figure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CardBody {
    Chart(ChartFigure),
    Highlight {
        value: String,
        caption: String,
        icon: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFigure {
    pub key: StructuralKey,
    pub traces: Vec<Trace>,
    pub layout: FigureLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureLayout {
    pub template: Template,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_order: Option<Vec<String>>,
}

impl FigureLayout {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            margin: Margin::tight(),
            x_title: None,
            y_title: None,
            x_range: None,
            category_order: None,
        }
    }

    pub fn titled(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_title = Some(x.into());
        self.y_title = Some(y.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

impl Margin {
    pub fn tight() -> Self {
        Self { l: 0, r: 0, t: 15, b: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Trace {
    /// Equal-width bins; `edges` has one more entry than `counts`
    #[serde(rename_all = "camelCase")]
    Histogram {
        name: String,
        edges: Vec<f64>,
        counts: Vec<u64>,
    },
    /// `z[row][col]` counts rows falling in `y_labels[row]` and `x_labels[col]`
    #[serde(rename_all = "camelCase")]
    Heatmap {
        x_labels: Vec<String>,
        y_labels: Vec<String>,
        z: Vec<Vec<u64>>,
    },
    #[serde(rename_all = "camelCase")]
    Violin {
        name: String,
        summary: Summary,
    },
    #[serde(rename_all = "camelCase")]
    AnimatedScatter {
        name: String,
        frames: Vec<ScatterFrame>,
    },
}

/// Five-number summary of a distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterFrame {
    pub time: f64,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub card_id: CardId,
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum Control {
    Select {
        id: StructuralKey,
        label: String,
        value: Option<String>,
        options: Vec<String>,
        searchable: bool,
    },
    MultiSelect {
        id: StructuralKey,
        label: String,
        value: Vec<String>,
        options: Vec<String>,
    },
    NumberInput {
        id: StructuralKey,
        label: String,
        value: f64,
        min: f64,
        max: f64,
    },
    TextInput {
        id: StructuralKey,
        label: String,
        value: String,
    },
    CheckboxGroup {
        id: StructuralKey,
        label: String,
        options: Vec<String>,
        value: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    RangeSlider {
        id: StructuralKey,
        label: String,
        min: f64,
        max: f64,
        min_range: f64,
        value: [f64; 2],
        disabled: bool,
    },
    /// Read-only text, e.g. the "too many values" notice
    Notice { text: String },
    Link { text: String, href: String },
    /// Dependent region replaced as a whole when its governing field changes
    Container {
        id: StructuralKey,
        children: Vec<Control>,
    },
}

impl Control {
    pub fn id(&self) -> Option<&StructuralKey> {
        match self {
            Control::Select { id, .. }
            | Control::MultiSelect { id, .. }
            | Control::NumberInput { id, .. }
            | Control::TextInput { id, .. }
            | Control::CheckboxGroup { id, .. }
            | Control::RangeSlider { id, .. }
            | Control::Container { id, .. } => Some(id),
            Control::Notice { .. } | Control::Link { .. } => None,
        }
    }

    pub fn text_input(card_id: &CardId, field: &str, label: &str, value: &str) -> Self {
        Control::TextInput {
            id: StructuralKey::settings_field(card_id, field),
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    pub fn select(card_id: &CardId, field: &str, label: &str, value: Option<&str>, options: Vec<String>) -> Self {
        Control::Select {
            id: StructuralKey::settings_field(card_id, field),
            label: label.to_string(),
            value: value.map(str::to_string),
            options,
            searchable: true,
        }
    }

    pub fn number_input(card_id: &CardId, field: &str, label: &str, value: f64, min: f64, max: f64) -> Self {
        Control::NumberInput {
            id: StructuralKey::settings_field(card_id, field),
            label: label.to_string(),
            value,
            min,
            max,
        }
    }

    /// Children of a filter container for a generated filter
    pub fn filter_children(outcome: &FilterOutcome) -> Vec<Control> {
        match outcome {
            FilterOutcome::Notice { text } => vec![Control::Notice { text: text.clone() }],
            FilterOutcome::Control(spec) => {
                let control = match &spec.control {
                    FilterControl::Categorical { choices, selected } => Control::CheckboxGroup {
                        id: spec.key.clone(),
                        label: "Filter".to_string(),
                        options: choices.clone(),
                        value: selected.clone(),
                    },
                    FilterControl::Numeric { min, max, min_span, value, disabled } => {
                        Control::RangeSlider {
                            id: spec.key.clone(),
                            label: "Filter".to_string(),
                            min: *min,
                            max: *max,
                            min_range: *min_span,
                            value: *value,
                            disabled: *disabled,
                        }
                    }
                };
                vec![control]
            }
        }
    }

    /// Depth-first search for the control carrying `key`
    pub fn find<'a>(controls: &'a [Control], key: &StructuralKey) -> Option<&'a Control> {
        for control in controls {
            if control.id() == Some(key) {
                return Some(control);
            }
            if let Control::Container { children, .. } = control {
                if let Some(found) = Self::find(children, key) {
                    return Some(found);
                }
            }
        }
        None
    }
}
