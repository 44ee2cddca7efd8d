// Global color scheme and the chart templates it selects
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn template(self) -> Template {
        match self {
            Theme::Light => Template {
                name: "mantine_light".to_string(),
                paper_background: "#ffffff".to_string(),
                plot_background: "#ffffff".to_string(),
                font_color: "#212529".to_string(),
                grid_color: "#dee2e6".to_string(),
                colorway: COLORWAY.iter().map(|c| c.to_string()).collect(),
            },
            Theme::Dark => Template {
                name: "mantine_dark".to_string(),
                paper_background: "#242424".to_string(),
                plot_background: "#242424".to_string(),
                font_color: "#c9c9c9".to_string(),
                grid_color: "#424242".to_string(),
                colorway: COLORWAY.iter().map(|c| c.to_string()).collect(),
            },
        }
    }
}

const COLORWAY: [&str; 8] = [
    "#228be6", "#fa5252", "#40c057", "#fab005", "#7950f2", "#fd7e14", "#15aabf", "#e64980",
];

/// Presentation template of a chart. Only this part of a rendered figure is
/// touched by theme patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub paper_background: String,
    pub plot_background: String,
    pub font_color: String,
    pub grid_color: String,
    pub colorway: Vec<String>,
}
