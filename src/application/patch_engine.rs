//! Theme patches.
//!
//! A theme switch must reach every chart currently on screen without
//! re-running any render. The engine turns the new theme plus the set of
//! live chart keys into one small mutation per chart; each mutation only
//! replaces the figure's presentation template.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::event_key::{KeyKind, StructuralKey};
use crate::domain::theme::{Template, Theme};
use crate::domain::view::ChartFigure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FigureMutation {
    /// Replace `layout.template`
    SetTemplate { template: Template },
}

impl FigureMutation {
    pub fn apply(&self, figure: &mut ChartFigure) {
        match self {
            FigureMutation::SetTemplate { template } => {
                figure.layout.template = template.clone();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub target: StructuralKey,
    pub mutation: FigureMutation,
}

impl Patch {
    /// Applies the mutation if `figure` is the patch target
    pub fn apply(&self, figure: &mut ChartFigure) -> bool {
        if figure.key != self.target {
            return false;
        }
        self.mutation.apply(figure);
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatchEngine;

impl PatchEngine {
    pub fn new() -> Self {
        Self
    }

    /// One patch per distinct chart key, in the order given. Keys that do
    /// not name a chart are ignored.
    pub fn compute_patches<'a, I>(&self, theme: Theme, live_chart_keys: I) -> Vec<Patch>
    where
        I: IntoIterator<Item = &'a StructuralKey>,
    {
        let template = theme.template();
        let mut seen = HashSet::new();
        let mut patches = Vec::new();

        for key in live_chart_keys {
            if key.kind != KeyKind::Chart {
                tracing::debug!("Ignoring non-chart key {} for theme patch", key);
                continue;
            }
            if !seen.insert(key) {
                continue;
            }
            patches.push(Patch {
                target: key.clone(),
                mutation: FigureMutation::SetTemplate {
                    template: template.clone(),
                },
            });
        }

        patches
    }
}
