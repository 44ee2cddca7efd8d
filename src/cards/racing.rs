// Racing card - animated positions of groups along the course
use std::collections::HashSet;

use indexmap::IndexMap;

use super::{chart_view, text_controls};
use crate::application::card_type::{CardRenderer, RenderContext};
use crate::domain::dataset::Value;
use crate::domain::event_key::StructuralKey;
use crate::domain::settings::Settings;
use crate::domain::view::{CardView, Control, EditorView, FigureLayout, ScatterFrame, ScatterPoint, Trace};
use crate::error::Result;

const DEFAULT_RACERS: &[&str] = &["Average Person"];
const COURSE_RANGE: [f64; 2] = [0.0, 27.0];

pub struct RacingCard;

/// One row of the positions dataset
struct Sample<'a> {
    name: &'a Value,
    time: f64,
    position: f64,
    count: f64,
    gender: &'a Value,
}

impl Sample<'_> {
    /// Everything but the time, used to spot groups standing still at the finish
    fn state(&self) -> (String, u64, u64, String) {
        (
            self.name.label(),
            self.position.to_bits(),
            self.count.to_bits(),
            self.gender.label(),
        )
    }
}

impl CardRenderer for RacingCard {
    fn render(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<CardView> {
        let racers = settings.labels_or("racers", DEFAULT_RACERS);
        let data = &ctx.datasets.positions;
        let names = data.require("name")?;
        let times = data.require("time")?;
        let positions = data.require("position")?;
        let counts = data.require("count")?;
        let genders = data.require("gender")?;

        let samples: Vec<Sample<'_>> = (0..names.values.len())
            .filter(|&row| racers.contains(&names.values[row].label()))
            .filter_map(|row| {
                Some(Sample {
                    name: &names.values[row],
                    time: times.values.get(row)?.as_f64()?,
                    position: positions.values.get(row)?.as_f64()?,
                    count: counts.values.get(row)?.as_f64()?,
                    gender: genders.values.get(row)?,
                })
            })
            .collect();

        // the data repeats every group's final position until the slowest
        // group finishes; stop the animation at the last real movement
        let mut seen = HashSet::new();
        let max_time = samples
            .iter()
            .filter(|s| seen.insert(s.state()))
            .map(|s| s.time)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut traces: IndexMap<String, IndexMap<u64, ScatterFrame>> = IndexMap::new();
        for sample in samples.iter().filter(|s| s.time <= max_time) {
            let frames = traces.entry(sample.gender.label()).or_default();
            frames
                .entry(sample.time.to_bits())
                .or_insert_with(|| ScatterFrame {
                    time: sample.time,
                    points: Vec::new(),
                })
                .points
                .push(ScatterPoint {
                    x: sample.position,
                    y: sample.name.label(),
                    size: sample.count,
                });
        }

        let traces = traces
            .into_iter()
            .map(|(name, frames)| Trace::AnimatedScatter {
                name,
                frames: frames.into_values().collect(),
            })
            .collect();

        let mut layout = FigureLayout::new(ctx.theme.template()).titled("position", "name");
        layout.x_range = Some(COURSE_RANGE);

        Ok(chart_view(
            ctx,
            settings.str_or("title", "Marathon chart"),
            settings.str_or("description", "Groups of people racing"),
            traces,
            layout,
        ))
    }

    fn render_settings(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<EditorView> {
        let id = ctx.card_id;
        let options = ctx
            .datasets
            .positions
            .unique_values("name")
            .unwrap_or_default()
            .iter()
            .map(Value::label)
            .collect();

        let mut controls = vec![Control::MultiSelect {
            id: StructuralKey::settings_field(id, "racers"),
            label: "Racers".to_string(),
            value: settings.labels_or("racers", DEFAULT_RACERS),
            options,
        }];
        controls.extend(text_controls(id, settings, "Marathon chart", "Groups of people racing"));

        Ok(EditorView {
            card_id: id.clone(),
            controls,
        })
    }
}
