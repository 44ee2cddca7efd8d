//! Built-in card types of the marathon dashboard.
//!
//! Each card reduces the dataset to a small chart description (bin counts,
//! five-number summaries, animation frames) that the front end draws.

pub mod heatmap;
pub mod highlight;
pub mod histogram;
pub mod racing;
pub mod violin;

use crate::application::card_type::{CardTypeDescriptor, RenderContext};
use crate::application::registry::CardRegistry;
use crate::domain::card::{CardId, GridSize};
use crate::domain::event_key::StructuralKey;
use crate::domain::settings::Settings;
use crate::domain::view::{CardBody, CardView, ChartFigure, Control, FigureLayout, Summary, Trace};
use crate::error::Result;

const CHART_GRID: GridSize = GridSize { w: 4, h: 2, min_w: 4, min_h: 2 };

/// Upper bound on any bin count, whatever was typed into the editor
pub const MAX_BINS: usize = 500;

/// Register every built-in card type, in menu order
pub fn register_builtin(registry: &mut CardRegistry) -> Result<()> {
    registry.register(
        CardTypeDescriptor::new("racing", "Marathon chart", racing::RacingCard)
            .description(
                "This card shows a chart of a marathon where x-axis is the distance and \
                 individual racers are plotted on the y-axis",
            )
            .grid(CHART_GRID),
    )?;
    registry.register(
        CardTypeDescriptor::new("histogram", "Histogram", histogram::HistogramCard)
            .description("This card shows a histogram of a given dataset")
            .grid(CHART_GRID),
    )?;
    registry.register(
        CardTypeDescriptor::new("heatmap", "Heatmap", heatmap::HeatmapCard)
            .description("This card shows a heatmap of a given dataset")
            .grid(CHART_GRID),
    )?;
    registry.register(
        CardTypeDescriptor::new("violin", "Violin", violin::ViolinCard)
            .description("This card shows a violin plot of a given dataset")
            .grid(CHART_GRID),
    )?;
    registry.register(
        CardTypeDescriptor::new("highlight", "Highlight", highlight::HighlightCard)
            .description("This card shows a highlight of a given dataset"),
    )?;
    Ok(())
}

pub(crate) fn chart_view(
    ctx: &RenderContext<'_>,
    title: &str,
    subtitle: &str,
    traces: Vec<Trace>,
    layout: FigureLayout,
) -> CardView {
    CardView {
        card_id: ctx.card_id.clone(),
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        body: CardBody::Chart(ChartFigure {
            key: StructuralKey::chart(ctx.card_id),
            traces,
            layout,
        }),
    }
}

/// Title and description inputs every chart card ends its editor with
pub(crate) fn text_controls(
    card_id: &CardId,
    settings: &Settings,
    title: &str,
    description: &str,
) -> [Control; 2] {
    [
        Control::text_input(card_id, "title", "Title", settings.str_or("title", title)),
        Control::text_input(
            card_id,
            "description",
            "Description",
            settings.str_or("description", description),
        ),
    ]
}

/// Bin count read from `field`, kept within `1..=MAX_BINS`
pub(crate) fn bin_count(settings: &Settings, field: &str, default: usize) -> usize {
    settings.count_or(field, default).min(MAX_BINS)
}

/// Equal-width bins over `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bins {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Bins {
    /// Bins spanning `values`, `None` when there are no finite values
    pub fn spanning(values: impl IntoIterator<Item = f64>, count: usize) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !min.is_finite() {
            return None;
        }
        Some(Self {
            min,
            max,
            count: count.clamp(1, MAX_BINS),
        })
    }

    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.count as f64
    }

    pub fn edges(&self) -> Vec<f64> {
        (0..=self.count)
            .map(|i| self.min + self.width() * i as f64)
            .collect()
    }

    /// The maximum lands in the last bin
    pub fn index(&self, value: f64) -> usize {
        if self.max == self.min {
            return 0;
        }
        let i = ((value - self.min) / self.width()).floor();
        (i.max(0.0) as usize).min(self.count - 1)
    }

    /// Midpoint labels, one per bin
    pub fn labels(&self) -> Vec<String> {
        let width = self.width();
        (0..self.count)
            .map(|i| format_number(self.min + width * (i as f64 + 0.5)))
            .collect()
    }
}

/// Five-number summary using linear interpolation between order statistics
pub(crate) fn summarize(values: &mut [f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let quantile = |q: f64| {
        let pos = q * (values.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
    };
    Some(Summary {
        count: values.len(),
        min: values[0],
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max: values[values.len() - 1],
    })
}

/// Rounded to two decimals, without trailing zeros
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small marathon-shaped datasets shared by card tests

    use std::sync::Arc;

    use crate::application::card_type::{CardDefaults, RenderContext};
    use crate::application::dataset_provider::Datasets;
    use crate::application::filter_generator::FilterGenerator;
    use crate::domain::card::CardId;
    use crate::domain::dataset::{Column, ColumnKind, Value};
    use crate::domain::theme::Theme;
    use crate::infrastructure::memory_dataset::Table;

    pub fn datasets() -> Datasets {
        let main = Table::new(vec![
            Column::numeric("overallTimeMinutes", [180.0, 240.0, 300.0, 210.0, 270.0, 330.0]),
            Column::numeric("minutesPerKM", [4.3, 5.7, 7.1, 5.0, 6.4, 7.8]),
            Column::new(
                "ageBand",
                ColumnKind::Categorical,
                vec![
                    Value::Text("30-39".into()),
                    Value::Text("20-29".into()),
                    Value::Text("30-39".into()),
                    Value::Missing,
                    Value::Text("40-49".into()),
                    Value::Text("20-29".into()),
                ],
            ),
            Column::categorical("gender", ["M", "F", "M", "F", "X", "F"]),
        ])
        .unwrap();

        let positions = Table::new(vec![
            Column::categorical(
                "name",
                ["Average Person", "Fast Group", "Average Person", "Fast Group", "Average Person", "Fast Group"],
            ),
            Column::numeric("time", [0.0, 0.0, 1.0, 1.0, 2.0, 2.0]),
            Column::numeric("position", [0.0, 0.0, 10.0, 20.0, 20.0, 20.0]),
            Column::numeric("count", [100.0, 10.0, 100.0, 10.0, 100.0, 10.0]),
            Column::categorical("gender", ["F", "M", "F", "M", "F", "M"]),
        ])
        .unwrap();

        Datasets::new(Arc::new(main), Arc::new(positions))
    }

    /// Owns everything a [`RenderContext`] borrows
    pub struct Harness {
        pub card_id: CardId,
        pub datasets: Datasets,
        pub filters: FilterGenerator,
        pub defaults: CardDefaults,
        pub theme: Theme,
    }

    impl Harness {
        pub fn new() -> Self {
            let datasets = datasets();
            Self {
                card_id: CardId::from("card-1"),
                filters: FilterGenerator::new(datasets.main.clone()),
                datasets,
                defaults: CardDefaults::default(),
                theme: Theme::Light,
            }
        }

        pub fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                card_id: &self.card_id,
                datasets: &self.datasets,
                filters: &self.filters,
                theme: self.theme,
                defaults: &self.defaults,
            }
        }
    }
}
