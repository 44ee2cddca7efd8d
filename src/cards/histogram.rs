// Histogram card - binned distribution of one numeric column
use indexmap::IndexMap;

use super::{Bins, MAX_BINS, bin_count, chart_view, text_controls};
use crate::application::card_type::{CardRenderer, RenderContext};
use crate::domain::dataset::ColumnKind;
use crate::domain::settings::Settings;
use crate::domain::view::{CardView, Control, EditorView, FigureLayout, Trace};
use crate::error::{DashboardError, Result};

const DEFAULT_COLUMN: &str = "overallTimeMinutes";

pub struct HistogramCard;

impl CardRenderer for HistogramCard {
    fn render(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<CardView> {
        let column_name = settings.str_or("column", DEFAULT_COLUMN);
        let color = settings.opt_str("color");
        let bins = bin_count(settings, "bins", ctx.defaults.histogram_bins);

        let data = &ctx.datasets.main;
        let column = data.require(column_name)?;
        if column.kind != ColumnKind::Numeric {
            return Err(DashboardError::Render(format!(
                "histogram needs a numeric column, {column_name} is categorical"
            )));
        }
        let color_column = color.map(|c| data.require(c)).transpose()?;

        // one group per color label, in order of first appearance
        let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
        for (row, value) in column.values.iter().enumerate() {
            let Some(x) = value.as_f64() else { continue };
            let group = match color_column {
                Some(c) => match c.values.get(row) {
                    Some(label) if !label.is_missing() => label.label(),
                    _ => continue,
                },
                None => column_name.to_string(),
            };
            groups.entry(group).or_default().push(x);
        }

        let traces = match Bins::spanning(groups.values().flatten().copied(), bins) {
            Some(bins) => groups
                .into_iter()
                .map(|(name, values)| {
                    let mut counts = vec![0u64; bins.count];
                    for v in values {
                        counts[bins.index(v)] += 1;
                    }
                    Trace::Histogram {
                        name,
                        edges: bins.edges(),
                        counts,
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let subtitle = match color {
            Some(color) => format!("Histogram of {column_name} coloured by {color}"),
            None => format!("Histogram of {column_name}"),
        };
        Ok(chart_view(
            ctx,
            settings.str_or("title", "Histogram"),
            settings.str_or("description", &subtitle),
            traces,
            FigureLayout::new(ctx.theme.template()).titled(column_name, "count"),
        ))
    }

    fn render_settings(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<EditorView> {
        let id = ctx.card_id;
        let data = &ctx.datasets.main;
        let bins = bin_count(settings, "bins", ctx.defaults.histogram_bins);

        let mut controls = vec![
            Control::select(
                id,
                "column",
                "Column",
                Some(settings.str_or("column", DEFAULT_COLUMN)),
                data.column_names_of(ColumnKind::Numeric),
            ),
            Control::select(
                id,
                "color",
                "Color",
                settings.opt_str("color"),
                data.column_names_of(ColumnKind::Categorical),
            ),
            Control::number_input(id, "bins", "Bins", bins as f64, 1.0, MAX_BINS as f64),
        ];
        controls.extend(text_controls(id, settings, "Histogram", "Histogram description"));

        Ok(EditorView {
            card_id: id.clone(),
            controls,
        })
    }
}
