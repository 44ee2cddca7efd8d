// Heatmap card - two-dimensional counts with per-axis filters
use crate::application::card_type::{CardRenderer, DependentRegion, RenderContext};
use crate::application::filter_generator::passes_filter;
use crate::domain::dataset::{Column, ColumnKind, Value};
use crate::domain::event_key::StructuralKey;
use crate::domain::filter::filter_field;
use crate::domain::settings::Settings;
use crate::domain::view::{CardView, Control, EditorView, FigureLayout, Trace};
use crate::error::Result;

use super::{Bins, MAX_BINS, bin_count, chart_view, text_controls};

const DEFAULT_X: &str = "minutesPerKM";
const DEFAULT_Y: &str = "ageBand";
const MIN_BINS: f64 = 5.0;

static DEPENDENTS: [DependentRegion; 2] = [
    DependentRegion::Filter { governing: "x" },
    DependentRegion::Filter { governing: "y" },
];

pub struct HeatmapCard;

/// How one heatmap axis maps values to cells
enum Axis {
    Categories(Vec<String>),
    Binned(Bins),
}

impl Axis {
    fn build(kind: ColumnKind, values: &[&Value], bins: usize) -> Self {
        match kind {
            ColumnKind::Categorical => {
                let mut labels: Vec<String> = values.iter().map(|v| v.label()).collect();
                labels.sort();
                labels.dedup();
                Axis::Categories(labels)
            }
            ColumnKind::Numeric => match Bins::spanning(values.iter().filter_map(|v| v.as_f64()), bins) {
                Some(bins) => Axis::Binned(bins),
                None => Axis::Categories(Vec::new()),
            },
        }
    }

    fn labels(&self) -> Vec<String> {
        match self {
            Axis::Categories(labels) => labels.clone(),
            Axis::Binned(bins) => bins.labels(),
        }
    }

    fn index(&self, value: &Value) -> Option<usize> {
        match self {
            Axis::Categories(labels) => {
                let label = value.label();
                labels.binary_search(&label).ok()
            }
            Axis::Binned(bins) => value.as_f64().map(|v| bins.index(v)),
        }
    }
}

impl CardRenderer for HeatmapCard {
    fn render(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<CardView> {
        let x = settings.str_or("x", DEFAULT_X);
        let y = settings.str_or("y", DEFAULT_Y);
        let nbinsx = bin_count(settings, "nbinsx", ctx.defaults.heatmap_bins);
        let nbinsy = bin_count(settings, "nbinsy", ctx.defaults.heatmap_bins);

        let data = &ctx.datasets.main;
        let x_column = data.require(x)?;
        let y_column = data.require(y)?;

        let rows = filtered_rows(x_column, y_column, settings);
        let xs: Vec<&Value> = rows.iter().map(|(xv, _)| *xv).collect();
        let ys: Vec<&Value> = rows.iter().map(|(_, yv)| *yv).collect();
        let x_axis = Axis::build(x_column.kind, &xs, nbinsx);
        let y_axis = Axis::build(y_column.kind, &ys, nbinsy);

        let x_labels = x_axis.labels();
        let y_labels = y_axis.labels();
        let mut z = vec![vec![0u64; x_labels.len()]; y_labels.len()];
        for (xv, yv) in &rows {
            if let (Some(col), Some(row)) = (x_axis.index(xv), y_axis.index(yv)) {
                z[row][col] += 1;
            }
        }

        let subtitle = format!("Heatmap of {x} vs {y}");
        Ok(chart_view(
            ctx,
            settings.str_or("title", "Heatmap"),
            settings.str_or("description", &subtitle),
            vec![Trace::Heatmap { x_labels, y_labels, z }],
            FigureLayout::new(ctx.theme.template()).titled(x, y),
        ))
    }

    fn render_settings(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<EditorView> {
        let id = ctx.card_id;
        let columns = ctx.datasets.main.column_names();
        let x = settings.str_or("x", DEFAULT_X);
        let y = settings.str_or("y", DEFAULT_Y);

        let filter_container = |field: &str, column: &str| {
            let key = filter_field(field);
            let outcome = ctx.filters.for_column(
                column,
                StructuralKey::settings_field(id, key.clone()),
                settings.get(&key),
            );
            Control::Container {
                id: StructuralKey::filter_container(id, key),
                children: Control::filter_children(&outcome),
            }
        };

        let mut controls = vec![
            Control::select(id, "x", "X", Some(x), columns.clone()),
            filter_container("x", x),
            Control::select(id, "y", "Y", Some(y), columns),
            filter_container("y", y),
            Control::number_input(
                id,
                "nbinsx",
                "Number of bins in x direction",
                bin_count(settings, "nbinsx", ctx.defaults.heatmap_bins) as f64,
                MIN_BINS,
                MAX_BINS as f64,
            ),
            Control::number_input(
                id,
                "nbinsy",
                "Number of bins in y direction",
                bin_count(settings, "nbinsy", ctx.defaults.heatmap_bins) as f64,
                MIN_BINS,
                MAX_BINS as f64,
            ),
        ];
        controls.extend(text_controls(id, settings, "Heatmap", "Heatmap description"));

        Ok(EditorView {
            card_id: id.clone(),
            controls,
        })
    }

    fn dependents(&self) -> &'static [DependentRegion] {
        &DEPENDENTS
    }
}

/// Row pairs with both values present and passing both axis filters
fn filtered_rows<'a>(x: &'a Column, y: &'a Column, settings: &Settings) -> Vec<(&'a Value, &'a Value)> {
    let x_filter = settings.get("x-filter");
    let y_filter = settings.get("y-filter");
    x.values
        .iter()
        .zip(&y.values)
        .filter(|(xv, yv)| !xv.is_missing() && !yv.is_missing())
        .filter(|(xv, yv)| passes_filter(x.kind, x_filter, xv) && passes_filter(y.kind, y_filter, yv))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::fixtures::Harness;
    use crate::domain::settings::SettingValue;

    fn heatmap(view: &CardView) -> (&[String], &[String], &[Vec<u64>]) {
        match &view.figure().unwrap().traces[0] {
            Trace::Heatmap { x_labels, y_labels, z } => (x_labels.as_slice(), y_labels.as_slice(), z.as_slice()),
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn test_defaults_without_settings() {
        let harness = Harness::new();
        let view = HeatmapCard.render(&harness.ctx(), &Settings::new()).unwrap();
        let (x_labels, y_labels, z) = heatmap(&view);

        assert_eq!(x_labels.len(), 20);
        assert_eq!(y_labels, ["20-29", "30-39", "40-49"]);
        // the row with a missing age band is dropped
        assert_eq!(z.iter().flatten().sum::<u64>(), 5);
        assert_eq!(view.subtitle, "Heatmap of minutesPerKM vs ageBand");
    }

    #[test]
    fn test_filters_apply_before_counting() {
        let harness = Harness::new();
        let settings = Settings::new()
            .with("x-filter", SettingValue::Range([5.0, 7.5]))
            .with("y-filter", vec!["20-29".to_string(), "40-49".to_string()]);
        let view = HeatmapCard.render(&harness.ctx(), &settings).unwrap();
        let (_, y_labels, z) = heatmap(&view);

        // 5.7 (20-29) and 6.4 (40-49) pass; 7.1 and 7.8 fail one filter each
        assert_eq!(z.iter().flatten().sum::<u64>(), 2);
        assert_eq!(y_labels, ["20-29", "40-49"]);
    }

    #[test]
    fn test_stale_filter_shape_is_ignored() {
        let harness = Harness::new();
        // a label selection left over on a numeric axis filters nothing
        let settings = Settings::new().with("x-filter", vec!["M".to_string()]);
        let view = HeatmapCard.render(&harness.ctx(), &settings).unwrap();
        let (_, _, z) = heatmap(&view);
        assert_eq!(z.iter().flatten().sum::<u64>(), 5);
    }

    #[test]
    fn test_editor_has_filter_containers() {
        let harness = Harness::new();
        let editor = HeatmapCard.render_settings(&harness.ctx(), &Settings::new()).unwrap();

        let x_container = StructuralKey::filter_container(&harness.card_id, "x-filter");
        match Control::find(&editor.controls, &x_container) {
            Some(Control::Container { children, .. }) => {
                assert!(matches!(children[0], Control::RangeSlider { min, max, .. } if min == 4.3 && max == 7.8));
            }
            other => panic!("unexpected control {other:?}"),
        }

        let y_filter = StructuralKey::settings_field(&harness.card_id, "y-filter");
        match Control::find(&editor.controls, &y_filter) {
            Some(Control::CheckboxGroup { value, .. }) => assert_eq!(value, &["20-29", "30-39", "40-49"]),
            other => panic!("unexpected control {other:?}"),
        }
    }

    #[test]
    fn test_declares_filter_dependents() {
        let governing: Vec<_> = HeatmapCard.dependents().iter().map(|d| d.governing()).collect();
        assert_eq!(governing, ["x", "y"]);
    }
}
