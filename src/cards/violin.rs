// Violin card - distribution of a numeric column per category
use indexmap::IndexMap;

use super::{chart_view, summarize, text_controls};
use crate::application::card_type::{CardRenderer, RenderContext};
use crate::domain::dataset::ColumnKind;
use crate::domain::settings::Settings;
use crate::domain::view::{CardView, Control, EditorView, FigureLayout, Trace};
use crate::error::{DashboardError, Result};

const DEFAULT_X: &str = "ageBand";
const DEFAULT_Y: &str = "overallTimeMinutes";

pub struct ViolinCard;

impl CardRenderer for ViolinCard {
    fn render(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<CardView> {
        let x = settings.str_or("x", DEFAULT_X);
        let y = settings.str_or("y", DEFAULT_Y);

        let data = &ctx.datasets.main;
        let x_column = data.require(x)?;
        let y_column = data.require(y)?;
        if y_column.kind != ColumnKind::Numeric {
            return Err(DashboardError::Render(format!("violin needs a numeric y column, {y} is categorical")));
        }

        // categories keep the order they first appear in
        let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
        for (category, value) in x_column.values.iter().zip(&y_column.values) {
            if category.is_missing() {
                continue;
            }
            if let Some(v) = value.as_f64() {
                groups.entry(category.label()).or_default().push(v);
            }
        }

        let category_order: Vec<String> = groups.keys().cloned().collect();
        let traces = groups
            .into_iter()
            .filter_map(|(name, mut values)| {
                summarize(&mut values).map(|summary| Trace::Violin { name, summary })
            })
            .collect();

        let mut layout = FigureLayout::new(ctx.theme.template()).titled(x, y);
        layout.category_order = Some(category_order);

        let subtitle = format!("Violin plot of {y} by {x}");
        Ok(chart_view(
            ctx,
            settings.str_or("title", "Violin plot"),
            settings.str_or("description", &subtitle),
            traces,
            layout,
        ))
    }

    fn render_settings(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<EditorView> {
        let id = ctx.card_id;
        let data = &ctx.datasets.main;

        let mut controls = vec![
            Control::select(id, "x", "X", Some(settings.str_or("x", DEFAULT_X)), data.column_names()),
            Control::select(
                id,
                "y",
                "Y",
                Some(settings.str_or("y", DEFAULT_Y)),
                data.column_names_of(ColumnKind::Numeric),
            ),
        ];
        controls.extend(text_controls(id, settings, "Violin plot", "Violin plot description"));

        Ok(EditorView {
            card_id: id.clone(),
            controls,
        })
    }
}
