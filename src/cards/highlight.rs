// Highlight card - one aggregated statistic of a column
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::format_number;
use crate::application::card_type::{CardRenderer, DependentRegion, RenderContext};
use crate::domain::dataset::{ColumnKind, Value};
use crate::domain::settings::Settings;
use crate::domain::view::{CardBody, CardView, Control, EditorView};
use crate::error::{DashboardError, Result};

const DEFAULT_COLUMN: &str = "gender";
const DEFAULT_SUFFIX: &str = "Number of participants";
const DEFAULT_ICON: &str = "mdi:star";
const ICON_LIST: &str = "https://icon-sets.iconify.design/mdi/?keyword=mdi";

static DEPENDENTS: [DependentRegion; 1] = [DependentRegion::Choices {
    governing: "column",
    field: "column-filter",
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Count,
    Mean,
    Sum,
    Min,
    Max,
}

impl Aggregation {
    const ALL: [Aggregation; 5] = [
        Aggregation::Count,
        Aggregation::Mean,
        Aggregation::Sum,
        Aggregation::Min,
        Aggregation::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Count => "count",
            Aggregation::Mean => "mean",
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// Aggregate the non-missing `values` of a column of `kind`
    pub fn apply(self, kind: ColumnKind, values: &[&Value]) -> Result<String> {
        if self == Aggregation::Count {
            return Ok(values.len().to_string());
        }

        if kind == ColumnKind::Categorical {
            let pick = match self {
                Aggregation::Min => Ordering::Less,
                Aggregation::Max => Ordering::Greater,
                _ => {
                    return Err(DashboardError::Render(format!(
                        "cannot compute {} of a categorical column",
                        self.as_str()
                    )));
                }
            };
            let best = values
                .iter()
                .copied()
                .reduce(|best, v| if v.total_cmp(best) == pick { v } else { best });
            return Ok(best.map(Value::label).unwrap_or_else(|| "-".to_string()));
        }

        let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
        let result = match self {
            Aggregation::Sum => Some(numbers.iter().sum()),
            Aggregation::Mean if !numbers.is_empty() => {
                Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
            Aggregation::Min => numbers.iter().copied().reduce(f64::min),
            Aggregation::Max => numbers.iter().copied().reduce(f64::max),
            _ => None,
        };
        Ok(result.map(format_number).unwrap_or_else(|| "-".to_string()))
    }
}

pub struct HighlightCard;

impl CardRenderer for HighlightCard {
    fn render(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<CardView> {
        let column_name = settings.str_or("column", DEFAULT_COLUMN);
        let aggregation = Aggregation::parse(settings.str_or("aggregation", "count")).unwrap_or(Aggregation::Count);
        let filter = settings.opt_str("column-filter");

        let column = ctx.datasets.main.require(column_name)?;
        let values: Vec<&Value> = column
            .values
            .iter()
            .filter(|v| !v.is_missing())
            .filter(|v| filter.is_none_or(|f| v.label() == f))
            .collect();
        let value = aggregation.apply(column.kind, &values)?;

        let suffix = settings.str_or("suffix", DEFAULT_SUFFIX);
        Ok(CardView {
            card_id: ctx.card_id.clone(),
            title: suffix.to_string(),
            subtitle: String::new(),
            body: CardBody::Highlight {
                value,
                caption: suffix.to_string(),
                icon: settings.str_or("icon", DEFAULT_ICON).to_string(),
            },
        })
    }

    fn render_settings(&self, ctx: &RenderContext<'_>, settings: &Settings) -> Result<EditorView> {
        let id = ctx.card_id;
        let data = &ctx.datasets.main;
        let column_name = settings.str_or("column", DEFAULT_COLUMN);
        let filter_options = data
            .unique_values(column_name)
            .unwrap_or_default()
            .iter()
            .map(Value::label)
            .collect();

        let controls = vec![
            Control::select(id, "column", "Column", Some(column_name), data.column_names()),
            Control::select(
                id,
                "column-filter",
                "Column Filter",
                settings.opt_str("column-filter"),
                filter_options,
            ),
            Control::select(
                id,
                "aggregation",
                "Aggregation",
                Some(settings.str_or("aggregation", "count")),
                Aggregation::ALL.iter().map(|a| a.as_str().to_string()).collect(),
            ),
            Control::text_input(id, "suffix", "Suffix", settings.str_or("suffix", DEFAULT_SUFFIX)),
            Control::text_input(id, "icon", "Icon", settings.str_or("icon", DEFAULT_ICON)),
            Control::Link {
                text: "Icon list".to_string(),
                href: ICON_LIST.to_string(),
            },
        ];

        Ok(EditorView {
            card_id: id.clone(),
            controls,
        })
    }

    fn dependents(&self) -> &'static [DependentRegion] {
        &DEPENDENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::fixtures::Harness;

    fn highlight(harness: &Harness, settings: &Settings) -> String {
        match HighlightCard.render(&harness.ctx(), settings).unwrap().body {
            CardBody::Highlight { value, .. } => value,
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_defaults_count_participants() {
        let harness = Harness::new();
        assert_eq!(highlight(&harness, &Settings::new()), "6");
    }

    #[test]
    fn test_equality_filter() {
        let harness = Harness::new();
        let settings = Settings::new().with("column-filter", "F");
        assert_eq!(highlight(&harness, &settings), "3");
    }

    #[test]
    fn test_numeric_aggregations_round_to_two_decimals() {
        let harness = Harness::new();
        let mean = Settings::new().with("column", "minutesPerKM").with("aggregation", "mean");
        // (4.3 + 5.7 + 7.1 + 5.0 + 6.4 + 7.8) / 6 = 6.05
        assert_eq!(highlight(&harness, &mean), "6.05");

        let max = Settings::new().with("column", "overallTimeMinutes").with("aggregation", "max");
        assert_eq!(highlight(&harness, &max), "330");
    }

    #[test]
    fn test_categorical_min_and_mean() {
        let harness = Harness::new();
        let min = Settings::new().with("aggregation", "min");
        assert_eq!(highlight(&harness, &min), "F");

        let mean = Settings::new().with("aggregation", "mean");
        assert!(HighlightCard.render(&harness.ctx(), &mean).is_err());
    }

    #[test]
    fn test_filter_options_follow_column() {
        let harness = Harness::new();
        let settings = Settings::new().with("column", "ageBand");
        let editor = HighlightCard.render_settings(&harness.ctx(), &settings).unwrap();
        match &editor.controls[1] {
            Control::Select { options, .. } => assert_eq!(options, &["30-39", "20-29", "40-49"]),
            other => panic!("unexpected control {other:?}"),
        }
    }
}
