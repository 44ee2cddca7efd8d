//! End-to-end scenarios through the dashboard service
//!
//! These tests drive the service the way the HTTP surface does:
//! - Creating cards with default settings
//! - Regenerating a dependent filter when its column changes
//! - Edits racing with the removal of their card
//! - Theme switches patching every rendered chart

mod common;

use card_canvas::application::event_router::{InputEvent, RegionUpdate, Routed};
use card_canvas::domain::event_key::StructuralKey;
use card_canvas::domain::settings::{SettingValue, Settings};
use card_canvas::domain::theme::Theme;
use card_canvas::domain::view::{CardBody, Control, Trace};
use common::builders::ServiceBuilder;
use common::figure;

#[test]
fn test_histogram_renders_with_defaults() {
    let service = ServiceBuilder::new().build();
    let (card, view) = service.create_card("histogram", Settings::new()).unwrap();

    assert_eq!(view.card_id, card.id);
    assert_eq!(view.title, "Histogram");
    assert_eq!(view.subtitle, "Histogram of overallTimeMinutes");
    let figure = figure(&view);
    assert_eq!(figure.key, StructuralKey::chart(&card.id));
    assert_eq!(figure.layout.template.name, "mantine_light");
    match &figure.traces[..] {
        [Trace::Histogram { counts, .. }] => {
            assert_eq!(counts.len(), 20);
            assert_eq!(counts.iter().sum::<u64>(), 8);
        }
        other => panic!("unexpected traces {other:?}"),
    }
}

#[test]
fn test_histogram_bins_follow_configuration() {
    let service = ServiceBuilder::new().histogram_bins(8).build();
    let (_, view) = service.create_card("histogram", Settings::new()).unwrap();
    match &figure(&view).traces[0] {
        Trace::Histogram { counts, .. } => assert_eq!(counts.len(), 8),
        other => panic!("unexpected trace {other:?}"),
    }
}

#[test]
fn test_filter_regenerates_when_column_changes() {
    let service = ServiceBuilder::new().build();
    let (card, _) = service.create_card("heatmap", Settings::new()).unwrap();

    // numeric default column gets a range filter
    let editor = service.render_settings(&card.id).unwrap();
    let filter_key = StructuralKey::settings_field(&card.id, "x-filter");
    match Control::find(&editor.controls, &filter_key) {
        Some(Control::RangeSlider { min, max, min_range, value, .. }) => {
            assert_eq!((*min, *max), (4.3, 7.8));
            assert!((min_range - 0.035).abs() < 1e-9);
            assert_eq!(*value, [4.3, 7.8]);
        }
        other => panic!("unexpected control {other:?}"),
    }

    // narrow the range, then switch the axis to a categorical column
    let narrowed = service.dispatch(InputEvent::new(&filter_key, SettingValue::Range([5.0, 7.0])));
    assert!(matches!(narrowed.routed, Routed::Applied(_)));

    let x_key = StructuralKey::settings_field(&card.id, "x");
    let dispatched = service.dispatch(InputEvent::new(&x_key, "gender"));
    let Routed::Applied(outcome) = dispatched.routed else {
        panic!("column change was dropped");
    };

    match &outcome.regions[..] {
        [RegionUpdate::ReplaceContainer { id, children }] => {
            assert_eq!(id, &StructuralKey::filter_container(&card.id, "x-filter"));
            match &children[..] {
                [Control::CheckboxGroup { id, options, value, .. }] => {
                    assert_eq!(id, &filter_key);
                    assert_eq!(options, &["F", "M", "X"]);
                    assert_eq!(value, options);
                }
                other => panic!("unexpected children {other:?}"),
            }
        }
        other => panic!("unexpected regions {other:?}"),
    }

    // the old range no longer applies to the new column
    let card = service.card(&card.id).unwrap();
    assert!(!card.settings.contains_key("x-filter"));
    assert_eq!(card.settings.str_or("x", ""), "gender");
    assert_eq!(outcome.revision, card.revision);
    assert!(matches!(dispatched.view.map(|v| v.body), Some(CardBody::Chart(_))));
}

#[test]
fn test_unchanged_column_keeps_filter() {
    let service = ServiceBuilder::new().build();
    let (card, _) = service.create_card("heatmap", Settings::new().with("y", "ageBand")).unwrap();

    let selection = SettingValue::Labels(vec!["20-29".to_string()]);
    service.dispatch(InputEvent::new(&StructuralKey::settings_field(&card.id, "y-filter"), selection.clone()));

    let same = service.dispatch(InputEvent::new(&StructuralKey::settings_field(&card.id, "y"), "ageBand"));
    match same.routed {
        Routed::Applied(outcome) => assert!(outcome.regions.is_empty()),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(service.card(&card.id).unwrap().settings.get("y-filter"), Some(&selection));
}

#[test]
fn test_highlight_choices_follow_column() {
    let service = ServiceBuilder::new().build();
    let (card, _) = service.create_card("highlight", Settings::new()).unwrap();

    service.dispatch(InputEvent::new(&StructuralKey::settings_field(&card.id, "column-filter"), "F"));
    let dispatched = service.dispatch(InputEvent::new(&StructuralKey::settings_field(&card.id, "column"), "ageBand"));

    let Routed::Applied(outcome) = dispatched.routed else {
        panic!("column change was dropped");
    };
    match &outcome.regions[..] {
        [RegionUpdate::ReplaceOptions { options, .. }] => {
            assert_eq!(options, &["30-39", "20-29", "40-49", "50-59"]);
        }
        other => panic!("unexpected regions {other:?}"),
    }
    // count over every age band once the stale gender filter is gone
    match dispatched.view.map(|v| v.body) {
        Some(CardBody::Highlight { value, .. }) => assert_eq!(value, "7"),
        other => panic!("unexpected body {other:?}"),
    }
}

#[test]
fn test_edit_for_removed_card_is_dropped() {
    let service = ServiceBuilder::new().build();
    let (removed, _) = service.create_card("histogram", Settings::new()).unwrap();
    let (kept, _) = service.create_card("violin", Settings::new()).unwrap();

    assert!(service.remove_card(&removed.id));
    let dispatched = service.dispatch(InputEvent::new(&StructuralKey::settings_field(&removed.id, "bins"), 5.0));

    match dispatched.routed {
        Routed::Dropped { reason, .. } => assert!(reason.contains("unknown card")),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(dispatched.view.is_none());
    assert!(service.retained_view(&removed.id).is_none());
    assert_eq!(service.card(&kept.id).unwrap().revision, 0);
    assert_eq!(service.live_chart_keys(), vec![StructuralKey::chart(&kept.id)]);
    // removing twice is harmless
    assert!(!service.remove_card(&removed.id));
}

#[test]
fn test_malformed_event_key_is_dropped() {
    let service = ServiceBuilder::new().build();
    let dispatched = service.dispatch(InputEvent {
        id: "not-a-key".to_string(),
        value: SettingValue::Null,
    });
    assert!(matches!(dispatched.routed, Routed::Dropped { .. }));
}

#[test]
fn test_failing_card_does_not_break_grid() {
    let service = ServiceBuilder::new().build();
    let (broken, view) = service
        .create_card("highlight", Settings::new().with("aggregation", "mean"))
        .unwrap();
    assert!(matches!(view.body, CardBody::Error { .. }));
    service.create_card("violin", Settings::new()).unwrap();

    let grid = service.render_grid();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[0].card_id, broken.id);
    assert!(matches!(grid[1].body, CardBody::Chart(_)));
}

#[test]
fn test_theme_switch_patches_every_chart() {
    let service = ServiceBuilder::new().build();
    let mut chart_ids = Vec::new();
    for type_name in ["racing", "histogram", "heatmap", "violin", "histogram"] {
        let (card, _) = service.create_card(type_name, Settings::new()).unwrap();
        chart_ids.push(card.id);
    }
    let (highlight, _) = service.create_card("highlight", Settings::new()).unwrap();
    let before: Vec<_> = chart_ids.iter().map(|id| service.retained_view(id).unwrap()).collect();

    let patches = service.set_theme(Theme::Dark);

    let targets: Vec<_> = patches.iter().map(|p| p.target.clone()).collect();
    let expected: Vec<_> = chart_ids.iter().map(StructuralKey::chart).collect();
    assert_eq!(targets, expected);
    assert_eq!(service.theme(), Theme::Dark);

    for (id, before) in chart_ids.iter().zip(before) {
        let mut after = service.retained_view(id).unwrap();
        assert_eq!(figure(&after).layout.template.name, "mantine_dark");

        // nothing but the template changed
        let figure = after.figure_mut().unwrap();
        figure.layout.template = Theme::Light.template();
        assert_eq!(after, before);
    }

    // applying a patch twice changes nothing more
    let mut view = service.retained_view(&chart_ids[0]).unwrap();
    let once = view.clone();
    assert!(patches[0].apply(view.figure_mut().unwrap()));
    assert_eq!(view, once);

    assert!(matches!(
        service.retained_view(&highlight.id).map(|v| v.body),
        Some(CardBody::Highlight { .. })
    ));
}

#[test]
fn test_cards_rendered_after_theme_switch_use_new_template() {
    let service = ServiceBuilder::new().build();
    service.set_theme(Theme::Dark);
    let (_, view) = service.create_card("violin", Settings::new()).unwrap();
    assert_eq!(figure(&view).layout.template.name, "mantine_dark");
}

#[test]
fn test_huge_bin_count_still_renders_grid() {
    let service = ServiceBuilder::new().build();
    let (histogram, _) = service.create_card("histogram", Settings::new()).unwrap();
    let (heatmap, _) = service.create_card("heatmap", Settings::new()).unwrap();
    service.create_card("violin", Settings::new()).unwrap();

    service.dispatch(InputEvent::new(&StructuralKey::settings_field(&histogram.id, "bins"), 1e300));
    service.dispatch(InputEvent::new(&StructuralKey::settings_field(&heatmap.id, "nbinsx"), 1e300));

    let grid = service.render_grid();
    assert_eq!(grid.len(), 3);
    match &figure(&grid[0]).traces[..] {
        [Trace::Histogram { counts, .. }] => {
            assert_eq!(counts.len(), card_canvas::cards::MAX_BINS);
            assert_eq!(counts.iter().sum::<u64>(), 8);
        }
        other => panic!("unexpected traces {other:?}"),
    }
    assert!(matches!(grid[1].body, CardBody::Chart(_)));
}
