//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use card_canvas::domain::view::{CardView, ChartFigure};

/// The chart inside a view, panicking with the view when there is none
pub fn figure(view: &CardView) -> &ChartFigure {
    match view.figure() {
        Some(figure) => figure,
        None => panic!("expected a chart, got {view:?}"),
    }
}
