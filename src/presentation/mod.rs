// Presentation layer - HTTP surface over the dashboard service
pub mod app_state;
pub mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    card_settings, create_card, get_dashboard, health_check, list_card_types, post_event, remove_card, set_theme,
    update_placement,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/card-types", get(list_card_types))
        .route("/dashboard", get(get_dashboard))
        .route("/cards", post(create_card))
        .route("/cards/:id", delete(remove_card))
        .route("/cards/:id/placement", put(update_placement))
        .route("/cards/:id/settings", get(card_settings))
        .route("/events", post(post_event))
        .route("/theme", put(set_theme))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
