// HTTP request handlers
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::application::card_type::CardTypeInfo;
use crate::application::dashboard_service::Dispatched;
use crate::application::event_router::InputEvent;
use crate::application::patch_engine::Patch;
use crate::domain::card::{Card, CardId, GridPlacement};
use crate::domain::settings::Settings;
use crate::domain::theme::Theme;
use crate::domain::view::{CardView, EditorView};
use crate::infrastructure::config::DashboardSettings;
use crate::infrastructure::http_response::ApiResult;
use crate::presentation::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Serialize)]
pub struct CardWithView {
    pub card: Card,
    pub view: CardView,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub info: DashboardSettings,
    pub theme: Theme,
    pub cards: Vec<CardWithView>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
    pub patches: Vec<Patch>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Card types available in the "add card" menu
pub async fn list_card_types(State(state): State<Arc<AppState>>) -> Json<Vec<CardTypeInfo>> {
    Json(state.dashboard.list_types())
}

/// Every card with its placement and freshly rendered view
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let views = state.dashboard.render_grid();
    let cards = state
        .dashboard
        .cards()
        .into_iter()
        .filter_map(|card| {
            let view = views.iter().find(|v| v.card_id == card.id)?.clone();
            Some(CardWithView { card, view })
        })
        .collect();

    Json(DashboardResponse {
        info: state.info.clone(),
        theme: state.dashboard.theme(),
        cards,
    })
}

pub async fn create_card(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<CardWithView>)> {
    let (card, view) = state.dashboard.create_card(&request.type_name, request.settings)?;
    persist(&state).await;
    Ok((StatusCode::CREATED, Json(CardWithView { card, view })))
}

/// Removing a card that does not exist is not an error
pub async fn remove_card(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    if state.dashboard.remove_card(&CardId::from(id)) {
        persist(&state).await;
    }
    StatusCode::NO_CONTENT
}

pub async fn update_placement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(placement): Json<GridPlacement>,
) -> ApiResult<Json<GridPlacement>> {
    let placement = state.dashboard.update_placement(&CardId::from(id), placement)?;
    persist(&state).await;
    Ok(Json(placement))
}

pub async fn card_settings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<EditorView>> {
    Ok(Json(state.dashboard.render_settings(&CardId::from(id))?))
}

/// Dropped events still answer 200; the body says why they were dropped
pub async fn post_event(State(state): State<Arc<AppState>>, Json(event): Json<InputEvent>) -> Json<Dispatched> {
    let dispatched = state.dashboard.dispatch(event);
    if dispatched.view.is_some() {
        persist(&state).await;
    }
    Json(dispatched)
}

pub async fn set_theme(State(state): State<Arc<AppState>>, Json(request): Json<ThemeRequest>) -> Json<ThemeResponse> {
    let patches = state.dashboard.set_theme(request.theme);
    Json(ThemeResponse {
        theme: request.theme,
        patches,
    })
}

/// Layout persistence failures never fail the request that caused them
async fn persist(state: &AppState) {
    if let Err(e) = state.dashboard.persist_if_dirty().await {
        tracing::warn!("Failed to save layout: {}", e);
    }
}
