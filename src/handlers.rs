use crate::charts::{AxisUpdate, ChartPane};
use crate::errors::AppError;
use crate::models::{Entry, EntryForm, SaveMode};
use crate::state::{AppState, DashboardView};
use crate::ui::render_index;
use crate::window::{ParseWindowError, WindowSelector};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct WindowRequest {
    #[serde(default)]
    pub window: String,
}

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub mode: SaveMode,
    pub message: String,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.view()))
}

pub async fn get_view(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.view())
}

pub async fn select_window(
    State(state): State<AppState>,
    Json(payload): Json<WindowRequest>,
) -> Result<Json<DashboardView>, AppError> {
    apply_window(&state, &payload.window).await?;
    Ok(Json(state.view()))
}

pub async fn select_window_form(
    State(state): State<AppState>,
    Form(payload): Form<WindowRequest>,
) -> Result<Redirect, AppError> {
    apply_window(&state, &payload.window).await?;
    Ok(Redirect::to("/"))
}

/// Takes a chart library relayout event for `chart`. Events that do not
/// move the x-axis leave the view unchanged.
pub async fn relayout(
    State(state): State<AppState>,
    Path(chart): Path<String>,
    Json(update): Json<Value>,
) -> Result<Json<DashboardView>, AppError> {
    let pane = state
        .pane(&chart)
        .ok_or_else(|| AppError::not_found(format!("unknown chart {chart}")))?;

    let Some(update) = AxisUpdate::from_relayout(&update) else {
        debug!(%chart, "relayout without an x-axis change");
        return Ok(Json(state.view()));
    };

    if let Err(err) = pane.relayout(&update) {
        warn!(%chart, %err, "failed to record relayout on its own chart");
    }
    state.session.handle_relayout(pane.id(), update).await;
    Ok(Json(state.view()))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<Option<Entry>>, AppError> {
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("Invalid date format, expected YYYY-MM-DD"))?;
    let entry = state.session.load_entry(date).await?;
    Ok(Json(entry))
}

pub async fn save_entry(
    State(state): State<AppState>,
    Json(form): Json<EntryForm>,
) -> Result<Json<SaveResponse>, AppError> {
    let payload = form
        .into_payload()
        .ok_or_else(|| AppError::bad_request("Invalid date format, expected YYYY-MM-DD"))?;
    let mode = state.session.save_entry(&payload).await?;
    Ok(Json(SaveResponse {
        mode,
        message: mode.message().to_owned(),
    }))
}

async fn apply_window(state: &AppState, raw: &str) -> Result<(), AppError> {
    let window: WindowSelector = raw
        .parse()
        .map_err(|err: ParseWindowError| AppError::bad_request(err.to_string()))?;
    state.session.select_window(window).await;
    Ok(())
}
