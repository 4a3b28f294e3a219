use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/window", post(handlers::select_window_form))
        .route("/api/view", get(handlers::get_view))
        .route("/api/window", post(handlers::select_window))
        .route("/api/charts/:chart/relayout", post(handlers::relayout))
        .route("/api/entry", get(handlers::get_entry).post(handlers::save_entry))
        .with_state(state)
}
