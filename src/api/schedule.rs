//! Schedule query endpoints.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;

use crate::error::{AppError, AppResult};
use crate::models::{Schedule, Window};
use crate::AppState;

/// `GET /schedule`: one schedule per configured label.
pub async fn all_labels(State(state): State<AppState>) -> AppResult<Json<Vec<Schedule>>> {
    run_query(state, Vec::new()).await
}

/// `GET /schedule/{label}`: zero or one schedule for the label.
pub async fn by_label(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> AppResult<Json<Vec<Schedule>>> {
    run_query(state, vec![label]).await
}

/// `GET /active_hours`: the synthetic active-hours window, where supported.
pub async fn active_hours(State(state): State<AppState>) -> AppResult<Json<Window>> {
    let scheduler = state.scheduler.clone();
    let window = tokio::task::spawn_blocking(move || scheduler.active_hours_window(Local::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::ActiveHours(e.to_string()))?;
    Ok(Json(window))
}

/// File reads and the activation search are blocking, so each query runs on
/// its own blocking task.
async fn run_query(state: AppState, labels: Vec<String>) -> AppResult<Json<Vec<Schedule>>> {
    let scheduler = state.scheduler.clone();
    let schedules = tokio::task::spawn_blocking(move || scheduler.schedule(&labels, Local::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(Json(schedules))
}
