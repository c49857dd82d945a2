// HTTP request handlers
use crate::application::dashboard_service::{DashboardView, SwitchOutcome};
use crate::domain::trend::{Axis, Interval};
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SwitchIntervalRequest {
    pub axis: Axis,
    pub interval: Interval,
}

#[derive(Debug, Serialize)]
pub struct SwitchIntervalResponse {
    pub outcome: Option<SwitchOutcome>,
    pub error: Option<String>,
    pub view: DashboardView,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current view-model
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.dashboard.view().await)
}

/// Switch the interval of one trend axis
pub async fn switch_interval(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SwitchIntervalRequest>,
) -> impl IntoResponse {
    let result = state
        .dashboard
        .switch_interval(request.axis, request.interval)
        .await;
    let view = state.dashboard.view().await;

    match result {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SwitchIntervalResponse {
                outcome: Some(outcome),
                error: None,
                view,
            }),
        ),
        Err(e) => {
            tracing::warn!("Interval switch to {} on {} failed: {}", request.interval, request.axis, e);
            // The previous series is still in `view`.
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(SwitchIntervalResponse {
                    outcome: None,
                    error: Some(e.to_string()),
                    view,
                }),
            )
        }
    }
}
