//! HTTP request handlers for the alert API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use nimbus_alerts::{AlertError, AlertSpec, AlertStore, AlertView};
use nimbus_weather::{CurrentConditions, ForecastProvider};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Query parameters for the current-weather endpoint.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// City to look up.
    pub city: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
}

/// Soft-delete confirmation.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Confirmation message.
    pub message: String,
}

/// Handle GET /health.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Handle POST /alerts - register a new alert.
pub async fn create_alert<G: ForecastProvider>(
    State(state): State<Arc<AppState<G>>>,
    Json(spec): Json<AlertSpec>,
) -> ApiResult<(StatusCode, Json<AlertView>)> {
    let alert = state.store().create(spec)?;
    let view = AlertView::project(&alert, Utc::now());
    Ok((StatusCode::CREATED, Json(view)))
}

/// Handle GET /alerts - list every active alert.
pub async fn list_alerts<G: ForecastProvider>(
    State(state): State<Arc<AppState<G>>>,
) -> ApiResult<Json<Vec<AlertView>>> {
    let now = Utc::now();
    let views = state
        .store()
        .find_active()
        .iter()
        .map(|alert| AlertView::project(alert, now))
        .collect();
    Ok(Json(views))
}

/// Handle GET /alerts/{id} - fetch one active alert.
pub async fn get_alert<G: ForecastProvider>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AlertView>> {
    let alert = state.store().find_active_by_id(id)?;
    Ok(Json(AlertView::project(&alert, Utc::now())))
}

/// Handle DELETE /alerts/{id} - soft-delete an alert.
pub async fn delete_alert<G: ForecastProvider>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    state.store().soft_delete(id)?;
    Ok(Json(DeleteResponse {
        message: "alert deleted".to_string(),
    }))
}

/// Handle GET /weather/current?city= - current conditions for a city.
pub async fn current_weather<G: ForecastProvider>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Json<CurrentConditions>> {
    if query.city.trim().is_empty() {
        return Err(ApiError(AlertError::Validation {
            reason: "city must not be empty".to_string(),
        }));
    }
    let conditions = state
        .gateway()
        .current_conditions(&query.city)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(conditions))
}
