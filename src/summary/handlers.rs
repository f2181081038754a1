use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{WeekQuery, WeekResponse, WeightTrend};
use super::services::{weekly_window, weight_trend};
use crate::app::{bad_request, no_profile};
use crate::clock::{day_key, parse_day};
use crate::state::AppState;
use crate::validation::ValidationError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summary/week", get(get_week))
        .route("/weights/trend", get(get_weight_trend))
}

/// GET /summary/week?date=YYYY-MM-DD, the seven days ending at `date` (default today).
#[instrument(skip(state))]
pub async fn get_week(
    State(state): State<AppState>,
    Query(q): Query<WeekQuery>,
) -> Result<Json<WeekResponse>, (StatusCode, String)> {
    let requested = match q.date.as_deref() {
        Some(raw) => Some(
            parse_day(raw).ok_or_else(|| bad_request(ValidationError::InvalidDate { field: "date" }))?,
        ),
        None => None,
    };

    let store = state.store.lock().await;
    let reference = requested.unwrap_or_else(|| store.today());
    Ok(Json(WeekResponse {
        reference_date: day_key(reference),
        days: weekly_window(store.history(), reference),
    }))
}

#[instrument(skip(state))]
pub async fn get_weight_trend(
    State(state): State<AppState>,
) -> Result<Json<WeightTrend>, (StatusCode, String)> {
    let store = state.store.lock().await;
    let profile = store.profile().ok_or_else(no_profile)?;
    Ok(Json(weight_trend(profile, store.weights())))
}
