use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{GoalResponse, UserProfile};
use super::goal::{energy_breakdown, goal_direction};
use crate::app::{bad_request, internal, no_profile};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(put_profile).delete(delete_profile))
        .route("/profile/goal", get(get_goal))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    let store = state.store.lock().await;
    store.profile().cloned().map(Json).ok_or_else(no_profile)
}

/// PUT /profile: replaces the profile and starts the journal over.
#[instrument(skip(state))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<GoalResponse>, (StatusCode, String)> {
    profile.validate().map_err(bad_request)?;
    let response = GoalResponse {
        breakdown: energy_breakdown(&profile),
        direction: goal_direction(&profile),
    };

    let mut store = state.store.lock().await;
    store.save_profile(profile).map_err(internal)?;
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn delete_profile(State(state): State<AppState>) -> Result<StatusCode, (StatusCode, String)> {
    let mut store = state.store.lock().await;
    store.reset_profile().map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
) -> Result<Json<GoalResponse>, (StatusCode, String)> {
    let store = state.store.lock().await;
    let profile = store.profile().ok_or_else(no_profile)?;
    Ok(Json(GoalResponse {
        breakdown: energy_breakdown(profile),
        direction: goal_direction(profile),
    }))
}
