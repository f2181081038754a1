use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{
    AddMealRequest, AddWeightRequest, DailyLog, DeleteMealResponse, MealEntry, MealSlot,
    TodayResponse, UpdateGoalRequest, WeightEntry,
};
use crate::app::{bad_request, internal, no_profile};
use crate::state::AppState;
use crate::summary::services::daily_summary;
use crate::validation;

// --- public routers ---

pub fn journal_routes() -> Router<AppState> {
    Router::new()
        .route("/journal/today", get(get_today))
        .route("/journal/history", get(get_history))
        .route("/journal/meals", post(add_meal))
        .route("/journal/meals/:slot/:id", delete(delete_meal))
        .route("/journal/goal", put(update_goal))
}

pub fn weight_routes() -> Router<AppState> {
    Router::new().route("/weights", get(list_weights).post(add_weight))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn get_today(
    State(state): State<AppState>,
) -> Result<Json<TodayResponse>, (StatusCode, String)> {
    let store = state.store.lock().await;
    let (log, persisted) = store.today_log().ok_or_else(no_profile)?;
    let summary = daily_summary(&log);
    Ok(Json(TodayResponse {
        log,
        persisted,
        summary,
    }))
}

#[instrument(skip(state))]
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<DailyLog>> {
    Json(state.store.lock().await.history().to_vec())
}

#[instrument(skip(state))]
pub async fn add_meal(
    State(state): State<AppState>,
    Json(req): Json<AddMealRequest>,
) -> Result<(StatusCode, Json<MealEntry>), (StatusCode, String)> {
    let calories = validation::meal_calories("calories", req.calories).map_err(bad_request)?;
    let dish_name = validation::non_empty("dishName", &req.dish_name).map_err(bad_request)?;

    let mut store = state.store.lock().await;
    let entry = store
        .add_meal(calories, req.slot, dish_name)
        .map_err(internal)?
        .ok_or_else(no_profile)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /journal/meals/:slot/:id, only today's log is editable.
#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path((slot, id)): Path<(MealSlot, String)>,
) -> Result<Json<DeleteMealResponse>, (StatusCode, String)> {
    let mut store = state.store.lock().await;
    let removed = store.delete_meal(slot, &id).map_err(internal)?;
    Ok(Json(DeleteMealResponse { removed }))
}

#[instrument(skip(state))]
pub async fn update_goal(
    State(state): State<AppState>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<DailyLog>, (StatusCode, String)> {
    let goal = validation::positive_int("goalCalories", req.goal_calories).map_err(bad_request)?;

    let mut store = state.store.lock().await;
    store
        .update_goal_calories(goal)
        .map_err(internal)?
        .map(Json)
        .ok_or_else(no_profile)
}

#[instrument(skip(state))]
pub async fn list_weights(State(state): State<AppState>) -> Json<Vec<WeightEntry>> {
    Json(state.store.lock().await.weights().to_vec())
}

#[instrument(skip(state))]
pub async fn add_weight(
    State(state): State<AppState>,
    Json(req): Json<AddWeightRequest>,
) -> Result<(StatusCode, Json<WeightEntry>), (StatusCode, String)> {
    let weight_kg = validation::positive("weightKg", req.weight_kg).map_err(bad_request)?;

    let mut store = state.store.lock().await;
    let entry = store
        .add_weight_entry(weight_kg)
        .map_err(internal)?
        .ok_or_else(no_profile)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[cfg(test)]
mod journal_handler_tests {
    use super::*;
    use crate::profile::dto::sample_profile;

    async fn with_profile() -> AppState {
        let state = AppState::fake();
        state.store.lock().await.save_profile(sample_profile()).unwrap();
        state
    }

    fn meal(calories: f64, slot: MealSlot, dish_name: &str) -> Json<AddMealRequest> {
        Json(AddMealRequest {
            calories,
            slot,
            dish_name: dish_name.into(),
        })
    }

    #[tokio::test]
    async fn today_without_profile_is_not_found() {
        let err = get_today(State(AppState::fake())).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn today_is_provisional_until_first_meal() {
        let state = with_profile().await;

        let Json(today) = get_today(State(state.clone())).await.unwrap();
        assert!(!today.persisted);
        assert_eq!(today.log.date, "2024-03-10");
        assert_eq!(today.summary.remaining_calories, 1785);

        let (status, Json(entry)) = add_meal(State(state.clone()), meal(450.4, MealSlot::Lunch, " Ramen "))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry.calories, 450);
        assert_eq!(entry.dish_name, "Ramen");

        let Json(today) = get_today(State(state.clone())).await.unwrap();
        assert!(today.persisted);
        assert_eq!(today.summary.consumed_calories, 450);
        assert_eq!(today.summary.remaining_calories, 1335);

        let Json(history) = get_history(State(state)).await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn add_meal_validates_input() {
        let state = with_profile().await;

        let err = add_meal(State(state.clone()), meal(-1.0, MealSlot::Snack, "Chips"))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let err = add_meal(State(state.clone()), meal(100.0, MealSlot::Snack, "   "))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        assert!(state.store.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn add_meal_rejects_oversized_calories() {
        let state = with_profile().await;

        for _ in 0..2 {
            let request = meal(3_000_000_000.0, MealSlot::Dinner, "Feast");
            let err = add_meal(State(state.clone()), request).await.unwrap_err();
            assert_eq!(err.0, StatusCode::BAD_REQUEST);
        }

        let Json(today) = get_today(State(state)).await.unwrap();
        assert!(!today.persisted);
        assert_eq!(today.summary.consumed_calories, 0);
    }

    #[tokio::test]
    async fn add_meal_without_profile_is_not_found() {
        let err = add_meal(State(AppState::fake()), meal(100.0, MealSlot::Snack, "Apple"))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_meal_reports_removal() {
        let state = with_profile().await;
        let (_, Json(entry)) = add_meal(State(state.clone()), meal(300.0, MealSlot::Breakfast, "Oats"))
            .await
            .unwrap();

        let path = Path((MealSlot::Breakfast, entry.id.clone()));
        let Json(first) = delete_meal(State(state.clone()), path).await.unwrap();
        assert!(first.removed);

        let path = Path((MealSlot::Breakfast, entry.id));
        let Json(second) = delete_meal(State(state), path).await.unwrap();
        assert!(!second.removed);
    }

    #[tokio::test]
    async fn update_goal_overrides_snapshot() {
        let state = with_profile().await;

        let err = update_goal(State(state.clone()), Json(UpdateGoalRequest { goal_calories: 0 }))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let request = UpdateGoalRequest {
            goal_calories: 1500,
        };
        let Json(log) = update_goal(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(log.goal_calories, 1500);

        let Json(today) = get_today(State(state)).await.unwrap();
        assert!(today.persisted);
        assert_eq!(today.log.goal_calories, 1500);
    }

    #[tokio::test]
    async fn weights_are_recorded_for_today() {
        let state = with_profile().await;

        let err = add_weight(State(state.clone()), Json(AddWeightRequest { weight_kg: 0.0 }))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        add_weight(State(state.clone()), Json(AddWeightRequest { weight_kg: 69.8 }))
            .await
            .unwrap();
        add_weight(State(state.clone()), Json(AddWeightRequest { weight_kg: 69.5 }))
            .await
            .unwrap();

        let Json(weights) = list_weights(State(state)).await;
        assert_eq!(
            weights,
            vec![WeightEntry {
                date: "2024-03-10".into(),
                weight_kg: 69.5
            }]
        );
    }
}
