use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{DescriptionRequest, NutritionEstimate, RecalculateRequest, RecalculateResponse};
use super::services::{self, original_values, recalculate, AnalysisError};
use crate::app::{bad_request, internal};
use crate::state::AppState;
use crate::validation::ValidationError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analysis/image", post(analyze_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
        .route("/analysis/description", post(analyze_description))
        .route("/analysis/recalculate", post(recalculate_estimate))
}

/// POST /analysis/image (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn analyze_image(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<NutritionEstimate>, (StatusCode, String)> {
    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(internal)? {
        if matches!(field.name(), Some("file") | Some("image")) {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field.bytes().await.map_err(internal)?;
            upload = Some((data, content_type));
            break;
        }
    }
    let Some((data, content_type)) = upload else {
        return Err(bad_request(ValidationError::Empty { field: "file" }));
    };

    services::analyze_image(state.analyzer(), data, &content_type)
        .await
        .map(Json)
        .map_err(analysis_status)
}

#[instrument(skip(state))]
pub async fn analyze_description(
    State(state): State<AppState>,
    Json(req): Json<DescriptionRequest>,
) -> Result<Json<NutritionEstimate>, (StatusCode, String)> {
    services::analyze_description(state.analyzer(), &req.description)
        .await
        .map(Json)
        .map_err(analysis_status)
}

/// Falls back to the estimate's own values when the weights cannot be scaled.
#[instrument]
pub async fn recalculate_estimate(Json(req): Json<RecalculateRequest>) -> Json<RecalculateResponse> {
    let response = match recalculate(&req.estimate, req.weight_grams) {
        Some(values) => RecalculateResponse {
            scaled: true,
            values,
        },
        None => RecalculateResponse {
            scaled: false,
            values: original_values(&req.estimate),
        },
    };
    Json(response)
}

fn analysis_status(e: AnalysisError) -> (StatusCode, String) {
    match e {
        AnalysisError::Invalid(v) => bad_request(v),
        AnalysisError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        AnalysisError::Malformed(_) => {
            warn!(error = %e, "analysis response rejected");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
        AnalysisError::Failed(_) => {
            error!(error = %e, "analysis call failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
