use bytes::Bytes;
use serde_json::Value;
use tracing::{info, warn};

use super::client::NutritionAnalyzer;
use super::dto::{NutritionEstimate, Recalculated};
use crate::journal::dto::round_calories;
use crate::validation::{self, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis service is not configured")]
    Unavailable,
    #[error("analysis request failed: {0:#}")]
    Failed(anyhow::Error),
    #[error("analysis service returned a malformed response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Accepts the raw response only if every field is present and well typed.
pub fn validate_estimate(raw: Value) -> Result<NutritionEstimate, AnalysisError> {
    let estimate: NutritionEstimate =
        serde_json::from_value(raw).map_err(|e| AnalysisError::Malformed(e.to_string()))?;

    let numbers = [
        ("calories", estimate.calories),
        ("estimatedWeightGrams", estimate.estimated_weight_grams),
        ("carbohydratesGrams", estimate.carbohydrates_grams),
        ("proteinsGrams", estimate.proteins_grams),
        ("fatsGrams", estimate.fats_grams),
    ];
    for (field, value) in numbers {
        if !value.is_finite() || value < 0.0 {
            return Err(AnalysisError::Malformed(format!(
                "{field} must be a non-negative number"
            )));
        }
    }
    if estimate.dish_name.trim().is_empty() {
        return Err(AnalysisError::Malformed("dishName is empty".into()));
    }
    Ok(estimate)
}

pub async fn analyze_image(
    analyzer: Option<&dyn NutritionAnalyzer>,
    image: Bytes,
    mime_type: &str,
) -> Result<NutritionEstimate, AnalysisError> {
    if image.is_empty() {
        return Err(ValidationError::Empty { field: "file" }.into());
    }
    if !mime_type.starts_with("image/") {
        return Err(ValidationError::Unsupported {
            field: "contentType",
            value: mime_type.to_string(),
        }
        .into());
    }
    let analyzer = analyzer.ok_or(AnalysisError::Unavailable)?;

    let size = image.len();
    let raw = analyzer
        .analyze_image(image, mime_type)
        .await
        .map_err(AnalysisError::Failed)?;
    let estimate = validate_estimate(raw).inspect_err(|e| warn!(error = %e, "image analysis rejected"))?;
    info!(bytes = size, mime_type, dish = %estimate.dish_name, "image analyzed");
    Ok(estimate)
}

pub async fn analyze_description(
    analyzer: Option<&dyn NutritionAnalyzer>,
    description: &str,
) -> Result<NutritionEstimate, AnalysisError> {
    let description = validation::non_empty("description", description)?;
    let analyzer = analyzer.ok_or(AnalysisError::Unavailable)?;

    let raw = analyzer
        .analyze_description(description)
        .await
        .map_err(AnalysisError::Failed)?;
    let estimate =
        validate_estimate(raw).inspect_err(|e| warn!(error = %e, "description analysis rejected"))?;
    info!(dish = %estimate.dish_name, "description analyzed");
    Ok(estimate)
}

/// The estimate's values unchanged, rounded to whole units.
pub fn original_values(estimate: &NutritionEstimate) -> Recalculated {
    scaled(estimate, 1.0)
}

/// Scales the estimate to `weight_grams`. `None` unless both the estimated
/// and the supplied weight are positive.
pub fn recalculate(estimate: &NutritionEstimate, weight_grams: f64) -> Option<Recalculated> {
    let estimated = validation::positive("estimatedWeightGrams", estimate.estimated_weight_grams).ok()?;
    let weight = validation::positive("weightGrams", weight_grams).ok()?;
    Some(scaled(estimate, weight / estimated))
}

fn scaled(estimate: &NutritionEstimate, ratio: f64) -> Recalculated {
    Recalculated {
        calories: round_calories(estimate.calories * ratio),
        carbohydrates_grams: round_calories(estimate.carbohydrates_grams * ratio),
        proteins_grams: round_calories(estimate.proteins_grams * ratio),
        fats_grams: round_calories(estimate.fats_grams * ratio),
    }
}
