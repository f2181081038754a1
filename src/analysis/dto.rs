use serde::{Deserialize, Serialize};

/// What the analysis service says about a dish. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEstimate {
    pub dish_name: String,
    /// Free-text portion label, e.g. "1 bowl".
    #[serde(alias = "quantityLabel")]
    pub quantity: String,
    pub calories: f64,
    pub ingredients: Vec<String>,
    pub estimated_weight_grams: f64,
    pub carbohydrates_grams: f64,
    pub proteins_grams: f64,
    pub fats_grams: f64,
}

/// Values scaled to a user-supplied portion weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recalculated {
    pub calories: u32,
    pub carbohydrates_grams: u32,
    pub proteins_grams: u32,
    pub fats_grams: u32,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    pub estimate: NutritionEstimate,
    pub weight_grams: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateResponse {
    /// False when the weights did not allow scaling and the originals came back.
    pub scaled: bool,
    pub values: Recalculated,
}
