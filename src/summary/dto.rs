use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    NoData,
    WithinGoal,
    OverGoal,
}

/// Consumed / goal. `capped` never exceeds 1.0 and is meant for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub raw: f64,
    pub capped: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub weekday: String,
    /// `None` when no log exists for the date.
    pub total_calories: Option<u32>,
    pub goal_calories: Option<u32>,
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub goal_calories: u32,
    pub consumed_calories: u32,
    pub remaining_calories: i64,
    pub over_goal: bool,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTrend {
    pub start_weight_kg: f64,
    pub goal_weight_kg: f64,
    pub latest_weight_kg: Option<f64>,
    pub change_kg: Option<f64>,
    pub remaining_kg: f64,
    pub entries: usize,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekResponse {
    pub reference_date: String,
    pub days: Vec<DaySummary>,
}
