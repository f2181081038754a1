use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Snack,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Snack,
        MealSlot::Lunch,
        MealSlot::Dinner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Snack => "snack",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub id: String,
    pub calories: u32,
    pub dish_name: String,
}

impl MealEntry {
    /// Fresh entry with a random id.
    pub fn new(calories: f64, dish_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            calories: round_calories(calories),
            dish_name: dish_name.into(),
        }
    }
}

/// Entries per slot. Every slot is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meals {
    pub breakfast: Vec<MealEntry>,
    pub snack: Vec<MealEntry>,
    pub lunch: Vec<MealEntry>,
    pub dinner: Vec<MealEntry>,
}

impl Meals {
    pub fn slot(&self, slot: MealSlot) -> &[MealEntry] {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Snack => &self.snack,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut Vec<MealEntry> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Snack => &mut self.snack,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &MealEntry> {
        MealSlot::ALL.into_iter().flat_map(move |slot| self.slot(slot))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: String,
    /// Frozen when the log is created; only an explicit edit changes it.
    pub goal_calories: u32,
    pub meals: Meals,
}

impl DailyLog {
    pub fn empty(date: impl Into<String>, goal_calories: u32) -> Self {
        Self {
            date: date.into(),
            goal_calories,
            meals: Meals::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub date: String,
    pub weight_kg: f64,
}

/// Rounds to whole kcal; negatives and non-finite values become 0.
pub fn round_calories(kcal: f64) -> u32 {
    if kcal.is_finite() {
        kcal.round().max(0.0) as u32
    } else {
        0
    }
}

// --- HTTP payloads ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMealRequest {
    pub calories: f64,
    pub slot: MealSlot,
    pub dish_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub goal_calories: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWeightRequest {
    pub weight_kg: f64,
}

#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub log: DailyLog,
    /// False while today's log only exists as a provisional view.
    pub persisted: bool,
    pub summary: crate::summary::dto::DailySummary,
}
