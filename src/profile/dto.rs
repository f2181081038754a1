use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to the basal rate.
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// The single active profile. Replaced wholesale, never edited field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub gender: Gender,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: u32,
    pub activity_level: ActivityLevel,
    pub goal_weight_kg: f64,
    pub goal_timeframe_months: u32,
}

impl UserProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::positive_int("age", self.age)?;
        validation::positive("weightKg", self.weight_kg)?;
        validation::positive_int("heightCm", self.height_cm)?;
        validation::positive("goalWeightKg", self.goal_weight_kg)?;
        validation::positive_int("goalTimeframeMonths", self.goal_timeframe_months)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub breakdown: super::goal::EnergyBreakdown,
    pub direction: super::goal::GoalDirection,
}

#[cfg(test)]
pub(crate) fn sample_profile() -> UserProfile {
    UserProfile {
        gender: Gender::Female,
        age: 30,
        weight_kg: 70.0,
        height_cm: 170,
        activity_level: ActivityLevel::Light,
        goal_weight_kg: 65.0,
        goal_timeframe_months: 6,
    }
}
