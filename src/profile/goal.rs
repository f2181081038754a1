//! Daily calorie goal from the energy-balance model.
//!
//! BMR uses the Mifflin–St Jeor equation, scaled by an activity factor to get
//! TDEE. A weight goal adds (or removes) `7700 kcal/kg` spread evenly over the
//! timeframe, counting `30.44` days per month.

use serde::Serialize;

use super::dto::{Gender, UserProfile};

pub const KCAL_PER_KG: f64 = 7700.0;
pub const AVG_DAYS_PER_MONTH: f64 = 30.44;

/// Intermediate values of the goal calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyBreakdown {
    pub bmr: f64,
    pub tdee: f64,
    pub daily_adjustment: f64,
    pub goal_calories: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalDirection {
    Maintain { weight_kg: f64 },
    Lose { kg: f64, months: u32 },
    Gain { kg: f64, months: u32 },
}

pub fn basal_metabolic_rate(profile: &UserProfile) -> f64 {
    let offset = match profile.gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * profile.weight_kg + 6.25 * f64::from(profile.height_cm) - 5.0 * f64::from(profile.age)
        + offset
}

pub fn energy_breakdown(profile: &UserProfile) -> EnergyBreakdown {
    let bmr = basal_metabolic_rate(profile);
    let tdee = bmr * profile.activity_level.factor();

    let delta_kg = profile.goal_weight_kg - profile.weight_kg;
    let total_days = f64::from(profile.goal_timeframe_months) * AVG_DAYS_PER_MONTH;

    // A non-positive timeframe keeps the maintenance goal.
    let daily_adjustment = if delta_kg == 0.0 || total_days <= 0.0 {
        0.0
    } else {
        delta_kg * KCAL_PER_KG / total_days
    };

    EnergyBreakdown {
        bmr,
        tdee,
        daily_adjustment,
        goal_calories: round_goal(tdee + daily_adjustment),
    }
}

pub fn daily_goal(profile: &UserProfile) -> u32 {
    energy_breakdown(profile).goal_calories
}

pub fn goal_direction(profile: &UserProfile) -> GoalDirection {
    let delta_kg = profile.goal_weight_kg - profile.weight_kg;
    let kg = (delta_kg.abs() * 10.0).round() / 10.0;
    let months = profile.goal_timeframe_months;
    if delta_kg < 0.0 {
        GoalDirection::Lose { kg, months }
    } else if delta_kg > 0.0 {
        GoalDirection::Gain { kg, months }
    } else {
        GoalDirection::Maintain {
            weight_kg: profile.weight_kg,
        }
    }
}

fn round_goal(kcal: f64) -> u32 {
    // NaN.max(1.0) is 1.0, so a degenerate profile still yields a usable goal.
    kcal.round().max(1.0) as u32
}

#[cfg(test)]
mod goal_tests {
    use super::*;
    use crate::profile::dto::{sample_profile, ActivityLevel};

    fn maintenance_male() -> UserProfile {
        UserProfile {
            gender: Gender::Male,
            age: 40,
            weight_kg: 80.0,
            height_cm: 180,
            activity_level: ActivityLevel::Sedentary,
            goal_weight_kg: 80.0,
            goal_timeframe_months: 12,
        }
    }

    #[test]
    fn female_weight_loss_example() {
        let breakdown = energy_breakdown(&sample_profile());
        assert!((breakdown.bmr - 1451.5).abs() < 1e-9);
        assert!((breakdown.tdee - 1995.8125).abs() < 1e-9);
        assert!((breakdown.daily_adjustment + 210.797).abs() < 0.01);
        assert_eq!(breakdown.goal_calories, 1785);
    }

    #[test]
    fn maintenance_goal_is_rounded_tdee() {
        let profile = maintenance_male();
        assert_eq!(basal_metabolic_rate(&profile), 1730.0);
        assert_eq!(daily_goal(&profile), 2076);
        assert_eq!(energy_breakdown(&profile).daily_adjustment, 0.0);
    }

    #[test]
    fn weight_gain_adds_calories() {
        let mut profile = maintenance_male();
        profile.goal_weight_kg = 83.0;
        profile.goal_timeframe_months = 3;
        // 3 kg * 7700 / 91.32 days ≈ 252.96 kcal/day
        assert_eq!(daily_goal(&profile), 2076 + 253);
    }

    #[test]
    fn zero_timeframe_falls_back_to_tdee() {
        let mut profile = sample_profile();
        profile.goal_timeframe_months = 0;
        let breakdown = energy_breakdown(&profile);
        assert!(breakdown.daily_adjustment.is_finite());
        assert_eq!(breakdown.goal_calories, 1996);
    }

    #[test]
    fn goal_is_never_below_one() {
        let mut profile = sample_profile();
        profile.goal_weight_kg = 10.0;
        profile.goal_timeframe_months = 1;
        assert_eq!(daily_goal(&profile), 1);
    }

    #[test]
    fn activity_factor_scales_goal_monotonically() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ];
        let goals: Vec<u32> = levels
            .iter()
            .map(|level| {
                let mut profile = maintenance_male();
                profile.activity_level = *level;
                daily_goal(&profile)
            })
            .collect();
        assert!(goals.windows(2).all(|w| w[0] < w[1]), "{goals:?}");
    }

    #[test]
    fn goal_direction_describes_delta() {
        assert_eq!(
            goal_direction(&sample_profile()),
            GoalDirection::Lose { kg: 5.0, months: 6 }
        );
        assert_eq!(
            goal_direction(&maintenance_male()),
            GoalDirection::Maintain { weight_kg: 80.0 }
        );

        let mut gaining = maintenance_male();
        gaining.goal_weight_kg = 82.25;
        assert_eq!(
            goal_direction(&gaining),
            GoalDirection::Gain {
                kg: 2.3,
                months: 12,
            }
        );
    }
}
