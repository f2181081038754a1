//! Derived views over the journal. Nothing here is cached; every call reads
//! the logs it is given.

use time::{Date, Duration};

use super::dto::{DailySummary, DayStatus, DaySummary, Progress, WeightTrend};
use crate::clock::day_key;
use crate::journal::dto::{DailyLog, WeightEntry};
use crate::profile::dto::UserProfile;

/// Saturates at `u32::MAX` instead of wrapping.
pub fn daily_total(log: &DailyLog) -> u32 {
    log.meals
        .entries()
        .fold(0u32, |total, entry| total.saturating_add(entry.calories))
}

/// An existing log with nothing eaten is still `NoData`.
pub fn day_status(total: Option<u32>, goal: u32) -> DayStatus {
    match total {
        None | Some(0) => DayStatus::NoData,
        Some(total) if total > goal => DayStatus::OverGoal,
        Some(_) => DayStatus::WithinGoal,
    }
}

pub fn progress_ratio(total: u32, goal: u32) -> Progress {
    let raw = if goal > 0 {
        f64::from(total) / f64::from(goal)
    } else {
        0.0
    };
    Progress {
        raw,
        capped: raw.min(1.0),
    }
}

/// The seven dates ending at `reference`, oldest first.
pub fn weekly_window(history: &[DailyLog], reference: Date) -> Vec<DaySummary> {
    (0..7)
        .rev()
        .filter_map(|back| reference.checked_sub(Duration::days(back)))
        .map(|date| {
            let key = day_key(date);
            let log = history.iter().find(|log| log.date == key);
            let total = log.map(daily_total);
            let goal = log.map(|log| log.goal_calories);
            DaySummary {
                date: key,
                weekday: date.weekday().to_string(),
                total_calories: total,
                goal_calories: goal,
                status: day_status(total, goal.unwrap_or(0)),
            }
        })
        .collect()
}

pub fn daily_summary(log: &DailyLog) -> DailySummary {
    let consumed = daily_total(log);
    DailySummary {
        goal_calories: log.goal_calories,
        consumed_calories: consumed,
        remaining_calories: i64::from(log.goal_calories) - i64::from(consumed),
        over_goal: consumed > log.goal_calories,
        progress: progress_ratio(consumed, log.goal_calories),
    }
}

pub fn weight_trend(profile: &UserProfile, weights: &[WeightEntry]) -> WeightTrend {
    let latest = weights.last().map(|entry| entry.weight_kg);
    let current = latest.unwrap_or(profile.weight_kg);
    WeightTrend {
        start_weight_kg: profile.weight_kg,
        goal_weight_kg: profile.goal_weight_kg,
        latest_weight_kg: latest,
        change_kg: latest.map(|kg| one_decimal(kg - profile.weight_kg)),
        remaining_kg: one_decimal(profile.goal_weight_kg - current),
        entries: weights.len(),
    }
}

fn one_decimal(kg: f64) -> f64 {
    (kg * 10.0).round() / 10.0
}
