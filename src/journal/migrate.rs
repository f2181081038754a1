//! Upgrades persisted history records written by older clients.
//!
//! Every raw record is classified into one [`RecordShape`] and converted by the
//! matching pure function. Records that cannot be keyed by date are dropped.
//! Already-current records come out unchanged.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use super::dto::{round_calories, DailyLog, MealEntry, MealSlot};
use crate::validation::MAX_MEAL_CALORIES;

/// Goal assigned when a record carries no usable goal.
pub const DEFAULT_GOAL_CALORIES: u32 = 2000;
pub const MIGRATED_DISH_NAME: &str = "Migrated meal";
pub const LOGGED_DISH_NAME: &str = "Logged meal";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub records_read: usize,
    pub records_upgraded: usize,
    pub records_dropped: usize,
    pub entries_dropped: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.records_upgraded > 0 || self.records_dropped > 0
    }
}

/// Recognized layouts of a persisted day record.
#[derive(Debug, Clone, PartialEq)]
enum RecordShape<'a> {
    /// Oldest layout: one calorie total per slot.
    NumericSlots {
        date: &'a str,
        goal: u32,
        totals: [(MealSlot, f64); 4],
    },
    /// No meals at all, only the day's consumed total.
    AggregateOnly {
        date: &'a str,
        goal: u32,
        consumed: f64,
    },
    /// Per-slot entry arrays, possibly incomplete.
    Slotted {
        date: &'a str,
        goal: u32,
        meals: &'a Map<String, Value>,
    },
    /// Nothing usable besides the date.
    Bare { date: &'a str, goal: u32 },
}

impl<'a> RecordShape<'a> {
    fn detect(record: &'a Value) -> Option<Self> {
        let obj = record.as_object()?;
        let date = obj.get("date")?.as_str()?;
        let goal = goal_from(obj.get("goalCalories"));

        match obj.get("meals").and_then(Value::as_object) {
            Some(meals) if has_numeric_slots(meals) => Some(RecordShape::NumericSlots {
                date,
                goal,
                totals: MealSlot::ALL.map(|slot| {
                    let kcal = meals
                        .get(slot.as_str())
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0);
                    (slot, kcal)
                }),
            }),
            Some(meals) => Some(RecordShape::Slotted { date, goal, meals }),
            None => match obj.get("currentCalories").and_then(Value::as_f64) {
                Some(consumed) if consumed > 0.0 => Some(RecordShape::AggregateOnly {
                    date,
                    goal,
                    consumed,
                }),
                _ => Some(RecordShape::Bare { date, goal }),
            },
        }
    }

    fn date(&self) -> &'a str {
        match self {
            RecordShape::NumericSlots { date, .. }
            | RecordShape::AggregateOnly { date, .. }
            | RecordShape::Slotted { date, .. }
            | RecordShape::Bare { date, .. } => *date,
        }
    }

    /// Converts the shape, returning the log and the number of entries dropped.
    fn into_log(self) -> (DailyLog, usize) {
        match self {
            RecordShape::NumericSlots { date, goal, totals } => {
                let mut log = DailyLog::empty(date, goal);
                for (slot, kcal) in totals {
                    if kcal > 0.0 {
                        log.meals.slot_mut(slot).push(migrated_entry(date, slot, kcal));
                    }
                }
                (log, 0)
            }
            RecordShape::AggregateOnly {
                date,
                goal,
                consumed,
            } => {
                let mut log = DailyLog::empty(date, goal);
                log.meals
                    .lunch
                    .push(migrated_entry(date, MealSlot::Lunch, consumed));
                (log, 0)
            }
            RecordShape::Slotted { date, goal, meals } => {
                let mut log = DailyLog::empty(date, goal);
                let mut dropped = 0;
                for slot in MealSlot::ALL {
                    match meals.get(slot.as_str()) {
                        Some(Value::Array(raw_entries)) => {
                            for (index, raw) in raw_entries.iter().enumerate() {
                                match complete_entry(date, slot, index, raw) {
                                    Some(entry) => log.meals.slot_mut(slot).push(entry),
                                    None => dropped += 1,
                                }
                            }
                        }
                        // A numeric total left over from the oldest layout.
                        Some(Value::Number(total)) => {
                            let kcal = total.as_f64().unwrap_or(0.0);
                            if kcal > 0.0 {
                                log.meals.slot_mut(slot).push(migrated_entry(date, slot, kcal));
                            }
                        }
                        None | Some(Value::Null) => {}
                        Some(_) => dropped += 1,
                    }
                }
                (log, dropped)
            }
            RecordShape::Bare { date, goal } => (DailyLog::empty(date, goal), 0),
        }
    }
}

/// Numeric layout: at least one numeric slot and no slot holding an array.
fn has_numeric_slots(meals: &Map<String, Value>) -> bool {
    let mut any_number = false;
    for value in MealSlot::ALL.iter().filter_map(|slot| meals.get(slot.as_str())) {
        if value.is_array() {
            return false;
        }
        any_number |= value.is_number();
    }
    any_number
}

fn goal_from(value: Option<&Value>) -> u32 {
    match value.and_then(Value::as_f64) {
        Some(goal) if goal.is_finite() && goal >= 0.5 => round_calories(goal),
        _ => DEFAULT_GOAL_CALORIES,
    }
}

/// Legacy values above the per-meal bound are capped to it.
fn entry_calories(kcal: f64) -> u32 {
    round_calories(kcal.min(MAX_MEAL_CALORIES))
}

fn migrated_entry(date: &str, slot: MealSlot, kcal: f64) -> MealEntry {
    MealEntry {
        id: format!("mig-{date}-{slot}"),
        calories: entry_calories(kcal),
        dish_name: MIGRATED_DISH_NAME.to_string(),
    }
}

fn complete_entry(date: &str, slot: MealSlot, index: usize, raw: &Value) -> Option<MealEntry> {
    let obj = raw.as_object()?;
    let calories = obj.get("calories").and_then(Value::as_f64)?;
    let id = match obj.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("mig-{date}-{slot}-{index}"),
    };
    let dish_name = match obj.get("dishName").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => LOGGED_DISH_NAME.to_string(),
    };
    Some(MealEntry {
        id,
        calories: entry_calories(calories),
        dish_name,
    })
}

/// Migrates a single record. `None` when the record has no usable date.
pub fn migrate_record(record: &Value) -> Option<DailyLog> {
    RecordShape::detect(record).map(|shape| shape.into_log().0)
}

/// Migrates a whole history, keeping the first record seen for each date.
pub fn migrate_history(records: &[Value]) -> (Vec<DailyLog>, MigrationReport) {
    let mut report = MigrationReport {
        records_read: records.len(),
        ..MigrationReport::default()
    };
    let mut seen: HashSet<&str> = HashSet::new();
    let mut logs = Vec::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        let Some(shape) = RecordShape::detect(record) else {
            warn!(position, "dropping history record without a usable date");
            report.records_dropped += 1;
            continue;
        };
        if !seen.insert(shape.date()) {
            warn!(position, date = shape.date(), "dropping duplicate history record");
            report.records_dropped += 1;
            continue;
        }

        let (log, entries_dropped) = shape.into_log();
        if entries_dropped > 0 {
            warn!(date = %log.date, entries_dropped, "dropped unreadable meal entries");
        }
        report.entries_dropped += entries_dropped;

        let unchanged = serde_json::to_value(&log)
            .map(|current| &current == record)
            .unwrap_or(false);
        if !unchanged {
            report.records_upgraded += 1;
        }
        logs.push(log);
    }

    (logs, report)
}
