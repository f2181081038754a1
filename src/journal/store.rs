use std::sync::Arc;

use time::Date;
use tracing::{debug, error, info, warn};

use super::dto::{DailyLog, MealEntry, MealSlot, WeightEntry};
use super::repo::{self, PersistedState, StoreError};
use crate::clock::{day_key, Clock};
use crate::profile::dto::UserProfile;
use crate::profile::goal::daily_goal;
use crate::storage::{RecordStore, RecordWrite};

/// Authoritative journal state: the active profile, daily logs and weights.
///
/// Every mutation builds the next state aside, commits it to storage in one
/// batch and only then replaces the in-memory state. A failed commit leaves
/// both sides untouched.
pub struct LogStore {
    storage: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    profile: Option<UserProfile>,
    history: Vec<DailyLog>,
    weights: Vec<WeightEntry>,
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("profile", &self.profile)
            .field("days", &self.history.len())
            .field("weights", &self.weights.len())
            .finish()
    }
}

impl LogStore {
    /// Loads persisted state. Corrupted records are discarded wholesale and
    /// the store starts without a profile.
    pub fn open(storage: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let state = match repo::load(storage.as_ref()) {
            Ok(state) => state,
            Err(e) if e.is_corruption() => {
                warn!(error = %e, "persisted journal is corrupted, starting fresh");
                if let Err(clear_err) = storage.clear() {
                    error!(error = %clear_err, "failed to clear corrupted journal");
                    return Err(clear_err.into());
                }
                PersistedState::default()
            }
            Err(e) => return Err(e),
        };

        info!(
            has_profile = state.profile.is_some(),
            days = state.history.len(),
            weights = state.weights.len(),
            "journal loaded"
        );
        Ok(Self {
            storage,
            clock,
            profile: state.profile,
            history: state.history,
            weights: state.weights,
        })
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn history(&self) -> &[DailyLog] {
        &self.history
    }

    pub fn weights(&self) -> &[WeightEntry] {
        &self.weights
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub fn log_for(&self, date: &str) -> Option<&DailyLog> {
        self.history.iter().find(|log| log.date == date)
    }

    /// Today's log, or an unsaved empty one carrying the current calculated
    /// goal. The flag tells whether the log is persisted.
    pub fn today_log(&self) -> Option<(DailyLog, bool)> {
        let profile = self.profile.as_ref()?;
        let today = day_key(self.today());
        match self.log_for(&today) {
            Some(log) => Some((log.clone(), true)),
            None => Some((DailyLog::empty(today, daily_goal(profile)), false)),
        }
    }

    /// Installs a new profile and starts both histories from scratch.
    pub fn save_profile(&mut self, profile: UserProfile) -> Result<(), StoreError> {
        self.storage.commit(vec![
            repo::profile_write(&profile)?,
            repo::history_write(&[])?,
            repo::weights_write(&[])?,
        ])?;

        info!(goal = daily_goal(&profile), "profile saved, history reset");
        self.profile = Some(profile);
        self.history.clear();
        self.weights.clear();
        Ok(())
    }

    pub fn reset_profile(&mut self) -> Result<(), StoreError> {
        self.storage.commit(repo::clear_writes())?;

        info!("profile and history cleared");
        self.profile = None;
        self.history.clear();
        self.weights.clear();
        Ok(())
    }

    /// Appends a meal to today's log. `None` without an active profile.
    pub fn add_meal(
        &mut self,
        calories: f64,
        slot: MealSlot,
        dish_name: &str,
    ) -> Result<Option<MealEntry>, StoreError> {
        let Some(profile) = self.profile.as_ref() else {
            debug!("add_meal ignored: no active profile");
            return Ok(None);
        };

        let today = day_key(self.today());
        let entry = MealEntry::new(calories, dish_name);
        let mut next = self.history.clone();
        upsert_log(&mut next, &today, || daily_goal(profile))
            .meals
            .slot_mut(slot)
            .push(entry.clone());

        self.commit_history(next)?;
        info!(date = %today, %slot, calories = entry.calories, id = %entry.id, "meal added");
        Ok(Some(entry))
    }

    /// Removes a meal from today's log. Returns whether anything was removed.
    pub fn delete_meal(&mut self, slot: MealSlot, id: &str) -> Result<bool, StoreError> {
        let today = day_key(self.today());
        let Some(index) = self.history.iter().position(|log| log.date == today) else {
            debug!(%slot, id, "delete_meal ignored: no log for today");
            return Ok(false);
        };
        if !self.history[index].meals.slot(slot).iter().any(|e| e.id == id) {
            debug!(%slot, id, "delete_meal ignored: unknown entry");
            return Ok(false);
        }

        let mut next = self.history.clone();
        next[index].meals.slot_mut(slot).retain(|e| e.id != id);

        self.commit_history(next)?;
        info!(date = %today, %slot, id, "meal deleted");
        Ok(true)
    }

    /// Overwrites today's goal snapshot. `None` without an active profile.
    pub fn update_goal_calories(&mut self, goal_calories: u32) -> Result<Option<DailyLog>, StoreError> {
        if self.profile.is_none() {
            debug!("update_goal_calories ignored: no active profile");
            return Ok(None);
        }

        let today = day_key(self.today());
        let mut next = self.history.clone();
        let log = upsert_log(&mut next, &today, || goal_calories);
        log.goal_calories = goal_calories;
        let updated = log.clone();

        self.commit_history(next)?;
        info!(date = %today, goal_calories, "goal updated");
        Ok(Some(updated))
    }

    /// Records today's weight, replacing an earlier entry for the same date.
    pub fn add_weight_entry(&mut self, weight_kg: f64) -> Result<Option<WeightEntry>, StoreError> {
        if self.profile.is_none() {
            debug!("add_weight_entry ignored: no active profile");
            return Ok(None);
        }

        let entry = WeightEntry {
            date: day_key(self.today()),
            weight_kg,
        };
        let mut next = self.weights.clone();
        match next.iter_mut().find(|w| w.date == entry.date) {
            Some(existing) => *existing = entry.clone(),
            None => next.push(entry.clone()),
        }
        next.sort_by(|a, b| a.date.cmp(&b.date));

        self.storage.commit(vec![repo::weights_write(&next)?])?;
        self.weights = next;
        info!(date = %entry.date, weight_kg, "weight recorded");
        Ok(Some(entry))
    }

    fn commit_history(&mut self, next: Vec<DailyLog>) -> Result<(), StoreError> {
        let write: RecordWrite = repo::history_write(&next)?;
        self.storage.commit(vec![write])?;
        self.history = next;
        Ok(())
    }
}

/// Finds the log for `date`, creating it with `goal()` when missing.
fn upsert_log<'a>(
    history: &'a mut Vec<DailyLog>,
    date: &str,
    goal: impl FnOnce() -> u32,
) -> &'a mut DailyLog {
    let index = match history.iter().position(|log| log.date == date) {
        Some(index) => index,
        None => {
            history.push(DailyLog::empty(date, goal()));
            history.len() - 1
        }
    };
    &mut history[index]
}
