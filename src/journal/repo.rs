use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::dto::{DailyLog, WeightEntry};
use super::migrate::{migrate_history, MigrationReport};
use crate::profile::dto::UserProfile;
use crate::storage::{RecordKey, RecordStore, RecordWrite, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode {record}: {source}")]
    Encode {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{record} record is corrupted: {source}")]
    Corrupted {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Unreadable persisted data, as opposed to a failing backend.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StoreError::Corrupted { .. } | StoreError::Storage(StorageError::Corrupt(_))
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub profile: Option<UserProfile>,
    pub history: Vec<DailyLog>,
    pub weights: Vec<WeightEntry>,
}

fn encode<T: Serialize + ?Sized>(key: RecordKey, value: &T) -> Result<RecordWrite, StoreError> {
    let body = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        record: key.as_str(),
        source,
    })?;
    Ok(RecordWrite::Put(key, body))
}

pub fn profile_write(profile: &UserProfile) -> Result<RecordWrite, StoreError> {
    encode(RecordKey::UserProfile, profile)
}

pub fn history_write(history: &[DailyLog]) -> Result<RecordWrite, StoreError> {
    encode(RecordKey::LogHistory, history)
}

pub fn weights_write(weights: &[WeightEntry]) -> Result<RecordWrite, StoreError> {
    encode(RecordKey::WeightHistory, weights)
}

pub fn clear_writes() -> Vec<RecordWrite> {
    RecordKey::ALL.into_iter().map(RecordWrite::Remove).collect()
}

fn decode<T: serde::de::DeserializeOwned>(key: RecordKey, body: &str) -> Result<T, StoreError> {
    serde_json::from_str(body).map_err(|source| StoreError::Corrupted {
        record: key.as_str(),
        source,
    })
}

/// Orders weights by date and keeps the last entry written for each date.
pub fn normalize_weights(weights: &mut Vec<WeightEntry>) {
    // Stable sort keeps same-date entries in write order; ISO dates sort as text.
    weights.sort_by(|a, b| a.date.cmp(&b.date));
    let mut deduped: Vec<WeightEntry> = Vec::with_capacity(weights.len());
    for entry in weights.drain(..) {
        match deduped.last_mut() {
            Some(last) if last.date == entry.date => *last = entry,
            _ => deduped.push(entry),
        }
    }
    *weights = deduped;
}

/// Reads the three records, migrating history and writing the result back.
///
/// Without a profile the histories are orphans and get removed.
pub fn load(storage: &dyn RecordStore) -> Result<PersistedState, StoreError> {
    let Some(profile_body) = storage.get(RecordKey::UserProfile)? else {
        let orphaned = [RecordKey::LogHistory, RecordKey::WeightHistory]
            .into_iter()
            .filter_map(|key| match storage.get(key) {
                Ok(Some(_)) => Some(Ok(RecordWrite::Remove(key))),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !orphaned.is_empty() {
            warn!(records = orphaned.len(), "removing history stored without a profile");
            storage.commit(orphaned)?;
        }
        return Ok(PersistedState::default());
    };
    let profile: UserProfile = decode(RecordKey::UserProfile, &profile_body)?;

    let raw_history: Vec<Value> = match storage.get(RecordKey::LogHistory)? {
        Some(body) => decode(RecordKey::LogHistory, &body)?,
        None => Vec::new(),
    };
    let (history, report) = migrate_history(&raw_history);

    let raw_weights: Vec<Value> = match storage.get(RecordKey::WeightHistory)? {
        Some(body) => decode(RecordKey::WeightHistory, &body)?,
        None => Vec::new(),
    };
    let weights_before = raw_weights.len();
    let mut weights = readable_weights(raw_weights);
    let weights_unsorted = weights.windows(2).any(|w| w[0].date >= w[1].date);
    normalize_weights(&mut weights);

    let mut write_back = Vec::new();
    if report.changed() {
        log_report(&report);
        write_back.push(history_write(&history)?);
    }
    if weights_unsorted || weights.len() != weights_before {
        warn!(
            before = weights_before,
            after = weights.len(),
            "normalized weight history"
        );
        write_back.push(weights_write(&weights)?);
    }
    if !write_back.is_empty() {
        storage.commit(write_back)?;
    }

    Ok(PersistedState {
        profile: Some(profile),
        history,
        weights,
    })
}

/// Decodes weight entries one by one, skipping the unreadable ones.
fn readable_weights(raw: Vec<Value>) -> Vec<WeightEntry> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(position, value)| {
            serde_json::from_value::<WeightEntry>(value)
                .inspect_err(|e| warn!(position, error = %e, "dropping unreadable weight entry"))
                .ok()
        })
        .collect()
}

fn log_report(report: &MigrationReport) {
    info!(
        read = report.records_read,
        upgraded = report.records_upgraded,
        dropped = report.records_dropped,
        entries_dropped = report.entries_dropped,
        "migrated log history"
    );
}

#[cfg(test)]
mod repo_tests {
    use super::*;
    use crate::profile::dto::sample_profile;
    use crate::storage::MemoryRecordStore;
    use serde_json::json;

    fn profile_json() -> String {
        serde_json::to_string(&sample_profile()).unwrap()
    }

    #[test]
    fn load_empty_storage() {
        let storage = MemoryRecordStore::new();
        assert_eq!(load(&storage).unwrap(), PersistedState::default());
    }

    #[test]
    fn load_writes_back_migrated_history() {
        let legacy = json!([{ "date": "2023-05-05", "currentCalories": 800 }]).to_string();
        let storage = MemoryRecordStore::seeded([
            (RecordKey::UserProfile, profile_json()),
            (RecordKey::LogHistory, legacy),
        ]);

        let state = load(&storage).unwrap();

        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].meals.lunch[0].calories, 800);
        let stored = storage.get(RecordKey::LogHistory).unwrap().unwrap();
        let stored: Vec<DailyLog> = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, state.history);
    }

    #[test]
    fn load_leaves_current_history_untouched() {
        let history = vec![DailyLog::empty("2024-01-01", 1700)];
        let body = serde_json::to_string(&history).unwrap();
        let storage = MemoryRecordStore::seeded([
            (RecordKey::UserProfile, profile_json()),
            (RecordKey::LogHistory, body.clone()),
        ]);

        let state = load(&storage).unwrap();

        assert_eq!(state.history, history);
        assert_eq!(storage.get(RecordKey::LogHistory).unwrap(), Some(body));
    }

    #[test]
    fn load_flags_corrupted_history_blob() {
        let storage = MemoryRecordStore::seeded([
            (RecordKey::UserProfile, profile_json()),
            (RecordKey::LogHistory, r#"{"date":"2024-01-01"}"#.to_string()),
        ]);

        let err = load(&storage).unwrap_err();

        assert!(err.is_corruption());
        assert!(err.to_string().starts_with("logHistory record is corrupted"));
    }

    #[test]
    fn load_skips_unreadable_weight_entries() {
        let history = vec![DailyLog::empty("2024-01-01", 1700)];
        let weights = json!([
            { "date": "2024-01-01", "weightKg": 70 },
            { "date": "2024-01-02" }
        ]);
        let storage = MemoryRecordStore::seeded([
            (RecordKey::UserProfile, profile_json()),
            (RecordKey::LogHistory, serde_json::to_string(&history).unwrap()),
            (RecordKey::WeightHistory, weights.to_string()),
        ]);

        let state = load(&storage).unwrap();

        assert_eq!(state.profile, Some(sample_profile()));
        assert_eq!(state.history, history);
        let expected = vec![WeightEntry {
            date: "2024-01-01".into(),
            weight_kg: 70.0,
        }];
        assert_eq!(state.weights, expected);
        let stored = storage.get(RecordKey::WeightHistory).unwrap().unwrap();
        let stored: Vec<WeightEntry> = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, expected);
    }

    #[test]
    fn load_flags_weight_blob_that_is_not_a_list() {
        let storage = MemoryRecordStore::seeded([
            (RecordKey::UserProfile, profile_json()),
            (RecordKey::WeightHistory, r#"{"weightKg":70}"#.to_string()),
        ]);

        assert!(load(&storage).unwrap_err().is_corruption());
    }

    #[test]
    fn load_removes_orphaned_history() {
        let storage = MemoryRecordStore::seeded([
            (RecordKey::LogHistory, "[]"),
            (RecordKey::WeightHistory, "[]"),
        ]);

        assert_eq!(load(&storage).unwrap(), PersistedState::default());
        assert_eq!(storage.get(RecordKey::LogHistory).unwrap(), None);
        assert_eq!(storage.get(RecordKey::WeightHistory).unwrap(), None);
    }

    #[test]
    fn normalize_weights_sorts_and_keeps_last_write() {
        let mut weights = vec![
            WeightEntry {
                date: "2024-01-03".into(),
                weight_kg: 70.0,
            },
            WeightEntry {
                date: "2024-01-01".into(),
                weight_kg: 71.0,
            },
            WeightEntry {
                date: "2024-01-03".into(),
                weight_kg: 69.5,
            },
        ];

        normalize_weights(&mut weights);

        assert_eq!(
            weights,
            vec![
                WeightEntry {
                    date: "2024-01-01".into(),
                    weight_kg: 71.0,
                },
                WeightEntry {
                    date: "2024-01-03".into(),
                    weight_kg: 69.5,
                },
            ]
        );
    }
}
