use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The three independent records the journal keeps in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    UserProfile,
    LogHistory,
    WeightHistory,
}

impl RecordKey {
    pub const ALL: [RecordKey; 3] = [
        RecordKey::UserProfile,
        RecordKey::LogHistory,
        RecordKey::WeightHistory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKey::UserProfile => "userProfile",
            RecordKey::LogHistory => "logHistory",
            RecordKey::WeightHistory => "weightHistory",
        }
    }
}

/// One change inside an atomic commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    Put(RecordKey, String),
    Remove(RecordKey),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Durable key-value storage of JSON-encoded records.
///
/// `commit` applies every write of the batch or none of them.
pub trait RecordStore: Send + Sync {
    fn get(&self, key: RecordKey) -> Result<Option<String>, StorageError>;
    fn commit(&self, writes: Vec<RecordWrite>) -> Result<(), StorageError>;
    /// Drops every record, even when the current contents are unreadable.
    fn clear(&self) -> Result<(), StorageError>;
}

fn apply(doc: &mut BTreeMap<String, String>, writes: Vec<RecordWrite>) {
    for write in writes {
        match write {
            RecordWrite::Put(key, value) => {
                doc.insert(key.as_str().to_string(), value);
            }
            RecordWrite::Remove(key) => {
                doc.remove(key.as_str());
            }
        }
    }
}

/// All records in a single JSON document, replaced via tmp file + rename.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_document(&self, doc: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_string_pretty(doc)?;
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(body.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, StorageError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            std::io::Error::new(ErrorKind::InvalidInput, "storage path has no file name")
        })?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, key: RecordKey) -> Result<Option<String>, StorageError> {
        Ok(self.read_document()?.remove(key.as_str()))
    }

    fn commit(&self, writes: Vec<RecordWrite>) -> Result<(), StorageError> {
        let mut doc = self.read_document()?;
        apply(&mut doc, writes);
        self.write_document(&doc)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.write_document(&BTreeMap::new())
    }
}

/// Process-local storage, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (RecordKey, S)>,
        S: Into<String>,
    {
        let records = records
            .into_iter()
            .map(|(k, v)| (k.as_str().to_string(), v.into()))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: RecordKey) -> Result<Option<String>, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(records.get(key.as_str()).cloned())
    }

    fn commit(&self, writes: Vec<RecordWrite>) -> Result<(), StorageError> {
        let mut records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        apply(&mut records, writes);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.records
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod storage_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_commit_and_get() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("journal.json"));

        assert_eq!(store.get(RecordKey::UserProfile).unwrap(), None);

        store
            .commit(vec![
                RecordWrite::Put(RecordKey::UserProfile, r#"{"age":30}"#.into()),
                RecordWrite::Put(RecordKey::LogHistory, "[]".into()),
            ])
            .unwrap();

        assert_eq!(
            store.get(RecordKey::UserProfile).unwrap().as_deref(),
            Some(r#"{"age":30}"#)
        );
        assert_eq!(store.get(RecordKey::LogHistory).unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get(RecordKey::WeightHistory).unwrap(), None);
    }

    #[test]
    fn file_store_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");
        let store = FileRecordStore::new(&path);

        store
            .commit(vec![RecordWrite::Put(RecordKey::WeightHistory, "[]".into())])
            .unwrap();

        assert!(path.exists());
        assert!(!dir.path().join(".journal.json.tmp").exists());
    }

    #[test]
    fn file_store_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("nested/data/journal.json"));

        store
            .commit(vec![RecordWrite::Put(RecordKey::LogHistory, "[]".into())])
            .unwrap();

        assert_eq!(store.get(RecordKey::LogHistory).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_remove_drops_record() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("journal.json"));
        store
            .commit(vec![RecordWrite::Put(RecordKey::UserProfile, "{}".into())])
            .unwrap();

        store
            .commit(vec![RecordWrite::Remove(RecordKey::UserProfile)])
            .unwrap();

        assert_eq!(store.get(RecordKey::UserProfile).unwrap(), None);
    }

    #[test]
    fn file_store_reports_corruption_and_clear_recovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileRecordStore::new(&path);

        let err = store.get(RecordKey::LogHistory).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));

        store.clear().unwrap();
        assert_eq!(store.get(RecordKey::LogHistory).unwrap(), None);
    }

    #[test]
    fn memory_store_seeded_and_clear() {
        let store = MemoryRecordStore::seeded([(RecordKey::LogHistory, "[]")]);
        assert_eq!(store.get(RecordKey::LogHistory).unwrap().as_deref(), Some("[]"));

        store.clear().unwrap();
        assert_eq!(store.get(RecordKey::LogHistory).unwrap(), None);
    }

    #[test]
    fn memory_store_commit_puts_and_removes() {
        let store = MemoryRecordStore::seeded([(RecordKey::UserProfile, "{}")]);

        store
            .commit(vec![
                RecordWrite::Put(RecordKey::WeightHistory, "[]".into()),
                RecordWrite::Remove(RecordKey::UserProfile),
            ])
            .unwrap();

        assert_eq!(store.get(RecordKey::UserProfile).unwrap(), None);
        assert_eq!(store.get(RecordKey::WeightHistory).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn record_keys_match_persisted_names() {
        let names: Vec<_> = RecordKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, ["userProfile", "logHistory", "weightHistory"]);
    }
}
