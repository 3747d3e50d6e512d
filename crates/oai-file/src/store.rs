//! Filesystem storage for OAI-PMH records.
//!
//! Layout under the store root:
//!
//! ```text
//! oai/
//!   records/<escaped identifier>.json
//!   sets.json
//!   token.key
//!   store.lock
//! ```
//!
//! Writers serialize on an exclusive lock of `store.lock` and replace files
//! by writing a temporary file and renaming it, so readers never observe a
//! partially written document and need no lock themselves.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use sha2::{Digest, Sha256};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use oai_core::Result;
use oai_core::error::{Error, StorageError};
use oai_core::repo::{SetDescriptor, StoredRecord};
use oai_core::traits::{RecordFilter, RecordStore};
use oai_core::types::Identifier;

/// Longest escaped identifier kept verbatim in a file name. Leaves room for
/// the `.json` suffix and temporary-file extensions within a 255-byte entry.
const MAX_STEM_LEN: usize = 200;

fn map_io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |err| {
        StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
        .into()
    }
}

fn corrupt(path: &Path, err: serde_json::Error) -> Error {
    StorageError::Corrupt {
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Holds the store lock until dropped.
struct StoreLock(File);

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.0) {
            warn!(error = %err, "Failed to release store lock");
        }
    }
}

/// Filesystem-backed record store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    ///
    /// Nothing is created on disk until the first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn oai_dir(&self) -> PathBuf {
        self.root.join("oai")
    }

    fn records_dir(&self) -> PathBuf {
        self.oai_dir().join("records")
    }

    fn sets_path(&self) -> PathBuf {
        self.oai_dir().join("sets.json")
    }

    fn secret_path(&self) -> PathBuf {
        self.oai_dir().join("token.key")
    }

    fn lock_path(&self) -> PathBuf {
        self.oai_dir().join("store.lock")
    }

    /// Convert an identifier into a filesystem-safe file name.
    ///
    /// Bytes outside `[A-Za-z0-9._~-]` are percent-encoded, which keeps the
    /// mapping injective and free of path separators. Names that would not
    /// fit a directory entry become `%sha256-<hex>`; escaping never emits `%s`,
    /// so the two forms cannot collide.
    fn file_name(identifier: &Identifier) -> String {
        let mut name = String::with_capacity(identifier.as_str().len() + 5);
        for byte in identifier.as_str().bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{byte:02X}"));
            }
        }

        if name.len() > MAX_STEM_LEN {
            name = format!("%sha256-{:x}", Sha256::digest(identifier.as_str().as_bytes()));
        }

        name.push_str(".json");
        name
    }

    fn record_path(&self, identifier: &Identifier) -> PathBuf {
        self.records_dir().join(Self::file_name(identifier))
    }

    fn lock(&self) -> Result<StoreLock> {
        let dir = self.oai_dir();
        fs::create_dir_all(&dir).map_err(map_io(&dir))?;

        let path = self.lock_path();

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(map_io(&path))?;

        file.lock_exclusive().map_err(|e| StorageError::Lock {
            message: format!("{}: {}", path.display(), e),
        })?;

        Ok(StoreLock(file))
    }

    /// Atomically replace `path` with the JSON encoding of `value`.
    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io(parent))?;
        }

        let content = serde_json::to_vec_pretty(value).map_err(|e| Error::Internal {
            message: format!("failed to encode {}: {}", path.display(), e),
        })?;

        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        let mut file = File::create(&temp_path).map_err(map_io(&temp_path))?;
        file.write_all(&content).map_err(map_io(&temp_path))?;
        file.sync_data().map_err(map_io(&temp_path))?;
        fs::rename(&temp_path, path).map_err(map_io(path))?;

        Ok(())
    }

    fn read_json_sync<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        match fs::read(path) {
            Ok(content) => serde_json::from_slice(&content)
                .map(Some)
                .map_err(|e| corrupt(path, e)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(map_io(path)(err)),
        }
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        match tokio::fs::read(path).await {
            Ok(content) => serde_json::from_slice(&content)
                .map(Some)
                .map_err(|e| corrupt(path, e)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(map_io(path)(err)),
        }
    }

    /// Read every record document, skipping unreadable ones.
    async fn load_all(&self) -> Result<Vec<StoredRecord>> {
        let dir = self.records_dir();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(map_io(&dir)(err)),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(map_io(&dir))? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            match Self::read_json::<StoredRecord>(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable record")
                }
            }
        }

        Ok(records)
    }

    // ========================================================================
    // Record Operations
    // ========================================================================

    /// Insert or replace a record.
    #[instrument(skip(self, record), fields(identifier = %record.identifier))]
    pub fn put_record(&self, record: &StoredRecord) -> Result<()> {
        let _lock = self.lock()?;
        Self::write_json(&self.record_path(&record.identifier), record)?;

        debug!(deleted = record.deleted, "Stored record");
        Ok(())
    }

    /// Delete a record.
    ///
    /// Without `purge` the record is replaced by a tombstone stamped `at`,
    /// keeping its identifier and set membership. With `purge` every trace
    /// is removed. Returns `false` if no such record exists.
    #[instrument(skip(self))]
    pub fn delete_record(
        &self,
        identifier: &Identifier,
        at: DateTime<Utc>,
        purge: bool,
    ) -> Result<bool> {
        let _lock = self.lock()?;
        let path = self.record_path(identifier);

        let Some(record) = Self::read_json_sync::<StoredRecord>(&path)? else {
            return Ok(false);
        };

        if purge {
            fs::remove_file(&path).map_err(map_io(&path))?;
            debug!("Purged record");
        } else {
            Self::write_json(&path, &record.tombstone(at))?;
            debug!("Recorded deletion");
        }

        Ok(true)
    }

    /// Insert or replace a set description.
    #[instrument(skip(self, set), fields(spec = %set.spec))]
    pub fn put_set(&self, set: SetDescriptor) -> Result<()> {
        let _lock = self.lock()?;
        let path = self.sets_path();

        let mut sets: Vec<SetDescriptor> = Self::read_json_sync(&path)?.unwrap_or_default();
        sets.retain(|s| s.spec != set.spec);
        sets.push(set);
        sets.sort_by(|a, b| a.spec.cmp(&b.spec));

        Self::write_json(&path, &sets)?;

        debug!(count = sets.len(), "Stored set");
        Ok(())
    }

    /// Load the resumption token secret, creating one on first use.
    ///
    /// Every process opening the same store signs tokens with this secret,
    /// so tokens stay valid across invocations.
    pub fn load_or_create_secret(&self) -> Result<String> {
        let path = self.secret_path();

        match fs::read_to_string(&path) {
            Ok(secret) if !secret.trim().is_empty() => return Ok(secret.trim().to_string()),
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(map_io(&path)(err)),
        }

        let _lock = self.lock()?;

        // Another process may have won the race.
        if let Ok(secret) = fs::read_to_string(&path)
            && !secret.trim().is_empty()
        {
            return Ok(secret.trim().to_string());
        }

        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp_path, &secret).map_err(map_io(&temp_path))?;
        fs::rename(&temp_path, &path).map_err(map_io(&path))?;

        debug!(path = %path.display(), "Generated token secret");
        Ok(secret)
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn record(&self, identifier: &Identifier) -> Result<Option<StoredRecord>> {
        Self::read_json(&self.record_path(identifier)).await
    }

    #[instrument(skip(self))]
    async fn scan(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
        let records: Vec<_> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();

        debug!(count = records.len(), "Scanned records");
        Ok(records)
    }

    async fn sets(&self) -> Result<Vec<SetDescriptor>> {
        Ok(Self::read_json(&self.sets_path()).await?.unwrap_or_default())
    }

    async fn earliest_datestamp(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load_all().await?.iter().map(|r| r.datestamp).min())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use oai_core::repo::MetadataDocument;
    use oai_core::types::{MetadataPrefix, SetSpec};
    use serde_json::json;
    use tempfile::TempDir;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
    }

    fn sample(id: &str, day: u32) -> StoredRecord {
        StoredRecord::new(Identifier::new(id).unwrap(), at(day))
            .with_set(SetSpec::new("a:b").unwrap())
            .with_format(
                MetadataPrefix::new("oai_dc").unwrap(),
                MetadataDocument::new(json!({ "title": id })).unwrap(),
            )
    }

    #[test]
    fn file_names_escape_reserved_bytes() {
        let id = Identifier::new("oai:example.org/a%b").unwrap();
        assert_eq!(FileStore::file_name(&id), "oai%3Aexample.org%2Fa%25b.json");
    }

    #[test]
    fn distinct_identifiers_get_distinct_files() {
        let a = Identifier::new("a:b").unwrap();
        let b = Identifier::new("a%3Ab").unwrap();
        assert_ne!(FileStore::file_name(&a), FileStore::file_name(&b));
    }

    #[test]
    fn long_identifiers_get_digest_names() {
        let short = Identifier::new(format!("oai:example.org:{}", "y".repeat(150))).unwrap();
        let long = Identifier::new(format!("oai:example.org:{}", "y".repeat(300))).unwrap();
        let longer = Identifier::new(format!("oai:example.org:{}", "y".repeat(301))).unwrap();

        assert!(FileStore::file_name(&short).starts_with("oai%3Aexample.org%3Ayyy"));

        let name = FileStore::file_name(&long);
        assert!(name.starts_with("%sha256-"));
        assert_eq!(name.len(), "%sha256-".len() + 64 + ".json".len());
        assert_ne!(name, FileStore::file_name(&longer));
    }

    #[tokio::test]
    async fn long_identifiers_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let id = format!("oai:example.org:{}", "y".repeat(300));

        let missing = Identifier::new(format!("{id}-missing")).unwrap();
        assert_eq!(store.record(&missing).await.unwrap(), None);

        let record = sample(&id, 3);
        store.put_record(&record).unwrap();
        assert_eq!(store.record(&record.identifier).await.unwrap(), Some(record.clone()));

        let all = store.scan(&RecordFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].identifier, record.identifier);

        assert!(store.delete_record(&record.identifier, at(4), false).unwrap());
        assert!(store.record(&record.identifier).await.unwrap().unwrap().deleted);
    }

    #[tokio::test]
    async fn empty_store_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.scan(&RecordFilter::default()).await.unwrap().is_empty());
        assert!(store.sets().await.unwrap().is_empty());
        assert_eq!(store.earliest_datestamp().await.unwrap(), None);
        assert_eq!(
            store.record(&Identifier::new("x").unwrap()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn put_then_read_record() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let record = sample("oai:test:1", 3);

        store.put_record(&record).unwrap();

        let loaded = store.record(&record.identifier).await.unwrap();
        assert_eq!(loaded, Some(record));
        assert!(dir.path().join("oai/records/oai%3Atest%3A1.json").exists());
    }

    #[tokio::test]
    async fn put_record_replaces() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.put_record(&sample("oai:test:1", 3)).unwrap();
        store.put_record(&sample("oai:test:1", 9)).unwrap();

        let all = store.scan(&RecordFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].datestamp, at(9));
    }

    #[tokio::test]
    async fn delete_leaves_tombstone() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let record = sample("oai:test:1", 3);
        store.put_record(&record).unwrap();

        assert!(store.delete_record(&record.identifier, at(10), false).unwrap());

        let loaded = store.record(&record.identifier).await.unwrap().unwrap();
        assert!(loaded.deleted);
        assert_eq!(loaded.datestamp, at(10));
        assert_eq!(loaded.sets, record.sets);
        assert_eq!(loaded.available_formats().count(), 0);
    }

    #[tokio::test]
    async fn purge_removes_record() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let record = sample("oai:test:1", 3);
        store.put_record(&record).unwrap();

        assert!(store.delete_record(&record.identifier, at(10), true).unwrap());
        assert_eq!(store.record(&record.identifier).await.unwrap(), None);
        assert!(!store.delete_record(&record.identifier, at(11), true).unwrap());
    }

    #[tokio::test]
    async fn scan_applies_filter() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        for (id, day) in [("one", 1), ("two", 2), ("three", 3)] {
            store.put_record(&sample(id, day)).unwrap();
        }

        let filter = RecordFilter {
            from: Some(at(2)),
            until: Some(at(3)),
            ..Default::default()
        };
        let records = store.scan(&filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier.as_str(), "two");

        assert_eq!(store.earliest_datestamp().await.unwrap(), Some(at(1)));
    }

    #[tokio::test]
    async fn corrupt_documents_are_skipped_by_scans() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.put_record(&sample("good", 1)).unwrap();

        let bad = dir.path().join("oai/records/bad.json");
        fs::write(&bad, "{ not json").unwrap();

        let records = store.scan(&RecordFilter::default()).await.unwrap();
        assert_eq!(records.len(), 1);

        let err = store
            .record(&Identifier::new("bad").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn put_set_upserts_in_spec_order() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store
            .put_set(SetDescriptor::new(SetSpec::new("b").unwrap(), "B"))
            .unwrap();
        store
            .put_set(SetDescriptor::new(SetSpec::new("a").unwrap(), "A"))
            .unwrap();
        store
            .put_set(SetDescriptor::new(SetSpec::new("b").unwrap(), "Bee"))
            .unwrap();

        let sets = store.sets().await.unwrap();
        let names: Vec<_> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A", "Bee"]);
    }

    #[test]
    fn secret_is_stable() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let first = store.load_or_create_secret().unwrap();
        let second = FileStore::new(dir.path()).load_or_create_secret().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }
}
