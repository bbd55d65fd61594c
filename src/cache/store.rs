//! Persisted key-value stores backing the forecast cache.
//!
//! The cache treats values as opaque blobs. [`MemoryStore`] serves tests and
//! short-lived processes; [`FileStore`] keeps one file per key in a directory,
//! following the same XDG layout as the configuration.

use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use super::cancel::CancelFlag;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
    #[error("store operation cancelled")]
    Cancelled,
}

/// Minimal blob store interface.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&self, key: &str, blob: &[u8]) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Every key in the store, including ones written by other components.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Write unless `cancel` trips first. A cancelled write leaves no trace.
    ///
    /// The `*_cancellable` defaults check once up front; stores that may
    /// block (on a lock, on I/O) override them to check again right before
    /// acting.
    fn set_cancellable(&self, key: &str, blob: &[u8], cancel: &CancelFlag) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.set(key, blob)
    }

    fn get_cancellable(&self, key: &str, cancel: &CancelFlag) -> Result<Option<Vec<u8>>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.get(key)
    }

    fn remove_cancellable(&self, key: &str, cancel: &CancelFlag) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.remove(key)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries().keys().cloned().collect())
    }
}

const ENTRY_EXTENSION: &str = "entry";
const LOCK_FILE: &str = ".lock";

/// Directory-backed store.
///
/// Each entry lives in `<sha256(key)>.entry`; the first line holds the
/// original key so `keys()` can enumerate without a separate index, and the
/// blob follows. Writes go to a temp file that is renamed into place, so a
/// reader never sees a half-written entry. An advisory lock on `.lock`
/// serialises writers across processes.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let hash = sha256::digest(key.as_bytes());
        self.dir.join(format!("{hash}.{ENTRY_EXTENSION}"))
    }

    fn lock(&self, exclusive: bool) -> Result<File, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(file)
    }

    fn validate_key(key: &str) -> Result<(), StoreError> {
        if key.is_empty() || key.contains('\n') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    /// Split an entry file into (key, blob).
    fn decode(raw: &[u8]) -> Option<(&str, &[u8])> {
        let newline = raw.iter().position(|b| *b == b'\n')?;
        let key = std::str::from_utf8(&raw[..newline]).ok()?;
        Some((key, &raw[newline + 1..]))
    }

    /// Delete an entry file whose header cannot be read. The file is
    /// re-checked under the writer lock so a concurrent rewrite survives.
    fn discard_damaged(&self, path: &Path) -> Result<(), StoreError> {
        let _lock = self.lock(true)?;
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if Self::decode(&raw).is_none() {
            log_warning!("Removing damaged cache file {}", path.display());
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_entry(&self, key: &str, cancel: Option<&CancelFlag>) -> Result<Option<Vec<u8>>, StoreError> {
        Self::validate_key(key)?;
        let path = self.entry_path(key);

        let raw = {
            let _lock = self.lock(false)?;
            if cancel.is_some_and(|c| c.is_cancelled()) {
                return Err(StoreError::Cancelled);
            }
            match fs::read(&path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        };

        match Self::decode(&raw) {
            // A readable header naming another key is a hash collision
            Some((stored_key, blob)) => Ok((stored_key == key).then(|| blob.to_vec())),
            None => {
                self.discard_damaged(&path)?;
                Ok(None)
            }
        }
    }

    fn remove_entry(&self, key: &str, cancel: Option<&CancelFlag>) -> Result<(), StoreError> {
        Self::validate_key(key)?;
        let _lock = self.lock(true)?;
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(StoreError::Cancelled);
        }

        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entry(&self, key: &str, blob: &[u8], cancel: Option<&CancelFlag>) -> Result<(), StoreError> {
        Self::validate_key(key)?;
        let _lock = self.lock(true)?;

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(key.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.write_all(blob)?;
        temp.flush()?;

        // Dropping the temp file without persisting removes it.
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(StoreError::Cancelled);
        }

        temp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.read_entry(key, None)
    }

    fn get_cancellable(&self, key: &str, cancel: &CancelFlag) -> Result<Option<Vec<u8>>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.read_entry(key, Some(cancel))
    }

    fn set(&self, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        self.write_entry(key, blob, None)
    }

    fn set_cancellable(&self, key: &str, blob: &[u8], cancel: &CancelFlag) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.write_entry(key, blob, Some(cancel))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_entry(key, None)
    }

    fn remove_cancellable(&self, key: &str, cancel: &CancelFlag) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.remove_entry(key, Some(cancel))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut damaged = Vec::new();

        {
            let _lock = self.lock(false)?;
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                    continue;
                }
                let raw = match fs::read(&path) {
                    Ok(raw) => raw,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                };
                match Self::decode(&raw) {
                    Some((key, _)) => keys.push(key.to_string()),
                    None => damaged.push(path),
                }
            }
        }

        for path in &damaged {
            self.discard_damaged(path)?;
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", b"one").unwrap();
        store.set("b", b"two\nlines").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(&b"one"[..]));
        assert_eq!(store.get("b").unwrap().as_deref(), Some(&b"two\nlines"[..]));

        store.set("a", b"uno").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(&b"uno"[..]));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.keys().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_memory_store_contract() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_file_store_contract() {
        let dir = tempdir().unwrap();
        exercise(&FileStore::open(dir.path().join("cache")).unwrap());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempdir().unwrap();
        FileStore::open(dir.path()).unwrap().set("k", b"v").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some(&b"v"[..]));
    }

    #[test]
    fn test_file_store_cancelled_write_leaves_nothing() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("k", b"old").unwrap();

        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = store.set_cancellable("k", b"new", &cancel);

        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"old"[..]));

        let stray = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name();
                let name = name.to_string_lossy();
                name != LOCK_FILE && !name.ends_with(ENTRY_EXTENSION)
            })
            .count();
        assert_eq!(stray, 0);
    }

    #[test]
    fn test_file_store_removes_entries_with_damaged_headers() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("good", b"kept").unwrap();

        // No newline at all, and a header that is not UTF-8
        let headless = store.entry_path("headless");
        fs::write(&headless, b"no header line").unwrap();
        let garbled = store.entry_path("garbled");
        fs::write(&garbled, b"\xff\xfe\n{}").unwrap();

        assert_eq!(store.get("headless").unwrap(), None);
        assert!(!headless.exists());

        assert_eq!(store.keys().unwrap(), vec!["good".to_string()]);
        assert!(!garbled.exists());
        assert_eq!(store.get("good").unwrap().as_deref(), Some(&b"kept"[..]));
    }

    #[test]
    fn test_cancelled_read_and_remove_leave_entry() {
        let dir = tempdir().unwrap();
        let file_store = FileStore::open(dir.path()).unwrap();
        let memory_store = MemoryStore::new();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let stores: [&dyn KeyValueStore; 2] = [&file_store, &memory_store];
        for store in stores {
            store.set("k", b"v").unwrap();
            assert!(matches!(store.get_cancellable("k", &cancel), Err(StoreError::Cancelled)));
            assert!(matches!(store.remove_cancellable("k", &cancel), Err(StoreError::Cancelled)));
            assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"v"[..]));

            let live = CancelFlag::new();
            assert_eq!(store.get_cancellable("k", &live).unwrap().as_deref(), Some(&b"v"[..]));
            store.remove_cancellable("k", &live).unwrap();
            assert_eq!(store.get("k").unwrap(), None);
        }
    }

    #[test]
    fn test_file_store_rejects_multiline_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("bad\nkey", b"x"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
