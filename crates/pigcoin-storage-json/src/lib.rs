use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use pigcoin_core::{storage::KeyValueStore, CoreError};
use tracing::debug;

const BLOB_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const BACKUPS_DIR: &str = "backups";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed key-value store: one `<key>.json` file per key.
///
/// Each save replaces the file atomically and keeps the previous blob under
/// `backups/<key>/`, pruned to the configured retention.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    retention: usize,
}

impl JsonFileStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(data_dir, DEFAULT_RETENTION)
    }

    /// A retention of zero disables backups.
    pub fn with_retention(data_dir: PathBuf, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            retention,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", canonical_name(key), BLOB_EXTENSION))
    }

    /// Keys with a stored blob, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CoreError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    pub fn delete(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Backup files for `key`, newest first.
    pub fn backups(&self, key: &str) -> Result<Vec<PathBuf>, CoreError> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(BLOB_EXTENSION) {
                entries.push(path);
            }
        }
        entries.sort_by_key(|path| Reverse(path.file_name().map(|name| name.to_os_string())));
        Ok(entries)
    }

    /// Copies the newest backup of `key` back into place and returns its blob.
    pub fn restore_latest(&self, key: &str) -> Result<String, CoreError> {
        let latest = self
            .backups(key)?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::Storage(format!("no backup for `{}`", key)))?;
        let blob = fs::read_to_string(&latest)?;
        self.write_blob(key, &blob)?;
        Ok(blob)
    }

    fn backup_dir(&self, key: &str) -> PathBuf {
        self.data_dir.join(BACKUPS_DIR).join(canonical_name(key))
    }

    fn backup_existing(&self, key: &str, path: &Path) -> Result<(), CoreError> {
        if self.retention == 0 || !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(key);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup_path = dir.join(format!(
            "{}_{}.{}",
            canonical_name(key),
            timestamp,
            BLOB_EXTENSION
        ));
        fs::copy(path, &backup_path)?;
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: &str) -> Result<(), CoreError> {
        for stale in self.backups(key)?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }

    fn write_blob(&self, key: &str, blob: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        self.backup_existing(key, &path)?;
        self.write_blob(key, blob)?;
        debug!(key, path = %path.display(), bytes = blob.len(), "blob saved");
        Ok(())
    }
}

fn canonical_name(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "blob".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigcoin_core::{
        goal_service::GoalService,
        storage::{load_ledger, save_ledger, StorageKeys},
        transaction_service::TransactionService,
    };
    use pigcoin_domain::{Ledger, ScheduleKind, TransactionKind};
    use tempfile::tempdir;

    #[test]
    fn missing_key_loads_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.load("pigcoin_goals").unwrap(), None);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn save_writes_one_file_per_key_without_leftovers() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        store.save("pigcoin_goals", "[]").unwrap();
        store.save("pigcoin_transactions", "[]").unwrap();

        assert!(dir.path().join("pigcoin_goals.json").is_file());
        assert!(!dir.path().join("pigcoin_goals.json.tmp").exists());
        assert_eq!(
            store.keys().unwrap(),
            vec!["pigcoin_goals".to_string(), "pigcoin_transactions".to_string()]
        );
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            store.path_for("../My Goals"),
            dir.path().join("___my_goals.json")
        );
        assert_eq!(store.path_for("  "), dir.path().join("blob.json"));
    }

    #[test]
    fn overwrites_keep_bounded_backups() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::with_retention(dir.path().to_path_buf(), 2).unwrap();
        for round in 0..5 {
            store.save("pigcoin_goals", &format!("[{}]", round)).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        assert_eq!(store.load("pigcoin_goals").unwrap().as_deref(), Some("[4]"));
        assert_eq!(store.backups("pigcoin_goals").unwrap().len(), 2);
        assert_eq!(store.restore_latest("pigcoin_goals").unwrap(), "[3]");
        assert_eq!(store.load("pigcoin_goals").unwrap().as_deref(), Some("[3]"));
    }

    #[test]
    fn zero_retention_skips_backups() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::with_retention(dir.path().to_path_buf(), 0).unwrap();
        store.save("pigcoin_goals", "[1]").unwrap();
        store.save("pigcoin_goals", "[2]").unwrap();
        assert!(store.backups("pigcoin_goals").unwrap().is_empty());
        assert!(store.restore_latest("pigcoin_goals").is_err());
    }

    #[test]
    fn ledger_round_trips_through_files() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        let keys = StorageKeys::default();

        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, "Salary", 500.0, TransactionKind::Income).unwrap();
        let goal =
            GoalService::create(&mut ledger, "Car", 250.0, ScheduleKind::Fixed, Some(100.0))
                .unwrap();
        GoalService::toggle_installment(&mut ledger, goal.id, 3, None).unwrap();
        save_ledger(&store, &keys, &ledger).unwrap();

        let reopened = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(load_ledger(&reopened, &keys).unwrap(), ledger);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        store.save("pigcoin_goals", "[]").unwrap();
        store.delete("pigcoin_goals").unwrap();
        store.delete("pigcoin_goals").unwrap();
        assert_eq!(store.load("pigcoin_goals").unwrap(), None);
    }
}
