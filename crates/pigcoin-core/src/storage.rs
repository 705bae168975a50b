use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use pigcoin_domain::{amounts_match, Goal, Ledger, Transaction};

use crate::CoreError;

pub const TRANSACTIONS_KEY: &str = "pigcoin_transactions";
pub const GOALS_KEY: &str = "pigcoin_goals";

/// Abstraction over key-value backends holding UTF-8 JSON blobs.
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn save(&self, key: &str, blob: &str) -> Result<(), CoreError>;
}

/// Keys the two ledger collections are stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub transactions: String,
    pub goals: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            transactions: TRANSACTIONS_KEY.into(),
            goals: GOALS_KEY.into(),
        }
    }
}

/// Volatile store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, CoreError> {
        Ok(self.entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.entries()?.is_empty())
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), CoreError> {
        self.entries()?.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// Reads both collections, treating a missing or unreadable blob as empty.
///
/// Backend failures still propagate; only undecodable content is tolerated.
pub fn load_ledger(store: &dyn KeyValueStore, keys: &StorageKeys) -> Result<Ledger, CoreError> {
    let transactions: Vec<Transaction> = load_collection(store, &keys.transactions)?;
    let goals: Vec<Goal> = load_collection(store, &keys.goals)?;
    let ledger = Ledger::from_parts(transactions, goals);
    for warning in ledger_warnings(&ledger) {
        warn!(%warning, "loaded ledger anomaly");
    }
    Ok(ledger)
}

/// Writes both collections; stops at the first failing key.
pub fn save_ledger(
    store: &dyn KeyValueStore,
    keys: &StorageKeys,
    ledger: &Ledger,
) -> Result<(), CoreError> {
    save_collection(store, &keys.transactions, &ledger.transactions)?;
    save_collection(store, &keys.goals, &ledger.goals)
}

fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, CoreError> {
    let Some(blob) = store.load(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&blob) {
        Ok(items) => Ok(items),
        Err(err) => {
            warn!(key, error = %err, "discarding unreadable stored data");
            Ok(Vec::new())
        }
    }
}

fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), CoreError> {
    let blob = serde_json::to_string(items)?;
    store.save(key, &blob)
}

/// Detects duplicate ids, duplicate installment numbers, and goals whose
/// current value disagrees with their paid installments.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for txn in &ledger.transactions {
        if !seen.insert(txn.id) {
            warnings.push(format!("transaction {} appears more than once", txn.id));
        }
    }

    let mut seen = HashSet::new();
    for goal in &ledger.goals {
        if !seen.insert(goal.id) {
            warnings.push(format!("goal {} appears more than once", goal.id));
        }
        let mut numbers = HashSet::new();
        for installment in &goal.installments {
            if !numbers.insert(installment.number) {
                warnings.push(format!(
                    "goal {} has duplicate installment {}",
                    goal.id, installment.number
                ));
            }
        }
        if goal.kind.uses_installments() && !amounts_match(goal.current_value, goal.paid_sum()) {
            warnings.push(format!(
                "goal {} current value {:.2} differs from paid installments {:.2}",
                goal.id,
                goal.current_value,
                goal.paid_sum()
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigcoin_domain::{Installment, ScheduleKind, TransactionKind};

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn load(&self, _key: &str) -> Result<Option<String>, CoreError> {
            Err(CoreError::Storage("backend offline".into()))
        }

        fn save(&self, _key: &str, _blob: &str) -> Result<(), CoreError> {
            Err(CoreError::Storage("backend offline".into()))
        }
    }

    #[test]
    fn empty_store_loads_empty_ledger() {
        let store = MemoryStore::new();
        let ledger = load_ledger(&store, &StorageKeys::default()).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn save_writes_both_keys() {
        let store = MemoryStore::new();
        let mut ledger = Ledger::new();
        ledger
            .transactions
            .push(Transaction::new("Salary", 10.0, TransactionKind::Income));

        save_ledger(&store, &StorageKeys::default(), &ledger).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.load(GOALS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn poisoned_memory_store_reports_storage_errors() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let shared = std::sync::Arc::clone(&store);
        let outcome = std::thread::spawn(move || {
            let _guard = shared.entries.lock().unwrap();
            panic!("writer crashed while holding the lock");
        })
        .join();
        assert!(outcome.is_err());

        assert!(matches!(store.len(), Err(CoreError::Storage(_))));
        assert!(matches!(store.is_empty(), Err(CoreError::Storage(_))));
        assert!(matches!(store.load(GOALS_KEY), Err(CoreError::Storage(_))));
        assert!(store.save(GOALS_KEY, "[]").is_err());
    }

    #[test]
    fn corrupt_blob_is_treated_as_missing() {
        let store = MemoryStore::new();
        store.save(TRANSACTIONS_KEY, "{not json").unwrap();
        store.save(GOALS_KEY, "[]").unwrap();

        let ledger = load_ledger(&store, &StorageKeys::default()).unwrap();
        assert!(ledger.transactions.is_empty());
    }

    #[test]
    fn backend_failures_propagate() {
        let keys = StorageKeys::default();
        assert!(matches!(load_ledger(&FailingStore, &keys), Err(CoreError::Storage(_))));
        assert!(save_ledger(&FailingStore, &keys, &Ledger::new()).is_err());
    }

    #[test]
    fn warnings_flag_inconsistent_goals() {
        let mut goal = Goal::new(
            "Trip".to_string(),
            10.0,
            ScheduleKind::Grid,
            vec![Installment::paid(1, 1.0), Installment::new(1, 2.0)],
        );
        goal.current_value = 5.0;
        let ledger = Ledger::from_parts(Vec::new(), vec![goal.clone(), goal]);

        let warnings = ledger_warnings(&ledger);
        assert_eq!(warnings.len(), 5, "{warnings:?}");
        assert!(warnings.iter().any(|w| w.contains("more than once")));
        assert!(ledger_warnings(&Ledger::new()).is_empty());
    }
}
