//! Single owner of the in-memory ledger.
//!
//! Every mutation is applied in memory first and then handed to the backend.
//! A failed save never rolls the change back: it is logged, the store is
//! marked as having pending changes, and the next successful save (or
//! [`FinanceStore::close`]) catches up.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use pigcoin_config::{Config, ConfigManager};
use pigcoin_core::{
    storage::{load_ledger, save_ledger, KeyValueStore, MemoryStore, StorageKeys},
    CoreError, GoalService, GoalUpdate, StatisticsService, TransactionService,
};
use pigcoin_domain::{
    Goal, GoalShare, GoalTotals, Ledger, ScheduleKind, SeriesPoint, StatsPeriod, Transaction,
    TransactionKind, TransactionSummary,
};
use pigcoin_storage_json::JsonFileStore;

pub struct FinanceStore {
    ledger: Ledger,
    backend: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    pending: bool,
}

impl FinanceStore {
    /// Loads both collections from `backend`, starting empty when nothing
    /// can be read.
    pub fn open(backend: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let ledger = match load_ledger(backend.as_ref(), &keys) {
            Ok(ledger) => ledger,
            Err(err) => {
                warn!(error = %err, "could not load stored data, starting empty");
                Ledger::new()
            }
        };
        info!(
            transactions = ledger.transactions.len(),
            goals = ledger.goals.len(),
            "finance store opened"
        );
        Self {
            ledger,
            backend,
            keys,
            pending: false,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()), StorageKeys::default())
    }

    /// Opens the JSON file store configured for `manager`'s home.
    pub fn from_config(manager: &ConfigManager, config: &Config) -> Result<Self, CoreError> {
        let backend =
            JsonFileStore::with_retention(manager.data_dir(config), config.backup_retention)?;
        Ok(Self::open(Box::new(backend), storage_keys(config)))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    pub fn goals(&self) -> &[Goal] {
        &self.ledger.goals
    }

    pub fn goal(&self, id: Uuid) -> Option<&Goal> {
        self.ledger.goal(id)
    }

    pub fn total_balance(&self) -> f64 {
        TransactionService::total_balance(&self.ledger)
    }

    pub fn summary(&self) -> TransactionSummary {
        StatisticsService::summarize(&self.ledger.transactions)
    }

    pub fn expense_series(&self, period: StatsPeriod, now: DateTime<Utc>) -> Vec<SeriesPoint> {
        StatisticsService::expense_series(&self.ledger.transactions, period, now)
    }

    pub fn goal_totals(&self) -> GoalTotals {
        GoalService::totals(&self.ledger.goals)
    }

    pub fn goal_allocation(&self) -> Vec<GoalShare> {
        GoalService::allocation(&self.ledger.goals)
    }

    pub fn add_transaction(
        &mut self,
        name: &str,
        value: f64,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError> {
        let txn = TransactionService::add(&mut self.ledger, name, value, kind)?;
        self.persist();
        Ok(txn)
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let removed = TransactionService::remove(&mut self.ledger, id);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    pub fn create_goal(
        &mut self,
        name: &str,
        total_value: f64,
        kind: ScheduleKind,
        installment_unit: Option<f64>,
    ) -> Result<Goal, CoreError> {
        let goal = GoalService::create(&mut self.ledger, name, total_value, kind, installment_unit)?;
        self.persist();
        Ok(goal)
    }

    pub fn toggle_installment(
        &mut self,
        goal_id: Uuid,
        number: u32,
        value: Option<f64>,
    ) -> Result<GoalUpdate, CoreError> {
        let update = GoalService::toggle_installment(&mut self.ledger, goal_id, number, value)?;
        self.persist();
        Ok(update)
    }

    pub fn add_progress(&mut self, goal_id: Uuid, amount: f64) -> Result<GoalUpdate, CoreError> {
        let update = GoalService::add_progress(&mut self.ledger, goal_id, amount)?;
        self.persist();
        Ok(update)
    }

    pub fn update_goal_amount(&mut self, goal_id: Uuid, delta: f64) -> Result<GoalUpdate, CoreError> {
        let update = GoalService::update_amount(&mut self.ledger, goal_id, delta)?;
        self.persist();
        Ok(update)
    }

    pub fn delete_goal(&mut self, goal_id: Uuid) -> Option<Goal> {
        let removed = GoalService::delete(&mut self.ledger, goal_id);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    /// True when the last save failed and memory is ahead of the backend.
    pub fn has_pending_changes(&self) -> bool {
        self.pending
    }

    /// Writes the current snapshot, surfacing any backend failure.
    pub fn flush(&mut self) -> Result<(), CoreError> {
        save_ledger(self.backend.as_ref(), &self.keys, &self.ledger)?;
        self.pending = false;
        Ok(())
    }

    /// Flushes pending changes and releases the store.
    pub fn close(mut self) -> Result<(), CoreError> {
        if self.pending {
            self.flush()?;
        }
        debug!("finance store closed");
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(err) = self.flush() {
            warn!(error = %err, "save failed, keeping changes in memory");
            self.pending = true;
        }
    }
}

impl Drop for FinanceStore {
    fn drop(&mut self) {
        if self.pending {
            if let Err(err) = self.flush() {
                warn!(error = %err, "unsaved changes lost on shutdown");
            }
        }
    }
}

/// Storage keys selected by `config`.
pub fn storage_keys(config: &Config) -> StorageKeys {
    StorageKeys {
        transactions: config.transactions_key.clone(),
        goals: config.goals_key.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    /// Memory store whose saves can be switched off.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: Arc<MemoryStore>,
        offline: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, blob: &str) -> Result<(), CoreError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(CoreError::Storage("disk unavailable".into()));
            }
            self.inner.save(key, blob)
        }
    }

    #[test]
    fn mutations_are_saved_immediately() {
        let backend = FlakyStore::default();
        let mut store = FinanceStore::open(Box::new(backend.clone()), StorageKeys::default());
        store
            .add_transaction("Salary", 500.0, TransactionKind::Income)
            .unwrap();

        let reopened = FinanceStore::open(Box::new(backend), StorageKeys::default());
        assert_eq!(reopened.total_balance(), 500.0);
    }

    #[test]
    fn failed_saves_keep_state_and_flush_later() {
        let backend = FlakyStore::default();
        let mut store = FinanceStore::open(Box::new(backend.clone()), StorageKeys::default());

        backend.offline.store(true, Ordering::SeqCst);
        let goal = store
            .create_goal("Trip", 10.0, ScheduleKind::Grid, None)
            .unwrap();
        assert!(store.has_pending_changes());
        assert_eq!(store.goals().len(), 1);
        assert!(store.flush().is_err());

        backend.offline.store(false, Ordering::SeqCst);
        store.close().unwrap();

        let reopened = FinanceStore::open(Box::new(backend), StorageKeys::default());
        assert_eq!(reopened.goal(goal.id).map(|g| g.installments.len()), Some(4));
    }

    #[test]
    fn drop_flushes_pending_changes() {
        let backend = FlakyStore::default();
        {
            let mut store = FinanceStore::open(Box::new(backend.clone()), StorageKeys::default());
            backend.offline.store(true, Ordering::SeqCst);
            store
                .add_transaction("Rent", 900.0, TransactionKind::Expense)
                .unwrap();
            backend.offline.store(false, Ordering::SeqCst);
        }
        let reopened = FinanceStore::open(Box::new(backend), StorageKeys::default());
        assert_eq!(reopened.total_balance(), -900.0);
    }

    #[test]
    fn noop_deletes_do_not_save() {
        let backend = FlakyStore::default();
        let mut store = FinanceStore::open(Box::new(backend.clone()), StorageKeys::default());
        backend.offline.store(true, Ordering::SeqCst);

        assert!(store.delete_goal(Uuid::new_v4()).is_none());
        assert!(store.remove_transaction(Uuid::new_v4()).is_none());
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn rejected_mutations_leave_snapshot_untouched() {
        let mut store = FinanceStore::in_memory();
        assert!(store.add_transaction("", 10.0, TransactionKind::Income).is_err());
        assert!(store.create_goal("Car", 0.0, ScheduleKind::Fixed, Some(10.0)).is_err());
        assert!(store.ledger().is_empty());
    }

    #[test]
    fn aggregates_reflect_goals() {
        let mut store = FinanceStore::in_memory();
        let goal = store
            .create_goal("Car", 250.0, ScheduleKind::Fixed, Some(100.0))
            .unwrap();
        store.toggle_installment(goal.id, 1, None).unwrap();
        let update = store.add_progress(goal.id, 500.0).unwrap();

        assert!(update.completed);
        assert_eq!(store.goal_totals().total_current, 250.0);
        assert_eq!(store.goal_allocation()[0].percent, 100.0);
    }
}
