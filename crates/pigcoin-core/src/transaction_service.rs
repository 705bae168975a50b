use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use pigcoin_domain::{Ledger, Transaction, TransactionKind};

use crate::{
    amount::{ensure_positive, parse_amount, validate_name},
    CoreError,
};

/// Provides validated helpers for recording and removing transactions.
pub struct TransactionService;

impl TransactionService {
    /// Records a transaction dated now and prepends it to the ledger.
    pub fn add(
        ledger: &mut Ledger,
        name: &str,
        value: f64,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError> {
        Self::add_dated(ledger, name, value, kind, Utc::now())
    }

    /// Like [`TransactionService::add`] with the amount taken from user input.
    pub fn add_parsed(
        ledger: &mut Ledger,
        name: &str,
        raw_value: &str,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError> {
        let value = parse_amount(raw_value)?;
        Self::add(ledger, name, value, kind)
    }

    pub fn add_dated(
        ledger: &mut Ledger,
        name: &str,
        value: f64,
        kind: TransactionKind,
        date: DateTime<Utc>,
    ) -> Result<Transaction, CoreError> {
        let name = validate_name(name, "transaction name")?;
        let value = ensure_positive(value, "transaction value")?;
        let txn = Transaction::with_date(name, value, kind, date);
        debug!(txn_id = %txn.id, kind = %txn.kind, value, "transaction recorded");
        ledger.transactions.insert(0, txn.clone());
        Ok(txn)
    }

    /// Removes the transaction, returning it when it existed.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Option<Transaction> {
        let index = ledger.transactions.iter().position(|txn| txn.id == id)?;
        let removed = ledger.transactions.remove(index);
        debug!(txn_id = %id, "transaction removed");
        Some(removed)
    }

    /// Looks up a transaction, failing when the id is unknown.
    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&Transaction, CoreError> {
        ledger
            .transaction(id)
            .ok_or(CoreError::TransactionNotFound(id))
    }

    pub fn list(ledger: &Ledger) -> Vec<&Transaction> {
        ledger.transactions.iter().collect()
    }

    pub fn total_balance(ledger: &Ledger) -> f64 {
        ledger.total_balance()
    }
}
