//! In-memory snapshot of every transaction and goal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{goal::Goal, transaction::Transaction};

/// Holds both collections, most recent first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(transactions: Vec<Transaction>, goals: Vec<Goal>) -> Self {
        Self {
            transactions,
            goals,
        }
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn goal(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn goal_mut(&mut self, id: Uuid) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|goal| goal.id == id)
    }

    /// Income minus expenses over the current transaction set.
    pub fn total_balance(&self) -> f64 {
        self.transactions
            .iter()
            .map(Transaction::signed_value)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.goals.is_empty()
    }
}
