//! Domain models for income and expense entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub name: String,
    /// Always positive; the sign comes from `kind`.
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn new(name: impl Into<String>, value: f64, kind: TransactionKind) -> Self {
        Self::with_date(name, value, kind, Utc::now())
    }

    pub fn with_date(
        name: impl Into<String>,
        value: f64,
        kind: TransactionKind,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value,
            kind,
            date,
        }
    }

    /// Value with the sign applied: positive for income, negative for expense.
    pub fn signed_value(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.value,
            TransactionKind::Expense => -self.value,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Direction of a transaction relative to the user's balance.
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "expense" | "out" | "-" => Some(TransactionKind::Expense),
            "income" | "in" | "+" => Some(TransactionKind::Income),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Expense => "Expense",
            TransactionKind::Income => "Income",
        };
        f.pad(label)
    }
}
