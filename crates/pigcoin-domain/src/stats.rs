//! Aggregated views over transactions used by chart and summary screens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Total spent or earned under a single transaction name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedTotal {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub top_incomes: Vec<NamedTotal>,
    pub top_expenses: Vec<NamedTotal>,
}

/// One labelled bucket of a time series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Look-back window for expense series.
pub enum StatsPeriod {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl StatsPeriod {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1d" | "day" => Some(StatsPeriod::Day),
            "7d" | "week" => Some(StatsPeriod::Week),
            "1m" | "month" => Some(StatsPeriod::Month),
            "1y" | "1a" | "year" => Some(StatsPeriod::Year),
            _ => None,
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatsPeriod::Day => "1D",
            StatsPeriod::Week => "7D",
            StatsPeriod::Month => "1M",
            StatsPeriod::Year => "1Y",
        };
        f.pad(label)
    }
}
