//! Savings goals and their installment schedules.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One slot of a goal's payment schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Installment {
    /// 1-based position, unique within the owning goal.
    pub number: u32,
    pub value: f64,
    pub paid: bool,
}

impl Installment {
    pub fn new(number: u32, value: f64) -> Self {
        Self {
            number,
            value,
            paid: false,
        }
    }

    pub fn paid(number: u32, value: f64) -> Self {
        Self {
            number,
            value,
            paid: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Selects how a goal's target is split into installments.
pub enum ScheduleKind {
    /// Triangular schedule: slot `k` costs `k`, plus a remainder slot.
    Grid,
    /// Equal slots of a caller-chosen unit, plus a remainder slot.
    Fixed,
    /// Savings jar without installments; the amount is adjusted directly.
    Free,
}

impl ScheduleKind {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grid" => Some(ScheduleKind::Grid),
            "fixed" => Some(ScheduleKind::Fixed),
            "free" | "jar" => Some(ScheduleKind::Free),
            _ => None,
        }
    }

    pub fn uses_installments(self) -> bool {
        !matches!(self, ScheduleKind::Free)
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScheduleKind::Grid => "Grid",
            ScheduleKind::Fixed => "Fixed",
            ScheduleKind::Free => "Free",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub total_value: f64,
    /// For installment goals this is the sum of paid installment values.
    pub current_value: f64,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    #[serde(default)]
    pub installments: Vec<Installment>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        name: impl Into<String>,
        total_value: f64,
        kind: ScheduleKind,
        installments: Vec<Installment>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            total_value,
            current_value: 0.0,
            kind,
            installments,
            created_at: Utc::now(),
        }
    }

    pub fn installment(&self, number: u32) -> Option<&Installment> {
        self.installments.iter().find(|inst| inst.number == number)
    }

    pub fn installment_mut(&mut self, number: u32) -> Option<&mut Installment> {
        self.installments
            .iter_mut()
            .find(|inst| inst.number == number)
    }

    /// Sum of the values of every paid installment.
    pub fn paid_sum(&self) -> f64 {
        self.installments
            .iter()
            .filter(|inst| inst.paid)
            .map(|inst| inst.value)
            .sum()
    }

    /// Sum of every installment value, paid or not.
    pub fn scheduled_sum(&self) -> f64 {
        self.installments.iter().map(|inst| inst.value).sum()
    }

    pub fn paid_count(&self) -> usize {
        self.installments.iter().filter(|inst| inst.paid).count()
    }

    /// Recomputes `current_value` from the paid installments.
    pub fn refresh_current_value(&mut self) {
        self.current_value = self.paid_sum();
    }

    /// Next installment number; never reuses a number already present.
    pub fn next_installment_number(&self) -> u32 {
        self.installments
            .iter()
            .map(|inst| inst.number)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn remaining(&self) -> f64 {
        (self.total_value - self.current_value).max(0.0)
    }

    pub fn is_completed(&self) -> bool {
        self.current_value >= self.total_value
    }

    /// Progress towards the target as a percentage, unclamped.
    pub fn progress_percent(&self) -> f64 {
        if self.total_value > 0.0 {
            self.current_value / self.total_value * 100.0
        } else {
            0.0
        }
    }
}

/// Aggregate of saved versus targeted amounts across goals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalTotals {
    pub total_current: f64,
    pub total_target: f64,
}

/// A goal's share of everything saved across all goals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalShare {
    pub goal_id: Uuid,
    pub name: String,
    pub current_value: f64,
    pub percent: f64,
}
