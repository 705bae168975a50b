//! Goal lifecycle: creation, installment toggles, ad-hoc progress, deletion.

use tracing::debug;
use uuid::Uuid;

use pigcoin_domain::{Goal, GoalShare, GoalTotals, Installment, Ledger, ScheduleKind};

use crate::{
    amount::{ensure_positive, validate_name},
    schedule::generate_schedule,
    CoreError,
};

/// Result of a goal mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalUpdate {
    pub goal: Goal,
    /// True when this mutation moved the goal from below its target to at or
    /// above it.
    pub completed: bool,
}

impl GoalUpdate {
    fn new(goal: &Goal, before: f64) -> Self {
        Self {
            goal: goal.clone(),
            completed: crossed_target(before, goal.current_value, goal.total_value),
        }
    }
}

/// Returns true when `before < target <= after`.
pub fn crossed_target(before: f64, after: f64, target: f64) -> bool {
    before < target && after >= target
}

/// Provides validated mutation helpers for ledger goals.
pub struct GoalService;

impl GoalService {
    /// Creates a goal with its full installment schedule and prepends it.
    pub fn create(
        ledger: &mut Ledger,
        name: &str,
        total_value: f64,
        kind: ScheduleKind,
        installment_unit: Option<f64>,
    ) -> Result<Goal, CoreError> {
        let name = validate_name(name, "goal name")?;
        let installments = generate_schedule(total_value, kind, installment_unit)?;
        let goal = Goal::new(name, total_value, kind, installments);
        debug!(
            goal_id = %goal.id,
            kind = %goal.kind,
            installments = goal.installments.len(),
            "goal created"
        );
        ledger.goals.insert(0, goal.clone());
        Ok(goal)
    }

    /// Flips the paid flag of installment `number` and recomputes the
    /// goal's current value from every paid slot.
    ///
    /// A provided `value` replaces the installment's stored value.
    pub fn toggle_installment(
        ledger: &mut Ledger,
        goal_id: Uuid,
        number: u32,
        value: Option<f64>,
    ) -> Result<GoalUpdate, CoreError> {
        let value = value
            .map(|value| ensure_positive(value, "installment value"))
            .transpose()?;
        let goal = ledger
            .goal_mut(goal_id)
            .ok_or(CoreError::GoalNotFound(goal_id))?;
        let before = goal.current_value;
        let installment = goal
            .installment_mut(number)
            .ok_or(CoreError::InstallmentNotFound { goal_id, number })?;
        installment.paid = !installment.paid;
        if let Some(value) = value {
            installment.value = value;
        }
        let paid = installment.paid;
        goal.refresh_current_value();
        debug!(goal_id = %goal_id, number, paid, current = goal.current_value, "installment toggled");
        Ok(GoalUpdate::new(goal, before))
    }

    /// Appends a paid installment outside the generated schedule.
    ///
    /// The stored installment value is capped at what is left to reach the
    /// target, so the current value always equals the paid sum. A goal that
    /// already reached its target rejects further progress.
    pub fn add_progress(
        ledger: &mut Ledger,
        goal_id: Uuid,
        amount: f64,
    ) -> Result<GoalUpdate, CoreError> {
        let amount = ensure_positive(amount, "progress amount")?;
        let goal = ledger
            .goal_mut(goal_id)
            .ok_or(CoreError::GoalNotFound(goal_id))?;
        if !goal.kind.uses_installments() {
            return Err(CoreError::InvalidOperation(
                "free goals take direct amount updates, not installments".into(),
            ));
        }
        let remaining = goal.remaining();
        if remaining <= 0.0 {
            return Err(CoreError::GoalAlreadyReached(goal_id));
        }

        let before = goal.current_value;
        let capped = amount >= remaining;
        let applied = if capped { remaining } else { amount };
        let number = goal.next_installment_number();
        goal.installments.push(Installment::paid(number, applied));
        if capped {
            goal.current_value = goal.total_value;
        } else {
            goal.refresh_current_value();
        }
        debug!(goal_id = %goal_id, number, applied, requested = amount, "progress added");
        Ok(GoalUpdate::new(goal, before))
    }

    /// Adjusts a free goal's amount by `delta`, never dropping below zero.
    pub fn update_amount(
        ledger: &mut Ledger,
        goal_id: Uuid,
        delta: f64,
    ) -> Result<GoalUpdate, CoreError> {
        if !delta.is_finite() {
            return Err(CoreError::Validation("amount must be a finite number".into()));
        }
        let goal = ledger
            .goal_mut(goal_id)
            .ok_or(CoreError::GoalNotFound(goal_id))?;
        if goal.kind.uses_installments() {
            return Err(CoreError::InvalidOperation(format!(
                "{} goals track progress through installments",
                goal.kind
            )));
        }
        let before = goal.current_value;
        goal.current_value = (before + delta).max(0.0);
        debug!(goal_id = %goal_id, delta, current = goal.current_value, "goal amount updated");
        Ok(GoalUpdate::new(goal, before))
    }

    /// Removes the goal, returning it when it existed.
    pub fn delete(ledger: &mut Ledger, goal_id: Uuid) -> Option<Goal> {
        let index = ledger.goals.iter().position(|goal| goal.id == goal_id)?;
        Some(ledger.goals.remove(index))
    }

    pub fn list(ledger: &Ledger) -> Vec<&Goal> {
        ledger.goals.iter().collect()
    }

    /// Saved and targeted amounts summed across `goals`.
    pub fn totals(goals: &[Goal]) -> GoalTotals {
        goals.iter().fold(GoalTotals::default(), |acc, goal| GoalTotals {
            total_current: acc.total_current + goal.current_value,
            total_target: acc.total_target + goal.total_value,
        })
    }

    /// Each goal's share of the total amount saved.
    pub fn allocation(goals: &[Goal]) -> Vec<GoalShare> {
        let saved = Self::totals(goals).total_current;
        goals
            .iter()
            .map(|goal| GoalShare {
                goal_id: goal.id,
                name: goal.name.clone(),
                current_value: goal.current_value,
                percent: if saved > 0.0 {
                    goal.current_value / saved * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }
}
