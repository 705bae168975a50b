//! Installment schedule generation for savings goals.
//!
//! Every generated schedule sums to the goal target: exactly for grid
//! schedules, and within [`AMOUNT_EPSILON`] for fixed schedules whose
//! remainder slot is rounded to cents.

use pigcoin_domain::{amounts_match, round_cents, Installment, ScheduleKind, AMOUNT_EPSILON};

use crate::{amount::ensure_positive, CoreError};

/// Installment numbers are `u32`, so a schedule (remainder slot included)
/// cannot hold more than this many slots.
pub const MAX_INSTALLMENTS: u64 = u32::MAX as u64;

/// Builds the installment list for a new goal.
///
/// `installment_unit` is required (and must be positive) for
/// [`ScheduleKind::Fixed`] and ignored otherwise.
pub fn generate_schedule(
    total_value: f64,
    kind: ScheduleKind,
    installment_unit: Option<f64>,
) -> Result<Vec<Installment>, CoreError> {
    let total = ensure_positive(total_value, "target amount")?;
    match kind {
        ScheduleKind::Grid => grid_schedule(total),
        ScheduleKind::Fixed => {
            let unit = installment_unit.ok_or_else(|| {
                CoreError::Validation("fixed goals need an installment value".into())
            })?;
            let unit = ensure_positive(unit, "installment value")?;
            fixed_schedule(total, unit)
        }
        ScheduleKind::Free => Ok(Vec::new()),
    }
}

/// Triangular schedule: slot `k` is worth `k`, followed by one remainder slot
/// when the triangular sum falls short of `total`.
pub fn grid_schedule(total: f64) -> Result<Vec<Installment>, CoreError> {
    let mut n = (2.0 * total).sqrt().floor() as u64;
    ensure_slot_budget(n)?;
    // floor(sqrt(2T)) can overshoot by one; the sum must stay at or below T.
    while n > 0 && triangular(n) > total {
        n -= 1;
    }

    let mut installments: Vec<Installment> = (1..=n)
        .map(|k| Installment::new(k as u32, k as f64))
        .collect();
    let remainder = total - triangular(n);
    if remainder > 0.0 {
        installments.push(Installment::new(n as u32 + 1, remainder));
    }
    Ok(installments)
}

/// Equal slots of `unit`, followed by a cent-rounded remainder slot when the
/// remainder exceeds [`AMOUNT_EPSILON`].
pub fn fixed_schedule(total: f64, unit: f64) -> Result<Vec<Installment>, CoreError> {
    let mut count = (total / unit).floor() as u64;
    ensure_slot_budget(count)?;
    let mut remainder = total - count as f64 * unit;
    if amounts_match(remainder, unit) {
        // `total / unit` landed just under an integer.
        count += 1;
        remainder = 0.0;
    }
    ensure_slot_budget(count)?;

    let mut installments: Vec<Installment> = (1..=count)
        .map(|k| Installment::new(k as u32, unit))
        .collect();
    if remainder > AMOUNT_EPSILON {
        installments.push(Installment::new(count as u32 + 1, round_cents(remainder)));
    }
    Ok(installments)
}

fn triangular(n: u64) -> f64 {
    (n * (n + 1) / 2) as f64
}

fn ensure_slot_budget(count: u64) -> Result<(), CoreError> {
    if count >= MAX_INSTALLMENTS {
        return Err(CoreError::Validation(format!(
            "schedule would need {} or more installments",
            MAX_INSTALLMENTS
        )));
    }
    Ok(())
}
