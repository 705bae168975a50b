//! Amount helpers shared by finance primitives.

/// Tolerance used when comparing monetary amounts and schedule remainders.
pub const AMOUNT_EPSILON: f64 = 0.01;

/// Rounds an amount to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns true when two amounts differ by less than [`AMOUNT_EPSILON`].
pub fn amounts_match(left: f64, right: f64) -> bool {
    (left - right).abs() < AMOUNT_EPSILON
}
