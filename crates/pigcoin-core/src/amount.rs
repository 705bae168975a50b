//! Boundary validation for user-entered names and amounts.

use crate::CoreError;

/// Parses a user-entered monetary amount.
///
/// Accepts both `.` and `,` as the decimal separator. When both appear, the
/// rightmost one is the decimal separator and the other is treated as digit
/// grouping (`"1.234,56"` and `"1,234.56"` both parse to `1234.56`). A lone
/// comma is always a decimal separator, so `"1,234"` parses to `1.234`.
/// Rejects empty, unparseable, non-finite, zero, and negative input.
pub fn parse_amount(raw: &str) -> Result<f64, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("amount is required".into()));
    }
    let normalized = normalize_separators(trimmed);
    let value: f64 = normalized
        .parse()
        .map_err(|_| CoreError::Validation(format!("`{}` is not a valid amount", trimmed)))?;
    ensure_positive(value, "amount")
}

/// Parses an amount with an optional leading `+` or `-` sign.
pub fn parse_signed_amount(raw: &str) -> Result<f64, CoreError> {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('-') {
        return parse_amount(rest).map(|value| -value);
    }
    parse_amount(trimmed.strip_prefix('+').unwrap_or(trimmed))
}

/// Ensures `value` is a finite, strictly positive number.
pub fn ensure_positive(value: f64, field: &str) -> Result<f64, CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{} must be a positive number",
            field
        )));
    }
    Ok(value)
}

/// Trims a label and rejects it when nothing remains.
pub fn validate_name(raw: &str, field: &str) -> Result<String, CoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(name.to_string())
}

fn normalize_separators(input: &str) -> String {
    let last_comma = input.rfind(',');
    let last_dot = input.rfind('.');
    match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => input.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => input.replace(',', ""),
        (Some(_), None) if input.matches(',').count() == 1 => input.replace(',', "."),
        (Some(_), None) => input.replace(',', ""),
        (None, Some(_)) if input.matches('.').count() > 1 => input.replace('.', ""),
        _ => input.to_string(),
    }
}
