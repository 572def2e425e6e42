//! Monetary amounts as integer cents.
use thiserror::Error;

/// Largest storable amount, 99 999 999.99
pub const MAX_CENTS: i64 = 9_999_999_999;

/// Reasons a user-supplied amount is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Value is required")]
    Empty,

    #[error("Value must be a number such as 1250 or 1250.50")]
    Malformed,

    #[error("Value cannot be negative")]
    Negative,

    #[error("Value may have at most two decimal places")]
    TooPrecise,

    #[error("Value cannot exceed 99999999.99")]
    TooLarge,
}

/// Parse a non-negative decimal amount with up to two fractional digits.
///
/// Surrounding whitespace is ignored. Both `.` and `,` are accepted as the
/// decimal separator; thousands separators are not.
pub fn parse_amount(input: &str) -> Result<i64, MoneyError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(MoneyError::Empty);
    }
    let unsigned = match input.strip_prefix('-') {
        Some(rest) if is_zero(rest) => rest,
        Some(_) => return Err(MoneyError::Negative),
        None => input.strip_prefix('+').unwrap_or(input),
    };

    let (whole, fraction) = match unsigned.split_once(&['.', ','][..]) {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(MoneyError::Malformed);
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoneyError::Malformed);
    }
    if fraction.len() > 2 {
        return Err(MoneyError::TooPrecise);
    }

    let whole = whole.trim_start_matches('0');
    // More than 8 integer digits can never fit.
    if whole.len() > 8 {
        return Err(MoneyError::TooLarge);
    }
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| MoneyError::Malformed)?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| MoneyError::Malformed)? * 10,
        _ => fraction.parse().map_err(|_| MoneyError::Malformed)?,
    };

    let cents = whole * 100 + fraction;
    if cents > MAX_CENTS {
        return Err(MoneyError::TooLarge);
    }
    Ok(cents)
}

/// Render cents with two decimal places, e.g. `125050` as `1250.50`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn is_zero(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| matches!(b, b'0' | b'.' | b','))
        && s.bytes().any(|b| b == b'0')
}
