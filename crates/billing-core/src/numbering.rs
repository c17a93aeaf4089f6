//! # Document Numbering
//!
//! Pure formatting rules for generated document numbers. Randomness and the
//! clock are passed in so these stay deterministic.
//!
//! ```text
//! Sale invoice:   last "41" ──► 42          none / "INV-9" ──► "1"
//!
//! Payment:        PAY-IN-{millis mod 10^8, 8 digits}-{100..=9999}
//!                 PAY-OUT-01234567-4821
//!
//! Fallback:       PAY-IN-{full millis}-{6 digits}
//!                 (used after PAYMENT_NO_MAX_ATTEMPTS collisions)
//! ```

use crate::types::PaymentType;

/// How many generated payment numbers are checked before the fallback.
pub const PAYMENT_NO_MAX_ATTEMPTS: usize = 10;

/// Inclusive range of the short random payment suffix.
pub const PAYMENT_SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 100..=9999;

/// Upper bound (exclusive) of the fallback random suffix.
pub const FALLBACK_SUFFIX_LIMIT: u32 = 1_000_000;

/// Next sale invoice number after `last`.
///
/// Only the leading digits of `last` count. When there is no last number, or it
/// does not start with a digit, numbering restarts at `"1"`.
///
/// ## Example
/// ```rust
/// use billing_core::numbering::next_invoice_no;
///
/// assert_eq!(next_invoice_no(Some("41")), "42");
/// assert_eq!(next_invoice_no(Some("9abc")), "10");
/// assert_eq!(next_invoice_no(Some("INV-7")), "1");
/// assert_eq!(next_invoice_no(None), "1");
/// ```
pub fn next_invoice_no(last: Option<&str>) -> String {
    let leading = last
        .map(|s| {
            let end = s
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            &s[..end]
        })
        .unwrap_or("");

    match leading.parse::<u64>() {
        Ok(n) => n.saturating_add(1).to_string(),
        Err(_) => "1".to_string(),
    }
}

/// Regular payment number: 8-digit timestamp slice and a 3 to 4 digit suffix.
pub fn format_payment_no(payment_type: PaymentType, unix_millis: i64, random: u32) -> String {
    format!(
        "{}-{:08}-{}",
        payment_type.number_prefix(),
        unix_millis.rem_euclid(100_000_000),
        random
    )
}

/// Fallback payment number: the full timestamp and a 6-digit suffix.
pub fn format_fallback_payment_no(payment_type: PaymentType, unix_millis: i64, random: u32) -> String {
    format!(
        "{}-{}-{:06}",
        payment_type.number_prefix(),
        unix_millis,
        random % FALLBACK_SUFFIX_LIMIT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_invoice_no() {
        assert_eq!(next_invoice_no(None), "1");
        assert_eq!(next_invoice_no(Some("")), "1");
        assert_eq!(next_invoice_no(Some("1")), "2");
        assert_eq!(next_invoice_no(Some("0099")), "100");
        assert_eq!(next_invoice_no(Some("12-A")), "13");
        assert_eq!(next_invoice_no(Some("A12")), "1");
    }

    #[test]
    fn test_payment_no_shape() {
        let no = format_payment_no(PaymentType::PaymentIn, 1_700_000_123_456, 482);
        assert_eq!(no, "PAY-IN-00123456-482");

        let no = format_payment_no(PaymentType::PaymentOut, 1_712_345_678_901, 9999);
        assert_eq!(no, "PAY-OUT-45678901-9999");
    }

    #[test]
    fn test_fallback_payment_no_shape() {
        let no = format_fallback_payment_no(PaymentType::PaymentIn, 1_700_000_123_456, 42);
        assert_eq!(no, "PAY-IN-1700000123456-000042");
    }
}
