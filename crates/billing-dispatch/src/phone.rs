//! Phone number normalization for outbound messages.
//!
//! ```text
//! "+44 20 7946 0958"  → "+442079460958"   (explicit country code kept)
//! "0044 20 7946 0958" → "+442079460958"   (00 international prefix)
//! "098765 43210"      → "+919876543210"   (trunk 0 dropped, default code)
//! "98765-43210"       → "+919876543210"   (10 digits, default code)
//! "919876543210"      → "+919876543210"   (code already present)
//! ```

use crate::error::{DispatchError, DispatchResult};

/// Country code used when the number does not carry one.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

const NATIONAL_NUMBER_LEN: usize = 10;

/// Normalizes `raw` to `+<countrycode><digits>`.
///
/// Everything that is not a digit is dropped, except a leading `+`.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> DispatchResult<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(DispatchError::invalid("phone number", raw));
    }

    let country_code = default_country_code.trim_start_matches('+');

    let normalized = if trimmed.starts_with('+') {
        format!("+{digits}")
    } else if let Some(international) = digits.strip_prefix("00") {
        format!("+{international}")
    } else if digits.starts_with('0') {
        format!("+{country_code}{}", digits.trim_start_matches('0'))
    } else if digits.len() == NATIONAL_NUMBER_LEN {
        format!("+{country_code}{digits}")
    } else if digits.len() == country_code.len() + NATIONAL_NUMBER_LEN
        && digits.starts_with(country_code)
    {
        format!("+{digits}")
    } else {
        format!("+{country_code}{digits}")
    };

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        normalize_phone(raw, DEFAULT_COUNTRY_CODE).unwrap()
    }

    #[test]
    fn test_ten_digits_get_default_code() {
        assert_eq!(normalize("9876543210"), "+919876543210");
        assert_eq!(normalize("98765-43210"), "+919876543210");
        assert_eq!(normalize(" (98765) 43210 "), "+919876543210");
    }

    #[test]
    fn test_trunk_zero_is_dropped() {
        assert_eq!(normalize("09876543210"), "+919876543210");
    }

    #[test]
    fn test_explicit_codes_are_kept() {
        assert_eq!(normalize("+44 20 7946 0958"), "+442079460958");
        assert_eq!(normalize("0044 20 7946 0958"), "+442079460958");
        assert_eq!(normalize("919876543210"), "+919876543210");
    }

    #[test]
    fn test_other_default_code() {
        assert_eq!(normalize_phone("5551234567", "+1").unwrap(), "+15551234567");
    }

    #[test]
    fn test_no_digits_is_rejected() {
        assert!(matches!(
            normalize_phone("n/a", DEFAULT_COUNTRY_CODE),
            Err(DispatchError::Invalid { field: "phone number", .. })
        ));
    }
}
