//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::schedule::{parse_date, parse_time};

/// Validates a `YYYY-MM-DD` calendar date.
///
/// # Examples
///
/// ```ignore
/// validate_date("2026-10-24") // Ok
/// validate_date("2026-02-30") // Err - not a real day
/// validate_date("24/10/2026") // Err - wrong layout
/// ```
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value).map(|_| ()).map_err(|err| {
        let mut error = ValidationError::new("date_format");
        error.message = Some(err.to_string().into());
        error
    })
}

/// Validates a 24-hour `HH:MM` clock time.
pub fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    parse_time(value).map(|_| ()).map_err(|err| {
        let mut error = ValidationError::new("time_format");
        error.message = Some(err.to_string().into());
        error
    })
}

/// Rejects empty or whitespace-only text.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("value must not be blank".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2026-10-24").is_ok());
        assert!(validate_date("2028-02-29").is_ok());
        assert!(validate_date("2026-02-30").is_err());
        assert!(validate_date("2026-1-5").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn test_validate_clock_time() {
        assert!(validate_clock_time("00:00").is_ok());
        assert!(validate_clock_time("23:59").is_ok());
        assert!(validate_clock_time("24:00").is_err());
        assert!(validate_clock_time("9:30").is_err());
        assert!(validate_clock_time("09:30:00").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Court 3").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
