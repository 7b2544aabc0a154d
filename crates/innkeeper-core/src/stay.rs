//! # Stay Module
//!
//! Calendar dates and the night count derived from them.
//!
//! ## Date Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form input / display     DD.MM.YYYY     "01.01.2024"                   │
//! │  SQLite storage           YYYY-MM-DD     "2024-01-01"  (sortable)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stored dates are read back leniently (ISO first, then `DD.MM.YYYY`) so a
//! file written by older tooling still loads. Anything else fails loudly:
//! a night count is never guessed.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Format used by forms and for display.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";

/// Format used in the database.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d";

/// Parses a user-entered `DD.MM.YYYY` date.
///
/// ## Example
/// ```rust
/// use innkeeper_core::stay::parse_date;
///
/// assert!(parse_date("CheckInDate", "01.01.2024").is_ok());
/// assert!(parse_date("CheckInDate", "2024-01-01").is_err());
/// assert!(parse_date("CheckInDate", "31.02.2024").is_err());
/// ```
pub fn parse_date(field: &str, text: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DISPLAY_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a valid DD.MM.YYYY date", text.trim()),
        }
    })
}

/// Parses a date read back from storage.
pub fn parse_stored_date(field: &str, text: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), STORAGE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text.trim(), DISPLAY_FORMAT))
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("stored value '{}' is not a calendar date", text),
        })
}

/// Formats a date for display (`DD.MM.YYYY`).
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Formats a date for storage (`YYYY-MM-DD`).
pub fn format_stored_date(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}

// =============================================================================
// Stay
// =============================================================================

/// A validated check-in / check-out pair.
///
/// ## Invariant
/// `check_out > check_in`, so [`Stay::nights`] is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl Stay {
    /// Creates a stay, rejecting zero-night and inverted ranges.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use innkeeper_core::Stay;
    ///
    /// let check_in = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let check_out = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
    /// assert_eq!(Stay::new(check_in, check_out).unwrap().nights(), 3);
    /// assert!(Stay::new(check_out, check_in).is_err());
    /// ```
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> ValidationResult<Self> {
        if check_out <= check_in {
            return Err(ValidationError::StayTooShort {
                check_in: format_date(check_in),
                check_out: format_date(check_out),
            });
        }

        Ok(Stay {
            check_in,
            check_out,
        })
    }

    /// Builds a stay from the two stored date columns of a booking.
    pub fn parse_stored(check_in: &str, check_out: &str) -> ValidationResult<Self> {
        Stay::new(
            parse_stored_date("CheckInDate", check_in)?,
            parse_stored_date("CheckOutDate", check_out)?,
        )
    }

    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
