//! # Validation Module
//!
//! Field-level business rules for the booking store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Coercion (schema::ColumnDef::coerce)                          │
//! │  ├── Raw form text → typed Value                                        │
//! │  └── Wrong shape: "abc" for a price, "2024-01-01" for a date            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Record rules (THIS MODULE, via Record::validate)              │
//! │  ├── Lengths, ranges, non-negative prices                               │
//! │  └── Check-out strictly after check-in                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repository (innkeeper-db)                                     │
//! │  ├── Unique primary keys                                                │
//! │  └── Foreign keys point at existing rows                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use innkeeper_core::money::Money;
//! use innkeeper_core::validation::{validate_price, validate_text};
//!
//! validate_text("Name", "Grand Budapest").unwrap();
//! assert!(validate_price("PricePerNight", Money::from_cents(-1)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_SEARCH_LEN, MAX_TEXT_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a free-text column (names, cities, addresses, room types).
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_TEXT_LEN`] characters
///
/// ## Example
/// ```rust
/// use innkeeper_core::validation::validate_text;
///
/// assert!(validate_text("GuestName", "Ada Lovelace").is_ok());
/// assert!(validate_text("GuestName", "   ").is_err());
/// ```
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a substring search term.
///
/// ## Rules
/// - Can be empty (matches every row)
/// - Maximum [`MAX_SEARCH_LEN`] characters
/// - Leading and trailing spaces are part of the substring
///
/// ## Returns
/// The term, unchanged.
pub fn validate_search_term(term: &str) -> ValidationResult<String> {
    if term.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(term.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a primary or foreign key value.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a nightly room price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary rooms)
///
/// ## Example
/// ```rust
/// use innkeeper_core::money::Money;
/// use innkeeper_core::validation::validate_price;
///
/// assert!(validate_price("PricePerNight", Money::from_cents(10000)).is_ok());
/// assert!(validate_price("PricePerNight", Money::zero()).is_ok());
/// assert!(validate_price("PricePerNight", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the guest capacity of a room.
///
/// ## Rules
/// - At least one guest
pub fn validate_max_guests(field: &str, guests: i64) -> ValidationResult<()> {
    if guests < 1 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an optional hotel rating.
///
/// ## Rules
/// - Absent is fine
/// - Present: finite and non-negative
pub fn validate_rating(field: &str, rating: Option<f64>) -> ValidationResult<()> {
    match rating {
        Some(value) if !value.is_finite() || value < 0.0 => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a non-negative number".to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        assert!(validate_text("Name", "Hotel Adlon").is_ok());
        assert!(validate_text("Name", "Zürich Ост").is_ok());

        assert!(validate_text("Name", "").is_err());
        assert!(validate_text("Name", "   ").is_err());
        assert!(validate_text("Name", &"A".repeat(MAX_TEXT_LEN + 1)).is_err());
        assert!(validate_text("Name", &"A".repeat(MAX_TEXT_LEN)).is_ok());
    }

    #[test]
    fn test_validate_search_term() {
        assert_eq!(validate_search_term("  Ada ").unwrap(), "  Ada ");
        assert_eq!(validate_search_term(" ").unwrap(), " ");
        assert_eq!(validate_search_term("").unwrap(), "");
        assert!(validate_search_term(&"x".repeat(MAX_SEARCH_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("Id", 1).is_ok());
        assert!(validate_id("Id", 0).is_err());
        assert!(validate_id("HotelId", -4).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("PricePerNight", Money::zero()).is_ok());
        assert!(validate_price("PricePerNight", Money::from_cents(1099)).is_ok());
        assert!(validate_price("PricePerNight", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_max_guests() {
        assert!(validate_max_guests("MaxGuests", 1).is_ok());
        assert!(validate_max_guests("MaxGuests", 0).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating("Rating", None).is_ok());
        assert!(validate_rating("Rating", Some(4.5)).is_ok());
        assert!(validate_rating("Rating", Some(0.0)).is_ok());

        assert!(validate_rating("Rating", Some(-1.0)).is_err());
        assert!(validate_rating("Rating", Some(f64::NAN)).is_err());
        assert!(validate_rating("Rating", Some(f64::INFINITY)).is_err());
    }
}
