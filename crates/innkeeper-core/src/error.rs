//! # Error Types
//!
//! Domain-specific error types for innkeeper-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  innkeeper-core errors (this file)                                     │
//! │  ├── CoreError        - Domain and programming errors                  │
//! │  └── ValidationError  - Input the user can correct                     │
//! │                                                                         │
//! │  innkeeper-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → presentation message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of Failure
//! - **Validation** errors name the offending field and are shown to the
//!   user; the mutation is not applied.
//! - **Fatal** errors (unknown column, wrong column type for search) mean the
//!   caller is wired incorrectly. Nothing is retried.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A table name that is not one of the four known tables.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// A column name that does not exist in the given table.
    #[error("Unknown column {column} in {table}")]
    UnknownColumn { table: String, column: String },

    /// Substring search was requested on a column that does not hold text.
    #[error("Column {column} in {table} is not a text column and cannot be searched")]
    NotSearchable { table: String, column: String },

    /// A row did not have the shape the schema describes.
    #[error("{table} row has {found} values, expected {expected}")]
    ColumnCount {
        table: String,
        expected: usize,
        found: usize,
    },

    /// Fields built for one table were applied to another.
    #[error("Fields for {found} cannot be applied to {expected}")]
    TableMismatch { expected: String, found: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for errors a correct caller never triggers.
    ///
    /// ## Usage
    /// The presentation layer shows validation errors next to the form and
    /// treats everything else as a bug report.
    pub fn is_fatal(&self) -> bool {
        !self.is_validation()
    }

    /// Returns true when the user can fix the input and try again.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet the data model's rules.
/// Every variant names the column so the form can highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad date, not a number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Primary key already taken.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A foreign key pointing at a row that does not exist.
    ///
    /// ## User Workflow
    /// ```text
    /// Insert BookedRoom { BookingId: 7, RoomId: 2 }
    ///      │
    ///      ▼
    /// Bookings has no Id 7
    ///      │
    ///      ▼
    /// DanglingReference { field: "BookingId", table: "Bookings", id: 7 }
    /// ```
    #[error("{field} {id} does not exist in {table}")]
    DanglingReference { field: String, table: String, id: i64 },

    /// Check-out is not strictly after check-in.
    #[error("Check-out date {check_out} must be at least one day after check-in date {check_in}")]
    StayTooShort { check_in: String, check_out: String },

    /// Column that callers may not set (primary key on update, derived fields).
    #[error("{field} cannot be set directly")]
    NotAssignable { field: String },

    /// Money arithmetic exceeded the representable range.
    #[error("{field} is too large")]
    Overflow { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::DanglingReference {
            field: "HotelId".to_string(),
            table: "Hotels".to_string(),
            id: 9,
        };
        assert_eq!(err.to_string(), "HotelId 9 does not exist in Hotels");

        let err = ValidationError::StayTooShort {
            check_in: "04.01.2024".to_string(),
            check_out: "04.01.2024".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Check-out date 04.01.2024 must be at least one day after check-in date 04.01.2024"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "Name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(core_err.is_validation());
        assert!(!core_err.is_fatal());
    }

    #[test]
    fn test_unknown_column_is_fatal() {
        let err = CoreError::UnknownColumn {
            table: "Rooms".to_string(),
            column: "Colour".to_string(),
        };
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Unknown column Colour in Rooms");
    }
}
