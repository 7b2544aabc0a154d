//! # Money Module
//!
//! Provides the `Money` type for room prices and booking totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Stored as REAL, a booking total drifts:                                │
//! │    3 nights × 33.10 = 99.30000000000001  ❌ not equal to the sum        │
//! │                                                                         │
//! │  OUR SOLUTION: integer hundredths                                       │
//! │    3 × 3310 = 9930  ✅ TotalCost matches Σ price × nights exactly       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use innkeeper_core::money::Money;
//!
//! let price: Money = "150.50".parse().unwrap();
//! assert_eq!(price.cents(), 15050);
//! assert_eq!(price.checked_times(3).unwrap().to_string(), "451.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in hundredths of the single currency unit.
///
/// ## Design Decisions
/// - **i64**: totals of any realistic hotel dataset fit with room to spare
/// - **No currency**: the store deals in one currency only
/// - **Stored as INTEGER** in SQLite (binds and decodes directly with the
///   `sqlx` feature), displayed as `150.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from hundredths.
    ///
    /// ## Example
    /// ```rust
    /// use innkeeper_core::money::Money;
    ///
    /// let price = Money::from_cents(10000); // 100.00
    /// assert_eq!(price.cents(), 10000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in hundredths.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the hundredths portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a count of nights, `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Room: Double 100.00 / night
    /// Booking: 3 nights
    ///      │
    ///      ▼
    /// checked_times(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line cost: 300.00
    /// ```
    #[inline]
    pub fn checked_times(&self, count: i64) -> Option<Money> {
        self.0.checked_mul(count).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Why a piece of text is not a money amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a number")]
    Invalid(String),

    #[error("at most two decimal places are allowed")]
    TooPrecise,

    #[error("amount is too large")]
    Overflow,
}

/// Parses form input such as `150`, `150.5`, `150.50` or `150,50`.
///
/// ## Rules
/// - Optional leading `-` (rejected later by price validation)
/// - `.` or `,` as the decimal separator
/// - At most two decimal digits, so no rounding ever happens
impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let normalized = digits.replace(',', ".");
        let (major, minor) = normalized
            .split_once('.')
            .unwrap_or((normalized.as_str(), ""));

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (major.is_empty() && minor.is_empty()) || !all_digits(major) || !all_digits(minor) {
            return Err(ParseMoneyError::Invalid(text.to_string()));
        }
        if minor.len() > 2 {
            return Err(ParseMoneyError::TooPrecise);
        }

        let major: i64 = if major.is_empty() {
            0
        } else {
            major.parse().map_err(|_| ParseMoneyError::Overflow)?
        };
        let minor: i64 = match minor.len() {
            0 => 0,
            len => {
                let value: i64 = minor
                    .parse()
                    .map_err(|_| ParseMoneyError::Invalid(text.to_string()))?;
                if len == 1 {
                    value * 10
                } else {
                    value
                }
            }
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or(ParseMoneyError::Overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering, `450.00`. The presentation layer owns any
/// currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
