//! # Pricing
//!
//! The booking cost formula and the audit that checks stored derived values
//! against it.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TotalCost(booking) = Σ  PricePerNight(room) × NumberOfNights(line)      │
//! │                      lines                                              │
//! │                                                                         │
//! │  NumberOfNights(line) = CheckOutDate - CheckInDate   (of the parent)    │
//! │                                                                         │
//! │  No lines → 0.00                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic is checked. A total that does not fit in `i64` hundredths
//! is a validation error, never a wrapped number.

use serde::Serialize;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Booking;
use crate::validation::ValidationResult;

// =============================================================================
// Line Charges
// =============================================================================

/// One line item's contribution to a booking total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCharge {
    pub price_per_night: Money,
    pub nights: i64,
}

impl LineCharge {
    pub fn new(price_per_night: Money, nights: i64) -> Self {
        LineCharge {
            price_per_night,
            nights,
        }
    }

    /// `price × nights`.
    pub fn cost(&self) -> ValidationResult<Money> {
        self.price_per_night
            .checked_times(self.nights)
            .ok_or_else(|| ValidationError::Overflow {
                field: "TotalCost".to_string(),
            })
    }
}

/// Sums the charges of a booking's line items.
///
/// ## Example
/// ```rust
/// use innkeeper_core::money::Money;
/// use innkeeper_core::pricing::{booking_total, LineCharge};
///
/// let lines = [
///     LineCharge::new(Money::from_cents(10000), 3),
///     LineCharge::new(Money::from_cents(5000), 3),
/// ];
/// assert_eq!(booking_total(lines).unwrap(), Money::from_cents(45000));
/// assert_eq!(booking_total(std::iter::empty()).unwrap(), Money::zero());
/// ```
pub fn booking_total<I>(lines: I) -> ValidationResult<Money>
where
    I: IntoIterator<Item = LineCharge>,
{
    lines.into_iter().try_fold(Money::zero(), |total, line| {
        total
            .checked_add(line.cost()?)
            .ok_or_else(|| ValidationError::Overflow {
                field: "TotalCost".to_string(),
            })
    })
}

// =============================================================================
// Audit
// =============================================================================

/// A stored line item as seen by the audit. `price` is `None` when the
/// referenced room does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub booked_room_id: i64,
    pub nights: i64,
    pub price: Option<Money>,
}

/// A derived value that does not match what the formula says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum Discrepancy {
    /// `Bookings.TotalCost` differs from the sum over its line items.
    #[serde(rename_all = "camelCase")]
    TotalCost {
        booking_id: i64,
        stored: Money,
        expected: Money,
    },

    /// `BookedRooms.NumberOfNights` differs from the parent's stay.
    #[serde(rename_all = "camelCase")]
    Nights {
        booked_room_id: i64,
        booking_id: i64,
        stored: i64,
        expected: i64,
    },

    /// The booking's dates do not form a valid stay, so nothing can be derived.
    #[serde(rename_all = "camelCase")]
    InvalidStay { booking_id: i64, reason: String },
}

/// Compares a booking and its line items against the formula.
///
/// Line items whose room is missing count as zero, matching what the
/// repository computes through its inner join.
pub fn audit_booking(booking: &Booking, lines: &[LineItem]) -> Vec<Discrepancy> {
    let stay = match booking.stay() {
        Ok(stay) => stay,
        Err(err) => {
            return vec![Discrepancy::InvalidStay {
                booking_id: booking.id,
                reason: err.to_string(),
            }]
        }
    };
    let nights = stay.nights();

    let mut found: Vec<Discrepancy> = lines
        .iter()
        .filter(|line| line.nights != nights)
        .map(|line| Discrepancy::Nights {
            booked_room_id: line.booked_room_id,
            booking_id: booking.id,
            stored: line.nights,
            expected: nights,
        })
        .collect();

    let charges = lines
        .iter()
        .filter_map(|line| line.price.map(|price| LineCharge::new(price, nights)));
    match booking_total(charges) {
        Ok(expected) if expected != booking.total_cost => found.push(Discrepancy::TotalCost {
            booking_id: booking.id,
            stored: booking.total_cost,
            expected,
        }),
        Ok(_) => {}
        Err(err) => found.push(Discrepancy::InvalidStay {
            booking_id: booking.id,
            reason: err.to_string(),
        }),
    }

    found
}

// =============================================================================
// Unit Tests
// =============================================================================
