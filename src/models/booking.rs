//! Booking model and related types.
//!
//! A booking is a single clock event. Bookings are read-only to the engine;
//! corrections arrive as new bookings and midnight splits produce new
//! system bookings rather than touching the recorded ones.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: i32 = 1440;

/// The direction of a clock event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingDirection {
    /// Clocking in (arrival, "come").
    In,
    /// Clocking out (departure, "go").
    Out,
}

impl std::fmt::Display for BookingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingDirection::In => write!(f, "in"),
            BookingDirection::Out => write!(f, "out"),
        }
    }
}

/// Where a booking came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    /// Captured by a clock terminal.
    Device,
    /// Entered by hand.
    Manual,
    /// Created by a correction workflow.
    Correction,
    /// Generated by the engine (midnight splits).
    System,
}

/// A single clock-in or clock-out event.
///
/// # Example
///
/// ```
/// use zmi_engine::models::{Booking, BookingDirection};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let timestamp = NaiveDate::from_ymd_opt(2026, 3, 2)
///     .unwrap()
///     .and_hms_opt(8, 5, 0)
///     .unwrap();
/// let booking = Booking::new(Uuid::new_v4(), timestamp, BookingDirection::In);
/// assert_eq!(booking.minutes_of_day(), 485);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier for the booking.
    pub id: Uuid,
    /// The employee who booked.
    pub employee_id: Uuid,
    /// Date and clock time of the event.
    pub timestamp: NaiveDateTime,
    /// Whether this is an arrival or a departure.
    pub direction: BookingDirection,
    /// Where the booking was captured.
    pub source: BookingSource,
    /// Explicit partner booking, when the capture flow linked the pair.
    #[serde(default)]
    pub pair_id: Option<Uuid>,
    /// Free-text annotation.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Booking {
    /// Creates a device booking with a fresh id.
    pub fn new(employee_id: Uuid, timestamp: NaiveDateTime, direction: BookingDirection) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            timestamp,
            direction,
            source: BookingSource::Device,
            pair_id: None,
            notes: None,
        }
    }

    /// Creates a system booking annotated with the reason it exists.
    pub fn synthetic(
        employee_id: Uuid,
        timestamp: NaiveDateTime,
        direction: BookingDirection,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            timestamp,
            direction,
            source: BookingSource::System,
            pair_id: None,
            notes: Some(note.into()),
        }
    }

    /// Returns the calendar date of the booking.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Returns the clock time as minutes from midnight (0-1439).
    pub fn minutes_of_day(&self) -> i32 {
        let time = self.timestamp.time();
        (time.hour() * 60 + time.minute()) as i32
    }

    /// Returns the booking time in minutes relative to the midnight starting `date`.
    ///
    /// Bookings on the previous day are negative, bookings on the next day
    /// are 1440 or more.
    pub fn minutes_relative_to(&self, date: NaiveDate) -> i32 {
        let day_offset = (self.date() - date).num_days() as i32;
        day_offset * MINUTES_PER_DAY + self.minutes_of_day()
    }

    /// Returns true for bookings generated by the engine.
    pub fn is_synthetic(&self) -> bool {
        self.source == BookingSource::System
    }
}
