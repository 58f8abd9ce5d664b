//! Cross-midnight handling.
//!
//! Decides which bookings make up a day when work spans midnight. Depending
//! on the plan's [`DayChangeBehavior`], an overnight pair is attributed to
//! the arrival day, the departure day, or split at midnight into two halves
//! joined by synthetic bookings. Recorded bookings are never modified.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingDirection, DayChangeBehavior};

/// Clock minute at which the arrival-day half of a split ends (23:59).
pub const SPLIT_END_MINUTE: i64 = 23 * 60 + 59;

/// One calendar day's share of a split overnight interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfInterval {
    /// The calendar day this half belongs to.
    pub date: NaiveDate,
    /// The arrival booking (synthetic on the departure day).
    pub come: Booking,
    /// The departure booking (synthetic on the arrival day).
    pub go: Booking,
}

/// An overnight interval split at midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidnightSplit {
    /// The half ending at 23:59 on the arrival day.
    pub arrival_day: HalfInterval,
    /// The half starting at 00:00 on the departure day.
    pub departure_day: HalfInterval,
}

impl MidnightSplit {
    /// Returns the two synthetic bookings created by the split.
    pub fn synthetic_bookings(&self) -> [&Booking; 2] {
        [&self.arrival_day.go, &self.departure_day.come]
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Splits an overnight pair into an arrival-day half and a departure-day half.
///
/// The synthetic bookings carry [`BookingSource::System`](crate::models::BookingSource)
/// and a note naming the booking they complete. Their ids are derived from
/// the original bookings, so splitting the same pair twice yields the same
/// synthetic bookings.
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::split_at_midnight;
/// use zmi_engine::models::{Booking, BookingDirection};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let employee = Uuid::new_v4();
/// let come = Booking::new(employee, day.and_hms_opt(22, 0, 0).unwrap(), BookingDirection::In);
/// let go = Booking::new(employee, day.succ_opt().unwrap().and_hms_opt(6, 0, 0).unwrap(), BookingDirection::Out);
///
/// let split = split_at_midnight(&come, &go);
/// assert_eq!(split.arrival_day.go.minutes_of_day(), 23 * 60 + 59);
/// assert_eq!(split.departure_day.come.minutes_of_day(), 0);
/// assert!(split.arrival_day.go.is_synthetic());
/// ```
pub fn split_at_midnight(arrival: &Booking, departure: &Booking) -> MidnightSplit {
    let arrival_date = arrival.date();
    let departure_date = departure.date();

    let mut synthetic_go = Booking::synthetic(
        arrival.employee_id,
        start_of_day(arrival_date) + Duration::minutes(SPLIT_END_MINUTE),
        BookingDirection::Out,
        format!(
            "Day change auto-complete: departure at 23:59 completing arrival {}",
            arrival.id
        ),
    );
    synthetic_go.id = Uuid::new_v5(&arrival.id, b"day-change-go");

    let mut synthetic_come = Booking::synthetic(
        departure.employee_id,
        start_of_day(departure_date),
        BookingDirection::In,
        format!(
            "Day change auto-complete: arrival at 00:00 completing departure {}",
            departure.id
        ),
    );
    synthetic_come.id = Uuid::new_v5(&departure.id, b"day-change-come");

    MidnightSplit {
        arrival_day: HalfInterval {
            date: arrival_date,
            come: arrival.clone(),
            go: synthetic_go,
        },
        departure_day: HalfInterval {
            date: departure_date,
            come: synthetic_come,
            go: departure.clone(),
        },
    }
}

/// The bookings that make up one day after day-change handling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayAssembly {
    /// Effective bookings for the day, ordered by time.
    pub bookings: Vec<Booking>,
    /// Midnight splits touching the day (auto-complete only).
    pub splits: Vec<MidnightSplit>,
    /// True when an overnight pair affected the day, whether it was credited
    /// here or handed to the neighbouring day.
    pub crosses_midnight: bool,
}

/// Assembles the bookings that belong to `date`.
///
/// `bookings` may cover the previous and the next day; anything else is
/// ignored. An overnight pair is recognised when today's last booking is an
/// arrival and tomorrow's first booking is a departure (outgoing), or when
/// today's first booking is a departure and yesterday's last booking is an
/// arrival (incoming).
///
/// # Behavior
///
/// - `none`: only today's bookings
/// - `at_arrival`: the outgoing departure joins today; an incoming departure
///   is left to yesterday
/// - `at_departure`: the incoming arrival joins today; an outgoing arrival is
///   left to tomorrow
/// - `auto_complete`: both overnight pairs are split at midnight and today
///   keeps its half
pub fn assemble_day(
    date: NaiveDate,
    bookings: &[Booking],
    behavior: DayChangeBehavior,
) -> DayAssembly {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by_key(|b| b.timestamp);

    let on = |day: Option<NaiveDate>| -> Vec<&Booking> {
        sorted
            .iter()
            .copied()
            .filter(|b| Some(b.date()) == day)
            .collect()
    };
    let mut today = on(Some(date));

    if behavior == DayChangeBehavior::None {
        return DayAssembly {
            bookings: today.into_iter().cloned().collect(),
            ..DayAssembly::default()
        };
    }

    let yesterday = on(date.pred_opt());
    let tomorrow = on(date.succ_opt());

    let incoming = match (yesterday.last(), today.first()) {
        (Some(come), Some(go))
            if come.direction == BookingDirection::In && go.direction == BookingDirection::Out =>
        {
            Some((*come, *go))
        }
        _ => None,
    };
    let outgoing = match (today.last(), tomorrow.first()) {
        (Some(come), Some(go))
            if come.direction == BookingDirection::In && go.direction == BookingDirection::Out =>
        {
            Some((*come, *go))
        }
        _ => None,
    };

    let mut extra: Vec<Booking> = Vec::new();
    let mut splits = Vec::new();
    let mut crosses_midnight = false;

    match behavior {
        DayChangeBehavior::None => {}
        DayChangeBehavior::AtArrival => {
            if let Some((_, go)) = incoming {
                today.retain(|b| b.id != go.id);
                crosses_midnight = true;
            }
            if let Some((_, go)) = outgoing {
                extra.push(go.clone());
                crosses_midnight = true;
            }
        }
        DayChangeBehavior::AtDeparture => {
            if let Some((come, _)) = outgoing {
                today.retain(|b| b.id != come.id);
                crosses_midnight = true;
            }
            if let Some((come, _)) = incoming {
                extra.push(come.clone());
                crosses_midnight = true;
            }
        }
        DayChangeBehavior::AutoComplete => {
            if let Some((come, go)) = incoming {
                let split = split_at_midnight(come, go);
                extra.push(split.departure_day.come.clone());
                splits.push(split);
                crosses_midnight = true;
            }
            if let Some((come, go)) = outgoing {
                let split = split_at_midnight(come, go);
                extra.push(split.arrival_day.go.clone());
                splits.push(split);
                crosses_midnight = true;
            }
        }
    }

    let mut assembled: Vec<Booking> = today.into_iter().cloned().chain(extra).collect();
    assembled.sort_by_key(|b| b.timestamp);

    DayAssembly {
        bookings: assembled,
        splits,
        crosses_midnight,
    }
}
