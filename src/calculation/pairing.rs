//! Pairing of arrival and departure events into work intervals.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BookingDirection, DailyErrorCode};

/// A booking prepared for one day's calculation.
///
/// All times are relative to the calculated day. `recorded` is the booked
/// time, `normalized` the time after tolerance and rounding, and `minutes`
/// the creditable time after capping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkEvent {
    /// The booking this event came from.
    pub booking_id: Uuid,
    /// Explicit partner booking, if any.
    pub pair_id: Option<Uuid>,
    /// Arrival or departure.
    pub direction: BookingDirection,
    /// Booked time.
    pub recorded: i32,
    /// Time after tolerance and rounding.
    pub normalized: i32,
    /// Creditable time.
    pub minutes: i32,
    /// True for midnight-split events generated by the engine.
    pub synthetic: bool,
}

/// A paired stretch of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// Start minute relative to the calculated day.
    pub start: i32,
    /// End minute relative to the calculated day.
    pub end: i32,
    /// The arrival booking.
    pub come_id: Uuid,
    /// The departure booking.
    pub go_id: Uuid,
}

impl WorkInterval {
    /// Returns the interval length in minutes (never negative).
    pub fn duration(&self) -> i32 {
        (self.end - self.start).max(0)
    }
}

/// The outcome of pairing a day's events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingResult {
    /// Intervals sorted by start time.
    pub intervals: Vec<WorkInterval>,
    /// Pairing errors found.
    pub errors: BTreeSet<DailyErrorCode>,
    /// Bookings that could not be paired.
    pub unpaired: Vec<Uuid>,
    /// Worked minutes of the paired intervals outside the evaluation window.
    pub capped_minutes: i32,
}

impl PairingResult {
    /// Sum of all interval durations.
    pub fn gross_minutes(&self) -> i32 {
        self.intervals.iter().map(WorkInterval::duration).sum()
    }
}

/// Pairs arrival and departure events into work intervals.
///
/// Events linked by `pair_id` are paired first. The remaining events are
/// paired sequentially in the given order: each arrival with the next
/// departure.
///
/// Credited intervals never overlap: an interval pulled before the end of
/// the previous one by normalization starts where the previous one ends, and
/// an interval whose credited end precedes its start is empty.
///
/// Capped minutes are counted per pair, as the part of the normalized
/// interval that capping removed. Unpaired bookings cap nothing.
///
/// # Errors reported
///
/// - `MISSING_COME`: a departure with no open arrival
/// - `MISSING_GO`: an arrival followed by another arrival, or left open
/// - `OVERLAPPING_BOOKINGS`: a recorded interval starts before the previous
///   one ends
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::{pair_events, WorkEvent};
/// use zmi_engine::models::BookingDirection;
/// use uuid::Uuid;
///
/// let event = |direction, minutes| WorkEvent {
///     booking_id: Uuid::new_v4(),
///     pair_id: None,
///     direction,
///     recorded: minutes,
///     normalized: minutes,
///     minutes,
///     synthetic: false,
/// };
/// let events = vec![
///     event(BookingDirection::In, 480),
///     event(BookingDirection::Out, 720),
///     event(BookingDirection::In, 750),
///     event(BookingDirection::Out, 990),
/// ];
///
/// let result = pair_events(&events);
/// assert_eq!(result.intervals.len(), 2);
/// assert_eq!(result.gross_minutes(), 480);
/// assert!(result.errors.is_empty());
/// ```
pub fn pair_events(events: &[WorkEvent]) -> PairingResult {
    let mut result = PairingResult::default();
    let mut used = vec![false; events.len()];
    let mut pairs: Vec<(&WorkEvent, &WorkEvent)> = Vec::new();

    // Explicitly linked pairs
    for (i, come) in events.iter().enumerate() {
        if used[i] || come.direction != BookingDirection::In {
            continue;
        }
        let Some(partner) = come.pair_id else {
            continue;
        };
        let found = events.iter().enumerate().find(|(j, go)| {
            !used[*j]
                && go.booking_id == partner
                && go.direction == BookingDirection::Out
                && go.recorded >= come.recorded
        });
        if let Some((j, go)) = found {
            used[i] = true;
            used[j] = true;
            pairs.push((come, go));
        }
    }

    // Sequential pairing of the rest
    let mut open: Option<&WorkEvent> = None;
    for (i, event) in events.iter().enumerate() {
        if used[i] {
            continue;
        }
        match event.direction {
            BookingDirection::In => {
                if let Some(previous) = open.replace(event) {
                    result.errors.insert(DailyErrorCode::MissingGo);
                    result.unpaired.push(previous.booking_id);
                }
            }
            BookingDirection::Out => match open.take() {
                Some(come) => pairs.push((come, event)),
                None => {
                    result.errors.insert(DailyErrorCode::MissingCome);
                    result.unpaired.push(event.booking_id);
                }
            },
        }
    }
    if let Some(come) = open {
        result.errors.insert(DailyErrorCode::MissingGo);
        result.unpaired.push(come.booking_id);
    }

    pairs.sort_by(|a, b| {
        a.0.recorded
            .cmp(&b.0.recorded)
            .then(a.1.recorded.cmp(&b.1.recorded))
    });

    let overlapping = pairs.windows(2).any(|w| w[1].0.recorded < w[0].1.recorded);
    if overlapping {
        result.errors.insert(DailyErrorCode::OverlappingBookings);
    }

    let mut credited_until = i32::MIN;
    for (come, go) in pairs {
        let worked = (go.normalized - come.normalized).max(0);
        let creditable = (go.minutes - come.minutes).max(0);
        result.capped_minutes += (worked - creditable).max(0);

        let start = come.minutes.max(credited_until);
        let end = go.minutes.max(start);
        credited_until = credited_until.max(end);
        result.intervals.push(WorkInterval {
            start,
            end,
            come_id: come.booking_id,
            go_id: go.booking_id,
        });
    }

    result
}

/// Returns the gaps between consecutive intervals (recorded breaks).
///
/// Overlapping or touching intervals contribute no gap.
pub fn recorded_breaks(intervals: &[WorkInterval]) -> Vec<i32> {
    intervals
        .windows(2)
        .map(|pair| pair[1].start - pair[0].end)
        .filter(|gap| *gap > 0)
        .collect()
}
