//! Tolerance normalization.
//!
//! Snaps a booking time to the plan's expected boundary when it falls inside
//! a tolerance band. Fixed plans use all four bands. Flextime plans never
//! snap: their come-minus and go-plus tolerances widen the evaluation window
//! instead (see [`capping`](super::capping)), and come-plus and go-minus do
//! not apply at all.

use crate::models::{BookingDirection, DayPlanConfig, MINUTES_PER_DAY, PlanType};

/// Returns the plan's scheduled start and end when the schedule runs past
/// midnight (`go_to` earlier than `come_from`).
pub(crate) fn overnight_span(plan: &DayPlanConfig) -> Option<(i32, i32)> {
    match (plan.come_from, plan.go_to) {
        (Some(from), Some(to)) if to < from => Some((from, to)),
        _ => None,
    }
}

/// Places a clock-time `boundary` of `plan` on the shift that starts on the
/// calculated day.
///
/// Boundaries of an overnight plan that lie before `come_from` belong to
/// the next day.
pub(crate) fn shift_boundary(plan: &DayPlanConfig, boundary: i32) -> i32 {
    match overnight_span(plan) {
        Some((from, _)) if boundary < from => boundary + MINUTES_PER_DAY,
        _ => boundary,
    }
}

/// Offset of the scheduled shift a booking at `minutes` belongs to.
///
/// Every booking of a day plan belongs to the calculated day's shift,
/// including next-day departures and previous-day arrivals. An overnight
/// plan also has the shift that started yesterday and ends this morning:
/// bookings before the middle of the daytime gap belong to that one.
pub(crate) fn shift_offset(plan: &DayPlanConfig, minutes: i32) -> i32 {
    match overnight_span(plan) {
        Some((from, to)) if minutes < (from + to) / 2 => -MINUTES_PER_DAY,
        _ => 0,
    }
}

/// Places a clock-time `boundary` on the shift a booking at `minutes`
/// belongs to.
pub(crate) fn schedule_boundary(plan: &DayPlanConfig, boundary: i32, minutes: i32) -> i32 {
    shift_boundary(plan, boundary) + shift_offset(plan, minutes)
}

/// Returns the boundary a booking in `direction` is normalized against.
pub fn expected_boundary(plan: &DayPlanConfig, direction: BookingDirection) -> Option<i32> {
    match direction {
        BookingDirection::In => plan.come_from,
        BookingDirection::Out => plan.go_to,
    }
}

/// Normalizes a booking time against the plan's tolerance bands.
///
/// # Arguments
///
/// * `minutes` - The booking time relative to the calculated day
/// * `direction` - Arrival or departure
/// * `plan` - The day plan providing boundary and tolerances
///
/// # Returns
///
/// The expected boundary when the time lies inside an applicable band,
/// otherwise `minutes` unchanged.
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::normalize_time;
/// use zmi_engine::models::{BookingDirection, DayPlanConfig, Tolerance};
///
/// let plan = DayPlanConfig::fixed("STD", 8 * 60, 16 * 60, 480).with_tolerance(Tolerance {
///     come_minus: 10,
///     ..Tolerance::default()
/// });
///
/// // 08:08 is forgiven to 08:00
/// assert_eq!(normalize_time(8 * 60 + 8, BookingDirection::In, &plan), 8 * 60);
/// // 08:15 is outside the band
/// assert_eq!(normalize_time(8 * 60 + 15, BookingDirection::In, &plan), 8 * 60 + 15);
/// ```
pub fn normalize_time(minutes: i32, direction: BookingDirection, plan: &DayPlanConfig) -> i32 {
    if plan.plan_type == PlanType::Flextime {
        return minutes;
    }

    let Some(boundary) = expected_boundary(plan, direction) else {
        return minutes;
    };
    let expected = schedule_boundary(plan, boundary, minutes);
    let tolerance = &plan.tolerance;

    let (early_band, late_band) = match direction {
        BookingDirection::In => (tolerance.come_plus, tolerance.come_minus),
        BookingDirection::Out => (tolerance.go_minus, tolerance.go_plus),
    };

    let snaps_early = minutes < expected && expected - minutes <= early_band;
    let snaps_late = minutes > expected && minutes - expected <= late_band;

    if snaps_early || snaps_late {
        expected
    } else {
        minutes
    }
}
