//! Booking time rounding.

use crate::models::{BookingDirection, DayPlanConfig, RoundingConfig, RoundingMode};

/// Rounds `minutes` onto the grid described by `rounding`.
///
/// Works for negative times (previous-day events) as well.
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::round_time;
/// use zmi_engine::models::{RoundingConfig, RoundingMode};
///
/// let up = RoundingConfig { mode: RoundingMode::Up, interval: 15 };
/// assert_eq!(round_time(487, &up), 495);
/// assert_eq!(round_time(480, &up), 480);
/// ```
pub fn round_time(minutes: i32, rounding: &RoundingConfig) -> i32 {
    let interval = rounding.interval;
    if interval <= 1 {
        return minutes;
    }

    let down = minutes.div_euclid(interval) * interval;
    let remainder = minutes - down;
    if remainder == 0 {
        return minutes;
    }

    match rounding.mode {
        RoundingMode::Down => down,
        RoundingMode::Up => down + interval,
        RoundingMode::Nearest => {
            if remainder * 2 >= interval {
                down + interval
            } else {
                down
            }
        }
    }
}

/// Applies the plan's rounding rule for `direction`, if any.
pub fn apply_rounding(minutes: i32, direction: BookingDirection, plan: &DayPlanConfig) -> i32 {
    let rounding = match direction {
        BookingDirection::In => plan.come_rounding.as_ref(),
        BookingDirection::Out => plan.go_rounding.as_ref(),
    };
    rounding.map_or(minutes, |r| round_time(minutes, r))
}
