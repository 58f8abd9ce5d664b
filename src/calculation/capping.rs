//! Evaluation window capping.
//!
//! Clips normalized booking times to the plan's hard evaluation window.
//! Minutes outside the window are reported separately and never credited.

use serde::{Deserialize, Serialize};

use crate::models::{BookingDirection, DayPlanConfig, PlanType};

use super::tolerance::{shift_boundary, shift_offset};

/// The result of capping one booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CappingResult {
    /// The creditable time.
    pub minutes: i32,
    /// Minutes cut off by the window.
    pub capped_minutes: i32,
}

/// Returns the evaluation window of the shift starting on the calculated day.
///
/// Flextime plans with variable work time widen the window by `come_minus`
/// before `come_from` and by `go_plus` after `go_to`. The window of an
/// overnight plan ends on the next day. Either side may be open.
pub fn evaluation_window(plan: &DayPlanConfig) -> (Option<i32>, Option<i32>) {
    let widened = plan.plan_type == PlanType::Flextime && plan.variable_work_time;
    let (ext_come, ext_go) = if widened {
        (plan.tolerance.come_minus, plan.tolerance.go_plus)
    } else {
        (0, 0)
    };

    (
        plan.come_from.map(|from| from - ext_come),
        plan.go_to.map(|to| shift_boundary(plan, to) + ext_go),
    )
}

/// Caps a booking time to the plan's evaluation window.
///
/// The booking is compared with the window of the shift it belongs to, so a
/// next-day departure of a day shift is capped to today's `go_to`.
/// Arrivals before the window start are moved to the start; departures after
/// the window end are moved to the end. The other direction is never capped
/// on that side.
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::cap_time;
/// use zmi_engine::models::{BookingDirection, DayPlanConfig};
///
/// let plan = DayPlanConfig::fixed("STD", 8 * 60, 16 * 60, 480);
/// let result = cap_time(7 * 60 + 45, BookingDirection::In, &plan);
/// assert_eq!(result.minutes, 8 * 60);
/// assert_eq!(result.capped_minutes, 15);
/// ```
pub fn cap_time(minutes: i32, direction: BookingDirection, plan: &DayPlanConfig) -> CappingResult {
    let (window_start, window_end) = evaluation_window(plan);
    let offset = shift_offset(plan, minutes);

    let capped = match direction {
        BookingDirection::In => window_start
            .map(|start| start + offset)
            .filter(|&start| minutes < start),
        BookingDirection::Out => window_end
            .map(|end| end + offset)
            .filter(|&end| minutes > end),
    };

    match capped {
        Some(limit) => CappingResult {
            minutes: limit,
            capped_minutes: (limit - minutes).abs(),
        },
        None => CappingResult {
            minutes,
            capped_minutes: 0,
        },
    }
}
