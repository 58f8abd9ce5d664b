//! Daily calculation.
//!
//! This module drives one employee-date through the full pipeline:
//! shift detection, day-change assembly, tolerance normalization, rounding,
//! window capping, pairing, break deduction and the target comparison. The
//! result is a [`DailyValue`] plus the intervals, synthetic bookings and
//! audit steps that explain it.
//!
//! Data problems never abort a calculation. They are reported as error codes
//! on the value and the best-effort totals are still produced.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{
    AuditStep, Booking, BookingDirection, DailyErrorCode, DailyValue, DailyWarningCode,
    DayPlanConfig, MINUTES_PER_DAY,
};

use super::breaks::calculate_breaks;
use super::capping::cap_time;
use super::day_change::assemble_day;
use super::pairing::{WorkEvent, WorkInterval, pair_events};
use super::rounding::apply_rounding;
use super::shift_detection::{ShiftDetection, detect_shift};
use super::tolerance::{normalize_time, schedule_boundary};

/// Everything the calculator needs for one employee-date.
#[derive(Debug, Clone, Copy)]
pub struct DailyInput<'a> {
    /// The employee being calculated.
    pub employee_id: Uuid,
    /// The calculated date.
    pub date: NaiveDate,
    /// Bookings covering [`required_booking_range`]; others are ignored.
    pub bookings: &'a [Booking],
    /// The resolved day plan for the date.
    pub day_plan: &'a DayPlanConfig,
    /// Target time from the day-plan assignment, overriding the plan's own.
    pub target_override: Option<i32>,
}

impl<'a> DailyInput<'a> {
    /// Creates an input using the plan's target time.
    pub fn new(
        employee_id: Uuid,
        date: NaiveDate,
        bookings: &'a [Booking],
        day_plan: &'a DayPlanConfig,
    ) -> Self {
        Self {
            employee_id,
            date,
            bookings,
            day_plan,
            target_override: None,
        }
    }

    /// Overrides the target time.
    pub fn with_target(mut self, target_minutes: i32) -> Self {
        self.target_override = Some(target_minutes);
        self
    }
}

/// The complete result of calculating one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCalculation {
    /// The calculated value to persist.
    pub value: DailyValue,
    /// The credited work intervals, sorted by start.
    pub intervals: Vec<WorkInterval>,
    /// Synthetic bookings created by midnight splits, for persistence.
    pub synthetic_bookings: Vec<Booking>,
    /// Ordered record of every pipeline decision.
    pub audit_steps: Vec<AuditStep>,
}

/// Returns the dates whose bookings must be supplied to calculate `date`.
///
/// Day-change handling and shift detection look at the neighbouring days,
/// so plans using either need yesterday through tomorrow.
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::required_booking_range;
/// use zmi_engine::models::{DayChangeBehavior, DayPlanConfig};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
/// let plan = DayPlanConfig::fixed("STD", 480, 960, 480);
/// assert_eq!(required_booking_range(date, &plan), date..=date);
///
/// let night = plan.with_day_change(DayChangeBehavior::AtArrival);
/// let range = required_booking_range(date, &night);
/// assert_eq!(*range.start(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
/// assert_eq!(*range.end(), NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
/// ```
pub fn required_booking_range(date: NaiveDate, plan: &DayPlanConfig) -> RangeInclusive<NaiveDate> {
    if plan.needs_adjacent_days() || !plan.alternatives.is_empty() {
        date.pred_opt().unwrap_or(date)..=date.succ_opt().unwrap_or(date)
    } else {
        date..=date
    }
}

struct AuditLog {
    steps: Vec<AuditStep>,
}

impl AuditLog {
    fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }
}

fn clock(minutes: i32) -> String {
    let minutes = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Normalized time of a booking under `plan`, used before a plan is chosen.
fn detection_minutes(booking: &Booking, date: NaiveDate, plan: &DayPlanConfig) -> i32 {
    let raw = booking.minutes_relative_to(date);
    let normalized = normalize_time(raw, booking.direction, plan);
    apply_rounding(normalized, booking.direction, plan).rem_euclid(MINUTES_PER_DAY)
}

/// First arrival and last departure used for shift detection.
///
/// When the day ends clocked in and tomorrow starts with a departure, that
/// departure counts as the day's last one. Likewise a day starting with a
/// departure after yesterday ended clocked in takes yesterday's arrival.
fn detection_times(
    date: NaiveDate,
    bookings: &[Booking],
    plan: &DayPlanConfig,
) -> (Option<i32>, Option<i32>) {
    let own: Vec<&Booking> = bookings.iter().filter(|b| b.date() == date).collect();

    let mut first_come = own
        .iter()
        .find(|b| b.direction == BookingDirection::In)
        .copied();

    if own.first().is_some_and(|b| b.direction == BookingDirection::Out) {
        let previous_day = date.pred_opt();
        let previous = bookings.iter().rev().find(|b| Some(b.date()) == previous_day);
        if let Some(previous) = previous.filter(|b| b.direction == BookingDirection::In) {
            first_come = Some(previous);
        }
    }

    let mut last_go = own
        .iter()
        .rev()
        .find(|b| b.direction == BookingDirection::Out)
        .copied();

    if own.last().is_some_and(|b| b.direction == BookingDirection::In) {
        let next_day = date.succ_opt();
        let next = bookings.iter().find(|b| Some(b.date()) == next_day);
        if let Some(next) = next.filter(|b| b.direction == BookingDirection::Out) {
            last_go = Some(next);
        }
    }

    (
        first_come.map(|b| detection_minutes(b, date, plan)),
        last_go.map(|b| detection_minutes(b, date, plan)),
    )
}

/// Calculates daily values.
///
/// The calculator holds no state besides the calculation version stamped on
/// every value, so identical inputs always give identical values.
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::{DailyCalculator, DailyInput};
/// use zmi_engine::models::{Booking, BookingDirection, BreakConfig, DayPlanConfig};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let employee = Uuid::new_v4();
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let bookings = vec![
///     Booking::new(employee, date.and_hms_opt(8, 0, 0).unwrap(), BookingDirection::In),
///     Booking::new(employee, date.and_hms_opt(17, 0, 0).unwrap(), BookingDirection::Out),
/// ];
/// let plan = DayPlanConfig::fixed("STD", 8 * 60, 17 * 60, 480)
///     .with_breaks(vec![BreakConfig::fixed(60)]);
///
/// let calculator = DailyCalculator::new(1);
/// let result = calculator.calculate(&DailyInput::new(employee, date, &bookings, &plan));
///
/// assert_eq!(result.value.gross_time, 540);
/// assert_eq!(result.value.net_time, 480);
/// assert_eq!(result.value.overtime, 0);
/// assert_eq!(result.value.undertime, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCalculator {
    calculation_version: u32,
}

impl DailyCalculator {
    /// Creates a calculator stamping values with `calculation_version`.
    pub fn new(calculation_version: u32) -> Self {
        Self {
            calculation_version,
        }
    }

    /// Returns the calculation version stamped on values.
    pub fn calculation_version(&self) -> u32 {
        self.calculation_version
    }

    /// Calculates one day, stamped with the current time.
    pub fn calculate(&self, input: &DailyInput<'_>) -> DailyCalculation {
        self.calculate_at(input, Utc::now())
    }

    /// Calculates one day, stamped with `calculated_at`.
    ///
    /// # Pipeline
    ///
    /// 1. Keep the employee's bookings from yesterday to tomorrow
    /// 2. Detect the shift when the plan has alternatives
    /// 3. Assemble the day's bookings under the plan's day-change behavior
    /// 4. Normalize and round recorded bookings, cap every booking to the
    ///    window of the shift it belongs to
    /// 5. Pair arrivals with departures
    /// 6. Deduct breaks and compare net time with the target
    pub fn calculate_at(
        &self,
        input: &DailyInput<'_>,
        calculated_at: DateTime<Utc>,
    ) -> DailyCalculation {
        let date = input.date;
        let mut audit = AuditLog { steps: Vec::new() };
        let mut errors: BTreeSet<DailyErrorCode> = BTreeSet::new();
        let mut warnings: BTreeSet<DailyWarningCode> = BTreeSet::new();

        // Step 1: relevant bookings
        let window_start = date.pred_opt().unwrap_or(date);
        let window_end = date.succ_opt().unwrap_or(date);
        let foreign = input
            .bookings
            .iter()
            .filter(|b| b.employee_id != input.employee_id)
            .count();
        if foreign > 0 {
            warn!(
                employee_id = %input.employee_id,
                %date,
                ignored = foreign,
                "Ignoring bookings of other employees"
            );
        }
        let mut bookings: Vec<Booking> = input
            .bookings
            .iter()
            .filter(|b| b.employee_id == input.employee_id)
            .filter(|b| (window_start..=window_end).contains(&b.date()))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.timestamp);

        // Step 2: shift detection
        let default_plan = input.day_plan;
        let plan = if default_plan.alternatives.is_empty() {
            default_plan
        } else {
            let (first_come, last_go) = detection_times(date, &bookings, default_plan);
            let detection = detect_shift(first_come, last_go, &default_plan.alternatives);
            let plan = detection.plan(default_plan);

            let reasoning = match detection {
                ShiftDetection::NotRequired => {
                    format!("No bookings to detect from, using default plan {}", plan.code)
                }
                ShiftDetection::Detected { index, .. } => format!(
                    "Bookings match shift candidate {} of {}, using plan {}",
                    index + 1,
                    default_plan.alternatives.len(),
                    plan.code
                ),
                ShiftDetection::NotDetected => {
                    errors.insert(DailyErrorCode::ShiftNotDetected);
                    format!(
                        "No shift candidate matches, falling back to default plan {}",
                        plan.code
                    )
                }
            };
            audit.record(
                "shift_detection",
                "Shift Detection",
                serde_json::json!({
                    "default_plan": default_plan.code,
                    "candidates": default_plan.alternatives.len(),
                    "first_come": first_come.map(clock),
                    "last_go": last_go.map(clock)
                }),
                serde_json::json!({ "plan": plan.code }),
                reasoning,
            );
            plan
        };

        // Step 3: day change
        let assembly = assemble_day(date, &bookings, plan.day_change);
        if assembly.crosses_midnight {
            warnings.insert(DailyWarningCode::CrossMidnight);
        }
        let synthetic_bookings: Vec<Booking> = assembly
            .splits
            .iter()
            .flat_map(|split| split.synthetic_bookings())
            .cloned()
            .collect();
        audit.record(
            "day_change",
            "Day Change Handling",
            serde_json::json!({
                "behavior": plan.day_change,
                "bookings_in_window": bookings.len()
            }),
            serde_json::json!({
                "bookings_for_day": assembly.bookings.len(),
                "crosses_midnight": assembly.crosses_midnight,
                "midnight_splits": assembly.splits.len()
            }),
            if assembly.crosses_midnight {
                format!(
                    "Work crosses midnight and is handled as {:?}",
                    plan.day_change
                )
            } else {
                "No work interval crosses midnight for this day".to_string()
            },
        );

        // Step 4: normalization and capping
        let mut events = Vec::with_capacity(assembly.bookings.len());
        let mut adjusted = 0;

        for booking in &assembly.bookings {
            let raw = booking.minutes_relative_to(date);
            let synthetic = booking.is_synthetic();

            // Midnight boundaries are not clock events: only the window applies
            let normalized = if synthetic {
                raw
            } else {
                let tolerated = normalize_time(raw, booking.direction, plan);
                apply_rounding(tolerated, booking.direction, plan)
            };
            let credited = cap_time(normalized, booking.direction, plan).minutes;
            if credited != raw {
                adjusted += 1;
            }

            events.push(WorkEvent {
                booking_id: booking.id,
                pair_id: booking.pair_id,
                direction: booking.direction,
                recorded: raw,
                normalized,
                minutes: credited,
                synthetic,
            });
        }
        audit.record(
            "normalization",
            "Tolerance, Rounding and Window Capping",
            serde_json::json!({
                "plan": plan.code,
                "plan_type": plan.plan_type,
                "events": events.len()
            }),
            serde_json::json!({ "adjusted_events": adjusted }),
            format!("{} of {} booking times adjusted", adjusted, events.len()),
        );

        // Step 5: pairing
        let pairing = pair_events(&events);
        let mut capped_time = pairing.capped_minutes;
        errors.extend(pairing.errors.iter().copied());
        let gross_time = pairing.gross_minutes();
        audit.record(
            "pairing",
            "Booking Pairing",
            serde_json::json!({ "events": events.len() }),
            serde_json::json!({
                "intervals": pairing.intervals.len(),
                "gross_time": gross_time,
                "capped_minutes": pairing.capped_minutes,
                "errors": pairing.errors
            }),
            if pairing.errors.is_empty() {
                format!(
                    "{} work interval(s) paired, {} minutes outside the evaluation window",
                    pairing.intervals.len(),
                    pairing.capped_minutes
                )
            } else {
                format!(
                    "{} work interval(s) paired, {} booking(s) left unpaired",
                    pairing.intervals.len(),
                    pairing.unpaired.len()
                )
            },
        );

        // Step 6: breaks
        let breaks = calculate_breaks(&pairing.intervals, &plan.breaks);
        if breaks.auto_applied {
            warnings.insert(DailyWarningCode::AutoBreakApplied);
        }
        if !plan.breaks.is_empty() && gross_time > 0 && breaks.recorded_minutes == 0 {
            warnings.insert(DailyWarningCode::NoBreakRecorded);
        }
        audit.record(
            "break_deduction",
            "Break Deduction",
            serde_json::json!({
                "gross_time": gross_time,
                "recorded_break": breaks.recorded_minutes,
                "rules": plan.breaks
            }),
            serde_json::json!({
                "break_time": breaks.total_minutes,
                "deductions": breaks.deductions
            }),
            format!(
                "{} break rule(s) deduct {} minutes",
                plan.breaks.len(),
                breaks.total_minutes
            ),
        );

        // Step 7: net time and target comparison
        let mut net_time = (gross_time - breaks.total_minutes).max(0);
        if let Some(max_net) = plan.max_net_work_time
            && net_time > max_net
        {
            capped_time += net_time - max_net;
            net_time = max_net;
            warnings.insert(DailyWarningCode::MaxTimeReached);
        }
        if let Some(min_work) = plan.min_work_time
            && gross_time > 0
            && net_time < min_work
        {
            warnings.insert(DailyWarningCode::BelowMinWorkTime);
        }

        let target_time = input.target_override.unwrap_or(plan.target_minutes).max(0);
        let overtime = (net_time - target_time).max(0);
        let undertime = (target_time - net_time).max(0);

        let first_come = events
            .iter()
            .filter(|e| e.direction == BookingDirection::In)
            .map(|e| e.normalized)
            .min();
        let last_go = events
            .iter()
            .filter(|e| e.direction == BookingDirection::Out)
            .map(|e| e.normalized)
            .max();

        let recorded_come = events
            .iter()
            .filter(|e| e.direction == BookingDirection::In && !e.synthetic)
            .map(|e| e.normalized)
            .min();
        let recorded_go = events
            .iter()
            .filter(|e| e.direction == BookingDirection::Out && !e.synthetic)
            .map(|e| e.normalized)
            .max();
        if let (Some(come_to), Some(come)) = (plan.come_to, recorded_come)
            && come > schedule_boundary(plan, come_to, come)
        {
            warnings.insert(DailyWarningCode::LateCome);
        }
        if let (Some(go_from), Some(go)) = (plan.go_from, recorded_go)
            && go < schedule_boundary(plan, go_from, go)
        {
            warnings.insert(DailyWarningCode::EarlyGo);
        }

        audit.record(
            "daily_totals",
            "Daily Totals",
            serde_json::json!({
                "gross_time": gross_time,
                "break_time": breaks.total_minutes,
                "target_time": target_time
            }),
            serde_json::json!({
                "net_time": net_time,
                "overtime": overtime,
                "undertime": undertime
            }),
            if overtime > 0 {
                format!("{} net minutes exceed target {} by {}", net_time, target_time, overtime)
            } else if undertime > 0 {
                format!("{} net minutes fall short of target {} by {}", net_time, target_time, undertime)
            } else {
                format!("{} net minutes meet target {} exactly", net_time, target_time)
            },
        );

        let booking_count = assembly
            .bookings
            .iter()
            .filter(|b| !b.is_synthetic())
            .count() as u32;

        let value = DailyValue {
            employee_id: input.employee_id,
            date,
            day_plan_code: plan.code.clone(),
            gross_time,
            net_time,
            target_time,
            overtime,
            undertime,
            break_time: breaks.total_minutes,
            capped_time,
            has_error: !errors.is_empty(),
            error_codes: errors,
            warnings,
            first_come: first_come.map(|m| m.rem_euclid(MINUTES_PER_DAY)),
            last_go: last_go.map(|m| m.rem_euclid(MINUTES_PER_DAY)),
            booking_count,
            calculated_at,
            calculation_version: self.calculation_version,
        };

        if value.has_error {
            warn!(
                employee_id = %value.employee_id,
                date = %value.date,
                errors = ?value.error_codes,
                "Day calculated with errors"
            );
        }
        debug!(
            employee_id = %value.employee_id,
            date = %value.date,
            plan = %value.day_plan_code,
            gross = value.gross_time,
            net = value.net_time,
            overtime = value.overtime,
            undertime = value.undertime,
            "Daily calculation completed"
        );

        DailyCalculation {
            value,
            intervals: pairing.intervals,
            synthetic_bookings,
            audit_steps: audit.steps,
        }
    }

    /// Calculates every day from `from` to `to` (inclusive) in date order.
    ///
    /// `plan_for` resolves the day plan of a date; days without a plan are
    /// skipped. `bookings` should cover the period plus one day on each side.
    /// All values share one calculation timestamp.
    pub fn calculate_period<'p, F>(
        &self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        bookings: &[Booking],
        mut plan_for: F,
    ) -> Vec<DailyCalculation>
    where
        F: FnMut(NaiveDate) -> Option<&'p DayPlanConfig>,
    {
        let calculated_at = Utc::now();
        from.iter_days()
            .take_while(|date| *date <= to)
            .filter_map(|date| {
                let plan = plan_for(date)?;
                let input = DailyInput::new(employee_id, date, bookings, plan);
                Some(self.calculate_at(&input, calculated_at))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BreakConfig, DayChangeBehavior, ShiftCandidate, TimeWindow, Tolerance,
    };
    use chrono::NaiveDateTime;

    fn employee() -> Uuid {
        Uuid::from_u128(7)
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn booking(s: &str, direction: BookingDirection) -> Booking {
        let timestamp = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        Booking::new(employee(), timestamp, direction)
    }

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-04-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn calculate(date: &str, bookings: &[Booking], plan: &DayPlanConfig) -> DailyCalculation {
        let input = DailyInput::new(employee(), make_date(date), bookings, plan);
        DailyCalculator::new(3).calculate_at(&input, fixed_time())
    }

    fn standard_plan() -> DayPlanConfig {
        DayPlanConfig::fixed("STD", 480, 1020, 480)
            .with_tolerance(Tolerance {
                come_minus: 10,
                ..Tolerance::default()
            })
            .with_breaks(vec![BreakConfig::minimum(30, 360)])
    }

    #[test]
    fn test_regular_day_with_break() {
        let bookings = vec![
            booking("2026-03-02 08:05:00", BookingDirection::In),
            booking("2026-03-02 12:00:00", BookingDirection::Out),
            booking("2026-03-02 12:30:00", BookingDirection::In),
            booking("2026-03-02 17:00:00", BookingDirection::Out),
        ];
        let result = calculate("2026-03-02", &bookings, &standard_plan());
        let value = &result.value;

        // 08:05 forgiven to 08:00: 240 + 270
        assert_eq!(value.gross_time, 510);
        assert_eq!(value.break_time, 30);
        assert_eq!(value.net_time, 480);
        assert_eq!(value.overtime, 0);
        assert_eq!(value.undertime, 0);
        assert_eq!(value.first_come, Some(480));
        assert_eq!(value.last_go, Some(1020));
        assert_eq!(value.booking_count, 4);
        assert_eq!(value.calculation_version, 3);
        assert!(!value.has_error);
        assert!(value.warnings.is_empty());
    }

    #[test]
    fn test_capped_minutes_are_not_credited() {
        let bookings = vec![
            booking("2026-03-02 07:45:00", BookingDirection::In),
            booking("2026-03-02 17:20:00", BookingDirection::Out),
        ];
        let result = calculate("2026-03-02", &bookings, &standard_plan());
        let value = &result.value;

        assert_eq!(value.gross_time, 540);
        assert_eq!(value.capped_time, 35);
        assert_eq!(value.net_time, 510);
        assert_eq!(value.overtime, 30);
        // Extremes are reported before capping
        assert_eq!(value.first_come, Some(465));
        assert_eq!(value.last_go, Some(1040));
        assert!(value.warnings.contains(&DailyWarningCode::AutoBreakApplied));
        assert!(value.warnings.contains(&DailyWarningCode::NoBreakRecorded));
    }

    #[test]
    fn test_missing_go_is_flagged_with_best_effort_totals() {
        let bookings = vec![
            booking("2026-03-02 08:00:00", BookingDirection::In),
            booking("2026-03-02 12:00:00", BookingDirection::Out),
            booking("2026-03-02 12:30:00", BookingDirection::In),
        ];
        let result = calculate("2026-03-02", &bookings, &standard_plan());
        let value = &result.value;

        assert!(value.has_error);
        assert!(value.error_codes.contains(&DailyErrorCode::MissingGo));
        assert_eq!(value.gross_time, 240);
        assert_eq!(value.undertime, 240);
        assert_eq!(value.last_go, Some(720));
    }

    #[test]
    fn test_missing_come_is_flagged() {
        let bookings = vec![booking("2026-03-02 17:00:00", BookingDirection::Out)];
        let result = calculate("2026-03-02", &bookings, &standard_plan());
        assert!(result.value.error_codes.contains(&DailyErrorCode::MissingCome));
        assert_eq!(result.value.first_come, None);
        assert_eq!(result.value.gross_time, 0);
    }

    #[test]
    fn test_day_without_bookings() {
        let result = calculate("2026-03-02", &[], &standard_plan());
        let value = &result.value;
        assert_eq!(value.gross_time, 0);
        assert_eq!(value.undertime, 480);
        assert_eq!(value.first_come, None);
        assert_eq!(value.last_go, None);
        assert_eq!(value.booking_count, 0);
        assert!(!value.has_error);
    }

    #[test]
    fn test_target_override_replaces_plan_target() {
        let bookings = vec![
            booking("2026-03-02 08:00:00", BookingDirection::In),
            booking("2026-03-02 12:00:00", BookingDirection::Out),
        ];
        let plan = standard_plan();
        let input = DailyInput::new(employee(), make_date("2026-03-02"), &bookings, &plan)
            .with_target(240);
        let result = DailyCalculator::new(1).calculate_at(&input, fixed_time());
        assert_eq!(result.value.target_time, 240);
        assert_eq!(result.value.overtime, 0);
        assert_eq!(result.value.undertime, 0);
    }

    #[test]
    fn test_max_net_work_time_cuts_credit() {
        let mut plan = DayPlanConfig::fixed("LONG", 360, 1320, 480);
        plan.max_net_work_time = Some(600);
        let bookings = vec![
            booking("2026-03-02 06:00:00", BookingDirection::In),
            booking("2026-03-02 18:00:00", BookingDirection::Out),
        ];
        let result = calculate("2026-03-02", &bookings, &plan);
        assert_eq!(result.value.gross_time, 720);
        assert_eq!(result.value.net_time, 600);
        assert_eq!(result.value.capped_time, 120);
        assert_eq!(result.value.overtime, 120);
        assert!(result.value.warnings.contains(&DailyWarningCode::MaxTimeReached));
    }

    #[test]
    fn test_flextime_core_time_warnings() {
        let mut plan = DayPlanConfig::flextime(
            "FLEX",
            TimeWindow::new(420, 540),
            TimeWindow::new(900, 1140),
            480,
        );
        plan.min_work_time = Some(300);
        let bookings = vec![
            booking("2026-03-02 10:00:00", BookingDirection::In),
            booking("2026-03-02 14:00:00", BookingDirection::Out),
        ];
        let result = calculate("2026-03-02", &bookings, &plan);
        let warnings = &result.value.warnings;
        assert!(warnings.contains(&DailyWarningCode::LateCome));
        assert!(warnings.contains(&DailyWarningCode::EarlyGo));
        assert!(warnings.contains(&DailyWarningCode::BelowMinWorkTime));
        assert!(!result.value.has_error);
    }

    #[test]
    fn test_shift_detection_selects_candidate_plan() {
        let late = DayPlanConfig::fixed("LATE", 840, 1320, 450);
        let plan = standard_plan().with_alternatives(vec![ShiftCandidate {
            arrival: Some(TimeWindow::new(780, 900)),
            departure: Some(TimeWindow::new(1260, 1380)),
            plan: late,
        }]);
        let bookings = vec![
            booking("2026-03-02 13:55:00", BookingDirection::In),
            booking("2026-03-02 22:00:00", BookingDirection::Out),
        ];
        let result = calculate("2026-03-02", &bookings, &plan);
        assert_eq!(result.value.day_plan_code, "LATE");
        assert_eq!(result.value.target_time, 450);
        assert!(!result.value.has_error);
        assert_eq!(result.audit_steps[0].rule_id, "shift_detection");
    }

    #[test]
    fn test_shift_not_detected_falls_back_to_default() {
        let late = DayPlanConfig::fixed("LATE", 840, 1320, 450);
        let plan = standard_plan().with_alternatives(vec![ShiftCandidate {
            arrival: Some(TimeWindow::new(780, 900)),
            departure: None,
            plan: late,
        }]);
        let bookings = vec![
            booking("2026-03-02 08:00:00", BookingDirection::In),
            booking("2026-03-02 16:30:00", BookingDirection::Out),
        ];
        let result = calculate("2026-03-02", &bookings, &plan);
        assert_eq!(result.value.day_plan_code, "STD");
        assert!(result.value.has_error);
        assert!(
            result
                .value
                .error_codes
                .contains(&DailyErrorCode::ShiftNotDetected)
        );
        assert_eq!(result.value.gross_time, 510);
    }

    #[test]
    fn test_auto_complete_splits_night_shift_between_days() {
        let plan = DayPlanConfig::fixed("NIGHT", 1320, 360, 480)
            .with_day_change(DayChangeBehavior::AutoComplete);
        let bookings = vec![
            booking("2026-03-02 22:00:00", BookingDirection::In),
            booking("2026-03-03 06:00:00", BookingDirection::Out),
        ];

        let arrival_day = calculate("2026-03-02", &bookings, &plan);
        assert_eq!(arrival_day.value.gross_time, 119);
        assert_eq!(arrival_day.value.first_come, Some(1320));
        assert_eq!(arrival_day.value.last_go, Some(1439));
        assert_eq!(arrival_day.value.booking_count, 1);
        assert!(arrival_day.value.warnings.contains(&DailyWarningCode::CrossMidnight));
        assert_eq!(arrival_day.synthetic_bookings.len(), 2);
        assert!(!arrival_day.value.has_error);

        let departure_day = calculate("2026-03-03", &bookings, &plan);
        assert_eq!(departure_day.value.gross_time, 360);
        assert_eq!(departure_day.value.first_come, Some(0));
        assert_eq!(departure_day.value.last_go, Some(360));
        assert!(!departure_day.value.has_error);

        // Both days report the same split
        assert_eq!(
            arrival_day.synthetic_bookings,
            departure_day.synthetic_bookings
        );
    }

    #[test]
    fn test_at_arrival_credits_whole_night_to_arrival_day() {
        let plan = DayPlanConfig::fixed("NIGHT", 1320, 360, 480)
            .with_day_change(DayChangeBehavior::AtArrival);
        let bookings = vec![
            booking("2026-03-02 22:00:00", BookingDirection::In),
            booking("2026-03-03 06:00:00", BookingDirection::Out),
        ];

        let arrival_day = calculate("2026-03-02", &bookings, &plan);
        assert_eq!(arrival_day.value.gross_time, 480);
        assert_eq!(arrival_day.value.last_go, Some(360));
        assert!(!arrival_day.value.has_error);

        let departure_day = calculate("2026-03-03", &bookings, &plan);
        assert_eq!(departure_day.value.gross_time, 0);
        assert!(!departure_day.value.has_error);
    }

    #[test]
    fn test_none_day_change_flags_both_halves() {
        let plan = DayPlanConfig::fixed("NIGHT", 1320, 360, 480);
        let bookings = vec![
            booking("2026-03-02 22:00:00", BookingDirection::In),
            booking("2026-03-03 06:00:00", BookingDirection::Out),
        ];
        let arrival_day = calculate("2026-03-02", &bookings, &plan);
        assert!(arrival_day.value.error_codes.contains(&DailyErrorCode::MissingGo));
        let departure_day = calculate("2026-03-03", &bookings, &plan);
        assert!(departure_day.value.error_codes.contains(&DailyErrorCode::MissingCome));
    }

    fn late_plan(day_change: DayChangeBehavior) -> DayPlanConfig {
        let mut plan = DayPlanConfig::fixed("LATE", 840, 1320, 450).with_day_change(day_change);
        plan.come_to = Some(900);
        plan.go_from = Some(1260);
        plan
    }

    #[test]
    fn test_at_arrival_caps_next_day_departure_to_go_to() {
        let plan = late_plan(DayChangeBehavior::AtArrival);
        let bookings = vec![
            booking("2026-03-02 14:00:00", BookingDirection::In),
            booking("2026-03-03 00:30:00", BookingDirection::Out),
        ];

        let arrival_day = calculate("2026-03-02", &bookings, &plan);
        let value = &arrival_day.value;
        assert_eq!(value.gross_time, 480);
        assert_eq!(value.capped_time, 150);
        assert_eq!(value.last_go, Some(30));
        assert!(value.warnings.contains(&DailyWarningCode::CrossMidnight));
        assert!(!value.warnings.contains(&DailyWarningCode::EarlyGo));
        assert!(!value.has_error);

        let departure_day = calculate("2026-03-03", &bookings, &plan);
        assert_eq!(departure_day.value.gross_time, 0);
        assert!(
            departure_day
                .value
                .warnings
                .contains(&DailyWarningCode::CrossMidnight)
        );
    }

    #[test]
    fn test_auto_complete_caps_split_at_go_to() {
        let plan = DayPlanConfig::fixed("STD", 480, 1020, 480)
            .with_day_change(DayChangeBehavior::AutoComplete);
        let bookings = vec![
            booking("2026-03-02 08:00:00", BookingDirection::In),
            booking("2026-03-03 01:00:00", BookingDirection::Out),
        ];

        let arrival_day = calculate("2026-03-02", &bookings, &plan);
        assert_eq!(arrival_day.value.gross_time, 540);
        // 17:00 to 23:59 was worked but lies outside the window
        assert_eq!(arrival_day.value.capped_time, 419);
        assert_eq!(arrival_day.value.last_go, Some(1439));
        assert_eq!(arrival_day.intervals[0].end, 1020);

        let departure_day = calculate("2026-03-03", &bookings, &plan);
        assert_eq!(departure_day.value.gross_time, 0);
        assert_eq!(departure_day.value.capped_time, 60);
        assert!(!departure_day.value.has_error);
        assert_eq!(
            arrival_day.synthetic_bookings,
            departure_day.synthetic_bookings
        );
    }

    #[test]
    fn test_at_departure_caps_previous_day_arrival_to_come_from() {
        let mut plan = DayPlanConfig::fixed("EARLY", 360, 840, 450)
            .with_day_change(DayChangeBehavior::AtDeparture);
        plan.go_from = Some(780);
        let bookings = vec![
            booking("2026-03-02 23:00:00", BookingDirection::In),
            booking("2026-03-03 15:00:00", BookingDirection::Out),
        ];

        let result = calculate("2026-03-03", &bookings, &plan);
        let value = &result.value;
        assert_eq!(value.gross_time, 480);
        assert_eq!(value.capped_time, 960 - 480);
        assert_eq!(value.first_come, Some(1380));
        assert!(value.warnings.contains(&DailyWarningCode::CrossMidnight));
        assert!(!value.warnings.contains(&DailyWarningCode::EarlyGo));
        assert!(!value.has_error);
    }

    #[test]
    fn test_night_plan_at_departure_credits_yesterdays_shift() {
        let plan = DayPlanConfig::fixed("NIGHT", 1320, 360, 480)
            .with_day_change(DayChangeBehavior::AtDeparture);
        let bookings = vec![
            booking("2026-03-02 21:50:00", BookingDirection::In),
            booking("2026-03-03 06:00:00", BookingDirection::Out),
        ];

        let result = calculate("2026-03-03", &bookings, &plan);
        assert_eq!(result.value.gross_time, 480);
        assert_eq!(result.value.capped_time, 10);
    }

    #[test]
    fn test_required_booking_range_covers_neighbours_for_shift_detection() {
        let date = make_date("2026-03-03");
        let plan = standard_plan().with_alternatives(vec![ShiftCandidate {
            arrival: Some(TimeWindow::new(300, 420)),
            departure: None,
            plan: standard_plan(),
        }]);
        let range = required_booking_range(date, &plan);
        assert_eq!(*range.start(), make_date("2026-03-02"));
        assert_eq!(*range.end(), make_date("2026-03-04"));
        assert_eq!(required_booking_range(date, &standard_plan()), date..=date);
    }

    #[test]
    fn test_bookings_of_other_employees_are_ignored() {
        let mut bookings = vec![
            booking("2026-03-02 08:00:00", BookingDirection::In),
            booking("2026-03-02 16:00:00", BookingDirection::Out),
        ];
        let mut stranger = booking("2026-03-02 09:00:00", BookingDirection::In);
        stranger.employee_id = Uuid::from_u128(99);
        bookings.push(stranger);

        let result = calculate("2026-03-02", &bookings, &standard_plan());
        assert_eq!(result.value.booking_count, 2);
        assert!(!result.value.has_error);
    }

    #[test]
    fn test_recalculation_is_idempotent() {
        let bookings = vec![
            booking("2026-03-02 07:52:00", BookingDirection::In),
            booking("2026-03-02 12:10:00", BookingDirection::Out),
            booking("2026-03-02 12:40:00", BookingDirection::In),
            booking("2026-03-02 16:55:00", BookingDirection::Out),
        ];
        let plan = standard_plan();
        let first = calculate("2026-03-02", &bookings, &plan);
        let second = calculate("2026-03-02", &bookings, &plan);
        assert_eq!(first, second);
    }

    #[test]
    fn test_audit_steps_are_numbered_in_order() {
        let bookings = vec![
            booking("2026-03-02 08:00:00", BookingDirection::In),
            booking("2026-03-02 16:00:00", BookingDirection::Out),
        ];
        let result = calculate("2026-03-02", &bookings, &standard_plan());
        let ids: Vec<&str> = result.audit_steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "day_change",
                "normalization",
                "pairing",
                "break_deduction",
                "daily_totals"
            ]
        );
        for (i, step) in result.audit_steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
    }

    #[test]
    fn test_calculate_period_skips_days_without_plan() {
        let bookings = vec![
            booking("2026-03-02 08:00:00", BookingDirection::In),
            booking("2026-03-02 16:30:00", BookingDirection::Out),
            booking("2026-03-03 08:00:00", BookingDirection::In),
            booking("2026-03-03 16:30:00", BookingDirection::Out),
        ];
        let plan = standard_plan();
        let weekday = make_date("2026-03-03");
        let results = DailyCalculator::new(1).calculate_period(
            employee(),
            make_date("2026-03-01"),
            make_date("2026-03-03"),
            &bookings,
            |date| (date != make_date("2026-03-01") && date <= weekday).then_some(&plan),
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].value.date, make_date("2026-03-02"));
        assert_eq!(results[1].value.date, make_date("2026-03-03"));
        assert!(results.iter().all(|r| r.value.net_time == 480));
    }
}
