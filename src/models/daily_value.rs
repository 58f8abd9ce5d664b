//! Daily calculation result models.
//!
//! This module contains the [`DailyValue`] record produced once per employee
//! and date, the error and warning codes attached to it, and the
//! [`AuditStep`] entries that document how it was derived.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A data inconsistency found while calculating a day.
///
/// Any error code sets [`DailyValue::has_error`]; the day is still
/// calculated with best-effort values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DailyErrorCode {
    /// A departure without a preceding arrival.
    MissingCome,
    /// An arrival without a following departure.
    MissingGo,
    /// Paired work intervals overlap.
    OverlappingBookings,
    /// No shift candidate matched the day's bookings.
    ShiftNotDetected,
}

impl DailyErrorCode {
    /// Returns the wire code, e.g. `MISSING_COME`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyErrorCode::MissingCome => "MISSING_COME",
            DailyErrorCode::MissingGo => "MISSING_GO",
            DailyErrorCode::OverlappingBookings => "OVERLAPPING_BOOKINGS",
            DailyErrorCode::ShiftNotDetected => "SHIFT_NOT_DETECTED",
        }
    }
}

impl std::fmt::Display for DailyErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal observation about a calculated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DailyWarningCode {
    /// A work interval crossed midnight.
    CrossMidnight,
    /// Net time was cut at the plan's maximum.
    MaxTimeReached,
    /// Net time stayed below the plan's minimum work time.
    BelowMinWorkTime,
    /// A break was deducted although none was recorded.
    AutoBreakApplied,
    /// Break rules exist but no break was recorded.
    NoBreakRecorded,
    /// First arrival after the latest arrival time.
    LateCome,
    /// Last departure before the earliest departure time.
    EarlyGo,
}

impl DailyWarningCode {
    /// Returns the wire code, e.g. `CROSS_MIDNIGHT`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyWarningCode::CrossMidnight => "CROSS_MIDNIGHT",
            DailyWarningCode::MaxTimeReached => "MAX_TIME_REACHED",
            DailyWarningCode::BelowMinWorkTime => "BELOW_MIN_WORK_TIME",
            DailyWarningCode::AutoBreakApplied => "AUTO_BREAK_APPLIED",
            DailyWarningCode::NoBreakRecorded => "NO_BREAK_RECORDED",
            DailyWarningCode::LateCome => "LATE_COME",
            DailyWarningCode::EarlyGo => "EARLY_GO",
        }
    }
}

impl std::fmt::Display for DailyWarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for one stage of the
/// daily pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The calculated time account for one employee on one date.
///
/// All durations are non-negative minutes. At most one of `overtime` and
/// `undertime` is nonzero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyValue {
    /// The employee the value belongs to.
    pub employee_id: Uuid,
    /// The calculated date.
    pub date: NaiveDate,
    /// Code of the day plan actually applied (after shift detection).
    pub day_plan_code: String,
    /// Sum of paired interval durations after normalization and capping.
    pub gross_time: i32,
    /// Gross time minus breaks, floored at zero.
    pub net_time: i32,
    /// Expected working time.
    pub target_time: i32,
    /// `max(0, net_time - target_time)`.
    pub overtime: i32,
    /// `max(0, target_time - net_time)`.
    pub undertime: i32,
    /// Total deducted break minutes.
    pub break_time: i32,
    /// Minutes excluded from credit by window capping or the net maximum.
    pub capped_time: i32,
    /// True when any error code is present.
    pub has_error: bool,
    /// Data inconsistencies found.
    pub error_codes: BTreeSet<DailyErrorCode>,
    /// Non-fatal observations.
    pub warnings: BTreeSet<DailyWarningCode>,
    /// First arrival as minutes from midnight.
    pub first_come: Option<i32>,
    /// Last departure as minutes from midnight.
    pub last_go: Option<i32>,
    /// Number of recorded bookings that contributed to the day.
    pub booking_count: u32,
    /// When the value was calculated.
    pub calculated_at: DateTime<Utc>,
    /// Version of the calculation rules that produced the value.
    pub calculation_version: u32,
}

impl DailyValue {
    /// Returns true when the day counts as worked for monthly statistics.
    pub fn is_work_day(&self) -> bool {
        self.gross_time > 0 || self.net_time > 0
    }
}
