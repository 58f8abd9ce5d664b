//! Monthly aggregation models.
//!
//! This module defines the inputs and outputs of the monthly flextime
//! evaluation: the credit-type policy, the evaluation rules that parameterize
//! it, the absence summary supplied by the absence subsystem and the
//! resulting [`MonthlyCalcOutput`] ledger.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DailyValue;

/// Policy deciding how much of a month's flextime change is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    /// Full 1:1 transfer without caps.
    #[default]
    NoEvaluation,
    /// Full transfer subject to the monthly and balance caps.
    CompleteCarryover,
    /// Only overtime above a threshold is credited.
    AfterThreshold,
    /// Nothing is carried into the balance.
    NoCarryover,
}

impl std::fmt::Display for CreditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreditType::NoEvaluation => write!(f, "no_evaluation"),
            CreditType::CompleteCarryover => write!(f, "complete_carryover"),
            CreditType::AfterThreshold => write!(f, "after_threshold"),
            CreditType::NoCarryover => write!(f, "no_carryover"),
        }
    }
}

/// Parameters of the monthly flextime evaluation, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyEvaluationRules {
    /// The credit-type policy.
    pub credit_type: CreditType,
    /// Overtime that must be exceeded before anything is credited.
    pub flextime_threshold: Option<i32>,
    /// Largest positive credit accepted in one month.
    pub max_flextime_per_month: Option<i32>,
    /// Largest balance allowed.
    pub upper_limit: Option<i32>,
    /// Magnitude of the lowest balance allowed.
    pub lower_limit: Option<i32>,
    /// Magnitude of the floor applied at year end.
    pub annual_floor: Option<i32>,
}

/// Absence figures computed by the absence subsystem for the month.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsenceSummaryInput {
    /// Vacation days taken (half days allowed).
    pub vacation_days: Decimal,
    /// Sick days.
    pub sick_days: u32,
    /// Other absence days.
    pub other_absence_days: u32,
}

/// Everything needed to close one employee-month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCalcInput {
    /// The employee being evaluated.
    pub employee_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// The month's daily values.
    pub daily_values: Vec<DailyValue>,
    /// Closing flextime balance of the previous month.
    pub previous_carryover: i32,
    /// Evaluation rules; absent means no evaluation.
    #[serde(default)]
    pub evaluation_rules: Option<MonthlyEvaluationRules>,
    /// Absence figures to pass through.
    #[serde(default)]
    pub absence_summary: AbsenceSummaryInput,
}

/// A non-fatal observation about a monthly evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonthlyWarningCode {
    /// The monthly credit was cut at the monthly maximum.
    MonthlyCapReached,
    /// The balance was clipped at the upper or lower limit.
    FlextimeCapped,
    /// Positive overtime stayed at or below the threshold.
    BelowThreshold,
    /// The policy carries nothing over.
    NoCarryover,
}

impl std::fmt::Display for MonthlyWarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            MonthlyWarningCode::MonthlyCapReached => "MONTHLY_CAP_REACHED",
            MonthlyWarningCode::FlextimeCapped => "FLEXTIME_CAPPED",
            MonthlyWarningCode::BelowThreshold => "BELOW_THRESHOLD",
            MonthlyWarningCode::NoCarryover => "NO_CARRYOVER",
        };
        f.write_str(code)
    }
}

/// The aggregated time account for one employee-month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCalcOutput {
    /// The employee evaluated.
    pub employee_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Sum of daily gross time.
    pub total_gross_time: i32,
    /// Sum of daily net time.
    pub total_net_time: i32,
    /// Sum of daily target time.
    pub total_target_time: i32,
    /// Sum of daily overtime.
    pub total_overtime: i32,
    /// Sum of daily undertime.
    pub total_undertime: i32,
    /// Sum of daily break time.
    pub total_break_time: i32,
    /// Balance carried in from the previous month.
    pub flextime_start: i32,
    /// `total_overtime - total_undertime`.
    pub flextime_change: i32,
    /// `flextime_start + flextime_change`.
    pub flextime_raw: i32,
    /// Change accepted into the balance by the credit policy.
    pub flextime_credited: i32,
    /// Minutes lost to thresholds and caps.
    pub flextime_forfeited: i32,
    /// Closing balance.
    pub flextime_end: i32,
    /// Days with gross or net time.
    pub work_days: u32,
    /// Days flagged with errors.
    pub days_with_errors: u32,
    /// Vacation days taken.
    pub vacation_taken: Decimal,
    /// Sick days.
    pub sick_days: u32,
    /// Other absence days.
    pub other_absence_days: u32,
    /// Non-fatal observations.
    pub warnings: BTreeSet<MonthlyWarningCode>,
}
