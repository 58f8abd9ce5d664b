//! Monthly aggregation.
//!
//! Sums a month of daily values and evaluates the flextime account under the
//! configured credit-type policy.

use std::collections::BTreeSet;

use chrono::Datelike;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    CreditType, MonthlyCalcInput, MonthlyCalcOutput, MonthlyEvaluationRules, MonthlyWarningCode,
};

/// The result of clipping a flextime balance to its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlextimeCapResult {
    /// The balance after clipping.
    pub balance: i32,
    /// Minutes removed by the upper limit.
    pub forfeited: i32,
    /// True when either limit clipped the balance.
    pub capped: bool,
}

/// Clips a flextime balance to `[-lower_limit, upper_limit]`.
///
/// Minutes above the upper limit are forfeited. The lower limit is a floor
/// magnitude; raising the balance to it forfeits nothing.
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::apply_flextime_caps;
///
/// let result = apply_flextime_caps(1300, Some(1200), Some(600));
/// assert_eq!(result.balance, 1200);
/// assert_eq!(result.forfeited, 100);
///
/// let result = apply_flextime_caps(-900, Some(1200), Some(600));
/// assert_eq!(result.balance, -600);
/// assert_eq!(result.forfeited, 0);
/// ```
pub fn apply_flextime_caps(
    balance: i32,
    upper_limit: Option<i32>,
    lower_limit: Option<i32>,
) -> FlextimeCapResult {
    if let Some(upper) = upper_limit {
        if balance > upper {
            return FlextimeCapResult {
                balance: upper,
                forfeited: balance - upper,
                capped: true,
            };
        }
    }
    if let Some(lower) = lower_limit {
        if balance < -lower {
            return FlextimeCapResult {
                balance: -lower,
                forfeited: 0,
                capped: true,
            };
        }
    }
    FlextimeCapResult {
        balance,
        forfeited: 0,
        capped: false,
    }
}

/// Applies the year-end floor to a closing balance.
///
/// Returns 0 when there is no balance, `-annual_floor` when the balance lies
/// below it, and the balance unchanged otherwise (including when no floor is
/// configured).
pub fn calculate_annual_carryover(balance: Option<i32>, annual_floor: Option<i32>) -> i32 {
    let Some(balance) = balance else {
        return 0;
    };
    match annual_floor {
        Some(floor) if balance < -floor => -floor,
        _ => balance,
    }
}

/// Credited and forfeited minutes before the balance limits apply.
struct Credit {
    credited: i32,
    forfeited: i32,
}

/// Cuts a positive credit at the monthly maximum.
fn cap_monthly_credit(
    credit: Credit,
    rules: &MonthlyEvaluationRules,
    warnings: &mut BTreeSet<MonthlyWarningCode>,
) -> Credit {
    match rules.max_flextime_per_month {
        Some(max) if credit.credited > max => {
            warnings.insert(MonthlyWarningCode::MonthlyCapReached);
            Credit {
                credited: max,
                forfeited: credit.forfeited + credit.credited - max,
            }
        }
        _ => credit,
    }
}

/// Aggregates one employee-month.
///
/// # Arguments
///
/// * `input` - The month's daily values, previous carryover, rules and absences
///
/// # Returns
///
/// The monthly ledger, or [`EngineError::CalculationError`] when the month is
/// invalid or a daily value belongs to another employee or month.
///
/// # Credit types
///
/// | Credit type | Credited | End | Forfeited |
/// |---|---|---|---|
/// | `no_evaluation` | change | raw | 0 |
/// | `complete_carryover` | change, monthly cap | start + credited, limits | cap excess |
/// | `after_threshold` | change above threshold, monthly cap | start + credited, limits | threshold or shortfall + cap excess |
/// | `no_carryover` | 0 | 0 | change |
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::calculate_month;
/// use zmi_engine::models::{CreditType, MonthlyCalcInput, MonthlyEvaluationRules};
/// use uuid::Uuid;
///
/// let input = MonthlyCalcInput {
///     employee_id: Uuid::new_v4(),
///     year: 2026,
///     month: 3,
///     daily_values: Vec::new(),
///     previous_carryover: 120,
///     evaluation_rules: Some(MonthlyEvaluationRules {
///         credit_type: CreditType::CompleteCarryover,
///         ..Default::default()
///     }),
///     absence_summary: Default::default(),
/// };
///
/// let output = calculate_month(&input).unwrap();
/// assert_eq!(output.flextime_start, 120);
/// assert_eq!(output.flextime_end, 120);
/// ```
pub fn calculate_month(input: &MonthlyCalcInput) -> EngineResult<MonthlyCalcOutput> {
    if !(1..=12).contains(&input.month) {
        return Err(EngineError::CalculationError {
            message: format!("Month {} is out of range", input.month),
        });
    }

    let mut total_gross_time = 0;
    let mut total_net_time = 0;
    let mut total_target_time = 0;
    let mut total_overtime = 0;
    let mut total_undertime = 0;
    let mut total_break_time = 0;
    let mut work_days = 0;
    let mut days_with_errors = 0;

    for value in &input.daily_values {
        if value.employee_id != input.employee_id {
            return Err(EngineError::CalculationError {
                message: format!(
                    "Daily value for {} belongs to employee {}, not {}",
                    value.date, value.employee_id, input.employee_id
                ),
            });
        }
        if value.date.year() != input.year || value.date.month() != input.month {
            return Err(EngineError::CalculationError {
                message: format!(
                    "Daily value for {} is outside {}-{:02}",
                    value.date, input.year, input.month
                ),
            });
        }

        total_gross_time += value.gross_time;
        total_net_time += value.net_time;
        total_target_time += value.target_time;
        total_overtime += value.overtime;
        total_undertime += value.undertime;
        total_break_time += value.break_time;
        if value.is_work_day() {
            work_days += 1;
        }
        if value.has_error {
            days_with_errors += 1;
        }
    }

    let flextime_start = input.previous_carryover;
    let flextime_change = total_overtime - total_undertime;
    let flextime_raw = flextime_start + flextime_change;

    let rules = input.evaluation_rules.unwrap_or_default();
    let mut warnings = BTreeSet::new();

    let (flextime_credited, flextime_forfeited, flextime_end) = match rules.credit_type {
        CreditType::NoEvaluation => (flextime_change, 0, flextime_raw),
        CreditType::NoCarryover => {
            warnings.insert(MonthlyWarningCode::NoCarryover);
            (0, flextime_change, 0)
        }
        CreditType::CompleteCarryover | CreditType::AfterThreshold => {
            let credit = if rules.credit_type == CreditType::AfterThreshold {
                let threshold = rules.flextime_threshold.unwrap_or(0);
                if flextime_change > threshold {
                    Credit {
                        credited: flextime_change - threshold,
                        forfeited: threshold,
                    }
                } else if flextime_change > 0 {
                    warnings.insert(MonthlyWarningCode::BelowThreshold);
                    Credit {
                        credited: 0,
                        forfeited: flextime_change,
                    }
                } else {
                    // Undertime is always deducted in full
                    Credit {
                        credited: flextime_change,
                        forfeited: 0,
                    }
                }
            } else {
                Credit {
                    credited: flextime_change,
                    forfeited: 0,
                }
            };

            let credit = cap_monthly_credit(credit, &rules, &mut warnings);
            let caps = apply_flextime_caps(
                flextime_start + credit.credited,
                rules.upper_limit,
                rules.lower_limit,
            );
            if caps.capped {
                warnings.insert(MonthlyWarningCode::FlextimeCapped);
            }
            (credit.credited, credit.forfeited + caps.forfeited, caps.balance)
        }
    };

    for warning in &warnings {
        warn!(
            employee_id = %input.employee_id,
            year = input.year,
            month = input.month,
            %warning,
            "Monthly evaluation warning"
        );
    }
    debug!(
        employee_id = %input.employee_id,
        year = input.year,
        month = input.month,
        credit_type = %rules.credit_type,
        start = flextime_start,
        change = flextime_change,
        credited = flextime_credited,
        forfeited = flextime_forfeited,
        end = flextime_end,
        "Monthly calculation completed"
    );

    Ok(MonthlyCalcOutput {
        employee_id: input.employee_id,
        year: input.year,
        month: input.month,
        total_gross_time,
        total_net_time,
        total_target_time,
        total_overtime,
        total_undertime,
        total_break_time,
        flextime_start,
        flextime_change,
        flextime_raw,
        flextime_credited,
        flextime_forfeited,
        flextime_end,
        work_days,
        days_with_errors,
        vacation_taken: input.absence_summary.vacation_days,
        sick_days: input.absence_summary.sick_days,
        other_absence_days: input.absence_summary.other_absence_days,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbsenceSummaryInput, DailyErrorCode, DailyValue};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn employee() -> Uuid {
        Uuid::from_u128(42)
    }

    fn day(d: u32, net: i32, target: i32) -> DailyValue {
        DailyValue {
            employee_id: employee(),
            date: NaiveDate::from_ymd_opt(2026, 3, d).unwrap(),
            day_plan_code: "STD".to_string(),
            gross_time: if net > 0 { net + 30 } else { 0 },
            net_time: net,
            target_time: target,
            overtime: (net - target).max(0),
            undertime: (target - net).max(0),
            break_time: if net > 0 { 30 } else { 0 },
            capped_time: 0,
            has_error: false,
            error_codes: BTreeSet::new(),
            warnings: BTreeSet::new(),
            first_come: None,
            last_go: None,
            booking_count: 2,
            calculated_at: Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            calculation_version: 1,
        }
    }

    /// Month with 500 minutes overtime and no undertime.
    fn input_with(rules: Option<MonthlyEvaluationRules>) -> MonthlyCalcInput {
        MonthlyCalcInput {
            employee_id: employee(),
            year: 2026,
            month: 3,
            daily_values: vec![day(2, 680, 480), day(3, 780, 480)],
            previous_carryover: 0,
            evaluation_rules: rules,
            absence_summary: AbsenceSummaryInput::default(),
        }
    }

    fn rules(credit_type: CreditType) -> MonthlyEvaluationRules {
        MonthlyEvaluationRules {
            credit_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_evaluation_transfers_everything() {
        let output = calculate_month(&input_with(Some(rules(CreditType::NoEvaluation)))).unwrap();
        assert_eq!(output.flextime_change, 500);
        assert_eq!(output.flextime_credited, 500);
        assert_eq!(output.flextime_end, 500);
        assert_eq!(output.flextime_forfeited, 0);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_missing_rules_behave_as_no_evaluation() {
        let mut input = input_with(None);
        input.previous_carryover = 100;
        let output = calculate_month(&input).unwrap();
        assert_eq!(output.flextime_raw, 600);
        assert_eq!(output.flextime_end, 600);
    }

    #[test]
    fn test_complete_carryover_monthly_cap() {
        let mut r = rules(CreditType::CompleteCarryover);
        r.max_flextime_per_month = Some(300);
        let output = calculate_month(&input_with(Some(r))).unwrap();
        assert_eq!(output.flextime_credited, 300);
        assert_eq!(output.flextime_forfeited, 200);
        assert_eq!(output.flextime_end, 300);
        assert!(output.warnings.contains(&MonthlyWarningCode::MonthlyCapReached));
    }

    #[test]
    fn test_complete_carryover_upper_limit_forfeits_excess() {
        let mut r = rules(CreditType::CompleteCarryover);
        r.upper_limit = Some(1000);
        let mut input = input_with(Some(r));
        input.previous_carryover = 800;
        let output = calculate_month(&input).unwrap();
        assert_eq!(output.flextime_credited, 500);
        assert_eq!(output.flextime_end, 1000);
        assert_eq!(output.flextime_forfeited, 300);
        assert!(output.warnings.contains(&MonthlyWarningCode::FlextimeCapped));
    }

    #[test]
    fn test_lower_limit_does_not_forfeit() {
        let mut r = rules(CreditType::CompleteCarryover);
        r.lower_limit = Some(600);
        let mut input = input_with(Some(r));
        input.daily_values = vec![day(2, 0, 480), day(3, 200, 480)];
        input.previous_carryover = -100;
        let output = calculate_month(&input).unwrap();
        assert_eq!(output.flextime_change, -760);
        assert_eq!(output.flextime_end, -600);
        assert_eq!(output.flextime_forfeited, 0);
        assert!(output.warnings.contains(&MonthlyWarningCode::FlextimeCapped));
    }

    #[test]
    fn test_after_threshold_above() {
        let mut r = rules(CreditType::AfterThreshold);
        r.flextime_threshold = Some(60);
        let output = calculate_month(&input_with(Some(r))).unwrap();
        assert_eq!(output.flextime_credited, 440);
        assert_eq!(output.flextime_forfeited, 60);
        assert_eq!(output.flextime_end, 440);
    }

    #[test]
    fn test_after_threshold_below() {
        let mut r = rules(CreditType::AfterThreshold);
        r.flextime_threshold = Some(600);
        let output = calculate_month(&input_with(Some(r))).unwrap();
        assert_eq!(output.flextime_credited, 0);
        assert_eq!(output.flextime_forfeited, 500);
        assert_eq!(output.flextime_end, 0);
        assert!(output.warnings.contains(&MonthlyWarningCode::BelowThreshold));
    }

    #[test]
    fn test_after_threshold_undertime_is_fully_deducted() {
        let mut r = rules(CreditType::AfterThreshold);
        r.flextime_threshold = Some(60);
        let mut input = input_with(Some(r));
        input.daily_values = vec![day(2, 400, 480)];
        input.previous_carryover = 200;
        let output = calculate_month(&input).unwrap();
        assert_eq!(output.flextime_credited, -80);
        assert_eq!(output.flextime_forfeited, 0);
        assert_eq!(output.flextime_end, 120);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_after_threshold_respects_monthly_cap() {
        let mut r = rules(CreditType::AfterThreshold);
        r.flextime_threshold = Some(60);
        r.max_flextime_per_month = Some(400);
        let output = calculate_month(&input_with(Some(r))).unwrap();
        assert_eq!(output.flextime_credited, 400);
        assert_eq!(output.flextime_forfeited, 100);
        assert!(output.warnings.contains(&MonthlyWarningCode::MonthlyCapReached));
    }

    #[test]
    fn test_no_carryover() {
        let output = calculate_month(&input_with(Some(rules(CreditType::NoCarryover)))).unwrap();
        assert_eq!(output.flextime_credited, 0);
        assert_eq!(output.flextime_end, 0);
        assert_eq!(output.flextime_forfeited, 500);
        assert!(output.warnings.contains(&MonthlyWarningCode::NoCarryover));
    }

    #[test]
    fn test_totals_and_day_counts() {
        let mut input = input_with(None);
        let mut flagged = day(4, 0, 480);
        flagged.has_error = true;
        flagged.error_codes.insert(DailyErrorCode::MissingGo);
        input.daily_values.push(flagged);
        input.absence_summary = AbsenceSummaryInput {
            vacation_days: Decimal::new(15, 1),
            sick_days: 2,
            other_absence_days: 1,
        };

        let output = calculate_month(&input).unwrap();
        assert_eq!(output.total_net_time, 1460);
        assert_eq!(output.total_gross_time, 1520);
        assert_eq!(output.total_target_time, 1440);
        assert_eq!(output.total_break_time, 60);
        assert_eq!(output.total_overtime, 500);
        assert_eq!(output.total_undertime, 480);
        assert_eq!(output.work_days, 2);
        assert_eq!(output.days_with_errors, 1);
        assert_eq!(output.vacation_taken, Decimal::new(15, 1));
        assert_eq!(output.sick_days, 2);
        assert_eq!(output.other_absence_days, 1);
    }

    #[test]
    fn test_rejects_foreign_daily_values() {
        let mut input = input_with(None);
        input.daily_values[0].employee_id = Uuid::from_u128(1);
        assert!(matches!(
            calculate_month(&input),
            Err(EngineError::CalculationError { .. })
        ));

        let mut input = input_with(None);
        input.daily_values[0].date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert!(calculate_month(&input).is_err());

        let mut input = input_with(None);
        input.month = 13;
        assert!(calculate_month(&input).is_err());
    }

    #[test]
    fn test_annual_carryover() {
        assert_eq!(calculate_annual_carryover(Some(-1500), Some(1000)), -1000);
        assert_eq!(calculate_annual_carryover(Some(-500), Some(1000)), -500);
        assert_eq!(calculate_annual_carryover(Some(2000), Some(1000)), 2000);
        assert_eq!(calculate_annual_carryover(None, Some(1000)), 0);
        assert_eq!(calculate_annual_carryover(Some(-1500), None), -1500);
    }

    #[test]
    fn test_cap_helper_passes_balances_inside_limits() {
        let result = apply_flextime_caps(300, Some(1200), Some(600));
        assert_eq!(result.balance, 300);
        assert!(!result.capped);
    }
}
