//! Break deduction.
//!
//! Computes the break minutes subtracted from a day's gross time. Each break
//! rule on the day plan is evaluated independently and the results are
//! summed.

use serde::{Deserialize, Serialize};

use crate::models::{BreakConfig, BreakKind};

use super::pairing::{WorkInterval, recorded_breaks};

/// The deduction computed for one break rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakDeduction {
    /// The rule that produced the deduction.
    pub kind: BreakKind,
    /// Minutes deducted by this rule.
    pub minutes: i32,
}

/// The result of applying all break rules for a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakResult {
    /// Total deducted minutes.
    pub total_minutes: i32,
    /// Per-rule deductions, in configuration order.
    pub deductions: Vec<BreakDeduction>,
    /// Minutes of break actually recorded between intervals.
    pub recorded_minutes: i32,
    /// True when a fixed or minimum rule deducted time without any recorded break.
    pub auto_applied: bool,
}

/// Calculates the break minutes to deduct for a day.
///
/// # Arguments
///
/// * `intervals` - The day's paired work intervals, sorted by start
/// * `breaks` - The day plan's break rules
///
/// # Rules
///
/// - `fixed`: `duration` once per worked day
/// - `minimum`: `duration` once gross time reaches `after_work_minutes`;
///   with `minutes_difference`, only the minutes worked beyond the threshold
///   (up to `duration`)
/// - `variable`: `duration` if a single recorded break of at least that
///   length exists; with `minutes_difference`, `min(recorded, duration)`
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::{calculate_breaks, WorkInterval};
/// use zmi_engine::models::BreakConfig;
/// use uuid::Uuid;
///
/// let interval = |start, end| WorkInterval {
///     start,
///     end,
///     come_id: Uuid::nil(),
///     go_id: Uuid::nil(),
/// };
/// // 20 minute recorded break
/// let intervals = vec![interval(480, 720), interval(740, 990)];
///
/// let result = calculate_breaks(&intervals, &[BreakConfig::variable(30, true)]);
/// assert_eq!(result.total_minutes, 20);
/// ```
pub fn calculate_breaks(intervals: &[WorkInterval], breaks: &[BreakConfig]) -> BreakResult {
    let gross: i32 = intervals.iter().map(WorkInterval::duration).sum();
    let gaps = recorded_breaks(intervals);
    let recorded_minutes: i32 = gaps.iter().sum();
    let longest_gap = gaps.iter().copied().max().unwrap_or(0);

    let mut deductions = Vec::with_capacity(breaks.len());
    let mut auto_applied = false;

    for rule in breaks {
        let minutes = match rule.kind {
            BreakKind::Fixed => {
                if gross > 0 {
                    rule.duration
                } else {
                    0
                }
            }
            BreakKind::Minimum => {
                let threshold = rule.after_work_minutes.unwrap_or(0);
                if gross > 0 && gross >= threshold {
                    if rule.minutes_difference {
                        rule.duration.min(gross - threshold)
                    } else {
                        rule.duration
                    }
                } else {
                    0
                }
            }
            BreakKind::Variable => {
                if rule.minutes_difference {
                    recorded_minutes.min(rule.duration)
                } else if longest_gap >= rule.duration {
                    rule.duration
                } else {
                    0
                }
            }
        };

        if minutes > 0 && rule.kind != BreakKind::Variable && recorded_minutes == 0 {
            auto_applied = true;
        }

        deductions.push(BreakDeduction {
            kind: rule.kind,
            minutes,
        });
    }

    BreakResult {
        total_minutes: deductions.iter().map(|d| d.minutes).sum(),
        deductions,
        recorded_minutes,
        auto_applied,
    }
}
