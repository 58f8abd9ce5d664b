//! Day plan configuration types.
//!
//! A day plan holds the rules for one calendar day: the expected arrival and
//! departure windows, tolerances, rounding, break rules, day-change handling
//! and the candidate plans used for shift detection. All clock times are
//! stored as minutes from midnight.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::booking::MINUTES_PER_DAY;

/// Day plan codes that collide with absence-day shorthand.
pub const RESERVED_DAY_PLAN_CODES: [&str; 3] = ["U", "K", "S"];

/// Returns true when `code` is reserved for absence days (case-insensitive).
pub fn is_reserved_day_plan_code(code: &str) -> bool {
    RESERVED_DAY_PLAN_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code.trim()))
}

/// How a day plan treats deviations from the expected schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Fixed working hours; tolerances snap bookings to the schedule.
    #[default]
    Fixed,
    /// Flexible working hours; actual times are credited inside the window.
    Flextime,
}

/// How a work interval spanning midnight is attributed to calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayChangeBehavior {
    /// Each day only sees its own bookings.
    #[default]
    None,
    /// The whole interval belongs to the arrival day.
    AtArrival,
    /// The whole interval belongs to the departure day.
    AtDeparture,
    /// The interval is split at midnight with synthetic bookings.
    AutoComplete,
}

/// Tolerance bands around the expected arrival and departure, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Late-arrival grace; on flextime plans it widens the window instead.
    pub come_minus: i32,
    /// Early-arrival band.
    pub come_plus: i32,
    /// Early-departure grace.
    pub go_minus: i32,
    /// Late-departure band; on flextime plans it widens the window instead.
    pub go_plus: i32,
}

/// Rounding direction for booking times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round to the next interval boundary.
    Up,
    /// Round to the previous interval boundary.
    Down,
    /// Round to the closest interval boundary (halves round up).
    Nearest,
}

/// Rounding rule applied to one booking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingConfig {
    /// The rounding direction.
    pub mode: RoundingMode,
    /// The rounding grid in minutes.
    pub interval: i32,
}

/// The kind of a break rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// A constant deduction once per worked day.
    Fixed,
    /// A deduction once worked time reaches a threshold.
    Minimum,
    /// A deduction tied to the breaks actually recorded.
    Variable,
}

/// One break rule attached to a day plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakConfig {
    /// The kind of break rule.
    pub kind: BreakKind,
    /// Break length in minutes.
    pub duration: i32,
    /// Worked minutes required before a minimum break applies.
    #[serde(default)]
    pub after_work_minutes: Option<i32>,
    /// Deduct proportionally instead of all-or-nothing.
    #[serde(default)]
    pub minutes_difference: bool,
}

impl BreakConfig {
    /// Creates a fixed break rule.
    pub fn fixed(duration: i32) -> Self {
        Self {
            kind: BreakKind::Fixed,
            duration,
            after_work_minutes: None,
            minutes_difference: false,
        }
    }

    /// Creates a minimum break rule that applies after `after_work_minutes`.
    pub fn minimum(duration: i32, after_work_minutes: i32) -> Self {
        Self {
            kind: BreakKind::Minimum,
            duration,
            after_work_minutes: Some(after_work_minutes),
            minutes_difference: false,
        }
    }

    /// Creates a variable break rule.
    pub fn variable(duration: i32, minutes_difference: bool) -> Self {
        Self {
            kind: BreakKind::Variable,
            duration,
            after_work_minutes: None,
            minutes_difference,
        }
    }
}

/// An inclusive clock-time window in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (inclusive).
    pub from: i32,
    /// Window end (inclusive).
    pub to: i32,
}

impl TimeWindow {
    /// Creates a window from `from` to `to`.
    pub fn new(from: i32, to: i32) -> Self {
        Self { from, to }
    }

    /// Returns true when `minutes` lies inside the window.
    pub fn contains(&self, minutes: i32) -> bool {
        self.from <= minutes && minutes <= self.to
    }

    /// Returns the window width in minutes.
    pub fn width(&self) -> i32 {
        self.to - self.from
    }
}

/// An alternative day plan chosen when the day's bookings fit its windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCandidate {
    /// Window the first arrival must fall into; absent matches any arrival.
    #[serde(default)]
    pub arrival: Option<TimeWindow>,
    /// Window the last departure must fall into; absent matches any departure.
    #[serde(default)]
    pub departure: Option<TimeWindow>,
    /// The plan applied when this candidate is selected.
    pub plan: DayPlanConfig,
}

/// The rules governing one calendar day.
///
/// # Example
///
/// ```
/// use zmi_engine::models::{BreakConfig, DayPlanConfig, PlanType};
///
/// let plan = DayPlanConfig::fixed("STD", 8 * 60, 16 * 60 + 30, 480)
///     .with_breaks(vec![BreakConfig::fixed(30)]);
/// assert_eq!(plan.plan_type, PlanType::Fixed);
/// assert!(plan.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlanConfig {
    /// Short code identifying the plan.
    pub code: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Fixed or flextime.
    #[serde(default)]
    pub plan_type: PlanType,
    /// Earliest creditable / expected arrival.
    #[serde(default)]
    pub come_from: Option<i32>,
    /// Latest arrival (core time start).
    #[serde(default)]
    pub come_to: Option<i32>,
    /// Earliest departure (core time end).
    #[serde(default)]
    pub go_from: Option<i32>,
    /// Latest creditable / expected departure.
    #[serde(default)]
    pub go_to: Option<i32>,
    /// Target working time in minutes.
    #[serde(default)]
    pub target_minutes: i32,
    /// Tolerance bands.
    #[serde(default)]
    pub tolerance: Tolerance,
    /// Enables the window-widening tolerances on flextime plans.
    #[serde(default)]
    pub variable_work_time: bool,
    /// Rounding for arrivals.
    #[serde(default)]
    pub come_rounding: Option<RoundingConfig>,
    /// Rounding for departures.
    #[serde(default)]
    pub go_rounding: Option<RoundingConfig>,
    /// Net minutes below which a worked day is flagged.
    #[serde(default)]
    pub min_work_time: Option<i32>,
    /// Net minutes above which time is no longer credited.
    #[serde(default)]
    pub max_net_work_time: Option<i32>,
    /// Cross-midnight handling.
    #[serde(default)]
    pub day_change: DayChangeBehavior,
    /// Break rules, applied independently.
    #[serde(default)]
    pub breaks: Vec<BreakConfig>,
    /// Shift detection candidates.
    #[serde(default)]
    pub alternatives: Vec<ShiftCandidate>,
}

impl DayPlanConfig {
    /// Creates a fixed plan with expected arrival `come_from` and departure `go_to`.
    pub fn fixed(code: impl Into<String>, come_from: i32, go_to: i32, target_minutes: i32) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            plan_type: PlanType::Fixed,
            come_from: Some(come_from),
            come_to: None,
            go_from: None,
            go_to: Some(go_to),
            target_minutes,
            tolerance: Tolerance::default(),
            variable_work_time: false,
            come_rounding: None,
            go_rounding: None,
            min_work_time: None,
            max_net_work_time: None,
            day_change: DayChangeBehavior::None,
            breaks: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Creates a flextime plan with arrival window `come` and departure window `go`.
    pub fn flextime(
        code: impl Into<String>,
        come: TimeWindow,
        go: TimeWindow,
        target_minutes: i32,
    ) -> Self {
        Self {
            plan_type: PlanType::Flextime,
            come_to: Some(come.to),
            go_from: Some(go.from),
            ..Self::fixed(code, come.from, go.to, target_minutes)
        }
    }

    /// Replaces the tolerance bands.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replaces the break rules.
    pub fn with_breaks(mut self, breaks: Vec<BreakConfig>) -> Self {
        self.breaks = breaks;
        self
    }

    /// Sets the day-change behavior.
    pub fn with_day_change(mut self, day_change: DayChangeBehavior) -> Self {
        self.day_change = day_change;
        self
    }

    /// Replaces the shift detection candidates.
    pub fn with_alternatives(mut self, alternatives: Vec<ShiftCandidate>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Returns true when the plan needs the neighbouring days' bookings.
    pub fn needs_adjacent_days(&self) -> bool {
        self.day_change != DayChangeBehavior::None
    }

    /// Checks the plan for rules that cannot be evaluated.
    ///
    /// Candidate plans are validated recursively.
    pub fn validate(&self) -> EngineResult<()> {
        if is_reserved_day_plan_code(&self.code) {
            return Err(EngineError::ReservedDayPlanCode {
                code: self.code.clone(),
            });
        }

        let invalid = |message: String| EngineError::InvalidDayPlan {
            code: self.code.clone(),
            message,
        };

        for (field, value) in [
            ("come_from", self.come_from),
            ("come_to", self.come_to),
            ("go_from", self.go_from),
            ("go_to", self.go_to),
        ] {
            if let Some(minutes) = value {
                if !(0..MINUTES_PER_DAY).contains(&minutes) {
                    return Err(invalid(format!("{} {} is not a clock time", field, minutes)));
                }
            }
        }

        if let (Some(from), Some(to)) = (self.come_from, self.come_to) {
            if from > to {
                return Err(invalid("come_from is after come_to".to_string()));
            }
        }
        if let (Some(from), Some(to)) = (self.go_from, self.go_to) {
            if from > to {
                return Err(invalid("go_from is after go_to".to_string()));
            }
        }

        if self.target_minutes < 0 {
            return Err(invalid("target_minutes is negative".to_string()));
        }

        let t = &self.tolerance;
        if t.come_minus < 0 || t.come_plus < 0 || t.go_minus < 0 || t.go_plus < 0 {
            return Err(invalid("tolerances must not be negative".to_string()));
        }

        for rounding in [self.come_rounding, self.go_rounding].into_iter().flatten() {
            if rounding.interval <= 0 {
                return Err(invalid("rounding interval must be positive".to_string()));
            }
        }

        for brk in &self.breaks {
            if brk.duration < 0 {
                return Err(invalid("break duration is negative".to_string()));
            }
            if brk.kind == BreakKind::Minimum && brk.after_work_minutes.is_none() {
                return Err(invalid(
                    "minimum break requires after_work_minutes".to_string(),
                ));
            }
        }

        for candidate in &self.alternatives {
            if candidate.arrival.is_none() && candidate.departure.is_none() {
                return Err(invalid(format!(
                    "shift candidate '{}' declares no window",
                    candidate.plan.code
                )));
            }
            for window in [candidate.arrival, candidate.departure].into_iter().flatten() {
                if window.from > window.to {
                    return Err(invalid(format!(
                        "shift candidate '{}' has an inverted window",
                        candidate.plan.code
                    )));
                }
            }
            candidate.plan.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_codes_are_case_insensitive() {
        assert!(is_reserved_day_plan_code("U"));
        assert!(is_reserved_day_plan_code("k"));
        assert!(is_reserved_day_plan_code(" s "));
        assert!(!is_reserved_day_plan_code("US"));
        assert!(!is_reserved_day_plan_code("FLEX"));
    }

    #[test]
    fn test_validate_rejects_reserved_code() {
        let plan = DayPlanConfig::fixed("k", 480, 960, 480);
        match plan.validate() {
            Err(EngineError::ReservedDayPlanCode { code }) => assert_eq!(code, "k"),
            other => panic!("Expected ReservedDayPlanCode, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let plan = DayPlanConfig::flextime(
            "FLEX",
            TimeWindow::new(600, 420),
            TimeWindow::new(900, 1140),
            480,
        );
        assert!(matches!(
            plan.validate(),
            Err(EngineError::InvalidDayPlan { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_minimum_break_without_threshold() {
        let mut brk = BreakConfig::minimum(30, 360);
        brk.after_work_minutes = None;
        let plan = DayPlanConfig::fixed("STD", 480, 960, 480).with_breaks(vec![brk]);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_candidate_without_windows() {
        let night = DayPlanConfig::fixed("NIGHT", 1320, 360, 480);
        let plan = DayPlanConfig::fixed("STD", 480, 960, 480).with_alternatives(vec![
            ShiftCandidate {
                arrival: None,
                departure: None,
                plan: night,
            },
        ]);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_checks_candidate_plans() {
        let reserved = DayPlanConfig::fixed("U", 360, 840, 480);
        let plan = DayPlanConfig::fixed("STD", 480, 960, 480).with_alternatives(vec![
            ShiftCandidate {
                arrival: Some(TimeWindow::new(330, 420)),
                departure: None,
                plan: reserved,
            },
        ]);
        assert!(matches!(
            plan.validate(),
            Err(EngineError::ReservedDayPlanCode { .. })
        ));
    }

    #[test]
    fn test_flextime_constructor_sets_core_window() {
        let plan = DayPlanConfig::flextime(
            "FLEX",
            TimeWindow::new(420, 540),
            TimeWindow::new(900, 1140),
            480,
        );
        assert_eq!(plan.come_from, Some(420));
        assert_eq!(plan.come_to, Some(540));
        assert_eq!(plan.go_from, Some(900));
        assert_eq!(plan.go_to, Some(1140));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_time_window_contains_is_inclusive() {
        let window = TimeWindow::new(360, 420);
        assert!(window.contains(360));
        assert!(window.contains(420));
        assert!(!window.contains(421));
        assert_eq!(window.width(), 60);
    }

    #[test]
    fn test_day_plan_deserialization_defaults() {
        let json = r#"{ "code": "STD", "come_from": 480, "go_to": 960, "target_minutes": 450 }"#;
        let plan: DayPlanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(plan.plan_type, PlanType::Fixed);
        assert_eq!(plan.day_change, DayChangeBehavior::None);
        assert_eq!(plan.tolerance, Tolerance::default());
        assert!(plan.breaks.is_empty());
        assert!(!plan.needs_adjacent_days());
    }
}
