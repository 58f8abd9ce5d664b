//! Configuration types for the time-tracking engine.
//!
//! This module contains the file structures deserialized from the YAML
//! configuration directory and the resolved [`EngineConfig`] built from them.
//! Clock times in files are `HH:MM:SS` strings; the domain types use minutes
//! from midnight.

use chrono::{NaiveTime, Timelike};
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{
    BreakConfig, DayChangeBehavior, DayPlanConfig, MonthlyEvaluationRules, PlanType,
    RoundingConfig, TimeWindow, Tolerance,
};

/// Engine-wide settings from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Human-readable name of the configuration set.
    #[serde(default)]
    pub name: String,
    /// Version stamped on every calculated daily value.
    pub calculation_version: u32,
}

/// A clock-time window as written in a day plan file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WindowFile {
    /// Window start.
    pub from: NaiveTime,
    /// Window end.
    pub to: NaiveTime,
}

impl From<WindowFile> for TimeWindow {
    fn from(window: WindowFile) -> Self {
        TimeWindow::new(clock_minutes(window.from), clock_minutes(window.to))
    }
}

/// A shift detection candidate referencing another day plan by code.
#[derive(Debug, Clone, Deserialize)]
pub struct AlternativeFile {
    /// Code of the day plan applied when the candidate matches.
    pub plan: String,
    /// Arrival window.
    #[serde(default)]
    pub arrival: Option<WindowFile>,
    /// Departure window.
    #[serde(default)]
    pub departure: Option<WindowFile>,
}

/// One day plan file from the `day_plans/` directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DayPlanFile {
    /// Unique plan code.
    pub code: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Fixed or flextime.
    #[serde(default)]
    pub plan_type: PlanType,
    /// Earliest / expected arrival.
    #[serde(default)]
    pub come_from: Option<NaiveTime>,
    /// Latest arrival.
    #[serde(default)]
    pub come_to: Option<NaiveTime>,
    /// Earliest departure.
    #[serde(default)]
    pub go_from: Option<NaiveTime>,
    /// Latest / expected departure.
    #[serde(default)]
    pub go_to: Option<NaiveTime>,
    /// Target time in minutes.
    pub target_minutes: i32,
    /// Tolerance bands in minutes.
    #[serde(default)]
    pub tolerance: Tolerance,
    /// Window widening for flextime plans.
    #[serde(default)]
    pub variable_work_time: bool,
    /// Arrival rounding.
    #[serde(default)]
    pub come_rounding: Option<RoundingConfig>,
    /// Departure rounding.
    #[serde(default)]
    pub go_rounding: Option<RoundingConfig>,
    /// Minimum net minutes for a worked day.
    #[serde(default)]
    pub min_work_time: Option<i32>,
    /// Maximum creditable net minutes.
    #[serde(default)]
    pub max_net_work_time: Option<i32>,
    /// Cross-midnight handling.
    #[serde(default)]
    pub day_change: DayChangeBehavior,
    /// Break rules.
    #[serde(default)]
    pub breaks: Vec<BreakConfig>,
    /// Shift detection candidates.
    #[serde(default)]
    pub alternatives: Vec<AlternativeFile>,
}

/// Converts a clock time to minutes from midnight. Seconds are dropped.
pub(crate) fn clock_minutes(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

impl DayPlanFile {
    /// Builds the day plan without its shift candidates.
    pub fn to_plan(&self) -> DayPlanConfig {
        DayPlanConfig {
            code: self.code.clone(),
            name: if self.name.is_empty() {
                self.code.clone()
            } else {
                self.name.clone()
            },
            plan_type: self.plan_type,
            come_from: self.come_from.map(clock_minutes),
            come_to: self.come_to.map(clock_minutes),
            go_from: self.go_from.map(clock_minutes),
            go_to: self.go_to.map(clock_minutes),
            target_minutes: self.target_minutes,
            tolerance: self.tolerance,
            variable_work_time: self.variable_work_time,
            come_rounding: self.come_rounding,
            go_rounding: self.go_rounding,
            min_work_time: self.min_work_time,
            max_net_work_time: self.max_net_work_time,
            day_change: self.day_change,
            breaks: self.breaks.clone(),
            alternatives: Vec::new(),
        }
    }
}

/// The complete engine configuration loaded from a directory.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    evaluation_rules: Option<MonthlyEvaluationRules>,
    day_plans: HashMap<String, DayPlanConfig>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        settings: EngineSettings,
        evaluation_rules: Option<MonthlyEvaluationRules>,
        day_plans: HashMap<String, DayPlanConfig>,
    ) -> Self {
        Self {
            settings,
            evaluation_rules,
            day_plans,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the monthly evaluation rules, if configured.
    pub fn evaluation_rules(&self) -> Option<MonthlyEvaluationRules> {
        self.evaluation_rules
    }

    /// Returns all resolved day plans keyed by code.
    pub fn day_plans(&self) -> &HashMap<String, DayPlanConfig> {
        &self.day_plans
    }
}
