//! Core data models for the calculation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod booking;
mod daily_value;
mod day_plan;
mod monthly;

pub use booking::{Booking, BookingDirection, BookingSource, MINUTES_PER_DAY};
pub use daily_value::{AuditStep, DailyErrorCode, DailyValue, DailyWarningCode};
pub use day_plan::{
    BreakConfig, BreakKind, DayChangeBehavior, DayPlanConfig, PlanType, RESERVED_DAY_PLAN_CODES,
    RoundingConfig, RoundingMode, ShiftCandidate, TimeWindow, Tolerance,
    is_reserved_day_plan_code,
};
pub use monthly::{
    AbsenceSummaryInput, CreditType, MonthlyCalcInput, MonthlyCalcOutput, MonthlyEvaluationRules,
    MonthlyWarningCode,
};
