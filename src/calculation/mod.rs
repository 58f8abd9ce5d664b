//! Calculation logic for the time-tracking engine.
//!
//! Each pipeline stage lives in its own module: tolerance normalization,
//! rounding, evaluation window capping, booking pairing, break deduction,
//! shift detection and day-change handling. The daily calculator chains
//! them into a [`DailyValue`](crate::models::DailyValue); the monthly
//! aggregator folds a month of daily values into the flextime account.

mod breaks;
mod capping;
mod daily;
mod day_change;
mod monthly;
mod pairing;
mod rounding;
mod shift_detection;
mod tolerance;

pub use breaks::{BreakDeduction, BreakResult, calculate_breaks};
pub use capping::{CappingResult, cap_time, evaluation_window};
pub use daily::{DailyCalculation, DailyCalculator, DailyInput, required_booking_range};
pub use day_change::{
    DayAssembly, HalfInterval, MidnightSplit, SPLIT_END_MINUTE, assemble_day, split_at_midnight,
};
pub use monthly::{
    FlextimeCapResult, apply_flextime_caps, calculate_annual_carryover, calculate_month,
};
pub use pairing::{PairingResult, WorkEvent, WorkInterval, pair_events, recorded_breaks};
pub use rounding::{apply_rounding, round_time};
pub use shift_detection::{ShiftDetection, detect_shift};
pub use tolerance::{expected_boundary, normalize_time};
