//! Error types for the time-tracking calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Errors are reserved for configuration problems; inconsistent booking data
//! never aborts a calculation and is reported through per-day error codes
//! on [`DailyValue`](crate::models::DailyValue) instead.

use thiserror::Error;

/// The main error type for the calculation engine.
///
/// # Example
///
/// ```
/// use zmi_engine::error::EngineError;
///
/// let error = EngineError::DayPlanNotFound {
///     code: "NIGHT".to_string(),
/// };
/// assert_eq!(error.to_string(), "Day plan not found: NIGHT");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A day plan code was not found in the configuration.
    #[error("Day plan not found: {code}")]
    DayPlanNotFound {
        /// The day plan code that was not found.
        code: String,
    },

    /// A day plan used one of the codes reserved for absence days.
    #[error("Day plan code '{code}' is reserved for absence days")]
    ReservedDayPlanCode {
        /// The offending day plan code.
        code: String,
    },

    /// A day plan contained inconsistent rules.
    #[error("Invalid day plan '{code}': {message}")]
    InvalidDayPlan {
        /// The code of the invalid day plan.
        code: String,
        /// A description of what made the day plan invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
