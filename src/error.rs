//! Error types for the Timesheet Overtime Allocation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while classifying pay profiles,
//! loading configuration, or allocating overtime.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the Timesheet Overtime Allocation Engine.
///
/// # Example
///
/// ```
/// use timesheet_engine::error::EngineError;
///
/// let error = EngineError::UnknownRateType {
///     profile_id: "pp_001".to_string(),
///     value: "weekly".to_string(),
/// };
/// assert_eq!(error.to_string(), "Pay profile 'pp_001' has unknown rate type 'weekly'");
/// assert_eq!(error.code(), "UNKNOWN_RATE_TYPE");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No threshold configuration exists for the requested show.
    #[error("Show not found: {show_id}")]
    ShowNotFound {
        /// The show id that was requested.
        show_id: String,
    },

    /// A pay profile did not carry a rate type.
    #[error("Pay profile '{profile_id}' has no rate type")]
    MissingRateType {
        /// The id of the offending pay profile.
        profile_id: String,
    },

    /// A pay profile carried a rate type the engine does not recognise.
    #[error("Pay profile '{profile_id}' has unknown rate type '{value}'")]
    UnknownRateType {
        /// The id of the offending pay profile.
        profile_id: String,
        /// The rate type as supplied.
        value: String,
    },

    /// A pay profile logged negative hours on a date.
    #[error("Pay profile '{profile_id}' has invalid hours {hours} on {date}")]
    InvalidHours {
        /// The id of the offending pay profile.
        profile_id: String,
        /// The date carrying the invalid value.
        date: NaiveDate,
        /// The hours as supplied.
        hours: Decimal,
    },

    /// A pay profile carried a negative rate.
    #[error("Pay profile '{profile_id}' has invalid {field}: {value}")]
    InvalidRate {
        /// The id of the offending pay profile.
        profile_id: String,
        /// The rate field (`hourly_rate` or `daily_rate`).
        field: String,
        /// The rate as supplied.
        value: Decimal,
    },

    /// An overtime threshold was invalid.
    #[error("Invalid threshold '{field}': {message}")]
    InvalidThreshold {
        /// The threshold field that was invalid.
        field: String,
        /// A description of what made the threshold invalid.
        message: String,
    },

    /// An overtime rule (multiplier or divisor) was invalid.
    #[error("Invalid overtime rule '{field}': {message}")]
    InvalidOvertimeRule {
        /// The rule field that was invalid.
        field: String,
        /// A description of what made the rule invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Returns a stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            EngineError::ShowNotFound { .. } => "SHOW_NOT_FOUND",
            EngineError::MissingRateType { .. } => "MISSING_RATE_TYPE",
            EngineError::UnknownRateType { .. } => "UNKNOWN_RATE_TYPE",
            EngineError::InvalidHours { .. } => "INVALID_HOURS",
            EngineError::InvalidRate { .. } => "INVALID_RATE",
            EngineError::InvalidThreshold { .. } => "INVALID_THRESHOLD",
            EngineError::InvalidOvertimeRule { .. } => "INVALID_OVERTIME_RULE",
            EngineError::CalculationError { .. } => "CALCULATION_ERROR",
        }
    }

    /// Error raised when a pay profile's hours or amounts leave the decimal range.
    pub fn amount_overflow(profile_id: &str, context: impl fmt::Display) -> Self {
        EngineError::CalculationError {
            message: format!(
                "Amounts for pay profile '{}' overflow the decimal range {}",
                profile_id, context
            ),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
