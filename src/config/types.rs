//! Configuration types for overtime allocation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::{DEFAULT_OVERTIME_MULTIPLIER, ZERO_THRESHOLD_RATE_DIVISOR};
use crate::error::{EngineError, EngineResult};
use crate::models::Thresholds;

/// The multipliers and divisors the allocator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OvertimeRules {
    /// Multiplier applied to overtime hours.
    #[serde(default = "default_multiplier", alias = "multiplier")]
    pub overtime_multiplier: Decimal,
    /// Divisor for a daily-rate profile's implied hourly rate when the daily
    /// threshold is zero.
    #[serde(default = "default_divisor")]
    pub zero_threshold_divisor: Decimal,
}

fn default_multiplier() -> Decimal {
    DEFAULT_OVERTIME_MULTIPLIER
}

fn default_divisor() -> Decimal {
    ZERO_THRESHOLD_RATE_DIVISOR
}

impl OvertimeRules {
    /// Checks the multiplier is at least 1 and the divisor is positive.
    pub fn validate(&self) -> EngineResult<()> {
        if self.overtime_multiplier < Decimal::ONE {
            return Err(EngineError::InvalidOvertimeRule {
                field: "overtime_multiplier".to_string(),
                message: format!("must be at least 1, got {}", self.overtime_multiplier),
            });
        }
        if self.zero_threshold_divisor <= Decimal::ZERO {
            return Err(EngineError::InvalidOvertimeRule {
                field: "zero_threshold_divisor".to_string(),
                message: format!("must be positive, got {}", self.zero_threshold_divisor),
            });
        }
        Ok(())
    }
}

impl Default for OvertimeRules {
    fn default() -> Self {
        Self {
            overtime_multiplier: DEFAULT_OVERTIME_MULTIPLIER,
            zero_threshold_divisor: ZERO_THRESHOLD_RATE_DIVISOR,
        }
    }
}

/// Engine configuration file structure (`engine.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// The human-readable name of the rule set.
    pub name: String,
    /// The version or effective date of the rule set.
    pub version: String,
    /// Overtime rules.
    #[serde(default)]
    pub overtime: OvertimeRules,
    /// Thresholds used when a show has no override.
    pub default_thresholds: Thresholds,
}

/// Threshold override for one show (`shows/*.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct ShowConfig {
    /// The show identifier.
    pub show_id: String,
    /// The human-readable show name.
    pub name: String,
    /// Hours per day before daily overtime.
    pub ot_daily_threshold: Decimal,
    /// Regular hours per week before weekly overtime.
    pub ot_weekly_threshold: Decimal,
}

impl ShowConfig {
    /// Returns the show's thresholds.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.ot_daily_threshold, self.ot_weekly_threshold)
    }
}

/// The complete configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct TimesheetConfig {
    /// Engine configuration.
    engine: EngineConfig,
    /// Show overrides keyed by show id.
    shows: HashMap<String, ShowConfig>,
}

impl TimesheetConfig {
    /// Creates a new TimesheetConfig from its component parts.
    pub fn new(engine: EngineConfig, shows: Vec<ShowConfig>) -> Self {
        let shows = shows
            .into_iter()
            .map(|show| (show.show_id.clone(), show))
            .collect();
        Self { engine, shows }
    }

    /// Returns the engine configuration.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Returns all show overrides.
    pub fn shows(&self) -> &HashMap<String, ShowConfig> {
        &self.shows
    }
}
