//! Overtime threshold model.
//!
//! This module contains the [`Thresholds`] type supplied per show to decide
//! when daily and weekly overtime begin.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Daily and weekly overtime thresholds for one show.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::Thresholds;
/// use rust_decimal::Decimal;
///
/// let thresholds = Thresholds::new(Decimal::from(8), Decimal::from(40));
/// assert!(thresholds.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Hours per day before the overtime multiplier applies.
    #[serde(alias = "otDailyThreshold")]
    pub ot_daily_threshold: Decimal,
    /// Cumulative regular hours per week (hourly profiles only) before
    /// excess regular hours become overtime.
    #[serde(alias = "otWeeklyThreshold")]
    pub ot_weekly_threshold: Decimal,
}

impl Thresholds {
    /// Creates a new set of thresholds.
    pub fn new(ot_daily_threshold: Decimal, ot_weekly_threshold: Decimal) -> Self {
        Self {
            ot_daily_threshold,
            ot_weekly_threshold,
        }
    }

    /// Checks that neither threshold is negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.ot_daily_threshold < Decimal::ZERO {
            return Err(EngineError::InvalidThreshold {
                field: "ot_daily_threshold".to_string(),
                message: format!("must not be negative, got {}", self.ot_daily_threshold),
            });
        }
        if self.ot_weekly_threshold < Decimal::ZERO {
            return Err(EngineError::InvalidThreshold {
                field: "ot_weekly_threshold".to_string(),
                message: format!("must not be negative, got {}", self.ot_weekly_threshold),
            });
        }
        Ok(())
    }
}
