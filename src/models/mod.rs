//! Core data models for the Timesheet Overtime Allocation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod pay_profile;
mod thresholds;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculatedStats, CostedProfile, DayAllocation,
    GrandTotals, RejectedProfile, TimesheetResult,
};
pub use pay_profile::{PayProfile, PayProfileRecord, PersonKey, RateType};
pub use thresholds::Thresholds;
