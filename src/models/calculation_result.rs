//! Calculation result models for the Timesheet Overtime Allocation Engine.
//!
//! This module contains the [`TimesheetResult`] type and its associated structures
//! that capture all outputs from an overtime allocation, including per-profile
//! stats, per-date breakdowns, rejected profiles, grand totals, and audit traces.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PayProfile, Thresholds};

/// Regular hours, overtime hours, and labor cost for one pay profile.
///
/// `regular_hours + overtime_hours` always equals the profile's total logged hours.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::CalculatedStats;
/// use rust_decimal::Decimal;
///
/// let stats = CalculatedStats {
///     regular_hours: Decimal::from(40),
///     overtime_hours: Decimal::from(2),
///     cost: Decimal::from(1075),
/// };
/// assert_eq!(stats.total_hours(), Decimal::from(42));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedStats {
    /// Hours paid at the straight rate (or covered by the flat daily rate).
    pub regular_hours: Decimal,
    /// Hours classified as overtime.
    pub overtime_hours: Decimal,
    /// Total labor cost.
    pub cost: Decimal,
}

impl CalculatedStats {
    /// Returns regular plus overtime hours.
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours + self.overtime_hours
    }

    /// Adds one date's allocation to the running stats.
    ///
    /// Returns `None` if any sum leaves the `Decimal` range.
    pub fn checked_add(&self, day: &DayAllocation) -> Option<Self> {
        Some(Self {
            regular_hours: self.regular_hours.checked_add(day.regular_hours)?,
            overtime_hours: self.overtime_hours.checked_add(day.overtime_hours)?,
            cost: self.cost.checked_add(day.cost)?,
        })
    }
}

/// How one profile's hours on one date were split and priced.
///
/// These are the daily figures before any weekly reallocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAllocation {
    /// The date worked.
    pub date: NaiveDate,
    /// Hours logged on the date.
    pub hours: Decimal,
    /// Hours classified as regular.
    pub regular_hours: Decimal,
    /// Hours classified as overtime.
    pub overtime_hours: Decimal,
    /// Cost accrued on the date.
    pub cost: Decimal,
}

/// A pay profile with its computed stats attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostedProfile {
    /// The profile the stats were computed for.
    pub profile: PayProfile,
    /// Final stats after weekly reallocation.
    pub stats: CalculatedStats,
    /// Regular hours converted to overtime by the weekly threshold.
    pub weekly_overtime_hours: Decimal,
    /// Per-date breakdown, ascending by date.
    pub days: Vec<DayAllocation>,
}

/// A submitted profile that could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedProfile {
    /// Position of the record in the submitted list.
    pub index: usize,
    /// The id of the rejected pay profile.
    pub profile_id: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable reason.
    pub message: String,
}

/// Aggregated totals across all costed profiles.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::GrandTotals;
///
/// let totals = GrandTotals::from_profiles(&[]).unwrap();
/// assert_eq!(totals.profile_count, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrandTotals {
    /// Number of profiles included.
    pub profile_count: usize,
    /// Sum of regular hours.
    pub regular_hours: Decimal,
    /// Sum of overtime hours.
    pub overtime_hours: Decimal,
    /// Sum of labor cost.
    pub cost: Decimal,
}

impl GrandTotals {
    /// Sums the stats of every profile, or `None` if a sum overflows.
    pub fn from_profiles(profiles: &[CostedProfile]) -> Option<Self> {
        profiles
            .iter()
            .try_fold(GrandTotals::default(), |totals, costed| {
                Some(GrandTotals {
                    profile_count: totals.profile_count + 1,
                    regular_hours: totals.regular_hours.checked_add(costed.stats.regular_hours)?,
                    overtime_hours: totals
                        .overtime_hours
                        .checked_add(costed.stats.overtime_hours)?,
                    cost: totals.cost.checked_add(costed.stats.cost)?,
                })
            })
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The person (or batch) the rule was applied to.
    pub subject: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 42,
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a timesheet calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Name of the rule set the calculation used.
    pub rule_set: String,
    /// The thresholds the calculation used.
    pub thresholds: Thresholds,
    /// Costed profiles, in submission order.
    pub profiles: Vec<CostedProfile>,
    /// Records that could not be classified.
    pub rejected: Vec<RejectedProfile>,
    /// Aggregated totals across `profiles`.
    pub totals: GrandTotals,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
