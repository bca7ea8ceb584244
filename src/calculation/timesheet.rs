//! Batch timesheet calculation.
//!
//! Classifies raw pay profile records, sets aside the ones that cannot be
//! classified, allocates the rest, and wraps everything in a
//! [`TimesheetResult`] with grand totals and an audit trace.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, AuditWarning, GrandTotals, PayProfile, PayProfileRecord, RejectedProfile,
    Thresholds, TimesheetResult,
};

use super::allocator::OvertimeAllocator;

/// Calculates a whole timesheet from raw records.
///
/// A record that fails classification is reported in `rejected` and does not
/// stop the others from being allocated. So is every record of a person whose
/// amounts overflow the `Decimal` range.
///
/// `profiles` holds only the records that could be priced, in submission
/// order. It is shorter than `records` whenever anything was rejected, so its
/// positions do not line up with the input; each [`RejectedProfile`] carries
/// the input `index` of its record instead.
///
/// # Errors
///
/// Fails if `thresholds` or the allocator's rules are invalid, or if the grand
/// totals overflow.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::{OvertimeAllocator, calculate_timesheet};
/// use timesheet_engine::models::{PayProfileRecord, Thresholds};
/// use rust_decimal::Decimal;
///
/// let records: Vec<PayProfileRecord> = serde_json::from_str(r#"[
///     { "id": "pp_1", "crew_member_id": "alex", "rate_type": "hourly",
///       "hourly_rate": "25", "hours_by_date": { "2026-03-02": "10" } },
///     { "id": "pp_2", "rate_type": "weekly" }
/// ]"#).unwrap();
///
/// let result = calculate_timesheet(
///     records,
///     &Thresholds::new(Decimal::from(8), Decimal::from(40)),
///     "standard",
///     &OvertimeAllocator::default(),
/// )
/// .unwrap();
///
/// assert_eq!(result.profiles.len(), 1);
/// assert_eq!(result.rejected.len(), 1);
/// assert_eq!(result.totals.cost, Decimal::from(275));
/// ```
pub fn calculate_timesheet(
    records: Vec<PayProfileRecord>,
    thresholds: &Thresholds,
    rule_set: &str,
    allocator: &OvertimeAllocator,
) -> EngineResult<TimesheetResult> {
    let start_time = Instant::now();
    let submitted = records.len();

    let mut profiles: Vec<PayProfile> = Vec::with_capacity(submitted);
    // Input index of each entry in `profiles`
    let mut origins: Vec<usize> = Vec::with_capacity(submitted);
    let mut rejected: Vec<RejectedProfile> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let profile_id = record.id.clone();
        match PayProfile::try_from(record) {
            Ok(profile) => {
                profiles.push(profile);
                origins.push(index);
            }
            Err(err) => {
                warn!(
                    profile_id = %profile_id,
                    index,
                    code = err.code(),
                    error = %err,
                    "Rejected pay profile"
                );
                warnings.push(AuditWarning {
                    code: "REJECTED_PROFILE".to_string(),
                    message: err.to_string(),
                    severity: "high".to_string(),
                });
                rejected.push(RejectedProfile {
                    index,
                    profile_id,
                    code: err.code().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }

    let allocation = allocator.allocate(&profiles, thresholds)?;
    warnings.extend(allocation.warnings);

    for failure in allocation.failures {
        warnings.push(AuditWarning {
            code: "REJECTED_PROFILE".to_string(),
            message: failure.error.to_string(),
            severity: "high".to_string(),
        });
        rejected.push(RejectedProfile {
            index: origins[failure.index],
            profile_id: failure.profile_id,
            code: failure.error.code().to_string(),
            message: failure.error.to_string(),
        });
    }
    rejected.sort_by_key(|rejection| rejection.index);

    let totals = GrandTotals::from_profiles(&allocation.profiles).ok_or_else(|| {
        EngineError::CalculationError {
            message: "Grand totals overflow the decimal range".to_string(),
        }
    })?;
    let duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        submitted,
        costed = allocation.profiles.len(),
        rejected = rejected.len(),
        total_cost = %totals.cost,
        duration_us,
        "Timesheet calculated"
    );

    Ok(TimesheetResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        rule_set: rule_set.to_string(),
        thresholds: *thresholds,
        profiles: allocation.profiles,
        rejected,
        totals,
        audit_trace: AuditTrace {
            steps: allocation.audit_steps,
            warnings,
            duration_us,
        },
    })
}
