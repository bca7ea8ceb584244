//! Result assembly.
//!
//! Attaches each profile's final stats to a copy of the profile, in the
//! order the profiles were submitted. Profiles without a ledger are skipped.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{CalculatedStats, CostedProfile, DayAllocation, PayProfile};

/// Everything computed for one profile, before it is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileLedger {
    /// Final stats after weekly reallocation.
    pub stats: CalculatedStats,
    /// Regular hours converted to overtime by the weekly threshold.
    pub weekly_overtime_hours: Decimal,
    /// Per-date breakdown, ascending by date.
    pub days: Vec<DayAllocation>,
}

/// Pairs every profile with the ledger at the same index.
///
/// A `None` ledger drops its profile from the output. The caller's profiles
/// are cloned, never mutated. Returns a `CalculationError` if the ledger count
/// does not match the profile count.
pub fn assemble(
    profiles: &[PayProfile],
    ledgers: Vec<Option<ProfileLedger>>,
) -> EngineResult<Vec<CostedProfile>> {
    if profiles.len() != ledgers.len() {
        return Err(EngineError::CalculationError {
            message: format!(
                "{} ledgers computed for {} profiles",
                ledgers.len(),
                profiles.len()
            ),
        });
    }

    Ok(profiles
        .iter()
        .zip(ledgers)
        .filter_map(|(profile, ledger)| {
            ledger.map(|ledger| CostedProfile {
                profile: profile.clone(),
                stats: ledger.stats,
                weekly_overtime_hours: ledger.weekly_overtime_hours,
                days: ledger.days,
            })
        })
        .collect())
}
