//! Weekly reallocation functionality.
//!
//! Once every date has been allocated, regular hours credited to a person's
//! hourly profiles beyond the weekly threshold are converted to overtime.
//! Conversion walks the person's profiles in reverse processing order and
//! never touches daily-rate profiles.

use rust_decimal::Decimal;
use serde_json::json;

use crate::config::OvertimeRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, CalculatedStats, PayProfile};

/// The result of reallocating one person's weekly excess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyReallocation {
    /// Regular hours over the weekly threshold.
    pub excess: Decimal,
    /// Hours converted per member, aligned with the members slice.
    pub converted: Vec<Decimal>,
    /// Excess that no hourly profile had regular hours left to absorb.
    pub unconverted: Decimal,
    /// The audit step documenting the conversion.
    pub audit_step: AuditStep,
}

/// Converts regular hours above the weekly threshold into overtime.
///
/// `stats` is aligned with `members` and is updated in place. Returns `None`
/// when `weekly_regular_tally` does not exceed `weekly_threshold`, and a
/// calculation error when a converted profile's cost leaves the `Decimal` range.
///
/// Each converted hour moves from regular to overtime and its cost changes
/// from the straight hourly rate to the overtime rate.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::reallocate_weekly;
/// use timesheet_engine::config::OvertimeRules;
/// use timesheet_engine::models::{CalculatedStats, PayProfile, PersonKey, RateType};
/// use rust_decimal::Decimal;
///
/// let profile = PayProfile::new(
///     "pp_1",
///     PersonKey::Crew("alex".to_string()),
///     RateType::Hourly,
///     Decimal::from(25),
///     Decimal::ZERO,
/// );
/// let mut stats = vec![CalculatedStats {
///     regular_hours: Decimal::from(48),
///     overtime_hours: Decimal::ZERO,
///     cost: Decimal::from(1200),
/// }];
///
/// let result = reallocate_weekly(
///     "crew:alex",
///     &[&profile],
///     &mut stats,
///     Decimal::from(48),
///     Decimal::from(40),
///     &OvertimeRules::default(),
///     1,
/// )?
/// .expect("tally exceeds the threshold");
///
/// assert_eq!(result.excess, Decimal::from(8));
/// assert_eq!(stats[0].regular_hours, Decimal::from(40));
/// assert_eq!(stats[0].overtime_hours, Decimal::from(8));
/// assert_eq!(stats[0].cost, Decimal::from(1300));
/// # Ok::<(), timesheet_engine::error::EngineError>(())
/// ```
pub fn reallocate_weekly(
    subject: &str,
    members: &[&PayProfile],
    stats: &mut [CalculatedStats],
    weekly_regular_tally: Decimal,
    weekly_threshold: Decimal,
    rules: &OvertimeRules,
    step_number: u32,
) -> EngineResult<Option<WeeklyReallocation>> {
    if weekly_regular_tally <= weekly_threshold {
        return Ok(None);
    }

    let excess = weekly_regular_tally - weekly_threshold;
    let mut remaining = excess;
    let mut converted = vec![Decimal::ZERO; members.len()];

    for (position, profile) in members.iter().enumerate().rev() {
        if remaining <= Decimal::ZERO {
            break;
        }
        if !profile.is_hourly() {
            continue;
        }

        let entry = &mut stats[position];
        let convert = remaining.min(entry.regular_hours);

        let straight = convert.checked_mul(profile.hourly_rate);
        let overtime_hours = entry.overtime_hours.checked_add(convert);
        let cost = straight
            .and_then(|amount| amount.checked_mul(rules.overtime_multiplier))
            .zip(straight)
            .and_then(|(premium, straight)| premium.checked_sub(straight))
            .and_then(|delta| entry.cost.checked_add(delta));
        let (Some(overtime_hours), Some(cost)) = (overtime_hours, cost) else {
            return Err(EngineError::amount_overflow(&profile.id, "in weekly reallocation"));
        };

        entry.regular_hours -= convert;
        entry.overtime_hours = overtime_hours;
        entry.cost = cost;

        converted[position] = convert;
        remaining -= convert;
    }

    let conversions: Vec<serde_json::Value> = members
        .iter()
        .zip(&converted)
        .filter(|(_, hours)| **hours > Decimal::ZERO)
        .map(|(profile, hours)| {
            json!({
                "profile_id": profile.id,
                "converted_hours": hours.normalize().to_string()
            })
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "weekly_reallocation".to_string(),
        rule_name: "Weekly Reallocation".to_string(),
        subject: subject.to_string(),
        input: json!({
            "weekly_regular_tally": weekly_regular_tally.normalize().to_string(),
            "weekly_threshold": weekly_threshold.normalize().to_string()
        }),
        output: json!({
            "excess": excess.normalize().to_string(),
            "conversions": conversions
        }),
        reasoning: format!(
            "{} regular hours exceeds {} hour weekly threshold by {} hours, converted to overtime in reverse profile order",
            weekly_regular_tally.normalize(),
            weekly_threshold.normalize(),
            excess.normalize()
        ),
    };

    Ok(Some(WeeklyReallocation {
        excess,
        converted,
        unconverted: remaining,
        audit_step,
    }))
}
