//! Daily allocation functionality.
//!
//! This module splits each profile's hours on each date into regular and
//! overtime hours and accrues cost. All of a person's profiles working on the
//! same date share one daily bucket sized by the daily overtime threshold.
//!
//! ## Bucket rules
//!
//! - Profiles are visited daily-rate first (see [`super::group_by_person`]).
//! - A daily-rate profile always reserves the full daily threshold, whatever
//!   hours it actually worked.
//! - An hourly profile gets regular hours only from what is left of the bucket.
//!   When a daily-rate sibling worked the same date, only its overflow is
//!   charged; because the sibling has already reserved the whole bucket, all of
//!   its hours on that date end up as overtime.
//!
//! Cost arithmetic is checked. A product or sum that leaves the `Decimal`
//! range is reported as a calculation error for the profile involved.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;

use crate::config::OvertimeRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, CalculatedStats, DayAllocation, PayProfile, RateType, Thresholds,
};

/// Multiplier applied to overtime hours.
pub const DEFAULT_OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Divisor used to derive a daily-rate profile's hourly rate when the daily
/// threshold is zero.
pub const ZERO_THRESHOLD_RATE_DIVISOR: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Running usage of one person's daily threshold on one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyBucket {
    used: Decimal,
}

impl DailyBucket {
    /// Creates an empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hours reserved so far.
    pub fn used(&self) -> Decimal {
        self.used
    }

    /// Hours still available under `threshold`, never negative.
    pub fn remaining(&self, threshold: Decimal) -> Decimal {
        (threshold - self.used).max(Decimal::ZERO)
    }

    // Saturating is exact here: once `used` passes the threshold nothing remains.
    fn reserve(&mut self, hours: Decimal) {
        self.used = self.used.saturating_add(hours);
    }
}

/// Returns the hourly rate a daily-rate profile is paid overtime from.
///
/// Returns `None` when the divisor is zero or the quotient overflows.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::implied_hourly_rate;
/// use timesheet_engine::config::OvertimeRules;
/// use rust_decimal::Decimal;
///
/// let rules = OvertimeRules::default();
/// assert_eq!(
///     implied_hourly_rate(Decimal::from(240), Decimal::from(8), &rules),
///     Some(Decimal::from(30))
/// );
/// // A zero threshold falls back to the configured divisor
/// assert_eq!(
///     implied_hourly_rate(Decimal::from(100), Decimal::ZERO, &rules),
///     Some(Decimal::from(10))
/// );
/// ```
pub fn implied_hourly_rate(
    daily_rate: Decimal,
    threshold: Decimal,
    rules: &OvertimeRules,
) -> Option<Decimal> {
    if threshold > Decimal::ZERO {
        daily_rate.checked_div(threshold)
    } else {
        daily_rate.checked_div(rules.zero_threshold_divisor)
    }
}

/// Allocates one profile's hours on one date against the shared bucket.
///
/// `has_daily_rate_worker` must be true when any profile of the same person
/// with hours on `date` is daily-rate.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when the day's cost leaves the
/// `Decimal` range.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::{allocate_profile_day, DailyBucket};
/// use timesheet_engine::config::OvertimeRules;
/// use timesheet_engine::models::{PayProfile, PersonKey, RateType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let profile = PayProfile::new(
///     "pp_1",
///     PersonKey::Crew("alex".to_string()),
///     RateType::Hourly,
///     Decimal::from(25),
///     Decimal::ZERO,
/// )
/// .with_hours(date, Decimal::from(10));
///
/// let mut bucket = DailyBucket::new();
/// let day = allocate_profile_day(&profile, date, false, &mut bucket, Decimal::from(8), &OvertimeRules::default())?;
///
/// assert_eq!(day.regular_hours, Decimal::from(8));
/// assert_eq!(day.overtime_hours, Decimal::from(2));
/// assert_eq!(day.cost, Decimal::from(275));
/// assert_eq!(bucket.used(), Decimal::from(8));
/// # Ok::<(), timesheet_engine::error::EngineError>(())
/// ```
pub fn allocate_profile_day(
    profile: &PayProfile,
    date: NaiveDate,
    has_daily_rate_worker: bool,
    bucket: &mut DailyBucket,
    threshold: Decimal,
    rules: &OvertimeRules,
) -> EngineResult<DayAllocation> {
    let hours = profile.hours_on(date);
    let overflow = || EngineError::amount_overflow(&profile.id, format_args!("on {}", date));

    let (regular_hours, overtime_hours, cost) = match profile.rate_type {
        RateType::Daily => {
            let (regular, overtime) = if hours <= threshold {
                (hours, Decimal::ZERO)
            } else {
                (threshold, hours - threshold)
            };

            let mut cost = profile.daily_rate;
            if overtime > Decimal::ZERO {
                let overtime_cost = implied_hourly_rate(profile.daily_rate, threshold, rules)
                    .and_then(|implied| overtime.checked_mul(implied))
                    .and_then(|amount| amount.checked_mul(rules.overtime_multiplier))
                    .ok_or_else(overflow)?;
                cost = cost.checked_add(overtime_cost).ok_or_else(overflow)?;
            }

            // The full threshold is reserved, not just the hours worked
            bucket.reserve(threshold);
            (regular, overtime, cost)
        }
        RateType::Hourly => {
            let regular = hours.min(bucket.remaining(threshold));
            let overtime = hours - regular;
            let overtime_cost = overtime
                .checked_mul(profile.hourly_rate)
                .and_then(|amount| amount.checked_mul(rules.overtime_multiplier))
                .ok_or_else(overflow)?;

            let cost = if has_daily_rate_worker {
                // Absorbed hours accrue no cost next to a daily-rate sibling
                overtime_cost
            } else {
                regular
                    .checked_mul(profile.hourly_rate)
                    .and_then(|amount| amount.checked_add(overtime_cost))
                    .ok_or_else(overflow)?
            };

            bucket.reserve(regular);
            (regular, overtime, cost)
        }
    };

    Ok(DayAllocation {
        date,
        hours,
        regular_hours,
        overtime_hours,
        cost,
    })
}

/// The allocation of one person's profiles on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAllocation {
    /// The date allocated.
    pub date: NaiveDate,
    /// `(position in members, allocation)` for every member with hours on the date.
    pub entries: Vec<(usize, DayAllocation)>,
    /// Hours of the bucket reserved once every member was processed.
    pub bucket_used: Decimal,
    /// Whether a daily-rate profile worked the date.
    pub has_daily_rate_worker: bool,
}

/// Allocates every member with hours > 0 on `date`, in the given order.
///
/// `members` must already be in processing order (daily-rate first).
pub fn allocate_date(
    date: NaiveDate,
    members: &[&PayProfile],
    threshold: Decimal,
    rules: &OvertimeRules,
) -> EngineResult<DateAllocation> {
    let working: Vec<(usize, &PayProfile)> = members
        .iter()
        .enumerate()
        .filter(|(_, profile)| profile.hours_on(date) > Decimal::ZERO)
        .map(|(position, profile)| (position, *profile))
        .collect();

    let has_daily_rate_worker = working
        .iter()
        .any(|(_, profile)| profile.rate_type == RateType::Daily);

    let mut bucket = DailyBucket::new();
    let entries = working
        .into_iter()
        .map(|(position, profile)| {
            let day = allocate_profile_day(
                profile,
                date,
                has_daily_rate_worker,
                &mut bucket,
                threshold,
                rules,
            )?;
            Ok((position, day))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(DateAllocation {
        date,
        entries,
        bucket_used: bucket.used(),
        has_daily_rate_worker,
    })
}

/// The daily allocation of one person across every date they worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDailyOutcome {
    /// Running stats per member, aligned with the members slice.
    pub stats: Vec<CalculatedStats>,
    /// Per-date breakdown per member, ascending by date.
    pub days: Vec<Vec<DayAllocation>>,
    /// Regular hours credited to hourly profiles across the week.
    pub weekly_regular_tally: Decimal,
    /// One audit step per date, numbered from the first step passed in.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings raised while allocating.
    pub warnings: Vec<AuditWarning>,
}

/// Allocates one person's profiles across all the dates any of them worked.
///
/// Dates are visited in ascending order. Each date starts with an empty bucket.
/// The first overflowing amount fails the whole person.
pub fn allocate_group_days(
    subject: &str,
    members: &[&PayProfile],
    thresholds: &Thresholds,
    rules: &OvertimeRules,
    first_step: u32,
) -> EngineResult<GroupDailyOutcome> {
    let threshold = thresholds.ot_daily_threshold;

    let dates: BTreeSet<NaiveDate> = members
        .iter()
        .flat_map(|profile| {
            profile
                .hours_by_date
                .iter()
                .filter(|(_, hours)| **hours > Decimal::ZERO)
                .map(|(date, _)| *date)
        })
        .collect();

    let mut outcome = GroupDailyOutcome {
        stats: vec![CalculatedStats::default(); members.len()],
        days: vec![Vec::new(); members.len()],
        weekly_regular_tally: Decimal::ZERO,
        audit_steps: Vec::with_capacity(dates.len()),
        warnings: Vec::new(),
    };

    for date in dates {
        let allocation = allocate_date(date, members, threshold, rules)?;

        for (position, day) in &allocation.entries {
            let profile = members[*position];
            let overflow = || EngineError::amount_overflow(&profile.id, format_args!("on {}", date));
            outcome.stats[*position] = outcome.stats[*position]
                .checked_add(day)
                .ok_or_else(overflow)?;

            if profile.is_hourly() {
                outcome.weekly_regular_tally = outcome
                    .weekly_regular_tally
                    .checked_add(day.regular_hours)
                    .ok_or_else(overflow)?;

                if allocation.has_daily_rate_worker && day.overtime_hours > Decimal::ZERO {
                    outcome.warnings.push(AuditWarning {
                        code: "SHARED_BUCKET_RESERVED".to_string(),
                        message: format!(
                            "Hourly profile '{}' billed {} hours on {} entirely as overtime because a daily-rate profile reserved the daily threshold",
                            profile.id,
                            day.overtime_hours.normalize(),
                            date
                        ),
                        severity: "medium".to_string(),
                    });
                }
            }

            outcome.days[*position].push(day.clone());
        }

        let step_number = first_step + outcome.audit_steps.len() as u32;
        outcome
            .audit_steps
            .push(date_audit_step(subject, members, &allocation, threshold, step_number));
    }

    Ok(outcome)
}

fn date_audit_step(
    subject: &str,
    members: &[&PayProfile],
    allocation: &DateAllocation,
    threshold: Decimal,
    step_number: u32,
) -> AuditStep {
    let hours: serde_json::Map<String, serde_json::Value> = allocation
        .entries
        .iter()
        .map(|(position, day)| {
            (
                members[*position].id.clone(),
                json!(day.hours.normalize().to_string()),
            )
        })
        .collect();

    let allocations: Vec<serde_json::Value> = allocation
        .entries
        .iter()
        .map(|(position, day)| {
            json!({
                "profile_id": members[*position].id,
                "regular_hours": day.regular_hours.normalize().to_string(),
                "overtime_hours": day.overtime_hours.normalize().to_string(),
                "cost": day.cost.normalize().to_string()
            })
        })
        .collect();

    let reasoning = if allocation.has_daily_rate_worker {
        format!(
            "{} profile(s) worked on {}; a daily-rate profile reserved the full {} hour threshold",
            allocation.entries.len(),
            allocation.date,
            threshold.normalize()
        )
    } else {
        format!(
            "{} profile(s) worked on {}; {} of {} threshold hours used",
            allocation.entries.len(),
            allocation.date,
            allocation.bucket_used.normalize(),
            threshold.normalize()
        )
    };

    AuditStep {
        step_number,
        rule_id: "daily_allocation".to_string(),
        rule_name: "Daily Allocation".to_string(),
        subject: subject.to_string(),
        input: json!({
            "date": allocation.date.to_string(),
            "threshold": threshold.normalize().to_string(),
            "hours": hours
        }),
        output: json!({
            "bucket_used": allocation.bucket_used.normalize().to_string(),
            "allocations": allocations
        }),
        reasoning,
    }
}
