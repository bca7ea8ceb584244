//! The overtime allocator.
//!
//! [`OvertimeAllocator`] runs the four stages over validated pay profiles:
//! grouping, daily allocation, weekly reallocation, and assembly. It holds
//! only the overtime rules, so one allocator can serve any number of
//! concurrent calculations.
//!
//! A person whose amounts overflow is reported in [`Allocation::failures`];
//! everyone else is still priced.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::OvertimeRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, CostedProfile, PayProfile, Thresholds};

use super::assembly::{ProfileLedger, assemble};
use super::daily_allocation::allocate_group_days;
use super::grouping::{PersonGroup, group_by_person};
use super::weekly_reallocation::reallocate_weekly;

/// The output of one allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Costed profiles in input order. Profiles listed in `failures` are absent.
    pub profiles: Vec<CostedProfile>,
    /// Audit steps, numbered from 1.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings raised while allocating.
    pub warnings: Vec<AuditWarning>,
    /// Profiles that could not be priced, ascending by input index.
    pub failures: Vec<AllocationFailure>,
}

/// A profile dropped from the allocation because its person could not be priced.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationFailure {
    /// Index of the profile in the input slice.
    pub index: usize,
    /// The profile's id.
    pub profile_id: String,
    /// Why the person could not be priced.
    pub error: EngineError,
}

// One person's ledgers (aligned with the group members), steps and warnings.
struct GroupPricing {
    ledgers: Vec<ProfileLedger>,
    audit_steps: Vec<AuditStep>,
    warnings: Vec<AuditWarning>,
}

/// Splits crew hours into regular and overtime hours and prices them.
///
/// # Example
///
/// ```
/// use timesheet_engine::calculation::OvertimeAllocator;
/// use timesheet_engine::config::OvertimeRules;
/// use timesheet_engine::models::{PayProfile, PersonKey, RateType, Thresholds};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let allocator = OvertimeAllocator::new(OvertimeRules::default());
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let alex = PersonKey::Crew("alex".to_string());
/// let profiles = vec![
///     PayProfile::new("pp_a", alex.clone(), RateType::Daily, Decimal::ZERO, Decimal::from(300))
///         .with_hours(date, Decimal::from(4)),
///     PayProfile::new("pp_b", alex, RateType::Hourly, Decimal::from(20), Decimal::ZERO)
///         .with_hours(date, Decimal::from(5)),
/// ];
///
/// let allocation = allocator
///     .allocate(&profiles, &Thresholds::new(Decimal::from(8), Decimal::from(40)))
///     .unwrap();
///
/// assert_eq!(allocation.profiles[0].stats.cost, Decimal::from(300));
/// assert_eq!(allocation.profiles[1].stats.overtime_hours, Decimal::from(5));
/// assert_eq!(allocation.profiles[1].stats.cost, Decimal::from(150));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OvertimeAllocator {
    rules: OvertimeRules,
}

impl OvertimeAllocator {
    /// Creates an allocator applying `rules`.
    pub fn new(rules: OvertimeRules) -> Self {
        Self { rules }
    }

    /// Returns the rules this allocator applies.
    pub fn rules(&self) -> &OvertimeRules {
        &self.rules
    }

    /// Allocates overtime and cost for every profile.
    ///
    /// The input is never mutated. Fails only if `thresholds` or the rules are
    /// invalid. A person whose hours or amounts leave the `Decimal` range is
    /// moved to [`Allocation::failures`] with all of their profiles.
    pub fn allocate(
        &self,
        profiles: &[PayProfile],
        thresholds: &Thresholds,
    ) -> EngineResult<Allocation> {
        thresholds.validate()?;
        self.rules.validate()?;

        let groups = group_by_person(profiles);
        let mut audit_steps = vec![grouping_step(profiles, &groups)];
        let mut warnings = Vec::new();
        let mut failures = Vec::new();
        let mut ledgers: Vec<Option<ProfileLedger>> = vec![None; profiles.len()];

        for group in &groups {
            let members = group.profiles(profiles);
            let subject = group.person_key.to_string();
            let next_step = audit_steps.len() as u32 + 1;

            match self.price_group(&subject, &members, thresholds, next_step) {
                Ok(mut pricing) => {
                    audit_steps.append(&mut pricing.audit_steps);
                    warnings.append(&mut pricing.warnings);
                    for (&index, ledger) in group.members.iter().zip(pricing.ledgers) {
                        ledgers[index] = Some(ledger);
                    }
                }
                Err(error) => {
                    warn!(person = %subject, error = %error, "Person could not be priced");
                    failures.extend(group.members.iter().map(|&index| AllocationFailure {
                        index,
                        profile_id: profiles[index].id.clone(),
                        error: error.clone(),
                    }));
                }
            }
        }

        failures.sort_by_key(|failure| failure.index);

        Ok(Allocation {
            profiles: assemble(profiles, ledgers)?,
            audit_steps,
            warnings,
            failures,
        })
    }

    fn price_group(
        &self,
        subject: &str,
        members: &[&PayProfile],
        thresholds: &Thresholds,
        first_step: u32,
    ) -> EngineResult<GroupPricing> {
        let mut daily = allocate_group_days(subject, members, thresholds, &self.rules, first_step)?;
        let mut audit_steps = std::mem::take(&mut daily.audit_steps);
        let mut warnings = std::mem::take(&mut daily.warnings);

        let next_step = first_step + audit_steps.len() as u32;
        let weekly = reallocate_weekly(
            subject,
            members,
            &mut daily.stats,
            daily.weekly_regular_tally,
            thresholds.ot_weekly_threshold,
            &self.rules,
            next_step,
        )?;

        let mut converted = vec![Decimal::ZERO; members.len()];
        if let Some(weekly) = weekly {
            if weekly.unconverted > Decimal::ZERO {
                warnings.push(AuditWarning {
                    code: "WEEKLY_EXCESS_UNCONVERTED".to_string(),
                    message: format!(
                        "{} weekly excess hours for {} had no regular hours left to convert",
                        weekly.unconverted.normalize(),
                        subject
                    ),
                    severity: "high".to_string(),
                });
            }
            audit_steps.push(weekly.audit_step);
            converted = weekly.converted;
        }

        debug!(
            person = %subject,
            profiles = members.len(),
            weekly_regular_tally = %daily.weekly_regular_tally,
            "Allocated person"
        );

        let ledgers = daily
            .stats
            .into_iter()
            .zip(converted)
            .zip(daily.days)
            .map(|((stats, weekly_overtime_hours), days)| ProfileLedger {
                stats,
                weekly_overtime_hours,
                days,
            })
            .collect();

        Ok(GroupPricing {
            ledgers,
            audit_steps,
            warnings,
        })
    }
}

fn grouping_step(profiles: &[PayProfile], groups: &[PersonGroup<'_>]) -> AuditStep {
    let shared = groups.iter().filter(|g| g.members.len() > 1).count();

    AuditStep {
        step_number: 1,
        rule_id: "person_grouping".to_string(),
        rule_name: "Person Grouping".to_string(),
        subject: "batch".to_string(),
        input: json!({ "profiles": profiles.len() }),
        output: json!({
            "people": groups.len(),
            "people_with_multiple_profiles": shared
        }),
        reasoning: format!(
            "{} profiles grouped into {} people, {} holding more than one profile",
            profiles.len(),
            groups.len(),
            shared
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{PersonKey, RateType};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn week() -> Vec<NaiveDate> {
        [
            "2026-03-02",
            "2026-03-03",
            "2026-03-04",
            "2026-03-05",
            "2026-03-06",
            "2026-03-07",
        ]
        .iter()
        .map(|d| make_date(d))
        .collect()
    }

    fn hourly(id: &str, person: &str, rate: &str) -> PayProfile {
        PayProfile::new(
            id,
            PersonKey::Crew(person.to_string()),
            RateType::Hourly,
            dec(rate),
            Decimal::ZERO,
        )
    }

    fn daily(id: &str, person: &str, rate: &str) -> PayProfile {
        PayProfile::new(
            id,
            PersonKey::Crew(person.to_string()),
            RateType::Daily,
            Decimal::ZERO,
            dec(rate),
        )
    }

    fn standard() -> Thresholds {
        Thresholds::new(dec("8"), dec("40"))
    }

    fn allocator() -> OvertimeAllocator {
        OvertimeAllocator::new(OvertimeRules::default())
    }

    // ==========================================================================
    // OA-001: hourly week with one long day
    // ==========================================================================
    #[test]
    fn test_oa_001_hourly_week_with_long_monday() {
        let dates = week();
        let mut profile = hourly("pp_1", "alex", "25").with_hours(dates[0], dec("10"));
        for date in &dates[1..5] {
            profile = profile.with_hours(*date, dec("8"));
        }

        let allocation = allocator().allocate(&[profile], &standard()).unwrap();
        let costed = &allocation.profiles[0];

        assert_eq!(costed.stats.regular_hours, dec("40"));
        assert_eq!(costed.stats.overtime_hours, dec("2"));
        assert_eq!(costed.stats.cost, dec("1075"));
        assert_eq!(costed.weekly_overtime_hours, Decimal::ZERO);
        assert_eq!(costed.days[0].cost, dec("275"));
        assert!(costed.days[1..].iter().all(|d| d.cost == dec("200")));
    }

    // ==========================================================================
    // OA-002: six 8-hour days trigger weekly overtime
    // ==========================================================================
    #[test]
    fn test_oa_002_six_days_weekly_overtime() {
        let mut profile = hourly("pp_1", "alex", "25");
        for date in week() {
            profile = profile.with_hours(date, dec("8"));
        }

        let allocation = allocator().allocate(&[profile], &standard()).unwrap();
        let costed = &allocation.profiles[0];

        assert_eq!(costed.stats.regular_hours, dec("40"));
        assert_eq!(costed.stats.overtime_hours, dec("8"));
        assert_eq!(costed.stats.cost, dec("1300"));
        assert_eq!(costed.weekly_overtime_hours, dec("8"));
        // Daily breakdown keeps the pre-reallocation figures
        let daily_cost: Decimal = costed.days.iter().map(|d| d.cost).sum();
        assert_eq!(daily_cost, dec("1200"));

        let weekly_steps: Vec<&AuditStep> = allocation
            .audit_steps
            .iter()
            .filter(|s| s.rule_id == "weekly_reallocation")
            .collect();
        assert_eq!(weekly_steps.len(), 1);
    }

    // ==========================================================================
    // OA-003: dual-role person, output order follows input
    // ==========================================================================
    #[test]
    fn test_oa_003_dual_role_keeps_input_order() {
        let date = week()[0];
        let profiles = vec![
            hourly("pp_b", "alex", "20").with_hours(date, dec("5")),
            daily("pp_a", "alex", "300").with_hours(date, dec("4")),
        ];

        let allocation = allocator().allocate(&profiles, &standard()).unwrap();

        assert_eq!(allocation.profiles[0].profile.id, "pp_b");
        assert_eq!(allocation.profiles[0].stats.regular_hours, Decimal::ZERO);
        assert_eq!(allocation.profiles[0].stats.overtime_hours, dec("5"));
        assert_eq!(allocation.profiles[0].stats.cost, dec("150"));

        assert_eq!(allocation.profiles[1].profile.id, "pp_a");
        assert_eq!(allocation.profiles[1].stats.regular_hours, dec("4"));
        assert_eq!(allocation.profiles[1].stats.cost, dec("300"));

        assert_eq!(allocation.warnings.len(), 1);
        assert_eq!(allocation.warnings[0].code, "SHARED_BUCKET_RESERVED");
    }

    // ==========================================================================
    // OA-004: daily-rate over threshold
    // ==========================================================================
    #[test]
    fn test_oa_004_daily_rate_over_threshold() {
        let profile = daily("pp_1", "alex", "240").with_hours(week()[0], dec("10"));

        let allocation = allocator().allocate(&[profile], &standard()).unwrap();
        let stats = allocation.profiles[0].stats;

        assert_eq!(stats.regular_hours, dec("8"));
        assert_eq!(stats.overtime_hours, dec("2"));
        assert_eq!(stats.cost, dec("330"));
    }

    // ==========================================================================
    // OA-005: zero daily threshold
    // ==========================================================================
    #[test]
    fn test_oa_005_zero_daily_threshold() {
        let profile = daily("pp_1", "alex", "100").with_hours(week()[0], dec("5"));
        let thresholds = Thresholds::new(Decimal::ZERO, dec("40"));

        let allocation = allocator().allocate(&[profile], &thresholds).unwrap();
        let stats = allocation.profiles[0].stats;

        assert_eq!(stats.regular_hours, Decimal::ZERO);
        assert_eq!(stats.overtime_hours, dec("5"));
        assert_eq!(stats.cost, dec("175"));
    }

    // ==========================================================================
    // OA-006: empty hours
    // ==========================================================================
    #[test]
    fn test_oa_006_empty_hours_cost_nothing() {
        let profiles = vec![hourly("pp_1", "alex", "25"), daily("pp_2", "blair", "300")];

        let allocation = allocator().allocate(&profiles, &standard()).unwrap();

        for costed in &allocation.profiles {
            assert_eq!(costed.stats.regular_hours, Decimal::ZERO);
            assert_eq!(costed.stats.overtime_hours, Decimal::ZERO);
            assert_eq!(costed.stats.cost, Decimal::ZERO);
            assert!(costed.days.is_empty());
        }
    }

    #[test]
    fn test_daily_rate_never_absorbs_weekly_overtime() {
        let mut day_rate = daily("pp_a", "alex", "300");
        let mut hourly_rate = hourly("pp_b", "alex", "20");
        let dates = week();
        for date in &dates {
            day_rate = day_rate.with_hours(*date, dec("8"));
        }
        for date in &dates {
            hourly_rate = hourly_rate.with_hours(*date, dec("2"));
        }

        let allocation = allocator()
            .allocate(&[day_rate, hourly_rate], &standard())
            .unwrap();

        // Daily-rate sibling reserves every bucket, hourly credits no regular hours
        assert_eq!(allocation.profiles[0].stats.regular_hours, dec("48"));
        assert_eq!(allocation.profiles[0].stats.cost, dec("1800"));
        assert_eq!(allocation.profiles[1].stats.regular_hours, Decimal::ZERO);
        assert_eq!(allocation.profiles[1].stats.overtime_hours, dec("12"));
        assert_eq!(allocation.profiles[1].stats.cost, dec("360"));
        assert!(
            allocation
                .audit_steps
                .iter()
                .all(|s| s.rule_id != "weekly_reallocation")
        );
    }

    #[test]
    fn test_people_are_independent() {
        let date = week()[0];
        let profiles = vec![
            daily("pp_a", "alex", "300").with_hours(date, dec("4")),
            hourly("pp_b", "blair", "20").with_hours(date, dec("5")),
        ];

        let allocation = allocator().allocate(&profiles, &standard()).unwrap();

        assert_eq!(allocation.profiles[1].stats.regular_hours, dec("5"));
        assert_eq!(allocation.profiles[1].stats.cost, dec("100"));
        assert!(allocation.warnings.is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let profiles = vec![hourly("pp_1", "alex", "25").with_hours(week()[0], dec("12"))];
        let before = profiles.clone();

        let allocation = allocator().allocate(&profiles, &standard()).unwrap();

        assert_eq!(profiles, before);
        assert_eq!(allocation.profiles[0].profile, before[0]);
    }

    #[test]
    fn test_audit_steps_are_numbered_sequentially() {
        let mut alex = hourly("pp_1", "alex", "25");
        for date in week() {
            alex = alex.with_hours(date, dec("8"));
        }
        let blair = daily("pp_2", "blair", "300").with_hours(week()[0], dec("9"));

        let allocation = allocator().allocate(&[alex, blair], &standard()).unwrap();

        assert_eq!(allocation.audit_steps[0].rule_id, "person_grouping");
        // 1 grouping + 6 alex dates + 1 alex weekly + 1 blair date
        assert_eq!(allocation.audit_steps.len(), 9);
        for (i, step) in allocation.audit_steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
        assert_eq!(allocation.audit_steps[7].rule_id, "weekly_reallocation");
        assert_eq!(allocation.audit_steps[8].subject, "crew:blair");
    }

    #[test]
    fn test_invalid_thresholds_are_rejected() {
        let thresholds = Thresholds::new(dec("-1"), dec("40"));

        match allocator().allocate(&[], &thresholds) {
            Err(EngineError::InvalidThreshold { field, .. }) => {
                assert_eq!(field, "ot_daily_threshold")
            }
            other => panic!("Expected InvalidThreshold, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_divisor_is_rejected_before_allocating() {
        let rules = OvertimeRules {
            zero_threshold_divisor: Decimal::ZERO,
            ..OvertimeRules::default()
        };
        let profile = daily("pp_1", "alex", "100").with_hours(week()[0], dec("5"));
        let thresholds = Thresholds::new(Decimal::ZERO, dec("40"));

        match OvertimeAllocator::new(rules).allocate(&[profile], &thresholds) {
            Err(EngineError::InvalidOvertimeRule { field, .. }) => {
                assert_eq!(field, "zero_threshold_divisor")
            }
            other => panic!("Expected InvalidOvertimeRule, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_person_does_not_abort_others() {
        let date = week()[0];
        let mut huge = hourly("pp_huge", "alex", "1").with_hours(date, dec("10"));
        huge.hourly_rate = Decimal::MAX;
        let profiles = vec![
            huge,
            hourly("pp_ok", "blair", "25").with_hours(date, dec("10")),
            daily("pp_side", "alex", "300").with_hours(week()[1], dec("4")),
        ];

        let allocation = allocator().allocate(&profiles, &standard()).unwrap();

        // Both of alex's profiles fail together; blair is still priced
        assert_eq!(allocation.profiles.len(), 1);
        assert_eq!(allocation.profiles[0].profile.id, "pp_ok");
        assert_eq!(allocation.profiles[0].stats.cost, dec("275"));

        let failed: Vec<(usize, &str)> = allocation
            .failures
            .iter()
            .map(|f| (f.index, f.profile_id.as_str()))
            .collect();
        assert_eq!(failed, vec![(0, "pp_huge"), (2, "pp_side")]);
        assert_eq!(allocation.failures[0].error.code(), "CALCULATION_ERROR");

        // The failed person's steps are dropped and numbering stays sequential
        assert!(allocation.audit_steps.iter().all(|s| s.subject != "crew:alex"));
        for (i, step) in allocation.audit_steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
    }

    #[test]
    fn test_custom_multiplier() {
        let rules = OvertimeRules {
            overtime_multiplier: dec("2"),
            ..OvertimeRules::default()
        };
        let profile = hourly("pp_1", "alex", "25").with_hours(week()[0], dec("10"));

        let allocation = OvertimeAllocator::new(rules)
            .allocate(&[profile], &standard())
            .unwrap();

        // 8 * 25 + 2 * 25 * 2 = 300
        assert_eq!(allocation.profiles[0].stats.cost, dec("300"));
    }
}
