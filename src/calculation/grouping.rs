//! Person grouping functionality.
//!
//! This module partitions pay profiles by [`PersonKey`] and orders each
//! person's profiles so daily-rate profiles are processed before hourly ones.

use std::collections::HashMap;

use crate::models::{PayProfile, PersonKey};

/// All pay profiles held by one person in a calculation.
///
/// `members` holds indices into the profile slice the group was built from,
/// daily-rate profiles first, otherwise in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonGroup<'a> {
    /// The shared identity of every member.
    pub person_key: &'a PersonKey,
    /// Indices of the member profiles, in processing order.
    pub members: Vec<usize>,
}

impl PersonGroup<'_> {
    /// Resolves member indices to profiles, in processing order.
    pub fn profiles<'p>(&self, profiles: &'p [PayProfile]) -> Vec<&'p PayProfile> {
        self.members.iter().map(|&index| &profiles[index]).collect()
    }
}

/// Groups pay profiles by person.
///
/// Groups appear in order of each person's first profile. Within a group the
/// members are stably sorted by [`crate::models::RateType::allocation_order`],
/// so daily-rate profiles precede hourly ones and same-type profiles keep
/// their submission order.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::group_by_person;
/// use timesheet_engine::models::{PayProfile, PersonKey, RateType};
/// use rust_decimal::Decimal;
///
/// let alex = PersonKey::Crew("alex".to_string());
/// let profiles = vec![
///     PayProfile::new("pp_1", alex.clone(), RateType::Hourly, Decimal::from(20), Decimal::ZERO),
///     PayProfile::new("pp_2", alex.clone(), RateType::Daily, Decimal::ZERO, Decimal::from(300)),
/// ];
///
/// let groups = group_by_person(&profiles);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].members, vec![1, 0]);
/// ```
pub fn group_by_person(profiles: &[PayProfile]) -> Vec<PersonGroup<'_>> {
    let mut groups: Vec<PersonGroup<'_>> = Vec::new();
    let mut positions: HashMap<&PersonKey, usize> = HashMap::new();

    for (index, profile) in profiles.iter().enumerate() {
        match positions.get(&profile.person_key) {
            Some(&position) => groups[position].members.push(index),
            None => {
                positions.insert(&profile.person_key, groups.len());
                groups.push(PersonGroup {
                    person_key: &profile.person_key,
                    members: vec![index],
                });
            }
        }
    }

    for group in &mut groups {
        group
            .members
            .sort_by_key(|&index| profiles[index].rate_type.allocation_order());
    }

    groups
}
