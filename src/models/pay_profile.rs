//! Pay profile model and related types.
//!
//! This module defines the [`PayProfile`] struct, the [`PersonKey`] identity used
//! to group profiles, the [`RateType`] enum, and the raw [`PayProfileRecord`]
//! that callers submit before it has been classified.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// How a pay profile is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Paid per hour worked.
    Hourly,
    /// Paid a flat amount per day worked, regardless of hours.
    Daily,
}

impl RateType {
    /// Returns the position of this rate type in a person's processing order.
    ///
    /// Daily-rate profiles sort before hourly ones so they claim the shared
    /// daily bucket first.
    pub fn allocation_order(self) -> u8 {
        match self {
            RateType::Daily => 0,
            RateType::Hourly => 1,
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateType::Hourly => write!(f, "hourly"),
            RateType::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for RateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Ok(RateType::Hourly),
            "daily" => Ok(RateType::Daily),
            _ => Err(s.to_string()),
        }
    }
}

/// Identity used to group pay profiles belonging to the same person.
///
/// Profiles without a primary crew identity get a fallback key derived from
/// their own profile id, so two such profiles are never merged.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::PersonKey;
///
/// let crew = PersonKey::Crew("crew_42".to_string());
/// let fallback = PersonKey::Fallback("crew_42".to_string());
/// assert_ne!(crew, fallback);
/// assert_eq!(fallback.to_string(), "fallback:crew_42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PersonKey {
    /// A crew member's primary identity.
    Crew(String),
    /// Synthetic identity derived from the pay profile id.
    Fallback(String),
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonKey::Crew(id) => write!(f, "crew:{}", id),
            PersonKey::Fallback(id) => write!(f, "fallback:{}", id),
        }
    }
}

/// One validated pay record for one person on one show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayProfile {
    /// Unique identifier for the pay profile.
    pub id: String,
    /// The identity used to group this profile with its siblings.
    pub person_key: PersonKey,
    /// How this profile is paid.
    pub rate_type: RateType,
    /// Hourly rate, meaningful only for [`RateType::Hourly`].
    pub hourly_rate: Decimal,
    /// Flat daily rate, meaningful only for [`RateType::Daily`].
    pub daily_rate: Decimal,
    /// Hours worked per calendar date. Absent dates count as zero.
    #[serde(default)]
    pub hours_by_date: BTreeMap<NaiveDate, Decimal>,
}

impl PayProfile {
    /// Creates a profile with no hours logged.
    ///
    /// # Examples
    ///
    /// ```
    /// use timesheet_engine::models::{PayProfile, PersonKey, RateType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    /// let profile = PayProfile::new(
    ///     "pp_001",
    ///     PersonKey::Crew("crew_1".to_string()),
    ///     RateType::Hourly,
    ///     Decimal::from(25),
    ///     Decimal::ZERO,
    /// )
    /// .with_hours(monday, Decimal::from(10));
    ///
    /// assert_eq!(profile.hours_on(monday), Decimal::from(10));
    /// assert_eq!(profile.total_hours(), Decimal::from(10));
    /// ```
    pub fn new(
        id: impl Into<String>,
        person_key: PersonKey,
        rate_type: RateType,
        hourly_rate: Decimal,
        daily_rate: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            person_key,
            rate_type,
            hourly_rate,
            daily_rate,
            hours_by_date: BTreeMap::new(),
        }
    }

    /// Returns the profile with `hours` logged on `date`.
    pub fn with_hours(mut self, date: NaiveDate, hours: Decimal) -> Self {
        self.hours_by_date.insert(date, hours);
        self
    }

    /// Returns the hours logged on `date`, or zero.
    pub fn hours_on(&self, date: NaiveDate) -> Decimal {
        self.hours_by_date
            .get(&date)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns the sum of all logged hours.
    pub fn total_hours(&self) -> Decimal {
        self.hours_by_date.values().copied().sum()
    }

    /// Returns true if the profile is paid by the hour.
    pub fn is_hourly(&self) -> bool {
        self.rate_type == RateType::Hourly
    }
}

/// A pay profile exactly as submitted, before classification.
///
/// Converting a record into a [`PayProfile`] resolves the person key,
/// parses the rate type, coerces missing rates to zero and rejects
/// negative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayProfileRecord {
    /// Unique identifier for the pay profile.
    pub id: String,
    /// Primary identity of the crew member, if known.
    #[serde(default)]
    pub crew_member_id: Option<String>,
    /// Rate type as supplied (`"hourly"` or `"daily"`).
    #[serde(default)]
    pub rate_type: Option<String>,
    /// Hourly rate; missing means zero.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Flat daily rate; missing means zero.
    #[serde(default)]
    pub daily_rate: Option<Decimal>,
    /// Hours per date; a null value means zero.
    #[serde(default)]
    pub hours_by_date: BTreeMap<NaiveDate, Option<Decimal>>,
}

impl PayProfileRecord {
    fn person_key(&self) -> PersonKey {
        match self.crew_member_id.as_deref().map(str::trim) {
            Some(crew_id) if !crew_id.is_empty() => PersonKey::Crew(crew_id.to_string()),
            _ => PersonKey::Fallback(self.id.clone()),
        }
    }

    fn rate(&self, field: &str, value: Option<Decimal>) -> EngineResult<Decimal> {
        let value = value.unwrap_or(Decimal::ZERO);
        if value < Decimal::ZERO {
            return Err(EngineError::InvalidRate {
                profile_id: self.id.clone(),
                field: field.to_string(),
                value,
            });
        }
        Ok(value)
    }
}

impl TryFrom<PayProfileRecord> for PayProfile {
    type Error = EngineError;

    fn try_from(record: PayProfileRecord) -> EngineResult<Self> {
        let rate_type = match record.rate_type.as_deref() {
            None => {
                return Err(EngineError::MissingRateType {
                    profile_id: record.id,
                });
            }
            Some(raw) if raw.trim().is_empty() => {
                return Err(EngineError::MissingRateType {
                    profile_id: record.id,
                });
            }
            Some(raw) => raw
                .parse::<RateType>()
                .map_err(|value| EngineError::UnknownRateType {
                    profile_id: record.id.clone(),
                    value,
                })?,
        };

        let hourly_rate = record.rate("hourly_rate", record.hourly_rate)?;
        let daily_rate = record.rate("daily_rate", record.daily_rate)?;
        let person_key = record.person_key();

        let mut hours_by_date = BTreeMap::new();
        for (date, hours) in &record.hours_by_date {
            let hours = hours.unwrap_or(Decimal::ZERO);
            if hours < Decimal::ZERO {
                return Err(EngineError::InvalidHours {
                    profile_id: record.id.clone(),
                    date: *date,
                    hours,
                });
            }
            hours_by_date.insert(*date, hours);
        }

        Ok(PayProfile {
            id: record.id,
            person_key,
            rate_type,
            hourly_rate,
            daily_rate,
            hours_by_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn record(json: &str) -> PayProfileRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_hourly_record() {
        let rec = record(
            r#"{
                "id": "pp_001",
                "crew_member_id": "crew_1",
                "rate_type": "hourly",
                "hourly_rate": "25.00",
                "hours_by_date": { "2026-03-02": "10", "2026-03-03": "8" }
            }"#,
        );

        let profile = PayProfile::try_from(rec).unwrap();
        assert_eq!(profile.id, "pp_001");
        assert_eq!(profile.person_key, PersonKey::Crew("crew_1".to_string()));
        assert_eq!(profile.rate_type, RateType::Hourly);
        assert_eq!(profile.hourly_rate, dec("25"));
        assert_eq!(profile.daily_rate, Decimal::ZERO);
        assert_eq!(profile.hours_on(make_date("2026-03-02")), dec("10"));
        assert_eq!(profile.total_hours(), dec("18"));
    }

    #[test]
    fn test_rate_type_parsing_is_case_insensitive() {
        assert_eq!("Daily".parse::<RateType>(), Ok(RateType::Daily));
        assert_eq!(" HOURLY ".parse::<RateType>(), Ok(RateType::Hourly));
        assert_eq!("weekly".parse::<RateType>(), Err("weekly".to_string()));
        assert_eq!(RateType::Daily.to_string().parse::<RateType>(), Ok(RateType::Daily));
    }

    #[test]
    fn test_missing_crew_member_uses_fallback_key() {
        let rec = record(r#"{ "id": "pp_009", "rate_type": "daily", "daily_rate": 300 }"#);
        let profile = PayProfile::try_from(rec).unwrap();
        assert_eq!(profile.person_key, PersonKey::Fallback("pp_009".to_string()));
    }

    #[test]
    fn test_blank_crew_member_uses_fallback_key() {
        let rec = record(r#"{ "id": "pp_010", "crew_member_id": "  ", "rate_type": "daily" }"#);
        let profile = PayProfile::try_from(rec).unwrap();
        assert_eq!(profile.person_key, PersonKey::Fallback("pp_010".to_string()));
    }

    #[test]
    fn test_missing_rates_coerce_to_zero() {
        let rec = record(r#"{ "id": "pp_011", "rate_type": "hourly" }"#);
        let profile = PayProfile::try_from(rec).unwrap();
        assert_eq!(profile.hourly_rate, Decimal::ZERO);
        assert_eq!(profile.daily_rate, Decimal::ZERO);
    }

    #[test]
    fn test_null_hours_count_as_zero() {
        let rec = record(
            r#"{ "id": "pp_012", "rate_type": "hourly", "hours_by_date": { "2026-03-02": null } }"#,
        );
        let profile = PayProfile::try_from(rec).unwrap();
        assert_eq!(profile.hours_on(make_date("2026-03-02")), Decimal::ZERO);
    }

    #[test]
    fn test_missing_rate_type_is_rejected() {
        let rec = record(r#"{ "id": "pp_013", "hourly_rate": 20 }"#);
        match PayProfile::try_from(rec) {
            Err(EngineError::MissingRateType { profile_id }) => assert_eq!(profile_id, "pp_013"),
            other => panic!("Expected MissingRateType, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_rate_type_is_rejected() {
        let rec = record(r#"{ "id": "pp_014", "rate_type": "salary" }"#);
        match PayProfile::try_from(rec) {
            Err(EngineError::UnknownRateType { profile_id, value }) => {
                assert_eq!(profile_id, "pp_014");
                assert_eq!(value, "salary");
            }
            other => panic!("Expected UnknownRateType, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_hours_are_rejected() {
        let rec = record(
            r#"{ "id": "pp_015", "rate_type": "hourly", "hours_by_date": { "2026-03-04": "-3" } }"#,
        );
        match PayProfile::try_from(rec) {
            Err(EngineError::InvalidHours { date, hours, .. }) => {
                assert_eq!(date, make_date("2026-03-04"));
                assert_eq!(hours, dec("-3"));
            }
            other => panic!("Expected InvalidHours, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let rec = record(r#"{ "id": "pp_016", "rate_type": "daily", "daily_rate": "-100" }"#);
        match PayProfile::try_from(rec) {
            Err(EngineError::InvalidRate { field, .. }) => assert_eq!(field, "daily_rate"),
            other => panic!("Expected InvalidRate, got {:?}", other),
        }
    }

    #[test]
    fn test_allocation_order_puts_daily_first() {
        assert!(RateType::Daily.allocation_order() < RateType::Hourly.allocation_order());
    }

    #[test]
    fn test_person_key_serialization() {
        let json = serde_json::to_string(&PersonKey::Crew("crew_1".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"crew","id":"crew_1"}"#);
        let back: PersonKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PersonKey::Crew("crew_1".to_string()));
    }

    #[test]
    fn test_rate_type_serialization() {
        assert_eq!(serde_json::to_string(&RateType::Hourly).unwrap(), "\"hourly\"");
        assert_eq!(serde_json::to_string(&RateType::Daily).unwrap(), "\"daily\"");
    }
}
