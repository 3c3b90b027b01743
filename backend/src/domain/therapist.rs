//! Therapist profiles and weekly schedules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::User;

/// Day of the week a schedule slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monday" => Ok(Self::Monday),
            "tuesday" => Ok(Self::Tuesday),
            "wednesday" => Ok(Self::Wednesday),
            "thursday" => Ok(Self::Thursday),
            "friday" => Ok(Self::Friday),
            "saturday" => Ok(Self::Saturday),
            "sunday" => Ok(Self::Sunday),
            other => Err(format!("unknown weekday: {other}")),
        }
    }
}

/// A 24-hour `HH:MM` time-of-day label.
///
/// ## Invariants
/// - Exactly five characters, `HH` in `00..=23`, `MM` in `00..=59`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime(String);

impl SlotTime {
    /// Validate and construct a slot time from input such as `"14:30"`.
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        let valid = matches!(value.as_bytes(), [h1 @ b'0'..=b'2', h2 @ b'0'..=b'9', b':', b'0'..=b'5', b'0'..=b'9']
            if *h1 < b'2' || *h2 <= b'3');
        if valid {
            Ok(Self(value))
        } else {
            Err(format!("time must be HH:MM in 24-hour format, got {value:?}"))
        }
    }
}

impl AsRef<str> for SlotTime {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.0
    }
}

impl TryFrom<String> for SlotTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One bookable slot in a therapist's weekly schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub day: Weekday,
    #[schema(value_type = String, example = "14:30")]
    pub time: SlotTime,
    pub available: bool,
}

/// Slot payload used when creating or replacing a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduleSlot {
    pub day: Weekday,
    pub time: SlotTime,
    pub available: bool,
}

/// Therapist profile, served hydrated with its user and schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Therapist {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub user: User,
    pub specialty: String,
    pub experience_years: i32,
    pub available: bool,
    /// Session price in cents.
    pub price_cents: i32,
    pub languages: Vec<String>,
    pub specializations: Vec<String>,
    pub education: Vec<String>,
    pub about: String,
    /// Average review rating in `[0, 5]`, recomputed on review creation.
    pub rating: f64,
    pub reviews_count: i32,
    pub time_slots: Vec<ScheduleSlot>,
}

/// Payload for creating a therapist profile.
#[derive(Debug, Clone)]
pub struct NewTherapist {
    pub user_id: Uuid,
    pub specialty: String,
    pub experience_years: i32,
    pub available: bool,
    pub price_cents: i32,
    pub languages: Vec<String>,
    pub specializations: Vec<String>,
    pub education: Vec<String>,
    pub about: String,
    pub schedule: Vec<NewScheduleSlot>,
}

/// Partial update for a therapist profile. A provided `schedule` replaces the
/// whole slot set.
#[derive(Debug, Clone, Default)]
pub struct TherapistPatch {
    pub specialty: Option<String>,
    pub experience_years: Option<i32>,
    pub available: Option<bool>,
    pub price_cents: Option<i32>,
    pub languages: Option<Vec<String>>,
    pub specializations: Option<Vec<String>>,
    pub education: Option<Vec<String>>,
    pub about: Option<String>,
    pub schedule: Option<Vec<NewScheduleSlot>>,
}

/// List filter for therapist queries.
#[derive(Debug, Clone, Default)]
pub struct TherapistFilter {
    pub available_only: bool,
    /// Case-insensitive substring match on specialty.
    pub specialty: Option<String>,
    pub language: Option<String>,
    pub min_price_cents: Option<i32>,
    pub max_price_cents: Option<i32>,
    pub min_rating: Option<f64>,
    /// Case-insensitive substring match over username and specializations.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00:00")]
    #[case("09:15")]
    #[case("19:59")]
    #[case("23:30")]
    fn accepts_valid_slot_times(#[case] input: &str) {
        assert!(SlotTime::new(input).is_ok(), "{input} should parse");
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("9:00")]
    #[case("12-30")]
    #[case("")]
    fn rejects_invalid_slot_times(#[case] input: &str) {
        assert!(SlotTime::new(input).is_err(), "{input} should be rejected");
    }

    #[test]
    fn slot_time_deserializes_from_json_string() {
        let time: SlotTime = serde_json::from_str("\"08:45\"").expect("valid time");
        assert_eq!(time.as_ref(), "08:45");
        assert!(serde_json::from_str::<SlotTime>("\"25:00\"").is_err());
    }

    #[test]
    fn weekday_round_trips_through_strings() {
        for day in [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ] {
            assert_eq!(day.as_str().parse::<Weekday>(), Ok(day));
        }
    }
}
