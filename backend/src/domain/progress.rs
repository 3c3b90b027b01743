//! Per-user daily progress logs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A self-reported mood score between one and ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct MoodRating(i16);

impl MoodRating {
    /// Validate and construct a mood rating.
    pub fn new(value: i16) -> Result<Self, String> {
        if (1..=10).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("mood rating must be between 1 and 10, got {value}"))
        }
    }

    /// The numeric value.
    pub fn value(self) -> i16 {
        self.0
    }
}

impl From<MoodRating> for i16 {
    fn from(value: MoodRating) -> Self {
        value.0
    }
}

impl TryFrom<i16> for MoodRating {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One day's progress entry for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = i16, minimum = 1, maximum = 10)]
    pub mood_rating: MoodRating,
    pub notes: String,
    pub completed_exercises: Vec<String>,
    pub therapist_feedback: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a progress entry.
#[derive(Debug, Clone)]
pub struct NewProgressEntry {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub mood_rating: MoodRating,
    pub notes: String,
    pub completed_exercises: Vec<String>,
    pub therapist_feedback: String,
}

/// Partial update for a progress entry.
#[derive(Debug, Clone, Default)]
pub struct ProgressPatch {
    pub date: Option<NaiveDate>,
    pub mood_rating: Option<MoodRating>,
    pub notes: Option<String>,
    pub completed_exercises: Option<Vec<String>>,
    pub therapist_feedback: Option<String>,
}

/// List filter applied on top of role scoping.
#[derive(Debug, Clone, Default)]
pub struct ProgressFilter {
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_rating_bounds() {
        assert!(MoodRating::new(1).is_ok());
        assert!(MoodRating::new(10).is_ok());
        assert!(MoodRating::new(0).is_err());
        assert!(MoodRating::new(11).is_err());
    }
}
