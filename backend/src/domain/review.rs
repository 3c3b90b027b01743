//! Reviews left by clients for therapists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A review score between one and five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rating(i16);

impl Rating {
    /// Validate and construct a rating.
    pub fn new(value: i16) -> Result<Self, String> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("rating must be between 1 and 5, got {value}"))
        }
    }

    /// The numeric value.
    pub fn value(self) -> i16 {
        self.0
    }
}

impl From<Rating> for i16 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One user's review of one therapist; unique per (user, therapist).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub therapist_id: Uuid,
    pub user_name: String,
    #[schema(value_type = i16, minimum = 1, maximum = 5)]
    pub rating: Rating,
    pub comment: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a review. The author is bound to the session user by
/// the inbound layer.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub therapist_id: Uuid,
    pub rating: Rating,
    pub comment: String,
    pub date: NaiveDate,
}

/// Partial update for a review.
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub rating: Option<Rating>,
    pub comment: Option<String>,
    pub date: Option<NaiveDate>,
}

/// List filter for review queries.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub therapist_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    fn out_of_range_ratings_are_rejected(#[case] value: i16) {
        assert!(Rating::new(value).is_err());
    }

    #[test]
    fn rating_deserializes_from_json_number() {
        let rating: Rating = serde_json::from_str("4").expect("valid rating");
        assert_eq!(rating.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
