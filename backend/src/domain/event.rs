//! Events (workshops, webinars, group sessions) and their registrations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::appointment::PaymentStatus;

/// Category of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Workshop,
    Webinar,
    GroupSession,
    Conference,
    Training,
}

impl EventCategory {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workshop => "workshop",
            Self::Webinar => "webinar",
            Self::GroupSession => "group_session",
            Self::Conference => "conference",
            Self::Training => "training",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workshop" => Ok(Self::Workshop),
            "webinar" => Ok(Self::Webinar),
            "group_session" => Ok(Self::GroupSession),
            "conference" => Ok(Self::Conference),
            "training" => Ok(Self::Training),
            other => Err(format!("unknown event category: {other}")),
        }
    }
}

/// One user's registration for an event; unique per (user, event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: Uuid,
    pub user_name: String,
    #[schema(value_type = String)]
    pub event_id: Uuid,
    #[schema(value_type = String, format = DateTime)]
    pub registered_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
}

/// A capacity-bounded event, served with its registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub title: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    /// Free-form label such as `"10 AM - 12 PM"`.
    pub time: String,
    pub location: String,
    pub category: EventCategory,
    pub capacity: i32,
    pub description: String,
    pub presenter: String,
    /// Admission price in cents; zero means free.
    pub price_cents: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    pub registered_users: Vec<EventRegistration>,
    pub spots_left: i32,
}

/// Payload for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub category: EventCategory,
    pub capacity: i32,
    pub description: String,
    pub presenter: String,
    pub price_cents: i32,
    pub image: Option<String>,
}

/// Partial update for an event.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<EventCategory>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub presenter: Option<String>,
    pub price_cents: Option<i32>,
    pub image: Option<Option<String>>,
}

/// List filter for event queries.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub category: Option<EventCategory>,
    /// Keep only events on or after this date.
    pub upcoming_from: Option<NaiveDate>,
    pub free_only: bool,
    /// Case-insensitive substring match over title, description, presenter
    /// and location.
    pub search: Option<String>,
}
