//! Broadcast and targeted notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserRole;

/// What produced the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    System,
    Appointment,
    Message,
    Event,
}

impl NotificationKind {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Appointment => "appointment",
            Self::Message => "message",
            Self::Event => "event",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "appointment" => Ok(Self::Appointment),
            "message" => Ok(Self::Message),
            "event" => Ok(Self::Event),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// Who a notification is addressed to when no target user is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    All,
    Client,
    Therapist,
    Admin,
}

impl Audience {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Client => "client",
            Self::Therapist => "therapist",
            Self::Admin => "admin",
        }
    }

    /// Whether a user with `role` falls inside this audience.
    pub fn includes(self, role: UserRole) -> bool {
        match self {
            Self::All => true,
            Self::Client => role == UserRole::Client,
            Self::Therapist => role == UserRole::Therapist,
            Self::Admin => role == UserRole::Admin,
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "client" => Ok(Self::Client),
            "therapist" => Ok(Self::Therapist),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown audience: {other}")),
        }
    }
}

impl From<UserRole> for Audience {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Client => Self::Client,
            UserRole::Therapist => Self::Therapist,
            UserRole::Admin => Self::Admin,
        }
    }
}

/// A notification, either targeted at one user or at an audience.
///
/// Visible to a user when `user_id` matches them, or when `audience`
/// includes their role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub user_id: Option<Uuid>,
    pub audience: Audience,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    #[schema(value_type = String, format = DateTime)]
    pub date: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Option<Uuid>,
    pub audience: Audience,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_inclusion_matches_roles() {
        assert!(Audience::All.includes(UserRole::Client));
        assert!(Audience::Therapist.includes(UserRole::Therapist));
        assert!(!Audience::Therapist.includes(UserRole::Client));
        assert!(!Audience::Admin.includes(UserRole::Therapist));
    }
}
