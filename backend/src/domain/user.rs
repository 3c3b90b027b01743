//! User accounts and role handling.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account role driving visibility scoping across the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A person booking sessions and tracking progress.
    Client,
    /// A practitioner with a published profile and schedule.
    Therapist,
    /// Platform operator.
    Admin,
}

impl UserRole {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Therapist => "therapist",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "therapist" => Ok(Self::Therapist),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

/// Application user.
///
/// The password hash never leaves the persistence layer; this type carries
/// only client-safe fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub date_joined: DateTime<Utc>,
}

/// Payload for creating a user record. The hash is produced by the inbound
/// layer; repositories never see plaintext passwords.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub profile_image: Option<String>,
    pub password_hash: String,
}

/// Partial update for a user record. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub profile_image: Option<Option<String>>,
    pub password_hash: Option<String>,
}

/// List filter for user queries.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Case-insensitive substring match over username and email.
    pub search: Option<String>,
}

/// The authenticated caller, used by repositories for visibility scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Viewer {
    /// Build a viewer from an authenticated user.
    pub fn of(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [UserRole::Client, UserRole::Therapist, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = User {
            id: Uuid::nil(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            role: UserRole::Client,
            profile_image: None,
            date_joined: Utc::now(),
        };
        let value = serde_json::to_value(&user).expect("serialize user");
        assert!(value.get("dateJoined").is_some());
        assert!(value.get("phone").is_none());
    }
}
