//! Direct messages between two users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::User;

/// A directed message, visible only to its two participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub sender_id: Uuid,
    #[schema(value_type = String)]
    pub receiver_id: Uuid,
    pub sender_name: String,
    pub receiver_name: String,
    #[serde(rename = "message")]
    pub body: String,
    #[schema(value_type = String, format = DateTime)]
    pub sent_at: DateTime<Utc>,
    pub read: bool,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

/// Payload for sending a message. The sender is bound to the session user by
/// the inbound layer.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// List filter applied on top of participant scoping.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Keep only messages exchanged with this partner.
    pub partner_id: Option<Uuid>,
    pub read: Option<bool>,
}

/// A conversation summary: one row per partner the user has messaged.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub partner: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_message: Option<Message>,
    /// Unread messages sent by the partner to the user.
    pub unread_count: i64,
}
