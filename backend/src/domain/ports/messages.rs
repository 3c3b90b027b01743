//! Port for direct message storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::message::{Conversation, Message, MessageFilter, NewMessage};

use super::RepositoryError;

/// Storage and retrieval of direct messages.
///
/// Listing is always scoped to a participant; no query returns messages the
/// user did not send or receive.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// List messages the user sent or received, filtered, newest first.
    async fn list_for(
        &self,
        user_id: Uuid,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// Fetch a message by id.
    async fn find(&self, id: Uuid) -> Result<Option<Message>, RepositoryError>;

    /// Store a message.
    async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// Mark one message read.
    async fn mark_read(&self, id: Uuid) -> Result<Message, RepositoryError>;

    /// One summary row per partner the user has exchanged messages with:
    /// the partner, the latest message, and the unread count.
    async fn conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, RepositoryError>;
}
