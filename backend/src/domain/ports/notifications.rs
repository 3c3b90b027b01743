//! Port for notification storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::notification::{NewNotification, Notification};
use crate::domain::user::Viewer;

use super::RepositoryError;

/// Storage and retrieval of notifications.
///
/// A notification is visible to a viewer when it targets them directly or
/// when its audience includes their role.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// List notifications visible to the viewer, optionally filtered by read
    /// state, newest first.
    async fn list_visible(
        &self,
        viewer: &Viewer,
        read: Option<bool>,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// Fetch a notification by id.
    async fn find(&self, id: Uuid) -> Result<Option<Notification>, RepositoryError>;

    /// Create a notification.
    async fn create(&self, notification: NewNotification) -> Result<Notification, RepositoryError>;

    /// Delete a notification.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Mark one notification read.
    async fn mark_read(&self, id: Uuid) -> Result<Notification, RepositoryError>;

    /// Mark every notification visible to the viewer read; returns the number
    /// of rows updated.
    async fn mark_all_read(&self, viewer: &Viewer) -> Result<u64, RepositoryError>;
}
