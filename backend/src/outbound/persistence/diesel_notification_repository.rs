//! PostgreSQL-backed `NotificationRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::notification::{Audience, NewNotification, Notification};
use crate::domain::ports::{NotificationRepository, RepositoryError};
use crate::domain::user::Viewer;

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_stored};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, RepositoryError> {
    Ok(Notification {
        id: row.id,
        user_id: row.user_id,
        audience: parse_stored("audience", &row.audience)?,
        title: row.title,
        message: row.message,
        kind: parse_stored("kind", &row.kind)?,
        read: row.read,
        date: row.date,
        created_at: row.created_at,
    })
}

fn viewer_audiences(viewer: &Viewer) -> Vec<String> {
    vec![
        Audience::All.as_str().to_owned(),
        Audience::from(viewer.role).as_str().to_owned(),
    ]
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn list_visible(
        &self,
        viewer: &Viewer,
        read: Option<bool>,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = notifications::table
            .select(NotificationRow::as_select())
            .into_boxed()
            .filter(
                notifications::user_id.eq(viewer.user_id).or(notifications::user_id
                    .is_null()
                    .and(notifications::audience.eq_any(viewer_audiences(viewer)))),
            );
        if let Some(read) = read {
            query = query.filter(notifications::read.eq(read));
        }

        let rows: Vec<NotificationRow> = query
            .order(notifications::date.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("notification", err))?;
        rows.into_iter().map(row_to_notification).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Notification>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<NotificationRow> = notifications::table
            .find(id)
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("notification", err))?;
        row.map(row_to_notification).transpose()
    }

    async fn create(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewNotificationRow {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            audience: notification.audience.as_str().to_owned(),
            title: notification.title,
            message: notification.message,
            kind: notification.kind.as_str().to_owned(),
            date: notification.date,
        };

        let row: NotificationRow = diesel::insert_into(notifications::table)
            .values(&new_row)
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("notification", err))?;
        row_to_notification(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(notifications::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("notification", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("notification"));
        }
        Ok(())
    }

    async fn mark_read(&self, id: Uuid) -> Result<Notification, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: NotificationRow = diesel::update(notifications::table.find(id))
            .set(notifications::read.eq(true))
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("notification", err))?;
        row_to_notification(row)
    }

    async fn mark_all_read(&self, viewer: &Viewer) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            notifications::table
                .filter(
                    notifications::user_id.eq(viewer.user_id).or(notifications::user_id
                        .is_null()
                        .and(notifications::audience.eq_any(viewer_audiences(viewer)))),
                )
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error("notification", err))?;
        Ok(updated as u64)
    }
}
