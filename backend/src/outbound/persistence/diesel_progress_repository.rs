//! PostgreSQL-backed `ProgressRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ProgressRepository, RepositoryError};
use crate::domain::progress::{
    MoodRating, NewProgressEntry, ProgressEntry, ProgressFilter, ProgressPatch,
};
use crate::domain::user::{UserRole, Viewer};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewProgressRow, ProgressChangeset, ProgressRow};
use super::pool::DbPool;
use super::schema::{appointments, progress_entries, therapists};

/// Diesel-backed implementation of the `ProgressRepository` port.
#[derive(Clone)]
pub struct DieselProgressRepository {
    pool: DbPool,
}

impl DieselProgressRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: ProgressRow) -> Result<ProgressEntry, RepositoryError> {
    Ok(ProgressEntry {
        id: row.id,
        user_id: row.user_id,
        date: row.date,
        mood_rating: MoodRating::new(row.mood)
            .map_err(|_| RepositoryError::query("invalid stored mood rating"))?,
        notes: row.notes,
        completed_exercises: row.completed_exercises,
        therapist_feedback: row.therapist_feedback,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ProgressRepository for DieselProgressRepository {
    async fn list(
        &self,
        viewer: &Viewer,
        filter: &ProgressFilter,
    ) -> Result<Vec<ProgressEntry>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = progress_entries::table
            .select(ProgressRow::as_select())
            .into_boxed();
        match viewer.role {
            UserRole::Admin => {}
            UserRole::Client => {
                query = query.filter(progress_entries::user_id.eq(viewer.user_id));
            }
            UserRole::Therapist => {
                let owned = therapists::table
                    .filter(therapists::user_id.eq(viewer.user_id))
                    .select(therapists::id);
                let clients = appointments::table
                    .filter(appointments::therapist_id.eq_any(owned))
                    .select(appointments::user_id);
                query = query.filter(progress_entries::user_id.eq_any(clients));
            }
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(progress_entries::user_id.eq(user_id));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(progress_entries::date.ge(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(progress_entries::date.le(end));
        }

        let rows: Vec<ProgressRow> = query
            .order(progress_entries::date.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("progress entry", err))?;
        rows.into_iter().map(row_to_entry).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<ProgressEntry>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProgressRow> = progress_entries::table
            .find(id)
            .select(ProgressRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("progress entry", err))?;
        row.map(row_to_entry).transpose()
    }

    async fn create(&self, entry: NewProgressEntry) -> Result<ProgressEntry, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewProgressRow {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            date: entry.date,
            mood: entry.mood_rating.value(),
            notes: entry.notes,
            completed_exercises: entry.completed_exercises,
            therapist_feedback: entry.therapist_feedback,
        };

        let row: ProgressRow = diesel::insert_into(progress_entries::table)
            .values(&new_row)
            .returning(ProgressRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("progress entry", err))?;
        row_to_entry(row)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ProgressPatch,
    ) -> Result<ProgressEntry, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ProgressChangeset {
            date: patch.date,
            mood: patch.mood_rating.map(MoodRating::value),
            notes: patch.notes,
            completed_exercises: patch.completed_exercises,
            therapist_feedback: patch.therapist_feedback,
        };
        let is_empty = changeset.date.is_none()
            && changeset.mood.is_none()
            && changeset.notes.is_none()
            && changeset.completed_exercises.is_none()
            && changeset.therapist_feedback.is_none();

        let row: ProgressRow = if is_empty {
            progress_entries::table
                .find(id)
                .select(ProgressRow::as_select())
                .first(&mut conn)
                .await
                .map_err(|err| map_diesel_error("progress entry", err))?
        } else {
            diesel::update(progress_entries::table.find(id))
                .set(&changeset)
                .returning(ProgressRow::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error("progress entry", err))?
        };
        row_to_entry(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(progress_entries::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("progress entry", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("progress entry"));
        }
        Ok(())
    }
}
