//! PostgreSQL-backed `ReviewRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, ReviewRepository};
use crate::domain::review::{NewReview, Rating, Review, ReviewFilter, ReviewPatch};

use super::diesel_helpers::{map_diesel_error, map_pool_error, usernames_by_id};
use super::models::{NewReviewRow, ReviewChangeset, ReviewRow};
use super::pool::DbPool;
use super::schema::reviews;

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn hydrate_rows(
    conn: &mut AsyncPgConnection,
    rows: Vec<ReviewRow>,
) -> Result<Vec<Review>, RepositoryError> {
    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    let user_names = usernames_by_id(conn, &user_ids).await?;

    rows.into_iter()
        .map(|row| {
            Ok(Review {
                id: row.id,
                user_id: row.user_id,
                therapist_id: row.therapist_id,
                user_name: user_names.get(&row.user_id).cloned().unwrap_or_default(),
                rating: Rating::new(row.rating)
                    .map_err(|_| RepositoryError::query("invalid stored rating"))?,
                comment: row.comment,
                date: row.date,
                created_at: row.created_at,
            })
        })
        .collect()
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn list(&self, filter: &ReviewFilter) -> Result<Vec<Review>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = reviews::table.select(ReviewRow::as_select()).into_boxed();
        if let Some(therapist_id) = filter.therapist_id {
            query = query.filter(reviews::therapist_id.eq(therapist_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(reviews::user_id.eq(user_id));
        }

        let rows: Vec<ReviewRow> = query
            .order(reviews::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("review", err))?;
        hydrate_rows(&mut conn, rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReviewRow> = reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("review", err))?;
        let Some(row) = row else { return Ok(None) };
        Ok(hydrate_rows(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn exists(&self, user_id: Uuid, therapist_id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .filter(reviews::therapist_id.eq(therapist_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("review", err))?;
        Ok(count > 0)
    }

    async fn create(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewReviewRow {
            id: Uuid::new_v4(),
            user_id: review.user_id,
            therapist_id: review.therapist_id,
            rating: review.rating.value(),
            comment: review.comment,
            date: review.date,
        };

        let row: ReviewRow = diesel::insert_into(reviews::table)
            .values(&new_row)
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("review", err))?;
        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("review vanished during create"))
    }

    async fn update(&self, id: Uuid, patch: ReviewPatch) -> Result<Review, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ReviewChangeset {
            rating: patch.rating.map(Rating::value),
            comment: patch.comment,
            date: patch.date,
        };
        let is_empty =
            changeset.rating.is_none() && changeset.comment.is_none() && changeset.date.is_none();

        let row: ReviewRow = if is_empty {
            reviews::table
                .find(id)
                .select(ReviewRow::as_select())
                .first(&mut conn)
                .await
                .map_err(|err| map_diesel_error("review", err))?
        } else {
            diesel::update(reviews::table.find(id))
                .set(&changeset)
                .returning(ReviewRow::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error("review", err))?
        };
        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("review vanished during update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(reviews::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("review", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("review"));
        }
        Ok(())
    }

    async fn aggregate_for(&self, therapist_id: Uuid) -> Result<(f64, i32), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ratings: Vec<i16> = reviews::table
            .filter(reviews::therapist_id.eq(therapist_id))
            .select(reviews::rating)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("review", err))?;
        if ratings.is_empty() {
            return Ok((0.0, 0));
        }
        let sum: i64 = ratings.iter().map(|rating| i64::from(*rating)).sum();
        let count = ratings.len();
        Ok((
            sum as f64 / count as f64,
            i32::try_from(count).unwrap_or(i32::MAX),
        ))
    }
}
