//! PostgreSQL-backed `StatsRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, StatsRepository};
use crate::domain::stats::{AdminStats, NewAdminStats};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{AdminStatsRow, NewAdminStatsRow};
use super::pool::DbPool;
use super::schema::admin_stats;

/// Diesel-backed implementation of the `StatsRepository` port.
#[derive(Clone)]
pub struct DieselStatsRepository {
    pool: DbPool,
}

impl DieselStatsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_stats(row: AdminStatsRow) -> AdminStats {
    AdminStats {
        id: row.id,
        date: row.date,
        total_therapists: row.total_therapists,
        active_users: row.active_users,
        appointments_today: row.appointments_today,
        total_resources: row.total_resources,
        user_growth: row.user_growth,
        success_rate: row.success_rate,
    }
}

#[async_trait]
impl StatsRepository for DieselStatsRepository {
    async fn list(&self) -> Result<Vec<AdminStats>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AdminStatsRow> = admin_stats::table
            .order(admin_stats::date.desc())
            .select(AdminStatsRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("stats rollup", err))?;
        Ok(rows.into_iter().map(row_to_stats).collect())
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<AdminStats>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AdminStatsRow> = admin_stats::table
            .filter(admin_stats::date.eq(date))
            .select(AdminStatsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("stats rollup", err))?;
        Ok(row.map(row_to_stats))
    }

    async fn insert(&self, stats: NewAdminStats) -> Result<AdminStats, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewAdminStatsRow {
            id: Uuid::new_v4(),
            date: stats.date,
            total_therapists: stats.total_therapists,
            active_users: stats.active_users,
            appointments_today: stats.appointments_today,
            total_resources: stats.total_resources,
            user_growth: stats.user_growth,
            success_rate: stats.success_rate,
        };

        let row: AdminStatsRow = diesel::insert_into(admin_stats::table)
            .values(&new_row)
            .returning(AdminStatsRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("stats rollup", err))?;
        Ok(row_to_stats(row))
    }
}
