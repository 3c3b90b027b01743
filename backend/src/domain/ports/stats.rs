//! Port for stored admin statistics.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::stats::{AdminStats, NewAdminStats};

use super::RepositoryError;

/// Storage and retrieval of daily platform rollups.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// List stored rollups, newest first.
    async fn list(&self) -> Result<Vec<AdminStats>, RepositoryError>;

    /// Fetch the rollup for a date, if stored.
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<AdminStats>, RepositoryError>;

    /// Store a rollup. Fails with [`RepositoryError::Duplicate`] when the
    /// date already has one.
    async fn insert(&self, stats: NewAdminStats) -> Result<AdminStats, RepositoryError>;
}
