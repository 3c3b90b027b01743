//! PostgreSQL-backed `CategoryRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::category::{Category, CategoryPatch, NewCategory};
use crate::domain::ports::{CategoryRepository, RepositoryError};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{CategoryChangeset, CategoryRow, NewCategoryRow};
use super::pool::DbPool;
use super::schema::categories;

/// Diesel-backed implementation of the `CategoryRepository` port.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        title: row.title,
        icon: row.icon,
        color: row.color,
        count: row.count,
    }
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CategoryRow> = categories::table
            .order(categories::title.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("category", err))?;
        Ok(rows.into_iter().map(row_to_category).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CategoryRow> = categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("category", err))?;
        Ok(row.map(row_to_category))
    }

    async fn create(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCategoryRow {
            id: Uuid::new_v4(),
            title: category.title,
            icon: category.icon,
            color: category.color,
            count: category.count,
        };

        let row: CategoryRow = diesel::insert_into(categories::table)
            .values(&new_row)
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("category", err))?;
        Ok(row_to_category(row))
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = CategoryChangeset {
            title: patch.title,
            icon: patch.icon,
            color: patch.color,
            count: patch.count,
        };
        let is_empty = changeset.title.is_none()
            && changeset.icon.is_none()
            && changeset.color.is_none()
            && changeset.count.is_none();

        let row: CategoryRow = if is_empty {
            categories::table
                .find(id)
                .select(CategoryRow::as_select())
                .first(&mut conn)
                .await
                .map_err(|err| map_diesel_error("category", err))?
        } else {
            diesel::update(categories::table.find(id))
                .set(&changeset)
                .returning(CategoryRow::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error("category", err))?
        };
        Ok(row_to_category(row))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(categories::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("category", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("category"));
        }
        Ok(())
    }
}
