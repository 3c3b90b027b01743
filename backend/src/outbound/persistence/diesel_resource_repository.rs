//! PostgreSQL-backed `ResourceRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, ResourceRepository};
use crate::domain::resource::{NewResource, Resource, ResourceFilter, ResourcePatch};

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_stored};
use super::models::{NewResourceRow, ResourceChangeset, ResourceRow};
use super::pool::DbPool;
use super::schema::resources;

/// Diesel-backed implementation of the `ResourceRepository` port.
#[derive(Clone)]
pub struct DieselResourceRepository {
    pool: DbPool,
}

impl DieselResourceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_resource(row: ResourceRow) -> Result<Resource, RepositoryError> {
    Ok(Resource {
        id: row.id,
        title: row.title,
        author: row.author,
        description: row.description,
        category: row.category,
        tags: row.tags,
        url: row.url,
        featured: row.featured,
        thumbnail_url: row.thumbnail_url,
        duration: row.duration,
        kind: parse_stored("kind", &row.kind)?,
        rating: row.rating,
        reviews_count: row.reviews_count,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ResourceRepository for DieselResourceRepository {
    async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = resources::table
            .select(ResourceRow::as_select())
            .into_boxed();
        if let Some(category) = &filter.category {
            query = query.filter(resources::category.eq(category.clone()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(resources::kind.eq(kind.as_str()));
        }
        if filter.featured_only {
            query = query.filter(resources::featured.eq(true));
        }
        if let Some(tag) = &filter.tag {
            query = query.filter(resources::tags.contains(vec![tag.clone()]));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                resources::title
                    .ilike(pattern.clone())
                    .or(resources::description.ilike(pattern.clone()))
                    .or(resources::author.ilike(pattern)),
            );
        }

        let rows: Vec<ResourceRow> = query
            .order(resources::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("resource", err))?;
        rows.into_iter().map(row_to_resource).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Resource>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ResourceRow> = resources::table
            .find(id)
            .select(ResourceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("resource", err))?;
        row.map(row_to_resource).transpose()
    }

    async fn create(&self, resource: NewResource) -> Result<Resource, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewResourceRow {
            id: Uuid::new_v4(),
            title: resource.title,
            author: resource.author,
            description: resource.description,
            category: resource.category,
            tags: resource.tags,
            url: resource.url,
            featured: resource.featured,
            thumbnail_url: resource.thumbnail_url,
            duration: resource.duration,
            kind: resource.kind.as_str().to_owned(),
        };

        let row: ResourceRow = diesel::insert_into(resources::table)
            .values(&new_row)
            .returning(ResourceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("resource", err))?;
        row_to_resource(row)
    }

    async fn update(&self, id: Uuid, patch: ResourcePatch) -> Result<Resource, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ResourceChangeset {
            title: patch.title,
            author: patch.author,
            description: patch.description,
            category: patch.category,
            tags: patch.tags,
            url: patch.url,
            featured: patch.featured,
            thumbnail_url: patch.thumbnail_url,
            duration: patch.duration,
            kind: patch.kind.map(|kind| kind.as_str().to_owned()),
        };
        let is_empty = changeset.title.is_none()
            && changeset.author.is_none()
            && changeset.description.is_none()
            && changeset.category.is_none()
            && changeset.tags.is_none()
            && changeset.url.is_none()
            && changeset.featured.is_none()
            && changeset.thumbnail_url.is_none()
            && changeset.duration.is_none()
            && changeset.kind.is_none();

        let row: ResourceRow = if is_empty {
            resources::table
                .find(id)
                .select(ResourceRow::as_select())
                .first(&mut conn)
                .await
                .map_err(|err| map_diesel_error("resource", err))?
        } else {
            diesel::update(resources::table.find(id))
                .set(&changeset)
                .returning(ResourceRow::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error("resource", err))?
        };
        row_to_resource(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(resources::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("resource", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("resource"));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        resources::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("resource", err))
    }
}
