//! PostgreSQL-backed `ReadingListRepository` implementation using Diesel.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ReadingListRepository, RepositoryError};
use crate::domain::reading_list::{
    NewReadingList, ReadingList, ReadingListFilter, ReadingListItem, ReadingListPatch,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{ItemRow, NewItemRow, NewReadingListRow, ReadingListChangeset, ReadingListRow};
use super::pool::DbPool;
use super::schema::{reading_list_items, reading_lists};

/// Diesel-backed implementation of the `ReadingListRepository` port.
#[derive(Clone)]
pub struct DieselReadingListRepository {
    pool: DbPool,
}

impl DieselReadingListRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn item_rows(reading_list_id: Uuid, books: Vec<String>) -> Vec<NewItemRow> {
    books
        .into_iter()
        .enumerate()
        .map(|(index, title)| NewItemRow {
            id: Uuid::new_v4(),
            reading_list_id,
            title,
            position: i32::try_from(index).unwrap_or(i32::MAX),
        })
        .collect()
}

async fn hydrate_rows(
    conn: &mut AsyncPgConnection,
    rows: Vec<ReadingListRow>,
) -> Result<Vec<ReadingList>, RepositoryError> {
    let list_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let item_rows: Vec<ItemRow> = reading_list_items::table
        .filter(reading_list_items::reading_list_id.eq_any(&list_ids))
        .order(reading_list_items::position.asc())
        .select(ItemRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error("reading list item", err))?;
    let mut items_by_list: HashMap<Uuid, Vec<ReadingListItem>> = HashMap::new();
    for row in item_rows {
        items_by_list
            .entry(row.reading_list_id)
            .or_default()
            .push(ReadingListItem {
                id: row.id,
                title: row.title,
                position: row.position,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let books = items_by_list.remove(&row.id).unwrap_or_default();
            let book_count = i32::try_from(books.len()).unwrap_or(i32::MAX);
            ReadingList {
                id: row.id,
                title: row.title,
                description: row.description,
                category: row.category,
                image: row.image,
                created_at: row.created_at,
                books,
                book_count,
            }
        })
        .collect())
}

#[async_trait]
impl ReadingListRepository for DieselReadingListRepository {
    async fn list(&self, filter: &ReadingListFilter) -> Result<Vec<ReadingList>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = reading_lists::table
            .select(ReadingListRow::as_select())
            .into_boxed();
        if let Some(category) = &filter.category {
            query = query.filter(reading_lists::category.eq(category.clone()));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                reading_lists::title
                    .ilike(pattern.clone())
                    .or(reading_lists::description.ilike(pattern)),
            );
        }

        let rows: Vec<ReadingListRow> = query
            .order(reading_lists::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("reading list", err))?;
        hydrate_rows(&mut conn, rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<ReadingList>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReadingListRow> = reading_lists::table
            .find(id)
            .select(ReadingListRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("reading list", err))?;
        let Some(row) = row else { return Ok(None) };
        Ok(hydrate_rows(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn create(&self, list: NewReadingList) -> Result<ReadingList, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = Uuid::new_v4();
        let new_row = NewReadingListRow {
            id,
            title: list.title,
            description: list.description,
            category: list.category,
            image: list.image,
        };
        let items = item_rows(id, list.books);

        let row: ReadingListRow = conn
            .transaction::<ReadingListRow, RepositoryError, _>(|conn| {
                async move {
                    let row: ReadingListRow = diesel::insert_into(reading_lists::table)
                        .values(&new_row)
                        .returning(ReadingListRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| map_diesel_error("reading list", err))?;
                    diesel::insert_into(reading_list_items::table)
                        .values(&items)
                        .execute(conn)
                        .await
                        .map_err(|err| map_diesel_error("reading list item", err))?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("reading list vanished during create"))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ReadingListPatch,
    ) -> Result<ReadingList, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ReadingListChangeset {
            title: patch.title,
            description: patch.description,
            category: patch.category,
            image: patch.image,
        };
        let has_base_changes = changeset.title.is_some()
            || changeset.description.is_some()
            || changeset.category.is_some()
            || changeset.image.is_some();
        let items = patch.books.map(|books| item_rows(id, books));

        let row: ReadingListRow = conn
            .transaction::<ReadingListRow, RepositoryError, _>(|conn| {
                async move {
                    let row: ReadingListRow = if has_base_changes {
                        diesel::update(reading_lists::table.find(id))
                            .set(&changeset)
                            .returning(ReadingListRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| map_diesel_error("reading list", err))?
                    } else {
                        reading_lists::table
                            .find(id)
                            .select(ReadingListRow::as_select())
                            .first(conn)
                            .await
                            .map_err(|err| map_diesel_error("reading list", err))?
                    };
                    if let Some(items) = items {
                        diesel::delete(
                            reading_list_items::table
                                .filter(reading_list_items::reading_list_id.eq(id)),
                        )
                        .execute(conn)
                        .await
                        .map_err(|err| map_diesel_error("reading list item", err))?;
                        diesel::insert_into(reading_list_items::table)
                            .values(&items)
                            .execute(conn)
                            .await
                            .map_err(|err| map_diesel_error("reading list item", err))?;
                    }
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("reading list vanished during update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(reading_lists::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("reading list", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("reading list"));
        }
        Ok(())
    }
}
