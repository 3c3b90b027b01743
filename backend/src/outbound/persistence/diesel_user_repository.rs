//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::user::{NewUser, User, UserFilter, UserPatch, UserRole};

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_stored};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: row.id,
        username: row.username,
        email: row.email,
        phone: row.phone,
        role: parse_stored("role", &row.role)?,
        profile_image: row.profile_image,
        date_joined: row.date_joined,
    })
}

fn patch_to_changeset(patch: UserPatch) -> UserChangeset {
    UserChangeset {
        username: patch.username,
        email: patch.email,
        phone: patch.phone,
        role: patch.role.map(|role| role.as_str().to_owned()),
        profile_image: patch.profile_image,
        password_hash: patch.password_hash,
    }
}

fn changeset_is_empty(changeset: &UserChangeset) -> bool {
    changeset.username.is_none()
        && changeset.email.is_none()
        && changeset.phone.is_none()
        && changeset.role.is_none()
        && changeset.profile_image.is_none()
        && changeset.password_hash.is_none()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = users::table.select(UserRow::as_select()).into_boxed();
        if let Some(role) = filter.role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                users::username
                    .ilike(pattern.clone())
                    .or(users::email.ilike(pattern)),
            );
        }

        let rows: Vec<UserRow> = query
            .order(users::date_joined.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("user", err))?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("user", err))?;
        row.map(row_to_user).transpose()
    }

    async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("user", err))?;
        row.map(|row| {
            let hash = row.password_hash.clone();
            row_to_user(row).map(|user| (user, hash))
        })
        .transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            phone: user.phone,
            role: user.role.as_str().to_owned(),
            profile_image: user.profile_image,
            password_hash: user.password_hash,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("email", err))?;
        row_to_user(row)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = patch_to_changeset(patch);
        if changeset_is_empty(&changeset) {
            let row: UserRow = users::table
                .find(id)
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .map_err(|err| map_diesel_error("user", err))?;
            return row_to_user(row);
        }

        let row: UserRow = diesel::update(users::table.find(id))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match err {
                diesel::result::Error::NotFound => RepositoryError::missing("user"),
                other => map_diesel_error("email", other),
            })?;
        row_to_user(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("user", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("user"));
        }
        Ok(())
    }

    async fn count_by_role(&self, role: UserRole) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        users::table
            .filter(users::role.eq(role.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("user", err))
    }
}
