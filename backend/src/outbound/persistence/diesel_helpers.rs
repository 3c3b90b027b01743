//! Shared error mapping and hydration helpers for the Diesel adapters.

use std::collections::HashMap;
use std::str::FromStr;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;
use super::schema::{therapists, users};

/// Map pool errors to repository errors.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors, attributing constraint violations
/// to the entity being written.
pub(crate) fn map_diesel_error(entity: &'static str, error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::NotFound => RepositoryError::missing(entity),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            RepositoryError::duplicate(entity)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            RepositoryError::missing("referenced record")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection("database connection closed")
        }
        _ => RepositoryError::query("database error"),
    }
}

// Required by `AsyncConnection::transaction`, which rolls back through `?`.
impl From<diesel::result::Error> for RepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error("record", error)
    }
}

/// Parse a stored enum string, surfacing corrupt values as query errors.
pub(crate) fn parse_stored<T: FromStr>(column: &'static str, value: &str) -> Result<T, RepositoryError> {
    value
        .parse()
        .map_err(|_| RepositoryError::query(format!("invalid stored {column} value: {value}")))
}

/// Usernames keyed by user id for the given ids.
pub(crate) async fn usernames_by_id(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, RepositoryError> {
    let rows: Vec<(Uuid, String)> = users::table
        .filter(users::id.eq_any(ids))
        .select((users::id, users::username))
        .load(conn)
        .await
        .map_err(|err| map_diesel_error("user", err))?;
    Ok(rows.into_iter().collect())
}

/// Usernames keyed by therapist id, resolved through the owning user.
pub(crate) async fn therapist_usernames_by_id(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, RepositoryError> {
    let rows: Vec<(Uuid, String)> = therapists::table
        .inner_join(users::table)
        .filter(therapists::id.eq_any(ids))
        .select((therapists::id, users::username))
        .load(conn)
        .await
        .map_err(|err| map_diesel_error("therapist", err))?;
    Ok(rows.into_iter().collect())
}
