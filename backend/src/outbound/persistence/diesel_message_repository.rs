//! PostgreSQL-backed `MessageRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::message::{Conversation, Message, MessageFilter, NewMessage};
use crate::domain::ports::{MessageRepository, RepositoryError};
use crate::domain::user::User;

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_stored, usernames_by_id};
use super::models::{MessageRow, NewMessageRow, UserRow};
use super::pool::DbPool;
use super::schema::{messages, users};

/// Diesel-backed implementation of the `MessageRepository` port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
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

async fn hydrate_rows(
    conn: &mut AsyncPgConnection,
    rows: Vec<MessageRow>,
) -> Result<Vec<Message>, RepositoryError> {
    let mut ids: Vec<Uuid> = Vec::with_capacity(rows.len() * 2);
    for row in &rows {
        ids.push(row.sender_id);
        ids.push(row.receiver_id);
    }
    let names = usernames_by_id(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| Message {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            sender_name: names.get(&row.sender_id).cloned().unwrap_or_default(),
            receiver_name: names.get(&row.receiver_id).cloned().unwrap_or_default(),
            body: row.body,
            sent_at: row.sent_at,
            read: row.read,
            created_at: row.created_at,
        })
        .collect())
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn list_for(
        &self,
        user_id: Uuid,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = messages::table
            .select(MessageRow::as_select())
            .into_boxed()
            .filter(
                messages::sender_id
                    .eq(user_id)
                    .or(messages::receiver_id.eq(user_id)),
            );
        if let Some(partner_id) = filter.partner_id {
            query = query.filter(
                messages::sender_id
                    .eq(partner_id)
                    .and(messages::receiver_id.eq(user_id))
                    .or(messages::sender_id
                        .eq(user_id)
                        .and(messages::receiver_id.eq(partner_id))),
            );
        }
        if let Some(read) = filter.read {
            query = query.filter(messages::read.eq(read));
        }

        let rows: Vec<MessageRow> = query
            .order(messages::sent_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("message", err))?;
        hydrate_rows(&mut conn, rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Message>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MessageRow> = messages::table
            .find(id)
            .select(MessageRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("message", err))?;
        let Some(row) = row else { return Ok(None) };
        Ok(hydrate_rows(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewMessageRow {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            body: message.body,
            sent_at: message.sent_at,
        };

        let row: MessageRow = diesel::insert_into(messages::table)
            .values(&new_row)
            .returning(MessageRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("message", err))?;
        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("message vanished during create"))
    }

    async fn mark_read(&self, id: Uuid) -> Result<Message, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: MessageRow = diesel::update(messages::table.find(id))
            .set(messages::read.eq(true))
            .returning(MessageRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("message", err))?;
        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("message vanished during update"))
    }

    async fn conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // One pass over the user's messages; partners and per-partner
        // aggregates are derived in memory.
        let rows: Vec<MessageRow> = messages::table
            .filter(
                messages::sender_id
                    .eq(user_id)
                    .or(messages::receiver_id.eq(user_id)),
            )
            .order(messages::sent_at.desc())
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("message", err))?;

        let mut partner_ids: Vec<Uuid> = rows
            .iter()
            .map(|row| {
                if row.sender_id == user_id {
                    row.receiver_id
                } else {
                    row.sender_id
                }
            })
            .collect();
        partner_ids.sort();
        partner_ids.dedup();

        let partner_rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&partner_ids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("user", err))?;

        let hydrated = hydrate_rows(&mut conn, rows).await?;

        let mut conversations = Vec::with_capacity(partner_rows.len());
        for partner_row in partner_rows {
            let partner_id = partner_row.id;
            let partner = row_to_user(partner_row)?;
            let latest_message = hydrated
                .iter()
                .find(|message| {
                    message.sender_id == partner_id || message.receiver_id == partner_id
                })
                .cloned();
            let unread_count = hydrated
                .iter()
                .filter(|message| {
                    message.sender_id == partner_id
                        && message.receiver_id == user_id
                        && !message.read
                })
                .count() as i64;
            conversations.push(Conversation {
                partner,
                latest_message,
                unread_count,
            });
        }
        conversations.sort_by(|a, b| {
            let a_key = a.latest_message.as_ref().map(|m| m.sent_at);
            let b_key = b.latest_message.as_ref().map(|m| m.sent_at);
            b_key.cmp(&a_key)
        });
        Ok(conversations)
    }
}
