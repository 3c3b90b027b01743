//! PostgreSQL-backed `AppointmentRepository` implementation using Diesel.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::appointment::{
    Appointment, AppointmentFilter, AppointmentPatch, AppointmentStatus, NewAppointment,
    NewPayment, Payment,
};
use crate::domain::ports::{AppointmentRepository, RepositoryError};
use crate::domain::user::{UserRole, Viewer};

use super::diesel_helpers::{
    map_diesel_error, map_pool_error, parse_stored, therapist_usernames_by_id, usernames_by_id,
};
use super::models::{
    AppointmentChangeset, AppointmentRow, NewAppointmentRow, NewPaymentRow, PaymentRow,
};
use super::pool::DbPool;
use super::schema::{appointments, payments, therapists};

/// Diesel-backed implementation of the `AppointmentRepository` port.
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_payment(row: PaymentRow) -> Result<Payment, RepositoryError> {
    Ok(Payment {
        id: row.id,
        appointment_id: row.appointment_id,
        amount_cents: row.amount_cents,
        status: parse_stored("payment status", &row.status)?,
        method: parse_stored("payment method", &row.method)?,
        transaction_id: row.transaction_id,
        timestamp: row.created_at,
    })
}

async fn hydrate_rows(
    conn: &mut AsyncPgConnection,
    rows: Vec<AppointmentRow>,
) -> Result<Vec<Appointment>, RepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    let therapist_ids: Vec<Uuid> = rows.iter().map(|row| row.therapist_id).collect();

    let user_names = usernames_by_id(conn, &user_ids).await?;
    let therapist_names = therapist_usernames_by_id(conn, &therapist_ids).await?;

    let payment_rows: Vec<PaymentRow> = payments::table
        .filter(payments::appointment_id.eq_any(&ids))
        .select(PaymentRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error("payment", err))?;
    let mut payments_by_appointment: HashMap<Uuid, Payment> =
        HashMap::with_capacity(payment_rows.len());
    for row in payment_rows {
        let appointment_id = row.appointment_id;
        payments_by_appointment.insert(appointment_id, row_to_payment(row)?);
    }

    rows.into_iter()
        .map(|row| {
            Ok(Appointment {
                id: row.id,
                user_id: row.user_id,
                therapist_id: row.therapist_id,
                user_name: user_names.get(&row.user_id).cloned().unwrap_or_default(),
                therapist_name: therapist_names
                    .get(&row.therapist_id)
                    .cloned()
                    .unwrap_or_default(),
                date: row.date,
                time: row
                    .time
                    .try_into()
                    .map_err(|_| RepositoryError::query("invalid stored appointment time"))?,
                status: parse_stored("status", &row.status)?,
                kind: parse_stored("kind", &row.kind)?,
                notes: row.notes,
                duration_minutes: row.duration_minutes,
                created_at: row.created_at,
                payment: payments_by_appointment.remove(&row.id),
            })
        })
        .collect()
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn list(
        &self,
        viewer: &Viewer,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = appointments::table
            .select(AppointmentRow::as_select())
            .into_boxed();
        match viewer.role {
            UserRole::Admin => {}
            UserRole::Therapist => {
                let owned = therapists::table
                    .filter(therapists::user_id.eq(viewer.user_id))
                    .select(therapists::id);
                query = query.filter(appointments::therapist_id.eq_any(owned));
            }
            UserRole::Client => {
                query = query.filter(appointments::user_id.eq(viewer.user_id));
            }
        }
        if let Some(status) = filter.status {
            query = query.filter(appointments::status.eq(status.as_str()));
        }
        if let Some(date) = filter.date {
            query = query.filter(appointments::date.eq(date));
        }
        if let Some(therapist_id) = filter.therapist_id {
            query = query.filter(appointments::therapist_id.eq(therapist_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(appointments::user_id.eq(user_id));
        }

        let rows: Vec<AppointmentRow> = query
            .order(appointments::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("appointment", err))?;
        hydrate_rows(&mut conn, rows).await
    }

    async fn list_for_therapist(
        &self,
        therapist_id: Uuid,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AppointmentRow> = appointments::table
            .filter(appointments::therapist_id.eq(therapist_id))
            .order(appointments::created_at.desc())
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("appointment", err))?;
        hydrate_rows(&mut conn, rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AppointmentRow> = appointments::table
            .find(id)
            .select(AppointmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("appointment", err))?;
        let Some(row) = row else { return Ok(None) };
        Ok(hydrate_rows(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn create(
        &self,
        appointment: NewAppointment,
        payment: Option<NewPayment>,
    ) -> Result<Appointment, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = Uuid::new_v4();
        let new_row = NewAppointmentRow {
            id,
            user_id: appointment.user_id,
            therapist_id: appointment.therapist_id,
            date: appointment.date,
            time: appointment.time.to_string(),
            status: appointment.status.as_str().to_owned(),
            kind: appointment.kind.as_str().to_owned(),
            notes: appointment.notes,
            duration_minutes: appointment.duration_minutes,
        };
        let payment_row = payment.map(|payment| NewPaymentRow {
            id: Uuid::new_v4(),
            appointment_id: id,
            amount_cents: payment.amount_cents,
            status: payment.status.as_str().to_owned(),
            method: payment.method.as_str().to_owned(),
            transaction_id: payment.transaction_id,
        });

        let row: AppointmentRow = conn
            .transaction::<AppointmentRow, RepositoryError, _>(|conn| {
                async move {
                    let row: AppointmentRow = diesel::insert_into(appointments::table)
                        .values(&new_row)
                        .returning(AppointmentRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| map_diesel_error("appointment", err))?;
                    if let Some(payment_row) = payment_row {
                        diesel::insert_into(payments::table)
                            .values(&payment_row)
                            .execute(conn)
                            .await
                            .map_err(|err| map_diesel_error("payment", err))?;
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
            .ok_or_else(|| RepositoryError::query("appointment vanished during create"))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = AppointmentChangeset {
            date: patch.date,
            time: patch.time.map(|time| time.to_string()),
            status: patch.status.map(|status| status.as_str().to_owned()),
            kind: patch.kind.map(|kind| kind.as_str().to_owned()),
            notes: patch.notes,
            duration_minutes: patch.duration_minutes,
        };
        let is_empty = changeset.date.is_none()
            && changeset.time.is_none()
            && changeset.status.is_none()
            && changeset.kind.is_none()
            && changeset.notes.is_none()
            && changeset.duration_minutes.is_none();

        let row: AppointmentRow = if is_empty {
            appointments::table
                .find(id)
                .select(AppointmentRow::as_select())
                .first(&mut conn)
                .await
                .map_err(|err| map_diesel_error("appointment", err))?
        } else {
            diesel::update(appointments::table.find(id))
                .set(&changeset)
                .returning(AppointmentRow::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error("appointment", err))?
        };
        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("appointment vanished during update"))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError> {
        AppointmentRepository::update(
            self,
            id,
            AppointmentPatch {
                status: Some(status),
                ..AppointmentPatch::default()
            },
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(appointments::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("appointment", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("appointment"));
        }
        Ok(())
    }

    async fn shares_client(
        &self,
        therapist_user_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let owned = therapists::table
            .filter(therapists::user_id.eq(therapist_user_id))
            .select(therapists::id);
        let shared: i64 = appointments::table
            .filter(appointments::user_id.eq(user_id))
            .filter(appointments::therapist_id.eq_any(owned))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("appointment", err))?;
        Ok(shared > 0)
    }

    async fn client_ids(&self, therapist_user_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let owned = therapists::table
            .filter(therapists::user_id.eq(therapist_user_id))
            .select(therapists::id);
        appointments::table
            .filter(appointments::therapist_id.eq_any(owned))
            .select(appointments::user_id)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("appointment", err))
    }

    async fn count_on(&self, date: NaiveDate) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        appointments::table
            .filter(appointments::date.eq(date))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("appointment", err))
    }

    async fn count_by_status(&self) -> Result<Vec<(AppointmentStatus, i64)>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(String, i64)> = appointments::table
            .group_by(appointments::status)
            .select((appointments::status, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("appointment", err))?;
        rows.into_iter()
            .map(|(status, count)| Ok((parse_stored("status", &status)?, count)))
            .collect()
    }
}
