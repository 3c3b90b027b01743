//! Appointment booking handlers.
//!
//! Listing is role-scoped: admins see every appointment, therapists their
//! own calendar, clients their own bookings.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::appointment::{
    Appointment, AppointmentFilter, AppointmentKind, AppointmentPatch, AppointmentStatus,
    NewAppointment, NewPayment, PaymentStatus,
};
use crate::domain::user::{User, UserRole, Viewer};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, parse_date, parse_enum, parse_optional_date, parse_optional_enum,
    parse_slot_time,
};

/// Nested payment payload on booking.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount_cents: i32,
    /// Defaults to `pending`.
    pub status: Option<String>,
    pub method: String,
    pub transaction_id: Option<String>,
}

/// Booking request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    /// Ignored for clients, who always book for themselves.
    #[schema(value_type = Option<String>)]
    pub user_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub therapist_id: Uuid,
    pub date: String,
    pub time: String,
    /// Defaults to `pending`.
    pub status: Option<String>,
    /// Defaults to `video`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
    pub payment: Option<PaymentRequest>,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// Status-only update body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// List query parameters for appointments.
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub therapist_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

fn can_access(viewer: &Viewer, appointment: &Appointment, therapist_user_id: Option<Uuid>) -> bool {
    match viewer.role {
        UserRole::Admin => true,
        UserRole::Client => appointment.user_id == viewer.user_id,
        UserRole::Therapist => therapist_user_id == Some(viewer.user_id),
    }
}

async fn find_accessible(
    state: &HttpState,
    user: &User,
    id: Uuid,
) -> Result<Appointment, Error> {
    let appointment = state
        .appointments
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("appointment not found"))?;
    let therapist_user_id = state
        .therapists
        .find(appointment.therapist_id)
        .await?
        .map(|therapist| therapist.user.id);
    if !can_access(&Viewer::of(user), &appointment, therapist_user_id) {
        // Out-of-scope rows are indistinguishable from absent ones.
        return Err(Error::not_found("appointment not found"));
    }
    Ok(appointment)
}

/// List appointments visible to the caller.
///
/// The `user_id` filter is honoured for admins, and for therapists who share
/// at least one appointment with that user; otherwise it is ignored.
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    responses(
        (status = 200, description = "Appointments", body = [Appointment]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "listAppointments"
)]
#[get("/appointments")]
pub async fn list_appointments(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AppointmentListQuery>,
) -> ApiResult<web::Json<Vec<Appointment>>> {
    let user = current_user(&state, &session).await?;
    let query = query.into_inner();

    let user_id = match (query.user_id, user.role) {
        (Some(requested), UserRole::Admin) => Some(requested),
        (Some(requested), UserRole::Therapist)
            if state.appointments.shares_client(user.id, requested).await? =>
        {
            Some(requested)
        }
        _ => None,
    };

    let filter = AppointmentFilter {
        status: parse_optional_enum(query.status, "status")?,
        date: parse_optional_date(query.date, "date")?,
        therapist_id: query.therapist_id,
        user_id,
    };
    Ok(web::Json(
        state.appointments.list(&Viewer::of(&user), &filter).await?,
    ))
}

/// Book an appointment, optionally with a payment.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Therapist not found", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "createAppointment"
)]
#[post("/appointments")]
pub async fn create_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAppointmentRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let payload = payload.into_inner();

    // Clients always book for themselves.
    let user_id = match user.role {
        UserRole::Client => user.id,
        UserRole::Therapist | UserRole::Admin => payload.user_id.unwrap_or(user.id),
    };

    let payment = payload
        .payment
        .map(|payment| -> Result<NewPayment, Error> {
            Ok(NewPayment {
                amount_cents: payment.amount_cents,
                status: parse_optional_enum(payment.status, "payment status")?
                    .unwrap_or(PaymentStatus::Pending),
                method: parse_enum(payment.method, "payment method")?,
                transaction_id: payment.transaction_id,
            })
        })
        .transpose()?;

    let appointment = state
        .appointments
        .create(
            NewAppointment {
                user_id,
                therapist_id: payload.therapist_id,
                date: parse_date(payload.date, "date")?,
                time: parse_slot_time(payload.time, "time")?,
                status: parse_optional_enum(payload.status, "status")?
                    .unwrap_or(AppointmentStatus::Pending),
                kind: parse_optional_enum(payload.kind, "type")?.unwrap_or(AppointmentKind::Video),
                notes: payload.notes.unwrap_or_default(),
                duration_minutes: payload.duration_minutes.unwrap_or(60),
            },
            payment,
        )
        .await?;
    Ok(HttpResponse::Created().json(appointment))
}

/// Fetch an appointment visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "getAppointment"
)]
#[get("/appointments/{id}")]
pub async fn get_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Appointment>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(
        find_accessible(&state, &user, id.into_inner()).await?,
    ))
}

/// Update an appointment visible to the caller.
#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "updateAppointment"
)]
#[put("/appointments/{id}")]
pub async fn update_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateAppointmentRequest>,
) -> ApiResult<web::Json<Appointment>> {
    let user = current_user(&state, &session).await?;
    let id = id.into_inner();
    find_accessible(&state, &user, id).await?;

    let payload = payload.into_inner();
    let patch = AppointmentPatch {
        date: parse_optional_date(payload.date, "date")?,
        time: payload
            .time
            .map(|time| parse_slot_time(time, "time"))
            .transpose()?,
        status: parse_optional_enum(payload.status, "status")?,
        kind: parse_optional_enum(payload.kind, "type")?,
        notes: payload.notes,
        duration_minutes: payload.duration_minutes,
    };
    Ok(web::Json(state.appointments.update(id, patch).await?))
}

/// Update only the appointment status.
#[utoipa::path(
    patch,
    path = "/api/v1/appointments/{id}/status",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Status missing", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "updateAppointmentStatus"
)]
#[patch("/appointments/{id}/status")]
pub async fn update_appointment_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateStatusRequest>,
) -> ApiResult<web::Json<Appointment>> {
    let user = current_user(&state, &session).await?;
    let id = id.into_inner();
    find_accessible(&state, &user, id).await?;

    let status = payload
        .into_inner()
        .status
        .ok_or_else(|| missing_field_error("status"))?;
    let status: AppointmentStatus = parse_enum(status, "status")?;
    Ok(web::Json(state.appointments.update_status(id, status).await?))
}

/// Delete an appointment visible to the caller.
#[utoipa::path(
    delete,
    path = "/api/v1/appointments/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "deleteAppointment"
)]
#[delete("/appointments/{id}")]
pub async fn delete_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let id = id.into_inner();
    find_accessible(&state, &user, id).await?;
    state.appointments.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    async fn create_therapist_profile(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        user_id: uuid::Uuid,
    ) -> String {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/therapists")
                .cookie(cookie.clone())
                .set_json(json!({ "userId": user_id, "specialty": "CBT", "priceCents": 8000 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        body.get("id").and_then(Value::as_str).expect("id").to_owned()
    }

    async fn book(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        therapist_id: &str,
        with_payment: bool,
    ) -> Value {
        let mut payload = json!({
            "therapistId": therapist_id,
            "date": "2026-09-01",
            "time": "10:00",
            "type": "video",
        });
        if with_payment {
            payload["payment"] = json!({ "amountCents": 8000, "method": "card" });
        }
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/appointments")
                .cookie(cookie.clone())
                .set_json(payload)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        actix_test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn booking_with_payment_embeds_it() {
        let app = actix_test::init_service(test_app()).await;
        let (therapist_user, therapist_cookie) =
            register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let therapist_id = create_therapist_profile(&app, &therapist_cookie, therapist_user).await;
        let (_, client_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        let body = book(&app, &client_cookie, &therapist_id, true).await;
        assert_eq!(body.get("status").and_then(Value::as_str), Some("pending"));
        assert_eq!(
            body.get("payment")
                .and_then(|payment| payment.get("method"))
                .and_then(Value::as_str),
            Some("card")
        );
        assert_eq!(body.get("userName").and_then(Value::as_str), Some("ada"));
        assert_eq!(
            body.get("therapistName").and_then(Value::as_str),
            Some("greg")
        );
    }

    #[actix_web::test]
    async fn listing_is_role_scoped() {
        let app = actix_test::init_service(test_app()).await;
        let (therapist_user, therapist_cookie) =
            register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let therapist_id = create_therapist_profile(&app, &therapist_cookie, therapist_user).await;
        let (_, ada_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, bob_cookie) = register_and_login(&app, "bob", "bob@example.com", "client").await;
        let (_, admin_cookie) = register_and_login(&app, "root", "root@example.com", "admin").await;

        book(&app, &ada_cookie, &therapist_id, false).await;
        book(&app, &bob_cookie, &therapist_id, false).await;

        let counts = [
            (&ada_cookie, 1),
            (&bob_cookie, 1),
            (&therapist_cookie, 2),
            (&admin_cookie, 2),
        ];
        for (cookie, expected) in counts {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::get()
                    .uri("/api/v1/appointments")
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await;
            let body: Value = actix_test::read_body_json(res).await;
            assert_eq!(body.as_array().map(Vec::len), Some(expected));
        }
    }

    #[actix_web::test]
    async fn clients_cannot_read_others_appointments() {
        let app = actix_test::init_service(test_app()).await;
        let (therapist_user, therapist_cookie) =
            register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let therapist_id = create_therapist_profile(&app, &therapist_cookie, therapist_user).await;
        let (_, ada_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, bob_cookie) = register_and_login(&app, "bob", "bob@example.com", "client").await;

        let booked = book(&app, &ada_cookie, &therapist_id, false).await;
        let appointment_id = booked.get("id").and_then(Value::as_str).expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/appointments/{appointment_id}"))
                .cookie(bob_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn status_patch_requires_a_status() {
        let app = actix_test::init_service(test_app()).await;
        let (therapist_user, therapist_cookie) =
            register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let therapist_id = create_therapist_profile(&app, &therapist_cookie, therapist_user).await;
        let (_, ada_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let booked = book(&app, &ada_cookie, &therapist_id, false).await;
        let appointment_id = booked.get("id").and_then(Value::as_str).expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/appointments/{appointment_id}/status"))
                .cookie(ada_cookie.clone())
                .set_json(json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/appointments/{appointment_id}/status"))
                .cookie(ada_cookie)
                .set_json(json!({ "status": "confirmed" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("status").and_then(Value::as_str), Some("confirmed"));
    }
}
