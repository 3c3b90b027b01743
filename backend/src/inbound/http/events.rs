//! Event handlers, including capacity-bounded registration.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::event::{Event, EventFilter, EventPatch, EventRegistration, NewEvent};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_date, parse_enum, parse_optional_date, parse_optional_enum, require_non_empty,
};

/// Creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub date: String,
    /// Free-form label such as `"10 AM - 12 PM"`.
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub description: String,
    pub presenter: String,
    /// Cents; zero or absent means free.
    pub price_cents: Option<i32>,
    pub image: Option<String>,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub presenter: Option<String>,
    pub price_cents: Option<i32>,
    pub image: Option<String>,
}

/// List query parameters for events.
#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub category: Option<String>,
    pub upcoming: Option<bool>,
    pub free: Option<bool>,
    pub search: Option<String>,
}

fn validate_capacity(capacity: i32) -> Result<i32, Error> {
    if capacity <= 0 {
        return Err(Error::invalid_request("capacity must be positive").with_details(
            serde_json::json!({ "field": "capacity", "code": "invalid_value" }),
        ));
    }
    Ok(capacity)
}

/// List events.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses(
        (status = 200, description = "Events", body = [Event]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<EventListQuery>,
) -> ApiResult<web::Json<Vec<Event>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = EventFilter {
        category: parse_optional_enum(query.category, "category")?,
        upcoming_from: query
            .upcoming
            .unwrap_or(false)
            .then(|| Utc::now().date_naive()),
        free_only: query.free.unwrap_or(false),
        search: query.search,
    };
    Ok(web::Json(state.events.list(&filter).await?))
}

/// Create an event.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let payload = payload.into_inner();

    let event = state
        .events
        .create(NewEvent {
            title: require_non_empty(payload.title, "title")?,
            date: parse_date(payload.date, "date")?,
            time: payload.time,
            location: payload.location,
            category: parse_enum(payload.category, "category")?,
            capacity: validate_capacity(payload.capacity)?,
            description: payload.description,
            presenter: payload.presenter,
            price_cents: payload.price_cents.unwrap_or(0),
            image: payload.image,
        })
        .await?;
    Ok(HttpResponse::Created().json(event))
}

/// Fetch an event by id.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEvent"
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Event>> {
    session.require_user_id()?;
    let event = state
        .events
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("event not found"))?;
    Ok(web::Json(event))
}

/// Update an event.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[put("/events/{id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateEventRequest>,
) -> ApiResult<web::Json<Event>> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let patch = EventPatch {
        title: payload.title,
        date: parse_optional_date(payload.date, "date")?,
        time: payload.time,
        location: payload.location,
        category: parse_optional_enum(payload.category, "category")?,
        capacity: payload.capacity.map(validate_capacity).transpose()?,
        description: payload.description,
        presenter: payload.presenter,
        price_cents: payload.price_cents,
        image: payload.image.map(Some),
    };
    Ok(web::Json(state.events.update(id.into_inner(), patch).await?))
}

/// Delete an event and its registrations.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.events.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the caller for an event.
///
/// Free events are marked paid immediately; priced events start pending.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/register",
    responses(
        (status = 201, description = "Registered", body = EventRegistration),
        (status = 404, description = "Event not found", body = Error),
        (status = 409, description = "Already registered or event full", body = Error)
    ),
    tags = ["events"],
    operation_id = "registerForEvent"
)]
#[post("/events/{id}/register")]
pub async fn register_for_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let registration = state.event_service.register(id.into_inner(), user_id).await?;
    Ok(HttpResponse::Created().json(registration))
}

/// Remove the caller's registration.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}/register",
    responses(
        (status = 204, description = "Unregistered"),
        (status = 404, description = "Event not found", body = Error),
        (status = 409, description = "Not registered", body = Error)
    ),
    tags = ["events"],
    operation_id = "unregisterFromEvent"
)]
#[delete("/events/{id}/register")]
pub async fn unregister_from_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.event_service.unregister(id.into_inner(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    async fn create_event_with(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        capacity: i32,
        price_cents: i32,
    ) -> String {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/events")
                .cookie(cookie.clone())
                .set_json(json!({
                    "title": "Mindfulness workshop",
                    "date": "2026-10-12",
                    "time": "10 AM - 12 PM",
                    "location": "Community hall",
                    "category": "workshop",
                    "capacity": capacity,
                    "description": "Introductory session",
                    "presenter": "Dr. Rivers",
                    "priceCents": price_cents,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        body.get("id").and_then(Value::as_str).expect("id").to_owned()
    }

    async fn register(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        event_id: &str,
    ) -> actix_web::dev::ServiceResponse {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/events/{event_id}/register"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let app = actix_test::init_service(test_app()).await;
        let (_, cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let event_id = create_event_with(&app, &cookie, 10, 0).await;

        let first = register(&app, &cookie, &event_id).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(first).await;
        // Free events settle immediately.
        assert_eq!(body.get("paymentStatus").and_then(Value::as_str), Some("paid"));

        let second = register(&app, &cookie, &event_id).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn registration_stops_at_capacity() {
        let app = actix_test::init_service(test_app()).await;
        let (_, ada) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, bob) = register_and_login(&app, "bob", "bob@example.com", "client").await;
        let (_, eve) = register_and_login(&app, "eve", "eve@example.com", "client").await;
        let event_id = create_event_with(&app, &ada, 2, 1500).await;

        assert_eq!(register(&app, &ada, &event_id).await.status(), StatusCode::CREATED);
        assert_eq!(register(&app, &bob, &event_id).await.status(), StatusCode::CREATED);
        let full = register(&app, &eve, &event_id).await;
        assert_eq!(full.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(full).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("this event is already full")
        );
    }

    #[actix_web::test]
    async fn priced_registrations_start_pending_and_spots_shrink() {
        let app = actix_test::init_service(test_app()).await;
        let (_, cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let event_id = create_event_with(&app, &cookie, 5, 2500).await;

        let res = register(&app, &cookie, &event_id).await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("paymentStatus").and_then(Value::as_str),
            Some("pending")
        );

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/events/{event_id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("spotsLeft").and_then(Value::as_i64), Some(4));
        assert_eq!(
            body.get("registeredUsers")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(1)
        );
    }

    #[actix_web::test]
    async fn unregister_requires_an_existing_registration() {
        let app = actix_test::init_service(test_app()).await;
        let (_, cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let event_id = create_event_with(&app, &cookie, 5, 0).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/events/{event_id}/register"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        register(&app, &cookie, &event_id).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/events/{event_id}/register"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
