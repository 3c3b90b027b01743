//! Therapist profile handlers.
//!
//! ```text
//! GET  /api/v1/therapists?availability=true&specialty=anxiety&min_rating=4
//! GET  /api/v1/therapists/{id}/availability
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::appointment::Appointment;
use crate::domain::review::{Review, ReviewFilter};
use crate::domain::therapist::{
    NewScheduleSlot, NewTherapist, Therapist, TherapistFilter, TherapistPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_enum, parse_slot_time, require_non_empty};

/// Weekly schedule as sent by clients: day name to `HH:MM` times.
pub type ScheduleMap = BTreeMap<String, Vec<String>>;

/// Creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTherapistRequest {
    #[schema(value_type = String)]
    pub user_id: Uuid,
    pub specialty: String,
    pub experience_years: Option<i32>,
    pub available: Option<bool>,
    pub price_cents: i32,
    pub languages: Option<Vec<String>>,
    pub specializations: Option<Vec<String>>,
    pub education: Option<Vec<String>>,
    pub about: Option<String>,
    /// Day-of-week to times map; becomes the initial slot set.
    pub schedule: Option<ScheduleMap>,
}

/// Partial update body. A provided `schedule` replaces the slot set.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTherapistRequest {
    pub specialty: Option<String>,
    pub experience_years: Option<i32>,
    pub available: Option<bool>,
    pub price_cents: Option<i32>,
    pub languages: Option<Vec<String>>,
    pub specializations: Option<Vec<String>>,
    pub education: Option<Vec<String>>,
    pub about: Option<String>,
    pub schedule: Option<ScheduleMap>,
}

/// List query parameters for therapists.
#[derive(Debug, Default, Deserialize)]
pub struct TherapistListQuery {
    pub availability: Option<bool>,
    pub specialty: Option<String>,
    pub language: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
}

fn parse_schedule(schedule: ScheduleMap) -> Result<Vec<NewScheduleSlot>, Error> {
    let mut slots = Vec::new();
    for (day, times) in schedule {
        let day = parse_enum(day, "schedule day")?;
        for time in times {
            slots.push(NewScheduleSlot {
                day,
                time: parse_slot_time(time, "schedule time")?,
                available: true,
            });
        }
    }
    Ok(slots)
}

/// List therapists with profile filters.
#[utoipa::path(
    get,
    path = "/api/v1/therapists",
    responses(
        (status = 200, description = "Therapists", body = [Therapist]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "listTherapists"
)]
#[get("/therapists")]
pub async fn list_therapists(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TherapistListQuery>,
) -> ApiResult<web::Json<Vec<Therapist>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = TherapistFilter {
        available_only: query.availability.unwrap_or(false),
        specialty: query.specialty,
        language: query.language,
        min_price_cents: query.min_price,
        max_price_cents: query.max_price,
        min_rating: query.min_rating,
        search: query.search,
    };
    Ok(web::Json(state.therapists.list(&filter).await?))
}

/// Create a therapist profile for an existing user.
#[utoipa::path(
    post,
    path = "/api/v1/therapists",
    request_body = CreateTherapistRequest,
    responses(
        (status = 201, description = "Profile created", body = Therapist),
        (status = 404, description = "User not found", body = Error),
        (status = 409, description = "User already has a profile", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "createTherapist"
)]
#[post("/therapists")]
pub async fn create_therapist(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTherapistRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let schedule = payload.schedule.map(parse_schedule).transpose()?;

    let therapist = state
        .therapists
        .create(NewTherapist {
            user_id: payload.user_id,
            specialty: require_non_empty(payload.specialty, "specialty")?,
            experience_years: payload.experience_years.unwrap_or(0),
            available: payload.available.unwrap_or(true),
            price_cents: payload.price_cents,
            languages: payload.languages.unwrap_or_default(),
            specializations: payload.specializations.unwrap_or_default(),
            education: payload.education.unwrap_or_default(),
            about: payload.about.unwrap_or_default(),
            schedule: schedule.unwrap_or_default(),
        })
        .await?;
    Ok(HttpResponse::Created().json(therapist))
}

/// Fetch a therapist by id.
#[utoipa::path(
    get,
    path = "/api/v1/therapists/{id}",
    responses(
        (status = 200, description = "Therapist", body = Therapist),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "getTherapist"
)]
#[get("/therapists/{id}")]
pub async fn get_therapist(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Therapist>> {
    session.require_user_id()?;
    let therapist = state
        .therapists
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("therapist not found"))?;
    Ok(web::Json(therapist))
}

/// Update a therapist profile.
#[utoipa::path(
    put,
    path = "/api/v1/therapists/{id}",
    request_body = UpdateTherapistRequest,
    responses(
        (status = 200, description = "Updated therapist", body = Therapist),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "updateTherapist"
)]
#[put("/therapists/{id}")]
pub async fn update_therapist(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateTherapistRequest>,
) -> ApiResult<web::Json<Therapist>> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let patch = TherapistPatch {
        specialty: payload.specialty,
        experience_years: payload.experience_years,
        available: payload.available,
        price_cents: payload.price_cents,
        languages: payload.languages,
        specializations: payload.specializations,
        education: payload.education,
        about: payload.about,
        schedule: payload.schedule.map(parse_schedule).transpose()?,
    };
    Ok(web::Json(
        state.therapists.update(id.into_inner(), patch).await?,
    ))
}

/// Delete a therapist profile.
#[utoipa::path(
    delete,
    path = "/api/v1/therapists/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "deleteTherapist"
)]
#[delete("/therapists/{id}")]
pub async fn delete_therapist(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.therapists.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List a therapist's reviews.
#[utoipa::path(
    get,
    path = "/api/v1/therapists/{id}/reviews",
    responses(
        (status = 200, description = "Reviews", body = [Review]),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "listTherapistReviews"
)]
#[get("/therapists/{id}/reviews")]
pub async fn list_therapist_reviews(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<Review>>> {
    session.require_user_id()?;
    let id = id.into_inner();
    if state.therapists.find(id).await?.is_none() {
        return Err(Error::not_found("therapist not found"));
    }
    let reviews = state
        .reviews
        .list(&ReviewFilter {
            therapist_id: Some(id),
            user_id: None,
        })
        .await?;
    Ok(web::Json(reviews))
}

/// List a therapist's appointments.
#[utoipa::path(
    get,
    path = "/api/v1/therapists/{id}/appointments",
    responses(
        (status = 200, description = "Appointments", body = [Appointment]),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "listTherapistAppointments"
)]
#[get("/therapists/{id}/appointments")]
pub async fn list_therapist_appointments(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<Appointment>>> {
    session.require_user_id()?;
    let id = id.into_inner();
    if state.therapists.find(id).await?.is_none() {
        return Err(Error::not_found("therapist not found"));
    }
    Ok(web::Json(state.appointments.list_for_therapist(id).await?))
}

/// A therapist's bookable slots grouped by day.
#[utoipa::path(
    get,
    path = "/api/v1/therapists/{id}/availability",
    responses(
        (status = 200, description = "Available times grouped by day"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["therapists"],
    operation_id = "getTherapistAvailability"
)]
#[get("/therapists/{id}/availability")]
pub async fn get_therapist_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<ScheduleMap>> {
    session.require_user_id()?;
    let therapist = state
        .therapists
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("therapist not found"))?;

    let mut schedule = ScheduleMap::new();
    for slot in therapist
        .time_slots
        .into_iter()
        .filter(|slot| slot.available)
    {
        schedule
            .entry(slot.day.as_str().to_owned())
            .or_default()
            .push(slot.time.to_string());
    }
    Ok(web::Json(schedule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    async fn create_profile(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        user_id: uuid::Uuid,
    ) -> Value {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/therapists")
                .cookie(cookie.clone())
                .set_json(json!({
                    "userId": user_id,
                    "specialty": "Anxiety",
                    "priceCents": 9000,
                    "languages": ["english", "french"],
                    "schedule": { "monday": ["09:00", "10:00"], "friday": ["14:00"] },
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        actix_test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn create_builds_schedule_slots() {
        let app = actix_test::init_service(test_app()).await;
        let (user_id, cookie) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;

        let body = create_profile(&app, &cookie, user_id).await;
        let slots = body
            .get("timeSlots")
            .and_then(Value::as_array)
            .expect("slots");
        assert_eq!(slots.len(), 3);
        assert_eq!(
            body.get("user")
                .and_then(|user| user.get("username"))
                .and_then(Value::as_str),
            Some("greg")
        );
    }

    #[actix_web::test]
    async fn second_profile_for_same_user_conflicts() {
        let app = actix_test::init_service(test_app()).await;
        let (user_id, cookie) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        create_profile(&app, &cookie, user_id).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/therapists")
                .cookie(cookie)
                .set_json(json!({ "userId": user_id, "specialty": "Stress", "priceCents": 100 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn availability_groups_times_by_day() {
        let app = actix_test::init_service(test_app()).await;
        let (user_id, cookie) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let body = create_profile(&app, &cookie, user_id).await;
        let therapist_id = body.get("id").and_then(Value::as_str).expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/therapists/{therapist_id}/availability"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("monday").and_then(Value::as_array).map(Vec::len),
            Some(2)
        );
        assert_eq!(
            body.get("friday").and_then(Value::as_array).map(Vec::len),
            Some(1)
        );
    }

    #[actix_web::test]
    async fn list_filters_by_price_band() {
        let app = actix_test::init_service(test_app()).await;
        let (user_id, cookie) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        create_profile(&app, &cookie, user_id).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/therapists?min_price=10000")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(0));

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/therapists?min_price=5000&language=french")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn rejects_malformed_schedule_times() {
        let app = actix_test::init_service(test_app()).await;
        let (user_id, cookie) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/therapists")
                .cookie(cookie)
                .set_json(json!({
                    "userId": user_id,
                    "specialty": "Anxiety",
                    "priceCents": 9000,
                    "schedule": { "monday": ["25:00"] },
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
