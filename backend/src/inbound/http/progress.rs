//! Progress tracking handlers.
//!
//! Listing is role-scoped: clients see their own entries, therapists see
//! entries of users they share an appointment with, admins see everything.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::progress::{
    MoodRating, NewProgressEntry, ProgressEntry, ProgressFilter, ProgressPatch,
};
use crate::domain::user::{User, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_value_error, parse_optional_date};

/// Creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgressRequest {
    /// Ignored for clients, who always log for themselves.
    #[schema(value_type = Option<String>)]
    pub user_id: Option<Uuid>,
    /// Defaults to today.
    pub date: Option<String>,
    #[schema(minimum = 1, maximum = 10)]
    pub mood_rating: i16,
    pub notes: Option<String>,
    pub completed_exercises: Option<Vec<String>>,
    pub therapist_feedback: Option<String>,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub date: Option<String>,
    pub mood_rating: Option<i16>,
    pub notes: Option<String>,
    pub completed_exercises: Option<Vec<String>>,
    pub therapist_feedback: Option<String>,
}

/// List query parameters for progress entries.
#[derive(Debug, Default, Deserialize)]
pub struct ProgressListQuery {
    pub user_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_mood(value: i16) -> Result<MoodRating, Error> {
    MoodRating::new(value).map_err(|_| {
        invalid_value_error(
            "moodRating",
            "mood rating must be between 1 and 10",
            &value.to_string(),
        )
    })
}

async fn find_accessible(state: &HttpState, user: &User, id: Uuid) -> Result<ProgressEntry, Error> {
    let entry = state
        .progress
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("progress entry not found"))?;
    let accessible = match user.role {
        UserRole::Admin => true,
        UserRole::Client => entry.user_id == user.id,
        UserRole::Therapist => {
            state
                .appointments
                .shares_client(user.id, entry.user_id)
                .await?
        }
    };
    if !accessible {
        // Out-of-scope rows are indistinguishable from absent ones.
        return Err(Error::not_found("progress entry not found"));
    }
    Ok(entry)
}

/// List progress entries visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/progress",
    responses(
        (status = 200, description = "Progress entries", body = [ProgressEntry]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["progress"],
    operation_id = "listProgress"
)]
#[get("/progress")]
pub async fn list_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ProgressListQuery>,
) -> ApiResult<web::Json<Vec<ProgressEntry>>> {
    let user = current_user(&state, &session).await?;
    let query = query.into_inner();
    let filter = ProgressFilter {
        user_id: query.user_id,
        start_date: parse_optional_date(query.start_date, "start_date")?,
        end_date: parse_optional_date(query.end_date, "end_date")?,
    };
    Ok(web::Json(
        state
            .progress
            .list(&crate::domain::Viewer::of(&user), &filter)
            .await?,
    ))
}

/// Log a progress entry.
#[utoipa::path(
    post,
    path = "/api/v1/progress",
    request_body = CreateProgressRequest,
    responses(
        (status = 201, description = "Entry created", body = ProgressEntry),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["progress"],
    operation_id = "createProgress"
)]
#[post("/progress")]
pub async fn create_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProgressRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let payload = payload.into_inner();

    // Clients always log for themselves.
    let user_id = match user.role {
        UserRole::Client => user.id,
        UserRole::Therapist | UserRole::Admin => payload.user_id.unwrap_or(user.id),
    };

    let entry = state
        .progress
        .create(NewProgressEntry {
            user_id,
            date: parse_optional_date(payload.date, "date")?
                .unwrap_or_else(|| Utc::now().date_naive()),
            mood_rating: parse_mood(payload.mood_rating)?,
            notes: payload.notes.unwrap_or_default(),
            completed_exercises: payload.completed_exercises.unwrap_or_default(),
            therapist_feedback: payload.therapist_feedback.unwrap_or_default(),
        })
        .await?;
    Ok(HttpResponse::Created().json(entry))
}

/// Fetch a progress entry visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/progress/{id}",
    responses(
        (status = 200, description = "Progress entry", body = ProgressEntry),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["progress"],
    operation_id = "getProgress"
)]
#[get("/progress/{id}")]
pub async fn get_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<ProgressEntry>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(
        find_accessible(&state, &user, id.into_inner()).await?,
    ))
}

/// Update a progress entry visible to the caller.
#[utoipa::path(
    put,
    path = "/api/v1/progress/{id}",
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Updated entry", body = ProgressEntry),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["progress"],
    operation_id = "updateProgress"
)]
#[put("/progress/{id}")]
pub async fn update_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateProgressRequest>,
) -> ApiResult<web::Json<ProgressEntry>> {
    let user = current_user(&state, &session).await?;
    let id = id.into_inner();
    find_accessible(&state, &user, id).await?;

    let payload = payload.into_inner();
    let patch = ProgressPatch {
        date: parse_optional_date(payload.date, "date")?,
        mood_rating: payload.mood_rating.map(parse_mood).transpose()?,
        notes: payload.notes,
        completed_exercises: payload.completed_exercises,
        therapist_feedback: payload.therapist_feedback,
    };
    Ok(web::Json(state.progress.update(id, patch).await?))
}

/// Delete a progress entry visible to the caller.
#[utoipa::path(
    delete,
    path = "/api/v1/progress/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["progress"],
    operation_id = "deleteProgress"
)]
#[delete("/progress/{id}")]
pub async fn delete_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let id = id.into_inner();
    find_accessible(&state, &user, id).await?;
    state.progress.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    async fn log_entry(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        mood: i16,
    ) -> Value {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/progress")
                .cookie(cookie.clone())
                .set_json(json!({ "moodRating": mood, "notes": "slept well" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        actix_test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn clients_only_see_their_own_entries() {
        let app = actix_test::init_service(test_app()).await;
        let (_, ada) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, bob) = register_and_login(&app, "bob", "bob@example.com", "client").await;

        log_entry(&app, &ada, 7).await;
        log_entry(&app, &bob, 4).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/progress")
                .cookie(ada)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        let rows = body.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("moodRating").and_then(Value::as_i64), Some(7));
    }

    #[actix_web::test]
    async fn therapists_see_entries_of_shared_clients_only() {
        let app = actix_test::init_service(test_app()).await;
        let (greg_id, greg) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let (_, ada) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, bob) = register_and_login(&app, "bob", "bob@example.com", "client").await;

        // Give greg a profile and one appointment with ada.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/therapists")
                .cookie(greg.clone())
                .set_json(json!({ "userId": greg_id, "specialty": "CBT", "priceCents": 8000 }))
                .to_request(),
        )
        .await;
        let therapist: Value = actix_test::read_body_json(res).await;
        let therapist_id = therapist.get("id").and_then(Value::as_str).expect("id");
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/appointments")
                .cookie(ada.clone())
                .set_json(json!({
                    "therapistId": therapist_id,
                    "date": "2026-09-01",
                    "time": "10:00",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        log_entry(&app, &ada, 7).await;
        log_entry(&app, &bob, 4).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/progress")
                .cookie(greg)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        let rows = body.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("moodRating").and_then(Value::as_i64), Some(7));
    }

    #[actix_web::test]
    async fn mood_out_of_range_is_rejected() {
        let app = actix_test::init_service(test_app()).await;
        let (_, ada) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/progress")
                .cookie(ada)
                .set_json(json!({ "moodRating": 11 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
