//! Review handlers.
//!
//! Creation binds the author to the session user, rejects duplicate
//! (user, therapist) pairs, and recomputes the therapist's rating aggregate.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::review::{NewReview, Rating, Review, ReviewFilter, ReviewPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_value_error, parse_optional_date, require_non_empty};

/// Creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[schema(value_type = String)]
    pub therapist_id: Uuid,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i16,
    pub comment: String,
    /// Defaults to today.
    pub date: Option<String>,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub date: Option<String>,
}

/// List query parameters for reviews.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub therapist_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

fn parse_rating(value: i16) -> Result<Rating, Error> {
    Rating::new(value)
        .map_err(|_| invalid_value_error("rating", "rating must be between 1 and 5", &value.to_string()))
}

/// List reviews.
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    responses(
        (status = 200, description = "Reviews", body = [Review]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listReviews"
)]
#[get("/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReviewListQuery>,
) -> ApiResult<web::Json<Vec<Review>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = ReviewFilter {
        therapist_id: query.therapist_id,
        user_id: query.user_id,
    };
    Ok(web::Json(state.reviews.list(&filter).await?))
}

/// Create a review for a therapist.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 404, description = "Therapist not found", body = Error),
        (status = 409, description = "Already reviewed", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();

    let review = state
        .review_service
        .create(NewReview {
            user_id,
            therapist_id: payload.therapist_id,
            rating: parse_rating(payload.rating)?,
            comment: require_non_empty(payload.comment, "comment")?,
            date: parse_optional_date(payload.date, "date")?
                .unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await?;
    Ok(HttpResponse::Created().json(review))
}

/// Fetch a review by id.
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    responses(
        (status = 200, description = "Review", body = Review),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getReview"
)]
#[get("/reviews/{id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Review>> {
    session.require_user_id()?;
    let review = state
        .reviews
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("review not found"))?;
    Ok(web::Json(review))
}

/// Update a review.
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = Review),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[put("/reviews/{id}")]
pub async fn update_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<web::Json<Review>> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let patch = ReviewPatch {
        rating: payload.rating.map(parse_rating).transpose()?,
        comment: payload.comment,
        date: parse_optional_date(payload.date, "date")?,
    };
    Ok(web::Json(state.reviews.update(id.into_inner(), patch).await?))
}

/// Delete a review.
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/reviews/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.reviews.delete(id.into_inner()).await?;
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

    async fn post_review(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        therapist_id: &str,
        rating: i16,
    ) -> actix_web::dev::ServiceResponse {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reviews")
                .cookie(cookie.clone())
                .set_json(json!({
                    "therapistId": therapist_id,
                    "rating": rating,
                    "comment": "very helpful",
                }))
                .to_request(),
        )
        .await
    }

    #[actix_web::test]
    async fn duplicate_review_for_same_pair_conflicts() {
        let app = actix_test::init_service(test_app()).await;
        let (therapist_user, therapist_cookie) =
            register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let therapist_id = create_therapist_profile(&app, &therapist_cookie, therapist_user).await;
        let (_, ada_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        let first = post_review(&app, &ada_cookie, &therapist_id, 5).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = post_review(&app, &ada_cookie, &therapist_id, 3).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn review_creation_recomputes_therapist_aggregate() {
        let app = actix_test::init_service(test_app()).await;
        let (therapist_user, therapist_cookie) =
            register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let therapist_id = create_therapist_profile(&app, &therapist_cookie, therapist_user).await;
        let (_, ada_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, bob_cookie) = register_and_login(&app, "bob", "bob@example.com", "client").await;

        post_review(&app, &ada_cookie, &therapist_id, 5).await;
        post_review(&app, &bob_cookie, &therapist_id, 2).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/therapists/{therapist_id}"))
                .cookie(ada_cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("reviewsCount").and_then(Value::as_i64), Some(2));
        let rating = body.get("rating").and_then(Value::as_f64).expect("rating");
        assert!((rating - 3.5).abs() < f64::EPSILON);
    }

    #[actix_web::test]
    async fn out_of_range_rating_is_rejected() {
        let app = actix_test::init_service(test_app()).await;
        let (therapist_user, therapist_cookie) =
            register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let therapist_id = create_therapist_profile(&app, &therapist_cookie, therapist_user).await;
        let (_, ada_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        let res = post_review(&app, &ada_cookie, &therapist_id, 6).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn review_for_unknown_therapist_is_404() {
        let app = actix_test::init_service(test_app()).await;
        let (_, ada_cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        let res = post_review(&app, &ada_cookie, &Uuid::nil().to_string(), 4).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
