//! Reading list handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::reading_list::{
    NewReadingList, ReadingList, ReadingListFilter, ReadingListPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_non_empty;

/// Creation request body; `bookList` becomes the ordered items.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingListRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub book_list: Option<Vec<String>>,
}

/// Partial update body; a provided `bookList` replaces all items.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReadingListRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub book_list: Option<Vec<String>>,
}

/// List query parameters for reading lists.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingListListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// List reading lists.
#[utoipa::path(
    get,
    path = "/api/v1/reading-lists",
    responses(
        (status = 200, description = "Reading lists", body = [ReadingList]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["reading-lists"],
    operation_id = "listReadingLists"
)]
#[get("/reading-lists")]
pub async fn list_reading_lists(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReadingListListQuery>,
) -> ApiResult<web::Json<Vec<ReadingList>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = ReadingListFilter {
        category: query.category,
        search: query.search,
    };
    Ok(web::Json(state.reading_lists.list(&filter).await?))
}

/// Create a reading list.
#[utoipa::path(
    post,
    path = "/api/v1/reading-lists",
    request_body = CreateReadingListRequest,
    responses(
        (status = 201, description = "Reading list created", body = ReadingList),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["reading-lists"],
    operation_id = "createReadingList"
)]
#[post("/reading-lists")]
pub async fn create_reading_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateReadingListRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let payload = payload.into_inner();

    let list = state
        .reading_lists
        .create(NewReadingList {
            title: require_non_empty(payload.title, "title")?,
            description: payload.description,
            category: payload.category,
            image: payload.image,
            books: payload.book_list.unwrap_or_default(),
        })
        .await?;
    Ok(HttpResponse::Created().json(list))
}

/// Fetch a reading list by id.
#[utoipa::path(
    get,
    path = "/api/v1/reading-lists/{id}",
    responses(
        (status = 200, description = "Reading list", body = ReadingList),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reading-lists"],
    operation_id = "getReadingList"
)]
#[get("/reading-lists/{id}")]
pub async fn get_reading_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<ReadingList>> {
    session.require_user_id()?;
    let list = state
        .reading_lists
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("reading list not found"))?;
    Ok(web::Json(list))
}

/// Update a reading list.
#[utoipa::path(
    put,
    path = "/api/v1/reading-lists/{id}",
    request_body = UpdateReadingListRequest,
    responses(
        (status = 200, description = "Updated reading list", body = ReadingList),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reading-lists"],
    operation_id = "updateReadingList"
)]
#[put("/reading-lists/{id}")]
pub async fn update_reading_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateReadingListRequest>,
) -> ApiResult<web::Json<ReadingList>> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let patch = ReadingListPatch {
        title: payload.title,
        description: payload.description,
        category: payload.category,
        image: payload.image.map(Some),
        books: payload.book_list,
    };
    Ok(web::Json(
        state.reading_lists.update(id.into_inner(), patch).await?,
    ))
}

/// Delete a reading list and its items.
#[utoipa::path(
    delete,
    path = "/api/v1/reading-lists/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reading-lists"],
    operation_id = "deleteReadingList"
)]
#[delete("/reading-lists/{id}")]
pub async fn delete_reading_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.reading_lists.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn create_orders_books_and_update_replaces_them() {
        let app = actix_test::init_service(test_app()).await;
        let (_, cookie) = register_and_login(&app, "root", "root@example.com", "admin").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reading-lists")
                .cookie(cookie.clone())
                .set_json(json!({
                    "title": "Grief and growth",
                    "description": "Starting points",
                    "category": "Grief",
                    "bookList": ["On Grief", "The Body Keeps the Score"],
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("bookCount").and_then(Value::as_i64), Some(2));
        let books = body.get("books").and_then(Value::as_array).expect("books");
        assert_eq!(books[0].get("order").and_then(Value::as_i64), Some(0));
        assert_eq!(
            books[0].get("title").and_then(Value::as_str),
            Some("On Grief")
        );
        let list_id = body.get("id").and_then(Value::as_str).expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/reading-lists/{list_id}"))
                .cookie(cookie)
                .set_json(json!({ "bookList": ["Maybe You Should Talk to Someone"] }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("bookCount").and_then(Value::as_i64), Some(1));
    }
}
