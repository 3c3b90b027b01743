//! Category handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::category::{Category, CategoryPatch, NewCategory};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_non_empty;

/// Creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub title: String,
    pub icon: String,
    pub color: String,
    pub count: Option<i32>,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub count: Option<i32>,
}

/// List all categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories", body = [Category]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Category>>> {
    session.require_user_id()?;
    Ok(web::Json(state.categories.list().await?))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let category = state
        .categories
        .create(NewCategory {
            title: require_non_empty(payload.title, "title")?,
            icon: payload.icon,
            color: payload.color,
            count: payload.count.unwrap_or(0),
        })
        .await?;
    Ok(HttpResponse::Created().json(category))
}

/// Fetch a category by id.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "getCategory"
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Category>> {
    session.require_user_id()?;
    let category = state
        .categories
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("category not found"))?;
    Ok(web::Json(category))
}

/// Update a category.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = Category),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateCategoryRequest>,
) -> ApiResult<web::Json<Category>> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let patch = CategoryPatch {
        title: payload.title,
        icon: payload.icon,
        color: payload.color,
        count: payload.count,
    };
    Ok(web::Json(
        state.categories.update(id.into_inner(), patch).await?,
    ))
}

/// Delete a category.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.categories.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
