//! Educational resource handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::resource::{NewResource, Resource, ResourceFilter, ResourcePatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_enum, parse_optional_enum, require_non_empty};

/// Creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub tags: Option<Vec<String>>,
    pub url: String,
    pub featured: Option<bool>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
    pub featured: Option<bool>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// List query parameters for resources.
#[derive(Debug, Default, Deserialize)]
pub struct ResourceListQuery {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub featured: Option<bool>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

/// List resources with content filters.
#[utoipa::path(
    get,
    path = "/api/v1/resources",
    responses(
        (status = 200, description = "Resources", body = [Resource]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["resources"],
    operation_id = "listResources"
)]
#[get("/resources")]
pub async fn list_resources(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ResourceListQuery>,
) -> ApiResult<web::Json<Vec<Resource>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = ResourceFilter {
        category: query.category,
        kind: parse_optional_enum(query.kind, "type")?,
        featured_only: query.featured.unwrap_or(false),
        tag: query.tag,
        search: query.search,
    };
    Ok(web::Json(state.resources.list(&filter).await?))
}

/// List featured resources.
#[utoipa::path(
    get,
    path = "/api/v1/resources/featured",
    responses(
        (status = 200, description = "Featured resources", body = [Resource]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["resources"],
    operation_id = "listFeaturedResources"
)]
#[get("/resources/featured")]
pub async fn list_featured_resources(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Resource>>> {
    session.require_user_id()?;
    let filter = ResourceFilter {
        featured_only: true,
        ..ResourceFilter::default()
    };
    Ok(web::Json(state.resources.list(&filter).await?))
}

/// Publish a resource.
#[utoipa::path(
    post,
    path = "/api/v1/resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = Resource),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["resources"],
    operation_id = "createResource"
)]
#[post("/resources")]
pub async fn create_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateResourceRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let payload = payload.into_inner();

    let resource = state
        .resources
        .create(NewResource {
            title: require_non_empty(payload.title, "title")?,
            author: payload.author,
            description: payload.description,
            category: payload.category,
            tags: payload.tags.unwrap_or_default(),
            url: require_non_empty(payload.url, "url")?,
            featured: payload.featured.unwrap_or(false),
            thumbnail_url: payload.thumbnail_url,
            duration: payload.duration,
            kind: parse_enum(payload.kind, "type")?,
        })
        .await?;
    Ok(HttpResponse::Created().json(resource))
}

/// Fetch a resource by id.
#[utoipa::path(
    get,
    path = "/api/v1/resources/{id}",
    responses(
        (status = 200, description = "Resource", body = Resource),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["resources"],
    operation_id = "getResource"
)]
#[get("/resources/{id}")]
pub async fn get_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Resource>> {
    session.require_user_id()?;
    let resource = state
        .resources
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("resource not found"))?;
    Ok(web::Json(resource))
}

/// Update a resource.
#[utoipa::path(
    put,
    path = "/api/v1/resources/{id}",
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Updated resource", body = Resource),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["resources"],
    operation_id = "updateResource"
)]
#[put("/resources/{id}")]
pub async fn update_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateResourceRequest>,
) -> ApiResult<web::Json<Resource>> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let patch = ResourcePatch {
        title: payload.title,
        author: payload.author,
        description: payload.description,
        category: payload.category,
        tags: payload.tags,
        url: payload.url,
        featured: payload.featured,
        thumbnail_url: payload.thumbnail_url.map(Some),
        duration: payload.duration.map(Some),
        kind: parse_optional_enum(payload.kind, "type")?,
    };
    Ok(web::Json(
        state.resources.update(id.into_inner(), patch).await?,
    ))
}

/// Delete a resource.
#[utoipa::path(
    delete,
    path = "/api/v1/resources/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["resources"],
    operation_id = "deleteResource"
)]
#[delete("/resources/{id}")]
pub async fn delete_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.resources.delete(id.into_inner()).await?;
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
    async fn featured_listing_excludes_unfeatured() {
        let app = actix_test::init_service(test_app()).await;
        let (_, cookie) = register_and_login(&app, "root", "root@example.com", "admin").await;

        for (title, featured) in [("Calm breathing", true), ("Sleep hygiene", false)] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/resources")
                    .cookie(cookie.clone())
                    .set_json(json!({
                        "title": title,
                        "author": "Dr. Rivers",
                        "description": "short guide",
                        "category": "Mindfulness",
                        "url": "https://example.com/guide",
                        "featured": featured,
                        "type": "article",
                        "tags": ["calm"],
                    }))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/resources/featured")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        let items = body.as_array().expect("array");
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].get("title").and_then(Value::as_str),
            Some("Calm breathing")
        );

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/resources?tag=calm")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn unknown_kind_is_rejected() {
        let app = actix_test::init_service(test_app()).await;
        let (_, cookie) = register_and_login(&app, "root", "root@example.com", "admin").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/resources")
                .cookie(cookie)
                .set_json(json!({
                    "title": "Calm breathing",
                    "author": "Dr. Rivers",
                    "description": "short guide",
                    "category": "Mindfulness",
                    "url": "https://example.com/guide",
                    "type": "hologram",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
