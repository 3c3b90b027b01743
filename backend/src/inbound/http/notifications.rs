//! Notification handlers.
//!
//! Listing is visibility-scoped: a row is visible when it targets the caller
//! directly or when its audience includes their role.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::notification::{Audience, NewNotification, Notification};
use crate::domain::user::Viewer;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_viewer;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_enum, parse_optional_enum, parse_optional_rfc3339, parse_optional_uuid,
    require_non_empty,
};

/// Creation request body. Either target a user or an audience role.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub user_id: Option<String>,
    /// Audience when no user is targeted; defaults to `all`.
    pub role: Option<String>,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Defaults to now.
    pub date: Option<String>,
}

/// Response body for bulk read-marking.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// List query parameters for notifications.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQuery {
    pub read: Option<bool>,
}

fn visible_to(notification: &Notification, viewer: &Viewer) -> bool {
    notification.user_id == Some(viewer.user_id)
        || (notification.user_id.is_none() && notification.audience.includes(viewer.role))
}

/// List notifications visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NotificationListQuery>,
) -> ApiResult<web::Json<Vec<Notification>>> {
    let viewer = current_viewer(&state, &session).await?;
    Ok(web::Json(
        state
            .notifications
            .list_visible(&viewer, query.into_inner().read)
            .await?,
    ))
}

/// Create a notification, targeted or broadcast.
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = Notification),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "createNotification"
)]
#[post("/notifications")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let payload = payload.into_inner();

    let notification = state
        .notifications
        .create(NewNotification {
            user_id: parse_optional_uuid(payload.user_id, "userId")?,
            audience: parse_optional_enum(payload.role, "role")?.unwrap_or(Audience::All),
            title: require_non_empty(payload.title, "title")?,
            message: payload.message,
            kind: parse_enum(payload.kind, "type")?,
            date: parse_optional_rfc3339(payload.date, "date")?.unwrap_or_else(Utc::now),
        })
        .await?;
    Ok(HttpResponse::Created().json(notification))
}

/// Delete a notification.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotification"
)]
#[delete("/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.notifications.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mark one visible notification read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    responses(
        (status = 200, description = "Updated notification", body = Notification),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_notification_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Notification>> {
    let viewer = current_viewer(&state, &session).await?;
    let id = id.into_inner();

    let notification = state
        .notifications
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("notification not found"))?;
    if !visible_to(&notification, &viewer) {
        // Out-of-scope rows are indistinguishable from absent ones.
        return Err(Error::not_found("notification not found"));
    }
    Ok(web::Json(state.notifications.mark_read(id).await?))
}

/// Mark every visible unread notification read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Rows updated", body = MarkAllReadResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[post("/notifications/read-all")]
pub async fn mark_all_notifications_read(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MarkAllReadResponse>> {
    let viewer = current_viewer(&state, &session).await?;
    let updated = state.notifications.mark_all_read(&viewer).await?;
    Ok(web::Json(MarkAllReadResponse { updated }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    async fn broadcast(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        role: &str,
        title: &str,
    ) {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/notifications")
                .cookie(cookie.clone())
                .set_json(json!({
                    "role": role,
                    "title": title,
                    "message": "hello",
                    "type": "system",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn listing_respects_role_audiences() {
        let app = actix_test::init_service(test_app()).await;
        let (_, admin) = register_and_login(&app, "root", "root@example.com", "admin").await;
        let (_, client) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        broadcast(&app, &admin, "all", "maintenance window").await;
        broadcast(&app, &admin, "therapist", "new payout schedule").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications")
                .cookie(client)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        let rows = body.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("title").and_then(Value::as_str),
            Some("maintenance window")
        );
    }

    #[actix_web::test]
    async fn read_all_marks_only_visible_rows() {
        let app = actix_test::init_service(test_app()).await;
        let (_, admin) = register_and_login(&app, "root", "root@example.com", "admin").await;
        let (_, client) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        broadcast(&app, &admin, "all", "maintenance window").await;
        broadcast(&app, &admin, "client", "weekly checkin reminder").await;
        broadcast(&app, &admin, "therapist", "new payout schedule").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/notifications/read-all")
                .cookie(client.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("updated").and_then(Value::as_u64), Some(2));

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications?read=false")
                .cookie(client)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(0));
    }

    #[actix_web::test]
    async fn cannot_mark_invisible_notifications_read() {
        let app = actix_test::init_service(test_app()).await;
        let (_, admin) = register_and_login(&app, "root", "root@example.com", "admin").await;
        let (_, client) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        broadcast(&app, &admin, "therapist", "new payout schedule").await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications")
                .cookie(admin.clone())
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        // Admins do not see therapist-audience rows either; fetch the id via
        // a therapist account instead.
        assert_eq!(body.as_array().map(Vec::len), Some(0));

        let (_, therapist) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications")
                .cookie(therapist)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        let id = body
            .as_array()
            .and_then(|rows| rows.first())
            .and_then(|row| row.get("id"))
            .and_then(Value::as_str)
            .expect("notification id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/notifications/{id}/read"))
                .cookie(client)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
