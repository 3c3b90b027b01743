//! Admin statistics handlers. All endpoints require the admin role.

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::stats::{AdminStats, DashboardSummary, NewAdminStats};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_date;

/// Rollup storage request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatsRequest {
    pub date: String,
    pub total_therapists: Option<i32>,
    pub active_users: Option<i32>,
    pub appointments_today: Option<i32>,
    pub total_resources: Option<i32>,
    pub user_growth: Option<f64>,
    pub success_rate: Option<f64>,
}

/// The dashboard summary for today.
///
/// Stores the day's rollup on first access; later calls reuse it.
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDashboard"
)]
#[get("/admin/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardSummary>> {
    let user = current_user(&state, &session).await?;
    require_admin(&user)?;
    let summary = state
        .dashboard_service
        .summary(Utc::now().date_naive())
        .await?;
    Ok(web::Json(summary))
}

/// List stored rollups, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Stored rollups", body = [AdminStats]),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listAdminStats"
)]
#[get("/admin/stats")]
pub async fn list_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AdminStats>>> {
    let user = current_user(&state, &session).await?;
    require_admin(&user)?;
    Ok(web::Json(state.stats.list().await?))
}

/// Store a rollup for a date.
#[utoipa::path(
    post,
    path = "/api/v1/admin/stats",
    request_body = CreateStatsRequest,
    responses(
        (status = 201, description = "Rollup stored", body = AdminStats),
        (status = 403, description = "Admin only", body = Error),
        (status = 409, description = "Date already has a rollup", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createAdminStats"
)]
#[post("/admin/stats")]
pub async fn create_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateStatsRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    require_admin(&user)?;
    let payload = payload.into_inner();

    let stats = state
        .stats
        .insert(NewAdminStats {
            date: parse_date(payload.date, "date")?,
            total_therapists: payload.total_therapists.unwrap_or(0),
            active_users: payload.active_users.unwrap_or(0),
            appointments_today: payload.appointments_today.unwrap_or(0),
            total_resources: payload.total_resources.unwrap_or(0),
            user_growth: payload.user_growth.unwrap_or(0.0),
            success_rate: payload.success_rate.unwrap_or(0.0),
        })
        .await?;
    Ok(HttpResponse::Created().json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn dashboard_is_admin_only() {
        let app = actix_test::init_service(test_app()).await;
        let (_, client) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/dashboard")
                .cookie(client)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn dashboard_counts_live_records() {
        let app = actix_test::init_service(test_app()).await;
        let (_, admin) = register_and_login(&app, "root", "root@example.com", "admin").await;
        register_and_login(&app, "ada", "ada@example.com", "client").await;
        register_and_login(&app, "bob", "bob@example.com", "client").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/dashboard")
                .cookie(admin.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let stats = body.get("stats").expect("stats");
        assert_eq!(stats.get("activeUsers").and_then(Value::as_i64), Some(2));
        assert_eq!(stats.get("totalTherapists").and_then(Value::as_i64), Some(0));

        // The rollup is stored on first access and reused afterwards.
        register_and_login(&app, "eve", "eve@example.com", "client").await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/dashboard")
                .cookie(admin)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("stats")
                .and_then(|stats| stats.get("activeUsers"))
                .and_then(Value::as_i64),
            Some(2)
        );
    }

    #[actix_web::test]
    async fn storing_the_same_date_twice_conflicts() {
        let app = actix_test::init_service(test_app()).await;
        let (_, admin) = register_and_login(&app, "root", "root@example.com", "admin").await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/admin/stats")
                    .cookie(admin.clone())
                    .set_json(json!({ "date": "2026-01-15", "activeUsers": 10 }))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }
}
