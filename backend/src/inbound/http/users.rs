//! User account and authentication handlers.
//!
//! ```text
//! POST /api/v1/auth/register
//! POST /api/v1/auth/login
//! POST /api/v1/auth/logout
//! GET  /api/v1/users/me
//! GET  /api/v1/users?role=therapist&search=ada
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::user::{NewUser, User, UserFilter, UserPatch, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_user, hash_password, verify_password};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional_enum, require_non_empty};

const MIN_PASSWORD_LEN: usize = 8;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    /// Defaults to `client`.
    pub role: Option<String>,
    pub profile_image: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial user update body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub profile_image: Option<String>,
    pub password: Option<String>,
}

/// List query parameters for users.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
}

fn validate_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::invalid_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .with_details(serde_json::json!({ "field": "password", "code": "too_short" })));
    }
    Ok(())
}

fn validate_email(email: String) -> Result<String, Error> {
    let email = require_non_empty(email, "email")?;
    if !email.contains('@') {
        return Err(Error::invalid_request("email must be a valid address").with_details(
            serde_json::json!({ "field": "email", "code": "invalid_value" }),
        ));
    }
    Ok(email)
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let username = require_non_empty(payload.username, "username")?;
    let email = validate_email(payload.email)?;
    validate_password(&payload.password)?;
    let role = parse_optional_enum::<UserRole>(payload.role, "role")?.unwrap_or(UserRole::Client);
    let password_hash = hash_password(&payload.password)?;

    let user = state
        .users
        .create(NewUser {
            username,
            email,
            phone: payload.phone,
            role,
            profile_image: payload.profile_image,
            password_hash,
        })
        .await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate by email and password, establishing a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let payload = payload.into_inner();
    let Some((user, stored_hash)) = state.users.credentials_by_email(&payload.email).await? else {
        return Err(Error::unauthorized("invalid credentials"));
    };
    if !verify_password(&payload.password, &stored_hash) {
        return Err(Error::unauthorized("invalid credentials"));
    }
    session.persist_user(user.id)?;
    Ok(web::Json(user))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Fetch the authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<web::Json<User>> {
    Ok(web::Json(current_user(&state, &session).await?))
}

/// List users, optionally filtered by role or a username/email search.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<Vec<User>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = UserFilter {
        role: parse_optional_enum(query.role, "role")?,
        search: query.search,
    };
    Ok(web::Json(state.users.list(&filter).await?))
}

/// Fetch a user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<User>> {
    session.require_user_id()?;
    let user = state
        .users
        .find(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(web::Json(user))
}

/// Update a user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    session.require_user_id()?;
    let payload = payload.into_inner();

    let email = payload.email.map(validate_email).transpose()?;
    let password_hash = match payload.password {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let patch = UserPatch {
        username: payload
            .username
            .map(|username| require_non_empty(username, "username"))
            .transpose()?,
        email,
        phone: payload.phone.map(Some),
        role: parse_optional_enum(payload.role, "role")?,
        profile_image: payload.profile_image.map(Some),
        password_hash,
    };
    Ok(web::Json(state.users.update(id.into_inner(), patch).await?))
}

/// Delete a user and everything cascading from it.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state.users.delete(id.into_inner()).await?;
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
    async fn register_then_login_round_trips() {
        let app = actix_test::init_service(test_app()).await;

        let register_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({
                    "username": "ada",
                    "email": "ada@example.com",
                    "password": "correct horse",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(register_res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(register_res).await;
        assert_eq!(body.get("role").and_then(Value::as_str), Some("client"));
        assert!(body.get("password").is_none());

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": "ada@example.com", "password": "correct horse" }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        assert!(
            login_res
                .response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
    }

    #[actix_web::test]
    async fn login_rejects_wrong_password() {
        let app = actix_test::init_service(test_app()).await;
        register_and_login(&app, "ada", "ada@example.com", "client").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": "ada@example.com", "password": "wrong password" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn duplicate_email_registration_conflicts() {
        let app = actix_test::init_service(test_app()).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/auth/register")
                    .set_json(json!({
                        "username": "ada",
                        "email": "ada@example.com",
                        "password": "correct horse",
                    }))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn list_users_filters_by_role() {
        let app = actix_test::init_service(test_app()).await;
        let (_, cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        register_and_login(&app, "greg", "greg@example.com", "therapist").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users?role=therapist")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let users = body.as_array().expect("array");
        assert_eq!(users.len(), 1);
        assert_eq!(
            users[0].get("username").and_then(Value::as_str),
            Some("greg")
        );
    }

    #[actix_web::test]
    async fn users_require_a_session() {
        let app = actix_test::init_service(test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/users").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_returns_the_session_user() {
        let app = actix_test::init_service(test_app()).await;
        let (user_id, cookie) = register_and_login(&app, "ada", "ada@example.com", "client").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("id").and_then(Value::as_str),
            Some(user_id.to_string().as_str())
        );
    }
}
