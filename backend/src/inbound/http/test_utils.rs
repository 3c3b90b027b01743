//! Shared helpers for handler tests.
//!
//! Tests run the full middleware + handler stack over the in-memory adapter,
//! so the behaviour they pin down is the behaviour of a real deployment
//! minus PostgreSQL.

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::{SessionMiddleware, config::CookieContentSecurity};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::{App, web};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::MemoryStore;

/// Cookie-session middleware with a fixed key for deterministic tests.
pub(crate) fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[7; 64]))
        .cookie_name("session".into())
        .cookie_secure(false)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// HTTP state backed by a fresh in-memory store.
pub(crate) fn memory_state() -> HttpState {
    let store = MemoryStore::new();
    HttpState::new(HttpStatePorts {
        users: Arc::new(store.clone()),
        therapists: Arc::new(store.clone()),
        appointments: Arc::new(store.clone()),
        reviews: Arc::new(store.clone()),
        resources: Arc::new(store.clone()),
        events: Arc::new(store.clone()),
        reading_lists: Arc::new(store.clone()),
        categories: Arc::new(store.clone()),
        notifications: Arc::new(store.clone()),
        messages: Arc::new(store.clone()),
        progress: Arc::new(store.clone()),
        stats: Arc::new(store),
    })
}

/// A full application over a fresh in-memory store.
pub(crate) fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(memory_state()))
        .service(
            crate::inbound::http::register_api(web::scope("/api/v1"))
                .wrap(test_session_middleware()),
        )
}

/// Register an account with the given role, log in, and return the new user
/// id together with the session cookie.
pub(crate) async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    role: &str,
) -> (Uuid, Cookie<'static>) {
    let register_res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "username": username,
                "email": email,
                "password": "correct horse",
                "role": role,
            }))
            .to_request(),
    )
    .await;
    assert!(
        register_res.status().is_success(),
        "registration failed: {}",
        register_res.status()
    );
    let body: Value = actix_web::test::read_body_json(register_res).await;
    let user_id = body
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .expect("user id in registration response");

    let login_res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": email, "password": "correct horse" }))
            .to_request(),
    )
    .await;
    assert!(login_res.status().is_success(), "login failed");
    let cookie = login_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();

    (user_id, cookie)
}
