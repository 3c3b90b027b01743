//! Direct message handlers.
//!
//! All reads are participant-scoped; only a message's receiver may mark it
//! read.

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::message::{Conversation, Message, MessageFilter, NewMessage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional_rfc3339, require_non_empty};

/// Send request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[schema(value_type = String)]
    pub receiver_id: Uuid,
    pub message: String,
    /// Defaults to now.
    pub timestamp: Option<String>,
}

/// List query parameters for messages.
#[derive(Debug, Default, Deserialize)]
pub struct MessageListQuery {
    pub partner_id: Option<Uuid>,
    pub read: Option<bool>,
}

/// List the caller's messages.
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    responses(
        (status = 200, description = "Messages", body = [Message]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MessageListQuery>,
) -> ApiResult<web::Json<Vec<Message>>> {
    let user_id = session.require_user_id()?;
    let query = query.into_inner();
    let filter = MessageFilter {
        partner_id: query.partner_id,
        read: query.read,
    };
    Ok(web::Json(state.messages.list_for(user_id, &filter).await?))
}

/// Send a message from the caller.
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 404, description = "Receiver not found", body = Error)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SendMessageRequest>,
) -> ApiResult<HttpResponse> {
    let sender_id = session.require_user_id()?;
    let payload = payload.into_inner();

    let message = state
        .messages
        .create(NewMessage {
            sender_id,
            receiver_id: payload.receiver_id,
            body: require_non_empty(payload.message, "message")?,
            sent_at: parse_optional_rfc3339(payload.timestamp, "timestamp")?
                .unwrap_or_else(Utc::now),
        })
        .await?;
    Ok(HttpResponse::Created().json(message))
}

/// Conversation summaries: one row per partner with the latest message and
/// unread count.
#[utoipa::path(
    get,
    path = "/api/v1/messages/conversations",
    responses(
        (status = 200, description = "Conversations", body = [Conversation]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["messages"],
    operation_id = "listConversations"
)]
#[get("/messages/conversations")]
pub async fn list_conversations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Conversation>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.messages.conversations(user_id).await?))
}

/// Mark a received message read. Only the receiver may do this.
#[utoipa::path(
    post,
    path = "/api/v1/messages/{id}/read",
    responses(
        (status = 200, description = "Updated message", body = Message),
        (status = 403, description = "Caller is not the receiver", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["messages"],
    operation_id = "markMessageRead"
)]
#[post("/messages/{id}/read")]
pub async fn mark_message_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<Message>> {
    let user_id = session.require_user_id()?;
    let id = id.into_inner();

    let message = state
        .messages
        .find(id)
        .await?
        .ok_or_else(|| Error::not_found("message not found"))?;
    if message.sender_id != user_id && message.receiver_id != user_id {
        // Non-participants cannot learn the message exists.
        return Err(Error::not_found("message not found"));
    }
    if message.receiver_id != user_id {
        return Err(Error::forbidden(
            "you do not have permission to mark this message as read",
        ));
    }
    Ok(web::Json(state.messages.mark_read(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    async fn send(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        receiver_id: uuid::Uuid,
        text: &str,
    ) -> Value {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/messages")
                .cookie(cookie.clone())
                .set_json(json!({ "receiverId": receiver_id, "message": text }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        actix_test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn only_the_receiver_may_mark_read() {
        let app = actix_test::init_service(test_app()).await;
        let (ada_id, ada) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, greg) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;

        let sent = send(&app, &greg, ada_id, "how was the week?").await;
        let message_id = sent.get("id").and_then(Value::as_str).expect("id");

        // The sender cannot mark their own message read.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/messages/{message_id}/read"))
                .cookie(greg.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/messages/{message_id}/read"))
                .cookie(ada)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("read").and_then(Value::as_bool), Some(true));
    }

    #[actix_web::test]
    async fn non_participants_get_not_found() {
        let app = actix_test::init_service(test_app()).await;
        let (ada_id, _) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (_, greg) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;
        let (_, eve) = register_and_login(&app, "eve", "eve@example.com", "client").await;

        let sent = send(&app, &greg, ada_id, "how was the week?").await;
        let message_id = sent.get("id").and_then(Value::as_str).expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/messages/{message_id}/read"))
                .cookie(eve.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        // Listing is participant-scoped too.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/messages")
                .cookie(eve)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(0));
    }

    #[actix_web::test]
    async fn conversations_summarise_partners() {
        let app = actix_test::init_service(test_app()).await;
        let (ada_id, ada) = register_and_login(&app, "ada", "ada@example.com", "client").await;
        let (greg_id, greg) = register_and_login(&app, "greg", "greg@example.com", "therapist").await;

        send(&app, &greg, ada_id, "how was the week?").await;
        send(&app, &greg, ada_id, "remember the exercises").await;
        send(&app, &ada, greg_id, "pretty good!").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/messages/conversations")
                .cookie(ada)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let conversations = body.as_array().expect("array");
        assert_eq!(conversations.len(), 1);
        let conversation = &conversations[0];
        assert_eq!(
            conversation
                .get("partner")
                .and_then(|partner| partner.get("username"))
                .and_then(Value::as_str),
            Some("greg")
        );
        assert_eq!(
            conversation.get("unreadCount").and_then(Value::as_i64),
            Some(2)
        );
        assert_eq!(
            conversation
                .get("latestMessage")
                .and_then(|message| message.get("message"))
                .and_then(Value::as_str),
            Some("pretty good!")
        );
    }
}
