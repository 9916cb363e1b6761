//! Direct messaging between users.
//!
//! Conversations are only visible to their two participants; any other
//! caller gets 404. Who may message whom is decided by
//! [`may_message`](crate::orm::messaging::may_message).

use diesel::SqliteConnection;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::auth_guards::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{ConversationSummary, Message, MessageInput};
use crate::orm::DbConn;
use crate::orm::messaging::{
    get_conversation, get_message, get_or_create_conversation, list_conversations,
    list_messages, list_unread_messages, list_user_messages, mark_conversation_read, mark_read,
    may_message, send_message, summarize, unread_count,
};
use crate::orm::user::get_user_with_role;
use crate::tenancy::Actor;

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnreadCount {
    pub unread_count: i64,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarkedRead {
    pub marked_read: usize,
}

/// Request body for opening a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConversationRequest {
    pub recipient_id: i32,
}

/// The recipient as a messaging peer of `sender`. Unknown or inactive users
/// are a validation error, pairs that may not talk a permission error.
fn messaging_peer(
    conn: &mut SqliteConnection,
    sender: &Actor,
    recipient_id: i32,
) -> ApiResult<Actor> {
    let (recipient, role) = get_user_with_role(conn, recipient_id)?
        .filter(|(user, _)| user.is_active)
        .ok_or_else(|| ApiError::invalid("recipient_id", "Recipient not found."))?;
    let recipient = Actor::new(&recipient, role.as_ref());
    if !may_message(sender, &recipient) {
        return Err(ApiError::forbidden("You cannot message this user."));
    }
    Ok(recipient)
}

#[get("/messaging/conversations")]
pub async fn conversations(
    auth: AuthenticatedUser,
    db: DbConn,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let user_id = auth.user.id;
    Ok(Json(db.run(move |conn| list_conversations(conn, user_id)).await?))
}

/// Open Conversation endpoint.
///
/// - **URL:** `/api/messaging/conversations`
/// - **Method:** `POST`
///
/// ```json
/// {"recipient_id": 12}
/// ```
///
/// Returns the caller's conversation with the recipient, creating it
/// without a first message when needed.
#[post("/messaging/conversations", data = "<request>")]
pub async fn open_conversation(
    auth: AuthenticatedUser,
    db: DbConn,
    request: LoggedJson<ConversationRequest>,
) -> ApiResult<Json<ConversationSummary>> {
    let recipient_id = request.into_inner().recipient_id;
    let sender = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        let recipient = messaging_peer(conn, &sender, recipient_id)?;
        let conversation = get_or_create_conversation(conn, sender.id, recipient.id)?;
        Ok(Json(summarize(conn, conversation, sender.id)?))
    })
    .await
}

#[get("/messaging/conversations/<conversation_id>/messages")]
pub async fn conversation_messages(
    auth: AuthenticatedUser,
    db: DbConn,
    conversation_id: i32,
) -> ApiResult<Json<Vec<Message>>> {
    let user_id = auth.user.id;
    db.run(move |conn| -> ApiResult<_> {
        match get_conversation(conn, conversation_id)? {
            Some(conversation) if conversation.includes(user_id) => {
                Ok(Json(list_messages(conn, conversation_id)?))
            }
            _ => Err(ApiError::not_found("Conversation")),
        }
    })
    .await
}

/// Marks everything the other participant sent in the conversation as read.
#[post("/messaging/conversations/<conversation_id>/read")]
pub async fn read_conversation(
    auth: AuthenticatedUser,
    db: DbConn,
    conversation_id: i32,
) -> ApiResult<Json<MarkedRead>> {
    let user_id = auth.user.id;
    db.run(move |conn| -> ApiResult<_> {
        match get_conversation(conn, conversation_id)? {
            Some(conversation) if conversation.includes(user_id) => Ok(Json(MarkedRead {
                marked_read: mark_conversation_read(conn, conversation_id, user_id)?,
            })),
            _ => Err(ApiError::not_found("Conversation")),
        }
    })
    .await
}

/// Send Message endpoint.
///
/// - **URL:** `/api/messaging/messages`
/// - **Method:** `POST`
///
/// ```json
/// {"recipient_id": 12, "content": "The sprayer is back in the shed."}
/// ```
///
/// Opens the conversation with the recipient on first use. Answers 403
/// when the pair may not message each other.
#[post("/messaging/messages", data = "<request>")]
pub async fn send(
    auth: AuthenticatedUser,
    db: DbConn,
    request: LoggedJson<MessageInput>,
) -> ApiResult<status::Created<Json<Message>>> {
    let MessageInput {
        recipient_id,
        content,
    } = request.into_inner();
    if content.trim().is_empty() {
        return Err(ApiError::invalid("content", "This field may not be blank."));
    }
    let sender = auth.actor();

    let message = db
        .run(move |conn| -> ApiResult<_> {
            let recipient = messaging_peer(conn, &sender, recipient_id)?;
            Ok(send_message(conn, sender.id, recipient.id, content)?)
        })
        .await?;

    debug!(
        "User {} sent message {} in conversation {}",
        auth.user.id, message.id, message.conversation_id
    );
    let location = format!(
        "/api/messaging/conversations/{}/messages",
        message.conversation_id
    );
    Ok(status::Created::new(location).body(Json(message)))
}

/// Messages in any of the caller's conversations, newest first.
#[get("/messaging/messages")]
pub async fn my_messages(auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<Vec<Message>>> {
    let user_id = auth.user.id;
    Ok(Json(db.run(move |conn| list_user_messages(conn, user_id)).await?))
}

#[get("/messaging/messages/unread")]
pub async fn unread_messages(
    auth: AuthenticatedUser,
    db: DbConn,
) -> ApiResult<Json<Vec<Message>>> {
    let user_id = auth.user.id;
    Ok(Json(db.run(move |conn| list_unread_messages(conn, user_id)).await?))
}

/// Only the recipient may mark a message read.
#[post("/messaging/messages/<message_id>/read")]
pub async fn read_message(
    auth: AuthenticatedUser,
    db: DbConn,
    message_id: i32,
) -> ApiResult<Json<Message>> {
    let user_id = auth.user.id;
    db.run(move |conn| -> ApiResult<_> {
        let message = get_message(conn, message_id)?.ok_or_else(|| ApiError::not_found("Message"))?;
        let participant = get_conversation(conn, message.conversation_id)?
            .is_some_and(|c| c.includes(user_id));
        if !participant {
            return Err(ApiError::not_found("Message"));
        }
        if message.sender_id == user_id {
            return Err(ApiError::forbidden("You cannot mark your own message as read."));
        }
        Ok(Json(mark_read(conn, message_id)?))
    })
    .await
}

#[get("/messaging/unread-count")]
pub async fn unread(auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<UnreadCount>> {
    let user_id = auth.user.id;
    let unread_count = db.run(move |conn| unread_count(conn, user_id)).await?;
    Ok(Json(UnreadCount { unread_count }))
}

pub fn routes() -> Vec<Route> {
    routes![
        conversations,
        open_conversation,
        conversation_messages,
        read_conversation,
        send,
        my_messages,
        unread_messages,
        read_message,
        unread
    ]
}
