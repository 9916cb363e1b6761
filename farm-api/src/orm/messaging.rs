//! Direct messages between users.
//!
//! A conversation exists at most once per unordered pair of users; the
//! smaller id is always stored as `participant1_id`.

use chrono::Utc;
use diesel::prelude::*;

use crate::models::{Conversation, ConversationSummary, Message, NewConversation, NewMessage};
use crate::orm::last_insert_rowid;
use crate::schema::{conversations, messages};
use crate::tenancy::Actor;

/// Whether `sender` may start or continue a conversation with `recipient`.
///
/// A Global Admin may message anyone. Otherwise both users need a role, the
/// roles must differ, and both must belong to the same industry.
pub fn may_message(sender: &Actor, recipient: &Actor) -> bool {
    if sender.id == recipient.id {
        return false;
    }
    if sender.is_superuser {
        return true;
    }
    let (Some(from), Some(to)) = (sender.role, recipient.role) else {
        return false;
    };
    from != to && sender.industry_id.is_some() && sender.industry_id == recipient.industry_id
}

fn ordered_pair(a: i32, b: i32) -> (i32, i32) {
    if a < b { (a, b) } else { (b, a) }
}

pub fn find_conversation(
    conn: &mut SqliteConnection,
    user_a: i32,
    user_b: i32,
) -> QueryResult<Option<Conversation>> {
    let (first, second) = ordered_pair(user_a, user_b);
    conversations::table
        .filter(conversations::participant1_id.eq(first))
        .filter(conversations::participant2_id.eq(second))
        .first(conn)
        .optional()
}

pub fn get_or_create_conversation(
    conn: &mut SqliteConnection,
    user_a: i32,
    user_b: i32,
) -> QueryResult<Conversation> {
    if let Some(existing) = find_conversation(conn, user_a, user_b)? {
        return Ok(existing);
    }
    let (first, second) = ordered_pair(user_a, user_b);
    diesel::insert_into(conversations::table)
        .values(&NewConversation {
            participant1_id: first,
            participant2_id: second,
            last_message_at: None,
            created_at: Utc::now().naive_utc(),
        })
        .execute(conn)?;
    let id = last_insert_rowid(conn)?;
    conversations::table.find(id).first(conn)
}

pub fn get_conversation(
    conn: &mut SqliteConnection,
    conversation_id: i32,
) -> QueryResult<Option<Conversation>> {
    conversations::table
        .find(conversation_id)
        .first(conn)
        .optional()
}

/// The user's conversations, most recently active first.
pub fn list_conversations(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> QueryResult<Vec<ConversationSummary>> {
    let found: Vec<Conversation> = conversations::table
        .filter(
            conversations::participant1_id
                .eq(user_id)
                .or(conversations::participant2_id.eq(user_id)),
        )
        .order((
            conversations::last_message_at.desc(),
            conversations::id.desc(),
        ))
        .load(conn)?;

    found
        .into_iter()
        .map(|conversation| summarize(conn, conversation, user_id))
        .collect()
}

/// The conversation as `user_id` sees it.
pub fn summarize(
    conn: &mut SqliteConnection,
    conversation: Conversation,
    user_id: i32,
) -> QueryResult<ConversationSummary> {
    let unread_count = messages::table
        .filter(messages::conversation_id.eq(conversation.id))
        .filter(messages::sender_id.ne(user_id))
        .filter(messages::read_at.is_null())
        .count()
        .get_result(conn)?;
    Ok(ConversationSummary {
        other_participant_id: conversation.other_participant(user_id),
        conversation,
        unread_count,
    })
}

/// Appends a message to the pair's conversation, creating it if needed.
pub fn send_message(
    conn: &mut SqliteConnection,
    sender_id: i32,
    recipient_id: i32,
    content: String,
) -> QueryResult<Message> {
    conn.transaction(|conn| {
        let conversation = get_or_create_conversation(conn, sender_id, recipient_id)?;
        let now = Utc::now().naive_utc();
        diesel::insert_into(messages::table)
            .values(&NewMessage {
                conversation_id: conversation.id,
                sender_id,
                content,
                created_at: now,
            })
            .execute(conn)?;
        let id = last_insert_rowid(conn)?;

        diesel::update(conversations::table.find(conversation.id))
            .set(conversations::last_message_at.eq(Some(now)))
            .execute(conn)?;

        messages::table.find(id).first(conn)
    })
}

pub fn list_messages(conn: &mut SqliteConnection, conversation_id: i32) -> QueryResult<Vec<Message>> {
    messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .order((messages::created_at.asc(), messages::id.asc()))
        .load(conn)
}

pub fn get_message(conn: &mut SqliteConnection, message_id: i32) -> QueryResult<Option<Message>> {
    messages::table.find(message_id).first(conn).optional()
}

/// Sets `read_at` if it is not already set.
pub fn mark_read(conn: &mut SqliteConnection, message_id: i32) -> QueryResult<Message> {
    diesel::update(
        messages::table
            .find(message_id)
            .filter(messages::read_at.is_null()),
    )
    .set(messages::read_at.eq(Some(Utc::now().naive_utc())))
    .execute(conn)?;
    messages::table.find(message_id).first(conn)
}

/// Marks every message the other participant sent in the conversation as
/// read. Returns how many changed.
pub fn mark_conversation_read(
    conn: &mut SqliteConnection,
    conversation_id: i32,
    reader_id: i32,
) -> QueryResult<usize> {
    diesel::update(
        messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .filter(messages::sender_id.ne(reader_id))
            .filter(messages::read_at.is_null()),
    )
    .set(messages::read_at.eq(Some(Utc::now().naive_utc())))
    .execute(conn)
}

/// Every message in the user's conversations, newest first.
pub fn list_user_messages(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Vec<Message>> {
    let mine = conversations::table
        .filter(
            conversations::participant1_id
                .eq(user_id)
                .or(conversations::participant2_id.eq(user_id)),
        )
        .select(conversations::id);

    messages::table
        .filter(messages::conversation_id.eq_any(mine))
        .order((messages::created_at.desc(), messages::id.desc()))
        .load(conn)
}

/// Messages addressed to `user_id` that have not been read, oldest first.
pub fn list_unread_messages(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Vec<Message>> {
    let mine = conversations::table
        .filter(
            conversations::participant1_id
                .eq(user_id)
                .or(conversations::participant2_id.eq(user_id)),
        )
        .select(conversations::id);

    messages::table
        .filter(messages::conversation_id.eq_any(mine))
        .filter(messages::sender_id.ne(user_id))
        .filter(messages::read_at.is_null())
        .order((messages::created_at.asc(), messages::id.asc()))
        .load(conn)
}

/// Messages addressed to `user_id` that have not been read.
pub fn unread_count(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<i64> {
    let mine = conversations::table
        .filter(
            conversations::participant1_id
                .eq(user_id)
                .or(conversations::participant2_id.eq(user_id)),
        )
        .select(conversations::id);

    messages::table
        .filter(messages::conversation_id.eq_any(mine))
        .filter(messages::sender_id.ne(user_id))
        .filter(messages::read_at.is_null())
        .count()
        .get_result(conn)
}
