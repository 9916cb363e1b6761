use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{conversations, messages};

/// A two-party thread. `participant1_id` is always the smaller user id.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = conversations)]
#[ts(export)]
pub struct Conversation {
    pub id: i32,
    pub participant1_id: i32,
    pub participant2_id: i32,
    #[ts(type = "string | null")]
    pub last_message_at: Option<NaiveDateTime>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl Conversation {
    pub fn includes(&self, user_id: i32) -> bool {
        self.participant1_id == user_id || self.participant2_id == user_id
    }

    pub fn other_participant(&self, user_id: i32) -> i32 {
        if self.participant1_id == user_id {
            self.participant2_id
        } else {
            self.participant1_id
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub participant1_id: i32,
    pub participant2_id: i32,
    pub last_message_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(belongs_to(Conversation))]
#[diesel(table_name = messages)]
#[ts(export)]
pub struct Message {
    pub id: i32,
    pub conversation_id: i32,
    pub sender_id: i32,
    pub content: String,
    #[ts(type = "string | null")]
    pub read_at: Option<NaiveDateTime>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub conversation_id: i32,
    pub sender_id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
}

/// Request body for sending a message.
#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct MessageInput {
    pub recipient_id: i32,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub other_participant_id: i32,
    pub unread_count: i64,
}
