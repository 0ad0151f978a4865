// src/models/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'messages' table in the database.
/// A direct message between two users. Sender and receiver are opaque
/// user references and are not checked on write.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,

    /// Application-set send time, independent of the storage timestamps.
    pub date: DateTime<Utc>,

    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for storing a new message. Messages always start unread.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDirectMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    pub date: DateTime<Utc>,
}
