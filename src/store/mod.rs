// src/store/mod.rs

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    message::{DirectMessage, NewDirectMessage},
    quiz::{NewQuizAttempt, QuizAttempt},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Driver failures; the message is surfaced to clients unchanged.
    #[error("{0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract for quiz attempts.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Writes one attempt document and returns it with id and timestamp set.
    async fn insert_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt, StoreError>;

    /// Fetches an attempt by id; `StoreError::NotFound` when missing.
    async fn find_attempt(&self, id: i64) -> Result<QuizAttempt, StoreError>;
}

/// Persistence contract for direct messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: NewDirectMessage) -> Result<DirectMessage, StoreError>;

    /// Flags a message as read and bumps `updated_at`.
    async fn mark_message_read(&self, id: i64) -> Result<DirectMessage, StoreError>;

    /// Messages exchanged between two users in either direction, oldest `date` first.
    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Vec<DirectMessage>, StoreError>;
}
