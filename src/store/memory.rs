// src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{MessageStore, QuizStore, StoreError};
use crate::models::{
    message::{DirectMessage, NewDirectMessage},
    quiz::{NewQuizAttempt, QuizAttempt},
};

/// In-process store for tests and local prototyping.
/// Ids are assigned sequentially starting at 1.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    attempts: Arc<Mutex<Vec<QuizAttempt>>>,
    messages: Arc<Mutex<Vec<DirectMessage>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|e| StoreError::Connection(e.to_string()))
}

fn next_id(len: usize) -> Result<i64, StoreError> {
    i64::try_from(len + 1).map_err(|_| StoreError::Serialization("id overflow".to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored attempt, in insertion order.
    pub fn attempts(&self) -> Vec<QuizAttempt> {
        self.attempts
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuizStore for InMemoryStore {
    async fn insert_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt, StoreError> {
        let mut guard = lock(&self.attempts)?;
        let record = QuizAttempt {
            id: next_id(guard.len())?,
            topic: attempt.topic,
            questions: Json(attempt.questions),
            score: attempt.score,
            created_at: Utc::now(),
        };
        guard.push(record.clone());
        Ok(record)
    }

    async fn find_attempt(&self, id: i64) -> Result<QuizAttempt, StoreError> {
        let guard = lock(&self.attempts)?;
        guard
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Quiz attempt {} not found", id)))
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn insert_message(&self, message: NewDirectMessage) -> Result<DirectMessage, StoreError> {
        let mut guard = lock(&self.messages)?;
        let now = Utc::now();
        let record = DirectMessage {
            id: next_id(guard.len())?,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            message: message.message,
            date: message.date,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        guard.push(record.clone());
        Ok(record)
    }

    async fn mark_message_read(&self, id: i64) -> Result<DirectMessage, StoreError> {
        let mut guard = lock(&self.messages)?;
        let message = guard
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Message {} not found", id)))?;
        message.is_read = true;
        message.updated_at = Utc::now();
        Ok(message.clone())
    }

    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Vec<DirectMessage>, StoreError> {
        let guard = lock(&self.messages)?;
        let mut found: Vec<DirectMessage> = guard
            .iter()
            .filter(|m| {
                (m.sender_id == user_a && m.receiver_id == user_b)
                    || (m.sender_id == user_b && m.receiver_id == user_a)
            })
            .cloned()
            .collect();
        found.sort_by_key(|m| (m.date, m.id));
        Ok(found)
    }
}
