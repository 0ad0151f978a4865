// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use super::{MessageStore, QuizStore, StoreError};
use crate::models::{
    message::{DirectMessage, NewDirectMessage},
    quiz::{NewQuizAttempt, QuizAttempt},
};

fn conn(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound(e.to_string()),
        other => StoreError::Connection(other.to_string()),
    }
}

/// Postgres-backed store. Quiz questions live in a JSONB column.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn insert_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt, StoreError> {
        sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (topic, questions, score)
            VALUES ($1, $2, $3)
            RETURNING id, topic, questions, score, created_at
            "#,
        )
        .bind(attempt.topic)
        .bind(Json(attempt.questions))
        .bind(attempt.score)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)
    }

    async fn find_attempt(&self, id: i64) -> Result<QuizAttempt, StoreError> {
        sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT id, topic, questions, score, created_at
            FROM quiz_attempts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or_else(|| StoreError::NotFound(format!("Quiz attempt {} not found", id)))
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn insert_message(&self, message: NewDirectMessage) -> Result<DirectMessage, StoreError> {
        sqlx::query_as::<_, DirectMessage>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, message, date, is_read)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id, sender_id, receiver_id, message, date, is_read, created_at, updated_at
            "#,
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.message)
        .bind(message.date)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)
    }

    async fn mark_message_read(&self, id: i64) -> Result<DirectMessage, StoreError> {
        sqlx::query_as::<_, DirectMessage>(
            r#"
            UPDATE messages
            SET is_read = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, sender_id, receiver_id, message, date, is_read, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or_else(|| StoreError::NotFound(format!("Message {} not found", id)))
    }

    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Vec<DirectMessage>, StoreError> {
        sqlx::query_as::<_, DirectMessage>(
            r#"
            SELECT id, sender_id, receiver_id, message, date, is_read, created_at, updated_at
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)
    }
}
