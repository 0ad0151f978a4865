// src/models/quiz.rs

use std::{borrow::Cow, collections::HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, types::Json};
use validator::{Validate, ValidationError};

/// A generated multiple-choice question as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// One question inside a persisted attempt, with the user's pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    /// `None` when the user left the question unanswered.
    pub user_response: Option<String>,
}

/// Represents the 'quiz_attempts' table in the database.
/// `questions` is stored as a JSONB document array.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub topic: String,
    pub questions: Json<Vec<QuestionRecord>>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

/// An attempt ready to be written; id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub topic: String,
    pub questions: Vec<QuestionRecord>,
    pub score: i32,
}

/// DTO for requesting a generated quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = validate_topic),
        length(max = 200, message = "Quiz topic must be at most 200 characters")
    )]
    pub topic: String,
}

/// Reads an explicit `null` the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    if topic.trim().is_empty() {
        return Err(ValidationError::new("topic_required")
            .with_message(Cow::Borrowed("Quiz topic is required")));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateQuizResponse {
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
}

/// DTO for submitting answers.
///
/// Every field is optional on the wire so that a missing field is reported
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub topic: Option<String>,
    pub questions: Option<Vec<QuizQuestion>>,
    /// Key: question text. Value: the option the user picked, `null` when skipped.
    pub user_responses: Option<HashMap<String, Option<String>>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub message: String,
    pub score: i32,
}
