// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{
        GenerateQuizRequest, GenerateQuizResponse, NewQuizAttempt, SubmitQuizRequest,
        SubmitQuizResponse,
    },
    store::QuizStore,
    utils::{
        gemini::{MISSING_API_KEY, QuizGenerator},
        scoring::grade,
    },
};

/// Generates a quiz for a topic through the external generator.
///
/// * Rejects a missing or blank topic before any network call.
/// * Fails with a configuration error when no generator is wired.
/// * Nothing is persisted.
pub async fn generate_quiz(
    State(generator): State<Option<Arc<dyn QuizGenerator>>>,
    payload: Result<Json<GenerateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let generator =
        generator.ok_or_else(|| AppError::Configuration(MISSING_API_KEY.to_string()))?;

    let questions = generator.generate(&req.topic).await.into_result()?;
    tracing::info!(topic = %req.topic, questions = questions.len(), "Quiz generated");

    Ok(Json(GenerateQuizResponse {
        topic: req.topic,
        questions,
    }))
}

/// Scores a submission and stores it as one quiz attempt.
///
/// Responses are matched to questions by exact question text.
pub async fn submit_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    payload: Result<Json<SubmitQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;

    let (Some(topic), Some(questions), Some(responses)) =
        (req.topic, req.questions, req.user_responses)
    else {
        return Err(AppError::BadRequest("Missing required data.".to_string()));
    };
    if topic.is_empty() {
        return Err(AppError::BadRequest("Missing required data.".to_string()));
    }

    let graded = grade(questions, responses)?;
    let score = graded.score;

    let attempt = store
        .insert_attempt(NewQuizAttempt {
            topic,
            questions: graded.records,
            score,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to save quiz attempt: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(id = attempt.id, topic = %attempt.topic, score, "Quiz submitted");

    Ok(Json(SubmitQuizResponse {
        message: "Quiz submitted successfully".to_string(),
        score,
    }))
}

/// Retrieves a stored quiz attempt by id.
pub async fn get_attempt(
    State(store): State<Arc<dyn QuizStore>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = store.find_attempt(id).await?;
    Ok(Json(attempt))
}
