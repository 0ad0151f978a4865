// src/utils/gemini.rs

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{config::GeminiConfig, error::AppError, models::quiz::QuizQuestion};

pub const QUESTION_COUNT: usize = 3;
pub const OPTION_COUNT: usize = 4;

const INVALID_FORMAT: &str = "Invalid response format from Gemini API.";
pub const MISSING_API_KEY: &str = "GEMINI_API_KEY is missing. Check your .env file.";

/// Result of one call to the quiz generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success { questions: Vec<QuizQuestion> },
    /// The generator answered, but not with a usable quiz.
    MalformedResponse(String),
    /// Transport error, timeout or non-2xx status.
    NetworkFailure(String),
}

impl GenerationOutcome {
    pub fn into_result(self) -> Result<Vec<QuizQuestion>, AppError> {
        match self {
            GenerationOutcome::Success { questions } => Ok(questions),
            GenerationOutcome::MalformedResponse(msg) => Err(AppError::UpstreamFormat(msg)),
            GenerationOutcome::NetworkFailure(msg) => Err(AppError::Upstream(msg)),
        }
    }
}

/// Produces quiz questions for a topic.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> GenerationOutcome;
}

/// Builds the instruction sent as the whole prompt.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "Generate a multiple-choice quiz on {topic} with {QUESTION_COUNT} questions. \
        Each question must have exactly {OPTION_COUNT} options, and the answer must be one of the options. \
        Provide the response in strict JSON format without markdown, code blocks, or extra formatting. \
        The JSON should follow this structure: \
        {{\"questions\": [{{\"question\": \"\", \"options\": [\"\", \"\", \"\", \"\"], \"answer\": \"\"}}]}}"
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

// Every level is optional; absence anywhere is a malformed response.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuizQuestion>,
}

/// Turns a raw `generateContent` body into an outcome.
pub fn interpret_response(body: &str) -> GenerationOutcome {
    let parsed: GenerateContentResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => return GenerationOutcome::MalformedResponse(INVALID_FORMAT.to_string()),
    };

    let text = parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.trim().is_empty());

    let Some(text) = text else {
        return GenerationOutcome::MalformedResponse(INVALID_FORMAT.to_string());
    };

    let payload: QuizPayload = match serde_json::from_str(&text) {
        Ok(payload) => payload,
        Err(e) => {
            return GenerationOutcome::MalformedResponse(format!(
                "Gemini API returned invalid quiz JSON: {}",
                e
            ));
        }
    };

    match validate_questions(&payload.questions) {
        Ok(()) => GenerationOutcome::Success {
            questions: payload.questions,
        },
        Err(msg) => GenerationOutcome::MalformedResponse(msg),
    }
}

/// Structural checks on generated questions before they reach clients.
pub fn validate_questions(questions: &[QuizQuestion]) -> Result<(), String> {
    if questions.is_empty() {
        return Err("Gemini API returned no questions.".to_string());
    }

    let mut seen = HashSet::new();
    for (idx, q) in questions.iter().enumerate() {
        let n = idx + 1;
        if q.question.trim().is_empty() {
            return Err(format!("Question {} has no text.", n));
        }
        if q.options.len() != OPTION_COUNT {
            return Err(format!(
                "Question {} has {} options, expected {}.",
                n,
                q.options.len(),
                OPTION_COUNT
            ));
        }
        if !q.options.contains(&q.answer) {
            return Err(format!("Question {} answer is not one of its options.", n));
        }
        if !seen.insert(q.question.as_str()) {
            return Err(format!("Question {} duplicates an earlier question.", n));
        }
    }
    Ok(())
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GeminiClient {
    /// Builds a client from configuration.
    ///
    /// Fails with `AppError::Configuration` when the API key is unset or the
    /// base URL does not parse.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, AppError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration(MISSING_API_KEY.to_string()))?;

        let mut endpoint = Url::parse(&config.base_url)
            .and_then(|base| {
                base.join(&format!("v1beta/models/{}:generateContent", config.model))
            })
            .map_err(|e| AppError::Configuration(format!("Invalid GEMINI_BASE_URL: {}", e)))?;
        endpoint.query_pairs_mut().append_pair("key", api_key);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl QuizGenerator for GeminiClient {
    async fn generate(&self, topic: &str) -> GenerationOutcome {
        let prompt = build_prompt(topic);
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let resp = match self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                // Strip the URL so the API key never reaches logs or clients.
                let e = e.without_url();
                tracing::error!("Gemini request failed: {:?}", e);
                return GenerationOutcome::NetworkFailure(format!(
                    "Gemini API request failed: {}",
                    e
                ));
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                return GenerationOutcome::NetworkFailure(format!(
                    "Gemini API response read failed: {}",
                    e.without_url()
                ));
            }
        };

        if !status.is_success() {
            return GenerationOutcome::NetworkFailure(format!(
                "Gemini API error: {} - {}",
                status, body
            ));
        }

        interpret_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    fn quiz_text() -> String {
        serde_json::json!({
            "questions": [
                {
                    "question": "Deepest ocean?",
                    "options": ["Pacific", "Atlantic", "Indian", "Arctic"],
                    "answer": "Pacific"
                },
                {
                    "question": "Saltiest sea?",
                    "options": ["Dead Sea", "Red Sea", "Baltic", "Caspian"],
                    "answer": "Dead Sea"
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn prompt_names_topic_and_shape() {
        let prompt = build_prompt("Oceans");
        assert!(prompt.contains("quiz on Oceans with 3 questions"));
        assert!(prompt.contains("exactly 4 options"));
        assert!(prompt.contains("\"questions\""));
    }

    #[test]
    fn well_formed_response_keeps_order() {
        let questions = match interpret_response(&wrap(&quiz_text())) {
            GenerationOutcome::Success { questions } => questions,
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Deepest ocean?");
        assert_eq!(questions[1].answer, "Dead Sea");
    }

    #[test]
    fn missing_candidates_is_malformed() {
        assert_eq!(
            interpret_response("{}"),
            GenerationOutcome::MalformedResponse(INVALID_FORMAT.to_string())
        );
        assert_eq!(
            interpret_response(r#"{"candidates": []}"#),
            GenerationOutcome::MalformedResponse(INVALID_FORMAT.to_string())
        );
        assert_eq!(
            interpret_response(r#"{"candidates": [{"content": {"parts": []}}]}"#),
            GenerationOutcome::MalformedResponse(INVALID_FORMAT.to_string())
        );
    }

    #[test]
    fn fenced_text_is_malformed() {
        let fenced = format!("```json\n{}\n```", quiz_text());
        assert!(matches!(
            interpret_response(&wrap(&fenced)),
            GenerationOutcome::MalformedResponse(_)
        ));
    }

    #[test]
    fn answer_outside_options_is_rejected() {
        let text = serde_json::json!({
            "questions": [{
                "question": "Deepest ocean?",
                "options": ["Pacific", "Atlantic", "Indian", "Arctic"],
                "answer": "Southern"
            }]
        })
        .to_string();
        let outcome = interpret_response(&wrap(&text));
        assert_eq!(
            outcome,
            GenerationOutcome::MalformedResponse(
                "Question 1 answer is not one of its options.".to_string()
            )
        );
    }

    #[test]
    fn wrong_option_count_and_duplicates_are_rejected() {
        let three = vec![QuizQuestion {
            question: "Q".to_string(),
            options: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            answer: "a".to_string(),
        }];
        assert!(validate_questions(&three).is_err());

        let four = QuizQuestion {
            question: "Q".to_string(),
            options: ["a", "b", "c", "d"].iter().map(ToString::to_string).collect(),
            answer: "a".to_string(),
        };
        assert!(validate_questions(std::slice::from_ref(&four)).is_ok());
        assert!(validate_questions(&[four.clone(), four]).is_err());
        assert!(validate_questions(&[]).is_err());
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let config = GeminiConfig {
            api_key: None,
            model: "m".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: std::time::Duration::from_secs(1),
        };
        match GeminiClient::from_config(&config) {
            Err(AppError::Configuration(msg)) => assert_eq!(msg, MISSING_API_KEY),
            Err(other) => panic!("expected configuration error, got {:?}", other),
            Ok(_) => panic!("client built without an API key"),
        }
    }
}
