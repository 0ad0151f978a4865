// src/utils/scoring.rs

use std::collections::{HashMap, HashSet};

use crate::{
    error::AppError,
    models::quiz::{QuestionRecord, QuizQuestion},
};

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedQuiz {
    pub records: Vec<QuestionRecord>,
    pub score: i32,
}

/// Grades `questions` against `responses`, keyed by exact question text.
///
/// * A `null` or empty response counts as unanswered (`user_response: None`).
/// * Matching is case-sensitive with no trimming.
/// * Duplicate question texts are rejected, since the key would be ambiguous.
pub fn grade(
    questions: Vec<QuizQuestion>,
    mut responses: HashMap<String, Option<String>>,
) -> Result<GradedQuiz, AppError> {
    let mut seen = HashSet::new();
    for q in &questions {
        if !seen.insert(q.question.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Duplicate question text: {}",
                q.question
            )));
        }
    }

    let mut score = 0;
    let records = questions
        .into_iter()
        .map(|q| {
            let user_response = responses
                .remove(&q.question)
                .flatten()
                .filter(|r| !r.is_empty());
            if user_response.as_deref() == Some(q.answer.as_str()) {
                score += 1;
            }
            QuestionRecord {
                question: q.question,
                options: q.options,
                correct_answer: q.answer,
                user_response,
            }
        })
        .collect();

    Ok(GradedQuiz { records, score })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, answer: &str) -> QuizQuestion {
        QuizQuestion {
            question: text.to_string(),
            options: vec![
                answer.to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            answer: answer.to_string(),
        }
    }

    fn responses(pairs: &[(&str, &str)]) -> HashMap<String, Option<String>> {
        pairs
            .iter()
            .map(|(q, a)| (q.to_string(), Some(a.to_string())))
            .collect()
    }

    #[test]
    fn counts_exact_matches_only() {
        let graded = grade(
            vec![question("Q1", "A"), question("Q2", "A"), question("Q3", "A")],
            responses(&[("Q1", "A"), ("Q2", "a"), ("Q3", "A ")]),
        )
        .unwrap();

        assert_eq!(graded.score, 1);
        assert_eq!(graded.records[1].user_response.as_deref(), Some("a"));
        assert_eq!(graded.records[2].correct_answer, "A");
    }

    #[test]
    fn score_matches_records() {
        let graded = grade(
            vec![question("Q1", "A"), question("Q2", "B"), question("Q3", "C")],
            responses(&[("Q1", "A"), ("Q3", "C"), ("unrelated", "A")]),
        )
        .unwrap();

        let recount = graded
            .records
            .iter()
            .filter(|r| r.user_response.as_deref() == Some(r.correct_answer.as_str()))
            .count();
        assert_eq!(graded.score as usize, recount);
        assert_eq!(graded.score, 2);
    }

    #[test]
    fn missing_and_empty_responses_are_unanswered() {
        let graded = grade(
            vec![question("Q1", "A"), question("Q2", "B")],
            responses(&[("Q2", "")]),
        )
        .unwrap();

        assert_eq!(graded.score, 0);
        assert!(graded.records.iter().all(|r| r.user_response.is_none()));
    }

    #[test]
    fn null_response_is_unanswered_and_others_still_score() {
        let mut picks = responses(&[("Q2", "B")]);
        picks.insert("Q1".to_string(), None);

        let graded = grade(vec![question("Q1", "A"), question("Q2", "B")], picks).unwrap();

        assert_eq!(graded.score, 1);
        assert_eq!(graded.records[0].user_response, None);
        assert_eq!(graded.records[1].user_response.as_deref(), Some("B"));
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let graded = grade(Vec::new(), HashMap::new()).unwrap();
        assert_eq!(graded.score, 0);
        assert!(graded.records.is_empty());
    }

    #[test]
    fn duplicate_question_text_is_rejected() {
        let result = grade(
            vec![question("Q1", "A"), question("Q1", "B")],
            responses(&[("Q1", "A")]),
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
