//! Score aggregation over a quiz's responses.
//!
//! A quiz where no question declares points is ungraded and its score is
//! `None`, which is not the same thing as a score of zero.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Question, UserResponse};

/// Latest correctness flag per question id. Later responses win.
fn latest_correctness(responses: &[UserResponse]) -> HashMap<&str, bool> {
    responses
        .iter()
        .map(|r| (r.question_id.as_str(), r.is_correct))
        .collect()
}

/// Sum the points of every correctly answered question.
///
/// Returns `None` when no question declares a point value. Questions without
/// points and unanswered questions contribute nothing.
pub fn aggregate_score(questions: &[Question], responses: &[UserResponse]) -> Option<u32> {
    if !questions.iter().any(|q| q.points.is_some()) {
        return None;
    }
    let latest = latest_correctness(responses);
    Some(
        questions
            .iter()
            .filter(|q| latest.get(q.id.as_str()).copied().unwrap_or(false))
            .filter_map(|q| q.points)
            .fold(0u32, u32::saturating_add),
    )
}

/// Highest achievable score, `None` for an ungraded quiz.
pub fn max_score(questions: &[Question]) -> Option<u32> {
    questions
        .iter()
        .filter_map(|q| q.points)
        .reduce(u32::saturating_add)
}

/// Progress and result overview of a response set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total_questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub score: Option<u32>,
    pub max_score: Option<u32>,
}

impl ScoreSummary {
    /// Fraction of all questions answered correctly.
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total_questions as f64
    }
}

/// Build a [`ScoreSummary`]. Responses for ids not in `questions` are ignored.
pub fn summarize(questions: &[Question], responses: &[UserResponse]) -> ScoreSummary {
    let latest = latest_correctness(responses);
    let answered: Vec<bool> = questions
        .iter()
        .filter_map(|q| latest.get(q.id.as_str()).copied())
        .collect();

    ScoreSummary {
        total_questions: questions.len(),
        answered: answered.len(),
        correct: answered.iter().filter(|c| **c).count(),
        score: aggregate_score(questions, responses),
        max_score: max_score(questions),
    }
}
