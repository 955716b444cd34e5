//! Error types for quiz validation and session operations.
//!
//! Validation errors carry field paths so hosts can point at the offending
//! part of a quiz definition. Session errors are caller mistakes (unknown
//! ids, out-of-order lifecycle calls) and never leave the state modified.

use std::fmt;

use thiserror::Error;

/// One problem found while validating a quiz definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field path into the definition, e.g. `questions[2].correctAnswer`.
    pub path: String,
    /// What the validator expected to find there.
    pub expected: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}", self.path, self.expected)
    }
}

/// Errors produced by the schema validator.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The input could not be read as a quiz definition at all.
    #[error("malformed quiz definition: {0}")]
    Malformed(String),

    /// The definition was readable but violated one or more rules.
    #[error("invalid quiz definition: {}", summarize(.issues))]
    Invalid { issues: Vec<ValidationIssue> },
}

impl ValidationError {
    /// The individual issues, empty for [`ValidationError::Malformed`].
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationError::Malformed(_) => &[],
            ValidationError::Invalid { issues } => issues,
        }
    }

    /// Returns `true` if some issue points at exactly `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues().iter().any(|i| i.path == path)
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    match issues {
        [] => "no issues recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// Rejections from [`QuizState`](crate::state::QuizState) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The quiz has not been started yet.
    #[error("quiz has not been started")]
    NotStarted,

    /// `start` was called on a session that already left `idle`.
    #[error("quiz has already been started")]
    AlreadyStarted,

    /// The session is finished; finished is terminal.
    #[error("quiz is already finished")]
    AlreadyFinished,

    /// No question with this id exists in the quiz.
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),

    /// A 1-based question index outside `1..=count`.
    #[error("question index {index} out of range (1..={count})")]
    IndexOutOfRange { index: usize, count: usize },
}

impl SessionError {
    /// Returns `true` for rejections caused by the session's lifecycle
    /// rather than by bad arguments.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            SessionError::NotStarted | SessionError::AlreadyStarted | SessionError::AlreadyFinished
        )
    }
}
