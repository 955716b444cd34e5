//! Answer correctness.
//!
//! Grading is a pure function of the question and the submission. A
//! submission whose shape does not fit the question is incorrect, never an
//! error.

use std::collections::BTreeSet;

use crate::model::{Answer, Question, QuestionKind, TrueFalse};

/// Decide whether `submitted` correctly answers `question`.
///
/// Submitted values are trimmed before comparison; comparison is
/// case-sensitive.
///
/// - Single correct value: the submission must be a single value equal to
///   it. A set-valued submission is always incorrect, even with one element.
/// - Set of correct values: the submission, read as a set, must contain
///   exactly the same values. Order and duplicates do not matter; a single
///   value counts as a one-element set.
/// - Short answer with a validation pattern: graded by whether the single
///   submitted value matches the pattern. `correctAnswer` is display-only in
///   that case.
/// - True/false: only the exact literals `"true"` and `"false"`.
pub fn evaluate(question: &Question, submitted: &Answer) -> bool {
    match &question.kind {
        QuestionKind::MultipleChoice { correct_answer, .. } => {
            matches_answer(correct_answer, submitted)
        }
        QuestionKind::TrueFalse { correct_answer } => {
            matches_true_false(*correct_answer, submitted)
        }
        QuestionKind::ShortAnswer {
            validation_pattern: Some(pattern),
            ..
        } => match submitted {
            Answer::Single(value) => pattern.is_match(value.trim()),
            Answer::Multiple(_) => false,
        },
        QuestionKind::ShortAnswer {
            validation_pattern: None,
            correct_answer,
        } => matches_answer(correct_answer, submitted),
    }
}

fn matches_answer(correct: &Answer, submitted: &Answer) -> bool {
    match (correct, submitted) {
        (Answer::Single(expected), Answer::Single(value)) => value.trim() == expected.as_str(),
        (Answer::Single(_), Answer::Multiple(_)) => false,
        (Answer::Multiple(expected), _) => {
            let submitted = submitted.trimmed_set();
            let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
            !submitted.is_empty() && submitted == expected
        }
    }
}

fn matches_true_false(correct: TrueFalse, submitted: &Answer) -> bool {
    match submitted {
        Answer::Single(value) => TrueFalse::from_literal(value.trim()) == Some(correct),
        Answer::Multiple(_) => false,
    }
}
