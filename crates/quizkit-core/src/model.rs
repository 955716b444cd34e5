//! Core data model types for quizkit.
//!
//! [`Quiz`] and [`Question`] are the validated, trusted forms of a quiz
//! definition. They can only be produced by [`crate::schema::validate`], so
//! they implement `Serialize` for hosts to render or persist but not
//! `Deserialize`.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

/// A submitted or expected answer: one value or a set of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(Vec<String>),
}

impl Answer {
    /// All values, in the order given.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Answer::Single(v) => vec![v.as_str()],
            Answer::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// The trimmed values as a set; order and duplicates are discarded.
    pub fn trimmed_set(&self) -> BTreeSet<&str> {
        self.values().into_iter().map(str::trim).collect()
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Answer::Multiple(_))
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Single(value.to_string())
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Answer::Single(value)
    }
}

impl From<Vec<&str>> for Answer {
    fn from(values: Vec<&str>) -> Self {
        Answer::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Single(v) => write!(f, "{v}"),
            Answer::Multiple(vs) => write!(f, "[{}]", vs.join(", ")),
        }
    }
}

/// The correct answer of a true/false question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrueFalse {
    True,
    False,
}

impl TrueFalse {
    /// Parses exactly `"true"` or `"false"`; nothing else is accepted.
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "true" => Some(TrueFalse::True),
            "false" => Some(TrueFalse::False),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrueFalse::True => "true",
            TrueFalse::False => "false",
        }
    }
}

impl fmt::Display for TrueFalse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled short-answer validation pattern. Serializes as its source.
#[derive(Debug, Clone)]
pub struct AnswerPattern(Regex);

impl AnswerPattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(AnswerPattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.0.is_match(input)
    }
}

impl PartialEq for AnswerPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for AnswerPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Kind-specific part of a question, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        options: Vec<String>,
        correct_answer: Answer,
    },
    #[serde(rename_all = "camelCase")]
    TrueFalse { correct_answer: TrueFalse },
    #[serde(rename_all = "camelCase")]
    ShortAnswer {
        #[serde(rename = "validationRegex", skip_serializing_if = "Option::is_none")]
        validation_pattern: Option<AnswerPattern>,
        correct_answer: Answer,
    },
}

impl QuestionKind {
    /// The `type` tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple-choice",
            QuestionKind::TrueFalse { .. } => "true-false",
            QuestionKind::ShortAnswer { .. } => "short-answer",
        }
    }
}

/// A validated question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within its quiz.
    pub id: String,
    /// The prompt shown to the user.
    pub text: String,
    /// Base64-encoded image or an image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorrect_message: Option<String>,
    /// Per-question time limit in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// A validated quiz. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_limit: Option<u64>,
}

impl Quiz {
    pub(crate) fn new(
        title: String,
        description: Option<String>,
        questions: Vec<Question>,
        time_limit: Option<u64>,
    ) -> Self {
        Self {
            title,
            description,
            questions,
            time_limit,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Overall time limit in seconds.
    pub fn time_limit(&self) -> Option<u64> {
        self.time_limit
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Question at a 1-based position.
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        index.checked_sub(1).and_then(|i| self.questions.get(i))
    }

    /// 1-based position of the question with this id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id).map(|i| i + 1)
    }

    /// A quiz is graded when at least one question declares points.
    pub fn is_graded(&self) -> bool {
        self.questions.iter().any(|q| q.points.is_some())
    }
}

/// The recorded, graded answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub question_id: String,
    pub selected_answer: Answer,
    pub is_correct: bool,
}

/// An answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerParam {
    pub question_id: String,
    pub selected_answer: Answer,
}

impl AnswerParam {
    pub fn new(question_id: impl Into<String>, selected_answer: impl Into<Answer>) -> Self {
        Self {
            question_id: question_id.into(),
            selected_answer: selected_answer.into(),
        }
    }
}

/// Override for one question's remaining time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuestionTimerParam {
    pub question_id: String,
    /// Remaining time in seconds.
    pub timer: u64,
}

/// Lifecycle status of a quiz session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Idle,
    Started,
    Finished,
}

impl fmt::Display for QuizStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizStatus::Idle => write!(f, "idle"),
            QuizStatus::Started => write!(f, "started"),
            QuizStatus::Finished => write!(f, "finished"),
        }
    }
}

/// Why a session reached `finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Explicit,
    QuizTimeExpired,
    QuestionTimeExpired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_deserializes_untagged() {
        let single: Answer = serde_json::from_str(r#""Paris""#).unwrap();
        assert_eq!(single, Answer::Single("Paris".into()));
        let many: Answer = serde_json::from_str(r#"["B","C"]"#).unwrap();
        assert_eq!(many, Answer::from(vec!["B", "C"]));
    }

    #[test]
    fn trimmed_set_ignores_order_and_duplicates() {
        let a = Answer::from(vec![" C", "B", "C "]);
        let b = Answer::from(vec!["B", "C"]);
        assert_eq!(a.trimmed_set(), b.trimmed_set());
    }

    #[test]
    fn true_false_literals_are_exact() {
        assert_eq!(TrueFalse::from_literal("true"), Some(TrueFalse::True));
        assert_eq!(TrueFalse::from_literal("false"), Some(TrueFalse::False));
        assert_eq!(TrueFalse::from_literal("TRUE"), None);
        assert_eq!(TrueFalse::from_literal("yes"), None);
    }

    #[test]
    fn question_serializes_with_type_tag() {
        let q = Question {
            id: "q1".into(),
            text: "Is Rust memory safe?".into(),
            image: None,
            explanation: None,
            incorrect_message: None,
            time_limit: Some(10),
            points: None,
            kind: QuestionKind::TrueFalse {
                correct_answer: TrueFalse::True,
            },
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "true-false");
        assert_eq!(json["correctAnswer"], "true");
        assert_eq!(json["timeLimit"], 10);
        assert!(json.get("points").is_none());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn short_answer_pattern_serializes_as_source() {
        let kind = QuestionKind::ShortAnswer {
            validation_pattern: Some(AnswerPattern::new("^4[0-9]$").unwrap()),
            correct_answer: Answer::Single("42".into()),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "short-answer");
        assert_eq!(json["validationRegex"], "^4[0-9]$");
    }

    #[test]
    fn quiz_positions_are_one_based() {
        let q = |id: &str| Question {
            id: id.into(),
            text: "?".into(),
            image: None,
            explanation: None,
            incorrect_message: None,
            time_limit: None,
            points: None,
            kind: QuestionKind::ShortAnswer {
                validation_pattern: None,
                correct_answer: Answer::Single("x".into()),
            },
        };
        let quiz = Quiz::new("t".into(), None, vec![q("a"), q("b")], None);
        assert_eq!(quiz.position_of("b"), Some(2));
        assert_eq!(quiz.question_at(1).map(|q| q.id.as_str()), Some("a"));
        assert!(quiz.question_at(0).is_none());
        assert!(quiz.question_at(3).is_none());
        assert!(!quiz.is_graded());
    }

    #[test]
    fn status_display() {
        assert_eq!(QuizStatus::Idle.to_string(), "idle");
        assert_eq!(QuizStatus::Finished.to_string(), "finished");
        assert_eq!(
            serde_json::to_string(&FinishReason::QuizTimeExpired).unwrap(),
            r#""quiz-time-expired""#
        );
    }
}
