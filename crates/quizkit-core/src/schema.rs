//! Quiz definition schema and validator.
//!
//! [`QuizDefinition`] is the untrusted shape a host deserializes from JSON,
//! TOML, or builds in code. [`validate`] is the only way to turn it into a
//! [`Quiz`]; once past it no downstream code re-checks shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ValidationConfig;
use crate::error::{ValidationError, ValidationIssue};
use crate::model::{Answer, AnswerPattern, Question, QuestionKind, Quiz, TrueFalse};

const KNOWN_TYPES: &str = r#"one of "multiple-choice", "true-false", "short-answer""#;

/// Untrusted quiz definition, as supplied by the host application.
///
/// Fields are held as raw values so that a missing or wrong-typed field is
/// reported with its path instead of failing deserialization. Only a
/// document that is not an object at all is malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub questions: Option<Value>,
    /// Overall time limit in seconds.
    #[serde(default)]
    pub time_limit: Option<Value>,
}

/// Untrusted question definition. `kind` carries the `type` tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDefinition {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub explanation: Option<Value>,
    #[serde(default)]
    pub incorrect_message: Option<Value>,
    #[serde(default)]
    pub time_limit: Option<Value>,
    #[serde(default)]
    pub points: Option<Value>,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub correct_answer: Option<Value>,
    #[serde(default)]
    pub validation_regex: Option<Value>,
}

/// Short rendering of an offending value for issue messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Array(_) => "an array".into(),
        Value::Object(_) => "an object".into(),
        scalar => scalar.to_string(),
    }
}

/// Finite, non-negative, integral, within `u32`.
fn whole(value: &Value) -> Option<u32> {
    let v = value.as_f64()?;
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
}

/// Accumulates issues so that one pass reports everything wrong.
#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, path: impl Into<String>, expected: impl Into<String>) {
        self.0.push(ValidationIssue {
            path: path.into(),
            expected: expected.into(),
        });
    }

    fn require<T>(&mut self, value: Option<T>, path: &str, expected: &str) -> Option<T> {
        if value.is_none() {
            self.push(path, expected);
        }
        value
    }

    fn string(&mut self, value: Value, path: &str) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            other => {
                self.push(path, format!("a string (found {})", describe(&other)));
                None
            }
        }
    }

    fn strings(&mut self, value: Value, path: &str) -> Option<Vec<String>> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                self.push(path, format!("an array of strings (found {})", describe(&other)));
                return None;
            }
        };
        let before = self.0.len();
        let strings: Vec<String> = items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| self.string(item, &format!("{path}[{i}]")))
            .collect();
        (self.0.len() == before).then_some(strings)
    }

    fn answer(&mut self, value: Value, path: &str) -> Option<Answer> {
        match value {
            Value::String(s) => Some(Answer::Single(s)),
            array @ Value::Array(_) => self.strings(array, path).map(Answer::Multiple),
            other => {
                self.push(
                    path,
                    format!("a string or an array of strings (found {})", describe(&other)),
                );
                None
            }
        }
    }

    fn points(&mut self, value: Value, path: &str) -> Option<u32> {
        let points = whole(&value);
        if points.is_none() {
            self.push(path, format!("a non-negative whole number (found {})", describe(&value)));
        }
        points
    }

    /// A time limit of zero would never count down, so it is rejected
    /// rather than treated as either "no limit" or "already expired".
    fn seconds(&mut self, value: Value, path: &str) -> Option<u64> {
        match whole(&value) {
            Some(0) | None => {
                self.push(
                    path,
                    format!("a positive whole number of seconds (found {})", describe(&value)),
                );
                None
            }
            Some(secs) => Some(u64::from(secs)),
        }
    }

    fn forbid<T>(&mut self, value: &Option<T>, path: &str, kind: &str) {
        if value.is_some() {
            self.push(path, format!("no such field on a {kind} question"));
        }
    }

    fn into_error(self) -> ValidationError {
        ValidationError::Invalid { issues: self.0 }
    }
}

/// Validate an untrusted definition into a [`Quiz`].
///
/// All issues are collected; the definition is either accepted whole or
/// rejected with every problem found.
pub fn validate(
    definition: QuizDefinition,
    config: &ValidationConfig,
) -> Result<Quiz, ValidationError> {
    let mut issues = Issues::default();

    let title = issues
        .require(definition.title, "title", "a string")
        .and_then(|v| issues.string(v, "title"));
    let description = definition
        .description
        .and_then(|v| issues.string(v, "description"));
    let time_limit = definition
        .time_limit
        .and_then(|v| issues.seconds(v, "timeLimit"));
    let questions_field =
        issues.require(definition.questions, "questions", "an array of questions");
    let question_values = match questions_field {
        Some(Value::Array(items)) if items.is_empty() => {
            issues.push("questions", "at least one question");
            Vec::new()
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            issues.push(
                "questions",
                format!("an array of questions (found {})", describe(&other)),
            );
            Vec::new()
        }
        None => Vec::new(),
    };

    let mut seen_ids = HashSet::new();
    let mut questions = Vec::with_capacity(question_values.len());
    for (index, value) in question_values.into_iter().enumerate() {
        let def = match value {
            object @ Value::Object(_) => serde_json::from_value::<QuestionDefinition>(object).ok(),
            _ => None,
        };
        let Some(def) = def else {
            issues.push(format!("questions[{index}]"), "a question object");
            continue;
        };
        if let Some(id) = def.id.as_ref().and_then(Value::as_str) {
            if !seen_ids.insert(id.to_string()) {
                issues.push(
                    format!("questions[{index}].id"),
                    format!("a unique question id (duplicate \"{id}\")"),
                );
            }
        }
        if let Some(question) = validate_question(index, def, config, &mut issues) {
            questions.push(question);
        }
    }

    match title {
        Some(title) if issues.0.is_empty() => {
            Ok(Quiz::new(title, description, questions, time_limit))
        }
        _ => {
            tracing::debug!(issues = issues.0.len(), "quiz definition rejected");
            Err(issues.into_error())
        }
    }
}

fn validate_question(
    index: usize,
    def: QuestionDefinition,
    config: &ValidationConfig,
    issues: &mut Issues,
) -> Option<Question> {
    let path = |field: &str| format!("questions[{index}].{field}");

    let id = issues
        .require(def.id, &path("id"), "a string")
        .and_then(|v| issues.string(v, &path("id")));
    let text = issues
        .require(def.text, &path("text"), "a string")
        .and_then(|v| issues.string(v, &path("text")));
    let image = def.image.and_then(|v| issues.string(v, &path("image")));
    let explanation = def
        .explanation
        .and_then(|v| issues.string(v, &path("explanation")));
    let incorrect_message = def
        .incorrect_message
        .and_then(|v| issues.string(v, &path("incorrectMessage")));
    let time_limit = def
        .time_limit
        .and_then(|v| issues.seconds(v, &path("timeLimit")));
    let points = def.points.and_then(|v| issues.points(v, &path("points")));

    let tag = match def.kind {
        Some(Value::String(tag)) => Some(tag),
        Some(other) => {
            issues.push(path("type"), format!("{KNOWN_TYPES} (found {})", describe(&other)));
            None
        }
        None => {
            issues.push(path("type"), KNOWN_TYPES);
            None
        }
    };

    let kind = match tag.as_deref() {
        Some("multiple-choice") => {
            issues.forbid(&def.validation_regex, &path("validationRegex"), "multiple-choice");
            let options = issues
                .require(def.options, &path("options"), "an array of option strings")
                .and_then(|v| issues.strings(v, &path("options")));
            let correct = issues
                .require(
                    def.correct_answer,
                    &path("correctAnswer"),
                    "a string or an array of strings",
                )
                .and_then(|v| issues.answer(v, &path("correctAnswer")));
            match (options, correct) {
                (Some(options), Some(correct)) => {
                    let before = issues.0.len();
                    if options.is_empty() {
                        issues.push(path("options"), "at least one option");
                    }
                    check_answer_not_empty(&correct, &path("correctAnswer"), issues);
                    if config.require_answers_in_options {
                        for value in correct.values() {
                            if !options.iter().any(|o| o == value) {
                                issues.push(
                                    path("correctAnswer"),
                                    format!(
                                        "a value drawn from options (\"{value}\" is not an option)"
                                    ),
                                );
                            }
                        }
                    }
                    (issues.0.len() == before).then_some(QuestionKind::MultipleChoice {
                        options,
                        correct_answer: correct,
                    })
                }
                _ => None,
            }
        }
        Some("true-false") => {
            issues.forbid(&def.options, &path("options"), "true-false");
            issues.forbid(&def.validation_regex, &path("validationRegex"), "true-false");
            let literal = match &def.correct_answer {
                Some(Value::String(s)) => TrueFalse::from_literal(s),
                _ => None,
            };
            if literal.is_none() {
                let expected = match &def.correct_answer {
                    Some(other) => format!(r#""true" or "false" (found {})"#, describe(other)),
                    None => r#""true" or "false""#.to_string(),
                };
                issues.push(path("correctAnswer"), expected);
            }
            literal.map(|correct_answer| QuestionKind::TrueFalse { correct_answer })
        }
        Some("short-answer") => {
            issues.forbid(&def.options, &path("options"), "short-answer");
            let pattern = match def.validation_regex {
                None => Some(None),
                Some(value) => issues
                    .string(value, &path("validationRegex"))
                    .and_then(|source| match AnswerPattern::new(&source) {
                        Ok(p) => Some(Some(p)),
                        Err(e) => {
                            issues.push(
                                path("validationRegex"),
                                format!("a valid regular expression ({e})"),
                            );
                            None
                        }
                    }),
            };
            let correct = issues
                .require(
                    def.correct_answer,
                    &path("correctAnswer"),
                    "a string or an array of strings",
                )
                .and_then(|v| issues.answer(v, &path("correctAnswer")));
            if let Some(correct) = &correct {
                check_answer_not_empty(correct, &path("correctAnswer"), issues);
            }
            match (pattern, correct) {
                (Some(validation_pattern), Some(correct_answer))
                    if !correct_answer.values().is_empty() =>
                {
                    Some(QuestionKind::ShortAnswer {
                        validation_pattern,
                        correct_answer,
                    })
                }
                _ => None,
            }
        }
        Some(other) => {
            issues.push(path("type"), format!("{KNOWN_TYPES} (found \"{other}\")"));
            None
        }
        None => None,
    };

    Some(Question {
        id: id?,
        text: text?,
        image,
        explanation,
        incorrect_message,
        time_limit,
        points,
        kind: kind?,
    })
}

fn check_answer_not_empty(answer: &Answer, path: &str, issues: &mut Issues) {
    if let Answer::Multiple(values) = answer {
        if values.is_empty() {
            issues.push(path, "at least one correct answer");
        }
    }
}

/// Validate a JSON quiz definition.
pub fn validate_json(content: &str, config: &ValidationConfig) -> Result<Quiz, ValidationError> {
    let definition: QuizDefinition =
        serde_json::from_str(content).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    validate(definition, config)
}

/// Validate an already-parsed JSON value.
pub fn validate_value(value: Value, config: &ValidationConfig) -> Result<Quiz, ValidationError> {
    let definition: QuizDefinition =
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    validate(definition, config)
}
