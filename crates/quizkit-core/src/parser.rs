//! Quiz file loading.
//!
//! Loads quiz definitions from TOML or JSON files and directories, runs them
//! through the schema validator, and lints validated quizzes for issues that
//! are legal but probably unintended.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ValidationConfig;
use crate::model::{AnswerParam, QuestionKind, Quiz};
use crate::schema::{validate, QuizDefinition};

/// Source format of a quiz definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizFormat {
    Toml,
    Json,
}

impl QuizFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(QuizFormat::Toml),
            "json" => Some(QuizFormat::Json),
            _ => None,
        }
    }
}

/// Parse and validate a quiz file; the format follows the extension.
pub fn parse_quiz(path: &Path, config: &ValidationConfig) -> Result<Quiz> {
    let format = QuizFormat::from_path(path)
        .with_context(|| format!("unsupported quiz file extension: {}", path.display()))?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, format, path, config)
}

/// Parse and validate quiz content (useful for testing).
pub fn parse_quiz_str(
    content: &str,
    format: QuizFormat,
    source_path: &Path,
    config: &ValidationConfig,
) -> Result<Quiz> {
    let definition: QuizDefinition = match format {
        QuizFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
        QuizFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
    };

    let quiz = validate(definition, config)
        .with_context(|| format!("invalid quiz: {}", source_path.display()))?;
    Ok(quiz)
}

/// Recursively load every `.toml` and `.json` quiz in a directory.
///
/// Files that fail to parse or validate are skipped with a warning.
pub fn load_quiz_directory(dir: &Path, config: &ValidationConfig) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path, config)?);
        } else if QuizFormat::from_path(&path).is_some() {
            match parse_quiz(&path, config) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Parse a JSON array of answer submissions.
pub fn parse_responses_str(content: &str) -> Result<Vec<AnswerParam>> {
    serde_json::from_str(content).context("failed to parse responses JSON")
}

/// Load a JSON responses file.
pub fn parse_responses(path: &Path) -> Result<Vec<AnswerParam>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses file: {}", path.display()))?;
    parse_responses_str(&content)
        .with_context(|| format!("invalid responses file: {}", path.display()))
}

/// A non-fatal finding about a valid quiz.
#[derive(Debug, Clone)]
pub struct LintWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a validated quiz for likely authoring mistakes.
pub fn lint_quiz(quiz: &Quiz) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    // Only some questions carry points
    let with_points = quiz.questions().iter().filter(|q| q.points.is_some()).count();
    if with_points > 0 && with_points < quiz.len() {
        for q in quiz.questions().iter().filter(|q| q.points.is_none()) {
            warnings.push(LintWarning {
                question_id: Some(q.id.clone()),
                message: "quiz is graded but this question has no points and never scores"
                    .into(),
            });
        }
    }

    for q in quiz.questions() {
        match &q.kind {
            QuestionKind::MultipleChoice { options, .. } if options.len() < 2 => {
                warnings.push(LintWarning {
                    question_id: Some(q.id.clone()),
                    message: format!(
                        "multiple-choice question has only {} option(s)",
                        options.len()
                    ),
                });
            }
            QuestionKind::ShortAnswer {
                validation_pattern: Some(_),
                ..
            } => {
                warnings.push(LintWarning {
                    question_id: Some(q.id.clone()),
                    message: "validationRegex grades this question; correctAnswer is display-only"
                        .into(),
                });
            }
            _ => {}
        }
    }

    // Question limits that can never run out before the quiz does
    if let Some(quiz_limit) = quiz.time_limit() {
        for q in quiz.questions() {
            if q.time_limit.is_some_and(|limit| limit > quiz_limit) {
                warnings.push(LintWarning {
                    question_id: Some(q.id.clone()),
                    message: format!(
                        "question time limit exceeds the quiz time limit of {quiz_limit}s"
                    ),
                });
            }
        }
    }

    if quiz.title().trim().is_empty() {
        warnings.push(LintWarning {
            question_id: None,
            message: "title is empty".into(),
        });
    }

    warnings
}
