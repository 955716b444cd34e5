//! The `quizkit validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizkit_core::model::Quiz;
use quizkit_core::parser::{lint_quiz, LintWarning};

use super::{load_config, load_quizzes};

pub fn execute(
    quiz_path: PathBuf,
    config_path: Option<PathBuf>,
    deny_warnings: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let quizzes = load_quizzes(&quiz_path, &config.validation)?;

    let total_warnings: usize = quizzes.iter().map(report).sum();

    match total_warnings {
        0 => println!("All quizzes valid."),
        n if deny_warnings => anyhow::bail!("{n} warning(s) found with --deny-warnings"),
        n => println!("\n{n} warning(s) found."),
    }

    Ok(())
}

/// Print one quiz's header and lint findings; returns the finding count.
fn report(quiz: &Quiz) -> usize {
    let timing = quiz
        .time_limit()
        .map(|secs| format!(", {secs}s limit"))
        .unwrap_or_default();
    println!("Quiz: {} ({} questions{timing})", quiz.title(), quiz.len());

    let warnings = lint_quiz(quiz);
    for warning in &warnings {
        println!("  {}", format_warning(warning));
    }
    if !warnings.is_empty() {
        tracing::warn!(quiz = quiz.title(), warnings = warnings.len(), "lint findings");
    }
    warnings.len()
}

fn format_warning(warning: &LintWarning) -> String {
    match &warning.question_id {
        Some(id) => format!("[{id}] WARNING: {}", warning.message),
        None => format!("WARNING: {}", warning.message),
    }
}
