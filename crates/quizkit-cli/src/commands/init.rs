//! The `quizkit init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Starter files, relative to the target directory.
const STARTER_FILES: &[(&str, &str)] = &[
    ("quizkit.toml", SAMPLE_CONFIG),
    ("quizzes/example.toml", EXAMPLE_QUIZ),
];

pub fn execute(dir: PathBuf) -> Result<()> {
    for (relative, contents) in STARTER_FILES {
        if write_if_missing(&dir, relative, contents)? {
            println!("Created {relative}");
        } else {
            println!("{relative} already exists, skipping.");
        }
    }

    println!("\nNext steps:");
    println!("  1. Edit quizzes/example.toml");
    println!("  2. Run: quizkit validate --quiz quizzes/example.toml");
    println!("  3. Run: quizkit grade --quiz quizzes/example.toml --responses answers.json");

    Ok(())
}

/// Returns `false` when the file is already there and was left alone.
fn write_if_missing(dir: &Path, relative: &str, contents: &str) -> Result<bool> {
    let path = dir.join(relative);
    if path.exists() {
        tracing::debug!(path = %path.display(), "starter file kept");
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "starter file written");
    Ok(true)
}

const SAMPLE_CONFIG: &str = r#"# quizkit configuration

[validation]
# Reject multiple-choice questions whose correctAnswer is not one of the options
require_answers_in_options = true

[session]
# Move to the next question when a question's timer runs out
auto_advance = true
"#;

const EXAMPLE_QUIZ: &str = r#"title = "Example Quiz"
description = "A small quiz to get started"
timeLimit = 120

[[questions]]
id = "capital-france"
type = "multiple-choice"
text = "What is the capital of France?"
options = ["Paris", "Lyon", "Marseille"]
correctAnswer = "Paris"
explanation = "Paris has been the capital of France since 987."
points = 1

[[questions]]
id = "earth-flat"
type = "true-false"
text = "The Earth is flat."
correctAnswer = "false"
incorrectMessage = "The Earth is an oblate spheroid."
timeLimit = 20
points = 1

[[questions]]
id = "primes"
type = "multiple-choice"
text = "Select all prime numbers."
options = ["2", "4", "5", "9"]
correctAnswer = ["2", "5"]
points = 2
"#;
