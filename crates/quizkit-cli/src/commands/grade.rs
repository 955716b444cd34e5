//! The `quizkit grade` command.
//!
//! Replays a response file through a fresh session, finishes it, and prints
//! the per-question outcome.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizkit_core::parser;
use quizkit_core::state::QuizState;

use super::load_config;

pub fn execute(
    quiz_path: PathBuf,
    responses_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let quiz = parser::parse_quiz(&quiz_path, &config.validation)?;
    let submissions = parser::parse_responses(&responses_path)?;
    tracing::info!(
        quiz = quiz.title(),
        submissions = submissions.len(),
        "grading responses"
    );

    let mut state = QuizState::new(quiz, config.session);
    state.start()?;
    for submission in submissions {
        let question_id = submission.question_id.clone();
        state
            .answer(submission)
            .with_context(|| format!("rejected response for question '{question_id}'"))?;
    }
    state.finish()?;
    tracing::debug!(session = %state.session_id(), "session replayed");

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        _ => print_text(&state),
    }

    Ok(())
}

fn print_text(state: &QuizState) {
    use comfy_table::{Cell, Table};

    let quiz = state.quiz();
    println!("Quiz: {}", quiz.title());

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Type", "Answer", "Result", "Points"]);

    for (i, question) in quiz.questions().iter().enumerate() {
        let response = state.response_for(&question.id);
        let answer = response
            .map(|r| r.selected_answer.to_string())
            .unwrap_or_else(|| "-".to_string());
        let result = match response {
            Some(r) if r.is_correct => "correct",
            Some(_) => "incorrect",
            None => "unanswered",
        };
        let points = match (question.points, response) {
            (Some(p), Some(r)) if r.is_correct => format!("{p}/{p}"),
            (Some(p), _) => format!("0/{p}"),
            (None, _) => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&question.id),
            Cell::new(question.kind.tag()),
            Cell::new(answer),
            Cell::new(result),
            Cell::new(points),
        ]);
    }

    println!("{table}");

    let summary = state.summary();
    println!("Correct: {}/{}", summary.correct, summary.total_questions);
    match (summary.score, summary.max_score) {
        (Some(score), Some(max)) => println!("Score: {score}/{max}"),
        _ => println!("Score: ungraded"),
    }
}
