pub mod grade;
pub mod init;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use quizkit_core::config::{QuizkitConfig, ValidationConfig};
use quizkit_core::model::Quiz;
use quizkit_core::parser;

/// Settings for a command: the `--config` file, else `./quizkit.toml`, else
/// built-in defaults.
pub fn load_config(config_path: Option<&Path>) -> Result<QuizkitConfig> {
    let config = QuizkitConfig::load_or_default(config_path)?;
    tracing::debug!(
        require_answers_in_options = config.validation.require_answers_in_options,
        auto_advance = config.session.auto_advance,
        "configuration loaded"
    );
    Ok(config)
}

/// One quiz file, or every quiz under a directory.
pub fn load_quizzes(path: &Path, config: &ValidationConfig) -> Result<Vec<Quiz>> {
    let quizzes = if path.is_dir() {
        parser::load_quiz_directory(path, config)?
    } else {
        vec![parser::parse_quiz(path, config)?]
    };
    tracing::info!(path = %path.display(), count = quizzes.len(), "quizzes loaded");
    Ok(quizzes)
}
