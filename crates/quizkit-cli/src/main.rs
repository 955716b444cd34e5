//! quizkit CLI — validate quiz definitions and grade response sets.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizkit", version, about = "Quiz definition validator and grader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quiz definition files
    Validate {
        /// Path to a .toml/.json quiz or a directory of quizzes
        #[arg(long)]
        quiz: PathBuf,

        /// Config file path (default: ./quizkit.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fail when any lint warning is reported
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Grade a set of responses against a quiz
    Grade {
        /// Path to a .toml/.json quiz
        #[arg(long)]
        quiz: PathBuf,

        /// JSON array of {"questionId", "selectedAnswer"} submissions
        #[arg(long)]
        responses: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path (default: ./quizkit.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init {
        /// Directory to create the starter files in
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizkit=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            quiz,
            config,
            deny_warnings,
        } => commands::validate::execute(quiz, config, deny_warnings),
        Commands::Grade {
            quiz,
            responses,
            format,
            config,
        } => commands::grade::execute(quiz, responses, format, config),
        Commands::Init { dir } => commands::init::execute(dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
