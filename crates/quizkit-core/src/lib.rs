//! quizkit-core — Quiz data model, validation, grading, and session state.
//!
//! A host deserializes an untrusted [`schema::QuizDefinition`], passes it
//! through [`schema::validate`] to obtain a [`model::Quiz`], and drives a
//! [`state::QuizState`] with answers, navigation, and timer ticks.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod schema;
pub mod scoring;
pub mod state;
pub mod timer;

pub use config::{QuizkitConfig, SessionConfig, ValidationConfig};
pub use error::{SessionError, ValidationError, ValidationIssue};
pub use evaluator::evaluate;
pub use model::{Answer, AnswerParam, Question, QuestionKind, Quiz, QuizStatus, UserResponse};
pub use state::{QuizState, TimerTransition};
