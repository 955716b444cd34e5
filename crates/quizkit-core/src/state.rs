//! Quiz session state.
//!
//! A [`QuizState`] is created idle from a validated [`Quiz`], started once,
//! and finished once. Every mutating operation either succeeds completely or
//! returns a [`SessionError`] and leaves the state untouched. Time moves
//! only through [`QuizState::tick`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::evaluator::evaluate;
use crate::model::{
    AnswerParam, FinishReason, Question, Quiz, QuizStatus, SetQuestionTimerParam, UserResponse,
};
use crate::scoring::{aggregate_score, summarize, ScoreSummary};
use crate::timer::Countdown;

/// The single downstream effect of a timer running out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TimerTransition {
    /// A non-final question's timer expired. `advanced_to` is the new
    /// current index, or `None` when auto-advance is disabled.
    #[serde(rename_all = "camelCase")]
    QuestionExpired {
        question_id: String,
        advanced_to: Option<usize>,
    },
    /// The session finished because a timer expired.
    Finished { reason: FinishReason },
}

/// State of one quiz-taking session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
    session_id: Uuid,
    quiz_data: Quiz,
    status: QuizStatus,
    current_question_index: usize,
    max_visible_question_index: usize,
    user_responses: Vec<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timer: Option<Countdown>,
    question_timers: BTreeMap<String, Countdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_question_timer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<FinishReason>,
    #[serde(skip)]
    config: SessionConfig,
}

impl QuizState {
    /// Create an idle session positioned on the first question.
    pub fn new(quiz: Quiz, config: SessionConfig) -> Self {
        let score = aggregate_score(quiz.questions(), &[]);
        let timer = quiz.time_limit().map(Countdown::new);
        Self {
            session_id: Uuid::new_v4(),
            quiz_data: quiz,
            status: QuizStatus::Idle,
            current_question_index: 1,
            max_visible_question_index: 1,
            user_responses: Vec::new(),
            score,
            timer,
            question_timers: BTreeMap::new(),
            active_question_timer: None,
            started_at: None,
            finished_at: None,
            finish_reason: None,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// `idle` → `started`. Arms the overall timer and the current question's
    /// timer.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.status {
            QuizStatus::Idle => {}
            QuizStatus::Started => return Err(SessionError::AlreadyStarted),
            QuizStatus::Finished => return Err(SessionError::AlreadyFinished),
        }
        self.status = QuizStatus::Started;
        self.started_at = Some(Utc::now());
        self.activate_question_timer(self.current_question_index);
        tracing::info!(session = %self.session_id, title = self.quiz_data.title(), "quiz started");
        Ok(())
    }

    /// `started` → `finished`, on request.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        match self.status {
            QuizStatus::Idle => Err(SessionError::NotStarted),
            QuizStatus::Finished => Err(SessionError::AlreadyFinished),
            QuizStatus::Started => {
                self.finish_with(FinishReason::Explicit);
                Ok(())
            }
        }
    }

    fn finish_with(&mut self, reason: FinishReason) {
        self.status = QuizStatus::Finished;
        self.finished_at = Some(Utc::now());
        self.finish_reason = Some(reason);
        self.active_question_timer = None;
        tracing::info!(
            session = %self.session_id,
            ?reason,
            score = ?self.score,
            "quiz finished"
        );
    }

    // -----------------------------------------------------------------------
    // Answers
    // -----------------------------------------------------------------------

    /// Grade and record an answer, replacing any earlier answer to the same
    /// question, and recompute the score.
    pub fn answer(&mut self, param: AnswerParam) -> Result<&UserResponse, SessionError> {
        match self.status {
            QuizStatus::Idle => return Err(SessionError::NotStarted),
            QuizStatus::Finished => return Err(SessionError::AlreadyFinished),
            QuizStatus::Started => {}
        }
        let question = self
            .quiz_data
            .question(&param.question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(param.question_id.clone()))?;

        let is_correct = evaluate(question, &param.selected_answer);
        tracing::debug!(question = %param.question_id, is_correct, "answer recorded");

        let response = UserResponse {
            question_id: param.question_id,
            selected_answer: param.selected_answer,
            is_correct,
        };
        let position = match self
            .user_responses
            .iter()
            .position(|r| r.question_id == response.question_id)
        {
            Some(pos) => {
                self.user_responses[pos] = response;
                pos
            }
            None => {
                self.user_responses.push(response);
                self.user_responses.len() - 1
            }
        };
        self.score = aggregate_score(self.quiz_data.questions(), &self.user_responses);

        Ok(&self.user_responses[position])
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Move to a 1-based question index.
    ///
    /// Raises the visible high-water mark and hands the single question
    /// timer slot over to the new question. Navigation stays available after
    /// the quiz is finished, but no timer runs then.
    pub fn set_current_question_index(&mut self, index: usize) -> Result<(), SessionError> {
        let count = self.quiz_data.len();
        if index == 0 || index > count {
            return Err(SessionError::IndexOutOfRange { index, count });
        }
        if index != self.current_question_index {
            self.active_question_timer = None;
            self.current_question_index = index;
            if self.status == QuizStatus::Started {
                self.activate_question_timer(index);
            }
            tracing::debug!(index, "current question changed");
        }
        self.max_visible_question_index = self.max_visible_question_index.max(index);
        Ok(())
    }

    pub fn next_question(&mut self) -> Result<(), SessionError> {
        self.set_current_question_index(self.current_question_index + 1)
    }

    pub fn previous_question(&mut self) -> Result<(), SessionError> {
        self.set_current_question_index(self.current_question_index - 1)
    }

    /// Start or resume the timer of the question at `index`, if it has one.
    fn activate_question_timer(&mut self, index: usize) {
        let Some(question) = self.quiz_data.question_at(index) else {
            return;
        };
        if let Some(limit) = question.time_limit {
            self.question_timers
                .entry(question.id.clone())
                .or_insert_with(|| Countdown::new(limit));
        }
        if self.question_timers.contains_key(&question.id) {
            self.active_question_timer = Some(question.id.clone());
        }
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Override one question's remaining time. Does not fire expiry.
    pub fn set_question_timer(&mut self, param: SetQuestionTimerParam) -> Result<(), SessionError> {
        let position = self
            .quiz_data
            .position_of(&param.question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(param.question_id.clone()))?;

        self.question_timers
            .entry(param.question_id.clone())
            .and_modify(|c| c.set(param.timer))
            .or_insert_with(|| Countdown::new(param.timer));
        if self.status == QuizStatus::Started && position == self.current_question_index {
            self.active_question_timer = Some(param.question_id);
        }
        Ok(())
    }

    /// Override the overall remaining time. Does not fire expiry.
    pub fn set_quiz_timer(&mut self, seconds: u64) {
        match &mut self.timer {
            Some(timer) => timer.set(seconds),
            None => self.timer = Some(Countdown::new(seconds)),
        }
    }

    /// Advance the running timers by `elapsed_secs`.
    ///
    /// Only counts while started. Produces at most one transition: overall
    /// expiry finishes the quiz; otherwise expiry of the final question
    /// finishes it; otherwise expiry of the current question moves on to the
    /// next one when auto-advance is enabled.
    pub fn tick(&mut self, elapsed_secs: u64) -> Option<TimerTransition> {
        if self.status != QuizStatus::Started {
            return None;
        }

        let quiz_expired = self.timer.as_mut().is_some_and(|t| t.tick(elapsed_secs));
        let question_expired = match &self.active_question_timer {
            Some(id) => self
                .question_timers
                .get_mut(id)
                .is_some_and(|t| t.tick(elapsed_secs))
                .then(|| id.clone()),
            None => None,
        };

        if quiz_expired {
            self.finish_with(FinishReason::QuizTimeExpired);
            return Some(TimerTransition::Finished {
                reason: FinishReason::QuizTimeExpired,
            });
        }

        let question_id = question_expired?;
        tracing::debug!(question = %question_id, "question timer expired");

        if self.current_question_index == self.quiz_data.len() {
            self.finish_with(FinishReason::QuestionTimeExpired);
            return Some(TimerTransition::Finished {
                reason: FinishReason::QuestionTimeExpired,
            });
        }

        let advanced_to = if self.config.auto_advance {
            let next = self.current_question_index + 1;
            self.set_current_question_index(next).ok().map(|_| next)
        } else {
            None
        };
        Some(TimerTransition::QuestionExpired {
            question_id,
            advanced_to,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz_data
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == QuizStatus::Finished
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn max_visible_question_index(&self) -> usize {
        self.max_visible_question_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz_data.question_at(self.current_question_index)
    }

    pub fn user_responses(&self) -> &[UserResponse] {
        &self.user_responses
    }

    pub fn response_for(&self, question_id: &str) -> Option<&UserResponse> {
        self.user_responses
            .iter()
            .find(|r| r.question_id == question_id)
    }

    /// `None` for an ungraded quiz.
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    /// Overall remaining seconds, if the quiz has a timer.
    pub fn timer(&self) -> Option<u64> {
        self.timer.map(|t| t.remaining())
    }

    /// Remaining seconds of a question's timer, once it has been started
    /// or set.
    pub fn question_timer(&self, question_id: &str) -> Option<u64> {
        self.question_timers.get(question_id).map(Countdown::remaining)
    }

    pub fn question_timers(&self) -> impl Iterator<Item = (&str, u64)> {
        self.question_timers
            .iter()
            .map(|(id, c)| (id.as_str(), c.remaining()))
    }

    /// Id of the one question whose timer is counting down, if any.
    pub fn active_question_timer(&self) -> Option<&str> {
        self.active_question_timer.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn summary(&self) -> ScoreSummary {
        summarize(self.quiz_data.questions(), &self.user_responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::model::Answer;
    use crate::schema::validate_value;
    use serde_json::json;

    fn quiz(value: serde_json::Value) -> Quiz {
        validate_value(value, &ValidationConfig::default()).unwrap()
    }

    /// Q1 (1 point, "A"), Q2 (2 points, ["B","C"]).
    fn graded_quiz() -> Quiz {
        quiz(json!({
            "title": "Graded",
            "questions": [
                { "id": "q1", "type": "multiple-choice", "text": "One?",
                  "options": ["A", "B"], "correctAnswer": "A", "points": 1 },
                { "id": "q2", "type": "multiple-choice", "text": "Two?",
                  "options": ["A", "B", "C"], "correctAnswer": ["B", "C"], "points": 2 }
            ]
        }))
    }

    fn timed_quiz(quiz_limit: Option<u64>) -> Quiz {
        let mut v = json!({
            "title": "Timed",
            "questions": [
                { "id": "t1", "type": "true-false", "text": "1",
                  "correctAnswer": "true", "timeLimit": 10 },
                { "id": "t2", "type": "true-false", "text": "2", "correctAnswer": "false" },
                { "id": "t3", "type": "true-false", "text": "3",
                  "correctAnswer": "true", "timeLimit": 5 }
            ]
        });
        if let Some(limit) = quiz_limit {
            v["timeLimit"] = json!(limit);
        }
        quiz(v)
    }

    fn started(quiz: Quiz) -> QuizState {
        let mut state = QuizState::new(quiz, SessionConfig::default());
        state.start().unwrap();
        state
    }

    #[test]
    fn new_state_is_idle_on_first_question() {
        let state = QuizState::new(graded_quiz(), SessionConfig::default());
        assert_eq!(state.status(), QuizStatus::Idle);
        assert_eq!(state.current_question_index(), 1);
        assert_eq!(state.max_visible_question_index(), 1);
        assert_eq!(state.score(), Some(0));
        assert!(state.user_responses().is_empty());
        assert!(state.started_at().is_none());
    }

    #[test]
    fn score_follows_latest_answers() {
        let mut state = started(graded_quiz());
        state.answer(AnswerParam::new("q1", "A")).unwrap();
        assert_eq!(state.score(), Some(1));
        state.answer(AnswerParam::new("q2", vec!["C", "B"])).unwrap();
        assert_eq!(state.score(), Some(3));
        let response = state.answer(AnswerParam::new("q1", "X")).unwrap();
        assert!(!response.is_correct);
        assert_eq!(state.score(), Some(2));
        assert_eq!(state.user_responses().len(), 2);
        assert_eq!(
            state.response_for("q1").map(|r| &r.selected_answer),
            Some(&Answer::Single("X".into()))
        );
    }

    #[test]
    fn ungraded_quiz_score_stays_absent() {
        let mut state = started(quiz(json!({
            "title": "Ungraded",
            "questions": [
                { "id": "a", "type": "short-answer", "text": "?", "correctAnswer": "x" },
                { "id": "b", "type": "short-answer", "text": "?", "correctAnswer": "y" }
            ]
        })));
        assert_eq!(state.score(), None);
        state.answer(AnswerParam::new("a", "x")).unwrap();
        state.answer(AnswerParam::new("b", "y")).unwrap();
        assert_eq!(state.score(), None);
        assert_eq!(state.summary().correct, 2);
    }

    #[test]
    fn answer_after_finish_is_rejected_without_change() {
        let mut state = started(graded_quiz());
        state.answer(AnswerParam::new("q1", "A")).unwrap();
        state.finish().unwrap();
        let before = state.user_responses().to_vec();

        let err = state.answer(AnswerParam::new("q2", vec!["B", "C"])).unwrap_err();
        assert_eq!(err, SessionError::AlreadyFinished);
        assert_eq!(state.user_responses(), before.as_slice());
        assert_eq!(state.score(), Some(1));
        assert_eq!(state.status(), QuizStatus::Finished);
        assert_eq!(state.finish_reason(), Some(FinishReason::Explicit));
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut state = started(graded_quiz());
        let err = state.answer(AnswerParam::new("nope", "A")).unwrap_err();
        assert_eq!(err, SessionError::UnknownQuestion("nope".into()));
        assert!(state.user_responses().is_empty());

        let err = state
            .set_question_timer(SetQuestionTimerParam {
                question_id: "nope".into(),
                timer: 3,
            })
            .unwrap_err();
        assert_eq!(err, SessionError::UnknownQuestion("nope".into()));
        assert_eq!(state.question_timers().count(), 0);
    }

    #[test]
    fn answer_before_start_is_rejected() {
        let mut state = QuizState::new(graded_quiz(), SessionConfig::default());
        assert_eq!(
            state.answer(AnswerParam::new("q1", "A")).unwrap_err(),
            SessionError::NotStarted
        );
    }

    #[test]
    fn lifecycle_only_moves_forward() {
        let mut state = QuizState::new(graded_quiz(), SessionConfig::default());
        assert_eq!(state.finish().unwrap_err(), SessionError::NotStarted);
        state.start().unwrap();
        assert_eq!(state.start().unwrap_err(), SessionError::AlreadyStarted);
        state.finish().unwrap();
        assert_eq!(state.start().unwrap_err(), SessionError::AlreadyFinished);
        assert_eq!(state.finish().unwrap_err(), SessionError::AlreadyFinished);
        assert!(state.finished_at().is_some());
    }

    #[test]
    fn high_water_mark_never_decreases() {
        let mut state = started(timed_quiz(None));
        state.set_current_question_index(3).unwrap();
        state.set_current_question_index(1).unwrap();
        assert_eq!(state.current_question_index(), 1);
        assert_eq!(state.max_visible_question_index(), 3);
        state.next_question().unwrap();
        assert_eq!(state.max_visible_question_index(), 3);
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        let mut state = started(timed_quiz(None));
        assert_eq!(
            state.set_current_question_index(4).unwrap_err(),
            SessionError::IndexOutOfRange { index: 4, count: 3 }
        );
        assert!(state.previous_question().is_err());
        assert_eq!(state.current_question_index(), 1);
    }

    #[test]
    fn switching_questions_swaps_the_active_timer() {
        let mut state = started(timed_quiz(None));
        assert_eq!(state.active_question_timer(), Some("t1"));
        state.tick(4);
        assert_eq!(state.question_timer("t1"), Some(6));

        // t2 has no limit: nothing runs.
        state.next_question().unwrap();
        assert_eq!(state.active_question_timer(), None);
        state.tick(2);
        assert_eq!(state.question_timer("t1"), Some(6));

        state.set_current_question_index(3).unwrap();
        assert_eq!(state.active_question_timer(), Some("t3"));
        state.tick(1);
        assert_eq!(state.question_timer("t3"), Some(4));
        assert_eq!(state.question_timer("t1"), Some(6));

        // Going back resumes where t1 left off.
        state.set_current_question_index(1).unwrap();
        assert_eq!(state.active_question_timer(), Some("t1"));
        state.tick(1);
        assert_eq!(state.question_timer("t1"), Some(5));
        assert_eq!(state.question_timer("t3"), Some(4));
    }

    #[test]
    fn question_timers_are_populated_lazily() {
        let state = started(timed_quiz(None));
        assert_eq!(state.question_timer("t1"), Some(10));
        assert_eq!(state.question_timer("t3"), None);
    }

    #[test]
    fn idle_state_ignores_ticks() {
        let mut state = QuizState::new(timed_quiz(Some(30)), SessionConfig::default());
        assert_eq!(state.tick(100), None);
        assert_eq!(state.timer(), Some(30));
    }

    #[test]
    fn question_expiry_auto_advances_once() {
        let mut state = started(timed_quiz(None));
        assert_eq!(state.tick(9), None);
        assert_eq!(
            state.tick(1),
            Some(TimerTransition::QuestionExpired {
                question_id: "t1".into(),
                advanced_to: Some(2),
            })
        );
        assert_eq!(state.current_question_index(), 2);

        state.set_current_question_index(1).unwrap();
        assert_eq!(state.tick(1), None);
        assert_eq!(state.current_question_index(), 1);
    }

    #[test]
    fn question_expiry_without_auto_advance_only_reports() {
        let mut state = QuizState::new(timed_quiz(None), SessionConfig { auto_advance: false });
        state.start().unwrap();
        assert_eq!(
            state.tick(10),
            Some(TimerTransition::QuestionExpired {
                question_id: "t1".into(),
                advanced_to: None,
            })
        );
        assert_eq!(state.current_question_index(), 1);
        assert_eq!(state.tick(1), None);
    }

    #[test]
    fn final_question_expiry_finishes() {
        let mut state = started(timed_quiz(None));
        state.set_current_question_index(3).unwrap();
        assert_eq!(
            state.tick(5),
            Some(TimerTransition::Finished {
                reason: FinishReason::QuestionTimeExpired,
            })
        );
        assert!(state.is_finished());
        assert_eq!(state.active_question_timer(), None);
        assert_eq!(state.tick(5), None);
    }

    #[test]
    fn quiz_timer_expiry_wins_over_question_expiry() {
        let mut state = started(timed_quiz(Some(10)));
        assert_eq!(
            state.tick(10),
            Some(TimerTransition::Finished {
                reason: FinishReason::QuizTimeExpired,
            })
        );
        assert_eq!(state.current_question_index(), 1);
        assert_eq!(state.finish_reason(), Some(FinishReason::QuizTimeExpired));
        assert_eq!(
            state.answer(AnswerParam::new("t1", "true")).unwrap_err(),
            SessionError::AlreadyFinished
        );
    }

    #[test]
    fn quiz_timer_runs_alongside_question_timer() {
        let mut state = started(timed_quiz(Some(60)));
        state.tick(3);
        assert_eq!(state.timer(), Some(57));
        assert_eq!(state.question_timer("t1"), Some(7));
    }

    #[test]
    fn set_question_timer_overrides_and_activates() {
        let mut state = started(timed_quiz(None));
        state
            .set_question_timer(SetQuestionTimerParam {
                question_id: "t1".into(),
                timer: 2,
            })
            .unwrap();
        assert_eq!(state.question_timer("t1"), Some(2));

        // A question without its own limit gets a timer once one is set.
        state
            .set_question_timer(SetQuestionTimerParam {
                question_id: "t2".into(),
                timer: 3,
            })
            .unwrap();
        state.next_question().unwrap();
        assert_eq!(state.active_question_timer(), Some("t2"));
        assert_eq!(
            state.tick(3),
            Some(TimerTransition::QuestionExpired {
                question_id: "t2".into(),
                advanced_to: Some(3),
            })
        );
    }

    #[test]
    fn snapshot_serializes_for_hosts() {
        let mut state = started(graded_quiz());
        state.answer(AnswerParam::new("q1", "A")).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "started");
        assert_eq!(json["currentQuestionIndex"], 1);
        assert_eq!(json["score"], 1);
        assert_eq!(json["userResponses"][0]["isCorrect"], true);
        assert_eq!(json["quizData"]["questions"][1]["type"], "multiple-choice");
        assert!(json.get("config").is_none());
    }
}
