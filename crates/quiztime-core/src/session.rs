//! The session controller: one in-progress quiz attempt.
//!
//! A [`QuizSession`] is created by [`QuizSession::start`] in the active state
//! and becomes submitted exactly once, either through [`QuizSession::submit`]
//! or when [`QuizSession::tick`] runs the countdown to zero. After that every
//! mutating call fails with [`SessionError::SessionClosed`].
//!
//! The session owns no timer. Whoever drives it calls `tick()` once per
//! second (see [`crate::timer`]).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;
use crate::model::{AnswerSheet, AttemptSubmission, Question, Quiz};

/// Notifications emitted by a session.
///
/// Front ends implement this to show toasts, navigate away, or log.
pub trait SessionHooks: Send + Sync {
    /// Called once, when the session is submitted.
    fn on_submitted(&self, _submission: &Submission) {}

    /// Called when the session is abandoned before submission.
    fn on_exit(&self, _session: &QuizSession) {}
}

/// Hooks that do nothing.
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}

/// Frozen snapshot of a submitted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub quiz_id: u64,
    pub question_count: usize,
    pub answers: AnswerSheet,
    /// Wall-clock seconds from start to submission.
    pub elapsed_secs: u64,
    /// `true` if the countdown triggered the submission.
    pub auto_submitted: bool,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// The payload for the quiz API's submit endpoint.
    pub fn to_attempt(&self) -> AttemptSubmission {
        AttemptSubmission {
            quiz_id: self.quiz_id,
            answers: self.answers.to_wire(self.question_count),
            time_taken: self.elapsed_secs,
        }
    }

    /// Number of questions left unanswered.
    pub fn unanswered_count(&self) -> usize {
        self.question_count.saturating_sub(self.answers.len())
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Submitted,
}

/// What a call to [`QuizSession::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The quiz has no time limit; nothing changed.
    Untimed,
    /// One second was consumed.
    Running { remaining_secs: u32 },
    /// The countdown reached zero and the session was submitted.
    AutoSubmitted(Submission),
    /// The session was already submitted; nothing changed.
    Closed,
}

/// Per-question status for a navigator view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorEntry {
    pub index: usize,
    pub answered: bool,
    pub current: bool,
}

/// One attempt at a quiz.
pub struct QuizSession {
    quiz: Arc<Quiz>,
    current: usize,
    answers: AnswerSheet,
    started_at: DateTime<Utc>,
    remaining_secs: Option<u32>,
    submission: Option<Submission>,
    clock: Arc<dyn Clock>,
    hooks: Arc<dyn SessionHooks>,
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id)
            .field("current", &self.current)
            .field("answers", &self.answers)
            .field("started_at", &self.started_at)
            .field("remaining_secs", &self.remaining_secs)
            .field("submitted", &self.submission.is_some())
            .finish()
    }
}

impl QuizSession {
    /// Start an attempt using the system clock and no hooks.
    pub fn start(quiz: impl Into<Arc<Quiz>>) -> Result<Self, SessionError> {
        Self::start_with(quiz, Arc::new(SystemClock), Arc::new(NoopHooks))
    }

    /// Start an attempt with an explicit clock and hooks.
    pub fn start_with(
        quiz: impl Into<Arc<Quiz>>,
        clock: Arc<dyn Clock>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Result<Self, SessionError> {
        let quiz = quiz.into();
        if quiz.questions.is_empty() {
            return Err(SessionError::InvalidQuiz { quiz_id: quiz.id });
        }

        let started_at = clock.now();
        let remaining_secs = quiz.time_limit_secs();
        tracing::debug!(
            quiz_id = quiz.id,
            questions = quiz.questions.len(),
            ?remaining_secs,
            "session started"
        );

        Ok(Self {
            quiz,
            current: 0,
            answers: AnswerSheet::new(),
            started_at,
            remaining_secs,
            submission: None,
            clock,
            hooks,
        })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn quiz(&self) -> &Arc<Quiz> {
        &self.quiz
    }

    pub fn state(&self) -> SessionState {
        if self.submission.is_some() {
            SessionState::Submitted
        } else {
            SessionState::Active
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submission.is_some()
    }

    /// The frozen snapshot, once submitted.
    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn question_count(&self) -> usize {
        self.quiz.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current]
    }

    /// The option recorded for `question`, if any.
    pub fn answer_for(&self, question: usize) -> Option<usize> {
        self.answers.get(question)
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Answered/current status for every question.
    pub fn navigator(&self) -> Vec<NavigatorEntry> {
        (0..self.question_count())
            .map(|index| NavigatorEntry {
                index,
                answered: self.answers.is_answered(index),
                current: index == self.current,
            })
            .collect()
    }

    /// Seconds left on the countdown, `None` for untimed quizzes.
    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining_secs
    }

    pub fn is_timed(&self) -> bool {
        self.remaining_secs.is_some()
    }

    /// Position through the quiz as a percentage (current question inclusive).
    pub fn progress_percent(&self) -> f64 {
        (self.current + 1) as f64 / self.question_count() as f64 * 100.0
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock seconds so far, frozen at submission.
    pub fn elapsed_secs(&self) -> u64 {
        match &self.submission {
            Some(submission) => submission.elapsed_secs,
            None => self.seconds_since_start(self.clock.now()),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Record `option` as the answer to `question`, replacing any earlier one.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), SessionError> {
        self.ensure_active()?;
        let q = self.question(question)?;
        if !q.has_option(option) {
            return Err(SessionError::InvalidAnswer {
                question,
                option,
                option_count: q.options.len(),
            });
        }

        if self.answers.record(question, option) != Some(option) {
            tracing::debug!(question, option, "answer recorded");
        }
        Ok(())
    }

    /// Answer the current question.
    pub fn select_current(&mut self, option: usize) -> Result<(), SessionError> {
        self.select_answer(self.current, option)
    }

    /// Jump to `index`. Out-of-range targets leave the position unchanged.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.question(index)?;
        self.current = index;
        Ok(())
    }

    /// Advance one question, staying on the last one at the end.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.ensure_active()?;
        self.current = (self.current + 1).min(self.question_count() - 1);
        Ok(self.current)
    }

    /// Go back one question, staying on the first one at the start.
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_active()?;
        self.current = self.current.saturating_sub(1);
        Ok(self.current)
    }

    /// Consume one second of the countdown.
    ///
    /// When the countdown reaches zero the session is auto-submitted. Calls
    /// after submission, and on untimed quizzes, change nothing.
    pub fn tick(&mut self) -> TickOutcome {
        if self.submission.is_some() {
            return TickOutcome::Closed;
        }
        let remaining = match self.remaining_secs {
            Some(secs) => secs.saturating_sub(1),
            None => return TickOutcome::Untimed,
        };
        self.remaining_secs = Some(remaining);

        if remaining == 0 {
            tracing::info!(quiz_id = self.quiz.id, "time is up, submitting");
            TickOutcome::AutoSubmitted(self.submit_with(true))
        } else {
            TickOutcome::Running {
                remaining_secs: remaining,
            }
        }
    }

    /// Submit the attempt on the user's behalf.
    pub fn submit(&mut self) -> Submission {
        self.submit_with(false)
    }

    /// Freeze the session and return its snapshot.
    ///
    /// The first submission wins: later calls, manual or automatic, return
    /// the original snapshot unchanged and do not fire hooks again.
    pub fn submit_with(&mut self, auto_submitted: bool) -> Submission {
        if let Some(existing) = &self.submission {
            tracing::debug!(
                quiz_id = self.quiz.id,
                auto_submitted,
                "duplicate submit ignored"
            );
            return existing.clone();
        }

        let submitted_at = self.clock.now();
        let submission = Submission {
            quiz_id: self.quiz.id,
            question_count: self.question_count(),
            answers: self.answers.clone(),
            elapsed_secs: self.seconds_since_start(submitted_at),
            auto_submitted,
            submitted_at,
        };
        tracing::info!(
            quiz_id = submission.quiz_id,
            answered = submission.answers.len(),
            elapsed_secs = submission.elapsed_secs,
            auto_submitted,
            "quiz submitted"
        );

        self.submission = Some(submission.clone());
        self.hooks.on_submitted(&submission);
        submission
    }

    /// Leave the attempt without submitting.
    ///
    /// Exit hooks only fire for sessions that were still active.
    pub fn abandon(self) {
        if self.submission.is_none() {
            tracing::debug!(quiz_id = self.quiz.id, "session abandoned");
            self.hooks.on_exit(&self);
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.submission.is_some() {
            Err(SessionError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn question(&self, index: usize) -> Result<&Question, SessionError> {
        self.quiz
            .questions
            .get(index)
            .ok_or(SessionError::OutOfRange {
                index,
                count: self.quiz.questions.len(),
            })
    }

    fn seconds_since_start(&self, at: DateTime<Utc>) -> u64 {
        (at - self.started_at).num_seconds().max(0) as u64
    }
}
