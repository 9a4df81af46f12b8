//! In-memory quiz API for offline use and testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use quiztime_core::model::{AnswerSheet, AttemptRecord, AttemptSubmission, Quiz};
use quiztime_core::scoring::evaluate;
use quiztime_core::traits::QuizApi;

use crate::error::ApiError;

/// A quiz backend held entirely in memory.
///
/// Scores submissions with the same evaluator the session uses, so a local
/// result and the returned record always agree.
pub struct InMemoryQuizApi {
    quizzes: BTreeMap<u64, Quiz>,
    next_attempt_id: AtomicU64,
    /// Every submission received, in order.
    submissions: Mutex<Vec<AttemptSubmission>>,
    reject_submissions: AtomicBool,
}

impl InMemoryQuizApi {
    pub fn new(quizzes: impl IntoIterator<Item = Quiz>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.id, q)).collect(),
            next_attempt_id: AtomicU64::new(1),
            submissions: Mutex::new(Vec::new()),
            reject_submissions: AtomicBool::new(false),
        }
    }

    /// Make every following submission fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.reject_submissions.store(offline, Ordering::Relaxed);
    }

    /// Submissions received so far.
    pub fn submissions(&self) -> Vec<AttemptSubmission> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuizApi for InMemoryQuizApi {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_quiz(&self, id: u64) -> anyhow::Result<Quiz> {
        self.quizzes
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id).into())
    }

    async fn list_quizzes(&self, subject: Option<&str>) -> anyhow::Result<Vec<Quiz>> {
        Ok(self
            .quizzes
            .values()
            .filter(|q| subject.map_or(true, |s| q.subject.eq_ignore_ascii_case(s)))
            .cloned()
            .collect())
    }

    async fn submit_attempt(&self, attempt: &AttemptSubmission) -> anyhow::Result<AttemptRecord> {
        if self.reject_submissions.load(Ordering::Relaxed) {
            return Err(ApiError::Network("connection refused".into()).into());
        }

        let quiz = self
            .quizzes
            .get(&attempt.quiz_id)
            .ok_or(ApiError::NotFound(attempt.quiz_id))?;

        let sheet = AnswerSheet::from_wire(&attempt.answers, quiz.question_count());
        let result = evaluate(quiz, &sheet, attempt.time_taken)?;

        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push(attempt.clone());
        }

        Ok(AttemptRecord {
            id: self.next_attempt_id.fetch_add(1, Ordering::Relaxed),
            quiz_id: attempt.quiz_id,
            answers: attempt.answers.clone(),
            score: result.score,
            time_taken: attempt.time_taken,
            completed: true,
            created_at: Some(Utc::now()),
        })
    }
}
