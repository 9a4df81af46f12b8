//! Trait definition for the quiz collaborator API.
//!
//! Implemented by the `quiztime-client` crate over HTTP and in memory.

use async_trait::async_trait;

use crate::model::{AttemptRecord, AttemptSubmission, Quiz};

/// Backend that serves quizzes and persists attempts.
///
/// The backend is the authoritative scorer for persisted attempts. Clients
/// score locally first and compare with the returned record.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch a quiz by identifier.
    async fn fetch_quiz(&self, id: u64) -> anyhow::Result<Quiz>;

    /// List quizzes, optionally restricted to one subject.
    async fn list_quizzes(&self, subject: Option<&str>) -> anyhow::Result<Vec<Quiz>>;

    /// Persist an attempt and return the server's scored record.
    async fn submit_attempt(&self, attempt: &AttemptSubmission) -> anyhow::Result<AttemptRecord>;
}
