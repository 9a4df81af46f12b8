//! Core data model types for quiztime.
//!
//! Quizzes are immutable definitions supplied by the quiz API or a quiz file.
//! Field names follow the API's wire format (`time_limit`, `question`,
//! `correct_answer`) so the same types decode both sources.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Wire marker for a question with no selected option.
pub const NO_ANSWER: i64 = -1;

/// A scored multiple-choice assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Identifier assigned by the quiz API.
    pub id: u64,
    /// Human-readable title.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Subject area (e.g. "physics").
    pub subject: String,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Time limit in minutes. `None` or `0` means untimed.
    #[serde(default, rename = "time_limit")]
    pub time_limit_minutes: Option<u32>,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Whether the quiz was produced by the AI generator.
    #[serde(default)]
    pub is_ai_generated: bool,
}

impl Quiz {
    /// Number of questions in the quiz.
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// The countdown budget in seconds, if the quiz is timed.
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_minutes
            .filter(|&minutes| minutes > 0)
            .map(|minutes| minutes.saturating_mul(60))
    }

    /// A lightweight summary without question bodies.
    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            id: self.id,
            title: self.title.clone(),
            subject: self.subject.clone(),
            difficulty: self.difficulty,
            time_limit_minutes: self.time_limit_minutes,
            question_count: self.questions.len(),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Answer options, addressed by index.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub correct_answer: usize,
    /// Explanation revealed after submission.
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether `option` addresses one of this question's options.
    pub fn has_option(&self, option: usize) -> bool {
        option < self.options.len()
    }
}

/// Quiz difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Quiz metadata without the questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: u64,
    pub title: String,
    pub subject: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    pub question_count: usize,
}

/// Sparse mapping from question index to selected option index.
///
/// Unanswered questions have no entry. The ordered and wire views fill the
/// gaps with `None` and [`NO_ANSWER`] respectively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<usize, usize>);

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `option` for `question`, returning the previous selection.
    pub fn record(&mut self, question: usize, option: usize) -> Option<usize> {
        self.0.insert(question, option)
    }

    /// The option recorded for `question`, if any.
    pub fn get(&self, question: usize) -> Option<usize> {
        self.0.get(&question).copied()
    }

    pub fn is_answered(&self, question: usize) -> bool {
        self.0.contains_key(&question)
    }

    /// Number of answered questions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(question, option)` pairs in question order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&q, &o)| (q, o))
    }

    /// Answers aligned to question order, `None` for unanswered.
    pub fn to_ordered(&self, question_count: usize) -> Vec<Option<usize>> {
        (0..question_count).map(|i| self.get(i)).collect()
    }

    /// Answers in the API's list encoding, [`NO_ANSWER`] for unanswered.
    pub fn to_wire(&self, question_count: usize) -> Vec<i64> {
        self.to_ordered(question_count)
            .into_iter()
            .map(|answer| answer.map_or(NO_ANSWER, |o| o as i64))
            .collect()
    }

    /// Decode the API's list encoding.
    ///
    /// Negative entries are unanswered. Entries past `question_count` are
    /// dropped so the sheet never addresses a question the quiz lacks.
    pub fn from_wire(answers: &[i64], question_count: usize) -> Self {
        let map = answers
            .iter()
            .take(question_count)
            .enumerate()
            .filter_map(|(i, &a)| usize::try_from(a).ok().map(|o| (i, o)))
            .collect();
        Self(map)
    }
}

impl FromIterator<(usize, usize)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Payload for the quiz API's submit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSubmission {
    pub quiz_id: u64,
    /// One entry per question, [`NO_ANSWER`] for unanswered.
    pub answers: Vec<i64>,
    /// Wall-clock seconds from start to submission.
    pub time_taken: u64,
}

/// A persisted attempt as returned by the quiz API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: u64,
    pub quiz_id: u64,
    pub answers: Vec<i64>,
    /// Server-computed score in [0, 100].
    pub score: f64,
    pub time_taken: u64,
    #[serde(default = "default_true")]
    pub completed: bool,
    /// The API stores naive timestamps; those are read as UTC.
    #[serde(default, deserialize_with = "deserialize_api_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

fn deserialize_api_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(stamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(stamp.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}
