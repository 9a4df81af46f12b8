//! TOML quiz file parser.
//!
//! Loads offline quizzes from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Difficulty, Question, Quiz};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_subject")]
    subject: String,
    #[serde(default = "default_difficulty_str")]
    difficulty: String,
    #[serde(default)]
    time_limit: Option<u32>,
}

fn default_subject() -> String {
    "general".to_string()
}

fn default_difficulty_str() -> String {
    "medium".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz`.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let difficulty: Difficulty = parsed
        .quiz
        .difficulty
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}: {}", source_path.display(), e))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            prompt: q.question,
            options: q.options,
            correct_answer: q.correct_answer,
            explanation: q.explanation.filter(|e| !e.trim().is_empty()),
        })
        .collect();

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        subject: parsed.quiz.subject,
        difficulty,
        time_limit_minutes: parsed.quiz.time_limit,
        questions,
        is_ai_generated: false,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Load one quiz file, or every quiz under a directory.
pub fn load_quizzes(path: &Path) -> Result<Vec<Quiz>> {
    if path.is_dir() {
        load_quiz_directory(path)
    } else {
        Ok(vec![parse_quiz(path)?])
    }
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for common issues.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "quiz has no questions and cannot be started".into(),
        });
    }

    if quiz.time_limit_minutes == Some(0) {
        warnings.push(ValidationWarning {
            question: None,
            message: "time_limit is 0; the quiz will be untimed".into(),
        });
    }

    for (i, q) in quiz.questions.iter().enumerate() {
        let number = Some(i + 1);

        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: number,
                message: "question text is empty".into(),
            });
        }

        if q.options.len() < 2 {
            warnings.push(ValidationWarning {
                question: number,
                message: format!("needs at least 2 options, has {}", q.options.len()),
            });
        }

        if !q.has_option(q.correct_answer) {
            warnings.push(ValidationWarning {
                question: number,
                message: format!(
                    "correct_answer {} is out of range ({} options)",
                    q.correct_answer,
                    q.options.len()
                ),
            });
        }

        let mut seen = HashSet::new();
        for option in &q.options {
            if !seen.insert(option.trim().to_lowercase()) {
                warnings.push(ValidationWarning {
                    question: number,
                    message: format!("duplicate option: {option}"),
                });
            }
        }
    }

    warnings
}
