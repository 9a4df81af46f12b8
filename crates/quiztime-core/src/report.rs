//! Attempt reports with JSON persistence and retake comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AttemptRecord, Quiz, QuizSummary};
use crate::review::ReviewSheet;
use crate::scoring::{evaluate_submission, QuizResult};
use crate::session::Submission;

/// A saved attempt: the quiz, the local result, and the server's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The quiz as it was taken.
    pub quiz: Quiz,
    /// Locally computed result.
    pub result: QuizResult,
    /// Whether the countdown ended the attempt.
    pub auto_submitted: bool,
    /// The server's record, if the submission reached it.
    #[serde(default)]
    pub server: Option<AttemptRecord>,
}

impl AttemptReport {
    /// Score `submission` and wrap it in a new report.
    pub fn from_submission(quiz: &Quiz, submission: &Submission) -> Result<Self> {
        let result = evaluate_submission(quiz, submission)?;
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz: quiz.clone(),
            result,
            auto_submitted: submission.auto_submitted,
            server: None,
        })
    }

    pub fn summary(&self) -> QuizSummary {
        self.quiz.summary()
    }

    /// Review rows for the results screen.
    pub fn review(&self) -> ReviewSheet {
        ReviewSheet::build(&self.quiz, &self.result)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this attempt against an earlier attempt at the same quiz.
    pub fn compare(&self, baseline: &AttemptReport) -> Result<RetakeComparison> {
        anyhow::ensure!(
            self.quiz.id == baseline.quiz.id,
            "reports are for different quizzes ({} vs {})",
            baseline.quiz.id,
            self.quiz.id
        );
        anyhow::ensure!(
            self.result.total_questions == baseline.result.total_questions,
            "quiz {} changed between attempts ({} vs {} questions)",
            self.quiz.id,
            baseline.result.total_questions,
            self.result.total_questions
        );

        let mut newly_correct = Vec::new();
        let mut newly_wrong = Vec::new();
        let mut unchanged = 0usize;

        for (before, after) in baseline.result.verdicts.iter().zip(&self.result.verdicts) {
            match (before.is_correct, after.is_correct) {
                (false, true) => newly_correct.push(after.question + 1),
                (true, false) => newly_wrong.push(after.question + 1),
                _ => unchanged += 1,
            }
        }

        Ok(RetakeComparison {
            quiz_id: self.quiz.id,
            quiz_title: self.quiz.title.clone(),
            baseline_score: baseline.result.score,
            current_score: self.result.score,
            delta: self.result.score - baseline.result.score,
            baseline_secs: baseline.result.elapsed_secs,
            current_secs: self.result.elapsed_secs,
            newly_correct,
            newly_wrong,
            unchanged,
        })
    }
}

/// Result of comparing two attempts at one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetakeComparison {
    pub quiz_id: u64,
    pub quiz_title: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
    pub baseline_secs: u64,
    pub current_secs: u64,
    /// 1-based numbers of questions that went from wrong to right.
    pub newly_correct: Vec<usize>,
    /// 1-based numbers of questions that went from right to wrong.
    pub newly_wrong: Vec<usize>,
    /// Questions with the same verdict in both attempts.
    pub unchanged: usize,
}

impl RetakeComparison {
    pub fn improved(&self) -> bool {
        self.delta > 0.0
    }

    pub fn has_regressions(&self) -> bool {
        !self.newly_wrong.is_empty()
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Retake: {}\n\n", self.quiz_title));
        md.push_str("| | Baseline | Current | Delta |\n");
        md.push_str("|---|----------|---------|-------|\n");
        md.push_str(&format!(
            "| Score | {:.1}% | {:.1}% | {:+.1}% |\n",
            self.baseline_score, self.current_score, self.delta
        ));
        md.push_str(&format!(
            "| Time | {}s | {}s | {:+}s |\n\n",
            self.baseline_secs,
            self.current_secs,
            self.current_secs as i64 - self.baseline_secs as i64
        ));

        if !self.newly_correct.is_empty() {
            md.push_str(&format!(
                "**Now correct:** {}\n\n",
                join_numbers(&self.newly_correct)
            ));
        }
        if !self.newly_wrong.is_empty() {
            md.push_str(&format!(
                "**Now wrong:** {}\n\n",
                join_numbers(&self.newly_wrong)
            ));
        }
        md.push_str(&format!("{} question(s) unchanged\n", self.unchanged));

        md
    }
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(|n| format!("Q{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerSheet;
    use crate::session::tests::make_quiz;

    fn make_report(answers: &[(usize, usize)], elapsed_secs: u64) -> AttemptReport {
        let quiz = make_quiz(4, Some(5));
        let submission = Submission {
            quiz_id: quiz.id,
            question_count: 4,
            answers: answers.iter().copied().collect::<AnswerSheet>(),
            elapsed_secs,
            auto_submitted: false,
            submitted_at: Utc::now(),
        };
        AttemptReport::from_submission(&quiz, &submission).unwrap()
    }

    #[test]
    fn from_submission_scores_locally() {
        // make_quiz: correct answer of question i is i % 4
        let report = make_report(&[(0, 0), (1, 1), (2, 0)], 42);
        assert_eq!(report.result.correct_count, 2);
        assert!((report.result.score - 50.0).abs() < f64::EPSILON);
        assert!(report.server.is_none());
        assert_eq!(report.summary().question_count, 4);
    }

    #[test]
    fn compare_retake() {
        let baseline = make_report(&[(0, 0), (1, 0)], 100);
        let current = make_report(&[(0, 1), (1, 1), (2, 2)], 80);

        let cmp = current.compare(&baseline).unwrap();
        assert_eq!(cmp.newly_correct, vec![2, 3]);
        assert_eq!(cmp.newly_wrong, vec![1]);
        assert_eq!(cmp.unchanged, 1);
        assert!(cmp.improved());
        assert!(cmp.has_regressions());
        assert!((cmp.delta - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn compare_rejects_different_quizzes() {
        let baseline = make_report(&[], 1);
        let mut current = make_report(&[], 1);
        current.quiz.id = 999;
        assert!(current.compare(&baseline).is_err());
    }

    #[test]
    fn compare_rejects_a_changed_quiz() {
        let baseline = make_report(&[(0, 0)], 30);
        let longer = make_quiz(5, Some(5));
        let submission = Submission {
            quiz_id: longer.id,
            question_count: 5,
            answers: [(0, 0), (4, 0)].into_iter().collect::<AnswerSheet>(),
            elapsed_secs: 30,
            auto_submitted: false,
            submitted_at: Utc::now(),
        };
        let current = AttemptReport::from_submission(&longer, &submission).unwrap();
        assert_eq!(current.quiz.id, baseline.quiz.id);

        let err = current.compare(&baseline).unwrap_err();
        assert!(err.to_string().contains("4 vs 5 questions"), "{err}");
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(&[(3, 3)], 7);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("attempt.json");

        report.save_json(&path).unwrap();
        let loaded = AttemptReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.result, report.result);
        assert_eq!(loaded.quiz, report.quiz);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(&[(0, 0)], 10);
        let current = make_report(&[(1, 1)], 20);
        let md = current.compare(&baseline).unwrap().to_markdown();
        assert!(md.contains("Retake: Sample"));
        assert!(md.contains("Now correct:** Q2"));
        assert!(md.contains("Now wrong:** Q1"));
        assert!(md.contains("+10s"));
    }
}
