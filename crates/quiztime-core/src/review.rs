//! Post-submission review data.
//!
//! Shapes a quiz and its result into rows a front end can render directly,
//! plus the time formatting used by the countdown and the results screen.

use serde::{Deserialize, Serialize};

use crate::model::Quiz;
use crate::scoring::{Grade, QuizResult};

/// Remaining time below which the countdown is shown as urgent.
pub const LOW_TIME_SECS: u32 = 300;

/// Color band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTone {
    Good,
    Fair,
    Poor,
}

impl ScoreTone {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreTone::Good
        } else if score >= 60.0 {
            ScoreTone::Fair
        } else {
            ScoreTone::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTone::Good => "good",
            ScoreTone::Fair => "fair",
            ScoreTone::Poor => "poor",
        }
    }
}

/// Everything the results screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSheet {
    pub quiz_title: String,
    pub subject: String,
    pub difficulty: String,
    pub score: f64,
    pub display_score: u32,
    pub grade: Grade,
    pub tone: ScoreTone,
    pub correct_count: usize,
    pub answered_count: usize,
    pub total_questions: usize,
    pub elapsed_secs: u64,
    pub time_taken: String,
    pub questions: Vec<QuestionReview>,
}

/// One reviewed question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// 1-based question number.
    pub number: usize,
    pub prompt: String,
    pub options: Vec<OptionReview>,
    pub is_correct: bool,
    pub unanswered: bool,
    pub explanation: Option<String>,
}

/// One option of a reviewed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionReview {
    pub text: String,
    /// This is the right answer.
    pub is_correct: bool,
    /// The user picked this option.
    pub is_selected: bool,
    /// The user picked this option and it is wrong.
    pub is_wrong_pick: bool,
}

impl ReviewSheet {
    /// Build the review for `result`, which must come from `quiz`.
    pub fn build(quiz: &Quiz, result: &QuizResult) -> Self {
        let questions = quiz
            .questions
            .iter()
            .zip(&result.verdicts)
            .map(|(question, verdict)| QuestionReview {
                number: verdict.question + 1,
                prompt: question.prompt.clone(),
                options: question
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let is_selected = verdict.selected == Some(i);
                        OptionReview {
                            text: text.clone(),
                            is_correct: i == question.correct_answer,
                            is_selected,
                            is_wrong_pick: is_selected && !verdict.is_correct,
                        }
                    })
                    .collect(),
                is_correct: verdict.is_correct,
                unanswered: verdict.is_unanswered(),
                explanation: question.explanation.clone(),
            })
            .collect();

        Self {
            quiz_title: quiz.title.clone(),
            subject: quiz.subject.clone(),
            difficulty: quiz.difficulty.to_string(),
            score: result.score,
            display_score: result.display_score(),
            grade: result.grade(),
            tone: ScoreTone::from_score(result.score),
            correct_count: result.correct_count,
            answered_count: result.answered_count(),
            total_questions: result.total_questions,
            elapsed_secs: result.elapsed_secs,
            time_taken: format_duration(result.elapsed_secs),
            questions,
        }
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} — {}% ({}, {})\n",
            self.quiz_title,
            self.display_score,
            self.grade.letter(),
            self.grade
        ));
        out.push_str(&format!(
            "Correct: {}/{}  Answered: {}/{}  Time: {}\n",
            self.correct_count,
            self.total_questions,
            self.answered_count,
            self.total_questions,
            self.time_taken
        ));

        for q in &self.questions {
            let mark = if q.is_correct {
                "correct"
            } else if q.unanswered {
                "unanswered"
            } else {
                "wrong"
            };
            out.push_str(&format!("\n{}. {} [{mark}]\n", q.number, q.prompt));
            for (i, option) in q.options.iter().enumerate() {
                let mut tags = Vec::new();
                if option.is_correct {
                    tags.push("correct");
                }
                if option.is_selected {
                    tags.push("your answer");
                }
                let suffix = if tags.is_empty() {
                    String::new()
                } else {
                    format!("  <- {}", tags.join(", "))
                };
                out.push_str(&format!("   {}) {}{suffix}\n", option_label(i), option.text));
            }
            if let Some(explanation) = &q.explanation {
                out.push_str(&format!("   Explanation: {explanation}\n"));
            }
        }
        out
    }
}

/// Letter label for an option index (`a`, `b`, ...).
pub fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|&i| i < 26)
        .map(|i| (b'a' + i) as char)
        .unwrap_or('?')
}

/// Countdown format, `m:ss`.
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Results-screen duration format, `Xm Ys`.
pub fn format_duration(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Whether the countdown should be shown as urgent.
pub fn is_running_low(remaining_secs: u32) -> bool {
    remaining_secs < LOW_TIME_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSheet, Difficulty, Question};
    use crate::scoring::evaluate;

    fn quiz() -> Quiz {
        Quiz {
            id: 3,
            title: "Capitals".into(),
            description: None,
            subject: "geography".into(),
            difficulty: Difficulty::Hard,
            time_limit_minutes: Some(5),
            questions: vec![
                Question {
                    prompt: "Capital of France?".into(),
                    options: vec!["Paris".into(), "Lyon".into()],
                    correct_answer: 0,
                    explanation: Some("Paris has been the capital since 987.".into()),
                },
                Question {
                    prompt: "Capital of Italy?".into(),
                    options: vec!["Milan".into(), "Rome".into()],
                    correct_answer: 1,
                    explanation: None,
                },
                Question {
                    prompt: "Capital of Spain?".into(),
                    options: vec!["Madrid".into(), "Seville".into()],
                    correct_answer: 0,
                    explanation: None,
                },
            ],
            is_ai_generated: false,
        }
    }

    #[test]
    fn review_marks_options() {
        let quiz = quiz();
        let answers: AnswerSheet = [(0, 0), (1, 0)].into_iter().collect();
        let result = evaluate(&quiz, &answers, 125).unwrap();
        let sheet = ReviewSheet::build(&quiz, &result);

        assert_eq!(sheet.display_score, 33);
        assert_eq!(sheet.grade, Grade::Failing);
        assert_eq!(sheet.tone, ScoreTone::Poor);
        assert_eq!(sheet.answered_count, 2);
        assert_eq!(sheet.time_taken, "2m 5s");

        let first = &sheet.questions[0];
        assert!(first.is_correct);
        assert!(first.options[0].is_correct && first.options[0].is_selected);
        assert!(!first.options[0].is_wrong_pick);

        let second = &sheet.questions[1];
        assert!(!second.is_correct);
        assert!(second.options[0].is_wrong_pick);
        assert!(second.options[1].is_correct && !second.options[1].is_selected);

        let third = &sheet.questions[2];
        assert!(third.unanswered);
        assert!(third.options.iter().all(|o| !o.is_selected));
    }

    #[test]
    fn text_rendering_includes_explanations() {
        let quiz = quiz();
        let result = evaluate(&quiz, &AnswerSheet::new(), 0).unwrap();
        let text = ReviewSheet::build(&quiz, &result).to_text();
        assert!(text.contains("Capitals"));
        assert!(text.contains("[unanswered]"));
        assert!(text.contains("Explanation: Paris has been the capital"));
        assert!(!text.contains("your answer"));
    }

    #[test]
    fn time_formats() {
        assert_eq!(format_countdown(0), "0:00");
        assert_eq!(format_countdown(65), "1:05");
        assert_eq!(format_countdown(600), "10:00");
        assert_eq!(format_duration(59), "0m 59s");
        assert_eq!(format_duration(3_601), "60m 1s");
        assert!(is_running_low(299));
        assert!(!is_running_low(300));
    }

    #[test]
    fn tones_and_labels() {
        assert_eq!(ScoreTone::from_score(80.0), ScoreTone::Good);
        assert_eq!(ScoreTone::from_score(60.0), ScoreTone::Fair);
        assert_eq!(ScoreTone::from_score(59.0), ScoreTone::Poor);
        assert_eq!(option_label(0), 'a');
        assert_eq!(option_label(3), 'd');
        assert_eq!(option_label(40), '?');
    }
}
