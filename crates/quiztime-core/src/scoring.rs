//! Scoring and review evaluation.
//!
//! [`evaluate`] is a pure function of the quiz and the answer sheet: it reads
//! no clock and keeps no state, so a retake can reuse it freely.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::model::{AnswerSheet, AttemptRecord, Quiz};
use crate::session::Submission;

/// Tolerance when comparing a local score with the server's.
const SCORE_EPSILON: f64 = 1e-6;

/// The verdict for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub question: usize,
    /// The option chosen, `None` if unanswered.
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
}

impl Verdict {
    pub fn is_unanswered(&self) -> bool {
        self.selected.is_none()
    }
}

/// The scored outcome of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: u64,
    /// Answers aligned to question order.
    pub answers: Vec<Option<usize>>,
    /// Percentage in [0, 100], unrounded.
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    /// Wall-clock seconds from start to submission.
    pub elapsed_secs: u64,
    pub verdicts: Vec<Verdict>,
}

impl QuizResult {
    /// Score rounded to a whole percentage for display.
    pub fn display_score(&self) -> u32 {
        self.score.round() as u32
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Answers in the API's list encoding.
    pub fn wire_answers(&self) -> Vec<i64> {
        self.answers
            .iter()
            .map(|a| a.map_or(crate::model::NO_ANSWER, |o| o as i64))
            .collect()
    }
}

/// Qualitative grade bands over the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Failing,
    Marginal,
    Adequate,
    Strong,
    Outstanding,
}

impl Grade {
    /// >=90 outstanding, >=80 strong, >=70 adequate, >=60 marginal, else failing.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::Outstanding
        } else if score >= 80.0 {
            Grade::Strong
        } else if score >= 70.0 {
            Grade::Adequate
        } else if score >= 60.0 {
            Grade::Marginal
        } else {
            Grade::Failing
        }
    }

    /// Letter shown on the results screen.
    pub fn letter(&self) -> &'static str {
        match self {
            Grade::Outstanding => "A+",
            Grade::Strong => "A",
            Grade::Adequate => "B",
            Grade::Marginal => "C",
            Grade::Failing => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Outstanding => write!(f, "outstanding"),
            Grade::Strong => write!(f, "strong"),
            Grade::Adequate => write!(f, "adequate"),
            Grade::Marginal => write!(f, "marginal"),
            Grade::Failing => write!(f, "failing"),
        }
    }
}

/// Score an answer sheet against a quiz.
///
/// Unanswered questions count as incorrect. Entries for questions the quiz
/// does not have are ignored.
pub fn evaluate(quiz: &Quiz, answers: &AnswerSheet, elapsed_secs: u64) -> Result<QuizResult, EvalError> {
    let total = quiz.questions.len();
    if total == 0 {
        return Err(EvalError::EmptyQuiz { quiz_id: quiz.id });
    }

    let verdicts: Vec<Verdict> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let selected = answers.get(i);
            Verdict {
                question: i,
                selected,
                correct_answer: question.correct_answer,
                is_correct: selected == Some(question.correct_answer),
            }
        })
        .collect();

    let correct_count = verdicts.iter().filter(|v| v.is_correct).count();

    Ok(QuizResult {
        quiz_id: quiz.id,
        answers: verdicts.iter().map(|v| v.selected).collect(),
        score: 100.0 * correct_count as f64 / total as f64,
        correct_count,
        total_questions: total,
        elapsed_secs,
        verdicts,
    })
}

/// Score a frozen session snapshot.
pub fn evaluate_submission(quiz: &Quiz, submission: &Submission) -> Result<QuizResult, EvalError> {
    evaluate(quiz, &submission.answers, submission.elapsed_secs)
}

/// How a local result differs from the server's record of the same attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub local_score: f64,
    pub server_score: f64,
    pub answers_differ: bool,
    pub time_differs: bool,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "local score {:.2} vs server score {:.2}",
            self.local_score, self.server_score
        )?;
        if self.answers_differ {
            write!(f, ", answers differ")?;
        }
        if self.time_differs {
            write!(f, ", time differs")?;
        }
        Ok(())
    }
}

/// Check that the server scored the attempt the same way we did.
pub fn check_agreement(local: &QuizResult, server: &AttemptRecord) -> Result<(), Divergence> {
    let score_differs = (local.score - server.score).abs() > SCORE_EPSILON;
    let answers_differ = local.wire_answers() != server.answers;
    let time_differs = local.elapsed_secs != server.time_taken;

    if score_differs || answers_differ || time_differs {
        let divergence = Divergence {
            local_score: local.score,
            server_score: server.score,
            answers_differ,
            time_differs,
        };
        tracing::warn!(quiz_id = local.quiz_id, %divergence, "server result disagrees");
        return Err(divergence);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Question};

    fn quiz_with_answers(correct: &[usize]) -> Quiz {
        Quiz {
            id: 9,
            title: "Scoring".into(),
            description: None,
            subject: "math".into(),
            difficulty: Difficulty::Easy,
            time_limit_minutes: None,
            questions: correct
                .iter()
                .map(|&c| Question {
                    prompt: "?".into(),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_answer: c,
                    explanation: None,
                })
                .collect(),
            is_ai_generated: false,
        }
    }

    #[test]
    fn half_correct_with_omission() {
        let quiz = quiz_with_answers(&[0, 1, 2, 3]);
        let answers = AnswerSheet::from_wire(&[0, 1, -1, 0], 4);
        let result = evaluate(&quiz, &answers, 30).unwrap();

        assert!((result.score - 50.0).abs() < f64::EPSILON);
        assert_eq!(result.correct_count, 2);
        assert!(result.verdicts[2].is_unanswered());
        assert!(!result.verdicts[2].is_correct);
        assert!(!result.verdicts[3].is_correct);
        assert_eq!(result.verdicts[3].selected, Some(0));
        assert_eq!(result.answered_count(), 3);
    }

    #[test]
    fn unanswered_never_matches_option_zero() {
        let quiz = quiz_with_answers(&[0, 0]);
        let result = evaluate(&quiz, &AnswerSheet::new(), 0).unwrap();
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.wire_answers(), vec![-1, -1]);
    }

    #[test]
    fn score_is_not_prerounded() {
        let quiz = quiz_with_answers(&[0, 0, 0]);
        let answers: AnswerSheet = [(0, 0)].into_iter().collect();
        let result = evaluate(&quiz, &answers, 0).unwrap();
        assert!((result.score - 100.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.display_score(), 33);
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let quiz = quiz_with_answers(&[]);
        assert_eq!(
            evaluate(&quiz, &AnswerSheet::new(), 0).unwrap_err(),
            EvalError::EmptyQuiz { quiz_id: 9 }
        );
    }

    #[test]
    fn evaluation_is_repeatable_and_time_independent() {
        let quiz = quiz_with_answers(&[1, 2, 3]);
        let answers: AnswerSheet = [(0, 1), (1, 0)].into_iter().collect();
        let a = evaluate(&quiz, &answers, 10).unwrap();
        let b = evaluate(&quiz, &answers, 10).unwrap();
        let slow = evaluate(&quiz, &answers, 9_999).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.score, slow.score);
        assert_eq!(a.verdicts, slow.verdicts);
    }

    #[test]
    fn out_of_range_entries_are_ignored() {
        let quiz = quiz_with_answers(&[0]);
        let answers: AnswerSheet = [(0, 0), (5, 1)].into_iter().collect();
        let result = evaluate(&quiz, &answers, 0).unwrap();
        assert_eq!(result.answers, vec![Some(0)]);
        assert_eq!(result.correct_count, 1);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(Grade::from_score(100.0), Grade::Outstanding);
        assert_eq!(Grade::from_score(90.0), Grade::Outstanding);
        assert_eq!(Grade::from_score(89.99), Grade::Strong);
        assert_eq!(Grade::from_score(70.0), Grade::Adequate);
        assert_eq!(Grade::from_score(60.0), Grade::Marginal);
        assert_eq!(Grade::from_score(59.9), Grade::Failing);
        assert_eq!(Grade::Outstanding.letter(), "A+");
        assert_eq!(Grade::Failing.letter(), "F");
        assert!(Grade::Strong > Grade::Adequate);
    }

    #[test]
    fn agreement_with_matching_server_record() {
        let quiz = quiz_with_answers(&[0, 1]);
        let answers: AnswerSheet = [(0, 0)].into_iter().collect();
        let local = evaluate(&quiz, &answers, 12).unwrap();
        let server = AttemptRecord {
            id: 1,
            quiz_id: 9,
            answers: vec![0, -1],
            score: 50.0,
            time_taken: 12,
            completed: true,
            created_at: None,
        };
        assert!(check_agreement(&local, &server).is_ok());

        let disagreeing = AttemptRecord {
            score: 100.0,
            answers: vec![0, 1],
            ..server
        };
        let divergence = check_agreement(&local, &disagreeing).unwrap_err();
        assert!(divergence.answers_differ);
        assert!(!divergence.time_differs);
        assert!(divergence.to_string().contains("server score 100.00"));
    }
}
