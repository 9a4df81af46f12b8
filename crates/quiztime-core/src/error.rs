//! Session and evaluation error types.
//!
//! These errors are raised synchronously by the session controller and the
//! evaluator. None of them come from the network, so none are retried.

use thiserror::Error;

/// Errors raised by [`QuizSession`](crate::session::QuizSession) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The quiz cannot be started because it has no questions.
    #[error("cannot start quiz {quiz_id}: it has no questions")]
    InvalidQuiz { quiz_id: u64 },

    /// The selected option does not exist for the question.
    #[error("option {option} is out of range for question {question} ({option_count} options)")]
    InvalidAnswer {
        question: usize,
        option: usize,
        option_count: usize,
    },

    /// A question index outside the quiz was requested.
    #[error("question {index} is out of range (quiz has {count} questions)")]
    OutOfRange { index: usize, count: usize },

    /// The session has already been submitted.
    #[error("quiz already submitted")]
    SessionClosed,
}

impl SessionError {
    /// Returns `true` for errors that name a question or option the quiz
    /// does not have. The session is unchanged and can continue.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidAnswer { .. } | SessionError::OutOfRange { .. }
        )
    }
}

/// Errors raised by the scoring evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// There is nothing to score.
    #[error("cannot evaluate quiz {quiz_id}: it has no questions")]
    EmptyQuiz { quiz_id: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_classification() {
        assert!(SessionError::OutOfRange { index: 4, count: 4 }.is_misuse());
        assert!(SessionError::InvalidAnswer {
            question: 0,
            option: 9,
            option_count: 4
        }
        .is_misuse());
        assert!(!SessionError::SessionClosed.is_misuse());
        assert!(!SessionError::InvalidQuiz { quiz_id: 1 }.is_misuse());
    }

    #[test]
    fn messages_name_the_offending_index() {
        let err = SessionError::OutOfRange { index: 7, count: 3 };
        assert_eq!(
            err.to_string(),
            "question 7 is out of range (quiz has 3 questions)"
        );
    }
}
