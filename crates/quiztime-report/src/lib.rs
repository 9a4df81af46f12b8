//! quiztime-report — rendering of reviewed quiz attempts.

pub mod html;
pub mod markdown;
