//! quiztime-core — Timed quiz session engine, scoring, and review.
//!
//! This crate defines the quiz data model, the session state machine and its
//! countdown, and the pure scoring logic that the rest of quiztime builds on.

pub mod clock;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod review;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod traits;
