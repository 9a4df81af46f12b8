//! quiztime-client — Quiz API integrations.
//!
//! Implements the `QuizApi` trait over HTTP and in memory, and loads the
//! client configuration that selects between them.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;

pub use config::{create_api, load_config, ApiConfig, QuiztimeConfig};
pub use error::ApiError;
