//! The `quiztime init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quiztime.toml
    if std::path::Path::new("quiztime.toml").exists() {
        println!("quiztime.toml already exists, skipping.");
    } else {
        std::fs::write("quiztime.toml", SAMPLE_CONFIG)?;
        println!("Created quiztime.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quiztime.toml with your server URL and token");
    println!("  2. Run: quiztime validate --path quizzes/example.toml");
    println!("  3. Run: quiztime take --file quizzes/example.toml --offline");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quiztime configuration

results_dir = "./quiztime-results"
offline = false

[api]
base_url = "http://localhost:8000"
api_prefix = "/api/v1"
access_token = "${QUIZTIME_TOKEN}"
timeout_secs = 30
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = 1
title = "Example Quiz"
description = "A short quiz to try quiztime"
subject = "general"
difficulty = "easy"
time_limit = 5

[[questions]]
question = "Which planet is closest to the Sun?"
options = ["Venus", "Mercury", "Mars", "Earth"]
correct_answer = 1
explanation = "Mercury orbits at about 0.39 AU."

[[questions]]
question = "What is 7 x 8?"
options = ["54", "56", "58", "64"]
correct_answer = 1

[[questions]]
question = "Which gas do plants absorb for photosynthesis?"
options = ["Oxygen", "Nitrogen", "Carbon dioxide", "Helium"]
correct_answer = 2
explanation = "Plants take in CO2 and release O2."
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quiztime_core::parser::{parse_quiz_str, validate_quiz};
    use std::path::Path;

    #[test]
    fn example_quiz_is_valid() {
        let quiz = parse_quiz_str(EXAMPLE_QUIZ, Path::new("example.toml")).unwrap();
        assert_eq!(quiz.question_count(), 3);
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn sample_config_parses() {
        let config = quiztime_client::config::parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.api.api_prefix, "/api/v1");
    }
}
