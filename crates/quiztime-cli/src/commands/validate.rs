//! The `quiztime validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quiztime_core::parser::{load_quizzes, validate_quiz};

pub fn execute(path: PathBuf) -> Result<()> {
    let quizzes = load_quizzes(&path)?;
    anyhow::ensure!(!quizzes.is_empty(), "no quiz files found in {}", path.display());

    let mut total_warnings = 0;

    for quiz in &quizzes {
        println!(
            "Quiz {}: {} ({} questions)",
            quiz.id,
            quiz.title,
            quiz.question_count()
        );

        let warnings = validate_quiz(quiz);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [Q{n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
