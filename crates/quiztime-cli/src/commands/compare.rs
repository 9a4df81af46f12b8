//! The `quiztime compare` command.

use std::path::PathBuf;

use anyhow::Result;

use quiztime_core::report::AttemptReport;
use quiztime_core::review::format_duration;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = AttemptReport::load_json(&baseline_path)?;
    let current = AttemptReport::load_json(&current_path)?;

    let comparison = current.compare(&baseline)?;

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", comparison.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            // text format
            println!(
                "Retake of {}: {:.1}% -> {:.1}% ({:+.1}%)",
                comparison.quiz_title,
                comparison.baseline_score,
                comparison.current_score,
                comparison.delta
            );
            println!(
                "Time: {} -> {}",
                format_duration(comparison.baseline_secs),
                format_duration(comparison.current_secs)
            );

            if !comparison.newly_correct.is_empty() {
                println!("\nNow correct:");
                for q in &comparison.newly_correct {
                    println!("  Q{q}");
                }
            }

            if !comparison.newly_wrong.is_empty() {
                println!("\nNow wrong (regression):");
                for q in &comparison.newly_wrong {
                    println!("  Q{q}");
                }
            }

            println!("\n{} question(s) unchanged", comparison.unchanged);
        }
    }

    if fail_on_regression && comparison.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
