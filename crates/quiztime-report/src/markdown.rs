//! Markdown report generator, for pasting results into notes or issues.

use anyhow::Result;
use std::path::Path;

use quiztime_core::report::AttemptReport;
use quiztime_core::review::option_label;

/// Generate a markdown summary of an attempt.
pub fn generate_markdown(report: &AttemptReport) -> String {
    let review = report.review();
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", review.quiz_title));
    md.push_str(&format!(
        "_{} | {} | {}_\n\n",
        review.subject,
        review.difficulty,
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    md.push_str("| Score | Grade | Correct | Answered | Time |\n");
    md.push_str("|-------|-------|---------|----------|------|\n");
    md.push_str(&format!(
        "| {}% | {} | {}/{} | {}/{} | {} |\n\n",
        review.display_score,
        review.grade.letter(),
        review.correct_count,
        review.total_questions,
        review.answered_count,
        review.total_questions,
        review.time_taken
    ));

    if report.auto_submitted {
        md.push_str("> Submitted automatically when time ran out.\n\n");
    }

    for q in &review.questions {
        let mark = if q.is_correct {
            "✅"
        } else if q.unanswered {
            "⬜"
        } else {
            "❌"
        };
        md.push_str(&format!("### {mark} {}. {}\n\n", q.number, q.prompt));
        for (i, option) in q.options.iter().enumerate() {
            let text = if option.is_correct {
                format!("**{}**", option.text)
            } else if option.is_wrong_pick {
                format!("~~{}~~", option.text)
            } else {
                option.text.clone()
            };
            let picked = if option.is_selected { " (your answer)" } else { "" };
            md.push_str(&format!("- {}) {text}{picked}\n", option_label(i)));
        }
        if let Some(explanation) = &q.explanation {
            md.push_str(&format!("\n> {explanation}\n"));
        }
        md.push('\n');
    }

    md
}

/// Write a markdown report to a file.
pub fn write_markdown_report(report: &AttemptReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(report))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::tests::make_test_report;

    #[test]
    fn markdown_summarizes_attempt() {
        let md = generate_markdown(&make_test_report());

        assert!(md.starts_with("# Cells & <Organelles>"));
        assert!(md.contains("| 33% | F | 1/3 | 2/3 | 1m 35s |"));
        assert!(md.contains("Submitted automatically"));
        assert!(md.contains("### ✅ 1. Powerhouse of the cell?"));
        assert!(md.contains("- b) **Mitochondria** (your answer)"));
        assert!(md.contains("- b) ~~Vacuole~~ (your answer)"));
        assert!(md.contains("### ⬜ 3."));
        assert!(md.contains("> ATP is produced there."));
    }

    #[test]
    fn markdown_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempt.md");
        write_markdown_report(&make_test_report(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Grade"));
    }
}
