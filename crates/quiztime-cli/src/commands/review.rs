//! The `quiztime review` command.

use std::path::PathBuf;

use anyhow::Result;

use quiztime_core::report::AttemptReport;
use quiztime_report::html::write_html_report;
use quiztime_report::markdown::{generate_markdown, write_markdown_report};

pub fn execute(report_path: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let report = AttemptReport::load_json(&report_path)?;

    match format.as_str() {
        "html" => {
            let path = output.unwrap_or_else(|| report_path.with_extension("html"));
            write_html_report(&report, &path)?;
            println!("HTML report: {}", path.display());
        }
        "markdown" | "md" => match output {
            Some(path) => {
                write_markdown_report(&report, &path)?;
                println!("Markdown report: {}", path.display());
            }
            None => println!("{}", generate_markdown(&report)),
        },
        "text" => {
            let text = report.review().to_text();
            match output {
                Some(path) => std::fs::write(&path, text)?,
                None => println!("{text}"),
            }
            if let Some(server) = &report.server {
                println!("Server record: attempt #{} ({:.1}%)", server.id, server.score);
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected text, html or markdown)"),
    }

    Ok(())
}

