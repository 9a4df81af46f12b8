//! The `quiztime list` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quiztime_client::config::{create_api, load_config_from};
use quiztime_core::model::{Quiz, QuizSummary};
use quiztime_core::parser::load_quizzes;

pub async fn execute(
    subject: Option<String>,
    path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let quizzes: Vec<Quiz> = match path {
        Some(path) => load_quizzes(&path)?
            .into_iter()
            .filter(|q| {
                subject
                    .as_deref()
                    .map_or(true, |s| q.subject.eq_ignore_ascii_case(s))
            })
            .collect(),
        None => {
            let config = load_config_from(config_path.as_deref())?;
            anyhow::ensure!(
                !config.offline,
                "offline mode is configured; use --path to list local quiz files"
            );
            let api = create_api(&config.api)?;
            api.list_quizzes(subject.as_deref())
                .await
                .with_context(|| format!("failed to list quizzes from {}", config.api.base_url))?
        }
    };

    if quizzes.is_empty() {
        println!("No quizzes found.");
        return Ok(());
    }

    let summaries: Vec<QuizSummary> = quizzes.iter().map(Quiz::summary).collect();
    println!("{}", summary_table(&summaries));
    Ok(())
}

fn summary_table(summaries: &[QuizSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Title",
        "Subject",
        "Difficulty",
        "Questions",
        "Time limit",
    ]);

    for s in summaries {
        let limit = match s.time_limit_minutes {
            Some(minutes) if minutes > 0 => format!("{minutes} min"),
            _ => "untimed".to_string(),
        };
        table.add_row(vec![
            Cell::new(s.id),
            Cell::new(&s.title),
            Cell::new(&s.subject),
            Cell::new(s.difficulty),
            Cell::new(s.question_count),
            Cell::new(limit),
        ]);
    }

    table
}
