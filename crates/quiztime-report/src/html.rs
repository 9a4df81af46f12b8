//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use quiztime_core::report::AttemptReport;
use quiztime_core::review::{option_label, QuestionReview};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML results page from an attempt report.
pub fn generate_html(report: &AttemptReport) -> String {
    let review = report.review();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Quiz results: {}</title>\n",
        html_escape(&review.quiz_title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&review.quiz_title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} | {} questions | {}</p>\n",
        html_escape(&review.subject),
        html_escape(&review.difficulty),
        review.total_questions,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score card
    html.push_str("<section class=\"score-card\">\n");
    html.push_str(&format!(
        "<div class=\"score {}\">{}%</div>\n",
        review.tone.as_str(),
        review.display_score
    ));
    html.push_str(&format!(
        "<div class=\"grade\">{} <span>({})</span></div>\n",
        review.grade.letter(),
        review.grade
    ));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Correct</th><td>{}/{}</td></tr>\n",
        review.correct_count, review.total_questions
    ));
    html.push_str(&format!(
        "<tr><th>Answered</th><td>{}/{}</td></tr>\n",
        review.answered_count, review.total_questions
    ));
    html.push_str(&format!(
        "<tr><th>Time taken</th><td>{}</td></tr>\n",
        html_escape(&review.time_taken)
    ));
    if report.auto_submitted {
        html.push_str("<tr><th>Submitted</th><td>automatically (time expired)</td></tr>\n");
    }
    if let Some(server) = &report.server {
        html.push_str(&format!(
            "<tr><th>Server record</th><td>#{} ({:.1}%)</td></tr>\n",
            server.id, server.score
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-question review
    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Review</h2>\n");
    for question in &review.questions {
        html.push_str(&question_html(question));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn question_html(question: &QuestionReview) -> String {
    let status = if question.is_correct {
        "correct"
    } else if question.unanswered {
        "unanswered"
    } else {
        "wrong"
    };

    let mut html = format!("<article class=\"question {status}\">\n");
    html.push_str(&format!(
        "<h3>{}. {} <span class=\"badge\">{status}</span></h3>\n",
        question.number,
        html_escape(&question.prompt)
    ));
    html.push_str("<ol class=\"options\">\n");
    for (i, option) in question.options.iter().enumerate() {
        let class = if option.is_correct {
            "right"
        } else if option.is_wrong_pick {
            "wrong-pick"
        } else {
            ""
        };
        let marker = if option.is_selected { " (your answer)" } else { "" };
        html.push_str(&format!(
            "<li class=\"{class}\"><b>{})</b> {}{marker}</li>\n",
            option_label(i),
            html_escape(&option.text)
        ));
    }
    html.push_str("</ol>\n");
    if let Some(explanation) = &question.explanation {
        html.push_str(&format!(
            "<p class=\"explanation\">{}</p>\n",
            html_escape(explanation)
        ));
    }
    html.push_str("</article>\n");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AttemptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --good: #16a34a; --fair: #ca8a04; --poor: #dc2626; --right: #dcfce7; --wrong: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --right: #064e3b; --wrong: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 60rem; }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { font-size: 3rem; font-weight: bold; }
.score.good { color: var(--good); }
.score.fair { color: var(--fair); }
.score.poor { color: var(--poor); }
.grade { font-size: 1.5rem; }
.grade span { color: #6b7280; font-size: 1rem; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
.question { border: 1px solid var(--border); border-radius: 8px; padding: 0 1rem; margin: 1rem 0; }
.question.correct { border-left: 6px solid var(--good); }
.question.wrong { border-left: 6px solid var(--poor); }
.question.unanswered { border-left: 6px solid #9ca3af; }
.badge { font-size: 0.75rem; text-transform: uppercase; color: #6b7280; }
.options { list-style: none; padding: 0; }
.options li { padding: 0.25rem 0.5rem; border-radius: 4px; }
.right { background: var(--right); }
.wrong-pick { background: var(--wrong); }
.explanation { font-style: italic; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;
