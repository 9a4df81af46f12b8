//! The `quiztime take` command.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use quiztime_client::config::{create_api, load_config_from};
use quiztime_core::clock::SystemClock;
use quiztime_core::error::SessionError;
use quiztime_core::model::Quiz;
use quiztime_core::parser::{parse_quiz, validate_quiz};
use quiztime_core::report::AttemptReport;
use quiztime_core::review::{format_countdown, is_running_low, option_label};
use quiztime_core::scoring::check_agreement;
use quiztime_core::session::{QuizSession, SessionHooks, Submission, TickOutcome};
use quiztime_core::timer::Ticker;
use quiztime_core::traits::QuizApi;

const HELP: &str = "Commands: 1-9 or a-z answer | n next | p previous | g <k> go to question k | s submit | q quit | ? help";

/// Terminal notifications for session events.
struct ConsoleHooks;

impl SessionHooks for ConsoleHooks {
    fn on_submitted(&self, submission: &Submission) {
        let how = if submission.auto_submitted {
            "automatically"
        } else {
            "by you"
        };
        match submission.unanswered_count() {
            0 => eprintln!("Quiz submitted {how}."),
            n => eprintln!("Quiz submitted {how} with {n} question(s) unanswered."),
        }
    }

    fn on_exit(&self, session: &QuizSession) {
        eprintln!(
            "Quiz abandoned with {} of {} questions answered.",
            session.answered_count(),
            session.question_count()
        );
    }
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer(usize),
    Next,
    Previous,
    GoTo(usize),
    Submit,
    Quit,
    Help,
}

/// Parse a command line. Blank lines parse to `None`.
///
/// Command letters win over option letters; every option can also be
/// chosen by number.
fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let head = head.to_ascii_lowercase();
    let arg = parts.next();

    let input = match (head.as_str(), arg) {
        ("n", None) => Input::Next,
        ("p", None) => Input::Previous,
        ("s", None) => Input::Submit,
        ("q", None) => Input::Quit,
        ("?", None) => Input::Help,
        ("g", Some(k)) => match k.parse::<usize>() {
            Ok(k) if k >= 1 => Input::GoTo(k - 1),
            _ => return Err(format!("not a question number: {k}")),
        },
        ("g", None) => return Err("usage: g <question number>".into()),
        (word, None) => {
            if let Ok(number) = word.parse::<usize>() {
                if number == 0 {
                    return Err("options are numbered from 1".into());
                }
                Input::Answer(number - 1)
            } else if let [letter @ b'a'..=b'z'] = word.as_bytes() {
                Input::Answer(usize::from(letter - b'a'))
            } else {
                return Err(format!("unknown command: {word} (type ? for help)"));
            }
        }
        _ => return Err(format!("unknown command: {} (type ? for help)", line.trim())),
    };
    Ok(Some(input))
}

/// How an interactive session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    Submitted(Submission),
    Abandoned,
}

#[derive(Debug)]
enum Step {
    Continue,
    Submit,
    Quit,
}

/// Run an interactive session over `input` until it is submitted or abandoned.
///
/// Each heartbeat from `ticker` consumes one second of the countdown. Closing
/// the input submits the attempt.
pub async fn run_session<R, W>(
    mut session: QuizSession,
    input: R,
    mut ticker: Option<Ticker>,
    out: &mut W,
) -> Result<SessionOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    let quiz = Arc::clone(session.quiz());
    writeln!(out, "{} ({} questions)", quiz.title, quiz.question_count())?;
    match session.remaining_secs() {
        Some(secs) => writeln!(out, "Time limit: {}", format_countdown(secs))?,
        None => writeln!(out, "No time limit")?,
    }
    writeln!(out, "{HELP}")?;
    print_question(&session, out)?;

    let submission = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    tracing::debug!("input closed, submitting");
                    break Some(session.submit());
                };
                match parse_input(&line) {
                    Ok(None) => {}
                    Ok(Some(input)) => match apply(&mut session, input, out)? {
                        Step::Continue => {}
                        Step::Submit => break Some(session.submit()),
                        Step::Quit => break None,
                    },
                    Err(message) => writeln!(out, "{message}")?,
                }
            }
            _ = heartbeat(&mut ticker) => {
                match session.tick() {
                    TickOutcome::AutoSubmitted(submission) => {
                        writeln!(out, "\nTime is up! Your answers were submitted.")?;
                        break Some(submission);
                    }
                    TickOutcome::Running { remaining_secs } => {
                        if remaining_secs % 60 == 0 || remaining_secs <= 10 {
                            let hurry = if is_running_low(remaining_secs) { "Hurry: " } else { "" };
                            writeln!(out, "{hurry}{} remaining", format_countdown(remaining_secs))?;
                        }
                    }
                    TickOutcome::Untimed | TickOutcome::Closed => {}
                }
            }
        }
    };
    drop(ticker);

    match submission {
        Some(submission) => Ok(SessionOutcome::Submitted(submission)),
        None => {
            writeln!(out, "Left the quiz without submitting.")?;
            session.abandon();
            Ok(SessionOutcome::Abandoned)
        }
    }
}

/// Wait for the next heartbeat; never resolves without a running ticker.
async fn heartbeat(ticker: &mut Option<Ticker>) {
    if let Some(ticker) = ticker {
        if ticker.next().await.is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}

fn apply<W: Write>(session: &mut QuizSession, input: Input, out: &mut W) -> Result<Step> {
    let result = match input {
        Input::Answer(option) => session.select_current(option),
        Input::Next => session.next().map(drop),
        Input::Previous => session.previous().map(drop),
        Input::GoTo(index) => session.go_to(index),
        Input::Submit => return Ok(Step::Submit),
        Input::Quit => return Ok(Step::Quit),
        Input::Help => {
            writeln!(out, "{HELP}")?;
            print_navigator(session, out)?;
            return Ok(Step::Continue);
        }
    };

    match result {
        Ok(()) => print_question(session, out)?,
        Err(e) if e.is_misuse() => writeln!(out, "{}", misuse_hint(&e))?,
        Err(e) => return Err(e.into()),
    }
    Ok(Step::Continue)
}

/// A 1-based hint for input that names a missing option or question.
fn misuse_hint(error: &SessionError) -> String {
    match error {
        SessionError::InvalidAnswer {
            option,
            option_count,
            ..
        } => format!("No option {}; choose 1-{option_count}.", option + 1),
        SessionError::OutOfRange { index, count } => {
            format!("No question {}; the quiz has {count}.", index + 1)
        }
        other => other.to_string(),
    }
}

fn print_question<W: Write>(session: &QuizSession, out: &mut W) -> std::io::Result<()> {
    let index = session.current_index();
    let question = session.current_question();
    let clock = session
        .remaining_secs()
        .map(|secs| format!("  [{}]", format_countdown(secs)))
        .unwrap_or_default();

    writeln!(
        out,
        "\nQuestion {}/{} ({} answered){clock}",
        index + 1,
        session.question_count(),
        session.answered_count()
    )?;
    writeln!(out, "{}", question.prompt)?;
    let selected = session.answer_for(index);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(i) { '*' } else { ' ' };
        writeln!(out, " {marker} {}) {option}", option_label(i))?;
    }
    Ok(())
}

fn print_navigator<W: Write>(session: &QuizSession, out: &mut W) -> std::io::Result<()> {
    let cells: Vec<String> = session
        .navigator()
        .iter()
        .map(|entry| {
            let mark = if entry.current {
                ">"
            } else if entry.answered {
                "x"
            } else {
                "."
            };
            format!("{}{mark}", entry.index + 1)
        })
        .collect();
    writeln!(out, "{}", cells.join(" "))
}

/// Score, print, submit and save a finished attempt.
///
/// A failed submission is reported and the local result is still saved.
pub async fn finalize<W: Write>(
    quiz: &Quiz,
    submission: &Submission,
    api: Option<&dyn QuizApi>,
    results_dir: &Path,
    out: &mut W,
) -> Result<(AttemptReport, PathBuf)> {
    let mut report = AttemptReport::from_submission(quiz, submission)?;
    writeln!(out, "\n{}", report.review().to_text())?;

    if let Some(api) = api {
        match api.submit_attempt(&submission.to_attempt()).await {
            Ok(record) => {
                if let Err(divergence) = check_agreement(&report.result, &record) {
                    writeln!(out, "Warning: the server scored this attempt differently: {divergence}")?;
                }
                writeln!(out, "Saved on {} as attempt #{}.", api.name(), record.id)?;
                report.server = Some(record);
            }
            Err(e) => {
                tracing::warn!(quiz_id = quiz.id, "submission failed: {e:#}");
                writeln!(out, "Could not submit the attempt ({e:#}). Your result is kept locally.")?;
            }
        }
    }

    let short_id = report.id.simple().to_string();
    let path = results_dir.join(format!(
        "attempt-{}-{}-{}.json",
        quiz.id,
        report.created_at.format("%Y-%m-%dT%H%M%S"),
        &short_id[..8]
    ));
    report.save_json(&path)?;
    writeln!(out, "Attempt saved to: {}", path.display())?;

    Ok((report, path))
}

pub async fn execute(
    quiz_id: Option<u64>,
    file: Option<PathBuf>,
    offline: bool,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let offline = offline || config.offline;
    let api = if offline {
        None
    } else {
        Some(create_api(&config.api)?)
    };

    let quiz = match (file, quiz_id) {
        (Some(path), _) => {
            let quiz = parse_quiz(&path)?;
            for warning in validate_quiz(&quiz) {
                let prefix = warning
                    .question
                    .map(|n| format!("[Q{n}] "))
                    .unwrap_or_default();
                eprintln!("WARNING: {prefix}{}", warning.message);
            }
            quiz
        }
        (None, Some(id)) => {
            let api = api
                .as_deref()
                .context("--quiz needs the quiz API; use --file when offline")?;
            api.fetch_quiz(id)
                .await
                .with_context(|| format!("failed to fetch quiz {id}"))?
        }
        (None, None) => anyhow::bail!("either --quiz or --file is required"),
    };

    let results_dir = output.unwrap_or(config.results_dir);
    let quiz = Arc::new(quiz);
    let session = QuizSession::start_with(
        Arc::clone(&quiz),
        Arc::new(SystemClock),
        Arc::new(ConsoleHooks),
    )?;
    let ticker = session.is_timed().then(Ticker::every_second);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match run_session(session, stdin, ticker, &mut stdout).await? {
        SessionOutcome::Submitted(submission) => {
            finalize(&quiz, &submission, api.as_deref(), &results_dir, &mut stdout).await?;
        }
        SessionOutcome::Abandoned => {}
    }
    Ok(())
}
