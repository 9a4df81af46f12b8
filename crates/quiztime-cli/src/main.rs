//! quiztime CLI — take timed quizzes in the terminal.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quiztime", version, about = "Timed multiple-choice quizzes in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz
    Take {
        /// Quiz id to fetch from the API
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        quiz: Option<u64>,

        /// Local quiz TOML file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Do not contact the API
        #[arg(long)]
        offline: bool,

        /// Where to save the attempt report (default: config results_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the review of a saved attempt
    Review {
        /// Attempt report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, html, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare two attempts at the same quiz
    Compare {
        /// Earlier attempt report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Later attempt report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any question went from right to wrong
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        path: PathBuf,
    },

    /// List available quizzes
    List {
        /// Only quizzes for this subject
        #[arg(long)]
        subject: Option<String>,

        /// List local quiz files instead of asking the API
        #[arg(long)]
        path: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quiztime=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            file,
            offline,
            output,
            config,
        } => commands::take::execute(quiz, file, offline, output, config).await,
        Commands::Review {
            report,
            format,
            output,
        } => commands::review::execute(report, format, output),
        Commands::Compare {
            baseline,
            current,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, fail_on_regression, format),
        Commands::Validate { path } => commands::validate::execute(path),
        Commands::List {
            subject,
            path,
            config,
        } => commands::list::execute(subject, path, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }

    // A blocked stdin read cannot be cancelled and would hold the runtime open.
    let _ = std::io::stdout().flush();
    process::exit(0);
}
