//! toeic-vocab CLI: manage and review a learner's TOEIC vocabulary.

mod app;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use app::App;
use toeic_vocab::config::load_config_from;
use toeic_vocab::database::db::init_database;

#[derive(Parser)]
#[command(
    name = "toeic-vocab",
    version,
    about = "Spaced repetition vocabulary review"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and TOEIC_VOCAB_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Learner whose vocabulary is used
    #[arg(long)]
    owner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a word to the vocabulary
    Add {
        word: String,
        definition: String,

        /// Example sentence
        #[arg(long)]
        example: Option<String>,

        /// Part of speech (noun, verb, ...)
        #[arg(long)]
        part_of_speech: Option<String>,
    },

    /// List every word with its schedule
    List,

    /// List words due for review
    Due {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record the result of a review
    Review {
        word_id: i64,

        /// The word was answered correctly
        #[arg(long, conflicts_with = "incorrect", required_unless_present = "incorrect")]
        correct: bool,

        /// The word was answered incorrectly
        #[arg(long)]
        incorrect: bool,

        /// How easy the review felt, 1 (hard) to 5 (easy)
        #[arg(long)]
        difficulty: i64,
    },

    /// Delete a word and its review history
    Delete { word_id: i64 },

    /// Show review statistics
    Stats,

    /// Study due words interactively
    Study {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export the vocabulary to a JSON file
    Export { path: PathBuf },

    /// Import words from a JSON file
    Import { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config_from(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let conn = init_database(&config.database_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.database_path.display()
        )
    })?;
    let app = App::new(conn, cli.owner, config.default_due_limit);

    match cli.command {
        Commands::Add {
            word,
            definition,
            example,
            part_of_speech,
        } => app.add(word, definition, example, part_of_speech),
        Commands::List => app.list(),
        Commands::Due { limit } => app.due(limit),
        Commands::Review {
            word_id,
            correct,
            incorrect: _,
            difficulty,
        } => app.review(word_id, correct, difficulty),
        Commands::Delete { word_id } => app.delete(word_id),
        Commands::Stats => app.stats(),
        Commands::Study { limit } => {
            let stdin = std::io::stdin();
            app.study(limit, &mut stdin.lock(), &mut std::io::stdout())
        }
        Commands::Export { path } => app.export(&path),
        Commands::Import { path } => app.import(&path),
    }
}
