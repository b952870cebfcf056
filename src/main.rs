use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hhf_board::commands;
use hhf_board::store::Store;

#[derive(Parser)]
#[command(name = "hhf")]
#[command(about = "A tiny local question/answer board for study groups")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a board in the current directory
    Init,

    /// Post a new question
    Ask {
        /// Your display name (remembered for ownership checks)
        #[arg(short, long)]
        author: String,
        /// Subject (Math, Science, English, History, Languages, Arts, Other)
        #[arg(short, long)]
        subject: String,
        /// Question title (at least 8 characters)
        #[arg(short, long)]
        title: String,
        /// Question details (at least 24 characters)
        #[arg(short, long)]
        details: String,
    },

    /// List questions, newest first
    List,

    /// Show a question and its answers
    Show {
        /// Question ID
        id: i64,
    },

    /// Edit your own question
    Edit {
        /// Question ID
        id: i64,
        /// Act as this name instead of the remembered one
        #[arg(short, long)]
        author: Option<String>,
        /// New subject
        #[arg(short, long)]
        subject: String,
        /// New title
        #[arg(short, long)]
        title: String,
        /// New details
        #[arg(short, long)]
        details: String,
    },

    /// Delete your own question
    Delete {
        /// Question ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Work with a question's answers
    Answer {
        #[command(subcommand)]
        action: AnswerCommands,
    },

    /// Show or set the remembered display name
    Name {
        /// New display name (omit to show the current one)
        name: Option<String>,
    },

    /// Browse the board interactively
    Board,
}

#[derive(Subcommand)]
enum AnswerCommands {
    /// Add an answer to a question
    Add {
        /// Question ID
        post_id: i64,
        /// Answer text (at least 4 characters)
        details: String,
        /// Your display name (defaults to the remembered one)
        #[arg(short, long)]
        author: Option<String>,
    },
    /// Edit your own answer
    Edit {
        /// Question ID
        post_id: i64,
        /// Answer ID
        answer_id: i64,
        /// New answer text
        details: String,
        /// Act as this name instead of the remembered one
        #[arg(short, long)]
        author: Option<String>,
    },
    /// Delete your own answer
    Delete {
        /// Question ID
        post_id: i64,
        /// Answer ID
        answer_id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// List a question's answers, oldest first
    List {
        /// Question ID
        post_id: i64,
    },
}

fn find_board_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(commands::init::BOARD_DIR);
        if candidate.exists() && candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a board directory (or any parent). Run 'hhf init' first.");
        }
    }
}

fn get_store() -> Result<Store> {
    let board_dir = find_board_dir()?;
    let store_path = board_dir.join(commands::init::STORE_FILE);
    Store::open(&store_path).context("Failed to open board store")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let cwd = env::current_dir()?;
            commands::init::run(&cwd)
        }

        Commands::Ask {
            author,
            subject,
            title,
            details,
        } => {
            let store = get_store()?;
            commands::ask::run(&store, &author, &subject, &title, &details)
        }

        Commands::List => {
            let store = get_store()?;
            commands::list::run(&store)
        }

        Commands::Show { id } => {
            let store = get_store()?;
            commands::show::run(&store, id)
        }

        Commands::Edit {
            id,
            author,
            subject,
            title,
            details,
        } => {
            let store = get_store()?;
            commands::edit::run(&store, id, author.as_deref(), &subject, &title, &details)
        }

        Commands::Delete { id, force } => {
            let store = get_store()?;
            commands::delete::run(&store, id, force)
        }

        Commands::Answer { action } => {
            let store = get_store()?;
            match action {
                AnswerCommands::Add {
                    post_id,
                    details,
                    author,
                } => commands::answer::add(&store, post_id, author.as_deref(), &details),
                AnswerCommands::Edit {
                    post_id,
                    answer_id,
                    details,
                    author,
                } => commands::answer::edit(&store, post_id, answer_id, author.as_deref(), &details),
                AnswerCommands::Delete {
                    post_id,
                    answer_id,
                    force,
                } => commands::answer::remove(&store, post_id, answer_id, force),
                AnswerCommands::List { post_id } => commands::answer::list(&store, post_id),
            }
        }

        Commands::Name { name } => {
            let store = get_store()?;
            commands::name::run(&store, name.as_deref())
        }

        Commands::Board => {
            let store = get_store()?;
            commands::board::run(&store)
        }
    }
}
