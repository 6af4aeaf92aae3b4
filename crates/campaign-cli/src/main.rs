mod cmd;
mod launch;
mod output;
mod root;

use campaign_core::campaign::parse_date;
use campaign_core::milestone::CheckState;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, show::Document};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "campaign",
    about = "Six-week campaigns with recovery periods: milestones, focus and progress from a plain-text file",
    version,
    propagate_version = true
)]
struct Cli {
    /// Vault directory (default: ~/Documents/campaigno)
    #[arg(long, global = true, env = "CAMPAIGN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true, env = "CAMPAIGN_TODAY", value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the vault: campaigns file, config, wiki, history, quotes and notes/
    Init,

    /// Show the name, start date and description of the active campaign
    Info,

    /// Show the current milestone and progress
    Current,

    /// Show phase, week, days left, focus and all milestones
    Status,

    /// Mark the current milestone done
    Done {
        /// Mark the Nth pending main milestone instead (1-based)
        #[arg(long)]
        task: Option<usize>,
    },

    /// Mark the current milestone skipped
    Skip {
        /// Skip the Nth pending main milestone instead (1-based)
        #[arg(long)]
        task: Option<usize>,
    },

    /// Append a new campaign starting today
    New {
        /// Campaign name
        name: String,
    },

    /// List every campaign record and how it was read
    List,

    /// Open the campaigns file in the editor
    Edit,

    /// Write a dated note for the current milestone
    Note {
        /// Create the note without opening the editor
        #[arg(long)]
        no_open: bool,
    },

    /// Open the wiki
    Wiki,

    /// Open the campaign history
    History,

    /// Open the "yourself" file
    Yourself,

    /// Print a random quote
    Motivate,

    /// Print a shell prompt segment for the active campaign
    Prompt,

    /// Inspect the config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let json = cli.json;

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, today, json),
        Commands::Info => cmd::info::run(&root, today, json),
        Commands::Current => cmd::current::run(&root, today, json),
        Commands::Status => cmd::status::run(&root, today, json),
        Commands::Done { task } => cmd::mark::run(&root, today, CheckState::Done, task, json),
        Commands::Skip { task } => cmd::mark::run(&root, today, CheckState::Skipped, task, json),
        Commands::New { name } => cmd::new::run(&root, &name, today, json),
        Commands::List => cmd::list::run(&root, today, json),
        Commands::Edit => cmd::edit::run(&root, today),
        Commands::Note { no_open } => cmd::note::run(&root, today, no_open, json),
        Commands::Wiki => cmd::show::run(&root, Document::Wiki),
        Commands::History => cmd::show::run(&root, Document::History),
        Commands::Yourself => cmd::show::run(&root, Document::Yourself),
        Commands::Motivate => cmd::motivate::run(&root, json),
        Commands::Prompt => cmd::prompt::run(&root, today),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
