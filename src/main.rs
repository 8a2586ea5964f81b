// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use expense_classifier::{
    history, submit, train_default, AppConfig, CsvLedgerStore, FrequencyChart, LedgerTable, Model,
    Report, Submission,
};

#[derive(Parser)]
#[command(
    name = "expense-classifier",
    version,
    about = "Classify transaction messages into spending categories"
)]
struct Cli {
    /// Directory holding the per-user ledger files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify messages (one per line) from a file or stdin and save them
    Classify {
        #[arg(short, long)]
        user: String,

        /// Read messages from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a user's saved ledger
    Show {
        #[arg(short, long)]
        user: String,

        #[arg(long)]
        json: bool,
    },
    /// List users with a saved ledger
    Users,
    /// Interactive form (default)
    Ui,
}

fn main() -> Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {}", e);
    }

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command.unwrap_or(Command::Ui) {
        Command::Classify { user, file, json } => run_classify(&config, &user, file, json),
        Command::Show { user, json } => run_show(&config, &user, json),
        Command::Users => run_users(&config),
        Command::Ui => run_ui_mode(&config),
    }
}

fn load_model(config: &AppConfig, quiet: bool) -> Result<Model> {
    if !quiet {
        println!("🧠 Training classifier...");
    }
    let model = train_default(&config.training).context("Failed to train classifier")?;
    if !quiet {
        println!(
            "✓ Trained on {} categories, {} terms ({} iterations)\n",
            model.categories().len(),
            model.vocabulary_len(),
            model.iterations()
        );
    }
    Ok(model)
}

fn run_classify(config: &AppConfig, user: &str, file: Option<PathBuf>, json: bool) -> Result<()> {
    let block = match file {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read messages file: {:?}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read messages from stdin")?;
            buf
        }
    };

    let model = load_model(config, json)?;
    let store = CsvLedgerStore::new(&config.data_dir);

    match submit(&model, &store, user, &block)? {
        Submission::Rejected(warning) => {
            eprintln!("⚠️  {}", warning);
        }
        Submission::Accepted(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✓ Classified {} new message(s) for {}\n", report.added, report.key);
                print_report(&report);
                println!(
                    "\n💾 Saved to {:?}",
                    store.path_for(&report.key)
                );
            }
        }
    }

    Ok(())
}

fn run_show(config: &AppConfig, user: &str, json: bool) -> Result<()> {
    let store = CsvLedgerStore::new(&config.data_dir);

    let Some(report) = history(&store, user)? else {
        eprintln!("ℹ️  Please enter your name to begin.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.entries.is_empty() {
        println!("No transactions saved for {}", report.key);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn run_users(config: &AppConfig) -> Result<()> {
    let store = CsvLedgerStore::new(&config.data_dir);
    let keys = store
        .keys()
        .with_context(|| format!("Failed to list ledgers in {:?}", store.data_dir()))?;

    if keys.is_empty() {
        println!("No ledgers in {:?}", store.data_dir());
    }
    for key in keys {
        println!("{}", key);
    }

    Ok(())
}

fn print_report(report: &Report) {
    println!("📄 Categorized Transactions");
    print!("{}", LedgerTable::new(&report.entries));
    println!("\n📊 Expense Breakdown by Category");
    print!("{}", FrequencyChart::new(&report.frequencies));
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    println!("🖥️  Loading Expense Classifier UI...\n");

    let model = load_model(config, false)?;
    let store = CsvLedgerStore::new(&config.data_dir);

    println!("Starting UI... (Press Esc to quit)\n");

    let mut app = ui::App::new(&model, &store);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or classify from stdin: expense-classifier classify --user <NAME>");
    std::process::exit(1);
}
