use std::panic;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;

use dashlet::{
    cli::{self, RootCommand},
    config::Config,
    logging::{init_logging, print_log_location},
    store::sqlite::SqliteStore,
    theme::Theme,
    tui,
};

#[derive(Parser, Debug)]
#[command(
    name = "dashlet",
    about = "Terminal dashboard with tabs, tasks, activity, and settings",
    long_about = "A persistent dashboard widget for the terminal: tabbed navigation, a task list, an activity log, and a settings form, all backed by a key-value store.",
    version = env!("DASHLET_BUILD_VERSION"),
    author
)]
struct Cli {
    /// Path to the key-value store database.
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[arg(long, value_name = "light|dark")]
    theme: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<RootCommand>,
}

enum RunOutcome {
    Continue,
    Exit(i32),
}

fn main() -> Result<()> {
    let log_path = match init_logging() {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("warning: failed to initialize logging: {err}");
            None
        }
    };
    if let Some(path) = log_path.as_ref() {
        install_panic_hook_with_log(path.clone());
    }

    match run_app() {
        Ok(RunOutcome::Continue) => {
            if let Some(path) = log_path.as_ref() {
                print_log_location(path);
            }
            Ok(())
        }
        Ok(RunOutcome::Exit(code)) => {
            std::process::exit(code);
        }
        Err(err) => {
            tui::restore_terminal();
            if let Some(path) = log_path.as_ref() {
                print_log_location(path);
            }
            Err(err)
        }
    }
}

fn run_app() -> Result<RunOutcome> {
    let cli = Cli::parse();

    let store_path = cli.store.clone().unwrap_or_else(default_store_path);

    if let Some(command) = cli.command {
        let code = cli::run(&store_path, command, cli.json, cli.quiet);
        return Ok(RunOutcome::Exit(code));
    }

    let theme_override = match cli.theme.as_deref() {
        Some(raw) => match Theme::from_str(raw) {
            Ok(theme) => Some(theme),
            Err(()) => {
                eprintln!("error[THEME_INVALID]: expected 'light' or 'dark', got '{raw}'");
                return Ok(RunOutcome::Exit(2));
            }
        },
        None => None,
    };

    let config = Config::load();
    let store = SqliteStore::open(&store_path)?;
    tui::run(store, &config, theme_override)?;

    Ok(RunOutcome::Continue)
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("dashlet").join("dashboard.db"))
        .unwrap_or_else(|| PathBuf::from("dashboard.db"))
}

fn install_panic_hook_with_log(log_path: PathBuf) {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        tui::restore_terminal();
        eprintln!();
        eprintln!("═══════════════════════════════════════════════════════════════");
        eprintln!("  📝 Log file: {}", log_path.display());
        eprintln!("═══════════════════════════════════════════════════════════════");
        eprintln!();
        previous_hook(panic_info);
    }));
}
