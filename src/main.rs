#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod errors;
mod filler;
mod matching;
mod page;
mod presets;
mod runner;
mod tab_focus;
mod types;
mod webdriver;
mod webdriver_manager;

#[cfg(test)]
mod mock_page;

use commands::utils::SessionArgs;
use types::{FieldMode, LocatorStrategy};

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "webfill")]
#[command(about = "Fill web forms over WebDriver with fuzzy select matching", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Browser to use
    #[arg(short, long, global = true, default_value = "chrome")]
    browser: String,

    /// Explicit WebDriver endpoint (skips driver auto-start)
    #[arg(long, global = true)]
    webdriver_url: Option<String>,

    /// Attach to a running Chrome via its debugger address (host:port)
    #[arg(long, global = true)]
    attach: Option<String>,

    /// Run the browser in visible mode (disables headless)
    #[arg(long = "no-headless", global = true)]
    no_headless: bool,

    /// Element/select wait timeout in seconds (default 10)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Minimum similarity score for select matching (default 0.5)
    #[arg(long, global = true)]
    threshold: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill one form field
    Fill {
        /// How to locate the element
        #[arg(value_enum)]
        by: LocatorStrategy,

        /// Locator value (id, name, class, selector or XPath)
        locator: String,

        /// Value to type, or the target text for select matching
        #[arg(default_value = "")]
        value: String,

        /// Fill as free text or by dropdown selection
        #[arg(short, long, value_enum, default_value = "normal")]
        mode: FieldMode,

        /// Navigate here first (otherwise the current page is used)
        #[arg(long)]
        url: Option<String>,
    },

    /// Fill every preset field in order, stopping at the first failure
    Run {
        /// Preset file (default: platform data dir)
        #[arg(long)]
        presets: Option<PathBuf>,

        /// JSON object mapping preset item names to input values
        #[arg(long)]
        values: Option<PathBuf>,

        /// Navigate here first (otherwise the current page is used)
        #[arg(long)]
        url: Option<String>,
    },

    /// Show stored presets as JSON
    Presets {
        /// Preset file (default: platform data dir)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    webdriver_manager::GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let exit_code = errors::exit_code_for(&err);

            // JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": err.to_string(),
                "exit_code": exit_code
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", err);
            std::process::exit(exit_code);
        }
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webfill=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr) // Output logs to stderr
                .with_target(false), // Don't show target module in logs
        )
        .init();

    let cli = Cli::parse();
    let session = SessionArgs {
        browser: cli.browser,
        webdriver_url: cli.webdriver_url,
        attach: cli.attach,
        no_headless: cli.no_headless,
    };
    let config = commands::utils::build_config(cli.timeout, cli.threshold);

    match cli.command {
        Commands::Fill {
            by,
            locator,
            value,
            mode,
            url,
        } => commands::fill::handle_fill(by, locator, value, mode, url, session, config).await,
        Commands::Run {
            presets,
            values,
            url,
        } => commands::run::handle_run(presets, values, url, session, config).await,
        Commands::Presets { file } => commands::presets::handle_presets(file),
    }
}
