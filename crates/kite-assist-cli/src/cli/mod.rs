//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use kite_assist_core::settings::{AssistSettings, SettingsStore};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "kite-assist")]
#[command(version = "0.1")]
#[command(about = "Kubernetes assistant chat for the kite dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show model reasoning deltas on stderr while streaming
    #[arg(long, global = true)]
    show_thinking: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Interactive chat session (default)
    Chat,

    /// Send a single prompt and print the reply
    Exec {
        /// The prompt to send to the assistant
        #[arg(short, long)]
        prompt: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Show the effective settings (API key masked)
    Show,
    /// Set one settings field (api-url, api-key, model)
    Set {
        /// Field to set
        #[arg(value_name = "FIELD")]
        field: String,
        /// New value
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Verify connectivity against the configured endpoint
    Test,
    /// Remove the config file and restore defaults
    Reset,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // default to chat mode
    let Some(command) = cli.command else {
        let settings = AssistSettings::load().context("load settings")?;
        return commands::chat::run(&settings, cli.show_thinking).await;
    };

    match command {
        Commands::Chat => {
            let settings = AssistSettings::load().context("load settings")?;
            commands::chat::run(&settings, cli.show_thinking).await
        }

        Commands::Exec { prompt } => {
            let settings = AssistSettings::load().context("load settings")?;
            commands::exec::run(&settings, &prompt, cli.show_thinking).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Set { field, value } => {
                let mut store = SettingsStore::open().context("open settings store")?;
                commands::config::set(&mut store, &field, &value)
            }
            ConfigCommands::Test => {
                let settings = AssistSettings::load().context("load settings")?;
                commands::config::test(&settings).await
            }
            ConfigCommands::Reset => {
                let mut store = SettingsStore::open().context("open settings store")?;
                commands::config::reset(&mut store)
            }
        },
    }
}
