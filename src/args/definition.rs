//! Command-line argument definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// site-localizer - Localize static site pages from JSON translation files
#[derive(Parser, Debug)]
#[command(name = "site-localizer")]
#[command(version)]
#[command(about = "Localize static site pages from JSON translation files", long_about = None)]
pub struct Args {
    /// Path to i18n.yml (default: ~/.config/site-localizer/i18n.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL or directory of <locale>.json files (overrides `locales_base`)
    #[arg(long, global = true)]
    pub locales: Option<String>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Translate an HTML page and print what was applied
    Localize {
        /// Page to translate
        page: PathBuf,
        /// Switch to this locale after initialization
        #[arg(long)]
        lang: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Write the translated page here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print one translated string
    Lookup {
        /// Dot-delimited key, e.g. nav.home
        key: String,
        /// Locale to load (default: the preferred locale)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Switch and persist the preferred locale
    SetLanguage {
        /// Locale code, e.g. pt-BR
        code: String,
    },
    /// Print the preferred locale
    Current,
}

/// What: Run the parsed command.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - Process exit code (`0` on success, `1` on failure or an absent key).
///
/// Details:
/// - Loads configuration once and hands it to the selected handler.
pub async fn process_args(args: &Args) -> ExitCode {
    use crate::args::{commands, utils};

    let config = utils::load_settings(args);
    let result = match &args.command {
        Command::Localize {
            page,
            lang,
            json,
            output,
        } => commands::handle_localize(&config, page, lang.as_deref(), *json, output.as_deref()).await,
        Command::Lookup { key, lang } => commands::handle_lookup(&config, key, lang.as_deref()).await,
        Command::SetLanguage { code } => commands::handle_set_language(&config, code).await,
        Command::Current => Ok(commands::handle_current(&config)),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
