//! Shared utilities for argument processing.

use site_localizer::config::{self, Config};
use site_localizer::i18n::AnySource;

/// Init attempts allowed to one CLI invocation when the config sets no limit.
pub const CLI_MAX_ATTEMPTS: u32 = 3;

/// What: Determine the log level based on command-line arguments and environment variables.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides `log_level` argument.
/// - `SITE_LOCALIZER_TRACE=1` enables TRACE level.
pub fn determine_log_level(args: &crate::args::Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else if std::env::var("SITE_LOCALIZER_TRACE").ok().as_deref() == Some("1") {
        "trace".to_string()
    } else {
        args.log_level.clone()
    }
}

/// What: Load the configuration the command runs with.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - `Config` from `--config`, the user/development locations, or defaults.
///
/// Details:
/// - `--locales` replaces `locales_base`.
/// - An unbounded retry policy is capped at [`CLI_MAX_ATTEMPTS`] so a missing
///   page anchor cannot keep the process alive forever.
pub fn load_settings(args: &crate::args::Args) -> Config {
    let mut settings = match args.config.as_deref() {
        Some(path) => config::load_config(path),
        None => config::find_config_file()
            .map(|path| config::load_config(&path))
            .unwrap_or_default(),
    };
    if let Some(base) = &args.locales {
        settings.locales_base.clone_from(base);
    }
    if settings.retry.max_attempts.is_none() {
        settings.retry.max_attempts = Some(CLI_MAX_ATTEMPTS);
    }
    settings
}

/// Translation source for the configured `locales_base`.
pub fn make_source(settings: &Config) -> AnySource {
    AnySource::from_base(&settings.locales_base)
}
