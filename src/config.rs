//! Configuration file (`i18n.yml`) and well-known paths.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::i18n::lifecycle::{PollPolicy, RetryPolicy};
use crate::i18n::loader::is_remote_base;

/// Directory name used under the XDG config directory.
const APP_DIR: &str = "site-localizer";

/// Shortest delay between init attempts; lower configured values are raised to it.
pub const MIN_RETRY_INTERVAL_MS: u64 = 50;

/// Localizer settings read from `i18n.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Locale used when no valid preference is stored.
    pub default_locale: String,
    /// Supported locales in fallback priority order.
    pub fallbacks: Vec<String>,
    /// Base URL or directory holding `<locale>.json` documents.
    pub locales_base: String,
    /// Short labels shown on the selector trigger, keyed by locale.
    pub labels: BTreeMap<String, String>,
    /// Init retry settings.
    pub retry: RetrySettings,
    /// Selector-anchor polling settings.
    pub dom_poll: PollSettings,
}

/// `retry:` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Delay between init attempts, in milliseconds.
    pub interval_ms: u64,
    /// Maximum number of init attempts; unbounded when absent.
    pub max_attempts: Option<u32>,
}

/// `dom_poll:` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Delay between polls, in milliseconds.
    pub interval_ms: u64,
    /// Number of polls before giving up.
    pub attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        let labels = [("pt-BR", "PT"), ("en", "EN"), ("es", "ES")]
            .into_iter()
            .map(|(code, label)| (code.to_string(), label.to_string()))
            .collect();
        Self {
            default_locale: "pt-BR".to_string(),
            fallbacks: vec!["pt-BR".to_string(), "en".to_string(), "es".to_string()],
            locales_base: "../locales".to_string(),
            labels,
            retry: RetrySettings::default(),
            dom_poll: PollSettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            max_attempts: None,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            attempts: 50,
        }
    }
}

impl Config {
    /// Retry policy described by the `retry:` section.
    ///
    /// The interval never drops below [`MIN_RETRY_INTERVAL_MS`], so an
    /// unbounded policy cannot spin.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(self.retry.interval_ms.max(MIN_RETRY_INTERVAL_MS)),
            max_attempts: self.retry.max_attempts,
        }
    }

    /// Poll policy described by the `dom_poll:` section.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.dom_poll.interval_ms),
            attempts: self.dom_poll.attempts.max(1),
        }
    }
}

/// What: Parse `i18n.yml` content.
///
/// Inputs:
/// - `yaml`: File content
///
/// Output:
/// - Parsed `Config`; missing keys take their defaults
///
/// # Errors
/// - Returns `Err` with the parser message when the YAML is invalid
pub fn parse_config(yaml: &str) -> Result<Config, String> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_norway::from_str(yaml).map_err(|e| format!("Failed to parse YAML: {e}"))
}

/// What: Load configuration from `path`, falling back to defaults.
///
/// Inputs:
/// - `path`: Path to `i18n.yml`
///
/// Output:
/// - Parsed `Config`, or `Config::default()` when unreadable or invalid
///
/// Details:
/// - Failures are logged as warnings and never abort startup.
/// - A relative directory in `locales_base` is resolved against the
///   directory holding `path`.
#[must_use]
pub fn load_config(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(contents) => match parse_config(&contents) {
            Ok(mut config) => {
                if let Some(dir) = path.parent() {
                    config.locales_base = resolve_locales_base(&config.locales_base, dir);
                }
                tracing::debug!(
                    path = %path.display(),
                    locales_base = %config.locales_base,
                    "loaded i18n config"
                );
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid i18n config; using defaults");
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read i18n config; using defaults");
            Config::default()
        }
    }
}

/// What: Anchor a relative locale directory at the config file's directory.
///
/// Inputs:
/// - `base`: `locales_base` as written in the file
/// - `config_dir`: Directory containing the config file
///
/// Output:
/// - `base` unchanged for URLs and absolute paths, `config_dir/base` otherwise
#[must_use]
pub fn resolve_locales_base(base: &str, config_dir: &Path) -> String {
    if is_remote_base(base) || Path::new(base).is_absolute() {
        return base.to_string();
    }
    config_dir.join(base).to_string_lossy().into_owned()
}

/// What: Find `i18n.yml` in user and development locations.
///
/// Output:
/// - `Some(PathBuf)` pointing to the first existing file found, or `None`
///
/// Details:
/// - Tries locations in order:
///   1. `$XDG_CONFIG_HOME/site-localizer/i18n.yml`
///   2. `$HOME/.config/site-localizer/i18n.yml`
///   3. Development location: `CARGO_MANIFEST_DIR/config/i18n.yml`
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME")
        && !xdg.trim().is_empty()
    {
        candidates.push(Path::new(&xdg).join(APP_DIR).join("i18n.yml"));
    }
    if let Ok(home) = env::var("HOME") {
        candidates.push(Path::new(&home).join(".config").join(APP_DIR).join("i18n.yml"));
    }
    candidates.push(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("config")
            .join("i18n.yml"),
    );
    candidates.into_iter().find(|p| p.is_file())
}

/// Resolve an XDG base directory from environment or default to `$HOME` + segments.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Config directory for the localizer (ensured to exist).
#[must_use]
pub fn config_dir() -> PathBuf {
    let dir = xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR);
    let _ = fs::create_dir_all(&dir);
    dir
}

/// Logs directory under config (ensured to exist).
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = fs::create_dir_all(&dir);
    dir
}

/// Path of the preference file.
#[must_use]
pub fn preferences_path() -> PathBuf {
    config_dir().join("preferences.json")
}
