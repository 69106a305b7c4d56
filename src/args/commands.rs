//! Subcommand handlers.

use std::fmt;
use std::path::{Path, PathBuf};

use site_localizer::config::{self, Config};
use site_localizer::dom::{ApplyReport, Document};
use site_localizer::i18n::{
    FileStore, LocalizeError, Localizer, MemoryStore, PREFERRED_LANGUAGE_KEY, PreferenceStore,
    is_valid_locale_format, resolve_initial_locale,
};
use site_localizer::selector::SELECTOR_CLASS;
use site_localizer::util::lock;

use crate::args::utils::make_source;

/// Failure of a subcommand.
#[derive(Debug)]
pub enum CliError {
    /// Reading or writing a page failed.
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Report serialization failed.
    Json(serde_json::Error),
    /// The localizer reported an error.
    Localize(LocalizeError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json(err) => write!(f, "failed to serialize report: {err}"),
            Self::Localize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Localize(err) => Some(err),
        }
    }
}

impl From<LocalizeError> for CliError {
    fn from(value: LocalizeError) -> Self {
        Self::Localize(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Preference file shared by every subcommand.
fn preference_file() -> FileStore {
    FileStore::new(config::preferences_path())
}

/// What: Build an in-memory store seeded with the persisted preference.
///
/// Output:
/// - Store for read-only commands, so loading never rewrites the preference file
fn scratch_store() -> MemoryStore {
    match preference_file().get(PREFERRED_LANGUAGE_KEY) {
        Ok(Some(locale)) => MemoryStore::with_preferred(&locale),
        Ok(None) => MemoryStore::new(),
        Err(e) => {
            tracing::warn!(error = %e, "[Persist] Ignoring unreadable preferences");
            MemoryStore::new()
        }
    }
}

/// What: Translate an HTML page.
///
/// Inputs:
/// - `settings`: Loaded configuration
/// - `page`: HTML file to translate
/// - `lang`: Locale to switch to after initialization
/// - `json`: Print the report as JSON instead of text
/// - `output`: Where to write the translated page
///
/// Output:
/// - `Ok(true)` once the report is printed
///
/// # Errors
/// - `CliError::Io` when the page cannot be read or the output written
/// - `CliError::Localize` when initialization or the switch fails
///
/// Details:
/// - Pages with a locale selector go through the full init sequence; pages
///   without one only load and apply translations.
/// - The preference file is never written.
pub async fn handle_localize(
    settings: &Config,
    page: &Path,
    lang: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<bool, CliError> {
    tracing::info!(page = %page.display(), "Localize requested from CLI");
    let html = tokio::fs::read_to_string(page)
        .await
        .map_err(|source| CliError::Io {
            path: page.to_path_buf(),
            source,
        })?;
    let document = Document::from_html(&html).into_shared();
    let localizer = Localizer::new(settings.clone(), make_source(settings), scratch_store());

    let has_selector = lock(&document).query_class(SELECTOR_CLASS).is_some();
    if has_selector {
        localizer.initialize(document.clone()).await?;
    } else {
        tracing::info!("page has no locale selector; applying translations only");
        localizer
            .load_translations(&localizer.current_locale())
            .await?;
        localizer.attach(document.clone());
    }
    if let Some(lang) = lang {
        localizer.change_language(lang).await?;
    }

    let (report, rendered) = {
        let mut doc = lock(&document);
        let report = localizer.apply_translations(&mut doc);
        (report, doc.to_html())
    };
    if let Some(output) = output {
        tokio::fs::write(output, rendered)
            .await
            .map_err(|source| CliError::Io {
                path: output.to_path_buf(),
                source,
            })?;
        tracing::info!(path = %output.display(), "wrote translated page");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(true)
}

/// What: Print one translated string.
///
/// Inputs:
/// - `settings`: Loaded configuration
/// - `key`: Dot-delimited key
/// - `lang`: Locale to load; the preferred locale when `None`
///
/// Output:
/// - `Ok(true)` when the key exists, `Ok(false)` when it does not
///
/// # Errors
/// - `CliError::Localize` for malformed codes or when nothing loads
pub async fn handle_lookup(settings: &Config, key: &str, lang: Option<&str>) -> Result<bool, CliError> {
    let localizer = Localizer::new(settings.clone(), make_source(settings), scratch_store());
    let locale = lang.map_or_else(|| localizer.current_locale(), str::to_string);
    if !is_valid_locale_format(&locale) {
        return Err(LocalizeError::InvalidLocale(locale).into());
    }
    localizer.load_translations(&locale).await?;
    match localizer.get_translation(key) {
        Some(value) => {
            println!("{value}");
            Ok(true)
        }
        None => {
            eprintln!(
                "no translation for '{key}' in {}",
                localizer.current_locale()
            );
            Ok(false)
        }
    }
}

/// What: Switch and persist the preferred locale.
///
/// Inputs:
/// - `settings`: Loaded configuration
/// - `code`: Requested locale
///
/// Output:
/// - `Ok(true)` once a locale is active and persisted
///
/// # Errors
/// - `CliError::Localize` for malformed codes or when nothing loads; the
///   previous preference is kept
pub async fn handle_set_language(settings: &Config, code: &str) -> Result<bool, CliError> {
    let localizer = Localizer::new(settings.clone(), make_source(settings), preference_file());
    let active = localizer.change_language(code).await?;
    if active == code {
        println!("{active}");
    } else {
        println!("{active} ({code} unavailable)");
    }
    Ok(true)
}

/// Print the preferred locale, resolved against the configured default.
#[must_use]
pub fn handle_current(settings: &Config) -> bool {
    let stored = match preference_file().get(PREFERRED_LANGUAGE_KEY) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %e, "[Persist] Ignoring unreadable preferences");
            None
        }
    };
    println!(
        "{}",
        resolve_initial_locale(stored.as_deref(), &settings.default_locale)
    );
    true
}

/// What: Render an apply report as text.
///
/// Output:
/// - One header line per section followed by indented entries
fn format_report(report: &ApplyReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "locale: {}", report.locale);
    let _ = writeln!(out, "applied: {}", report.applied.len());
    for applied in &report.applied {
        let _ = writeln!(
            out,
            "  {} <{}> {:?}: {}",
            applied.key, applied.tag, applied.target, applied.value
        );
    }
    let _ = writeln!(out, "missing: {}", report.missing.len());
    for key in &report.missing {
        let _ = writeln!(out, "  {key}");
    }
    out
}
