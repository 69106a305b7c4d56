//! Locale code validation, startup resolution and fallback chain construction.

use std::collections::BTreeMap;

/// What: Validate locale code format.
///
/// Inputs:
/// - `locale`: Locale code to validate
///
/// Output:
/// - `true` if format looks valid, `false` otherwise
///
/// Details:
/// - Checks for basic structure: language[-region] or language[-script][-region]
/// - Allows simple language codes (e.g., "en") or full codes (e.g., "pt-BR")
/// - Rejects empty codes, spaces, path separators and other special chars
#[must_use]
pub fn is_valid_locale_format(locale: &str) -> bool {
    if locale.is_empty() || locale.len() > 20 {
        return false;
    }

    locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !locale.starts_with('-')
        && !locale.ends_with('-')
        && !locale.contains("--")
}

/// What: Pick the locale a session starts with.
///
/// Inputs:
/// - `stored`: Persisted preference, if any
/// - `default_locale`: Configured primary locale
///
/// Output:
/// - The stored locale when present and well-formed, otherwise `default_locale`
#[must_use]
pub fn resolve_initial_locale(stored: Option<&str>, default_locale: &str) -> String {
    match stored.map(str::trim) {
        Some(code) if is_valid_locale_format(code) => code.to_string(),
        Some(code) => {
            tracing::warn!(
                stored = code,
                default = default_locale,
                "invalid persisted locale; using default"
            );
            default_locale.to_string()
        }
        None => {
            tracing::debug!(default = default_locale, "no persisted locale; using default");
            default_locale.to_string()
        }
    }
}

/// What: Build the ordered list of locales to try after `requested` failed.
///
/// Inputs:
/// - `requested`: Locale that was attempted first
/// - `configured`: Supported locales in priority order
///
/// Output:
/// - `configured` without `requested`, duplicates and malformed codes
#[must_use]
pub fn fallback_chain(requested: &str, configured: &[String]) -> Vec<String> {
    let mut chain: Vec<String> = Vec::with_capacity(configured.len());
    for code in configured {
        if code == requested || chain.contains(code) {
            continue;
        }
        if !is_valid_locale_format(code) {
            tracing::warn!(locale = %code, "skipping malformed fallback locale");
            continue;
        }
        chain.push(code.clone());
    }
    chain
}

/// What: Short label shown on the locale-selector trigger.
///
/// Inputs:
/// - `locale`: Active locale code
/// - `labels`: Configured labels keyed by locale
///
/// Output:
/// - The configured label, or the upper-cased language subtag (`pt-BR` -> `PT`)
#[must_use]
pub fn short_label(locale: &str, labels: &BTreeMap<String, String>) -> String {
    labels.get(locale).cloned().unwrap_or_else(|| {
        locale
            .split('-')
            .next()
            .unwrap_or(locale)
            .to_ascii_uppercase()
    })
}
