//! Error type shared by the localization manager and its collaborators.

use std::fmt;

/// Failures raised while loading, applying or persisting translations.
///
/// Per-locale fetch errors (`Network`, `Status`, `Parse`) never escape a load
/// on their own: they only drive the fallback chain, which reports `Load`
/// once every candidate failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizeError {
    /// The translation resource could not be reached.
    Network {
        /// Locale whose resource was requested.
        locale: String,
        /// Transport error description.
        message: String,
    },
    /// The resource answered with a non-success status.
    Status {
        /// Locale whose resource was requested.
        locale: String,
        /// Status code returned by the source.
        status: u16,
    },
    /// The resource body is not a valid translation document.
    Parse {
        /// Locale whose resource was requested.
        locale: String,
        /// Deserializer error description.
        message: String,
    },
    /// The expected document anchor never appeared while polling.
    DomNotFound {
        /// Class name that was polled for.
        selector: String,
        /// Number of polls performed.
        attempts: u32,
    },
    /// Every locale of the fallback chain failed to load.
    Load(String),
    /// A locale code does not have the `language[-script][-region]` shape.
    InvalidLocale(String),
    /// Reading or writing the preference store failed.
    Storage(String),
    /// Initialization failed and the retry policy allows no further attempt.
    RetriesExhausted {
        /// Number of attempts performed.
        attempts: u32,
        /// Error of the final attempt.
        last: Box<Self>,
    },
}

impl fmt::Display for LocalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { locale, message } => {
                write!(f, "network error loading '{locale}': {message}")
            }
            Self::Status { locale, status } => {
                write!(f, "translation file for '{locale}' returned status {status}")
            }
            Self::Parse { locale, message } => {
                write!(f, "malformed translation file for '{locale}': {message}")
            }
            Self::DomNotFound { selector, attempts } => {
                write!(f, "element '.{selector}' not found after {attempts} attempts")
            }
            Self::Load(reason) => write!(f, "failed to load translations: {reason}"),
            Self::InvalidLocale(code) => write!(
                f,
                "invalid locale code '{code}'. Expected format: language[-region] (e.g., 'pt-BR', 'en')"
            ),
            Self::Storage(message) => write!(f, "preference storage error: {message}"),
            Self::RetriesExhausted { attempts, last } => {
                write!(f, "initialization gave up after {attempts} attempts: {last}")
            }
        }
    }
}

impl std::error::Error for LocalizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RetriesExhausted { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}

impl LocalizeError {
    /// What: Build the aggregate error raised when the fallback chain is exhausted.
    ///
    /// Inputs:
    /// - `attempted`: Locales tried, in order
    ///
    /// Output:
    /// - `LocalizeError::Load` carrying the attempted locales in its reason
    #[must_use]
    pub fn exhausted(attempted: &[String]) -> Self {
        Self::Load(format!(
            "all translation sources exhausted (tried: {})",
            attempted.join(", ")
        ))
    }

    /// Whether this error is a per-locale fetch failure that the fallback chain absorbs.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Status { .. } | Self::Parse { .. }
        )
    }
}
