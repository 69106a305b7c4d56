//! Translation sources and document parsing.
//!
//! A source answers `<base>/<locale>.json` with the raw document text. Three
//! sources are provided: HTTP (`reqwest`), a local directory (`tokio::fs`)
//! and an in-memory bundle.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

use crate::i18n::errors::LocalizeError;
use crate::i18n::translations::TranslationTable;
use crate::util::lock;

/// File extension of translation documents.
pub const TRANSLATION_EXT: &str = "json";

/// Something that can retrieve the translation document of a locale.
pub trait TranslationSource: Send + Sync {
    /// What: Retrieve the raw translation document for `locale`.
    ///
    /// Output:
    /// - Document text, or `Network`/`Status` errors
    fn fetch(&self, locale: &str) -> impl Future<Output = Result<String, LocalizeError>> + Send;

    /// Human-readable location of `locale`'s document, for logs.
    fn location(&self, locale: &str) -> String;
}

/// What: Parse a fetched document into a table.
///
/// Inputs:
/// - `locale`: Locale the document belongs to (for error context)
/// - `body`: Document text
///
/// Output:
/// - Parsed `TranslationTable`
///
/// # Errors
/// - Returns `LocalizeError::Parse` when the document is malformed
pub fn parse_translation_document(
    locale: &str,
    body: &str,
) -> Result<TranslationTable, LocalizeError> {
    TranslationTable::from_json(body).map_err(|e| LocalizeError::Parse {
        locale: locale.to_string(),
        message: e.to_string(),
    })
}

/// What: Fetch and parse one locale, without any fallback.
///
/// Inputs:
/// - `source`: Where documents come from
/// - `locale`: Locale to load
///
/// Output:
/// - Parsed table
///
/// # Errors
/// - Propagates `Network`/`Status` from the source and `Parse` from parsing
pub async fn load_locale<S: TranslationSource>(
    source: &S,
    locale: &str,
) -> Result<TranslationTable, LocalizeError> {
    let body = source.fetch(locale).await?;
    let table = parse_translation_document(locale, &body)?;
    tracing::debug!(
        locale,
        keys = table.leaf_count(),
        location = %source.location(locale),
        "loaded translation document"
    );
    Ok(table)
}

/// Shared HTTP client with connection pooling for translation documents.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(15))
        .user_agent(format!("site-localizer/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Retrieves documents over HTTP from `<base>/<locale>.json`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: String,
}

impl HttpSource {
    /// Create a source rooted at `base` (e.g. `https://example.com/locales`).
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            base: base.into(),
        }
    }

    /// Use a caller-provided client instead of the shared one.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// URL of `locale`'s document.
    #[must_use]
    pub fn url_for(&self, locale: &str) -> String {
        format!(
            "{}/{locale}.{TRANSLATION_EXT}",
            self.base.trim_end_matches('/')
        )
    }
}

impl TranslationSource for HttpSource {
    async fn fetch(&self, locale: &str) -> Result<String, LocalizeError> {
        let url = self.url_for(locale);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocalizeError::Network {
                locale: locale.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocalizeError::Status {
                locale: locale.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|e| LocalizeError::Network {
            locale: locale.to_string(),
            message: e.to_string(),
        })
    }

    fn location(&self, locale: &str) -> String {
        self.url_for(locale)
    }
}

/// Reads documents from `<dir>/<locale>.json`.
///
/// A missing file is reported as `Status { status: 404 }` so it reads like
/// the HTTP case; other I/O failures are `Network` errors.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    /// Create a source reading from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of `locale`'s document.
    #[must_use]
    pub fn path_for(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{locale}.{TRANSLATION_EXT}"))
    }

    /// Directory this source reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TranslationSource for DirSource {
    async fn fetch(&self, locale: &str) -> Result<String, LocalizeError> {
        let path = self.path_for(locale);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LocalizeError::Status {
                locale: locale.to_string(),
                status: 404,
            }),
            Err(e) => Err(LocalizeError::Network {
                locale: locale.to_string(),
                message: format!("{}: {e}", path.display()),
            }),
        }
    }

    fn location(&self, locale: &str) -> String {
        self.path_for(locale).display().to_string()
    }
}

/// Canned answer of a [`MemorySource`].
#[derive(Debug, Clone)]
enum MemoryEntry {
    /// Document body returned as-is.
    Body(String),
    /// Error returned instead of a body.
    Fail(LocalizeError),
}

/// In-memory bundle of translation documents.
///
/// Unknown locales answer `Status { status: 404 }`. Every fetch is recorded,
/// which makes the source usable for embedding bundled translations and for
/// observing load behavior.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: Mutex<BTreeMap<String, MemoryEntry>>,
    fetched: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MemorySource {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document body for `locale` (builder form).
    #[must_use]
    pub fn with_document(self, locale: &str, body: &str) -> Self {
        self.insert(locale, body);
        self
    }

    /// Delay every fetch by `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add or replace the document body for `locale`.
    pub fn insert(&self, locale: &str, body: &str) {
        lock(&self.entries).insert(locale.to_string(), MemoryEntry::Body(body.to_string()));
    }

    /// Make fetches of `locale` fail with `error`.
    pub fn fail(&self, locale: &str, error: LocalizeError) {
        lock(&self.entries).insert(locale.to_string(), MemoryEntry::Fail(error));
    }

    /// Forget `locale`, so it answers 404.
    pub fn remove(&self, locale: &str) {
        lock(&self.entries).remove(locale);
    }

    /// Locales fetched so far, in request order.
    #[must_use]
    pub fn fetched(&self) -> Vec<String> {
        lock(&self.fetched).clone()
    }
}

impl TranslationSource for MemorySource {
    async fn fetch(&self, locale: &str) -> Result<String, LocalizeError> {
        let entry = {
            lock(&self.fetched).push(locale.to_string());
            lock(&self.entries).get(locale).cloned()
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match entry {
            Some(MemoryEntry::Body(body)) => Ok(body),
            Some(MemoryEntry::Fail(error)) => Err(error),
            None => Err(LocalizeError::Status {
                locale: locale.to_string(),
                status: 404,
            }),
        }
    }

    fn location(&self, locale: &str) -> String {
        format!("memory:{locale}.{TRANSLATION_EXT}")
    }
}

/// Whether a `locales_base` names an HTTP location rather than a directory.
#[must_use]
pub fn is_remote_base(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://")
}

/// Source chosen at runtime from a `locales_base` setting.
#[derive(Debug, Clone)]
pub enum AnySource {
    /// `http://` or `https://` base.
    Http(HttpSource),
    /// Anything else, read as a directory path.
    Dir(DirSource),
}

impl AnySource {
    /// What: Pick the source kind for a configured base.
    ///
    /// Inputs:
    /// - `base`: URL or directory path
    ///
    /// Output:
    /// - `Http` for `http://`/`https://` bases, `Dir` otherwise
    #[must_use]
    pub fn from_base(base: &str) -> Self {
        if is_remote_base(base) {
            Self::Http(HttpSource::new(base))
        } else {
            Self::Dir(DirSource::new(base))
        }
    }
}

impl TranslationSource for AnySource {
    async fn fetch(&self, locale: &str) -> Result<String, LocalizeError> {
        match self {
            Self::Http(source) => source.fetch(locale).await,
            Self::Dir(source) => source.fetch(locale).await,
        }
    }

    fn location(&self, locale: &str) -> String {
        match self {
            Self::Http(source) => source.location(locale),
            Self::Dir(source) => source.location(locale),
        }
    }
}
