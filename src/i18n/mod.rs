//! Localization manager for site pages.
//!
//! This module loads translation documents, keeps the active locale and
//! applies strings to a [`Document`](crate::dom::Document).
//!
//! # Overview
//!
//! - **Locale Resolution**: The stored `preferred-language` wins when it is a
//!   well-formed code; otherwise the configured default (`pt-BR`) is used
//! - **Fallback Chain**: A locale that cannot be fetched or parsed falls back
//!   through the configured list (`pt-BR` -> `en` -> `es`), and the locale that
//!   actually loaded becomes current
//! - **Translation Lookup**: Dot-delimited keys walk nested sections
//!   (`nav.home`); any miss yields `None`
//! - **Initialization**: Load, wait for the selector anchor, apply, bind;
//!   failures retry on a fixed interval
//! - **Switching**: One switch at a time; subscribers hear about each
//!   completed switch
//!
//! # Translation Documents
//!
//! Documents live at `<locales_base>/<locale>.json`:
//!
//! ```json
//! { "nav": { "home": "Início", "about": "Sobre" } }
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use site_localizer::config::Config;
//! use site_localizer::dom::Document;
//! use site_localizer::i18n::{DirSource, Localizer, MemoryStore};
//!
//! # async fn run() -> Result<(), site_localizer::i18n::LocalizeError> {
//! let localizer = Localizer::new(Config::default(), DirSource::new("locales"), MemoryStore::new());
//!
//! // initialize waits for the `.lang-selector` anchor and binds it
//! let page = Document::from_html(
//!     r#"<html><body>
//!       <div class="lang-selector">
//!         <button class="lang-trigger"><span class="lang-text">PT</span></button>
//!         <ul><li class="lang-option" data-value="en"><span class="lang-text">English</span></li></ul>
//!       </div>
//!       <a data-i18n="nav.home">Home</a>
//!     </body></html>"#,
//! );
//! localizer.initialize(page.into_shared()).await?;
//! localizer.change_language("en").await?;
//!
//! // pages without a selector are loaded and applied directly
//! let mut plain = Document::from_html(r#"<html><body><a data-i18n="nav.home">Home</a></body></html>"#);
//! localizer.load_translations(&localizer.current_locale()).await?;
//! let report = localizer.apply_translations(&mut plain);
//! assert!(report.missing.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - Per-locale fetch failures are logged and only drive the fallback chain
//! - A switch whose whole chain fails leaves the previous state in place
//! - Missing keys leave elements untouched and log a warning

pub mod errors;
pub mod lifecycle;
pub mod loader;
pub mod manager;
pub mod notify;
pub mod resolver;
pub mod store;
pub mod translations;

pub use errors::LocalizeError;
pub use lifecycle::{InitState, PollPolicy, RetryPolicy, wait_for_anchor};
pub use loader::{AnySource, DirSource, HttpSource, MemorySource, TranslationSource, load_locale};
pub use manager::{LocalizationState, Localizer};
pub use notify::{LocaleChanged, Subscription};
pub use resolver::{fallback_chain, is_valid_locale_format, resolve_initial_locale, short_label};
pub use store::{FileStore, MemoryStore, PREFERRED_LANGUAGE_KEY, PreferenceStore};
pub use translations::{TranslationTable, TranslationValue, translate};
