//! The localization manager.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::Config;
use crate::dom::{ApplyReport, Document, Event, SharedDocument, apply_table};
use crate::i18n::errors::LocalizeError;
use crate::i18n::lifecycle::InitTracker;
use crate::i18n::loader::{TranslationSource, load_locale};
use crate::i18n::notify::{LocaleChanged, Observers, Subscription};
use crate::i18n::resolver::{fallback_chain, is_valid_locale_format, resolve_initial_locale};
use crate::i18n::store::{PREFERRED_LANGUAGE_KEY, PreferenceStore};
use crate::i18n::translations::{TranslationTable, translate};
use crate::selector;
use crate::util::lock;

/// Active locale and its translations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationState {
    /// Locale whose translations are active.
    pub current_locale: String,
    /// Translations of `current_locale`; empty before the first load.
    pub translations: TranslationTable,
    /// True once initialization reached `Ready`.
    pub initialized: bool,
}

/// Loads translations, applies them to a document and switches locales.
///
/// State sits behind short-lived `std` locks that are never held across an
/// `.await`. When both are needed the document lock is taken before the
/// state lock.
pub struct Localizer<S, P> {
    config: Config,
    source: S,
    store: P,
    state: Mutex<LocalizationState>,
    cache: Mutex<HashMap<String, TranslationTable>>,
    switch_guard: tokio::sync::Mutex<()>,
    observers: Observers,
    document: Mutex<Option<SharedDocument>>,
    pub(crate) init: InitTracker,
}

impl<S, P> std::fmt::Debug for Localizer<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("Localizer")
            .field("current_locale", &state.current_locale)
            .field("initialized", &state.initialized)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl<S: TranslationSource, P: PreferenceStore> Localizer<S, P> {
    /// What: Create a localizer and seed the current locale.
    ///
    /// Inputs:
    /// - `config`: Default locale, fallback chain, labels and policies
    /// - `source`: Where translation documents come from
    /// - `store`: Where the preferred locale is persisted
    ///
    /// Output:
    /// - Localizer with empty translations and `current_locale` set to the
    ///   stored preference, or the configured default when none is usable
    ///
    /// Details:
    /// - No I/O besides the preference read; a failing read counts as absent.
    pub fn new(config: Config, source: S, store: P) -> Self {
        let stored = match store.get(PREFERRED_LANGUAGE_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "[Persist] Failed to read preferred language");
                None
            }
        };
        let current_locale = resolve_initial_locale(stored.as_deref(), &config.default_locale);
        tracing::debug!(locale = %current_locale, "seeded current locale");
        Self {
            config,
            source,
            store,
            state: Mutex::new(LocalizationState {
                current_locale,
                ..LocalizationState::default()
            }),
            cache: Mutex::new(HashMap::new()),
            switch_guard: tokio::sync::Mutex::new(()),
            observers: Observers::default(),
            document: Mutex::new(None),
            init: InitTracker::default(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Translation source in use.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Preference store in use.
    #[must_use]
    pub const fn store(&self) -> &P {
        &self.store
    }

    /// Active locale code.
    #[must_use]
    pub fn current_locale(&self) -> String {
        lock(&self.state).current_locale.clone()
    }

    /// Copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> LocalizationState {
        lock(&self.state).clone()
    }

    /// Whether initialization has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }

    /// What: Look up a string in the active translations.
    ///
    /// Inputs:
    /// - `key`: Dot-delimited key such as `nav.home`
    ///
    /// Output:
    /// - `Some(String)` for an existing leaf, `None` otherwise
    #[must_use]
    pub fn get_translation(&self, key: &str) -> Option<String> {
        translate(key, &lock(&self.state).translations)
    }

    /// What: Load `locale`, falling back through the configured chain.
    ///
    /// Inputs:
    /// - `locale`: Locale to load first
    ///
    /// Output:
    /// - Table that became active; `current_locale` is the locale it belongs to
    ///
    /// # Errors
    /// - Returns `LocalizeError::Load` when the requested locale and every
    ///   fallback failed; state is left unchanged
    ///
    /// Details:
    /// - Per-locale failures are logged and absorbed by the chain.
    /// - The winning locale is persisted; a storage error is logged only.
    /// - Parsed tables are cached per locale; failures are not.
    pub async fn load_translations(&self, locale: &str) -> Result<TranslationTable, LocalizeError> {
        let mut candidates = vec![locale.to_string()];
        candidates.extend(fallback_chain(locale, &self.config.fallbacks));

        let mut attempted = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            attempted.push(candidate.clone());
            match self.fetch_table(&candidate).await {
                Ok(table) => {
                    if candidate != locale {
                        tracing::warn!(
                            requested = %locale,
                            fallback = %candidate,
                            "using fallback translations"
                        );
                    }
                    self.commit(&candidate, table.clone());
                    self.persist(&candidate);
                    return Ok(table);
                }
                Err(e) => {
                    tracing::warn!(locale = %candidate, error = %e, "failed to load translations");
                }
            }
        }
        let error = LocalizeError::exhausted(&attempted);
        tracing::error!(requested = %locale, error = %error, "no translations could be loaded");
        Err(error)
    }

    /// What: Apply the active translations to `doc`.
    ///
    /// Inputs:
    /// - `doc`: Document to update
    ///
    /// Output:
    /// - `ApplyReport` of written strings and missed keys
    ///
    /// Details:
    /// - Only touches `data-i18n` elements and the root `lang` attribute; the
    ///   selector display is refreshed separately.
    pub fn apply_translations(&self, doc: &mut Document) -> ApplyReport {
        let state = lock(&self.state);
        apply_table(doc, &state.translations, &state.current_locale)
    }

    /// What: Switch to `locale`.
    ///
    /// Inputs:
    /// - `locale`: Requested locale code
    ///
    /// Output:
    /// - Locale active after the switch (a fallback when `locale` failed)
    ///
    /// # Errors
    /// - `LocalizeError::InvalidLocale` for malformed codes, before any I/O
    /// - `LocalizeError::Load` when nothing could be loaded; the previous
    ///   locale stays active and persisted
    ///
    /// Details:
    /// - Switches run one at a time in request order; a queued request for
    ///   the locale that is already active returns without loading.
    /// - On success the attached document is re-rendered and subscribers
    ///   are notified.
    pub async fn change_language(&self, locale: &str) -> Result<String, LocalizeError> {
        let locale = locale.trim();
        if !is_valid_locale_format(locale) {
            return Err(LocalizeError::InvalidLocale(locale.to_string()));
        }

        let _switch = self.switch_guard.lock().await;
        let previous = self.current_locale();
        if locale == previous {
            tracing::debug!(locale, "locale already active");
            return Ok(previous);
        }

        tracing::info!(from = %previous, to = %locale, "switching locale");
        self.persist(locale);
        if let Err(e) = self.load_translations(locale).await {
            self.persist(&previous);
            tracing::error!(locale, error = %e, "locale switch abandoned");
            return Err(e);
        }

        let active = self.current_locale();
        if let Some(document) = self.attached_document() {
            let mut doc = lock(&document);
            self.render(&mut doc);
        }
        self.observers.notify(&LocaleChanged {
            language: active.clone(),
        });
        Ok(active)
    }

    /// What: Deliver an interaction to the attached document.
    ///
    /// Inputs:
    /// - `event`: Click or key press
    ///
    /// Output:
    /// - `Some(locale)` when the event chose a locale and the switch completed
    ///
    /// # Errors
    /// - Propagates `change_language` errors for a chosen locale
    pub async fn dispatch_event(&self, event: &Event) -> Result<Option<String>, LocalizeError> {
        let Some(document) = self.attached_document() else {
            tracing::debug!("event ignored; no document attached");
            return Ok(None);
        };
        let chosen = {
            let mut doc = lock(&document);
            selector::handle_event(&mut doc, event)
        };
        match chosen {
            Some(code) => self.change_language(&code).await.map(Some),
            None => Ok(None),
        }
    }

    /// Register a locale-changed callback.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LocaleChanged) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Remove a callback. Returns `false` when it was not registered.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    /// Keep `document` for re-rendering on later switches and for events.
    pub fn attach(&self, document: SharedDocument) {
        *lock(&self.document) = Some(document);
    }

    /// Document attached by `attach` or `initialize`, if any.
    #[must_use]
    pub fn attached_document(&self) -> Option<SharedDocument> {
        lock(&self.document).clone()
    }

    /// Apply translations and refresh the selector display.
    pub(crate) fn render(&self, doc: &mut Document) -> ApplyReport {
        let report = self.apply_translations(doc);
        selector::sync_display(doc, &report.locale, &self.config.labels);
        report
    }

    pub(crate) const fn switch_guard(&self) -> &tokio::sync::Mutex<()> {
        &self.switch_guard
    }

    pub(crate) fn mark_initialized(&self) {
        lock(&self.state).initialized = true;
    }

    /// Cached table for `locale`, fetching and caching it on a miss.
    async fn fetch_table(&self, locale: &str) -> Result<TranslationTable, LocalizeError> {
        let cached = lock(&self.cache).get(locale).cloned();
        if let Some(table) = cached {
            tracing::debug!(locale, "translation cache hit");
            return Ok(table);
        }
        let table = load_locale(&self.source, locale).await?;
        lock(&self.cache).insert(locale.to_string(), table.clone());
        Ok(table)
    }

    /// Replace locale and translations together.
    fn commit(&self, locale: &str, table: TranslationTable) {
        let mut state = lock(&self.state);
        state.current_locale = locale.to_string();
        state.translations = table;
    }

    fn persist(&self, locale: &str) {
        if let Err(e) = self.store.set(PREFERRED_LANGUAGE_KEY, locale) {
            tracing::warn!(locale, error = %e, "[Persist] Failed to save preferred language");
        }
    }
}
