//! Shared fixtures for localization integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use site_localizer::config::Config;
use site_localizer::dom::{Document, ElementId, I18N_ATTR};
use site_localizer::i18n::{Localizer, MemorySource, MemoryStore};
use site_localizer::selector;

pub const PT_BR: &str = r#"{
  "nav": { "home": "Início", "about": "Sobre" },
  "meta": { "description": "Descrição do site" }
}"#;

pub const EN: &str = r#"{
  "nav": { "home": "Home", "about": "About" },
  "meta": { "description": "Site description" }
}"#;

pub const ES: &str = r#"{
  "nav": { "home": "Inicio", "about": "Acerca de" },
  "meta": { "description": "Descripción del sitio" }
}"#;

/// Selector options as `(code, name, flag)`.
pub const LOCALES: &[(&str, &str, &str)] = &[
    ("pt-BR", "Português", "flags/br.svg"),
    ("en", "English", "flags/us.svg"),
    ("es", "Español", "flags/es.svg"),
];

pub type TestLocalizer = Localizer<MemorySource, MemoryStore>;

/// What: Source serving all three shipped locales.
///
/// Output:
/// - `MemorySource` with `pt-BR`, `en` and `es`
pub fn bundle() -> MemorySource {
    MemorySource::new()
        .with_document("pt-BR", PT_BR)
        .with_document("en", EN)
        .with_document("es", ES)
}

/// What: Default configuration with short timers.
///
/// Output:
/// - `Config` with a 100ms unbounded retry and two 10ms anchor polls
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.retry.interval_ms = 100;
    config.retry.max_attempts = None;
    config.dom_poll.interval_ms = 10;
    config.dom_poll.attempts = 2;
    config
}

/// Localizer over `source` and `store` with [`fast_config`].
pub fn localizer(source: MemorySource, store: MemoryStore) -> TestLocalizer {
    Localizer::new(fast_config(), source, store)
}

/// Handles into a page built by [`page`].
pub struct Page {
    pub doc: Document,
    pub nav_home: ElementId,
    pub outside: ElementId,
}

/// What: Build a page with a locale selector and two tagged elements.
///
/// Output:
/// - `Page` whose nav link reads `Home` before localization
///
/// Details:
/// - The nav link carries `nav.home`; the meta tag carries `meta.description`.
pub fn page() -> Page {
    let mut doc = page_without_selector();
    let body = doc.query_tag("body").unwrap_or_else(|| doc.root());
    selector::build_markup(&mut doc, body, LOCALES);
    let nav_home = doc
        .elements_with_attr(I18N_ATTR)
        .into_iter()
        .find(|id| doc.tag(*id) == "a")
        .expect("nav link should exist");
    let outside = doc.query_tag("main").expect("main should exist");
    Page {
        doc,
        nav_home,
        outside,
    }
}

/// Page with tagged elements but no locale selector.
pub fn page_without_selector() -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let head = doc.append_element(root, "head", None);
    let meta = doc.append_element(head, "meta", None);
    doc.set_attr(meta, "name", "description");
    doc.set_attr(meta, I18N_ATTR, "meta.description");
    let body = doc.append_element(root, "body", None);
    let link = doc.append_element(body, "a", Some("nav-link"));
    doc.set_attr(link, I18N_ATTR, "nav.home");
    doc.append_text(link, "Home");
    doc.append_element(body, "main", None);
    doc
}

/// What: Record every locale-changed notification.
///
/// Output:
/// - Shared list of notified locale codes, in delivery order
pub fn record_changes(localizer: &TestLocalizer) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    localizer.subscribe(move |event| {
        sink.lock()
            .expect("recorder lock poisoned")
            .push(event.language.clone());
    });
    seen
}

/// Snapshot of a recorder.
pub fn changes(seen: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    seen.lock().expect("recorder lock poisoned").clone()
}

/// Retry interval used by [`fast_config`].
pub const RETRY_INTERVAL: Duration = Duration::from_millis(100);
