//! Integration tests for translation loading, lookup and the fallback chain.

#![cfg(test)]

use site_localizer::i18n::{
    LocalizeError, MemorySource, MemoryStore, PREFERRED_LANGUAGE_KEY, PreferenceStore,
    TranslationTable,
};

use super::helpers::{EN, PT_BR, bundle, localizer};

#[tokio::test]
/// What: Lookup resolves exact leaves and yields `None` for every other path.
///
/// Inputs:
/// - `pt-BR` document with a `nav` section.
///
/// Output:
/// - Leaf strings for full paths; `None` for sections, over-long paths and unknown keys.
///
/// Details:
/// - Lookups never panic, whatever the key shape.
async fn lookup_returns_leaf_or_none() {
    let l = localizer(bundle(), MemoryStore::new());
    l.load_translations("pt-BR").await.expect("pt-BR should load");

    assert_eq!(l.get_translation("nav.home").as_deref(), Some("Início"));
    assert_eq!(l.get_translation("meta.description").as_deref(), Some("Descrição do site"));
    assert_eq!(l.get_translation("nav"), None);
    assert_eq!(l.get_translation("nav.home.extra"), None);
    assert_eq!(l.get_translation("nav.missing"), None);
    assert_eq!(l.get_translation("footer.rights"), None);
    assert_eq!(l.get_translation(""), None);
    assert_eq!(l.get_translation("nav..home"), None);
    assert_eq!(l.get_translation(".nav.home"), None);
}

#[tokio::test]
/// What: An unsupported persisted locale resolves to the primary locale.
///
/// Inputs:
/// - Persisted `fr`, no `fr` document, chain `["pt-BR", "en", "es"]`.
///
/// Output:
/// - `pt-BR` becomes current and is persisted.
///
/// Details:
/// - `fr` is tried first, then the first fallback wins.
async fn persisted_unsupported_locale_falls_back_to_primary() {
    let l = localizer(bundle(), MemoryStore::with_preferred("fr"));
    assert_eq!(l.current_locale(), "fr");

    let table = l
        .load_translations(&l.current_locale())
        .await
        .expect("fallback should load");

    assert_eq!(l.current_locale(), "pt-BR");
    assert_eq!(table, TranslationTable::from_json(PT_BR).expect("fixture parses"));
    assert_eq!(
        l.store().get(PREFERRED_LANGUAGE_KEY).expect("memory store reads"),
        Some("pt-BR".to_string())
    );
    assert_eq!(l.source().fetched(), vec!["fr", "pt-BR"]);
}

#[tokio::test]
/// What: Malformed documents and non-string leaves count as load failures.
///
/// Inputs:
/// - `es` with invalid JSON, `en` with a numeric leaf, valid `pt-BR`.
///
/// Output:
/// - Loading `es` or `en` ends on `pt-BR`.
async fn malformed_documents_drive_the_fallback_chain() {
    let source = MemorySource::new()
        .with_document("pt-BR", PT_BR)
        .with_document("en", r#"{"nav": {"home": 1}}"#)
        .with_document("es", "{not json");
    let l = localizer(source, MemoryStore::new());

    l.load_translations("es").await.expect("pt-BR should win");
    assert_eq!(l.current_locale(), "pt-BR");
    assert_eq!(l.source().fetched(), vec!["es", "pt-BR"]);

    // pt-BR answers from the cache even after the source lost it
    l.source().remove("pt-BR");
    l.load_translations("en").await.expect("cached pt-BR should win");
    assert_eq!(l.current_locale(), "pt-BR");
    assert_eq!(l.get_translation("nav.home").as_deref(), Some("Início"));
    assert_eq!(l.source().fetched(), vec!["es", "pt-BR", "en"]);
}

#[tokio::test]
/// What: Exhausting the chain returns `Load` and leaves state untouched.
///
/// Inputs:
/// - Empty source.
///
/// Output:
/// - `Load` error naming every attempted locale; empty translations.
async fn exhausted_chain_reports_attempted_locales() {
    let l = localizer(MemorySource::new(), MemoryStore::new());
    let before = l.snapshot();

    let err = l.load_translations("en").await.expect_err("nothing can load");
    assert_eq!(
        err,
        LocalizeError::Load("all translation sources exhausted (tried: en, pt-BR, es)".to_string())
    );
    assert_eq!(l.snapshot(), before);
    assert_eq!(l.store().get(PREFERRED_LANGUAGE_KEY).expect("memory store reads"), None);
}

#[tokio::test]
/// What: Fetch failures are not cached.
///
/// Inputs:
/// - `en` missing on the first load and added afterwards.
///
/// Output:
/// - The second load fetches `en` again and uses it.
async fn failures_are_retried_on_next_load() {
    let source = MemorySource::new().with_document("pt-BR", PT_BR);
    let l = localizer(source, MemoryStore::new());

    l.load_translations("en").await.expect("pt-BR fallback");
    assert_eq!(l.current_locale(), "pt-BR");

    l.source().insert("en", EN);
    l.load_translations("en").await.expect("en now loads");
    assert_eq!(l.current_locale(), "en");
    assert_eq!(l.get_translation("nav.home").as_deref(), Some("Home"));
    assert_eq!(l.source().fetched(), vec!["en", "pt-BR", "en"]);
}
