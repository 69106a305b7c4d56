//! Integration tests for locale-selector interaction through the localizer.

#![cfg(test)]

use site_localizer::dom::{ElementId, Event};
use site_localizer::i18n::MemoryStore;
use site_localizer::selector::{self, OPTION_CLASS, TEXT_CLASS, TRIGGER_CLASS, VALUE_ATTR};
use site_localizer::util::lock;

use super::helpers::{Page, TestLocalizer, bundle, changes, localizer, page, record_changes};

/// What: Initialize a localizer on a fresh page.
///
/// Output:
/// - Ready localizer, the page handles, and the bound trigger
async fn ready() -> (TestLocalizer, Page, site_localizer::dom::SharedDocument, ElementId) {
    let l = localizer(bundle(), MemoryStore::new());
    let page = page();
    let doc = page.doc.clone().into_shared();
    l.initialize(doc.clone()).await.expect("init should succeed");
    let trigger = lock(&doc).query_class(TRIGGER_CLASS).expect("trigger");
    (l, page, doc, trigger)
}

/// Option element for `code`.
fn option(doc: &site_localizer::dom::Document, code: &str) -> ElementId {
    doc.query_class_all(OPTION_CLASS)
        .into_iter()
        .find(|id| doc.attr(*id, VALUE_ATTR) == Some(code))
        .expect("option should exist")
}

#[tokio::test]
/// What: Choosing an option switches the locale and closes the selector.
///
/// Inputs:
/// - Click on the trigger, then on the `es` option label.
///
/// Output:
/// - `Some("es")`; page translated; selector closed; `es` marked selected.
async fn choosing_option_switches_locale() {
    let (l, page, doc, trigger) = ready().await;
    let seen = record_changes(&l);

    assert_eq!(l.dispatch_event(&Event::Click { target: trigger }).await, Ok(None));
    assert!(selector::is_open(&lock(&doc)));

    let label = {
        let doc = lock(&doc);
        doc.query_class_within(option(&doc, "es"), TEXT_CLASS).expect("label")
    };
    let chosen = l.dispatch_event(&Event::Click { target: label }).await;

    assert_eq!(chosen, Ok(Some("es".to_string())));
    assert_eq!(changes(&seen), vec!["es"]);
    let doc = lock(&doc);
    assert!(!selector::is_open(&doc));
    assert_eq!(doc.text_content(page.nav_home), "Inicio");
    assert_eq!(doc.attr(option(&doc, "es"), "aria-selected"), Some("true"));
    assert_eq!(doc.attr(option(&doc, "pt-BR"), "aria-selected"), Some("false"));
    assert_eq!(doc.attr(trigger, "aria-expanded"), Some("false"));
}

#[tokio::test]
/// What: Outside clicks and Escape close the selector without switching.
///
/// Inputs:
/// - Open selector; click on `<main>`; reopen; press `Escape`.
///
/// Output:
/// - Closed after each, locale unchanged, no notifications.
async fn outside_click_and_escape_close_without_switching() {
    let (l, page, doc, trigger) = ready().await;
    let seen = record_changes(&l);

    l.dispatch_event(&Event::Click { target: trigger }).await.expect("toggle");
    assert_eq!(
        l.dispatch_event(&Event::Click { target: page.outside }).await,
        Ok(None)
    );
    assert!(!selector::is_open(&lock(&doc)));

    l.dispatch_event(&Event::Click { target: trigger }).await.expect("toggle");
    l.dispatch_event(&Event::key("Tab")).await.expect("other key");
    assert!(selector::is_open(&lock(&doc)));
    l.dispatch_event(&Event::key("Escape")).await.expect("escape");
    assert!(!selector::is_open(&lock(&doc)));

    assert_eq!(l.current_locale(), "pt-BR");
    assert!(changes(&seen).is_empty());
}

#[tokio::test]
/// What: Choosing the active locale closes the selector without a reload.
///
/// Inputs:
/// - Click on the `pt-BR` option while `pt-BR` is active.
///
/// Output:
/// - `Some("pt-BR")`; no notification; one fetch in total.
async fn choosing_active_locale_is_noop() {
    let (l, _page, doc, _trigger) = ready().await;
    let seen = record_changes(&l);

    let pt = option(&lock(&doc), "pt-BR");
    let chosen = l.dispatch_event(&Event::Click { target: pt }).await;

    assert_eq!(chosen, Ok(Some("pt-BR".to_string())));
    assert!(changes(&seen).is_empty());
    assert_eq!(l.source().fetched(), vec!["pt-BR"]);
}

#[tokio::test]
/// What: Events without an attached document are ignored.
///
/// Output:
/// - `Ok(None)` and no state change.
async fn events_without_document_are_ignored() {
    let l = localizer(bundle(), MemoryStore::new());
    let page = page();
    assert!(l.attached_document().is_none());
    assert_eq!(
        l.dispatch_event(&Event::Click { target: page.outside }).await,
        Ok(None)
    );
    assert_eq!(l.current_locale(), "pt-BR");
}
