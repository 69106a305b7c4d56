//! Integration tests for the init sequence and its retry policy.

#![cfg(test)]

use std::time::Duration;

use site_localizer::i18n::{InitState, LocalizeError, Localizer, MemorySource, MemoryStore};
use site_localizer::selector::{self, SELECTOR_CLASS, TEXT_CLASS, TRIGGER_CLASS};
use site_localizer::util::lock;

use super::helpers::{
    LOCALES, PT_BR, RETRY_INTERVAL, bundle, fast_config, localizer, page, page_without_selector,
};

#[tokio::test]
/// What: Init on a complete page reaches `Ready` on the first attempt.
///
/// Inputs:
/// - Page with selector and tagged elements; all locales available.
///
/// Output:
/// - Translations applied, selector display synced and listeners bound.
async fn init_applies_syncs_and_binds() {
    let l = localizer(bundle(), MemoryStore::new());
    assert_eq!(l.init_state(), InitState::Uninitialized);
    let page = page();
    let doc = page.doc.into_shared();

    l.initialize(doc.clone()).await.expect("init should succeed");

    assert_eq!(l.init_state(), InitState::Ready);
    assert_eq!(l.init_attempts(), 1);
    assert!(l.is_initialized());
    let doc = lock(&doc);
    assert_eq!(doc.text_content(page.nav_home), "Início");
    assert_eq!(doc.attr(doc.root(), "lang"), Some("pt-BR"));
    let trigger = doc.query_class(TRIGGER_CLASS).expect("trigger");
    let label = doc.query_class_within(trigger, TEXT_CLASS).expect("label");
    assert_eq!(doc.text_content(label), "PT");
    // trigger + 3 options + outside click + escape
    assert_eq!(doc.listener_count(), 6);
}

#[tokio::test(start_paused = true)]
/// What: A missing anchor keeps the unbounded init retrying.
///
/// Inputs:
/// - Page without selector; 100ms retry interval; two 10ms polls per attempt.
///
/// Output:
/// - At least 3 attempts within three retry intervals and never `Ready`.
///
/// Details:
/// - The init future is still pending when the timeout fires.
async fn missing_anchor_retries_without_terminal_state() {
    let l = localizer(bundle(), MemoryStore::new());
    let doc = page_without_selector().into_shared();

    let outcome = tokio::time::timeout(RETRY_INTERVAL * 3, l.initialize(doc)).await;

    assert!(outcome.is_err(), "unbounded init must not finish");
    assert!(l.init_attempts() >= 3, "attempts: {}", l.init_attempts());
    assert_ne!(l.init_state(), InitState::Ready);
    assert!(!l.is_initialized());
}

#[tokio::test(start_paused = true)]
/// What: A zero retry interval still waits between attempts.
///
/// Inputs:
/// - Page without selector; `retry.interval_ms = 0`; two 10ms polls per attempt.
///
/// Output:
/// - Only a handful of attempts within 300ms instead of one per poll cycle.
async fn zero_retry_interval_is_raised_to_floor() {
    let mut config = fast_config();
    config.retry.interval_ms = 0;
    let l = Localizer::new(config, bundle(), MemoryStore::new());
    let doc = page_without_selector().into_shared();

    let outcome = tokio::time::timeout(Duration::from_millis(300), l.initialize(doc)).await;

    assert!(outcome.is_err(), "unbounded init must not finish");
    let attempts = l.init_attempts();
    assert!((3..=6).contains(&attempts), "attempts: {attempts}");
}

#[tokio::test(start_paused = true)]
/// What: A bounded policy gives up with `RetriesExhausted`.
///
/// Inputs:
/// - Page without selector; `max_attempts = 2`.
///
/// Output:
/// - Error wrapping the last `DomNotFound`; state `Failed`.
async fn bounded_policy_exhausts() {
    let mut config = fast_config();
    config.retry.max_attempts = Some(2);
    let l = Localizer::new(config, bundle(), MemoryStore::new());
    let doc = page_without_selector().into_shared();

    let err = l.initialize(doc).await.expect_err("init must give up");

    assert_eq!(
        err,
        LocalizeError::RetriesExhausted {
            attempts: 2,
            last: Box::new(LocalizeError::DomNotFound {
                selector: SELECTOR_CLASS.to_string(),
                attempts: 2,
            }),
        }
    );
    assert_eq!(l.init_state(), InitState::Failed);
    assert_eq!(l.init_attempts(), 2);
    // translations still loaded even though the page never became ready
    assert_eq!(l.get_translation("nav.home").as_deref(), Some("Início"));
}

#[tokio::test(start_paused = true)]
/// What: Init recovers once translations become reachable.
///
/// Inputs:
/// - Empty source; `pt-BR` published 150ms after init starts.
///
/// Output:
/// - `Ready` on the third attempt (t=0 and t=100 fail, t=200 succeeds).
async fn init_recovers_after_load_failures() {
    let l = localizer(MemorySource::new(), MemoryStore::new());
    let doc = page().doc.into_shared();

    let publish = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        l.source().insert("pt-BR", PT_BR);
    };
    let (result, ()) = tokio::join!(l.initialize(doc), publish);

    result.expect("init should eventually succeed");
    assert_eq!(l.init_state(), InitState::Ready);
    assert_eq!(l.init_attempts(), 3);
}

#[tokio::test(start_paused = true)]
/// What: An anchor inserted while polling is picked up in the same attempt.
///
/// Inputs:
/// - Page whose selector is injected 15ms after init starts; 5 polls of 10ms.
///
/// Output:
/// - `Ready` after a single attempt.
async fn late_anchor_is_found_by_polling() {
    let mut config = fast_config();
    config.dom_poll.attempts = 5;
    let l = Localizer::new(config, bundle(), MemoryStore::new());
    let doc = page_without_selector().into_shared();

    let writer = doc.clone();
    let inject = async move {
        tokio::time::sleep(Duration::from_millis(15)).await;
        let mut page = lock(&writer);
        let body = page.query_tag("body").expect("body");
        selector::build_markup(&mut page, body, LOCALES);
    };
    let (result, ()) = tokio::join!(l.initialize(doc.clone()), inject);

    result.expect("init should succeed");
    assert_eq!(l.init_attempts(), 1);
    assert!(lock(&doc).query_class(TRIGGER_CLASS).is_some());
}

#[tokio::test]
/// What: Initializing twice does not duplicate selector listeners.
///
/// Inputs:
/// - Same page initialized twice.
///
/// Output:
/// - Listener count unchanged by the second init.
async fn reinitializing_does_not_duplicate_listeners() {
    let l = localizer(bundle(), MemoryStore::new());
    let doc = page().doc.into_shared();

    l.initialize(doc.clone()).await.expect("first init");
    let listeners = lock(&doc).listener_count();
    l.initialize(doc.clone()).await.expect("second init");

    assert_eq!(lock(&doc).listener_count(), listeners);
    assert_eq!(l.init_attempts(), 2);
}
