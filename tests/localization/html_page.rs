//! Integration tests for localizing parsed HTML pages from a locale directory.

#![cfg(test)]

use std::fs;

use site_localizer::config::Config;
use site_localizer::dom::{ApplyTarget, Document};
use site_localizer::i18n::{DirSource, Localizer, MemoryStore};
use site_localizer::util::lock;
use tempfile::TempDir;

use super::helpers::{EN, PT_BR};

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title data-i18n="nav.home">Home</title>
  <meta name="description" data-i18n="meta.description" content="Site description">
</head>
<body>
  <header>
    <div class="lang-selector">
      <button class="lang-trigger" aria-expanded="false">
        <img class="lang-flag" src="flags/us.svg" alt=""><span class="lang-text">EN</span>
      </button>
      <ul>
        <li class="lang-option" data-value="pt-BR"><img class="lang-flag" src="flags/br.svg" alt=""><span class="lang-text">Português</span></li>
        <li class="lang-option" data-value="en"><img class="lang-flag" src="flags/us.svg" alt=""><span class="lang-text">English</span></li>
      </ul>
    </div>
  </header>
  <nav><a class="nav-link" href="about.html" data-i18n="nav.about">About</a></nav>
  <form>
    <input type="text" data-i18n="nav.home">
    <input type="submit" data-i18n="nav.about">
    <textarea data-i18n="nav.about"></textarea>
  </form>
  <img src="logo.svg" data-i18n="meta.description">
  <p data-i18n="footer.rights">All rights reserved.</p>
</body>
</html>"#;

/// What: Write the `pt-BR` and `en` fixtures into a temp directory.
///
/// Output:
/// - Temp dir (kept alive by the caller) and a source reading from it
fn locale_dir() -> (TempDir, DirSource) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
    fs::write(temp_dir.path().join("pt-BR.json"), PT_BR).expect("Failed to write pt-BR.json");
    fs::write(temp_dir.path().join("en.json"), EN).expect("Failed to write en.json");
    let source = DirSource::new(temp_dir.path());
    (temp_dir, source)
}

#[tokio::test]
/// What: A parsed page is localized by element kind.
///
/// Inputs:
/// - Page with title, meta, link, text/submit inputs, textarea, img and an
///   untranslated paragraph; `pt-BR` from disk.
///
/// Output:
/// - Each element receives its string in the right place; the paragraph is
///   reported missing and left as is.
async fn page_is_localized_by_element_kind() {
    let (_dir, source) = locale_dir();
    let l = Localizer::new(Config::default(), source, MemoryStore::new());
    let doc = Document::from_html(PAGE).into_shared();

    l.initialize(doc.clone()).await.expect("init should succeed");

    let mut page = lock(&doc);
    let report = l.apply_translations(&mut page);
    assert_eq!(report.locale, "pt-BR");
    assert_eq!(report.missing, vec!["footer.rights".to_string()]);
    let targets: Vec<ApplyTarget> = report.applied.iter().map(|a| a.target).collect();
    assert_eq!(
        targets,
        vec![
            ApplyTarget::Text,
            ApplyTarget::Content,
            ApplyTarget::Text,
            ApplyTarget::Placeholder,
            ApplyTarget::Value,
            ApplyTarget::Placeholder,
            ApplyTarget::Alt,
        ]
    );

    let html = page.to_html();
    assert!(html.contains(r#"<html lang="pt-BR">"#));
    assert!(html.contains("<title data-i18n=\"nav.home\">Início</title>"));
    assert!(html.contains(r#"content="Descrição do site""#));
    assert!(html.contains(r#"placeholder="Início""#));
    assert!(html.contains(r#"type="submit" value="Sobre""#));
    assert!(html.contains(r#"alt="Descrição do site""#));
    assert!(html.contains("All rights reserved."));
    assert!(html.contains(r#"<span class="lang-text">PT</span>"#));
}

#[tokio::test]
/// What: Applying the same translations twice yields the same page.
///
/// Inputs:
/// - Localized page, applied once more.
///
/// Output:
/// - Identical HTML before and after.
async fn apply_is_idempotent() {
    let (_dir, source) = locale_dir();
    let l = Localizer::new(Config::default(), source, MemoryStore::new());
    let doc = Document::from_html(PAGE).into_shared();
    l.initialize(doc.clone()).await.expect("init should succeed");

    let mut page = lock(&doc);
    let first = page.to_html();
    l.apply_translations(&mut page);
    assert_eq!(page.to_html(), first);
}

#[tokio::test]
/// What: Switching locale rewrites every localized string on the page.
///
/// Inputs:
/// - Page initialized in `pt-BR`, switched to `en`.
///
/// Output:
/// - English strings and `lang="en"`; trigger flag and label follow.
async fn switch_rewrites_page() {
    let (_dir, source) = locale_dir();
    let l = Localizer::new(Config::default(), source, MemoryStore::new());
    let doc = Document::from_html(PAGE).into_shared();
    l.initialize(doc.clone()).await.expect("init should succeed");

    l.change_language("en").await.expect("switch to en");

    let html = lock(&doc).to_html();
    assert!(html.contains(r#"<html lang="en">"#));
    assert!(html.contains("<title data-i18n=\"nav.home\">Home</title>"));
    assert!(html.contains(r#"placeholder="Home""#));
    assert!(html.contains(r#"<span class="lang-text">EN</span>"#));
    assert!(!html.contains("Início"));
}

#[tokio::test]
/// What: A locale missing from the directory falls back to one that exists.
///
/// Inputs:
/// - Directory without `es.json`; switch to `es`.
///
/// Output:
/// - `pt-BR` stays active because it is first in the chain.
async fn missing_file_falls_back() {
    let (_dir, source) = locale_dir();
    let l = Localizer::new(Config::default(), source, MemoryStore::with_preferred("en"));
    l.load_translations("en").await.expect("en loads");

    assert_eq!(l.change_language("es").await.expect("fallback"), "pt-BR");
}

#[tokio::test]
/// What: A page without a locale selector is localized by load plus apply.
///
/// Inputs:
/// - Plain page with one tagged link; default (unbounded) retry policy.
///
/// Output:
/// - `pt-BR` strings applied without waiting for a selector anchor.
async fn page_without_selector_loads_and_applies() {
    let (_dir, source) = locale_dir();
    let l = Localizer::new(Config::default(), source, MemoryStore::new());
    let mut page =
        Document::from_html(r#"<html><body><a data-i18n="nav.home">Home</a></body></html>"#);

    l.load_translations(&l.current_locale())
        .await
        .expect("pt-BR should load");
    let report = l.apply_translations(&mut page);

    assert!(report.missing.is_empty());
    assert!(page.to_html().contains(">Início</a>"));
    assert_eq!(l.init_attempts(), 0);
}
