//! Checks for the configuration and locale files shipped with the crate.

#![cfg(test)]

use std::path::PathBuf;

use site_localizer::config::{Config, load_config};
use site_localizer::i18n::{AnySource, DirSource, TranslationSource, load_locale};

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[test]
/// What: The sample `config/i18n.yml` matches the built-in defaults.
///
/// Output:
/// - Only `locales_base` differs: it is anchored at `config/` and reaches the
///   shipped `locales/` directory whatever the working directory is.
fn sample_config_matches_defaults() {
    let config_dir = manifest_dir().join("config");
    let config = load_config(&config_dir.join("i18n.yml"));
    let expected = Config {
        locales_base: config_dir.join("../locales").to_string_lossy().into_owned(),
        ..Config::default()
    };
    assert_eq!(config, expected);
}

#[tokio::test]
/// What: The sample config's locale directory loads from any working directory.
///
/// Output:
/// - `pt-BR` loads through the resolved `locales_base`.
async fn sample_config_locates_shipped_locales() {
    let config = load_config(&manifest_dir().join("config").join("i18n.yml"));
    let source = AnySource::from_base(&config.locales_base);
    assert!(matches!(source, AnySource::Dir(_)));
    load_locale(&source, "pt-BR")
        .await
        .expect("shipped pt-BR should load through the sample config");
}

#[tokio::test]
/// What: Every shipped locale parses and defines the same keys.
///
/// Output:
/// - `pt-BR`, `en` and `es` load from `locales/` with identical key sets.
async fn shipped_locales_share_keys() {
    let source = DirSource::new(manifest_dir().join("locales"));
    let reference = load_locale(&source, "pt-BR")
        .await
        .expect("pt-BR should parse")
        .keys();
    assert!(!reference.is_empty());
    for locale in ["en", "es"] {
        let table = load_locale(&source, locale)
            .await
            .unwrap_or_else(|e| panic!("{} should parse: {e}", source.location(locale)));
        assert_eq!(table.keys(), reference, "{locale} keys differ from pt-BR");
    }
}
