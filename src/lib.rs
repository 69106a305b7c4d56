//! Library entry for site-localizer exposing the localization manager for the binary and integration tests.

pub mod config;
pub mod dom;
pub mod i18n;
pub mod selector;
pub mod util;
