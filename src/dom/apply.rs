//! Applying translation strings to tagged elements.

use serde::Serialize;

use crate::dom::{Document, ElementId};
use crate::i18n::translations::TranslationTable;

/// Attribute carrying an element's translation key.
pub const I18N_ATTR: &str = "data-i18n";

/// Where a translated string lands on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyTarget {
    /// `placeholder` attribute of text inputs and textareas.
    Placeholder,
    /// `value` attribute of submit/button inputs.
    Value,
    /// `content` attribute of `<meta>`.
    Content,
    /// `alt` attribute of `<img>`.
    Alt,
    /// Text content of everything else (including `<title>`).
    Text,
}

impl ApplyTarget {
    /// What: Pick the application target for an element kind.
    ///
    /// Inputs:
    /// - `tag`: Lower-case tag name
    /// - `input_type`: The element's `type` attribute, if any
    ///
    /// Output:
    /// - Target per the element-kind table (input/textarea, meta, title, img, default)
    #[must_use]
    pub fn for_element(tag: &str, input_type: Option<&str>) -> Self {
        match tag {
            "input" | "textarea" => {
                let is_button = input_type
                    .is_some_and(|t| t.eq_ignore_ascii_case("submit") || t.eq_ignore_ascii_case("button"));
                if is_button { Self::Value } else { Self::Placeholder }
            }
            "meta" => Self::Content,
            "img" => Self::Alt,
            _ => Self::Text,
        }
    }

    /// Attribute written for this target; `None` for text content.
    #[must_use]
    pub const fn attribute(self) -> Option<&'static str> {
        match self {
            Self::Placeholder => Some("placeholder"),
            Self::Value => Some("value"),
            Self::Content => Some("content"),
            Self::Alt => Some("alt"),
            Self::Text => None,
        }
    }
}

/// One string written to the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedString {
    /// Translation key of the element.
    pub key: String,
    /// Tag name of the element.
    pub tag: String,
    /// Where the string was written.
    pub target: ApplyTarget,
    /// The string itself.
    pub value: String,
}

/// Outcome of one application pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Locale the document was tagged with.
    pub locale: String,
    /// Strings written, in document order.
    pub applied: Vec<AppliedString>,
    /// Keys with no usable translation; their elements were left untouched.
    pub missing: Vec<String>,
}

/// What: Apply `table` to every element tagged with [`I18N_ATTR`].
///
/// Inputs:
/// - `doc`: Document to update
/// - `table`: Active translations
/// - `locale`: Active locale, written to the root's `lang` attribute
///
/// Output:
/// - `ApplyReport` listing written strings and missed keys
///
/// Details:
/// - Missing keys and empty strings leave the element unchanged and log a warning.
/// - Only the targeted attribute or text changes, so repeated passes with
///   the same table produce the same document.
pub fn apply_table(doc: &mut Document, table: &TranslationTable, locale: &str) -> ApplyReport {
    let mut report = ApplyReport {
        locale: locale.to_string(),
        ..ApplyReport::default()
    };

    for id in doc.elements_with_attr(I18N_ATTR) {
        let key = doc.attr(id, I18N_ATTR).unwrap_or_default().trim().to_string();
        match table.get(&key).filter(|value| !value.is_empty()) {
            Some(value) => {
                let applied = apply_string(doc, id, &key, value);
                report.applied.push(applied);
            }
            None => {
                tracing::warn!(key = %key, locale, "translation not found; element left untouched");
                report.missing.push(key);
            }
        }
    }

    let root = doc.root();
    doc.set_attr(root, "lang", locale);
    tracing::debug!(
        locale,
        applied = report.applied.len(),
        missing = report.missing.len(),
        "applied translations"
    );
    report
}

/// Write one string to one element.
fn apply_string(doc: &mut Document, id: ElementId, key: &str, value: &str) -> AppliedString {
    let tag = doc.tag(id).to_string();
    let target = ApplyTarget::for_element(&tag, doc.attr(id, "type"));
    match target.attribute() {
        Some(attribute) => doc.set_attr(id, attribute, value),
        None => doc.set_text_content(id, value),
    }
    AppliedString {
        key: key.to_string(),
        tag,
        target,
        value: value.to_string(),
    }
}
