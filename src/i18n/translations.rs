//! Translation table and dot-path lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node of a translation document: either a leaf string or a nested section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationValue {
    /// Leaf string.
    Text(String),
    /// Nested section addressed by the next key segment.
    Section(TranslationTable),
}

/// Tree-shaped translation data for one locale.
///
/// Deserializes directly from a JSON object whose values are strings or
/// further objects. Any other value kind fails deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable(BTreeMap<String, TranslationValue>);

impl TranslationTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Parse a JSON translation document.
    ///
    /// Inputs:
    /// - `json`: Document text
    ///
    /// Output:
    /// - Parsed table, or the `serde_json` error for malformed documents
    ///
    /// # Errors
    /// - Returns `Err` when the text is not JSON, the top level is not an object,
    ///   or a value is neither a string nor an object
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// What: Resolve a dot-delimited key to its leaf string.
    ///
    /// Inputs:
    /// - `key`: Path such as `nav.home`
    ///
    /// Output:
    /// - `Some(&str)` when every segment exists and the path ends on a leaf;
    ///   `None` otherwise (empty key or segment, missing segment, path stops
    ///   on a section, or path continues past a leaf)
    ///
    /// Details:
    /// - `""` keys in a document are unreachable, so `nav.` never matches.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        if key.split('.').any(str::is_empty) {
            return None;
        }
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut node = self.0.get(first)?;
        for segment in segments {
            match node {
                TranslationValue::Section(section) => node = section.0.get(segment)?,
                TranslationValue::Text(_) => return None,
            }
        }
        match node {
            TranslationValue::Text(text) => Some(text),
            TranslationValue::Section(_) => None,
        }
    }

    /// Insert a leaf at a dot-delimited path, creating sections as needed.
    ///
    /// A leaf sitting on an intermediate segment is replaced by a section.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };
        let mut table = self;
        for segment in segments {
            let entry = table
                .0
                .entry(segment.to_string())
                .or_insert_with(|| TranslationValue::Section(Self::new()));
            if matches!(entry, TranslationValue::Text(_)) {
                *entry = TranslationValue::Section(Self::new());
            }
            table = match entry {
                TranslationValue::Section(section) => section,
                TranslationValue::Text(_) => return,
            };
        }
        table
            .0
            .insert(last.to_string(), TranslationValue::Text(value.into()));
    }

    /// True when the table has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of leaf strings in the whole tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.0
            .values()
            .map(|value| match value {
                TranslationValue::Text(_) => 1,
                TranslationValue::Section(section) => section.leaf_count(),
            })
            .sum()
    }

    /// All leaf keys in dot notation, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_keys("", &mut out);
        out
    }

    /// Recursive helper for [`Self::keys`].
    fn collect_keys(&self, prefix: &str, out: &mut Vec<String>) {
        for (key, value) in &self.0 {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                TranslationValue::Text(_) => out.push(path),
                TranslationValue::Section(section) => section.collect_keys(&path, out),
            }
        }
    }
}

/// What: Look up a translation in a table, logging misses.
///
/// Inputs:
/// - `key`: Dot-notation key (e.g., "nav.home")
/// - `translations`: Table to search
///
/// Output:
/// - `Option<String>` containing the translation, or `None` if not found
#[must_use]
pub fn translate(key: &str, translations: &TranslationTable) -> Option<String> {
    let found = translations.get(key).map(ToString::to_string);
    if found.is_none() {
        tracing::debug!(key, "translation key not found");
    }
    found
}
