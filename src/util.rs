//! Small shared helpers.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// What: Lock a mutex, recovering the data if a previous holder panicked.
///
/// Inputs:
/// - `mutex`: Mutex to lock
///
/// Output:
/// - Guard over the protected value
///
/// Details:
/// - State behind these locks is replaced wholesale under the lock, so a
///   poisoned guard still holds a consistent value.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What: Escape text for inclusion in HTML element content.
///
/// Inputs:
/// - `text`: Raw text
///
/// Output:
/// - Text with `&`, `<` and `>` replaced by entities
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// What: Escape text for inclusion in a double-quoted HTML attribute.
///
/// Inputs:
/// - `value`: Raw attribute value
///
/// Output:
/// - Value with `&` and `"` replaced by entities
#[must_use]
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
