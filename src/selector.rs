//! Locale selector: binding, interaction and presentation sync.
//!
//! Expected markup:
//!
//! ```html
//! <div class="lang-selector">
//!   <button class="lang-trigger" aria-expanded="false">
//!     <img class="lang-flag" src="flags/br.svg"><span class="lang-text">PT</span>
//!   </button>
//!   <ul>
//!     <li class="lang-option" data-value="pt-BR">
//!       <img class="lang-flag" src="flags/br.svg"><span class="lang-text">Português</span>
//!     </li>
//!     ...
//!   </ul>
//! </div>
//! ```

use std::collections::BTreeMap;

use crate::dom::{Document, ElementId, Event, EventKind, Listener, ListenerAction};
use crate::i18n::resolver::short_label;

/// Class of the selector container (the init anchor).
pub const SELECTOR_CLASS: &str = "lang-selector";
/// Class of the open/close trigger.
pub const TRIGGER_CLASS: &str = "lang-trigger";
/// Class of each selectable option.
pub const OPTION_CLASS: &str = "lang-option";
/// Class of flag icons inside the trigger and options.
pub const FLAG_CLASS: &str = "lang-flag";
/// Class of labels inside the trigger and options.
pub const TEXT_CLASS: &str = "lang-text";
/// Class present on the container while open.
pub const OPEN_CLASS: &str = "open";
/// Attribute carrying an option's locale code.
pub const VALUE_ATTR: &str = "data-value";
/// Key that dismisses an open selector.
pub const CANCEL_KEY: &str = "Escape";

/// Elements of a bound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorBinding {
    /// Container element.
    pub container: ElementId,
    /// Freshly created trigger element.
    pub trigger: ElementId,
    /// Freshly created options with their locale codes.
    pub options: Vec<(ElementId, String)>,
}

/// What: Attach the selector's listeners.
///
/// Inputs:
/// - `doc`: Document holding the selector markup
///
/// Output:
/// - `Some(SelectorBinding)` when container and trigger exist; `None` otherwise
///
/// Details:
/// - The trigger and every option are replaced by listener-free clones
///   before listeners are attached, and the selector's document-level
///   listeners are replaced, so binding again never duplicates a handler.
/// - Trigger and option listeners stop propagation so they do not reach the
///   outside-click handler.
pub fn bind(doc: &mut Document) -> Option<SelectorBinding> {
    let container = doc.query_class(SELECTOR_CLASS)?;
    let Some(old_trigger) = doc.query_class_within(container, TRIGGER_CLASS) else {
        tracing::warn!("locale selector has no trigger; interaction disabled");
        return None;
    };

    let trigger = doc.replace_with_clone(old_trigger);
    doc.add_listener(
        trigger,
        Listener::new(EventKind::Click, ListenerAction::ToggleSelector).stopping_propagation(),
    );

    let mut options = Vec::new();
    for old_option in doc.query_class_all(OPTION_CLASS) {
        let Some(code) = doc.attr(old_option, VALUE_ATTR).map(ToString::to_string) else {
            tracing::warn!("locale option without data-value ignored");
            continue;
        };
        let option = doc.replace_with_clone(old_option);
        doc.add_listener(
            option,
            Listener::new(EventKind::Click, ListenerAction::ChooseLocale(code.clone()))
                .stopping_propagation(),
        );
        options.push((option, code));
    }

    doc.remove_document_listeners(|l| {
        matches!(
            l.action,
            ListenerAction::DismissOnOutsideClick | ListenerAction::DismissOnEscape
        )
    });
    doc.add_document_listener(Listener::new(
        EventKind::Click,
        ListenerAction::DismissOnOutsideClick,
    ));
    doc.add_document_listener(Listener::new(
        EventKind::KeyDown,
        ListenerAction::DismissOnEscape,
    ));

    tracing::debug!(options = options.len(), "locale selector bound");
    Some(SelectorBinding {
        container,
        trigger,
        options,
    })
}

/// Whether the selector is currently open.
#[must_use]
pub fn is_open(doc: &Document) -> bool {
    doc.query_class(SELECTOR_CLASS)
        .is_some_and(|container| doc.has_class(container, OPEN_CLASS))
}

/// Open or close the selector, keeping `aria-expanded` in step.
pub fn set_open(doc: &mut Document, open: bool) {
    let Some(container) = doc.query_class(SELECTOR_CLASS) else {
        return;
    };
    if open {
        doc.add_class(container, OPEN_CLASS);
    } else {
        doc.remove_class(container, OPEN_CLASS);
    }
    if let Some(trigger) = doc.query_class_within(container, TRIGGER_CLASS) {
        doc.set_attr(trigger, "aria-expanded", if open { "true" } else { "false" });
    }
}

/// What: Run the listeners an event triggers.
///
/// Inputs:
/// - `doc`: Document receiving the event
/// - `event`: The interaction
///
/// Output:
/// - `Some(locale)` when an option was chosen; the caller performs the switch
pub fn handle_event(doc: &mut Document, event: &Event) -> Option<String> {
    let mut chosen = None;
    for listener in doc.dispatch(event) {
        match listener.action {
            ListenerAction::ToggleSelector => {
                let open = !is_open(doc);
                set_open(doc, open);
            }
            ListenerAction::ChooseLocale(code) => {
                set_open(doc, false);
                chosen = Some(code);
            }
            ListenerAction::DismissOnOutsideClick => {
                let inside = match (doc.query_class(SELECTOR_CLASS), event.target()) {
                    (Some(container), Some(target)) => doc.contains(container, target),
                    _ => false,
                };
                if !inside {
                    set_open(doc, false);
                }
            }
            ListenerAction::DismissOnEscape => {
                if matches!(event, Event::KeyDown { key } if key == CANCEL_KEY) && is_open(doc) {
                    set_open(doc, false);
                }
            }
        }
    }
    chosen
}

/// What: Make the selector reflect the active locale.
///
/// Inputs:
/// - `doc`: Document holding the selector
/// - `locale`: Active locale
/// - `labels`: Short trigger labels keyed by locale
///
/// Output:
/// - `true` when a trigger was found and updated
///
/// Details:
/// - Copies the matching option's flag `src` to the trigger flag and writes
///   the short label to the trigger text.
/// - Sets `aria-selected` and label `font-weight` (600/400) on every option.
pub fn sync_display(doc: &mut Document, locale: &str, labels: &BTreeMap<String, String>) -> bool {
    let Some(trigger) = doc.query_class(TRIGGER_CLASS) else {
        return false;
    };
    let options = doc.query_class_all(OPTION_CLASS);

    let current = options
        .iter()
        .copied()
        .find(|option| doc.attr(*option, VALUE_ATTR) == Some(locale));
    if let Some(current) = current {
        let flag_src = doc
            .query_class_within(current, FLAG_CLASS)
            .and_then(|flag| doc.attr(flag, "src"))
            .map(ToString::to_string);
        if let (Some(src), Some(trigger_flag)) =
            (flag_src, doc.query_class_within(trigger, FLAG_CLASS))
        {
            doc.set_attr(trigger_flag, "src", &src);
        }
        if let Some(trigger_text) = doc.query_class_within(trigger, TEXT_CLASS) {
            doc.set_text_content(trigger_text, &short_label(locale, labels));
        }
    } else {
        tracing::debug!(locale, "no selector option for active locale");
    }

    for option in options {
        let selected = doc.attr(option, VALUE_ATTR) == Some(locale);
        doc.set_attr(option, "aria-selected", if selected { "true" } else { "false" });
        if let Some(text) = doc.query_class_within(option, TEXT_CLASS) {
            doc.set_style(text, "font-weight", if selected { "600" } else { "400" });
        }
    }
    true
}

/// What: Build selector markup for `locales` under `parent`.
///
/// Inputs:
/// - `doc`: Document to extend
/// - `parent`: Element receiving the selector
/// - `locales`: `(code, display name, flag src)` triples
///
/// Output:
/// - The container element
///
/// Details:
/// - Produces the markup [`bind`] and [`sync_display`] expect; useful for
///   pages generated without the shared header fragment.
pub fn build_markup(doc: &mut Document, parent: ElementId, locales: &[(&str, &str, &str)]) -> ElementId {
    let container = doc.append_element(parent, "div", Some(SELECTOR_CLASS));
    let trigger = doc.append_element(container, "button", Some(TRIGGER_CLASS));
    doc.set_attr(trigger, "aria-expanded", "false");
    doc.append_element(trigger, "img", Some(FLAG_CLASS));
    doc.append_element(trigger, "span", Some(TEXT_CLASS));

    let list = doc.append_element(container, "ul", None);
    for (code, name, flag) in locales {
        let option = doc.append_element(list, "li", Some(OPTION_CLASS));
        doc.set_attr(option, VALUE_ATTR, code);
        let icon = doc.append_element(option, "img", Some(FLAG_CLASS));
        doc.set_attr(icon, "src", flag);
        let text = doc.append_element(option, "span", Some(TEXT_CLASS));
        doc.append_text(text, name);
    }
    container
}
