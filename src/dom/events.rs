//! Events and listener registrations.

use crate::dom::ElementId;

/// Kind of user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer activation.
    Click,
    /// Key press.
    KeyDown,
}

/// A user interaction delivered to a [`crate::dom::Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Click on an element.
    Click {
        /// Element under the pointer.
        target: ElementId,
    },
    /// Key press anywhere on the page.
    KeyDown {
        /// Key name as reported by the platform (e.g. `Escape`).
        key: String,
    },
}

impl Event {
    /// Build a key press event.
    #[must_use]
    pub fn key(key: &str) -> Self {
        Self::KeyDown {
            key: key.to_string(),
        }
    }

    /// Kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Click { .. } => EventKind::Click,
            Self::KeyDown { .. } => EventKind::KeyDown,
        }
    }

    /// Element the event is aimed at, if any.
    #[must_use]
    pub const fn target(&self) -> Option<ElementId> {
        match self {
            Self::Click { target } => Some(*target),
            Self::KeyDown { .. } => None,
        }
    }
}

/// What a listener does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerAction {
    /// Open or close the locale selector.
    ToggleSelector,
    /// Switch to the given locale and close the selector.
    ChooseLocale(String),
    /// Close the selector when the click landed outside it.
    DismissOnOutsideClick,
    /// Close the selector when `Escape` is pressed while it is open.
    DismissOnEscape,
}

/// A registered listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    /// Event kind it reacts to.
    pub event: EventKind,
    /// Action to run.
    pub action: ListenerAction,
    /// Whether firing stops the event from reaching ancestors and the document.
    pub stop_propagation: bool,
}

impl Listener {
    /// Create a listener that lets the event propagate.
    #[must_use]
    pub fn new(event: EventKind, action: ListenerAction) -> Self {
        Self {
            event,
            action,
            stop_propagation: false,
        }
    }

    /// Make the listener stop propagation when it fires.
    #[must_use]
    pub fn stopping_propagation(mut self) -> Self {
        self.stop_propagation = true;
        self
    }
}
