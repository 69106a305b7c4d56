//! Initialization state machine and retry policy.
//!
//! ```text
//! Uninitialized -> Loading -> Ready
//!                     ^
//!                     |
//!                   Failed  (retry after the policy interval)
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::dom::{ElementId, SharedDocument};
use crate::i18n::errors::LocalizeError;
use crate::i18n::loader::TranslationSource;
use crate::i18n::manager::Localizer;
use crate::i18n::store::PreferenceStore;
use crate::selector;
use crate::util::lock;

/// Where initialization currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// `initialize` has not been called.
    Uninitialized,
    /// An attempt is running.
    Loading,
    /// Translations are applied and the selector is bound.
    Ready,
    /// The last attempt failed; a retry may be pending.
    Failed,
}

/// How often, and how many times, initialization is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between a failed attempt and the next one.
    pub interval: Duration,
    /// Total attempts allowed; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever at a fixed interval.
    #[must_use]
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` attempts.
    #[must_use]
    pub const fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }

    /// Whether another attempt may follow `attempts` failed ones.
    #[must_use]
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }
}

/// Bounded polling for a document anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between polls.
    pub interval: Duration,
    /// Number of polls, at least one.
    pub attempts: u32,
}

/// State and attempt counter of one localizer's initialization.
#[derive(Debug)]
pub struct InitTracker {
    state: Mutex<InitState>,
    attempts: AtomicU32,
}

impl Default for InitTracker {
    fn default() -> Self {
        Self {
            state: Mutex::new(InitState::Uninitialized),
            attempts: AtomicU32::new(0),
        }
    }
}

impl InitTracker {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> InitState {
        *lock(&self.state)
    }

    /// Attempts started so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Enter `Loading` and count the attempt; returns its 1-based number.
    fn begin_attempt(&self) -> u32 {
        *lock(&self.state) = InitState::Loading;
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record the attempt outcome.
    fn finish(&self, state: InitState) {
        *lock(&self.state) = state;
    }
}

/// What: Wait until an element with `class` exists in the document.
///
/// Inputs:
/// - `doc`: Shared document, possibly still being filled by fragment loaders
/// - `class`: Class name of the anchor
/// - `policy`: Poll interval and count
///
/// Output:
/// - Id of the anchor element
///
/// # Errors
/// - Returns `LocalizeError::DomNotFound` after `policy.attempts` misses
pub async fn wait_for_anchor(
    doc: &SharedDocument,
    class: &str,
    policy: PollPolicy,
) -> Result<ElementId, LocalizeError> {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        let found = lock(doc).query_class(class);
        if let Some(anchor) = found {
            return Ok(anchor);
        }
        if attempt < attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Err(LocalizeError::DomNotFound {
        selector: class.to_string(),
        attempts,
    })
}

impl<S: TranslationSource, P: PreferenceStore> Localizer<S, P> {
    /// What: Run the init sequence until it succeeds or the policy gives up.
    ///
    /// Inputs:
    /// - `document`: Page to localize; kept for later switches and events
    ///
    /// Output:
    /// - `Ok(())` once `Ready`
    ///
    /// # Errors
    /// - Returns `LocalizeError::RetriesExhausted` when a bounded policy runs
    ///   out of attempts; an unbounded policy never returns an error
    ///
    /// Details:
    /// - Each attempt: load the current locale (with fallback), wait for the
    ///   selector anchor, apply translations, sync the selector display, bind
    ///   the selector.
    /// - Load and anchor failures mark the attempt `Failed` and schedule the
    ///   next attempt after the retry interval.
    pub async fn initialize(&self, document: SharedDocument) -> Result<(), LocalizeError> {
        self.attach(document.clone());
        let policy = self.config().retry_policy();
        loop {
            let attempt = self.init.begin_attempt();
            tracing::debug!(attempt, "initializing localization");
            match self.init_once(&document).await {
                Ok(()) => {
                    self.init.finish(InitState::Ready);
                    self.mark_initialized();
                    tracing::info!(
                        attempt,
                        locale = %self.current_locale(),
                        "localization ready"
                    );
                    return Ok(());
                }
                Err(e) => {
                    self.init.finish(InitState::Failed);
                    if !policy.allows_retry(attempt) {
                        tracing::error!(attempt, error = %e, "localization init gave up");
                        return Err(LocalizeError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                    tracing::warn!(
                        attempt,
                        error = %e,
                        retry_in_ms = u64::try_from(policy.interval.as_millis()).unwrap_or(u64::MAX),
                        "localization init failed; retrying"
                    );
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }
    }

    /// Current init state.
    #[must_use]
    pub fn init_state(&self) -> InitState {
        self.init.state()
    }

    /// Number of init attempts started so far.
    #[must_use]
    pub fn init_attempts(&self) -> u32 {
        self.init.attempts()
    }

    /// One pass of the init sequence.
    async fn init_once(&self, document: &SharedDocument) -> Result<(), LocalizeError> {
        {
            let _switch = self.switch_guard().lock().await;
            let locale = self.current_locale();
            self.load_translations(&locale).await?;
        }
        wait_for_anchor(document, selector::SELECTOR_CLASS, self.config().poll_policy()).await?;

        let mut doc = lock(document);
        self.render(&mut doc);
        selector::bind(&mut doc);
        Ok(())
    }
}
