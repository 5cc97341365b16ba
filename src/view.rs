//! Translated text view.
//!
//! A [`TranslatedText`] renders one native-language string in whatever
//! language the context has active, re-resolving whenever the language or the
//! source text changes. Every resolution takes a new generation number and
//! only the newest generation may update the rendering, so a slow response for
//! an old text or language can never overwrite a newer one.

use crate::context::LanguageContext;
use crate::translation::TranslationOutcome;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPhase {
    /// Native language active; showing the source text
    IdleNative,
    /// Translation in flight; showing the fallback (or source)
    Resolving,
    /// Showing the translation
    Resolved,
    /// Translation failed; showing the fallback (or source)
    ResolvedFallback,
}

/// What the view currently displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendering {
    pub text: String,
    pub phase: ViewPhase,
}

struct ViewState {
    source: String,
    fallback: Option<String>,
    generation: u64,
    mounted: bool,
}

impl ViewState {
    /// Text shown while resolving and after a failed resolution.
    fn interim(&self) -> String {
        self.fallback.clone().unwrap_or_else(|| self.source.clone())
    }
}

struct ViewShared {
    context: Arc<LanguageContext>,
    state: Mutex<ViewState>,
    rendering: watch::Sender<Rendering>,
}

impl ViewShared {
    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, text: String, phase: ViewPhase) {
        self.rendering.send_replace(Rendering { text, phase });
    }

    /// Start a new generation for the current source text and language.
    fn resolve(self: &Arc<Self>) {
        let mut state = self.lock();
        if !state.mounted {
            return;
        }
        // Read under the lock so a newer generation never carries an older language
        let language = self.context.language();
        state.generation += 1;
        let generation = state.generation;

        if language.is_canonical() {
            self.publish(state.source.clone(), ViewPhase::IdleNative);
            return;
        }

        if let Some(hit) = self.context.cached_in(&state.source, language) {
            self.publish(hit, ViewPhase::Resolved);
            return;
        }

        self.publish(state.interim(), ViewPhase::Resolving);
        let source = state.source.clone();
        drop(state);

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = shared.context.resolve_in(&source, language).await;
            shared.complete(generation, outcome);
        });
    }

    /// Apply a finished resolution if it is still the newest one.
    fn complete(&self, generation: u64, outcome: TranslationOutcome) {
        let state = self.lock();
        if !state.mounted || state.generation != generation {
            debug!(
                "Discarding stale translation (generation {}, current {})",
                generation, state.generation
            );
            return;
        }

        match outcome {
            TranslationOutcome::Translated(text) => self.publish(text, ViewPhase::Resolved),
            TranslationOutcome::Fallback(_) => {
                self.publish(state.interim(), ViewPhase::ResolvedFallback)
            }
            TranslationOutcome::Identity(text) => self.publish(text, ViewPhase::IdleNative),
        }
    }
}

/// A mounted piece of translated text.
///
/// Dropping the view (or calling [`TranslatedText::unmount`]) stops it from
/// reacting to language changes and from applying any result still in flight.
pub struct TranslatedText {
    shared: Arc<ViewShared>,
    watcher: JoinHandle<()>,
}

impl std::fmt::Debug for TranslatedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatedText")
            .field("rendering", &self.rendering())
            .finish_non_exhaustive()
    }
}

impl TranslatedText {
    /// Mount a view for `text`, showing `fallback` (if any) while translating.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        context: Arc<LanguageContext>,
        text: impl Into<String>,
        fallback: Option<String>,
    ) -> Self {
        let source = text.into();
        let mut language_rx = context.subscribe();
        let (rendering, _) = watch::channel(Rendering {
            text: source.clone(),
            phase: ViewPhase::IdleNative,
        });

        let shared = Arc::new(ViewShared {
            context,
            state: Mutex::new(ViewState {
                source,
                fallback,
                generation: 0,
                mounted: true,
            }),
            rendering,
        });
        shared.resolve();

        let weak: Weak<ViewShared> = Arc::downgrade(&shared);
        let watcher = tokio::spawn(async move {
            while language_rx.changed().await.is_ok() {
                match weak.upgrade() {
                    Some(shared) => shared.resolve(),
                    None => break,
                }
            }
        });

        Self { shared, watcher }
    }

    pub fn rendering(&self) -> Rendering {
        self.shared.rendering.borrow().clone()
    }

    pub fn text(&self) -> String {
        self.shared.rendering.borrow().text.clone()
    }

    pub fn phase(&self) -> ViewPhase {
        self.shared.rendering.borrow().phase
    }

    pub fn source(&self) -> String {
        self.shared.lock().source.clone()
    }

    /// Receive every rendering change.
    pub fn subscribe(&self) -> watch::Receiver<Rendering> {
        self.shared.rendering.subscribe()
    }

    /// Wait until no translation is in flight and return the rendering.
    pub async fn settled(&self) -> Rendering {
        let mut rx = self.subscribe();
        rx.wait_for(|r| r.phase != ViewPhase::Resolving)
            .await
            .map(|rendering| rendering.clone())
            .unwrap_or_else(|_| self.rendering())
    }

    /// Replace the source text and re-resolve. Setting the same text is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        {
            let mut state = self.shared.lock();
            if state.source == text {
                return;
            }
            state.source = text;
        }
        self.shared.resolve();
    }

    /// Replace the fallback text and re-resolve.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_fallback(&self, fallback: Option<String>) {
        {
            let mut state = self.shared.lock();
            if state.fallback == fallback {
                return;
            }
            state.fallback = fallback;
        }
        self.shared.resolve();
    }

    /// Stop reacting to changes; pending results are discarded.
    pub fn unmount(self) {}
}

impl Drop for TranslatedText {
    fn drop(&mut self) {
        self.shared.lock().mounted = false;
        self.watcher.abort();
    }
}
