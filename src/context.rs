//! Language context: the single source of truth for the active language.
//!
//! One context is built at startup and shared by `Arc` with everything that
//! renders text. Changes are broadcast over a `watch` channel so mounted
//! views can re-resolve their text.

use crate::i18n::{catalog, Language};
use crate::preferences::PreferenceStore;
use crate::translation::{TranslationOutcome, TranslationService};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info};

pub struct LanguageContext {
    language: watch::Sender<Language>,
    translator: Arc<TranslationService>,
    preferences: Arc<dyn PreferenceStore>,
    /// Held across the in-memory switch and the save so the stored preference
    /// always matches the active language
    update: Mutex<()>,
}

impl std::fmt::Debug for LanguageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageContext")
            .field("language", &self.language())
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}

impl LanguageContext {
    /// Build the context, seeding the active language from the stored
    /// preference (or the native language when there is none).
    pub fn new(translator: Arc<TranslationService>, preferences: Arc<dyn PreferenceStore>) -> Self {
        let initial = preferences.load().unwrap_or_else(Language::canonical);
        info!("Active language: {} ({})", initial.name(), initial.code());

        let (language, _) = watch::channel(initial);
        Self {
            language,
            translator,
            preferences,
            update: Mutex::new(()),
        }
    }

    pub fn language(&self) -> Language {
        *self.language.borrow()
    }

    /// Switch to the language with the given code.
    ///
    /// Unknown or disabled codes are ignored and leave the active language
    /// unchanged. Returns whether the code was accepted.
    pub fn set_language(&self, code: &str) -> bool {
        match Language::from_code(code) {
            Ok(language) => {
                self.set(language);
                true
            }
            Err(e) => {
                debug!("Ignoring language change: {}", e);
                false
            }
        }
    }

    /// Switch to `language` and persist it. Subscribers are notified only if
    /// the active language actually changes.
    pub fn set(&self, language: Language) {
        let _update = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = self.language.send_if_modified(|current| {
            if *current == language {
                false
            } else {
                *current = language;
                true
            }
        });
        if changed {
            info!("Language changed to {} ({})", language.name(), language.code());
        }
        self.preferences.save(language);
    }

    /// Translate native-language `text` into the active language, falling back
    /// to `text` on any failure.
    pub async fn translate(&self, text: &str) -> String {
        self.resolve(text).await.into_text()
    }

    /// Like [`LanguageContext::translate`], but reports how the text was resolved.
    pub async fn resolve(&self, text: &str) -> TranslationOutcome {
        self.resolve_in(text, self.language()).await
    }

    /// Resolve `text` for a specific language rather than the active one.
    pub async fn resolve_in(&self, text: &str, language: Language) -> TranslationOutcome {
        let native = Language::canonical();
        if language == native {
            return TranslationOutcome::Identity(text.to_string());
        }
        self.translator
            .translate_outcome(text, language, native)
            .await
    }

    /// Cached translation of `text` into `language`, without any network call.
    pub fn cached_in(&self, text: &str, language: Language) -> Option<String> {
        self.translator
            .cached(text, language, Language::canonical())
    }

    /// Look up a dashboard string by key path in the active language.
    pub fn t(&self, key_path: &str) -> String {
        catalog::lookup(self.language(), key_path)
    }

    /// Receive every subsequent language change.
    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.language.subscribe()
    }

    pub fn translator(&self) -> &Arc<TranslationService> {
        &self.translator
    }
}
