//! Translation cache and client.
//!
//! [`TranslationService`] memoizes provider results per
//! (source text, source language) → target language, shares one in-flight
//! provider request between concurrent callers asking for the same triple,
//! and falls back to the original text whenever the provider fails.

use crate::config::Config;
use crate::error::TranslationError;
use crate::i18n::{Language, MetricsReport, TranslationMetrics};
use crate::provider::{LibreTranslateProvider, TranslationProvider, TranslationRequest};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::Result;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// (source text, source language)
type CacheKey = (String, Language);

/// (source text, source language, target language)
type PendingKey = (String, Language, Language);

/// Shared slot for one in-flight provider request; `None` means it failed.
type PendingSlot = Arc<OnceCell<Option<String>>>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a piece of text was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// Source and target language are the same; nothing to do
    Identity(String),
    /// Served from the cache or a successful provider call
    Translated(String),
    /// The provider failed; this is the original text
    Fallback(String),
}

impl TranslationOutcome {
    pub fn text(&self) -> &str {
        match self {
            TranslationOutcome::Identity(text)
            | TranslationOutcome::Translated(text)
            | TranslationOutcome::Fallback(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            TranslationOutcome::Identity(text)
            | TranslationOutcome::Translated(text)
            | TranslationOutcome::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TranslationOutcome::Fallback(_))
    }
}

/// An in-flight request and the number of callers waiting on it.
struct Pending {
    slot: PendingSlot,
    waiters: usize,
}

type PendingMap = HashMap<PendingKey, Pending>;

/// One caller's claim on a pending request.
///
/// The last waiter to leave removes the entry, whether it finished or was
/// cancelled, so an abandoned slot never outlives its callers.
struct PendingWaiter<'a> {
    pending: &'a Mutex<PendingMap>,
    key: PendingKey,
    slot: PendingSlot,
}

impl Drop for PendingWaiter<'_> {
    fn drop(&mut self) {
        let mut pending = lock(self.pending);
        if let Some(entry) = pending.get_mut(&self.key) {
            entry.waiters -= 1;
            if entry.waiters == 0 {
                pending.remove(&self.key);
            }
        }
    }
}

/// Memoizing, fail-open client for a [`TranslationProvider`].
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
    cache: Mutex<HashMap<CacheKey, HashMap<Language, String>>>,
    pending: Mutex<PendingMap>,
    metrics: TranslationMetrics,
    timeout: Duration,
    retry: RetryConfig,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("cached", &self.cache_len())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TranslationService {
    /// Single attempt per miss, 10 second timeout.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            cache: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
            metrics: TranslationMetrics::new(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::single_attempt(),
        }
    }

    /// Service backed by LibreTranslate, configured from the environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = LibreTranslateProvider::from_config(config)?;
        Ok(Self::new(Arc::new(provider))
            .with_timeout(config.translate_timeout)
            .with_retry(RetryConfig::translation(config.translate_max_attempts)))
    }

    /// Upper bound on a single provider attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Translate `text`, returning the original text if translation fails.
    pub async fn translate(&self, text: &str, target: Language, source: Language) -> String {
        self.translate_outcome(text, target, source)
            .await
            .into_text()
    }

    /// Translate `text` and report whether the result is a real translation.
    pub async fn translate_outcome(
        &self,
        text: &str,
        target: Language,
        source: Language,
    ) -> TranslationOutcome {
        if target == source {
            return TranslationOutcome::Identity(text.to_string());
        }

        if let Some(hit) = self.cached(text, target, source) {
            self.metrics.record_cache_hit();
            debug!("Translation cache hit ({} -> {})", source, target);
            return TranslationOutcome::Translated(hit);
        }
        self.metrics.record_cache_miss();

        let key: PendingKey = (text.to_string(), source, target);
        let slot = {
            let mut pending = lock(&self.pending);
            match pending.get_mut(&key) {
                Some(entry) => {
                    entry.waiters += 1;
                    self.metrics.record_coalesced();
                    debug!("Joining in-flight translation ({} -> {})", source, target);
                    entry.slot.clone()
                }
                None => {
                    let slot = PendingSlot::default();
                    pending.insert(
                        key.clone(),
                        Pending {
                            slot: slot.clone(),
                            waiters: 1,
                        },
                    );
                    slot
                }
            }
        };
        let waiter = PendingWaiter {
            pending: &self.pending,
            key,
            slot,
        };

        let result = waiter
            .slot
            .get_or_init(|| self.fetch(text, source, target))
            .await
            .clone();

        if let Some(translated) = &result {
            self.store(text, source, target, translated);
        }
        drop(waiter);

        match result {
            Some(translated) => TranslationOutcome::Translated(translated),
            None => TranslationOutcome::Fallback(text.to_string()),
        }
    }

    /// Translate every text concurrently; output order matches input order.
    pub async fn translate_multiple<S: AsRef<str>>(
        &self,
        texts: &[S],
        target: Language,
        source: Language,
    ) -> Vec<String> {
        join_all(
            texts
                .iter()
                .map(|text| self.translate(text.as_ref(), target, source)),
        )
        .await
    }

    /// Cached translation, if one exists. Never touches the network.
    pub fn cached(&self, text: &str, target: Language, source: Language) -> Option<String> {
        if target == source {
            return None;
        }
        lock(&self.cache)
            .get(&(text.to_string(), source))
            .and_then(|targets| targets.get(&target))
            .cloned()
    }

    /// Drop every memoized translation.
    pub fn clear_cache(&self) {
        let mut cache = lock(&self.cache);
        let removed: usize = cache.values().map(HashMap::len).sum();
        cache.clear();
        debug!("Cleared {} cached translations", removed);
    }

    /// Number of cached (text, source, target) translations.
    pub fn cache_len(&self) -> usize {
        lock(&self.cache).values().map(HashMap::len).sum()
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    pub fn supported_languages(&self) -> Vec<Language> {
        Language::all()
    }

    fn store(&self, text: &str, source: Language, target: Language, translated: &str) {
        lock(&self.cache)
            .entry((text.to_string(), source))
            .or_default()
            .entry(target)
            .or_insert_with(|| translated.to_string());
    }

    /// One provider round trip (plus configured retries); `None` on failure.
    async fn fetch(&self, text: &str, source: Language, target: Language) -> Option<String> {
        let request = TranslationRequest {
            text: text.to_string(),
            source,
            target,
        };
        let timeout = self.timeout;
        let metrics = &self.metrics;

        let result = with_retry_if(
            &self.retry,
            &format!("Translation {} -> {}", source, target),
            || {
                metrics.record_api_call();
                let call = self.provider.translate(request.clone());
                async move {
                    let result = match tokio::time::timeout(timeout, call).await {
                        Ok(result) => result,
                        Err(_) => Err(TranslationError::Timeout(timeout)),
                    };
                    if result.is_err() {
                        metrics.record_api_failure();
                    }
                    result
                }
            },
            TranslationError::is_retryable,
        )
        .await;

        match result {
            Ok(translated) => Some(translated),
            Err(e) => {
                warn!(
                    "Translation {} -> {} failed, keeping original text: {}",
                    source, target, e
                );
                None
            }
        }
    }
}
