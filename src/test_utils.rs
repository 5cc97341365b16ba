//! Scripted translation provider for unit tests.

use crate::error::TranslationError;
use crate::provider::{TranslationProvider, TranslationRequest};
use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Default)]
struct ScriptState {
    translations: Mutex<HashMap<String, String>>,
    failures: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    requests: Mutex<Vec<TranslationRequest>>,
    calls: AtomicUsize,
}

/// In-memory provider whose answers, failures and timing are set per text.
///
/// Unscripted texts translate to `"[<target>] <text>"`.
#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    state: Arc<ScriptState>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_translation(self, text: &str, translated: &str) -> Self {
        self.state
            .translations
            .lock()
            .unwrap()
            .insert(text.to_string(), translated.to_string());
        self
    }

    pub(crate) fn with_failure(self, text: &str) -> Self {
        self.state.failures.lock().unwrap().insert(text.to_string());
        self
    }

    /// Hold every request for `text` until [`ScriptedProvider::release`] is called.
    pub(crate) fn hold(&self, text: &str) {
        self.state
            .gates
            .lock()
            .unwrap()
            .insert(text.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held request for `text` complete.
    pub(crate) fn release(&self, text: &str) {
        if let Some(gate) = self.state.gates.lock().unwrap().get(text) {
            gate.add_permits(1);
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<TranslationRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub(crate) fn into_provider(self) -> Arc<dyn TranslationProvider> {
        Arc::new(self)
    }
}

impl TranslationProvider for ScriptedProvider {
    fn translate(
        &self,
        request: TranslationRequest,
    ) -> BoxFuture<'static, Result<String, TranslationError>> {
        let state = self.state.clone();

        async move {
            state.calls.fetch_add(1, Ordering::SeqCst);
            state.requests.lock().unwrap().push(request.clone());

            let gate = state.gates.lock().unwrap().get(&request.text).cloned();
            if let Some(gate) = gate {
                gate.acquire()
                    .await
                    .expect("gate semaphore is never closed")
                    .forget();
            }

            if state.failures.lock().unwrap().contains(&request.text) {
                return Err(TranslationError::Malformed("scripted failure".to_string()));
            }

            let translated = state
                .translations
                .lock()
                .unwrap()
                .get(&request.text)
                .cloned()
                .unwrap_or_else(|| format!("[{}] {}", request.target, request.text));
            Ok(translated)
        }
        .boxed()
    }
}
