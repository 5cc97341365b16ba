//! Remote translation provider.
//!
//! The service talks to providers through [`TranslationProvider`] so tests and
//! alternative backends can stand in for the HTTP client. The production
//! implementation speaks the LibreTranslate `/translate` API.

use crate::config::Config;
use crate::error::TranslationError;
use crate::i18n::Language;
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

/// One text to translate; lives for a single round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

/// A backend that turns a [`TranslationRequest`] into translated text.
pub trait TranslationProvider: Send + Sync {
    fn translate(&self, request: TranslationRequest)
        -> BoxFuture<'static, Result<String, TranslationError>>;
}

/// Form body for `POST /translate`
#[derive(Debug, Serialize)]
struct TranslateForm {
    q: String,
    source: &'static str,
    target: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// LibreTranslate-compatible HTTP provider.
#[derive(Debug, Clone)]
pub struct LibreTranslateProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Build a provider whose HTTP client enforces the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.translate_timeout)
            .build()
            .context("Failed to build translation HTTP client")?;

        Ok(Self::new(
            client,
            &config.translate_api_url,
            config.translate_api_key.clone(),
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/translate", self.base_url)
    }
}

impl TranslationProvider for LibreTranslateProvider {
    fn translate(
        &self,
        request: TranslationRequest,
    ) -> BoxFuture<'static, Result<String, TranslationError>> {
        let client = self.client.clone();
        let url = self.endpoint();
        let form = TranslateForm {
            q: request.text,
            source: request.source.provider_code(),
            target: request.target.provider_code(),
            api_key: self.api_key.clone(),
        };

        async move {
            let response = client.post(&url).form(&form).send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                return Err(TranslationError::Status { status, body });
            }

            let body = response.text().await?;
            let parsed: TranslateResponse = serde_json::from_str(&body)
                .map_err(|e| TranslationError::Malformed(e.to_string()))?;

            Ok(parsed.translated_text)
        }
        .boxed()
    }
}
