//! Localization and translation for the farmer dashboard.
//!
//! A [`LanguageContext`](context::LanguageContext) is built once at startup
//! around a [`TranslationService`](translation::TranslationService) and a
//! [`PreferenceStore`](preferences::PreferenceStore), then shared with every
//! [`TranslatedText`](view::TranslatedText) view and the HTTP API.

pub mod config;
pub mod context;
pub mod error;
pub mod i18n;
pub mod preferences;
pub mod provider;
pub mod retry;
pub mod security;
pub mod server;
pub mod translation;
pub mod view;

#[cfg(test)]
mod test_utils;
