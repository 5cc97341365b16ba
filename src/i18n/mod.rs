//! Internationalization (i18n) building blocks.
//!
//! - `registry`: the closed set of supported languages and their metadata
//! - `language`: the validated `Language` type
//! - `catalog`: static key-path dictionaries for dashboard chrome
//! - `metrics`: translation cache and provider counters
//!
//! # Example
//!
//! ```rust,ignore
//! use agritech_i18n::i18n::{catalog, Language};
//!
//! let hindi = Language::from_code("hi")?;
//! assert_eq!(catalog::lookup(hindi, "market.title"), "मंडी भाव");
//! ```

pub mod catalog;
mod language;
mod metrics;
mod registry;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
