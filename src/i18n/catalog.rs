//! Static string catalog for dashboard chrome (titles, buttons, badges).
//!
//! Each language has a nested JSON dictionary embedded at compile time.
//! Keys are dotted paths such as `market.recommendation.buy`; a path that does
//! not resolve to a string yields the path itself.

use crate::i18n::Language;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

static CATALOG: OnceLock<HashMap<&'static str, Value>> = OnceLock::new();

fn sources() -> [(&'static str, &'static str); 3] {
    [
        ("en", include_str!("../../locales/en.json")),
        ("hi", include_str!("../../locales/hi.json")),
        ("pa", include_str!("../../locales/pa.json")),
    ]
}

fn catalog() -> &'static HashMap<&'static str, Value> {
    CATALOG.get_or_init(|| {
        sources()
            .into_iter()
            .map(|(code, raw)| {
                let dictionary = serde_json::from_str(raw).unwrap_or_else(|e| {
                    warn!("Locale dictionary for '{}' is not valid JSON: {}", code, e);
                    Value::Null
                });
                (code, dictionary)
            })
            .collect()
    })
}

/// Resolve a dotted key path in the language's dictionary.
pub fn get(language: Language, key_path: &str) -> Option<&'static str> {
    let mut node = catalog().get(language.code())?;
    for segment in key_path.split('.') {
        node = node.get(segment)?;
    }
    node.as_str()
}

/// Resolve a dotted key path, returning the key path itself when missing.
pub fn lookup(language: Language, key_path: &str) -> String {
    get(language, key_path)
        .map(str::to_string)
        .unwrap_or_else(|| key_path.to_string())
}
