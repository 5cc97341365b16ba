use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation provider (LibreTranslate-compatible)
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    pub translate_timeout: Duration,
    pub translate_max_attempts: u32,

    // Language preference persistence
    pub preferences_path: PathBuf,

    // HTTP API
    pub admin_api_key: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://libretranslate.com".to_string()),
            translate_api_key: non_empty_var("TRANSLATE_API_KEY"),
            translate_timeout: Duration::from_millis(
                std::env::var("TRANSLATE_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10_000),
            ),
            translate_max_attempts: std::env::var("TRANSLATE_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(1)
                .max(1),

            preferences_path: std::env::var("PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/preferences.json")),

            admin_api_key: non_empty_var("ADMIN_API_KEY"),
            port,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate_api_url: "https://libretranslate.com".to_string(),
            translate_api_key: None,
            translate_timeout: Duration::from_secs(10),
            translate_max_attempts: 1,
            preferences_path: PathBuf::from("data/preferences.json"),
            admin_api_key: None,
            port: 8080,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
