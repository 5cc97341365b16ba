use agritech_i18n::config::Config;
use agritech_i18n::context::LanguageContext;
use agritech_i18n::preferences::FilePreferenceStore;
use agritech_i18n::server::{self, AppState};
use agritech_i18n::translation::TranslationService;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agritech_i18n=info".parse()?),
        )
        .init();

    info!("Starting agritech-i18n");

    let config = Config::from_env()?;
    info!(
        "Translation provider: {} (timeout {:?}, {} attempt(s))",
        config.translate_api_url, config.translate_timeout, config.translate_max_attempts
    );

    let translator = Arc::new(TranslationService::from_config(&config)?);
    let preferences = Arc::new(FilePreferenceStore::new(&config.preferences_path));
    info!("Language preference file: {}", preferences.path().display());

    let context = Arc::new(LanguageContext::new(translator.clone(), preferences));
    let state = AppState {
        context,
        admin_api_key: config.admin_api_key.clone(),
    };

    server::serve(&config, state).await?;

    info!("{}", translator.metrics().format());
    Ok(())
}
