//! HTTP API exposing the language context to the dashboard front end.

use crate::config::Config;
use crate::context::LanguageContext;
use crate::i18n::{catalog, Language, MetricsReport};
use crate::security::bearer_token_matches;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct AppState {
    pub context: Arc<LanguageContext>,
    /// Required for destructive admin calls; admin routes are hidden when unset
    pub admin_api_key: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageInfo {
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    active: bool,
}

impl LanguageInfo {
    fn new(language: Language, active: Language) -> Self {
        Self {
            code: language.code(),
            name: language.name(),
            native_name: language.native_name(),
            active: language == active,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SetLanguageBody {
    code: String,
}

#[derive(Debug, Serialize)]
struct SetLanguageResponse {
    applied: bool,
    language: LanguageInfo,
}

#[derive(Debug, Deserialize)]
struct TranslateBody {
    text: String,
    target: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
    source: Language,
    target: Language,
}

#[derive(Debug, Deserialize)]
struct TranslateBatchBody {
    texts: Vec<String>,
    target: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateBatchResponse {
    translations: Vec<String>,
    source: Language,
    target: Language,
}

#[derive(Debug, Deserialize)]
struct StringsQuery {
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct StringResponse {
    key: String,
    value: String,
    language: Language,
}

#[derive(Debug, Serialize)]
struct MetricsResponse {
    #[serde(flatten)]
    report: MetricsReport,
    cached_translations: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(list_languages))
        .route("/api/language", get(get_language).put(put_language))
        .route("/api/translate", post(translate))
        .route("/api/translate/batch", post(translate_batch))
        .route("/api/translate/cache", delete(clear_cache))
        .route("/api/strings/:key", get(lookup_string))
        .route("/api/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured port and serve until Ctrl+C.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// Parse an optional language code from a request, using `default` when absent.
fn parse_language(code: Option<&str>, default: Language) -> Result<Language, ApiError> {
    match code {
        None => Ok(default),
        Some(code) => Language::from_code(code).map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn list_languages(State(state): State<AppState>) -> Json<Vec<LanguageInfo>> {
    let active = state.context.language();
    Json(
        Language::all()
            .into_iter()
            .map(|language| LanguageInfo::new(language, active))
            .collect(),
    )
}

async fn get_language(State(state): State<AppState>) -> Json<LanguageInfo> {
    let active = state.context.language();
    Json(LanguageInfo::new(active, active))
}

async fn put_language(
    State(state): State<AppState>,
    Json(body): Json<SetLanguageBody>,
) -> Result<Json<SetLanguageResponse>, ApiError> {
    // Saving the preference touches the filesystem
    let context = state.context.clone();
    let applied = tokio::task::spawn_blocking(move || context.set_language(&body.code))
        .await
        .map_err(|e| {
            error!("Language update task failed: {}", e);
            ApiError::Internal("Language update failed".to_string())
        })?;

    let active = state.context.language();
    Ok(Json(SetLanguageResponse {
        applied,
        language: LanguageInfo::new(active, active),
    }))
}

async fn translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let target = parse_language(body.target.as_deref(), state.context.language())?;
    let source = parse_language(body.source.as_deref(), Language::canonical())?;

    let translated_text = state
        .context
        .translator()
        .translate(&body.text, target, source)
        .await;

    Ok(Json(TranslateResponse {
        translated_text,
        source,
        target,
    }))
}

async fn translate_batch(
    State(state): State<AppState>,
    Json(body): Json<TranslateBatchBody>,
) -> Result<Json<TranslateBatchResponse>, ApiError> {
    let target = parse_language(body.target.as_deref(), state.context.language())?;
    let source = parse_language(body.source.as_deref(), Language::canonical())?;

    let translations = state
        .context
        .translator()
        .translate_multiple(&body.texts, target, source)
        .await;

    Ok(Json(TranslateBatchResponse {
        translations,
        source,
        target,
    }))
}

async fn lookup_string(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<StringsQuery>,
) -> Result<Json<StringResponse>, ApiError> {
    let language = parse_language(query.lang.as_deref(), state.context.language())?;
    let value = catalog::lookup(language, &key);
    Ok(Json(StringResponse {
        key,
        value,
        language,
    }))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let translator = state.context.translator();
    Json(MetricsResponse {
        report: translator.metrics(),
        cached_translations: translator.cache_len(),
    })
}

async fn clear_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Err(ApiError::NotFound);
    };

    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !bearer_token_matches(authorization, expected) {
        return Err(ApiError::Unauthorized);
    }

    state.context.translator().clear_cache();
    info!("Translation cache cleared via API");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_default_and_valid() {
        assert_eq!(
            parse_language(None, Language::HINDI).unwrap(),
            Language::HINDI
        );
        assert_eq!(
            parse_language(Some("pa"), Language::HINDI).unwrap(),
            Language::PUNJABI
        );
    }

    #[test]
    fn test_parse_language_invalid_is_bad_request() {
        match parse_language(Some("de"), Language::ENGLISH) {
            Err(ApiError::BadRequest(message)) => assert!(message.contains("de")),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_language_info_serialization() {
        let info = LanguageInfo::new(Language::HINDI, Language::HINDI);
        let json = serde_json::to_value(&info).expect("Should serialize");
        assert_eq!(json["code"], "hi");
        assert_eq!(json["nativeName"], "हिंदी");
        assert_eq!(json["active"], true);
    }

    #[test]
    fn test_api_error_statuses() {
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
