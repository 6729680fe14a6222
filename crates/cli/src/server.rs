//! HTTP service exposing analysis, audio, upload and status.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use memo_core::audio::{self, AudioError, AudioOutcome};
use memo_core::config::AppConfig;
use memo_core::memo::{self, MemoError};
use memo_core::pipeline::LogProgress;
use memo_core::registry::{self, ProviderEnv};
use memo_core::status::{self, ProviderKeys, StatusReport};
use memo_core::{AnalysisContext, AnalysisResult, PipelineError};
use providers::ProviderRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub struct AppState {
    pub config: AppConfig,
    pub env: ProviderEnv,
    pub registry: ProviderRegistry,
}

impl AppState {
    pub fn new(config: AppConfig, env: ProviderEnv) -> anyhow::Result<Self> {
        let registry = registry::build_registry(&config, &env)?;
        Ok(Self {
            config,
            env,
            registry,
        })
    }
}

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn too_large(limit_mb: usize) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            body: json!({ "error": "Request too large", "limit": format!("{limit_mb}mb") }),
        }
    }

    fn with_detail(status: StatusCode, message: &str, detail: impl ToString) -> Self {
        Self {
            status,
            body: json!({ "error": message, "detail": detail.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.body_limit_mb * 1024 * 1024;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(status_handler))
        .route("/providers", get(providers_handler))
        .route("/analyze", post(analyze))
        .route("/generate-audio", post(generate_audio))
        .route("/upload", post(upload))
        .layer(middleware::map_response_with_state(
            state.clone(),
            json_for_oversized_body,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Replaces the plain-text 413 raised by body extractors with a JSON error.
async fn json_for_oversized_body(
    State(state): State<Arc<AppState>>,
    response: Response,
) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }
    ApiError::too_large(state.config.server.body_limit_mb).into_response()
}

/// Binds `server.host:server.port` and serves until the process is stopped.
pub async fn serve(config: AppConfig, env: ProviderEnv) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, env)?);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "memo analyzer listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusReport> {
    Json(status::status_report(&state.env, &state.config))
}

async fn providers_handler(State(state): State<Arc<AppState>>) -> Json<ProviderKeys> {
    Json(status::provider_keys(&state.env))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let memo = req.memo.unwrap_or_default();
    if memo.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "No memo text provided.",
        ));
    }

    let pipeline = registry::pipeline_for(
        &state.registry,
        req.provider.as_deref(),
        state.config.analysis,
    )
    .map_err(|e| {
        warn!(error = %e, "analysis provider unavailable");
        ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let mut ctx = AnalysisContext::new();
    match pipeline.run_in(&mut ctx, &memo, &LogProgress).await {
        Ok(outcome) => Ok(Json(outcome.into_result())),
        Err(PipelineError::EmptyInput) => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "No memo text provided.",
        )),
        Err(e) => {
            error!(stage = %e.stage(), "analyze request failed: {}", e);
            Err(ApiError::with_detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI backend failure.",
                e,
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AudioRequest {
    #[serde(default)]
    pub text: Option<String>,
}

async fn generate_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AudioRequest>,
) -> Result<Json<AudioOutcome>, ApiError> {
    let text = req.text.unwrap_or_default();
    let speech = state.registry.speech().map_err(|e| {
        ApiError::with_detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Audio generation failed",
            e,
        )
    })?;
    match audio::generate_audio(speech.as_ref(), &text).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(AudioError::EmptyText) => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "No text provided for audio generation.",
        )),
        Err(e) => {
            error!("audio generation failed: {}", e);
            Err(ApiError::with_detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Audio generation failed",
                e,
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub characters: usize,
    pub memo: String,
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let limit_mb = state.config.server.body_limit_mb;
    let multipart_error = |e: MultipartError, what: &str| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::too_large(limit_mb),
        status => ApiError::new(status, format!("{what}: {e}")),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Multipart error"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("memo.txt").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file"))?;

        let memo = memo::memo_from_bytes(&filename, &bytes, state.config.upload.max_file_bytes)
            .map_err(|e| {
                warn!(%filename, error = %e, "upload rejected");
                let status = match e {
                    MemoError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };
                ApiError::new(status, e.to_string())
            })?;

        let characters = memo.chars().count();
        info!(%filename, characters, "memo uploaded");
        return Ok(Json(UploadResponse {
            success: true,
            filename,
            characters,
            memo,
        }));
    }
    Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded."))
}
