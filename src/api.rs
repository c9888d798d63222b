//! HTTP API server.
//!
//! Routes:
//! - `GET /`                   landing page with voices, vibes and default prompt
//! - `GET /api/options`        the same catalogue as JSON
//! - `POST /api/generate-tts`  run the generation pipeline, answer with a local audio URL
//! - `GET /audio/{code}`       stream cached audio from its upstream URL

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, Uri};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cache::ResourceCache;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::index::Catalogue;
use crate::pipeline::{GenerateRequest, GenerationPipeline};
use crate::proxy::AudioProxy;
use crate::tts::{OpenAiFmClient, TtsClient};
use crate::upload::{TmpfilesClient, UploadClient};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GenerationPipeline>,
    pub proxy: Arc<AudioProxy>,
    pub cache: ResourceCache,
    pub catalogue: Arc<Catalogue>,
    /// Used for audio URLs when the request carries no host.
    pub fallback_host: String,
}

impl AppState {
    pub fn new(
        config: &Config,
        tts: Arc<dyn TtsClient>,
        uploader: Arc<dyn UploadClient>,
    ) -> Self {
        let cache = ResourceCache::new(config.cache.eviction);
        let pipeline = GenerationPipeline::new(
            tts,
            uploader,
            cache.clone(),
            config.limits.max_text_len,
            config.upload.filename.clone(),
        );

        Self {
            pipeline: Arc::new(pipeline),
            proxy: Arc::new(AudioProxy::new(&config.proxy)),
            cache,
            catalogue: Arc::new(Catalogue::default()),
            fallback_host: format!("localhost:{}", config.server.port),
        }
    }

    /// State wired to the real generation service and file host.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            Arc::new(OpenAiFmClient::new(config.tts.clone())),
            Arc::new(TmpfilesClient::new(config.upload.clone())),
        )
    }
}

// --- Response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub audio_url: String,
    pub params: GenerateRequest,
}

/// Build the axum router.
pub fn router(state: AppState, config: &Config) -> Router {
    let mut app = Router::new()
        .route("/", get(handle_index))
        .route("/api/options", get(handle_options))
        .route("/api/generate-tts", post(handle_generate))
        .route("/audio/{code}", get(handle_audio))
        .with_state(state);

    if let Some(dir) = &config.server.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config) -> std::io::Result<()> {
    let state = AppState::from_config(config);
    let app = router(state, config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("voicegen listening on http://{addr}");

    axum::serve(listener, app).await
}

// --- Handlers ---

async fn handle_index(State(state): State<AppState>) -> Html<String> {
    Html(state.catalogue.render_html())
}

async fn handle_options(State(state): State<AppState>) -> Json<Catalogue> {
    Json(state.catalogue.as_ref().clone())
}

async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(req) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let preview: String = req.text.chars().take(60).collect();
    info!(
        "HTTP /api/generate-tts: \"{}{}\" (voice={}, vibe={})",
        preview.replace('\n', " "),
        if req.text.chars().count() > 60 { "..." } else { "" },
        req.voice,
        req.vibe,
    );

    let generated = state.pipeline.run(&req).await?;

    let scheme = uri.scheme_str().unwrap_or("http");
    let host = request_host(&headers, &uri).unwrap_or(state.fallback_host.as_str());
    let audio_url = format!("{scheme}://{host}/audio/{}", generated.code);

    Ok(Json(GenerateResponse {
        success: true,
        audio_url,
        params: req,
    }))
}

async fn handle_audio(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<axum::response::Response> {
    let url = state.cache.get(&code)?;
    Ok(state.proxy.relay(&url).await?)
}

/// Host the client used to reach us: `Host` header first, then the URI authority.
fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
    headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| uri.authority().map(|a| a.as_str()))
}
