pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod ui;

use crate::{
    emotion::{Emotion, EmotionPipeline},
    image::INPUT_SHAPE,
    models::ModelManager,
    utils::error::EmotionError,
    Config, Result,
};
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// 所有处理器共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<EmotionPipeline>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<EmotionPipeline>) -> Self {
        Self {
            config,
            pipeline,
            started_at: Utc::now(),
        }
    }
}

pub async fn serve(config: Config) -> Result<()> {
    // 接收请求前先加载模型
    ModelManager::init(&config)?;
    let model = ModelManager::instance()?;
    let pipeline = Arc::new(EmotionPipeline::from_config(model, &config));

    let addr = config.bind_addr;
    let app = create_app(AppState::new(config, pipeline));

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Web UI available at http://{}/", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  POST /predict        - Multipart upload (field 'image')");
    tracing::info!("  POST /predict/base64 - JSON base64 upload");
    tracing::info!("  GET  /health         - Health check");
    tracing::info!("  GET  /api/info       - Service information");

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        EmotionError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| EmotionError::Internal(format!("Server failed: {}", e)))?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.server_config.max_request_size;

    Router::new()
        .route("/", get(ui::index_handler))
        .route("/predict", post(handlers::predict_handler))
        .route("/predict/base64", post(handlers::predict_base64_handler))
        .route("/health", get(health_handler))
        .route("/api/info", get(info_handler))
        // 超限由提取器报告，经EmotionError返回JSON
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    tracing::info!("Health check requested");
    Json(json!({
        "status": "healthy",
        "message": "Flask API is running"
    }))
}

async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let labels: Vec<&str> = Emotion::ALL.iter().map(|e| e.key()).collect();
    let uptime = Utc::now().signed_duration_since(state.started_at);

    Json(json!({
        "service": "Emotion Recognition API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "labels": labels,
        "input_shape": INPUT_SHAPE,
        "model": state.pipeline.model().describe(),
        "softmax": state.pipeline.softmax_enabled(),
        "started_at": state.started_at.to_rfc3339(),
        "uptime_seconds": uptime.num_seconds(),
    }))
}
