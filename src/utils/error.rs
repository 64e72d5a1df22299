use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmotionError {
    #[error("No image uploaded")]
    MissingImage,

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl EmotionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EmotionError::MissingImage => StatusCode::BAD_REQUEST,
            EmotionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EmotionError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            EmotionError::Base64(_) => StatusCode::BAD_REQUEST,
            EmotionError::Json(_) => StatusCode::BAD_REQUEST,
            EmotionError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EmotionError::MissingImage => "MISSING_IMAGE",
            EmotionError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            EmotionError::Inference(_) => "INFERENCE_ERROR",
            EmotionError::InvalidInput(_) => "INVALID_INPUT",
            EmotionError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            EmotionError::Config(_) => "CONFIG_ERROR",
            EmotionError::Json(_) => "JSON_ERROR",
            EmotionError::Base64(_) => "BASE64_DECODE_ERROR",
            EmotionError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            EmotionError::Ort(_) => "ORT_ERROR",
            EmotionError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 按提取器给出的状态码区分"请求体过大"与其他客户端错误
    pub fn from_rejection(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            EmotionError::PayloadTooLarge(message)
        } else {
            EmotionError::InvalidInput(message)
        }
    }
}

impl IntoResponse for EmotionError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 客户端只看到错误消息，错误码和错误链只写入日志
        if status.is_server_error() {
            let source = std::error::Error::source(&self)
                .map(|s| format!("{:?}", s))
                .unwrap_or_default();
            tracing::error!(
                code = self.error_code(),
                source = %source,
                "Request failed: {} ({})",
                self,
                status
            );
        } else {
            tracing::warn!(code = self.error_code(), "Request rejected: {} ({})", self, status);
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
