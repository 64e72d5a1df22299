use crate::{
    emotion::PredictResponse,
    image::ImageLoader,
    utils::error::EmotionError,
    web::{
        extractors::{Validate, ValidatedJson},
        AppState,
    },
    Result,
};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    response::Json,
};
use serde::Deserialize;

/// 承载图像文件的multipart字段名
pub const IMAGE_FIELD: &str = "image";

/// JSON请求体（base64模式）
#[derive(Debug, Deserialize)]
pub struct PredictBase64Request {
    /// Base64编码的图像数据，可带data URL前缀
    #[serde(default)]
    pub image: Option<String>,
}

impl Validate for PredictBase64Request {
    fn validate(&self) -> Result<()> {
        match self.image.as_deref() {
            Some(data) if !data.trim().is_empty() => Ok(()),
            _ => Err(EmotionError::MissingImage),
        }
    }
}

fn multipart_error(context: &str, e: MultipartError) -> EmotionError {
    EmotionError::from_rejection(e.status(), format!("{}: {}", context, e.body_text()))
}

/// Multipart文件上传处理器
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>> {
    tracing::info!("Prediction request received");

    // 非multipart请求等同于没有上传图像
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Request is not multipart: {}", rejection);
        EmotionError::MissingImage
    })?;

    let mut image_data: Option<Bytes> = None;

    // 解析multipart数据
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart field", e))?
    {
        let field_name = field.name().unwrap_or("unknown").to_string();

        if field_name != IMAGE_FIELD {
            tracing::debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        // 只接受文件字段，同名的普通文本字段不算上传图像
        if field.file_name().is_none() {
            tracing::debug!("Ignoring non-file '{}' field", IMAGE_FIELD);
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file data", e))?;
        image_data = Some(data);
        break;
    }

    let Some(image_data) = image_data else {
        tracing::info!("No image in request files");
        return Err(EmotionError::MissingImage);
    };

    tracing::debug!("Image found in request");
    let response = state.pipeline.clone().process_bytes_blocking(image_data).await?;
    Ok(Json(response))
}

/// JSON base64上传处理器
pub async fn predict_base64_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PredictBase64Request>,
) -> Result<Json<PredictResponse>> {
    tracing::info!("Base64 prediction request received");

    let image = request.image.unwrap_or_default();
    let bytes = ImageLoader::decode_base64(&image)?;

    let response = state.pipeline.clone().process_bytes_blocking(bytes).await?;
    Ok(Json(response))
}
