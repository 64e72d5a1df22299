use crate::{
    emotion::{EmotionScores, PredictResponse},
    image::{ImageLoader, ImagePreprocessor},
    models::{scores_from_output, EmotionModel},
    utils::error::EmotionError,
    Config, Result,
};
use image::DynamicImage;
use ndarray::Array4;
use std::sync::Arc;
use std::time::Instant;

/// 情绪识别流水线：图像字节进，各标签分数出
pub struct EmotionPipeline {
    model: Arc<dyn EmotionModel>,
    preprocessor: ImagePreprocessor,
    softmax: bool,
}

impl EmotionPipeline {
    pub fn new(model: Arc<dyn EmotionModel>, preprocessor: ImagePreprocessor, softmax: bool) -> Self {
        Self {
            model,
            preprocessor,
            softmax,
        }
    }

    pub fn from_config(model: Arc<dyn EmotionModel>, config: &Config) -> Self {
        Self::new(model, ImagePreprocessor::new(config.resize_filter), config.softmax)
    }

    pub fn model(&self) -> &Arc<dyn EmotionModel> {
        &self.model
    }

    pub fn softmax_enabled(&self) -> bool {
        self.softmax
    }

    pub fn preprocess_bytes(&self, bytes: &[u8]) -> Result<Array4<f32>> {
        let image = ImageLoader::from_bytes(bytes)?;
        Ok(self.preprocess_image(&image))
    }

    pub fn preprocess_image(&self, image: &DynamicImage) -> Array4<f32> {
        let tensor = self.preprocessor.preprocess(image);
        tracing::info!(
            "Image preprocessed: {}x{} -> shape {:?}",
            image.width(),
            image.height(),
            tensor.shape()
        );
        tensor
    }

    /// 解码、预处理、推理
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<EmotionScores> {
        let start_time = Instant::now();
        tracing::info!("Image size: {} bytes", bytes.len());

        let tensor = self.preprocess_bytes(bytes)?;
        let scores = self.score(tensor)?;

        tracing::info!(
            "Prediction completed: dominant={}, time={:.3}s",
            scores.dominant(),
            start_time.elapsed().as_secs_f32()
        );

        Ok(scores)
    }

    fn score(&self, tensor: Array4<f32>) -> Result<EmotionScores> {
        let output = self.model.predict(tensor)?;
        tracing::info!("Raw prediction shape: {:?}", output.shape());

        let raw = scores_from_output(&output)?;
        tracing::info!("Raw prediction values: {:?}", raw.as_array());

        let scores = if self.softmax { raw.softmax() } else { raw };
        tracing::debug!("Score sum: {:.4}", scores.sum());

        Ok(scores)
    }

    /// 在阻塞线程池中执行 [`process_bytes`](Self::process_bytes)
    pub async fn process_bytes_blocking(
        self: Arc<Self>,
        bytes: impl AsRef<[u8]> + Send + 'static,
    ) -> Result<PredictResponse> {
        let span = tracing::Span::current();
        let scores = tokio::task::spawn_blocking(move || {
            span.in_scope(|| self.process_bytes(bytes.as_ref()))
        })
        .await
        .map_err(|e| EmotionError::Internal(format!("Inference task failed: {}", e)))??;

        let response = PredictResponse { emotions: scores };
        if let Ok(formatted) = serde_json::to_string(&response.emotions) {
            tracing::info!("Formatted emotions: {}", formatted);
        }

        Ok(response)
    }
}
