use crate::models::{EmotionModel, OnnxEmotionModel};
use crate::utils::error::EmotionError;
use crate::{Config, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 全局模型管理器：启动时加载一次，之后只读
pub struct ModelManager;

static EMOTION_MODEL: OnceCell<Arc<dyn EmotionModel>> = OnceCell::new();

impl ModelManager {
    /// 按配置加载ONNX模型并注册为全局实例
    pub fn init(config: &Config) -> Result<()> {
        tracing::info!("Initializing model manager...");
        let model = OnnxEmotionModel::new(config)?;
        Self::install(Arc::new(model))
    }

    /// 注册已构造的模型，重复注册返回错误
    pub fn install(model: Arc<dyn EmotionModel>) -> Result<()> {
        let description = model.describe();

        EMOTION_MODEL
            .set(model)
            .map_err(|_| EmotionError::Internal("Model manager already initialized".to_string()))?;

        tracing::info!("Model manager initialized: {}", description);
        Ok(())
    }

    /// 获取全局模型实例
    pub fn instance() -> Result<Arc<dyn EmotionModel>> {
        EMOTION_MODEL
            .get()
            .cloned()
            .ok_or_else(|| EmotionError::Internal("Model manager not initialized".to_string()))
    }
}
