use crate::emotion::{EmotionScores, NUM_EMOTIONS};
use crate::image::INPUT_SHAPE;
use crate::utils::error::EmotionError;
use crate::{Config, Result};
use ndarray::{Array2, Array4, ArrayViewD, Ix2};
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// 情绪分类模型：输入 (batch, 48, 48, 1)，输出 (batch, 7)
pub trait EmotionModel: Send + Sync {
    fn predict(&self, input: Array4<f32>) -> Result<Array2<f32>>;

    /// 模型来源描述
    fn describe(&self) -> String;
}

/// 读取 (1, 7) 分数数组的唯一一行
pub fn scores_from_output(output: &Array2<f32>) -> Result<EmotionScores> {
    let shape = output.shape();
    if shape != [1, NUM_EMOTIONS] {
        return Err(EmotionError::Inference(format!(
            "Expected output shape [1, {}], got {:?}",
            NUM_EMOTIONS, shape
        )));
    }

    let mut scores = [0.0f32; NUM_EMOTIONS];
    for (dst, src) in scores.iter_mut().zip(output.row(0).iter()) {
        if !src.is_finite() {
            return Err(EmotionError::Inference(format!(
                "Model produced a non-finite score: {}",
                src
            )));
        }
        *dst = *src;
    }

    Ok(EmotionScores::new(scores))
}

fn build_session(
    model_path: &Path,
    intra_threads: usize,
    level: GraphOptimizationLevel,
) -> std::result::Result<Session, ort::Error> {
    Session::builder()?
        .with_optimization_level(level)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(model_path)
}

pub struct OnnxEmotionModel {
    // Session::run 需要 &mut
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
}

impl OnnxEmotionModel {
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_file(
            &config.model_path,
            config.onnx_config.intra_threads,
            config.onnx_config.optimization_level,
        )
    }

    pub fn from_file(model_path: &Path, intra_threads: usize, optimization_level: u8) -> Result<Self> {
        if !model_path.exists() {
            return Err(EmotionError::ModelLoad(format!(
                "Emotion model not found: {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading emotion model from: {}", model_path.display());

        let level = match optimization_level {
            0 => GraphOptimizationLevel::Disable,
            1 => GraphOptimizationLevel::Level1,
            2 => GraphOptimizationLevel::Level2,
            _ => GraphOptimizationLevel::Level3,
        };

        let session = build_session(model_path, intra_threads, level)?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => {
                return Err(EmotionError::ModelLoad(
                    "Emotion model has no inputs".to_string(),
                ))
            }
        };

        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => {
                return Err(EmotionError::ModelLoad(
                    "Emotion model has no outputs".to_string(),
                ))
            }
        };

        tracing::info!("Emotion model input: '{}', output: '{}'", input_name, output_name);
        for (i, output) in session.outputs.iter().enumerate() {
            tracing::debug!("Emotion model output[{}]: '{}'", i, output.name);
        }

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: model_path.to_path_buf(),
        })
    }

    fn to_array2(view: ArrayViewD<'_, f32>) -> Result<Array2<f32>> {
        view.to_owned().into_dimensionality::<Ix2>().map_err(|e| {
            EmotionError::Inference(format!("Expected a 2D score tensor: {}", e))
        })
    }
}

impl EmotionModel for OnnxEmotionModel {
    fn predict(&self, input: Array4<f32>) -> Result<Array2<f32>> {
        if input.shape()[1..] != INPUT_SHAPE[1..] {
            return Err(EmotionError::Inference(format!(
                "Expected input shape [N, 48, 48, 1], got {:?}",
                input.shape()
            )));
        }

        let input_tensor = Tensor::from_array(input)?;

        let mut session = self.session.lock();
        let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

        let scores = match outputs.get(self.output_name.as_str()) {
            Some(output) => Self::to_array2(output.try_extract_array::<f32>()?)?,
            None => {
                let available: Vec<String> = outputs.keys().map(|s| s.to_string()).collect();
                return Err(EmotionError::Inference(format!(
                    "Emotion output '{}' not found. Available outputs: {:?}",
                    self.output_name, available
                )));
            }
        };

        Ok(scores)
    }

    fn describe(&self) -> String {
        self.model_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scores_from_output() {
        let output = array![[0.1f32, 0.0, 0.05, 0.6, 0.1, 0.05, 0.1]];
        let scores = scores_from_output(&output).unwrap();
        assert_eq!(scores.as_array()[3], 0.6);
    }

    #[test]
    fn test_scores_from_output_wrong_shape() {
        let output = Array2::<f32>::zeros((1, 5));
        assert!(matches!(
            scores_from_output(&output).unwrap_err(),
            EmotionError::Inference(_)
        ));

        let batch = Array2::<f32>::zeros((2, NUM_EMOTIONS));
        assert!(scores_from_output(&batch).is_err());
    }

    #[test]
    fn test_scores_from_output_non_finite() {
        let output = array![[0.1f32, f32::NAN, 0.05, 0.6, 0.1, 0.05, 0.1]];
        let err = scores_from_output(&output).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_missing_model_file() {
        let err = OnnxEmotionModel::from_file(Path::new("does/not/exist.onnx"), 1, 3)
            .err()
            .unwrap();
        assert!(matches!(err, EmotionError::ModelLoad(_)));
    }
}
