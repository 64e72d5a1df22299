pub mod classifier;
pub mod manager;

pub use classifier::{scores_from_output, EmotionModel, OnnxEmotionModel};
pub use manager::ModelManager;
