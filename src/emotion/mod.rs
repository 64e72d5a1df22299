pub mod pipeline;
pub mod types;

pub use pipeline::EmotionPipeline;
pub use types::{Emotion, EmotionScores, PredictResponse, NUM_EMOTIONS};
