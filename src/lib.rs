pub mod config;
pub mod emotion;
pub mod image;
pub mod models;
pub mod utils;
pub mod web;

pub use config::Config;
pub use emotion::{Emotion, EmotionScores, PredictResponse};
pub use utils::error::EmotionError;

pub type Result<T> = std::result::Result<T, EmotionError>;
