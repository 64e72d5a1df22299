use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// 模型输出的类别数
pub const NUM_EMOTIONS: usize = 7;

/// 情绪类别，顺序与模型输出一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    /// 全部标签，与分数向量按位置对应
    pub const ALL: [Emotion; NUM_EMOTIONS] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// JSON响应中使用的小写键
    pub fn key(self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
            Emotion::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单张图像的各标签分数
///
/// 序列化为以 [`Emotion::key`] 为键的JSON对象，键顺序同 [`Emotion::ALL`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionScores([f32; NUM_EMOTIONS]);

impl EmotionScores {
    pub fn new(scores: [f32; NUM_EMOTIONS]) -> Self {
        Self(scores)
    }

    pub fn get(&self, emotion: Emotion) -> f32 {
        self.0[emotion as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        Emotion::ALL.into_iter().zip(self.0.iter().copied())
    }

    pub fn as_array(&self) -> &[f32; NUM_EMOTIONS] {
        &self.0
    }

    /// 分数最高的标签，并列时取靠前者
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::ALL[0];
        for (emotion, score) in self.iter() {
            if score > self.get(best) {
                best = emotion;
            }
        }
        best
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// 数值稳定的softmax
    pub fn softmax(&self) -> Self {
        let max = self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut out = [0.0f32; NUM_EMOTIONS];
        for (o, s) in out.iter_mut().zip(self.0.iter()) {
            *o = (s - max).exp();
        }
        let total: f32 = out.iter().sum();
        for o in out.iter_mut() {
            *o /= total;
        }
        Self(out)
    }
}

impl Serialize for EmotionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_EMOTIONS))?;
        for (emotion, score) in self.iter() {
            map.serialize_entry(emotion.key(), &score)?;
        }
        map.end()
    }
}

/// 预测成功的响应体
#[derive(Debug, Clone, serde::Serialize)]
pub struct PredictResponse {
    pub emotions: EmotionScores,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order() {
        let keys: Vec<_> = Emotion::ALL.iter().map(|e| e.key()).collect();
        assert_eq!(
            keys,
            ["angry", "disgust", "fear", "happy", "sad", "surprise", "neutral"]
        );
        for (i, emotion) in Emotion::ALL.iter().enumerate() {
            assert_eq!(*emotion as usize, i);
        }
    }

    #[test]
    fn test_serialization_keeps_label_order() {
        let response = PredictResponse {
            emotions: EmotionScores::new([0.1, 0.0, 0.05, 0.6, 0.1, 0.05, 0.1]),
        };
        let json = serde_json::to_string(&response).unwrap();
        let positions: Vec<usize> = Emotion::ALL
            .iter()
            .map(|e| json.find(&format!("\"{}\"", e.key())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.starts_with("{\"emotions\":{\"angry\":"));
    }

    #[test]
    fn test_dominant() {
        let scores = EmotionScores::new([0.1, 0.0, 0.05, 0.6, 0.1, 0.05, 0.1]);
        assert_eq!(scores.dominant(), Emotion::Happy);

        let tie = EmotionScores::new([0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(tie.dominant(), Emotion::Angry);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let scores = EmotionScores::new([2.0, -1.0, 0.5, 8.0, 0.0, 100.0, -50.0]);
        let probs = scores.softmax();
        assert!((probs.sum() - 1.0).abs() < 1e-5);
        assert!(probs.iter().all(|(_, p)| p.is_finite() && p >= 0.0));
        assert_eq!(probs.dominant(), Emotion::Surprise);
    }
}
