use crate::utils::error::EmotionError;
use crate::Result;
use image::imageops::FilterType;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// 服务器绑定地址
    pub bind_addr: SocketAddr,

    /// ONNX模型文件路径
    pub model_path: PathBuf,

    /// 是否对模型原始输出做softmax
    pub softmax: bool,

    /// 缩放到48x48时使用的重采样滤波器
    pub resize_filter: FilterType,

    pub onnx_config: OnnxConfig,

    pub server_config: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// 算子内CPU线程数
    pub intra_threads: usize,

    /// 图优化级别 (0-3)
    pub optimization_level: u8,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_request_size: 50 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn new(
        bind_addr: &str,
        model_path: impl Into<PathBuf>,
        intra_threads: Option<usize>,
        max_request_size: Option<usize>,
        softmax: bool,
        resize_filter: &str,
    ) -> Result<Self> {
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|e| {
            EmotionError::Config(format!("Invalid bind address {}: {}", bind_addr, e))
        })?;

        let model_path = model_path.into();
        if model_path.as_os_str().is_empty() {
            return Err(EmotionError::Config("Model path must not be empty".to_string()));
        }

        let cpu_cores = num_cpus::get();
        let onnx_config = OnnxConfig {
            // 默认使用75%的CPU核心，至少1个
            intra_threads: intra_threads.unwrap_or((cpu_cores * 3 / 4).max(1)),
            optimization_level: 3,
        };

        let mut server_config = ServerConfig::default();
        if let Some(limit) = max_request_size {
            if limit == 0 {
                return Err(EmotionError::Config(
                    "Maximum request size must be greater than zero".to_string(),
                ));
            }
            server_config.max_request_size = limit;
        }

        Ok(Self {
            bind_addr,
            model_path,
            softmax,
            resize_filter: parse_filter(resize_filter)?,
            onnx_config,
            server_config,
        })
    }
}

/// 命令行滤波器名称到image滤波器的映射
pub fn parse_filter(name: &str) -> Result<FilterType> {
    match name.to_ascii_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" | "bilinear" => Ok(FilterType::Triangle),
        "catmullrom" | "bicubic" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" | "lanczos" => Ok(FilterType::Lanczos3),
        other => Err(EmotionError::Config(format!(
            "Unknown resize filter '{}'. Supported: nearest, triangle, catmullrom, gaussian, lanczos3",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("127.0.0.1:5000", "models/emotion.onnx", None, None, false, "triangle")
            .unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert!(config.bind_addr.ip().is_loopback());
        assert!(config.onnx_config.intra_threads >= 1);
        assert_eq!(config.server_config.max_request_size, 50 * 1024 * 1024);
        assert_eq!(config.resize_filter, FilterType::Triangle);
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = Config::new("localhost", "m.onnx", None, None, false, "triangle").unwrap_err();
        assert!(matches!(err, EmotionError::Config(_)));
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        assert!(Config::new("127.0.0.1:5000", "m.onnx", Some(2), Some(0), false, "nearest").is_err());
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(parse_filter("Lanczos3").unwrap(), FilterType::Lanczos3);
        assert_eq!(parse_filter("bicubic").unwrap(), FilterType::CatmullRom);
        assert!(parse_filter("sinc").is_err());
    }
}
