use crate::utils::error::EmotionError;
use crate::Result;
use base64::Engine;
use image::{DynamicImage, ImageFormat};

pub struct ImageLoader;

impl ImageLoader {
    /// 从字节数据加载图像，格式自动识别
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if let Some(format) = Self::detect_format(bytes) {
            tracing::debug!("Detected image format: {:?}", format);
        }

        let image = image::load_from_memory(bytes).map_err(EmotionError::ImageDecode)?;
        Ok(image)
    }

    /// 解码base64图像数据，支持 `data:image/...;base64,` 前缀
    pub fn decode_base64(base64_data: &str) -> Result<Vec<u8>> {
        let trimmed = base64_data.trim();
        let payload = if trimmed.starts_with("data:") {
            trimmed
                .split_once(',')
                .map(|(_, data)| data)
                .ok_or_else(|| EmotionError::InvalidInput("Malformed data URL".to_string()))?
        } else {
            trimmed
        };

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
        Ok(bytes)
    }

    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = GrayImage::from_pixel(width, height, Luma([200u8]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_from_bytes_png() {
        let bytes = png_bytes(4, 3);
        assert_eq!(ImageLoader::detect_format(&bytes), Some(ImageFormat::Png));
        let image = ImageLoader::from_bytes(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = ImageLoader::from_bytes(b"hello, not an image").unwrap_err();
        assert!(matches!(err, EmotionError::ImageDecode(_)));
    }

    #[test]
    fn test_decode_base64_plain_and_data_url() {
        let bytes = png_bytes(2, 2);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

        assert_eq!(ImageLoader::decode_base64(&encoded).unwrap(), bytes);

        let data_url = format!("data:image/png;base64,{}", encoded);
        assert_eq!(ImageLoader::decode_base64(&data_url).unwrap(), bytes);
    }

    #[test]
    fn test_decode_base64_errors() {
        assert!(matches!(
            ImageLoader::decode_base64("data:image/png;base64").unwrap_err(),
            EmotionError::InvalidInput(_)
        ));
        assert!(matches!(
            ImageLoader::decode_base64("***").unwrap_err(),
            EmotionError::Base64(_)
        ));
    }
}
