use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// 模型输入边长
pub const INPUT_SIZE: u32 = 48;

/// 输入张量形状 (batch, height, width, channels)
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 1];

pub struct ImagePreprocessor {
    filter: FilterType,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

impl ImagePreprocessor {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// 灰度化、缩放到48x48（不保持宽高比）、归一化到[0, 1]，打包成NHWC张量
    pub fn preprocess(&self, image: &DynamicImage) -> Array4<f32> {
        let gray = image.to_luma8();
        let resized = image::imageops::resize(&gray, INPUT_SIZE, INPUT_SIZE, self.filter);

        let side = INPUT_SIZE as usize;
        Array4::from_shape_fn((1, side, side, 1), |(_, y, x, _)| {
            resized.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_output_shape() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 60, Rgb([10, 20, 30])));
        let tensor = ImagePreprocessor::default().preprocess(&image);
        assert_eq!(tensor.shape(), &INPUT_SHAPE);
    }

    #[test]
    fn test_single_pixel_image() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([255])));
        let tensor = ImagePreprocessor::default().preprocess(&image);
        assert_eq!(tensor.shape(), &INPUT_SHAPE);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_large_image() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(4000, 3000, Luma([0])));
        let tensor = ImagePreprocessor::new(FilterType::Nearest).preprocess(&image);
        assert_eq!(tensor.shape(), &INPUT_SHAPE);
        assert!(tensor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_values_in_unit_range() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_fn(97, 53, |x, y| {
            Luma([((x * 7 + y * 13) % 256) as u8])
        }));
        let tensor = ImagePreprocessor::new(FilterType::Lanczos3).preprocess(&image);
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_linear_scaling() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(48, 48, Luma([51])));
        let tensor = ImagePreprocessor::default().preprocess(&image);
        assert!((tensor[[0, 10, 20, 0]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_row_major_layout() {
        // 上半黑下半白：第二维是行
        let image = DynamicImage::ImageLuma8(GrayImage::from_fn(48, 48, |_, y| {
            Luma([if y < 24 { 0 } else { 255 }])
        }));
        let tensor = ImagePreprocessor::new(FilterType::Nearest).preprocess(&image);
        assert_eq!(tensor[[0, 0, 47, 0]], 0.0);
        assert_eq!(tensor[[0, 47, 0, 0]], 1.0);
    }

    #[test]
    fn test_deterministic() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(31, 17, |x, y| {
            Rgb([(x * 8) as u8, (y * 15) as u8, 77])
        }));
        let pre = ImagePreprocessor::default();
        assert_eq!(pre.preprocess(&image), pre.preprocess(&image));
    }
}
