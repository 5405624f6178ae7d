//! Image preprocessing
//!
//! Decodes an uploaded sample and produces the normalized NCHW tensor the
//! classifier expects: `[1, 3, 224, 224]`, ImageNet mean/std per channel.

use image::imageops::FilterType;
use ndarray::Array4;
use thiserror::Error;

/// Square input edge expected by the classifier
pub const INPUT_SIZE: u32 = 224;

/// Per-channel (R, G, B) normalization mean
pub const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel (R, G, B) normalization standard deviation
pub const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Preprocessing errors
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// Bytes are not a decodable image
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode `image_bytes` and build a single-sample batch tensor
pub fn preprocess(image_bytes: &[u8]) -> Result<Array4<f32>, PreprocessError> {
    let decoded = image::load_from_memory(image_bytes)?;
    let resized = decoded
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        .to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (value - CHANNEL_MEAN[c]) / CHANNEL_STD[c];
        }
    }

    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_output_shape() {
        let bytes = encode_png(&RgbImage::from_pixel(37, 19, Rgb([10, 200, 30])));
        let tensor = preprocess(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_normalization_of_uniform_image() {
        let bytes = encode_png(&RgbImage::from_pixel(8, 8, Rgb([255, 0, 128])));
        let tensor = preprocess(&bytes).unwrap();

        let expected_r = (1.0 - CHANNEL_MEAN[0]) / CHANNEL_STD[0];
        let expected_g = (0.0 - CHANNEL_MEAN[1]) / CHANNEL_STD[1];
        let expected_b = (128.0 / 255.0 - CHANNEL_MEAN[2]) / CHANNEL_STD[2];

        for (y, x) in [(0, 0), (100, 50), (223, 223)] {
            assert!((tensor[[0, 0, y, x]] - expected_r).abs() < 1e-5);
            assert!((tensor[[0, 1, y, x]] - expected_g).abs() < 1e-5);
            assert!((tensor[[0, 2, y, x]] - expected_b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_deterministic() {
        let mut image = RgbImage::new(64, 48);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8]);
        }
        let bytes = encode_png(&image);

        assert_eq!(preprocess(&bytes).unwrap(), preprocess(&bytes).unwrap());
    }

    #[test]
    fn test_invalid_bytes_are_decode_error() {
        let result = preprocess(b"definitely not an image");
        assert!(matches!(result, Err(PreprocessError::Decode(_))));

        assert!(preprocess(&[]).is_err());
    }
}
