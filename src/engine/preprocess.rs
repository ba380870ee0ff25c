//! Image preprocessing
//!
//! Turns encoded image bytes into the `[1, H, W, 3]` float tensor the
//! classifier consumes. Order: decode, drop alpha, resize (bilinear,
//! stretch-to-fit), scale to `[0, 1]`, add batch axis.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tract_onnx::prelude::tract_ndarray::Array4;

use crate::error::PipelineError;

/// Default square input edge
pub const INPUT_SIZE: u32 = 224;

/// Model input tensor in NHWC layout
pub type ImageTensor = Array4<f32>;

/// Preprocess an encoded image to a `[1, 224, 224, 3]` tensor
pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor, PipelineError> {
    preprocess_with_size(bytes, INPUT_SIZE)
}

/// Preprocess an encoded image to a `[1, size, size, 3]` tensor
pub fn preprocess_with_size(bytes: &[u8], size: u32) -> Result<ImageTensor, PipelineError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| PipelineError::Decode(e.to_string()))?;

    let rgb = drop_alpha(decoded)?;
    let resized = image::imageops::resize(&rgb, size, size, FilterType::Triangle);

    let edge = size as usize;
    Ok(Array4::from_shape_fn((1, edge, edge, 3), |(_, y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    }))
}

/// Keep the first three channels; anything but 3 or 4 channels is rejected
fn drop_alpha(image: DynamicImage) -> Result<RgbImage, PipelineError> {
    let channels = image.color().channel_count();
    match (channels, image) {
        (3, DynamicImage::ImageRgb8(rgb)) => Ok(rgb),
        (4, DynamicImage::ImageRgba8(rgba)) => {
            let (width, height) = rgba.dimensions();
            Ok(RgbImage::from_fn(width, height, |x, y| {
                let [r, g, b, _] = rgba.get_pixel(x, y).0;
                image::Rgb([r, g, b])
            }))
        }
        // Wider sample types still truncate alpha; to_rgb8 only rescales depth.
        (3 | 4, other) => Ok(other.to_rgb8()),
        (n, _) => Err(PipelineError::UnsupportedChannelLayout(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageOutputFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    fn assert_shape_and_range(tensor: &ImageTensor) {
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_rgb_shape_and_range() {
        let img = RgbImage::from_fn(100, 100, |x, y| Rgb([x as u8, y as u8, 255]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgb8(img))).unwrap();
        assert_shape_and_range(&tensor);
    }

    #[test]
    fn test_rgba_non_square() {
        let img = RgbaImage::from_fn(50, 17, |x, _| Rgba([200, x as u8, 3, 0]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgba8(img))).unwrap();
        assert_shape_and_range(&tensor);
    }

    #[test]
    fn test_alpha_is_truncated_not_composited() {
        // Fully transparent red stays red.
        let img = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 0]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgba8(img))).unwrap();
        assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 100, 100, 1]].abs() < 1e-6);
        assert!(tensor[[0, 100, 100, 2]].abs() < 1e-6);
    }

    #[test]
    fn test_uniform_color_is_scaled() {
        let img = RgbImage::from_pixel(300, 120, Rgb([255, 51, 0]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgb8(img))).unwrap();
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 223, 223, 1]] - 0.2).abs() < 1e-6);
        assert!(tensor[[0, 50, 50, 2]].abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_rejected() {
        let img = GrayImage::from_pixel(10, 10, Luma([128]));
        let err = preprocess(&encode(DynamicImage::ImageLuma8(img))).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedChannelLayout(1)));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = preprocess(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn test_deterministic() {
        let img = RgbImage::from_fn(33, 71, |x, y| Rgb([(x * 7) as u8, (y * 3) as u8, 9]));
        let bytes = encode(DynamicImage::ImageRgb8(img));
        assert_eq!(preprocess(&bytes).unwrap(), preprocess(&bytes).unwrap());
    }

    #[test]
    fn test_custom_size() {
        let img = RgbImage::from_pixel(20, 20, Rgb([1, 2, 3]));
        let tensor =
            preprocess_with_size(&encode(DynamicImage::ImageRgb8(img)), 32).unwrap();
        assert_eq!(tensor.shape(), &[1, 32, 32, 3]);
    }
}
