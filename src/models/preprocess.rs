// Sample preprocessing
// Turns an image file (or a JSON dump of floats) into a flat NHWC sample
// normalized to [0, 1].

use anyhow::{bail, Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

use super::runtime::InputShape;

/// Convert a decoded image to a flat sample of `shape`
pub fn image_to_sample(image: &DynamicImage, shape: InputShape) -> Result<Vec<f32>> {
    let (Ok(width), Ok(height)) = (u32::try_from(shape.width), u32::try_from(shape.height)) else {
        bail!("Input {} is too large to resize an image to", shape);
    };
    let resized = image.resize_exact(width, height, FilterType::Triangle);

    let bytes = match shape.channels {
        3 => resized.to_rgb8().into_raw(),
        1 => resized.to_luma8().into_raw(),
        n => bail!("Unsupported channel count {} (expected 1 or 3)", n),
    };

    // Row-major, channel-last: already the layout of the raw buffer
    let sample: Vec<f32> = bytes.iter().map(|&b| b as f32 / 255.0).collect();
    debug_assert_eq!(sample.len(), shape.len());
    Ok(sample)
}

/// Decode an image file and convert it to a sample
pub fn sample_from_image(path: &Path, shape: InputShape) -> Result<Vec<f32>> {
    let image = image::open(path).with_context(|| format!("Failed to decode image {:?}", path))?;
    image_to_sample(&image, shape)
}

/// Read a JSON array of numbers as a sample, as-is
pub fn sample_from_json(path: &Path) -> Result<Vec<f32>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let sample: Vec<f32> = serde_json::from_str(&contents)
        .with_context(|| format!("{:?} is not a JSON array of numbers", path))?;
    Ok(sample)
}

/// Load a sample, choosing the decoder by file extension
pub fn load_sample(path: &Path, shape: InputShape) -> Result<Vec<f32>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        sample_from_json(path)
    } else {
        sample_from_image(path, shape)
    }
}
