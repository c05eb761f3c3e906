//! Decoding of uploaded images into classifier input tensors.

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::error::{Error, Result};

/// Classifier input in NHWC layout `(1, IMAGE_SIZE, IMAGE_SIZE, RGB_CHANNELS)`,
/// values scaled to `[0, 1]`.
pub type ImageTensor = Array4<f32>;

pub const IMAGE_SIZE: u32 = 150;
pub const RGB_CHANNELS: usize = 3;
pub const TENSOR_SHAPE: [usize; 4] = [
    1,
    IMAGE_SIZE as usize,
    IMAGE_SIZE as usize,
    RGB_CHANNELS,
];

/// Decode `image_data` and turn it into a classifier tensor.
///
/// The image is stretched to `IMAGE_SIZE`x`IMAGE_SIZE` without keeping its
/// aspect ratio, coerced to 8-bit RGB, given a batch axis and scaled by 1/255.
pub fn normalize(image_data: &[u8]) -> Result<ImageTensor> {
    let img = image::load_from_memory(image_data)?;
    let resized = img.resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::CatmullRom);

    // grayscale, alpha, palette-expanded and 16-bit images all end up here
    let rgb = match resized {
        DynamicImage::ImageRgb8(buf) => buf,
        other => other.to_rgb8(),
    };

    let values: Vec<f32> = rgb
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 255.0)
        .collect();

    to_tensor(values)
}

/// Build an `ImageTensor` from flat NHWC values, rejecting anything that does
/// not fill `TENSOR_SHAPE` exactly.
pub fn to_tensor(values: Vec<f32>) -> Result<ImageTensor> {
    let len = values.len();
    Array4::from_shape_vec(TENSOR_SHAPE, values).map_err(|_| Error::ShapeMismatch {
        expected: format!(
            "{TENSOR_SHAPE:?} ({} values)",
            TENSOR_SHAPE.iter().product::<usize>()
        ),
        actual: format!("{len} values"),
    })
}
