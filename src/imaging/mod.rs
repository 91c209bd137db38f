//! Decoded RGB images and model-input preprocessing.
//!
//! Every model in the crate consumes an [`Image`]: a decoded bitmap normalized to
//! 8-bit RGB. Decoding happens exactly once per input. The ViT path squashes the
//! whole image to a square ([`Image::to_tensor`]); the CLIP path resizes the
//! shortest edge and center-crops ([`Image::to_clip_tensor`]).

mod error;


pub use error::ImageError;

use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};
use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::hashing::hash_pixels;

/// Where an image to be checked comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on disk (e.g. a stored upload).
    Path(PathBuf),
    /// Raw encoded bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Reads and decodes the source.
    pub fn load(&self) -> Result<Image, ImageError> {
        match self {
            ImageSource::Path(path) => Image::open(path),
            ImageSource::Bytes(bytes) => Image::from_bytes(bytes),
        }
    }
}

/// Decoded, immutable 3-channel bitmap.
#[derive(Clone)]
pub struct Image {
    rgb: RgbImage,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.rgb.width())
            .field("height", &self.rgb.height())
            .finish()
    }
}

impl Image {
    /// Reads a file and decodes it, guessing the format from content.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes).map_err(|e| e.with_path(path))
    }

    /// Decodes encoded bytes, guessing the format from content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode {
            path: None,
            reason: e.to_string(),
        })?;

        Ok(Self {
            rgb: decoded.to_rgb8(),
        })
    }

    /// Wraps an already-decoded RGB buffer.
    pub fn from_rgb(rgb: RgbImage) -> Self {
        Self { rgb }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// Content hash of the decoded pixels (format-independent).
    pub fn fingerprint(&self) -> u64 {
        hash_pixels(self.rgb.width(), self.rgb.height(), self.rgb.as_raw())
    }

    /// Resizes to `size x size` and returns normalized planar (CHW) floats.
    ///
    /// Each channel value becomes `(v / 255 - mean[c]) / std[c]`.
    pub fn to_chw(&self, size: u32, mean: [f32; 3], std: [f32; 3]) -> Vec<f32> {
        let resized = imageops::resize(&self.rgb, size, size, FilterType::Triangle);
        normalize_chw(&resized, mean, std)
    }

    /// Resizes the shortest edge to `size` with a bicubic filter, keeps the
    /// centered `size x size` square, and returns normalized planar floats.
    pub fn to_clip_chw(&self, size: u32, mean: [f32; 3], std: [f32; 3]) -> Vec<f32> {
        let (width, height) = (self.rgb.width().max(1), self.rgb.height().max(1));
        let (resized_w, resized_h) = if width <= height {
            (size, scale_long_edge(height, width, size))
        } else {
            (scale_long_edge(width, height, size), size)
        };

        let resized = imageops::resize(&self.rgb, resized_w, resized_h, FilterType::CatmullRom);
        let left = (resized_w - size) / 2;
        let top = (resized_h - size) / 2;
        let cropped = imageops::crop_imm(&resized, left, top, size, size).to_image();
        normalize_chw(&cropped, mean, std)
    }

    /// Builds a `[1, 3, size, size]` tensor from the squashed image (ViT input).
    pub fn to_tensor(
        &self,
        size: u32,
        mean: [f32; 3],
        std: [f32; 3],
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        batch_of_one(self.to_chw(size, mean, std), size, device)
    }

    /// Builds a `[1, 3, size, size]` tensor from the center crop (CLIP input).
    pub fn to_clip_tensor(
        &self,
        size: u32,
        mean: [f32; 3],
        std: [f32; 3],
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        batch_of_one(self.to_clip_chw(size, mean, std), size, device)
    }
}

/// Long edge after scaling the short edge to `size`, never below `size`.
fn scale_long_edge(long: u32, short: u32, size: u32) -> u32 {
    let scaled = u64::from(long) * u64::from(size) / u64::from(short);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(size)
}

fn normalize_chw(rgb: &RgbImage, mean: [f32; 3], std: [f32; 3]) -> Vec<f32> {
    let plane = (rgb.width() as usize) * (rgb.height() as usize);
    let mut data = vec![0.0f32; 3 * plane];

    for (idx, pixel) in rgb.pixels().enumerate() {
        for c in 0..3 {
            data[c * plane + idx] = (pixel[c] as f32 / 255.0 - mean[c]) / std[c];
        }
    }

    data
}

fn batch_of_one(data: Vec<f32>, size: u32, device: &Device) -> candle_core::Result<Tensor> {
    let side = size as usize;
    Tensor::from_vec(data, (3, side, side), device)?.unsqueeze(0)
}
