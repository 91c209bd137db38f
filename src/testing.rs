//! Fixtures shared by unit and integration tests.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageFormat, Rgb, RgbImage};

use crate::embedding::{Embedding, EmbeddingError, EmbeddingExtractor, ImageEmbedder};
use crate::imaging::Image;

/// Side length of generated fixture images.
pub const FIXTURE_SIZE: u32 = 16;

/// A decoded single-colour image.
pub fn solid_image(rgb: [u8; 3]) -> Image {
    Image::from_rgb(RgbImage::from_pixel(FIXTURE_SIZE, FIXTURE_SIZE, Rgb(rgb)))
}

/// PNG-encoded single-colour image.
pub fn png_bytes(rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(FIXTURE_SIZE, FIXTURE_SIZE, Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    out.into_inner()
}

/// Writes a single-colour PNG into `dir` and returns its path.
pub fn write_png(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(rgb)).expect("write fixture png");
    path
}

/// Stub extractor wrapper that counts `embed` calls.
pub struct CountingEmbedder {
    inner: EmbeddingExtractor,
    calls: AtomicUsize,
}

impl Default for CountingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: EmbeddingExtractor::stub().expect("stub extractor always loads"),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageEmbedder for CountingEmbedder {
    fn embed(&self, image: &Image) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(image)
    }

    fn embedding_dim(&self) -> usize {
        self.inner.embedding_dim()
    }
}
