//! BLAKE3 fingerprints for image content.
//!
//! [`hash_file_content`] keys the reference-embedding index by file bytes, so an
//! edited reference file never reuses a stale embedding. [`hash_pixels`] seeds the
//! stub embedder from decoded pixels, so two encodings of the same bitmap agree.

use blake3::Hasher;

/// Full 32-byte BLAKE3 digest of raw file bytes.
#[inline]
pub fn hash_file_content(bytes: &[u8]) -> [u8; 32] {
    *blake3::hash(bytes).as_bytes()
}

/// Hashes a decoded RGB bitmap including its geometry.
#[inline]
pub fn hash_pixels(width: u32, height: u32, rgb: &[u8]) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&width.to_le_bytes());
    hasher.update(b"x");
    hasher.update(&height.to_le_bytes());
    hasher.update(rgb);

    let hash = hasher.finalize();
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}
