//! Image upload: raw file bytes → decoded bitmap.

use easel_core::{Bitmap, EaselError, EaselResult};

/// Decode any supported image format into straight-alpha RGBA8.
pub fn decode_bitmap(bytes: &[u8]) -> EaselResult<Bitmap> {
    let decoded = image::load_from_memory(bytes).map_err(|e| EaselError::decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(EaselError::decode("image has no pixels"));
    }
    Ok(Bitmap::new(width, height, rgba.into_raw()))
}
