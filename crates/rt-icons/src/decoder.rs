//! Turning icon files into bitmaps.

use std::path::Path;

use image::{ImageError, ImageFormat};

use crate::bitmap::{Bitmap, Surface};
use crate::error::{IconError, IconResult};

/// Decodes icon files found by an [`IconPathResolver`](crate::IconPathResolver).
pub trait BitmapDecoder {
    /// Decode a display-ready bitmap, detecting the format from the file.
    fn decode(&self, path: &Path) -> IconResult<Bitmap>;

    /// Decode a file that must be a PNG into a raw pixel surface.
    fn decode_png(&self, path: &Path) -> IconResult<Surface>;
}

/// Default decoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl ImageDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self
    }
}

impl BitmapDecoder for ImageDecoder {
    fn decode(&self, path: &Path) -> IconResult<Bitmap> {
        let reader = image::ImageReader::open(path)
            .map_err(|e| IconError::io(path, e))?
            .with_guessed_format()
            .map_err(|e| IconError::io(path, e))?;
        let img = reader.decode().map_err(|e| map_image_error(path, e))?;
        Ok(Bitmap::from_image(img))
    }

    fn decode_png(&self, path: &Path) -> IconResult<Surface> {
        let bytes = std::fs::read(path).map_err(|e| IconError::io(path, e))?;
        let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .map_err(|e| map_image_error(path, e))?;
        Ok(Surface::from_rgba(&img.to_rgba8()))
    }
}

fn map_image_error(path: &Path, err: ImageError) -> IconError {
    match err {
        ImageError::IoError(source) => IconError::io(path, source),
        other => IconError::decode(path, other.to_string()),
    }
}
