//! Decoded icon images.
//!
//! [`Bitmap`] is the display-ready handle the cache hands out. It wraps an
//! `image::DynamicImage` behind an `Arc`, so clones are cheap and share pixels.
//! Bitmaps are never mutated once decoded; replacing a cached icon swaps the
//! handle, it does not touch the pixels other holders are looking at.
//!
//! [`Surface`] is the raw pixel surface produced by the PNG loader: 32-bit
//! premultiplied ARGB words in native byte order, the layout painting backends
//! expect for direct blitting.

use std::sync::Arc;

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// A shared, immutable decoded image.
#[derive(Clone)]
pub struct Bitmap {
    inner: Arc<DynamicImage>,
}

impl Bitmap {
    /// Wrap an already decoded image.
    #[inline]
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            inner: Arc::new(image),
        }
    }

    /// Create a bitmap filled with a single RGBA color.
    pub fn from_color(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width, height, color,
        )))
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Dimensions as a (width, height) tuple.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Check if the image has an alpha channel.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.inner.color().has_alpha()
    }

    /// Borrow the decoded image.
    #[inline]
    pub fn as_image(&self) -> &DynamicImage {
        &self.inner
    }

    /// Copy the pixels out as tightly packed RGBA8 bytes.
    pub fn to_rgba8_bytes(&self) -> Vec<u8> {
        self.inner.to_rgba8().into_raw()
    }

    /// Whether two handles share the same decoded pixels.
    #[inline]
    pub fn ptr_eq(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to these pixels, the cache's included.
    #[inline]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("color", &self.inner.color())
            .finish()
    }
}

/// A raw premultiplied ARGB32 pixel surface.
///
/// Each pixel is one `u32` laid out as `0xAARRGGBB` and stored in native byte
/// order. Rows are `stride` bytes apart.
#[derive(Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    stride: usize,
    data: Arc<[u8]>,
}

impl Surface {
    /// Build a surface from straight-alpha RGBA pixels, premultiplying them.
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let stride = width as usize * 4;
        let mut data = Vec::with_capacity(stride * height as usize);

        for pixel in image.pixels() {
            data.extend_from_slice(&premultiply(*pixel).to_ne_bytes());
        }

        Self {
            width,
            height,
            stride,
            data: data.into(),
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read the ARGB32 word at (x, y), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride + x as usize * 4;
        let bytes: [u8; 4] = self.data[offset..offset + 4].try_into().ok()?;
        Some(u32::from_ne_bytes(bytes))
    }

    /// Whether two handles share the same pixel storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish()
    }
}

fn premultiply(Rgba([r, g, b, a]): Rgba<u8>) -> u32 {
    let scale = |c: u8| ((c as u32 * a as u32 + 127) / 255) & 0xff;
    ((a as u32) << 24) | (scale(r) << 16) | (scale(g) << 8) | scale(b)
}
