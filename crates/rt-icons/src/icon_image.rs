//! Toolkit-neutral icon image slot.
//!
//! [`IconImage`] holds the bitmap an image widget currently displays and the
//! name it was asked to show. Bitmaps always come from an [`IconCache`], so
//! many slots showing the same icon share one decoded image.

use crate::bitmap::Bitmap;
use crate::cache::IconCache;
use crate::decoder::BitmapDecoder;
use crate::resolver::IconPathResolver;

/// Layout direction of the widget showing an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextDirection {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left
    Rtl,
}

/// The icon currently shown by an image widget.
#[derive(Debug, Clone, Default)]
pub struct IconImage {
    name: Option<String>,
    bitmap: Option<Bitmap>,
}

impl IconImage {
    /// Create an image showing `name`, or `rtl_name` in right-to-left layouts.
    ///
    /// An empty `rtl_name` counts as no right-to-left variant.
    pub fn new<R, D>(
        cache: &mut IconCache<R, D>,
        name: &str,
        rtl_name: Option<&str>,
        direction: TextDirection,
    ) -> Self
    where
        R: IconPathResolver,
        D: BitmapDecoder,
    {
        let chosen = match rtl_name {
            Some(rtl) if !rtl.is_empty() && direction == TextDirection::Rtl => rtl,
            _ => name,
        };

        let mut image = Self::default();
        image.change_image(cache, chosen);
        image
    }

    /// Show `name`. Leaves the slot empty if the icon cannot be loaded.
    pub fn change_image<R, D>(&mut self, cache: &mut IconCache<R, D>, name: &str)
    where
        R: IconPathResolver,
        D: BitmapDecoder,
    {
        self.bitmap = None;
        self.name = Some(name.to_string());
        self.bitmap = cache.get(name);
    }

    /// Fetch the current name again, picking up a refreshed bitmap.
    pub fn reload<R, D>(&mut self, cache: &mut IconCache<R, D>)
    where
        R: IconPathResolver,
        D: BitmapDecoder,
    {
        if let Some(name) = self.name.take() {
            self.change_image(cache, &name);
        }
    }

    /// Stop showing anything.
    pub fn clear(&mut self) {
        self.name = None;
        self.bitmap = None;
    }

    /// The bitmap being shown.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    /// The icon name last requested.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether no bitmap is shown.
    pub fn is_empty(&self) -> bool {
        self.bitmap.is_none()
    }
}
