//! Square crop - trims the longer axis of a source image symmetrically.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Square region of the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Centred square crop for a `width x height` image.
    ///
    /// The side is `min(width, height)`; the offset along the longer axis is
    /// floored so odd differences drop the extra pixel on the far edge.
    pub fn square_for(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            x: (width - side) / 2,
            y: (height - side) / 2,
            width: side,
            height: side,
        }
    }

    pub fn side(&self) -> u32 {
        self.width
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

pub fn square_crop(image: &DynamicImage) -> CropRect {
    let (w, h) = image.dimensions();
    let crop = CropRect::square_for(w, h);
    tracing::debug!(w, h, x = crop.x, y = crop.y, side = crop.side(), "square crop");
    crop
}
