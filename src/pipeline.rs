//! The current region set, guarded against stale decodes.
//!
//! Decoding can finish out of order when uploads overlap. Every upload takes a
//! [`Generation`] from [`TexturePipeline::begin`]; a completion is applied
//! only if no newer upload (or clear) has happened since.

use crate::binder::BoxMaterials;
use crate::crop::{square_crop, CropRect};
use crate::partition::{partition, RegionSet};
use crate::{AdventError, Result};
use image::{DynamicImage, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Rebuild a generation handed across an FFI boundary as a plain number.
    pub fn from_raw(raw: u64) -> Self {
        Generation(raw)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Decode failed; the box falls back to flat colour.
    Failed,
    /// A newer upload superseded this one; the result was dropped.
    Stale,
}

/// Decode image bytes and cut them into face regions.
pub fn decode_regions(bytes: &[u8]) -> Result<RegionSet> {
    let image = image::load_from_memory(bytes)?;
    let crop = square_crop(&image);
    partition(&image, &crop)
}

/// Cut raw RGBA pixels, as read back from a canvas, into face regions.
pub fn rgba_regions(data: Vec<u8>, width: u32, height: u32) -> Result<RegionSet> {
    let len = data.len();
    let rgba = RgbaImage::from_raw(width, height, data).ok_or(AdventError::PixelBuffer {
        width,
        height,
        len,
    })?;
    partition(&DynamicImage::ImageRgba8(rgba), &CropRect::square_for(width, height))
}

#[derive(Debug, Default)]
pub struct TexturePipeline {
    generation: u64,
    current: Option<RegionSet>,
}

impl TexturePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new upload, invalidating any in flight.
    pub fn begin(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    /// No main image: drop the current set and anything in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    pub fn complete(&mut self, generation: Generation, result: Result<RegionSet>) -> Completion {
        if !self.is_current(generation) {
            tracing::debug!(
                generation = generation.0,
                latest = self.generation,
                "dropping stale regions"
            );
            return Completion::Stale;
        }
        match result {
            Ok(regions) => {
                self.current = Some(regions);
                Completion::Applied
            }
            Err(e) => {
                tracing::warn!("failed to process image: {e}");
                self.current = None;
                Completion::Failed
            }
        }
    }

    /// Synchronous begin + decode + complete.
    pub fn process(&mut self, bytes: &[u8]) -> Completion {
        let generation = self.begin();
        self.complete(generation, decode_regions(bytes))
    }

    pub fn current(&self) -> Option<&RegionSet> {
        self.current.as_ref()
    }

    pub fn materials(&self) -> BoxMaterials {
        BoxMaterials::bind(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png(w: u32, h: u32, shade: u8) -> Vec<u8> {
        let pixels = ImageBuffer::from_pixel(w, h, Rgba([shade, shade, shade, 255]));
        let img = DynamicImage::ImageRgba8(pixels);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn process_applies_regions() {
        let mut pipeline = TexturePipeline::new();
        assert_eq!(pipeline.process(&png(140, 70, 9)), Completion::Applied);
        assert_eq!(pipeline.current().unwrap().front.dimensions(), (50, 50));
        assert!(pipeline.materials().is_textured());
    }

    #[test]
    fn corrupt_bytes_fall_back_to_flat() {
        let mut pipeline = TexturePipeline::new();
        pipeline.process(&png(70, 70, 1));
        assert_eq!(pipeline.process(b"not an image"), Completion::Failed);
        assert!(pipeline.current().is_none());
        assert_eq!(pipeline.materials(), BoxMaterials::flat());
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut pipeline = TexturePipeline::new();
        let old = pipeline.begin();
        let new = pipeline.begin();
        assert_eq!(pipeline.complete(new, decode_regions(&png(70, 70, 200))), Completion::Applied);
        assert_eq!(pipeline.complete(old, decode_regions(&png(70, 70, 10))), Completion::Stale);
        assert_eq!(pipeline.current().unwrap().front.get_pixel(0, 0).0[0], 200);
    }

    #[test]
    fn clear_invalidates_in_flight() {
        let mut pipeline = TexturePipeline::new();
        let pending = pipeline.begin();
        pipeline.clear();
        assert_eq!(pipeline.complete(pending, decode_regions(&png(70, 70, 0))), Completion::Stale);
        assert!(pipeline.current().is_none());
    }

    #[test]
    fn too_small_image_fails() {
        let mut pipeline = TexturePipeline::new();
        assert_eq!(pipeline.process(&png(5, 5, 0)), Completion::Failed);
    }

    #[test]
    fn raw_generation_from_older_upload_is_stale() {
        // Host starts upload A, then B, and A's pixels come back first.
        let mut pipeline = TexturePipeline::new();
        let a = pipeline.begin().value();
        let b = pipeline.begin().value();
        let late = rgba_regions(vec![30; 70 * 70 * 4], 70, 70);
        assert_eq!(pipeline.complete(Generation::from_raw(a), late), Completion::Stale);
        assert!(pipeline.current().is_none());

        let fresh = rgba_regions(vec![90; 70 * 70 * 4], 70, 70);
        assert_eq!(pipeline.complete(Generation::from_raw(b), fresh), Completion::Applied);
        assert_eq!(pipeline.current().unwrap().front.get_pixel(0, 0).0[0], 90);
    }

    #[test]
    fn short_pixel_buffer_is_rejected() {
        let err = rgba_regions(vec![0; 10], 70, 70).unwrap_err();
        assert!(matches!(err, AdventError::PixelBuffer { width: 70, height: 70, len: 10 }));
        assert_eq!(err.to_string(), "Pixel buffer of 10 bytes does not fit 70x70 RGBA");
    }
}
