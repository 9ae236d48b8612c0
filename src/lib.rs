//! Slice a photo across the faces and doors of a 3D advent calendar box.
//!
//! The source image is cropped to a square, split on a 1:5:1 grid into five
//! face regions, and the front region is further mapped onto 25 door cells.

pub mod binder;
pub mod config;
pub mod crop;
pub mod door;
pub mod interaction;
pub mod partition;
pub mod pipeline;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use binder::{BoxMaterials, Color, DoorMaterial, FaceMaterial};
pub use config::SceneConfig;
pub use crop::{square_crop, CropRect};
pub use door::{DoorCell, DoorPlacement};
pub use interaction::{InteractionState, LockPolicy};
pub use partition::{partition, Face, RegionLayout, RegionSet};
pub use pipeline::{rgba_regions, Completion, Generation, TexturePipeline};
pub use store::{CalendarConfig, CalendarStore, Command, DoorShape, StoreEvent};

use thiserror::Error;

/// Number of doors on the calendar front.
pub const DOOR_COUNT: u32 = 25;
/// Doors per row and per column.
pub const GRID_SIZE: u32 = 5;

#[derive(Error, Debug)]
pub enum AdventError {
    #[error("Image error: {0}")]
    ImageLoad(#[from] image::ImageError),
    #[error("Pixel buffer of {len} bytes does not fit {width}x{height} RGBA")]
    PixelBuffer { width: u32, height: u32, len: usize },
    #[error("Image too small: crop side {side}px is below the 7px minimum")]
    ImageTooSmall { side: u32 },
    #[error("Region extraction failed for {face}: {reason}")]
    RegionExtraction { face: Face, reason: String },
    #[error("Door index {0} is outside 1..=25")]
    InvalidDoor(u32),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdventError>;

/// Crop, partition and bind a decoded image in one call.
pub struct BoxSlicer {
    config: SceneConfig,
}

impl BoxSlicer {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Decode `bytes` and cut them into a region set.
    pub fn slice_bytes(&self, bytes: &[u8]) -> Result<RegionSet> {
        let image = image::load_from_memory(bytes)?;
        self.slice(&image)
    }

    pub fn slice(&self, image: &image::DynamicImage) -> Result<RegionSet> {
        let crop = square_crop(image);
        partition(image, &crop)
    }

    /// Materials for the box body, falling back to flat colour on any failure.
    pub fn materials(&self, regions: Option<&RegionSet>) -> BoxMaterials {
        BoxMaterials::bind(regions)
    }

    pub fn door_placements(&self) -> Vec<DoorPlacement> {
        DoorCell::all()
            .map(|cell| DoorPlacement::for_cell(&cell, &self.config.box_dimensions))
            .collect()
    }
}

impl Default for BoxSlicer {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slicer_places_all_doors() {
        let placements = BoxSlicer::default().door_placements();
        assert_eq!(placements.len(), DOOR_COUNT as usize);
        assert_eq!(placements[0].day, 1);
        assert_eq!(placements[24].day, 25);
    }

    #[test]
    fn tiny_image_reports_side() {
        let img = image::DynamicImage::new_rgba8(12, 6);
        let err = BoxSlicer::default().slice(&img).unwrap_err();
        assert_eq!(err.to_string(), "Image too small: crop side 6px is below the 7px minimum");
    }
}
