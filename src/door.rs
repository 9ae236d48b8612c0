//! Door cells - maps each of the 25 days onto a 5x5 cell of the front region.

use crate::config::BoxDimensions;
use crate::partition::Rect;
use crate::{AdventError, Result, DOOR_COUNT, GRID_SIZE};
use image::{GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};

/// Fraction of the front texture covered by one cell.
pub const CELL_FRACTION: f32 = 1.0 / GRID_SIZE as f32;

/// UV window of one door onto the front texture.
///
/// `offset` is the lower-left corner in texture space, where V grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorCell {
    pub day: u32,
    pub row: u32,
    pub col: u32,
    pub offset: [f32; 2],
    pub repeat: [f32; 2],
}

impl DoorCell {
    pub fn for_day(day: u32) -> Result<Self> {
        if !(1..=DOOR_COUNT).contains(&day) {
            return Err(AdventError::InvalidDoor(day));
        }
        let idx = day - 1;
        let col = idx % GRID_SIZE;
        let row = idx / GRID_SIZE;
        // Row 0 is the top of the box, but texture V increases upward.
        let offset = [
            col as f32 * CELL_FRACTION,
            1.0 - (row + 1) as f32 * CELL_FRACTION,
        ];
        Ok(Self { day, row, col, offset, repeat: [CELL_FRACTION, CELL_FRACTION] })
    }

    pub fn all() -> impl Iterator<Item = DoorCell> {
        (1..=DOOR_COUNT).filter_map(|d| DoorCell::for_day(d).ok())
    }

    /// Pixel rectangle of this cell inside a `width x height` front image.
    ///
    /// Edges are `floor(i * size / 5)`, so adjacent cells share boundaries and
    /// the 25 rectangles cover the image exactly.
    pub fn pixel_rect(&self, width: u32, height: u32) -> Rect {
        let edge = |i: u32, size: u32| (i as u64 * size as u64 / GRID_SIZE as u64) as u32;
        let (x0, x1) = (edge(self.col, width), edge(self.col + 1, width));
        let (y0, y1) = (edge(self.row, height), edge(self.row + 1, height));
        Rect { x: x0, y: y0, width: x1 - x0, height: y1 - y0 }
    }

    /// Copy this cell's pixels out of `front`.
    pub fn sample(&self, front: &RgbaImage) -> RgbaImage {
        let r = self.pixel_rect(front.width(), front.height());
        front.view(r.x, r.y, r.width, r.height).to_image()
    }
}

/// Where a door sits on the box, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorPlacement {
    pub day: u32,
    pub position: [f32; 3],
    pub size: [f32; 3],
}

/// Door slab thickness.
pub const DOOR_THICKNESS: f32 = 0.02;
/// Gap between the box face and the door to keep them from z-fighting.
pub const DOOR_STANDOFF: f32 = 0.01;

impl DoorPlacement {
    pub fn for_cell(cell: &DoorCell, dims: &BoxDimensions) -> Self {
        let cell_w = dims.width / GRID_SIZE as f32;
        let cell_h = dims.height / GRID_SIZE as f32;
        let x = -dims.width / 2.0 + cell.col as f32 * cell_w + cell_w / 2.0;
        let y = dims.height / 2.0 - cell.row as f32 * cell_h - cell_h / 2.0;
        let z = dims.depth / 2.0 + DOOR_STANDOFF;
        Self { day: cell.day, position: [x, y, z], size: [cell_w, cell_h, DOOR_THICKNESS] }
    }

    pub fn for_day(day: u32, dims: &BoxDimensions) -> Result<Self> {
        Ok(Self::for_cell(&DoorCell::for_day(day)?, dims))
    }
}
