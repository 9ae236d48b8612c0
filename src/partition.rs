//! Nine-region partition of the square crop onto five box faces.
//!
//! The crop is divided on a 7x7 unit grid with a 1:5:1 split on each axis:
//!
//! ```text
//!   corner | top    | corner
//!   left   | front  | right
//!   corner | bottom | corner
//! ```
//!
//! Corners are never sampled. Front shares its boundary lines (`u` and `6u`)
//! with each side strip, so the seams between faces are continuous.

use crate::crop::CropRect;
use crate::{AdventError, Result};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

/// Units along each axis of the partition grid.
pub const GRID_UNITS: u32 = 7;
/// Units spanned by the front face.
pub const FRONT_UNITS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Top,
    Bottom,
    Left,
    Right,
}

impl Face {
    pub const ALL: [Face; 5] = [Face::Front, Face::Top, Face::Bottom, Face::Left, Face::Right];

    pub fn name(self) -> &'static str {
        match self {
            Face::Front => "front",
            Face::Top => "top",
            Face::Bottom => "bottom",
            Face::Left => "left",
            Face::Right => "right",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Integer rectangle relative to the crop origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Geometry of the 1:5:1 grid for one crop side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    unit: u32,
}

impl RegionLayout {
    /// Layout for a crop of `side` pixels; `u = floor(side / 7)`.
    ///
    /// The grid is anchored at the crop origin, so when `side` is not a
    /// multiple of 7 the trailing `side - 7u` rows and columns go unused.
    pub fn for_side(side: u32) -> Result<Self> {
        let unit = side / GRID_UNITS;
        if unit == 0 {
            return Err(AdventError::ImageTooSmall { side });
        }
        Ok(Self { unit })
    }

    pub fn for_crop(crop: &CropRect) -> Result<Self> {
        Self::for_side(crop.side())
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn rect(&self, face: Face) -> Rect {
        let u = self.unit;
        let edge = FRONT_UNITS * u;
        let far = (FRONT_UNITS + 1) * u;
        match face {
            Face::Front => Rect { x: u, y: u, width: edge, height: edge },
            Face::Top => Rect { x: u, y: 0, width: edge, height: u },
            Face::Bottom => Rect { x: u, y: far, width: edge, height: u },
            Face::Left => Rect { x: 0, y: u, width: u, height: edge },
            Face::Right => Rect { x: far, y: u, width: u, height: edge },
        }
    }

    /// The four discarded `u x u` corner cells.
    pub fn corners(&self) -> [Rect; 4] {
        let u = self.unit;
        let far = (FRONT_UNITS + 1) * u;
        [(0, 0), (far, 0), (0, far), (far, far)]
            .map(|(x, y)| Rect { x, y, width: u, height: u })
    }
}

/// Five standalone face images cut from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    pub front: RgbaImage,
    pub top: RgbaImage,
    pub bottom: RgbaImage,
    pub left: RgbaImage,
    pub right: RgbaImage,
}

impl RegionSet {
    pub fn get(&self, face: Face) -> &RgbaImage {
        match face {
            Face::Front => &self.front,
            Face::Top => &self.top,
            Face::Bottom => &self.bottom,
            Face::Left => &self.left,
            Face::Right => &self.right,
        }
    }

    /// A set is usable only if every region has pixels.
    pub fn is_complete(&self) -> bool {
        Face::ALL.iter().all(|&f| {
            let img = self.get(f);
            img.width() > 0 && img.height() > 0
        })
    }

    /// PNG-encode a single region.
    pub fn encode_png(&self, face: Face) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.get(face).write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

/// Cut `image` into the five face regions of `crop`.
///
/// Each region is copied into its own buffer; nothing borrows the source
/// afterwards.
pub fn partition(image: &DynamicImage, crop: &CropRect) -> Result<RegionSet> {
    if crop.width != crop.height {
        return Err(AdventError::RegionExtraction {
            face: Face::Front,
            reason: format!("crop {}x{} is not square", crop.width, crop.height),
        });
    }
    let layout = RegionLayout::for_crop(crop)?;
    let rgba = image.to_rgba8();
    let (img_w, img_h) = rgba.dimensions();

    let extract = |face: Face| -> Result<RgbaImage> {
        let r = layout.rect(face);
        let origin = crop.x.checked_add(r.x).zip(crop.y.checked_add(r.y));
        let fits = origin.filter(|&(sx, sy)| {
            let right = sx.checked_add(r.width);
            let bottom = sy.checked_add(r.height);
            right.is_some_and(|x| x <= img_w) && bottom.is_some_and(|y| y <= img_h)
        });
        let Some((sx, sy)) = fits else {
            return Err(AdventError::RegionExtraction {
                face,
                reason: format!(
                    "{}x{} at crop offset {}+{} exceeds {}x{} source",
                    r.width, r.height, r.x, r.y, img_w, img_h
                ),
            });
        };
        Ok(rgba.view(sx, sy, r.width, r.height).to_image())
    };

    let regions = RegionSet {
        front: extract(Face::Front)?,
        top: extract(Face::Top)?,
        bottom: extract(Face::Bottom)?,
        left: extract(Face::Left)?,
        right: extract(Face::Right)?,
    };

    tracing::info!(
        unit = layout.unit(),
        front = regions.front.width(),
        "partitioned {}x{} crop into five regions",
        crop.side(),
        crop.side()
    );
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    /// Every pixel encodes its own coordinates, so copies can be traced back.
    fn coord_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, (x / 256) as u8, (y / 256) as u8])
        }))
    }

    fn source_coord(p: &Rgba<u8>) -> (u32, u32) {
        (p.0[0] as u32 + 256 * p.0[2] as u32, p.0[1] as u32 + 256 * p.0[3] as u32)
    }

    #[test]
    fn region_sizes_follow_unit() {
        let img = coord_image(700, 700);
        let regions = partition(&img, &CropRect::square_for(700, 700)).unwrap();
        assert_eq!(regions.front.dimensions(), (500, 500));
        assert_eq!(regions.top.dimensions(), (500, 100));
        assert_eq!(regions.bottom.dimensions(), (500, 100));
        assert_eq!(regions.left.dimensions(), (100, 500));
        assert_eq!(regions.right.dimensions(), (100, 500));
        assert!(regions.is_complete());
    }

    #[test]
    fn regions_sample_from_crop_origin() {
        let img = coord_image(1200, 800);
        let crop = CropRect::square_for(1200, 800);
        let regions = partition(&img, &crop).unwrap();
        // u = 800 / 7 = 114
        assert_eq!(source_coord(regions.front.get_pixel(0, 0)), (200 + 114, 114));
        assert_eq!(source_coord(regions.top.get_pixel(0, 0)), (200 + 114, 0));
        assert_eq!(source_coord(regions.left.get_pixel(0, 0)), (200, 114));
        assert_eq!(source_coord(regions.right.get_pixel(0, 0)), (200 + 684, 114));
        assert_eq!(source_coord(regions.bottom.get_pixel(0, 0)), (200 + 114, 684));
    }

    #[test]
    fn layout_tiles_crop_square() {
        for side in [7u32, 14, 70, 350, 707] {
            let layout = RegionLayout::for_side(side).unwrap();
            let rects: Vec<Rect> = Face::ALL
                .iter()
                .map(|&f| layout.rect(f))
                .chain(layout.corners())
                .collect();
            let total: u64 = rects.iter().map(Rect::area).sum();
            assert_eq!(total, (side as u64) * (side as u64));
            for py in 0..side {
                for px in 0..side {
                    let hits = rects.iter().filter(|r| r.contains(px, py)).count();
                    assert_eq!(hits, 1, "pixel ({px},{py}) covered {hits} times");
                }
            }
        }
    }

    #[test]
    fn seams_share_source_lines() {
        let img = coord_image(490, 560);
        let crop = CropRect::square_for(490, 560);
        let regions = partition(&img, &crop).unwrap();
        let edge = regions.front.width();
        let u = regions.left.width();
        for i in 0..edge {
            // Top strip's last row sits directly above front's first row.
            let (tx, ty) = source_coord(regions.top.get_pixel(i, u - 1));
            let (fx, fy) = source_coord(regions.front.get_pixel(i, 0));
            assert_eq!((tx, ty + 1), (fx, fy));

            let (bx, by) = source_coord(regions.bottom.get_pixel(i, 0));
            let (fx, fy) = source_coord(regions.front.get_pixel(i, edge - 1));
            assert_eq!((bx, by), (fx, fy + 1));

            let (lx, ly) = source_coord(regions.left.get_pixel(u - 1, i));
            let (fx, fy) = source_coord(regions.front.get_pixel(0, i));
            assert_eq!((lx + 1, ly), (fx, fy));

            let (rx, ry) = source_coord(regions.right.get_pixel(0, i));
            let (fx, fy) = source_coord(regions.front.get_pixel(edge - 1, i));
            assert_eq!((rx, ry), (fx + 1, fy));
        }
    }

    #[test]
    fn rerun_is_bit_identical() {
        let img = coord_image(333, 444);
        let crop = CropRect::square_for(333, 444);
        let a = partition(&img, &crop).unwrap();
        let b = partition(&img, &crop).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_crop_is_rejected() {
        let img = coord_image(6, 40);
        let err = partition(&img, &CropRect::square_for(6, 40)).unwrap_err();
        assert!(matches!(err, AdventError::ImageTooSmall { side: 6 }));
    }

    #[test]
    fn crop_outside_source_is_extraction_error() {
        let img = coord_image(70, 70);
        let crop = CropRect { x: 10, y: 0, width: 70, height: 70 };
        let err = partition(&img, &crop).unwrap_err();
        assert!(matches!(err, AdventError::RegionExtraction { face: Face::Right, .. }));
    }

    #[test]
    fn non_square_crop_is_rejected() {
        let img = coord_image(140, 140);
        let crop = CropRect { x: 0, y: 0, width: 140, height: 70 };
        let err = partition(&img, &crop).unwrap_err();
        assert!(matches!(err, AdventError::RegionExtraction { face: Face::Front, .. }));
    }

    #[test]
    fn crop_offset_overflow_is_extraction_error() {
        let img = coord_image(70, 70);
        let crop = CropRect { x: u32::MAX - 5, y: 0, width: 70, height: 70 };
        let err = partition(&img, &crop).unwrap_err();
        assert!(matches!(err, AdventError::RegionExtraction { face: Face::Front, .. }));
    }

    #[test]
    fn encode_png_round_trips_dimensions() {
        let img = coord_image(140, 140);
        let regions = partition(&img, &CropRect::square_for(140, 140)).unwrap();
        let png = regions.encode_png(Face::Left).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (20, 100));
    }
}
