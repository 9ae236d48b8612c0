//! Face materials for the box body and its doors.
//!
//! The body is a cuboid whose material slots follow the usual box-geometry
//! order: `+X, -X, +Y, -Y, +Z, -Z`. The back face (`-Z`) is never textured.

use crate::door::DoorCell;
use crate::partition::{Face, RegionSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Box body and back face.
    pub const WOOD: Color = Color(0x5c, 0x3a, 0x21);
    /// Door front when no texture is bound.
    pub const DOOR_BLANK: Color = Color(0xcc, 0xaa, 0x88);
    pub const WHITE: Color = Color(0xff, 0xff, 0xff);
    pub const LOCKED_HOVER: Color = Color(0x66, 0x66, 0x66);
    pub const HIGHLIGHT: Color = Color(0xff, 0xaa, 0x66);
    pub const BLACK: Color = Color(0, 0, 0);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Nearest,
    Linear,
}

/// Sampler state applied to every bound texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sampling {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub anisotropy: u8,
}

impl Default for Sampling {
    fn default() -> Self {
        Self { min_filter: Filter::Linear, mag_filter: Filter::Linear, anisotropy: 16 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FaceMaterial {
    Textured { region: Face, sampling: Sampling },
    Flat { color: Color },
}

impl FaceMaterial {
    pub fn is_textured(&self) -> bool {
        matches!(self, FaceMaterial::Textured { .. })
    }
}

/// Material slot on the box body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Slot {
    pub const ORDER: [Slot; 6] =
        [Slot::PosX, Slot::NegX, Slot::PosY, Slot::NegY, Slot::PosZ, Slot::NegZ];

    /// Region shown on this slot; the back has none.
    pub fn region(self) -> Option<Face> {
        match self {
            Slot::PosX => Some(Face::Right),
            Slot::NegX => Some(Face::Left),
            Slot::PosY => Some(Face::Top),
            Slot::NegY => Some(Face::Bottom),
            Slot::PosZ => Some(Face::Front),
            Slot::NegZ => None,
        }
    }
}

/// The six body materials, indexed in [`Slot::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxMaterials {
    pub slots: [FaceMaterial; 6],
}

impl BoxMaterials {
    /// All six faces flat. Used when there is nothing valid to show.
    pub fn flat() -> Self {
        Self { slots: [FaceMaterial::Flat { color: Color::WOOD }; 6] }
    }

    /// Bind a region set onto the body.
    ///
    /// Either every visible face is textured or none is: a missing set or one
    /// with an empty region falls back to flat colour over the whole box.
    pub fn bind(regions: Option<&RegionSet>) -> Self {
        let Some(regions) = regions else {
            return Self::flat();
        };
        if !regions.is_complete() {
            tracing::warn!("region set has an empty face, binding flat colour");
            return Self::flat();
        }
        let sampling = Sampling::default();
        let slots = Slot::ORDER.map(|slot| match slot.region() {
            Some(region) => FaceMaterial::Textured { region, sampling },
            None => FaceMaterial::Flat { color: Color::WOOD },
        });
        Self { slots }
    }

    pub fn slot(&self, slot: Slot) -> &FaceMaterial {
        let idx = Slot::ORDER.iter().position(|&s| s == slot).unwrap_or(5);
        &self.slots[idx]
    }

    /// Material of the slot that shows `face`.
    pub fn face(&self, face: Face) -> &FaceMaterial {
        let slot = Slot::ORDER
            .into_iter()
            .find(|s| s.region() == Some(face))
            .unwrap_or(Slot::NegZ);
        self.slot(slot)
    }

    pub fn is_textured(&self) -> bool {
        self.slots.iter().any(FaceMaterial::is_textured)
    }
}

/// Front material of a single door.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorMaterial {
    /// UV window into the front texture. `None` when nothing is bound.
    pub cell: Option<DoorCell>,
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
}

/// Visual inputs for one door's material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoorLook {
    pub textured: bool,
    pub unlocked: bool,
    pub hovered: bool,
    pub tutorial: bool,
    pub open: bool,
}

impl DoorMaterial {
    pub fn for_door(cell: DoorCell, look: DoorLook) -> Self {
        let color = if !look.textured {
            Color::DOOR_BLANK
        } else if !look.unlocked && look.hovered {
            Color::LOCKED_HOVER
        } else {
            Color::WHITE
        };
        let lit = (look.hovered || look.tutorial) && !look.open && look.unlocked;
        Self {
            cell: look.textured.then_some(cell),
            color,
            emissive: if lit { Color::HIGHLIGHT } else { Color::BLACK },
            emissive_intensity: if lit { 0.4 } else { 0.0 },
            opacity: if !look.unlocked && look.hovered { 0.5 } else { 1.0 },
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}
