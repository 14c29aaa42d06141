//! Surface materials and their speed profiles.
//!
//! Level geometry carries a [`SurfaceMaterial`]. The locomotion core never
//! mutates materials; it reads the kind of whatever terrain the ground probe
//! resolved to and looks its speeds up in the [`SpeedTable`] resource.
//!
//! The table is immutable once loaded. Tuning tools build a new table with
//! [`SpeedTable::with_speeds`] and replace the resource between ticks.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Material applied to a surface.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialKind {
    /// Bare surface.
    #[default]
    None,
    /// Reflects landings and boosts jumps.
    Bounce,
    /// Fast, low-friction surface.
    Slip,
    /// Slow, sticky surface.
    Stick,
}

impl MaterialKind {
    /// All kinds, in table order.
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::None,
        MaterialKind::Bounce,
        MaterialKind::Slip,
        MaterialKind::Stick,
    ];

    /// Kinds a player can equip and paint with.
    pub const PAINTABLE: [MaterialKind; 3] =
        [MaterialKind::Bounce, MaterialKind::Slip, MaterialKind::Stick];
}

/// Horizontal speeds for each locomotion action on one material.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSpeeds {
    /// Free movement speed.
    pub default: f32,
    /// Speed while pushing an object.
    pub push: f32,
    /// Speed while pulling an object.
    pub pull: f32,
    /// Speed while walking up a slope.
    pub up_slope: f32,
}

impl SurfaceSpeeds {
    pub const fn new(default: f32, push: f32, pull: f32, up_slope: f32) -> Self {
        Self {
            default,
            push,
            pull,
            up_slope,
        }
    }
}

impl Default for SurfaceSpeeds {
    fn default() -> Self {
        SpeedTable::BARE
    }
}

/// Mapping from material kind to its speeds.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct SpeedTable {
    speeds: HashMap<MaterialKind, SurfaceSpeeds>,
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self::from_entries([
            (MaterialKind::None, Self::BARE),
            (MaterialKind::Bounce, SurfaceSpeeds::new(4.0, 1.5, 1.5, 2.5)),
            (MaterialKind::Slip, SurfaceSpeeds::new(8.0, 5.5, 5.5, 6.5)),
            (MaterialKind::Stick, SurfaceSpeeds::new(2.0, 0.0, 0.0, 0.5)),
        ])
    }
}

impl SpeedTable {
    /// Speeds of a bare surface; also the fallback for missing entries.
    pub const BARE: SurfaceSpeeds = SurfaceSpeeds::new(4.0, 1.5, 1.5, 2.5);

    /// Build a table from explicit entries. Missing kinds fall back to
    /// [`SpeedTable::BARE`].
    pub fn from_entries(entries: impl IntoIterator<Item = (MaterialKind, SurfaceSpeeds)>) -> Self {
        Self {
            speeds: entries.into_iter().collect(),
        }
    }

    /// Speeds for a material.
    pub fn speeds(&self, kind: MaterialKind) -> SurfaceSpeeds {
        self.speeds.get(&kind).copied().unwrap_or(Self::BARE)
    }

    /// A copy of this table with one entry replaced.
    #[must_use]
    pub fn with_speeds(&self, kind: MaterialKind, speeds: SurfaceSpeeds) -> Self {
        let mut next = self.clone();
        next.speeds.insert(kind, speeds);
        next
    }
}

/// Errors raised when painting surfaces.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialError {
    #[error("surface is not changeable")]
    NotChangeable,
    #[error("material {0:?} cannot be painted")]
    NotPaintable(MaterialKind),
}

/// Material attached to a terrain entity.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct SurfaceMaterial {
    kind: MaterialKind,
    original: MaterialKind,
    /// Whether the player may repaint this surface.
    pub changeable: bool,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self::fixed(MaterialKind::None)
    }
}

impl SurfaceMaterial {
    /// A material the player cannot repaint.
    pub fn fixed(kind: MaterialKind) -> Self {
        Self {
            kind,
            original: kind,
            changeable: false,
        }
    }

    /// A material the player can repaint.
    pub fn changeable(kind: MaterialKind) -> Self {
        Self {
            changeable: true,
            ..Self::fixed(kind)
        }
    }

    /// Current material kind.
    #[inline]
    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    /// Kind the surface was authored with.
    #[inline]
    pub fn original(&self) -> MaterialKind {
        self.original
    }

    /// Repaint with a new material.
    pub fn paint(&mut self, kind: MaterialKind) -> Result<(), MaterialError> {
        if !self.changeable {
            return Err(MaterialError::NotChangeable);
        }
        if !MaterialKind::PAINTABLE.contains(&kind) {
            return Err(MaterialError::NotPaintable(kind));
        }
        self.kind = kind;
        Ok(())
    }

    /// Restore the authored material.
    pub fn revert(&mut self) -> Result<(), MaterialError> {
        if !self.changeable {
            return Err(MaterialError::NotChangeable);
        }
        self.kind = self.original;
        Ok(())
    }
}

/// Material the player currently has equipped for painting.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct EquippedMaterial(MaterialKind);

impl Default for EquippedMaterial {
    fn default() -> Self {
        Self(MaterialKind::Bounce)
    }
}

impl EquippedMaterial {
    /// The equipped kind.
    #[inline]
    pub fn kind(&self) -> MaterialKind {
        self.0
    }

    /// Equip a new material.
    pub fn select(&mut self, kind: MaterialKind) -> Result<(), MaterialError> {
        if !MaterialKind::PAINTABLE.contains(&kind) {
            return Err(MaterialError::NotPaintable(kind));
        }
        self.0 = kind;
        Ok(())
    }

    /// Equip by slot index (0 = Bounce, 1 = Slip, 2 = Stick).
    pub fn select_slot(&mut self, slot: usize) -> Option<MaterialKind> {
        let kind = *MaterialKind::PAINTABLE.get(slot)?;
        self.0 = kind;
        Some(kind)
    }
}

/// What to do to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintAction {
    /// Apply the painter's equipped material.
    Paint,
    /// Restore the authored material.
    Revert,
}

/// Request to repaint a surface, sent by the level-editing collaborator.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintSurface {
    /// Surface to repaint.
    pub surface: Entity,
    /// Entity holding the [`EquippedMaterial`] to paint with.
    pub painter: Entity,
    pub action: PaintAction,
}
