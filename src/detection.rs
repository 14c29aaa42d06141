//! Probe result structures.
//!
//! These structures hold the classified results of the surroundings probes.
//! They are recomputed every tick and never persisted.

use bevy::prelude::*;

use crate::material::MaterialKind;
use crate::state::Direction;

/// Classification of whatever a probe hit.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceKind {
    /// Nothing was hit.
    #[default]
    None,
    /// Flat terrain.
    Ground,
    /// Sloped terrain the character can walk up.
    Slope,
    /// A movable object.
    Object,
}

impl SurfaceKind {
    /// Whether this is walkable terrain (ground or slope).
    pub fn is_terrain(self) -> bool {
        matches!(self, SurfaceKind::Ground | SurfaceKind::Slope)
    }
}

/// A classified probe hit.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// The entity occupying the probe.
    pub entity: Entity,
    /// Surface classification of the entity.
    pub kind: SurfaceKind,
    /// Distance along the probe to the hit.
    pub distance: f32,
    /// Material of hit terrain. Always [`MaterialKind::None`] for objects.
    pub material: MaterialKind,
    /// Set on object hits whose object is itself abutting terrain on the
    /// side the probe was cast towards.
    pub pinned: bool,
}

impl ProbeHit {
    /// A hit on terrain of the given kind and material.
    pub fn terrain(entity: Entity, kind: SurfaceKind, material: MaterialKind, distance: f32) -> Self {
        Self {
            entity,
            kind,
            distance,
            material,
            pinned: false,
        }
    }

    /// A hit on a movable object.
    pub fn object(entity: Entity, distance: f32) -> Self {
        Self {
            entity,
            kind: SurfaceKind::Object,
            distance,
            material: MaterialKind::None,
            pinned: false,
        }
    }
}

/// Result of a single probe: either no hit, or the hit entity and its kind.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct ProbeResult {
    hit: Option<ProbeHit>,
}

impl ProbeResult {
    /// An empty (no hit) result.
    pub fn miss() -> Self {
        Self::default()
    }

    /// A result carrying a hit.
    pub fn hit(hit: ProbeHit) -> Self {
        Self { hit: Some(hit) }
    }

    /// Whether anything was hit.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }

    /// The hit, if any.
    #[inline]
    pub fn get(&self) -> Option<&ProbeHit> {
        self.hit.as_ref()
    }

    /// Surface kind of the hit, [`SurfaceKind::None`] on a miss.
    pub fn kind(&self) -> SurfaceKind {
        self.hit.map(|h| h.kind).unwrap_or_default()
    }

    /// Whether the hit is of the given kind.
    pub fn is(&self, kind: SurfaceKind) -> bool {
        self.kind() == kind
    }

    /// The hit entity, if any.
    pub fn entity(&self) -> Option<Entity> {
        self.hit.map(|h| h.entity)
    }

    /// Whether the hit is an object pinned against terrain.
    pub fn is_pinned(&self) -> bool {
        self.hit.is_some_and(|h| h.pinned)
    }
}

impl From<Option<ProbeHit>> for ProbeResult {
    fn from(hit: Option<ProbeHit>) -> Self {
        Self { hit }
    }
}

/// The five probe results describing the character's surroundings.
///
/// Lateral probes are stored relative to the facing direction the sensor was
/// run with. The `*_obstacle` probes see both layers at their natural
/// length; the `*_object` probes only see movable objects and include the
/// grab leniency while the grab button is held.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct Surroundings {
    /// Facing direction the lateral probes were cast for.
    pub facing: Direction,
    /// Any obstacle on the facing side.
    pub facing_obstacle: ProbeResult,
    /// Movable object on the facing side.
    pub facing_object: ProbeResult,
    /// Any obstacle on the opposite side.
    pub opposite_obstacle: ProbeResult,
    /// Movable object on the opposite side.
    pub opposite_object: ProbeResult,
    /// Whatever is directly underfoot.
    pub ground: ProbeResult,
}

impl Surroundings {
    /// Whether the ground probe hit anything.
    #[inline]
    pub fn grounded(&self) -> bool {
        self.ground.is_hit()
    }

    /// Whether both lateral obstacle probes report a hit.
    pub fn wedged(&self) -> bool {
        self.facing_obstacle.is_hit() && self.opposite_obstacle.is_hit()
    }

    /// Material of the terrain underfoot, if the ground probe hit terrain.
    pub fn ground_material(&self) -> Option<MaterialKind> {
        self.ground
            .get()
            .filter(|h| h.kind.is_terrain())
            .map(|h| h.material)
    }

    /// Obstacle probe result for an absolute direction.
    pub fn obstacle(&self, direction: Direction) -> ProbeResult {
        if direction == self.facing {
            self.facing_obstacle
        } else if direction == self.facing.opposite() {
            self.opposite_obstacle
        } else {
            self.ground
        }
    }
}
