//! Raw cast results and obstacle layers.
//!
//! A physics backend answers "what did this ray hit on this layer" with a
//! [`CollisionData`]. Classification into surface kinds happens afterwards in
//! the sensor.

use bevy::prelude::*;

use crate::detection::SurfaceKind;
use crate::material::MaterialKind;

/// The two disjoint obstacle classes a probe is evaluated against.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleLayer {
    /// Static level geometry (floors, walls, slopes).
    Terrain,
    /// Objects the character can push and pull.
    Movable,
}

impl ObstacleLayer {
    /// Layers in the order a probe evaluates them. Movable objects come first
    /// because they always sit in front of the terrain behind them.
    pub const PRIORITY: [ObstacleLayer; 2] = [ObstacleLayer::Movable, ObstacleLayer::Terrain];
}

/// Marks an entity as static terrain and gives its sub-classification.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[reflect(Component)]
pub enum Terrain {
    #[default]
    Ground,
    Slope,
}

impl Terrain {
    /// Surface kind reported by probes hitting this terrain.
    pub fn surface_kind(self) -> SurfaceKind {
        match self {
            Terrain::Ground => SurfaceKind::Ground,
            Terrain::Slope => SurfaceKind::Slope,
        }
    }
}

/// Marks an entity as a movable object that can be pushed and pulled.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Movable;

/// What a probe needs to know about hit terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainSurface {
    pub terrain: Terrain,
    pub material: MaterialKind,
}

impl TerrainSurface {
    pub fn new(terrain: Terrain, material: MaterialKind) -> Self {
        Self { terrain, material }
    }
}

/// Information about a single ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit point.
    pub point: Vec2,
    /// Entity that was hit.
    pub entity: Entity,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, point: Vec2, entity: Entity) -> Self {
        Self {
            distance,
            point,
            entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_data_new() {
        let entity = Entity::from_raw(42);
        let hit = CollisionData::new(3.0, Vec2::new(1.0, 2.0), entity);

        assert_eq!(hit.distance, 3.0);
        assert_eq!(hit.point, Vec2::new(1.0, 2.0));
        assert_eq!(hit.entity, entity);
    }

    #[test]
    fn terrain_surface_kind() {
        assert_eq!(Terrain::Ground.surface_kind(), SurfaceKind::Ground);
        assert_eq!(Terrain::Slope.surface_kind(), SurfaceKind::Slope);
    }

    #[test]
    fn movable_layer_is_probed_first() {
        assert_eq!(ObstacleLayer::PRIORITY[0], ObstacleLayer::Movable);
        assert_eq!(ObstacleLayer::PRIORITY[1], ObstacleLayer::Terrain);
    }
}
