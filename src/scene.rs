//! Headless obstacle scene.
//!
//! A flat list of axis-aligned boxes answering probe queries with exact
//! ray/box intersection. Useful for running the locomotion core without a
//! physics engine (replays, tools, tests). As a resource it is what the
//! [`KinematicBackend`](crate::backend::KinematicBackend) sensor probes.

use bevy::prelude::*;

use crate::collision::{CollisionData, ObstacleLayer, Terrain, TerrainSurface};
use crate::config::BodyBox;
use crate::material::MaterialKind;
use crate::sensor::ObstacleCaster;

#[derive(Debug, Clone, Copy)]
struct SceneBox {
    entity: Entity,
    layer: ObstacleLayer,
    rect: Rect,
    terrain: Option<TerrainSurface>,
}

/// A set of static boxes on the two obstacle layers.
///
/// Boxes added with `add_*` get placeholder entities; `insert_*` registers
/// a box for an entity that already exists in a [`World`].
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleScene {
    boxes: Vec<SceneBox>,
    placeholders: u32,
}

impl ObstacleScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, layer: ObstacleLayer, rect: Rect, terrain: Option<TerrainSurface>) -> Entity {
        // Counted down from the top of the index space, away from spawned entities
        self.placeholders += 1;
        let entity = Entity::from_raw(u32::MAX - self.placeholders);
        self.push_for(entity, layer, rect, terrain);
        entity
    }

    fn push_for(
        &mut self,
        entity: Entity,
        layer: ObstacleLayer,
        rect: Rect,
        terrain: Option<TerrainSurface>,
    ) {
        self.boxes.retain(|b| b.entity != entity);
        self.boxes.push(SceneBox {
            entity,
            layer,
            rect,
            terrain,
        });
    }

    /// Add tagged terrain.
    pub fn add_terrain(&mut self, rect: Rect, terrain: Terrain, material: MaterialKind) -> Entity {
        self.push(
            ObstacleLayer::Terrain,
            rect,
            Some(TerrainSurface::new(terrain, material)),
        )
    }

    /// Add a box on the terrain layer that carries no terrain tag.
    pub fn add_untagged_terrain(&mut self, rect: Rect) -> Entity {
        self.push(ObstacleLayer::Terrain, rect, None)
    }

    /// Add a movable object.
    pub fn add_movable(&mut self, rect: Rect) -> Entity {
        self.push(ObstacleLayer::Movable, rect, None)
    }

    /// Register tagged terrain for an existing entity, replacing any box it
    /// already had.
    pub fn insert_terrain(&mut self, entity: Entity, rect: Rect, terrain: Terrain, material: MaterialKind) {
        self.push_for(
            entity,
            ObstacleLayer::Terrain,
            rect,
            Some(TerrainSurface::new(terrain, material)),
        );
    }

    /// Register a movable object for an existing entity.
    pub fn insert_movable(&mut self, entity: Entity, rect: Rect) {
        self.push_for(entity, ObstacleLayer::Movable, rect, None);
    }

    /// Drop an entity's box.
    pub fn remove(&mut self, entity: Entity) {
        self.boxes.retain(|b| b.entity != entity);
    }

    /// Move an entity horizontally.
    pub fn translate(&mut self, entity: Entity, delta_x: f32) {
        if let Some(b) = self.boxes.iter_mut().find(|b| b.entity == entity) {
            b.rect.min.x += delta_x;
            b.rect.max.x += delta_x;
        }
    }

    /// Current rectangle of an entity.
    pub fn rect(&self, entity: Entity) -> Option<Rect> {
        self.boxes.iter().find(|b| b.entity == entity).map(|b| b.rect)
    }

    /// Change the material of a terrain entity.
    pub fn set_material(&mut self, entity: Entity, material: MaterialKind) {
        if let Some(surface) = self
            .boxes
            .iter_mut()
            .find(|b| b.entity == entity)
            .and_then(|b| b.terrain.as_mut())
        {
            surface.material = material;
        }
    }
}

/// Distance along a ray to an axis-aligned box, using the slab method.
/// Rays starting inside the box hit at zero.
fn ray_rect(origin: Vec2, direction: Vec2, max_distance: f32, rect: &Rect) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = max_distance;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (rect.min[axis], rect.max[axis]);

        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (mut t1, mut t2) = ((lo - o) * inv, (hi - o) * inv);
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

impl ObstacleCaster for ObstacleScene {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer: ObstacleLayer,
    ) -> Option<CollisionData> {
        self.boxes
            .iter()
            .filter(|b| b.layer == layer)
            .filter_map(|b| {
                ray_rect(origin, direction, max_distance, &b.rect).map(|t| (b.entity, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, t)| CollisionData::new(t, origin + direction * t, entity))
    }

    fn terrain(&self, entity: Entity) -> Option<TerrainSurface> {
        self.boxes
            .iter()
            .find(|b| b.entity == entity)
            .and_then(|b| b.terrain)
    }

    fn bounds(&self, entity: Entity) -> Option<BodyBox> {
        self.rect(entity)
            .map(|rect| BodyBox::from_silhouette(rect.center(), rect.half_size()))
    }
}
