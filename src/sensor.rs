//! Surroundings sensor.
//!
//! Probes are thin rays cast alongside the character's silhouette. A lateral
//! probe does not fire sideways: it starts just outside the bottom corner on
//! its side and sweeps *upwards* for the full height of the box, so
//! obstacles with thin vertical edges are never stepped past. The ground
//! probe sweeps horizontally just below the feet.
//!
//! Everything here is a pure function of the [`ObstacleCaster`] state, so
//! sensing twice with unchanged geometry yields identical results.

use bevy::prelude::*;

use crate::collision::{CollisionData, ObstacleLayer, TerrainSurface};
use crate::config::{BodyBox, SensorConfig};
use crate::detection::{ProbeHit, ProbeResult, Surroundings};
use crate::state::Direction;

/// Answers ray queries against the two obstacle layers.
///
/// Implemented by physics backends (see `Rapier2dObstacleCaster`) and by
/// [`ObstacleScene`](crate::scene::ObstacleScene) for headless use.
/// Implementations must never report the probing character itself.
pub trait ObstacleCaster {
    /// Cast a ray against one layer, returning the nearest hit.
    ///
    /// A ray starting inside a collider hits it at distance zero.
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer: ObstacleLayer,
    ) -> Option<CollisionData>;

    /// Classification and material of a terrain entity. `None` for entities
    /// that are on the terrain layer but carry no terrain tag.
    fn terrain(&self, entity: Entity) -> Option<TerrainSurface>;

    /// World-space box of an entity, used to re-probe grabbed objects.
    fn bounds(&self, entity: Entity) -> Option<BodyBox>;
}

/// A single probe ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRay {
    pub origin: Vec2,
    pub direction: Vec2,
    pub distance: f32,
}

/// Lateral probe on one side of a box.
///
/// `side` must be `Left` or `Right`.
pub fn lateral_probe(body: &BodyBox, side: Direction, epsilon: f32, leniency: f32) -> ProbeRay {
    debug_assert!(side != Direction::Down, "lateral probes are left or right");

    let reach = body.half_extents.x + body.edge_radius + epsilon + leniency;
    ProbeRay {
        origin: Vec2::new(
            body.center.x + side.sign() * reach,
            body.bottom() - body.edge_radius / 2.0,
        ),
        direction: Vec2::Y,
        distance: body.size().y + body.edge_radius,
    }
}

/// Ground probe sweeping left to right just below a box.
pub fn ground_probe(body: &BodyBox, leniency: f32) -> ProbeRay {
    ProbeRay {
        origin: Vec2::new(
            body.center.x - body.half_extents.x - body.edge_radius / 2.0,
            body.bottom() - body.edge_radius - leniency,
        ),
        direction: Vec2::X,
        distance: body.size().x + body.edge_radius,
    }
}

/// Evaluate a probe against the given layers.
///
/// Layers are evaluated movable-first: an object hit is reported even when
/// terrain also lies on the ray.
pub fn probe<C: ObstacleCaster>(caster: &C, ray: &ProbeRay, layers: &[ObstacleLayer]) -> ProbeResult {
    for layer in ObstacleLayer::PRIORITY {
        if !layers.contains(&layer) {
            continue;
        }
        let Some(hit) = caster.cast_ray(ray.origin, ray.direction, ray.distance, layer) else {
            continue;
        };
        return match layer {
            ObstacleLayer::Movable => ProbeResult::hit(ProbeHit::object(hit.entity, hit.distance)),
            ObstacleLayer::Terrain => caster
                .terrain(hit.entity)
                .map(|surface| {
                    ProbeHit::terrain(
                        hit.entity,
                        surface.terrain.surface_kind(),
                        surface.material,
                        hit.distance,
                    )
                })
                .into(),
        };
    }
    ProbeResult::miss()
}

const BOTH_LAYERS: [ObstacleLayer; 2] = ObstacleLayer::PRIORITY;
const OBJECTS_ONLY: [ObstacleLayer; 1] = [ObstacleLayer::Movable];
const TERRAIN_ONLY: [ObstacleLayer; 1] = [ObstacleLayer::Terrain];

/// Whether an object is abutting terrain on `side`.
pub fn object_pinned<C: ObstacleCaster>(
    caster: &C,
    object: &BodyBox,
    side: Direction,
    config: &SensorConfig,
) -> bool {
    let ray = lateral_probe(object, side, config.object_probe_epsilon, 0.0);
    probe(caster, &ray, &TERRAIN_ONLY).is_hit()
}

/// Run all five probes for a character.
///
/// The object probes reach `grab_leniency` further while `grab_held`. An
/// object found on the facing side is re-probed for terrain behind it and
/// flagged as pinned.
pub fn sense_surroundings<C: ObstacleCaster>(
    caster: &C,
    body: &BodyBox,
    facing: Direction,
    grab_held: bool,
    config: &SensorConfig,
) -> Surroundings {
    let opposite = facing.opposite();
    let leniency = if grab_held { config.grab_leniency } else { 0.0 };
    let eps = config.probe_epsilon;

    let mut facing_object = probe(caster, &lateral_probe(body, facing, eps, leniency), &OBJECTS_ONLY);
    if let Some(hit) = facing_object.get() {
        let mut hit = *hit;
        hit.pinned = caster
            .bounds(hit.entity)
            .is_some_and(|bounds| object_pinned(caster, &bounds, facing, config));
        facing_object = ProbeResult::hit(hit);
    }

    Surroundings {
        facing,
        facing_obstacle: probe(caster, &lateral_probe(body, facing, eps, 0.0), &BOTH_LAYERS),
        facing_object,
        opposite_obstacle: probe(caster, &lateral_probe(body, opposite, eps, 0.0), &BOTH_LAYERS),
        opposite_object: probe(
            caster,
            &lateral_probe(body, opposite, eps, leniency),
            &OBJECTS_ONLY,
        ),
        ground: probe(caster, &ground_probe(body, config.ground_leniency), &BOTH_LAYERS),
    }
}
