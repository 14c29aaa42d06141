//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::{CollisionData, Movable, ObstacleLayer, Terrain, TerrainSurface};
use crate::config::{BodyBox, ControllerConfig, ProbeBody};
use crate::detection::Surroundings;
use crate::intent::MovementIntent;
use crate::material::SurfaceMaterial;
use crate::sensor::{sense_surroundings, ObstacleCaster};
use crate::state::LocomotionState;

/// Rapier2D physics backend for the character controller.
///
/// Velocity and gravity scale map onto Rapier's [`Velocity`] and
/// [`GravityScale`] components. Probing is handled by a dedicated sensor
/// system that receives `RapierContext` as a system parameter.
pub struct Rapier2dBackend;

impl CharacterPhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn get_gravity_scale(world: &World, entity: Entity) -> f32 {
        world
            .get::<GravityScale>(entity)
            .map(|g| g.0)
            .unwrap_or(1.0)
    }

    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32) {
        if let Some(mut gravity) = world.get_mut::<GravityScale>(entity) {
            gravity.0 = scale;
        } else if let Ok(mut entity) = world.get_entity_mut(entity) {
            entity.insert(GravityScale(scale));
        }
    }

    fn translate(world: &mut World, entity: Entity, delta_x: f32) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x += delta_x;
        }
    }
}

/// Plugin that sets up Rapier2D-specific systems for the controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::SurfaceControllerSet;

        app.add_systems(
            FixedUpdate,
            rapier_surroundings_sensor.in_set(SurfaceControllerSet::Sensors),
        );
    }
}

/// Probe box of an entity: explicit [`ProbeBody`], otherwise its cuboid
/// collider as a silhouette.
pub fn probe_box(
    transform: &GlobalTransform,
    probe_body: Option<&ProbeBody>,
    collider: Option<&Collider>,
) -> Option<BodyBox> {
    let center = transform.translation().xy();
    if let Some(body) = probe_body {
        return Some(body.at(center));
    }
    collider
        .and_then(|c| c.as_cuboid())
        .map(|cuboid| BodyBox::from_silhouette(center, cuboid.half_extents()))
}

/// [`ObstacleCaster`] over a Rapier query pipeline.
///
/// Terrain rays only see entities carrying [`Terrain`]; movable rays only
/// see [`Movable`] ones. The probing character is always excluded.
pub struct RapierObstacleCaster<'a, 'w, 's> {
    context: &'a RapierContext<'a>,
    terrain: &'a Query<'w, 's, (&'static Terrain, Option<&'static SurfaceMaterial>)>,
    movable: &'a Query<'w, 's, (), With<Movable>>,
    bodies: &'a Query<
        'w,
        's,
        (
            &'static GlobalTransform,
            Option<&'static ProbeBody>,
            Option<&'static Collider>,
        ),
    >,
    exclude: Entity,
}

impl ObstacleCaster for RapierObstacleCaster<'_, '_, '_> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer: ObstacleLayer,
    ) -> Option<CollisionData> {
        let on_layer = |entity: Entity| match layer {
            ObstacleLayer::Terrain => self.terrain.contains(entity),
            ObstacleLayer::Movable => self.movable.contains(entity),
        };
        let filter = QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_collider(self.exclude)
            .exclude_sensors()
            .predicate(&on_layer);

        self.context
            .cast_ray(origin, direction, max_distance, true, filter)
            .map(|(entity, toi)| CollisionData::new(toi, origin + direction * toi, entity))
    }

    fn terrain(&self, entity: Entity) -> Option<TerrainSurface> {
        self.terrain.get(entity).ok().map(|(terrain, material)| {
            TerrainSurface::new(*terrain, material.map(|m| m.kind()).unwrap_or_default())
        })
    }

    fn bounds(&self, entity: Entity) -> Option<BodyBox> {
        let (transform, probe_body, collider) = self.bodies.get(entity).ok()?;
        probe_box(transform, probe_body, collider)
    }
}

/// Rapier-specific surroundings sensor.
///
/// Casts the five probes for every character and stores them in its
/// [`Surroundings`]. Characters without a [`ProbeBody`] or cuboid collider
/// are skipped.
fn rapier_surroundings_sensor(
    rapier_context: ReadRapierContext,
    mut q_characters: Query<(
        Entity,
        &LocomotionState,
        &MovementIntent,
        &ControllerConfig,
        &mut Surroundings,
    )>,
    q_terrain: Query<(&'static Terrain, Option<&'static SurfaceMaterial>)>,
    q_movable: Query<(), With<Movable>>,
    q_bodies: Query<(
        &'static GlobalTransform,
        Option<&'static ProbeBody>,
        Option<&'static Collider>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, state, intent, config, mut surroundings) in &mut q_characters {
        let Ok((transform, probe_body, collider)) = q_bodies.get(entity) else {
            continue;
        };
        let Some(body) = probe_box(transform, probe_body, collider) else {
            warn_once!("character {entity:?} has neither a ProbeBody nor a cuboid collider");
            continue;
        };

        let caster = RapierObstacleCaster {
            context: &context,
            terrain: &q_terrain,
            movable: &q_movable,
            bodies: &q_bodies,
            exclude: entity,
        };
        *surroundings = sense_surroundings(&caster, &body, state.facing, intent.grab, &config.sensor);
    }
}

/// Bundle for creating a character with Rapier2D physics.
///
/// A dynamic, rotation-locked body whose velocity and gravity scale are
/// driven by the controller every fixed tick. Add a cuboid [`Collider`] (or
/// a [`ProbeBody`]) so the sensor knows the character's box.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use surface_tension::prelude::*;
/// use surface_tension::rapier::Rapier2dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         SurfaceCharacterBundle::new(ControllerConfig::player()),
///         Rapier2dCharacterBundle::new(),
///         Collider::cuboid(0.5, 1.0),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`].
    pub rigid_body: RigidBody,
    /// Linear velocity, overwritten by the controller every tick.
    pub velocity: Velocity,
    /// Gravity scale, switched between rising and falling values.
    pub gravity_scale: GravityScale,
    /// Which axes are locked. Characters never rotate.
    pub locked_axes: LockedAxes,
    /// Contact friction. Zero so walls never hold the character up.
    pub friction: Friction,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    /// Create a new rotation-locked dynamic character body.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            gravity_scale: GravityScale(1.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            friction: Friction::coefficient(0.0),
        }
    }

    /// Set the rigid body type for the character.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the contact friction.
    pub fn with_friction(mut self, coefficient: f32) -> Self {
        self.friction = Friction::coefficient(coefficient);
        self
    }
}
