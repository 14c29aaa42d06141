//! Physics backend abstraction.
//!
//! The locomotion core never integrates anything itself: it hands a velocity,
//! a gravity scale and a grabbed-object offset to a rigid-body engine. This
//! trait is the seam to that engine, so Rapier2D can be swapped for another
//! integrator without touching the core.

use bevy::prelude::*;

use crate::config::{ControllerConfig, ProbeBody};
use crate::detection::Surroundings;
use crate::intent::MovementIntent;
use crate::material::SurfaceMaterial;
use crate::scene::ObstacleScene;
use crate::sensor::sense_surroundings;
use crate::state::LocomotionState;

/// Trait for physics backend implementations.
///
/// All methods are static and operate on the [`World`], so the exclusive
/// resolve system can call them while it iterates characters.
///
/// See the `rapier` module's `Rapier2dBackend` for the shipped
/// implementation. Sensing is a separate seam, see
/// [`ObstacleCaster`](crate::sensor::ObstacleCaster).
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// The velocity component type used by this backend.
    type VelocityComponent: Component;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Get the gravity scale of an entity. Defaults to 1.0 when unset.
    fn get_gravity_scale(world: &World, entity: Entity) -> f32;

    /// Set the gravity scale of an entity.
    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32);

    /// Move an entity horizontally by `delta_x`, bypassing the integrator.
    ///
    /// Used to drag grabbed objects along with the character.
    fn translate(world: &mut World, entity: Entity, delta_x: f32);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Backend that stores velocity and gravity scale in plain components.
///
/// For running the controller without a physics engine (replays, servers,
/// tests); nothing integrates the velocity. Characters are sensed against
/// the [`ObstacleScene`] resource using their [`ProbeBody`] placed at their
/// `Transform`, so the character itself must not be in the scene.
pub struct KinematicBackend;

/// Velocity written by [`KinematicBackend`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct KinematicVelocity(pub Vec2);

/// Gravity scale written by [`KinematicBackend`].
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct KinematicGravityScale(pub f32);

impl Default for KinematicGravityScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl CharacterPhysicsBackend for KinematicBackend {
    type VelocityComponent = KinematicVelocity;

    fn plugin() -> impl Plugin {
        KinematicBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<KinematicVelocity>(entity)
            .map(|v| v.0)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<KinematicVelocity>(entity) {
            vel.0 = velocity;
        }
    }

    fn get_gravity_scale(world: &World, entity: Entity) -> f32 {
        world
            .get::<KinematicGravityScale>(entity)
            .map(|g| g.0)
            .unwrap_or(1.0)
    }

    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32) {
        if let Some(mut gravity) = world.get_mut::<KinematicGravityScale>(entity) {
            gravity.0 = scale;
        }
    }

    fn translate(world: &mut World, entity: Entity, delta_x: f32) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x += delta_x;
        }
        if let Some(mut scene) = world.get_resource_mut::<ObstacleScene>() {
            scene.translate(entity, delta_x);
        }
    }
}

/// Sets up the scene resource and sensor for [`KinematicBackend`].
pub struct KinematicBackendPlugin;

impl Plugin for KinematicBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::SurfaceControllerSet;

        app.init_resource::<ObstacleScene>();
        app.add_systems(
            FixedUpdate,
            (sync_scene_materials, kinematic_surroundings_sensor)
                .chain()
                .in_set(SurfaceControllerSet::Sensors),
        );
    }
}

/// Copy repainted surface materials into the scene.
fn sync_scene_materials(
    mut scene: ResMut<ObstacleScene>,
    q_surfaces: Query<(Entity, &SurfaceMaterial), Changed<SurfaceMaterial>>,
) {
    for (entity, material) in &q_surfaces {
        scene.set_material(entity, material.kind());
    }
}

/// Cast the five probes for every character against the scene.
fn kinematic_surroundings_sensor(
    scene: Res<ObstacleScene>,
    mut q_characters: Query<(
        Entity,
        &Transform,
        Option<&ProbeBody>,
        &LocomotionState,
        &MovementIntent,
        &ControllerConfig,
        &mut Surroundings,
    )>,
) {
    for (entity, transform, probe_body, state, intent, config, mut surroundings) in &mut q_characters {
        let Some(probe_body) = probe_body else {
            warn_once!("character {entity:?} has no ProbeBody to sense with");
            continue;
        };
        let body = probe_body.at(transform.translation.xy());
        *surroundings = sense_surroundings(&*scene, &body, state.facing, intent.grab, &config.sensor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_backend_roundtrip() {
        let mut world = World::new();
        let entity = world
            .spawn((
                Transform::default(),
                KinematicVelocity::default(),
                KinematicGravityScale::default(),
            ))
            .id();

        KinematicBackend::set_velocity(&mut world, entity, Vec2::new(3.0, -1.0));
        assert_eq!(KinematicBackend::get_velocity(&world, entity), Vec2::new(3.0, -1.0));

        assert_eq!(KinematicBackend::get_gravity_scale(&world, entity), 1.0);
        KinematicBackend::set_gravity_scale(&mut world, entity, 2.5);
        assert_eq!(KinematicBackend::get_gravity_scale(&world, entity), 2.5);

        KinematicBackend::translate(&mut world, entity, 0.25);
        KinematicBackend::translate(&mut world, entity, 0.25);
        let x = world.get::<Transform>(entity).unwrap().translation.x;
        assert!((x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn fixed_timestep_falls_back_without_time() {
        let world = World::new();
        assert!((KinematicBackend::get_fixed_timestep(&world) - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn translate_moves_scene_box_too() {
        let mut world = World::new();
        world.init_resource::<ObstacleScene>();
        let crate_ = world.spawn(Transform::default()).id();
        world
            .resource_mut::<ObstacleScene>()
            .insert_movable(crate_, Rect::new(0.0, 0.0, 1.0, 1.0));

        KinematicBackend::translate(&mut world, crate_, 0.5);

        assert_eq!(world.get::<Transform>(crate_).unwrap().translation.x, 0.5);
        let rect = world.resource::<ObstacleScene>().rect(crate_).unwrap();
        assert_eq!(rect.min.x, 0.5);
    }

    #[test]
    fn missing_components_are_ignored() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();

        KinematicBackend::set_velocity(&mut world, entity, Vec2::ONE);
        KinematicBackend::translate(&mut world, entity, 1.0);
        assert_eq!(KinematicBackend::get_velocity(&world, entity), Vec2::ZERO);
    }
}
