//! Core controller systems.
//!
//! These systems drive the pure pipeline in [`crate::tick`] from ECS data.
//! They are generic over the physics backend so the same resolve step works
//! with Rapier2D or any other integrator.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::ControllerConfig;
use crate::detection::Surroundings;
use crate::intent::MovementIntent;
use crate::material::{EquippedMaterial, PaintAction, PaintSurface, SpeedTable, SurfaceMaterial};
use crate::state::{Airborne, Grounded, LocomotionState};
use crate::tick::{run_tick, TickInput};

/// Apply the facing hysteresis from this tick's horizontal input.
///
/// Runs before the sensors so the lateral probes are cast for the new
/// facing.
pub fn update_facing(mut q: Query<(&MovementIntent, &mut LocomotionState)>) {
    for (intent, mut state) in &mut q {
        state.update_facing(intent.horizontal);
    }
}

/// Remember the material of terrain underfoot.
pub fn record_ground_materials(mut q: Query<(&Surroundings, &mut LocomotionState)>) {
    for (surroundings, mut state) in &mut q {
        let before = state.last_ground_material;
        state.record_ground(surroundings);
        if state.last_ground_material != before {
            trace!("ground material {:?} -> {:?}", before, state.last_ground_material);
        }
    }
}

/// Resolve locomotion for every character and hand the results to the
/// physics backend.
///
/// Latches this tick's jump edges against the fresh ground probe, runs the
/// classifier and both resolvers, then writes velocity, gravity scale and
/// the grabbed object's offset.
pub fn resolve_locomotion<B: CharacterPhysicsBackend>(world: &mut World) {
    if world.contains_resource::<SpeedTable>() {
        world.resource_scope(|world, table: Mut<SpeedTable>| {
            resolve_with_table::<B>(world, &table);
        });
    } else {
        resolve_with_table::<B>(world, &SpeedTable::default());
    }
}

fn resolve_with_table<B: CharacterPhysicsBackend>(world: &mut World, table: &SpeedTable) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, TickInput, Surroundings, ControllerConfig)> = world
        .query::<(Entity, &mut MovementIntent, &Surroundings, &ControllerConfig)>()
        .iter_mut(world)
        .map(|(e, mut intent, surroundings, config)| {
            intent.latch_jump(surroundings.grounded());
            let input = TickInput {
                horizontal: intent.horizontal,
                grab: intent.grab,
                jump: intent.take_jump_request(),
                dt,
                velocity: Vec2::ZERO,
            };
            (e, input, *surroundings, *config)
        })
        .collect();

    for (entity, mut input, surroundings, config) in entities {
        let Some(mut state) = world.get::<LocomotionState>(entity).cloned() else {
            continue;
        };
        input.velocity = B::get_velocity(world, entity);

        let output = run_tick(&input, &surroundings, &mut state, &config, table);

        if let Some(mut stored) = world.get_mut::<LocomotionState>(entity) {
            *stored = state;
        }
        B::set_velocity(world, entity, output.velocity);
        if let Some(scale) = output.gravity_scale {
            B::set_gravity_scale(world, entity, scale);
        }
        if let Some(translation) = output.object_translation {
            B::translate(world, translation.entity, translation.delta);
        }
    }
}

/// Sync the Grounded/Airborne markers with the ground probe.
pub fn sync_state_markers(
    mut commands: Commands,
    q_characters: Query<(Entity, &Surroundings, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, surroundings, has_grounded, has_airborne) in &q_characters {
        let grounded = surroundings.grounded();
        if grounded && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !grounded && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }
    }
}

/// Apply queued paint requests to surfaces.
///
/// Runs ahead of the sensors so a repaint takes effect on the same tick's
/// speed lookup.
pub fn apply_paint_requests(
    mut events: EventReader<PaintSurface>,
    mut q_surfaces: Query<&mut SurfaceMaterial>,
    q_painters: Query<&EquippedMaterial>,
) {
    for request in events.read() {
        let Ok(mut surface) = q_surfaces.get_mut(request.surface) else {
            warn!("paint request for {:?} which has no surface material", request.surface);
            continue;
        };

        let result = match request.action {
            PaintAction::Paint => {
                let Ok(equipped) = q_painters.get(request.painter) else {
                    warn!("painter {:?} has no equipped material", request.painter);
                    continue;
                };
                surface.paint(equipped.kind())
            }
            PaintAction::Revert => surface.revert(),
        };

        match result {
            Ok(()) => debug!("surface {:?} is now {:?}", request.surface, surface.kind()),
            Err(err) => debug!("surface {:?} rejected paint: {err}", request.surface),
        }
    }
}
