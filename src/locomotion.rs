//! Action classification and horizontal movement.
//!
//! Every tick starts from a fresh [`TickContext`] built from the sensor
//! results. Nothing in it carries over to the next tick; the persistent
//! snapshot lives in [`LocomotionState`].

use bevy::prelude::*;

use crate::detection::{SurfaceKind, Surroundings};
use crate::material::{MaterialKind, SpeedTable, SurfaceSpeeds};
use crate::state::{Action, Direction, LocomotionState};

/// Select the single action for this tick.
///
/// Priority, first match wins:
/// 1. `Pushing`: object on the facing side, standing on ground or slope,
///    grab held, horizontal input.
/// 2. `Pulling`: object on the opposite side, standing on flat ground,
///    grab held, horizontal input.
/// 3. `UpSlope`: slope on the facing side while grounded on anything.
/// 4. `AgainstWall`: anything on the facing side.
/// 5. `Normal`.
pub fn classify_action(surroundings: &Surroundings, grab_held: bool, input_nonzero: bool) -> Action {
    let grabbing = grab_held && input_nonzero;
    let ground = surroundings.ground.kind();

    if grabbing && surroundings.facing_object.is(SurfaceKind::Object) && ground.is_terrain() {
        Action::Pushing
    } else if grabbing
        && surroundings.opposite_object.is(SurfaceKind::Object)
        && ground == SurfaceKind::Ground
    {
        Action::Pulling
    } else if surroundings.facing_obstacle.is(SurfaceKind::Slope) && surroundings.grounded() {
        Action::UpSlope
    } else if surroundings.facing_obstacle.is_hit() {
        Action::AgainstWall
    } else {
        Action::Normal
    }
}

/// Everything the resolvers need for one tick, built once by the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub action: Action,
    pub facing: Direction,
    /// Object pushed or pulled this tick. Set iff the action grabs.
    pub grabbed_object: Option<Entity>,
    /// Pushed object is pinned against terrain; suppresses its translation.
    pub object_against_wall: bool,
    /// Whether the ground probe hit anything.
    pub grounded: bool,
    /// Material of the terrain the ground probe hit this tick.
    pub ground_material: Option<MaterialKind>,
    /// Material the speeds were looked up for.
    pub speed_material: MaterialKind,
    pub speeds: SurfaceSpeeds,
    pub surroundings: Surroundings,
}

impl TickContext {
    /// Classify the tick and look up speeds for the remembered ground
    /// material.
    ///
    /// Facing comes from `state`, which `update_facing` has already moved
    /// for this tick's input. Surroundings sensed for another facing are
    /// still used as they are.
    pub fn build(
        surroundings: &Surroundings,
        horizontal: f32,
        grab_held: bool,
        state: &LocomotionState,
        table: &SpeedTable,
    ) -> Self {
        let action = classify_action(surroundings, grab_held, horizontal != 0.0);
        let grabbed_object = match action {
            Action::Pushing => surroundings.facing_object.entity(),
            Action::Pulling => surroundings.opposite_object.entity(),
            _ => None,
        };

        if surroundings.facing != state.facing {
            trace!(
                "surroundings sensed facing {:?}, character faces {:?}",
                surroundings.facing,
                state.facing
            );
        }

        Self {
            action,
            facing: state.facing,
            grabbed_object,
            object_against_wall: action == Action::Pushing && surroundings.facing_object.is_pinned(),
            grounded: surroundings.grounded(),
            ground_material: surroundings.ground_material(),
            speed_material: state.last_ground_material,
            speeds: table.speeds(state.last_ground_material),
            surroundings: *surroundings,
        }
    }

    /// Speed magnitude for the classified action.
    pub fn action_speed(&self) -> f32 {
        match self.action {
            Action::Pushing => self.speeds.push,
            Action::Pulling => self.speeds.pull,
            Action::UpSlope => self.speeds.up_slope,
            Action::AgainstWall => 0.0,
            Action::Normal => self.speeds.default,
        }
    }
}

/// Sign of the horizontal input, 0 when there is none.
#[inline]
fn input_sign(horizontal: f32) -> f32 {
    if horizontal > 0.0 {
        1.0
    } else if horizontal < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Horizontal offset to apply to a grabbed object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTranslation {
    pub entity: Entity,
    pub delta: f32,
}

/// Result of the horizontal resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalMotion {
    pub velocity_x: f32,
    pub object_translation: Option<ObjectTranslation>,
}

/// Resolve horizontal velocity and the grabbed object's offset.
///
/// The character moves at the full action speed in the input's direction;
/// the grabbed object moves by `input × speed × dt`. Reads and clears
/// `state.maintain_velocity`; does not touch anything else on the state.
/// A character against a wall never carries bounce velocity.
pub fn resolve_horizontal(
    ctx: &TickContext,
    horizontal: f32,
    dt: f32,
    state: &mut LocomotionState,
) -> HorizontalMotion {
    let speed = ctx.action_speed();

    let object_moves = match ctx.action {
        Action::Pushing => !ctx.object_against_wall,
        // A puller cannot drag the object through whatever blocks its own path
        Action::Pulling => !ctx.surroundings.facing_obstacle.is_hit(),
        _ => false,
    };
    let object_translation = ctx
        .grabbed_object
        .filter(|_| object_moves)
        .map(|entity| ObjectTranslation {
            entity,
            delta: horizontal * speed * dt,
        });

    let resolved = input_sign(horizontal) * speed;
    let previous = state.previous_velocity.x;
    let velocity_x = if state.maintain_velocity
        && ctx.action != Action::AgainstWall
        && ctx.speed_material == MaterialKind::Bounce
        && resolved.abs() < previous.abs()
    {
        trace!("carrying bounce velocity {previous} over {resolved}");
        previous
    } else {
        state.maintain_velocity = false;
        resolved
    };

    HorizontalMotion {
        velocity_x,
        object_translation,
    }
}
