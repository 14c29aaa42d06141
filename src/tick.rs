//! The per-tick locomotion pipeline.
//!
//! ```text
//! input -> facing -> sensor -> classifier -> vertical + horizontal -> output
//! ```
//!
//! [`step`] runs the whole pipeline against any [`ObstacleCaster`]. The Bevy
//! systems split it across system sets but call the same functions.

use bevy::prelude::*;

use crate::config::{BodyBox, ControllerConfig};
use crate::detection::Surroundings;
use crate::intent::JumpRequest;
use crate::jump::resolve_vertical;
use crate::locomotion::{resolve_horizontal, ObjectTranslation, TickContext};
use crate::material::SpeedTable;
use crate::sensor::{sense_surroundings, ObstacleCaster};
use crate::state::{Action, Direction, LocomotionState};

/// Everything the environment hands the core for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickInput {
    /// Signed horizontal input, typically in [-1, 1].
    pub horizontal: f32,
    /// Grab button held.
    pub grab: bool,
    /// Jump edges latched since the last tick.
    pub jump: JumpRequest,
    /// Tick duration in seconds.
    pub dt: f32,
    /// Character velocity at the start of the tick.
    pub velocity: Vec2,
}

impl TickInput {
    pub fn new(horizontal: f32, dt: f32, velocity: Vec2) -> Self {
        Self {
            horizontal,
            dt,
            velocity,
            ..default()
        }
    }

    pub fn with_grab(mut self, grab: bool) -> Self {
        self.grab = grab;
        self
    }

    pub fn with_jump(mut self, jump: JumpRequest) -> Self {
        self.jump = jump;
        self
    }
}

/// Everything the core hands back for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    /// Velocity to apply to the character.
    pub velocity: Vec2,
    /// Gravity scale to apply, if it changed.
    pub gravity_scale: Option<f32>,
    /// Offset for the grabbed object, if it moves this tick.
    pub object_translation: Option<ObjectTranslation>,
    pub action: Action,
    pub facing: Direction,
    /// Whether a bounce landing was reflected this tick.
    pub bounced: bool,
}

/// Resolve one tick from already-sensed surroundings.
///
/// Expects `state.update_facing` and `state.record_ground` to have run for
/// this tick. Updates the rest of the state snapshot.
pub fn run_tick(
    input: &TickInput,
    surroundings: &Surroundings,
    state: &mut LocomotionState,
    config: &ControllerConfig,
    table: &SpeedTable,
) -> TickOutput {
    let ctx = TickContext::build(surroundings, input.horizontal, input.grab, state, table);
    if ctx.action != state.action {
        debug!("action {:?} -> {:?}", state.action, ctx.action);
    }

    let vertical = resolve_vertical(&ctx, input.jump, input.velocity.y, state, config);
    let horizontal = resolve_horizontal(&ctx, input.horizontal, input.dt, state);
    let velocity = Vec2::new(horizontal.velocity_x, vertical.velocity_y);

    state.action = ctx.action;
    state.facing = ctx.facing;
    state.grabbed_object = ctx.grabbed_object;
    state.object_against_wall = ctx.object_against_wall;
    state.moving = input.horizontal * velocity.x > 0.0;
    state.was_grounded = ctx.grounded;
    state.previous_velocity = input.velocity;

    TickOutput {
        velocity,
        gravity_scale: vertical.gravity_scale,
        object_translation: horizontal.object_translation,
        action: ctx.action,
        facing: ctx.facing,
        bounced: vertical.bounced,
    }
}

/// Run the full pipeline for a character whose probe box is `body`.
pub fn step<C: ObstacleCaster>(
    caster: &C,
    body: &BodyBox,
    input: &TickInput,
    state: &mut LocomotionState,
    config: &ControllerConfig,
    table: &SpeedTable,
) -> TickOutput {
    let facing = state.update_facing(input.horizontal);
    let surroundings = sense_surroundings(caster, body, facing, input.grab, &config.sensor);
    state.record_ground(&surroundings);
    run_tick(input, &surroundings, state, config, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Terrain;
    use crate::material::MaterialKind;
    use crate::scene::ObstacleScene;

    const DT: f32 = 1.0 / 50.0;

    fn body() -> BodyBox {
        BodyBox::new(Vec2::ZERO, Vec2::new(1.0, 2.0), 0.0)
    }

    fn scene_with_floor(material: MaterialKind) -> ObstacleScene {
        let mut scene = ObstacleScene::new();
        scene.add_terrain(Rect::new(-10.0, -2.0, 10.0, -1.02), Terrain::Ground, material);
        scene
    }

    #[test]
    fn slip_floor_runs_at_eight() {
        let scene = scene_with_floor(MaterialKind::Slip);
        let mut state = LocomotionState::new();

        let out = step(
            &scene,
            &body(),
            &TickInput::new(1.0, DT, Vec2::ZERO),
            &mut state,
            &ControllerConfig::default(),
            &SpeedTable::default(),
        );

        assert_eq!(out.action, Action::Normal);
        assert_eq!(out.velocity.x, 8.0);
        assert_eq!(out.gravity_scale, None);
        assert_eq!(state.last_ground_material, MaterialKind::Slip);
        assert!(state.was_grounded);
        assert!(state.moving);
    }

    #[test]
    fn state_snapshot_tracks_tick() {
        let scene = scene_with_floor(MaterialKind::None);
        let mut state = LocomotionState::new();
        let config = ControllerConfig::default();
        let table = SpeedTable::default();

        let input = TickInput::new(-1.0, DT, Vec2::new(3.0, -1.0));
        let out = step(&scene, &body(), &input, &mut state, &config, &table);

        assert_eq!(out.facing, Direction::Left);
        assert_eq!(state.facing, Direction::Left);
        assert_eq!(state.previous_velocity, Vec2::new(3.0, -1.0));
        assert_eq!(state.action, Action::Normal);
        assert_eq!(state.grabbed_object, None);
    }

    #[test]
    fn airborne_tick_sets_gravity() {
        let scene = ObstacleScene::new();
        let mut state = LocomotionState::new();
        let config = ControllerConfig::default().with_gravity(2.0, 3.0);

        let out = step(
            &scene,
            &body(),
            &TickInput::new(0.0, DT, Vec2::new(0.0, -4.0)),
            &mut state,
            &config,
            &SpeedTable::default(),
        );

        assert_eq!(out.gravity_scale, Some(3.0));
        assert_eq!(out.velocity.y, -4.0);
        assert!(!state.was_grounded);
        assert!(!state.moving);
    }

    #[test]
    fn run_tick_uses_given_surroundings() {
        let mut state = LocomotionState::new();
        let out = run_tick(
            &TickInput::new(1.0, DT, Vec2::ZERO),
            &Surroundings::default(),
            &mut state,
            &ControllerConfig::default(),
            &SpeedTable::default(),
        );
        assert_eq!(out.action, Action::Normal);
        assert_eq!(out.velocity.x, 4.0);
        assert_eq!(out.object_translation, None);
        assert!(!out.bounced);
    }
}
