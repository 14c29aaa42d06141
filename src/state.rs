//! Locomotion state.
//!
//! [`LocomotionState`] is the per-character snapshot the animation and UI
//! collaborators read. The [`Grounded`]/[`Airborne`] markers are added and
//! removed automatically from the ground probe.

use bevy::prelude::*;

use crate::detection::Surroundings;
use crate::material::MaterialKind;

/// A probe or facing direction.
///
/// `Down` is only used for ground probes; a character never faces down.
/// [`Direction::sign`] gives the horizontal sign (-1 left, +1 right).
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Left,
    #[default]
    Right,
    Down,
}

impl Direction {
    /// Horizontal sign of the direction (0 for `Down`).
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
            Direction::Down => 0.0,
        }
    }

    /// The mirrored lateral direction. `Down` maps to itself.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Down,
        }
    }
}

/// Direction classified from one tick of horizontal input.
///
/// `Unset` means "no input this tick"; it never overwrites the facing.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heading {
    #[default]
    Unset,
    Left,
    Right,
}

impl Heading {
    /// Classify signed horizontal input.
    pub fn from_input(horizontal: f32) -> Self {
        if horizontal > 0.0 {
            Heading::Right
        } else if horizontal < 0.0 {
            Heading::Left
        } else {
            Heading::Unset
        }
    }

    /// Resolve against the previous facing, keeping it when unset.
    pub fn resolve(self, previous: Direction) -> Direction {
        match self {
            Heading::Left => Direction::Left,
            Heading::Right => Direction::Right,
            Heading::Unset => previous,
        }
    }
}

/// The mutually exclusive locomotion actions.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// Nothing blocks the character; it moves at the material's default speed.
    #[default]
    Normal,
    /// Pushing the object on the facing side.
    Pushing,
    /// Pulling the object on the opposite side.
    Pulling,
    /// Walking up a slope.
    UpSlope,
    /// Blocked in the facing direction.
    AgainstWall,
}

impl Action {
    /// Whether the action holds on to a grabbed object.
    #[inline]
    pub fn grabs(self) -> bool {
        matches!(self, Action::Pushing | Action::Pulling)
    }
}

/// Persistent per-character locomotion snapshot.
///
/// Everything here survives across ticks. Per-tick flags are rebuilt from
/// scratch every tick and only mirrored here for display.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct LocomotionState {
    /// Action resolved on the last tick.
    pub action: Action,
    /// Facing direction. Kept while horizontal input is zero.
    pub facing: Direction,
    /// Object pushed or pulled on the last tick. Valid for that tick only.
    pub grabbed_object: Option<Entity>,
    /// Whether the pushed object was pinned against terrain on the last tick.
    pub object_against_wall: bool,
    /// Whether input and horizontal velocity pointed the same way.
    pub moving: bool,
    /// Material of the last terrain the ground probe touched.
    pub last_ground_material: MaterialKind,
    /// Bounce-carry: keep a faster previous horizontal velocity.
    pub maintain_velocity: bool,
    /// Whether the ground probe hit on the last tick.
    pub was_grounded: bool,
    /// Velocity observed at the start of the last tick.
    pub previous_velocity: Vec2,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self {
            action: Action::Normal,
            facing: Direction::Right,
            grabbed_object: None,
            object_against_wall: false,
            moving: false,
            last_ground_material: MaterialKind::None,
            maintain_velocity: false,
            was_grounded: false,
            previous_velocity: Vec2::ZERO,
        }
    }
}

impl LocomotionState {
    /// Create a new state facing right.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the facing hysteresis for this tick's input.
    pub fn update_facing(&mut self, horizontal: f32) -> Direction {
        self.facing = Heading::from_input(horizontal).resolve(self.facing);
        self.facing
    }

    /// Remember the material of terrain underfoot.
    ///
    /// Keeps the previous value when airborne or standing on an object, so
    /// bounce detection still sees it after leaving the ground.
    pub fn record_ground(&mut self, surroundings: &Surroundings) {
        if let Some(material) = surroundings.ground_material() {
            self.last_ground_material = material;
        }
    }

    /// Whether a sprite should be mirrored horizontally.
    #[inline]
    pub fn flip_x(&self) -> bool {
        self.facing == Direction::Left
    }
}

/// Marker component indicating the ground probe hit this tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{ProbeHit, ProbeResult, SurfaceKind};

    #[test]
    fn direction_sign_and_opposite() {
        assert_eq!(Direction::Left.sign(), -1.0);
        assert_eq!(Direction::Right.sign(), 1.0);
        assert_eq!(Direction::Down.sign(), 0.0);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Down.opposite(), Direction::Down);
    }

    #[test]
    fn heading_from_input() {
        assert_eq!(Heading::from_input(0.3), Heading::Right);
        assert_eq!(Heading::from_input(-0.01), Heading::Left);
        assert_eq!(Heading::from_input(0.0), Heading::Unset);
    }

    #[test]
    fn unset_heading_keeps_previous() {
        assert_eq!(Heading::Unset.resolve(Direction::Left), Direction::Left);
        assert_eq!(Heading::Unset.resolve(Direction::Right), Direction::Right);
        assert_eq!(Heading::Right.resolve(Direction::Left), Direction::Right);
    }

    #[test]
    fn facing_defaults_to_right() {
        let state = LocomotionState::new();
        assert_eq!(state.facing, Direction::Right);
        assert!(!state.flip_x());
    }

    #[test]
    fn facing_survives_zero_input() {
        let mut state = LocomotionState::new();
        state.update_facing(-1.0);
        for _ in 0..10 {
            assert_eq!(state.update_facing(0.0), Direction::Left);
        }
        assert!(state.flip_x());
    }

    #[test]
    fn record_ground_keeps_material_when_airborne() {
        let mut state = LocomotionState::new();
        let mut surroundings = Surroundings {
            ground: ProbeResult::hit(ProbeHit::terrain(
                Entity::from_raw(1),
                SurfaceKind::Ground,
                MaterialKind::Bounce,
                0.0,
            )),
            ..default()
        };
        state.record_ground(&surroundings);
        assert_eq!(state.last_ground_material, MaterialKind::Bounce);

        surroundings.ground = ProbeResult::miss();
        state.record_ground(&surroundings);
        assert_eq!(state.last_ground_material, MaterialKind::Bounce);
    }

    #[test]
    fn only_push_and_pull_grab() {
        assert!(Action::Pushing.grabs());
        assert!(Action::Pulling.grabs());
        assert!(!Action::Normal.grabs());
        assert!(!Action::UpSlope.grabs());
        assert!(!Action::AgainstWall.grabs());
    }
}
