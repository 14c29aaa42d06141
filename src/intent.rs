//! Movement intent components.
//!
//! Intents carry raw input from the player (or AI, replay, network) into the
//! locomotion core. The core never polls devices; you write the current
//! button and axis state here every frame and the controller systems take it
//! from there.

use bevy::prelude::*;

/// Raw per-tick input for a character.
///
/// # Example
///
/// ```rust
/// use surface_tension::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_horizontal(1.0);
/// intent.set_grab(true);
/// assert!(intent.is_moving());
///
/// // Pressing jump while grounded latches a max-height jump
/// intent.set_jump_pressed(true);
/// intent.latch_jump(true);
/// let request = intent.take_jump_request();
/// assert!(request.pending_max_jump);
/// assert!(!intent.take_jump_request().any());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default, PartialEq)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Horizontal input (-1.0 = left, 1.0 = right).
    pub horizontal: f32,
    /// Whether the grab button is held.
    pub grab: bool,
    /// Whether the jump button is held.
    ///
    /// Set this every frame; the controller derives the press and release
    /// edges itself.
    pub jump_pressed: bool,
    /// Previous tick's `jump_pressed`, managed by the controller.
    pub(crate) jump_pressed_prev: bool,
    /// Jump edges latched since the last resolve.
    pub jump_request: JumpRequest,
}

impl MovementIntent {
    /// Create a new empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal input, clamped to [-1, 1].
    pub fn set_horizontal(&mut self, horizontal: f32) {
        self.horizontal = horizontal.clamp(-1.0, 1.0);
    }

    /// Set whether the grab button is held.
    pub fn set_grab(&mut self, held: bool) {
        self.grab = held;
    }

    /// Set whether the jump button is held.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Check if there is horizontal input.
    pub fn is_moving(&self) -> bool {
        self.horizontal != 0.0
    }

    /// Latch the jump edges for this tick.
    ///
    /// A press only counts while `grounded`; a release always counts. Edges
    /// accumulate until [`take_jump_request`](Self::take_jump_request).
    pub fn latch_jump(&mut self, grounded: bool) {
        let pressed = self.jump_pressed && !self.jump_pressed_prev;
        let released = !self.jump_pressed && self.jump_pressed_prev;

        if pressed && grounded {
            self.jump_request.pending_max_jump = true;
        }
        if released {
            self.jump_request.pending_min_jump = true;
        }
        self.jump_pressed_prev = self.jump_pressed;
    }

    /// Take and clear the latched jump edges.
    pub fn take_jump_request(&mut self) -> JumpRequest {
        std::mem::take(&mut self.jump_request)
    }
}

/// One-shot jump flags latched from button edges.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JumpRequest {
    /// Jump was pressed while grounded.
    pub pending_max_jump: bool,
    /// Jump was released.
    pub pending_min_jump: bool,
}

impl JumpRequest {
    /// A grounded jump press.
    pub fn max_jump() -> Self {
        Self {
            pending_max_jump: true,
            ..default()
        }
    }

    /// A jump release.
    pub fn min_jump() -> Self {
        Self {
            pending_min_jump: true,
            ..default()
        }
    }

    /// Whether any edge is pending.
    pub fn any(&self) -> bool {
        self.pending_max_jump || self.pending_min_jump
    }
}
