//! Vertical resolver: jumps, asymmetric gravity, bounce reflection and the
//! stuck safety valve.

use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::intent::JumpRequest;
use crate::locomotion::TickContext;
use crate::material::MaterialKind;
use crate::state::LocomotionState;

/// Result of the vertical resolver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalMotion {
    pub velocity_y: f32,
    /// Gravity scale to apply; `None` leaves it unchanged (grounded).
    pub gravity_scale: Option<f32>,
    pub bounced: bool,
    pub jumped: bool,
    pub dislodged: bool,
}

/// Whether this tick is a bounce landing.
///
/// Requires standing on bounce terrain now, having been airborne last tick,
/// and having fallen faster than `bounce_min_impact_speed` last tick.
pub fn is_bounce_landing(ctx: &TickContext, state: &LocomotionState, config: &ControllerConfig) -> bool {
    ctx.grounded
        && ctx.ground_material == Some(MaterialKind::Bounce)
        && !state.was_grounded
        && state.previous_velocity.y < -config.bounce_min_impact_speed
}

/// Whether the character is wedged mid-air between two obstacles.
pub fn is_stuck(ctx: &TickContext, velocity_y: f32, config: &ControllerConfig) -> bool {
    ctx.surroundings.wedged() && velocity_y.abs() <= config.stuck_velocity_epsilon && !ctx.grounded
}

/// Resolve vertical velocity and gravity scale for one tick.
///
/// Bounce reflection runs first so that a jump pressed on the landing tick
/// still wins. Sets `state.maintain_velocity` on a bounce.
pub fn resolve_vertical(
    ctx: &TickContext,
    jump: JumpRequest,
    velocity_y: f32,
    state: &mut LocomotionState,
    config: &ControllerConfig,
) -> VerticalMotion {
    let mut motion = VerticalMotion {
        velocity_y,
        ..default()
    };

    if is_bounce_landing(ctx, state, config) {
        let impact = -state.previous_velocity.y;
        motion.velocity_y = config.rebound_speed(impact);
        motion.bounced = true;
        state.maintain_velocity = true;
        debug!("bounce: impact {impact} rebound {}", motion.velocity_y);
    }

    if jump.pending_max_jump && ctx.grounded {
        let multiplier = if ctx.ground_material == Some(MaterialKind::Bounce) {
            config.bounce_jump_multiplier
        } else {
            1.0
        };
        motion.velocity_y = config.max_height_velocity * multiplier;
        motion.jumped = true;
        debug!("jump at {}", motion.velocity_y);
    } else if jump.pending_min_jump
        && config.variable_jump_height
        && motion.velocity_y > config.min_height_velocity
    {
        motion.velocity_y = config.min_height_velocity;
    }

    if !ctx.grounded {
        motion.gravity_scale = Some(config.gravity_scale_for(motion.velocity_y));
    }

    if is_stuck(ctx, motion.velocity_y, config) {
        motion.velocity_y = -config.stuck_dislodge_speed;
        motion.dislodged = true;
        debug!("wedged between obstacles, dislodging");
    }

    motion
}
