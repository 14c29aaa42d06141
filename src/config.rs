//! Controller configuration components.
//!
//! This module defines the tuning for the locomotion core: probe geometry,
//! jump velocities, asymmetric gravity, bounce reflection and the stuck
//! safety valve. Horizontal speeds live in the
//! [`SpeedTable`](crate::material::SpeedTable) since they depend on the
//! material underfoot.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned box the probes are cast from.
///
/// `half_extents` is the inner box; `edge_radius` is the rounded padding
/// around it (the full silhouette is `half_extents + edge_radius` on every
/// side).
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct BodyBox {
    /// World-space center.
    pub center: Vec2,
    /// Half of the inner box size.
    pub half_extents: Vec2,
    /// Padding around the inner box.
    pub edge_radius: f32,
}

impl BodyBox {
    /// Create a box from its center and full size.
    pub fn new(center: Vec2, size: Vec2, edge_radius: f32) -> Self {
        Self {
            center,
            half_extents: size / 2.0,
            edge_radius,
        }
    }

    /// Edge padding carved out of plain collider boxes.
    pub const SKIN: f32 = 0.04;

    /// Box whose full silhouette has the given half extents, with [`Self::SKIN`]
    /// of it treated as edge padding. Lateral probes then start just above
    /// whatever the box rests on.
    pub fn from_silhouette(center: Vec2, half_extents: Vec2) -> Self {
        let edge_radius = Self::SKIN.min(half_extents.x).min(half_extents.y);
        Self {
            center,
            half_extents: half_extents - Vec2::splat(edge_radius),
            edge_radius,
        }
    }

    /// Full inner size.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Y of the inner box bottom.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_extents.y
    }
}

/// Probe geometry for an entity, overriding what the backend would derive
/// from its collider.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ProbeBody {
    /// Half of the inner box size.
    pub half_extents: Vec2,
    /// Rounded padding around the inner box.
    pub edge_radius: f32,
}

impl ProbeBody {
    pub fn new(half_extents: Vec2, edge_radius: f32) -> Self {
        Self {
            half_extents,
            edge_radius,
        }
    }

    /// Place this body at a world position.
    pub fn at(&self, center: Vec2) -> BodyBox {
        BodyBox {
            center,
            half_extents: self.half_extents,
            edge_radius: self.edge_radius,
        }
    }
}

/// Probe lengths and offsets.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// Gap between the silhouette and the lateral probes.
    pub probe_epsilon: f32,
    /// Extra reach of the object probes while the grab button is held.
    pub grab_leniency: f32,
    /// How far below the silhouette the ground probe sweeps.
    pub ground_leniency: f32,
    /// Gap used when checking whether a grabbed object is pinned.
    pub object_probe_epsilon: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            probe_epsilon: 0.05,
            grab_leniency: 0.1,
            ground_leniency: 0.05,
            object_probe_epsilon: 0.03,
        }
    }
}

/// Configuration parameters for the locomotion core.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct ControllerConfig {
    // === Sensors ===
    pub sensor: SensorConfig,

    // === Jump Settings ===
    /// Vertical velocity applied on a grounded jump.
    pub max_height_velocity: f32,

    /// Rising velocity is clamped to this when jump is released early.
    pub min_height_velocity: f32,

    /// Whether releasing jump early shortens the jump.
    pub variable_jump_height: bool,

    /// Gravity scale while rising.
    pub up_gravity: f32,

    /// Gravity scale while falling.
    pub down_gravity: f32,

    // === Bounce Settings ===
    /// Jump velocity multiplier on bounce material.
    pub bounce_jump_multiplier: f32,

    /// Landing speed above which a bounce surface reflects the character.
    pub bounce_min_impact_speed: f32,

    /// Added to the computed rebound speed.
    pub bounce_rebound_bonus: f32,

    // === Stuck Settings ===
    /// Vertical speed below which a wedged character counts as stuck.
    pub stuck_velocity_epsilon: f32,

    /// Downward speed applied to dislodge a stuck character.
    pub stuck_dislodge_speed: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),

            max_height_velocity: 10.0,
            min_height_velocity: 4.0,
            variable_jump_height: true,
            up_gravity: 2.0,
            down_gravity: 3.0,

            bounce_jump_multiplier: 1.4,
            bounce_min_impact_speed: 4.0,
            bounce_rebound_bonus: 1.0,

            stuck_velocity_epsilon: 0.1,
            stuck_dislodge_speed: 8.0,
        }
    }
}

impl ControllerConfig {
    /// Create a config tuned for the player character.
    pub fn player() -> Self {
        Self {
            max_height_velocity: 12.0,
            min_height_velocity: 5.0,
            up_gravity: 2.5,
            down_gravity: 4.0,
            ..default()
        }
    }

    /// Builder: set jump velocities.
    pub fn with_jump(mut self, max_height_velocity: f32, min_height_velocity: f32) -> Self {
        self.max_height_velocity = max_height_velocity;
        self.min_height_velocity = min_height_velocity;
        self
    }

    /// Builder: enable or disable early jump release.
    pub fn with_variable_jump_height(mut self, enabled: bool) -> Self {
        self.variable_jump_height = enabled;
        self
    }

    /// Builder: set rising and falling gravity scales.
    pub fn with_gravity(mut self, up_gravity: f32, down_gravity: f32) -> Self {
        self.up_gravity = up_gravity;
        self.down_gravity = down_gravity;
        self
    }

    /// Builder: set the grab leniency.
    pub fn with_grab_leniency(mut self, leniency: f32) -> Self {
        self.sensor.grab_leniency = leniency;
        self
    }

    /// Builder: set the sensor configuration.
    pub fn with_sensor(mut self, sensor: SensorConfig) -> Self {
        self.sensor = sensor;
        self
    }

    /// Rebound speed for landing on a bounce surface at `impact_speed`.
    ///
    /// Under asymmetric gravity a fall from height `h` lands at
    /// `sqrt(2 g_down h)`; reaching `h` again needs `sqrt(2 g_up h)`.
    pub fn rebound_speed(&self, impact_speed: f32) -> f32 {
        (self.up_gravity * impact_speed * impact_speed / self.down_gravity).sqrt()
            + self.bounce_rebound_bonus
    }

    /// Gravity scale for an airborne vertical velocity.
    pub fn gravity_scale_for(&self, vertical_velocity: f32) -> f32 {
        if vertical_velocity > 0.0 {
            self.up_gravity
        } else if vertical_velocity < 0.0 {
            self.down_gravity
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_box_geometry() {
        let body = BodyBox::new(Vec2::new(1.0, 2.0), Vec2::new(1.0, 2.0), 0.1);
        assert_eq!(body.half_extents, Vec2::new(0.5, 1.0));
        assert_eq!(body.size(), Vec2::new(1.0, 2.0));
        assert_eq!(body.bottom(), 1.0);
    }

    #[test]
    fn probe_body_at() {
        let probe = ProbeBody::new(Vec2::new(0.5, 1.0), 0.02);
        let body = probe.at(Vec2::new(3.0, 4.0));
        assert_eq!(body.center, Vec2::new(3.0, 4.0));
        assert_eq!(body.half_extents, Vec2::new(0.5, 1.0));
        assert_eq!(body.edge_radius, 0.02);
    }

    #[test]
    fn default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.bounce_jump_multiplier, 1.4);
        assert_eq!(config.bounce_min_impact_speed, 4.0);
        assert_eq!(config.stuck_dislodge_speed, 8.0);
        assert!(config.variable_jump_height);
        assert!(config.down_gravity > config.up_gravity);
    }

    #[test]
    fn builders() {
        let config = ControllerConfig::default()
            .with_jump(15.0, 6.0)
            .with_gravity(1.5, 2.5)
            .with_grab_leniency(0.3)
            .with_variable_jump_height(false);

        assert_eq!(config.max_height_velocity, 15.0);
        assert_eq!(config.min_height_velocity, 6.0);
        assert_eq!(config.up_gravity, 1.5);
        assert_eq!(config.down_gravity, 2.5);
        assert_eq!(config.sensor.grab_leniency, 0.3);
        assert!(!config.variable_jump_height);
    }

    #[test]
    fn rebound_speed_follows_gravity_ratio() {
        let config = ControllerConfig::default().with_gravity(2.0, 8.0);
        // sqrt(2 * 100 / 8) + 1 = 5 + 1
        assert!((config.rebound_speed(10.0) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn gravity_scale_three_way_split() {
        let config = ControllerConfig::default().with_gravity(2.0, 3.0);
        assert_eq!(config.gravity_scale_for(1.0), 2.0);
        assert_eq!(config.gravity_scale_for(-1.0), 3.0);
        assert_eq!(config.gravity_scale_for(0.0), 1.0);
    }
}
