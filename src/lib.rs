//! # `surface_tension`
//!
//! Surface-aware 2D platformer locomotion with physics backend abstraction.
//!
//! This crate provides the movement core of a puzzle platformer in which the
//! material underfoot decides how the character moves:
//! - Five thin probes sense walls, slopes, movable objects and ground
//! - Each tick resolves to exactly one action (normal, pushing, pulling,
//!   walking up a slope, blocked by a wall)
//! - Horizontal speeds come from a per-material speed table
//! - Jumps use asymmetric gravity; bounce surfaces reflect hard landings
//! - A wedged mid-air character is dislodged automatically
//! - The physics engine is abstracted (Rapier2D included)
//!
//! ## Architecture
//!
//! The locomotion core in [`tick`] is a pure function of the sensed
//! surroundings, the per-character [`state::LocomotionState`] and the input.
//! Bevy systems run it once per fixed tick:
//! 1. **Input**: update facing, apply surface repaints
//! 2. **Sensors**: the backend casts the probes into [`detection::Surroundings`]
//! 3. **Resolve**: classify the action, resolve velocity and jumps
//! 4. **FinalApplication**: sync marker components
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use surface_tension::prelude::*;
//!
//! // Components for a playable character
//! let character = SurfaceCharacterBundle::new(ControllerConfig::player());
//! assert!(!character.state.flip_x());
//!
//! // Spawn together with a backend bundle and a cuboid collider
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod detection;
pub mod intent;
pub mod jump;
pub mod loader;
pub mod locomotion;
pub mod material;
pub mod scene;
pub mod sensor;
pub mod state;
pub mod systems;
pub mod tick;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterPhysicsBackend, KinematicBackend, KinematicBackendPlugin};
    pub use crate::collision::{Movable, Terrain};
    pub use crate::config::{ControllerConfig, ProbeBody, SensorConfig};
    pub use crate::detection::{SurfaceKind, Surroundings};
    pub use crate::intent::{JumpRequest, MovementIntent};
    pub use crate::material::{
        EquippedMaterial, MaterialKind, PaintAction, PaintSurface, SpeedTable, SurfaceMaterial,
        SurfaceSpeeds,
    };
    pub use crate::scene::ObstacleScene;
    pub use crate::sensor::ObstacleCaster;
    pub use crate::state::{Action, Airborne, Grounded, LocomotionState};
    pub use crate::tick::{step, TickInput, TickOutput};
    pub use crate::{SurfaceCharacterBundle, SurfaceControllerPlugin, SurfaceControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dCharacterBundle};
}

/// System sets for the controller's fixed-tick phases, run in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceControllerSet {
    /// Read intents, update facing, apply repaints.
    Input,
    /// Backend sensor systems fill in `Surroundings`.
    Sensors,
    /// Classify and resolve movement.
    Resolve,
    /// Post-resolve bookkeeping.
    FinalApplication,
}

/// Components every controlled character needs.
#[derive(Bundle, Default)]
pub struct SurfaceCharacterBundle {
    pub config: config::ControllerConfig,
    pub intent: intent::MovementIntent,
    pub state: state::LocomotionState,
    pub surroundings: detection::Surroundings,
    pub equipped: material::EquippedMaterial,
}

impl SurfaceCharacterBundle {
    pub fn new(config: config::ControllerConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }
}

/// Main plugin for the controller.
///
/// This plugin is generic over a physics backend `B` which applies the
/// resolved velocity and gravity scale and provides the sensor systems.
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use surface_tension::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(SurfaceControllerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct SurfaceControllerPlugin<B: backend::CharacterPhysicsBackend> {
    speed_table: material::SpeedTable,
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for SurfaceControllerPlugin<B> {
    fn default() -> Self {
        Self {
            speed_table: material::SpeedTable::default(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> SurfaceControllerPlugin<B> {
    /// Use a custom speed table instead of the default one.
    pub fn with_speed_table(mut self, table: material::SpeedTable) -> Self {
        self.speed_table = table;
        self
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for SurfaceControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::ControllerConfig>();
        app.register_type::<config::SensorConfig>();
        app.register_type::<config::ProbeBody>();
        app.register_type::<collision::Terrain>();
        app.register_type::<collision::Movable>();
        app.register_type::<material::SurfaceMaterial>();
        app.register_type::<material::EquippedMaterial>();
        app.register_type::<material::MaterialKind>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<intent::JumpRequest>();
        app.register_type::<state::LocomotionState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<detection::Surroundings>();

        app.add_event::<material::PaintSurface>();
        if !app.world().contains_resource::<material::SpeedTable>() {
            app.insert_resource(self.speed_table.clone());
        }

        app.configure_sets(
            FixedUpdate,
            (
                SurfaceControllerSet::Input,
                SurfaceControllerSet::Sensors,
                SurfaceControllerSet::Resolve,
                SurfaceControllerSet::FinalApplication,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (systems::update_facing, systems::apply_paint_requests)
                .in_set(SurfaceControllerSet::Input),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::record_ground_materials,
                systems::resolve_locomotion::<B>,
            )
                .chain()
                .in_set(SurfaceControllerSet::Resolve),
        );
        app.add_systems(
            FixedUpdate,
            systems::sync_state_markers.in_set(SurfaceControllerSet::FinalApplication),
        );
    }
}
