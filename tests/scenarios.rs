//! Headless locomotion scenarios.
//!
//! Each test drives the full tick pipeline through [`step`] against an
//! [`ObstacleScene`], with no physics engine involved.

use bevy::prelude::*;
use surface_tension::config::BodyBox;
use surface_tension::prelude::*;
use surface_tension::sensor::sense_surroundings;
use surface_tension::state::Direction;

const DT: f32 = 1.0 / 50.0;

/// 1x2 character at the origin, feet at y = -1.
fn body() -> BodyBox {
    BodyBox::new(Vec2::ZERO, Vec2::new(1.0, 2.0), 0.0)
}

/// Same character well above any floor.
fn body_in_air() -> BodyBox {
    BodyBox::new(Vec2::new(0.0, 6.0), Vec2::new(1.0, 2.0), 0.0)
}

fn floor(scene: &mut ObstacleScene, material: MaterialKind) -> Entity {
    scene.add_terrain(Rect::new(-10.0, -2.0, 10.0, -1.02), Terrain::Ground, material)
}

/// Crate resting on the floor just right of the character.
fn crate_right(scene: &mut ObstacleScene) -> Entity {
    scene.add_movable(Rect::new(0.52, -1.02, 1.52, -0.02))
}

struct Runner {
    scene: ObstacleScene,
    state: LocomotionState,
    config: ControllerConfig,
    table: SpeedTable,
}

impl Runner {
    fn new(scene: ObstacleScene) -> Self {
        Self {
            scene,
            state: LocomotionState::new(),
            config: ControllerConfig::default(),
            table: SpeedTable::default(),
        }
    }

    fn step(&mut self, body: &BodyBox, input: TickInput) -> TickOutput {
        let out = step(
            &self.scene,
            body,
            &input,
            &mut self.state,
            &self.config,
            &self.table,
        );
        if let Some(translation) = out.object_translation {
            self.scene.translate(translation.entity, translation.delta);
        }
        out
    }
}

fn input(horizontal: f32, velocity: Vec2) -> TickInput {
    TickInput::new(horizontal, DT, velocity)
}

// ==================== Classification ====================

mod classification {
    use super::*;

    fn scenes() -> Vec<ObstacleScene> {
        let mut scenes = Vec::new();

        scenes.push(ObstacleScene::new());

        let mut s = ObstacleScene::new();
        floor(&mut s, MaterialKind::None);
        scenes.push(s);

        let mut s = ObstacleScene::new();
        floor(&mut s, MaterialKind::Slip);
        crate_right(&mut s);
        scenes.push(s);

        let mut s = ObstacleScene::new();
        floor(&mut s, MaterialKind::Stick);
        crate_right(&mut s);
        s.add_terrain(Rect::new(1.54, -1.02, 3.0, 3.0), Terrain::Ground, MaterialKind::None);
        scenes.push(s);

        let mut s = ObstacleScene::new();
        floor(&mut s, MaterialKind::Bounce);
        s.add_terrain(Rect::new(0.52, -1.02, 2.0, 0.5), Terrain::Slope, MaterialKind::None);
        s.add_terrain(Rect::new(-2.0, -1.02, -0.52, 3.0), Terrain::Ground, MaterialKind::None);
        scenes.push(s);

        scenes
    }

    #[test]
    fn grabbed_object_iff_push_or_pull() {
        for scene in scenes() {
            for horizontal in [-1.0, -0.5, 0.0, 0.5, 1.0] {
                for grab in [false, true] {
                    let mut runner = Runner::new(scene.clone());
                    for _ in 0..3 {
                        let out = runner.step(&body(), input(horizontal, Vec2::ZERO).with_grab(grab));
                        let state = &runner.state;

                        assert_eq!(out.action, state.action);
                        assert_eq!(
                            state.grabbed_object.is_some(),
                            state.action.grabs(),
                            "action {:?} grabbed {:?}",
                            state.action,
                            state.grabbed_object
                        );
                        if state.object_against_wall {
                            assert_eq!(state.action, Action::Pushing);
                        }
                        if out.object_translation.is_some() {
                            assert!(state.action.grabs());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn missing_hits_resolve_to_normal() {
        let mut runner = Runner::new(ObstacleScene::new());
        let out = runner.step(&body(), input(1.0, Vec2::ZERO).with_grab(true));
        assert_eq!(out.action, Action::Normal);
        assert_eq!(runner.state.grabbed_object, None);
    }

    #[test]
    fn slope_preempts_wall() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Slip);
        scene.add_terrain(Rect::new(0.52, -1.02, 2.0, 0.5), Terrain::Slope, MaterialKind::None);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(1.0, Vec2::ZERO));
        assert_eq!(out.action, Action::UpSlope);
        assert_eq!(out.velocity.x, 6.5);
    }

    #[test]
    fn ungrabbed_crate_blocks_like_a_wall() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::None);
        crate_right(&mut scene);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(1.0, Vec2::ZERO));
        assert_eq!(out.action, Action::AgainstWall);
        assert_eq!(out.velocity.x, 0.0);
        assert_eq!(out.object_translation, None);
    }
}

// ==================== Facing ====================

mod facing {
    use super::*;

    #[test]
    fn first_tick_faces_right() {
        let mut runner = Runner::new(ObstacleScene::new());
        let out = runner.step(&body(), input(0.0, Vec2::ZERO));
        assert_eq!(out.facing, Direction::Right);
    }

    #[test]
    fn facing_held_through_idle_ticks() {
        let mut runner = Runner::new(ObstacleScene::new());
        runner.step(&body(), input(-1.0, Vec2::ZERO));

        for _ in 0..20 {
            let out = runner.step(&body(), input(0.0, Vec2::ZERO));
            assert_eq!(out.facing, Direction::Left);
        }
        assert!(runner.state.flip_x());

        let out = runner.step(&body(), input(0.3, Vec2::ZERO));
        assert_eq!(out.facing, Direction::Right);
    }
}

// ==================== Horizontal ====================

mod horizontal {
    use super::*;

    #[test]
    fn against_wall_is_zero_on_every_material() {
        for material in MaterialKind::ALL {
            let mut scene = ObstacleScene::new();
            floor(&mut scene, material);
            scene.add_terrain(Rect::new(0.52, -1.02, 2.0, 3.0), Terrain::Ground, MaterialKind::None);
            let mut runner = Runner::new(scene);

            let out = runner.step(&body(), input(1.0, Vec2::ZERO));
            assert_eq!(out.action, Action::AgainstWall, "material {material:?}");
            assert_eq!(out.velocity.x, 0.0, "material {material:?}");
            assert!(!runner.state.moving);
        }
    }

    #[test]
    fn slip_floor_normal_runs_at_eight() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Slip);
        let mut runner = Runner::new(scene);

        for _ in 0..3 {
            let out = runner.step(&body(), input(1.0, Vec2::ZERO));
            assert_eq!(out.action, Action::Normal);
            assert_eq!(out.velocity.x, 8.0);
        }
    }

    #[test]
    fn partial_input_runs_at_full_speed() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Slip);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(0.5, Vec2::ZERO));
        assert_eq!(out.velocity.x, 8.0);
        let out = runner.step(&body(), input(-0.2, Vec2::ZERO));
        assert_eq!(out.velocity.x, -8.0);
        assert_eq!(out.facing, Direction::Left);
    }

    #[test]
    fn wall_beats_bounce_carry() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Bounce);
        scene.add_terrain(Rect::new(0.52, -1.02, 2.0, 3.0), Terrain::Ground, MaterialKind::None);
        let mut runner = Runner::new(scene);

        runner.step(&body_in_air(), input(1.0, Vec2::new(8.0, -10.0)));
        let out = runner.step(&body(), input(1.0, Vec2::new(8.0, -10.0)));

        assert!(out.bounced);
        assert_eq!(out.action, Action::AgainstWall);
        assert_eq!(out.velocity.x, 0.0);
        assert!(!runner.state.maintain_velocity);
    }

    #[test]
    fn material_switch_takes_effect_next_tick() {
        let mut scene = ObstacleScene::new();
        let ground = floor(&mut scene, MaterialKind::Slip);
        let mut runner = Runner::new(scene);

        assert_eq!(runner.step(&body(), input(1.0, Vec2::ZERO)).velocity.x, 8.0);
        runner.scene.set_material(ground, MaterialKind::Stick);
        assert_eq!(runner.step(&body(), input(1.0, Vec2::ZERO)).velocity.x, 2.0);
        assert_eq!(runner.state.last_ground_material, MaterialKind::Stick);
    }

    #[test]
    fn push_moves_crate_at_push_speed() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Slip);
        let crate_ = crate_right(&mut scene);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(1.0, Vec2::ZERO).with_grab(true));

        assert_eq!(out.action, Action::Pushing);
        assert_eq!(out.velocity.x, 5.5);
        assert_eq!(runner.state.grabbed_object, Some(crate_));
        let translation = out.object_translation.unwrap();
        assert_eq!(translation.entity, crate_);
        assert!((translation.delta - 5.5 * DT).abs() < 1e-6);

        let rect = runner.scene.rect(crate_).unwrap();
        assert!((rect.min.x - (0.52 + 5.5 * DT)).abs() < 1e-5);
    }

    #[test]
    fn pinned_crate_keeps_push_but_does_not_move() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::None);
        let crate_ = crate_right(&mut scene);
        scene.add_terrain(Rect::new(1.54, -1.02, 3.0, 3.0), Terrain::Ground, MaterialKind::None);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(1.0, Vec2::ZERO).with_grab(true));

        assert_eq!(out.action, Action::Pushing);
        assert!(runner.state.object_against_wall);
        assert_eq!(out.velocity.x, 1.5);
        assert_eq!(out.object_translation, None);
        assert_eq!(runner.scene.rect(crate_).unwrap().min.x, 0.52);
    }

    #[test]
    fn pull_drags_crate_behind() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Slip);
        let crate_ = crate_right(&mut scene);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(-1.0, Vec2::ZERO).with_grab(true));

        assert_eq!(out.action, Action::Pulling);
        assert_eq!(out.facing, Direction::Left);
        assert_eq!(out.velocity.x, -5.5);
        let translation = out.object_translation.unwrap();
        assert_eq!(translation.entity, crate_);
        assert!((translation.delta + 5.5 * DT).abs() < 1e-6);
    }

    #[test]
    fn pull_blocked_ahead_leaves_crate() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::None);
        crate_right(&mut scene);
        scene.add_terrain(Rect::new(-2.0, -1.02, -0.52, 3.0), Terrain::Ground, MaterialKind::None);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(-1.0, Vec2::ZERO).with_grab(true));

        assert_eq!(out.action, Action::Pulling);
        assert_eq!(out.object_translation, None);
    }
}

// ==================== Vertical ====================

mod vertical {
    use super::*;

    #[test]
    fn bounce_rebound_matches_gravity_ratio() {
        for impact in [4.5_f32, 8.0, 12.0, 20.0] {
            let mut scene = ObstacleScene::new();
            floor(&mut scene, MaterialKind::Bounce);
            let mut runner = Runner::new(scene);
            let config = runner.config;

            // Falling through the air last tick
            runner.step(&body_in_air(), input(0.0, Vec2::new(0.0, -impact)));
            let out = runner.step(&body(), input(0.0, Vec2::new(0.0, -impact - 0.5)));

            let expected =
                (config.up_gravity * impact * impact / config.down_gravity).sqrt() + 1.0;
            assert!(out.bounced, "impact {impact}");
            assert!(
                (out.velocity.y - expected).abs() < 1e-4,
                "impact {impact}: got {} expected {expected}",
                out.velocity.y
            );
        }
    }

    #[test]
    fn gentle_landing_does_not_bounce() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Bounce);
        let mut runner = Runner::new(scene);

        runner.step(&body_in_air(), input(0.0, Vec2::new(0.0, -3.0)));
        let out = runner.step(&body(), input(0.0, Vec2::new(0.0, -3.0)));

        assert!(!out.bounced);
        assert_eq!(out.velocity.y, -3.0);
    }

    #[test]
    fn bounce_carries_horizontal_speed() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Bounce);
        let mut runner = Runner::new(scene);

        // Launched off a fast surface, then landing on bounce
        runner.step(&body_in_air(), input(1.0, Vec2::new(8.0, -10.0)));
        let out = runner.step(&body(), input(1.0, Vec2::new(8.0, -10.0)));
        assert!(out.bounced);
        assert_eq!(out.velocity.x, 8.0);
        assert!(runner.state.maintain_velocity);

        // Still carried while airborne over the bounce surface
        let out = runner.step(&body_in_air(), input(1.0, Vec2::new(8.0, 9.0)));
        assert_eq!(out.velocity.x, 8.0);

        // Once the carried speed has dropped below the surface speed the flag clears
        runner.step(&body_in_air(), input(1.0, Vec2::new(3.0, 6.0)));
        let out = runner.step(&body_in_air(), input(1.0, Vec2::new(3.0, 4.0)));
        assert_eq!(out.velocity.x, 4.0);
        assert!(!runner.state.maintain_velocity);
    }

    #[test]
    fn wedged_character_is_dislodged() {
        let mut scene = ObstacleScene::new();
        scene.add_terrain(Rect::new(-2.0, -1.0, -0.52, 1.0), Terrain::Ground, MaterialKind::None);
        scene.add_movable(Rect::new(0.52, -1.0, 2.0, 1.0));
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(0.0, Vec2::ZERO));

        assert_eq!(out.velocity.y, -8.0);
        assert!(!runner.state.was_grounded);
    }

    #[test]
    fn wedged_but_falling_is_left_alone() {
        let mut scene = ObstacleScene::new();
        scene.add_terrain(Rect::new(-2.0, -1.0, -0.52, 1.0), Terrain::Ground, MaterialKind::None);
        scene.add_terrain(Rect::new(0.52, -1.0, 2.0, 1.0), Terrain::Slope, MaterialKind::None);
        let mut runner = Runner::new(scene);

        let out = runner.step(&body(), input(0.0, Vec2::new(0.0, -2.0)));
        assert_eq!(out.velocity.y, -2.0);
    }

    #[test]
    fn jump_on_bounce_is_boosted() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Bounce);
        let mut runner = Runner::new(scene);
        let max = runner.config.max_height_velocity;

        let out = runner.step(
            &body(),
            input(0.0, Vec2::ZERO).with_jump(JumpRequest::max_jump()),
        );

        assert!((out.velocity.y - 1.4 * max).abs() < 1e-5);
    }

    #[test]
    fn jump_on_plain_ground_uses_max_velocity() {
        let mut scene = ObstacleScene::new();
        floor(&mut scene, MaterialKind::Stick);
        let mut runner = Runner::new(scene);

        let out = runner.step(
            &body(),
            input(0.0, Vec2::ZERO).with_jump(JumpRequest::max_jump()),
        );
        assert_eq!(out.velocity.y, runner.config.max_height_velocity);
    }

    #[test]
    fn jump_in_air_is_ignored() {
        let mut runner = Runner::new(ObstacleScene::new());
        let out = runner.step(
            &body_in_air(),
            input(0.0, Vec2::new(0.0, -1.0)).with_jump(JumpRequest::max_jump()),
        );
        assert_eq!(out.velocity.y, -1.0);
    }

    #[test]
    fn release_cuts_rising_jump() {
        let mut runner = Runner::new(ObstacleScene::new());
        let min = runner.config.min_height_velocity;

        let out = runner.step(
            &body_in_air(),
            input(0.0, Vec2::new(0.0, 9.0)).with_jump(JumpRequest::min_jump()),
        );
        assert_eq!(out.velocity.y, min);

        // Already slower than the cut: unchanged
        let out = runner.step(
            &body_in_air(),
            input(0.0, Vec2::new(0.0, 2.0)).with_jump(JumpRequest::min_jump()),
        );
        assert_eq!(out.velocity.y, 2.0);
    }

    #[test]
    fn release_ignored_without_variable_height() {
        let mut runner = Runner::new(ObstacleScene::new());
        runner.config = runner.config.with_variable_jump_height(false);

        let out = runner.step(
            &body_in_air(),
            input(0.0, Vec2::new(0.0, 9.0)).with_jump(JumpRequest::min_jump()),
        );
        assert_eq!(out.velocity.y, 9.0);
    }

    #[test]
    fn gravity_scale_splits_on_direction() {
        let mut runner = Runner::new(ObstacleScene::new());
        runner.config = runner.config.with_gravity(2.0, 3.0);

        let rising = runner.step(&body_in_air(), input(0.0, Vec2::new(0.0, 3.0)));
        let apex = runner.step(&body_in_air(), input(0.0, Vec2::ZERO));
        let falling = runner.step(&body_in_air(), input(0.0, Vec2::new(0.0, -3.0)));

        assert_eq!(rising.gravity_scale, Some(2.0));
        assert_eq!(apex.gravity_scale, Some(1.0));
        assert_eq!(falling.gravity_scale, Some(3.0));
    }
}

// ==================== Sensor ====================

#[test]
fn sensing_twice_gives_identical_results() {
    let mut scene = ObstacleScene::new();
    floor(&mut scene, MaterialKind::Slip);
    crate_right(&mut scene);
    scene.add_terrain(Rect::new(-2.0, -1.02, -0.52, 3.0), Terrain::Slope, MaterialKind::None);
    let config = SensorConfig::default();

    for facing in [Direction::Left, Direction::Right] {
        for grab in [false, true] {
            let first = sense_surroundings(&scene, &body(), facing, grab, &config);
            let second = sense_surroundings(&scene, &body(), facing, grab, &config);
            assert_eq!(first, second);
        }
    }
}
