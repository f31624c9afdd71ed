//! # Engine State Module
//!
//! The core engine module that owns the simulated world and advances it one tick at a
//! time.
//!
//! ## Key Components
//!
//! * `Simulation` - The context object holding every piece of mutable engine state
//! * `camera_state` - Where the viewer looks
//! * `interaction` - Breaking and placing blocks, and the hotbar
//! * `physics` - Collision and the movement integrator
//! * `rendering` - The backend seam chunks draw through
//! * `voxels` - Blocks, chunks, terrain generation and streaming
//!
//! ## Architecture
//!
//! The host owns a [`RenderBackend`] and a [`Simulation`], and calls
//! [`Simulation::tick`] once per frame with the elapsed time and the frame's
//! [`PlayerActions`]. A tick runs in a fixed order:
//!
//! 1. Apply look deltas and hotbar selection
//! 2. Step the movement integrator against the loaded voxels
//! 3. Stream chunks around the committed position, at most once per update interval
//! 4. Break or place through the ray from the centre of the view
//!
//! Nothing in the engine blocks or spawns threads; chunk construction runs inline
//! during the streaming step.

use cgmath::Point3;
use web_time::{Duration, Instant};
use winit::{event::MouseButton, keyboard::KeyCode};

use camera_state::Camera;
use interaction::{Hotbar, PlaceError, HOTBAR_BLOCKS};
use physics::{MovementInput, MovementIntegrator, ViewerBody};
use rendering::RenderBackend;
use voxels::raycast::RayHit;
use voxels::streaming::StreamingThrottle;
use voxels::world::{StreamingReport, World};

use crate::application_state::input_state::ProcessedInputState;
use crate::config::{ConfigError, EngineConfig, InteractionConfig};

pub mod camera_state;
pub mod interaction;
pub mod physics;
pub mod rendering;
pub mod voxels;

/// Keys selecting hotbar slots, in slot order.
const HOTBAR_KEYS: [KeyCode; HOTBAR_BLOCKS.len()] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
];

/// Represents player actions derived from input
///
/// Movement flags are active while their key is down; everything else fires only on
/// the frame its key or button goes down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerActions {
    /// Movement actions - true if key is pressed or held
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,

    /// Mouse movement since the last frame
    pub look: Option<(f64, f64)>,

    /// Hotbar slot chosen this frame
    pub select_slot: Option<usize>,
    pub break_block: bool,
    pub place_block: bool,
}

impl PlayerActions {
    /// Translates a frame of processed input into player actions.
    ///
    /// WASD and the arrow keys move, Space jumps, 1 to 5 select a hotbar slot, the left
    /// mouse button breaks and the right one places.
    pub fn from_input(input: &ProcessedInputState) -> Self {
        let active = |a: KeyCode, b: KeyCode| input.get_key_state(a).is_active() || input.get_key_state(b).is_active();

        let mut actions = PlayerActions {
            move_forward: active(KeyCode::KeyW, KeyCode::ArrowUp),
            move_backward: active(KeyCode::KeyS, KeyCode::ArrowDown),
            move_left: active(KeyCode::KeyA, KeyCode::ArrowLeft),
            move_right: active(KeyCode::KeyD, KeyCode::ArrowRight),
            jump: input.get_key_state(KeyCode::Space).is_just_pressed(),
            look: input.get_mouse_delta(),
            select_slot: None,
            break_block: input.get_mouse_button_state(MouseButton::Left).is_just_pressed(),
            place_block: input.get_mouse_button_state(MouseButton::Right).is_just_pressed(),
        };

        // Lowest digit wins when several go down together
        actions.select_slot = HOTBAR_KEYS
            .iter()
            .position(|key| input.get_key_state(*key).is_just_pressed());

        actions
    }
}

/// What a single tick changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Result of the streaming pass, if the throttle allowed one.
    pub streaming: Option<StreamingReport>,
    /// Voxel removed by a break action.
    pub broken: Option<Point3<i32>>,
    /// Outcome of a place action that had a block to place against.
    pub placed: Option<Result<Point3<i32>, PlaceError>>,
}

/// Every piece of mutable engine state, owned in one place.
///
/// # Examples
///
/// ```
/// use voxel_verse::config::EngineConfig;
/// use voxel_verse::engine_state::rendering::HeadlessRenderer;
/// use voxel_verse::engine_state::{PlayerActions, Simulation};
/// use web_time::Instant;
///
/// let mut renderer = HeadlessRenderer::new();
/// let mut simulation = Simulation::new(EngineConfig::default(), &mut renderer).unwrap();
///
/// simulation.tick(&mut renderer, 1.0 / 60.0, &PlayerActions::default(), Instant::now());
/// simulation.shutdown(&mut renderer);
/// assert_eq!(renderer.stats().live_batches(), 0);
/// ```
pub struct Simulation<B> {
    /// The voxel world containing all loaded chunks
    pub world: World<B>,
    /// The viewer's position, velocity and grounded state
    pub body: ViewerBody,
    /// Where the viewer looks
    pub camera: Camera,
    /// Block type used by place actions
    pub hotbar: Hotbar,
    integrator: MovementIntegrator,
    throttle: StreamingThrottle,
    interaction: InteractionConfig,
}

impl<B> Simulation<B> {
    /// Validates `config`, spawns the viewer and loads the chunks around the spawn point.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration
    /// * `renderer` - Backend the chunk batches are created in
    ///
    /// # Returns
    ///
    /// The simulation, or the first configuration value out of range
    pub fn new<R>(config: EngineConfig, renderer: &mut R) -> Result<Self, ConfigError>
    where
        R: RenderBackend<Batch = B>,
    {
        config.validate()?;
        let EngineConfig {
            world: world_config,
            physics,
            interaction,
        } = config;

        let throttle = StreamingThrottle::new(Duration::from_millis(world_config.streaming.update_interval_ms));
        let integrator = MovementIntegrator::new(physics);
        let body = ViewerBody::at(integrator.spawn());

        let mut world = World::new(world_config)?;
        let report = world.update_chunks(renderer, body.position.x, body.position.z);
        log::info!(
            "simulation started at ({:.1}, {:.1}, {:.1}) with {} chunks",
            body.position.x,
            body.position.y,
            body.position.z,
            report.loaded
        );

        Ok(Self {
            world,
            body,
            camera: Camera::new(interaction.mouse_sensitivity),
            hotbar: Hotbar::default(),
            integrator,
            throttle,
            interaction,
        })
    }

    /// The movement integrator and its constants.
    pub fn integrator(&self) -> &MovementIntegrator {
        &self.integrator
    }

    /// The voxel under the centre of the view, within reach.
    pub fn target(&self) -> Option<RayHit> {
        let eye = self.camera.eye(&self.body);
        self.world
            .raycast(eye, self.camera.view_direction(), self.interaction.reach)
    }

    /// Advances the simulation by one frame.
    ///
    /// # Arguments
    ///
    /// * `renderer` - Backend of the world's chunk batches
    /// * `dt` - Seconds since the previous tick
    /// * `actions` - This frame's player actions
    /// * `now` - Current time, used to throttle streaming
    pub fn tick<R>(&mut self, renderer: &mut R, dt: f32, actions: &PlayerActions, now: Instant) -> TickReport
    where
        R: RenderBackend<Batch = B>,
    {
        let mut report = TickReport::default();

        if let Some((dx, dy)) = actions.look {
            self.camera.apply_mouse_delta(dx, dy);
        }
        if let Some(slot) = actions.select_slot {
            self.hotbar.select(slot);
        }

        let input = MovementInput {
            forward: actions.move_forward,
            backward: actions.move_backward,
            left: actions.move_left,
            right: actions.move_right,
            jump: actions.jump,
            yaw: self.camera.yaw.0,
        };
        self.body = self.integrator.step(self.body, dt, &input, &self.world);

        if self.throttle.ready(now) {
            report.streaming = Some(self.world.update_chunks(renderer, self.body.position.x, self.body.position.z));
        }

        if actions.break_block {
            if let Some(hit) = self.target() {
                if interaction::break_block(&mut self.world, renderer, &hit) {
                    report.broken = Some(hit.voxel);
                }
            }
        }
        if actions.place_block {
            if let Some(hit) = self.target() {
                let placed = interaction::place_block(
                    &mut self.world,
                    renderer,
                    &hit,
                    &self.body,
                    self.hotbar.selected(),
                    self.integrator.bounds(),
                );
                if let Err(error) = &placed {
                    log::debug!("place rejected: {}", error);
                }
                report.placed = Some(placed);
            }
        }

        report
    }

    /// Disposes every loaded chunk.
    pub fn shutdown<R>(&mut self, renderer: &mut R)
    where
        R: RenderBackend<Batch = B>,
    {
        self.world.dispose_all(renderer);
        self.throttle.reset();
        log::info!(
            "simulation shut down after {} chunk constructions",
            self.world.stats().constructed
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::application_state::input_state::RawInputState;
    use crate::config::TerrainMode;
    use crate::engine_state::physics::MotionState;
    use crate::engine_state::rendering::headless::HeadlessBatch;
    use crate::engine_state::rendering::HeadlessRenderer;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::VoxelQuery;

    const DT: f32 = 1.0 / 60.0;

    fn flat_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.world.streaming.render_distance = 1;
        config.world.terrain.mode = TerrainMode::Flat {
            height: 0,
            block: BlockType::Grass,
        };
        config.physics.spawn = [0.0, 3.0, 0.0];
        config
    }

    fn settle(simulation: &mut Simulation<HeadlessBatch>, renderer: &mut HeadlessRenderer, start: Instant) -> Instant {
        let mut now = start;
        for _ in 0..120 {
            now += Duration::from_secs_f32(DT);
            simulation.tick(renderer, DT, &PlayerActions::default(), now);
        }
        now
    }

    fn input(keys: &[(KeyCode, RawInputState)], buttons: &[(MouseButton, RawInputState)]) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys.iter().copied().collect::<HashMap<_, _>>(),
            mouse_button_states: buttons.iter().copied().collect::<HashMap<_, _>>(),
            mouse_delta: Some((4.0, -2.0)),
        }
    }

    #[test]
    fn translates_processed_input() {
        let state = input(
            &[
                (KeyCode::KeyW, RawInputState::Held),
                (KeyCode::ArrowLeft, RawInputState::Pressed),
                (KeyCode::Space, RawInputState::Held),
                (KeyCode::Digit4, RawInputState::Pressed),
            ],
            &[(MouseButton::Right, RawInputState::Pressed), (MouseButton::Left, RawInputState::Held)],
        );
        let actions = PlayerActions::from_input(&state);

        assert!(actions.move_forward);
        assert!(actions.move_left);
        assert!(!actions.move_backward);
        assert!(!actions.move_right);
        assert!(!actions.jump);
        assert_eq!(actions.select_slot, Some(3));
        assert!(actions.place_block);
        assert!(!actions.break_block);
        assert_eq!(actions.look, Some((4.0, -2.0)));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut renderer = HeadlessRenderer::new();
        let mut config = EngineConfig::default();
        config.physics.sub_steps = 0;
        assert!(Simulation::new(config, &mut renderer).is_err());
        assert_eq!(renderer.stats().created, 0);
    }

    #[test]
    fn lands_and_stands_on_flat_ground() {
        let mut renderer = HeadlessRenderer::new();
        let mut simulation = Simulation::new(flat_config(), &mut renderer).unwrap();
        assert_eq!(simulation.world.chunk_count(), 9);

        settle(&mut simulation, &mut renderer, Instant::now());
        assert_eq!(simulation.body.motion, MotionState::Grounded);
        let feet = simulation.integrator().bounds().feet(simulation.body.position.y);
        assert!(feet > 0.45 && feet < 0.6, "feet at {}", feet);

        simulation.shutdown(&mut renderer);
        assert_eq!(renderer.stats().live_batches(), 0);
    }

    #[test]
    fn breaks_and_places_under_the_crosshair() {
        let mut renderer = HeadlessRenderer::new();
        let mut simulation = Simulation::new(flat_config(), &mut renderer).unwrap();
        let now = settle(&mut simulation, &mut renderer, Instant::now());

        // Look steeply down at the ground just ahead
        simulation.camera.apply_mouse_delta(0.0, 600.0);
        let look_down = simulation.camera;
        let target = simulation.target().unwrap();
        assert_eq!(target.voxel.y, 0);

        let broken = simulation.tick(
            &mut renderer,
            DT,
            &PlayerActions {
                break_block: true,
                ..PlayerActions::default()
            },
            now + Duration::from_millis(16),
        );
        assert_eq!(broken.broken, Some(target.voxel));
        assert_eq!(simulation.world.block_at(target.voxel.x, 0, target.voxel.z), None);
        assert_eq!(simulation.camera, look_down);

        simulation.shutdown(&mut renderer);
    }

    #[test]
    fn placing_next_to_the_viewer_uses_the_hotbar() {
        let mut renderer = HeadlessRenderer::new();
        let mut simulation = Simulation::new(flat_config(), &mut renderer).unwrap();
        let now = settle(&mut simulation, &mut renderer, Instant::now());

        simulation.world.set_block_at(&mut renderer, 0, 2, -2, Some(BlockType::Stone));

        let report = simulation.tick(
            &mut renderer,
            DT,
            &PlayerActions {
                place_block: true,
                select_slot: Some(2),
                ..PlayerActions::default()
            },
            now + Duration::from_millis(16),
        );
        assert_eq!(simulation.hotbar.selected(), BlockType::Stone);
        assert_eq!(report.placed, Some(Ok(Point3::new(0, 2, -1))));
        assert_eq!(simulation.world.block_at(0, 2, -1), Some(BlockType::Stone));

        // The viewer's own cell is never filled
        let blocked = simulation.tick(
            &mut renderer,
            DT,
            &PlayerActions {
                place_block: true,
                ..PlayerActions::default()
            },
            now + Duration::from_millis(32),
        );
        assert_eq!(blocked.placed, Some(Err(PlaceError::IntersectsViewer(0, 2, 0))));

        simulation.shutdown(&mut renderer);
    }

    #[test]
    fn streaming_is_throttled() {
        let mut renderer = HeadlessRenderer::new();
        let mut simulation = Simulation::new(flat_config(), &mut renderer).unwrap();
        let start = Instant::now();

        let first = simulation.tick(&mut renderer, DT, &PlayerActions::default(), start);
        assert_eq!(first.streaming, Some(StreamingReport::default()));
        let second = simulation.tick(&mut renderer, DT, &PlayerActions::default(), start + Duration::from_millis(50));
        assert_eq!(second.streaming, None);
        let third = simulation.tick(&mut renderer, DT, &PlayerActions::default(), start + Duration::from_millis(250));
        assert!(third.streaming.is_some());

        simulation.shutdown(&mut renderer);
    }
}
