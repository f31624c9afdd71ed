//! # Application State Management
//!
//! Glue between a host event loop and the engine. The host forwards window and device
//! events as they arrive and calls [`ApplicationState::frame`] once per frame; the
//! application turns the collected input into player actions and ticks the simulation.
//!
//! The application owns the render backend, so the same driver runs against a real
//! renderer or the headless one used by the demo binary and the tests.

pub mod input_manager;
pub mod input_state;

use input_manager::InputManager;
use web_time::Instant;
use winit::event::{DeviceEvent, WindowEvent};

use crate::config::{ConfigError, EngineConfig};
use crate::engine_state::rendering::RenderBackend;
use crate::engine_state::{PlayerActions, Simulation, TickReport};

/// The running application: engine state, render backend and input handling.
pub struct ApplicationState<R: RenderBackend> {
    /// Backend the world's chunks are drawn with
    pub renderer: R,
    /// The core engine state and logic
    pub simulation: Simulation<R::Batch>,
    /// Manages input state and event processing
    pub input_manager: InputManager,
    /// Timestamp of the last frame for delta time calculations
    pub last_frame_time: Instant,
}

impl<R: RenderBackend> ApplicationState<R> {
    /// Starts the simulation with `config`, drawing through `renderer`.
    ///
    /// # Arguments
    /// * `config` - Engine configuration
    /// * `renderer` - The render backend to own
    /// * `now` - Time of the first frame
    pub fn new(config: EngineConfig, mut renderer: R, now: Instant) -> Result<Self, ConfigError> {
        let simulation = Simulation::new(config, &mut renderer)?;
        Ok(Self {
            renderer,
            simulation,
            input_manager: InputManager::new(),
            last_frame_time: now,
        })
    }

    /// Records a window event.
    pub fn window_event(&mut self, event: &WindowEvent) {
        self.input_manager.intake_input(event);
    }

    /// Records a device event. Only raw mouse motion is used.
    pub fn device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input_manager.intake_mouse_motion(*delta);
        }
    }

    /// Runs one frame with the input collected since the previous one.
    ///
    /// # Arguments
    /// * `now` - Current time; the tick's delta time is measured from the previous frame
    pub fn frame(&mut self, now: Instant) -> TickReport {
        let dt = now.saturating_duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let processed_input = self.input_manager.get_and_reset_processed_input();
        let actions = PlayerActions::from_input(&processed_input);
        self.simulation.tick(&mut self.renderer, dt, &actions, now)
    }

    /// Disposes the world and hands back the renderer.
    pub fn shutdown(mut self) -> R {
        self.simulation.shutdown(&mut self.renderer);
        self.renderer
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::engine_state::rendering::HeadlessRenderer;

    #[test]
    fn frames_turn_held_keys_into_movement() {
        let start = Instant::now();
        let mut config = EngineConfig::default();
        config.world.streaming.render_distance = 1;
        let mut app = ApplicationState::new(config, HeadlessRenderer::new(), start).unwrap();

        let before = app.simulation.body.position;
        app.input_manager.set_key(KeyCode::KeyW, true);
        for frame in 1..=10 {
            app.frame(start + Duration::from_millis(16 * frame));
        }
        let after = app.simulation.body.position;
        assert!(after.z < before.z);
        assert!(after.y < before.y);

        let renderer = app.shutdown();
        assert_eq!(renderer.stats().live_batches(), 0);
    }

    #[test]
    fn mouse_motion_turns_the_camera() {
        let start = Instant::now();
        let mut app = ApplicationState::new(EngineConfig::default(), HeadlessRenderer::new(), start).unwrap();

        app.device_event(&DeviceEvent::MouseMotion { delta: (100.0, 0.0) });
        app.frame(start + Duration::from_millis(16));
        assert!(app.simulation.camera.view_direction().x > 0.1);

        app.shutdown();
    }
}
