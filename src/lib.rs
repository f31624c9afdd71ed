//! # Voxel Verse
//!
//! The simulation core of an infinite, procedurally generated voxel world explored in
//! first person.
//!
//! This crate generates terrain from gradient noise, streams chunks in and out around
//! the viewer, moves the viewer through the world with gravity, jumping and box
//! collision, and breaks and places blocks under the crosshair. Drawing is delegated to
//! a [`RenderBackend`](engine_state::rendering::RenderBackend); a headless backend is
//! included.
//!
//! ## Key Modules
//!
//! * `application_state` - Input handling and the per-frame driver
//! * `config` - Tunable constants, loadable from JSON
//! * `engine_state` - The simulation: voxels, physics, camera, interaction and rendering seam
//!
//! ## Usage
//!
//! ```rust
//! use voxel_verse::application_state::ApplicationState;
//! use voxel_verse::config::EngineConfig;
//! use voxel_verse::engine_state::rendering::HeadlessRenderer;
//! use web_time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut app = ApplicationState::new(EngineConfig::default(), HeadlessRenderer::new(), start).unwrap();
//! app.frame(start + Duration::from_millis(16));
//! let renderer = app.shutdown();
//! assert_eq!(renderer.stats().live_batches(), 0);
//! ```

use std::path::PathBuf;

use application_state::ApplicationState;
use config::EngineConfig;
use engine_state::rendering::HeadlessRenderer;
use log::{debug, error, info};
use web_time::{Duration, Instant};
use winit::{event::MouseButton, keyboard::KeyCode};

pub mod application_state;
pub mod config;
pub mod engine_state;

/// Frames simulated by [`run`].
const DEMO_FRAMES: u32 = 600;
/// Frame length used by [`run`].
const DEMO_FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Initialises `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// The library never calls this itself; hosts and the demo binary do.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
}

/// Runs a scripted headless walk through the world.
///
/// Loads the configuration named by the first command line argument, if any, then walks
/// forward for ten simulated seconds while turning, jumping, placing and breaking
/// blocks. Finishes by disposing the world and checking that no render batches leaked.
pub fn run() {
    init_logging();
    info!("Logger initialized");

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                error!("{}: {}", path.display(), err);
                return;
            }
        },
        None => EngineConfig::default(),
    };

    let start = Instant::now();
    let mut app = match ApplicationState::new(config, HeadlessRenderer::new(), start) {
        Ok(app) => app,
        Err(err) => {
            error!("{}", err);
            return;
        }
    };

    app.input_manager.set_key(KeyCode::KeyW, true);
    for frame in 1..=DEMO_FRAMES {
        script_input(&mut app, frame);

        let report = app.frame(start + DEMO_FRAME_TIME * frame);
        if let Some(streaming) = report.streaming.filter(|streaming| !streaming.is_empty()) {
            debug!(
                "frame {}: {} chunks loaded, {} unloaded",
                frame, streaming.loaded, streaming.unloaded
            );
        }
        if let Some(voxel) = report.broken {
            info!("frame {}: broke block at {:?}", frame, voxel);
        }
        if let Some(placed) = report.placed {
            match placed {
                Ok(voxel) => info!("frame {}: placed block at {:?}", frame, voxel),
                Err(err) => info!("frame {}: {}", frame, err),
            }
        }

        if frame % 60 == 0 {
            let body = &app.simulation.body;
            info!(
                "t={:.1}s position=({:.2}, {:.2}, {:.2}) velocity=({:.2}, {:.2}, {:.2}) {:?}, {} chunks",
                (DEMO_FRAME_TIME * frame).as_secs_f32(),
                body.position.x,
                body.position.y,
                body.position.z,
                body.velocity.x,
                body.velocity.y,
                body.velocity.z,
                body.motion,
                app.simulation.world.chunk_count()
            );
        }
    }

    let renderer = app.shutdown();
    let stats = renderer.stats();
    if stats.live_batches() == 0 {
        info!("all {} render batches released", stats.created);
    } else {
        error!("{} render batches leaked", stats.live_batches());
    }
}

/// The demo's input script: turn slowly, jump every second and a half, pick stone, then
/// place and break a block while looking down.
fn script_input(app: &mut ApplicationState<HeadlessRenderer>, frame: u32) {
    let input = &mut app.input_manager;

    input.intake_mouse_motion((1.5, 0.0));
    input.set_key(KeyCode::Space, frame % 90 == 0);
    input.set_key(KeyCode::Digit3, frame == 200);

    match frame {
        450 => input.intake_mouse_motion((0.0, 500.0)),
        480 => input.set_mouse_button(MouseButton::Right, true),
        520 => input.set_mouse_button(MouseButton::Left, true),
        _ => {
            input.set_mouse_button(MouseButton::Right, false);
            input.set_mouse_button(MouseButton::Left, false);
        }
    }
    if frame == 450 {
        input.set_key(KeyCode::KeyW, false);
    }
}
