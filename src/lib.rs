#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! An infinite, procedurally generated voxel world: chunked block storage,
//! deterministic terrain, instanced cube meshes with hidden-block culling,
//! chunk streaming around the player, frustum culling, block edits with
//! falling sand, and a voxel raycaster for block targeting.
//!
//! ## Key Modules
//!
//! * `config` - Runtime settings loaded from JSON
//! * `engine_state` - The frame driver, player, camera, world and presenter seam
//!
//! ## Architecture
//!
//! The world never talks to a graphics API. Every chunk mesh is handed to a
//! [`engine_state::rendering::ChunkPresenter`], which owns whatever display
//! objects it creates. [`engine_state::rendering::HeadlessPresenter`] keeps
//! counts only, which is enough for tests and the bundled binary.
//!
//! ## Usage
//!
//! ```rust
//! use voxel_world::{config::WorldConfig, EngineState, HeadlessPresenter, PlayerAction};
//! use web_time::Duration;
//!
//! let config = WorldConfig { render_distance: 2, ..WorldConfig::default() };
//! let mut engine = EngineState::new(&config, HeadlessPresenter::new());
//! let walk = PlayerAction { move_forward: true, ..PlayerAction::default() };
//! engine.process_frame(Duration::from_millis(16), &walk);
//! println!("{}", engine.hud_line());
//! ```

use log::{error, info};
use web_time::{Duration, Instant};

pub mod config;
pub mod engine_state;

pub use config::{ConfigError, WorldConfig};
pub use engine_state::{
    rendering::{ChunkPresenter, HeadlessPresenter},
    BlockInteraction, EngineState, PlayerAction,
};

/// Frame step of the scripted session.
const SESSION_FRAME: Duration = Duration::from_millis(16);
/// Number of frames in the scripted session.
const SESSION_FRAMES: u32 = 600;

/// Initializes logging, loads configuration and drives a short headless session.
///
/// The config file is taken from the `VOXEL_WORLD_CONFIG` environment
/// variable, falling back to defaults. Log output goes to stdout and is
/// filtered by `RUST_LOG`.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match WorldConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return;
        }
    };

    let start = Instant::now();
    let mut engine = EngineState::new(&config, HeadlessPresenter::new());
    info!("World primed in {:?}", start.elapsed());

    for frame in 0..SESSION_FRAMES {
        engine.process_frame(SESSION_FRAME, &scripted_action(frame));
        if frame % 60 == 59 {
            info!("{}", engine.hud_line());
        }
    }

    let presenter = engine.world.presenter();
    let (attached, detached) = presenter.lifetime_counts();
    info!(
        "Session finished: {} chunks, {} live objects ({} visible), {} attached, {} detached",
        engine.world.loaded_chunk_count(),
        presenter.live_objects(),
        presenter.visible_objects(),
        attached,
        detached
    );
}

/// Input for one frame of the scripted session: walk, dig, build, then fly.
fn scripted_action(frame: u32) -> PlayerAction {
    let mut action = PlayerAction {
        move_forward: frame < 240 || frame >= 400,
        ..PlayerAction::default()
    };
    match frame {
        120 => action.rotate_view = Some((0.0, 300.0)),
        150 => action.break_block = true,
        160 => action.select_slot = Some(4),
        170 => action.place_block = true,
        200 => action.rotate_view = Some((0.0, -300.0)),
        300 | 305 => action.jump_pressed = true,
        _ => {}
    }
    action.move_up = (300..360).contains(&frame);
    action
}
