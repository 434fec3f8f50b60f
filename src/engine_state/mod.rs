//! # Engine State Module
//!
//! The frame driver that ties the voxel world to a player and a camera.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container, advanced once per frame
//! * `camera_state` - Camera orientation, projection and view frustum
//! * `player` - Walking, jumping, flight and collision
//! * `rendering` - Chunk geometry and the presenter seam
//! * `voxels` - Blocks, chunks, terrain and the world itself
//!
//! ## Frame Order
//!
//! 1. Clamp the frame step
//! 2. Apply hotbar selection and mouse look
//! 3. Move the player and put the camera at the player's eye
//! 4. Stream chunks around the player and cull them against the frustum
//! 5. Break or place the targeted block
//! 6. Update frame statistics

use std::fmt;

use cgmath::Point3;
use log::{debug, info};
use web_time::Duration;

use camera_state::CameraState;
use player::{MovementInput, PlayerController};
use rendering::ChunkPresenter;
use voxels::{
    block::block_type::BlockType,
    world::{StreamingReport, World},
};

use crate::config::WorldConfig;

pub mod camera_state;
pub mod player;
pub mod rendering;
pub mod voxels;

/// Represents player actions for one frame.
///
/// Movement flags are levels (held keys). The remaining fields are edges that
/// fire once per press.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerAction {
    /// Movement actions - true if key is pressed or held
    pub move_forward: bool,
    /// Move backward
    pub move_backward: bool,
    /// Strafe left
    pub move_left: bool,
    /// Strafe right
    pub move_right: bool,
    /// Jump while walking, rise while flying
    pub move_up: bool,
    /// Sink while flying
    pub move_down: bool,

    /// The jump key went down this frame. Two presses close together toggle flight.
    pub jump_pressed: bool,
    /// View rotation - Some if the mouse moved
    pub rotate_view: Option<(f64, f64)>,
    /// Hotbar digit pressed this frame, 1-based
    pub select_slot: Option<u8>,
    /// Break the targeted block
    pub break_block: bool,
    /// Place the selected block against the targeted face
    pub place_block: bool,
}

impl PlayerAction {
    fn movement(&self) -> MovementInput {
        MovementInput {
            forward: axis(self.move_forward, self.move_backward),
            strafe: axis(self.move_right, self.move_left),
            up: self.move_up,
            down: self.move_down,
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i32 - negative as i32) as f32
}

/// The block types the player can place, selected by digits 1-4.
#[derive(Debug, Clone)]
pub struct Hotbar {
    slots: [BlockType; 4],
    selected: usize,
}

impl Hotbar {
    /// Creates a hotbar with grass selected.
    pub fn new() -> Self {
        Hotbar {
            slots: [
                BlockType::GRASS,
                BlockType::DIRT,
                BlockType::STONE,
                BlockType::SAND,
            ],
            selected: 0,
        }
    }

    /// Selects a 1-based slot. Out of range digits are ignored.
    ///
    /// # Returns
    /// `true` if the selection is valid.
    pub fn select(&mut self, slot: u8) -> bool {
        let index = slot as usize;
        if (1..=self.slots.len()).contains(&index) {
            self.selected = index - 1;
            true
        } else {
            false
        }
    }

    /// The block type that will be placed.
    pub fn selected(&self) -> BlockType {
        self.slots[self.selected]
    }

    /// All slots in order.
    pub fn slots(&self) -> &[BlockType] {
        &self.slots
    }
}

impl Default for Hotbar {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames-per-second measured over roughly one second of simulated time.
#[derive(Debug, Default, Clone)]
pub struct FrameStats {
    frames: u32,
    timer: f32,
    fps: f32,
    total_frames: u64,
}

impl FrameStats {
    /// Counts one frame of `dt` seconds.
    pub fn record(&mut self, dt: f32) {
        self.frames += 1;
        self.total_frames += 1;
        self.timer += dt;
        if self.timer >= 1.0 {
            self.fps = self.frames as f32 / self.timer;
            self.frames = 0;
            self.timer = 0.0;
        }
    }

    /// The last completed measurement, 0 until one second has passed.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Frames processed since start.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

/// A player action that edits the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockInteraction {
    /// Replace the targeted block with air
    Break,
    /// Put the selected block in front of the targeted face
    Place,
}

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```
/// use voxel_world::config::WorldConfig;
/// use voxel_world::engine_state::{rendering::HeadlessPresenter, EngineState, PlayerAction};
/// use web_time::Duration;
///
/// let config = WorldConfig { render_distance: 1, ..WorldConfig::default() };
/// let mut engine = EngineState::new(&config, HeadlessPresenter::new());
/// engine.process_frame(Duration::from_millis(16), &PlayerAction::default());
/// assert!(engine.hud_line().starts_with("FPS"));
/// ```
pub struct EngineState<P: ChunkPresenter> {
    /// The voxel world containing all chunk data
    pub world: World<P>,
    /// Camera positioned at the player's eye
    pub camera_state: CameraState,
    /// Player body and movement mode
    pub player: PlayerController,
    /// Block selection
    pub hotbar: Hotbar,
    stats: FrameStats,
    /// Unclamped time since start, used for double-tap detection.
    clock: Duration,
    last_report: StreamingReport,
}

impl<P: ChunkPresenter> EngineState<P> {
    /// Creates an engine with a freshly seeded world and primes the chunks
    /// around the spawn point.
    pub fn new(config: &WorldConfig, presenter: P) -> Self {
        Self::with_world(config, World::new(config, presenter))
    }

    /// Creates an engine around an existing world and primes the chunks
    /// around the spawn point.
    pub fn with_world(config: &WorldConfig, mut world: World<P>) -> Self {
        let camera_state = CameraState::new(config);
        let [x, y, z] = config.spawn_position;
        let spawn = Point3::new(x, y, z);
        let player = PlayerController::new(spawn, config.player.clone());

        let last_report = world.update(spawn, Some(&camera_state.frustum()));
        info!(
            "Engine ready at {:?} with {} chunks loaded",
            spawn,
            world.loaded_chunk_count()
        );

        EngineState {
            world,
            camera_state,
            player,
            hotbar: Hotbar::new(),
            stats: FrameStats::default(),
            clock: Duration::ZERO,
            last_report,
        }
    }

    /// Advances the simulation by one frame.
    ///
    /// # Arguments
    /// * `frame_time` - Wall time since the previous frame, clamped before use
    /// * `actions` - Player input for this frame
    ///
    /// # Returns
    /// What chunk streaming did this frame.
    pub fn process_frame(
        &mut self,
        frame_time: Duration,
        actions: &PlayerAction,
    ) -> StreamingReport {
        self.clock += frame_time;
        let dt = frame_time
            .as_secs_f32()
            .min(self.player.config().max_frame_delta);

        if let Some(slot) = actions.select_slot {
            if self.hotbar.select(slot) {
                debug!("Selected {}", self.hotbar.selected());
            }
        }
        if let Some(delta) = actions.rotate_view {
            self.camera_state.look(delta);
        }
        if actions.jump_pressed {
            self.player.register_jump_press(self.clock);
        }

        let camera = &self.camera_state.camera;
        let (forward, right) = (camera.horizontal_forward(), camera.horizontal_right());
        self.player
            .update(dt, &actions.movement(), forward, right, &self.world);
        self.camera_state.follow(self.player.position);

        let frustum = self.camera_state.frustum();
        self.last_report = self.world.update(self.player.position, Some(&frustum));

        if actions.break_block {
            self.interact(BlockInteraction::Break);
        }
        if actions.place_block {
            self.interact(BlockInteraction::Place);
        }

        self.stats.record(dt);
        self.last_report
    }

    /// Breaks or places the block under the crosshair.
    ///
    /// # Returns
    /// The edited cell, or `None` when nothing is in reach.
    pub fn interact(&mut self, interaction: BlockInteraction) -> Option<Point3<i32>> {
        let camera = &self.camera_state.camera;
        let hit = self.world.raycast_voxel(camera.position, camera.forward())?;
        let (target, block_type) = match interaction {
            BlockInteraction::Break => (hit.block, BlockType::AIR),
            BlockInteraction::Place => (hit.adjacent(), self.hotbar.selected()),
        };
        self.world
            .set_block(target.x, target.y, target.z, block_type);
        debug!(
            "{:?} at {:?} with {} (hit {:?} face of {:?})",
            interaction,
            target,
            block_type,
            hit.side(),
            hit.block
        );
        Some(target)
    }

    /// Frame statistics.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// The streaming result of the most recent frame.
    pub fn last_report(&self) -> &StreamingReport {
        &self.last_report
    }

    /// A one-line status readout for the HUD.
    pub fn hud_line(&self) -> String {
        HudLine {
            fps: self.stats.fps(),
            position: self.player.position,
            chunk: self.camera_state.chunk_position(),
            chunks: self.world.loaded_chunk_count(),
            selected: self.hotbar.selected(),
            flying: self.player.is_flying(),
        }
        .to_string()
    }
}

struct HudLine {
    fps: f32,
    position: Point3<f32>,
    chunk: voxels::chunk::ChunkKey,
    chunks: usize,
    selected: BlockType,
    flying: bool,
}

impl fmt::Display for HudLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS {:.0}  Pos {:.1}, {:.1}, {:.1}  Chunk {}  Chunks {}  Selected {}  Fly {}",
            self.fps,
            self.position.x,
            self.position.y,
            self.position.z,
            self.chunk,
            self.chunks,
            self.selected.as_int(),
            if self.flying { "ON" } else { "OFF" }
        )
    }
}
