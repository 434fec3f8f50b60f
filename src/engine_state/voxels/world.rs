//! # World Module
//!
//! This module provides the `World` struct which owns every loaded chunk and
//! serves as the central coordinator for chunk streaming, block edits and
//! queries against the voxel grid.
//!
//! ## Architecture
//!
//! The world is sparse: only chunks near the player, or touched by a block
//! edit, are kept in memory. A chunk is generated and meshed synchronously the
//! first time it is needed, and its mesh is handed to a [`ChunkPresenter`].
//! The world keeps the presenter's handle so it can later swap the geometry
//! out, hide it, or dispose of it.
//!
//! ## Coordinates
//!
//! World block coordinates are integers. The owning chunk of `(x, z)` is found
//! by floor division, so negative coordinates map to negative chunks. Heights
//! outside `[0, WORLD_HEIGHT)` behave like a solid floor and ceiling for
//! collision but can never be edited.

use std::collections::{hash_map::Entry, HashMap};

use cgmath::{Point3, Vector3};
use log::{debug, info, trace};
use web_time::Instant;

use super::{
    block::block_type::BlockType,
    chunk::{Chunk, ChunkKey, CHUNK_DIMENSION, WORLD_HEIGHT},
    raycast::{self, RaycastHit},
    terrain::TerrainGenerator,
};
use crate::{
    config::WorldConfig,
    engine_state::{camera_state::frustum::Frustum, rendering::ChunkPresenter},
};

/// Read access to block solidity, used by movement and raycasting.
pub trait VoxelQuery {
    /// Whether `(x, y, z)` blocks movement.
    ///
    /// Anything outside the height band is solid. Unloaded space is not.
    fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool;

    /// The block at `(x, y, z)`, or air outside the height band or in
    /// unloaded space.
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType;
}

/// What one call to [`World::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingReport {
    /// The chunk the player stands in
    pub center: ChunkKey,
    /// Chunks generated during this update
    pub loaded: usize,
    /// Chunks dropped during this update
    pub unloaded: usize,
    /// Loaded chunks currently flagged visible
    pub visible: usize,
    /// Loaded chunks currently flagged hidden
    pub hidden: usize,
}

impl StreamingReport {
    fn new(center: ChunkKey) -> Self {
        StreamingReport {
            center,
            loaded: 0,
            unloaded: 0,
            visible: 0,
            hidden: 0,
        }
    }
}

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use voxel_world::config::WorldConfig;
/// use voxel_world::engine_state::rendering::HeadlessPresenter;
/// use voxel_world::engine_state::voxels::{block::block_type::BlockType, world::World};
///
/// let config = WorldConfig { render_distance: 1, ..WorldConfig::default() };
/// let mut world = World::new(&config, HeadlessPresenter::new());
/// world.set_block(3, 60, 3, BlockType::STONE);
/// assert!(world.is_solid_at(3, 60, 3));
/// ```
pub struct World<P: ChunkPresenter> {
    /// Every loaded chunk by chunk coordinate.
    chunks: HashMap<ChunkKey, Chunk>,
    /// Presenter handles for chunks whose last mesh was non-empty.
    presented: HashMap<ChunkKey, P::Handle>,
    terrain: TerrainGenerator,
    presenter: P,
    /// Streaming radius in chunks.
    render_distance: i32,
}

impl<P: ChunkPresenter> World<P> {
    /// Creates an empty world using the seed and streaming radius from `config`.
    pub fn new(config: &WorldConfig, presenter: P) -> Self {
        Self::with_terrain(
            TerrainGenerator::new(config.seed),
            config.render_distance,
            presenter,
        )
    }

    /// Creates an empty world with a custom terrain generator.
    ///
    /// # Arguments
    /// * `terrain` - Generator used for every new chunk
    /// * `render_distance` - Streaming radius in chunks, negative values are treated as 0
    /// * `presenter` - Receives the geometry of every meshed chunk
    pub fn with_terrain(terrain: TerrainGenerator, render_distance: i32, presenter: P) -> Self {
        info!("Creating world with render distance {}", render_distance);
        World {
            chunks: HashMap::new(),
            presented: HashMap::new(),
            terrain,
            presenter,
            render_distance: render_distance.max(0),
        }
    }

    /// Streaming radius in chunks.
    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    /// The presenter holding this world's display objects.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Number of chunks currently in memory.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Keys of every loaded chunk, in no particular order.
    pub fn loaded_chunk_keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    /// The chunk containing world position `(x, _, z)`. The height is ignored.
    pub fn chunk_key_from_world(&self, x: f32, _y: f32, z: f32) -> ChunkKey {
        ChunkKey::from_world(x, z)
    }

    /// Looks up a loaded chunk.
    pub fn get_chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Whether a presenter object currently exists for `key`.
    pub fn is_presented(&self, key: ChunkKey) -> bool {
        self.presented.contains_key(&key)
    }

    /// Terrain height of world column `(x, z)`.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        self.terrain.height_at(x, z)
    }

    /// Fills `chunk` with this world's terrain.
    pub fn generate_chunk_terrain(&self, chunk: &mut Chunk) {
        self.terrain.generate_chunk_terrain(chunk);
    }

    /// Returns the chunk at `key`, generating, meshing and presenting it first
    /// if it is not loaded. Calling this for a loaded chunk changes nothing.
    pub fn ensure_chunk(&mut self, key: ChunkKey) -> &Chunk {
        self.ensure_chunk_mut(key)
    }

    fn ensure_chunk_mut(&mut self, key: ChunkKey) -> &mut Chunk {
        match self.chunks.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let start = Instant::now();
                let chunk = entry.insert(Chunk::new(key));
                self.terrain.generate_chunk_terrain(chunk);
                let instances = match chunk.build_mesh() {
                    Some(mesh) => {
                        let instances = mesh.instance_count();
                        let handle = self.presenter.attach(key, mesh);
                        self.presented.insert(key, handle);
                        instances
                    }
                    None => 0,
                };
                trace!(
                    "Generated chunk {} with {} visible blocks in {:?}",
                    key,
                    instances,
                    start.elapsed()
                );
                chunk
            }
        }
    }

    /// Drops a chunk and disposes its display object.
    ///
    /// # Returns
    /// `true` if the chunk was loaded.
    pub fn dispose_chunk(&mut self, key: ChunkKey) -> bool {
        if let Some(handle) = self.presented.remove(&key) {
            self.presenter.detach(handle);
        }
        let removed = self.chunks.remove(&key).is_some();
        if removed {
            trace!("Unloaded chunk {}", key);
        }
        removed
    }

    /// Rebuilds the whole mesh of a loaded chunk and swaps the display object.
    ///
    /// The old object is detached before the new one is attached. A hidden
    /// chunk stays hidden.
    pub fn remesh_chunk(&mut self, key: ChunkKey) {
        let Some(chunk) = self.chunks.get_mut(&key) else {
            return;
        };
        if let Some(handle) = self.presented.remove(&key) {
            self.presenter.detach(handle);
        }
        let visible = chunk.is_visible();
        if let Some(mesh) = chunk.build_mesh() {
            let handle = self.presenter.attach(key, mesh);
            if !visible {
                self.presenter.set_visible(&handle, false);
            }
            self.presented.insert(key, handle);
        }
    }

    /// Streams chunks around the player and refreshes visibility.
    ///
    /// Every chunk within `dx² + dz² <= R²` of the player's chunk is loaded.
    /// Every loaded chunk more than `R + 1` chunks away on either axis is
    /// dropped. With a frustum, each loaded chunk's visibility becomes the
    /// result of testing its bounds against it. Hidden chunks stay loaded.
    ///
    /// # Arguments
    /// * `player_position` - Player position in world space
    /// * `frustum` - Current view frustum, if culling is wanted
    pub fn update(
        &mut self,
        player_position: Point3<f32>,
        frustum: Option<&Frustum>,
    ) -> StreamingReport {
        let center = ChunkKey::from_world(player_position.x, player_position.z);
        let mut report = StreamingReport::new(center);
        let radius = self.render_distance;

        for dz in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dz * dz > radius * radius {
                    continue;
                }
                let Some(key) = center.offset(dx, dz) else {
                    continue;
                };
                if !self.chunks.contains_key(&key) {
                    self.ensure_chunk_mut(key);
                    report.loaded += 1;
                }
            }
        }

        let far: Vec<ChunkKey> = self
            .chunks
            .keys()
            .filter(|key| key.chebyshev_distance(&center) > radius + 1)
            .copied()
            .collect();
        for key in far {
            if self.dispose_chunk(key) {
                report.unloaded += 1;
            }
        }

        for (key, chunk) in self.chunks.iter_mut() {
            if let Some(frustum) = frustum {
                let (min, max) = chunk.bounds();
                let visible = frustum.intersects_aabb(min, max);
                if visible != chunk.is_visible() {
                    chunk.set_visible(visible);
                    if let Some(handle) = self.presented.get(key) {
                        self.presenter.set_visible(handle, visible);
                    }
                }
            }
            if chunk.is_visible() {
                report.visible += 1;
            } else {
                report.hidden += 1;
            }
        }

        if report.loaded > 0 || report.unloaded > 0 {
            debug!(
                "Streaming around {}: {} loaded, {} unloaded, {} resident ({} visible)",
                center,
                report.loaded,
                report.unloaded,
                self.chunks.len(),
                report.visible
            );
        }
        report
    }

    /// Splits a world block coordinate into its chunk and local coordinate.
    fn locate(x: i32, y: i32, z: i32) -> (ChunkKey, usize, usize, usize) {
        (
            ChunkKey::from_block(x, z),
            x.rem_euclid(CHUNK_DIMENSION) as usize,
            y as usize,
            z.rem_euclid(CHUNK_DIMENSION) as usize,
        )
    }

    /// Whether `(x, y, z)` blocks movement.
    ///
    /// Solid outside `[0, WORLD_HEIGHT)`, not solid in unloaded chunks.
    pub fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return true;
        }
        self.block_at(x, y, z).is_solid()
    }

    /// The block at `(x, y, z)`. Air outside the height band or in unloaded chunks.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return BlockType::AIR;
        }
        let (key, lx, ly, lz) = Self::locate(x, y, z);
        self.chunks
            .get(&key)
            .map_or(BlockType::AIR, |chunk| chunk.get(lx, ly, lz))
    }

    /// Writes a block, loading its chunk if needed, and rebuilds that chunk's mesh.
    ///
    /// Heights outside `[0, WORLD_HEIGHT)` are ignored. Placing sand lets it
    /// fall. Placing air lets any sand resting above the cell fall into it.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        if !self.write_block(x, y, z, block_type) {
            return;
        }
        if block_type.is_affected_by_gravity() {
            self.settle_falling_from(x, y, z);
        } else if block_type == BlockType::AIR {
            self.settle_falling_from(x, y + 1, z);
        }
    }

    /// Writes one block and rebuilds its chunk without settling anything.
    fn write_block(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return false;
        }
        let (key, lx, ly, lz) = Self::locate(x, y, z);
        self.ensure_chunk_mut(key).set(lx, ly, lz, block_type);
        self.remesh_chunk(key);
        true
    }

    /// Drops the sand at `(x, y, z)` straight down until it rests on something solid.
    ///
    /// Every one-cell step is a [`World::swap_blocks`] and rebuilds the chunk
    /// mesh twice. Once the sand has moved, the cell it vacated is settled in
    /// turn so a stacked column follows it down. Does nothing if the cell does
    /// not hold sand.
    pub fn settle_falling_from(&mut self, x: i32, y: i32, z: i32) {
        let start = y;
        let mut y = y;
        while y >= 0
            && self.block_at(x, y, z).is_affected_by_gravity()
            && !self.is_solid_at(x, y - 1, z)
        {
            self.swap_blocks(Point3::new(x, y, z), Point3::new(x, y - 1, z));
            y -= 1;
        }
        if y != start {
            self.settle_falling_from(x, start + 1, z);
        }
    }

    /// Exchanges the blocks at `a` and `b`, rebuilding the affected meshes.
    ///
    /// Neither cell is settled afterwards. Nothing changes unless both cells
    /// lie inside `[0, WORLD_HEIGHT)`.
    ///
    /// # Returns
    /// Whether the swap happened.
    pub fn swap_blocks(&mut self, a: Point3<i32>, b: Point3<i32>) -> bool {
        let band = 0..WORLD_HEIGHT;
        if !band.contains(&a.y) || !band.contains(&b.y) {
            return false;
        }
        let block_a = self.block_at(a.x, a.y, a.z);
        let block_b = self.block_at(b.x, b.y, b.z);
        self.write_block(a.x, a.y, a.z, block_b);
        self.write_block(b.x, b.y, b.z, block_a);
        true
    }

    /// Finds the first solid block along a ray. See [`raycast::raycast_voxel`].
    pub fn raycast_voxel(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Option<RaycastHit> {
        raycast::raycast_voxel(self, origin, direction)
    }
}

impl<P: ChunkPresenter> VoxelQuery for World<P> {
    fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool {
        World::is_solid_at(self, x, y, z)
    }

    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        World::block_at(self, x, y, z)
    }
}
