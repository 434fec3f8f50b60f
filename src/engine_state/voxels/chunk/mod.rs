//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16 x 64 x 16 column of blocks,
//! its local accessors, and the derivation of its renderable geometry.
//!
//! ## Storage
//!
//! Blocks are stored one byte per cell in a flat array of exactly
//! `CHUNK_VOLUME` entries. Local coordinate `(x, y, z)` lives at
//! `x + CHUNK_DIMENSION * (z + CHUNK_DIMENSION * y)`, so each horizontal
//! layer is contiguous.
//!
//! ## Lifecycle
//!
//! `Empty` (all air) → `Populated` (terrain written) → `Meshed` (geometry
//! built) → `Stale` (a block changed since the last build) → `Meshed` again.
//!
//! ## Culling
//!
//! A block is emitted into the mesh when it is solid and at least one of its
//! six axis neighbours is air. Neighbours outside this chunk count as air even
//! when the adjacent chunk is loaded and solid there, so faces along chunk
//! seams are kept.

use cgmath::Point3;
use thiserror::Error;

use super::block::{block_side::BlockSide, block_type::BlockType};
use crate::engine_state::rendering::meshing::{hsl_to_rgb, ChunkMesh, InstanceData};

pub mod chunk_iteration;
mod chunk_key;

pub use chunk_iteration::ChunkBlockIterator;
pub use chunk_key::{ChunkKey, ChunkKeyParseError};

/// The width and depth of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The height of the world, and of every chunk, in blocks.
pub const WORLD_HEIGHT: i32 = 64;
/// The number of blocks in a single horizontal layer of a chunk.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * WORLD_HEIGHT as usize;

/// Saturation and lightness of the per-instance colour derived from [`Chunk::seeded_hue`].
const INSTANCE_SATURATION: f32 = 0.7;
const INSTANCE_LIGHTNESS: f32 = 0.6;

/// Where a chunk is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Just allocated, every block is air
    Empty,
    /// Terrain has been written but no mesh has been built
    Populated,
    /// The mesh reflects the current blocks
    Meshed,
    /// A block changed after the last mesh build
    Stale,
}

/// Errors from the checked chunk accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The local coordinate lies outside `[0,16) x [0,64) x [0,16)`.
    #[error("local coordinate ({x}, {y}, {z}) is outside the chunk")]
    OutOfBounds {
        /// Local X
        x: usize,
        /// Local Y
        y: usize,
        /// Local Z
        z: usize,
    },
}

/// Represents a 16x64x16 column of voxel blocks in the world.
///
/// Each chunk knows its chunk coordinates, stores its blocks, and owns the
/// geometry it last built. The geometry is replaced, never patched, on every
/// rebuild.
pub struct Chunk {
    /// The chunk coordinates of this chunk.
    key: ChunkKey,
    /// One entry per cell, indexed by [`Chunk::linear_index`].
    blocks: Box<[BlockType]>,
    /// The geometry from the last [`Chunk::build_mesh`], if anything was visible.
    mesh: Option<ChunkMesh>,
    state: ChunkState,
    /// Result of the last frustum test. Hidden chunks stay loaded.
    visible: bool,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn new(key: ChunkKey) -> Self {
        Chunk {
            key,
            blocks: vec![BlockType::AIR; CHUNK_VOLUME].into_boxed_slice(),
            mesh: None,
            state: ChunkState::Empty,
            visible: true,
        }
    }

    /// The chunk coordinates of this chunk.
    pub fn key(&self) -> ChunkKey {
        self.key
    }

    /// World-space X of local `x = 0`.
    pub fn origin_x(&self) -> i32 {
        self.key.origin_x()
    }

    /// World-space Z of local `z = 0`.
    pub fn origin_z(&self) -> i32 {
        self.key.origin_z()
    }

    /// The chunk's axis-aligned bounds in world space as `(min, max)`.
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        let min = Point3::new(self.origin_x() as f32, 0.0, self.origin_z() as f32);
        let max = Point3::new(
            min.x + CHUNK_DIMENSION as f32,
            WORLD_HEIGHT as f32,
            min.z + CHUNK_DIMENSION as f32,
        );
        (min, max)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Whether the last frustum test found this chunk on screen.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Records the result of a frustum test.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// The raw block array.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    /// The geometry from the last build, or `None` if nothing was visible.
    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.as_ref()
    }

    /// Whether `(x, y, z)` is a valid local coordinate.
    pub fn in_bounds(x: usize, y: usize, z: usize) -> bool {
        x < CHUNK_DIMENSION as usize && z < CHUNK_DIMENSION as usize && y < WORLD_HEIGHT as usize
    }

    /// Maps a local coordinate to its position in the block array.
    pub fn linear_index(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_DIMENSION as usize * (z + CHUNK_DIMENSION as usize * y)
    }

    /// Gets the block at local coordinates.
    ///
    /// The caller must keep the coordinate in range; debug builds panic otherwise.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        debug_assert!(
            Self::in_bounds(x, y, z),
            "chunk read out of range: ({x}, {y}, {z})"
        );
        self.blocks[Self::linear_index(x, y, z)]
    }

    /// Sets the block at local coordinates. A meshed chunk becomes stale.
    ///
    /// The caller must keep the coordinate in range; debug builds panic otherwise.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        debug_assert!(
            Self::in_bounds(x, y, z),
            "chunk write out of range: ({x}, {y}, {z})"
        );
        self.blocks[Self::linear_index(x, y, z)] = block_type;
        if self.state == ChunkState::Meshed {
            self.state = ChunkState::Stale;
        }
    }

    /// Range-checked variant of [`Chunk::get`].
    pub fn try_get(&self, x: usize, y: usize, z: usize) -> Result<BlockType, ChunkError> {
        if !Self::in_bounds(x, y, z) {
            return Err(ChunkError::OutOfBounds { x, y, z });
        }
        Ok(self.get(x, y, z))
    }

    /// Range-checked variant of [`Chunk::set`].
    pub fn try_set(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block_type: BlockType,
    ) -> Result<(), ChunkError> {
        if !Self::in_bounds(x, y, z) {
            return Err(ChunkError::OutOfBounds { x, y, z });
        }
        self.set(x, y, z, block_type);
        Ok(())
    }

    /// Marks terrain as written. Only moves an `Empty` chunk forward.
    pub fn mark_populated(&mut self) {
        if self.state == ChunkState::Empty {
            self.state = ChunkState::Populated;
        }
    }

    /// Iterates over every non-air block with its local coordinate.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// The block next to `(x, y, z)` across `side`, treating anything outside
    /// this chunk as air.
    fn neighbor(&self, x: usize, y: usize, z: usize, side: BlockSide) -> BlockType {
        let offset = side.normal();
        let nx = x as i32 + offset.x;
        let ny = y as i32 + offset.y;
        let nz = z as i32 + offset.z;
        if nx < 0 || ny < 0 || nz < 0 {
            return BlockType::AIR;
        }
        let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
        if !Self::in_bounds(nx, ny, nz) {
            return BlockType::AIR;
        }
        self.get(nx, ny, nz)
    }

    /// Whether the block at `(x, y, z)` is air or fully enclosed by solid neighbours.
    pub fn is_hidden(&self, x: usize, y: usize, z: usize) -> bool {
        if !self.get(x, y, z).is_solid() {
            return true;
        }
        BlockSide::all()
            .into_iter()
            .all(|side| self.neighbor(x, y, z, side).is_solid())
    }

    /// Rebuilds this chunk's geometry from its current blocks.
    ///
    /// The previous mesh is dropped before the new one is built. Every visible
    /// block becomes one unit cube centred at
    /// `(origin_x + x + 0.5, y + 0.5, origin_z + z + 0.5)`, grouped by block type.
    ///
    /// # Returns
    /// The new mesh, or `None` when no block is visible.
    pub fn build_mesh(&mut self) -> Option<&ChunkMesh> {
        self.mesh = None;

        let origin_x = self.origin_x();
        let origin_z = self.origin_z();
        let mut mesh = ChunkMesh::new();
        for (position, block_type) in self.iter_blocks() {
            if self.is_hidden(position.x, position.y, position.z) {
                continue;
            }
            let wx = origin_x.saturating_add(position.x as i32);
            let wy = position.y as i32;
            let wz = origin_z.saturating_add(position.z as i32);
            let hue = Self::seeded_hue(wx as f64, wy as f64, wz as f64) as f32;
            let color = hsl_to_rgb(hue, INSTANCE_SATURATION, INSTANCE_LIGHTNESS);
            let center = Point3::new(wx as f32 + 0.5, wy as f32 + 0.5, wz as f32 + 0.5);
            mesh.push_instance(block_type, InstanceData::new(center, color));
        }

        self.state = ChunkState::Meshed;
        if mesh.is_empty() {
            return None;
        }
        self.mesh = Some(mesh);
        self.mesh.as_ref()
    }

    /// A cheap spatial hash of a world block position into `[0, 1)`.
    ///
    /// Used only as a decorative per-block colour hue.
    pub fn seeded_hue(wx: f64, wy: f64, wz: f64) -> f64 {
        let h = ((wx * 12_989.0 + wy * 78_233.0 + wz * 45_679.0).sin() * 43_758.5453) % 1.0;
        (h + 1.0 + 0.5) % 1.0
    }
}
