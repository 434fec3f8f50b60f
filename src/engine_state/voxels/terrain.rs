//! # Terrain Generation
//!
//! Column-based terrain: every column gets a height from two blended noise
//! octaves and is filled bottom-up with stone, three layers of dirt, a single
//! grass block, then air. There are no caves, overhangs or biomes.

use noise::NoiseFn;

use super::{
    block::block_type::BlockType,
    chunk::{Chunk, CHUNK_DIMENSION, WORLD_HEIGHT},
    perlin::Perlin2D,
};

/// Frequency of the broad terrain octave.
pub const BASE_FREQUENCY: f64 = 0.02;
/// Weight of the broad octave in the blend.
pub const BASE_WEIGHT: f64 = 0.7;
/// Frequency of the detail octave.
pub const DETAIL_FREQUENCY: f64 = 0.08;
/// Weight of the detail octave in the blend.
pub const DETAIL_WEIGHT: f64 = 0.3;
/// Height of a column whose blended noise is 0.
pub const BASE_HEIGHT: f64 = 20.0;
/// Height added for a blended noise of 1.
pub const HEIGHT_AMPLITUDE: f64 = 28.0;
/// Number of non-stone layers at the top of a column (dirt plus grass).
pub const SOIL_DEPTH: i32 = 4;

/// Produces terrain heights and fills chunks with stratified columns.
pub struct TerrainGenerator {
    noise: Box<dyn NoiseFn<f64, 2>>,
}

impl TerrainGenerator {
    /// Creates a generator backed by [`Perlin2D`] with the given seed.
    pub fn new(seed: u32) -> Self {
        Self::with_noise(Perlin2D::new(seed))
    }

    /// Creates a generator backed by any 2D noise function with output in `[0, 1]`.
    pub fn with_noise(noise: impl NoiseFn<f64, 2> + 'static) -> Self {
        TerrainGenerator {
            noise: Box::new(noise),
        }
    }

    /// The terrain height of world column `(x, z)`: the lowest `y` that is air.
    ///
    /// Always in `[1, WORLD_HEIGHT - 1]`.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let (x, z) = (x as f64, z as f64);
        let base = self.noise.get([x * BASE_FREQUENCY, z * BASE_FREQUENCY]);
        let detail = self.noise.get([x * DETAIL_FREQUENCY, z * DETAIL_FREQUENCY]);
        let elevation = base * BASE_WEIGHT + detail * DETAIL_WEIGHT;
        let height = (BASE_HEIGHT + elevation * HEIGHT_AMPLITUDE).floor();
        // Clamp before the cast: foreign generators may leave [0, 1].
        height.clamp(1.0, (WORLD_HEIGHT - 1) as f64) as i32
    }

    /// The block at height `y` in a column of height `height`.
    pub fn block_for(height: i32, y: i32) -> BlockType {
        if y < height - SOIL_DEPTH {
            BlockType::STONE
        } else if y < height - 1 {
            BlockType::DIRT
        } else if y < height {
            BlockType::GRASS
        } else {
            BlockType::AIR
        }
    }

    /// Writes terrain into every column of `chunk` and marks it populated.
    pub fn generate_chunk_terrain(&self, chunk: &mut Chunk) {
        let origin_x = chunk.origin_x();
        let origin_z = chunk.origin_z();
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let (wx, wz) = (origin_x.saturating_add(x), origin_z.saturating_add(z));
                let height = self.height_at(wx, wz);
                for y in 0..WORLD_HEIGHT {
                    chunk.set(
                        x as usize,
                        y as usize,
                        z as usize,
                        Self::block_for(height, y),
                    );
                }
            }
        }
        chunk.mark_populated();
    }
}
