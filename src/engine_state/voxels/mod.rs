//! # Voxel World Core
//!
//! This module contains the voxel world itself: what blocks exist, how they
//! are stored, how terrain is generated, and how the world is queried and
//! edited.
//!
//! ## Architecture
//!
//! * **Block**: Block types, their colours and the six axis-aligned sides
//! * **Chunk**: Fixed 16 x 64 x 16 columns of blocks and their derived geometry
//! * **Perlin**: Seeded 2D gradient noise
//! * **Terrain**: Heightmap generation and column stratification
//! * **World**: The chunk map, streaming, block edits and falling sand
//! * **Raycast**: Grid traversal for block targeting
//!
//! ## Data Flow
//!
//! 1. The frame driver hands the player position to `World::update`
//! 2. The world generates and meshes chunks entering the streaming radius
//! 3. Chunks leaving the radius (plus one) are dropped with their display objects
//! 4. Block edits rewrite one chunk, rebuild its whole mesh and settle sand
//!
//! Everything runs synchronously on the caller's thread.

pub mod block;
pub mod chunk;
pub mod perlin;
pub mod raycast;
pub mod terrain;
pub mod world;
