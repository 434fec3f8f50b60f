//! Mesh generation output for voxel rendering.
//!
//! Chunks turn their block arrays into [`ChunkMesh`] values: one batch of unit
//! cube instances per block type. Presenters consume these batches directly,
//! typically as one instanced draw per batch.
//!
//! # Architecture
//! - [`ChunkMesh`]: all visible cubes of one chunk, grouped by block type
//! - [`MeshBatch`]: the instances of a single block type
//! - [`InstanceData`]: `Pod` per-cube data (centre and colour)

mod mesh;

pub use mesh::*;
