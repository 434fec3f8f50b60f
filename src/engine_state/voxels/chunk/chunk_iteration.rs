//! # Chunk Iteration Module
//!
//! This module provides an iterator for traversing all non-air blocks in a
//! chunk together with their local coordinates.
//!
//! Blocks are visited in storage order: X fastest, then Z, then Y, which is
//! the order of the chunk's linear index `x + 16 * (z + 16 * y)`.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::{Chunk, CHUNK_DIMENSION};

/// An iterator over all non-air blocks in a chunk.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next linear index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first block.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < blocks.len() {
            let offset = self.current_offset;
            self.current_offset += 1;

            let block_type = blocks[offset];
            if block_type == BlockType::AIR {
                continue;
            }

            let dimension = CHUNK_DIMENSION as usize;
            let x = offset % dimension;
            let z = (offset / dimension) % dimension;
            let y = offset / (dimension * dimension);
            return Some((Point3::new(x, y, z), block_type));
        }
        None
    }
}
