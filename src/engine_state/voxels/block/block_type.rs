//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification, conversion, and colour lookup.

use std::fmt;

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// Each variant represents a distinct type of block with its own properties
/// and behavior. The discriminants are the compact ids stored in chunk arrays,
/// and the `FromPrimitive` derive allows conversion back from those integers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    /// This is the universal "empty" value for every lookup.
    #[default]
    AIR = 0,

    /// The single surface layer of every terrain column.
    GRASS = 1,

    /// The three layers directly under the grass.
    DIRT = 2,

    /// Everything deeper than the dirt layers.
    STONE = 3,

    /// A block affected by gravity. Sand never floats: it settles
    /// straight down until it rests on a solid block.
    SAND = 4,
}

/// Base colours indexed by `BlockType as usize`, as `0xRRGGBB`.
pub static BLOCK_TYPE_TO_COLOR: [u32; 5] = [
    0x000000, // AIR
    0x55aa55, // GRASS
    0x8b5a2b, // DIRT
    0x888888, // STONE
    0xE5D69E, // SAND
];

impl BlockType {
    /// Every block type in id order, including `AIR`.
    pub const ALL: [BlockType; 5] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::SAND,
    ];

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Returns
    /// `Some(block_type)` for a known id, `None` otherwise.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(btype)
    }

    /// Returns the compact integer id of this block type.
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this block collides and occludes. Only `AIR` is not solid.
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }

    /// Whether this block falls when the cell below it is not solid.
    pub fn is_affected_by_gravity(self) -> bool {
        self == BlockType::SAND
    }

    /// The base colour of this block type as linear `[r, g, b]` in `0.0..=1.0`.
    pub fn base_color(self) -> [f32; 3] {
        let hex = BLOCK_TYPE_TO_COLOR[self as usize];
        [
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        ]
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockType::AIR => "Air",
            BlockType::GRASS => "Grass",
            BlockType::DIRT => "Dirt",
            BlockType::STONE => "Stone",
            BlockType::SAND => "Sand",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_and_unknown_ids_are_rejected() {
        for block_type in BlockType::ALL {
            assert_eq!(BlockType::from_int(block_type.as_int()), Some(block_type));
        }
        assert_eq!(BlockType::from_int(5), None);
        assert_eq!(BlockType::from_int(255), None);
    }

    #[test]
    fn only_air_is_not_solid() {
        assert!(!BlockType::AIR.is_solid());
        assert!(BlockType::GRASS.is_solid());
        assert!(BlockType::SAND.is_solid());
        assert!(BlockType::SAND.is_affected_by_gravity());
        assert!(!BlockType::STONE.is_affected_by_gravity());
    }

    #[test]
    fn base_color_unpacks_hex() {
        assert_eq!(BlockType::STONE.base_color(), [0x88 as f32 / 255.0; 3]);
        assert_eq!(BlockType::AIR.base_color(), [0.0; 3]);
    }
}
