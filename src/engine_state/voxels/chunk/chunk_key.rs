//! Chunk coordinates and their `"cx,cz"` string form.

use std::{fmt, str::FromStr};

use thiserror::Error;

use super::CHUNK_DIMENSION;

/// Identifies a chunk column by its integer chunk coordinates.
///
/// Chunk `(cx, cz)` covers world columns `cx*16 ..= cx*16 + 15` along X and
/// the matching range along Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Chunk coordinate along X
    pub cx: i32,
    /// Chunk coordinate along Z
    pub cz: i32,
}

/// Returned when a string is not of the form `"cx,cz"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chunk key {0:?}, expected \"cx,cz\"")]
pub struct ChunkKeyParseError(pub String);

impl ChunkKey {
    /// Smallest chunk coordinate whose blocks all have `i32` world coordinates.
    pub const MIN_COORD: i32 = i32::MIN / CHUNK_DIMENSION;
    /// Largest chunk coordinate whose blocks all have `i32` world coordinates.
    pub const MAX_COORD: i32 = i32::MAX / CHUNK_DIMENSION;

    /// Creates a key from chunk coordinates.
    pub const fn new(cx: i32, cz: i32) -> Self {
        ChunkKey { cx, cz }
    }

    /// The key of the chunk containing the integer block column `(x, z)`.
    pub fn from_block(x: i32, z: i32) -> Self {
        ChunkKey {
            cx: x.div_euclid(CHUNK_DIMENSION),
            cz: z.div_euclid(CHUNK_DIMENSION),
        }
    }

    /// The key of the chunk containing world position `(x, z)`.
    ///
    /// Uses floor division, so `-0.5` belongs to chunk `-1`. Positions beyond
    /// the addressable range clamp to the outermost chunk.
    pub fn from_world(x: f32, z: f32) -> Self {
        let axis = |v: f32| {
            let chunk = (v / CHUNK_DIMENSION as f32).floor() as i32;
            chunk.clamp(Self::MIN_COORD, Self::MAX_COORD)
        };
        ChunkKey {
            cx: axis(x),
            cz: axis(z),
        }
    }

    /// The key `(cx + dx, cz + dz)`, or `None` past the addressable range.
    pub fn offset(&self, dx: i32, dz: i32) -> Option<ChunkKey> {
        let range = Self::MIN_COORD..=Self::MAX_COORD;
        let cx = self.cx.checked_add(dx).filter(|c| range.contains(c))?;
        let cz = self.cz.checked_add(dz).filter(|c| range.contains(c))?;
        Some(ChunkKey { cx, cz })
    }

    /// World-space X of this chunk's minimum corner.
    pub fn origin_x(&self) -> i32 {
        self.cx.saturating_mul(CHUNK_DIMENSION)
    }

    /// World-space Z of this chunk's minimum corner.
    pub fn origin_z(&self) -> i32 {
        self.cz.saturating_mul(CHUNK_DIMENSION)
    }

    /// L∞ (Chebyshev) distance to `other` in chunks.
    pub fn chebyshev_distance(&self, other: &ChunkKey) -> i32 {
        let distance = self.cx.abs_diff(other.cx).max(self.cz.abs_diff(other.cz));
        i32::try_from(distance).unwrap_or(i32::MAX)
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.cx, self.cz)
    }
}

impl FromStr for ChunkKey {
    type Err = ChunkKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cx, cz) = s
            .split_once(',')
            .ok_or_else(|| ChunkKeyParseError(s.to_string()))?;
        let cx = cx
            .trim()
            .parse()
            .map_err(|_| ChunkKeyParseError(s.to_string()))?;
        let cz = cz
            .trim()
            .parse()
            .map_err(|_| ChunkKeyParseError(s.to_string()))?;
        Ok(ChunkKey { cx, cz })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_string_round_trip() {
        let key = ChunkKey::new(-3, 12);
        assert_eq!(key.to_string(), "-3,12");
        assert_eq!("-3,12".parse::<ChunkKey>(), Ok(key));
        assert!("3;12".parse::<ChunkKey>().is_err());
        assert!("a,1".parse::<ChunkKey>().is_err());
    }

    #[test]
    fn negative_coordinates_floor_toward_negative_infinity() {
        assert_eq!(ChunkKey::from_world(-0.5, 0.0), ChunkKey::new(-1, 0));
        assert_eq!(ChunkKey::from_world(15.99, -16.0), ChunkKey::new(0, -1));
        assert_eq!(ChunkKey::from_world(-16.01, 16.0), ChunkKey::new(-2, 1));
        assert_eq!(ChunkKey::from_block(-1, -17), ChunkKey::new(-1, -2));
        assert_eq!(ChunkKey::from_block(16, 15), ChunkKey::new(1, 0));
    }

    #[test]
    fn chebyshev_distance_uses_the_larger_axis() {
        let a = ChunkKey::new(0, 0);
        assert_eq!(a.chebyshev_distance(&ChunkKey::new(3, -7)), 7);
        assert_eq!(ChunkKey::new(2, 5).origin_x(), 32);
        assert_eq!(ChunkKey::new(2, -5).origin_z(), -80);
        let far = ChunkKey::new(i32::MIN, 0);
        assert_eq!(far.chebyshev_distance(&ChunkKey::new(i32::MAX, 0)), i32::MAX);
    }

    #[test]
    fn extreme_positions_stay_addressable() {
        let east = ChunkKey::from_world(3.0e10, -3.0e10);
        assert_eq!(east, ChunkKey::new(ChunkKey::MAX_COORD, ChunkKey::MIN_COORD));
        assert_eq!(east.origin_x(), i32::MAX - (CHUNK_DIMENSION - 1));
        assert_eq!(east.origin_z(), i32::MIN);
        assert_eq!(ChunkKey::from_block(i32::MAX, i32::MIN), east);

        assert_eq!(east.offset(1, 0), None);
        assert_eq!(east.offset(0, -1), None);
        assert_eq!(
            east.offset(-2, 3),
            Some(ChunkKey::new(ChunkKey::MAX_COORD - 2, ChunkKey::MIN_COORD + 3))
        );
        assert_eq!(ChunkKey::new(i32::MAX, 0).origin_x(), i32::MAX);
    }
}
