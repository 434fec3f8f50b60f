//! # Voxel Raycasting
//!
//! Grid traversal in the style of Amanatides and Woo: the ray visits every
//! cell it passes through, in order, and stops at the first solid one.

use cgmath::{InnerSpace, Point3, Vector3};

use super::{block::block_side::BlockSide, chunk::WORLD_HEIGHT, world::VoxelQuery};

/// Maximum number of cells visited before giving up.
pub const MAX_RAYCAST_STEPS: usize = 128;

/// The block a ray stopped at and the face it entered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaycastHit {
    /// World coordinate of the solid block
    pub block: Point3<i32>,
    /// Unit axis normal of the entered face, pointing back toward the ray origin
    pub normal: Vector3<i32>,
}

impl RaycastHit {
    /// The empty cell in front of the hit face, where a new block would go.
    pub fn adjacent(&self) -> Point3<i32> {
        self.block + self.normal
    }

    /// The side of the block the ray entered through.
    pub fn side(&self) -> Option<BlockSide> {
        BlockSide::from_normal(self.normal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// Per-axis traversal state.
struct AxisWalk {
    step: i32,
    t_delta: f32,
    t_max: f32,
}

impl AxisWalk {
    fn new(origin: f32, cell: i32, direction: f32) -> Self {
        let step = if direction > 0.0 { 1 } else { -1 };
        if direction.abs() < f32::EPSILON {
            return AxisWalk {
                step,
                t_delta: f32::INFINITY,
                t_max: f32::INFINITY,
            };
        }
        let boundary = cell + if step > 0 { 1 } else { 0 };
        AxisWalk {
            step,
            t_delta: (1.0 / direction).abs(),
            t_max: ((boundary as f32 - origin) / direction).abs(),
        }
    }
}

/// Walks the voxel grid from `origin` along `direction` and returns the first
/// solid block within [`MAX_RAYCAST_STEPS`] cells.
///
/// Cells above or below the world's height band are never reported, even
/// though [`VoxelQuery::is_solid_at`] treats them as solid. A ray that leaves
/// the band and keeps moving away from it misses immediately.
///
/// # Arguments
/// * `world` - Solidity source
/// * `origin` - Ray start in world space
/// * `direction` - Ray direction, need not be normalized
///
/// # Returns
/// The hit block and entered face, or `None` for a zero direction or no hit.
pub fn raycast_voxel<Q: VoxelQuery + ?Sized>(
    world: &Q,
    origin: Point3<f32>,
    direction: Vector3<f32>,
) -> Option<RaycastHit> {
    if direction.magnitude2() == 0.0 || !direction.magnitude2().is_finite() {
        return None;
    }
    let dir = direction.normalize();

    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );
    let mut x = AxisWalk::new(origin.x, cell.x, dir.x);
    let mut y = AxisWalk::new(origin.y, cell.y, dir.y);
    let mut z = AxisWalk::new(origin.z, cell.z, dir.z);
    let mut last_axis: Option<Axis> = None;

    for _ in 0..MAX_RAYCAST_STEPS {
        let in_band = (0..WORLD_HEIGHT).contains(&cell.y);
        if in_band && world.is_solid_at(cell.x, cell.y, cell.z) {
            let axis = last_axis.unwrap_or_else(|| nearest_axis(&x, &y, &z));
            let normal = match axis {
                Axis::X => Vector3::new(-x.step, 0, 0),
                Axis::Y => Vector3::new(0, -y.step, 0),
                Axis::Z => Vector3::new(0, 0, -z.step),
            };
            return Some(RaycastHit { block: cell, normal });
        }
        if !in_band && leaving_band(cell.y, dir.y) {
            return None;
        }

        let axis = if x.t_max < y.t_max {
            if x.t_max < z.t_max {
                Axis::X
            } else {
                Axis::Z
            }
        } else if y.t_max < z.t_max {
            Axis::Y
        } else {
            Axis::Z
        };
        match axis {
            Axis::X => {
                cell.x += x.step;
                x.t_max += x.t_delta;
            }
            Axis::Y => {
                cell.y += y.step;
                y.t_max += y.t_delta;
            }
            Axis::Z => {
                cell.z += z.step;
                z.t_max += z.t_delta;
            }
        }
        last_axis = Some(axis);
    }
    None
}

/// Used only when the ray starts inside a solid cell.
fn nearest_axis(x: &AxisWalk, y: &AxisWalk, z: &AxisWalk) -> Axis {
    if x.t_max < y.t_max && x.t_max < z.t_max {
        Axis::X
    } else if y.t_max < z.t_max {
        Axis::Y
    } else {
        Axis::Z
    }
}

fn leaving_band(cell_y: i32, dir_y: f32) -> bool {
    (cell_y < 0 && dir_y <= 0.0) || (cell_y >= WORLD_HEIGHT && dir_y >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use std::collections::HashSet;

    /// A world made of a fixed set of solid cells.
    struct Blocks(HashSet<(i32, i32, i32)>);

    impl VoxelQuery for Blocks {
        fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool {
            !(0..WORLD_HEIGHT).contains(&y) || self.0.contains(&(x, y, z))
        }

        fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
            if self.0.contains(&(x, y, z)) {
                BlockType::STONE
            } else {
                BlockType::AIR
            }
        }
    }

    fn single(x: i32, y: i32, z: i32) -> Blocks {
        Blocks([(x, y, z)].into_iter().collect())
    }

    #[test]
    fn hits_block_straight_ahead_with_facing_normal() {
        let world = single(5, 10, 0);
        let hit = raycast_voxel(
            &world,
            Point3::new(0.5, 10.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
        )
        .unwrap();
        assert_eq!(hit.block, Point3::new(5, 10, 0));
        assert_eq!(hit.normal, Vector3::new(-1, 0, 0));
        assert_eq!(hit.adjacent(), Point3::new(4, 10, 0));
        assert_eq!(hit.side(), Some(BlockSide::LEFT));
    }

    #[test]
    fn normal_faces_the_origin_on_every_axis() {
        let cases = [
            ((-1.0, 0.0, 0.0), (-4, 10, 0), (1, 0, 0)),
            ((0.0, -1.0, 0.0), (0, 3, 0), (0, 1, 0)),
            ((0.0, 1.0, 0.0), (0, 20, 0), (0, -1, 0)),
            ((0.0, 0.0, 1.0), (0, 10, 7), (0, 0, -1)),
            ((0.0, 0.0, -1.0), (0, 10, -7), (0, 0, 1)),
        ]
        .map(|(d, b, n)| (Vector3::from(d), Point3::from(b), Vector3::from(n)));
        for (direction, block, normal) in cases {
            let world = single(block.x, block.y, block.z);
            let hit = raycast_voxel(&world, Point3::new(0.5, 10.5, 0.5), direction).unwrap();
            assert_eq!(hit.block, block, "direction {direction:?}");
            assert_eq!(hit.normal, normal, "direction {direction:?}");
        }
    }

    #[test]
    fn diagonal_ray_reports_entered_face() {
        // Looking down at a floor from above and to the side.
        let world = Blocks((-10..10).map(|x| (x, 5, 0)).collect());
        let hit = raycast_voxel(
            &world,
            Point3::new(0.5, 9.5, 0.5),
            Vector3::new(0.3, -1.0, 0.0),
        )
        .unwrap();
        assert_eq!(hit.block.y, 5);
        assert_eq!(hit.normal, Vector3::new(0, 1, 0));
    }

    #[test]
    fn empty_space_is_a_miss() {
        let world = Blocks(HashSet::new());
        assert!(raycast_voxel(
            &world,
            Point3::new(0.5, 30.5, 0.5),
            Vector3::new(1.0, 0.0, 0.2)
        )
        .is_none());
    }

    #[test]
    fn blocks_beyond_reach_are_missed() {
        let world = single(200, 10, 0);
        assert!(raycast_voxel(
            &world,
            Point3::new(0.5, 10.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0)
        )
        .is_none());
    }

    #[test]
    fn height_bounds_are_not_targets() {
        let world = Blocks(HashSet::new());
        // Straight down through the floor and straight up through the ceiling.
        let down = Vector3::new(0.0, -1.0, 0.0);
        let up = Vector3::new(0.0, 1.0, 0.0);
        assert!(raycast_voxel(&world, Point3::new(0.5, 2.5, 0.5), down).is_none());
        assert!(raycast_voxel(&world, Point3::new(0.5, 62.5, 0.5), up).is_none());
    }

    #[test]
    fn ray_from_above_the_world_can_hit_inside_it() {
        let world = single(0, 63, 0);
        let hit = raycast_voxel(
            &world,
            Point3::new(0.5, 70.5, 0.5),
            Vector3::new(0.0, -1.0, 0.0),
        )
        .unwrap();
        assert_eq!(hit.block, Point3::new(0, 63, 0));
        assert_eq!(hit.normal, Vector3::new(0, 1, 0));
    }

    #[test]
    fn zero_direction_is_a_miss() {
        let world = single(0, 10, 0);
        let origin = Point3::new(0.5, 10.5, 0.5);
        assert!(raycast_voxel(&world, origin, Vector3::new(0.0, 0.0, 0.0)).is_none());
    }

    /// Both cells the ray could enter first are solid; the tie decides which.
    fn tied_hit(direction: (f32, f32, f32), solid: [(i32, i32, i32); 2]) -> RaycastHit {
        let world = Blocks(solid.into_iter().collect());
        let origin = Point3::new(0.5, 10.5, 0.5);
        raycast_voxel(&world, origin, Vector3::from(direction)).unwrap()
    }

    #[test]
    fn ties_between_x_and_y_step_along_y() {
        let hit = tied_hit((1.0, 1.0, 0.0), [(1, 10, 0), (0, 11, 0)]);
        assert_eq!(hit.block, Point3::new(0, 11, 0));
        assert_eq!(hit.normal, Vector3::new(0, -1, 0));
    }

    #[test]
    fn ties_between_x_and_z_step_along_z() {
        let hit = tied_hit((1.0, 0.0, 1.0), [(1, 10, 0), (0, 10, 1)]);
        assert_eq!(hit.block, Point3::new(0, 10, 1));
        assert_eq!(hit.normal, Vector3::new(0, 0, -1));
    }

    #[test]
    fn ties_between_y_and_z_step_along_z() {
        let hit = tied_hit((0.0, -1.0, 1.0), [(0, 9, 0), (0, 10, 1)]);
        assert_eq!(hit.block, Point3::new(0, 10, 1));
        assert_eq!(hit.normal, Vector3::new(0, 0, -1));
    }

    #[test]
    fn three_way_tie_steps_along_z() {
        let world = Blocks([(1, 10, 0), (0, 11, 0), (0, 10, 1)].into_iter().collect());
        let hit = raycast_voxel(
            &world,
            Point3::new(0.5, 10.5, 0.5),
            Vector3::new(1.0, 1.0, 1.0),
        )
        .unwrap();
        assert_eq!(hit.block, Point3::new(0, 10, 1));
        assert_eq!(hit.normal, Vector3::new(0, 0, -1));
    }
}
