//! Mesh data structures for instanced voxel rendering.
//!
//! A chunk's renderable geometry is a set of batches, one per block type. Each
//! batch is a list of identical unit cubes, described only by their centre and
//! a colour, laid out so it can be uploaded as an instance buffer unchanged.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

/// Per-instance data for one unit cube.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Color: 3x f32 (12 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    /// World-space centre of the cube
    pub position: [f32; 3],
    /// Linear RGB colour in `0.0..=1.0`
    pub color: [f32; 3],
}

impl InstanceData {
    /// Creates instance data for a cube centred at `position`.
    pub fn new(position: Point3<f32>, color: [f32; 3]) -> Self {
        InstanceData {
            position: position.into(),
            color,
        }
    }

    /// The centre of the cube as a point.
    pub fn center(&self) -> Point3<f32> {
        Point3::from(self.position)
    }
}

/// All visible cubes of one block type in a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBatch {
    /// The block type every instance in this batch shares
    pub block_type: BlockType,
    /// Fallback colour for presenters that ignore per-instance colour
    pub base_color: [f32; 3],
    /// The cube instances
    pub instances: Vec<InstanceData>,
}

impl MeshBatch {
    fn new(block_type: BlockType) -> Self {
        MeshBatch {
            block_type,
            base_color: block_type.base_color(),
            instances: Vec::new(),
        }
    }

    /// The raw bytes of the instance list, ready for a GPU buffer write.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Renderable geometry for one chunk, grouped by block type.
///
/// Batches are kept sorted by block type id so two meshes built from the same
/// blocks compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    batches: Vec<MeshBatch>,
}

impl ChunkMesh {
    /// Creates an empty mesh with no batches.
    pub fn new() -> Self {
        ChunkMesh {
            batches: Vec::new(),
        }
    }

    /// Appends an instance to the batch for `block_type`, creating the batch if needed.
    pub fn push_instance(&mut self, block_type: BlockType, instance: InstanceData) {
        let index = match self
            .batches
            .binary_search_by_key(&block_type, |batch| batch.block_type)
        {
            Ok(index) => index,
            Err(index) => {
                self.batches.insert(index, MeshBatch::new(block_type));
                index
            }
        };
        self.batches[index].instances.push(instance);
    }

    /// The batches of this mesh in block type order.
    pub fn batches(&self) -> &[MeshBatch] {
        &self.batches
    }

    /// The batch for `block_type`, if any block of that type is visible.
    pub fn batch(&self, block_type: BlockType) -> Option<&MeshBatch> {
        self.batches
            .iter()
            .find(|batch| batch.block_type == block_type)
    }

    /// Total number of cube instances over all batches.
    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.instances.len()).sum()
    }

    /// Whether the mesh has no instances at all.
    pub fn is_empty(&self) -> bool {
        self.instance_count() == 0
    }

    /// Whether the block whose minimum corner is `block` has an instance in this mesh.
    pub fn contains_block(&self, block: Point3<i32>) -> bool {
        let center = [
            block.x as f32 + 0.5,
            block.y as f32 + 0.5,
            block.z as f32 + 0.5,
        ];
        self.batches
            .iter()
            .flat_map(|batch| batch.instances.iter())
            .any(|instance| instance.position == center)
    }
}

/// Converts an HSL colour to linear RGB. All components are in `0.0..=1.0`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    if saturation == 0.0 {
        return [lightness; 3];
    }

    fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    }

    let q = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    [
        hue_to_channel(p, q, hue + 1.0 / 3.0),
        hue_to_channel(p, q, hue),
        hue_to_channel(p, q, hue - 1.0 / 3.0),
    ]
}
