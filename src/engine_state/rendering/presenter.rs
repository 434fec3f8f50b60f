//! The seam between the voxel world and whatever displays it.
//!
//! The world owns chunk geometry; a presenter owns the live display objects
//! built from it. The world hands a presenter each freshly built [`ChunkMesh`]
//! and keeps the returned handle so it can later detach the object or toggle
//! its visibility. The world never reads anything back from the presenter.

use std::collections::HashMap;

use log::trace;

use crate::engine_state::voxels::chunk::ChunkKey;

use super::meshing::ChunkMesh;

/// Realizes chunk meshes as displayable objects.
pub trait ChunkPresenter {
    /// Identifies one realized display object.
    type Handle;

    /// Creates a display object for `mesh`, which belongs to chunk `key`.
    ///
    /// Called only with non-empty meshes.
    fn attach(&mut self, key: ChunkKey, mesh: &ChunkMesh) -> Self::Handle;

    /// Removes and disposes a display object created by [`ChunkPresenter::attach`].
    fn detach(&mut self, handle: Self::Handle);

    /// Shows or hides a display object without disposing it.
    fn set_visible(&mut self, handle: &Self::Handle, visible: bool);
}

/// Handle issued by [`HeadlessPresenter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessHandle(pub u64);

/// Book-keeping for one object held by the [`HeadlessPresenter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessObject {
    /// The chunk the object was built for
    pub key: ChunkKey,
    /// Number of cube instances in the object
    pub instance_count: usize,
    /// Current visibility
    pub visible: bool,
}

/// A presenter without a display. It tracks live objects and their
/// visibility, which is enough to drive the engine from tests or a headless run.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    next_handle: u64,
    objects: HashMap<HeadlessHandle, HeadlessObject>,
    total_attached: u64,
    total_detached: u64,
}

impl HeadlessPresenter {
    /// Creates a presenter with no live objects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently attached.
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Number of attached objects currently visible.
    pub fn visible_objects(&self) -> usize {
        self.objects.values().filter(|object| object.visible).count()
    }

    /// Total cube instances over all live objects.
    pub fn live_instances(&self) -> usize {
        self.objects.values().map(|object| object.instance_count).sum()
    }

    /// Looks up the live object for `handle`.
    pub fn object(&self, handle: &HeadlessHandle) -> Option<&HeadlessObject> {
        self.objects.get(handle)
    }

    /// Finds the live object built for chunk `key`, if any.
    pub fn object_for_chunk(&self, key: ChunkKey) -> Option<&HeadlessObject> {
        self.objects.values().find(|object| object.key == key)
    }

    /// Total attach and detach calls seen so far.
    pub fn lifetime_counts(&self) -> (u64, u64) {
        (self.total_attached, self.total_detached)
    }
}

impl ChunkPresenter for HeadlessPresenter {
    type Handle = HeadlessHandle;

    fn attach(&mut self, key: ChunkKey, mesh: &ChunkMesh) -> HeadlessHandle {
        let handle = HeadlessHandle(self.next_handle);
        self.next_handle += 1;
        self.total_attached += 1;
        self.objects.insert(
            handle,
            HeadlessObject {
                key,
                instance_count: mesh.instance_count(),
                visible: true,
            },
        );
        trace!(
            "Attached chunk {} as {:?} ({} instances)",
            key,
            handle,
            mesh.instance_count()
        );
        handle
    }

    fn detach(&mut self, handle: HeadlessHandle) {
        if let Some(object) = self.objects.remove(&handle) {
            self.total_detached += 1;
            trace!("Detached chunk {} ({:?})", object.key, handle);
        }
    }

    fn set_visible(&mut self, handle: &HeadlessHandle, visible: bool) {
        if let Some(object) = self.objects.get_mut(handle) {
            object.visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::meshing::InstanceData, voxels::block::block_type::BlockType,
    };
    use cgmath::Point3;

    fn mesh_of(count: usize) -> ChunkMesh {
        let mut mesh = ChunkMesh::new();
        for i in 0..count {
            mesh.push_instance(
                BlockType::STONE,
                InstanceData::new(Point3::new(i as f32 + 0.5, 0.5, 0.5), [1.0; 3]),
            );
        }
        mesh
    }

    #[test]
    fn tracks_live_objects_and_visibility() {
        let mut presenter = HeadlessPresenter::new();
        let a = presenter.attach(ChunkKey::new(0, 0), &mesh_of(3));
        let b = presenter.attach(ChunkKey::new(1, 0), &mesh_of(2));
        assert_ne!(a, b);
        assert_eq!(presenter.live_objects(), 2);
        assert_eq!(presenter.live_instances(), 5);

        presenter.set_visible(&b, false);
        assert_eq!(presenter.visible_objects(), 1);
        assert_eq!(
            presenter.object_for_chunk(ChunkKey::new(1, 0)).map(|o| o.visible),
            Some(false)
        );

        presenter.detach(a);
        presenter.detach(a);
        assert_eq!(presenter.live_objects(), 1);
        assert_eq!(presenter.lifetime_counts(), (2, 1));
        assert!(presenter.object(&a).is_none());
    }
}
