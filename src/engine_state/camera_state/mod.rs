//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Mouse-look input
//! - The view frustum used for chunk visibility
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages the camera's projection matrix
//! - `Frustum`: Clip planes extracted from the combined view-projection

use cgmath::{Deg, Matrix4, Point3};

use crate::config::WorldConfig;

use super::voxels::chunk::ChunkKey;

pub mod camera;
pub mod frustum;

use camera::{Camera, Projection};
use frustum::Frustum;

/// The player's eye: camera, projection and look sensitivity.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// The projection used for rendering and culling
    pub projection: Projection,
    /// Radians of rotation per unit of mouse movement
    pub sensitivity: f32,
}

impl CameraState {
    /// Creates a camera at the configured spawn point, looking along +X.
    pub fn new(config: &WorldConfig) -> Self {
        let [x, y, z] = config.spawn_position;
        let projection = Projection::new(
            config.projection.width,
            config.projection.height,
            Deg(config.projection.fov_degrees),
            config.projection.znear,
            config.projection.zfar,
        );
        CameraState {
            camera: Camera::new(Point3::new(x, y, z), Deg(0.0), Deg(0.0)),
            projection,
            sensitivity: config.mouse_sensitivity,
        }
    }

    /// Applies a mouse-look delta.
    pub fn look(&mut self, delta: (f64, f64)) {
        self.camera
            .rotate(delta.0 as f32, delta.1 as f32, self.sensitivity);
    }

    /// Moves the camera to `position`.
    pub fn follow(&mut self, position: Point3<f32>) {
        self.camera.position = position;
    }

    /// Combined projection and view matrix.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }

    /// The current view frustum.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    /// The chunk the camera is in.
    pub fn chunk_position(&self) -> ChunkKey {
        ChunkKey::from_world(self.camera.position.x, self.camera.position.z)
    }
}
