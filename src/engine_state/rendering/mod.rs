//! # Rendering Module
//!
//! Everything the voxel world produces for display, and the trait through which
//! it is handed over.
//!
//! ## Key Components
//!
//! * `meshing` - Instanced cube geometry built from chunk data
//! * `presenter` - The [`ChunkPresenter`] seam and a headless implementation
//!
//! Actual scene management (GPU upload, materials, lighting) lives behind
//! [`ChunkPresenter`] and is not part of this crate.

pub mod meshing;
pub mod presenter;

pub use presenter::{ChunkPresenter, HeadlessHandle, HeadlessObject, HeadlessPresenter};
