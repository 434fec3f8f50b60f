//! # Voxel World Entry Point
//!
//! Runs a short headless session through the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_world::run();
}
