//! # Voxel World Entry Point
//!
//! Runs the world headlessly through the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- world.json
//! ```

fn main() {
    voxel_world::run();
}
