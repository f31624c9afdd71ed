//! # Voxel Verse Entry Point
//!
//! Runs the library's scripted headless walk.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

fn main() {
    voxel_verse::run();
}
