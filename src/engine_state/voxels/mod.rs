//! # Voxel World
//!
//! This module contains the voxel data of the engine: what a block is, how blocks are
//! stored in chunks, how chunks are generated, and how the world streams chunks around
//! the viewer.
//!
//! ## Architecture
//!
//! * **Block**: the closed set of block types and the faces of a block
//! * **Noise generator**: the deterministic gradient noise the terrain is sampled from
//! * **Chunk**: a sparse column of voxels that generates itself and owns its render batches
//! * **World**: the set of loaded chunks, keyed by chunk position, and global voxel access
//! * **Streaming**: which chunks should be loaded, and how often that is re-evaluated
//! * **Raycast**: grid traversal used to pick the block under the crosshair
//!
//! ## Data Flow
//!
//! 1. The world is told where the viewer is
//! 2. Chunks entering render distance are generated and built; chunks leaving it are disposed
//! 3. Collision and picking query voxels through [`VoxelQuery`]
//! 4. Edits are routed to the owning chunk, which rebuilds its batches

use std::collections::HashMap;

use cgmath::Point3;

use block::block_type::BlockType;

pub mod block;
pub mod chunk;
pub mod noise_generator;
pub mod raycast;
pub mod streaming;
pub mod world;

/// Read access to voxels by integer world coordinates.
///
/// `None` means empty, whether the voxel is air or its chunk is not loaded.
pub trait VoxelQuery {
    /// The block at integer world coordinates.
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockType>;
}

/// The integer coordinate of the voxel containing `v`.
///
/// Ties round toward positive infinity, so `-1.5` lands in voxel `-1`.
pub fn voxel_coord(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

impl VoxelQuery for HashMap<Point3<i32>, BlockType> {
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        self.get(&Point3::new(x, y, z)).copied()
    }
}
