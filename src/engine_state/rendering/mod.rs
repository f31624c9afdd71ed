//! Rendering seam for the voxel engine.
//!
//! The engine never talks to a GPU API directly. Chunks hand their voxels to a
//! [`RenderBackend`] as one instanced batch per block type; the backend owns the shared
//! unit-cube geometry, one material per block type, and the scene graph the batches are
//! added to.
//!
//! ## Resource discipline
//!
//! A batch is acquired by [`RenderBackend::create_batch`] and released only by
//! [`RenderBackend::dispose_batch`], which takes the batch by value. Chunks release all
//! of their batches before building new ones and when they are unloaded.

pub mod headless;
pub mod instance;

pub use headless::HeadlessRenderer;
pub use instance::InstanceRaw;

use super::voxels::block::block_type::BlockType;

/// The 3D scene collaborator that draws instanced voxel batches.
pub trait RenderBackend {
    /// Handle to one instanced draw batch owned by the backend.
    type Batch;

    /// Creates a batch drawing `instance_count` unit cubes with the material of
    /// `block_type`. The instances start with undefined transforms.
    fn create_batch(&mut self, block_type: BlockType, instance_count: usize) -> Self::Batch;

    /// Sets the world transform of instance `index`.
    fn set_instance_transform(&mut self, batch: &mut Self::Batch, index: usize, instance: InstanceRaw);

    /// Flags the batch's instance data for upload after a series of transform writes.
    fn mark_instances_dirty(&mut self, batch: &mut Self::Batch);

    /// Makes the batch visible.
    fn add_to_scene(&mut self, batch: &Self::Batch);

    /// Hides the batch without releasing it.
    fn remove_from_scene(&mut self, batch: &Self::Batch);

    /// Releases every resource held by the batch.
    fn dispose_batch(&mut self, batch: Self::Batch);
}

/// A backend batch together with what it draws.
pub struct ChunkBatch<B> {
    /// Material of every instance in the batch.
    pub block_type: BlockType,
    /// Number of instances, equal to the number of voxels of `block_type`.
    pub instance_count: usize,
    /// The backend's handle.
    pub batch: B,
}
