//! Per-instance data for instanced voxel batches.
//!
//! Every voxel of a batch is the shared unit cube moved to the voxel's world position,
//! so the only per-instance data is a model matrix.

use cgmath::{Matrix4, Vector3};

/// A per-instance model matrix in the layout the GPU expects.
///
/// # Memory Layout
/// - Model: 4x4 f32, column-major (64 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// An instance that translates the unit cube to `translation`.
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            model: Matrix4::from_translation(translation).into(),
        }
    }

    /// The translation part of the model matrix.
    pub fn translation(&self) -> Vector3<f32> {
        let column = self.model[3];
        Vector3::new(column[0], column[1], column[2])
    }
}
