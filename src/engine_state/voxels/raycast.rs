//! # Voxel Raycast
//!
//! Walks a ray through the voxel grid one cell at a time (Amanatides–Woo traversal)
//! and reports the first stored voxel it enters. Voxels are unit cubes centred on
//! integer coordinates, so the traversal runs on the grid shifted by half a block.

use cgmath::{InnerSpace, Point3, Vector3};

use super::block::{block_side::BlockSide, block_type::BlockType};
use super::VoxelQuery;

/// The first voxel hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Integer coordinates of the hit voxel.
    pub voxel: Point3<i32>,
    /// Type of the hit voxel.
    pub block_type: BlockType,
    /// Face the ray entered through; `None` when the ray started inside the voxel.
    pub side: Option<BlockSide>,
    /// Distance from the ray origin to the entry point.
    pub distance: f32,
}

impl RayHit {
    /// The empty cell in front of the hit face, where a new block would be placed.
    pub fn adjacent(&self) -> Option<Point3<i32>> {
        self.side.map(|side| self.voxel + side.normal())
    }
}

/// Casts a ray from `origin` along `direction` for at most `max_distance`.
pub fn raycast<Q>(query: &Q, origin: Point3<f32>, direction: Vector3<f32>, max_distance: f32) -> Option<RayHit>
where
    Q: VoxelQuery + ?Sized,
{
    if direction.magnitude2() == 0.0 || !max_distance.is_finite() {
        return None;
    }
    let direction = direction.normalize();
    let shifted = origin + Vector3::new(0.5, 0.5, 0.5);

    let mut cell = Point3::new(
        shifted.x.floor() as i32,
        shifted.y.floor() as i32,
        shifted.z.floor() as i32,
    );
    let step = direction.map(|d| if d > 0.0 { 1 } else { -1 });
    let t_delta = direction.map(|d| if d != 0.0 { 1.0 / d.abs() } else { f32::INFINITY });
    let boundary = |s: f32, c: i32, d: f32, delta: f32| {
        if d == 0.0 {
            f32::INFINITY
        } else if d > 0.0 {
            (c as f32 + 1.0 - s) * delta
        } else {
            (s - c as f32) * delta
        }
    };
    let mut t_max = Vector3::new(
        boundary(shifted.x, cell.x, direction.x, t_delta.x),
        boundary(shifted.y, cell.y, direction.y, t_delta.y),
        boundary(shifted.z, cell.z, direction.z, t_delta.z),
    );

    let mut side = None;
    let mut distance = 0.0;
    while distance <= max_distance {
        if let Some(block_type) = query.block_at(cell.x, cell.y, cell.z) {
            return Some(RayHit {
                voxel: cell,
                block_type,
                side,
                distance,
            });
        }

        if t_max.x < t_max.y && t_max.x < t_max.z {
            distance = t_max.x;
            cell.x += step.x;
            t_max.x += t_delta.x;
            side = BlockSide::from_normal(Vector3::new(-step.x, 0, 0));
        } else if t_max.y < t_max.z {
            distance = t_max.y;
            cell.y += step.y;
            t_max.y += t_delta.y;
            side = BlockSide::from_normal(Vector3::new(0, -step.y, 0));
        } else {
            distance = t_max.z;
            cell.z += step.z;
            t_max.z += t_delta.z;
            side = BlockSide::from_normal(Vector3::new(0, 0, -step.z));
        }
    }

    None
}
