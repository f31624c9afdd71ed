//! Axis-aligned occupancy test of the viewer's bounding box against the voxel grid.
//!
//! Voxels are unit cubes centred on integer coordinates. Each face of the box is mapped
//! to the voxel containing it and every voxel in the inclusive range is probed, so voxel
//! `k` counts as touched as soon as a face crosses `k - 0.5` or `k + 0.5`.

use cgmath::Point3;

use crate::config::PhysicsConfig;
use crate::engine_state::voxels::{voxel_coord, VoxelQuery};

/// Dimensions of the viewer's bounding box relative to its eye position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBounds {
    /// Horizontal half-extent.
    pub radius: f32,
    /// Eye to feet.
    pub height: f32,
    /// Lower slice skipped by horizontal checks.
    pub step_height: f32,
}

impl PlayerBounds {
    /// The feet height for an eye at `eye_y`.
    pub fn feet(&self, eye_y: f32) -> f32 {
        eye_y - self.height
    }
}

impl From<&PhysicsConfig> for PlayerBounds {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            radius: config.player_radius,
            height: config.player_height,
            step_height: config.step_height,
        }
    }
}

/// Returns `true` when a stored voxel lies within the box of a viewer whose eye is at
/// `candidate`.
///
/// With `check_full_height` unset the lower `step_height` of the box is ignored, which
/// lets horizontal movement slide over low ledges and keeps it from snagging on the
/// ground.
pub fn check_collision<Q>(query: &Q, candidate: Point3<f32>, check_full_height: bool, bounds: &PlayerBounds) -> bool
where
    Q: VoxelQuery + ?Sized,
{
    let mut bottom = bounds.feet(candidate.y);
    if !check_full_height {
        bottom += bounds.step_height;
    }

    let min_x = voxel_coord(candidate.x - bounds.radius);
    let max_x = voxel_coord(candidate.x + bounds.radius);
    let min_y = voxel_coord(bottom);
    let max_y = voxel_coord(candidate.y);
    let min_z = voxel_coord(candidate.z - bounds.radius);
    let max_z = voxel_coord(candidate.z + bounds.radius);

    for x in min_x..=max_x {
        for y in min_y..=max_y {
            for z in min_z..=max_z {
                if query.block_at(x, y, z).is_some() {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn bounds() -> PlayerBounds {
        PlayerBounds::from(&PhysicsConfig::default())
    }

    fn unit_block() -> HashMap<Point3<i32>, BlockType> {
        HashMap::from([(Point3::new(0, 0, 0), BlockType::Stone)])
    }

    #[test]
    fn box_overlapping_block_collides() {
        let world = unit_block();
        assert!(check_collision(&world, Point3::new(0.0, 1.0, 0.0), true, &bounds()));
        assert!(check_collision(&world, Point3::new(0.3, 0.0, -0.3), true, &bounds()));
    }

    #[test]
    fn distant_boxes_do_not_collide() {
        let world = unit_block();
        for candidate in [
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, -2.0),
        ] {
            assert!(!check_collision(&world, candidate, true, &bounds()), "{:?}", candidate);
        }
    }

    #[test]
    fn standing_on_top_face_is_clear() {
        let world = unit_block();
        assert!(!check_collision(&world, Point3::new(0.0, 2.2, 0.0), true, &bounds()));
        assert!(check_collision(&world, Point3::new(0.0, 2.0, 0.0), true, &bounds()));
    }

    #[test]
    fn step_height_is_ignored_horizontally() {
        let world = unit_block();
        let candidate = Point3::new(0.0, 1.6, 0.0);
        assert!(check_collision(&world, candidate, true, &bounds()));
        assert!(!check_collision(&world, candidate, false, &bounds()));
    }

    #[test]
    fn empty_world_never_collides() {
        let world: HashMap<Point3<i32>, BlockType> = HashMap::new();
        assert!(!check_collision(&world, Point3::new(0.0, 0.0, 0.0), true, &bounds()));
    }
}
