//! Breaking and placing blocks under the crosshair, and the hotbar of placeable types.

use cgmath::Point3;
use thiserror::Error;

use super::physics::{collision::PlayerBounds, ViewerBody};
use super::rendering::RenderBackend;
use super::voxels::block::block_type::BlockType;
use super::voxels::raycast::RayHit;
use super::voxels::world::World;
use super::voxels::VoxelQuery;

/// Block types selectable from the hotbar, in slot order.
pub const HOTBAR_BLOCKS: [BlockType; 5] = [
    BlockType::Grass,
    BlockType::Dirt,
    BlockType::Stone,
    BlockType::Water,
    BlockType::Sand,
];

/// Why a block could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    /// The ray started inside a voxel, so there is no face to place against.
    #[error("no face to place against")]
    NoFace,
    /// The target cell already holds a block.
    #[error("cell ({0}, {1}, {2}) is occupied")]
    Occupied(i32, i32, i32),
    /// The new block would overlap the viewer.
    #[error("cell ({0}, {1}, {2}) intersects the viewer")]
    IntersectsViewer(i32, i32, i32),
    /// The target cell belongs to a chunk that is not loaded.
    #[error("cell ({0}, {1}, {2}) is not loaded")]
    Unloaded(i32, i32, i32),
}

/// The selected block type out of [`HOTBAR_BLOCKS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hotbar {
    selected: usize,
}

impl Hotbar {
    /// Index of the selected slot.
    pub fn selected_slot(&self) -> usize {
        self.selected
    }

    /// The block type placed by the next placement.
    pub fn selected(&self) -> BlockType {
        HOTBAR_BLOCKS[self.selected]
    }

    /// Selects `slot`; returns `false` and keeps the current slot when out of range.
    pub fn select(&mut self, slot: usize) -> bool {
        if slot < HOTBAR_BLOCKS.len() {
            self.selected = slot;
            true
        } else {
            false
        }
    }
}

/// Removes the voxel hit by a ray. Returns whether a voxel was removed.
pub fn break_block<B, R>(world: &mut World<B>, renderer: &mut R, hit: &RayHit) -> bool
where
    R: RenderBackend<Batch = B>,
{
    let Point3 { x, y, z } = hit.voxel;
    let removed = world.set_block_at(renderer, x, y, z, None);
    if removed {
        log::debug!("broke {:?} at ({}, {}, {})", hit.block_type, x, y, z);
    }
    removed
}

/// Places `block` in the empty cell in front of the face a ray hit.
///
/// # Arguments
///
/// * `world` - The world to edit
/// * `renderer` - Backend of the world's chunk batches
/// * `hit` - The ray hit to place against
/// * `body` - The viewer, which the new block must not overlap
/// * `block` - Type of the new block
/// * `bounds` - The viewer's bounding box
///
/// # Returns
///
/// The cell the block was placed in.
pub fn place_block<B, R>(
    world: &mut World<B>,
    renderer: &mut R,
    hit: &RayHit,
    body: &ViewerBody,
    block: BlockType,
    bounds: &PlayerBounds,
) -> Result<Point3<i32>, PlaceError>
where
    R: RenderBackend<Batch = B>,
{
    let target = hit.adjacent().ok_or(PlaceError::NoFace)?;
    let Point3 { x, y, z } = target;

    if world.block_at(x, y, z).is_some() {
        return Err(PlaceError::Occupied(x, y, z));
    }
    if intersects_viewer(target, body.position, bounds) {
        return Err(PlaceError::IntersectsViewer(x, y, z));
    }
    if !world.set_block_at(renderer, x, y, z, Some(block)) {
        return Err(PlaceError::Unloaded(x, y, z));
    }

    log::debug!("placed {:?} at ({}, {}, {})", block, x, y, z);
    Ok(target)
}

/// Whether the unit cube centred on `cell` overlaps the viewer's box at `eye`.
fn intersects_viewer(cell: Point3<i32>, eye: Point3<f32>, bounds: &PlayerBounds) -> bool {
    let overlaps = |centre: i32, low: f32, high: f32| {
        let centre = centre as f32;
        centre - 0.5 < high && centre + 0.5 > low
    };
    overlaps(cell.x, eye.x - bounds.radius, eye.x + bounds.radius)
        && overlaps(cell.y, bounds.feet(eye.y), eye.y)
        && overlaps(cell.z, eye.z - bounds.radius, eye.z + bounds.radius)
}
