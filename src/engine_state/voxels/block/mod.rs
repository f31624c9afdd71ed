//! # Block Module
//!
//! This module provides the block-related vocabulary of the voxel world: the closed
//! set of block types, the faces of a block, and the colour each type is drawn with.

pub mod block_side;
pub mod block_type;

use block_type::BlockType;

/// The underlying integer type used to represent block types in compact form.
pub type BlockTypeSize = u8;

/// Opaque RGB colour of each block type, indexed by `BlockType as usize`.
///
/// The renderer creates one material per entry and reuses it for every batch of
/// that type.
pub static BLOCK_TYPE_COLORS: [u32; BlockType::COUNT] = [
    0x55ff55, // GRASS
    0x8b4513, // DIRT
    0x808080, // STONE
    0x5555ff, // WATER
    0xffff55, // SAND
    0x6b4226, // WOOD
    0x228b22, // LEAVES
    0xfffafa, // SNOW
    0x333333, // BEDROCK
];

/// Looks up the colour a block type is drawn with.
pub fn color_of(block_type: BlockType) -> u32 {
    BLOCK_TYPE_COLORS[block_type.index()]
}
