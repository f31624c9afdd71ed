//! # Block Type Module
//!
//! This module defines the closed set of materials a voxel can be made of.
//! Empty space is never a block type: it is the absence of a voxel entry.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant doubles as the material index handed to the renderer, so the
/// order here must match [`BLOCK_TYPE_COLORS`](super::BLOCK_TYPE_COLORS).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize, Deserialize)]
pub enum BlockType {
    /// Surface block of temperate columns.
    Grass,
    /// The few layers right below the surface.
    Dirt,
    /// Everything deeper than the dirt layers.
    Stone,
    /// Fills columns up to sea level.
    Water,
    /// Surface block of beaches and sea floors.
    Sand,
    /// Tree trunks.
    Wood,
    /// Tree crowns.
    Leaves,
    /// Surface block of high columns.
    Snow,
    /// Bottom layer of every column.
    Bedrock,
}

impl BlockType {
    /// Number of block types.
    pub const COUNT: usize = 9;

    /// Every block type, in material index order.
    pub const ALL: [BlockType; Self::COUNT] = [
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::Water,
        BlockType::Sand,
        BlockType::Wood,
        BlockType::Leaves,
        BlockType::Snow,
        BlockType::Bedrock,
    ];

    /// Material index of this block type.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a compact material index back into a `BlockType`.
    ///
    /// Returns `None` for indices outside the enumeration.
    pub fn from_index(index: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(index)
    }

    /// Whether the block may top a terrain column.
    pub fn is_surface(self) -> bool {
        matches!(self, BlockType::Grass | BlockType::Sand | BlockType::Snow)
    }

    /// Whether the block is part of a generated tree.
    pub fn is_foliage(self) -> bool {
        matches!(self, BlockType::Wood | BlockType::Leaves)
    }
}
