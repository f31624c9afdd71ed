//! # Chunk Generation
//!
//! Fills a chunk's voxel map from the configured [`TerrainMode`]. Generation is the only
//! writer of the map at creation time and depends on nothing but the chunk position,
//! the noise generator and the terrain settings, so a chunk that is unloaded and later
//! regenerated comes back identical.
//!
//! ## Column rules (noise terrain)
//!
//! For a column with surface height `h`:
//! - `y == bedrock_depth`: bedrock
//! - `y == h`: sand below `sea_level + 2`, snow above `snow_height`, grass otherwise
//! - `h - 3 <= y < h`: dirt
//! - `bedrock_depth < y < h - 3`: stone
//! - `h < y <= sea_level`: water
//! - anything else: empty

use std::collections::hash_map::Entry;

use super::{Chunk, ChunkPos, LocalPos};
use crate::config::{TerrainConfig, TerrainMode};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::noise_generator::NoiseGenerator;

/// Depth of the dirt layer below the surface block.
const DIRT_DEPTH: i32 = 3;

/// Horizontal offsets of the leaves around the top of a trunk.
const CARDINAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

impl<B> Chunk<B> {
    /// Replaces the voxel map with freshly generated terrain.
    pub fn generate(&mut self, generator: &NoiseGenerator, terrain: &TerrainConfig) {
        self.voxels.clear();

        match terrain.mode {
            TerrainMode::Noise => self.generate_noise(generator, terrain),
            TerrainMode::Flat { height, block } => self.generate_flat(height, block),
            TerrainMode::Empty => {}
        }
    }

    fn generate_flat(&mut self, height: i32, block: BlockType) {
        let size = self.chunk_size as u8;
        for x in 0..size {
            for z in 0..size {
                self.voxels.insert(LocalPos::new(x, height, z), block);
            }
        }
    }

    fn generate_noise(&mut self, generator: &NoiseGenerator, terrain: &TerrainConfig) {
        let mut rng = fastrand::Rng::with_seed(chunk_seed(generator.seed(), self.position));
        let (origin_x, origin_z) = self.world_origin();
        let size = self.chunk_size;

        for local_x in 0..size {
            for local_z in 0..size {
                let height = generator.height_at(origin_x + local_x, origin_z + local_z, terrain);
                let top = height.max(terrain.sea_level);
                for y in terrain.bedrock_depth..=top {
                    if let Some(block_type) = column_block(y, height, terrain) {
                        self.voxels
                            .insert(LocalPos::new(local_x as u8, y, local_z as u8), block_type);
                    }
                }

                if surface_block(height, terrain) == BlockType::Grass && rng.f64() < terrain.tree_chance {
                    let trunk = rng.i32(terrain.min_trunk..=terrain.max_trunk);
                    self.grow_tree(local_x, height, local_z, trunk);
                }
            }
        }
    }

    /// Plants a trunk of `trunk` wood blocks on top of the surface at `surface_y`,
    /// with one leaf block above the trunk and four around its top.
    ///
    /// Crown leaves that fall outside the chunk are dropped.
    fn grow_tree(&mut self, local_x: i32, surface_y: i32, local_z: i32, trunk: i32) {
        let top = surface_y + trunk;
        for y in surface_y + 1..=top {
            self.place_if_empty(local_x, y, local_z, BlockType::Wood);
        }
        self.place_if_empty(local_x, top + 1, local_z, BlockType::Leaves);
        for (dx, dz) in CARDINAL_OFFSETS {
            self.place_if_empty(local_x + dx, top, local_z + dz, BlockType::Leaves);
        }
    }

    fn place_if_empty(&mut self, local_x: i32, y: i32, local_z: i32, block_type: BlockType) {
        let Some(key) = self.local_key(local_x, y, local_z) else {
            return;
        };
        if let Entry::Vacant(entry) = self.voxels.entry(key) {
            entry.insert(block_type);
        }
    }
}

/// Block at height `y` of a column whose surface is at `height`.
pub(crate) fn column_block(y: i32, height: i32, terrain: &TerrainConfig) -> Option<BlockType> {
    if y == terrain.bedrock_depth {
        Some(BlockType::Bedrock)
    } else if y < terrain.bedrock_depth {
        None
    } else if y == height {
        Some(surface_block(height, terrain))
    } else if y < height {
        if y >= height - DIRT_DEPTH {
            Some(BlockType::Dirt)
        } else {
            Some(BlockType::Stone)
        }
    } else if y <= terrain.sea_level {
        Some(BlockType::Water)
    } else {
        None
    }
}

/// Block topping a column whose surface is at `height`.
pub(crate) fn surface_block(height: i32, terrain: &TerrainConfig) -> BlockType {
    if height < terrain.sea_level + 2 {
        BlockType::Sand
    } else if height > terrain.snow_height {
        BlockType::Snow
    } else {
        BlockType::Grass
    }
}

/// Seed of the tree generator of one chunk.
fn chunk_seed(seed: u32, position: ChunkPos) -> u64 {
    let x = (position.x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let z = (position.z as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    u64::from(seed).wrapping_mul(0x1656_67B1_9E37_79F9) ^ x ^ z.rotate_left(31)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine_state::rendering::headless::HeadlessBatch;

    fn generated(position: ChunkPos, terrain: &TerrainConfig) -> Chunk<HeadlessBatch> {
        let mut chunk = Chunk::empty(position, 16);
        chunk.generate(&NoiseGenerator::new(terrain.seed), terrain);
        chunk
    }

    fn columns(chunk: &Chunk<HeadlessBatch>) -> HashMap<(u8, u8), Vec<(i32, BlockType)>> {
        let mut columns: HashMap<(u8, u8), Vec<(i32, BlockType)>> = HashMap::new();
        for (pos, block_type) in chunk.voxels() {
            columns.entry((pos.x, pos.z)).or_default().push((pos.y, *block_type));
        }
        for column in columns.values_mut() {
            column.sort();
        }
        columns
    }

    #[test]
    fn generation_is_deterministic() {
        let terrain = TerrainConfig {
            tree_chance: 0.5,
            ..TerrainConfig::default()
        };
        for position in [ChunkPos::new(0, 0), ChunkPos::new(-3, 7), ChunkPos::new(12, -40)] {
            let first = generated(position, &terrain);
            let second = generated(position, &terrain);
            assert_eq!(first.voxels(), second.voxels());
        }
    }

    #[test]
    fn regenerating_in_place_is_identical() {
        let terrain = TerrainConfig::default();
        let generator = NoiseGenerator::new(0);
        let mut chunk: Chunk<HeadlessBatch> = Chunk::empty(ChunkPos::new(5, 5), 16);
        chunk.generate(&generator, &terrain);
        let before = chunk.voxels().clone();
        chunk.generate(&generator, &terrain);
        assert_eq!(&before, chunk.voxels());
    }

    #[test]
    fn surface_rule_wins_at_the_top_of_every_column() {
        let terrain = TerrainConfig {
            tree_chance: 0.0,
            ..TerrainConfig::default()
        };
        for position in [ChunkPos::new(0, 0), ChunkPos::new(4, -2), ChunkPos::new(-9, 3)] {
            let chunk = generated(position, &terrain);
            let columns = columns(&chunk);
            assert_eq!(columns.len(), 16 * 16);
            for column in columns.values() {
                let (_, top) = column
                    .iter()
                    .rev()
                    .find(|(_, t)| *t != BlockType::Water)
                    .copied()
                    .unwrap();
                assert!(top.is_surface(), "column topped by {top:?}");
            }
        }
    }

    #[test]
    fn surface_rule_wins_below_trees() {
        let terrain = TerrainConfig {
            tree_chance: 1.0,
            ..TerrainConfig::default()
        };
        let chunk = generated(ChunkPos::new(1, 1), &terrain);
        for column in columns(&chunk).values() {
            let (_, top) = column
                .iter()
                .rev()
                .find(|(_, t)| *t != BlockType::Water && !t.is_foliage())
                .copied()
                .unwrap();
            assert!(top.is_surface(), "column topped by {top:?}");
        }
    }

    #[test]
    fn columns_follow_the_layer_table() {
        let terrain = TerrainConfig {
            tree_chance: 0.0,
            ..TerrainConfig::default()
        };
        let generator = NoiseGenerator::new(0);
        let chunk = generated(ChunkPos::new(2, 2), &terrain);
        let (origin_x, origin_z) = chunk.world_origin();

        for local_x in 0..16 {
            for local_z in 0..16 {
                let height = generator.height_at(origin_x + local_x, origin_z + local_z, &terrain);
                assert_eq!(
                    chunk.get_block(local_x, terrain.bedrock_depth, local_z),
                    Some(BlockType::Bedrock)
                );
                assert_eq!(chunk.get_block(local_x, terrain.bedrock_depth - 1, local_z), None);
                assert_eq!(
                    chunk.get_block(local_x, height, local_z),
                    Some(surface_block(height, &terrain))
                );
                for y in height - DIRT_DEPTH..height {
                    if y > terrain.bedrock_depth {
                        assert_eq!(chunk.get_block(local_x, y, local_z), Some(BlockType::Dirt));
                    }
                }
                for y in terrain.bedrock_depth + 1..height - DIRT_DEPTH {
                    assert_eq!(chunk.get_block(local_x, y, local_z), Some(BlockType::Stone));
                }
                for y in height + 1..=terrain.sea_level {
                    assert_eq!(chunk.get_block(local_x, y, local_z), Some(BlockType::Water));
                }
                let above = height.max(terrain.sea_level) + 1;
                assert_eq!(chunk.get_block(local_x, above, local_z), None);
            }
        }
    }

    #[test]
    fn surface_thresholds() {
        let terrain = TerrainConfig::default();
        assert_eq!(surface_block(terrain.sea_level + 1, &terrain), BlockType::Sand);
        assert_eq!(surface_block(terrain.sea_level + 2, &terrain), BlockType::Grass);
        assert_eq!(surface_block(terrain.snow_height, &terrain), BlockType::Grass);
        assert_eq!(surface_block(terrain.snow_height + 1, &terrain), BlockType::Snow);
        assert_eq!(column_block(terrain.sea_level, 2, &terrain), Some(BlockType::Water));
        assert_eq!(column_block(terrain.sea_level + 1, 2, &terrain), None);
    }

    #[test]
    fn trees_have_trunks_and_crowns() {
        let terrain = TerrainConfig {
            tree_chance: 1.0,
            ..TerrainConfig::default()
        };
        let chunk = generated(ChunkPos::new(0, 3), &terrain);
        let wood: Vec<&LocalPos> = chunk
            .voxels()
            .iter()
            .filter(|(_, t)| **t == BlockType::Wood)
            .map(|(p, _)| p)
            .collect();
        let leaves = chunk
            .voxels()
            .values()
            .filter(|t| **t == BlockType::Leaves)
            .count();

        let any_grass = chunk.voxels().values().any(|t| *t == BlockType::Grass);
        if any_grass {
            assert!(!wood.is_empty());
            assert!(leaves > 0);
        }
        for pos in wood {
            let below = chunk.get_block(i32::from(pos.x), pos.y - 1, i32::from(pos.z));
            assert!(matches!(below, Some(BlockType::Wood | BlockType::Grass | BlockType::Leaves)));
        }
    }

    #[test]
    fn trees_grow_on_chunk_border_columns() {
        let terrain = TerrainConfig {
            tree_chance: 1.0,
            ..TerrainConfig::default()
        };
        let generator = NoiseGenerator::new(terrain.seed);
        let on_border = |v: i32| v == 0 || v == 15;

        let mut border_grass = 0;
        let mut border_trunks = 0;
        for cx in 0..6 {
            for cz in 0..6 {
                let chunk = generated(ChunkPos::new(cx, cz), &terrain);
                let (origin_x, origin_z) = chunk.world_origin();
                for local_x in 0..16 {
                    for local_z in 0..16 {
                        if !on_border(local_x) && !on_border(local_z) {
                            continue;
                        }
                        let height = generator.height_at(origin_x + local_x, origin_z + local_z, &terrain);
                        if surface_block(height, &terrain) != BlockType::Grass {
                            continue;
                        }
                        border_grass += 1;
                        let trunk = (height + 1..=height + terrain.max_trunk)
                            .any(|y| chunk.get_block(local_x, y, local_z) == Some(BlockType::Wood));
                        if trunk {
                            border_trunks += 1;
                        }
                    }
                }
            }
        }

        assert!(border_grass > 0);
        assert!(border_trunks > 0);
    }

    #[test]
    fn flat_and_empty_modes() {
        let flat = TerrainConfig {
            mode: TerrainMode::Flat {
                height: 3,
                block: BlockType::Stone,
            },
            ..TerrainConfig::default()
        };
        let chunk = generated(ChunkPos::new(0, 0), &flat);
        assert_eq!(chunk.block_count(), 256);
        assert_eq!(chunk.get_block(15, 3, 0), Some(BlockType::Stone));

        let empty = TerrainConfig {
            mode: TerrainMode::Empty,
            ..TerrainConfig::default()
        };
        assert_eq!(generated(ChunkPos::new(0, 0), &empty).block_count(), 0);
    }
}
