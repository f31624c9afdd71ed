//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-footprint, vertically unbounded
//! column of voxels, and the unit the world streams in and out.
//!
//! ## Storage
//!
//! Voxels are kept in a sparse map from [`LocalPos`] to [`BlockType`]. Air is the
//! absence of a key; removing a voxel deletes its entry. Columns only store the voxels
//! they actually contain, so a chunk costs memory in proportion to its solid blocks
//! regardless of how tall its terrain is.
//!
//! ## Render batches
//!
//! A chunk owns one instanced batch per block type it contains. Every path that
//! replaces or removes those batches ([`Chunk::build`], [`Chunk::set_block`],
//! [`Chunk::dispose`]) releases the previous ones through the backend first.

use std::collections::HashMap;

use cgmath::Vector3;

use super::block::block_type::BlockType;
use super::noise_generator::NoiseGenerator;
use crate::config::TerrainConfig;
use crate::engine_state::rendering::{ChunkBatch, InstanceRaw, RenderBackend};

mod generation;

/// Position of a chunk in chunk coordinates (not block coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    /// Chunk column along X.
    pub x: i32,
    /// Chunk column along Z.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a chunk position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing integer block `(x, z)`.
    pub fn containing(x: i32, z: i32, chunk_size: i32) -> Self {
        Self::new(x.div_euclid(chunk_size), z.div_euclid(chunk_size))
    }

    /// The chunk containing continuous world position `(x, z)`, i.e.
    /// `floor(x / SIZE), floor(z / SIZE)`.
    pub fn from_world(x: f32, z: f32, chunk_size: i32) -> Self {
        let size = chunk_size as f32;
        Self::new((x / size).floor() as i32, (z / size).floor() as i32)
    }

    /// World-space block coordinates of the chunk's `(0, 0)` column.
    pub fn origin(self, chunk_size: i32) -> (i32, i32) {
        (self.x * chunk_size, self.z * chunk_size)
    }

    /// Distance in chunks along the farther axis.
    pub fn chebyshev_distance(self, other: ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Position of a voxel relative to its chunk's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalPos {
    /// 0..SIZE
    pub x: u8,
    /// Unbounded; chunks are not split vertically.
    pub y: i32,
    /// 0..SIZE
    pub z: u8,
}

impl LocalPos {
    /// Creates a local position without range checks.
    pub const fn new(x: u8, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }
}

/// A column of voxels and the render batches drawing them.
pub struct Chunk<B> {
    position: ChunkPos,
    chunk_size: i32,
    voxels: HashMap<LocalPos, BlockType>,
    batches: Vec<ChunkBatch<B>>,
}

impl<B> Chunk<B> {
    /// Creates a chunk with no voxels and no batches.
    pub fn empty(position: ChunkPos, chunk_size: i32) -> Self {
        Self {
            position,
            chunk_size,
            voxels: HashMap::new(),
            batches: Vec::new(),
        }
    }

    /// Creates a chunk, fills it with terrain and builds its batches.
    pub fn new<R>(
        position: ChunkPos,
        chunk_size: i32,
        generator: &NoiseGenerator,
        terrain: &TerrainConfig,
        renderer: &mut R,
    ) -> Self
    where
        R: RenderBackend<Batch = B>,
    {
        let mut chunk = Self::empty(position, chunk_size);
        chunk.generate(generator, terrain);
        chunk.build(renderer);
        log::trace!(
            "constructed chunk ({}, {}) with {} voxels in {} batches",
            position.x,
            position.z,
            chunk.voxels.len(),
            chunk.batches.len()
        );
        chunk
    }

    /// Position of this chunk in chunk coordinates.
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// World-space block coordinates of the chunk's `(0, 0)` column.
    pub fn world_origin(&self) -> (i32, i32) {
        self.position.origin(self.chunk_size)
    }

    /// Number of stored voxels.
    pub fn block_count(&self) -> usize {
        self.voxels.len()
    }

    /// Number of live render batches.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// The live render batches.
    pub fn batches(&self) -> &[ChunkBatch<B>] {
        &self.batches
    }

    /// The voxel map.
    pub fn voxels(&self) -> &HashMap<LocalPos, BlockType> {
        &self.voxels
    }

    /// Converts chunk-relative column coordinates into a storage key.
    ///
    /// Returns `None` when `(local_x, local_z)` lies outside the chunk.
    fn local_key(&self, local_x: i32, y: i32, local_z: i32) -> Option<LocalPos> {
        let range = 0..self.chunk_size;
        if !range.contains(&local_x) || !range.contains(&local_z) {
            return None;
        }
        Some(LocalPos::new(local_x as u8, y, local_z as u8))
    }

    /// Gets the block at the specified chunk-relative coordinates.
    pub fn get_block(&self, local_x: i32, y: i32, local_z: i32) -> Option<BlockType> {
        let key = self.local_key(local_x, y, local_z)?;
        self.voxels.get(&key).copied()
    }

    /// Sets or clears the block at the specified chunk-relative coordinates, then
    /// rebuilds every batch of the chunk.
    ///
    /// `None` removes the voxel entry entirely. Coordinates outside the chunk's
    /// footprint are ignored and `false` is returned.
    pub fn set_block<R>(
        &mut self,
        renderer: &mut R,
        local_x: i32,
        y: i32,
        local_z: i32,
        block: Option<BlockType>,
    ) -> bool
    where
        R: RenderBackend<Batch = B>,
    {
        let Some(key) = self.local_key(local_x, y, local_z) else {
            log::warn!(
                "ignoring edit at local ({}, {}, {}) outside chunk ({}, {})",
                local_x,
                y,
                local_z,
                self.position.x,
                self.position.z
            );
            return false;
        };

        match block {
            Some(block_type) => {
                self.voxels.insert(key, block_type);
            }
            None => {
                self.voxels.remove(&key);
            }
        }
        self.build(renderer);
        true
    }

    /// Rebuilds the render batches from the voxel map.
    ///
    /// Releases the previous batches, then creates one batch per block type present,
    /// sized exactly to that type's voxel count, with each instance translating the
    /// unit cube to its voxel's world position.
    pub fn build<R>(&mut self, renderer: &mut R)
    where
        R: RenderBackend<Batch = B>,
    {
        self.release_batches(renderer);

        let (origin_x, origin_z) = self.world_origin();
        let mut instances: [Vec<InstanceRaw>; BlockType::COUNT] = Default::default();
        for (pos, block_type) in &self.voxels {
            let translation = Vector3::new(
                (origin_x + i32::from(pos.x)) as f32,
                pos.y as f32,
                (origin_z + i32::from(pos.z)) as f32,
            );
            instances[block_type.index()].push(InstanceRaw::from_translation(translation));
        }

        for block_type in BlockType::ALL {
            let transforms = &instances[block_type.index()];
            if transforms.is_empty() {
                continue;
            }

            let mut batch = renderer.create_batch(block_type, transforms.len());
            for (index, instance) in transforms.iter().enumerate() {
                renderer.set_instance_transform(&mut batch, index, *instance);
            }
            renderer.mark_instances_dirty(&mut batch);
            renderer.add_to_scene(&batch);

            self.batches.push(ChunkBatch {
                block_type,
                instance_count: transforms.len(),
                batch,
            });
        }
    }

    /// Releases every batch and clears the voxel map.
    pub fn dispose<R>(mut self, renderer: &mut R)
    where
        R: RenderBackend<Batch = B>,
    {
        self.release_batches(renderer);
        self.voxels.clear();
        log::trace!("disposed chunk ({}, {})", self.position.x, self.position.z);
    }

    fn release_batches<R>(&mut self, renderer: &mut R)
    where
        R: RenderBackend<Batch = B>,
    {
        for chunk_batch in self.batches.drain(..) {
            renderer.remove_from_scene(&chunk_batch.batch);
            renderer.dispose_batch(chunk_batch.batch);
        }
    }
}

impl<B> Drop for Chunk<B> {
    fn drop(&mut self) {
        if !self.batches.is_empty() {
            log::warn!(
                "chunk ({}, {}) dropped with {} undisposed batches",
                self.position.x,
                self.position.z,
                self.batches.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainMode;
    use crate::engine_state::rendering::headless::HeadlessBatch;
    use crate::engine_state::rendering::HeadlessRenderer;

    fn noise_chunk(position: ChunkPos, renderer: &mut HeadlessRenderer) -> Chunk<HeadlessBatch> {
        Chunk::new(
            position,
            16,
            &NoiseGenerator::new(0),
            &TerrainConfig::default(),
            renderer,
        )
    }

    fn empty_terrain() -> TerrainConfig {
        TerrainConfig {
            mode: TerrainMode::Empty,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn chunk_pos_uses_floor_division() {
        assert_eq!(ChunkPos::containing(0, 0, 16), ChunkPos::new(0, 0));
        assert_eq!(ChunkPos::containing(15, 15, 16), ChunkPos::new(0, 0));
        assert_eq!(ChunkPos::containing(16, -1, 16), ChunkPos::new(1, -1));
        assert_eq!(ChunkPos::containing(-16, -17, 16), ChunkPos::new(-1, -2));
        assert_eq!(ChunkPos::from_world(-0.1, 31.9, 16), ChunkPos::new(-1, 1));
        assert_eq!(ChunkPos::from_world(20.0, 0.0, 16), ChunkPos::new(1, 0));
    }

    #[test]
    fn build_creates_one_batch_per_present_type() {
        let mut renderer = HeadlessRenderer::new();
        let chunk = noise_chunk(ChunkPos::new(2, -3), &mut renderer);

        let mut present: Vec<BlockType> = chunk.voxels().values().copied().collect();
        present.sort();
        present.dedup();

        assert_eq!(chunk.batch_count(), present.len());
        let instances: usize = chunk.batches().iter().map(|b| b.instance_count).sum();
        assert_eq!(instances, chunk.block_count());
        for chunk_batch in chunk.batches() {
            let expected = chunk
                .voxels()
                .values()
                .filter(|t| **t == chunk_batch.block_type)
                .count();
            assert_eq!(chunk_batch.instance_count, expected);
            assert_eq!(chunk_batch.batch.instances.len(), expected);
            assert!(chunk_batch.batch.dirty);
            assert!(renderer.in_scene(&chunk_batch.batch));
        }

        chunk.dispose(&mut renderer);
    }

    #[test]
    fn instances_sit_at_world_positions() {
        let mut renderer = HeadlessRenderer::new();
        let mut chunk = Chunk::empty(ChunkPos::new(-1, 2), 16);
        chunk.set_block(&mut renderer, 3, 7, 5, Some(BlockType::Wood));

        let batch = &chunk.batches()[0];
        assert_eq!(batch.block_type, BlockType::Wood);
        assert_eq!(
            batch.batch.instances[0].translation(),
            Vector3::new(-13.0, 7.0, 37.0)
        );

        chunk.dispose(&mut renderer);
    }

    #[test]
    fn set_block_round_trips_and_removes() {
        let mut renderer = HeadlessRenderer::new();
        let mut chunk = Chunk::new(
            ChunkPos::new(0, 0),
            16,
            &NoiseGenerator::new(0),
            &empty_terrain(),
            &mut renderer,
        );
        assert_eq!(chunk.block_count(), 0);
        assert_eq!(chunk.batch_count(), 0);

        assert!(chunk.set_block(&mut renderer, 1, 40, 2, Some(BlockType::Snow)));
        assert_eq!(chunk.get_block(1, 40, 2), Some(BlockType::Snow));
        assert!(chunk.set_block(&mut renderer, 1, 40, 2, Some(BlockType::Stone)));
        assert_eq!(chunk.get_block(1, 40, 2), Some(BlockType::Stone));
        assert_eq!(chunk.block_count(), 1);

        assert!(chunk.set_block(&mut renderer, 1, 40, 2, None));
        assert_eq!(chunk.get_block(1, 40, 2), None);
        assert_eq!(chunk.block_count(), 0);
        assert_eq!(chunk.batch_count(), 0);
    }

    #[test]
    fn out_of_footprint_access_is_ignored() {
        let mut renderer = HeadlessRenderer::new();
        let mut chunk: Chunk<HeadlessBatch> = Chunk::empty(ChunkPos::new(0, 0), 16);

        assert!(!chunk.set_block(&mut renderer, 16, 0, 0, Some(BlockType::Dirt)));
        assert!(!chunk.set_block(&mut renderer, 0, 0, -1, Some(BlockType::Dirt)));
        assert_eq!(chunk.get_block(-1, 0, 0), None);
        assert_eq!(chunk.block_count(), 0);
    }

    #[test]
    fn rebuilds_never_leak_batches() {
        let mut renderer = HeadlessRenderer::new();
        let mut chunk = noise_chunk(ChunkPos::new(0, 0), &mut renderer);

        for y in 30..40 {
            chunk.set_block(&mut renderer, 4, y, 4, Some(BlockType::Leaves));
            assert_eq!(renderer.stats().live_batches(), chunk.batch_count() as u64);
            assert_eq!(renderer.scene_len(), chunk.batch_count());
        }
        chunk.build(&mut renderer);
        assert_eq!(renderer.stats().live_batches(), chunk.batch_count() as u64);
        assert_eq!(renderer.stats().live_instances, chunk.block_count());

        chunk.dispose(&mut renderer);
        assert_eq!(renderer.stats().live_batches(), 0);
        assert_eq!(renderer.stats().live_instances, 0);
        assert_eq!(renderer.scene_len(), 0);
    }
}
