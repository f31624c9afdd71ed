//! # World Module
//!
//! This module provides the `World` struct which manages the collection of loaded
//! chunks. It is the single owner of chunk storage: chunks are created and destroyed
//! only by [`World::update_chunks`], and every voxel read or edit addressed in world
//! coordinates is routed to the chunk that owns it.
//!
//! ## Architecture
//!
//! The world keeps a sparse map from chunk position to chunk. Only the square of chunks
//! within render distance of the viewer is resident, which keeps memory bounded while
//! the world itself is effectively infinite.
//!
//! ## Unloaded chunks
//!
//! Voxels in chunks that are not loaded read as empty, and edits to them are dropped.
//! Unloaded chunks are always far from the viewer, so neither collision nor picking
//! ever reaches them. Edits are not persisted: a chunk that unloads and reloads is
//! regenerated from noise.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};

use super::block::block_type::BlockType;
use super::chunk::{Chunk, ChunkPos};
use super::noise_generator::NoiseGenerator;
use super::raycast::{raycast, RayHit};
use super::streaming::chunks_in_square;
use super::{voxel_coord, VoxelQuery};
use crate::config::{ConfigError, WorldConfig};
use crate::engine_state::rendering::RenderBackend;

/// Lifetime counters of chunk streaming.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamingStats {
    /// Chunks constructed since the world was created.
    pub constructed: u64,
    /// Chunks disposed since the world was created.
    pub disposed: u64,
}

/// What a single streaming pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamingReport {
    /// Chunks constructed by the pass.
    pub loaded: usize,
    /// Chunks disposed by the pass.
    pub unloaded: usize,
}

impl StreamingReport {
    /// Whether the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.loaded == 0 && self.unloaded == 0
    }
}

/// A voxel world composed of streamed chunks.
///
/// # Examples
///
/// ```
/// use voxel_verse::config::WorldConfig;
/// use voxel_verse::engine_state::rendering::HeadlessRenderer;
/// use voxel_verse::engine_state::voxels::world::World;
///
/// let mut renderer = HeadlessRenderer::new();
/// let mut world = World::new(WorldConfig::default()).unwrap();
/// world.update_chunks(&mut renderer, 0.0, 0.0);
/// assert_eq!(world.chunk_count(), 81);
/// world.dispose_all(&mut renderer);
/// ```
pub struct World<B> {
    config: WorldConfig,
    generator: NoiseGenerator,
    chunks: HashMap<ChunkPos, Chunk<B>>,
    center: Option<ChunkPos>,
    stats: StreamingStats,
}

impl<B> World<B> {
    /// Creates a world with no chunks loaded.
    ///
    /// Fails when `config` is out of range, since chunk addressing relies on the chunk
    /// size fitting a local coordinate.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = NoiseGenerator::new(config.terrain.seed);
        Ok(World {
            config,
            generator,
            chunks: HashMap::new(),
            center: None,
            stats: StreamingStats::default(),
        })
    }

    /// World settings.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Horizontal extent of every chunk.
    pub fn chunk_size(&self) -> i32 {
        self.config.chunk_size
    }

    /// Lifetime streaming counters.
    pub fn stats(&self) -> StreamingStats {
        self.stats
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Positions of all loaded chunks, in no particular order.
    pub fn loaded_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    /// The loaded chunk at `position`, if any.
    pub fn chunk(&self, position: ChunkPos) -> Option<&Chunk<B>> {
        self.chunks.get(&position)
    }

    /// Loads every chunk within render distance of the viewer and disposes every chunk
    /// beyond render distance plus the unload margin.
    ///
    /// Calling this again while the viewer stays in the same chunk does nothing.
    pub fn update_chunks<R>(&mut self, renderer: &mut R, viewer_x: f32, viewer_z: f32) -> StreamingReport
    where
        R: RenderBackend<Batch = B>,
    {
        let center = ChunkPos::from_world(viewer_x, viewer_z, self.config.chunk_size);
        if self.center == Some(center) {
            return StreamingReport::default();
        }

        let streaming = &self.config.streaming;
        let keep_distance = streaming.render_distance + streaming.unload_margin;
        let mut report = StreamingReport::default();

        let stale: Vec<ChunkPos> = self
            .chunks
            .keys()
            .filter(|position| position.chebyshev_distance(center) > keep_distance)
            .copied()
            .collect();
        for position in stale {
            if let Some(chunk) = self.chunks.remove(&position) {
                chunk.dispose(renderer);
                report.unloaded += 1;
            }
        }

        for position in chunks_in_square(center, streaming.render_distance) {
            if self.chunks.contains_key(&position) {
                continue;
            }
            let chunk = Chunk::new(
                position,
                self.config.chunk_size,
                &self.generator,
                &self.config.terrain,
                renderer,
            );
            self.chunks.insert(position, chunk);
            report.loaded += 1;
        }

        self.stats.constructed += report.loaded as u64;
        self.stats.disposed += report.unloaded as u64;
        self.center = Some(center);

        log::debug!(
            "streamed around chunk ({}, {}): {} loaded, {} unloaded, {} resident",
            center.x,
            center.z,
            report.loaded,
            report.unloaded,
            self.chunks.len()
        );

        report
    }

    /// The block at continuous world coordinates, rounded to the nearest voxel.
    pub fn get_block_global(&self, x: f32, y: f32, z: f32) -> Option<BlockType> {
        let (x, y, z) = round_to_voxel(x, y, z);
        self.block_at(x, y, z)
    }

    /// Sets or clears the block at continuous world coordinates, rounded to the
    /// nearest voxel.
    ///
    /// Returns `false`, changing nothing, when the owning chunk is not loaded.
    pub fn set_block_global<R>(&mut self, renderer: &mut R, x: f32, y: f32, z: f32, block: Option<BlockType>) -> bool
    where
        R: RenderBackend<Batch = B>,
    {
        let (x, y, z) = round_to_voxel(x, y, z);
        self.set_block_at(renderer, x, y, z, block)
    }

    /// Sets or clears the block at integer world coordinates.
    ///
    /// Returns `false`, changing nothing, when the owning chunk is not loaded.
    pub fn set_block_at<R>(&mut self, renderer: &mut R, x: i32, y: i32, z: i32, block: Option<BlockType>) -> bool
    where
        R: RenderBackend<Batch = B>,
    {
        let size = self.config.chunk_size;
        let position = ChunkPos::containing(x, z, size);
        match self.chunks.get_mut(&position) {
            Some(chunk) => chunk.set_block(renderer, x.rem_euclid(size), y, z.rem_euclid(size), block),
            None => {
                log::trace!("dropping edit at ({}, {}, {}): chunk not loaded", x, y, z);
                false
            }
        }
    }

    /// Casts a ray through the loaded voxels.
    pub fn raycast(&self, origin: Point3<f32>, direction: Vector3<f32>, max_distance: f32) -> Option<RayHit> {
        raycast(self, origin, direction, max_distance)
    }

    /// Disposes every loaded chunk.
    pub fn dispose_all<R>(&mut self, renderer: &mut R)
    where
        R: RenderBackend<Batch = B>,
    {
        let count = self.chunks.len();
        for (_, chunk) in self.chunks.drain() {
            chunk.dispose(renderer);
        }
        self.stats.disposed += count as u64;
        self.center = None;
        log::info!("disposed {} chunks", count);
    }
}

impl<B> VoxelQuery for World<B> {
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        let size = self.config.chunk_size;
        let chunk = self.chunks.get(&ChunkPos::containing(x, z, size))?;
        chunk.get_block(x.rem_euclid(size), y, z.rem_euclid(size))
    }
}

fn round_to_voxel(x: f32, y: f32, z: f32) -> (i32, i32, i32) {
    (voxel_coord(x), voxel_coord(y), voxel_coord(z))
}
