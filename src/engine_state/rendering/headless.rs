//! An in-process [`RenderBackend`] that keeps batches in memory.
//!
//! Used by the headless demo and by tests to observe what a chunk would have drawn and
//! to catch batches that were never released.

use std::collections::HashSet;

use super::{InstanceRaw, RenderBackend};
use crate::engine_state::voxels::block::{block_type::BlockType, color_of};

/// A batch held by the [`HeadlessRenderer`].
#[derive(Debug)]
pub struct HeadlessBatch {
    id: u64,
    /// Material of every instance.
    pub block_type: BlockType,
    /// Colour of the material the batch is drawn with.
    pub color: u32,
    /// One model matrix per instance.
    pub instances: Vec<InstanceRaw>,
    /// Set once transforms were written and not yet uploaded.
    pub dirty: bool,
}

impl HeadlessBatch {
    /// Backend-unique id of the batch.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Counters describing the backend's resource usage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Batches ever created.
    pub created: u64,
    /// Batches ever disposed.
    pub disposed: u64,
    /// Instances across all live batches.
    pub live_instances: usize,
}

impl RenderStats {
    /// Batches created and not yet disposed.
    pub fn live_batches(&self) -> u64 {
        self.created - self.disposed
    }
}

/// A render backend without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    scene: HashSet<u64>,
    stats: RenderStats,
}

impl HeadlessRenderer {
    /// Creates a backend with an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource counters.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Number of batches currently added to the scene.
    pub fn scene_len(&self) -> usize {
        self.scene.len()
    }

    /// Whether `batch` is currently in the scene.
    pub fn in_scene(&self, batch: &HeadlessBatch) -> bool {
        self.scene.contains(&batch.id)
    }
}

impl RenderBackend for HeadlessRenderer {
    type Batch = HeadlessBatch;

    fn create_batch(&mut self, block_type: BlockType, instance_count: usize) -> HeadlessBatch {
        let id = self.next_id;
        self.next_id += 1;
        self.stats.created += 1;
        self.stats.live_instances += instance_count;

        HeadlessBatch {
            id,
            block_type,
            color: color_of(block_type),
            instances: vec![InstanceRaw::from_translation(cgmath::Vector3::new(0.0, 0.0, 0.0)); instance_count],
            dirty: false,
        }
    }

    fn set_instance_transform(&mut self, batch: &mut HeadlessBatch, index: usize, instance: InstanceRaw) {
        match batch.instances.get_mut(index) {
            Some(slot) => *slot = instance,
            None => log::warn!(
                "instance {} out of range for batch {} of {} instances",
                index,
                batch.id,
                batch.instances.len()
            ),
        }
    }

    fn mark_instances_dirty(&mut self, batch: &mut HeadlessBatch) {
        batch.dirty = true;
    }

    fn add_to_scene(&mut self, batch: &HeadlessBatch) {
        self.scene.insert(batch.id);
    }

    fn remove_from_scene(&mut self, batch: &HeadlessBatch) {
        self.scene.remove(&batch.id);
    }

    fn dispose_batch(&mut self, batch: HeadlessBatch) {
        if self.scene.remove(&batch.id) {
            log::warn!("batch {} disposed while still in the scene", batch.id);
        }
        self.stats.disposed += 1;
        self.stats.live_instances -= batch.instances.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn tracks_batch_lifetime() {
        let mut renderer = HeadlessRenderer::new();
        let mut batch = renderer.create_batch(BlockType::Stone, 2);
        renderer.set_instance_transform(&mut batch, 1, InstanceRaw::from_translation(Vector3::new(1.0, 2.0, 3.0)));
        renderer.mark_instances_dirty(&mut batch);
        renderer.add_to_scene(&batch);

        assert!(renderer.in_scene(&batch));
        assert!(batch.dirty);
        assert_eq!(batch.color, color_of(BlockType::Stone));
        assert_eq!(batch.instances[1].translation(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(renderer.stats().live_batches(), 1);
        assert_eq!(renderer.stats().live_instances, 2);

        renderer.remove_from_scene(&batch);
        renderer.dispose_batch(batch);

        assert_eq!(renderer.scene_len(), 0);
        assert_eq!(renderer.stats().live_batches(), 0);
        assert_eq!(renderer.stats().live_instances, 0);
    }
}
