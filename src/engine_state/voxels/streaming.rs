//! # Chunk Streaming
//!
//! Helpers deciding which chunks should be resident and how often the world is allowed
//! to re-evaluate that set.

use web_time::{Duration, Instant};

use super::chunk::ChunkPos;

/// Every chunk position within `radius` chunks of `center` along both axes.
pub fn chunks_in_square(center: ChunkPos, radius: i32) -> impl Iterator<Item = ChunkPos> {
    (-radius..=radius).flat_map(move |dx| {
        (-radius..=radius).map(move |dz| ChunkPos::new(center.x + dx, center.z + dz))
    })
}

/// Limits streaming passes to one per interval of wall-clock time.
///
/// Constructing many chunks in a single tick is expensive, so the simulation only asks
/// the world to stream when the throttle is ready.
#[derive(Debug, Clone)]
pub struct StreamingThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl StreamingThrottle {
    /// Creates a throttle that is ready immediately and then once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true`, and starts a new interval, when a pass may run at `now`.
    pub fn ready(&mut self, now: Instant) -> bool {
        let ready = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if ready {
            self.last = Some(now);
        }
        ready
    }

    /// Makes the next call to [`ready`](Self::ready) succeed.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
