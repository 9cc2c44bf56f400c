//! Fixed schedule of simulated processing stages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crup_common::FileStatus;

/// When a stage starts, relative to submission: `base_ms + index * stagger_ms`
/// for the file at position `index` in its batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageDelay {
    pub base_ms: u64,
    pub stagger_ms: u64,
}

impl StageDelay {
    pub const fn new(base_ms: u64, stagger_ms: u64) -> Self {
        Self { base_ms, stagger_ms }
    }

    pub fn offset(&self, index: usize) -> Duration {
        Duration::from_millis(self.base_ms + index as u64 * self.stagger_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageTimeline {
    #[serde(default = "default_extracting")]
    pub extracting: StageDelay,
    #[serde(default = "default_embedding")]
    pub embedding: StageDelay,
    #[serde(default = "default_processed")]
    pub processed: StageDelay,
}

fn default_extracting() -> StageDelay { StageDelay::new(300, 150) }
fn default_embedding()  -> StageDelay { StageDelay::new(1200, 200) }
fn default_processed()  -> StageDelay { StageDelay::new(2200, 250) }

impl Default for StageTimeline {
    fn default() -> Self {
        Self {
            extracting: default_extracting(),
            embedding: default_embedding(),
            processed: default_processed(),
        }
    }
}

impl StageTimeline {
    /// Transitions for the file at `index`, in firing order. A file marked to
    /// fail goes to `Failed` when it would have started embedding.
    pub fn plan(&self, index: usize, fail: bool) -> Vec<(FileStatus, Duration)> {
        let mut steps = vec![(FileStatus::Extracting, self.extracting.offset(index))];
        if fail {
            steps.push((FileStatus::Failed, self.embedding.offset(index)));
        } else {
            steps.push((FileStatus::Embedding, self.embedding.offset(index)));
            steps.push((FileStatus::Processed, self.processed.offset(index)));
        }
        steps
    }

    /// Offsets must not decrease from one stage to the next for any index.
    pub fn is_ordered(&self) -> bool {
        let ordered = |a: &StageDelay, b: &StageDelay| a.base_ms <= b.base_ms && a.stagger_ms <= b.stagger_ms;
        ordered(&self.extracting, &self.embedding) && ordered(&self.embedding, &self.processed)
    }
}
