//! Bounded FIFO of frame-time samples.

use std::collections::VecDeque;

/// Samples kept by default; about two seconds at 60 fps.
pub const DEFAULT_WINDOW: usize = 120;

/// Rolling window of frame times in milliseconds.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FrameSampler {
    /// Window holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest while over capacity.
    pub fn record(&mut self, ms: f64) {
        self.samples.push_back(ms);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Mean of the window; 0 when empty.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Nearest-rank percentile: the value at rank `ceil(p * n)` of the sorted
    /// window. `p` is clamped to `[0, 1]`; 0 when empty.
    pub fn percentile(&self, p: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let rank = (p.clamp(0.0, 1.0) * n as f64).ceil() as usize;
        sorted[rank.clamp(1, n) - 1]
    }

    /// 95th percentile.
    pub fn p95(&self) -> f64 {
        self.percentile(0.95)
    }

    /// Samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum samples held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
