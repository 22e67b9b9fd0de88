//! Overlay and snapshot on top of a [`FrameSampler`].

use pelt_config::ProfilerConfig;
use serde::Serialize;
use tracing::trace;

use crate::sampler::FrameSampler;
use crate::source::{TimingSource, ns_to_ms};

/// First line of the overlay.
pub const OVERLAY_TITLE: &str = "Fur Profiler";

/// Serializable view of the profiler for tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilerSnapshot {
    /// Samples currently held.
    pub samples: usize,
    /// Window capacity.
    pub window: usize,
    /// Mean CPU frame time over the window.
    pub cpu_avg_ms: f64,
    /// Nearest-rank 95th percentile CPU frame time.
    pub cpu_p95_ms: f64,
    /// `None` when no GPU timing is available.
    pub gpu_ms: Option<f64>,
}

/// Frame profiler: samples CPU frame time each frame and keeps the last GPU
/// reading for display.
#[derive(Debug, Clone, Default)]
pub struct FrameProfiler {
    sampler: FrameSampler,
    gpu_ms: Option<f64>,
}

impl FrameProfiler {
    /// Profiler keeping `window` samples.
    pub fn new(window: usize) -> Self {
        Self {
            sampler: FrameSampler::new(window),
            gpu_ms: None,
        }
    }

    /// Profiler sized from the `profiler` config section.
    pub fn from_config(config: &ProfilerConfig) -> Self {
        Self::new(config.window)
    }

    /// Read the sources for this frame. An unavailable CPU source records
    /// nothing; a GPU source reporting zero counts as unavailable.
    pub fn update(&mut self, cpu: &dyn TimingSource, gpu: Option<&dyn TimingSource>) {
        if let Some(ns) = cpu.last_ns() {
            self.sampler.record(ns_to_ms(ns));
        }
        self.gpu_ms = gpu
            .and_then(|source| source.last_ns())
            .filter(|&ns| ns > 0)
            .map(ns_to_ms);
        trace!(latest = ?self.sampler.latest(), gpu = ?self.gpu_ms, "profiler sample");
    }

    /// Record a CPU frame time already in milliseconds.
    pub fn record_ms(&mut self, ms: f64) {
        self.sampler.record(ms);
    }

    /// The sample window.
    pub fn sampler(&self) -> &FrameSampler {
        &self.sampler
    }

    /// Last GPU frame time, if any.
    pub fn gpu_ms(&self) -> Option<f64> {
        self.gpu_ms
    }

    /// Four-line overlay: title, CPU average, CPU p95 and GPU time, each to
    /// two decimals.
    pub fn overlay_text(&self) -> String {
        let gpu = match self.gpu_ms {
            Some(ms) => format!("{ms:.2} ms"),
            None => "n/a".to_string(),
        };
        format!(
            "{OVERLAY_TITLE}\nCPU avg: {:.2} ms\nCPU p95: {:.2} ms\nGPU: {gpu}",
            self.sampler.average(),
            self.sampler.p95(),
        )
    }

    /// Current statistics.
    pub fn snapshot(&self) -> ProfilerSnapshot {
        ProfilerSnapshot {
            samples: self.sampler.len(),
            window: self.sampler.capacity(),
            cpu_avg_ms: self.sampler.average(),
            cpu_p95_ms: self.sampler.p95(),
            gpu_ms: self.gpu_ms,
        }
    }

    /// Snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; not expected for finite values.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}
