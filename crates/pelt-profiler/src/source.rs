//! Timing sources the profiler reads each frame.

use std::time::Instant;

/// A recorder reporting the duration of the last frame in nanoseconds.
pub trait TimingSource {
    /// Last measured value, or `None` while the source is unavailable.
    fn last_ns(&self) -> Option<u64>;
}

/// Nanoseconds to milliseconds.
pub fn ns_to_ms(ns: u64) -> f64 {
    ns as f64 / 1_000_000.0
}

/// Wall-clock CPU frame timer.
///
/// Call [`begin_frame`](Self::begin_frame) and [`end_frame`](Self::end_frame)
/// around the work being measured.
#[derive(Debug, Default)]
pub struct CpuFrameTimer {
    started: Option<Instant>,
    last_ns: Option<u64>,
}

impl CpuFrameTimer {
    /// Timer with no frame recorded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a frame.
    pub fn begin_frame(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop timing and return the frame's duration in nanoseconds. `None` if
    /// no frame was started.
    pub fn end_frame(&mut self) -> Option<u64> {
        let started = self.started.take()?;
        let ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.last_ns = Some(ns);
        Some(ns)
    }
}

impl TimingSource for CpuFrameTimer {
    fn last_ns(&self) -> Option<u64> {
        self.last_ns
    }
}
