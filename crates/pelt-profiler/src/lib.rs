//! Frame-time profiling for the fur demo.
//!
//! A bounded window of frame-time samples with average and 95th percentile,
//! fed from pluggable timing sources, rendered as a small text overlay or a
//! JSON snapshot for tooling.

mod profiler;
mod sampler;
mod source;


pub use profiler::{FrameProfiler, OVERLAY_TITLE, ProfilerSnapshot};
pub use sampler::{DEFAULT_WINDOW, FrameSampler};
pub use source::{CpuFrameTimer, TimingSource, ns_to_ms};
