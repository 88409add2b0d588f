#![warn(missing_docs)]
//! Sortbench Core - Measurement Runtime
//!
//! This crate provides the measurement side of the harness:
//! - Process-wide allocation interposition behind an explicit recording
//!   session ([`Instrumentation`])
//! - The counting comparator handed to every plugin
//! - Trial timing (wall clock plus per-process CPU clock where available)
//! - Pure work-size scheduling and benchmark input shapes

mod instrument;
mod measure;
mod sample;
mod schedule;

pub use instrument::{HAS_ALLOC_INTERPOSITION, Instrumentation, RecordingGuard, compare_i32};
pub use measure::{HAS_CPU_CLOCK, Timer, TrialTime};
pub use sample::{Baseline, Shape, generate_baselines};
pub use schedule::{GrowthKind, WorkSizePolicy};
