//! Trial Timing
//!
//! Captures wall-clock time via `std::time::Instant` and per-process CPU time
//! via `CLOCK_PROCESS_CPUTIME_ID` on Unix, with a wall-clock-only fallback on
//! other platforms.

use std::time::Duration;

// ─── CPU clock helpers ───────────────────────────────────────────────────────

/// Read the per-process CPU clock in nanoseconds (Unix only).
#[cfg(unix)]
fn read_cpu_ns() -> Option<u64> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: clock_gettime writes into the timespec we own; the clock id is
    // a compile-time constant supported on all Unix targets we build for.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    (rc == 0).then(|| ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64)
}

#[cfg(not(unix))]
fn read_cpu_ns() -> Option<u64> {
    None
}

/// Whether this platform provides a per-process CPU clock.
/// When `false`, only wall-clock durations are available.
pub const HAS_CPU_CLOCK: bool = cfg!(unix);

// ─── Timer ───────────────────────────────────────────────────────────────────

/// Elapsed times for one profiled call.
#[derive(Debug, Clone, Copy)]
pub struct TrialTime {
    /// Wall-clock duration.
    pub wall: Duration,
    /// CPU-clock duration, when the platform provides one.
    pub cpu: Option<Duration>,
}

impl TrialTime {
    /// The duration reported in output: CPU time when available, wall otherwise.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.cpu.unwrap_or(self.wall)
    }

    /// Reported duration in fractional milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1_000.0
    }
}

/// Timer for measuring one sort invocation.
pub struct Timer {
    wall_start: std::time::Instant,
    cpu_start: Option<u64>,
}

impl Timer {
    /// Start a new timer.
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            cpu_start: read_cpu_ns(),
            wall_start: std::time::Instant::now(),
        }
    }

    /// Stop the timer and return the elapsed wall and CPU durations.
    #[inline(always)]
    pub fn stop(&self) -> TrialTime {
        let wall = self.wall_start.elapsed();
        let cpu = match (self.cpu_start, read_cpu_ns()) {
            (Some(start), Some(end)) => Some(Duration::from_nanos(end.saturating_sub(start))),
            _ => None,
        };
        TrialTime { wall, cpu }
    }
}
