//! Benchmark Executor
//!
//! Drives one profiled run per (plugin, shape, size) through the trial state
//! machine: reset counters, copy the baseline, arm recording, invoke the
//! plugin, disarm, measure, validate, record.
//!
//! For K averaging trials (K=0 means a single unaveraged trial), only the
//! first trial's comparison/swap/allocation counts are retained — the
//! harness assumes deterministic, input-order-insensitive algorithms, so
//! later trials refine only the timing average. An invalid sort result is
//! recorded, never treated as fatal.

use sortbench_core::{Baseline, Instrumentation, Timer, compare_i32};
use sortbench_plugin::{SortEntry, SwapCounter};
use std::time::Duration;

/// Knobs for one sweep's profiled runs.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Averaging trials per run; 0 runs a single unaveraged trial.
    pub averaging_runs: u32,
    /// Record allocated bytes.
    pub profile_memory: bool,
    /// Record plugin-reported swaps.
    pub profile_swaps: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            averaging_runs: 3,
            profile_memory: false,
            profile_swaps: false,
        }
    }
}

/// Metrics of one (plugin, shape, size) run.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    /// Number of elements sorted.
    pub size: u64,
    /// Comparator invocations during the first trial.
    pub comparisons: u64,
    /// Plugin-reported swaps during the first trial; `None` when swap
    /// profiling is off or the plugin exports no counter.
    pub swaps: Option<u64>,
    /// Bytes requested from the allocator during the first trial; `None`
    /// when memory profiling is off.
    pub allocated_bytes: Option<u64>,
    /// Wall-clock duration, averaged over all trials.
    pub wall: Duration,
    /// CPU-clock duration, averaged over all trials, when available.
    pub cpu: Option<Duration>,
    /// Whether the final buffer passed the ascending-order scan.
    pub valid: bool,
}

impl RunMetrics {
    /// Reported duration in fractional milliseconds (CPU time when the
    /// platform provides it, wall-clock otherwise).
    pub fn elapsed_ms(&self) -> f64 {
        self.cpu.unwrap_or(self.wall).as_secs_f64() * 1_000.0
    }
}

/// Execute all trials of one run and produce its metrics record.
///
/// Every trial sorts a fresh copy of the baseline's first `n` elements, so
/// trials start from bit-identical input regardless of the destructive sort
/// in between.
pub fn profile_run(
    entry: SortEntry<'_>,
    baseline: &Baseline,
    n: usize,
    config: &ExecutionConfig,
    session: &mut Instrumentation,
) -> RunMetrics {
    let trials = config.averaging_runs.max(1);
    let swap_counter = entry.swaps.filter(|_| config.profile_swaps);

    let mut first_counts: Option<(u64, Option<u64>, Option<u64>)> = None;
    let mut wall_total = Duration::ZERO;
    let mut cpu_total = Some(Duration::ZERO);
    let mut buffer = Vec::new();

    for _ in 0..trials {
        buffer = baseline.working_copy(n);
        if let Some(counter) = swap_counter {
            counter.reset();
        }

        let guard = session.begin_trial();
        let timer = Timer::start();
        // SAFETY: the buffer is exactly `n` i32 elements and the comparator
        // implements a total order over i32.
        unsafe { entry.invoke(&mut buffer, compare_i32) };
        drop(guard);
        let elapsed = timer.stop();

        if first_counts.is_none() {
            first_counts = Some((
                session.comparisons(),
                swap_counter.map(SwapCounter::read),
                config.profile_memory.then(|| session.allocated_bytes()),
            ));
        }

        wall_total += elapsed.wall;
        cpu_total = match (cpu_total, elapsed.cpu) {
            (Some(total), Some(cpu)) => Some(total + cpu),
            _ => None,
        };
    }

    let (comparisons, swaps, allocated_bytes) = first_counts.unwrap_or_default();

    RunMetrics {
        size: n as u64,
        comparisons,
        swaps,
        allocated_bytes,
        wall: wall_total / trials,
        cpu: cpu_total.map(|total| total / trials),
        valid: buffer.is_sorted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortbench_core::Shape;
    use std::ffi::{c_int, c_void};

    type CompareFn = unsafe extern "C" fn(*const c_void, *const c_void) -> c_int;

    /// In-process stand-in for a plugin: selection sort over i32.
    unsafe extern "C" fn selection_sort(
        data: *mut c_void,
        n: usize,
        width: usize,
        compare: CompareFn,
    ) {
        assert_eq!(width, size_of::<i32>());
        if data.is_null() || n == 0 {
            return;
        }
        let slice = unsafe { std::slice::from_raw_parts_mut(data.cast::<i32>(), n) };
        for i in 0..n - 1 {
            for j in i + 1..n {
                let ordering = unsafe {
                    compare(
                        (&raw const slice[i]).cast::<c_void>(),
                        (&raw const slice[j]).cast::<c_void>(),
                    )
                };
                if ordering > 0 {
                    slice.swap(i, j);
                }
            }
        }
    }

    /// A "sort" that does nothing, leaving random input unsorted.
    unsafe extern "C" fn noop_sort(_: *mut c_void, _: usize, _: usize, _: CompareFn) {}

    fn entry_for(sort: sortbench_plugin::SortFn) -> SortEntry<'static> {
        SortEntry { sort, swaps: None }
    }

    #[test]
    fn test_valid_sort_is_recorded_valid() {
        let mut session = Instrumentation::acquire_blocking();
        let baseline = Baseline::generate(Shape::Random, 64);

        let metrics = profile_run(
            entry_for(selection_sort),
            &baseline,
            64,
            &ExecutionConfig::default(),
            &mut session,
        );

        assert!(metrics.valid);
        assert_eq!(metrics.size, 64);
        // Selection sort always performs n*(n-1)/2 comparisons
        assert_eq!(metrics.comparisons, 64 * 63 / 2);
        assert!(metrics.swaps.is_none());
        assert!(metrics.allocated_bytes.is_none());
    }

    #[test]
    fn test_unsorted_result_is_recorded_invalid() {
        let mut session = Instrumentation::acquire_blocking();
        let baseline = Baseline::generate(Shape::Random, 128);

        let metrics = profile_run(
            entry_for(noop_sort),
            &baseline,
            128,
            &ExecutionConfig::default(),
            &mut session,
        );

        assert!(!metrics.valid);
        assert_eq!(metrics.comparisons, 0);
    }

    #[test]
    fn test_averaging_does_not_change_counts() {
        let mut session = Instrumentation::acquire_blocking();
        let baseline = Baseline::generate(Shape::Random, 48);

        let single = profile_run(
            entry_for(selection_sort),
            &baseline,
            48,
            &ExecutionConfig {
                averaging_runs: 0,
                ..ExecutionConfig::default()
            },
            &mut session,
        );
        let averaged = profile_run(
            entry_for(selection_sort),
            &baseline,
            48,
            &ExecutionConfig {
                averaging_runs: 3,
                ..ExecutionConfig::default()
            },
            &mut session,
        );

        assert_eq!(single.comparisons, averaged.comparisons);
        assert_eq!(single.swaps, averaged.swaps);
        assert_eq!(single.allocated_bytes, averaged.allocated_bytes);
    }

    #[test]
    fn test_consecutive_runs_are_deterministic() {
        let mut session = Instrumentation::acquire_blocking();
        let baseline = Baseline::generate(Shape::Random, 40);
        let config = ExecutionConfig::default();

        let first = profile_run(entry_for(selection_sort), &baseline, 40, &config, &mut session);
        let second = profile_run(entry_for(selection_sort), &baseline, 40, &config, &mut session);

        assert_eq!(first.comparisons, second.comparisons);
        assert_eq!(first.swaps, second.swaps);
    }

    #[test]
    fn test_swap_counter_is_reset_and_read() {
        static SWAP_CELL: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

        unsafe extern "C" fn swapping_sort(
            data: *mut c_void,
            n: usize,
            width: usize,
            compare: CompareFn,
        ) {
            unsafe { selection_sort(data, n, width, compare) };
            // Pretend every comparison swapped; the executor only reads the cell
            SWAP_CELL.store(7, std::sync::atomic::Ordering::Relaxed);
        }

        let mut session = Instrumentation::acquire_blocking();
        let baseline = Baseline::generate(Shape::Random, 16);
        let counter =
            unsafe { SwapCounter::from_ptr(SWAP_CELL.as_ptr()) }.expect("static cell non-null");
        let entry = SortEntry {
            sort: swapping_sort,
            swaps: Some(&counter),
        };

        let with_profiling = profile_run(
            entry,
            &baseline,
            16,
            &ExecutionConfig {
                profile_swaps: true,
                ..ExecutionConfig::default()
            },
            &mut session,
        );
        assert_eq!(with_profiling.swaps, Some(7));

        // Swap profiling off: the counter is ignored even though it exists
        let without_profiling = profile_run(
            entry,
            &baseline,
            16,
            &ExecutionConfig::default(),
            &mut session,
        );
        assert!(without_profiling.swaps.is_none());
    }

    #[test]
    fn test_sorted_shape_prefix_lengths() {
        let mut session = Instrumentation::acquire_blocking();
        let baseline = Baseline::generate(Shape::PreSorted, 100);

        for n in [1usize, 10, 100] {
            let metrics = profile_run(
                entry_for(selection_sort),
                &baseline,
                n,
                &ExecutionConfig::default(),
                &mut session,
            );
            assert!(metrics.valid, "size {n} should sort valid");
            assert_eq!(metrics.size, n as u64);
        }
    }
}
