//! Reporting Sink
//!
//! Renders each run's metrics twice: a fixed-width console row, and — when a
//! plot directory is configured — a line in a per-(plugin, shape) data file.
//! One gnuplot script per metric kind accumulates a plot directive for every
//! data file, so curves from all plugins overlay on a single chart; the
//! scripts are finalized only after the whole sweep.
//!
//! Data file columns: `size time_ms comparisons swaps allocatedBytes`.

use crate::executor::RunMetrics;
use anyhow::Context;
use sortbench_core::Shape;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Print the per-shape console table header.
pub fn print_table_header() {
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>12} {:>10}",
        "Values", "Compares", "Swaps", "Allocs", "Time", "Validity"
    );
}

/// Print one run as a fixed-width console row.
pub fn print_run(metrics: &RunMetrics) {
    let (color, verdict) = if metrics.valid {
        (82, "valid")
    } else {
        (160, "invalid")
    };
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>10.4}ms \x1b[38;5;{}m{:>10}\x1b[0m",
        metrics.size,
        metrics.comparisons,
        metrics.swaps.unwrap_or(0),
        metrics.allocated_bytes.unwrap_or(0),
        metrics.elapsed_ms(),
        color,
        verdict,
    );
}

/// One gnuplot script accumulating a curve per data file.
struct MetricScript {
    file: File,
}

impl MetricScript {
    fn create(dir: &Path, kind: &str, stamp: &str, title: &str, ylabel: &str) -> anyhow::Result<Self> {
        let path = dir.join(format!("sorts_{kind}_{stamp}.gp"));
        let mut file = File::create(&path)
            .with_context(|| format!("creating plot script {}", path.display()))?;
        write!(
            file,
            "set title \"Sorting Algorithms {title} Benchmark\"\n\
             set xlabel \"Worksize(Array-elements)\"\n\
             set ylabel \"{ylabel}\"\n\
             set autoscale\n\
             plot "
        )?;
        Ok(Self { file })
    }

    fn add_curve(&mut self, data_file: &str, column: u8, label: &str) -> io::Result<()> {
        write!(
            self.file,
            "\"{data_file}\" u 1:{column} t \"{label}\" w points, "
        )
    }

    fn finalize(mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Data file for one (plugin, shape) pair.
pub struct DataFile {
    file: File,
    /// File name (no directory) as referenced by the plot scripts.
    name: String,
}

impl DataFile {
    /// Append one run's metrics as a 5-field line.
    pub fn append(&mut self, metrics: &RunMetrics) -> io::Result<()> {
        writeln!(
            self.file,
            "{} {} {} {} {}",
            metrics.size,
            metrics.elapsed_ms(),
            metrics.comparisons,
            metrics.swaps.unwrap_or(0),
            metrics.allocated_bytes.unwrap_or(0),
        )
    }
}

/// All open file handles of a sweep's plot output.
pub struct PlotSet {
    dir: PathBuf,
    stamp: String,
    time: MetricScript,
    compares: MetricScript,
    memory: Option<MetricScript>,
    swaps: Option<MetricScript>,
}

impl PlotSet {
    /// Create the metric scripts up front; any creation failure is fatal
    /// before work begins.
    pub fn create(
        dir: &Path,
        stamp: &str,
        profile_memory: bool,
        profile_swaps: bool,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            dir: dir.to_path_buf(),
            stamp: stamp.to_owned(),
            time: MetricScript::create(dir, "time", stamp, "Time", "Time(ms)")?,
            compares: MetricScript::create(dir, "compares", stamp, "Comparisons", "Comparisons")?,
            memory: profile_memory
                .then(|| MetricScript::create(dir, "memory", stamp, "Memory", "Memory Usage"))
                .transpose()?,
            swaps: profile_swaps
                .then(|| MetricScript::create(dir, "swaps", stamp, "Swaps", "Swaps"))
                .transpose()?,
        })
    }

    /// Open the data file for one (plugin, shape) pair.
    pub fn open_data_file(&self, plugin: &str, shape: Shape) -> anyhow::Result<DataFile> {
        let name = format!("{}_{}_{}.gpd", plugin, shape.file_tag(), self.stamp);
        let path = self.dir.join(&name);
        let file =
            File::create(&path).with_context(|| format!("creating data file {}", path.display()))?;
        Ok(DataFile { file, name })
    }

    /// Register a completed data file with every active metric script.
    pub fn complete_data_file(
        &mut self,
        data: DataFile,
        plugin: &str,
        shape: Shape,
    ) -> anyhow::Result<()> {
        let label = shape.label();
        let DataFile { mut file, name } = data;
        file.flush()?;
        drop(file);

        self.time
            .add_curve(&name, 2, &format!("{plugin} Time {label}"))?;
        self.compares
            .add_curve(&name, 3, &format!("{plugin} Comparisons {label}"))?;
        if let Some(script) = self.swaps.as_mut() {
            script.add_curve(&name, 4, &format!("{plugin} {label}"))?;
        }
        if let Some(script) = self.memory.as_mut() {
            script.add_curve(&name, 5, &format!("{plugin} {label}"))?;
        }
        Ok(())
    }

    /// Flush and close every metric script.
    pub fn finalize(self) -> io::Result<()> {
        self.time.finalize()?;
        self.compares.finalize()?;
        if let Some(script) = self.memory {
            script.finalize()?;
        }
        if let Some(script) = self.swaps {
            script.finalize()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_metrics(size: u64) -> RunMetrics {
        RunMetrics {
            size,
            comparisons: size * (size - 1) / 2,
            swaps: Some(size / 2),
            allocated_bytes: Some(size * 4),
            wall: Duration::from_micros(1500),
            cpu: Some(Duration::from_micros(1200)),
            valid: true,
        }
    }

    #[test]
    fn test_data_lines_have_five_numeric_fields() {
        let dir = tempfile::tempdir().unwrap();
        let plots = PlotSet::create(dir.path(), "01011970_000000", true, true).unwrap();

        let mut data = plots.open_data_file("Heapsort", Shape::Random).unwrap();
        for size in [10u64, 20, 40] {
            data.append(&sample_metrics(size)).unwrap();
        }
        drop(data);

        let contents = std::fs::read_to_string(
            dir.path().join("Heapsort_random_01011970_000000.gpd"),
        )
        .unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(fields.len(), 5);
            for field in fields {
                field.parse::<f64>().expect("numeric field");
            }
        }
    }

    #[test]
    fn test_swap_column_renders_zero_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let plots = PlotSet::create(dir.path(), "stamp", false, false).unwrap();
        let mut data = plots.open_data_file("Mergesort", Shape::PreSorted).unwrap();

        let metrics = RunMetrics {
            swaps: None,
            allocated_bytes: None,
            ..sample_metrics(10)
        };
        data.append(&metrics).unwrap();
        drop(data);

        let contents =
            std::fs::read_to_string(dir.path().join("Mergesort_sorted_stamp.gpd")).unwrap();
        let fields: Vec<&str> = contents.split_whitespace().collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[3], "0");
        assert_eq!(fields[4], "0");
    }

    #[test]
    fn test_scripts_accumulate_one_directive_per_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut plots = PlotSet::create(dir.path(), "stamp", true, true).unwrap();

        for plugin in ["Bubblesort", "Quicksort"] {
            for shape in [Shape::PreSorted, Shape::Random] {
                let data = plots.open_data_file(plugin, shape).unwrap();
                plots.complete_data_file(data, plugin, shape).unwrap();
            }
        }
        plots.finalize().unwrap();

        for kind in ["time", "compares", "memory", "swaps"] {
            let script =
                std::fs::read_to_string(dir.path().join(format!("sorts_{kind}_stamp.gp"))).unwrap();
            assert!(script.starts_with("set title"));
            assert_eq!(script.matches(".gpd").count(), 4, "{kind} script");
        }
    }

    #[test]
    fn test_profile_gated_scripts_absent_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let plots = PlotSet::create(dir.path(), "stamp", false, false).unwrap();
        plots.finalize().unwrap();

        assert!(dir.path().join("sorts_time_stamp.gp").exists());
        assert!(dir.path().join("sorts_compares_stamp.gp").exists());
        assert!(!dir.path().join("sorts_memory_stamp.gp").exists());
        assert!(!dir.path().join("sorts_swaps_stamp.gp").exists());
    }

    #[test]
    fn test_script_creation_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(PlotSet::create(&missing, "stamp", false, false).is_err());
    }
}
