#![warn(missing_docs)]
//! Sortbench CLI Library
//!
//! Command-line harness that scans a directory for sort plugins, runs each
//! one over controlled input shapes and growing sizes, and reports
//! comparisons, swaps, allocated bytes and elapsed time per run.
//!
//! Plugins are strictly sequential: load, exhaust the full shape/size sweep,
//! unload, move on. Per-plugin load failures are logged and skipped; only an
//! unopenable plugin directory or uncreatable output file aborts the sweep.

pub mod config;
pub mod executor;
pub mod report;

use crate::config::SortbenchConfig;
use crate::executor::{ExecutionConfig, profile_run};
use crate::report::PlotSet;
use anyhow::Context;
use clap::Parser;
use sortbench_core::{GrowthKind, Instrumentation, WorkSizePolicy, generate_baselines};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Sortbench CLI arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "sortbench")]
#[command(author, version, about = "Benchmark harness for dynamically loaded sort plugins")]
pub struct Cli {
    /// Directory scanned for sort plugins
    #[arg(short = 'l', long = "libs")]
    pub libs: Option<PathBuf>,

    /// Plot-output directory; omit to disable file output entirely
    #[arg(short = 'p', long = "plot")]
    pub plot: Option<PathBuf>,

    /// Base sample size
    #[arg(short = 's', long = "start-size")]
    pub start_size: Option<u64>,

    /// Number of sizes per sweep
    #[arg(short = 'r', long = "runs")]
    pub runs: Option<u32>,

    /// Growth amount
    #[arg(short = 'g', long = "growth")]
    pub growth: Option<u64>,

    /// Growth type: 1=linear, 2=exponential, 3=logarithmic
    #[arg(short = 't', long = "growth-type")]
    pub growth_type: Option<u8>,

    /// Averaging trials per run; 0 runs a single unaveraged trial
    #[arg(short = 'a', long = "averaging")]
    pub averaging: Option<u32>,

    /// Record allocated bytes per run
    #[arg(short = 'm', long = "profile-memory")]
    pub profile_memory: bool,

    /// Record plugin-reported swaps per run
    #[arg(short = 'n', long = "profile-swaps")]
    pub profile_swaps: bool,

    /// Verbose (debug) logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Effective settings after layering defaults ← sortbench.toml ← CLI flags.
#[derive(Debug)]
struct Settings {
    libs: PathBuf,
    plot: Option<PathBuf>,
    start_size: u64,
    runs: u32,
    growth: u64,
    growth_type: u8,
    averaging: u32,
    profile_memory: bool,
    profile_swaps: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: &SortbenchConfig) -> Self {
        Self {
            libs: cli
                .libs
                .clone()
                .or_else(|| config.output.plugin_dir.as_deref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("./")),
            plot: cli
                .plot
                .clone()
                .or_else(|| config.output.plot_dir.as_deref().map(PathBuf::from)),
            start_size: cli.start_size.or(config.sweep.start_size).unwrap_or(10),
            runs: cli.runs.or(config.sweep.runs).unwrap_or(5),
            growth: cli.growth.or(config.sweep.growth).unwrap_or(2),
            growth_type: cli.growth_type.or(config.sweep.growth_type).unwrap_or(1),
            averaging: cli.averaging.or(config.sweep.averaging).unwrap_or(3),
            profile_memory: cli.profile_memory || config.profile.memory,
            profile_swaps: cli.profile_swaps || config.profile.swaps,
        }
    }
}

/// Run the sortbench CLI. This is the binary's whole entry point.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(Cli::parse())
}

/// Run the sortbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose);

    let config = SortbenchConfig::discover().unwrap_or_default();
    let settings = Settings::resolve(&cli, &config);

    let kind = GrowthKind::from_tag(settings.growth_type)
        .context("growth type must be 1 (linear), 2 (exponential) or 3 (logarithmic)")?;
    let policy = WorkSizePolicy::new(settings.start_size, settings.growth, kind);
    let max_size = policy.max_size(settings.runs);

    println!(
        "Runs: {}\nMin. Values: {}\nGrowth: {}\nGrowth-type: {}\nMax. Values: {}",
        settings.runs, settings.start_size, settings.growth, settings.growth_type, max_size
    );

    let stamp = chrono::Local::now().format("%d%m%Y_%H%M%S").to_string();
    let mut plots = match settings.plot.as_deref() {
        Some(dir) => Some(PlotSet::create(
            dir,
            &stamp,
            settings.profile_memory,
            settings.profile_swaps,
        )?),
        None => None,
    };

    let candidates = sortbench_plugin::scan_directory(&settings.libs)
        .with_context(|| format!("opening plugin directory {}", settings.libs.display()))?;
    debug!(count = candidates.len(), "plugin candidates found");

    let baselines = generate_baselines(max_size as usize);

    let exec_config = ExecutionConfig {
        averaging_runs: settings.averaging,
        profile_memory: settings.profile_memory,
        profile_swaps: settings.profile_swaps,
    };

    let mut session = Instrumentation::acquire_blocking();

    for path in candidates {
        let plugin = match sortbench_plugin::load(&path) {
            Ok(plugin) => plugin,
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping plugin");
                continue;
            }
        };

        info!(plugin = plugin.name(), entry = plugin.entry_symbol(), "loaded");
        println!("Testing {}", plugin.name());
        if settings.profile_swaps {
            if plugin.has_swap_counter() {
                println!("Profiling swaps.");
            } else {
                debug!(plugin = plugin.name(), "no swap counter exported");
            }
        }

        for baseline in &baselines {
            println!("{}:", baseline.shape().label());
            report::print_table_header();

            let mut data = match plots.as_ref() {
                Some(set) => Some(set.open_data_file(plugin.name(), baseline.shape())?),
                None => None,
            };

            for run in 1..=settings.runs {
                let n = policy.size_for(run) as usize;
                let metrics =
                    profile_run(plugin.entry(), baseline, n, &exec_config, &mut session);
                report::print_run(&metrics);
                if let Some(data) = data.as_mut() {
                    data.append(&metrics)
                        .context("writing plot data line")?;
                }
            }

            if let (Some(set), Some(data)) = (plots.as_mut(), data.take()) {
                set.complete_data_file(data, plugin.name(), baseline.shape())?;
            }
        }

        // Unload before touching the next candidate; plugin lifetimes never
        // overlap.
        drop(plugin);
    }

    if let Some(set) = plots.take() {
        set.finalize().context("finalizing plot scripts")?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
