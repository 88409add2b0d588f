//! Configuration loading from sortbench.toml
//!
//! Sweep parameters can be pre-set in a `sortbench.toml` discovered by
//! walking up from the current directory. Every field is optional; CLI flags
//! override file values, and hard-coded defaults fill the rest.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sortbench configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortbenchConfig {
    /// Sweep sizing parameters.
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Optional profiling toggles.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Input and output directories.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Sweep sizing parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Base sample size (CLI: `--start-size`).
    #[serde(default)]
    pub start_size: Option<u64>,
    /// Number of sizes per sweep (CLI: `--runs`).
    #[serde(default)]
    pub runs: Option<u32>,
    /// Growth amount (CLI: `--growth`).
    #[serde(default)]
    pub growth: Option<u64>,
    /// Growth type tag: 1=linear, 2=exponential, 3=logarithmic.
    #[serde(default)]
    pub growth_type: Option<u8>,
    /// Averaging trials per run; 0 means a single unaveraged trial.
    #[serde(default)]
    pub averaging: Option<u32>,
}

/// Profiling toggles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Record allocated bytes per run.
    #[serde(default)]
    pub memory: bool,
    /// Record plugin-reported swaps per run.
    #[serde(default)]
    pub swaps: bool,
}

/// Input and output directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory scanned for plugins (CLI: `--libs`).
    #[serde(default)]
    pub plugin_dir: Option<String>,
    /// Plot-output directory; unset disables file output (CLI: `--plot`).
    #[serde(default)]
    pub plot_dir: Option<String>,
}

impl SortbenchConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("sortbench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_all_unset() {
        let config = SortbenchConfig::default();
        assert!(config.sweep.start_size.is_none());
        assert!(config.sweep.averaging.is_none());
        assert!(!config.profile.memory);
        assert!(config.output.plot_dir.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            [sweep]
            start_size = 100
            growth_type = 2

            [profile]
            swaps = true
        "#;

        let config: SortbenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sweep.start_size, Some(100));
        assert_eq!(config.sweep.growth_type, Some(2));
        assert!(config.profile.swaps);
        // Untouched sections keep their defaults
        assert!(config.sweep.runs.is_none());
        assert!(!config.profile.memory);
        assert!(config.output.plugin_dir.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sortbench.toml");
        std::fs::write(&path, "[output]\nplot_dir = \"plots\"\n").unwrap();

        let config = SortbenchConfig::load(&path).unwrap();
        assert_eq!(config.output.plot_dir.as_deref(), Some("plots"));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sortbench.toml");
        std::fs::write(&path, "[sweep\nstart_size = ").unwrap();
        assert!(SortbenchConfig::load(&path).is_err());
    }
}
