#![warn(missing_docs)]
//! Sortbench Plugin - ABI and Loader
//!
//! The harness's single unsafe boundary: the C ABI every sort plugin
//! implements, and the loader that resolves a dynamic-library file into a
//! typed [`SortPlugin`] descriptor with explicit failure variants.

mod abi;
mod loader;

pub use abi::{CompareFn, DescriptorFn, NAME_EXPORT, SWAPS_EXPORT, SYMBOL_EXPORT, SortFn};
pub use loader::{PluginLoadError, SortEntry, SortPlugin, SwapCounter, load, scan_directory};
