//! Plugin Loader
//!
//! Resolves a dynamic-library file into a callable [`SortPlugin`] descriptor.
//! All `dlopen`/`dlsym` use is confined to this module; the rest of the
//! harness only sees typed results.
//!
//! Resolution order mirrors the ABI: open the library, read both descriptor
//! exports, resolve the entry point by the name `getSortSymbol` returned,
//! then probe for the optional swap counter. Every failure is a typed,
//! per-plugin error — the caller logs it and continues scanning.

use crate::abi::{CompareFn, DescriptorFn, NAME_EXPORT, SWAPS_EXPORT, SYMBOL_EXPORT, SortFn};
use libloading::Library;
use std::ffi::{CStr, c_void};
use std::io;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use thiserror::Error;
use tracing::debug;

/// Why a directory entry failed to resolve into a plugin.
#[derive(Debug, Error)]
pub enum PluginLoadError {
    /// The file could not be opened as a dynamic library.
    #[error("failed to open {path}: {source}")]
    Unopenable {
        /// The offending file.
        path: PathBuf,
        /// Loader error from the platform.
        #[source]
        source: libloading::Error,
    },

    /// A descriptor export (`getSortName`/`getSortSymbol`) is missing.
    #[error("missing descriptor export `{symbol}`: {source}")]
    MissingDescriptor {
        /// Which descriptor export was absent.
        symbol: &'static str,
        /// Loader error from the platform.
        #[source]
        source: libloading::Error,
    },

    /// A descriptor export returned something other than UTF-8 text.
    #[error("descriptor export `{symbol}` did not return valid UTF-8")]
    InvalidDescriptor {
        /// Which descriptor export misbehaved.
        symbol: &'static str,
    },

    /// The entry point named by `getSortSymbol` does not exist.
    #[error("missing entry point `{symbol}`: {source}")]
    MissingEntryPoint {
        /// The symbol name the plugin claimed to export.
        symbol: String,
        /// Loader error from the platform.
        #[source]
        source: libloading::Error,
    },
}

/// A plugin's cooperative swap counter, owned by the plugin library.
///
/// The harness zeroes it immediately before each trial and reads it
/// immediately after; the plugin increments it once per element swap.
#[derive(Debug, Clone, Copy)]
pub struct SwapCounter(NonNull<u64>);

impl SwapCounter {
    /// Wrap a raw counter cell.
    ///
    /// # Safety
    /// `ptr` must point to a `u64` that outlives the returned value — for a
    /// loaded plugin, the exported cell lives as long as the library.
    pub unsafe fn from_ptr(ptr: *mut u64) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Zero the counter.
    pub fn reset(&self) {
        // SAFETY: the cell is valid per the from_ptr contract; volatile
        // because the writer lives on the far side of an FFI boundary.
        unsafe { self.0.as_ptr().write_volatile(0) }
    }

    /// Read the counter.
    pub fn read(&self) -> u64 {
        // SAFETY: as above.
        unsafe { self.0.as_ptr().read_volatile() }
    }
}

/// Borrowed view of a plugin's callable surface, valid while the plugin is
/// loaded. This is what the executor consumes; tests build one from plain
/// `extern "C"` functions without touching the loader.
#[derive(Clone, Copy)]
pub struct SortEntry<'a> {
    /// The resolved sort entry point.
    pub sort: SortFn,
    /// The swap counter, when the plugin exports one.
    pub swaps: Option<&'a SwapCounter>,
}

impl<'a> SortEntry<'a> {
    /// Invoke the entry point over `buffer`.
    ///
    /// # Safety
    /// The plugin must honor the ABI contract: sort in place, retain no
    /// aliases into the buffer after returning.
    pub unsafe fn invoke(&self, buffer: &mut [i32], comparator: CompareFn) {
        unsafe {
            (self.sort)(
                buffer.as_mut_ptr().cast::<c_void>(),
                buffer.len(),
                size_of::<i32>(),
                comparator,
            )
        }
    }
}

/// A fully resolved sort plugin. Dropping it unloads the library.
pub struct SortPlugin {
    name: String,
    entry_symbol: String,
    sort: SortFn,
    swaps: Option<SwapCounter>,
    // Field order matters: the function pointer and counter above must be
    // dropped before the library they point into.
    _library: Library,
}

impl SortPlugin {
    /// Display name reported by `getSortName`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry-point symbol reported by `getSortSymbol`.
    pub fn entry_symbol(&self) -> &str {
        &self.entry_symbol
    }

    /// Whether the plugin exports a swap counter.
    pub fn has_swap_counter(&self) -> bool {
        self.swaps.is_some()
    }

    /// The callable surface, borrowed for the plugin's lifetime.
    pub fn entry(&self) -> SortEntry<'_> {
        SortEntry {
            sort: self.sort,
            swaps: self.swaps.as_ref(),
        }
    }
}

/// Call a descriptor export and copy out its string.
fn read_descriptor(library: &Library, symbol: &'static str) -> Result<String, PluginLoadError> {
    // SAFETY: the symbol is typed per the ABI; the returned pointer must be a
    // NUL-terminated string with static lifetime inside the library.
    let text = unsafe {
        let accessor = library
            .get::<DescriptorFn>(symbol.as_bytes())
            .map_err(|source| PluginLoadError::MissingDescriptor { symbol, source })?;
        CStr::from_ptr(accessor())
    };
    text.to_str()
        .map(str::to_owned)
        .map_err(|_| PluginLoadError::InvalidDescriptor { symbol })
}

/// Load one plugin from `path`, resolving all required exports.
pub fn load(path: &Path) -> Result<SortPlugin, PluginLoadError> {
    // SAFETY: loading a library runs its initializers; plugins are trusted
    // code by design (see the harness's resource model).
    let library = unsafe { Library::new(path) }.map_err(|source| PluginLoadError::Unopenable {
        path: path.to_path_buf(),
        source,
    })?;

    let name = read_descriptor(&library, NAME_EXPORT)?;
    let entry_symbol = read_descriptor(&library, SYMBOL_EXPORT)?;

    // SAFETY: the entry point is typed per the ABI; copying the function
    // pointer out of the Symbol is sound because SortPlugin keeps the
    // library alive alongside it.
    let sort: SortFn = unsafe {
        *library
            .get::<SortFn>(entry_symbol.as_bytes())
            .map_err(|source| PluginLoadError::MissingEntryPoint {
                symbol: entry_symbol.clone(),
                source,
            })?
    };

    // Optional export: absence is not an error.
    // SAFETY: when present, the cell lives as long as the library.
    let swaps = unsafe {
        library
            .get::<*mut u64>(SWAPS_EXPORT.as_bytes())
            .ok()
            .and_then(|cell| SwapCounter::from_ptr(*cell))
    };

    debug!(
        plugin = %name,
        entry = %entry_symbol,
        swap_counter = swaps.is_some(),
        "resolved plugin"
    );

    Ok(SortPlugin {
        name,
        entry_symbol,
        sort,
        swaps,
        _library: library,
    })
}

/// Collect the plugin candidates in `dir`: regular files carrying the
/// platform dynamic-library extension, sorted for deterministic sweeps.
pub fn scan_directory(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if path
            .extension()
            .is_some_and(|ext| ext == std::env::consts::DLL_EXTENSION)
        {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}
