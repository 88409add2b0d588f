//! Plugin ABI
//!
//! Every sort plugin is a dynamic library exporting, with C linkage:
//!
//! - `getSortName() -> *const c_char` — NUL-terminated display name
//! - `getSortSymbol() -> *const c_char` — name of the real entry point; the
//!   indirection lets a plugin rename its implementation symbol without
//!   touching the descriptor exports
//! - the named entry point itself, sorting ascending in place:
//!   `fn(data, count, element_width, comparator)`
//! - optionally a mutable `totalSwaps: u64`, incremented once per swap
//!
//! The comparator implements a total order and returns `<0` / `0` / `>0`.

use std::ffi::{c_char, c_int, c_void};

/// Element comparator passed to a plugin's entry point.
pub type CompareFn = unsafe extern "C" fn(*const c_void, *const c_void) -> c_int;

/// The resolved sort entry point: `(data, count, element_width, comparator)`.
pub type SortFn = unsafe extern "C" fn(*mut c_void, usize, usize, CompareFn);

/// Descriptor accessor: `getSortName` / `getSortSymbol`.
pub type DescriptorFn = unsafe extern "C" fn() -> *const c_char;

/// Export naming the plugin for display.
pub const NAME_EXPORT: &str = "getSortName";

/// Export naming the real entry-point symbol.
pub const SYMBOL_EXPORT: &str = "getSortSymbol";

/// Optional export holding the plugin's cooperative swap counter.
pub const SWAPS_EXPORT: &str = "totalSwaps";
