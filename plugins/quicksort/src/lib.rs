//! Quicksort sample plugin
//!
//! Middle-pivot Lomuto partitioning over opaque `width`-byte elements. The
//! entry point is exported as `quicksort` rather than `sort`, exercising the
//! ABI's symbol-renaming indirection via `getSortSymbol`.

use std::ffi::{c_char, c_int, c_void};
use std::sync::atomic::{AtomicU64, Ordering};

/// Swap counter zeroed and read by the harness around each trial.
#[unsafe(export_name = "totalSwaps")]
pub static TOTAL_SWAPS: AtomicU64 = AtomicU64::new(0);

/// Comparator provided by the harness; returns <0 / 0 / >0.
pub type CompareFn = unsafe extern "C" fn(*const c_void, *const c_void) -> c_int;

#[unsafe(export_name = "getSortName")]
pub extern "C" fn sort_name() -> *const c_char {
    c"Quicksort".as_ptr()
}

#[unsafe(export_name = "getSortSymbol")]
pub extern "C" fn sort_symbol() -> *const c_char {
    c"quicksort".as_ptr()
}

#[inline]
unsafe fn element(data: *mut c_void, index: usize, width: usize) -> *mut u8 {
    unsafe { data.cast::<u8>().add(index * width) }
}

/// Swap two `width`-byte elements, counting the swap. Goes through a heap
/// scratch buffer so swaps are visible to the harness's allocation profile.
unsafe fn swap_elements(left: *mut u8, right: *mut u8, width: usize) {
    if left == right {
        return;
    }
    TOTAL_SWAPS.fetch_add(1, Ordering::Relaxed);
    let mut scratch = vec![0u8; width];
    unsafe {
        std::ptr::copy_nonoverlapping(left, scratch.as_mut_ptr(), width);
        std::ptr::copy_nonoverlapping(right, left, width);
        std::ptr::copy_nonoverlapping(scratch.as_ptr(), right, width);
    }
}

/// Partition `[start, end]` around its middle element, then recurse.
unsafe fn partition_range(
    data: *mut c_void,
    width: usize,
    start: isize,
    end: isize,
    compare: CompareFn,
) {
    if end - start <= 0 {
        return;
    }

    unsafe {
        let pivot = (end - start) / 2 + start;
        swap_elements(
            element(data, pivot as usize, width),
            element(data, end as usize, width),
            width,
        );
        let pivot_value = element(data, end as usize, width);

        let mut store = start;
        for i in start..end {
            let probe = element(data, i as usize, width);
            if compare(probe.cast_const().cast(), pivot_value.cast_const().cast()) < 0 {
                swap_elements(element(data, store as usize, width), probe, width);
                store += 1;
            }
        }
        swap_elements(
            element(data, store as usize, width),
            element(data, end as usize, width),
            width,
        );

        partition_range(data, width, start, store - 1, compare);
        partition_range(data, width, store + 1, end, compare);
    }
}

/// Sort `n` elements of `width` bytes ascending in place.
///
/// # Safety
/// `data` must point to `n` initialized elements of `width` bytes, and
/// `compare` must implement a total order over them.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn quicksort(data: *mut c_void, n: usize, width: usize, compare: CompareFn) {
    if data.is_null() || n == 0 {
        return;
    }
    unsafe { partition_range(data, width, 0, (n - 1) as isize, compare) }
}
