//! Bubblesort sample plugin
//!
//! Implements the sortbench plugin ABI: `getSortName`, `getSortSymbol`, the
//! named entry point, and the cooperative `totalSwaps` counter.

use std::ffi::{c_char, c_int, c_void};
use std::sync::atomic::{AtomicU64, Ordering};

/// Swap counter zeroed and read by the harness around each trial.
#[unsafe(export_name = "totalSwaps")]
pub static TOTAL_SWAPS: AtomicU64 = AtomicU64::new(0);

/// Comparator provided by the harness; returns <0 / 0 / >0.
pub type CompareFn = unsafe extern "C" fn(*const c_void, *const c_void) -> c_int;

#[unsafe(export_name = "getSortName")]
pub extern "C" fn sort_name() -> *const c_char {
    c"Bubblesort".as_ptr()
}

#[unsafe(export_name = "getSortSymbol")]
pub extern "C" fn sort_symbol() -> *const c_char {
    c"sort".as_ptr()
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

/// Sort `n` elements of `width` bytes ascending in place.
///
/// # Safety
/// `data` must point to `n` initialized elements of `width` bytes, and
/// `compare` must implement a total order over them.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sort(data: *mut c_void, n: usize, width: usize, compare: CompareFn) {
    if data.is_null() || n == 0 {
        return;
    }
    for i in 0..n - 1 {
        for j in i + 1..n {
            unsafe {
                let a = element(data, i, width);
                let b = element(data, j, width);
                if compare(a.cast_const().cast(), b.cast_const().cast()) > 0 {
                    swap_elements(a, b, width);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests share the exported swap counter; hold this while sorting so the
    // counter assertions see only their own swaps.
    static SWAP_LOCK: Mutex<()> = Mutex::new(());

    unsafe extern "C" fn cmp_i32(a: *const c_void, b: *const c_void) -> c_int {
        let (x, y) = unsafe { (*a.cast::<i32>(), *b.cast::<i32>()) };
        match x.cmp(&y) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        }
    }

    fn run_sort(values: &mut [i32]) {
        unsafe {
            sort(
                values.as_mut_ptr().cast(),
                values.len(),
                size_of::<i32>(),
                cmp_i32,
            )
        };
    }

    #[test]
    fn test_sorts_ascending_and_preserves_multiset() {
        let _guard = SWAP_LOCK.lock().unwrap();
        let mut values = vec![9, -3, 7, 7, 0, 42, -100, 5];
        let mut expected = values.clone();
        expected.sort_unstable();

        run_sort(&mut values);
        assert_eq!(values, expected);
    }

    #[test]
    fn test_handles_degenerate_inputs() {
        let mut empty: [i32; 0] = [];
        run_sort(&mut empty);

        let mut single = [42];
        run_sort(&mut single);
        assert_eq!(single, [42]);

        unsafe { sort(std::ptr::null_mut(), 10, size_of::<i32>(), cmp_i32) };
    }

    #[test]
    fn test_counts_swaps_and_skips_sorted_input() {
        let _guard = SWAP_LOCK.lock().unwrap();
        TOTAL_SWAPS.store(0, Ordering::Relaxed);

        let mut sorted = [1, 2, 3, 4, 5];
        run_sort(&mut sorted);
        assert_eq!(TOTAL_SWAPS.load(Ordering::Relaxed), 0);

        let mut reversed = [5, 4, 3, 2, 1];
        run_sort(&mut reversed);
        assert_eq!(reversed, [1, 2, 3, 4, 5]);
        assert!(TOTAL_SWAPS.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_descriptors() {
        let name = unsafe { std::ffi::CStr::from_ptr(sort_name()) };
        assert_eq!(name.to_str().unwrap(), "Bubblesort");
        let symbol = unsafe { std::ffi::CStr::from_ptr(sort_symbol()) };
        assert_eq!(symbol.to_str().unwrap(), "sort");
    }
}
