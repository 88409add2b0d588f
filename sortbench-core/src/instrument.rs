//! Allocation and Comparison Instrumentation
//!
//! Process-wide interposition of the C allocation entry points (`malloc`,
//! `realloc`, `calloc`), gated by a recording flag that is armed only for the
//! duration of one profiled sort call. Dynamically loaded plugins resolve
//! their allocator against the harness binary, so their allocations are
//! observed too; loader I/O and report writing happen outside the armed
//! window and never pollute the measurement.
//!
//! Access to the counters goes through [`Instrumentation`], the process's
//! single recording session. The interposition patches process-global entry
//! points, so only one profiled call may be in flight at any moment; the
//! session object makes that discipline explicit instead of leaving it to
//! convention.

use std::ffi::{c_int, c_void};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static SESSION_HELD: AtomicBool = AtomicBool::new(false);
static RECORDING: AtomicBool = AtomicBool::new(false);
static ALLOCATED_BYTES: AtomicU64 = AtomicU64::new(0);
static COMPARISONS: AtomicU64 = AtomicU64::new(0);

/// Add `bytes` to the allocation total if recording is armed.
#[inline]
fn note_alloc(bytes: u64) {
    if RECORDING.load(Ordering::Relaxed) {
        ALLOCATED_BYTES.fetch_add(bytes, Ordering::Relaxed);
    }
}

/// Counting total-order comparator for `i32` elements.
///
/// This is the comparator the harness passes to every plugin. Each call adds
/// one to the comparison counter owned by the active recording session.
///
/// # Safety
/// `a` and `b` must point to valid, aligned `i32` values.
pub unsafe extern "C" fn compare_i32(a: *const c_void, b: *const c_void) -> c_int {
    COMPARISONS.fetch_add(1, Ordering::Relaxed);
    let (x, y) = unsafe { (*a.cast::<i32>(), *b.cast::<i32>()) };
    match x.cmp(&y) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

/// The process's single instrumentation session.
///
/// Holding an `Instrumentation` grants exclusive use of the global counters;
/// a second concurrent [`acquire`](Self::acquire) fails until the first
/// session is dropped. The type is deliberately `!Send`: the counters are
/// meaningful only under single-threaded use.
pub struct Instrumentation {
    _single_thread: PhantomData<*mut ()>,
}

impl Instrumentation {
    /// Claim the recording session, or `None` if it is already held.
    pub fn acquire() -> Option<Self> {
        SESSION_HELD
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(Self {
                _single_thread: PhantomData,
            })
    }

    /// Claim the recording session, waiting for the current holder to drop it.
    ///
    /// Intended for tests, where independent cases contend for the process's
    /// one session.
    pub fn acquire_blocking() -> Self {
        loop {
            if let Some(session) = Self::acquire() {
                return session;
            }
            std::thread::yield_now();
        }
    }

    /// Zero the comparison and allocation counters and arm recording.
    ///
    /// Recording stays armed until the returned guard is dropped. The guard
    /// borrows the session mutably, so counter reads are only possible after
    /// disarming.
    pub fn begin_trial(&mut self) -> RecordingGuard<'_> {
        COMPARISONS.store(0, Ordering::Relaxed);
        ALLOCATED_BYTES.store(0, Ordering::Relaxed);
        RECORDING.store(true, Ordering::Release);
        RecordingGuard { _session: self }
    }

    /// Comparator invocations since the last [`begin_trial`](Self::begin_trial).
    pub fn comparisons(&self) -> u64 {
        COMPARISONS.load(Ordering::Relaxed)
    }

    /// Bytes requested from the interposed allocation entry points while the
    /// last trial was armed.
    pub fn allocated_bytes(&self) -> u64 {
        ALLOCATED_BYTES.load(Ordering::Relaxed)
    }
}

impl Drop for Instrumentation {
    fn drop(&mut self) {
        SESSION_HELD.store(false, Ordering::Release);
    }
}

/// Disarms recording when dropped.
pub struct RecordingGuard<'a> {
    _session: &'a mut Instrumentation,
}

impl Drop for RecordingGuard<'_> {
    fn drop(&mut self) {
        RECORDING.store(false, Ordering::Release);
    }
}

// ─── Interposed entry points ─────────────────────────────────────────────────

/// Whether allocation interposition is installed on this platform.
pub const HAS_ALLOC_INTERPOSITION: bool = cfg!(target_os = "linux");

#[cfg(target_os = "linux")]
mod hooks {
    //! Exported `malloc`/`realloc`/`calloc`/`free` that shadow libc's for the
    //! whole process (the harness binary links with `-rdynamic` so dlopened
    //! plugins bind to them as well). Each forwards to the real entry point,
    //! resolved lazily via `dlsym(RTLD_NEXT, ..)`.

    use super::note_alloc;
    use std::ffi::{CStr, c_void};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    type CMalloc = unsafe extern "C" fn(usize) -> *mut c_void;
    type CRealloc = unsafe extern "C" fn(*mut c_void, usize) -> *mut c_void;
    type CCalloc = unsafe extern "C" fn(usize, usize) -> *mut c_void;
    type CFree = unsafe extern "C" fn(*mut c_void);

    static REAL_MALLOC: AtomicUsize = AtomicUsize::new(0);
    static REAL_REALLOC: AtomicUsize = AtomicUsize::new(0);
    static REAL_CALLOC: AtomicUsize = AtomicUsize::new(0);
    static REAL_FREE: AtomicUsize = AtomicUsize::new(0);
    static RESOLVING: AtomicBool = AtomicBool::new(false);

    // glibc's dlsym can itself call calloc while the real entry points are
    // being resolved; such re-entrant requests are served from this fixed
    // arena. Chunks are handed out append-only and never reused, so the
    // zero-initialized static satisfies calloc semantics.
    const ARENA_SIZE: usize = 4096;

    #[repr(align(16))]
    struct Arena(std::cell::UnsafeCell<[u8; ARENA_SIZE]>);

    // SAFETY: chunks are claimed through an atomic offset and never aliased.
    unsafe impl Sync for Arena {}

    static ARENA: Arena = Arena(std::cell::UnsafeCell::new([0; ARENA_SIZE]));
    static ARENA_USED: AtomicUsize = AtomicUsize::new(0);

    fn arena_alloc(size: usize) -> *mut c_void {
        let size = (size + 15) & !15;
        let offset = ARENA_USED.fetch_add(size, Ordering::Relaxed);
        if offset + size > ARENA_SIZE {
            return std::ptr::null_mut();
        }
        unsafe { ARENA.0.get().cast::<u8>().add(offset).cast() }
    }

    fn from_arena(ptr: *mut c_void) -> bool {
        let base = ARENA.0.get() as usize;
        (base..base + ARENA_SIZE).contains(&(ptr as usize))
    }

    /// Resolve `name` through `RTLD_NEXT`, caching the address in `slot`.
    fn resolve(name: &CStr, slot: &AtomicUsize) -> usize {
        let cached = slot.load(Ordering::Relaxed);
        if cached != 0 {
            return cached;
        }
        // SAFETY: dlsym with a NUL-terminated name; RTLD_NEXT skips our own
        // exported symbol and finds libc's.
        let addr = unsafe { libc::dlsym(libc::RTLD_NEXT, name.as_ptr()) } as usize;
        slot.store(addr, Ordering::Relaxed);
        addr
    }

    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
        note_alloc(size as u64);
        let real: CMalloc = unsafe { std::mem::transmute(resolve(c"malloc", &REAL_MALLOC)) };
        unsafe { real(size) }
    }

    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
        note_alloc(size as u64);
        let real: CRealloc = unsafe { std::mem::transmute(resolve(c"realloc", &REAL_REALLOC)) };
        unsafe { real(ptr, size) }
    }

    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn calloc(nmemb: usize, size: usize) -> *mut c_void {
        let total = nmemb.saturating_mul(size);
        if REAL_CALLOC.load(Ordering::Relaxed) == 0 {
            if RESOLVING.swap(true, Ordering::Acquire) {
                return arena_alloc(total);
            }
            resolve(c"calloc", &REAL_CALLOC);
            RESOLVING.store(false, Ordering::Release);
        }
        note_alloc(total as u64);
        let real: CCalloc =
            unsafe { std::mem::transmute(REAL_CALLOC.load(Ordering::Relaxed)) };
        unsafe { real(nmemb, size) }
    }

    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn free(ptr: *mut c_void) {
        if ptr.is_null() || from_arena(ptr) {
            return;
        }
        let real: CFree = unsafe { std::mem::transmute(resolve(c"free", &REAL_FREE)) };
        unsafe { real(ptr) }
    }
}
