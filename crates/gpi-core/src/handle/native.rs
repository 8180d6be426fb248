//! Wrapper around the opaque pointer a backend hands us for one of its
//! native objects, callbacks, or iterators. The core never dereferences it;
//! only the owning backend knows how to interpret the bits.

use std::ffi::c_void;
use std::fmt;

/// An opaque handle owned by exactly one backend.
///
/// Single-threaded cooperative scheduling (the simulator is the only
/// executor; see the crate's concurrency notes) is what makes it sound to
/// mark this `Send`/`Sync` despite carrying a raw pointer: the core never
/// touches two of these from different threads at once.
#[derive(Clone, Copy)]
pub struct NativeHandle(*mut c_void);

unsafe impl Send for NativeHandle {}
unsafe impl Sync for NativeHandle {}

impl NativeHandle {
    pub const fn null() -> Self {
        NativeHandle(std::ptr::null_mut())
    }

    /// # Safety
    /// `ptr` must be a pointer the caller's backend knows how to interpret,
    /// or null.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Self {
        NativeHandle(ptr)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:p})", self.0)
    }
}

impl PartialEq for NativeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for NativeHandle {}

impl Default for NativeHandle {
    fn default() -> Self {
        Self::null()
    }
}
