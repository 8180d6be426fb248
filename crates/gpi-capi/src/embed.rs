//! The hooks the user runtime, not this adapter, implements: `embed_sim_init`,
//! `embed_sim_event`, `embed_init_python`, `embed_sim_cleanup`. Declared
//! `extern "C"` here and resolved against whatever symbol the host process
//! links in (statically, or via `GPI_EXTRA`/the simulator's own loader).

use std::ffi::{c_char, c_int, CString};

use gpi_core::ErrorLevel;

/// The only event kind this adapter ever reports through `embed_sim_event`:
/// a `Critical`-level failure surfaced from `$fatal` or a simulator API
/// error. Kept as an explicit constant (rather than folded away since it
/// never varies) so the hook's signature matches the two-argument
/// `embed_sim_event(kind, msg)` every backend declares independently.
pub const TEST_FAIL: c_int = 1;

extern "C" {
    fn embed_sim_init(argc: c_int, argv: *const *const c_char) -> c_int;
    pub fn embed_sim_event(kind: c_int, message: *const c_char);
    fn embed_init_python();
    fn embed_sim_cleanup();
}

/// Safe wrapper around `embed_sim_init`; called once by whichever backend's
/// startup routine runs first.
pub fn sim_init(args: &[String]) -> i32 {
    let cargs: Vec<CString> = args.iter().map(|a| CString::new(a.as_str()).unwrap_or_default()).collect();
    let ptrs: Vec<*const c_char> = cargs.iter().map(|c| c.as_ptr()).collect();
    unsafe { embed_sim_init(ptrs.len() as c_int, ptrs.as_ptr()) }
}

/// Forward an adapter-classified error to the user runtime. `Critical`
/// additionally triggers `sim_end()` on every registered backend, tearing
/// the simulation process down.
pub fn report(level: ErrorLevel, message: &str) {
    match level {
        ErrorLevel::Info => log::info!("{message}"),
        ErrorLevel::Warning => log::warn!("{message}"),
        ErrorLevel::Error => log::error!("{message}"),
        ErrorLevel::Critical => log::error!("critical: {message}"),
    }
    if level == ErrorLevel::Critical {
        if let Ok(cmsg) = CString::new(message) {
            unsafe {
                embed_sim_event(TEST_FAIL, cmsg.as_ptr());
            }
        }
        gpi_core::registry().sim_end();
    }
}

/// Invoked after every backend named in a vendor startup-routine table has
/// registered.
pub fn init_python() {
    unsafe {
        embed_init_python();
    }
}

pub fn sim_cleanup() {
    unsafe {
        embed_sim_cleanup();
    }
}
