//! The VPI load-time entry point. Every Verilog simulator that supports VPI
//! looks for a `vlog_startup_routines` symbol in each loaded `.vpi`/`.so`
//! and calls every non-null function pointer in it once, at load time; this
//! is the only hook a VPI extension gets to register itself.

use gpi_core::UserData;

use crate::backend::{captured_args, VpiBackend};
use crate::handler::register_system_functions;

/// Fires on `cbStartOfSimulation`: captures the simulator's argv via
/// `vpi_get_vlog_info` and hands it to the user runtime. The embedded
/// interpreter itself is already up by this point: `gpi_capi::bootstrap`
/// brings it up once, at load time, right after registration.
extern "C" fn on_startup(_data: UserData) -> i32 {
    let rc = gpi_capi::embed::sim_init(&captured_args());
    if rc != 0 {
        gpi_capi::embed::report(gpi_core::ErrorLevel::Critical, "simulator shutdown prematurely");
    }
    rc
}

extern "C" fn on_shutdown(_data: UserData) -> i32 {
    gpi_capi::embed::sim_cleanup();
    0
}

extern "C" fn bootstrap() {
    if let Err(e) = gpi_capi::bootstrap(Box::new(VpiBackend::new()), on_startup, on_shutdown) {
        log::warn!("gpi-vpi: {e}");
    } else {
        log::info!("gpi-vpi: registered VPI backend");
    }

    register_system_functions();
}

#[no_mangle]
pub static mut vlog_startup_routines: [Option<extern "C" fn()>; 2] = [Some(bootstrap), None];

/// Exported for simulators that do not honor the `vlog_startup_routines`
/// table convention and instead look for a well-known bootstrap symbol by
/// name; runs the same sequence `vlog_startup_routines` would have.
#[no_mangle]
pub extern "C" fn vpi_bootstrap() {
    bootstrap();
}

/// Re-exported so `gpi-capi`'s `GPI_EXTRA` loader can call this backend's
/// bootstrap explicitly for simulators that load extensions through that
/// path rather than `vlog_startup_routines` (e.g. when embedded rather than
/// run as a standalone simulator plugin).
pub fn register() {
    bootstrap();
}
