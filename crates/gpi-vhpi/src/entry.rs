//! The VHPI load-time entry point. Aldec/Questa/Xcelium all look for a
//! `vhpi_startup_routines` array of function pointers in the loaded shared
//! object and call each one once, unconditionally, at elaboration time.

use gpi_core::UserData;

use crate::backend::{captured_args, VhpiBackend};

/// The embedded interpreter itself is already up by this point:
/// `gpi_capi::bootstrap` brings it up once, at load time, right after
/// registration.
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
    if let Err(e) = gpi_capi::bootstrap(Box::new(VhpiBackend::new()), on_startup, on_shutdown) {
        log::warn!("gpi-vhpi: {e}");
    } else {
        log::info!("gpi-vhpi: registered VHPI backend");
    }
}

#[no_mangle]
pub static mut vhpi_startup_routines: [Option<extern "C" fn()>; 2] = [Some(bootstrap), None];

/// Exported for simulators that do not honor the `vhpi_startup_routines`
/// table convention and instead look for a well-known bootstrap symbol by
/// name; runs the same sequence `vhpi_startup_routines` would have.
#[no_mangle]
pub extern "C" fn vhpi_bootstrap() {
    bootstrap();
}

pub fn register() {
    bootstrap();
}
