//! The FLI load-time entry point. Mentor/Siemens simulators resolve the FLI
//! foreign-architecture's configured entry symbol (the name is whatever the
//! design's `foreign` attribute string names, not a fixed vendor convention
//! the way VPI/VHPI have one) and call it once at elaboration time.

use gpi_core::UserData;

use crate::backend::FliBackend;

/// FLI exposes no equivalent of VPI's `vpi_get_vlog_info`/VHPI's
/// `vhpiTool` argv relation, so the user runtime is started with no
/// captured arguments. The embedded interpreter itself is already up by
/// this point: `gpi_capi::bootstrap` brings it up once, at load time,
/// right after registration.
extern "C" fn on_startup(_data: UserData) -> i32 {
    let rc = gpi_capi::embed::sim_init(&[]);
    if rc != 0 {
        gpi_capi::embed::report(gpi_core::ErrorLevel::Critical, "simulator shutdown prematurely");
    }
    rc
}

extern "C" fn on_shutdown(_data: UserData) -> i32 {
    gpi_capi::embed::sim_cleanup();
    0
}

#[no_mangle]
pub extern "C" fn gpi_fli_entry_point() {
    if let Err(e) = gpi_capi::bootstrap(Box::new(FliBackend::new()), on_startup, on_shutdown) {
        log::warn!("gpi-fli: {e}");
    } else {
        log::info!("gpi-fli: registered FLI backend");
    }
}

pub fn register() {
    gpi_fli_entry_point();
}
