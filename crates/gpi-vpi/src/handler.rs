//! The `$info`/`$warning`/`$error`/`$fatal` system-task handler. Installed
//! once at load time so Verilog testbenches that call these tasks get
//! routed through the adapter's own logger instead of whatever the
//! simulator's built-in definition (if any) does, and so `$fatal` can fail
//! the test through `embed_sim_event` rather than just ending the sim.

use std::ffi::{c_int, CStr};

use gpi_capi::embed::{embed_sim_event, TEST_FAIL};
use gpi_core::ErrorLevel;

use crate::ffi::*;

const LEVEL_INFO: c_int = 0;
const LEVEL_WARNING: c_int = 1;
const LEVEL_ERROR: c_int = 2;
const LEVEL_FATAL: c_int = 3;

unsafe fn level_to_gpi(level: c_int) -> ErrorLevel {
    match level {
        LEVEL_INFO => ErrorLevel::Info,
        LEVEL_WARNING => ErrorLevel::Warning,
        LEVEL_ERROR => ErrorLevel::Error,
        _ => ErrorLevel::Critical,
    }
}

/// `compiletf`: expects zero arguments or a single string (Icarus reports
/// that single string argument as `vpiRealVal`, not `vpiStringVal` — kept
/// as an explicit exception rather than silently accepting any type).
pub unsafe extern "C" fn system_function_compiletf(_user_data: *mut c_char) -> c_int {
    let systf_handle = vpi_handle(vpiSysTfCall, std::ptr::null_mut());
    let arg_iterator = vpi_iterate(vpiArgument, systf_handle);
    if arg_iterator.is_null() {
        return 0;
    }
    let arg_handle = vpi_scan(arg_iterator);
    if arg_handle.is_null() {
        return 0;
    }
    let tfarg_type = vpi_get(vpiType, arg_handle);
    if tfarg_type != vpiStringVal && tfarg_type != vpiRealVal {
        log::error!("$info/$warning/$error/$fatal argument has unsupported type {tfarg_type}");
        return -1;
    }
    0
}

/// `calltf`: reads the (optional) message argument, logs it at the level
/// this task was registered for, and for `$fatal` additionally reports the
/// test failure to the embedding runtime.
pub unsafe extern "C" fn system_function_calltf(user_data: *mut c_char) -> c_int {
    let level = *(user_data as *const c_int);
    let systf_handle = vpi_handle(vpiSysTfCall, std::ptr::null_mut());
    let args_iter = vpi_iterate(vpiArgument, systf_handle);

    let mut message = String::from("*** NO MESSAGE PROVIDED ***");
    if !args_iter.is_null() {
        // `$fatal`'s first argument is the finish-behavior number, not the
        // message; skip it before reading the actual string.
        if level == LEVEL_FATAL {
            let _ = vpi_scan(args_iter);
        }
        let arg_handle = vpi_scan(args_iter);
        if !arg_handle.is_null() {
            let mut value = t_vpi_value {
                format: vpiStringVal,
                value: u_vpi_value { str_: std::ptr::null_mut() },
            };
            vpi_get_value(arg_handle, &mut value);
            if !value.value.str_.is_null() {
                message = CStr::from_ptr(value.value.str_).to_string_lossy().into_owned();
            }
        }
    }

    match level_to_gpi(level) {
        ErrorLevel::Info => log::info!(target: "simulator", "{message}"),
        ErrorLevel::Warning => log::warn!(target: "simulator", "{message}"),
        ErrorLevel::Error => log::error!(target: "simulator", "{message}"),
        ErrorLevel::Critical => {
            log::error!(target: "simulator", "{message}");
            let cmsg = std::ffi::CString::new(message).unwrap_or_default();
            embed_sim_event(TEST_FAIL, cmsg.as_ptr());
        }
    }
    0
}

static mut INFO_LEVEL: c_int = LEVEL_INFO;
static mut WARNING_LEVEL: c_int = LEVEL_WARNING;
static mut ERROR_LEVEL: c_int = LEVEL_ERROR;
static mut FATAL_LEVEL: c_int = LEVEL_FATAL;

/// Register all four tasks. Called once from the backend's load-time
/// bootstrap.
pub fn register_system_functions() {
    unsafe {
        register_one(c"$info", &raw mut INFO_LEVEL);
        register_one(c"$warning", &raw mut WARNING_LEVEL);
        register_one(c"$error", &raw mut ERROR_LEVEL);
        register_one(c"$fatal", &raw mut FATAL_LEVEL);
    }
}

unsafe fn register_one(name: &CStr, user_data: *mut c_int) {
    let mut tf_data = t_vpi_systf_data {
        type_: vpiSysTask,
        sysfunctype: vpiSysTask,
        tfname: name.as_ptr(),
        calltf: Some(system_function_calltf),
        compiletf: Some(system_function_compiletf),
        sizetf: None,
        user_data: user_data as *mut c_char,
    };
    vpi_register_systf(&mut tf_data);
}
