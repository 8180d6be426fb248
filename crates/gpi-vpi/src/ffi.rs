//! Hand-written subset of IEEE 1364 `vpi_user.h`: just the object types,
//! callback reasons, value formats and entry points the backend actually
//! calls. Not bindgen output — the surface is small and stable enough that
//! maintaining it by hand is less churn than regenerating a full binding
//! from the vendor header on every simulator version bump.

#![allow(non_camel_case_types, non_upper_case_globals, dead_code)]

use std::ffi::{c_char, c_int, c_void};

pub type vpiHandle = *mut c_void;

pub const vpiModule: c_int = 32;
pub const vpiNet: c_int = 36;
pub const vpiReg: c_int = 48;
pub const vpiMemory: c_int = 29;
pub const vpiIntegerVar: c_int = 26;
pub const vpiRealVar: c_int = 47;
pub const vpiNamedEvent: c_int = 41;
pub const vpiParameter: c_int = 41 + 1;
pub const vpiGenScope: c_int = 624;
pub const vpiGenScopeArray: c_int = 623;
pub const vpiDriver: c_int = 90;
pub const vpiLoad: c_int = 91;

pub const vpiType: c_int = 1;
pub const vpiName: c_int = 2;
pub const vpiFullName: c_int = 3;
pub const vpiSize: c_int = 4;
pub const vpiConstType: c_int = 40;
pub const vpiConstantSelect: c_int = 93;
pub const vpiAutomatic: c_int = 17;
pub const vpiLeftRange: c_int = 79;
pub const vpiRightRange: c_int = 83;

pub const vpiBinStrVal: c_int = 1;
pub const vpiOctStrVal: c_int = 2;
pub const vpiDecStrVal: c_int = 3;
pub const vpiHexStrVal: c_int = 4;
pub const vpiScalarVal: c_int = 5;
pub const vpiIntVal: c_int = 6;
pub const vpiRealVal: c_int = 7;
pub const vpiStringVal: c_int = 8;
pub const vpiVectorVal: c_int = 9;

pub const vpiNoDelay: c_int = 1;
pub const vpiInertialDelay: c_int = 2;
pub const vpiForceFlag: c_int = 5;
pub const vpiReleaseFlag: c_int = 6;

pub const cbValueChange: c_int = 1;
pub const cbAtEndOfSimTime: c_int = 6;
pub const cbReadOnlySynch: c_int = 7;
pub const cbReadWriteSynch: c_int = 8;
pub const cbNextSimTime: c_int = 9;
pub const cbAfterDelay: c_int = 10;
pub const cbStartOfSimulation: c_int = 11;
pub const cbEndOfSimulation: c_int = 12;

pub const vpiSysTask: c_int = 76;
pub const vpiSysFunc: c_int = 77;
pub const vpiSysTfCall: c_int = 85;
pub const vpiArgument: c_int = 89;
pub const vpiFile: c_int = 11;
pub const vpiLineNo: c_int = 40;

pub const vpiSimTime: c_int = 1;
pub const vpiScaledRealTime: c_int = 2;

pub const vpiStop: c_int = 66;
pub const vpiFinish: c_int = 67;

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct t_vpi_time {
    pub type_: c_int,
    pub high: u32,
    pub low: u32,
    pub real: f64,
}

#[repr(C)]
pub union u_vpi_value {
    pub str_: *mut c_char,
    pub scalar: c_int,
    pub integer: c_int,
    pub real: f64,
    // vector/misc fields elided; unused by this backend
}

#[repr(C)]
pub struct t_vpi_value {
    pub format: c_int,
    pub value: u_vpi_value,
}

/// Filled in by `vpi_get_vlog_info`; `argv` points at `argc` C strings
/// owned by the simulator and valid for the life of the process.
#[repr(C)]
pub struct t_vpi_vlog_info {
    pub argc: c_int,
    pub argv: *mut *mut c_char,
    pub product: *mut c_char,
    pub version: *mut c_char,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct t_vpi_error_info {
    pub state: c_int,
    pub level: c_int,
    pub message: *mut c_char,
    pub product: *mut c_char,
    pub code: *mut c_char,
    pub file: *mut c_char,
    pub line: c_int,
}

pub type vpi_callback_fn = Option<unsafe extern "C" fn(*mut t_cb_data) -> c_int>;

#[repr(C)]
pub struct t_cb_data {
    pub reason: c_int,
    pub cb_rtn: vpi_callback_fn,
    pub obj: vpiHandle,
    pub time: *mut t_vpi_time,
    pub value: *mut t_vpi_value,
    pub index: c_int,
    pub user_data: *mut c_char,
}

pub type vpi_systf_compiletf_fn = Option<unsafe extern "C" fn(*mut c_char) -> c_int>;
pub type vpi_systf_calltf_fn = Option<unsafe extern "C" fn(*mut c_char) -> c_int>;

#[repr(C)]
pub struct t_vpi_systf_data {
    pub type_: c_int,
    pub sysfunctype: c_int,
    pub tfname: *const c_char,
    pub calltf: vpi_systf_calltf_fn,
    pub compiletf: vpi_systf_compiletf_fn,
    pub sizetf: Option<unsafe extern "C" fn(*mut c_char) -> c_int>,
    pub user_data: *mut c_char,
}

extern "C" {
    pub fn vpi_register_systf(systf_data_p: *mut t_vpi_systf_data) -> vpiHandle;

    pub fn vpi_handle_by_name(name: *mut c_char, scope: vpiHandle) -> vpiHandle;
    pub fn vpi_handle_by_index(obj: vpiHandle, index: c_int) -> vpiHandle;
    pub fn vpi_iterate(type_: c_int, refHandle: vpiHandle) -> vpiHandle;
    pub fn vpi_scan(iter: vpiHandle) -> vpiHandle;
    pub fn vpi_handle(type_: c_int, refHandle: vpiHandle) -> vpiHandle;

    pub fn vpi_get(property: c_int, object: vpiHandle) -> c_int;
    pub fn vpi_get_str(property: c_int, object: vpiHandle) -> *mut c_char;
    pub fn vpi_get_value(expr: vpiHandle, value_p: *mut t_vpi_value);
    pub fn vpi_put_value(
        object: vpiHandle,
        value_p: *mut t_vpi_value,
        time_p: *mut t_vpi_time,
        flags: c_int,
    ) -> vpiHandle;

    pub fn vpi_register_cb(cb_data_p: *mut t_cb_data) -> vpiHandle;
    pub fn vpi_remove_cb(cb_obj: vpiHandle) -> c_int;
    pub fn vpi_free_object(object: vpiHandle) -> c_int;

    pub fn vpi_get_time(object: vpiHandle, time_p: *mut t_vpi_time);
    pub fn vpi_chk_error(error_info_p: *mut t_vpi_error_info) -> c_int;

    pub fn vpi_mcd_printf(mcd: u32, format: *const c_char, ...) -> c_int;

    pub fn vpi_get_vlog_info(vlog_info_p: *mut t_vpi_vlog_info) -> c_int;

    /// `vpi_control(vpiFinish, 1)` is the native finish primitive `sim_end`
    /// forwards to; it is `...`-variadic in the real header but every
    /// caller in this adapter passes exactly one `c_int` diagnostic code.
    pub fn vpi_control(operation: c_int, diagnostic: c_int) -> c_int;
}
