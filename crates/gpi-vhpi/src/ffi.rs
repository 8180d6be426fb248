//! Hand-written subset of IEEE 1076 `vhpi_user.h`.

#![allow(non_camel_case_types, non_upper_case_globals, dead_code)]

use std::ffi::{c_char, c_int, c_void};

pub type vhpiHandleT = *mut c_void;

pub type vhpiClassKindT = c_int;
pub const vhpiRootInstK: vhpiClassKindT = 1;
pub const vhpiCompInstStmtK: vhpiClassKindT = 2;
pub const vhpiBlockStmtK: vhpiClassKindT = 3;
pub const vhpiForGenerateK: vhpiClassKindT = 4;
pub const vhpiIfGenerateK: vhpiClassKindT = 5;
pub const vhpiSigDeclK: vhpiClassKindT = 6;
pub const vhpiPortDeclK: vhpiClassKindT = 7;
pub const vhpiGenericDeclK: vhpiClassKindT = 8;
pub const vhpiVarDeclK: vhpiClassKindT = 9;
pub const vhpiConstDeclK: vhpiClassKindT = 10;
pub const vhpiIndexedNameK: vhpiClassKindT = 11;
pub const vhpiRecordTypeDeclK: vhpiClassKindT = 12;
/// Base-type class kinds, returned by `vhpi_get(vhpiKindP, ...)` on the
/// handle `vhpi_handle(vhpiBaseType, decl)` resolves to. Used to tell apart
/// an enumeration-typed signal (which may turn out to be `std_logic`,
/// `boolean`, `character`, or an ordinary user enum — see
/// `object::classify_value_kind`) from an integer/real/array/record one.
pub const vhpiEnumTypeDeclK: vhpiClassKindT = 13;
pub const vhpiIntTypeDeclK: vhpiClassKindT = 14;
pub const vhpiFloatTypeDeclK: vhpiClassKindT = 15;
pub const vhpiArrayTypeDeclK: vhpiClassKindT = 16;
pub const vhpiPhysTypeDeclK: vhpiClassKindT = 17;

pub type vhpiOneToManyT = c_int;
pub const vhpiRootInst: vhpiOneToManyT = 0;
pub const vhpiInternalRegions: vhpiOneToManyT = 1;
pub const vhpiSigDecls: vhpiOneToManyT = 2;
pub const vhpiVarDecls: vhpiOneToManyT = 3;
pub const vhpiPortDecls: vhpiOneToManyT = 4;
pub const vhpiGenericDecls: vhpiOneToManyT = 5;
pub const vhpiConstDecls: vhpiOneToManyT = 13;
pub const vhpiIndexedNames: vhpiOneToManyT = 6;
pub const vhpiDrivers: vhpiOneToManyT = 7;
pub const vhpiLoads: vhpiOneToManyT = 8;
/// One-to-one via `vhpi_handle`: the declaration's base type.
pub const vhpiBaseType: vhpiOneToManyT = 9;
/// One-to-many via `vhpi_iterator`/`vhpi_scan`: an enumeration type's
/// ordered literal handles, each carrying its name via `vhpiNameP`.
pub const vhpiEnumLiterals: vhpiOneToManyT = 10;
/// One-to-one via `vhpi_handle`: the root "tool" handle exposing the
/// simulator's invocation arguments.
pub const vhpiTool: vhpiOneToManyT = 11;
/// One-to-many via `vhpi_iterator`/`vhpi_scan` on a `vhpiTool` handle: one
/// handle per invocation argument string.
pub const vhpiArgvs: vhpiOneToManyT = 12;

pub type vhpiIntPropertyT = c_int;
pub const vhpiKindP: vhpiIntPropertyT = 0;
pub const vhpiSizeP: vhpiIntPropertyT = 1;
pub const vhpiIsConstP: vhpiIntPropertyT = 2;
pub const vhpiIsUnconstrainedP: vhpiIntPropertyT = 3;
pub const vhpiLeftBoundP: vhpiIntPropertyT = 4;
pub const vhpiRightBoundP: vhpiIntPropertyT = 5;
pub const vhpiIsUpP: vhpiIntPropertyT = 6;
pub const vhpiLineNoP: vhpiIntPropertyT = 7;
/// On a `vhpiTool` handle: the invocation argument count.
pub const vhpiArgcP: vhpiIntPropertyT = 8;

pub type vhpiStrPropertyT = c_int;
pub const vhpiNameP: vhpiStrPropertyT = 1;
pub const vhpiFullNameP: vhpiStrPropertyT = 2;
pub const vhpiFileNameP: vhpiStrPropertyT = 3;
/// On an argv element handle from a `vhpiArgvs` iterator: the argument text.
pub const vhpiStrValP: vhpiStrPropertyT = 4;

/// `vhpi_get(vhpiRightBoundP, ...)` on an unconstrained array returns this
/// sentinel rather than a usable bound; the backend must special-case it
/// via `vhpiIsUnconstrainedP` instead of trusting the returned range.
pub const VHPI_UNCONSTRAINED_SENTINEL: c_int = 2147483647;

pub type vhpiFormatT = c_int;
pub const vhpiBinStrVal: vhpiFormatT = 1;
pub const vhpiStrVal: vhpiFormatT = 2;
pub const vhpiRealVal: vhpiFormatT = 3;
pub const vhpiIntVal: vhpiFormatT = 4;
pub const vhpiEnumVal: vhpiFormatT = 5;

pub type vhpiCbReasonT = c_int;
pub const vhpiCbValueChange: vhpiCbReasonT = 1;
pub const vhpiCbAfterDelay: vhpiCbReasonT = 2;
pub const vhpiCbReadOnlySynch: vhpiCbReasonT = 3;
pub const vhpiCbReadWriteSynch: vhpiCbReasonT = 4;
pub const vhpiCbNextTimeStep: vhpiCbReasonT = 5;
pub const vhpiCbStartOfSimulation: vhpiCbReasonT = 6;
pub const vhpiCbEndOfSimulation: vhpiCbReasonT = 7;

pub type vhpiPutValueModeT = c_int;
pub const vhpiDeposit: vhpiPutValueModeT = 1;
pub const vhpiForcePropagate: vhpiPutValueModeT = 2;
pub const vhpiRelease: vhpiPutValueModeT = 3;

pub type vhpiSimControlT = c_int;
pub const vhpiStop: vhpiSimControlT = 0;
pub const vhpiFinish: vhpiSimControlT = 1;
pub const vhpiReset: vhpiSimControlT = 2;

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct vhpiTimeT {
    pub high: u32,
    pub low: u32,
}

#[repr(C)]
pub union u_vhpi_value {
    pub str_: *mut c_char,
    pub intg: i32,
    pub real: f64,
    pub enumv: i32,
}

#[repr(C)]
pub struct vhpiValueT {
    pub format: vhpiFormatT,
    pub bufSize: u32,
    pub numElems: u32,
    pub value: u_vhpi_value,
}

pub type vhpi_callback_fn = Option<unsafe extern "C" fn(*mut vhpiCbDataT)>;

#[repr(C)]
pub struct vhpiCbDataT {
    pub reason: vhpiCbReasonT,
    pub cb_rtn: vhpi_callback_fn,
    pub obj: vhpiHandleT,
    pub time: *mut vhpiTimeT,
    pub value: *mut vhpiValueT,
    pub user_data: *mut c_char,
}

extern "C" {
    pub fn vhpi_handle_by_name(name: *const c_char, scope: vhpiHandleT) -> vhpiHandleT;
    pub fn vhpi_handle_by_index(itRel: vhpiOneToManyT, parent: vhpiHandleT, index: c_int) -> vhpiHandleT;
    pub fn vhpi_handle(type_: vhpiOneToManyT, referenceHandle: vhpiHandleT) -> vhpiHandleT;
    pub fn vhpi_iterator(type_: vhpiOneToManyT, parent: vhpiHandleT) -> vhpiHandleT;
    pub fn vhpi_scan(iterator: vhpiHandleT) -> vhpiHandleT;

    pub fn vhpi_get(property: vhpiIntPropertyT, object: vhpiHandleT) -> c_int;
    pub fn vhpi_get_str(property: vhpiStrPropertyT, object: vhpiHandleT) -> *mut c_char;
    pub fn vhpi_get_value(expr: vhpiHandleT, value_p: *mut vhpiValueT) -> c_int;
    pub fn vhpi_put_value(object: vhpiHandleT, value_p: *mut vhpiValueT, mode: vhpiPutValueModeT) -> c_int;

    pub fn vhpi_register_cb(cb_data_p: *mut vhpiCbDataT) -> vhpiHandleT;
    pub fn vhpi_remove_cb(cb_obj: vhpiHandleT) -> c_int;
    pub fn vhpi_release_handle(object: vhpiHandleT) -> c_int;

    pub fn vhpi_get_time(time_p: *mut vhpiTimeT, cycles: *mut i64) -> c_int;
    pub fn vhpi_check_error(error_info_p: *mut c_void) -> c_int;

    /// `vhpi_control(vhpiFinish, ...)` is the native finish primitive
    /// `sim_end` forwards to; variadic in the real header, this adapter
    /// never passes trailing arguments.
    pub fn vhpi_control(command: vhpiSimControlT) -> c_int;
}
