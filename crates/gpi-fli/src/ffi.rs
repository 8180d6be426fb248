//! Hand-written subset of Mentor/Siemens `mti.h` and `acc_user.h`: the
//! region/signal/variable accessors and process-scheduling primitives this
//! backend calls into. FLI has no callback-registration primitive in the
//! VPI/VHPI sense — everything is a "process" woken by `mti_Sensitize` or
//! scheduled by `mti_ScheduleWakeup`, which is what makes this backend's
//! callback story shaped differently from the other two.

#![allow(non_camel_case_types, non_upper_case_globals, dead_code)]

use std::ffi::{c_char, c_double, c_int, c_void};

pub type mtiRegionIdT = *mut c_void;
pub type mtiSignalIdT = *mut c_void;
pub type mtiVariableIdT = *mut c_void;
pub type mtiTypeIdT = *mut c_void;
pub type mtiProcessIdT = *mut c_void;
pub type mtiInt32T = i32;
pub type mtiLongT = i64;

pub type mtiTypeKindT = c_int;
pub const MTI_TYPE_SCALAR: mtiTypeKindT = 1;
pub const MTI_TYPE_ARRAY: mtiTypeKindT = 2;
pub const MTI_TYPE_RECORD: mtiTypeKindT = 3;
pub const MTI_TYPE_ENUM: mtiTypeKindT = 4;
pub const MTI_TYPE_PHYSICAL: mtiTypeKindT = 5;
pub const MTI_TYPE_REAL: mtiTypeKindT = 6;

pub type mtiProcessPriorityT = c_int;
pub const MTI_PROC_IMMEDIATE: mtiProcessPriorityT = 0;
pub const MTI_PROC_SYNCH: mtiProcessPriorityT = 1;
pub const MTI_PROC_POSTPONED: mtiProcessPriorityT = 2;

pub type mti_process_fn = Option<unsafe extern "C" fn(*mut c_void)>;

extern "C" {
    pub fn mti_GetTopRegion() -> mtiRegionIdT;
    pub fn mti_FirstLowerRegion(region: mtiRegionIdT) -> mtiRegionIdT;
    pub fn mti_NextRegion(region: mtiRegionIdT) -> mtiRegionIdT;
    pub fn mti_FirstSignal(region: mtiRegionIdT) -> mtiSignalIdT;
    pub fn mti_NextSignal(prev: mtiSignalIdT) -> mtiSignalIdT;
    pub fn mti_FirstVariable(region: mtiRegionIdT) -> mtiVariableIdT;
    pub fn mti_NextVariable(prev: mtiVariableIdT) -> mtiVariableIdT;

    pub fn mti_RegionName(region: mtiRegionIdT) -> *mut c_char;
    pub fn mti_RegionFullName(region: mtiRegionIdT) -> *mut c_char;
    pub fn mti_SignalName(signal: mtiSignalIdT) -> *mut c_char;
    pub fn mti_SignalFullName(signal: mtiSignalIdT) -> *mut c_char;
    pub fn mti_VariableName(variable: mtiVariableIdT) -> *mut c_char;

    pub fn mti_GetSignalType(signal: mtiSignalIdT) -> mtiTypeIdT;
    pub fn mti_GetVariableType(variable: mtiVariableIdT) -> mtiTypeIdT;
    pub fn mti_GetTypeKind(type_: mtiTypeIdT) -> mtiTypeKindT;
    pub fn mti_TickLength(type_: mtiTypeIdT) -> mtiInt32T;
    pub fn mti_IsConst(type_: mtiTypeIdT) -> c_int;

    /// Number of literals of an `MTI_TYPE_ENUM` type, and the ordered
    /// `NUL`-terminated literal names themselves — used to tell `std_logic`,
    /// `boolean`, and `character` apart from an ordinary user enum (see
    /// `object::classify_value_kind`). Questa's real FLI returns the name
    /// array as `mti_GetEnumValues`; ours mirrors that split into a count
    /// call plus an indexed fetch so callers don't need to guess a buffer
    /// size up front.
    pub fn mti_GetNumEnumValues(type_: mtiTypeIdT) -> mtiInt32T;
    pub fn mti_GetEnumValues(type_: mtiTypeIdT, index: mtiInt32T) -> *mut c_char;

    pub fn mti_GetSignalValue(signal: mtiSignalIdT) -> mtiInt32T;
    pub fn mti_GetArraySignalValue(signal: mtiSignalIdT, buffer: *mut c_void) -> c_int;
    pub fn mti_GetVariableValue(variable: mtiVariableIdT) -> mtiInt32T;
    pub fn mti_GetArrayVariableValue(variable: mtiVariableIdT, buffer: *mut c_void) -> c_int;

    pub fn mti_ScheduleDriver(signal: mtiSignalIdT, value: mtiLongT, delay: u64, how: c_int);
    pub fn mti_ScheduleArrayDriver(signal: mtiSignalIdT, buffer: *const c_void, delay: u64, how: c_int);
    pub fn mti_ScheduleRealDriver(signal: mtiSignalIdT, value: c_double, delay: u64, how: c_int);
    pub fn mti_SetVariable(variable: mtiVariableIdT, value: mtiLongT);
    pub fn mti_SetArrayVariable(variable: mtiVariableIdT, buffer: *const c_void);
    pub fn mti_SetRealVariable(variable: mtiVariableIdT, value: c_double);
    pub fn mti_GetRealSignalValue(signal: mtiSignalIdT) -> c_double;
    pub fn mti_GetRealVariableValue(variable: mtiVariableIdT) -> c_double;

    /// Force a signal to a VHDL literal (`2#...`/`[-]10#...`, see
    /// `gpi_core::codec::vhdl_force_literal_*`) until
    /// [`mti_ReleaseSignal`] is called; FLI has no typed put-value
    /// primitive the way VPI/VHPI do, only this string form.
    pub fn mti_ForceSignal(signal: mtiSignalIdT, value: *const c_char, delay: u64, kind: c_int, cancel_period: u64, repeat_period: u64) -> c_int;
    pub fn mti_ReleaseSignal(signal: mtiSignalIdT) -> c_int;

    pub fn mti_CreateProcess(
        name: *mut c_char,
        f: mti_process_fn,
        param: *mut c_void,
    ) -> mtiProcessIdT;
    pub fn mti_Sensitize(process: mtiProcessIdT, signal: mtiSignalIdT, mode: c_int);
    pub fn mti_ScheduleWakeup(process: mtiProcessIdT, delay: u64);
    pub fn mti_RemoveSensitivity(process: mtiProcessIdT);

    pub fn mti_Now() -> u64;
    pub fn mti_NowUpper() -> u32;
    pub fn mti_GetResolutionLimit() -> mtiInt32T;

    pub fn mti_PrintMessage(msg: *const c_char);

    /// Native finish primitive `sim_end` forwards to.
    pub fn mti_Quit();
}

pub const MTI_SENSITIZE_ALL: c_int = 1;
pub const MTI_FORCE_DEPOSIT: c_int = 0;
pub const MTI_FORCE_FREEZE: c_int = 1;
