//! `VpiBackend`: the `Backend` trait implementation for Verilog simulators.

use std::ffi::CString;

use gpi_core::{
    Backend, CallbackFn, CallbackHandle, IterSelector, IteratorImpl, Lookup, NativeHandle, ObjectHandle, Result,
    SimTime, UserData,
};

use crate::callback::VpiCallback;
use crate::ffi::*;
use crate::iterator::VpiRelationIterator;
use crate::object::wrap;

#[derive(Debug)]
pub struct VpiBackend;

impl VpiBackend {
    pub fn new() -> Self {
        VpiBackend
    }
}

impl Default for VpiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for VpiBackend {
    fn name(&self) -> &'static str {
        "vpi"
    }

    fn sim_end(&self) {
        unsafe {
            vpi_control(vpiFinish, 1);
        }
    }

    fn get_sim_time(&self) -> SimTime {
        unsafe {
            let mut t = t_vpi_time {
                type_: vpiSimTime,
                ..Default::default()
            };
            vpi_get_time(std::ptr::null_mut(), &mut t);
            SimTime::from_hilo(t.high, t.low)
        }
    }

    fn get_sim_precision(&self) -> i32 {
        0
    }

    fn product_name(&self) -> &str {
        "unknown-vpi-simulator"
    }

    fn product_version(&self) -> &str {
        "unknown"
    }

    fn get_root_handle(&self, name: Option<&str>) -> Option<ObjectHandle> {
        unsafe {
            let it = vpi_iterate(vpiModule, std::ptr::null_mut());
            if it.is_null() {
                return None;
            }
            loop {
                let candidate = vpi_scan(it);
                if candidate.is_null() {
                    return None;
                }
                let candidate_name_p = vpi_get_str(vpiName, candidate);
                let candidate_name = if candidate_name_p.is_null() {
                    String::new()
                } else {
                    std::ffi::CStr::from_ptr(candidate_name_p).to_string_lossy().into_owned()
                };
                if name.is_none() || name == Some(candidate_name.as_str()) {
                    let fullname_p = vpi_get_str(vpiFullName, candidate);
                    let fullname = if fullname_p.is_null() {
                        candidate_name.clone()
                    } else {
                        std::ffi::CStr::from_ptr(fullname_p).to_string_lossy().into_owned()
                    };
                    return Some(wrap(candidate, candidate_name, fullname));
                }
            }
        }
    }

    fn check_create(&self, lookup: Lookup<'_>, parent: Option<&ObjectHandle>) -> Option<ObjectHandle> {
        match lookup {
            Lookup::ByName(name) => {
                let scope = parent.map(|p| native_of(p)).unwrap_or(std::ptr::null_mut());
                let cname = CString::new(name).ok()?;
                let handle = unsafe { vpi_handle_by_name(cname.as_ptr() as *mut _, scope) };
                if handle.is_null() {
                    // No object literally named `name`: it may be a
                    // generate-loop label with no array handle of its own
                    // (the Icarus case). Fall back to scanning for
                    // `name[*]` siblings under the parent.
                    let parent = parent?;
                    return crate::genarray::find_label_fallback(native_of(parent), name, parent.fullname());
                }
                let vpitype = unsafe { vpi_get(vpiType, handle) };
                if vpitype == vpiGenScopeArray {
                    let fullname = parent.map(|p| p.child_fullname(name)).unwrap_or_else(|| name.to_string());
                    return Some(crate::genarray::wrap_array_handle(handle, name.to_string(), fullname));
                }
                let fullname = parent.map(|p| p.child_fullname(name)).unwrap_or_else(|| name.to_string());
                Some(wrap(handle, name.to_string(), fullname))
            }
            Lookup::ByIndex(index) => {
                let parent = parent?;
                let parent_raw = native_of(parent);
                let handle = unsafe { vpi_handle_by_index(parent_raw, index) };
                if handle.is_null() {
                    return None;
                }
                let fullname = gpi_core::path::join_index(parent.fullname(), index, gpi_core::PathStyle::Verilog);
                Some(wrap(handle, fullname.clone(), fullname))
            }
            Lookup::ByRaw(raw) => {
                if raw.is_null() {
                    return None;
                }
                let handle = raw.as_ptr() as vpiHandle;
                unsafe {
                    let name_p = vpi_get_str(vpiName, handle);
                    if name_p.is_null() {
                        return None;
                    }
                    let name = std::ffi::CStr::from_ptr(name_p).to_string_lossy().into_owned();
                    let fullname_p = vpi_get_str(vpiFullName, handle);
                    let fullname = if fullname_p.is_null() {
                        name.clone()
                    } else {
                        std::ffi::CStr::from_ptr(fullname_p).to_string_lossy().into_owned()
                    };
                    Some(wrap(handle, name, fullname))
                }
            }
        }
    }

    fn iterate(&self, parent: &ObjectHandle, selector: IterSelector) -> Option<Box<dyn IteratorImpl>> {
        match selector {
            IterSelector::Objects => Some(Box::new(VpiRelationIterator::new(native_of(parent), parent.kind()))),
            _ => None,
        }
    }

    fn register_timed(&self, delay_ps: u64, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VpiCallback::arm_new_timed(delay_ps, f, data)
    }

    fn register_readonly(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VpiCallback::arm_new_readonly(f, data)
    }

    fn register_readwrite(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VpiCallback::arm_new_readwrite(f, data)
    }

    fn register_nexttime(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VpiCallback::arm_new_nexttime(f, data)
    }

    fn register_startup(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VpiCallback::arm_new_startup(f, data)
    }

    fn register_shutdown(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VpiCallback::arm_new_shutdown(f, data)
    }

    fn deregister(&self, cb: &CallbackHandle) -> Result<()> {
        cb.remove()
    }

    fn reason_to_string(&self, code: i32) -> String {
        match code {
            cbValueChange => "cbValueChange".to_string(),
            cbReadOnlySynch => "cbReadOnlySynch".to_string(),
            cbReadWriteSynch => "cbReadWriteSynch".to_string(),
            cbNextSimTime => "cbNextSimTime".to_string(),
            cbAfterDelay => "cbAfterDelay".to_string(),
            cbStartOfSimulation => "cbStartOfSimulation".to_string(),
            cbEndOfSimulation => "cbEndOfSimulation".to_string(),
            _ => format!("unknown reason {code}"),
        }
    }
}

fn native_of(obj: &ObjectHandle) -> vpiHandle {
    obj.native().as_ptr() as vpiHandle
}

/// Pulls the simulator's invocation arguments out of `vpi_get_vlog_info`.
/// Only valid to call once the simulator has reached start-of-simulation;
/// returns an empty vector if the call fails rather than erroring, since a
/// missing argv is recoverable (the user runtime just sees no arguments).
pub(crate) fn captured_args() -> Vec<String> {
    unsafe {
        let mut info: t_vpi_vlog_info = std::mem::zeroed();
        if vpi_get_vlog_info(&mut info) == 0 || info.argv.is_null() {
            return Vec::new();
        }
        (0..info.argc)
            .map(|i| {
                let p = *info.argv.add(i as usize);
                if p.is_null() {
                    String::new()
                } else {
                    std::ffi::CStr::from_ptr(p).to_string_lossy().into_owned()
                }
            })
            .collect()
    }
}
