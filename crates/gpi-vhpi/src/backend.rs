//! `VhpiBackend`: the `Backend` trait implementation for VHDL simulators.

use std::ffi::CString;

use gpi_core::{
    Backend, CallbackFn, CallbackHandle, IterSelector, IteratorImpl, Lookup, ObjectHandle, ObjectKind, Result,
    SimTime, UserData,
};

use crate::callback::VhpiCallback;
use crate::ffi::*;
use crate::iterator::VhpiRelationIterator;
use crate::object::wrap;

#[derive(Debug)]
pub struct VhpiBackend;

impl VhpiBackend {
    pub fn new() -> Self {
        VhpiBackend
    }
}

impl Default for VhpiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for VhpiBackend {
    fn name(&self) -> &'static str {
        "vhpi"
    }

    fn sim_end(&self) {
        unsafe {
            vhpi_control(vhpiFinish);
        }
    }

    fn get_sim_time(&self) -> SimTime {
        unsafe {
            let mut t = vhpiTimeT::default();
            let mut cycles = 0i64;
            vhpi_get_time(&mut t, &mut cycles);
            SimTime::from_hilo(t.high, t.low)
        }
    }

    fn get_sim_precision(&self) -> i32 {
        -15
    }

    fn product_name(&self) -> &str {
        "unknown-vhpi-simulator"
    }

    fn product_version(&self) -> &str {
        "unknown"
    }

    fn get_root_handle(&self, name: Option<&str>) -> Option<ObjectHandle> {
        unsafe {
            let root = vhpi_handle(vhpiRootInst, std::ptr::null_mut());
            if root.is_null() {
                return None;
            }
            let root_name_p = vhpi_get_str(vhpiNameP, root);
            let root_name = if root_name_p.is_null() {
                String::new()
            } else {
                std::ffi::CStr::from_ptr(root_name_p).to_string_lossy().into_owned()
            };
            if name.is_some() && name != Some(root_name.as_str()) {
                return None;
            }
            let fullname_p = vhpi_get_str(vhpiFullNameP, root);
            let fullname = if fullname_p.is_null() {
                root_name.clone()
            } else {
                std::ffi::CStr::from_ptr(fullname_p).to_string_lossy().into_owned()
            };
            Some(wrap(root, vhpiRootInstK, root_name, fullname))
        }
    }

    fn check_create(&self, lookup: Lookup<'_>, parent: Option<&ObjectHandle>) -> Option<ObjectHandle> {
        match lookup {
            Lookup::ByName(name) => {
                let scope = parent.map(native_of).unwrap_or(std::ptr::null_mut());
                let cname = CString::new(name).ok()?;
                let handle = unsafe { vhpi_handle_by_name(cname.as_ptr(), scope) };
                if handle.is_null() {
                    return None;
                }
                let fullname = parent.map(|p| p.child_fullname(name)).unwrap_or_else(|| name.to_string());
                let classkind = unsafe { vhpi_get(vhpiKindP, handle) };
                if matches!(classkind, vhpiForGenerateK | vhpiIfGenerateK) {
                    return Some(crate::genarray::wrap_generate(handle, name.to_string(), fullname));
                }
                Some(wrap(handle, classkind, name.to_string(), fullname))
            }
            Lookup::ByIndex(index) => {
                let parent = parent?;
                let parent_raw = native_of(parent);
                let relation = if parent.kind() == ObjectKind::GenArray {
                    vhpiInternalRegions
                } else {
                    vhpiIndexedNames
                };
                let handle = unsafe { vhpi_handle_by_index(relation, parent_raw, index) };
                if handle.is_null() {
                    return None;
                }
                let fullname = gpi_core::path::join_index(parent.fullname(), index, gpi_core::PathStyle::Vhdl);
                let classkind = unsafe { vhpi_get(vhpiKindP, handle) };
                Some(wrap(handle, classkind, fullname.clone(), fullname))
            }
            Lookup::ByRaw(raw) => {
                if raw.is_null() {
                    return None;
                }
                let handle = raw.as_ptr() as vhpiHandleT;
                unsafe {
                    let name_p = vhpi_get_str(vhpiNameP, handle);
                    if name_p.is_null() {
                        return None;
                    }
                    let name = std::ffi::CStr::from_ptr(name_p).to_string_lossy().into_owned();
                    let fullname_p = vhpi_get_str(vhpiFullNameP, handle);
                    let fullname = if fullname_p.is_null() {
                        name.clone()
                    } else {
                        std::ffi::CStr::from_ptr(fullname_p).to_string_lossy().into_owned()
                    };
                    let classkind = vhpi_get(vhpiKindP, handle);
                    if matches!(classkind, vhpiForGenerateK | vhpiIfGenerateK) {
                        return Some(crate::genarray::wrap_generate(handle, name, fullname));
                    }
                    Some(wrap(handle, classkind, name, fullname))
                }
            }
        }
    }

    fn iterate(&self, parent: &ObjectHandle, selector: IterSelector) -> Option<Box<dyn IteratorImpl>> {
        match selector {
            IterSelector::Objects => Some(Box::new(VhpiRelationIterator::new(native_of(parent), parent.kind()))),
            _ => None,
        }
    }

    fn register_timed(&self, delay_ps: u64, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VhpiCallback::arm_new_timed(delay_ps, f, data)
    }

    fn register_readonly(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VhpiCallback::arm_new_readonly(f, data)
    }

    fn register_readwrite(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VhpiCallback::arm_new_readwrite(f, data)
    }

    fn register_nexttime(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VhpiCallback::arm_new_nexttime(f, data)
    }

    fn register_startup(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VhpiCallback::arm_new_startup(f, data)
    }

    fn register_shutdown(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        VhpiCallback::arm_new_shutdown(f, data)
    }

    fn deregister(&self, cb: &CallbackHandle) -> Result<()> {
        cb.remove()
    }

    fn reason_to_string(&self, code: i32) -> String {
        match code {
            vhpiCbValueChange => "vhpiCbValueChange".to_string(),
            vhpiCbReadOnlySynch => "vhpiCbReadOnlySynch".to_string(),
            vhpiCbReadWriteSynch => "vhpiCbReadWriteSynch".to_string(),
            vhpiCbNextTimeStep => "vhpiCbNextTimeStep".to_string(),
            vhpiCbAfterDelay => "vhpiCbAfterDelay".to_string(),
            vhpiCbStartOfSimulation => "vhpiCbStartOfSimulation".to_string(),
            vhpiCbEndOfSimulation => "vhpiCbEndOfSimulation".to_string(),
            _ => format!("unknown reason {code}"),
        }
    }
}

fn native_of(obj: &ObjectHandle) -> vhpiHandleT {
    obj.native().as_ptr() as vhpiHandleT
}

/// Walks the `vhpiTool`/`vhpiArgvs` relation to recover the simulator's
/// invocation arguments. Not every VHPI vendor populates this; an absent
/// tool handle or zero argc just yields an empty vector.
pub(crate) fn captured_args() -> Vec<String> {
    unsafe {
        let tool = vhpi_handle(vhpiTool, std::ptr::null_mut());
        if tool.is_null() {
            return Vec::new();
        }
        let argc = vhpi_get(vhpiArgcP, tool);
        if argc <= 0 {
            return Vec::new();
        }
        let iter = vhpi_iterator(vhpiArgvs, tool);
        if iter.is_null() {
            return Vec::new();
        }
        let mut args = Vec::with_capacity(argc as usize);
        loop {
            let arg_handle = vhpi_scan(iter);
            if arg_handle.is_null() {
                break;
            }
            let p = vhpi_get_str(vhpiStrValP, arg_handle);
            if !p.is_null() {
                args.push(std::ffi::CStr::from_ptr(p).to_string_lossy().into_owned());
            }
        }
        vhpi_release_handle(iter);
        args
    }
}
