//! VPI object handles: `vpiHandle` wrapped behind [`gpi_core::ObjectOps`].

use std::ffi::{c_void, CStr, CString};

use gpi_core::{
    Action, Edge, GpiError, IterSelector, NativeHandle, ObjectHandle, ObjectKind, ObjectOps, PathStyle, Range,
    Result,
};

use crate::callback::VpiValueChangeCb;
use crate::ffi::*;
use crate::iterator::{VpiRelationIterator, VpiSingleIterator};

pub fn vpitype_to_kind(vpitype: i32) -> ObjectKind {
    match vpitype {
        vpiModule => ObjectKind::Module,
        vpiNet => ObjectKind::Net,
        vpiReg => ObjectKind::Array,
        vpiMemory => ObjectKind::Memory,
        vpiIntegerVar => ObjectKind::Integer,
        vpiRealVar => ObjectKind::Real,
        vpiGenScope | vpiGenScopeArray => ObjectKind::Module,
        vpiParameter => ObjectKind::Integer,
        _ => ObjectKind::Unknown,
    }
}

unsafe fn cstr_to_string(p: *mut std::ffi::c_char) -> String {
    if p.is_null() {
        String::new()
    } else {
        CStr::from_ptr(p).to_string_lossy().into_owned()
    }
}

#[derive(Debug)]
pub struct VpiObj {
    handle: vpiHandle,
    kind: ObjectKind,
    name: String,
    fullname: String,
    is_const: bool,
    range: Option<Range>,
    num_elems: Option<u32>,
}

impl VpiObj {
    /// Build the wrapper, reading every fixed attribute once up front so
    /// later calls never touch the simulator for them again.
    pub fn new(handle: vpiHandle, name: String, fullname: String) -> Self {
        unsafe {
            let vpitype = vpi_get(vpiType, handle);
            let kind = vpitype_to_kind(vpitype);
            // `vpiParameter` objects have no `vpiConstType` of their own in
            // every simulator's implementation; a parameter is const by
            // construction (Verilog forbids procedural assignment to one).
            let is_const =
                vpitype == vpiParameter || vpi_get(vpiConstType, handle) != 0 || vpi_get(vpiConstantSelect, handle) != 0;
            let (range, num_elems) = if matches!(kind, ObjectKind::Net | ObjectKind::Array | ObjectKind::Memory) {
                let left = vpi_get(vpiLeftRange, handle);
                let right = vpi_get(vpiRightRange, handle);
                let size = vpi_get(vpiSize, handle);
                let dir = if left >= right {
                    gpi_core::RangeDir::Downto
                } else {
                    gpi_core::RangeDir::To
                };
                (Some(Range::new(left, right, dir)), Some(size.max(0) as u32))
            } else {
                (None, None)
            };
            VpiObj {
                handle,
                kind,
                name,
                fullname,
                is_const,
                range,
                num_elems,
            }
        }
    }

    pub(crate) fn raw(&self) -> vpiHandle {
        self.handle
    }
}

impl ObjectOps for VpiObj {
    fn backend_name(&self) -> &'static str {
        "vpi"
    }

    fn native(&self) -> NativeHandle {
        unsafe { NativeHandle::from_raw(self.handle as *mut c_void) }
    }

    fn path_style(&self) -> PathStyle {
        PathStyle::Verilog
    }

    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn is_const(&self) -> bool {
        self.is_const
    }

    fn indexable(&self) -> bool {
        matches!(self.kind, ObjectKind::Array | ObjectKind::Memory | ObjectKind::Net)
    }

    fn num_elems(&self) -> Option<u32> {
        self.num_elems
    }

    fn range(&self) -> Option<Range> {
        self.range
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fullname(&self) -> &str {
        &self.fullname
    }

    fn get_binstr(&self) -> Option<String> {
        if !self.kind.is_signal_like() {
            return None;
        }
        unsafe {
            let mut value = t_vpi_value {
                format: vpiBinStrVal,
                value: u_vpi_value { str_: std::ptr::null_mut() },
            };
            vpi_get_value(self.handle, &mut value);
            Some(cstr_to_string(value.value.str_))
        }
    }

    fn get_str(&self) -> Option<Vec<u8>> {
        if self.kind != ObjectKind::String {
            return None;
        }
        unsafe {
            let mut value = t_vpi_value {
                format: vpiStringVal,
                value: u_vpi_value { str_: std::ptr::null_mut() },
            };
            vpi_get_value(self.handle, &mut value);
            Some(cstr_to_string(value.value.str_).into_bytes())
        }
    }

    fn get_real(&self) -> Option<f64> {
        if self.kind != ObjectKind::Real {
            return None;
        }
        unsafe {
            let mut value = t_vpi_value {
                format: vpiRealVal,
                value: u_vpi_value { real: 0.0 },
            };
            vpi_get_value(self.handle, &mut value);
            Some(value.value.real)
        }
    }

    fn get_long(&self) -> Option<i64> {
        if !matches!(self.kind, ObjectKind::Integer | ObjectKind::Enum) {
            return None;
        }
        unsafe {
            let mut value = t_vpi_value {
                format: vpiIntVal,
                value: u_vpi_value { integer: 0 },
            };
            vpi_get_value(self.handle, &mut value);
            Some(value.value.integer as i64)
        }
    }

    fn set_long(&self, value: i64, action: Action) -> Result<()> {
        unsafe {
            let mut vpi_value = t_vpi_value {
                format: vpiIntVal,
                value: u_vpi_value { integer: value as i32 },
            };
            let mut time = action_time(action);
            let r = vpi_put_value(self.handle, &mut vpi_value, &mut time, action_flags(action));
            if r.is_null() {
                Err(GpiError::Simulator {
                    level: gpi_core::ErrorLevel::Error,
                    message: "vpi_put_value failed".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn set_real(&self, value: f64, action: Action) -> Result<()> {
        unsafe {
            let mut vpi_value = t_vpi_value {
                format: vpiRealVal,
                value: u_vpi_value { real: value },
            };
            let mut time = action_time(action);
            let r = vpi_put_value(self.handle, &mut vpi_value, &mut time, action_flags(action));
            if r.is_null() {
                Err(GpiError::Simulator {
                    level: gpi_core::ErrorLevel::Error,
                    message: "vpi_put_value failed".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn set_str(&self, value: &[u8], action: Action) -> Result<()> {
        let cstr = CString::new(value).map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
        // String-kind writes always use the no-delay action regardless of
        // what the caller asked for, except Force/Release which keep their
        // own flags.
        let flags = match action {
            Action::Deposit | Action::NoDelay => vpiNoDelay,
            _ => action_flags(action),
        };
        unsafe {
            let mut vpi_value = t_vpi_value {
                format: vpiStringVal,
                value: u_vpi_value { str_: cstr.as_ptr() as *mut _ },
            };
            let mut time = action_time(action);
            let r = vpi_put_value(self.handle, &mut vpi_value, &mut time, flags);
            if r.is_null() {
                Err(GpiError::Simulator {
                    level: gpi_core::ErrorLevel::Error,
                    message: "vpi_put_value failed".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn set_binstr(&self, value: &str, action: Action) -> Result<()> {
        let cstr = CString::new(value).map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
        unsafe {
            let mut vpi_value = t_vpi_value {
                format: vpiBinStrVal,
                value: u_vpi_value { str_: cstr.as_ptr() as *mut _ },
            };
            let mut time = action_time(action);
            let r = vpi_put_value(self.handle, &mut vpi_value, &mut time, action_flags(action));
            if r.is_null() {
                Err(GpiError::Simulator {
                    level: gpi_core::ErrorLevel::Error,
                    message: "vpi_put_value failed".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn register_value_change_cb(
        &self,
        edge: Edge,
        f: gpi_core::CallbackFn,
        data: gpi_core::UserData,
    ) -> Result<gpi_core::CallbackHandle> {
        VpiValueChangeCb::arm_new(self.handle, edge, f, data)
    }

    fn iterate_native(&self, selector: IterSelector) -> Option<Box<dyn gpi_core::IteratorImpl>> {
        match selector {
            IterSelector::Objects => Some(Box::new(VpiRelationIterator::new(self.handle, self.kind))),
            IterSelector::Drivers => Some(Box::new(VpiSingleIterator::new(self.handle, vpiDriver))),
            IterSelector::Loads => Some(Box::new(VpiSingleIterator::new(self.handle, vpiLoad))),
        }
    }
}

fn action_time(action: Action) -> t_vpi_time {
    match action {
        Action::Deposit | Action::Force | Action::Release => t_vpi_time {
            type_: vpiSimTime,
            ..Default::default()
        },
        Action::NoDelay => t_vpi_time {
            type_: vpiSimTime,
            ..Default::default()
        },
    }
}

/// `Action::Deposit` defaults to an inertial-delay write for every kind
/// except strings, which always use the blocking no-delay write; callers
/// that explicitly ask for `Action::NoDelay` get it regardless of kind.
fn action_flags(action: Action) -> i32 {
    match action {
        Action::Deposit => vpiInertialDelay,
        Action::NoDelay => vpiNoDelay,
        Action::Force => vpiForceFlag,
        Action::Release => vpiReleaseFlag,
    }
}

/// Build an `ObjectHandle` for a freshly obtained `vpiHandle`, assembling its
/// fullname the way the dispatcher's `create_gpi_obj_from_handle` does.
pub fn wrap(handle: vpiHandle, name: String, fullname: String) -> ObjectHandle {
    ObjectHandle::new(std::sync::Arc::new(VpiObj::new(handle, name, fullname)))
}
