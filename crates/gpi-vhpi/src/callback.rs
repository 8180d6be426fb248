//! VHPI callback handles, driven by the single exported trampoline
//! `vhpi_trampoline`.

use std::ffi::c_void;
use std::sync::{Arc, Mutex};

use gpi_core::{
    CallState, CallStateCell, CallbackFn, CallbackHandle, CallbackOps, Edge, GpiError, ReasonKind, Result, UserData,
};

use crate::ffi::*;

#[derive(Debug, Clone, Copy)]
enum Native {
    Timed { delay_ps: u64 },
    ReadOnly,
    ReadWrite,
    NextTime,
    ValueChange { signal: vhpiHandleT, edge: Edge },
    Startup,
    Shutdown,
}

#[derive(Debug)]
pub struct VhpiCallback {
    native: Native,
    state: CallStateCell,
    registered: Mutex<Option<vhpiHandleT>>,
    user_fn: CallbackFn,
    user_data: UserData,
}

unsafe impl Send for VhpiCallback {}
unsafe impl Sync for VhpiCallback {}

impl VhpiCallback {
    fn reason_code(&self) -> vhpiCbReasonT {
        match self.native {
            Native::Timed { .. } => vhpiCbAfterDelay,
            Native::ReadOnly => vhpiCbReadOnlySynch,
            Native::ReadWrite => vhpiCbReadWriteSynch,
            Native::NextTime => vhpiCbNextTimeStep,
            Native::ValueChange { .. } => vhpiCbValueChange,
            Native::Startup => vhpiCbStartOfSimulation,
            Native::Shutdown => vhpiCbEndOfSimulation,
        }
    }

    fn target_handle(&self) -> vhpiHandleT {
        match self.native {
            Native::ValueChange { signal, .. } => signal,
            _ => std::ptr::null_mut(),
        }
    }

    fn arm_inner(&self) -> Result<()> {
        let mut time = match self.native {
            Native::Timed { delay_ps } => vhpiTimeT {
                high: (delay_ps >> 32) as u32,
                low: delay_ps as u32,
            },
            _ => vhpiTimeT::default(),
        };
        let raw_self = self as *const VhpiCallback as *mut c_void;
        let mut cb_data = vhpiCbDataT {
            reason: self.reason_code(),
            cb_rtn: Some(vhpi_trampoline),
            obj: self.target_handle(),
            time: &mut time,
            value: std::ptr::null_mut(),
            user_data: raw_self as *mut std::ffi::c_char,
        };
        let handle = unsafe { vhpi_register_cb(&mut cb_data) };
        if handle.is_null() {
            return Err(GpiError::Simulator {
                level: gpi_core::ErrorLevel::Error,
                message: "vhpi_register_cb failed".to_string(),
            });
        }
        *self.registered.lock().expect("vhpi callback poisoned") = Some(handle);
        Ok(())
    }
}

impl CallbackOps for VhpiCallback {
    fn reason_kind(&self) -> ReasonKind {
        match self.native {
            Native::Timed { .. } => ReasonKind::Timed,
            Native::ReadOnly => ReasonKind::ReadOnly,
            Native::ReadWrite => ReasonKind::ReadWrite,
            Native::NextTime => ReasonKind::NextTime,
            Native::ValueChange { .. } => ReasonKind::ValueChange,
            Native::Startup => ReasonKind::Startup,
            Native::Shutdown => ReasonKind::Shutdown,
        }
    }

    fn edge(&self) -> Option<Edge> {
        match self.native {
            Native::ValueChange { edge, .. } => Some(edge),
            _ => None,
        }
    }

    fn state(&self) -> CallState {
        self.state.get()
    }

    fn set_state(&self, state: CallState) {
        self.state.set(state)
    }

    fn arm(&self) -> Result<()> {
        self.arm_inner()
    }

    fn remove(&self) -> Result<()> {
        if let Some(handle) = self.registered.lock().expect("vhpi callback poisoned").take() {
            unsafe {
                vhpi_remove_cb(handle);
            }
        }
        Ok(())
    }

    fn current_bit0(&self) -> Option<char> {
        match self.native {
            Native::ValueChange { signal, .. } => unsafe {
                let mut value = vhpiValueT {
                    format: vhpiBinStrVal,
                    bufSize: 0,
                    numElems: 0,
                    value: u_vhpi_value { str_: std::ptr::null_mut() },
                };
                vhpi_get_value(signal, &mut value);
                if value.value.str_.is_null() {
                    None
                } else {
                    std::ffi::CStr::from_ptr(value.value.str_).to_str().ok()?.chars().last()
                }
            },
            _ => None,
        }
    }

    fn invoke(&self) -> i32 {
        (self.user_fn)(self.user_data)
    }
}

impl VhpiCallback {
    fn new(native: Native, user_fn: CallbackFn, user_data: UserData) -> Arc<Self> {
        Arc::new(VhpiCallback {
            native,
            state: CallStateCell::new(CallState::Free),
            registered: Mutex::new(None),
            user_fn,
            user_data,
        })
    }

    pub fn arm_new_timed(delay_ps: u64, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::new(Native::Timed { delay_ps }, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_readonly(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::new(Native::ReadOnly, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_readwrite(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::new(Native::ReadWrite, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_nexttime(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::new(Native::NextTime, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_startup(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::new(Native::Startup, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_shutdown(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::new(Native::Shutdown, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }
}

pub struct VhpiValueChangeCb;

impl VhpiValueChangeCb {
    pub fn arm_new(signal: vhpiHandleT, edge: Edge, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = VhpiCallback::new(Native::ValueChange { signal, edge }, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }
}

pub unsafe extern "C" fn vhpi_trampoline(data: *mut vhpiCbDataT) {
    let cb = &*((*data).user_data as *const VhpiCallback);
    gpi_core::callback::run_callback(cb);
}
