//! VPI callback handles: one [`VpiCallback`] per registered reason, driven
//! by the single exported trampoline `vpi_trampoline`.

use std::ffi::c_void;
use std::sync::Arc;

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
    ValueChange { signal: vpiHandle, edge: Edge },
    Startup,
    Shutdown,
}

#[derive(Debug)]
pub struct VpiCallback {
    native: Native,
    state: CallStateCell,
    registered: std::sync::Mutex<Option<vpiHandle>>,
    user_fn: CallbackFn,
    user_data: UserData,
}

unsafe impl Send for VpiCallback {}
unsafe impl Sync for VpiCallback {}

impl VpiCallback {
    fn reason_code(&self) -> i32 {
        match self.native {
            Native::Timed { .. } => cbAfterDelay,
            Native::ReadOnly => cbReadOnlySynch,
            Native::ReadWrite => cbReadWriteSynch,
            Native::NextTime => cbNextSimTime,
            Native::ValueChange { .. } => cbValueChange,
            Native::Startup => cbStartOfSimulation,
            Native::Shutdown => cbEndOfSimulation,
        }
    }

    fn target_handle(&self) -> vpiHandle {
        match self.native {
            Native::ValueChange { signal, .. } => signal,
            _ => std::ptr::null_mut(),
        }
    }

    /// Register with the simulator, handing it a raw, non-owning pointer
    /// back to `self` as `user_data`. Soundness rests on the
    /// `CallbackHandle` the caller holds keeping this allocation alive for
    /// as long as the simulator might still fire it.
    fn arm_inner(&self) -> Result<()> {
        let mut time = match self.native {
            Native::Timed { delay_ps } => t_vpi_time {
                type_: vpiSimTime,
                high: (delay_ps >> 32) as u32,
                low: delay_ps as u32,
                real: 0.0,
            },
            _ => t_vpi_time {
                type_: vpiSimTime,
                ..Default::default()
            },
        };
        let raw_self = self as *const VpiCallback as *mut c_void;
        let mut cb_data = t_cb_data {
            reason: self.reason_code(),
            cb_rtn: Some(vpi_trampoline),
            obj: self.target_handle(),
            time: &mut time,
            value: std::ptr::null_mut(),
            index: 0,
            user_data: raw_self as *mut std::ffi::c_char,
        };
        let handle = unsafe { vpi_register_cb(&mut cb_data) };
        if handle.is_null() {
            return Err(GpiError::Simulator {
                level: gpi_core::ErrorLevel::Error,
                message: "vpi_register_cb failed".to_string(),
            });
        }
        *self.registered.lock().expect("vpi callback poisoned") = Some(handle);
        Ok(())
    }
}

impl CallbackOps for VpiCallback {
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
        if let Some(handle) = self.registered.lock().expect("vpi callback poisoned").take() {
            unsafe {
                vpi_remove_cb(handle);
            }
        }
        Ok(())
    }

    fn current_bit0(&self) -> Option<char> {
        match self.native {
            Native::ValueChange { signal, .. } => unsafe {
                let mut value = t_vpi_value {
                    format: vpiBinStrVal,
                    value: u_vpi_value { str_: std::ptr::null_mut() },
                };
                vpi_get_value(signal, &mut value);
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

impl VpiCallback {
    fn new(native: Native, user_fn: CallbackFn, user_data: UserData) -> Arc<Self> {
        Arc::new(VpiCallback {
            native,
            state: CallStateCell::new(CallState::Free),
            registered: std::sync::Mutex::new(None),
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

pub struct VpiValueChangeCb;

impl VpiValueChangeCb {
    pub fn arm_new(signal: vpiHandle, edge: Edge, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = VpiCallback::new(Native::ValueChange { signal, edge }, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }
}

/// The single C entry point every armed VPI callback's `cb_data.cb_rtn`
/// points at. Recovers the `VpiCallback` from the raw `user_data` pointer
/// registered in [`VpiCallback::arm_inner`] and hands it to the shared FSM
/// trampoline; ownership stays with whoever holds the `CallbackHandle`.
pub unsafe extern "C" fn vpi_trampoline(data: *mut t_cb_data) -> i32 {
    let cb = &*((*data).user_data as *const VpiCallback);
    gpi_core::callback::run_callback(cb);
    0
}
