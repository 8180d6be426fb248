//! FLI callback handles. FLI has no cancellable callback registration:
//! everything is an `mtiProcessIdT` created once with `mti_CreateProcess`
//! and thereafter only re-sensitized (`mti_Sensitize`) or rescheduled
//! (`mti_ScheduleWakeup`) -- it cannot be destroyed. `remove()` therefore
//! can't hand the native process back to the simulator; instead it parks
//! the `FliCallback` on a per-reason [`CallbackPool`] so a later `arm_new`
//! for the same reason can reuse the still-live process instead of
//! creating another one that would leak for the rest of the run.

use std::ffi::{c_void, CString};
use std::sync::{Arc, Mutex, OnceLock};

use gpi_core::callback::pool::CallbackPool;
use gpi_core::{
    CallState, CallStateCell, CallbackFn, CallbackHandle, CallbackOps, Edge, GpiError, ReasonKind, Result, UserData,
};

use crate::ffi::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Native {
    Timed,
    ReadOnly,
    ReadWrite,
    NextTime,
    ValueChange,
    Startup,
    Shutdown,
}

#[derive(Debug)]
struct Armed {
    delay_ps: u64,
    signal: Option<mtiSignalIdT>,
    edge: Option<Edge>,
}

#[derive(Debug)]
pub struct FliCallback {
    native: Native,
    state: CallStateCell,
    proc_hdl: Mutex<Option<mtiProcessIdT>>,
    armed: Mutex<Armed>,
    user_fn: CallbackFn,
    user_data: UserData,
}

unsafe impl Send for FliCallback {}
unsafe impl Sync for FliCallback {}

fn pool_for(native: Native) -> &'static CallbackPool<FliCallback> {
    static TIMED: OnceLock<CallbackPool<FliCallback>> = OnceLock::new();
    static READONLY: OnceLock<CallbackPool<FliCallback>> = OnceLock::new();
    static READWRITE: OnceLock<CallbackPool<FliCallback>> = OnceLock::new();
    static NEXTTIME: OnceLock<CallbackPool<FliCallback>> = OnceLock::new();
    static VALUECHANGE: OnceLock<CallbackPool<FliCallback>> = OnceLock::new();
    match native {
        Native::Timed => TIMED.get_or_init(CallbackPool::new),
        Native::ReadOnly => READONLY.get_or_init(CallbackPool::new),
        Native::ReadWrite => READWRITE.get_or_init(CallbackPool::new),
        Native::NextTime => NEXTTIME.get_or_init(CallbackPool::new),
        Native::ValueChange => VALUECHANGE.get_or_init(CallbackPool::new),
        // Never actually reached: Startup/Shutdown are built with `fresh`,
        // not `acquire`, and `remove()` returns before releasing either
        // kind back to a pool. See `FliCallback::remove`.
        Native::Startup | Native::Shutdown => unreachable!("startup/shutdown callbacks are never pooled"),
    }
}

impl FliCallback {
    fn fresh(native: Native, user_fn: CallbackFn, user_data: UserData) -> Arc<Self> {
        Arc::new(FliCallback {
            native,
            state: CallStateCell::new(CallState::Free),
            proc_hdl: Mutex::new(None),
            armed: Mutex::new(Armed {
                delay_ps: 0,
                signal: None,
                edge: None,
            }),
            user_fn,
            user_data,
        })
    }

    /// Reuse a pooled process for `native` if one is free, reassigning its
    /// user closure data in place; otherwise create a brand new process.
    fn acquire(native: Native, user_fn: CallbackFn, user_data: UserData) -> Arc<Self> {
        pool_for(native).acquire_or_else(|| Self::fresh(native, user_fn, user_data))
    }

    fn ensure_process(&self) -> Result<mtiProcessIdT> {
        let mut guard = self.proc_hdl.lock().expect("fli callback poisoned");
        if let Some(p) = *guard {
            return Ok(p);
        }
        let name = CString::new("gpi_fli_process").unwrap();
        let raw_self = self as *const FliCallback as *mut c_void;
        let proc = unsafe { mti_CreateProcess(name.as_ptr() as *mut _, Some(fli_trampoline), raw_self) };
        if proc.is_null() {
            return Err(GpiError::Simulator {
                level: gpi_core::ErrorLevel::Error,
                message: "mti_CreateProcess failed".to_string(),
            });
        }
        *guard = Some(proc);
        Ok(proc)
    }

    fn arm_inner(&self) -> Result<()> {
        let proc = self.ensure_process()?;
        let armed = self.armed.lock().expect("fli callback poisoned");
        match self.native {
            Native::ValueChange => {
                let signal = armed.signal.expect("value-change callback missing signal");
                unsafe {
                    mti_Sensitize(proc, signal, MTI_SENSITIZE_ALL);
                }
            }
            Native::Timed => unsafe {
                mti_ScheduleWakeup(proc, armed.delay_ps);
            },
            Native::ReadOnly | Native::ReadWrite | Native::NextTime => unsafe {
                mti_ScheduleWakeup(proc, 0);
            },
            Native::Startup | Native::Shutdown => {}
        }
        Ok(())
    }

    pub fn arm_new_timed(delay_ps: u64, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::acquire(Native::Timed, f, data);
        cb.armed.lock().expect("fli callback poisoned").delay_ps = delay_ps;
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_readonly(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::acquire(Native::ReadOnly, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_readwrite(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::acquire(Native::ReadWrite, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_nexttime(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::acquire(Native::NextTime, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    /// Startup/shutdown fire at most once per simulation run each, so they
    /// bypass the reusable pool entirely rather than share `TIMED`'s (which
    /// would let a startup process get handed back out as a timed wakeup).
    pub fn arm_new_startup(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::fresh(Native::Startup, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }

    pub fn arm_new_shutdown(f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = Self::fresh(Native::Shutdown, f, data);
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }
}

impl CallbackOps for FliCallback {
    fn reason_kind(&self) -> ReasonKind {
        match self.native {
            Native::Timed => ReasonKind::Timed,
            Native::ReadOnly => ReasonKind::ReadOnly,
            Native::ReadWrite => ReasonKind::ReadWrite,
            Native::NextTime => ReasonKind::NextTime,
            Native::ValueChange => ReasonKind::ValueChange,
            Native::Startup => ReasonKind::Startup,
            Native::Shutdown => ReasonKind::Shutdown,
        }
    }

    fn edge(&self) -> Option<Edge> {
        self.armed.lock().expect("fli callback poisoned").edge
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
        // `mti_ScheduleWakeup` has no cancellation primitive: a primed
        // timed/phase callback's native wakeup keeps its date with the
        // scheduler no matter what we do here. Mark it deferred instead of
        // touching the process; the scheduled wakeup still fires once, sees
        // `DeferredDelete` in `run_callback`, and finalizes itself as a
        // no-op rather than invoking the user function a second time.
        let wakeup_based = matches!(
            self.native,
            Native::Timed | Native::ReadOnly | Native::ReadWrite | Native::NextTime
        );
        if wakeup_based && self.state() == CallState::Primed {
            self.set_state(CallState::DeferredDelete);
            return Ok(());
        }

        let proc = *self.proc_hdl.lock().expect("fli callback poisoned");
        if let Some(p) = proc {
            unsafe {
                mti_RemoveSensitivity(p);
            }
        }

        // Startup/shutdown each fire at most once per run and were built
        // with `fresh`, not `acquire`; they have no pool slot to return to
        // and must not be parked on `TIMED`'s (the reason `pool_for` falls
        // back to for these two), which would let a later timed `arm_new`
        // pop a shutdown process back out and reconfigure it as a wakeup.
        if matches!(self.native, Native::Startup | Native::Shutdown) {
            return Ok(());
        }

        // By this point the process is either genuinely finalizing (called
        // from `run_callback` with state `Call` or the second, no-op
        // `DeferredDelete` pass) or was desensitized by an explicit
        // still-`Primed` deregister of a value-change callback; either way
        // it will not fire again uninvited, so it's safe to park it on its
        // reason's pool for the next `arm_new` to reuse instead of calling
        // `mti_CreateProcess` again. Reconstructing an `Arc` from `&self` is
        // sound here: `Arc::increment_strong_count` accounts for the clone
        // before `from_raw` takes ownership of it, so the `CallbackHandle`
        // the caller already holds is untouched.
        let ptr = self as *const FliCallback;
        let native = self.native;
        unsafe {
            Arc::increment_strong_count(ptr);
            pool_for(native).release(Arc::from_raw(ptr));
        }
        Ok(())
    }

    fn current_bit0(&self) -> Option<char> {
        let armed = self.armed.lock().expect("fli callback poisoned");
        let signal = armed.signal?;
        let v = unsafe { mti_GetSignalValue(signal) };
        gpi_core::codec::binstr_from_int(v as i64, 1).chars().next()
    }

    fn invoke(&self) -> i32 {
        (self.user_fn)(self.user_data)
    }
}

pub struct FliValueChangeCb;

impl FliValueChangeCb {
    pub fn arm_new(signal: mtiSignalIdT, edge: Edge, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        let cb = FliCallback::acquire(Native::ValueChange, f, data);
        {
            let mut armed = cb.armed.lock().expect("fli callback poisoned");
            armed.signal = Some(signal);
            armed.edge = Some(edge);
        }
        cb.arm_inner()?;
        Ok(CallbackHandle::new(cb))
    }
}

/// The single C entry point every FLI process wakes into. Unlike VPI/VHPI's
/// reason-tagged callback data struct, FLI hands back only the opaque
/// `param` pointer passed to `mti_CreateProcess`.
pub unsafe extern "C" fn fli_trampoline(param: *mut c_void) {
    let cb = &*(param as *const FliCallback);
    gpi_core::callback::run_callback(cb);
}
