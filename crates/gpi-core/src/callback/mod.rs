//! The callback handle hierarchy (component C): a lifecycle wrapper around
//! each of a backend's native callback kinds, normalized behind one
//! `arm`/`remove`/(internal) `run` contract, plus the shared trampoline
//! logic that every backend's single exported C entry point calls into.

pub mod pool;
pub mod state;

use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;

pub use state::{CallState, CallStateCell};

/// The edge a value-change callback is armed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Either,
}

/// Which of the five callback reasons a [`CallbackOps`] implementation
/// represents. Carries no payload; the payload (delay, signal, priority)
/// lives on the concrete backend type, per the "diamond inheritance"
/// design note: one struct, a tag, and a per-reason field, polymorphism
/// only at the `arm`/`run`/`remove` seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonKind {
    Timed,
    ValueChange,
    ReadOnly,
    ReadWrite,
    NextTime,
    Startup,
    Shutdown,
}

/// Opaque user data passed back to the user runtime's callback function
/// unexamined. Plain `void*`, the way the simulator side hands it in.
#[derive(Clone, Copy)]
pub struct UserData(pub *mut c_void);

unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserData({:p})", self.0)
    }
}

pub type CallbackFn = extern "C" fn(UserData) -> i32;

/// Per-backend concrete callback contract. The shared FSM bookkeeping
/// (`free -> primed -> call -> (re-primed | delete)`) is implemented
/// once, in [`run_callback`]; backends only implement the native
/// registration/cancellation primitives and, for value-change callbacks,
/// how to read the signal's current bit-0 value.
pub trait CallbackOps: fmt::Debug + Send + Sync {
    fn reason_kind(&self) -> ReasonKind;

    /// Only meaningful for `ReasonKind::ValueChange`.
    fn edge(&self) -> Option<Edge> {
        None
    }

    fn state(&self) -> CallState;
    fn set_state(&self, state: CallState);

    /// Register (or re-register) with the simulator.
    fn arm(&self) -> crate::error::Result<()>;

    /// Cancel with the simulator, or mark deferred-delete if the backend
    /// cannot cancel a primed native callback.
    fn remove(&self) -> crate::error::Result<()>;

    /// Read the current bit-0 (LSB) value of the armed signal. Only
    /// implemented by value-change callbacks.
    fn current_bit0(&self) -> Option<char> {
        None
    }

    /// Invoke the stored user function with its stored user data.
    fn invoke(&self) -> i32;
}

/// A type-erased, reference-counted callback handle.
#[derive(Clone, Debug)]
pub struct CallbackHandle(Arc<dyn CallbackOps>);

impl CallbackHandle {
    pub fn new(inner: Arc<dyn CallbackOps>) -> Self {
        CallbackHandle(inner)
    }

    pub fn arm(&self) -> crate::error::Result<()> {
        let r = self.0.arm();
        if r.is_ok() {
            self.0.set_state(CallState::Primed);
        }
        r
    }

    pub fn remove(&self) -> crate::error::Result<()> {
        let r = self.0.remove();
        r
    }

    pub fn state(&self) -> CallState {
        self.0.state()
    }

    pub fn reason_kind(&self) -> ReasonKind {
        self.0.reason_kind()
    }

    pub(crate) fn inner(&self) -> &Arc<dyn CallbackOps> {
        &self.0
    }
}

/// `1` for rising, `0` for falling, always pass for either — exactly the
/// literal comparison spec.md's value-change edge filter describes, no
/// `H`/`L` equivalence folded in.
pub fn edge_matches(edge: Edge, bit0: char) -> bool {
    match edge {
        Edge::Rising => bit0 == '1',
        Edge::Falling => bit0 == '0',
        Edge::Either => true,
    }
}

/// The single shared trampoline body every backend's exported C function
/// calls into with the native callback recovered from `user_data`. Records
/// the transition to `Call`, applies the value-change edge filter, invokes
/// the user function if applicable, and then either leaves the callback
/// primed (if the user function re-armed it from within the call) or
/// finalizes it to `Delete`.
pub fn run_callback(cb: &dyn CallbackOps) {
    if cb.state() == CallState::DeferredDelete {
        // Native wakeup we could not cancel; fire to completion as a no-op.
        let _ = cb.remove();
        cb.set_state(CallState::Delete);
        return;
    }

    cb.set_state(CallState::Call);

    let should_invoke = match cb.reason_kind() {
        ReasonKind::ValueChange => match (cb.edge(), cb.current_bit0()) {
            (Some(edge), Some(bit0)) if edge_matches(edge, bit0) => true,
            (Some(_), _) => {
                // Mismatch: re-prime without invoking the user.
                let _ = cb.arm();
                false
            }
            _ => true,
        },
        _ => true,
    };

    if should_invoke {
        cb.invoke();
    }

    // If the user function (or the mismatch branch above) re-armed the
    // callback, state() will already read Primed; only finalize if it's
    // still sitting in Call.
    if cb.state() == CallState::Call {
        let _ = cb.remove();
        cb.set_state(CallState::Delete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct FakeCb {
        kind: ReasonKind,
        edge: Option<Edge>,
        state: CallStateCell,
        bit0: Mutex<Cell<Option<char>>>,
        invoked: Mutex<Cell<u32>>,
        removed: Mutex<Cell<u32>>,
    }

    impl CallbackOps for FakeCb {
        fn reason_kind(&self) -> ReasonKind {
            self.kind
        }
        fn edge(&self) -> Option<Edge> {
            self.edge
        }
        fn state(&self) -> CallState {
            self.state.get()
        }
        fn set_state(&self, s: CallState) {
            self.state.set(s)
        }
        fn arm(&self) -> crate::error::Result<()> {
            self.state.set(CallState::Primed);
            Ok(())
        }
        fn remove(&self) -> crate::error::Result<()> {
            self.removed.lock().unwrap().set(self.removed.lock().unwrap().get() + 1);
            Ok(())
        }
        fn current_bit0(&self) -> Option<char> {
            self.bit0.lock().unwrap().get()
        }
        fn invoke(&self) -> i32 {
            self.invoked.lock().unwrap().set(self.invoked.lock().unwrap().get() + 1);
            0
        }
    }

    #[test]
    fn rising_edge_filters_falling_transition() {
        let cb = FakeCb {
            kind: ReasonKind::ValueChange,
            edge: Some(Edge::Rising),
            state: CallStateCell::new(CallState::Primed),
            bit0: Mutex::new(Cell::new(Some('0'))),
            invoked: Mutex::new(Cell::new(0)),
            removed: Mutex::new(Cell::new(0)),
        };
        run_callback(&cb);
        assert_eq!(cb.invoked.lock().unwrap().get(), 0);
        assert_eq!(cb.state(), CallState::Primed);
    }

    #[test]
    fn falling_edge_invokes_on_falling_transition() {
        let cb = FakeCb {
            kind: ReasonKind::ValueChange,
            edge: Some(Edge::Falling),
            state: CallStateCell::new(CallState::Primed),
            bit0: Mutex::new(Cell::new(Some('0'))),
            invoked: Mutex::new(Cell::new(0)),
            removed: Mutex::new(Cell::new(0)),
        };
        run_callback(&cb);
        assert_eq!(cb.invoked.lock().unwrap().get(), 1);
    }

    #[test]
    fn timer_callback_always_invokes_then_finalizes() {
        let cb = FakeCb {
            kind: ReasonKind::Timed,
            edge: None,
            state: CallStateCell::new(CallState::Primed),
            bit0: Mutex::new(Cell::new(None)),
            invoked: Mutex::new(Cell::new(0)),
            removed: Mutex::new(Cell::new(0)),
        };
        run_callback(&cb);
        assert_eq!(cb.invoked.lock().unwrap().get(), 1);
        assert_eq!(cb.state(), CallState::Delete);
        assert_eq!(cb.removed.lock().unwrap().get(), 1);
    }

    #[test]
    fn deferred_delete_skips_invocation_and_self_releases() {
        let cb = FakeCb {
            kind: ReasonKind::Timed,
            edge: None,
            state: CallStateCell::new(CallState::DeferredDelete),
            bit0: Mutex::new(Cell::new(None)),
            invoked: Mutex::new(Cell::new(0)),
            removed: Mutex::new(Cell::new(0)),
        };
        run_callback(&cb);
        assert_eq!(cb.invoked.lock().unwrap().get(), 0);
        assert_eq!(cb.state(), CallState::Delete);
    }
}
