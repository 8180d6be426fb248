//! The callback lifecycle finite-state machine.

use std::sync::atomic::{AtomicU8, Ordering};

/// `free -> primed -> call -> (re-primed | delete)`, plus `deferred_delete`
/// for backends (FLI) whose native wakeup cannot be cancelled once
/// scheduled: `remove()` on a primed one of those marks it
/// `DeferredDelete` instead, and it fires to completion as a no-op next
/// time the simulator invokes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CallState {
    Free = 0,
    Primed = 1,
    Call = 2,
    Delete = 3,
    DeferredDelete = 4,
}

impl CallState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => CallState::Free,
            1 => CallState::Primed,
            2 => CallState::Call,
            3 => CallState::Delete,
            _ => CallState::DeferredDelete,
        }
    }
}

/// An atomic cell holding a [`CallState`]; callback implementations embed
/// one of these rather than reimplementing the bookkeeping per backend.
#[derive(Debug)]
pub struct CallStateCell(AtomicU8);

impl CallStateCell {
    pub fn new(initial: CallState) -> Self {
        CallStateCell(AtomicU8::new(initial as u8))
    }

    pub fn get(&self) -> CallState {
        CallState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: CallState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

impl Default for CallStateCell {
    fn default() -> Self {
        Self::new(CallState::Free)
    }
}
