//! `gpi-vpi`: the IEEE 1364 VPI backend.
//!
//! Built both as an `rlib` (for `gpi-capi` to link directly into an
//! embedding runtime) and a `cdylib` (for simulators that load their VPI
//! extension as a standalone `.vpi`/`.so` and discover it through
//! `vlog_startup_routines`).

mod backend;
mod callback;
mod entry;
mod ffi;
mod genarray;
mod handler;
mod iterator;
mod object;

pub use backend::VpiBackend;
pub use entry::register;
