//! The abstract contract every simulator backend satisfies (component A).
//! All higher-level code — the registry, the object/callback/iterator
//! handles — consumes only this trait.

use crate::callback::{CallbackFn, CallbackHandle, UserData};
use crate::error::Result;
use crate::handle::native::NativeHandle;
use crate::handle::object::ObjectHandle;
use crate::iterator::IteratorImpl;
use crate::time::SimTime;

/// Which relationship an [`ObjectHandle::iterate`](crate::handle::object::ObjectHandle::iterate)
/// walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterSelector {
    Objects,
    Drivers,
    Loads,
}

/// The write action accompanying a value setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Deposit,
    /// Synonym for `Deposit` where the backend has no distinct primitive;
    /// the Verilog backend uses it for its no-delay/blocking string writes.
    NoDelay,
    Force,
    Release,
}

/// The three resolution requests the registry hands to `Backend::check_create`:
/// by name, by index, or by adopting a raw native handle.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    ByName(&'a str),
    ByIndex(i32),
    ByRaw(NativeHandle),
}

/// Contract satisfied by each of the three concrete backends
/// (`gpi-vpi`, `gpi-vhpi`, `gpi-fli`).
pub trait Backend: std::fmt::Debug + Send + Sync {
    /// Stable identifier used for duplicate-registration checks and to skip
    /// a backend during cross-backend dispatch.
    fn name(&self) -> &'static str;

    /// Request the simulator terminate gracefully. Idempotent.
    fn sim_end(&self);

    fn get_sim_time(&self) -> SimTime;

    /// Ten's exponent of the simulator's time resolution, unclamped; the
    /// registry clamps to `[-15, 2]` before handing it to callers.
    fn get_sim_precision(&self) -> i32;

    fn product_name(&self) -> &str;
    fn product_version(&self) -> &str;

    /// First top-level module matching `name`, or the first top-level
    /// module when `name` is `None`.
    fn get_root_handle(&self, name: Option<&str>) -> Option<ObjectHandle>;

    /// Try to resolve `lookup` under `parent` (root lookups pass `None`).
    /// Returns `None` if this backend cannot produce the object, so the
    /// registry can try the next one.
    fn check_create(&self, lookup: Lookup<'_>, parent: Option<&ObjectHandle>) -> Option<ObjectHandle>;

    fn iterate(&self, parent: &ObjectHandle, selector: IterSelector) -> Option<Box<dyn IteratorImpl>>;

    fn register_timed(&self, delay_ps: u64, f: CallbackFn, data: UserData) -> Result<CallbackHandle>;
    fn register_readonly(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle>;
    fn register_readwrite(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle>;
    fn register_nexttime(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle>;

    /// Fires once at start-of-simulation; hands the simulator's argv to the
    /// user runtime.
    fn register_startup(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle>;
    /// Fires once at end-of-simulation.
    fn register_shutdown(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle>;

    fn deregister(&self, cb: &CallbackHandle) -> Result<()>;

    /// Diagnostics only.
    fn reason_to_string(&self, code: i32) -> String;
}
