//! The multi-backend dispatcher (component E): a flat list of registered
//! backends, tried in registration order for every name/index/raw-handle
//! resolution and every cross-backend iterator retry. There is exactly one
//! registry per process, reached through [`registry()`].

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, RwLock};

use crate::backend::{Backend, Lookup};
use crate::callback::{CallbackFn, CallbackHandle, UserData};
use crate::error::{GpiError, Result};
use crate::handle::native::NativeHandle;
use crate::handle::object::ObjectHandle;
use crate::iterator::{IteratorHandle, Step};
use crate::time::{clamp_precision, SimTime};

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Initialize the process-global registry. Must be called exactly once,
/// before any backend registers itself; later calls are ignored.
///
/// `intern` turns on the by-fullname object cache described in the core's
/// supplemented-features notes: with it on, repeat lookups of the same
/// fullname return the identical `ObjectHandle` rather than a fresh wrapper
/// around the same native pointer.
pub fn init_registry(intern: bool) {
    let _ = REGISTRY.set(Registry::new(intern));
}

/// Access the process-global registry, initializing it with interning off
/// if no one has called [`init_registry`] yet.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry::new(false))
}

pub struct Registry {
    backends: RwLock<Vec<Box<dyn Backend>>>,
    intern: bool,
    cache: Mutex<HashMap<String, ObjectHandle>>,
}

impl Registry {
    pub fn new(intern: bool) -> Self {
        Registry {
            backends: RwLock::new(Vec::new()),
            intern,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Register a backend. Rejects a second registration of a backend with
    /// the same [`Backend::name`] — each backend loads once per simulator
    /// process, but an embedder misconfiguring `GPI_EXTRA` could otherwise
    /// load the same `.so` twice.
    pub fn register(&self, backend: Box<dyn Backend>) -> Result<()> {
        let mut backends = self.backends.write().expect("registry poisoned");
        if backends.iter().any(|b| b.name() == backend.name()) {
            return Err(GpiError::DuplicateBackend(backend.name().to_string()));
        }
        backends.push(backend);
        Ok(())
    }

    /// Names of every currently registered backend, in registration order.
    /// Diagnostic only.
    pub fn registered_names(&self) -> Vec<&'static str> {
        self.backends.read().expect("registry poisoned").iter().map(|b| b.name()).collect()
    }

    fn with_backends<R>(&self, f: impl FnOnce(&[Box<dyn Backend>]) -> R) -> R {
        let backends = self.backends.read().expect("registry poisoned");
        f(&backends)
    }

    fn cache_get(&self, fullname: &str) -> Option<ObjectHandle> {
        if !self.intern {
            return None;
        }
        self.cache.lock().expect("registry cache poisoned").get(fullname).cloned()
    }

    fn cache_put(&self, fullname: String, handle: ObjectHandle) {
        if !self.intern {
            return;
        }
        self.cache.lock().expect("registry cache poisoned").insert(fullname, handle);
    }

    /// First top-level module matching `name`, trying each backend in turn,
    /// or the first top-level module overall when `name` is `None`.
    pub fn get_root(&self, name: Option<&str>) -> Option<ObjectHandle> {
        self.with_backends(|backends| backends.iter().find_map(|b| b.get_root_handle(name)))
    }

    /// Resolve `name` under `parent`. A `GENARRAY` pseudo-region resolves
    /// its own children directly and never reaches the backend probe loop.
    pub fn lookup_by_name(&self, parent: &ObjectHandle, name: &str) -> Option<ObjectHandle> {
        let fullname = parent.child_fullname(name);
        if let Some(cached) = self.cache_get(&fullname) {
            return Some(cached);
        }
        let found = self.with_backends(|backends| {
            backends
                .iter()
                .find_map(|b| b.check_create(Lookup::ByName(name), Some(parent)))
        })?;
        self.cache_put(fullname, found.clone());
        Some(found)
    }

    /// Resolve index `index` under `parent`. `GENARRAY` pseudo-regions
    /// resolve through their own closure; every other indexable kind goes
    /// through the normal backend probe loop.
    pub fn lookup_by_index(&self, parent: &ObjectHandle, index: i32) -> Option<ObjectHandle> {
        if let Some(pseudo) = parent.as_pseudo_region() {
            return pseudo.resolve(index);
        }
        self.with_backends(|backends| {
            backends
                .iter()
                .find_map(|b| b.check_create(Lookup::ByIndex(index), Some(parent)))
        })
    }

    /// Resolve a raw native pointer handed back by the simulator (e.g. from
    /// a value-change callback's argument) into an `ObjectHandle`, trying
    /// every backend in turn.
    pub fn lookup_by_raw(&self, raw: NativeHandle) -> Option<ObjectHandle> {
        self.with_backends(|backends| {
            backends.iter().find_map(|b| b.check_create(Lookup::ByRaw(raw), None))
        })
    }

    /// Advance an iterator one step, resolving `NotNative`/`NotNativeNoName`
    /// steps by retrying every other registered backend against the
    /// iterator's parent.
    pub fn next(&self, it: &mut IteratorHandle) -> Option<ObjectHandle> {
        loop {
            return match it.advance() {
                Step::Native(obj) => Some(obj),
                Step::NativeNoName => continue,
                Step::End => None,
                Step::NotNative(name) => {
                    let owner = it.owner_backend();
                    let parent = it.parent().clone();
                    self.with_backends(|backends| {
                        backends
                            .iter()
                            .filter(|b| b.name() != owner)
                            .find_map(|b| b.check_create(Lookup::ByName(&name), Some(&parent)))
                    })
                }
                Step::NotNativeNoName(raw) => {
                    let owner = it.owner_backend();
                    self.with_backends(|backends| {
                        backends
                            .iter()
                            .filter(|b| b.name() != owner)
                            .find_map(|b| b.check_create(Lookup::ByRaw(raw), None))
                    })
                }
            };
        }
    }

    pub fn get_sim_time(&self) -> SimTime {
        self.with_backends(|backends| backends.first().map(|b| b.get_sim_time()).unwrap_or(SimTime::ZERO))
    }

    /// The simulator's reported precision, clamped to `[-15, 2]`. Backends
    /// themselves report the unclamped exponent; the clamp lives here, in
    /// the dispatcher, not in any one backend.
    pub fn get_sim_precision(&self) -> i32 {
        self.with_backends(|backends| {
            clamp_precision(backends.first().map(|b| b.get_sim_precision()).unwrap_or(0))
        })
    }

    pub fn product_name(&self) -> String {
        self.with_backends(|backends| backends.first().map(|b| b.product_name().to_string()).unwrap_or_default())
    }

    pub fn product_version(&self) -> String {
        self.with_backends(|backends| backends.first().map(|b| b.product_version().to_string()).unwrap_or_default())
    }

    /// Request every registered backend end the simulation. Idempotent.
    pub fn sim_end(&self) {
        self.with_backends(|backends| {
            for b in backends {
                b.sim_end();
            }
        });
    }

    pub fn register_timed(&self, delay_ps: u64, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        self.with_backends(|backends| {
            backends.first().ok_or(GpiError::NoBackend)?.register_timed(delay_ps, f, data)
        })
    }

    pub fn register_readonly(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        self.with_backends(|backends| backends.first().ok_or(GpiError::NoBackend)?.register_readonly(f, data))
    }

    pub fn register_readwrite(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        self.with_backends(|backends| backends.first().ok_or(GpiError::NoBackend)?.register_readwrite(f, data))
    }

    pub fn register_nexttime(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        self.with_backends(|backends| backends.first().ok_or(GpiError::NoBackend)?.register_nexttime(f, data))
    }

    pub fn register_startup(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        self.with_backends(|backends| backends.first().ok_or(GpiError::NoBackend)?.register_startup(f, data))
    }

    pub fn register_shutdown(&self, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        self.with_backends(|backends| backends.first().ok_or(GpiError::NoBackend)?.register_shutdown(f, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::IterSelector;
    use crate::handle::kind::{ObjectKind, Range};
    use crate::handle::object::ObjectOps;
    use crate::path::PathStyle;
    use std::sync::Arc;

    #[derive(Debug)]
    struct StubObj {
        fullname: String,
    }

    impl ObjectOps for StubObj {
        fn backend_name(&self) -> &'static str {
            "stub"
        }
        fn native(&self) -> NativeHandle {
            NativeHandle::null()
        }
        fn path_style(&self) -> PathStyle {
            PathStyle::Verilog
        }
        fn kind(&self) -> ObjectKind {
            ObjectKind::Module
        }
        fn is_const(&self) -> bool {
            false
        }
        fn indexable(&self) -> bool {
            false
        }
        fn num_elems(&self) -> Option<u32> {
            None
        }
        fn range(&self) -> Option<Range> {
            None
        }
        fn name(&self) -> &str {
            &self.fullname
        }
        fn fullname(&self) -> &str {
            &self.fullname
        }
        fn iterate_native(&self, _selector: IterSelector) -> Option<Box<dyn crate::iterator::IteratorImpl>> {
            None
        }
    }

    #[derive(Debug)]
    struct StubBackend;

    impl Backend for StubBackend {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn sim_end(&self) {}
        fn get_sim_time(&self) -> SimTime {
            SimTime::ZERO
        }
        fn get_sim_precision(&self) -> i32 {
            0
        }
        fn product_name(&self) -> &str {
            "stub"
        }
        fn product_version(&self) -> &str {
            "0"
        }
        fn get_root_handle(&self, _name: Option<&str>) -> Option<ObjectHandle> {
            Some(ObjectHandle::new(Arc::new(StubObj { fullname: "top".into() })))
        }
        fn check_create(&self, lookup: Lookup<'_>, _parent: Option<&ObjectHandle>) -> Option<ObjectHandle> {
            match lookup {
                Lookup::ByName(n) => Some(ObjectHandle::new(Arc::new(StubObj { fullname: n.to_string() }))),
                _ => None,
            }
        }
        fn iterate(&self, _parent: &ObjectHandle, _selector: IterSelector) -> Option<Box<dyn crate::iterator::IteratorImpl>> {
            None
        }
        fn register_timed(&self, _delay_ps: u64, _f: CallbackFn, _data: UserData) -> Result<CallbackHandle> {
            Err(GpiError::Unsupported)
        }
        fn register_readonly(&self, _f: CallbackFn, _data: UserData) -> Result<CallbackHandle> {
            Err(GpiError::Unsupported)
        }
        fn register_readwrite(&self, _f: CallbackFn, _data: UserData) -> Result<CallbackHandle> {
            Err(GpiError::Unsupported)
        }
        fn register_nexttime(&self, _f: CallbackFn, _data: UserData) -> Result<CallbackHandle> {
            Err(GpiError::Unsupported)
        }
        fn register_startup(&self, _f: CallbackFn, _data: UserData) -> Result<CallbackHandle> {
            Err(GpiError::Unsupported)
        }
        fn register_shutdown(&self, _f: CallbackFn, _data: UserData) -> Result<CallbackHandle> {
            Err(GpiError::Unsupported)
        }
        fn deregister(&self, _cb: &CallbackHandle) -> Result<()> {
            Ok(())
        }
        fn reason_to_string(&self, code: i32) -> String {
            format!("stub reason {code}")
        }
    }

    #[test]
    fn interning_returns_the_identical_handle_on_repeat_lookup() {
        let registry = Registry::new(true);
        registry.register(Box::new(StubBackend)).unwrap();
        let root = registry.get_root(None).unwrap();

        let first = registry.lookup_by_name(&root, "dut").unwrap();
        let second = registry.lookup_by_name(&root, "dut").unwrap();
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn non_interning_registry_returns_fresh_handles_each_time() {
        let registry = Registry::new(false);
        registry.register(Box::new(StubBackend)).unwrap();
        let root = registry.get_root(None).unwrap();

        let first = registry.lookup_by_name(&root, "dut").unwrap();
        let second = registry.lookup_by_name(&root, "dut").unwrap();
        assert!(!first.ptr_eq(&second));
    }
}
