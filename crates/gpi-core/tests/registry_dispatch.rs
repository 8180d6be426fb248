//! Exercises the registry's multi-backend dispatch contract against two
//! minimal fake backends, independent of any real simulator FFI. Each test
//! builds its own `Registry` rather than touching the process-global
//! singleton, since the singleton is shared process-wide and several tests
//! registering into it would trip each other's duplicate-backend check.

use std::sync::Arc;

use gpi_core::{
    Backend, CallbackFn, CallbackHandle, GpiError, IterSelector, IteratorHandle, IteratorImpl, Lookup, NativeHandle,
    ObjectHandle, ObjectKind, ObjectOps, PathStyle, Registry, Result, SimTime, Step, UserData,
};

#[derive(Debug)]
struct FakeObj {
    backend: &'static str,
    name: String,
    fullname: String,
}

impl ObjectOps for FakeObj {
    fn backend_name(&self) -> &'static str {
        self.backend
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
    fn range(&self) -> Option<gpi_core::Range> {
        None
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn fullname(&self) -> &str {
        &self.fullname
    }
    fn iterate_native(&self, _selector: IterSelector) -> Option<Box<dyn IteratorImpl>> {
        None
    }
}

fn fake_obj(backend: &'static str, name: &str) -> ObjectHandle {
    ObjectHandle::new(Arc::new(FakeObj {
        backend,
        name: name.to_string(),
        fullname: name.to_string(),
    }))
}

/// A backend that only ever answers for one hardcoded child name, so tests
/// can observe the registry falling through to the next registered backend.
#[derive(Debug)]
struct FakeBackend {
    name: &'static str,
    precision: i32,
    knows: &'static str,
}

impl Backend for FakeBackend {
    fn name(&self) -> &'static str {
        self.name
    }
    fn sim_end(&self) {}
    fn get_sim_time(&self) -> SimTime {
        SimTime::ZERO
    }
    fn get_sim_precision(&self) -> i32 {
        self.precision
    }
    fn product_name(&self) -> &str {
        "fake"
    }
    fn product_version(&self) -> &str {
        "0"
    }
    fn get_root_handle(&self, name: Option<&str>) -> Option<ObjectHandle> {
        match name {
            None => Some(fake_obj(self.name, self.knows)),
            Some(n) if n == self.knows => Some(fake_obj(self.name, n)),
            _ => None,
        }
    }
    fn check_create(&self, lookup: Lookup<'_>, _parent: Option<&ObjectHandle>) -> Option<ObjectHandle> {
        match lookup {
            Lookup::ByName(n) if n == self.knows => Some(fake_obj(self.name, n)),
            Lookup::ByRaw(raw) if !raw.is_null() => Some(fake_obj(self.name, self.knows)),
            _ => None,
        }
    }
    fn iterate(&self, _parent: &ObjectHandle, _selector: IterSelector) -> Option<Box<dyn IteratorImpl>> {
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
        format!("fake reason {code}")
    }
}

#[test]
fn second_registration_of_same_name_is_rejected() {
    let registry = Registry::new(false);
    registry
        .register(Box::new(FakeBackend { name: "vpi", precision: 0, knows: "top" }))
        .unwrap();
    let err = registry
        .register(Box::new(FakeBackend { name: "vpi", precision: 0, knows: "top" }))
        .unwrap_err();
    assert!(matches!(err, GpiError::DuplicateBackend(name) if name == "vpi"));
}

#[test]
fn lookup_by_name_falls_through_to_the_next_backend() {
    let registry = Registry::new(false);
    registry
        .register(Box::new(FakeBackend { name: "vpi", precision: 0, knows: "dut" }))
        .unwrap();
    registry
        .register(Box::new(FakeBackend { name: "vhpi", precision: -15, knows: "arch_only_sig" }))
        .unwrap();

    let root = registry.get_root(None).unwrap();
    assert_eq!(root.backend_name(), "vpi");

    // "dut" is answered by the first backend registered.
    let child = registry.lookup_by_name(&root, "dut").unwrap();
    assert_eq!(child.backend_name(), "vpi");

    // "arch_only_sig" is only known to the second backend; the registry
    // must try vpi, get None, then fall through to vhpi.
    let child = registry.lookup_by_name(&root, "arch_only_sig").unwrap();
    assert_eq!(child.backend_name(), "vhpi");

    // Nobody knows this one.
    assert!(registry.lookup_by_name(&root, "nonexistent").is_none());
}

#[test]
fn lookup_by_raw_tries_backends_in_registration_order() {
    let registry = Registry::new(false);
    registry
        .register(Box::new(FakeBackend { name: "vpi", precision: 0, knows: "dut" }))
        .unwrap();
    registry
        .register(Box::new(FakeBackend { name: "vhpi", precision: -15, knows: "dut" }))
        .unwrap();

    // check_create(ByRaw) answers for any non-null handle, so the first
    // registered backend wins.
    let raw = unsafe { NativeHandle::from_raw(0x1 as *mut std::ffi::c_void) };
    let resolved = registry.lookup_by_raw(raw).unwrap();
    assert_eq!(resolved.backend_name(), "vpi");
}

#[test]
fn sim_precision_is_clamped_to_the_declared_bounds() {
    let registry = Registry::new(false);
    registry
        .register(Box::new(FakeBackend { name: "vpi", precision: 12, knows: "dut" }))
        .unwrap();
    assert_eq!(registry.get_sim_precision(), 2);
}

/// Yields one `NotNative` step naming a child this backend saw but can't
/// build itself, then ends.
struct OneShotNotNative(Option<String>);

impl IteratorImpl for OneShotNotNative {
    fn next_handle(&mut self) -> Step {
        match self.0.take() {
            Some(name) => Step::NotNative(name),
            None => Step::End,
        }
    }
}

#[test]
fn iterator_not_native_step_retries_every_other_registered_backend() {
    let registry = Registry::new(false);
    registry
        .register(Box::new(FakeBackend { name: "vpi", precision: 0, knows: "top" }))
        .unwrap();
    registry
        .register(Box::new(FakeBackend { name: "vhpi", precision: -15, knows: "arch_only_sig" }))
        .unwrap();

    let parent = fake_obj("vpi", "top");
    let mut it = IteratorHandle::new(
        Box::new(OneShotNotNative(Some("arch_only_sig".to_string()))),
        parent,
        "vpi",
    );

    let resolved = registry.next(&mut it).unwrap();
    assert_eq!(resolved.backend_name(), "vhpi");
    assert!(registry.next(&mut it).is_none());
}

#[test]
fn registered_names_reflect_registration_order() {
    let registry = Registry::new(false);
    registry
        .register(Box::new(FakeBackend { name: "vpi", precision: 0, knows: "dut" }))
        .unwrap();
    registry
        .register(Box::new(FakeBackend { name: "fli", precision: 0, knows: "dut" }))
        .unwrap();
    assert_eq!(registry.registered_names(), vec!["vpi", "fli"]);
}
