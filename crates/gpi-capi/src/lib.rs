//! The stable C ABI surface the user runtime links against, plus the
//! `GPI_EXTRA` extension loader and the shared bootstrap sequence every
//! backend's load-time entry point calls into.
//!
//! Every opaque type here is a thin `Box`-wrapped handle from `gpi-core`;
//! ownership crosses the FFI boundary as a raw pointer and comes back as one
//! on every call. The user runtime never dereferences these pointers itself.

pub mod embed;
pub mod extra;

use std::ffi::{c_char, c_double, c_int, c_longlong, c_uint, c_void, CStr, CString};

use gpi_core::{
    Action, Backend, CallbackFn, CallbackHandle, Edge, IterSelector, IteratorHandle, ObjectHandle, ObjectKind,
    RangeDir, UserData,
};

/// Opaque handle to a design object. Owns one reference-counted
/// [`ObjectHandle`]; freed with [`gpi_handle_free`].
pub struct gpi_obj_handle(ObjectHandle);

/// Opaque handle to an in-progress iteration.
pub struct gpi_iterator_handle(IteratorHandle);

/// Opaque handle to an armed callback.
pub struct gpi_cb_handle(CallbackHandle);

fn box_handle(obj: ObjectHandle) -> *mut gpi_obj_handle {
    Box::into_raw(Box::new(gpi_obj_handle(obj)))
}

unsafe fn obj_ref<'a>(h: *const gpi_obj_handle) -> Option<&'a ObjectHandle> {
    h.as_ref().map(|h| &h.0)
}

fn cstring_out(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Free a string previously returned by one of this crate's functions.
///
/// # Safety
/// `s` must have been returned by this crate and not already freed.
#[no_mangle]
pub unsafe extern "C" fn gpi_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// --- Hierarchy -------------------------------------------------------------

/// Root module matching `name`, or the first root module if `name` is null.
///
/// # Safety
/// `name`, if non-null, must be a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_root_handle(name: *const c_char) -> *mut gpi_obj_handle {
    let name = if name.is_null() {
        None
    } else {
        Some(CStr::from_ptr(name).to_string_lossy().into_owned())
    };
    match gpi_core::registry().get_root(name.as_deref()) {
        Some(obj) => box_handle(obj),
        None => std::ptr::null_mut(),
    }
}

/// Resolve `name` as a child of `parent`.
///
/// # Safety
/// `parent` must be a live handle from this crate; `name` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_handle_by_name(parent: *const gpi_obj_handle, name: *const c_char) -> *mut gpi_obj_handle {
    let Some(parent) = obj_ref(parent) else { return std::ptr::null_mut() };
    let name = CStr::from_ptr(name).to_string_lossy();
    match parent.child_by_name(&name) {
        Some(obj) => box_handle(obj),
        None => std::ptr::null_mut(),
    }
}

/// Resolve `index` as a child of `parent`.
///
/// # Safety
/// `parent` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_handle_by_index(parent: *const gpi_obj_handle, index: c_int) -> *mut gpi_obj_handle {
    let Some(parent) = obj_ref(parent) else { return std::ptr::null_mut() };
    match parent.child_by_index(index) {
        Some(obj) => box_handle(obj),
        None => std::ptr::null_mut(),
    }
}

const GPI_ITER_OBJECTS: c_int = 0;
const GPI_ITER_DRIVERS: c_int = 1;
const GPI_ITER_LOADS: c_int = 2;

fn selector_from_c(selector: c_int) -> IterSelector {
    match selector {
        GPI_ITER_DRIVERS => IterSelector::Drivers,
        GPI_ITER_LOADS => IterSelector::Loads,
        _ => IterSelector::Objects,
    }
}

/// Start iterating `parent`'s children (or drivers/loads, per `selector`).
///
/// # Safety
/// `parent` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_iterate(parent: *const gpi_obj_handle, selector: c_int) -> *mut gpi_iterator_handle {
    let Some(parent) = obj_ref(parent) else { return std::ptr::null_mut() };
    match parent.iterate(selector_from_c(selector)) {
        Some(it) => Box::into_raw(Box::new(gpi_iterator_handle(it))),
        None => std::ptr::null_mut(),
    }
}

/// Advance `it` and return the next object, or null at the end.
///
/// # Safety
/// `it` must be a live iterator handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_next(it: *mut gpi_iterator_handle) -> *mut gpi_obj_handle {
    let Some(it) = it.as_mut() else { return std::ptr::null_mut() };
    match it.0.next() {
        Some(obj) => box_handle(obj),
        None => std::ptr::null_mut(),
    }
}

/// Free an iterator handle.
///
/// # Safety
/// `it` must have come from [`gpi_iterate`] and not already be freed.
#[no_mangle]
pub unsafe extern "C" fn gpi_iterator_free(it: *mut gpi_iterator_handle) {
    if !it.is_null() {
        drop(Box::from_raw(it));
    }
}

/// Free an object handle.
///
/// # Safety
/// `h` must have come from this crate's handle-returning functions and not
/// already be freed.
#[no_mangle]
pub unsafe extern "C" fn gpi_handle_free(h: *mut gpi_obj_handle) {
    if !h.is_null() {
        drop(Box::from_raw(h));
    }
}

// --- Attribute queries ------------------------------------------------------

fn kind_to_c(kind: ObjectKind) -> c_int {
    match kind {
        ObjectKind::Unknown => 0,
        ObjectKind::Memory => 1,
        ObjectKind::Module => 2,
        ObjectKind::Net => 3,
        ObjectKind::Logic => 4,
        ObjectKind::Array => 5,
        ObjectKind::Enum => 6,
        ObjectKind::Structure => 7,
        ObjectKind::Real => 8,
        ObjectKind::Integer => 9,
        ObjectKind::String => 10,
        ObjectKind::GenArray => 11,
    }
}

/// # Safety
/// `h` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_kind(h: *const gpi_obj_handle) -> c_int {
    obj_ref(h).map(|o| kind_to_c(o.kind())).unwrap_or(0)
}

/// # Safety
/// `h` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_is_const(h: *const gpi_obj_handle) -> c_int {
    obj_ref(h).map(|o| o.is_const() as c_int).unwrap_or(0)
}

/// # Safety
/// `h` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_is_indexable(h: *const gpi_obj_handle) -> c_int {
    obj_ref(h).map(|o| o.indexable() as c_int).unwrap_or(0)
}

/// Number of elements, or -1 if this kind has no fixed element count.
///
/// # Safety
/// `h` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_num_elems(h: *const gpi_obj_handle) -> c_int {
    obj_ref(h).and_then(|o| o.num_elems()).map(|n| n as c_int).unwrap_or(-1)
}

/// # Safety
/// `h` must be a live handle from this crate. `left`/`right`/`dir` must be
/// valid non-null output pointers. Returns 0 and leaves outputs unwritten if
/// the object has no declared range.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_range(
    h: *const gpi_obj_handle,
    left: *mut c_int,
    right: *mut c_int,
    dir: *mut c_int,
) -> c_int {
    let Some(range) = obj_ref(h).and_then(|o| o.range()) else { return 0 };
    *left = range.left;
    *right = range.right;
    *dir = match range.dir {
        RangeDir::To => 0,
        RangeDir::Downto => 1,
        RangeDir::None => 2,
    };
    1
}

/// # Safety
/// `h` must be a live handle from this crate. Returned string owned by the
/// caller; free with [`gpi_free_string`].
#[no_mangle]
pub unsafe extern "C" fn gpi_get_name(h: *const gpi_obj_handle) -> *mut c_char {
    obj_ref(h).map(|o| cstring_out(o.name())).unwrap_or(std::ptr::null_mut())
}

/// # Safety
/// See [`gpi_get_name`].
#[no_mangle]
pub unsafe extern "C" fn gpi_get_fullname(h: *const gpi_obj_handle) -> *mut c_char {
    obj_ref(h).map(|o| cstring_out(o.fullname())).unwrap_or(std::ptr::null_mut())
}

/// # Safety
/// See [`gpi_get_name`].
#[no_mangle]
pub unsafe extern "C" fn gpi_get_definition_name(h: *const gpi_obj_handle) -> *mut c_char {
    obj_ref(h).map(|o| cstring_out(o.definition_name())).unwrap_or(std::ptr::null_mut())
}

/// # Safety
/// See [`gpi_get_name`].
#[no_mangle]
pub unsafe extern "C" fn gpi_get_definition_file(h: *const gpi_obj_handle) -> *mut c_char {
    obj_ref(h).map(|o| cstring_out(o.definition_file())).unwrap_or(std::ptr::null_mut())
}

/// Human-readable kind name, for diagnostics.
///
/// # Safety
/// See [`gpi_get_name`].
#[no_mangle]
pub unsafe extern "C" fn gpi_get_type_string(h: *const gpi_obj_handle) -> *mut c_char {
    let Some(o) = obj_ref(h) else { return std::ptr::null_mut() };
    let s = match o.kind() {
        ObjectKind::Unknown => "unknown",
        ObjectKind::Memory => "memory",
        ObjectKind::Module => "module",
        ObjectKind::Net => "net",
        ObjectKind::Logic => "logic",
        ObjectKind::Array => "array",
        ObjectKind::Enum => "enum",
        ObjectKind::Structure => "structure",
        ObjectKind::Real => "real",
        ObjectKind::Integer => "integer",
        ObjectKind::String => "string",
        ObjectKind::GenArray => "genarray",
    };
    cstring_out(s)
}

// --- Value I/O ---------------------------------------------------------------

fn action_from_c(action: c_int) -> Action {
    match action {
        1 => Action::NoDelay,
        2 => Action::Force,
        3 => Action::Release,
        _ => Action::Deposit,
    }
}

/// # Safety
/// See [`gpi_get_name`]. Returns null if the object has no binary-string
/// representation.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_value_binstr(h: *const gpi_obj_handle) -> *mut c_char {
    obj_ref(h).and_then(|o| o.get_binstr()).map(|s| cstring_out(&s)).unwrap_or(std::ptr::null_mut())
}

/// # Safety
/// See [`gpi_get_name`]. Returns null if the object has no string value.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_value_str(h: *const gpi_obj_handle) -> *mut c_char {
    obj_ref(h)
        .and_then(|o| o.get_str())
        .and_then(|bytes| CString::new(bytes).ok())
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// # Safety
/// `h` live handle; `out` a valid non-null output pointer. Returns 0 if the
/// object has no real value.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_value_real(h: *const gpi_obj_handle, out: *mut c_double) -> c_int {
    match obj_ref(h).and_then(|o| o.get_real()) {
        Some(v) => {
            *out = v;
            1
        }
        None => 0,
    }
}

/// # Safety
/// `h` live handle; `out` a valid non-null output pointer. Returns 0 if the
/// object has no integer value.
#[no_mangle]
pub unsafe extern "C" fn gpi_get_value_long(h: *const gpi_obj_handle, out: *mut c_longlong) -> c_int {
    match obj_ref(h).and_then(|o| o.get_long()) {
        Some(v) => {
            *out = v;
            1
        }
        None => 0,
    }
}

fn report_result(r: gpi_core::Result<()>) -> c_int {
    match r {
        Ok(()) => 1,
        Err(e) => {
            log::warn!("gpi-capi: {e}");
            0
        }
    }
}

/// # Safety
/// `h` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_set_value_long(h: *const gpi_obj_handle, value: c_longlong, action: c_int) -> c_int {
    let Some(o) = obj_ref(h) else { return 0 };
    report_result(o.set_long(value, action_from_c(action)))
}

/// # Safety
/// `h` must be a live handle from this crate.
#[no_mangle]
pub unsafe extern "C" fn gpi_set_value_real(h: *const gpi_obj_handle, value: c_double, action: c_int) -> c_int {
    let Some(o) = obj_ref(h) else { return 0 };
    report_result(o.set_real(value, action_from_c(action)))
}

/// # Safety
/// `h` must be a live handle from this crate; `value` a valid NUL-terminated
/// C string.
#[no_mangle]
pub unsafe extern "C" fn gpi_set_value_str(h: *const gpi_obj_handle, value: *const c_char, action: c_int) -> c_int {
    let Some(o) = obj_ref(h) else { return 0 };
    let bytes = CStr::from_ptr(value).to_bytes();
    report_result(o.set_str(bytes, action_from_c(action)))
}

/// # Safety
/// `h` must be a live handle from this crate; `value` a valid NUL-terminated
/// C string of `0`/`1`/`x`/`z` characters.
#[no_mangle]
pub unsafe extern "C" fn gpi_set_value_binstr(h: *const gpi_obj_handle, value: *const c_char, action: c_int) -> c_int {
    let Some(o) = obj_ref(h) else { return 0 };
    let s = CStr::from_ptr(value).to_string_lossy();
    report_result(o.set_binstr(&s, action_from_c(action)))
}

// --- Callbacks ---------------------------------------------------------------

fn box_cb(cb: CallbackHandle) -> *mut gpi_cb_handle {
    Box::into_raw(Box::new(gpi_cb_handle(cb)))
}

/// # Safety
/// `f` must be a valid function pointer for the lifetime of the callback.
#[no_mangle]
pub extern "C" fn gpi_register_timed_callback(delay_ps: u64, f: CallbackFn, data: *mut c_void) -> *mut gpi_cb_handle {
    match gpi_core::registry().register_timed(delay_ps, f, UserData(data)) {
        Ok(cb) => box_cb(cb),
        Err(e) => {
            log::warn!("gpi-capi: {e}");
            std::ptr::null_mut()
        }
    }
}

/// # Safety
/// `h` must be a live handle from this crate; `f` a valid function pointer
/// for the lifetime of the callback.
#[no_mangle]
pub unsafe extern "C" fn gpi_register_value_change_callback(
    h: *const gpi_obj_handle,
    edge: c_int,
    f: CallbackFn,
    data: *mut c_void,
) -> *mut gpi_cb_handle {
    let Some(o) = obj_ref(h) else { return std::ptr::null_mut() };
    let edge = match edge {
        0 => Edge::Rising,
        1 => Edge::Falling,
        _ => Edge::Either,
    };
    match o.register_value_change_cb(edge, f, UserData(data)) {
        Ok(cb) => box_cb(cb),
        Err(e) => {
            log::warn!("gpi-capi: {e}");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn gpi_register_readonly_callback(f: CallbackFn, data: *mut c_void) -> *mut gpi_cb_handle {
    match gpi_core::registry().register_readonly(f, UserData(data)) {
        Ok(cb) => box_cb(cb),
        Err(e) => {
            log::warn!("gpi-capi: {e}");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn gpi_register_readwrite_callback(f: CallbackFn, data: *mut c_void) -> *mut gpi_cb_handle {
    match gpi_core::registry().register_readwrite(f, UserData(data)) {
        Ok(cb) => box_cb(cb),
        Err(e) => {
            log::warn!("gpi-capi: {e}");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn gpi_register_nexttime_callback(f: CallbackFn, data: *mut c_void) -> *mut gpi_cb_handle {
    match gpi_core::registry().register_nexttime(f, UserData(data)) {
        Ok(cb) => box_cb(cb),
        Err(e) => {
            log::warn!("gpi-capi: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Cancel `cb`, then free the handle. A no-op cancel (deferred delete) is
/// handled transparently inside the backend's `remove()`.
///
/// # Safety
/// `cb` must have come from one of this crate's register functions and not
/// already be freed.
#[no_mangle]
pub unsafe extern "C" fn gpi_deregister_callback(cb: *mut gpi_cb_handle) -> c_int {
    if cb.is_null() {
        return 0;
    }
    let boxed = Box::from_raw(cb);
    let r = boxed.0.remove();
    report_result(r)
}

// --- Simulator-level queries ---------------------------------------------------

#[no_mangle]
pub extern "C" fn gpi_get_sim_time(high: *mut c_uint, low: *mut c_uint) {
    let (hi, lo) = gpi_core::registry().get_sim_time().to_hilo();
    unsafe {
        if !high.is_null() {
            *high = hi;
        }
        if !low.is_null() {
            *low = lo;
        }
    }
}

#[no_mangle]
pub extern "C" fn gpi_get_sim_precision() -> c_int {
    gpi_core::registry().get_sim_precision()
}

#[no_mangle]
pub extern "C" fn gpi_get_simulator_product() -> *mut c_char {
    cstring_out(&gpi_core::registry().product_name())
}

#[no_mangle]
pub extern "C" fn gpi_get_simulator_version() -> *mut c_char {
    cstring_out(&gpi_core::registry().product_version())
}

#[no_mangle]
pub extern "C" fn gpi_sim_end() {
    gpi_core::registry().sim_end();
}

const EMBED_INFO: c_int = 0;
const EMBED_WARNING: c_int = 1;
const EMBED_ERROR: c_int = 2;
const EMBED_CRITICAL: c_int = 3;

/// Push an adapter-level event up to the user runtime. `level` uses the
/// same 0..3 scale as [`gpi_get_kind`]'s sibling attribute getters: info,
/// warning, error, critical.
///
/// # Safety
/// `msg` must be a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn gpi_embed_event(level: c_int, msg: *const c_char) {
    let level = match level {
        EMBED_WARNING => gpi_core::ErrorLevel::Warning,
        EMBED_ERROR => gpi_core::ErrorLevel::Error,
        EMBED_CRITICAL => gpi_core::ErrorLevel::Critical,
        EMBED_INFO | _ => gpi_core::ErrorLevel::Info,
    };
    let message = CStr::from_ptr(msg).to_string_lossy();
    embed::report(level, &message);
}

/// The bootstrap sequence each backend's load-time entry point runs:
/// construct and register `backend`; load every `GPI_EXTRA` extension and
/// hand control to the user runtime's embedded interpreter, exactly once
/// for the process regardless of how many backends load (a mixed-language
/// build registers more than one); then arm this backend's own startup and
/// shutdown callbacks.
pub fn bootstrap(
    backend: Box<dyn Backend>,
    on_startup: CallbackFn,
    on_shutdown: CallbackFn,
) -> gpi_core::Result<()> {
    #[cfg(feature = "logging")]
    let _ = env_logger::try_init();

    let name = backend.name();
    gpi_core::registry().register(backend)?;
    log::info!("gpi-capi: registered backend {name}");

    static EXTRAS_LOADED: std::sync::Once = std::sync::Once::new();
    EXTRAS_LOADED.call_once(|| {
        if let Err(e) = load_gpi_extra() {
            println!("gpi-capi: {e}");
            std::process::exit(1);
        }
        embed::init_python();
        log::info!("gpi-capi: registered backends: {:?}", gpi_core::registry().registered_names());
    });

    gpi_core::registry().register_startup(on_startup, UserData(std::ptr::null_mut()))?;
    gpi_core::registry().register_shutdown(on_shutdown, UserData(std::ptr::null_mut()))?;
    Ok(())
}

/// Load every `path:entry_symbol` pair named by the `GPI_EXTRA` environment
/// variable, in order. Aborts loading (returning the first error) on any
/// failure, surfacing it to the simulator with a diagnostic.
pub fn load_gpi_extra() -> gpi_core::Result<()> {
    extra::load_from_env("GPI_EXTRA")
}

unsafe impl Send for gpi_obj_handle {}
unsafe impl Sync for gpi_obj_handle {}
unsafe impl Send for gpi_iterator_handle {}
unsafe impl Send for gpi_cb_handle {}
unsafe impl Sync for gpi_cb_handle {}
