//! Fabrication of `GENARRAY` pseudo-regions for Verilog `generate` loops.
//!
//! Two shapes show up in the wild: a simulator that exposes the array
//! object itself (`vpiGenScopeArray`, indexed directly with
//! `vpi_handle_by_index`), and one that doesn't (the Icarus workaround),
//! exposing only the bare per-iteration `vpiGenScope` instances named
//! `label[0]`, `label[1]`, ... with no array handle to anchor a lookup of
//! the bare label on.

use std::sync::Arc;

use gpi_core::{IteratorImpl, NativeHandle, ObjectHandle, PathStyle, PseudoRegionObj, Step};

use crate::ffi::*;
use crate::object::wrap;

unsafe fn cstr_opt(p: *mut std::ffi::c_char) -> Option<String> {
    if p.is_null() {
        None
    } else {
        Some(std::ffi::CStr::from_ptr(p).to_string_lossy().into_owned())
    }
}

unsafe fn wrap_scanned(h: vpiHandle) -> Option<ObjectHandle> {
    let name = cstr_opt(vpi_get_str(vpiName, h))?;
    let fullname = cstr_opt(vpi_get_str(vpiFullName, h)).unwrap_or_else(|| name.clone());
    Some(wrap(h, name, fullname))
}

/// Split `label[3]` into `("label", 3)`; `None` if `raw` doesn't look like
/// a generate-scope instance name.
pub fn split_label_index(raw: &str) -> Option<(&str, i32)> {
    let open = raw.find('[')?;
    if !raw.ends_with(']') {
        return None;
    }
    let label = &raw[..open];
    let idx: i32 = raw[open + 1..raw.len() - 1].parse().ok()?;
    Some((label, idx))
}

/// A simulator-exposed `vpiGenScopeArray` handle: index resolution and
/// iteration both go straight through it.
pub fn wrap_array_handle(array: vpiHandle, name: String, fullname: String) -> ObjectHandle {
    let for_index = array as usize;
    let for_iter = array as usize;

    let resolve_index: Box<dyn Fn(i32) -> Option<ObjectHandle> + Send + Sync> = Box::new(move |index| {
        let h = for_index as vpiHandle;
        let child = unsafe { vpi_handle_by_index(h, index) };
        if child.is_null() {
            return None;
        }
        unsafe { wrap_scanned(child) }
    });

    let make_iterator: Box<dyn Fn() -> Box<dyn IteratorImpl> + Send + Sync> = Box::new(move || {
        let h = for_iter as vpiHandle;
        Box::new(GenScopeArrayIterator::new(h)) as Box<dyn IteratorImpl>
    });

    let native = unsafe { NativeHandle::from_raw(array as *mut std::ffi::c_void) };
    ObjectHandle::new(Arc::new(PseudoRegionObj::new(
        "vpi",
        PathStyle::Verilog,
        name,
        fullname,
        native,
        resolve_index,
        make_iterator,
    )))
}

/// The Icarus-style fallback: no array object exists, so the pseudo-region
/// aliases `parent` and both closures re-scan `parent`'s `vpiGenScope`
/// children, keeping only the ones whose base label matches.
pub fn wrap_label_fallback(parent: vpiHandle, label: &str, parent_fullname: &str) -> ObjectHandle {
    let for_index = parent as usize;
    let label_for_index = label.to_string();
    let for_iter = parent as usize;
    let label_for_iter = label.to_string();

    let resolve_index: Box<dyn Fn(i32) -> Option<ObjectHandle> + Send + Sync> = Box::new(move |index| {
        let p = for_index as vpiHandle;
        unsafe {
            let it = vpi_iterate(vpiGenScope, p);
            if it.is_null() {
                return None;
            }
            loop {
                let child = vpi_scan(it);
                if child.is_null() {
                    return None;
                }
                let Some(name) = cstr_opt(vpi_get_str(vpiName, child)) else { continue };
                if let Some((base, idx)) = split_label_index(&name) {
                    if base == label_for_index && idx == index {
                        return wrap_scanned(child);
                    }
                }
            }
        }
    });

    let make_iterator: Box<dyn Fn() -> Box<dyn IteratorImpl> + Send + Sync> = Box::new(move || {
        Box::new(GenScopeLabelIterator::new(for_iter as vpiHandle, label_for_iter.clone())) as Box<dyn IteratorImpl>
    });

    let native = unsafe { NativeHandle::from_raw(parent as *mut std::ffi::c_void) };
    let fullname = format!("{parent_fullname}.{label}");
    ObjectHandle::new(Arc::new(PseudoRegionObj::new(
        "vpi",
        PathStyle::Verilog,
        label.to_string(),
        fullname,
        native,
        resolve_index,
        make_iterator,
    )))
}

/// Scan a parent for a bare generate label that has no array handle of its
/// own, matching against every `vpiGenScope` child's base name.
pub fn find_label_fallback(parent: vpiHandle, label: &str, parent_fullname: &str) -> Option<ObjectHandle> {
    unsafe {
        let it = vpi_iterate(vpiGenScope, parent);
        if it.is_null() {
            return None;
        }
        loop {
            let child = vpi_scan(it);
            if child.is_null() {
                return None;
            }
            let Some(name) = cstr_opt(vpi_get_str(vpiName, child)) else { continue };
            if let Some((base, _)) = split_label_index(&name) {
                if base == label {
                    return Some(wrap_label_fallback(parent, label, parent_fullname));
                }
            }
        }
    }
}

pub struct GenScopeArrayIterator {
    iter: vpiHandle,
}

impl GenScopeArrayIterator {
    pub fn new(array: vpiHandle) -> Self {
        GenScopeArrayIterator {
            iter: unsafe { vpi_iterate(vpiGenScope, array) },
        }
    }
}

impl IteratorImpl for GenScopeArrayIterator {
    fn next_handle(&mut self) -> Step {
        if self.iter.is_null() {
            return Step::End;
        }
        let next = unsafe { vpi_scan(self.iter) };
        if next.is_null() {
            self.iter = std::ptr::null_mut();
            return Step::End;
        }
        match unsafe { wrap_scanned(next) } {
            Some(obj) => Step::Native(obj),
            None => unsafe { Step::NotNativeNoName(NativeHandle::from_raw(next as *mut std::ffi::c_void)) },
        }
    }
}

/// Yields only the `vpiGenScope` children of `parent` whose base label
/// matches, for the array-less fallback.
pub struct GenScopeLabelIterator {
    iter: vpiHandle,
    label: String,
}

impl GenScopeLabelIterator {
    pub fn new(parent: vpiHandle, label: String) -> Self {
        GenScopeLabelIterator {
            iter: unsafe { vpi_iterate(vpiGenScope, parent) },
            label,
        }
    }
}

impl IteratorImpl for GenScopeLabelIterator {
    fn next_handle(&mut self) -> Step {
        loop {
            if self.iter.is_null() {
                return Step::End;
            }
            let next = unsafe { vpi_scan(self.iter) };
            if next.is_null() {
                self.iter = std::ptr::null_mut();
                return Step::End;
            }
            let Some(name) = (unsafe { cstr_opt(vpi_get_str(vpiName, next)) }) else { continue };
            match split_label_index(&name) {
                Some((base, _)) if base == self.label => match unsafe { wrap_scanned(next) } {
                    Some(obj) => return Step::Native(obj),
                    None => continue,
                },
                _ => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_label_and_index() {
        assert_eq!(split_label_index("gen[2]"), Some(("gen", 2)));
        assert_eq!(split_label_index("gen"), None);
        assert_eq!(split_label_index("gen[x]"), None);
    }
}
