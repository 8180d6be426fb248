//! VPI iterators: a multi-relation table walk that tries each relation
//! for the parent's kind in turn, and a single-relation convenience
//! wrapper used for driver/load traversal.

use std::collections::HashSet;

use gpi_core::{IteratorImpl, NativeHandle, ObjectKind, Step};

use crate::ffi::*;
use crate::genarray::{self, split_label_index};
use crate::object::wrap;

/// Ordered list of VPI one-to-many relations to try for a given parent
/// kind. `vpiGenScopeArray` comes first so a compliant simulator's array
/// handle wins; `vpiGenScope` is a fallback relation for simulators (e.g.
/// Icarus) that expose only the bare per-iteration scopes, with no array
/// object to anchor a pseudo-region on.
fn relations_for(kind: ObjectKind) -> &'static [i32] {
    match kind {
        ObjectKind::Module => &[
            vpiModule,
            vpiNet,
            vpiReg,
            vpiMemory,
            vpiIntegerVar,
            vpiRealVar,
            vpiParameter,
            vpiGenScopeArray,
            vpiGenScope,
        ],
        _ => &[],
    }
}

pub struct VpiRelationIterator {
    parent: vpiHandle,
    parent_fullname: String,
    relations: &'static [i32],
    relation_idx: usize,
    current: vpiHandle,
    seen_labels: HashSet<String>,
}

impl VpiRelationIterator {
    pub fn new(parent: vpiHandle, kind: ObjectKind) -> Self {
        let parent_fullname = unsafe { cstr_opt(vpi_get_str(vpiFullName, parent)).unwrap_or_default() };
        let relations = relations_for(kind);
        let mut it = VpiRelationIterator {
            parent,
            parent_fullname,
            relations,
            relation_idx: 0,
            current: std::ptr::null_mut(),
            seen_labels: HashSet::new(),
        };
        it.advance_relation();
        it
    }

    fn advance_relation(&mut self) {
        while self.relation_idx < self.relations.len() {
            let vpitype = self.relations[self.relation_idx];
            self.relation_idx += 1;
            let it = unsafe { vpi_iterate(vpitype, self.parent) };
            if !it.is_null() {
                self.current = it;
                return;
            }
        }
        self.current = std::ptr::null_mut();
    }
}

impl IteratorImpl for VpiRelationIterator {
    fn next_handle(&mut self) -> Step {
        loop {
            if self.current.is_null() {
                return Step::End;
            }
            let next = unsafe { vpi_scan(self.current) };
            if next.is_null() {
                self.advance_relation();
                if self.current.is_null() {
                    return Step::End;
                }
                continue;
            }
            let vpitype = unsafe { vpi_get(vpiType, next) };
            if vpitype == vpiGenScopeArray {
                let name = unsafe { cstr_opt(vpi_get_str(vpiName, next)) };
                let Some(n) = name else { continue };
                let fullname = format!("{}.{}", self.parent_fullname, n);
                return Step::Native(genarray::wrap_array_handle(next, n, fullname));
            }
            if vpitype == vpiGenScope {
                // Only reached via the array-less fallback relation: fold
                // every instance sharing a base label into one
                // pseudo-region, returned the first time its label is seen.
                let name = unsafe { cstr_opt(vpi_get_str(vpiName, next)) };
                let Some(n) = name else { continue };
                let Some((label, _)) = split_label_index(&n) else { continue };
                if !self.seen_labels.insert(label.to_string()) {
                    continue;
                }
                return Step::Native(genarray::wrap_label_fallback(self.parent, label, &self.parent_fullname));
            }
            let name = unsafe { cstr_opt(vpi_get_str(vpiName, next)) };
            return match name {
                Some(n) => {
                    let fullname = unsafe { cstr_opt(vpi_get_str(vpiFullName, next)).unwrap_or_else(|| n.clone()) };
                    Step::Native(wrap(next, n, fullname))
                }
                None => unsafe { Step::NotNativeNoName(NativeHandle::from_raw(next as *mut std::ffi::c_void)) },
            };
        }
    }
}

/// Single-relation iterator for relations the parent object already knows
/// (drivers, loads): one `vpi_iterate` call, then repeated `vpi_scan`.
pub struct VpiSingleIterator {
    iter: vpiHandle,
}

impl VpiSingleIterator {
    pub fn new(parent: vpiHandle, vpitype: i32) -> Self {
        let iter = unsafe { vpi_iterate(vpitype, parent) };
        VpiSingleIterator { iter }
    }
}

impl IteratorImpl for VpiSingleIterator {
    fn next_handle(&mut self) -> Step {
        if self.iter.is_null() {
            return Step::End;
        }
        let next = unsafe { vpi_scan(self.iter) };
        if next.is_null() {
            self.iter = std::ptr::null_mut();
            return Step::End;
        }
        let name = unsafe { cstr_opt(vpi_get_str(vpiName, next)) };
        match name {
            Some(n) => {
                let fullname = unsafe { cstr_opt(vpi_get_str(vpiFullName, next)).unwrap_or_else(|| n.clone()) };
                Step::Native(wrap(next, n, fullname))
            }
            None => unsafe { Step::NotNativeNoName(NativeHandle::from_raw(next as *mut std::ffi::c_void)) },
        }
    }
}

unsafe fn cstr_opt(p: *mut std::ffi::c_char) -> Option<String> {
    if p.is_null() {
        None
    } else {
        Some(std::ffi::CStr::from_ptr(p).to_string_lossy().into_owned())
    }
}
