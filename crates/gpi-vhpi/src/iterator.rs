//! VHPI iterators.

use gpi_core::{IteratorImpl, NativeHandle, ObjectKind, Step};

use crate::ffi::*;
use crate::object::wrap;

fn relations_for(kind: ObjectKind) -> &'static [vhpiOneToManyT] {
    match kind {
        ObjectKind::Module => &[
            vhpiInternalRegions,
            vhpiSigDecls,
            vhpiVarDecls,
            vhpiPortDecls,
            vhpiGenericDecls,
            vhpiConstDecls,
        ],
        ObjectKind::GenArray => &[vhpiInternalRegions],
        ObjectKind::Array | ObjectKind::Structure => &[vhpiIndexedNames],
        _ => &[],
    }
}

pub struct VhpiRelationIterator {
    parent: vhpiHandleT,
    relations: &'static [vhpiOneToManyT],
    relation_idx: usize,
    current: vhpiHandleT,
}

impl VhpiRelationIterator {
    pub fn new(parent: vhpiHandleT, kind: ObjectKind) -> Self {
        let relations = relations_for(kind);
        let mut it = VhpiRelationIterator {
            parent,
            relations,
            relation_idx: 0,
            current: std::ptr::null_mut(),
        };
        it.advance_relation();
        it
    }

    fn advance_relation(&mut self) {
        while self.relation_idx < self.relations.len() {
            let rel = self.relations[self.relation_idx];
            self.relation_idx += 1;
            let it = unsafe { vhpi_iterator(rel, self.parent) };
            if !it.is_null() {
                self.current = it;
                return;
            }
        }
        self.current = std::ptr::null_mut();
    }
}

impl IteratorImpl for VhpiRelationIterator {
    fn next_handle(&mut self) -> Step {
        loop {
            if self.current.is_null() {
                return Step::End;
            }
            let next = unsafe { vhpi_scan(self.current) };
            if next.is_null() {
                self.advance_relation();
                if self.current.is_null() {
                    return Step::End;
                }
                continue;
            }
            let classkind = unsafe { vhpi_get(vhpiKindP, next) };
            let name = unsafe { cstr_opt(vhpi_get_str(vhpiNameP, next)) };
            let Some(n) = name else {
                return unsafe { Step::NotNativeNoName(NativeHandle::from_raw(next as *mut std::ffi::c_void)) };
            };
            let fullname = unsafe { cstr_opt(vhpi_get_str(vhpiFullNameP, next)).unwrap_or_else(|| n.clone()) };
            if matches!(classkind, vhpiForGenerateK | vhpiIfGenerateK) {
                return Step::Native(crate::genarray::wrap_generate(next, n, fullname));
            }
            return Step::Native(wrap(next, classkind, n, fullname));
        }
    }
}

pub struct VhpiSingleIterator {
    iter: vhpiHandleT,
}

impl VhpiSingleIterator {
    pub fn new(parent: vhpiHandleT, rel: vhpiOneToManyT) -> Self {
        let iter = unsafe { vhpi_iterator(rel, parent) };
        VhpiSingleIterator { iter }
    }
}

impl IteratorImpl for VhpiSingleIterator {
    fn next_handle(&mut self) -> Step {
        if self.iter.is_null() {
            return Step::End;
        }
        let next = unsafe { vhpi_scan(self.iter) };
        if next.is_null() {
            self.iter = std::ptr::null_mut();
            return Step::End;
        }
        let name = unsafe { cstr_opt(vhpi_get_str(vhpiNameP, next)) };
        match name {
            Some(n) => {
                let fullname = unsafe { cstr_opt(vhpi_get_str(vhpiFullNameP, next)).unwrap_or_else(|| n.clone()) };
                let classkind = unsafe { vhpi_get(vhpiKindP, next) };
                Step::Native(wrap(next, classkind, n, fullname))
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
