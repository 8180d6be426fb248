//! Fabrication of `GENARRAY` pseudo-regions for VHDL `for`/`if`-generate
//! statements.
//!
//! Unlike the Verilog side, a VHPI-compliant simulator always hands back a
//! real handle for a generate statement's label, so there's no array-less
//! fallback to worry about here: the generate statement handle itself
//! becomes the pseudo-region's native anchor, and each iteration is reached
//! through the `vhpiInternalRegions` relation, indexed directly with
//! `vhpi_handle_by_index` the same way `vhpiIndexedNames` resolves array
//! elements elsewhere in this backend.

use std::ffi::CStr;
use std::sync::Arc;

use gpi_core::{IteratorImpl, NativeHandle, ObjectHandle, PathStyle, PseudoRegionObj, Step};

use crate::ffi::*;
use crate::object::wrap;

unsafe fn cstr_opt(p: *mut std::ffi::c_char) -> Option<String> {
    if p.is_null() {
        None
    } else {
        Some(CStr::from_ptr(p).to_string_lossy().into_owned())
    }
}

unsafe fn wrap_scanned(h: vhpiHandleT) -> Option<ObjectHandle> {
    let name = cstr_opt(vhpi_get_str(vhpiNameP, h))?;
    let fullname = cstr_opt(vhpi_get_str(vhpiFullNameP, h)).unwrap_or_else(|| name.clone());
    let classkind = vhpi_get(vhpiKindP, h);
    Some(wrap(h, classkind, name, fullname))
}

/// Split `gen(2)` into `("gen", 2)`; VHDL's indexing separator is
/// parenthesized rather than bracketed.
pub fn split_label_index(raw: &str) -> Option<(&str, i32)> {
    let open = raw.find('(')?;
    if !raw.ends_with(')') {
        return None;
    }
    let label = &raw[..open];
    let idx: i32 = raw[open + 1..raw.len() - 1].parse().ok()?;
    Some((label, idx))
}

/// Wrap a `vhpiForGenerateK`/`vhpiIfGenerateK` handle as a pseudo-region
/// that aliases itself and resolves iterations through
/// `vhpiInternalRegions`.
pub fn wrap_generate(handle: vhpiHandleT, name: String, fullname: String) -> ObjectHandle {
    let for_index = handle as usize;
    let for_iter = handle as usize;

    let resolve_index: Box<dyn Fn(i32) -> Option<ObjectHandle> + Send + Sync> = Box::new(move |index| {
        let h = for_index as vhpiHandleT;
        let child = unsafe { vhpi_handle_by_index(vhpiInternalRegions, h, index) };
        if child.is_null() {
            return None;
        }
        unsafe { wrap_scanned(child) }
    });

    let make_iterator: Box<dyn Fn() -> Box<dyn IteratorImpl> + Send + Sync> = Box::new(move || {
        let h = for_iter as vhpiHandleT;
        Box::new(GenerateIterator::new(h)) as Box<dyn IteratorImpl>
    });

    let native = unsafe { NativeHandle::from_raw(handle as *mut std::ffi::c_void) };
    ObjectHandle::new(Arc::new(PseudoRegionObj::new(
        "vhpi",
        PathStyle::Vhdl,
        name,
        fullname,
        native,
        resolve_index,
        make_iterator,
    )))
}

pub struct GenerateIterator {
    iter: vhpiHandleT,
}

impl GenerateIterator {
    pub fn new(parent: vhpiHandleT) -> Self {
        GenerateIterator {
            iter: unsafe { vhpi_iterator(vhpiInternalRegions, parent) },
        }
    }
}

impl IteratorImpl for GenerateIterator {
    fn next_handle(&mut self) -> Step {
        if self.iter.is_null() {
            return Step::End;
        }
        let next = unsafe { vhpi_scan(self.iter) };
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_label_and_index() {
        assert_eq!(split_label_index("gen(2)"), Some(("gen", 2)));
        assert_eq!(split_label_index("gen"), None);
        assert_eq!(split_label_index("gen(x)"), None);
    }
}
