//! FLI traversal: `mti_First*`/`mti_Next*` walk one native kind (region,
//! signal, variable) at a time with no generic `mti_iterate`/`mti_scan`
//! pair the way VPI/VHPI have one, so [`FliRelationIterator`] steps through
//! a small fixed sequence of "which `mti_First*` am I on" stages itself.

use std::ffi::CStr;

use gpi_core::{IteratorImpl, Step};

use crate::ffi::*;
use crate::object::{wrap_region, wrap_signal, wrap_variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Regions,
    Signals,
    Variables,
    Done,
}

pub struct FliRelationIterator {
    region: mtiRegionIdT,
    stage: Stage,
    cursor: *mut std::ffi::c_void,
}

unsafe impl Send for FliRelationIterator {}
unsafe impl Sync for FliRelationIterator {}

impl FliRelationIterator {
    pub fn new_region(region: mtiRegionIdT) -> Self {
        FliRelationIterator {
            region,
            stage: Stage::Regions,
            cursor: std::ptr::null_mut(),
        }
    }

    fn parent_fullname(&self) -> String {
        unsafe {
            let p = mti_RegionFullName(self.region);
            if p.is_null() {
                String::new()
            } else {
                CStr::from_ptr(p).to_string_lossy().into_owned()
            }
        }
    }

    fn child_fullname(&self, leaf: &str) -> String {
        let parent = self.parent_fullname();
        if parent.is_empty() {
            leaf.to_string()
        } else {
            format!("{parent}/{leaf}")
        }
    }
}

impl IteratorImpl for FliRelationIterator {
    fn next_handle(&mut self) -> Step {
        loop {
            match self.stage {
                Stage::Regions => {
                    let next = if self.cursor.is_null() {
                        unsafe { mti_FirstLowerRegion(self.region) }
                    } else {
                        unsafe { mti_NextRegion(self.cursor as mtiRegionIdT) }
                    };
                    if next.is_null() {
                        self.stage = Stage::Signals;
                        self.cursor = std::ptr::null_mut();
                        continue;
                    }
                    self.cursor = next;
                    return Step::Native(wrap_region(next));
                }
                Stage::Signals => {
                    let next = if self.cursor.is_null() {
                        unsafe { mti_FirstSignal(self.region) }
                    } else {
                        unsafe { mti_NextSignal(self.cursor as mtiSignalIdT) }
                    };
                    if next.is_null() {
                        self.stage = Stage::Variables;
                        self.cursor = std::ptr::null_mut();
                        continue;
                    }
                    self.cursor = next;
                    let leaf = unsafe {
                        let p = mti_SignalName(next);
                        if p.is_null() {
                            String::new()
                        } else {
                            CStr::from_ptr(p).to_string_lossy().into_owned()
                        }
                    };
                    let fullname = self.child_fullname(&leaf);
                    return Step::Native(wrap_signal(next, fullname));
                }
                Stage::Variables => {
                    let next = if self.cursor.is_null() {
                        unsafe { mti_FirstVariable(self.region) }
                    } else {
                        unsafe { mti_NextVariable(self.cursor as mtiVariableIdT) }
                    };
                    if next.is_null() {
                        self.stage = Stage::Done;
                        return Step::End;
                    }
                    self.cursor = next;
                    let leaf = unsafe {
                        let p = mti_VariableName(next);
                        if p.is_null() {
                            String::new()
                        } else {
                            CStr::from_ptr(p).to_string_lossy().into_owned()
                        }
                    };
                    let fullname = self.child_fullname(&leaf);
                    return Step::Native(wrap_variable(next, fullname));
                }
                Stage::Done => return Step::End,
            }
        }
    }
}

/// Top-level walk used by [`crate::backend::FliBackend::get_root_handle`]:
/// the design under test's region tree has no parent above it, so this
/// never needs `NotNative`/`NotNativeNoName` cross-backend fallthrough the
/// way nested scopes conceivably could for a mixed-language design.
pub struct FliTopRegionIterator {
    started: bool,
}

impl FliTopRegionIterator {
    pub fn new() -> Self {
        FliTopRegionIterator { started: false }
    }
}

impl IteratorImpl for FliTopRegionIterator {
    fn next_handle(&mut self) -> Step {
        if self.started {
            return Step::End;
        }
        self.started = true;
        let top = unsafe { mti_GetTopRegion() };
        if top.is_null() {
            return Step::End;
        }
        Step::Native(wrap_region(top))
    }
}
