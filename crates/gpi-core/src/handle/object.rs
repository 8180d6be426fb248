//! The object handle hierarchy (component B): polymorphic wrappers around
//! simulator objects, with typed value accessors.

use std::fmt;
use std::sync::Arc;

use crate::backend::{Action, IterSelector};
use crate::callback::{CallbackFn, CallbackHandle, Edge, UserData};
use crate::error::{GpiError, Result};
use crate::handle::kind::{ObjectKind, Range};
use crate::handle::native::NativeHandle;
use crate::iterator::{IteratorHandle, IteratorImpl};
use crate::path::{self, PathStyle};

/// Per-backend concrete object contract. Attributes (kind, const-ness,
/// range, name) are fixed at construction time and never change over the
/// handle's lifetime.
pub trait ObjectOps: fmt::Debug + Send + Sync {
    fn backend_name(&self) -> &'static str;
    fn native(&self) -> NativeHandle;
    fn path_style(&self) -> PathStyle;

    fn kind(&self) -> ObjectKind;
    fn is_const(&self) -> bool;
    fn indexable(&self) -> bool;
    fn num_elems(&self) -> Option<u32>;
    fn range(&self) -> Option<Range>;

    fn name(&self) -> &str;
    fn fullname(&self) -> &str;
    fn definition_name(&self) -> &str {
        ""
    }
    fn definition_file(&self) -> &str {
        ""
    }

    fn get_binstr(&self) -> Option<String> {
        None
    }
    fn get_str(&self) -> Option<Vec<u8>> {
        None
    }
    fn get_real(&self) -> Option<f64> {
        None
    }
    fn get_long(&self) -> Option<i64> {
        None
    }

    fn set_long(&self, _value: i64, _action: Action) -> Result<()> {
        Err(GpiError::Unsupported)
    }
    fn set_real(&self, _value: f64, _action: Action) -> Result<()> {
        Err(GpiError::Unsupported)
    }
    fn set_str(&self, _value: &[u8], _action: Action) -> Result<()> {
        Err(GpiError::Unsupported)
    }
    fn set_binstr(&self, _value: &str, _action: Action) -> Result<()> {
        Err(GpiError::Unsupported)
    }

    fn register_value_change_cb(&self, _edge: Edge, _f: CallbackFn, _data: UserData) -> Result<CallbackHandle> {
        Err(GpiError::Unsupported)
    }

    /// Native one-to-many traversal rooted at this object; `None` if this
    /// backend has no relationship table entry for this object's kind.
    fn iterate_native(&self, selector: IterSelector) -> Option<Box<dyn IteratorImpl>>;

    /// Downcast hook for `GENARRAY` pseudo-regions, whose index resolution
    /// bypasses the normal name-probing path entirely. `None` for every
    /// ordinary object.
    fn as_pseudo_region(&self) -> Option<&crate::handle::pseudo::PseudoRegionObj> {
        None
    }
}

/// A type-erased, reference-counted handle to one design item.
#[derive(Clone, Debug)]
pub struct ObjectHandle(Arc<dyn ObjectOps>);

impl ObjectHandle {
    pub fn new(inner: Arc<dyn ObjectOps>) -> Self {
        ObjectHandle(inner)
    }

    pub fn backend_name(&self) -> &'static str {
        self.0.backend_name()
    }

    pub fn native(&self) -> NativeHandle {
        self.0.native()
    }

    pub fn kind(&self) -> ObjectKind {
        self.0.kind()
    }

    pub fn is_const(&self) -> bool {
        self.0.is_const()
    }

    pub fn indexable(&self) -> bool {
        self.0.indexable()
    }

    pub fn num_elems(&self) -> Option<u32> {
        self.0.num_elems()
    }

    pub fn range(&self) -> Option<Range> {
        self.0.range()
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn fullname(&self) -> &str {
        self.0.fullname()
    }

    pub fn definition_name(&self) -> &str {
        self.0.definition_name()
    }

    pub fn definition_file(&self) -> &str {
        self.0.definition_file()
    }

    pub fn get_binstr(&self) -> Option<String> {
        self.0.get_binstr()
    }

    pub fn get_str(&self) -> Option<Vec<u8>> {
        self.0.get_str()
    }

    pub fn get_real(&self) -> Option<f64> {
        self.0.get_real()
    }

    pub fn get_long(&self) -> Option<i64> {
        self.0.get_long()
    }

    pub fn set_long(&self, value: i64, action: Action) -> Result<()> {
        if self.is_const() {
            return Err(GpiError::ConstViolation);
        }
        self.0.set_long(value, action)
    }

    pub fn set_real(&self, value: f64, action: Action) -> Result<()> {
        if self.is_const() {
            return Err(GpiError::ConstViolation);
        }
        self.0.set_real(value, action)
    }

    pub fn set_str(&self, value: &[u8], action: Action) -> Result<()> {
        if self.is_const() {
            return Err(GpiError::ConstViolation);
        }
        self.0.set_str(value, action)
    }

    pub fn set_binstr(&self, value: &str, action: Action) -> Result<()> {
        if self.is_const() {
            return Err(GpiError::ConstViolation);
        }
        if let Some(n) = self.num_elems() {
            if value.chars().count() as u32 != n {
                return Err(GpiError::TypeCoercion(format!(
                    "expected {} characters, got {}",
                    n,
                    value.chars().count()
                )));
            }
        }
        self.0.set_binstr(value, action)
    }

    pub fn register_value_change_cb(&self, edge: Edge, f: CallbackFn, data: UserData) -> Result<CallbackHandle> {
        if self.is_const() {
            return Err(GpiError::ConstViolation);
        }
        self.0.register_value_change_cb(edge, f, data)
    }

    /// Candidate fully-qualified path for a local child name, used by the
    /// registry to probe every backend.
    pub fn child_fullname(&self, leaf: &str) -> String {
        path::join_region(self.fullname(), leaf, self.0.path_style())
    }

    pub fn child_by_name(&self, name: &str) -> Option<ObjectHandle> {
        crate::registry::registry().lookup_by_name(self, name)
    }

    pub fn child_by_index(&self, index: i32) -> Option<ObjectHandle> {
        crate::registry::registry().lookup_by_index(self, index)
    }

    pub fn iterate(&self, selector: IterSelector) -> Option<IteratorHandle> {
        let inner = self.0.iterate_native(selector)?;
        Some(IteratorHandle::new(inner, self.clone(), self.0.backend_name()))
    }

    pub(crate) fn ptr_eq(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn as_pseudo_region(&self) -> Option<&crate::handle::pseudo::PseudoRegionObj> {
        self.0.as_pseudo_region()
    }
}
