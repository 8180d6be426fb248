//! `GENARRAY` pseudo-regions: the synthetic container a backend manufactures
//! when a `generate for` loop produces siblings named `label[0]`, `label[1]`,
//! ... that share a common prefix but have no object of their own in the
//! simulator's data model. Shared here because both the Verilog and VHDL
//! backends need the identical shape; only how each resolves an index or
//! builds the underlying per-index iterator differs, so those two
//! operations are supplied as closures by the owning backend.

use std::fmt;

use crate::backend::IterSelector;
use crate::handle::kind::ObjectKind;
use crate::handle::native::NativeHandle;
use crate::handle::object::{ObjectHandle, ObjectOps};
use crate::iterator::IteratorImpl;
use crate::path::PathStyle;

type ResolveIndex = Box<dyn Fn(i32) -> Option<ObjectHandle> + Send + Sync>;
type MakeIterator = Box<dyn Fn() -> Box<dyn IteratorImpl> + Send + Sync>;

pub struct PseudoRegionObj {
    backend_name: &'static str,
    path_style: PathStyle,
    name: String,
    fullname: String,
    /// The containing region's own native pointer; a pseudo-region has no
    /// native object of its own, so it aliases its parent's.
    native: NativeHandle,
    resolve_index: ResolveIndex,
    make_iterator: MakeIterator,
}

impl fmt::Debug for PseudoRegionObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PseudoRegionObj")
            .field("backend_name", &self.backend_name)
            .field("fullname", &self.fullname)
            .finish()
    }
}

impl PseudoRegionObj {
    pub fn new(
        backend_name: &'static str,
        path_style: PathStyle,
        name: String,
        fullname: String,
        native: NativeHandle,
        resolve_index: ResolveIndex,
        make_iterator: MakeIterator,
    ) -> Self {
        PseudoRegionObj {
            backend_name,
            path_style,
            name,
            fullname,
            native,
            resolve_index,
            make_iterator,
        }
    }
}

impl ObjectOps for PseudoRegionObj {
    fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    fn native(&self) -> NativeHandle {
        self.native
    }

    fn path_style(&self) -> PathStyle {
        self.path_style
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::GenArray
    }

    fn is_const(&self) -> bool {
        true
    }

    fn indexable(&self) -> bool {
        true
    }

    fn num_elems(&self) -> Option<u32> {
        None
    }

    fn range(&self) -> Option<crate::handle::kind::Range> {
        None
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fullname(&self) -> &str {
        &self.fullname
    }

    fn iterate_native(&self, selector: IterSelector) -> Option<Box<dyn IteratorImpl>> {
        match selector {
            IterSelector::Objects => Some((self.make_iterator)()),
            _ => None,
        }
    }

    fn as_pseudo_region(&self) -> Option<&PseudoRegionObj> {
        Some(self)
    }
}

impl PseudoRegionObj {
    /// The operation real objects don't have: resolve one generate-loop
    /// index directly, bypassing the name-probing path entirely since the
    /// pseudo-region already knows how its backend indexes siblings.
    pub fn resolve(&self, index: i32) -> Option<ObjectHandle> {
        (self.resolve_index)(index)
    }
}
