//! VHPI object handles: `vhpiHandleT` wrapped behind [`gpi_core::ObjectOps`].

use std::ffi::{c_char, c_void, CStr, CString};

use gpi_core::{
    Action, Edge, GpiError, IterSelector, NativeHandle, ObjectHandle, ObjectKind, ObjectOps, PathStyle, Range,
    RangeDir, Result,
};

use crate::callback::VhpiValueChangeCb;
use crate::ffi::*;
use crate::iterator::{VhpiRelationIterator, VhpiSingleIterator};

pub fn classkind_to_kind(kind: vhpiClassKindT, handle: vhpiHandleT) -> ObjectKind {
    match kind {
        vhpiRootInstK | vhpiCompInstStmtK | vhpiBlockStmtK => ObjectKind::Module,
        vhpiForGenerateK | vhpiIfGenerateK => ObjectKind::GenArray,
        vhpiSigDeclK | vhpiPortDeclK | vhpiVarDeclK | vhpiConstDeclK | vhpiGenericDeclK => {
            classify_value_kind(handle)
        }
        vhpiRecordTypeDeclK => ObjectKind::Structure,
        vhpiIndexedNameK => ObjectKind::Array,
        _ => ObjectKind::Unknown,
    }
}

/// Resolve a signal/variable/constant/generic declaration's base type and
/// classify it the way spec.md's "logic mapping" policy requires: a 2- or
/// 9-valued enumeration is a logic scalar, a 256-valued one is VHDL
/// `character` (surfaces as `Integer`), a `{FALSE,TRUE}` one is `boolean`
/// (also `Integer`), any other enumeration is a generic `Enum`, and
/// non-enumeration base kinds map straight across.
fn classify_value_kind(handle: vhpiHandleT) -> ObjectKind {
    unsafe {
        let base = vhpi_handle(vhpiBaseType, handle);
        if base.is_null() {
            return ObjectKind::Unknown;
        }
        let base_kind = vhpi_get(vhpiKindP, base);
        match base_kind {
            vhpiEnumTypeDeclK => gpi_core::codec::classify_enum_literals(&enum_literal_names(base)),
            vhpiIntTypeDeclK | vhpiPhysTypeDeclK => ObjectKind::Integer,
            vhpiFloatTypeDeclK => ObjectKind::Real,
            vhpiArrayTypeDeclK => ObjectKind::Array,
            vhpiRecordTypeDeclK => ObjectKind::Structure,
            _ => ObjectKind::Unknown,
        }
    }
}

/// Ordered literal names of an enumeration type handle, via
/// `vhpiEnumLiterals`/`vhpiNameP`. Empty if the type can't be iterated.
unsafe fn enum_literal_names(enum_type: vhpiHandleT) -> Vec<String> {
    let it = vhpi_iterator(vhpiEnumLiterals, enum_type);
    if it.is_null() {
        return Vec::new();
    }
    let mut names = Vec::new();
    loop {
        let literal = vhpi_scan(it);
        if literal.is_null() {
            break;
        }
        names.push(cstr_to_string(vhpi_get_str(vhpiNameP, literal)));
    }
    names
}

unsafe fn cstr_to_string(p: *mut c_char) -> String {
    if p.is_null() {
        String::new()
    } else {
        CStr::from_ptr(p).to_string_lossy().into_owned()
    }
}

#[derive(Debug)]
pub struct VhpiObj {
    handle: vhpiHandleT,
    kind: ObjectKind,
    name: String,
    fullname: String,
    is_const: bool,
    range: Option<Range>,
    num_elems: Option<u32>,
}

impl VhpiObj {
    pub fn new(handle: vhpiHandleT, kind_code: vhpiClassKindT, name: String, fullname: String) -> Self {
        unsafe {
            let kind = classkind_to_kind(kind_code, handle);
            let is_const = vhpi_get(vhpiIsConstP, handle) != 0;
            let (range, num_elems) = if matches!(kind, ObjectKind::Logic | ObjectKind::Array | ObjectKind::Structure)
            {
                let unconstrained = vhpi_get(vhpiIsUnconstrainedP, handle) != 0;
                if unconstrained {
                    // Treat an unconstrained array as having no statically
                    // known range at all rather than trusting
                    // `vhpiRightBoundP`'s sentinel.
                    (None, None)
                } else {
                    let left = vhpi_get(vhpiLeftBoundP, handle);
                    let right = vhpi_get(vhpiRightBoundP, handle);
                    let is_up = vhpi_get(vhpiIsUpP, handle) != 0;
                    let dir = if is_up { RangeDir::To } else { RangeDir::Downto };
                    let size = vhpi_get(vhpiSizeP, handle).max(0) as u32;
                    (Some(Range::new(left, right, dir)), Some(size))
                }
            } else {
                (None, None)
            };
            VhpiObj {
                handle,
                kind,
                name,
                fullname,
                is_const,
                range,
                num_elems,
            }
        }
    }

    pub(crate) fn raw(&self) -> vhpiHandleT {
        self.handle
    }
}

impl ObjectOps for VhpiObj {
    fn backend_name(&self) -> &'static str {
        "vhpi"
    }

    fn native(&self) -> NativeHandle {
        unsafe { NativeHandle::from_raw(self.handle as *mut c_void) }
    }

    fn path_style(&self) -> PathStyle {
        PathStyle::Vhdl
    }

    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn is_const(&self) -> bool {
        self.is_const
    }

    fn indexable(&self) -> bool {
        matches!(self.kind, ObjectKind::Array | ObjectKind::Logic | ObjectKind::Structure)
    }

    fn num_elems(&self) -> Option<u32> {
        self.num_elems
    }

    fn range(&self) -> Option<Range> {
        self.range
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fullname(&self) -> &str {
        &self.fullname
    }

    fn get_binstr(&self) -> Option<String> {
        if !self.kind.is_signal_like() {
            return None;
        }
        unsafe {
            let mut value = vhpiValueT {
                format: vhpiBinStrVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { str_: std::ptr::null_mut() },
            };
            vhpi_get_value(self.handle, &mut value);
            Some(cstr_to_string(value.value.str_))
        }
    }

    fn get_str(&self) -> Option<Vec<u8>> {
        if self.kind != ObjectKind::String {
            return None;
        }
        unsafe {
            let mut value = vhpiValueT {
                format: vhpiStrVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { str_: std::ptr::null_mut() },
            };
            vhpi_get_value(self.handle, &mut value);
            Some(cstr_to_string(value.value.str_).into_bytes())
        }
    }

    fn get_real(&self) -> Option<f64> {
        if self.kind != ObjectKind::Real {
            return None;
        }
        unsafe {
            let mut value = vhpiValueT {
                format: vhpiRealVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { real: 0.0 },
            };
            vhpi_get_value(self.handle, &mut value);
            Some(value.value.real)
        }
    }

    fn get_long(&self) -> Option<i64> {
        if !matches!(self.kind, ObjectKind::Integer | ObjectKind::Enum) {
            return None;
        }
        unsafe {
            let mut value = vhpiValueT {
                format: vhpiIntVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { intg: 0 },
            };
            vhpi_get_value(self.handle, &mut value);
            Some(value.value.intg as i64)
        }
    }

    fn set_long(&self, value: i64, action: Action) -> Result<()> {
        unsafe {
            let mut v = vhpiValueT {
                format: vhpiIntVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { intg: value as i32 },
            };
            let rc = vhpi_put_value(self.handle, &mut v, action_mode(action));
            check(rc)
        }
    }

    fn set_real(&self, value: f64, action: Action) -> Result<()> {
        unsafe {
            let mut v = vhpiValueT {
                format: vhpiRealVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { real: value },
            };
            let rc = vhpi_put_value(self.handle, &mut v, action_mode(action));
            check(rc)
        }
    }

    fn set_str(&self, value: &[u8], action: Action) -> Result<()> {
        let cstr = CString::new(value).map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
        unsafe {
            let mut v = vhpiValueT {
                format: vhpiStrVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { str_: cstr.as_ptr() as *mut _ },
            };
            let rc = vhpi_put_value(self.handle, &mut v, action_mode(action));
            check(rc)
        }
    }

    fn set_binstr(&self, value: &str, action: Action) -> Result<()> {
        let cstr = CString::new(value).map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
        unsafe {
            let mut v = vhpiValueT {
                format: vhpiBinStrVal,
                bufSize: 0,
                numElems: 0,
                value: u_vhpi_value { str_: cstr.as_ptr() as *mut _ },
            };
            let rc = vhpi_put_value(self.handle, &mut v, action_mode(action));
            check(rc)
        }
    }

    fn register_value_change_cb(
        &self,
        edge: Edge,
        f: gpi_core::CallbackFn,
        data: gpi_core::UserData,
    ) -> Result<gpi_core::CallbackHandle> {
        VhpiValueChangeCb::arm_new(self.handle, edge, f, data)
    }

    fn iterate_native(&self, selector: IterSelector) -> Option<Box<dyn gpi_core::IteratorImpl>> {
        match selector {
            IterSelector::Objects => Some(Box::new(VhpiRelationIterator::new(self.handle, self.kind))),
            IterSelector::Drivers => Some(Box::new(VhpiSingleIterator::new(self.handle, vhpiDrivers))),
            IterSelector::Loads => Some(Box::new(VhpiSingleIterator::new(self.handle, vhpiLoads))),
        }
    }
}

fn action_mode(action: Action) -> vhpiPutValueModeT {
    match action {
        Action::Deposit | Action::NoDelay => vhpiDeposit,
        Action::Force => vhpiForcePropagate,
        Action::Release => vhpiRelease,
    }
}

fn check(rc: i32) -> Result<()> {
    if rc != 0 {
        Err(GpiError::Simulator {
            level: gpi_core::ErrorLevel::Error,
            message: "vhpi_put_value failed".to_string(),
        })
    } else {
        Ok(())
    }
}

pub fn wrap(handle: vhpiHandleT, kind_code: vhpiClassKindT, name: String, fullname: String) -> ObjectHandle {
    ObjectHandle::new(std::sync::Arc::new(VhpiObj::new(handle, kind_code, name, fullname)))
}
