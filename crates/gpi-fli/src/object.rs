//! FLI object handles. FLI splits every value-bearing object into a
//! "signal" family (driven, has a driver/load relationship, supports
//! `mti_Sensitize`) and a "variable" family (plain shared-variable storage,
//! no sensitivity) with almost entirely parallel accessor calls; `FliTarget`
//! collapses that split into one enum so the rest of the backend doesn't
//! have to duplicate itself across a pair of near-identical per-kind types.

use std::ffi::{c_int, c_void, CStr, CString};

use gpi_core::{
    Action, Edge, GpiError, IterSelector, NativeHandle, ObjectHandle, ObjectKind, ObjectOps, PathStyle, Range,
    RangeDir, Result,
};

use crate::callback::FliValueChangeCb;
use crate::ffi::*;
use crate::iterator::FliRelationIterator;

#[derive(Debug, Clone, Copy)]
pub enum FliTarget {
    Signal(mtiSignalIdT),
    Variable(mtiVariableIdT),
}

impl FliTarget {
    fn value_type(&self) -> mtiTypeIdT {
        unsafe {
            match *self {
                FliTarget::Signal(s) => mti_GetSignalType(s),
                FliTarget::Variable(v) => mti_GetVariableType(v),
            }
        }
    }

    fn tick_length(&self) -> i32 {
        unsafe {
            let type_ = match *self {
                FliTarget::Signal(s) => mti_GetSignalType(s),
                FliTarget::Variable(v) => mti_GetVariableType(v),
            };
            mti_TickLength(type_)
        }
    }

    fn is_const(&self) -> bool {
        match self {
            FliTarget::Signal(_) => false,
            FliTarget::Variable(v) => unsafe { mti_IsConst(mti_GetVariableType(*v)) != 0 },
        }
    }

    fn get_scalar(&self) -> i64 {
        unsafe {
            match *self {
                FliTarget::Signal(s) => mti_GetSignalValue(s) as i64,
                FliTarget::Variable(v) => mti_GetVariableValue(v) as i64,
            }
        }
    }

    fn get_real(&self) -> f64 {
        unsafe {
            match *self {
                FliTarget::Signal(s) => mti_GetRealSignalValue(s),
                FliTarget::Variable(v) => mti_GetRealVariableValue(v),
            }
        }
    }

    /// `Deposit`/`NoDelay` schedule a driver update the usual way; `Force`
    /// builds the VHDL literal form `mti_ForceSignal` expects (see
    /// `gpi_core::codec::vhdl_force_literal_integer`) since FLI has no
    /// typed put-value primitive the way VPI/VHPI do; `Release` calls the
    /// native release. Variables have no force/release concept of their
    /// own (`mti_IsConst`/`mti_SetVariable` is the whole of their write
    /// surface), so `Force`/`Release` on one is a plain deposit.
    fn set_scalar(&self, value: i64, action: Action) -> Result<()> {
        match *self {
            FliTarget::Signal(s) => unsafe {
                match action {
                    Action::Deposit | Action::NoDelay => {
                        mti_ScheduleDriver(s, value, 0, 0);
                        Ok(())
                    }
                    Action::Force => {
                        let literal = CString::new(gpi_core::codec::vhdl_force_literal_integer(value))
                            .map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
                        let rc = mti_ForceSignal(s, literal.as_ptr(), 0, MTI_FORCE_DEPOSIT, 0, 0);
                        check(rc)
                    }
                    Action::Release => check(mti_ReleaseSignal(s)),
                }
            },
            FliTarget::Variable(v) => {
                if self.is_const() {
                    return Err(GpiError::ConstViolation);
                }
                unsafe {
                    mti_SetVariable(v, value);
                }
                Ok(())
            }
        }
    }

    /// Same action handling as [`FliTarget::set_scalar`] but for an array
    /// (`std_logic_vector`/record) signal or variable, via the array-typed
    /// native accessors.
    fn set_array(&self, binstr: &str, action: Action) -> Result<()> {
        let cstr = CString::new(binstr).map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
        match *self {
            FliTarget::Signal(s) => unsafe {
                match action {
                    Action::Deposit | Action::NoDelay => {
                        mti_ScheduleArrayDriver(s, cstr.as_ptr() as *const c_void, 0, 0);
                        Ok(())
                    }
                    Action::Force => {
                        let literal = CString::new(gpi_core::codec::vhdl_force_literal_binstr(binstr))
                            .map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
                        let rc = mti_ForceSignal(s, literal.as_ptr(), 0, MTI_FORCE_DEPOSIT, 0, 0);
                        check(rc)
                    }
                    Action::Release => check(mti_ReleaseSignal(s)),
                }
            },
            FliTarget::Variable(v) => {
                if self.is_const() {
                    return Err(GpiError::ConstViolation);
                }
                unsafe {
                    mti_SetArrayVariable(v, cstr.as_ptr() as *const c_void);
                }
                Ok(())
            }
        }
    }

    /// Reals have no force/release literal form in this adapter; only
    /// deposit is meaningful.
    fn set_real(&self, value: f64) -> Result<()> {
        match *self {
            FliTarget::Signal(s) => unsafe {
                mti_ScheduleRealDriver(s, value, 0, 0);
                Ok(())
            },
            FliTarget::Variable(v) => {
                if self.is_const() {
                    return Err(GpiError::ConstViolation);
                }
                unsafe {
                    mti_SetRealVariable(v, value);
                }
                Ok(())
            }
        }
    }

    fn native(&self) -> NativeHandle {
        let ptr = match *self {
            FliTarget::Signal(s) => s,
            FliTarget::Variable(v) => v,
        };
        unsafe { NativeHandle::from_raw(ptr as *mut c_void) }
    }
}

pub fn typekind_to_kind(type_: mtiTypeIdT) -> ObjectKind {
    unsafe {
        match mti_GetTypeKind(type_) {
            MTI_TYPE_SCALAR => ObjectKind::Logic,
            MTI_TYPE_ARRAY => ObjectKind::Array,
            MTI_TYPE_RECORD => ObjectKind::Structure,
            MTI_TYPE_ENUM => gpi_core::codec::classify_enum_literals(&enum_literal_names(type_)),
            MTI_TYPE_PHYSICAL => ObjectKind::Integer,
            MTI_TYPE_REAL => ObjectKind::Real,
            _ => ObjectKind::Unknown,
        }
    }
}

/// Ordered literal names of an `MTI_TYPE_ENUM` type, via
/// `mti_GetNumEnumValues`/`mti_GetEnumValues`.
unsafe fn enum_literal_names(type_: mtiTypeIdT) -> Vec<String> {
    let n = mti_GetNumEnumValues(type_).max(0);
    (0..n).map(|i| cstr_to_string(mti_GetEnumValues(type_, i))).collect()
}

#[derive(Debug)]
pub struct FliRegionObj {
    handle: mtiRegionIdT,
    name: String,
    fullname: String,
}

impl FliRegionObj {
    pub fn new(handle: mtiRegionIdT, name: String, fullname: String) -> Self {
        FliRegionObj { handle, name, fullname }
    }
}

impl ObjectOps for FliRegionObj {
    fn backend_name(&self) -> &'static str {
        "fli"
    }
    fn native(&self) -> NativeHandle {
        unsafe { NativeHandle::from_raw(self.handle as *mut c_void) }
    }
    fn path_style(&self) -> PathStyle {
        PathStyle::Vhdl
    }
    fn kind(&self) -> ObjectKind {
        ObjectKind::Module
    }
    fn is_const(&self) -> bool {
        true
    }
    fn indexable(&self) -> bool {
        false
    }
    fn num_elems(&self) -> Option<u32> {
        None
    }
    fn range(&self) -> Option<Range> {
        None
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn fullname(&self) -> &str {
        &self.fullname
    }
    fn iterate_native(&self, selector: IterSelector) -> Option<Box<dyn gpi_core::IteratorImpl>> {
        match selector {
            IterSelector::Objects => Some(Box::new(FliRelationIterator::new_region(self.handle))),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct FliValueObj {
    target: FliTarget,
    kind: ObjectKind,
    name: String,
    fullname: String,
    is_const: bool,
    num_elems: Option<u32>,
}

impl FliValueObj {
    pub fn new(target: FliTarget, name: String, fullname: String) -> Self {
        let kind = typekind_to_kind(target.value_type());
        let is_const = target.is_const();
        let num_elems = if matches!(kind, ObjectKind::Array | ObjectKind::Structure) {
            Some(target.tick_length().max(0) as u32)
        } else {
            None
        };
        FliValueObj {
            target,
            kind,
            name,
            fullname,
            is_const,
            num_elems,
        }
    }
}

impl ObjectOps for FliValueObj {
    fn backend_name(&self) -> &'static str {
        "fli"
    }

    fn native(&self) -> NativeHandle {
        self.target.native()
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
        matches!(self.kind, ObjectKind::Array | ObjectKind::Structure)
    }

    fn num_elems(&self) -> Option<u32> {
        self.num_elems
    }

    fn range(&self) -> Option<Range> {
        self.num_elems.map(|n| Range::new(n as i32 - 1, 0, RangeDir::Downto))
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
        if let Some(n) = self.num_elems {
            let mut buf = vec![0u8; n as usize + 1];
            let rc = unsafe {
                match self.target {
                    FliTarget::Signal(s) => mti_GetArraySignalValue(s, buf.as_mut_ptr() as *mut c_void),
                    FliTarget::Variable(v) => mti_GetArrayVariableValue(v, buf.as_mut_ptr() as *mut c_void),
                }
            };
            if rc == 0 {
                return None;
            }
            buf.pop();
            Some(String::from_utf8_lossy(&buf).into_owned())
        } else {
            let v = self.target.get_scalar();
            Some(gpi_core::codec::binstr_from_int(v, 1))
        }
    }

    fn get_real(&self) -> Option<f64> {
        if self.kind != ObjectKind::Real {
            return None;
        }
        Some(self.target.get_real())
    }

    fn get_long(&self) -> Option<i64> {
        if !matches!(self.kind, ObjectKind::Integer | ObjectKind::Enum) {
            return None;
        }
        Some(self.target.get_scalar())
    }

    fn set_long(&self, value: i64, action: Action) -> Result<()> {
        self.target.set_scalar(value, action)
    }

    fn set_real(&self, value: f64, _action: Action) -> Result<()> {
        if self.kind != ObjectKind::Real {
            return Err(GpiError::Unsupported);
        }
        self.target.set_real(value)
    }

    fn set_str(&self, value: &[u8], _action: Action) -> Result<()> {
        let _ = CString::new(value).map_err(|e| GpiError::TypeCoercion(e.to_string()))?;
        Err(GpiError::Unsupported)
    }

    fn set_binstr(&self, value: &str, action: Action) -> Result<()> {
        if self.num_elems.is_some() {
            self.target.set_array(value, action)
        } else {
            let as_int = gpi_core::codec::int_from_binstr(value);
            self.target.set_scalar(as_int, action)
        }
    }

    fn register_value_change_cb(
        &self,
        edge: Edge,
        f: gpi_core::CallbackFn,
        data: gpi_core::UserData,
    ) -> Result<gpi_core::CallbackHandle> {
        match self.target {
            FliTarget::Signal(s) => FliValueChangeCb::arm_new(s, edge, f, data),
            FliTarget::Variable(_) => Err(GpiError::Unsupported),
        }
    }

    fn iterate_native(&self, _selector: IterSelector) -> Option<Box<dyn gpi_core::IteratorImpl>> {
        None
    }
}

fn check(rc: c_int) -> Result<()> {
    if rc == 0 {
        Err(GpiError::Simulator {
            level: gpi_core::ErrorLevel::Error,
            message: "mti_ForceSignal/mti_ReleaseSignal failed".to_string(),
        })
    } else {
        Ok(())
    }
}

unsafe fn cstr_to_string(p: *mut std::ffi::c_char) -> String {
    if p.is_null() {
        String::new()
    } else {
        CStr::from_ptr(p).to_string_lossy().into_owned()
    }
}

pub fn wrap_region(handle: mtiRegionIdT) -> ObjectHandle {
    unsafe {
        let name = cstr_to_string(mti_RegionName(handle));
        let fullname = cstr_to_string(mti_RegionFullName(handle));
        ObjectHandle::new(std::sync::Arc::new(FliRegionObj::new(handle, name, fullname)))
    }
}

pub fn wrap_signal(handle: mtiSignalIdT, fullname: String) -> ObjectHandle {
    let name = unsafe { cstr_to_string(mti_SignalName(handle)) };
    ObjectHandle::new(std::sync::Arc::new(FliValueObj::new(FliTarget::Signal(handle), name, fullname)))
}

pub fn wrap_variable(handle: mtiVariableIdT, fullname: String) -> ObjectHandle {
    let name = unsafe { cstr_to_string(mti_VariableName(handle)) };
    ObjectHandle::new(std::sync::Arc::new(FliValueObj::new(FliTarget::Variable(handle), name, fullname)))
}
