//! Conversion traits for argument extraction and return value handling.
//!
//! - [`FromScript`]: read a Rust value out of a call-stack slot
//! - [`ToScript`]: turn a Rust value into a call-stack slot
//!
//! Both traits see the [`Runtime`]: registered native classes travel as
//! handles to userdata buffers, so converting one needs the heap and the
//! type-tag table.
//!
//! ## Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `u64`
//! - Floats: `f32`, `f64`
//! - `bool`, `String`, `&str` (return only), `()`
//! - [`Dynamic`] itself and `Option<T>` (`Nil` is `None`)

use crate::error::ConversionError;
use crate::runtime::{Dynamic, Runtime};

/// Extract a value from a call-stack slot.
pub trait FromScript: Sized {
    /// Extract a value from the given slot.
    ///
    /// Returns a `ConversionError` if the slot contains an incompatible type.
    fn from_vm(slot: &Dynamic, runtime: &Runtime) -> Result<Self, ConversionError>;
}

/// Convert a value into a call-stack slot.
pub trait ToScript {
    /// Convert this value into a slot, allocating in the runtime if needed.
    fn to_vm(self, runtime: &mut Runtime) -> Result<Dynamic, ConversionError>;
}

fn mismatch(expected: &'static str, slot: &Dynamic) -> ConversionError {
    if slot.is_nil() {
        ConversionError::NilValue {
            target_type: expected,
        }
    } else {
        ConversionError::TypeMismatch {
            expected,
            actual: slot.type_name(),
        }
    }
}

// ============================================================================
// Integers
// ============================================================================

macro_rules! impl_script_int {
    ($($ty:ty),*) => {
        $(
            impl FromScript for $ty {
                fn from_vm(slot: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
                    match slot {
                        Dynamic::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(mismatch("int", slot)),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_script_int_lossless {
    ($($ty:ty),*) => {
        $(
            impl ToScript for $ty {
                fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
                    Ok(Dynamic::Int(i64::from(self)))
                }
            }
        )*
    };
}

impl_script_int!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_script_int_lossless!(i8, i16, i32, i64, u8, u16, u32);

/// Script ints are `i64`; values above `i64::MAX` are rejected.
impl ToScript for u64 {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        i64::try_from(self)
            .map(Dynamic::Int)
            .map_err(|_| ConversionError::Failed {
                message: format!("{self} does not fit in a script int"),
            })
    }
}

// ============================================================================
// Floats
// ============================================================================

impl FromScript for f32 {
    fn from_vm(slot: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Float(v) => {
                if v.is_finite() && (*v > f32::MAX as f64 || *v < f32::MIN as f64) {
                    Err(ConversionError::FloatConversion {
                        value: *v,
                        target_type: "f32",
                    })
                } else {
                    Ok(*v as f32)
                }
            }
            Dynamic::Int(v) => Ok(*v as f32),
            _ => Err(mismatch("float", slot)),
        }
    }
}

impl ToScript for f32 {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::Float(self as f64))
    }
}

impl FromScript for f64 {
    fn from_vm(slot: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Float(v) => Ok(*v),
            Dynamic::Int(v) => Ok(*v as f64),
            _ => Err(mismatch("float", slot)),
        }
    }
}

impl ToScript for f64 {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::Float(self))
    }
}

// ============================================================================
// Other primitives
// ============================================================================

impl FromScript for bool {
    fn from_vm(slot: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Bool(v) => Ok(*v),
            _ => Err(mismatch("bool", slot)),
        }
    }
}

impl ToScript for bool {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::Bool(self))
    }
}

impl FromScript for String {
    fn from_vm(slot: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", slot)),
        }
    }
}

impl ToScript for String {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::String(self))
    }
}

impl ToScript for &str {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::String(self.to_string()))
    }
}

impl FromScript for () {
    fn from_vm(_slot: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        Ok(())
    }
}

impl ToScript for () {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::Nil)
    }
}

impl FromScript for Dynamic {
    fn from_vm(slot: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        Ok(slot.clone())
    }
}

impl ToScript for Dynamic {
    fn to_vm(self, _runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        Ok(self)
    }
}

impl<T: FromScript> FromScript for Option<T> {
    fn from_vm(slot: &Dynamic, runtime: &Runtime) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Nil => Ok(None),
            _ => T::from_vm(slot, runtime).map(Some),
        }
    }
}

impl<T: ToScript> ToScript for Option<T> {
    fn to_vm(self, runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        match self {
            Some(value) => value.to_vm(runtime),
            None => Ok(Dynamic::Nil),
        }
    }
}
