//! Runtime value type for call-stack slots.

use std::fmt;

use super::ObjectHandle;

/// A dynamic value that can be stored in a call-stack slot.
///
/// Native class instances never live inline in a slot: they are placed in a
/// userdata buffer owned by the [`ObjectHeap`](super::ObjectHeap) and the slot
/// holds an [`ObjectHandle`] to it.
#[derive(Clone, Default, PartialEq)]
pub enum Dynamic {
    /// Absence of a value
    #[default]
    Nil,
    /// Integer value (all integer widths are stored as i64)
    Int(i64),
    /// Floating point value (f32 and f64 are stored as f64)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// String value (owned)
    String(String),
    /// Handle to a userdata buffer
    Object(ObjectHandle),
}

impl Dynamic {
    /// Get a human-readable name for this slot's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Nil => "nil",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::Bool(_) => "bool",
            Dynamic::String(_) => "string",
            Dynamic::Object(_) => "object",
        }
    }

    /// Check if this slot is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Dynamic::Nil)
    }

    /// The object handle held by this slot, if any.
    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            Dynamic::Object(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Nil => write!(f, "Nil"),
            Dynamic::Int(v) => write!(f, "Int({})", v),
            Dynamic::Float(v) => write!(f, "Float({})", v),
            Dynamic::Bool(v) => write!(f, "Bool({})", v),
            Dynamic::String(s) => write!(f, "String({:?})", s),
            Dynamic::Object(h) => write!(f, "Object({}:{})", h.index, h.generation),
        }
    }
}

impl From<i64> for Dynamic {
    fn from(value: i64) -> Self {
        Dynamic::Int(value)
    }
}

impl From<i32> for Dynamic {
    fn from(value: i32) -> Self {
        Dynamic::Int(value as i64)
    }
}

impl From<f64> for Dynamic {
    fn from(value: f64) -> Self {
        Dynamic::Float(value)
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<ObjectHandle> for Dynamic {
    fn from(value: ObjectHandle) -> Self {
        Dynamic::Object(value)
    }
}
