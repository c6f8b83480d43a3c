//! Error types for the runtime and the marshalling layer.

use thiserror::Error;

use crate::runtime::TagId;

/// Errors that can occur when converting between Rust and script values.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Integer overflow during conversion
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i64, target_type: &'static str },

    /// Float conversion error
    #[error("float conversion error: value {value} cannot be represented as {target_type}")]
    FloatConversion {
        value: f64,
        target_type: &'static str,
    },

    /// Attempted to convert nil to a non-optional type
    #[error("nil cannot be converted to {target_type}")]
    NilValue { target_type: &'static str },

    /// A native class value crossed the boundary before its class was registered
    #[error("class {type_name} has no type tag in this runtime")]
    UnregisteredClass { type_name: &'static str },

    /// Generic conversion failure
    #[error("conversion failed: {message}")]
    Failed { message: String },
}

/// Errors that can occur during native function execution.
#[derive(Debug, Error)]
pub enum NativeError {
    /// Error converting arguments or return values
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Invalid `this` reference for method call
    #[error("invalid 'this' reference: {message}")]
    InvalidThis { message: String },

    /// Argument index out of bounds
    #[error("argument index {index} out of bounds (function has {count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// Call made with the wrong number of arguments
    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// Userdata buffer could not be used
    #[error("heap error: {0}")]
    Heap(#[from] HeapError),

    /// Generic native error
    #[error("native error: {message}")]
    Other { message: String },
}

impl NativeError {
    /// Create an "invalid this" error with a message.
    pub fn invalid_this(message: impl Into<String>) -> Self {
        NativeError::InvalidThis {
            message: message.into(),
        }
    }

    /// Create a generic native error.
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other {
            message: message.into(),
        }
    }
}

/// Errors raised by the userdata heap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeapError {
    /// The handle refers to a freed buffer
    #[error("stale object handle: object at index {index} has been freed")]
    StaleHandle { index: u32 },

    /// A value was constructed twice into the same buffer
    #[error("buffer at index {index} already holds a value")]
    AlreadyInitialized { index: u32 },

    /// The buffer layout does not match the type being constructed
    #[error(
        "buffer at index {index} is {buffer_size} bytes (align {buffer_align}), \
         {type_name} needs {type_size} bytes (align {type_align})"
    )]
    LayoutMismatch {
        index: u32,
        type_name: &'static str,
        buffer_size: usize,
        buffer_align: usize,
        type_size: usize,
        type_align: usize,
    },
}

/// Errors raised by the type-tag table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    /// No more type tags can be created
    #[error("type tag limit of {limit} reached")]
    Exhausted { limit: u32 },

    /// The tag id does not belong to this table
    #[error("unknown type tag {tag}")]
    UnknownTag { tag: TagId },
}

/// Errors surfaced to the script side when invoking bound entries.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No type tag is bound to the class name
    #[error("unknown class '{name}'")]
    UnknownClass { name: String },

    /// The class or instance has no entry under the key
    #[error("'{class}' has no member '{member}'")]
    UnknownMember { class: String, member: String },

    /// Member lookup on a value that is not an object
    #[error("attempt to index a {actual} value")]
    NotAnObject { actual: &'static str },

    /// Member lookup on an object without a type tag
    #[error("object at index {index} has no type tag")]
    Untagged { index: u32 },

    /// The bound native callable failed
    #[error(transparent)]
    Native(#[from] NativeError),
}
