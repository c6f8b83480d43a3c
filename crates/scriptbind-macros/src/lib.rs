//! Proc macros for scriptbind.
//!
//! # Example
//!
//! ```ignore
//! use scriptbind::NativeClass;
//!
//! #[derive(Clone, NativeClass)]
//! #[native(name = "Point")]
//! pub struct Point {
//!     #[native(get, set)]
//!     pub x: i64,
//!     #[native(get)]
//!     pub y: i64,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_native_class;

/// Derive `NativeClass`, `ClassMembers` and by-value conversions for a struct.
///
/// # Attributes
///
/// - `#[native(name = "...")]` - Override the script-side class name
/// - `#[native(opaque)]` - Do not generate `ToScript`/`FromScript`; the
///   class can then only be created through its constructor
///
/// Without `opaque` the type must implement `Clone`: reading an instance
/// out of a call argument clones it.
///
/// # Field Attributes
///
/// - `#[native(get)]` - Expose the field read-only
/// - `#[native(get, set)]` - Expose the field with a getter and a `set_` setter
/// - `#[native(name = "...")]` - Override the member name
///
/// `set` on its own implies `get`. Fields are bound in declaration order.
#[proc_macro_derive(NativeClass, attributes(native))]
pub fn derive_native_class(input: TokenStream) -> TokenStream {
    derive_native_class::derive_native_class_impl(input)
}
