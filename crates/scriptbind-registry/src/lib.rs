//! Class binding records.
//!
//! Every native type that has been exposed to a runtime gets one
//! [`ClassBinding`] in a [`ClassRegistry`]: the name it was registered
//! under, whether registration completed, and the [`CallableStore`] its
//! bound callables were collected into. A process-wide registry lives in
//! [`global`].

mod callable_store;
mod error;
pub mod global;
mod registry;

pub use callable_store::CallableStore;
pub use error::RegistrationError;
pub use global::{is_registered, registered_name};
pub use registry::{ClassBinding, ClassRegistry};
