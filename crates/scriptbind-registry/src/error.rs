use scriptbind_core::TagError;
use thiserror::Error;

/// Errors that abort the registration of a class.
///
/// When registration fails nothing is recorded for the class.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// Classes need a name to be reachable from scripts
    #[error("class name cannot be empty")]
    EmptyName,

    /// The runtime could not provide a type tag
    #[error("type tag error: {0}")]
    Tag(#[from] TagError),
}
