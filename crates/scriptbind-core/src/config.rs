//! Runtime configuration.

/// Settings a [`Runtime`](crate::Runtime) is created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Reject calls that pass more arguments than the bound signature takes.
    ///
    /// Calls with too few arguments are rejected either way.
    pub strict_arity: bool,
    /// Upper bound on the number of type tags the runtime will create.
    pub max_type_tags: u32,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self {
            strict_arity: true,
            max_type_tags: u32::MAX,
        }
    }

    pub fn with_strict_arity(mut self, strict: bool) -> Self {
        self.strict_arity = strict;
        self
    }

    pub fn with_max_type_tags(mut self, limit: u32) -> Self {
        self.max_type_tags = limit;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
