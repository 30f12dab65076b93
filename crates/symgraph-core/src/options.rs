//! Build configuration.
//!
//! The reflected program talks to the builder through naming conventions:
//! a registration function overload per reflected type, a type accessor
//! template, and marker functions that carry attribute annotations.
//! [`BuildOptions`] holds those names so a program using different macros can
//! still be read.

use crate::symbols::ANONYMOUS_TAG;

/// Name of the overloaded function whose parameters register reflected types.
pub const DEFAULT_REGISTRATION_FN: &str = "RflReflectedTypesTable";

/// Template whose instantiation per type holds the type object static.
pub const DEFAULT_ACCESSOR: &str = "rfl::TypeOf";

pub const DEFAULT_PUSH_PREFIX: &str = "PushRflAttributes__";
pub const DEFAULT_SET_PREFIX: &str = "SetRflAttributes__";
pub const DEFAULT_POP_PREFIX: &str = "PopRflAttributes__";

/// Naming conventions used while reading symbols and walking members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions
{
    pub registration_fn: String,
    pub accessor: String,
    /// Marker opening an attribute scope.
    pub push_prefix: String,
    /// Marker opening a scope that closes after the next field or function.
    pub set_prefix: String,
    /// Marker closing the innermost scope.
    pub pop_prefix: String,
    /// Name the symbol source gives anonymous enums and classes.
    pub anonymous_tag: String,
}

impl Default for BuildOptions
{
    fn default() -> Self
    {
        Self {
            registration_fn: DEFAULT_REGISTRATION_FN.to_string(),
            accessor: DEFAULT_ACCESSOR.to_string(),
            push_prefix: DEFAULT_PUSH_PREFIX.to_string(),
            set_prefix: DEFAULT_SET_PREFIX.to_string(),
            pop_prefix: DEFAULT_POP_PREFIX.to_string(),
            anonymous_tag: ANONYMOUS_TAG.to_string(),
        }
    }
}

impl BuildOptions
{
    #[must_use]
    pub fn with_registration_fn(mut self, name: impl Into<String>) -> Self
    {
        self.registration_fn = name.into();
        self
    }

    #[must_use]
    pub fn with_accessor(mut self, name: impl Into<String>) -> Self
    {
        self.accessor = name.into();
        self
    }

    /// Which marker `function_name` is, if any.
    pub fn marker(&self, function_name: &str) -> Option<Marker>
    {
        if function_name.starts_with(&self.push_prefix) {
            Some(Marker::Push)
        } else if function_name.starts_with(&self.set_prefix) {
            Some(Marker::Set)
        } else if function_name.starts_with(&self.pop_prefix) {
            Some(Marker::Pop)
        } else {
            None
        }
    }
}

/// Attribute marker functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker
{
    Push,
    Set,
    Pop,
}
