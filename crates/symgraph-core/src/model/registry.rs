//! Fully-qualified type name lookup.

use std::collections::HashMap;

use super::scope::ScopeId;

/// Maps the literal, fully-qualified name of every reflected type to its node.
///
/// Template instances are keyed by their instantiated name exactly as the
/// symbol source spells it (`Vector<Foo>`), so repeated references resolve to
/// one instance.
#[derive(Debug, Default)]
pub struct TypeRegistry
{
    types: HashMap<String, ScopeId>,
}

impl TypeRegistry
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn get(&self, full_name: &str) -> Option<ScopeId>
    {
        self.types.get(full_name).copied()
    }

    pub fn contains(&self, full_name: &str) -> bool
    {
        self.types.contains_key(full_name)
    }

    /// Register a type.
    ///
    /// ## Errors
    ///
    /// Returns the id already registered under `full_name`; the registry is
    /// left unchanged in that case.
    pub fn insert(&mut self, full_name: impl Into<String>, id: ScopeId) -> Result<(), ScopeId>
    {
        use std::collections::hash_map::Entry;

        match self.types.entry(full_name.into()) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize
    {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.types.is_empty()
    }
}
