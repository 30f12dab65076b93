//! The reflection model produced by one build.

use super::name::{Name, NameTable};
use super::namespace::split_qualified;
use super::scope::{Scope, ScopeCategory, ScopeChildren, ScopeId, ScopeKind};
use super::types::{Function, TypeInfo, TypeKind};
use crate::error::{Result, SymgraphError};
use crate::types::Address;

/// Local name of the root namespace.
pub const GLOBAL_NAMESPACE: &str = "Global";

/// Everything a type needs at creation time.
#[derive(Debug, Clone)]
pub(crate) struct NewType
{
    pub size: u64,
    pub type_of_address: Address,
    pub kind: TypeKind,
}

/// Arena of scopes rooted at the global namespace, plus the name table.
///
/// A `Module` is created fresh for every build; nothing in it is shared with
/// other builds.
#[derive(Debug)]
pub struct Module
{
    names: NameTable,
    scopes: Vec<Scope>,
    next_unique_id: u32,
}

impl Default for Module
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl Module
{
    #[must_use]
    pub fn new() -> Self
    {
        let mut names = NameTable::new();
        let name = names.intern(GLOBAL_NAMESPACE);
        let root = Scope {
            name,
            full_name: Name::new(""),
            parent: None,
            children: ScopeChildren::default(),
            functions: Vec::new(),
            kind: ScopeKind::Namespace,
        };

        Self {
            names,
            scopes: vec![root],
            next_unique_id: 0,
        }
    }

    /// The global namespace.
    pub fn root(&self) -> ScopeId
    {
        ScopeId::from_raw(0)
    }

    /// Get a scope by id.
    ///
    /// ## Panics
    ///
    /// Ids are only handed out by this module, so an id from another module
    /// may be out of range and panic.
    pub fn scope(&self, id: ScopeId) -> &Scope
    {
        &self.scopes[id.index()]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope
    {
        &mut self.scopes[id.index()]
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope>
    {
        self.scopes.get(id.index())
    }

    pub fn type_info(&self, id: ScopeId) -> Option<&TypeInfo>
    {
        self.get(id).and_then(Scope::as_type)
    }

    pub(crate) fn type_info_mut(&mut self, id: ScopeId) -> Option<&mut TypeInfo>
    {
        self.scopes.get_mut(id.index()).and_then(Scope::as_type_mut)
    }

    pub fn names(&self) -> &NameTable
    {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameTable
    {
        &mut self.names
    }

    /// Every scope, in creation order.
    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)>
    {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId::from_raw(index as u32), scope))
    }

    /// Every type, in creation order (which is also `unique_id` order).
    pub fn types(&self) -> impl Iterator<Item = (ScopeId, &Scope, &TypeInfo)>
    {
        self.scopes()
            .filter_map(|(id, scope)| scope.as_type().map(|info| (id, scope, info)))
    }

    pub fn type_count(&self) -> usize
    {
        self.next_unique_id as usize
    }

    /// Find a direct child by category and local name.
    pub fn find_child(&self, parent: ScopeId, category: ScopeCategory, name: &str) -> Option<ScopeId>
    {
        self.scope(parent)
            .children
            .get(category)
            .iter()
            .copied()
            .find(|&child| self.scope(child).name.text() == name)
    }

    /// Resolve a qualified name without creating anything.
    ///
    /// Namespaces are followed for every leading segment, then the local name
    /// is matched against every child category of the final scope (types
    /// first, in [`ScopeCategory::ALL`] order after namespaces). Class scopes
    /// are searched as well so nested types resolve.
    pub fn find(&self, qualified: &str) -> Option<ScopeId>
    {
        let (segments, local) = split_qualified(qualified);
        let mut current = self.root();
        for segment in segments {
            current = self
                .scope(current)
                .children
                .iter()
                .map(|(_, child)| child)
                .find(|&child| {
                    let scope = self.scope(child);
                    scope.name.text() == segment
                        && matches!(scope.category(), ScopeCategory::Namespace | ScopeCategory::Class)
                })?;
        }

        let children = &self.scope(current).children;
        ScopeCategory::ALL[1..]
            .iter()
            .chain(std::iter::once(&ScopeCategory::Namespace))
            .find_map(|&category| {
                children
                    .get(category)
                    .iter()
                    .copied()
                    .find(|&child| self.scope(child).name.text() == local)
            })
    }

    pub(crate) fn add_namespace(&mut self, parent: ScopeId, name: &str) -> ScopeId
    {
        self.push_scope(parent, name, ScopeKind::Namespace)
    }

    /// Create a type under `parent` and hand it the next unique id.
    pub(crate) fn add_type(&mut self, parent: ScopeId, name: &str, new_type: NewType) -> ScopeId
    {
        let unique_id = self.next_unique_id;
        self.next_unique_id += 1;

        let info = TypeInfo {
            unique_id,
            size: new_type.size,
            type_of_address: new_type.type_of_address,
            minimal_reflection: false,
            special: Default::default(),
            kind: new_type.kind,
        };
        self.push_scope(parent, name, ScopeKind::Type(info))
    }

    fn push_scope(&mut self, parent: ScopeId, name: &str, kind: ScopeKind) -> ScopeId
    {
        let parent_scope = self.scope(parent);
        let full_name = if parent_scope.parent.is_none() {
            name.to_string()
        } else {
            format!("{}::{name}", parent_scope.full_name.text())
        };

        let scope = Scope {
            name: self.names.intern(name),
            full_name: self.names.intern(&full_name),
            parent: Some(parent),
            children: ScopeChildren::default(),
            functions: Vec::new(),
            kind,
        };
        let category = scope.category();

        let id = ScopeId::from_raw(self.scopes.len() as u32);
        self.scopes.push(scope);
        self.scope_mut(parent).children.push(category, id);
        id
    }

    pub(crate) fn push_function(&mut self, owner: ScopeId, function: Function) -> usize
    {
        let functions = &mut self.scope_mut(owner).functions;
        functions.push(function);
        functions.len() - 1
    }

    /// Patch the type accessor address after the build.
    ///
    /// This is the one mutation downstream consumers are allowed to make.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidArgument` if `id` is not a type.
    pub fn patch_type_of_address(&mut self, id: ScopeId, address: Address) -> Result<()>
    {
        let info = self
            .type_info_mut(id)
            .ok_or_else(|| SymgraphError::InvalidArgument(format!("scope {id} is not a type")))?;
        info.type_of_address = address;
        Ok(())
    }
}
