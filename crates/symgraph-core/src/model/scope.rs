//! Scope tree nodes.

use std::fmt;

use super::name::Name;
use super::types::{Function, TypeInfo, TypeKind};

/// Index of a scope inside its [`Module`](super::Module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId
{
    #[must_use]
    pub const fn from_raw(value: u32) -> Self
    {
        Self(value)
    }

    #[must_use]
    pub const fn raw(self) -> u32
    {
        self.0
    }

    pub(crate) fn index(self) -> usize
    {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// Child collections of a scope, in the fixed order emitters walk them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeCategory
{
    Namespace,
    BaseType,
    Class,
    Template,
    TemplateInstance,
    Enum,
}

impl ScopeCategory
{
    pub const ALL: [ScopeCategory; 6] = [
        ScopeCategory::Namespace,
        ScopeCategory::BaseType,
        ScopeCategory::Class,
        ScopeCategory::Template,
        ScopeCategory::TemplateInstance,
        ScopeCategory::Enum,
    ];

    pub fn label(self) -> &'static str
    {
        match self {
            ScopeCategory::Namespace => "namespaces",
            ScopeCategory::BaseType => "base_types",
            ScopeCategory::Class => "classes",
            ScopeCategory::Template => "templates",
            ScopeCategory::TemplateInstance => "template_instances",
            ScopeCategory::Enum => "enums",
        }
    }
}

/// Ordered child lists, one per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeChildren
{
    namespaces: Vec<ScopeId>,
    base_types: Vec<ScopeId>,
    classes: Vec<ScopeId>,
    templates: Vec<ScopeId>,
    template_instances: Vec<ScopeId>,
    enums: Vec<ScopeId>,
}

impl ScopeChildren
{
    pub fn get(&self, category: ScopeCategory) -> &[ScopeId]
    {
        match category {
            ScopeCategory::Namespace => &self.namespaces,
            ScopeCategory::BaseType => &self.base_types,
            ScopeCategory::Class => &self.classes,
            ScopeCategory::Template => &self.templates,
            ScopeCategory::TemplateInstance => &self.template_instances,
            ScopeCategory::Enum => &self.enums,
        }
    }

    pub(crate) fn push(&mut self, category: ScopeCategory, id: ScopeId)
    {
        let list = match category {
            ScopeCategory::Namespace => &mut self.namespaces,
            ScopeCategory::BaseType => &mut self.base_types,
            ScopeCategory::Class => &mut self.classes,
            ScopeCategory::Template => &mut self.templates,
            ScopeCategory::TemplateInstance => &mut self.template_instances,
            ScopeCategory::Enum => &mut self.enums,
        };
        list.push(id);
    }

    /// Every child, category by category in [`ScopeCategory::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeCategory, ScopeId)> + '_
    {
        ScopeCategory::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter().map(move |&id| (category, id)))
    }

    pub fn len(&self) -> usize
    {
        ScopeCategory::ALL.iter().map(|&category| self.get(category).len()).sum()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }
}

/// Whether a scope is a pure namespace or a reflected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind
{
    Namespace,
    Type(TypeInfo),
}

/// A node of the namespace/type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope
{
    pub(crate) name: Name,
    pub(crate) full_name: Name,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: ScopeChildren,
    pub(crate) functions: Vec<Function>,
    pub(crate) kind: ScopeKind,
}

impl Scope
{
    /// Local name within the parent.
    pub fn name(&self) -> &Name
    {
        &self.name
    }

    /// Qualified name, global namespace excluded.
    pub fn full_name(&self) -> &Name
    {
        &self.full_name
    }

    /// `None` only for the global namespace.
    pub fn parent(&self) -> Option<ScopeId>
    {
        self.parent
    }

    pub fn children(&self) -> &ScopeChildren
    {
        &self.children
    }

    pub fn functions(&self) -> &[Function]
    {
        &self.functions
    }

    pub fn kind(&self) -> &ScopeKind
    {
        &self.kind
    }

    pub fn is_namespace(&self) -> bool
    {
        matches!(self.kind, ScopeKind::Namespace)
    }

    pub fn as_type(&self) -> Option<&TypeInfo>
    {
        match &self.kind {
            ScopeKind::Type(info) => Some(info),
            ScopeKind::Namespace => None,
        }
    }

    pub(crate) fn as_type_mut(&mut self) -> Option<&mut TypeInfo>
    {
        match &mut self.kind {
            ScopeKind::Type(info) => Some(info),
            ScopeKind::Namespace => None,
        }
    }

    /// The child list this scope sits in under its parent.
    pub fn category(&self) -> ScopeCategory
    {
        match &self.kind {
            ScopeKind::Namespace => ScopeCategory::Namespace,
            ScopeKind::Type(info) => match info.kind {
                TypeKind::BaseType => ScopeCategory::BaseType,
                TypeKind::Class(_) => ScopeCategory::Class,
                TypeKind::Enum(_) => ScopeCategory::Enum,
                TypeKind::Template => ScopeCategory::Template,
                TypeKind::TemplateInstance(_) => ScopeCategory::TemplateInstance,
            },
        }
    }
}
