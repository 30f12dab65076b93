//! Type nodes and the entities they own.
//!
//! A type is a [`Scope`](super::Scope) whose kind is [`ScopeKind::Type`](super::ScopeKind::Type).
//! The data every type carries lives in [`TypeInfo`]; the variant-specific
//! parts hang off the closed [`TypeKind`] enum.

use std::fmt;

use super::name::Name;
use super::scope::ScopeId;
use crate::types::Address;

/// Kind of value carried by an [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind
{
    /// A bare flag, e.g. `Transient`. Carries no value.
    Boolean,
    /// A signed integer literal, e.g. `Priority=5`.
    Integer,
    /// A decimal literal, e.g. `Scale=-.5e2`.
    Float,
    /// A bare identifier, e.g. `Group=Physics`.
    Symbol,
    /// A quoted string with the quotes stripped.
    String,
}

impl fmt::Display for AttributeKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            AttributeKind::Boolean => "bool",
            AttributeKind::Integer => "int",
            AttributeKind::Float => "float",
            AttributeKind::Symbol => "symbol",
            AttributeKind::String => "string",
        };
        write!(f, "{label}")
    }
}

/// A key/value annotation attached to a class, enum, field or function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute
{
    pub name: Name,
    pub kind: AttributeKind,
    /// Textual value, `None` for boolean flags.
    pub value: Option<String>,
}

/// How a parameter refers to its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeModifier
{
    #[default]
    Value,
    Pointer,
    Reference,
}

impl fmt::Display for TypeModifier
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            TypeModifier::Value => "value",
            TypeModifier::Pointer => "pointer",
            TypeModifier::Reference => "reference",
        };
        write!(f, "{label}")
    }
}

/// A typed slot: function parameter, return value, or the shape of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter
{
    /// Absent for return values and unnamed parameters.
    pub name: Option<Name>,
    pub ty: ScopeId,
    pub is_const: bool,
    pub modifier: TypeModifier,
    /// 0, 1 or 2.
    pub array_rank: u8,
    /// Element counts per dimension; unused dimensions hold 1.
    pub array_lengths: [u32; 2],
}

impl Parameter
{
    pub fn is_array(&self) -> bool
    {
        self.array_rank > 0
    }
}

/// A data member of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field
{
    pub parameter: Parameter,
    /// Byte offset within the owning class.
    pub offset: u64,
    pub attributes: Vec<Attribute>,
}

impl Field
{
    pub fn name(&self) -> Option<&Name>
    {
        self.parameter.name.as_ref()
    }
}

/// The four special member roles a function can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialMember
{
    Constructor,
    CopyConstructor,
    Destructor,
    AssignmentOperator,
}

impl SpecialMember
{
    pub const ALL: [SpecialMember; 4] = [
        SpecialMember::Constructor,
        SpecialMember::Destructor,
        SpecialMember::CopyConstructor,
        SpecialMember::AssignmentOperator,
    ];
}

impl fmt::Display for SpecialMember
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SpecialMember::Constructor => "constructor",
            SpecialMember::CopyConstructor => "copy constructor",
            SpecialMember::Destructor => "destructor",
            SpecialMember::AssignmentOperator => "assignment operator",
        };
        write!(f, "{label}")
    }
}

/// Indices into a type's function list for each special member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialMembers
{
    constructor: Option<usize>,
    copy_constructor: Option<usize>,
    destructor: Option<usize>,
    assignment_operator: Option<usize>,
}

impl SpecialMembers
{
    pub fn get(&self, role: SpecialMember) -> Option<usize>
    {
        match role {
            SpecialMember::Constructor => self.constructor,
            SpecialMember::CopyConstructor => self.copy_constructor,
            SpecialMember::Destructor => self.destructor,
            SpecialMember::AssignmentOperator => self.assignment_operator,
        }
    }

    pub(crate) fn set(&mut self, role: SpecialMember, index: usize)
    {
        let slot = match role {
            SpecialMember::Constructor => &mut self.constructor,
            SpecialMember::CopyConstructor => &mut self.copy_constructor,
            SpecialMember::Destructor => &mut self.destructor,
            SpecialMember::AssignmentOperator => &mut self.assignment_operator,
        };
        *slot = Some(index);
    }

    pub fn constructor(&self) -> Option<usize>
    {
        self.constructor
    }

    pub fn copy_constructor(&self) -> Option<usize>
    {
        self.copy_constructor
    }

    pub fn destructor(&self) -> Option<usize>
    {
        self.destructor
    }

    pub fn assignment_operator(&self) -> Option<usize>
    {
        self.assignment_operator
    }
}

/// A reflected member function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function
{
    /// Local name, owner qualifier stripped.
    pub name: Name,
    pub address: Address,
    /// `None` for `void` functions.
    pub return_parameter: Option<Parameter>,
    /// Includes the implicit object parameter (`this`) first for member functions.
    pub parameters: Vec<Parameter>,
    pub attributes: Vec<Attribute>,
    /// Role assigned by the member classifier, if any.
    pub special: Option<SpecialMember>,
}

/// One `name = value` pair of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry
{
    pub name: Name,
    pub value: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassData
{
    /// No user-declared constructor or destructor.
    pub is_pod: bool,
    pub fields: Vec<Field>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumData
{
    pub entries: Vec<EnumEntry>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateInstanceData
{
    pub template: ScopeId,
    pub first_argument: ScopeId,
    /// Unresolved second arguments (e.g. default allocators) are left empty.
    pub second_argument: Option<ScopeId>,
}

/// The closed set of type variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind
{
    BaseType,
    Class(ClassData),
    Enum(EnumData),
    /// Placeholder registered before any instantiation; has no members.
    Template,
    TemplateInstance(TemplateInstanceData),
}

impl TypeKind
{
    pub fn label(&self) -> &'static str
    {
        match self {
            TypeKind::BaseType => "base type",
            TypeKind::Class(_) => "class",
            TypeKind::Enum(_) => "enum",
            TypeKind::Template => "template",
            TypeKind::TemplateInstance(_) => "template instance",
        }
    }
}

/// Data shared by every type variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo
{
    pub(crate) unique_id: u32,
    pub(crate) size: u64,
    pub(crate) type_of_address: Address,
    pub(crate) minimal_reflection: bool,
    pub(crate) special: SpecialMembers,
    pub(crate) kind: TypeKind,
}

impl TypeInfo
{
    /// Session-unique, strictly increasing id.
    pub fn unique_id(&self) -> u32
    {
        self.unique_id
    }

    /// Size in bytes.
    pub fn size(&self) -> u64
    {
        self.size
    }

    pub fn type_of_address(&self) -> Address
    {
        self.type_of_address
    }

    /// Only special member functions are recorded for this type.
    pub fn minimal_reflection(&self) -> bool
    {
        self.minimal_reflection
    }

    pub fn special_members(&self) -> &SpecialMembers
    {
        &self.special
    }

    pub fn kind(&self) -> &TypeKind
    {
        &self.kind
    }

    pub fn as_class(&self) -> Option<&ClassData>
    {
        match &self.kind {
            TypeKind::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumData>
    {
        match &self.kind {
            TypeKind::Enum(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_template_instance(&self) -> Option<&TemplateInstanceData>
    {
        match &self.kind {
            TypeKind::TemplateInstance(data) => Some(data),
            _ => None,
        }
    }

    /// Attributes of classes and enums; other kinds carry none.
    pub fn attributes(&self) -> &[Attribute]
    {
        match &self.kind {
            TypeKind::Class(data) => &data.attributes,
            TypeKind::Enum(data) => &data.attributes,
            _ => &[],
        }
    }

    pub fn fields(&self) -> &[Field]
    {
        match &self.kind {
            TypeKind::Class(data) => &data.fields,
            _ => &[],
        }
    }
}
