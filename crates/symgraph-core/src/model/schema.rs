//! # Emitter Schema
//!
//! Per-entity field descriptors for anything that serializes the model.
//!
//! Each schema is an ordered list of [`FieldDescriptor`]s. A descriptor
//! names the field, tells its [`ValueKind`] and reads the value out of an
//! entity as a [`SchemaValue`]. Emitters iterate a schema instead of
//! hard-coding the layout of every entity, so a document writer and a table
//! writer agree on field order and naming.
//!
//! ## Serialized Form
//!
//! - Names are written as their 32-bit hash id; the text lives once in the
//!   name table.
//! - Type references are written as the referenced type's `unique_id`.
//! - Absent slots (no constructor, no second template argument, unnamed
//!   parameter) are written as `-1`.
//!
//! Fields with a `default` may be omitted by an emitter when the entity
//! holds that default.
//!
//! ```rust
//! use symgraph_core::model::{schema, Module};
//!
//! let module = Module::new();
//! let root = module.scope(module.root());
//! let name = schema::TYPE_SCHEMA[0].read(&module, root);
//! assert_eq!(name.to_string(), format!("{}", root.name().hash()));
//! ```

use std::fmt;

use super::module::Module;
use super::name::Name;
use super::scope::{Scope, ScopeId};
use super::types::{Attribute, EnumEntry, Field, Function, Parameter, SpecialMember, TypeInfo};
use crate::types::Address;

/// Kind of a schema field, for emitters that need column types up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind
{
    Bool,
    Int,
    Name,
    TypeRef,
    Address,
    Label,
    Text,
}

/// A field value read from the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaValue<'a>
{
    Bool(bool),
    Int(i64),
    Name(&'a Name),
    Type
    {
        full_name: &'a Name,
        unique_id: u32,
    },
    Address(Address),
    /// A fixed enumeration label such as `pointer`.
    Label(&'static str),
    Text(&'a str),
    /// Missing optional slot.
    Absent,
}

impl fmt::Display for SchemaValue<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            SchemaValue::Bool(value) => write!(f, "{}", u8::from(*value)),
            SchemaValue::Int(value) => write!(f, "{value}"),
            SchemaValue::Name(name) => write!(f, "{}", name.hash()),
            SchemaValue::Type { unique_id, .. } => write!(f, "{unique_id}"),
            SchemaValue::Address(address) => write!(f, "{}", address.value()),
            SchemaValue::Label(label) => f.write_str(label),
            SchemaValue::Text(text) => f.write_str(text),
            SchemaValue::Absent => f.write_str("-1"),
        }
    }
}

/// One named, typed field of an entity.
pub struct FieldDescriptor<T>
{
    pub name: &'static str,
    pub kind: ValueKind,
    /// Value an emitter may skip writing.
    pub default: Option<SchemaValue<'static>>,
    read: for<'a> fn(&'a Module, &'a T) -> SchemaValue<'a>,
}

impl<T> FieldDescriptor<T>
{
    pub fn read<'a>(&self, module: &'a Module, entity: &'a T) -> SchemaValue<'a>
    {
        (self.read)(module, entity)
    }

    /// `true` when the entity holds this field's default value.
    pub fn is_default(&self, module: &Module, entity: &T) -> bool
    {
        self.default.is_some_and(|default| self.read(module, entity) == default)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

const fn field<T>(
    name: &'static str,
    kind: ValueKind,
    read: for<'a> fn(&'a Module, &'a T) -> SchemaValue<'a>,
) -> FieldDescriptor<T>
{
    FieldDescriptor {
        name,
        kind,
        default: None,
        read,
    }
}

const fn optional<T>(
    name: &'static str,
    kind: ValueKind,
    default: SchemaValue<'static>,
    read: for<'a> fn(&'a Module, &'a T) -> SchemaValue<'a>,
) -> FieldDescriptor<T>
{
    FieldDescriptor {
        name,
        kind,
        default: Some(default),
        read,
    }
}

fn type_ref(module: &Module, id: ScopeId) -> SchemaValue<'_>
{
    match module.get(id) {
        Some(scope) => match scope.as_type() {
            Some(info) => SchemaValue::Type {
                full_name: scope.full_name(),
                unique_id: info.unique_id(),
            },
            None => SchemaValue::Absent,
        },
        None => SchemaValue::Absent,
    }
}

fn optional_type_ref(module: &Module, id: Option<ScopeId>) -> SchemaValue<'_>
{
    id.map_or(SchemaValue::Absent, |id| type_ref(module, id))
}

fn optional_name(name: Option<&Name>) -> SchemaValue<'_>
{
    name.map_or(SchemaValue::Absent, SchemaValue::Name)
}

fn info_value<'a>(scope: &'a Scope, read: impl FnOnce(&'a TypeInfo) -> SchemaValue<'a>) -> SchemaValue<'a>
{
    scope.as_type().map_or(SchemaValue::Absent, read)
}

fn special_slot(scope: &Scope, role: SpecialMember) -> SchemaValue<'static>
{
    scope
        .as_type()
        .and_then(|info| info.special_members().get(role))
        .map_or(SchemaValue::Absent, |index| SchemaValue::Int(index as i64))
}

fn count(value: usize) -> SchemaValue<'static>
{
    SchemaValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Fields of every scope; type-only fields read as absent on namespaces.
pub const TYPE_SCHEMA: &[FieldDescriptor<Scope>] = &[
    field("name", ValueKind::Name, |_, s| SchemaValue::Name(s.name())),
    field("full_name", ValueKind::Name, |_, s| SchemaValue::Name(s.full_name())),
    field("kind", ValueKind::Label, |_, s| {
        SchemaValue::Label(s.as_type().map_or("namespace", |info| info.kind().label()))
    }),
    field("unique_id", ValueKind::Int, |_, s| {
        info_value(s, |info| SchemaValue::Int(i64::from(info.unique_id())))
    }),
    field("size", ValueKind::Int, |_, s| info_value(s, |info| SchemaValue::Int(info.size() as i64))),
    optional("type_of_address", ValueKind::Address, SchemaValue::Address(Address::ZERO), |_, s| {
        info_value(s, |info| SchemaValue::Address(info.type_of_address()))
    }),
    optional("minimal_reflection", ValueKind::Bool, SchemaValue::Bool(false), |_, s| {
        SchemaValue::Bool(s.as_type().is_some_and(TypeInfo::minimal_reflection))
    }),
    optional("is_pod", ValueKind::Bool, SchemaValue::Bool(false), |_, s| {
        SchemaValue::Bool(s.as_type().and_then(TypeInfo::as_class).is_some_and(|class| class.is_pod))
    }),
    optional("constructor", ValueKind::Int, SchemaValue::Absent, |_, s| {
        special_slot(s, SpecialMember::Constructor)
    }),
    optional("destructor", ValueKind::Int, SchemaValue::Absent, |_, s| {
        special_slot(s, SpecialMember::Destructor)
    }),
    optional("copy_constructor", ValueKind::Int, SchemaValue::Absent, |_, s| {
        special_slot(s, SpecialMember::CopyConstructor)
    }),
    optional("assignment_operator", ValueKind::Int, SchemaValue::Absent, |_, s| {
        special_slot(s, SpecialMember::AssignmentOperator)
    }),
    optional("template", ValueKind::TypeRef, SchemaValue::Absent, |m, s| {
        let instance = s.as_type().and_then(TypeInfo::as_template_instance);
        optional_type_ref(m, instance.map(|data| data.template))
    }),
    optional("first_argument", ValueKind::TypeRef, SchemaValue::Absent, |m, s| {
        let instance = s.as_type().and_then(TypeInfo::as_template_instance);
        optional_type_ref(m, instance.map(|data| data.first_argument))
    }),
    optional("second_argument", ValueKind::TypeRef, SchemaValue::Absent, |m, s| {
        let instance = s.as_type().and_then(TypeInfo::as_template_instance);
        optional_type_ref(m, instance.and_then(|data| data.second_argument))
    }),
];

pub const PARAMETER_SCHEMA: &[FieldDescriptor<Parameter>] = &[
    optional("name", ValueKind::Name, SchemaValue::Absent, |_, p| optional_name(p.name.as_ref())),
    field("type", ValueKind::TypeRef, |m, p| type_ref(m, p.ty)),
    optional("is_const", ValueKind::Bool, SchemaValue::Bool(false), |_, p| SchemaValue::Bool(p.is_const)),
    optional("modifier", ValueKind::Label, SchemaValue::Label("value"), |_, p| {
        SchemaValue::Label(modifier_label(p))
    }),
    optional("array_rank", ValueKind::Int, SchemaValue::Int(0), |_, p| SchemaValue::Int(i64::from(p.array_rank))),
    optional("array_length0", ValueKind::Int, SchemaValue::Int(1), |_, p| {
        SchemaValue::Int(i64::from(p.array_lengths[0]))
    }),
    optional("array_length1", ValueKind::Int, SchemaValue::Int(1), |_, p| {
        SchemaValue::Int(i64::from(p.array_lengths[1]))
    }),
];

pub const FIELD_SCHEMA: &[FieldDescriptor<Field>] = &[
    optional("name", ValueKind::Name, SchemaValue::Absent, |_, f| optional_name(f.name())),
    field("type", ValueKind::TypeRef, |m, f| type_ref(m, f.parameter.ty)),
    optional("is_const", ValueKind::Bool, SchemaValue::Bool(false), |_, f| {
        SchemaValue::Bool(f.parameter.is_const)
    }),
    optional("modifier", ValueKind::Label, SchemaValue::Label("value"), |_, f| {
        SchemaValue::Label(modifier_label(&f.parameter))
    }),
    optional("array_rank", ValueKind::Int, SchemaValue::Int(0), |_, f| {
        SchemaValue::Int(i64::from(f.parameter.array_rank))
    }),
    optional("array_length0", ValueKind::Int, SchemaValue::Int(1), |_, f| {
        SchemaValue::Int(i64::from(f.parameter.array_lengths[0]))
    }),
    optional("array_length1", ValueKind::Int, SchemaValue::Int(1), |_, f| {
        SchemaValue::Int(i64::from(f.parameter.array_lengths[1]))
    }),
    field("offset", ValueKind::Int, |_, f| SchemaValue::Int(f.offset as i64)),
    optional("attribute_count", ValueKind::Int, SchemaValue::Int(0), |_, f| count(f.attributes.len())),
];

pub const FUNCTION_SCHEMA: &[FieldDescriptor<Function>] = &[
    field("name", ValueKind::Name, |_, f| SchemaValue::Name(&f.name)),
    field("address", ValueKind::Address, |_, f| SchemaValue::Address(f.address)),
    optional("return_type", ValueKind::TypeRef, SchemaValue::Absent, |m, f| {
        optional_type_ref(m, f.return_parameter.as_ref().map(|p| p.ty))
    }),
    optional("parameter_count", ValueKind::Int, SchemaValue::Int(0), |_, f| count(f.parameters.len())),
    optional("attribute_count", ValueKind::Int, SchemaValue::Int(0), |_, f| count(f.attributes.len())),
];

pub const ATTRIBUTE_SCHEMA: &[FieldDescriptor<Attribute>] = &[
    field("name", ValueKind::Name, |_, a| SchemaValue::Name(&a.name)),
    field("kind", ValueKind::Label, |_, a| SchemaValue::Label(kind_label(a))),
    optional("value", ValueKind::Text, SchemaValue::Absent, |_, a| {
        a.value.as_deref().map_or(SchemaValue::Absent, SchemaValue::Text)
    }),
];

pub const ENUM_ENTRY_SCHEMA: &[FieldDescriptor<EnumEntry>] = &[
    field("name", ValueKind::Name, |_, e| SchemaValue::Name(&e.name)),
    field("value", ValueKind::Int, |_, e| SchemaValue::Int(i64::from(e.value))),
];

fn modifier_label(parameter: &Parameter) -> &'static str
{
    use super::types::TypeModifier;

    match parameter.modifier {
        TypeModifier::Value => "value",
        TypeModifier::Pointer => "pointer",
        TypeModifier::Reference => "reference",
    }
}

fn kind_label(attribute: &Attribute) -> &'static str
{
    use super::types::AttributeKind;

    match attribute.kind {
        AttributeKind::Boolean => "bool",
        AttributeKind::Integer => "int",
        AttributeKind::Float => "float",
        AttributeKind::Symbol => "symbol",
        AttributeKind::String => "string",
    }
}
