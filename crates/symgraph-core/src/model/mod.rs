//! # Reflection Model
//!
//! The normalized tree the builder produces:
//!
//! ```text
//! Global
//! ├── App                      namespace
//! │   └── Gfx                  namespace
//! │       ├── Vec2             class (fields, functions, attributes)
//! │       └── Mode             enum (entries, attributes)
//! └── float                    base type
//! ```
//!
//! Nodes live in one arena, [`Module`], and refer to each other by
//! [`ScopeId`]. Every name is interned in the module's [`NameTable`].
//!
//! - [`name`]: interned names and the MurmurHash2 identity
//! - [`scope`]: tree nodes and child categories
//! - [`types`]: type variants, fields, functions, parameters, attributes
//! - [`module`]: the arena
//! - [`namespace`]: qualified-name splitting
//! - [`registry`]: full-name lookup of types
//! - [`schema`]: emitter field descriptors
//! - [`display`]: tree printer

pub mod display;
pub mod module;
pub mod name;
pub mod namespace;
pub mod registry;
pub mod schema;
pub mod scope;
pub mod types;

pub use display::ModuleTree;
pub use module::{Module, GLOBAL_NAMESPACE};
pub(crate) use module::NewType;
pub use name::{murmur_hash2, Name, NameTable, NAME_HASH_SEED};
pub use namespace::split_qualified;
pub use registry::TypeRegistry;
pub use schema::{FieldDescriptor, SchemaValue, ValueKind};
pub use scope::{Scope, ScopeCategory, ScopeChildren, ScopeId, ScopeKind};
pub use types::{
    Attribute, AttributeKind, ClassData, EnumData, EnumEntry, Field, Function, Parameter, SpecialMember,
    SpecialMembers, TemplateInstanceData, TypeInfo, TypeKind, TypeModifier,
};
