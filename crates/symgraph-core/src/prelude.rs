//! Common module for library exports

pub use crate::attributes::{parse_attributes, AttributeScopes};
pub use crate::builder::{BuildOutput, BuildStats, Diagnostic, Severity, SymbolGraphBuilder};
pub use crate::error::{Result, SymgraphError};
pub use crate::model::{
    Attribute, AttributeKind, Module, Name, NameTable, Scope, ScopeCategory, ScopeId, ScopeKind, SpecialMember,
    TypeInfo, TypeKind, TypeModifier,
};
pub use crate::options::BuildOptions;
pub use crate::symbols::dwarf::load_symbol_table;
pub use crate::symbols::{BasicType, SymbolSource, SymbolTable};
pub use crate::types::Address;
