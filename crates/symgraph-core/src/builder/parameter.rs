//! Parameter reflection: turning a typed symbol into a [`Parameter`].

use super::template::Instantiation;
use super::SymbolGraphBuilder;
use crate::model::{Parameter, TypeModifier};
use crate::symbols::{BasicType, Symbol, SymbolId, SymbolSource, SymbolTag};

/// Array dimensions at or above this length are not reflected.
pub const MAX_ARRAY_LENGTH: u64 = 1 << 15;

/// Highest array rank a parameter can carry.
pub const MAX_ARRAY_RANK: usize = 2;

/// C++ spelling of a primitive, picked by category and byte width.
///
/// Debug information only knows broad categories (a 1-byte unsigned integer
/// is "uint"), so the width recovers the declared type. Unknown categories
/// give the empty string.
///
/// ```rust
/// use symgraph_core::builder::primitive_type_name;
/// use symgraph_core::symbols::BasicType;
///
/// assert_eq!(primitive_type_name(BasicType::UInt, 1), "unsigned char");
/// assert_eq!(primitive_type_name(BasicType::Int, 8), "__int64");
/// assert_eq!(primitive_type_name(BasicType::Float, 8), "double");
/// assert_eq!(primitive_type_name(BasicType::Bcd, 8), "");
/// ```
pub fn primitive_type_name(base_type: BasicType, length: u64) -> &'static str
{
    match base_type {
        BasicType::Void => "void",
        BasicType::Char => "char",
        BasicType::Int => match length {
            2 => "short",
            8 => "__int64",
            _ => "int",
        },
        BasicType::UInt => match length {
            1 => "unsigned char",
            2 => "unsigned short",
            8 => "unsigned __int64",
            _ => "unsigned int",
        },
        BasicType::Float => match length {
            8 => "double",
            _ => "float",
        },
        BasicType::Bool => "bool",
        BasicType::Long => "long",
        BasicType::ULong => "unsigned long",
        BasicType::NoType | BasicType::WChar | BasicType::Bcd => "",
    }
}

/// Registry name of a type symbol: the literal name of classes and enums,
/// the primitive spelling of base types, empty otherwise.
pub fn type_name(symbol: &Symbol) -> String
{
    match symbol.tag {
        SymbolTag::Udt | SymbolTag::Enum => symbol.name().to_string(),
        SymbolTag::BaseType => primitive_type_name(symbol.base_type, symbol.length).to_string(),
        _ => String::new(),
    }
}

pub(super) fn is_void(symbol: &Symbol) -> bool
{
    symbol.tag == SymbolTag::BaseType && symbol.base_type == BasicType::Void
}

impl<S: SymbolSource + ?Sized> SymbolGraphBuilder<'_, S>
{
    /// Reflect a member or parameter symbol through its declared type.
    pub(super) fn reflect_parameter(&mut self, symbol: &Symbol) -> Option<Parameter>
    {
        let name = symbol.name.as_deref().filter(|name| !name.is_empty());
        self.reflect_type(symbol.type_id?, name)
    }

    /// Reflect a type reference, peeling array and pointer layers.
    ///
    /// Returns `None` when the type isn't reflected, an array has more than
    /// two dimensions or a dimension of [`MAX_ARRAY_LENGTH`] elements or more,
    /// or a template argument can't be resolved.
    pub(super) fn reflect_type(&mut self, type_id: SymbolId, name: Option<&str>) -> Option<Parameter>
    {
        let source = self.source;
        let mut id = type_id;
        let mut ty = source.symbol(id)?;

        let mut array_lengths = [1u32; MAX_ARRAY_RANK];
        let mut rank = 0;
        while ty.tag == SymbolTag::ArrayType {
            if rank == MAX_ARRAY_RANK || ty.count >= MAX_ARRAY_LENGTH {
                return None;
            }
            array_lengths[rank] = u32::try_from(ty.count).ok()?;
            rank += 1;
            id = ty.type_id?;
            ty = source.symbol(id)?;
        }

        let mut modifier = TypeModifier::Value;
        if ty.tag == SymbolTag::PointerType {
            modifier = if ty.is_reference {
                TypeModifier::Reference
            } else {
                TypeModifier::Pointer
            };
            id = ty.type_id?;
            ty = source.symbol(id)?;
        }

        let name_of_type = type_name(ty);
        if name_of_type.contains('<') {
            if let Instantiation::Failed = self.instantiate_template(&name_of_type, id) {
                return None;
            }
        }

        let resolved = self.registry.get(&name_of_type)?;
        Some(Parameter {
            name: name.map(|name| self.module.names_mut().intern(name)),
            ty: resolved,
            is_const: ty.is_const,
            modifier,
            array_rank: rank as u8,
            array_lengths,
        })
    }
}
