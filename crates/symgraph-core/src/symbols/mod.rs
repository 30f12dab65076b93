//! # Symbol Sources
//!
//! The builder doesn't read debug information itself. It walks a
//! [`SymbolSource`]: a tree of [`Symbol`]s (types, members, functions,
//! parameters) plus the registration entries that say which types the
//! program asked to reflect.
//!
//! ## Available sources
//!
//! - [`SymbolTable`]: in-memory store, filled by hand or by a loader
//! - [`dwarf::load_symbol_table`]: fills a `SymbolTable` from the DWARF
//!   sections of an ELF or Mach-O binary
//!
//! ## Symbol shape
//!
//! The model follows the usual debug-information layout. A user-defined type
//! has its members as children; a function symbol's `type_id` is its return
//! type and its parameters are `Data` children; pointers and arrays are
//! separate symbols wrapping their element type through `type_id`.

pub mod dwarf;
mod memory;

use std::fmt;

pub use memory::{accessor_symbol_name, SymbolTable, ANONYMOUS_TAG};

use crate::error::Result;
use crate::types::Address;

/// Handle of a symbol inside its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId
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
}

impl fmt::Display for SymbolId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "sym#{}", self.0)
    }
}

/// Category of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymbolTag
{
    /// Primitive type, see [`BasicType`].
    BaseType,
    /// Class, struct or union.
    Udt,
    Enum,
    Function,
    /// Variable, member, parameter or enumerator.
    Data,
    PointerType,
    ArrayType,
    Typedef,
    /// Anything the loader saw but doesn't model.
    #[default]
    Other,
}

impl fmt::Display for SymbolTag
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SymbolTag::BaseType => "base type",
            SymbolTag::Udt => "user-defined type",
            SymbolTag::Enum => "enum",
            SymbolTag::Function => "function",
            SymbolTag::Data => "data",
            SymbolTag::PointerType => "pointer",
            SymbolTag::ArrayType => "array",
            SymbolTag::Typedef => "typedef",
            SymbolTag::Other => "other",
        };
        write!(f, "{label}")
    }
}

/// Storage kind of a `Data` symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataKind
{
    #[default]
    Unknown,
    Local,
    StaticLocal,
    /// Formal parameter.
    Param,
    /// The implicit `this` parameter.
    ObjectPtr,
    FileStatic,
    Global,
    /// Instance data member.
    Member,
    StaticMember,
    /// Enumerator or other named constant.
    Constant,
}

/// Primitive categories, numbered like the classic debug-interface basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BasicType
{
    #[default]
    NoType = 0,
    Void = 1,
    Char = 2,
    WChar = 3,
    Int = 6,
    UInt = 7,
    Float = 8,
    Bcd = 9,
    Bool = 10,
    Long = 13,
    ULong = 14,
}

/// One debug-information symbol.
///
/// Fields that don't apply to a symbol's tag keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Symbol
{
    pub tag: SymbolTag,
    pub name: Option<String>,
    /// Size in bytes.
    pub length: u64,
    /// Declared type: member/parameter type, pointee, array element, or a
    /// function's return type.
    pub type_id: Option<SymbolId>,
    pub data_kind: DataKind,
    pub is_const: bool,
    /// Pointer symbols: `true` for references.
    pub is_reference: bool,
    /// Array symbols: element count.
    pub count: u64,
    /// Member symbols: byte offset in the owning type.
    pub offset: u64,
    /// Constant symbols: literal value.
    pub value: Option<i64>,
    pub virtual_address: Address,
    pub base_type: BasicType,
    /// UDT symbols: a user-declared constructor or destructor exists.
    pub has_constructor: bool,
}

impl Symbol
{
    pub fn new(tag: SymbolTag, name: Option<&str>) -> Self
    {
        Self {
            tag,
            name: name.map(str::to_string),
            ..Self::default()
        }
    }

    /// Name or the empty string.
    pub fn name(&self) -> &str
    {
        self.name.as_deref().unwrap_or_default()
    }
}

/// A type the program asked to reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration
{
    pub type_symbol: SymbolId,
    /// The registered name is a template pattern such as `Vector<T>`.
    pub is_template: bool,
    /// Record special member functions only.
    pub minimal: bool,
}

/// Result of looking up a type accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorLookup
{
    Resolved(Address),
    /// The accessor function exists but its static type object doesn't.
    MissingStatic,
    /// No accessor was generated for the type.
    Absent,
}

impl AccessorLookup
{
    /// Address or zero.
    pub fn address(self) -> Address
    {
        match self {
            AccessorLookup::Resolved(address) => address,
            AccessorLookup::MissingStatic | AccessorLookup::Absent => Address::ZERO,
        }
    }
}

/// Read access to a tree of debug symbols.
///
/// Implementations own the symbols; the builder only borrows them for the
/// duration of one build.
pub trait SymbolSource
{
    /// Every registration entry, in declaration order.
    ///
    /// ## Errors
    ///
    /// `SourceUnavailable` when the source can't produce its entries at all.
    /// This is the one error that fails a build.
    fn registrations(&self) -> Result<Vec<Registration>>;

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// Direct children in declaration order.
    fn children(&self, id: SymbolId) -> &[SymbolId];

    /// First annotation string attached to a symbol.
    fn annotation(&self, id: SymbolId) -> Option<&str>;

    /// Address of the accessor static for a literal type name.
    fn type_of_address(&self, type_name: &str) -> AccessorLookup;
}
