//! In-memory symbol store.

use std::collections::HashMap;

use super::{AccessorLookup, BasicType, DataKind, Registration, Symbol, SymbolId, SymbolSource, SymbolTag};
use crate::error::{Result, SymgraphError};
use crate::options::DEFAULT_ACCESSOR;
use crate::types::Address;

/// Name compilers give to unnamed enums and classes.
pub const ANONYMOUS_TAG: &str = "<unnamed-tag>";

/// Symbol name of the accessor instantiated for `type_name`.
///
/// Nested template arguments get a space before the closing bracket, the way
/// compilers print them.
///
/// ```rust
/// use symgraph_core::symbols::accessor_symbol_name;
///
/// assert_eq!(accessor_symbol_name("rfl::TypeOf", "Vec2"), "rfl::TypeOf<Vec2>");
/// assert_eq!(accessor_symbol_name("rfl::TypeOf", "Array<int>"), "rfl::TypeOf<Array<int> >");
/// ```
pub fn accessor_symbol_name(accessor: &str, type_name: &str) -> String
{
    if type_name.ends_with('>') {
        format!("{accessor}<{type_name} >")
    } else {
        format!("{accessor}<{type_name}>")
    }
}

/// A [`SymbolSource`] backed by plain vectors.
///
/// Symbols are appended and never removed, so every [`SymbolId`] handed out
/// stays valid.
///
/// ```rust
/// use symgraph_core::symbols::{BasicType, SymbolSource, SymbolTable};
///
/// let mut table = SymbolTable::new();
/// let float = table.base_type("float", BasicType::Float, 4);
/// let vec2 = table.udt("Vec2", 8);
/// table.member(vec2, "x", float, 0);
/// table.register(vec2, false, false);
///
/// assert_eq!(table.children(vec2).len(), 1);
/// assert_eq!(table.registrations().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SymbolTable
{
    symbols: Vec<Symbol>,
    children: Vec<Vec<SymbolId>>,
    annotations: HashMap<SymbolId, String>,
    registrations: Vec<Registration>,
    /// Accessor symbol name -> static address; `None` when the static is missing.
    accessors: HashMap<String, Option<Address>>,
    accessor_template: String,
    unavailable: Option<String>,
}

impl Default for SymbolTable
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl SymbolTable
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::with_accessor_template(DEFAULT_ACCESSOR)
    }

    /// Use a different accessor template name than `rfl::TypeOf`.
    #[must_use]
    pub fn with_accessor_template(accessor_template: &str) -> Self
    {
        Self {
            symbols: Vec::new(),
            children: Vec::new(),
            annotations: HashMap::new(),
            registrations: Vec::new(),
            accessors: HashMap::new(),
            accessor_template: accessor_template.to_string(),
            unavailable: None,
        }
    }

    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// Add a top-level symbol.
    pub fn add(&mut self, symbol: Symbol) -> SymbolId
    {
        let id = SymbolId::from_raw(self.symbols.len() as u32);
        self.symbols.push(symbol);
        self.children.push(Vec::new());
        id
    }

    /// Add a symbol as the last child of `parent`.
    pub fn add_child(&mut self, parent: SymbolId, symbol: Symbol) -> SymbolId
    {
        let id = self.add(symbol);
        self.link_child(parent, id);
        id
    }

    /// Append an existing symbol to `parent`'s children.
    pub fn link_child(&mut self, parent: SymbolId, child: SymbolId)
    {
        if let Some(children) = self.children.get_mut(parent.raw() as usize) {
            children.push(child);
        }
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol>
    {
        self.symbols.get_mut(id.raw() as usize)
    }

    /// All symbols with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)>
    {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (SymbolId::from_raw(index as u32), symbol))
    }

    pub fn register(&mut self, type_symbol: SymbolId, is_template: bool, minimal: bool)
    {
        self.registrations.push(Registration {
            type_symbol,
            is_template,
            minimal,
        });
    }

    /// Attach an annotation; only the first one per symbol is kept.
    pub fn set_annotation(&mut self, id: SymbolId, text: impl Into<String>)
    {
        self.annotations.entry(id).or_insert_with(|| text.into());
    }

    /// Record the accessor for `type_name`. `None` means the accessor exists
    /// without its static.
    pub fn set_accessor(&mut self, type_name: &str, address: Option<Address>)
    {
        let key = accessor_symbol_name(&self.accessor_template, type_name);
        self.accessors.insert(key, address);
    }

    /// Make [`SymbolSource::registrations`] fail with `SourceUnavailable`.
    pub fn set_unavailable(&mut self, reason: impl Into<String>)
    {
        self.unavailable = Some(reason.into());
    }

    pub fn base_type(&mut self, name: &str, base_type: BasicType, length: u64) -> SymbolId
    {
        self.add(Symbol {
            base_type,
            length,
            ..Symbol::new(SymbolTag::BaseType, Some(name))
        })
    }

    pub fn udt(&mut self, name: &str, length: u64) -> SymbolId
    {
        self.add(Symbol {
            length,
            ..Symbol::new(SymbolTag::Udt, Some(name))
        })
    }

    pub fn enumeration(&mut self, name: &str, length: u64) -> SymbolId
    {
        self.add(Symbol {
            length,
            ..Symbol::new(SymbolTag::Enum, Some(name))
        })
    }

    /// Pointer (or reference) to `target`.
    pub fn pointer_to(&mut self, target: SymbolId, is_reference: bool) -> SymbolId
    {
        self.add(Symbol {
            type_id: Some(target),
            is_reference,
            length: 8,
            ..Symbol::new(SymbolTag::PointerType, None)
        })
    }

    /// One array dimension of `count` elements.
    pub fn array_of(&mut self, element: SymbolId, count: u64) -> SymbolId
    {
        let element_length = self.symbol(element).map_or(0, |symbol| symbol.length);
        self.add(Symbol {
            type_id: Some(element),
            count,
            length: element_length.saturating_mul(count),
            ..Symbol::new(SymbolTag::ArrayType, None)
        })
    }

    /// Const-qualified copy of `target`, sharing its children.
    pub fn const_of(&mut self, target: SymbolId) -> SymbolId
    {
        let mut symbol = self.symbol(target).cloned().unwrap_or_default();
        symbol.is_const = true;
        let children = self.children(target).to_vec();
        let id = self.add(symbol);
        for child in children {
            self.link_child(id, child);
        }
        id
    }

    pub fn member(&mut self, owner: SymbolId, name: &str, ty: SymbolId, offset: u64) -> SymbolId
    {
        self.add_child(owner, Symbol {
            type_id: Some(ty),
            data_kind: DataKind::Member,
            offset,
            ..Symbol::new(SymbolTag::Data, Some(name))
        })
    }

    pub fn static_member(&mut self, owner: SymbolId, name: &str, ty: SymbolId) -> SymbolId
    {
        self.add_child(owner, Symbol {
            type_id: Some(ty),
            data_kind: DataKind::StaticMember,
            ..Symbol::new(SymbolTag::Data, Some(name))
        })
    }

    pub fn enumerator(&mut self, owner: SymbolId, name: &str, value: i64) -> SymbolId
    {
        self.add_child(owner, Symbol {
            data_kind: DataKind::Constant,
            value: Some(value),
            ..Symbol::new(SymbolTag::Data, Some(name))
        })
    }

    /// A member function; `return_type` is `None` for `void`.
    pub fn method(
        &mut self,
        owner: SymbolId,
        name: &str,
        address: Address,
        return_type: Option<SymbolId>,
    ) -> SymbolId
    {
        self.add_child(owner, Symbol {
            type_id: return_type,
            virtual_address: address,
            ..Symbol::new(SymbolTag::Function, Some(name))
        })
    }

    /// The implicit object parameter of `function`, a pointer to `owner`.
    pub fn this_parameter(&mut self, function: SymbolId, owner: SymbolId) -> SymbolId
    {
        let pointer = self.pointer_to(owner, false);
        self.add_child(function, Symbol {
            type_id: Some(pointer),
            data_kind: DataKind::ObjectPtr,
            ..Symbol::new(SymbolTag::Data, Some("this"))
        })
    }

    pub fn parameter(&mut self, function: SymbolId, name: Option<&str>, ty: SymbolId) -> SymbolId
    {
        self.add_child(function, Symbol {
            type_id: Some(ty),
            data_kind: DataKind::Param,
            ..Symbol::new(SymbolTag::Data, name)
        })
    }
}

impl SymbolSource for SymbolTable
{
    fn registrations(&self) -> Result<Vec<Registration>>
    {
        if let Some(reason) = &self.unavailable {
            return Err(SymgraphError::SourceUnavailable(reason.clone()));
        }
        Ok(self.registrations.clone())
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>
    {
        self.symbols.get(id.raw() as usize)
    }

    fn children(&self, id: SymbolId) -> &[SymbolId]
    {
        self.children.get(id.raw() as usize).map_or(&[], Vec::as_slice)
    }

    fn annotation(&self, id: SymbolId) -> Option<&str>
    {
        self.annotations.get(&id).map(String::as_str)
    }

    fn type_of_address(&self, type_name: &str) -> AccessorLookup
    {
        match self.accessors.get(&accessor_symbol_name(&self.accessor_template, type_name)) {
            Some(Some(address)) => AccessorLookup::Resolved(*address),
            Some(None) => AccessorLookup::MissingStatic,
            None => AccessorLookup::Absent,
        }
    }
}
