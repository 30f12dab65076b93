//! DIE tree walk.
//!
//! One pass over every unit turns debug information entries into symbols and
//! records type references by DIE position. Once every unit has been walked
//! the references are resolved, which lets a member refer to a type defined
//! further down or in another unit.

use std::collections::{HashMap, HashSet};

use gimli::{
    constants, Attribute, AttributeValue, DebuggingInformationEntry, DwAte, DwAt, DwTag, EntriesTreeNode, Operation, Reader,
    Unit, UnitSectionOffset, UnitType,
};

use super::{instance_member_name, live_address, map_dwarf_error, OwnedDwarf, OwnedReader};
use crate::error::Result;
use crate::options::BuildOptions;
use crate::symbols::{BasicType, DataKind, Symbol, SymbolId, SymbolSource, SymbolTable, SymbolTag};
use crate::types::Address;

const DW_TAG_LLVM_ANNOTATION: DwTag = DwTag(0x6000);

/// Typedef and qualifier chains longer than this are treated as unresolved.
const MAX_TYPE_REF_DEPTH: usize = 32;

const ANONYMOUS_NAMESPACE: &str = "(anonymous namespace)";

type Entry<'abbrev, 'unit> = DebuggingInformationEntry<'abbrev, 'unit, OwnedReader>;
type Node<'abbrev, 'unit, 'tree> = EntriesTreeNode<'abbrev, 'unit, 'tree, OwnedReader>;

/// Position of a DIE: unit index plus offset inside the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DieKey
{
    unit: usize,
    offset: usize,
}

/// What a DIE turned into.
#[derive(Debug, Clone)]
enum Die
{
    Symbol(SymbolId),
    /// Typedef or qualifier. `None` targets mean `void`.
    Alias
    {
        target: Option<DieKey>,
        is_const: bool,
    },
    /// Forward declaration, resolved to the definition with the same name.
    Declaration
    {
        name: String,
        tag: SymbolTag,
    },
    /// Abstract subprogram pointing back at its declaration.
    Forward(DieKey),
}

/// Out-of-line definition of a member function declared in its class.
#[derive(Debug)]
struct PendingDefinition
{
    declaration: DieKey,
    address: Address,
    parameter_names: Vec<Option<String>>,
    annotation: Option<String>,
}

#[derive(Debug, Default)]
struct PendingRegistration
{
    argument: Option<DieKey>,
    is_template: bool,
    minimal: bool,
}

#[derive(Debug)]
struct PendingAccessor
{
    type_name: String,
    argument: Option<DieKey>,
    address: Option<Address>,
}

/// Where a DIE sits: qualified prefix and owning class.
#[derive(Debug, Clone, Default)]
struct Context
{
    prefix: String,
    owner: Option<SymbolId>,
    /// Local name of the enclosing class.
    class_name: Option<String>,
    /// The enclosing class was already defined by an earlier unit; only
    /// member functions that unit didn't declare are added.
    merging: bool,
}

impl Context
{
    fn qualify(&self, name: &str) -> String
    {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}::{name}", self.prefix)
        }
    }
}

/// Mutable state of one load.
struct LoadState
{
    table: SymbolTable,
    dies: HashMap<DieKey, Die>,
    /// Symbols whose `type_id` waits for the walk to finish.
    links: Vec<(SymbolId, DieKey)>,
    /// Named classes and enums by qualified name.
    definitions: HashMap<String, SymbolId>,
    /// Member functions by linkage name.
    linkage: HashMap<String, SymbolId>,
    const_copies: HashMap<SymbolId, SymbolId>,
    void: Option<SymbolId>,
    pending_definitions: Vec<PendingDefinition>,
    registrations: Vec<PendingRegistration>,
    accessors: Vec<PendingAccessor>,
}

impl LoadState
{
    fn new(options: &BuildOptions) -> Self
    {
        Self {
            table: SymbolTable::with_accessor_template(&options.accessor),
            dies: HashMap::new(),
            links: Vec::new(),
            definitions: HashMap::new(),
            linkage: HashMap::new(),
            const_copies: HashMap::new(),
            void: None,
            pending_definitions: Vec::new(),
            registrations: Vec::new(),
            accessors: Vec::new(),
        }
    }

    fn link(&mut self, id: SymbolId, target: Option<DieKey>)
    {
        if let Some(target) = target {
            self.links.push((id, target));
        }
    }

    fn void(&mut self) -> SymbolId
    {
        if let Some(void) = self.void {
            return void;
        }
        let void = self.table.base_type("void", BasicType::Void, 0);
        self.void = Some(void);
        void
    }

    fn const_copy(&mut self, id: SymbolId) -> SymbolId
    {
        if self.table.symbol(id).is_some_and(|symbol| symbol.is_const) {
            return id;
        }
        if let Some(&copy) = self.const_copies.get(&id) {
            return copy;
        }
        let copy = self.table.const_of(id);
        self.const_copies.insert(id, copy);
        copy
    }

    /// Definition named `name`, or an empty placeholder when the program
    /// only ever declares it.
    fn declared(&mut self, name: String, tag: SymbolTag) -> SymbolId
    {
        if let Some(&id) = self.definitions.get(&name) {
            return id;
        }
        let id = self.table.add(Symbol::new(tag, Some(&name)));
        self.definitions.insert(name, id);
        id
    }

    fn resolve(&mut self, key: DieKey, depth: usize) -> Option<SymbolId>
    {
        if depth >= MAX_TYPE_REF_DEPTH {
            return None;
        }

        match self.dies.get(&key)?.clone() {
            Die::Symbol(id) => Some(id),
            Die::Alias { target, is_const } => {
                let inner = match target {
                    Some(target) => self.resolve(target, depth + 1)?,
                    None => self.void(),
                };
                Some(if is_const { self.const_copy(inner) } else { inner })
            }
            Die::Declaration { name, tag } => Some(self.declared(name, tag)),
            Die::Forward(next) => self.resolve(next, depth + 1),
        }
    }

    fn function_symbol(&self, mut key: DieKey) -> Option<SymbolId>
    {
        for _ in 0..MAX_TYPE_REF_DEPTH {
            match self.dies.get(&key)? {
                Die::Symbol(id) => return Some(*id),
                Die::Forward(next) => key = *next,
                _ => return None,
            }
        }
        None
    }

    fn finish(mut self) -> SymbolTable
    {
        let mut unresolved = 0usize;
        for (id, target) in std::mem::take(&mut self.links) {
            match self.resolve(target, 0) {
                Some(type_id) => {
                    if let Some(symbol) = self.table.symbol_mut(id) {
                        symbol.type_id = Some(type_id);
                    }
                }
                None => unresolved += 1,
            }
        }
        if unresolved > 0 {
            tracing::debug!(unresolved, "type references left unresolved");
        }

        // Copies made while resolving may predate their original's own link.
        let copies: Vec<(SymbolId, SymbolId)> = self.const_copies.iter().map(|(&from, &to)| (from, to)).collect();
        for (original, copy) in copies {
            let type_id = self.table.symbol(original).and_then(|symbol| symbol.type_id);
            if let Some(symbol) = self.table.symbol_mut(copy) {
                symbol.type_id = type_id;
            }
        }

        for definition in std::mem::take(&mut self.pending_definitions) {
            self.apply_definition(definition);
        }

        let mut registered = HashSet::new();
        for registration in std::mem::take(&mut self.registrations) {
            let Some(pointer) = registration.argument.and_then(|argument| self.resolve(argument, 0)) else {
                tracing::debug!("registration argument type is unresolved");
                continue;
            };
            let target = match self.table.symbol(pointer) {
                Some(symbol) if symbol.tag == SymbolTag::PointerType => symbol.type_id,
                Some(_) => Some(pointer),
                None => None,
            };
            if let Some(target) = target {
                if registered.insert(target) {
                    self.table.register(target, registration.is_template, registration.minimal);
                }
            }
        }

        let mut accessors: HashMap<String, Option<Address>> = HashMap::new();
        for accessor in std::mem::take(&mut self.accessors) {
            let is_enum = accessor
                .argument
                .and_then(|argument| self.resolve(argument, 0))
                .and_then(|id| self.table.symbol(id))
                .is_some_and(|symbol| symbol.tag == SymbolTag::Enum);
            let type_name = if is_enum {
                format!("enum {}", accessor.type_name)
            } else {
                accessor.type_name
            };
            // Units that discarded their copy leave the static unresolved.
            let slot = accessors.entry(type_name).or_insert(None);
            *slot = slot.or(accessor.address);
        }
        for (type_name, address) in accessors {
            self.table.set_accessor(&type_name, address);
        }

        self.table
    }

    fn apply_definition(&mut self, definition: PendingDefinition)
    {
        let Some(function) = self.function_symbol(definition.declaration) else {
            return;
        };

        if let Some(symbol) = self.table.symbol_mut(function) {
            if !symbol.virtual_address.is_resolved() {
                symbol.virtual_address = definition.address;
            }
        }
        if let Some(text) = definition.annotation {
            self.table.set_annotation(function, text);
        }

        // Declarations often leave parameters unnamed.
        let parameters: Vec<SymbolId> = self
            .table
            .children(function)
            .iter()
            .copied()
            .filter(|&child| {
                self.table
                    .symbol(child)
                    .is_some_and(|symbol| symbol.data_kind == DataKind::Param)
            })
            .collect();
        for (parameter, name) in parameters.into_iter().zip(definition.parameter_names) {
            if let (Some(name), Some(symbol)) = (name, self.table.symbol_mut(parameter)) {
                if symbol.name.is_none() {
                    symbol.name = Some(name);
                }
            }
        }
    }
}

/// Primitive category of a base type.
fn basic_type(encoding: DwAte, name: &str, length: u64) -> BasicType
{
    match encoding {
        constants::DW_ATE_boolean => BasicType::Bool,
        constants::DW_ATE_float => BasicType::Float,
        constants::DW_ATE_signed_char => BasicType::Char,
        constants::DW_ATE_unsigned_char if name == "char" => BasicType::Char,
        constants::DW_ATE_unsigned_char => BasicType::UInt,
        constants::DW_ATE_UTF => BasicType::WChar,
        constants::DW_ATE_signed if name == "wchar_t" => BasicType::WChar,
        constants::DW_ATE_signed if length == 4 && name.contains("long") => BasicType::Long,
        constants::DW_ATE_signed => BasicType::Int,
        constants::DW_ATE_unsigned if length == 4 && name.contains("long") => BasicType::ULong,
        constants::DW_ATE_unsigned => BasicType::UInt,
        constants::DW_ATE_packed_decimal | constants::DW_ATE_numeric_string => BasicType::Bcd,
        _ => BasicType::NoType,
    }
}

/// Reads every unit of one DWARF image into a [`SymbolTable`].
pub(crate) struct SymbolLoader<'a>
{
    dwarf: &'a OwnedDwarf,
    options: &'a BuildOptions,
    units: Vec<Unit<OwnedReader>>,
    /// Type unit signature -> the type DIE it describes.
    signatures: HashMap<u64, DieKey>,
}

impl<'a> SymbolLoader<'a>
{
    pub(crate) fn new(dwarf: &'a OwnedDwarf, options: &'a BuildOptions) -> Result<Self>
    {
        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_info unit header", err))?
        {
            units.push(
                dwarf
                    .unit(header)
                    .map_err(|err| map_dwarf_error("parsing compilation unit", err))?,
            );
        }

        let mut type_headers = dwarf.type_units();
        while let Some(header) = type_headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_types unit header", err))?
        {
            units.push(dwarf.unit(header).map_err(|err| map_dwarf_error("parsing type unit", err))?);
        }

        let mut signatures = HashMap::new();
        for (index, unit) in units.iter().enumerate() {
            if let UnitType::Type {
                type_signature,
                type_offset,
            }
            | UnitType::SplitType {
                type_signature,
                type_offset,
            } = unit.header.type_()
            {
                signatures.insert(type_signature.0, DieKey {
                    unit: index,
                    offset: type_offset.0,
                });
            }
        }

        tracing::debug!(units = units.len(), type_units = signatures.len(), "read unit headers");

        Ok(Self {
            dwarf,
            options,
            units,
            signatures,
        })
    }

    pub(crate) fn load(&self) -> Result<SymbolTable>
    {
        let mut state = LoadState::new(self.options);

        for (index, unit) in self.units.iter().enumerate() {
            let _span = tracing::trace_span!("unit", index).entered();
            let mut tree = unit
                .entries_tree(None)
                .map_err(|err| map_dwarf_error("building unit tree", err))?;
            let root = tree.root().map_err(|err| map_dwarf_error("navigating unit root", err))?;
            self.visit_children(index, root, &Context::default(), &mut state)?;
        }

        tracing::debug!(
            symbols = state.table.len(),
            registrations = state.registrations.len(),
            accessors = state.accessors.len(),
            "walked debug information"
        );
        Ok(state.finish())
    }

    fn visit_children(&self, index: usize, node: Node<'_, '_, '_>, context: &Context, state: &mut LoadState)
        -> Result<()>
    {
        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating DIE children", err))?
        {
            self.visit(index, child, context, state)?;
        }
        Ok(())
    }

    fn visit(&self, index: usize, node: Node<'_, '_, '_>, context: &Context, state: &mut LoadState) -> Result<()>
    {
        let unit = &self.units[index];
        let entry = node.entry();
        let key = DieKey {
            unit: index,
            offset: entry.offset().0,
        };

        match entry.tag() {
            constants::DW_TAG_namespace => {
                let name = self.name(unit, entry)?;
                let nested = Context {
                    prefix: context.qualify(name.as_deref().unwrap_or(ANONYMOUS_NAMESPACE)),
                    ..Context::default()
                };
                self.visit_children(index, node, &nested, state)
            }
            constants::DW_TAG_structure_type | constants::DW_TAG_class_type | constants::DW_TAG_union_type => {
                self.visit_class(index, key, node, context, state)
            }
            constants::DW_TAG_enumeration_type => self.visit_enum(index, key, node, context, state),
            constants::DW_TAG_base_type => {
                let name = self.name(unit, entry)?.unwrap_or_default();
                let length = Self::udata(entry, constants::DW_AT_byte_size)?.unwrap_or(0);
                let base_type = match Self::attr(entry, constants::DW_AT_encoding)?.map(|attr| attr.value()) {
                    Some(AttributeValue::Encoding(encoding)) => basic_type(encoding, &name, length),
                    _ => BasicType::NoType,
                };
                let id = state.table.base_type(&name, base_type, length);
                state.dies.insert(key, Die::Symbol(id));
                Ok(())
            }
            constants::DW_TAG_pointer_type
            | constants::DW_TAG_reference_type
            | constants::DW_TAG_rvalue_reference_type => {
                let target = self.reference(index, entry, constants::DW_AT_type)?;
                let length = Self::udata(entry, constants::DW_AT_byte_size)?
                    .unwrap_or_else(|| u64::from(unit.encoding().address_size));
                let id = state.table.add(Symbol {
                    length,
                    is_reference: entry.tag() != constants::DW_TAG_pointer_type,
                    ..Symbol::new(SymbolTag::PointerType, None)
                });
                match target {
                    Some(target) => state.link(id, Some(target)),
                    None => {
                        let void = state.void();
                        if let Some(symbol) = state.table.symbol_mut(id) {
                            symbol.type_id = Some(void);
                        }
                    }
                }
                state.dies.insert(key, Die::Symbol(id));
                Ok(())
            }
            constants::DW_TAG_array_type => self.visit_array(index, key, node, state),
            constants::DW_TAG_typedef
            | constants::DW_TAG_volatile_type
            | constants::DW_TAG_restrict_type
            | constants::DW_TAG_atomic_type
            | constants::DW_TAG_const_type => {
                let target = self.reference(index, entry, constants::DW_AT_type)?;
                state.dies.insert(key, Die::Alias {
                    target,
                    is_const: entry.tag() == constants::DW_TAG_const_type,
                });
                Ok(())
            }
            constants::DW_TAG_subprogram => self.visit_subprogram(index, key, node, context, state),
            constants::DW_TAG_member | constants::DW_TAG_variable => self.visit_data_member(index, entry, context, state),
            _ => Ok(()),
        }
    }

    fn visit_class(
        &self,
        index: usize,
        key: DieKey,
        node: Node<'_, '_, '_>,
        context: &Context,
        state: &mut LoadState,
    ) -> Result<()>
    {
        let unit = &self.units[index];
        let entry = node.entry();
        let name = self.name(unit, entry)?;
        let anonymous = name.is_none();
        let local = name.unwrap_or_else(|| self.options.anonymous_tag.clone());
        let qualified = context.qualify(&local);

        if Self::flag(entry, constants::DW_AT_declaration)? {
            state.dies.insert(key, Die::Declaration {
                name: qualified,
                tag: SymbolTag::Udt,
            });
            return Ok(());
        }

        if !anonymous {
            if let Some(&existing) = state.definitions.get(&qualified) {
                state.dies.insert(key, Die::Symbol(existing));
                let nested = Context {
                    prefix: qualified,
                    owner: Some(existing),
                    class_name: Some(local),
                    merging: true,
                };
                return self.visit_children(index, node, &nested, state);
            }
        }

        let length = Self::udata(entry, constants::DW_AT_byte_size)?.unwrap_or(0);
        let id = state.table.add(Symbol {
            length,
            ..Symbol::new(SymbolTag::Udt, Some(&qualified))
        });
        if let (Some(owner), false) = (context.owner, context.merging) {
            state.table.link_child(owner, id);
        }
        if !anonymous {
            state.definitions.insert(qualified.clone(), id);
        }
        state.dies.insert(key, Die::Symbol(id));
        tracing::trace!(class = %qualified, length, "class");

        let nested = Context {
            prefix: qualified,
            owner: Some(id),
            class_name: Some(local),
            merging: false,
        };
        self.visit_children(index, node, &nested, state)
    }

    fn visit_enum(
        &self,
        index: usize,
        key: DieKey,
        node: Node<'_, '_, '_>,
        context: &Context,
        state: &mut LoadState,
    ) -> Result<()>
    {
        let unit = &self.units[index];
        let entry = node.entry();
        let name = self.name(unit, entry)?;
        let anonymous = name.is_none();
        let qualified = context.qualify(name.as_deref().unwrap_or(self.options.anonymous_tag.as_str()));

        if Self::flag(entry, constants::DW_AT_declaration)? {
            state.dies.insert(key, Die::Declaration {
                name: qualified,
                tag: SymbolTag::Enum,
            });
            return Ok(());
        }
        if !anonymous {
            if let Some(&existing) = state.definitions.get(&qualified) {
                state.dies.insert(key, Die::Symbol(existing));
                return Ok(());
            }
        }

        let length = Self::udata(entry, constants::DW_AT_byte_size)?.unwrap_or(0);
        let id = state.table.add(Symbol {
            length,
            ..Symbol::new(SymbolTag::Enum, Some(&qualified))
        });
        if let (Some(owner), false) = (context.owner, context.merging) {
            state.table.link_child(owner, id);
        }
        if !anonymous {
            state.definitions.insert(qualified, id);
        }
        state.dies.insert(key, Die::Symbol(id));

        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating enumerators", err))?
        {
            let entry = child.entry();
            if entry.tag() != constants::DW_TAG_enumerator {
                continue;
            }
            let Some(name) = self.name(unit, entry)? else {
                continue;
            };
            let value = Self::const_value(entry)?.unwrap_or(0);
            state.table.enumerator(id, &name, value);
        }
        Ok(())
    }

    fn visit_array(&self, index: usize, key: DieKey, node: Node<'_, '_, '_>, state: &mut LoadState) -> Result<()>
    {
        let entry = node.entry();
        let element = self.reference(index, entry, constants::DW_AT_type)?;
        let length = Self::udata(entry, constants::DW_AT_byte_size)?.unwrap_or(0);

        let mut dimensions = Vec::new();
        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating array subranges", err))?
        {
            let entry = child.entry();
            if entry.tag() != constants::DW_TAG_subrange_type {
                continue;
            }
            let count = match Self::udata(entry, constants::DW_AT_count)? {
                Some(count) => count,
                None => match Self::attr(entry, constants::DW_AT_upper_bound)? {
                    Some(attr) => attr
                        .sdata_value()
                        .or_else(|| attr.udata_value().map(|value| value as i64))
                        .map_or(0, |upper| u64::try_from(upper.saturating_add(1)).unwrap_or(0)),
                    None => 0,
                },
            };
            dimensions.push(count);
        }
        if dimensions.is_empty() {
            dimensions.push(0);
        }

        // Innermost dimension first; the outermost array is what the DIE names.
        let mut inner: Option<SymbolId> = None;
        for (position, &count) in dimensions.iter().enumerate().rev() {
            let id = state.table.add(Symbol {
                count,
                length: if position == 0 { length } else { 0 },
                ..Symbol::new(SymbolTag::ArrayType, None)
            });
            match inner {
                Some(inner) => {
                    if let Some(symbol) = state.table.symbol_mut(id) {
                        symbol.type_id = Some(inner);
                    }
                }
                None => state.link(id, element),
            }
            inner = Some(id);
        }
        if let Some(outer) = inner {
            state.dies.insert(key, Die::Symbol(outer));
        }
        Ok(())
    }

    fn visit_data_member(&self, index: usize, entry: &Entry<'_, '_>, context: &Context, state: &mut LoadState)
        -> Result<()>
    {
        let Some(owner) = context.owner else {
            return Ok(());
        };
        if context.merging {
            return Ok(());
        }

        let unit = &self.units[index];
        let name = self.name(unit, entry)?;
        let is_static = entry.tag() == constants::DW_TAG_variable
            || Self::flag(entry, constants::DW_AT_external)?
            || Self::flag(entry, constants::DW_AT_declaration)?;
        let (data_kind, offset) = if is_static {
            (DataKind::StaticMember, 0)
        } else {
            let offset = Self::udata(entry, constants::DW_AT_data_member_location)?.unwrap_or(0);
            (DataKind::Member, offset)
        };

        let id = state.table.add_child(owner, Symbol {
            data_kind,
            offset,
            ..Symbol::new(SymbolTag::Data, name.as_deref())
        });
        let target = self.reference(index, entry, constants::DW_AT_type)?;
        state.link(id, target);
        Ok(())
    }

    fn visit_subprogram(
        &self,
        index: usize,
        key: DieKey,
        node: Node<'_, '_, '_>,
        context: &Context,
        state: &mut LoadState,
    ) -> Result<()>
    {
        let unit = &self.units[index];
        let entry = node.entry();
        let address = self.code_address(unit, entry)?;

        let declaration = match self.reference(index, entry, constants::DW_AT_specification)? {
            Some(declaration) => Some(declaration),
            None => self.reference(index, entry, constants::DW_AT_abstract_origin)?,
        };
        if let Some(declaration) = declaration {
            if !address.is_resolved() {
                state.dies.insert(key, Die::Forward(declaration));
                return Ok(());
            }
            let (parameter_names, annotation) = self.definition_details(index, node)?;
            state.pending_definitions.push(PendingDefinition {
                declaration,
                address,
                parameter_names,
                annotation,
            });
            return Ok(());
        }

        let Some(name) = self.name(unit, entry)? else {
            return Ok(());
        };
        if context.owner.is_some() {
            return self.visit_method(index, key, node, context, &name, address, state);
        }

        let qualified = context.qualify(&name);
        if qualified == self.options.registration_fn {
            return self.visit_registration(index, node, state);
        }
        if let Some(arguments) = qualified
            .strip_prefix(self.options.accessor.as_str())
            .and_then(|rest| rest.strip_prefix('<'))
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return self.visit_accessor(index, node, arguments.trim(), state);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_method(
        &self,
        index: usize,
        key: DieKey,
        node: Node<'_, '_, '_>,
        context: &Context,
        name: &str,
        address: Address,
        state: &mut LoadState,
    ) -> Result<()>
    {
        let unit = &self.units[index];
        let entry = node.entry();
        let Some(owner) = context.owner else {
            return Ok(());
        };
        let linkage_name = self.linkage_name(unit, entry)?;

        if context.merging {
            if let Some(&existing) = linkage_name.as_ref().and_then(|linkage| state.linkage.get(linkage)) {
                state.dies.insert(key, Die::Symbol(existing));
                return Ok(());
            }
        }

        let local = match &context.class_name {
            Some(class_name) => instance_member_name(class_name, name),
            None => name.to_string(),
        };
        let qualified = context.qualify(&local);
        let id = state.table.add_child(owner, Symbol {
            virtual_address: address,
            ..Symbol::new(SymbolTag::Function, Some(&qualified))
        });
        let return_type = self.reference(index, entry, constants::DW_AT_type)?;
        state.link(id, return_type);
        if let Some(linkage_name) = linkage_name {
            state.linkage.insert(linkage_name, id);
        }
        state.dies.insert(key, Die::Symbol(id));

        let is_special = context
            .class_name
            .as_deref()
            .is_some_and(|class_name| local == class_name || local.strip_prefix('~') == Some(class_name));
        if is_special && !Self::flag(entry, constants::DW_AT_artificial)? {
            if let Some(symbol) = state.table.symbol_mut(owner) {
                symbol.has_constructor = true;
            }
        }

        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating member function children", err))?
        {
            let entry = child.entry();
            match entry.tag() {
                constants::DW_TAG_formal_parameter => {
                    let data_kind = if Self::flag(entry, constants::DW_AT_artificial)? {
                        DataKind::ObjectPtr
                    } else {
                        DataKind::Param
                    };
                    let name = self.name(unit, entry)?;
                    let parameter = state.table.add_child(id, Symbol {
                        data_kind,
                        ..Symbol::new(SymbolTag::Data, name.as_deref())
                    });
                    let target = self.reference(index, entry, constants::DW_AT_type)?;
                    state.link(parameter, target);
                }
                DW_TAG_LLVM_ANNOTATION => {
                    if let Some(text) = self.annotation(unit, entry)? {
                        state.table.set_annotation(id, text);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Parameter names and annotation of an out-of-line definition.
    fn definition_details(&self, index: usize, node: Node<'_, '_, '_>) -> Result<(Vec<Option<String>>, Option<String>)>
    {
        let unit = &self.units[index];
        let mut names = Vec::new();
        let mut annotation = None;

        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating definition children", err))?
        {
            let entry = child.entry();
            match entry.tag() {
                constants::DW_TAG_formal_parameter if !Self::flag(entry, constants::DW_AT_artificial)? => {
                    names.push(self.name(unit, entry)?);
                }
                DW_TAG_LLVM_ANNOTATION if annotation.is_none() => {
                    annotation = self.annotation(unit, entry)?;
                }
                _ => {}
            }
        }
        Ok((names, annotation))
    }

    /// A registration overload: `arg` points at the type, `is_template` and
    /// `minimal` are flags by presence.
    fn visit_registration(&self, index: usize, node: Node<'_, '_, '_>, state: &mut LoadState) -> Result<()>
    {
        let unit = &self.units[index];
        let mut registration = PendingRegistration::default();

        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating registration parameters", err))?
        {
            let entry = child.entry();
            if entry.tag() != constants::DW_TAG_formal_parameter {
                continue;
            }
            match self.name(unit, entry)?.as_deref() {
                Some("arg") => registration.argument = self.reference(index, entry, constants::DW_AT_type)?,
                Some("is_template") => registration.is_template = true,
                Some("minimal") => registration.minimal = true,
                _ => {}
            }
        }

        tracing::trace!(
            is_template = registration.is_template,
            minimal = registration.minimal,
            "registration"
        );
        state.registrations.push(registration);
        Ok(())
    }

    /// A type accessor instance: the static local `type` holds the address.
    fn visit_accessor(&self, index: usize, node: Node<'_, '_, '_>, type_name: &str, state: &mut LoadState) -> Result<()>
    {
        let unit = &self.units[index];
        let mut argument = None;
        let mut address = None;

        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating accessor children", err))?
        {
            let entry = child.entry();
            match entry.tag() {
                constants::DW_TAG_template_type_parameter => {
                    argument = self.reference(index, entry, constants::DW_AT_type)?;
                }
                constants::DW_TAG_variable if self.name(unit, entry)?.as_deref() == Some("type") => {
                    address = self.static_address(unit, entry)?;
                }
                _ => {}
            }
        }

        tracing::trace!(type_name, resolved = address.is_some(), "type accessor");
        state.accessors.push(PendingAccessor {
            type_name: type_name.to_string(),
            argument,
            address,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Attribute readers
    // ---------------------------------------------------------------------

    fn attr(entry: &Entry<'_, '_>, name: DwAt) -> Result<Option<Attribute<OwnedReader>>>
    {
        entry
            .attr(name)
            .map_err(|err| map_dwarf_error(format!("reading {name}"), err))
    }

    fn udata(entry: &Entry<'_, '_>, name: DwAt) -> Result<Option<u64>>
    {
        Ok(Self::attr(entry, name)?.and_then(|attr| attr.udata_value()))
    }

    fn flag(entry: &Entry<'_, '_>, name: DwAt) -> Result<bool>
    {
        Ok(matches!(
            Self::attr(entry, name)?.map(|attr| attr.value()),
            Some(AttributeValue::Flag(true))
        ))
    }

    fn const_value(entry: &Entry<'_, '_>) -> Result<Option<i64>>
    {
        Ok(Self::attr(entry, constants::DW_AT_const_value)?.and_then(|attr| {
            attr.sdata_value()
                .or_else(|| attr.udata_value().map(|value| value as i64))
        }))
    }

    fn name(&self, unit: &Unit<OwnedReader>, entry: &Entry<'_, '_>) -> Result<Option<String>>
    {
        match Self::attr(entry, constants::DW_AT_name)? {
            Some(attr) => Ok(Some(self.attr_to_string(unit, attr.value())?)),
            None => Ok(None),
        }
    }

    fn linkage_name(&self, unit: &Unit<OwnedReader>, entry: &Entry<'_, '_>) -> Result<Option<String>>
    {
        for name in [constants::DW_AT_linkage_name, constants::DW_AT_MIPS_linkage_name] {
            if let Some(attr) = Self::attr(entry, name)? {
                return Ok(Some(self.attr_to_string(unit, attr.value())?));
            }
        }
        Ok(None)
    }

    /// String value of an annotation entry.
    fn annotation(&self, unit: &Unit<OwnedReader>, entry: &Entry<'_, '_>) -> Result<Option<String>>
    {
        let Some(attr) = Self::attr(entry, constants::DW_AT_const_value)? else {
            return Ok(None);
        };
        let value = attr.value();
        if !matches!(
            value,
            AttributeValue::String(_)
                | AttributeValue::DebugStrRef(_)
                | AttributeValue::DebugStrOffsetsIndex(_)
                | AttributeValue::DebugLineStrRef(_)
        ) {
            return Ok(None);
        }
        Ok(Some(self.attr_to_string(unit, value)?))
    }

    fn attr_to_string(&self, unit: &Unit<OwnedReader>, value: AttributeValue<OwnedReader>) -> Result<String>
    {
        let reader = self
            .dwarf
            .attr_string(unit, value)
            .map_err(|err| map_dwarf_error("resolving DWARF string", err))?;
        let owned = match reader.to_string() {
            Ok(cow) => cow.into_owned(),
            Err(_) => reader
                .to_string_lossy()
                .map_err(|err| map_dwarf_error("decoding DWARF string", err))?
                .into_owned(),
        };
        Ok(owned)
    }

    /// Resolve a reference attribute to the DIE it names.
    fn reference(&self, index: usize, entry: &Entry<'_, '_>, name: DwAt) -> Result<Option<DieKey>>
    {
        let Some(attr) = Self::attr(entry, name)? else {
            return Ok(None);
        };

        Ok(match attr.value() {
            AttributeValue::UnitRef(offset) => Some(DieKey {
                unit: index,
                offset: offset.0,
            }),
            AttributeValue::DebugInfoRef(offset) => {
                let target = UnitSectionOffset::from(offset);
                self.units.iter().enumerate().find_map(|(unit, candidate)| {
                    target
                        .to_unit_offset(candidate)
                        .map(|offset| DieKey { unit, offset: offset.0 })
                })
            }
            AttributeValue::DebugTypesRef(signature) => self.signatures.get(&signature.0).copied(),
            _ => None,
        })
    }

    fn code_address(&self, unit: &Unit<OwnedReader>, entry: &Entry<'_, '_>) -> Result<Address>
    {
        let Some(attr) = Self::attr(entry, constants::DW_AT_low_pc)? else {
            return Ok(Address::ZERO);
        };
        let address = self
            .dwarf
            .attr_address(unit, attr.value())
            .map_err(|err| map_dwarf_error("reading DW_AT_low_pc", err))?;
        Ok(address.and_then(live_address).unwrap_or(Address::ZERO))
    }

    /// Address of a static variable whose location is a `DW_OP_addr`.
    fn static_address(&self, unit: &Unit<OwnedReader>, entry: &Entry<'_, '_>) -> Result<Option<Address>>
    {
        let Some(attr) = Self::attr(entry, constants::DW_AT_location)? else {
            return Ok(None);
        };
        let AttributeValue::Exprloc(expression) = attr.value() else {
            return Ok(None);
        };

        let mut operations = expression.operations(unit.encoding());
        while let Some(operation) = operations
            .next()
            .map_err(|err| map_dwarf_error("evaluating DW_AT_location", err))?
        {
            let address = match operation {
                Operation::Address { address } => address,
                Operation::AddressIndex { index } => self
                    .dwarf
                    .address(unit, index)
                    .map_err(|err| map_dwarf_error("reading .debug_addr", err))?,
                _ => continue,
            };
            return Ok(live_address(address));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_basic_type_by_encoding()
    {
        assert_eq!(basic_type(constants::DW_ATE_float, "double", 8), BasicType::Float);
        assert_eq!(basic_type(constants::DW_ATE_boolean, "bool", 1), BasicType::Bool);
        assert_eq!(basic_type(constants::DW_ATE_signed, "int", 4), BasicType::Int);
        assert_eq!(basic_type(constants::DW_ATE_signed, "long int", 8), BasicType::Int);
        assert_eq!(basic_type(constants::DW_ATE_signed, "long int", 4), BasicType::Long);
        assert_eq!(basic_type(constants::DW_ATE_unsigned_char, "unsigned char", 1), BasicType::UInt);
        assert_eq!(basic_type(constants::DW_ATE_unsigned_char, "char", 1), BasicType::Char);
        assert_eq!(basic_type(constants::DW_ATE_signed_char, "char", 1), BasicType::Char);
    }

    #[test]
    fn test_context_qualifies_names()
    {
        let global = Context::default();
        assert_eq!(global.qualify("Vec2"), "Vec2");

        let nested = Context {
            prefix: "App::Gfx".to_string(),
            ..Context::default()
        };
        assert_eq!(nested.qualify("Vec2"), "App::Gfx::Vec2");
    }

    #[test]
    fn test_aliases_resolve_through_const_and_typedef()
    {
        let options = BuildOptions::default();
        let mut state = LoadState::new(&options);
        let float = state.table.base_type("float", BasicType::Float, 4);

        let key = |offset| DieKey { unit: 0, offset };
        state.dies.insert(key(1), Die::Symbol(float));
        state.dies.insert(key(2), Die::Alias {
            target: Some(key(1)),
            is_const: false,
        });
        state.dies.insert(key(3), Die::Alias {
            target: Some(key(2)),
            is_const: true,
        });

        assert_eq!(state.resolve(key(2), 0), Some(float));
        let constant = state.resolve(key(3), 0).unwrap();
        assert_ne!(constant, float);
        assert!(state.table.symbol(constant).unwrap().is_const);
        assert_eq!(state.resolve(key(3), 0), Some(constant));
    }

    #[test]
    fn test_declarations_resolve_to_definitions()
    {
        let options = BuildOptions::default();
        let mut state = LoadState::new(&options);
        let vec2 = state.table.udt("App::Vec2", 8);
        state.definitions.insert("App::Vec2".to_string(), vec2);

        let key = DieKey { unit: 1, offset: 40 };
        state.dies.insert(key, Die::Declaration {
            name: "App::Vec2".to_string(),
            tag: SymbolTag::Udt,
        });
        assert_eq!(state.resolve(key, 0), Some(vec2));

        let missing = DieKey { unit: 1, offset: 80 };
        state.dies.insert(missing, Die::Declaration {
            name: "App::Opaque".to_string(),
            tag: SymbolTag::Udt,
        });
        let placeholder = state.resolve(missing, 0).unwrap();
        assert_eq!(state.table.symbol(placeholder).unwrap().name(), "App::Opaque");
    }

    #[test]
    fn test_alias_cycles_stop()
    {
        let options = BuildOptions::default();
        let mut state = LoadState::new(&options);
        let a = DieKey { unit: 0, offset: 1 };
        let b = DieKey { unit: 0, offset: 2 };
        state.dies.insert(a, Die::Alias {
            target: Some(b),
            is_const: false,
        });
        state.dies.insert(b, Die::Alias {
            target: Some(a),
            is_const: false,
        });
        assert_eq!(state.resolve(a, 0), None);
    }
}
