//! # Symbol Graph Builder
//!
//! Turns a [`SymbolSource`] into a reflection [`Module`].
//!
//! ## Passes
//!
//! 1. **Registrations**: every registration entry becomes a type placed in
//!    its namespace (namespaces are created on demand). Templates become
//!    placeholders; enums get their entries right away.
//! 2. **Class walk**: every class reachable from the global namespace has
//!    its members walked in declaration order. Nested enums and classes are
//!    created as they're met, data members become fields, member functions
//!    are reflected and classified, and attribute marker functions drive the
//!    attribute scopes.
//!
//! Template instances are created on demand whenever a field, parameter or
//! return type names one.
//!
//! ## Failure Policy
//!
//! Only an unavailable symbol source fails a build. Everything else (an
//! unresolved field type, an unknown registration, a malformed attribute
//! list) becomes a [`Diagnostic`] and the build carries on with the rest.
//!
//! ## Example
//!
//! ```rust
//! use symgraph_core::builder::SymbolGraphBuilder;
//! use symgraph_core::options::BuildOptions;
//! use symgraph_core::symbols::{BasicType, SymbolTable};
//!
//! let mut table = SymbolTable::new();
//! let float = table.base_type("float", BasicType::Float, 4);
//! let vec2 = table.udt("App::Vec2", 8);
//! table.member(vec2, "x", float, 0);
//! table.register(float, false, false);
//! table.register(vec2, false, false);
//!
//! let options = BuildOptions::default();
//! let output = SymbolGraphBuilder::new(&table, &options).build()?;
//! let vec2 = output.module.find("App::Vec2").unwrap();
//! assert_eq!(output.module.type_info(vec2).unwrap().fields().len(), 1);
//! # Ok::<(), symgraph_core::error::SymgraphError>(())
//! ```

mod classify;
mod diagnostics;
mod parameter;
mod template;

use std::collections::HashMap;

pub use classify::classify;
pub use diagnostics::{BuildOutput, BuildStats, Diagnostic, Severity};
pub use parameter::{primitive_type_name, type_name, MAX_ARRAY_LENGTH, MAX_ARRAY_RANK};
pub use template::{template_arguments, MAX_TEMPLATE_ARGUMENTS};

use crate::attributes::AttributeScopes;
use crate::error::Result;
use crate::model::{
    split_qualified, Attribute, ClassData, EnumData, EnumEntry, Field, Function, Module, NewType, Parameter, ScopeCategory,
    ScopeId, TypeKind, TypeRegistry,
};
use crate::options::{BuildOptions, Marker};
use crate::symbols::{AccessorLookup, DataKind, Registration, Symbol, SymbolId, SymbolSource, SymbolTag};
use crate::types::Address;

/// One build session over a symbol source.
///
/// The builder owns every piece of mutable state a build needs (type
/// registry, attribute scopes, symbol associations), so independent builds
/// never share anything.
pub struct SymbolGraphBuilder<'a, S: SymbolSource + ?Sized>
{
    source: &'a S,
    options: &'a BuildOptions,
    module: Module,
    registry: TypeRegistry,
    attributes: AttributeScopes,
    /// Symbol each type was created from.
    symbols: HashMap<ScopeId, SymbolId>,
    diagnostics: Vec<Diagnostic>,
    stats: BuildStats,
}

impl<'a, S: SymbolSource + ?Sized> SymbolGraphBuilder<'a, S>
{
    pub fn new(source: &'a S, options: &'a BuildOptions) -> Self
    {
        Self {
            source,
            options,
            module: Module::new(),
            registry: TypeRegistry::new(),
            attributes: AttributeScopes::new(),
            symbols: HashMap::new(),
            diagnostics: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    /// Run both passes and hand back the model.
    ///
    /// ## Errors
    ///
    /// Returns the source's error when it can't list its registrations
    /// (`SourceUnavailable`). No partial model is produced in that case.
    pub fn build(mut self) -> Result<BuildOutput>
    {
        let registrations = self.source.registrations()?;
        tracing::debug!(count = registrations.len(), "loading reflected types");

        for registration in registrations {
            self.stats.registrations += 1;
            self.register_type(registration);
        }

        let root = self.module.root();
        self.reflect_classes(root);

        self.stats.types = self.module.type_count();
        tracing::info!(
            registrations = self.stats.registrations,
            types = self.stats.types,
            template_instances = self.stats.template_instances,
            fields = self.stats.fields,
            functions = self.stats.functions,
            dropped_fields = self.stats.dropped_fields,
            dropped_functions = self.stats.dropped_functions,
            warnings = self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count(),
            errors = self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count(),
            "symbol graph built"
        );

        Ok(BuildOutput {
            module: self.module,
            diagnostics: self.diagnostics,
            stats: self.stats,
        })
    }

    fn warn(&mut self, scope: &str, message: impl Into<String>)
    {
        let message = message.into();
        tracing::warn!(scope, "{message}");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            scope: scope.to_string(),
            message,
        });
    }

    fn error(&mut self, scope: &str, message: impl Into<String>)
    {
        let message = message.into();
        tracing::error!(scope, "{message}");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            scope: scope.to_string(),
            message,
        });
    }

    /// Accessor address for `lookup_name`, zero when there is none.
    fn type_of_address(&mut self, lookup_name: &str, scope: &str) -> Address
    {
        match self.source.type_of_address(lookup_name) {
            AccessorLookup::Resolved(address) => address,
            AccessorLookup::MissingStatic => {
                self.warn(scope, format!("couldn't find the type accessor static for {lookup_name}"));
                Address::ZERO
            }
            AccessorLookup::Absent => {
                tracing::trace!(scope, "no type accessor");
                Address::ZERO
            }
        }
    }

    /// Attributes for the next field or function, closing a pending set.
    fn entity_attributes(&mut self, scope: &str) -> Vec<Attribute>
    {
        match self.attributes.take_for_entity() {
            Ok(attributes) => attributes,
            Err(e) => {
                self.error(scope, e.to_string());
                Vec::new()
            }
        }
    }

    fn full_name(&self, id: ScopeId) -> String
    {
        self.module.scope(id).full_name().text().to_string()
    }

    fn is_minimal(&self, id: ScopeId) -> bool
    {
        self.module.type_info(id).is_some_and(|info| info.minimal_reflection())
    }

    // ---------------------------------------------------------------------
    // Registrations
    // ---------------------------------------------------------------------

    fn register_type(&mut self, registration: Registration)
    {
        let source = self.source;
        let Some(symbol) = source.symbol(registration.type_symbol) else {
            self.error("", format!("registration refers to unknown symbol {}", registration.type_symbol));
            return;
        };

        let literal_name = type_name(symbol);
        if !registration.is_template && !matches!(symbol.tag, SymbolTag::BaseType | SymbolTag::Udt | SymbolTag::Enum) {
            self.error(symbol.name(), format!("can not reflect {} type {}", symbol.tag, registration.type_symbol));
            return;
        }

        let full_name = if registration.is_template {
            match literal_name.find('<') {
                Some(open) => literal_name[..open].to_string(),
                None => {
                    self.error(&literal_name, "template registration without an argument list");
                    return;
                }
            }
        } else {
            literal_name
        };

        if full_name.is_empty() {
            self.error("", format!("can not reflect unnamed {} {}", symbol.tag, registration.type_symbol));
            return;
        }
        if self.registry.contains(&full_name) {
            self.warn(&full_name, "type is registered more than once, keeping the first registration");
            return;
        }

        let new_type = if registration.is_template {
            NewType {
                size: 0,
                type_of_address: Address::ZERO,
                kind: TypeKind::Template,
            }
        } else {
            match symbol.tag {
                SymbolTag::BaseType => NewType {
                    size: symbol.length,
                    type_of_address: self.type_of_address(&full_name, &full_name),
                    kind: TypeKind::BaseType,
                },
                SymbolTag::Udt => NewType {
                    size: symbol.length,
                    type_of_address: self.type_of_address(&full_name, &full_name),
                    kind: TypeKind::Class(ClassData {
                        is_pod: !symbol.has_constructor,
                        ..ClassData::default()
                    }),
                },
                SymbolTag::Enum => NewType {
                    size: symbol.length,
                    type_of_address: self.type_of_address(&format!("enum {full_name}"), &full_name),
                    kind: TypeKind::Enum(EnumData::default()),
                },
                _ => return,
            }
        };

        let (namespace, local_name) = self.module.find_or_create_namespace(&full_name);
        let id = self.module.add_type(namespace, local_name, new_type);
        tracing::debug!(
            scope = %full_name,
            kind = self.module.type_info(id).map_or("", |info| info.kind().label()),
            "registered type"
        );

        if registration.minimal {
            if let Some(info) = self.module.type_info_mut(id) {
                info.minimal_reflection = true;
            }
            tracing::trace!(scope = %full_name, "minimal reflection");
        }

        let _ = self.registry.insert(full_name, id);
        self.symbols.insert(id, registration.type_symbol);

        if symbol.tag == SymbolTag::Enum && !registration.is_template {
            self.load_enum_entries(id, registration.type_symbol);
        }
    }

    fn load_enum_entries(&mut self, id: ScopeId, symbol_id: SymbolId)
    {
        let source = self.source;
        let scope = self.full_name(id);
        let _span = tracing::trace_span!("enum", scope = %scope).entered();

        for &child in source.children(symbol_id) {
            let Some(entry) = source.symbol(child) else {
                continue;
            };
            if entry.tag != SymbolTag::Data {
                continue;
            }

            // Entries are stored at the enum's width; the model holds 32 bits.
            let value = entry.value.unwrap_or_default() as i32;
            let name = self.module.names_mut().intern(entry.name());
            tracing::trace!(entry = %name, value, "enum entry");

            if let Some(TypeKind::Enum(data)) = self.module.type_info_mut(id).map(|info| &mut info.kind) {
                data.entries.push(EnumEntry { name, value });
            }
        }
    }

    // ---------------------------------------------------------------------
    // Class walk
    // ---------------------------------------------------------------------

    /// Walk the classes of a namespace, then its nested namespaces.
    fn reflect_classes(&mut self, namespace: ScopeId)
    {
        let mut index = 0;
        while let Some(&class) = self
            .module
            .scope(namespace)
            .children()
            .get(ScopeCategory::Class)
            .get(index)
        {
            index += 1;
            self.reflect_class(class);
        }

        let mut index = 0;
        while let Some(&nested) = self
            .module
            .scope(namespace)
            .children()
            .get(ScopeCategory::Namespace)
            .get(index)
        {
            index += 1;
            self.reflect_classes(nested);
        }
    }

    fn reflect_class(&mut self, class: ScopeId)
    {
        let Some(&symbol_id) = self.symbols.get(&class) else {
            return;
        };
        let source = self.source;
        let scope = self.full_name(class);
        let _span = tracing::debug_span!("class", scope = %scope).entered();

        for &child in source.children(symbol_id) {
            let Some(member) = source.symbol(child) else {
                continue;
            };
            match member.tag {
                SymbolTag::Enum => self.reflect_nested_enum(class, child, member),
                SymbolTag::Udt => self.reflect_nested_class(class, child, member),
                SymbolTag::Data => self.reflect_field(class, member),
                SymbolTag::Function => self.reflect_method(class, child, member),
                _ => {}
            }
        }

        self.attributes.pop_all();
    }

    fn reflect_nested_enum(&mut self, owner: ScopeId, symbol_id: SymbolId, symbol: &Symbol)
    {
        if self.is_minimal(owner) {
            return;
        }

        let (_, local_name) = split_qualified(symbol.name());
        let full_name = format!("{}::{local_name}", self.full_name(owner));

        let existing = self.registry.get(&full_name);
        let id = match existing {
            Some(id) if local_name == self.options.anonymous_tag => {
                if self.module.type_info(id).and_then(|info| info.as_enum()).is_none() {
                    self.warn(&full_name, "anonymous enum collides with a type that isn't an enum");
                    return;
                }
                tracing::trace!(scope = %full_name, "merging anonymous enum");
                // Merged entries don't carry attributes, but a pending set is still used up.
                let _ = self.entity_attributes(&full_name);
                id
            }
            Some(_) => {
                self.warn(&full_name, "nested enum is already registered, skipping");
                return;
            }
            None => {
                let type_of_address = self.type_of_address(&format!("enum {full_name}"), &full_name);
                let attributes = self.entity_attributes(&full_name);
                let id = self.module.add_type(owner, local_name, NewType {
                    size: symbol.length,
                    type_of_address,
                    kind: TypeKind::Enum(EnumData {
                        entries: Vec::new(),
                        attributes,
                    }),
                });
                let _ = self.registry.insert(full_name, id);
                self.symbols.insert(id, symbol_id);
                id
            }
        };

        self.load_enum_entries(id, symbol_id);
    }

    fn reflect_nested_class(&mut self, owner: ScopeId, symbol_id: SymbolId, symbol: &Symbol)
    {
        if self.is_minimal(owner) {
            return;
        }

        let (_, local_name) = split_qualified(symbol.name());
        let full_name = format!("{}::{local_name}", self.full_name(owner));
        if self.registry.contains(&full_name) {
            self.warn(&full_name, "nested class is already registered, skipping");
            return;
        }

        let type_of_address = self.type_of_address(&full_name, &full_name);
        let attributes = self.entity_attributes(&full_name);
        let id = self.module.add_type(owner, local_name, NewType {
            size: symbol.length,
            type_of_address,
            kind: TypeKind::Class(ClassData {
                is_pod: !symbol.has_constructor,
                fields: Vec::new(),
                attributes,
            }),
        });
        let _ = self.registry.insert(full_name, id);
        self.symbols.insert(id, symbol_id);

        // The nested walk gets its own attribute scopes.
        let enclosing = std::mem::take(&mut self.attributes);
        self.reflect_class(id);
        self.attributes = enclosing;
    }

    fn reflect_field(&mut self, owner: ScopeId, symbol: &Symbol)
    {
        if self.is_minimal(owner) || symbol.data_kind != DataKind::Member {
            return;
        }

        let _span = tracing::trace_span!("field", name = symbol.name()).entered();
        let scope = self.full_name(owner);
        let attributes = self.entity_attributes(&scope);

        match self.reflect_parameter(symbol) {
            Some(parameter) => {
                let field = Field {
                    parameter,
                    offset: symbol.offset,
                    attributes,
                };
                if let Some(TypeKind::Class(data)) = self.module.type_info_mut(owner).map(|info| &mut info.kind) {
                    data.fields.push(field);
                    self.stats.fields += 1;
                }
            }
            None => {
                self.warn(
                    &scope,
                    format!("field '{}' not reflected due to unknown type", symbol.name()),
                );
                self.stats.dropped_fields += 1;
            }
        }
    }

    /// Minimal method pass: only functions, no markers, no attributes.
    fn reflect_methods(&mut self, owner: ScopeId)
    {
        let Some(&symbol_id) = self.symbols.get(&owner) else {
            return;
        };
        let source = self.source;
        for &child in source.children(symbol_id) {
            if let Some(member) = source.symbol(child) {
                if member.tag == SymbolTag::Function {
                    self.reflect_method(owner, child, member);
                }
            }
        }
    }

    fn reflect_method(&mut self, owner: ScopeId, symbol_id: SymbolId, symbol: &Symbol)
    {
        if !symbol.virtual_address.is_resolved() {
            tracing::trace!(name = symbol.name(), "skipping function without an address");
            return;
        }

        let scope = self.full_name(owner);
        let qualified = symbol.name();
        let local_name = qualified
            .strip_prefix(scope.as_str())
            .and_then(|rest| rest.strip_prefix("::"))
            .unwrap_or(qualified);
        let minimal = self.is_minimal(owner);

        if !minimal {
            if let Some(marker) = self.options.marker(local_name) {
                self.apply_marker(&scope, marker, symbol_id);
                return;
            }
        }

        let _span = tracing::trace_span!("method", name = local_name).entered();
        // A pending set is used up even when the method is dropped.
        let attributes = if minimal { Vec::new() } else { self.entity_attributes(&scope) };

        let Some((parameters, return_parameter)) = self.reflect_signature(symbol_id, symbol) else {
            if !minimal {
                self.warn(
                    &scope,
                    format!("method '{local_name}' not reflected due to missing parameter type"),
                );
                self.stats.dropped_functions += 1;
            }
            return;
        };

        let mut function = Function {
            name: self.module.names_mut().intern(local_name),
            address: symbol.virtual_address,
            return_parameter,
            parameters,
            attributes,
            special: None,
        };

        let role = classify(&self.module, owner, &function);
        if minimal && role.is_none() {
            return;
        }
        function.special = role;

        let index = self.module.push_function(owner, function);
        self.stats.functions += 1;
        tracing::trace!(name = local_name, index, "method");

        if let Some(role) = role {
            let Some(info) = self.module.type_info_mut(owner) else {
                return;
            };
            match info.special.get(role) {
                Some(first) => {
                    self.warn(
                        &scope,
                        format!("'{local_name}' is another {role}, keeping the one at index {first}"),
                    );
                }
                None => info.special.set(role, index),
            }
        }
    }

    /// `this` plus formal parameters, and the return value.
    ///
    /// `None` when any of them doesn't resolve. A `void` return gives no
    /// return parameter.
    fn reflect_signature(&mut self, symbol_id: SymbolId, symbol: &Symbol) -> Option<(Vec<Parameter>, Option<Parameter>)>
    {
        let source = self.source;
        let mut parameters = Vec::new();
        for &child in source.children(symbol_id) {
            let Some(parameter) = source.symbol(child) else {
                continue;
            };
            if parameter.tag != SymbolTag::Data || !matches!(parameter.data_kind, DataKind::Param | DataKind::ObjectPtr) {
                continue;
            }
            parameters.push(self.reflect_parameter(parameter)?);
        }

        let return_parameter = match symbol.type_id {
            None => None,
            Some(return_type) if source.symbol(return_type).is_some_and(parameter::is_void) => None,
            Some(return_type) => Some(self.reflect_type(return_type, None)?),
        };

        Some((parameters, return_parameter))
    }

    fn apply_marker(&mut self, scope: &str, marker: Marker, symbol_id: SymbolId)
    {
        let source = self.source;
        let text = source.annotation(symbol_id).unwrap_or_default();

        let result = match marker {
            Marker::Push => {
                tracing::debug!(scope, attributes = text, "push attributes");
                self.attributes.push(text, self.module.names_mut()).map(|_| ())
            }
            Marker::Set => {
                if self.attributes.is_single_shot_pending() {
                    self.warn(scope, "attributes can't be set more than once");
                    return;
                }
                tracing::debug!(scope, attributes = text, "set attributes");
                self.attributes.push_single_shot(text, self.module.names_mut()).map(|_| ())
            }
            Marker::Pop => {
                tracing::debug!(scope, "pop attributes");
                self.attributes.pop().map(|_| ())
            }
        };

        if let Err(e) = result {
            self.error(scope, e.to_string());
        }
    }
}
