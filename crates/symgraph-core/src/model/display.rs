//! Human-readable tree rendering of a [`Module`].
//!
//! The printer walks scopes in the fixed child-category order and prints the
//! non-default schema fields of every entity, so what a reader sees is what
//! an emitter would write, with names spelled out instead of hashed.

use std::fmt::{self, Write as _};

use super::module::Module;
use super::schema::{
    FieldDescriptor, SchemaValue, ATTRIBUTE_SCHEMA, ENUM_ENTRY_SCHEMA, FIELD_SCHEMA, FUNCTION_SCHEMA,
    PARAMETER_SCHEMA, TYPE_SCHEMA,
};
use super::scope::ScopeId;
use super::name::Name;
use super::types::{Attribute, Parameter, TypeModifier};

/// Fields already shown in the line header.
const HEADER_FIELDS: &[&str] = &["name", "full_name", "kind", "type", "attribute_count", "parameter_count"];

/// `Display` adapter returned by [`Module::tree`].
pub struct ModuleTree<'a>
{
    module: &'a Module,
}

impl Module
{
    /// Render the namespace tree, one entity per line.
    ///
    /// ```rust
    /// use symgraph_core::model::Module;
    ///
    /// let module = Module::new();
    /// assert_eq!(module.tree().to_string(), "namespace Global\n");
    /// ```
    pub fn tree(&self) -> ModuleTree<'_>
    {
        ModuleTree { module: self }
    }
}

impl fmt::Display for ModuleTree<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        self.write_scope(f, self.module.root(), 0)
    }
}

impl ModuleTree<'_>
{
    fn write_scope(&self, f: &mut fmt::Formatter<'_>, id: ScopeId, depth: usize) -> fmt::Result
    {
        let module = self.module;
        let scope = module.scope(id);
        let indent = "  ".repeat(depth);

        let kind = TYPE_SCHEMA[2].read(module, scope);
        write!(f, "{indent}{} {}", render(&kind), scope.name())?;
        write_properties(f, module, scope, TYPE_SCHEMA)?;
        writeln!(f)?;

        if let Some(info) = scope.as_type() {
            write_attributes(f, &indent, module, info.attributes())?;

            for field in info.fields() {
                write!(f, "{indent}  field {}: {}", optional_text(field.name()), type_label(module, &field.parameter))?;
                write_properties(f, module, field, FIELD_SCHEMA)?;
                writeln!(f)?;
                write_attributes(f, &format!("{indent}  "), module, &field.attributes)?;
            }

            if let Some(data) = info.as_enum() {
                for entry in &data.entries {
                    write!(f, "{indent}  {} =", entry.name)?;
                    writeln!(f, " {}", ENUM_ENTRY_SCHEMA[1].read(module, entry))?;
                }
            }
        }

        for (index, function) in scope.functions().iter().enumerate() {
            let parameters: Vec<String> = function
                .parameters
                .iter()
                .map(|parameter| {
                    let mut text = type_label(module, parameter);
                    if let Some(name) = &parameter.name {
                        let _ = write!(text, " {name}");
                    }
                    if parameter.is_const {
                        text.insert_str(0, "const ");
                    }
                    text
                })
                .collect();
            let returns = function
                .return_parameter
                .as_ref()
                .map_or_else(|| "void".to_string(), |parameter| type_label(module, parameter));

            write!(f, "{indent}  fn[{index}] {}({}) -> {returns}", function.name, parameters.join(", "))?;
            write_properties(f, module, function, FUNCTION_SCHEMA)?;
            if let Some(role) = function.special {
                write!(f, " <{role}>")?;
            }
            writeln!(f)?;
            write_attributes(f, &format!("{indent}  "), module, &function.attributes)?;
        }

        for (_, child) in scope.children().iter() {
            self.write_scope(f, child, depth + 1)?;
        }
        Ok(())
    }
}

fn write_properties<T>(
    f: &mut fmt::Formatter<'_>,
    module: &Module,
    entity: &T,
    schema: &[FieldDescriptor<T>],
) -> fmt::Result
{
    let mut first = true;
    for descriptor in schema {
        if HEADER_FIELDS.contains(&descriptor.name) || descriptor.is_default(module, entity) {
            continue;
        }
        let value = descriptor.read(module, entity);
        if value == SchemaValue::Absent {
            continue;
        }
        f.write_str(if first { " [" } else { ", " })?;
        first = false;
        write!(f, "{}={}", descriptor.name, render(&value))?;
    }
    if !first {
        f.write_str("]")?;
    }
    Ok(())
}

fn write_attributes(
    f: &mut fmt::Formatter<'_>,
    indent: &str,
    module: &Module,
    attributes: &[Attribute],
) -> fmt::Result
{
    for attribute in attributes {
        write!(f, "{indent}  #[{}", attribute.name)?;
        let value = ATTRIBUTE_SCHEMA[2].read(module, attribute);
        if value != SchemaValue::Absent {
            write!(f, " = {}", render(&value))?;
        }
        writeln!(f, "]")?;
    }
    Ok(())
}

fn render(value: &SchemaValue<'_>) -> String
{
    match value {
        SchemaValue::Name(name) => name.text().to_string(),
        SchemaValue::Type { full_name, .. } => full_name.text().to_string(),
        SchemaValue::Address(address) => address.to_string(),
        SchemaValue::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn optional_text(name: Option<&Name>) -> &str
{
    name.map_or("<unnamed>", Name::text)
}

fn type_label(module: &Module, parameter: &Parameter) -> String
{
    let mut label = match PARAMETER_SCHEMA[1].read(module, parameter) {
        SchemaValue::Type { full_name, .. } => full_name.text().to_string(),
        _ => "?".to_string(),
    };
    match parameter.modifier {
        TypeModifier::Value => {}
        TypeModifier::Pointer => label.push('*'),
        TypeModifier::Reference => label.push('&'),
    }
    for length in parameter.array_lengths.iter().take(usize::from(parameter.array_rank)) {
        let _ = write!(label, "[{length}]");
    }
    label
}
