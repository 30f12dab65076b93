//! Tests for the emitter schema and the tree printer

use symgraph_core::builder::{BuildOutput, SymbolGraphBuilder};
use symgraph_core::model::schema::{
    ATTRIBUTE_SCHEMA, ENUM_ENTRY_SCHEMA, FIELD_SCHEMA, FUNCTION_SCHEMA, PARAMETER_SCHEMA, TYPE_SCHEMA,
};
use symgraph_core::model::{Attribute, AttributeKind, EnumEntry, Name, SchemaValue, ValueKind};
use symgraph_core::options::BuildOptions;
use symgraph_core::symbols::{BasicType, SymbolTable};
use symgraph_core::types::Address;

fn vec2_model() -> BuildOutput
{
    let mut table = SymbolTable::new();
    let float = table.base_type("float", BasicType::Float, 4);
    let vec2 = table.udt("App::Gfx::Vec2", 8);
    table.symbol_mut(vec2).unwrap().has_constructor = true;
    table.member(vec2, "x", float, 0);
    table.member(vec2, "y", float, 4);
    let constructor = table.method(vec2, "App::Gfx::Vec2::Vec2", Address::new(0x1000), None);
    table.this_parameter(constructor, vec2);
    table.set_accessor("App::Gfx::Vec2", Some(Address::new(0x4000)));
    table.register(float, false, false);
    table.register(vec2, false, false);

    let options = BuildOptions::default();
    SymbolGraphBuilder::new(&table, &options).build().unwrap()
}

fn names<T>(schema: &[symgraph_core::model::FieldDescriptor<T>]) -> Vec<&'static str>
{
    schema.iter().map(|descriptor| descriptor.name).collect()
}

#[test]
fn test_type_schema_layout()
{
    assert_eq!(
        names(TYPE_SCHEMA),
        [
            "name",
            "full_name",
            "kind",
            "unique_id",
            "size",
            "type_of_address",
            "minimal_reflection",
            "is_pod",
            "constructor",
            "destructor",
            "copy_constructor",
            "assignment_operator",
            "template",
            "first_argument",
            "second_argument",
        ]
    );
    assert_eq!(TYPE_SCHEMA[0].kind, ValueKind::Name);
    assert_eq!(TYPE_SCHEMA[12].kind, ValueKind::TypeRef);
}

#[test]
fn test_class_values()
{
    let output = vec2_model();
    let module = &output.module;
    let scope = module.scope(module.find("App::Gfx::Vec2").unwrap());
    let read = |name: &str| {
        let descriptor = TYPE_SCHEMA.iter().find(|descriptor| descriptor.name == name).unwrap();
        descriptor.read(module, scope).to_string()
    };

    assert_eq!(read("name"), Name::new("Vec2").hash().to_string());
    assert_eq!(read("full_name"), Name::new("App::Gfx::Vec2").hash().to_string());
    assert_eq!(read("kind"), "class");
    assert_eq!(read("unique_id"), "1");
    assert_eq!(read("size"), "8");
    assert_eq!(read("type_of_address"), "16384");
    assert_eq!(read("is_pod"), "0");
    assert_eq!(read("constructor"), "0");
    assert_eq!(read("destructor"), "-1");
    assert_eq!(read("template"), "-1");
}

#[test]
fn test_defaults_are_detected()
{
    let output = vec2_model();
    let module = &output.module;
    let scope = module.scope(module.find("App::Gfx::Vec2").unwrap());

    let is_default = |name: &str| {
        TYPE_SCHEMA
            .iter()
            .find(|descriptor| descriptor.name == name)
            .unwrap()
            .is_default(module, scope)
    };

    assert!(is_default("minimal_reflection"));
    assert!(is_default("is_pod"));
    assert!(is_default("destructor"));
    assert!(!is_default("constructor"));
    assert!(!is_default("type_of_address"));
    assert!(!is_default("name"));
}

#[test]
fn test_namespace_reads_type_fields_as_absent()
{
    let output = vec2_model();
    let module = &output.module;
    let scope = module.scope(module.find("App::Gfx").unwrap());

    assert_eq!(TYPE_SCHEMA[2].read(module, scope), SchemaValue::Label("namespace"));
    assert_eq!(TYPE_SCHEMA[3].read(module, scope), SchemaValue::Absent);
}

#[test]
fn test_field_and_function_values()
{
    let output = vec2_model();
    let module = &output.module;
    let id = module.find("App::Gfx::Vec2").unwrap();
    let float = module.type_info(module.find("float").unwrap()).unwrap();

    let y = &module.type_info(id).unwrap().fields()[1];
    let offset = FIELD_SCHEMA.iter().find(|descriptor| descriptor.name == "offset").unwrap();
    assert_eq!(offset.read(module, y), SchemaValue::Int(4));
    assert_eq!(FIELD_SCHEMA[1].read(module, y).to_string(), float.unique_id().to_string());

    let constructor = &module.scope(id).functions()[0];
    assert_eq!(FUNCTION_SCHEMA[1].read(module, constructor), SchemaValue::Address(Address::new(0x1000)));
    assert_eq!(FUNCTION_SCHEMA[2].read(module, constructor), SchemaValue::Absent);
    assert_eq!(FUNCTION_SCHEMA[3].read(module, constructor), SchemaValue::Int(1));

    let this = &constructor.parameters[0];
    let modifier = PARAMETER_SCHEMA.iter().find(|descriptor| descriptor.name == "modifier").unwrap();
    assert_eq!(modifier.read(module, this), SchemaValue::Label("pointer"));
    assert!(!modifier.is_default(module, this));
}

#[test]
fn test_attribute_and_entry_values()
{
    let output = vec2_model();
    let module = &output.module;

    let priority = Attribute {
        name: Name::new("Priority"),
        kind: AttributeKind::Integer,
        value: Some("5".to_string()),
    };
    assert_eq!(ATTRIBUTE_SCHEMA[1].read(module, &priority), SchemaValue::Label("int"));
    assert_eq!(ATTRIBUTE_SCHEMA[2].read(module, &priority), SchemaValue::Text("5"));

    let flag = Attribute {
        name: Name::new("Replicated"),
        kind: AttributeKind::Boolean,
        value: None,
    };
    assert_eq!(ATTRIBUTE_SCHEMA[1].read(module, &flag), SchemaValue::Label("bool"));
    assert!(ATTRIBUTE_SCHEMA[2].is_default(module, &flag));

    let entry = EnumEntry {
        name: Name::new("Auto"),
        value: -1,
    };
    assert_eq!(ENUM_ENTRY_SCHEMA[1].read(module, &entry), SchemaValue::Int(-1));
}

#[test]
fn test_tree_rendering()
{
    let output = vec2_model();
    let tree = output.module.tree().to_string();
    let lines: Vec<&str> = tree.lines().collect();

    assert_eq!(lines[0], "namespace Global");
    assert_eq!(lines[1], "  namespace App");
    assert_eq!(lines[2], "    namespace Gfx");
    assert!(lines[3].starts_with("      class Vec2 ["));
    assert!(lines[3].contains("constructor=0"));
    assert!(lines[4].starts_with("        field x: float [offset=0]"));
    assert!(lines[5].starts_with("        field y: float [offset=4]"));
    assert!(lines[6].starts_with("        fn[0] Vec2(App::Gfx::Vec2* this) -> void"));
    assert!(lines[6].ends_with("<constructor>"));
    assert!(lines[7].starts_with("  base type float"));
}
