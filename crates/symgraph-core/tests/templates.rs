//! Tests for template registration and on-demand template instances

use symgraph_core::builder::{template_arguments, BuildOutput, SymbolGraphBuilder};
use symgraph_core::model::{ScopeCategory, SpecialMember, TypeKind};
use symgraph_core::options::BuildOptions;
use symgraph_core::symbols::{BasicType, SymbolTable};
use symgraph_core::types::Address;

fn build(table: &SymbolTable) -> BuildOutput
{
    let options = BuildOptions::default();
    SymbolGraphBuilder::new(table, &options).build().unwrap()
}

#[test]
fn test_template_registers_as_placeholder()
{
    let mut table = SymbolTable::new();
    let pattern = table.udt("Vector<int>", 24);
    table.register(pattern, true, false);

    let output = build(&table);
    let module = &output.module;
    let id = module.find("Vector").unwrap();

    assert_eq!(module.type_info(id).unwrap().kind(), &TypeKind::Template);
    assert!(module.find("Vector<int>").is_none());
    assert_eq!(output.stats.template_instances, 0);
}

#[test]
fn test_field_creates_instance_next_to_template()
{
    let mut table = SymbolTable::new();
    let foo = table.udt("Foo", 4);
    let pattern = table.udt("Vector<int>", 24);
    let instance = table.udt("Vector<Foo>", 24);
    let holder = table.udt("Holder", 48);
    table.member(holder, "items", instance, 0);
    table.member(holder, "more", instance, 24);
    table.register(foo, false, false);
    table.register(pattern, true, false);
    table.register(holder, false, false);

    let output = build(&table);
    let module = &output.module;
    let template = module.find("Vector").unwrap();
    let foo = module.find("Foo").unwrap();

    let instances = module.scope(module.root()).children().get(ScopeCategory::TemplateInstance);
    assert_eq!(instances.len(), 1);
    let id = instances[0];
    assert_eq!(module.scope(id).name().text(), "Vector<Foo>");

    let info = module.type_info(id).unwrap();
    assert!(info.minimal_reflection());
    assert_eq!(info.size(), 24);
    let data = info.as_template_instance().unwrap();
    assert_eq!(data.template, template);
    assert_eq!(data.first_argument, foo);
    assert_eq!(data.second_argument, None);

    let fields = module.type_info(module.find("Holder").unwrap()).unwrap().fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].parameter.ty, id);
    assert_eq!(fields[1].parameter.ty, id);
    assert_eq!(output.stats.template_instances, 1);
}

#[test]
fn test_namespaced_template_instance_strips_parent_qualifier()
{
    let mut table = SymbolTable::new();
    let foo = table.udt("Core::Foo", 4);
    let pattern = table.udt("Core::Vector<int>", 24);
    let instance = table.udt("Core::Vector<Core::Foo>", 24);
    let holder = table.udt("Game::Holder", 24);
    table.member(holder, "items", instance, 0);
    table.register(foo, false, false);
    table.register(pattern, true, false);
    table.register(holder, false, false);

    let output = build(&table);
    let module = &output.module;
    let core = module.find("Core").unwrap();

    let instance = module
        .find_child(core, ScopeCategory::TemplateInstance, "Vector<Core::Foo>")
        .unwrap();
    assert_eq!(module.scope(instance).full_name().text(), "Core::Vector<Core::Foo>");
    assert!(module.find("Core::Foo").is_some());
}

#[test]
fn test_second_argument_is_optional()
{
    let mut table = SymbolTable::new();
    let int = table.base_type("int", BasicType::Int, 4);
    let foo = table.udt("Foo", 4);
    let pattern = table.udt("Map<int, int>", 32);
    let known = table.udt("Map<Foo, int>", 32);
    let unknown = table.udt("Map<int, Bar>", 32);
    let holder = table.udt("Holder", 64);
    table.member(holder, "known", known, 0);
    table.member(holder, "unknown", unknown, 32);
    table.register(int, false, false);
    table.register(foo, false, false);
    table.register(pattern, true, false);
    table.register(holder, false, false);

    let output = build(&table);
    let module = &output.module;

    let known = module.find_child(module.root(), ScopeCategory::TemplateInstance, "Map<Foo, int>").unwrap();
    let data = module.type_info(known).unwrap().as_template_instance().unwrap();
    assert_eq!(data.first_argument, module.find("Foo").unwrap());
    assert_eq!(data.second_argument, module.find("int"));

    let unknown = module.find_child(module.root(), ScopeCategory::TemplateInstance, "Map<int, Bar>").unwrap();
    assert_eq!(module.type_info(unknown).unwrap().as_template_instance().unwrap().second_argument, None);
}

#[test]
fn test_unresolved_first_argument_drops_the_field()
{
    let mut table = SymbolTable::new();
    let pattern = table.udt("Vector<int>", 24);
    let instance = table.udt("Vector<Bar>", 24);
    let holder = table.udt("Holder", 24);
    table.member(holder, "items", instance, 0);
    table.register(pattern, true, false);
    table.register(holder, false, false);

    let output = build(&table);

    assert!(output.module.type_info(output.module.find("Holder").unwrap()).unwrap().fields().is_empty());
    assert!(output
        .warnings()
        .any(|diagnostic| diagnostic.message.contains("field 'items'")));
    assert_eq!(output.stats.template_instances, 0);
}

#[test]
fn test_instance_keeps_only_special_members()
{
    let mut table = SymbolTable::new();
    let int = table.base_type("int", BasicType::Int, 4);
    let foo = table.udt("Foo", 4);
    let pattern = table.udt("Vector<int>", 24);
    let instance = table.udt("Vector<Foo>", 24);
    let constructor = table.method(instance, "Vector<Foo>::Vector<Foo>", Address::new(0x10), None);
    table.this_parameter(constructor, instance);
    let size = table.method(instance, "Vector<Foo>::size", Address::new(0x20), Some(int));
    table.this_parameter(size, instance);
    let destructor = table.method(instance, "Vector<Foo>::~Vector<Foo>", Address::new(0x30), None);
    table.this_parameter(destructor, instance);
    let holder = table.udt("Holder", 24);
    table.member(holder, "items", instance, 0);
    table.register(int, false, false);
    table.register(foo, false, false);
    table.register(pattern, true, false);
    table.register(holder, false, false);

    let output = build(&table);
    let module = &output.module;
    let id = module.find_child(module.root(), ScopeCategory::TemplateInstance, "Vector<Foo>").unwrap();

    let functions = module.scope(id).functions();
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0].special, Some(SpecialMember::Constructor));
    assert_eq!(functions[1].special, Some(SpecialMember::Destructor));

    let special = module.type_info(id).unwrap().special_members();
    assert_eq!(special.constructor(), Some(0));
    assert_eq!(special.destructor(), Some(1));
}

#[test]
fn test_template_registration_needs_arguments()
{
    let mut table = SymbolTable::new();
    let plain = table.udt("Plain", 4);
    table.register(plain, true, false);

    let output = build(&table);
    assert!(output.has_errors());
    assert!(output.module.find("Plain").is_none());
}

#[test]
fn test_template_argument_splitting()
{
    assert_eq!(template_arguments("Vector<Foo>").as_slice(), &["Foo"]);
    assert_eq!(template_arguments("Map<Key, Value>").as_slice(), &["Key", "Value"]);
    assert_eq!(
        template_arguments("Map<Pair<int, int>, Vector<Foo> >").as_slice(),
        &["Pair<int, int>", "Vector<Foo>"]
    );
    assert_eq!(template_arguments("Tuple<A, B, C>").len(), 2);
    assert!(template_arguments("Foo").is_empty());
}
