//! Tests for loading symbols from DWARF debug information
//!
//! The object files are written on the fly: `gimli::write` produces the
//! debug sections and `object::write` wraps them in a relocatable ELF file.

use std::path::PathBuf;

use gimli::write::{Address as DwarfAddress, AttributeValue, DwarfUnit, EndianVec, Expression, Sections, UnitEntryId};
use gimli::{constants, DwTag, Encoding, Format, LittleEndian};
use object::write::Object;
use object::{Architecture, BinaryFormat, Endianness, SectionKind};
use symgraph_core::builder::SymbolGraphBuilder;
use symgraph_core::error::SymgraphError;
use symgraph_core::model::{AttributeKind, SpecialMember};
use symgraph_core::options::BuildOptions;
use symgraph_core::symbols::dwarf::{instance_member_name, live_address, load_symbol_table};
use symgraph_core::symbols::{SymbolSource, SymbolTag};
use symgraph_core::types::Address;

const DW_TAG_LLVM_ANNOTATION: DwTag = DwTag(0x6000);

fn temp_path(name: &str) -> PathBuf
{
    std::env::temp_dir().join(format!("symgraph-{}-{name}", std::process::id()))
}

/// An ELF file holding `sections` and a one-byte `.text`.
fn write_elf(name: &str, sections: &[(&str, Vec<u8>)]) -> PathBuf
{
    let mut object = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let text = object.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    object.append_section_data(text, &[0xc3], 1);

    for (section_name, data) in sections {
        let id = object.add_section(Vec::new(), section_name.as_bytes().to_vec(), SectionKind::Debug);
        object.append_section_data(id, data, 1);
    }

    let path = temp_path(name);
    std::fs::write(&path, object.write().unwrap()).unwrap();
    path
}

fn named(dwarf: &mut DwarfUnit, parent: UnitEntryId, tag: DwTag, name: &str) -> UnitEntryId
{
    let id = dwarf.unit.add(parent, tag);
    dwarf
        .unit
        .get_mut(id)
        .set(constants::DW_AT_name, AttributeValue::String(name.as_bytes().to_vec()));
    id
}

fn set(dwarf: &mut DwarfUnit, id: UnitEntryId, name: gimli::DwAt, value: AttributeValue)
{
    dwarf.unit.get_mut(id).set(name, value);
}

fn pointer_to(dwarf: &mut DwarfUnit, target: UnitEntryId) -> UnitEntryId
{
    let root = dwarf.unit.root();
    let pointer = dwarf.unit.add(root, constants::DW_TAG_pointer_type);
    set(dwarf, pointer, constants::DW_AT_type, AttributeValue::UnitRef(target));
    pointer
}

fn member_function(dwarf: &mut DwarfUnit, class: UnitEntryId, name: &str, address: u64) -> UnitEntryId
{
    let function = named(dwarf, class, constants::DW_TAG_subprogram, name);
    set(
        dwarf,
        function,
        constants::DW_AT_low_pc,
        AttributeValue::Address(DwarfAddress::Constant(address)),
    );
    function
}

fn annotate(dwarf: &mut DwarfUnit, function: UnitEntryId, text: &str)
{
    let annotation = named(dwarf, function, DW_TAG_LLVM_ANNOTATION, "annotate");
    set(
        dwarf,
        annotation,
        constants::DW_AT_const_value,
        AttributeValue::String(text.as_bytes().to_vec()),
    );
}

fn register(dwarf: &mut DwarfUnit, pointer: UnitEntryId)
{
    let root = dwarf.unit.root();
    let function = named(dwarf, root, constants::DW_TAG_subprogram, "RflReflectedTypesTable");
    let argument = named(dwarf, function, constants::DW_TAG_formal_parameter, "arg");
    set(dwarf, argument, constants::DW_AT_type, AttributeValue::UnitRef(pointer));
}

/// Debug information for:
///
/// ```text
/// namespace App {
///     struct Vec2 {
///         PUSH_ATTRIBUTES("Replicated, Priority=5")
///         float x;
///         POP_ATTRIBUTES()
///         float y;
///         Vec2();
///     };
///     enum Mode { Off, On };
/// }
/// ```
///
/// with `float`, `App::Vec2` and `App::Mode` registered and a type accessor
/// for `App::Vec2`.
fn vec2_debug_info() -> Vec<(&'static str, Vec<u8>)>
{
    let encoding = Encoding {
        format: Format::Dwarf32,
        version: 4,
        address_size: 8,
    };
    let mut dwarf = DwarfUnit::new(encoding);
    let root = dwarf.unit.root();

    let float = named(&mut dwarf, root, constants::DW_TAG_base_type, "float");
    set(&mut dwarf, float, constants::DW_AT_encoding, AttributeValue::Encoding(constants::DW_ATE_float));
    set(&mut dwarf, float, constants::DW_AT_byte_size, AttributeValue::Udata(4));

    let app = named(&mut dwarf, root, constants::DW_TAG_namespace, "App");
    let vec2 = named(&mut dwarf, app, constants::DW_TAG_structure_type, "Vec2");
    set(&mut dwarf, vec2, constants::DW_AT_byte_size, AttributeValue::Udata(8));

    let push = member_function(&mut dwarf, vec2, "PushRflAttributes__0", 0x2000);
    annotate(&mut dwarf, push, "Replicated, Priority=5");

    let x = named(&mut dwarf, vec2, constants::DW_TAG_member, "x");
    set(&mut dwarf, x, constants::DW_AT_type, AttributeValue::UnitRef(float));
    set(&mut dwarf, x, constants::DW_AT_data_member_location, AttributeValue::Udata(0));

    member_function(&mut dwarf, vec2, "PopRflAttributes__0", 0x2010);

    let y = named(&mut dwarf, vec2, constants::DW_TAG_member, "y");
    set(&mut dwarf, y, constants::DW_AT_type, AttributeValue::UnitRef(float));
    set(&mut dwarf, y, constants::DW_AT_data_member_location, AttributeValue::Udata(4));

    let vec2_pointer = pointer_to(&mut dwarf, vec2);
    let constructor = member_function(&mut dwarf, vec2, "Vec2", 0x1000);
    let this = dwarf.unit.add(constructor, constants::DW_TAG_formal_parameter);
    set(&mut dwarf, this, constants::DW_AT_type, AttributeValue::UnitRef(vec2_pointer));
    set(&mut dwarf, this, constants::DW_AT_artificial, AttributeValue::Flag(true));

    let mode = named(&mut dwarf, app, constants::DW_TAG_enumeration_type, "Mode");
    set(&mut dwarf, mode, constants::DW_AT_byte_size, AttributeValue::Udata(4));
    for (value, name) in ["Off", "On"].into_iter().enumerate() {
        let entry = named(&mut dwarf, mode, constants::DW_TAG_enumerator, name);
        set(&mut dwarf, entry, constants::DW_AT_const_value, AttributeValue::Sdata(value as i64));
    }

    let float_pointer = pointer_to(&mut dwarf, float);
    let mode_pointer = pointer_to(&mut dwarf, mode);
    register(&mut dwarf, float_pointer);
    register(&mut dwarf, vec2_pointer);
    register(&mut dwarf, mode_pointer);

    let rfl = named(&mut dwarf, root, constants::DW_TAG_namespace, "rfl");
    let accessor = named(&mut dwarf, rfl, constants::DW_TAG_subprogram, "TypeOf<App::Vec2>");
    let argument = dwarf.unit.add(accessor, constants::DW_TAG_template_type_parameter);
    set(&mut dwarf, argument, constants::DW_AT_type, AttributeValue::UnitRef(vec2));
    let static_type = named(&mut dwarf, accessor, constants::DW_TAG_variable, "type");
    let mut location = Expression::new();
    location.op_addr(DwarfAddress::Constant(0x4000));
    set(&mut dwarf, static_type, constants::DW_AT_location, AttributeValue::Exprloc(location));

    let mut sections = Sections::new(EndianVec::new(LittleEndian));
    dwarf.write(&mut sections).unwrap();

    let mut written = Vec::new();
    sections
        .for_each(|id, data| {
            if !data.slice().is_empty() {
                written.push((id.name(), data.slice().to_vec()));
            }
            Ok::<(), gimli::write::Error>(())
        })
        .unwrap();
    written
}

#[test]
fn test_missing_file_is_unavailable()
{
    let options = BuildOptions::default();
    match load_symbol_table(temp_path("does-not-exist"), &options) {
        Err(SymgraphError::SourceUnavailable(reason)) => assert!(reason.contains("does-not-exist")),
        other => panic!("Expected SourceUnavailable, got {other:?}"),
    }
}

#[test]
fn test_non_object_file_fails_to_parse()
{
    let path = temp_path("not-an-object");
    std::fs::write(&path, b"this is not an object file").unwrap();

    let options = BuildOptions::default();
    let result = load_symbol_table(&path, &options);
    let _ = std::fs::remove_file(&path);

    match result {
        Err(SymgraphError::ObjectParse { path: reported, .. }) => assert!(reported.contains("not-an-object")),
        other => panic!("Expected ObjectParse, got {other:?}"),
    }
}

#[test]
fn test_object_without_debug_info_is_unavailable()
{
    let path = write_elf("stripped.o", &[]);

    let options = BuildOptions::default();
    let result = load_symbol_table(&path, &options);
    let _ = std::fs::remove_file(&path);

    match result {
        Err(SymgraphError::SourceUnavailable(reason)) => assert!(reason.contains("no DWARF debug information")),
        other => panic!("Expected SourceUnavailable, got {other:?}"),
    }
}

#[test]
fn test_loaded_symbols()
{
    let path = write_elf("symbols.o", &vec2_debug_info());

    let options = BuildOptions::default();
    let result = load_symbol_table(&path, &options);
    let _ = std::fs::remove_file(&path);
    let table = result.unwrap();

    let registrations = table.registrations().unwrap();
    assert_eq!(registrations.len(), 3);
    let names: Vec<&str> = registrations
        .iter()
        .map(|registration| table.symbol(registration.type_symbol).unwrap().name())
        .collect();
    assert_eq!(names, ["float", "App::Vec2", "App::Mode"]);

    let vec2 = registrations[1].type_symbol;
    let symbol = table.symbol(vec2).unwrap();
    assert_eq!(symbol.tag, SymbolTag::Udt);
    assert_eq!(symbol.length, 8);
    assert!(symbol.has_constructor);

    let members: Vec<(SymbolTag, &str)> = table
        .children(vec2)
        .iter()
        .map(|&child| {
            let child = table.symbol(child).unwrap();
            (child.tag, child.name())
        })
        .collect();
    assert_eq!(
        members,
        [
            (SymbolTag::Function, "App::Vec2::PushRflAttributes__0"),
            (SymbolTag::Data, "x"),
            (SymbolTag::Function, "App::Vec2::PopRflAttributes__0"),
            (SymbolTag::Data, "y"),
            (SymbolTag::Function, "App::Vec2::Vec2"),
        ]
    );

    let push = table.children(vec2)[0];
    assert_eq!(table.annotation(push), Some("Replicated, Priority=5"));
    assert_eq!(
        table.type_of_address("App::Vec2").address(),
        Address::new(0x4000)
    );
}

#[test]
fn test_build_from_debug_info()
{
    let path = write_elf("build.o", &vec2_debug_info());

    let options = BuildOptions::default();
    let result = load_symbol_table(&path, &options);
    let _ = std::fs::remove_file(&path);
    let table = result.unwrap();

    let output = SymbolGraphBuilder::new(&table, &options).build().unwrap();
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let module = &output.module;

    let id = module.find("App::Vec2").unwrap();
    let info = module.type_info(id).unwrap();
    assert_eq!(info.type_of_address(), Address::new(0x4000));
    assert!(!info.as_class().unwrap().is_pod);

    let fields = info.fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name().unwrap().text(), "x");
    assert_eq!(fields[0].offset, 0);
    assert_eq!(fields[1].offset, 4);
    assert_eq!(fields[0].attributes.len(), 2);
    assert_eq!(fields[0].attributes[1].kind, AttributeKind::Integer);
    assert!(fields[1].attributes.is_empty());

    let functions = module.scope(id).functions();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name.text(), "Vec2");
    assert_eq!(functions[0].address, Address::new(0x1000));
    assert_eq!(info.special_members().get(SpecialMember::Constructor), Some(0));

    let mode = module.type_info(module.find("App::Mode").unwrap()).unwrap();
    let entries: Vec<(&str, i32)> = mode
        .as_enum()
        .unwrap()
        .entries
        .iter()
        .map(|entry| (entry.name.text(), entry.value))
        .collect();
    assert_eq!(entries, [("Off", 0), ("On", 1)]);
}

#[test]
fn test_tombstone_addresses()
{
    assert!(live_address(0).is_none());
    assert!(live_address(0xffff_fffe).is_none());
    assert!(live_address(0xffff_ffff).is_none());
    assert!(live_address(u64::MAX - 1).is_none());
    assert!(live_address(u64::MAX).is_none());
    assert_eq!(live_address(0x1000), Some(Address::new(0x1000)));
}

#[test]
fn test_instance_member_names()
{
    assert_eq!(instance_member_name("Vector<Foo>", "Vector"), "Vector<Foo>");
    assert_eq!(instance_member_name("Vector<Foo>", "~Vector"), "~Vector<Foo>");
    assert_eq!(instance_member_name("Vector<Foo>", "operator="), "operator=");
    assert_eq!(instance_member_name("Vec2", "~Vec2"), "~Vec2");
}
