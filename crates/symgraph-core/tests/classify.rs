//! Tests for special member classification

use symgraph_core::builder::{classify, SymbolGraphBuilder};
use symgraph_core::model::{Function, Module, Name, Parameter, ScopeId, SpecialMember, TypeModifier};
use symgraph_core::options::BuildOptions;
use symgraph_core::symbols::{BasicType, SymbolTable};
use symgraph_core::types::Address;

/// A module holding the class `Vec2` and the base type `float`.
fn module() -> (Module, ScopeId, ScopeId)
{
    let mut table = SymbolTable::new();
    let float = table.base_type("float", BasicType::Float, 4);
    let vec2 = table.udt("Vec2", 8);
    table.register(float, false, false);
    table.register(vec2, false, false);

    let options = BuildOptions::default();
    let module = SymbolGraphBuilder::new(&table, &options).build().unwrap().module;
    let vec2 = module.find("Vec2").unwrap();
    let float = module.find("float").unwrap();
    (module, vec2, float)
}

fn parameter(ty: ScopeId) -> Parameter
{
    Parameter {
        name: None,
        ty,
        is_const: false,
        modifier: TypeModifier::Pointer,
        array_rank: 0,
        array_lengths: [1, 1],
    }
}

fn function(name: &str, parameters: Vec<Parameter>) -> Function
{
    Function {
        name: Name::new(name),
        address: Address::new(0x1000),
        return_parameter: None,
        parameters,
        attributes: Vec::new(),
        special: None,
    }
}

#[test]
fn test_one_parameter_constructor()
{
    let (module, vec2, _) = module();
    let constructor = function("Vec2", vec![parameter(vec2)]);
    assert_eq!(classify(&module, vec2, &constructor), Some(SpecialMember::Constructor));
}

#[test]
fn test_two_parameter_constructor_is_copy_constructor()
{
    let (module, vec2, _) = module();
    let copy = function("Vec2", vec![parameter(vec2), parameter(vec2)]);
    assert_eq!(classify(&module, vec2, &copy), Some(SpecialMember::CopyConstructor));
}

#[test]
fn test_constructor_with_other_parameters_plays_no_role()
{
    let (module, vec2, float) = module();
    let from_floats = function("Vec2", vec![parameter(vec2), parameter(float), parameter(float)]);
    let from_float = function("Vec2", vec![parameter(vec2), parameter(float)]);
    let from_nothing = function("Vec2", Vec::new());

    assert_eq!(classify(&module, vec2, &from_floats), None);
    assert_eq!(classify(&module, vec2, &from_float), None);
    assert_eq!(classify(&module, vec2, &from_nothing), None);
}

#[test]
fn test_destructor()
{
    let (module, vec2, _) = module();
    let destructor = function("~Vec2", vec![parameter(vec2)]);
    assert_eq!(classify(&module, vec2, &destructor), Some(SpecialMember::Destructor));

    let other = function("~Vec3", vec![parameter(vec2)]);
    assert_eq!(classify(&module, vec2, &other), None);
}

#[test]
fn test_assignment_operator()
{
    let (module, vec2, float) = module();
    let assign = function("operator=", vec![parameter(vec2), parameter(vec2)]);
    assert_eq!(classify(&module, vec2, &assign), Some(SpecialMember::AssignmentOperator));

    let assign_float = function("operator=", vec![parameter(vec2), parameter(float)]);
    assert_eq!(classify(&module, vec2, &assign_float), None);

    let add_assign = function("operator+=", vec![parameter(vec2), parameter(vec2)]);
    assert_eq!(classify(&module, vec2, &add_assign), None);
}

#[test]
fn test_ordinary_method_plays_no_role()
{
    let (module, vec2, _) = module();
    let length = function("length", vec![parameter(vec2)]);
    assert_eq!(classify(&module, vec2, &length), None);
}

#[test]
fn test_special_member_labels()
{
    assert_eq!(SpecialMember::Constructor.to_string(), "constructor");
    assert_eq!(SpecialMember::CopyConstructor.to_string(), "copy constructor");
    assert_eq!(SpecialMember::Destructor.to_string(), "destructor");
    assert_eq!(SpecialMember::AssignmentOperator.to_string(), "assignment operator");
}
