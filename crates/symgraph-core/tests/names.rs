//! Tests for name interning and name hashes

use symgraph_core::model::{murmur_hash2, Name, NameTable, NAME_HASH_SEED};

#[test]
fn test_interning_equal_strings_gives_equal_names()
{
    let mut names = NameTable::new();
    let first = names.intern("Vec2");
    let second = names.intern("Vec2");

    assert_eq!(first, second);
    assert_eq!(first.hash(), second.hash());
    assert_eq!(names.len(), 1);
}

#[test]
fn test_different_strings_get_different_hashes()
{
    let mut names = NameTable::new();
    let x = names.intern("x");
    let y = names.intern("y");
    let position = names.intern("position");

    assert_ne!(x.hash(), y.hash());
    assert_ne!(x.hash(), position.hash());
    assert_eq!(names.len(), 3);
}

#[test]
fn test_name_hash_known_values()
{
    assert_eq!(Name::new("Vec2").hash(), 0xc975_4a94);
    assert_eq!(Name::new("App::Gfx::Vec2").hash(), 0xa1d8_cdf1);
    assert_eq!(Name::new("Global").hash(), 0x6453_8290);
    assert_eq!(murmur_hash2("Vec2", 0), 0x8f11_d919);
}

#[test]
fn test_name_hash_uses_utf16_code_units()
{
    assert_eq!(murmur_hash2("é", NAME_HASH_SEED), 0x3290_c0eb);
}

#[test]
fn test_empty_name_is_hashed_but_not_stored()
{
    let mut names = NameTable::new();
    let empty = names.intern("");

    assert!(empty.is_empty());
    assert_eq!(empty.hash(), 0xfeb0_1783);
    assert!(names.is_empty());
    assert!(names.lookup("").is_none());
}

#[test]
fn test_table_keeps_insertion_order()
{
    let mut names = NameTable::new();
    for text in ["Global", "App", "Gfx", "App", "Vec2"] {
        names.intern(text);
    }

    let order: Vec<&str> = names.iter().map(Name::text).collect();
    assert_eq!(order, ["Global", "App", "Gfx", "Vec2"]);
    assert_eq!(names.lookup("Gfx").map(Name::hash), Some(Name::new("Gfx").hash()));
}

#[test]
fn test_name_display_is_its_text()
{
    let name = Name::new("App::Gfx");
    assert_eq!(name.to_string(), "App::Gfx");
    assert_eq!(name.text(), "App::Gfx");
}
