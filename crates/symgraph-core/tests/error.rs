//! Tests for error handling

use symgraph_core::builder::{Diagnostic, Severity};
use symgraph_core::error::{Result, SymgraphError};

#[test]
fn test_source_unavailable_display()
{
    let error = SymgraphError::SourceUnavailable("game.elf: No such file or directory".to_string());
    let message = format!("{}", error);
    assert!(message.contains("unavailable"));
    assert!(message.contains("game.elf"));
}

#[test]
fn test_object_parse_display()
{
    let error = SymgraphError::ObjectParse {
        path: "notes.txt".to_string(),
        message: "Unknown file magic".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("notes.txt"));
    assert!(message.contains("Unknown file magic"));
}

#[test]
fn test_dwarf_error_display()
{
    let error = SymgraphError::Dwarf {
        context: "parsing compilation unit".to_string(),
        message: "unexpected end of input".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "DWARF error while parsing compilation unit: unexpected end of input"
    );
}

#[test]
fn test_attribute_errors_display()
{
    let syntax = SymgraphError::AttributeSyntax {
        input: "A,,B".to_string(),
        position: 2,
        message: "expected attribute name".to_string(),
    };
    let message = syntax.to_string();
    assert!(message.contains("\"A,,B\""));
    assert!(message.contains("byte 2"));

    let duplicate = SymgraphError::DuplicateAttribute("Replicated".to_string());
    assert!(duplicate.to_string().contains("'Replicated'"));

    assert!(SymgraphError::AttributeStackUnderflow.to_string().contains("underflow"));
}

#[test]
fn test_invalid_argument_display()
{
    let error = SymgraphError::InvalidArgument("scope 3 is not a type".to_string());
    assert!(error.to_string().contains("scope 3 is not a type"));
}

#[test]
fn test_io_error_conversion()
{
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: SymgraphError = io_err.into();

    match error {
        SymgraphError::Io(_) => {
            // Expected: io::Error converts to the Io variant
        }
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_result_type_alias()
{
    fn returns_result() -> Result<u32>
    {
        Ok(42)
    }

    fn returns_error() -> Result<u32>
    {
        Err(SymgraphError::AttributeStackUnderflow)
    }

    assert_eq!(returns_result().unwrap(), 42);
    assert!(returns_error().is_err());
}

#[test]
fn test_diagnostic_display()
{
    let scoped = Diagnostic {
        severity: Severity::Warning,
        scope: "App::Vec2".to_string(),
        message: "field 'z' not reflected due to unknown type".to_string(),
    };
    assert_eq!(
        scoped.to_string(),
        "warning [App::Vec2]: field 'z' not reflected due to unknown type"
    );

    let unscoped = Diagnostic {
        severity: Severity::Error,
        scope: String::new(),
        message: "registration refers to unknown symbol sym#9".to_string(),
    };
    assert_eq!(unscoped.to_string(), "error: registration refers to unknown symbol sym#9");
}

#[test]
fn test_severity_order()
{
    assert!(Severity::Warning < Severity::Error);
}
