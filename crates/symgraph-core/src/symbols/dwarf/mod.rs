//! # DWARF Symbol Source
//!
//! Fills a [`SymbolTable`] from the DWARF sections of an ELF or Mach-O file.
//!
//! ## What gets read
//!
//! - base types (`DW_AT_encoding` and byte size pick the primitive category)
//! - structures, classes and unions with their members and member functions
//! - enumerations and their enumerators
//! - pointer, reference and rvalue-reference types
//! - arrays, one array symbol per subrange
//! - `const` qualification; typedefs and `volatile` are see-through
//! - `DW_TAG_LLVM_annotation` strings, used as attribute text
//! - registration functions and type accessors (see [`BuildOptions`])
//!
//! Names are qualified through their enclosing namespaces and classes, so a
//! structure `Vec2` inside namespace `App::Gfx` becomes `App::Gfx::Vec2`.
//! Types defined by several compilation units are merged by qualified name.
//!
//! ## Example
//!
//! ```rust,no_run
//! use symgraph_core::options::BuildOptions;
//! use symgraph_core::symbols::dwarf::load_symbol_table;
//!
//! let options = BuildOptions::default();
//! let table = load_symbol_table("target/debug/game", &options)?;
//! println!("{} symbols", table.len());
//! # Ok::<(), symgraph_core::error::SymgraphError>(())
//! ```

mod image;
mod loader;

use std::path::Path;

use gimli::{Dwarf, EndianArcSlice, RunTimeEndian};

use self::image::ObjectImage;
use self::loader::SymbolLoader;
use super::SymbolTable;
use crate::error::{Result, SymgraphError};
use crate::options::BuildOptions;
use crate::types::Address;

pub(crate) type OwnedReader = EndianArcSlice<RunTimeEndian>;
pub(crate) type OwnedDwarf = Dwarf<OwnedReader>;

/// Read the object file at `path` and turn its debug information into symbols.
///
/// ## Errors
///
/// - `SourceUnavailable` if the file can't be read or has no debug information
/// - `ObjectParse` if the file isn't a supported object format
/// - `Dwarf` if the debug information is malformed
pub fn load_symbol_table(path: impl AsRef<Path>, options: &BuildOptions) -> Result<SymbolTable>
{
    let image = ObjectImage::open(path.as_ref())?;
    let _span = tracing::debug_span!("dwarf", path = %image.path().display()).entered();

    let dwarf = image.dwarf()?;
    let loader = SymbolLoader::new(dwarf, options)?;
    let table = loader.load()?;

    tracing::debug!(symbols = table.len(), "loaded symbol table");
    Ok(table)
}

pub(crate) fn map_dwarf_error(context: impl Into<String>, err: gimli::Error) -> SymgraphError
{
    SymgraphError::Dwarf {
        context: context.into(),
        message: err.to_string(),
    }
}

/// `value` as a code or data address, `None` for the tombstones linkers
/// write over discarded sections.
///
/// ```rust
/// use symgraph_core::symbols::dwarf::live_address;
///
/// assert_eq!(live_address(0x4010).map(|address| address.value()), Some(0x4010));
/// assert!(live_address(0).is_none());
/// assert!(live_address(u64::MAX).is_none());
/// ```
pub fn live_address(value: u64) -> Option<Address>
{
    match value {
        0 | 0xffff_fffe | 0xffff_ffff | 0xffff_ffff_ffff_fffe | u64::MAX => None,
        value => Some(Address::new(value)),
    }
}

/// Name of a member function as the builder expects to see it.
///
/// Constructors and destructors of template instances are named after the
/// template (`Vector`, `~Vector`); they're respelled with the full instance
/// name so they can be matched against their class.
///
/// ```rust
/// use symgraph_core::symbols::dwarf::instance_member_name;
///
/// assert_eq!(instance_member_name("Vector<Foo>", "Vector"), "Vector<Foo>");
/// assert_eq!(instance_member_name("Vector<Foo>", "~Vector"), "~Vector<Foo>");
/// assert_eq!(instance_member_name("Vector<Foo>", "size"), "size");
/// assert_eq!(instance_member_name("Vec2", "Vec2"), "Vec2");
/// ```
pub fn instance_member_name(class_name: &str, name: &str) -> String
{
    let Some(open) = class_name.find('<') else {
        return name.to_string();
    };
    let base = &class_name[..open];

    if name == base {
        class_name.to_string()
    } else if name.strip_prefix('~') == Some(base) {
        format!("~{class_name}")
    } else {
        name.to_string()
    }
}
