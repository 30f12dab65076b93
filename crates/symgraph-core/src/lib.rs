//! # symgraph-core
//!
//! Builds a namespaced reflection model from the debug information of a
//! compiled C++ program.
//!
//! The program marks the types it wants reflected with registration
//! functions; this crate finds those registrations in a symbol source, walks
//! the registered types and produces a [`Module`](model::Module): a tree of
//! namespaces, classes, enums, templates and template instances with fields,
//! member functions and attributes, ready for an emitter to serialize.
//!
//! ## Layout
//!
//! - [`symbols`]: the [`SymbolSource`](symbols::SymbolSource) trait, an
//!   in-memory table and a DWARF loader
//! - [`builder`]: the two-pass builder, template instantiation and special
//!   member classification
//! - [`model`]: the reflection model, name table and emitter schema
//! - [`attributes`]: the attribute grammar and attribute scopes
//! - [`options`]: naming conventions shared by loader and builder
//!
//! ## Example
//!
//! ```rust,no_run
//! use symgraph_core::prelude::*;
//!
//! let options = BuildOptions::default();
//! let table = load_symbol_table("game.elf", &options)?;
//! let output = SymbolGraphBuilder::new(&table, &options).build()?;
//!
//! for diagnostic in &output.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! print!("{}", output.module.tree());
//! # Ok::<(), SymgraphError>(())
//! ```

pub mod attributes;
pub mod builder;
pub mod error;
pub mod model;
pub mod options;
pub mod prelude;
pub mod symbols;
pub mod types;

// Re-export commonly used types
pub use builder::{BuildOutput, SymbolGraphBuilder};
pub use error::{Result, SymgraphError};
pub use model::Module;
pub use options::BuildOptions;
