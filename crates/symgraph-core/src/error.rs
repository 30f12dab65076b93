//! # Error Types
//!
//! General error handling for the symbol-graph builder.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Most problems met while walking a symbol source are *not* errors: an
//! unresolved field or an unknown registration is reported as a
//! [`Diagnostic`](crate::builder::Diagnostic) and the build carries on. The
//! variants below are for failures a caller has to act on.

use thiserror::Error;

/// Main error type for symgraph operations
///
/// ## Error Categories
///
/// 1. **Source errors**: SourceUnavailable, ObjectParse, Dwarf
/// 2. **Attribute errors**: AttributeSyntax, DuplicateAttribute, AttributeStackUnderflow
/// 3. **Argument errors**: InvalidArgument
/// 4. **I/O errors**: Io (for reading the input binary)
#[derive(Error, Debug)]
pub enum SymgraphError
{
    /// The symbol source could not be opened
    ///
    /// This is the only fatal build failure: nothing is produced when the
    /// source can't be read at all.
    #[error("Symbol source unavailable: {0}")]
    SourceUnavailable(String),

    /// The input file is not an object file we can read
    #[error("Failed to parse object file {path}: {message}")]
    ObjectParse
    {
        /// Path of the file that failed to parse
        path: String,
        /// Parser message
        message: String,
    },

    /// Reading the DWARF sections failed
    ///
    /// `context` names the operation that was running (e.g. "parsing
    /// compilation unit"), `message` is the underlying gimli error.
    #[error("DWARF error while {context}: {message}")]
    Dwarf
    {
        /// What the loader was doing
        context: String,
        /// Underlying error
        message: String,
    },

    /// An attribute annotation doesn't match the attribute grammar
    #[error("Invalid attribute list {input:?} at byte {position}: {message}")]
    AttributeSyntax
    {
        /// The annotation text being parsed
        input: String,
        /// Byte offset of the failure
        position: usize,
        /// What was expected
        message: String,
    },

    /// An attribute with the same name is already active
    ///
    /// Pushing a name twice would make the matching pop ambiguous, so the
    /// push is rejected.
    #[error("Attribute '{0}' is already active")]
    DuplicateAttribute(String),

    /// `pop` was called with no attribute scope pushed
    #[error("Attribute scope stack underflow: pop without a matching push")]
    AttributeStackUnderflow,

    /// Invalid argument passed to a symgraph function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (reading the input binary, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, SymgraphError>`
///
/// ```rust
/// use symgraph_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SymgraphError>;
