//! # Attributes
//!
//! Attributes come out of annotation strings attached to marker functions:
//!
//! ```text
//! PushRflAttributes__0 = "Replicated, Priority=5"
//! float health;                     // Replicated, Priority
//! PopRflAttributes__0
//! ```
//!
//! [`AttributeScopes`] holds the attributes that are currently active while
//! the builder walks the members of one class. Every push opens a scope that
//! the matching pop closes; a single-shot scope closes itself after the next
//! field or function picks it up.

mod parser;

pub use parser::{parse_attributes, ParsedAttribute};

use crate::error::{Result, SymgraphError};
use crate::model::{Attribute, NameTable};

/// Stack of attribute scopes for one class walk.
#[derive(Debug, Default, Clone)]
pub struct AttributeScopes
{
    /// Active attributes in activation order.
    active: Vec<Attribute>,
    /// Names added by each unpopped push, innermost last.
    stack: Vec<Vec<String>>,
    /// Stack index of the scope that closes after the next entity takes a snapshot.
    single_shot: Option<usize>,
}

impl AttributeScopes
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Parse `text` and open a scope holding its attributes.
    ///
    /// A scope is always opened, even when the text is rejected, so the
    /// matching [`pop`](Self::pop) stays balanced. Returns the number of
    /// attributes that became active.
    ///
    /// ## Errors
    ///
    /// `AttributeSyntax` if the text doesn't parse, `DuplicateAttribute` if a
    /// name is already active. Nothing becomes active in either case.
    pub fn push(&mut self, text: &str, names: &mut NameTable) -> Result<usize>
    {
        match parse_attributes(text) {
            Ok(parsed) => self.push_parsed(parsed, names),
            Err(e) => {
                self.stack.push(Vec::new());
                Err(e)
            }
        }
    }

    /// Open a scope from already parsed attributes.
    ///
    /// ## Errors
    ///
    /// `DuplicateAttribute` if any name is already active or repeated within
    /// `parsed`; an empty scope is opened instead.
    pub fn push_parsed(&mut self, parsed: Vec<ParsedAttribute>, names: &mut NameTable) -> Result<usize>
    {
        for (i, attribute) in parsed.iter().enumerate() {
            let repeated = parsed[..i].iter().any(|earlier| earlier.name == attribute.name);
            if repeated || self.is_active(&attribute.name) {
                self.stack.push(Vec::new());
                return Err(SymgraphError::DuplicateAttribute(attribute.name.clone()));
            }
        }

        let mut frame = Vec::with_capacity(parsed.len());
        for attribute in parsed {
            frame.push(attribute.name.clone());
            self.active.push(Attribute {
                name: names.intern(&attribute.name),
                kind: attribute.kind,
                value: attribute.value,
            });
        }

        let count = frame.len();
        self.stack.push(frame);
        Ok(count)
    }

    /// Like [`push`](Self::push), but the scope closes itself once the next
    /// field or function has taken its snapshot.
    ///
    /// ## Errors
    ///
    /// Same as [`push`](Self::push). The scope is single-shot either way.
    pub fn push_single_shot(&mut self, text: &str, names: &mut NameTable) -> Result<usize>
    {
        let index = self.stack.len();
        let result = self.push(text, names);
        self.single_shot = Some(index);
        result
    }

    /// Close the innermost scope, removing exactly the names it added.
    ///
    /// Closing a pending single-shot scope this way cancels it.
    ///
    /// ## Errors
    ///
    /// `AttributeStackUnderflow` when no scope is open.
    pub fn pop(&mut self) -> Result<usize>
    {
        let index = self.stack.len().checked_sub(1).ok_or(SymgraphError::AttributeStackUnderflow)?;
        self.close(index)
    }

    fn close(&mut self, index: usize) -> Result<usize>
    {
        if index >= self.stack.len() {
            return Err(SymgraphError::AttributeStackUnderflow);
        }
        let frame = self.stack.remove(index);
        self.active.retain(|attribute| !frame.iter().any(|name| name == attribute.name.text()));
        if self.single_shot == Some(index) {
            self.single_shot = None;
        }
        Ok(frame.len())
    }

    /// Close every scope.
    pub fn pop_all(&mut self)
    {
        self.active.clear();
        self.stack.clear();
        self.single_shot = None;
    }

    /// Copy of the active attributes, in activation order.
    pub fn snapshot(&self) -> Vec<Attribute>
    {
        self.active.clone()
    }

    /// Snapshot for a field or function, closing a pending single-shot scope.
    ///
    /// Only the single-shot scope closes; scopes pushed after it stay open.
    ///
    /// ## Errors
    ///
    /// `AttributeStackUnderflow` if the single-shot scope is no longer on the
    /// stack. The snapshot is lost in that case.
    pub fn take_for_entity(&mut self) -> Result<Vec<Attribute>>
    {
        let snapshot = self.snapshot();
        if let Some(index) = self.single_shot.take() {
            self.close(index)?;
        }
        Ok(snapshot)
    }

    pub fn is_single_shot_pending(&self) -> bool
    {
        self.single_shot.is_some()
    }

    pub fn is_active(&self, name: &str) -> bool
    {
        self.active.iter().any(|attribute| attribute.name.text() == name)
    }

    pub fn active(&self) -> &[Attribute]
    {
        &self.active
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize
    {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.stack.is_empty()
    }
}
