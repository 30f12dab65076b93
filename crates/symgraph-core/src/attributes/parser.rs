//! Recursive-descent parser for attribute lists.
//!
//! ```text
//! list    := ws item (ws ',' ws item)* ws
//! item    := ident (ws '=' ws value)?
//! value   := ident | float | integer | string
//! ident   := (letter | '_') (letter | digit | '_')*
//! integer := '-'? digit+
//! float   := '-'? digit* '.' digit+ ('e' integer)?
//! string  := '"' ('\"' | [^"])* '"'
//! ```
//!
//! An item without a value is a boolean flag. String values keep their
//! escapes; only the surrounding quotes are removed.

use crate::error::{Result, SymgraphError};
use crate::model::AttributeKind;

/// One `name[=value]` item as written in the annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttribute
{
    pub name: String,
    pub kind: AttributeKind,
    pub value: Option<String>,
}

/// Parse a comma-separated attribute list.
///
/// Whitespace-only input yields an empty list.
///
/// ```rust
/// use symgraph_core::attributes::parse_attributes;
/// use symgraph_core::model::AttributeKind;
///
/// let parsed = parse_attributes("Replicated, Priority=5").unwrap();
/// assert_eq!(parsed.len(), 2);
/// assert_eq!(parsed[0].kind, AttributeKind::Boolean);
/// assert_eq!(parsed[1].value.as_deref(), Some("5"));
/// ```
///
/// ## Errors
///
/// Returns `AttributeSyntax` with the byte position of the first character
/// that doesn't fit the grammar.
pub fn parse_attributes(input: &str) -> Result<Vec<ParsedAttribute>>
{
    let mut scanner = Scanner { input, pos: 0 };
    let mut attributes = Vec::new();

    scanner.skip_whitespace();
    if scanner.at_end() {
        return Ok(attributes);
    }

    loop {
        attributes.push(scanner.item()?);
        scanner.skip_whitespace();
        if scanner.at_end() {
            return Ok(attributes);
        }
        scanner.expect(',')?;
        scanner.skip_whitespace();
    }
}

struct Scanner<'a>
{
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a>
{
    fn peek(&self) -> Option<char>
    {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char>
    {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char>
    {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool
    {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self)
    {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> usize
    {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        self.pos - start
    }

    fn error(&self, message: impl Into<String>) -> SymgraphError
    {
        SymgraphError::AttributeSyntax {
            input: self.input.to_string(),
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, wanted: char) -> Result<()>
    {
        if self.peek() == Some(wanted) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected '{wanted}'")))
        }
    }

    fn item(&mut self) -> Result<ParsedAttribute>
    {
        let name = self.ident().ok_or_else(|| self.error("expected attribute name"))?;

        let checkpoint = self.pos;
        self.skip_whitespace();
        if self.peek() != Some('=') {
            self.pos = checkpoint;
            return Ok(ParsedAttribute {
                name: name.to_string(),
                kind: AttributeKind::Boolean,
                value: None,
            });
        }
        self.bump();
        self.skip_whitespace();

        let (kind, value) = self.value()?;
        Ok(ParsedAttribute {
            name: name.to_string(),
            kind,
            value: Some(value),
        })
    }

    fn ident(&mut self) -> Option<&'a str>
    {
        let start = self.pos;
        if !self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return None;
        }
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        Some(&self.input[start..self.pos])
    }

    fn value(&mut self) -> Result<(AttributeKind, String)>
    {
        if let Some(symbol) = self.ident() {
            return Ok((AttributeKind::Symbol, symbol.to_string()));
        }
        if self.peek() == Some('"') {
            return self.string();
        }
        self.number()
    }

    fn number(&mut self) -> Result<(AttributeKind, String)>
    {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        let whole = self.eat_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
            self.exponent();
            return Ok((AttributeKind::Float, self.input[start..self.pos].to_string()));
        }

        if whole == 0 {
            self.pos = start;
            return Err(self.error("expected a symbol, number or string value"));
        }
        Ok((AttributeKind::Integer, self.input[start..self.pos].to_string()))
    }

    /// Optional `e-?digits` suffix; left unconsumed when incomplete.
    fn exponent(&mut self)
    {
        let checkpoint = self.pos;
        if !matches!(self.peek(), Some('e' | 'E')) {
            return;
        }
        self.bump();
        if self.peek() == Some('-') {
            self.bump();
        }
        if self.eat_while(|c| c.is_ascii_digit()) == 0 {
            self.pos = checkpoint;
        }
    }

    fn string(&mut self) -> Result<(AttributeKind, String)>
    {
        let open = self.pos;
        self.bump();
        let start = self.pos;

        loop {
            match self.bump() {
                Some('\\') if self.peek() == Some('"') => {
                    self.bump();
                }
                Some('"') => {
                    let text = &self.input[start..self.pos - 1];
                    return Ok((AttributeKind::String, text.to_string()));
                }
                Some(_) => {}
                None => {
                    self.pos = open;
                    return Err(self.error("unterminated string"));
                }
            }
        }
    }
}
