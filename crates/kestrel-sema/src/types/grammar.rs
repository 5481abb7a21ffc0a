//! Parser for the textual type grammar used in annotations
//!
//! ```text
//! type   := base ('!' IDENT)?
//! base   := '[' type ';' NUM (';' NUM)? ']'
//!         | '*' '[' type ']'                 slice
//!         | '*' 'mut'? type                  pointer
//!         | '(' (type (',' type)*)? ')'      tuple
//!         | 'Fn' ('<' IDENT,* '>')? '(' type,* ')' '->' type
//!         | IDENT ('<' type,* '>')?
//! ```

use super::{Prim, Type};
use thiserror::Error;

/// Malformed type annotation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type '{text}' at offset {offset}: {message}")]
pub struct TypeSyntaxError {
    pub text: String,
    pub offset: usize,
    pub message: String,
}

/// Parse an annotation into its canonical type
pub fn parse_type(raw: &str) -> Result<Type, TypeSyntaxError> {
    let mut parser = TypeParser::new(raw);
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error("trailing characters"));
    }
    Ok(ty.normalized())
}

/// Normalize a raw annotation
///
/// Malformed text normalizes to `Unknown`, which disables checking at
/// that position instead of failing the caller.
pub fn normalize(raw: &str) -> Type {
    parse_type(raw).unwrap_or(Type::Unknown)
}

struct TypeParser<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: &str) -> TypeSyntaxError {
        TypeSyntaxError {
            text: self.text.to_string(),
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeSyntaxError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn ident(&mut self) -> Result<String, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos || self.chars[start].is_ascii_digit() {
            self.pos = start;
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn number(&mut self) -> Result<usize, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        while self.chars.get(self.pos).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().map_err(|_| {
            self.pos = start;
            self.error("expected array length")
        })
    }

    /// Lookahead for a keyword followed by a non-identifier character
    fn at_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let end = self.pos + keyword.chars().count();
        if end > self.chars.len() {
            return false;
        }
        let word: String = self.chars[self.pos..end].iter().collect();
        word == keyword
            && !self
                .chars
                .get(end)
                .is_some_and(|c| c.is_alphanumeric() || *c == '_')
    }

    fn parse_type(&mut self) -> Result<Type, TypeSyntaxError> {
        let base = self.parse_base()?;
        if self.eat('!') {
            let handler = self.ident()?;
            return Ok(base.with_drop(handler));
        }
        Ok(base)
    }

    fn parse_base(&mut self) -> Result<Type, TypeSyntaxError> {
        match self.peek() {
            Some('[') => {
                self.pos += 1;
                let elem = self.parse_type()?;
                self.parse_array_tail(elem)
            }
            Some('*') => {
                self.pos += 1;
                if self.eat('[') {
                    let elem = self.parse_type()?;
                    if self.eat(']') {
                        return Ok(Type::slice(elem));
                    }
                    // `*[T; n]` is a pointer to an array
                    let array = self.parse_array_tail(elem)?;
                    return Ok(Type::Pointer {
                        mutable: false,
                        inner: Box::new(array),
                    });
                }
                let mutable = self.at_keyword("mut");
                if mutable {
                    self.pos += 3;
                }
                let inner = self.parse_type()?;
                Ok(Type::Pointer {
                    mutable,
                    inner: Box::new(inner),
                })
            }
            Some('(') => {
                self.pos += 1;
                let items = self.parse_list(')')?;
                Ok(Type::Tuple(items))
            }
            Some(_) if self.at_keyword("Fn") => {
                self.pos += 2;
                let mut type_params = Vec::new();
                if self.eat('<') {
                    loop {
                        type_params.push(self.ident()?);
                        if self.eat('>') {
                            break;
                        }
                        self.expect(',')?;
                    }
                }
                self.expect('(')?;
                let params = self.parse_list(')')?;
                self.expect('-')?;
                self.expect('>')?;
                let ret = self.parse_type()?;
                Ok(Type::function(type_params, params, ret))
            }
            Some(_) => {
                let name = self.ident()?;
                if self.eat('<') {
                    let args = self.parse_list('>')?;
                    return Ok(Type::generic(name, args));
                }
                if name == "Unknown" {
                    return Ok(Type::Unknown);
                }
                Ok(match Prim::from_name(&name) {
                    Some(prim) => Type::Primitive(prim),
                    None => Type::named(name),
                })
            }
            None => Err(self.error("unexpected end of type")),
        }
    }

    /// After `[T`: `; init ; len ]` or `; len ]`
    fn parse_array_tail(&mut self, elem: Type) -> Result<Type, TypeSyntaxError> {
        self.expect(';')?;
        let first = self.number()?;
        let (init, len) = if self.eat(';') {
            (first, self.number()?)
        } else {
            (first, first)
        };
        self.expect(']')?;
        if init > len {
            return Err(self.error("initialized prefix longer than array"));
        }
        Ok(Type::array(elem, init, len))
    }

    /// Comma-separated types up to and including `close`
    fn parse_list(&mut self, close: char) -> Result<Vec<Type>, TypeSyntaxError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_type()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(',')?;
        }
    }
}
