//! Textual term syntax.
//!
//! ```text
//! term  := '?' name              variable
//!        | '#' digits            scope
//!        | '"' chars '"'         string (\" \\ \n \t escapes)
//!        | '-'? digits           integer
//!        | '[' terms? ']'        list
//!        | '(' terms? ')'        tuple
//!        | ident ('(' terms? ')')?  application
//! terms := term (',' term)*
//! ```
//!
//! Identifiers may contain letters, digits, `_`, `-` and `'`, which covers
//! sort-qualified constructor names such as `Exp-Plhdr`. Variable names may
//! additionally end in `#n` so that printed engine variables parse back.

use crate::term::{Scope, Term, TermVar};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected character {found:?} at offset {pos}")]
    UnexpectedChar { pos: usize, found: char },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("invalid integer at offset {pos}")]
    InvalidInt { pos: usize },
    #[error("trailing input at offset {pos}")]
    TrailingInput { pos: usize },
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '\''
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(found) => Err(ParseError::UnexpectedChar {
                pos: self.pos - found.len_utf8(),
                found,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn term(&mut self) -> Result<Term, ParseError> {
        self.skip_ws();
        let pos = self.pos;
        let Some(c) = self.peek() else {
            return Err(ParseError::UnexpectedEnd);
        };
        match c {
            '?' => {
                self.bump();
                let mut name = self.take_while(is_ident_char).to_string();
                if name.is_empty() {
                    return Err(self.unexpected());
                }
                if self.peek() == Some('#') {
                    self.bump();
                    let index = self.take_while(|c| c.is_ascii_digit());
                    if index.is_empty() {
                        return Err(self.unexpected());
                    }
                    name = format!("{name}#{index}");
                }
                Ok(Term::Var(TermVar::new(name)))
            }
            '#' => {
                self.bump();
                let digits = self.take_while(|c| c.is_ascii_digit());
                digits
                    .parse::<u32>()
                    .map(|n| Term::Scope(Scope(n)))
                    .map_err(|_| ParseError::InvalidInt { pos })
            }
            '"' => self.string(),
            '[' => {
                self.bump();
                Ok(Term::List(self.terms(']')?))
            }
            '(' => {
                self.bump();
                Ok(Term::tuple(self.terms(')')?))
            }
            c if c == '-' || c.is_ascii_digit() => {
                self.bump();
                self.take_while(|c| c.is_ascii_digit());
                self.src[pos..self.pos]
                    .parse::<i64>()
                    .map(Term::Int)
                    .map_err(|_| ParseError::InvalidInt { pos })
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let op = self.take_while(is_ident_char);
                self.skip_ws();
                if self.peek() == Some('(') {
                    self.bump();
                    let args = self.terms(')')?;
                    Ok(Term::appl(op, args))
                } else {
                    Ok(Term::appl(op, []))
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Comma separated terms up to and including `close`.
    fn terms(&mut self, close: char) -> Result<Vec<Term>, ParseError> {
        let mut out = Vec::new();
        self.skip_ws();
        if self.peek() == Some(close) {
            self.bump();
            return Ok(out);
        }
        loop {
            out.push(self.term()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(out),
                Some(found) => {
                    return Err(ParseError::UnexpectedChar {
                        pos: self.pos - found.len_utf8(),
                        found,
                    });
                }
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn string(&mut self) -> Result<Term, ParseError> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Term::string(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(c @ ('"' | '\\')) => value.push(c),
                    Some(found) => {
                        return Err(ParseError::UnexpectedChar {
                            pos: self.pos - found.len_utf8(),
                            found,
                        });
                    }
                    None => return Err(ParseError::UnexpectedEnd),
                },
                Some(c) => value.push(c),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::UnexpectedChar {
                pos: self.pos,
                found,
            },
            None => ParseError::UnexpectedEnd,
        }
    }
}

/// Parse a single term, rejecting trailing input.
pub fn parse_term(src: &str) -> Result<Term, ParseError> {
    let mut parser = Parser { src, pos: 0 };
    let term = parser.term()?;
    parser.skip_ws();
    if parser.pos < src.len() {
        return Err(ParseError::TrailingInput { pos: parser.pos });
    }
    Ok(term)
}

impl FromStr for Term {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_term(s)
    }
}

impl TryFrom<String> for Term {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_term(&value)
    }
}

#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod tests;
