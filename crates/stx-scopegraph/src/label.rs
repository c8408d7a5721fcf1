//! Edge labels, label regular expressions and label orders.
//!
//! # Syntax
//!
//! Regular expressions over labels:
//!
//! ```text
//! P* I?        zero or more P edges, then an optional I edge
//! (P | I)+     one or more P or I edges
//! e            the empty word
//! 0            the empty language
//! ```
//!
//! Label orders are comma separated preferences, `$` is the data label:
//!
//! ```text
//! $ < P, $ < I, I < P
//! ```
//!
//! `a < b` reads "a is preferred over b": answers reached through `a`
//! shadow equivalent answers reached through `b`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(Arc<str>);

impl Label {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Either the data of a scope (`$`) or one of its outgoing edge labels.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EdgeOrData {
    Data,
    Edge(Label),
}

impl fmt::Display for EdgeOrData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeOrData::Data => f.write_str("$"),
            EdgeOrData::Edge(l) => write!(f, "{l}"),
        }
    }
}

impl From<EdgeOrData> for String {
    fn from(value: EdgeOrData) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for EdgeOrData {
    type Error = LabelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value == "$" {
            Ok(EdgeOrData::Data)
        } else if !value.is_empty() && value.chars().all(is_label_char) {
            Ok(EdgeOrData::Edge(Label::new(value)))
        } else {
            Err(LabelParseError::InvalidLabel(value.to_string()))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LabelParseError {
    #[error("invalid label {0:?}")]
    InvalidLabel(String),
    #[error("unexpected {found:?} at offset {pos}")]
    UnexpectedChar { pos: usize, found: char },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("invalid order entry {0:?}, expected `a < b`")]
    InvalidOrder(String),
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

// =============================================================================
// Regular expressions
// =============================================================================

/// A regular expression over edge labels, evaluated by Brzozowski derivatives.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LabelRegex {
    /// The empty language.
    Empty,
    /// The empty word.
    Epsilon,
    Label(Label),
    Concat(Box<LabelRegex>, Box<LabelRegex>),
    Or(Box<LabelRegex>, Box<LabelRegex>),
    Closure(Box<LabelRegex>),
}

impl LabelRegex {
    pub fn label(name: impl AsRef<str>) -> Self {
        LabelRegex::Label(Label::new(name))
    }

    pub fn concat(left: LabelRegex, right: LabelRegex) -> Self {
        match (left, right) {
            (LabelRegex::Empty, _) | (_, LabelRegex::Empty) => LabelRegex::Empty,
            (LabelRegex::Epsilon, r) | (r, LabelRegex::Epsilon) => r,
            (l, r) => LabelRegex::Concat(Box::new(l), Box::new(r)),
        }
    }

    pub fn or(left: LabelRegex, right: LabelRegex) -> Self {
        match (left, right) {
            (LabelRegex::Empty, r) | (r, LabelRegex::Empty) => r,
            (l, r) if l == r => l,
            (l, r) => LabelRegex::Or(Box::new(l), Box::new(r)),
        }
    }

    pub fn closure(inner: LabelRegex) -> Self {
        match inner {
            LabelRegex::Empty | LabelRegex::Epsilon => LabelRegex::Epsilon,
            c @ LabelRegex::Closure(_) => c,
            r => LabelRegex::Closure(Box::new(r)),
        }
    }

    /// Whether the empty word is in the language.
    pub fn is_nullable(&self) -> bool {
        match self {
            LabelRegex::Empty | LabelRegex::Label(_) => false,
            LabelRegex::Epsilon | LabelRegex::Closure(_) => true,
            LabelRegex::Concat(l, r) => l.is_nullable() && r.is_nullable(),
            LabelRegex::Or(l, r) => l.is_nullable() || r.is_nullable(),
        }
    }

    /// Whether the language is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            LabelRegex::Empty => true,
            LabelRegex::Epsilon | LabelRegex::Label(_) | LabelRegex::Closure(_) => false,
            LabelRegex::Concat(l, r) => l.is_empty() || r.is_empty(),
            LabelRegex::Or(l, r) => l.is_empty() && r.is_empty(),
        }
    }

    /// The Brzozowski derivative with respect to `label`.
    pub fn derive(&self, label: &Label) -> LabelRegex {
        match self {
            LabelRegex::Empty | LabelRegex::Epsilon => LabelRegex::Empty,
            LabelRegex::Label(l) if l == label => LabelRegex::Epsilon,
            LabelRegex::Label(_) => LabelRegex::Empty,
            LabelRegex::Concat(l, r) => {
                let first = LabelRegex::concat(l.derive(label), (**r).clone());
                if l.is_nullable() {
                    LabelRegex::or(first, r.derive(label))
                } else {
                    first
                }
            }
            LabelRegex::Or(l, r) => LabelRegex::or(l.derive(label), r.derive(label)),
            LabelRegex::Closure(inner) => LabelRegex::concat(inner.derive(label), self.clone()),
        }
    }

    /// Whether any word of the language starts with `label`.
    pub fn can_step(&self, label: &Label) -> bool {
        !self.derive(label).is_empty()
    }

    /// Labels mentioned by the expression, in order of first occurrence.
    pub fn labels(&self) -> Vec<Label> {
        let mut out = Vec::new();
        self.collect_labels(&mut out);
        out
    }

    fn collect_labels(&self, out: &mut Vec<Label>) {
        match self {
            LabelRegex::Empty | LabelRegex::Epsilon => {}
            LabelRegex::Label(l) => {
                if !out.contains(l) {
                    out.push(l.clone());
                }
            }
            LabelRegex::Concat(l, r) | LabelRegex::Or(l, r) => {
                l.collect_labels(out);
                r.collect_labels(out);
            }
            LabelRegex::Closure(inner) => inner.collect_labels(out),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            LabelRegex::Or(..) => 0,
            LabelRegex::Concat(..) => 1,
            _ => 2,
        }
    }

    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            f.write_str("(")?;
            self.fmt_at(f, 0)?;
            return f.write_str(")");
        }
        match self {
            LabelRegex::Empty => f.write_str("0"),
            LabelRegex::Epsilon => f.write_str("e"),
            LabelRegex::Label(l) => write!(f, "{l}"),
            LabelRegex::Concat(l, r) => {
                l.fmt_at(f, 1)?;
                f.write_str(" ")?;
                r.fmt_at(f, 1)
            }
            LabelRegex::Or(l, r) => {
                l.fmt_at(f, 0)?;
                f.write_str(" | ")?;
                r.fmt_at(f, 0)
            }
            LabelRegex::Closure(inner) => {
                inner.fmt_at(f, 2)?;
                f.write_str("*")
            }
        }
    }
}

impl fmt::Display for LabelRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}

impl From<LabelRegex> for String {
    fn from(value: LabelRegex) -> Self {
        value.to_string()
    }
}

struct RegexParser<'a> {
    src: &'a str,
    pos: usize,
}

impl RegexParser<'_> {
    fn peek(&mut self) -> Option<char> {
        while let Some(c) = self.src[self.pos..].chars().next() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                return Some(c);
            }
        }
        None
    }

    fn alt(&mut self) -> Result<LabelRegex, LabelParseError> {
        let mut re = self.seq()?;
        while self.peek() == Some('|') {
            self.pos += 1;
            re = LabelRegex::or(re, self.seq()?);
        }
        Ok(re)
    }

    fn seq(&mut self) -> Result<LabelRegex, LabelParseError> {
        let mut re = self.postfix()?;
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            re = LabelRegex::concat(re, self.postfix()?);
        }
        Ok(re)
    }

    fn postfix(&mut self) -> Result<LabelRegex, LabelParseError> {
        let mut re = self.atom()?;
        loop {
            match self.peek() {
                Some('*') => re = LabelRegex::closure(re),
                Some('+') => re = LabelRegex::concat(re.clone(), LabelRegex::closure(re)),
                Some('?') => re = LabelRegex::or(LabelRegex::Epsilon, re),
                _ => return Ok(re),
            }
            self.pos += 1;
        }
    }

    fn atom(&mut self) -> Result<LabelRegex, LabelParseError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let re = self.alt()?;
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(re)
                    }
                    Some(found) => Err(LabelParseError::UnexpectedChar {
                        pos: self.pos,
                        found,
                    }),
                    None => Err(LabelParseError::UnexpectedEnd),
                }
            }
            Some(c) if is_label_char(c) => {
                let start = self.pos;
                while self.src[self.pos..].chars().next().is_some_and(is_label_char) {
                    self.pos += 1;
                }
                Ok(match &self.src[start..self.pos] {
                    "e" => LabelRegex::Epsilon,
                    "0" => LabelRegex::Empty,
                    name => LabelRegex::label(name),
                })
            }
            Some(found) => Err(LabelParseError::UnexpectedChar {
                pos: self.pos,
                found,
            }),
            None => Err(LabelParseError::UnexpectedEnd),
        }
    }
}

impl FromStr for LabelRegex {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = RegexParser { src: s, pos: 0 };
        let re = parser.alt()?;
        match parser.peek() {
            None => Ok(re),
            Some(found) => Err(LabelParseError::UnexpectedChar {
                pos: parser.pos,
                found,
            }),
        }
    }
}

impl TryFrom<String> for LabelRegex {
    type Error = LabelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// Label order
// =============================================================================

/// A strict preference order on labels, closed under transitivity.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabelOrder {
    pairs: BTreeSet<(EdgeOrData, EdgeOrData)>,
}

impl LabelOrder {
    pub fn new(pairs: impl IntoIterator<Item = (EdgeOrData, EdgeOrData)>) -> Self {
        let mut closed: BTreeSet<_> = pairs.into_iter().collect();
        loop {
            let extra: Vec<_> = closed
                .iter()
                .flat_map(|(a, b)| {
                    closed
                        .iter()
                        .filter(move |(c, _)| c == b)
                        .map(move |(_, d)| (a.clone(), d.clone()))
                })
                .filter(|pair| !closed.contains(pair))
                .collect();
            if extra.is_empty() {
                return Self { pairs: closed };
            }
            closed.extend(extra);
        }
    }

    /// Whether `a` is preferred over `b`.
    pub fn lt(&self, a: &EdgeOrData, b: &EdgeOrData) -> bool {
        self.pairs.contains(&(a.clone(), b.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Edge labels mentioned by the order.
    pub fn labels(&self) -> Vec<Label> {
        let mut out: Vec<Label> = Vec::new();
        for (a, b) in &self.pairs {
            for side in [a, b] {
                if let EdgeOrData::Edge(l) = side {
                    if !out.contains(l) {
                        out.push(l.clone());
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for LabelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (a, b)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{a} < {b}")?;
        }
        Ok(())
    }
}

impl From<LabelOrder> for String {
    fn from(value: LabelOrder) -> Self {
        value.to_string()
    }
}

impl FromStr for LabelOrder {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pairs = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (a, b) = entry
                .split_once('<')
                .ok_or_else(|| LabelParseError::InvalidOrder(entry.to_string()))?;
            pairs.push((
                EdgeOrData::try_from(a.to_string())?,
                EdgeOrData::try_from(b.to_string())?,
            ));
        }
        Ok(LabelOrder::new(pairs))
    }
}

impl TryFrom<String> for LabelOrder {
    type Error = LabelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[path = "../tests/label_tests.rs"]
mod tests;
