//! Content streams as sequences of operators.
//!
//! A content stream is parsed eagerly into a [`ContentStream`], which owns all of
//! its operators and can be serialized back into bytes after it has been modified.

mod inline_image;

pub use inline_image::InlineImage;

use crate::error::{ErrorKind, Result};
use crate::object::{self, Object};
use crate::reader::Reader;
use log::warn;
use smallvec::SmallVec;
use std::ops::{Deref, DerefMut};

// 6 operands are used for example by `cm` or cubic curves, anything
// above is rare (DeviceN colors, for example).
const OPERANDS_THRESHOLD: usize = 6;

/// The operands of an operator.
pub type Operands = SmallVec<[Object; OPERANDS_THRESHOLD]>;

/// An operator together with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// The operator keyword, for example `Tj` or `re`.
    pub name: String,
    /// The operands preceding the keyword, in stream order.
    pub operands: Operands,
}

impl Operator {
    /// Create a new operator.
    pub fn new(name: impl Into<String>, operands: impl IntoIterator<Item = Object>) -> Self {
        Self {
            name: name.into(),
            operands: operands.into_iter().collect(),
        }
    }

    /// The last operand, if any.
    pub fn last_operand(&self) -> Option<&Object> {
        self.operands.last()
    }

    /// The inline image carried by a `BI` operator.
    pub fn inline_image(&self) -> Option<&InlineImage> {
        self.operands.first().and_then(Object::as_inline_image)
    }

    /// Write the operator in content stream syntax, without a trailing newline.
    pub fn write(&self, out: &mut Vec<u8>) {
        // An inline image writes its own `BI` ... `EI` framing.
        if let Some(image) = self.inline_image() {
            image.write(out);
            return;
        }

        for operand in &self.operands {
            operand.write(out);
            out.push(b' ');
        }

        out.extend_from_slice(self.name.as_bytes());
    }
}

/// A parsed content stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentStream(Vec<Operator>);

impl ContentStream {
    /// Create a new, empty content stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operator.
    pub fn push(&mut self, op: Operator) {
        self.0.push(op);
    }

    /// Serialize the content stream, one operator per line.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out);
        out
    }

    /// Serialize the content stream into `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        for op in &self.0 {
            op.write(out);
            out.push(b'\n');
        }
    }

    /// Return the operators.
    pub fn into_inner(self) -> Vec<Operator> {
        self.0
    }
}

impl Deref for ContentStream {
    type Target = [Operator];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ContentStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Operator>> for ContentStream {
    fn from(value: Vec<Operator>) -> Self {
        Self(value)
    }
}

impl FromIterator<Operator> for ContentStream {
    fn from_iter<T: IntoIterator<Item = Operator>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ContentStream {
    type Item = Operator;
    type IntoIter = std::vec::IntoIter<Operator>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ContentStream {
    type Item = &'a Operator;
    type IntoIter = std::slice::Iter<'a, Operator>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse a content stream into its operators.
pub fn parse(data: &[u8]) -> Result<ContentStream> {
    let mut r = Reader::new(data);
    let mut ops = Vec::new();
    let mut operands = Operands::new();

    loop {
        r.skip_whitespace_and_comments();

        let Some(b) = r.peek_byte() else {
            break;
        };

        match b {
            b'/' | b'.' | b'+' | b'-' | b'0'..=b'9' | b'[' | b'<' | b'(' => {
                operands.push(object::read(&mut r)?);
            }
            b')' | b']' | b'>' | b'{' | b'}' => {
                return Err(r.error(ErrorKind::UnexpectedDelimiter));
            }
            _ => {
                let start = r.offset();
                let keyword = r.read_regular();

                match keyword {
                    b"true" => operands.push(Object::Boolean(true)),
                    b"false" => operands.push(Object::Boolean(false)),
                    b"null" => operands.push(Object::Null),
                    b"BI" => {
                        if !operands.is_empty() {
                            warn!("dropping {} stray operands before BI", operands.len());
                            operands.clear();
                        }

                        let image = inline_image::read(&mut r)?;
                        ops.push(Operator::new(
                            "BI",
                            [Object::InlineImage(Box::new(image))],
                        ));
                    }
                    _ => {
                        let name = core::str::from_utf8(keyword)
                            .ok()
                            .filter(|k| k.is_ascii())
                            .ok_or_else(|| crate::error::Error::new(ErrorKind::InvalidKeyword, start))?;

                        ops.push(Operator {
                            name: name.to_string(),
                            operands: core::mem::take(&mut operands),
                        });
                    }
                }
            }
        }
    }

    if !operands.is_empty() {
        warn!(
            "content stream ended with {} operands without an operator",
            operands.len()
        );
    }

    Ok(ContentStream(ops))
}
