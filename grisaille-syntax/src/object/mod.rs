//! Operand objects of content streams.

mod dict;
mod name;
mod number;
mod string;

pub use dict::Dict;
pub use name::Name;
pub use number::Number;

use crate::content::InlineImage;
use crate::error::{ErrorKind, Result};
use crate::reader::Reader;

use string::write_literal;

/// An operand of a content stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// The null object.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A number.
    Number(Number),
    /// A string, stored as its decoded bytes.
    String(Vec<u8>),
    /// A name.
    Name(Name),
    /// An array.
    Array(Vec<Object>),
    /// A dictionary.
    Dict(Dict),
    /// An inline image, the single operand of a `BI` operator.
    InlineImage(Box<InlineImage>),
}

impl Object {
    /// Return the number, if the object is one.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the number as an `f32`, if the object is one.
    pub fn as_f32(&self) -> Option<f32> {
        self.as_number().map(Number::as_f32)
    }

    /// Return the name, if the object is one.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Return the string bytes, if the object is a string.
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the array, if the object is one.
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Return the dictionary, if the object is one.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Return the boolean, if the object is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the inline image, if the object is one.
    pub fn as_inline_image(&self) -> Option<&InlineImage> {
        match self {
            Self::InlineImage(i) => Some(i),
            _ => None,
        }
    }

    /// Write the object in content stream syntax.
    pub fn write(&self, out: &mut Vec<u8>) {
        match self {
            Self::Null => out.extend_from_slice(b"null"),
            Self::Boolean(true) => out.extend_from_slice(b"true"),
            Self::Boolean(false) => out.extend_from_slice(b"false"),
            Self::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
            Self::String(s) => write_literal(s, out),
            Self::Name(n) => n.write(out),
            Self::Array(items) => {
                out.push(b'[');

                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }

                    item.write(out);
                }

                out.push(b']');
            }
            Self::Dict(dict) => dict.write(out),
            Self::InlineImage(image) => image.write(out),
        }
    }
}

impl From<f32> for Object {
    fn from(value: f32) -> Self {
        Self::Number(Number::Real(value))
    }
}

impl From<i32> for Object {
    fn from(value: i32) -> Self {
        Self::Number(Number::Integer(value))
    }
}

impl From<Name> for Object {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<Dict> for Object {
    fn from(value: Dict) -> Self {
        Self::Dict(value)
    }
}

/// Read a single operand object. Keywords other than `true`, `false` and `null` are
/// not objects and are left to the caller.
pub(crate) fn read(r: &mut Reader<'_>) -> Result<Object> {
    r.skip_whitespace_and_comments();

    let b = r
        .peek_byte()
        .ok_or_else(|| r.error(ErrorKind::UnexpectedEof))?;

    match b {
        b'(' => string::read_literal(r).map(Object::String),
        b'<' => {
            if r.peek_bytes(2) == Some(b"<<") {
                dict::read(r).map(Object::Dict)
            } else {
                string::read_hex(r).map(Object::String)
            }
        }
        b'/' => name::read(r).map(Object::Name),
        b'[' => read_array(r).map(Object::Array),
        b'.' | b'+' | b'-' | b'0'..=b'9' => number::read(r).map(Object::Number),
        b')' | b']' | b'>' | b'{' | b'}' => Err(r.error(ErrorKind::UnexpectedDelimiter)),
        _ => {
            let start = r.offset();

            match r.read_regular() {
                b"true" => Ok(Object::Boolean(true)),
                b"false" => Ok(Object::Boolean(false)),
                b"null" => Ok(Object::Null),
                _ => {
                    r.jump(start);
                    Err(r.error(ErrorKind::InvalidKeyword))
                }
            }
        }
    }
}

fn read_array(r: &mut Reader<'_>) -> Result<Vec<Object>> {
    let start = r.offset();
    r.forward_tag(b"[")
        .ok_or_else(|| r.error(ErrorKind::UnexpectedDelimiter))?;

    let mut items = Vec::new();

    loop {
        r.skip_whitespace_and_comments();

        match r.peek_byte() {
            None => return Err(crate::error::Error::new(ErrorKind::UnexpectedEof, start)),
            Some(b']') => {
                r.forward();
                return Ok(items);
            }
            Some(_) => items.push(read(r)?),
        }
    }
}
