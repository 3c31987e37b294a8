//! The `descr` field of the header: byte order, type code and width.

use crate::codec::ByteOrder;
use crate::error::NpyFileError;
use py_literal::Value as PyValue;
use std::fmt;
use std::str::FromStr;

/// The kind of value a sample holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    Int,
    UInt,
    Float,
}

impl TypeKind {
    fn code(self) -> char {
        match self {
            TypeKind::Bool => 'b',
            TypeKind::Int => 'i',
            TypeKind::UInt => 'u',
            TypeKind::Float => 'f',
        }
    }

    fn supports_size(self, size: usize) -> bool {
        match self {
            TypeKind::Bool => size == 1,
            TypeKind::Int | TypeKind::UInt => matches!(size, 1 | 2 | 4 | 8),
            TypeKind::Float => matches!(size, 2 | 4 | 8),
        }
    }
}

/// A parsed `descr` string such as `<f4` or `|b1`.
///
/// Single-byte types are written with the `|` (not applicable) order
/// character; their `byte_order` is kept only for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub byte_order: ByteOrder,
    pub kind: TypeKind,
    /// Width of one sample in bytes.
    pub size: usize,
}

impl TypeDescriptor {
    pub fn new(byte_order: ByteOrder, kind: TypeKind, size: usize) -> Self {
        TypeDescriptor {
            byte_order,
            kind,
            size,
        }
    }

    /// Returns `true` if both describe the same kind and width, whatever
    /// their byte order.
    pub fn same_type(&self, other: &TypeDescriptor) -> bool {
        self.kind == other.kind && self.size == other.size
    }

    /// Parses the `descr` value of a header.
    ///
    /// Structured types (lists of fields) are not supported.
    pub fn from_py_value(value: &PyValue) -> Result<Self, NpyFileError> {
        match value {
            PyValue::String(descr) => descr.parse(),
            other => Err(NpyFileError::UnsupportedType(other.to_string())),
        }
    }

    pub fn to_py_value(&self) -> PyValue {
        PyValue::String(self.to_string())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let order = match (self.size, self.byte_order) {
            (1, _) => '|',
            (_, ByteOrder::Little) => '<',
            (_, ByteOrder::Big) => '>',
        };
        write!(f, "{}{}{}", order, self.kind.code(), self.size)
    }
}

impl FromStr for TypeDescriptor {
    type Err = NpyFileError;

    fn from_str(descr: &str) -> Result<Self, Self::Err> {
        let unsupported = || NpyFileError::UnsupportedType(descr.to_owned());

        let (order, rest) = match descr.chars().next() {
            Some('<') => (Some(ByteOrder::Little), &descr[1..]),
            Some('>') => (Some(ByteOrder::Big), &descr[1..]),
            Some('=') => (Some(ByteOrder::NATIVE), &descr[1..]),
            Some('|') => (None, &descr[1..]),
            Some(_) => (Some(ByteOrder::NATIVE), descr),
            None => return Err(unsupported()),
        };

        // Single-character codes name one-byte types.
        let (kind, size) = match rest {
            "?" => (TypeKind::Bool, 1),
            "b" => (TypeKind::Int, 1),
            "B" => (TypeKind::UInt, 1),
            _ => {
                let mut chars = rest.chars();
                let kind = match chars.next() {
                    Some('b') => TypeKind::Bool,
                    Some('i') => TypeKind::Int,
                    Some('u') => TypeKind::UInt,
                    Some('f') => TypeKind::Float,
                    _ => return Err(unsupported()),
                };
                let size: usize = chars.as_str().parse().map_err(|_| unsupported())?;
                (kind, size)
            }
        };

        if !kind.supports_size(size) {
            return Err(unsupported());
        }
        let byte_order = match order {
            Some(order) => order,
            None if size == 1 => ByteOrder::Little,
            None => return Err(unsupported()),
        };
        Ok(TypeDescriptor::new(byte_order, kind, size))
    }
}
