//! Trait implementation for `bool`.

use super::{Element, ReadDataError};
use crate::codec::ByteOrder;
use crate::dtype::TypeKind;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::error::Error;
use std::fmt;
use std::io;

/// An error parsing a `bool` from a byte.
#[derive(Debug)]
struct ParseBoolError {
    bad_value: u8,
}

impl Error for ParseBoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for ParseBoolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "error parsing value {:#04x} as a bool", self.bad_value)
    }
}

impl From<ParseBoolError> for ReadDataError {
    fn from(err: ParseBoolError) -> ReadDataError {
        ReadDataError::ParseData(Box::new(err))
    }
}

/// Only `0x00` and `0x01` are valid representations.
fn parse_bool(byte: u8) -> Result<bool, ParseBoolError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        bad_value => Err(ParseBoolError { bad_value }),
    }
}

impl Element for bool {
    const KIND: TypeKind = TypeKind::Bool;
    const SIZE: usize = 1;

    fn read<R: io::Read>(mut reader: R, _order: ByteOrder) -> Result<Self, ReadDataError> {
        Ok(parse_bool(reader.read_u8()?)?)
    }

    fn read_into<R: io::Read>(
        mut reader: R,
        _order: ByteOrder,
        out: &mut [Self],
    ) -> Result<(), ReadDataError> {
        let mut bytes = vec![0; out.len()];
        reader.read_exact(&mut bytes)?;
        for (out, &byte) in out.iter_mut().zip(&bytes) {
            *out = parse_bool(byte)?;
        }
        Ok(())
    }

    fn write<W: io::Write>(self, mut writer: W, _order: ByteOrder) -> io::Result<()> {
        writer.write_u8(self as u8)
    }

    fn write_slice<W: io::Write>(slice: &[Self], mut writer: W, _order: ByteOrder) -> io::Result<()> {
        let bytes: Vec<u8> = slice.iter().map(|&v| v as u8).collect();
        writer.write_all(&bytes)
    }

    fn decode(bytes: &[u8], _order: ByteOrder) -> Result<Self, ReadDataError> {
        Ok(parse_bool(bytes[0])?)
    }

    fn encode(self, bytes: &mut [u8], _order: ByteOrder) {
        bytes[0] = self as u8;
    }
}
