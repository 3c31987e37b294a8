//! The [`Element`] trait and its implementations for the supported sample
//! types.

use crate::codec::{ByteOrder, SwapBytes};
use crate::dtype::{TypeDescriptor, TypeKind};
use std::error::Error;
use std::fmt;
use std::io;

/// An error reading samples.
#[derive(Debug)]
pub enum ReadDataError {
    /// An error caused by I/O.
    Io(io::Error),
    /// An error parsing the data into the element type.
    ParseData(Box<dyn Error + Send + Sync>),
}

impl Error for ReadDataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadDataError::Io(err) => Some(err),
            ReadDataError::ParseData(err) => Some(&**err),
        }
    }
}

impl fmt::Display for ReadDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadDataError::Io(err) => write!(f, "I/O error: {}", err),
            ReadDataError::ParseData(err) => write!(f, "error parsing data: {}", err),
        }
    }
}

impl From<io::Error> for ReadDataError {
    fn from(err: io::Error) -> ReadDataError {
        ReadDataError::Io(err)
    }
}

/// A sample type that can be stored in an array file.
///
/// The implementation is selected at compile time from the type parameter of
/// the backend, so the per-sample conversion never branches on the file's
/// `descr`; only the byte order is a runtime parameter.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + SwapBytes + 'static {
    /// Kind of value, as encoded by the type code of the `descr`.
    const KIND: TypeKind;

    /// Width of one sample in bytes.
    const SIZE: usize;

    /// Returns the descriptor of this type stored in `order`.
    fn type_descriptor(order: ByteOrder) -> TypeDescriptor {
        TypeDescriptor::new(order, Self::KIND, Self::SIZE)
    }

    /// Reads one sample stored in `order`.
    fn read<R: io::Read>(reader: R, order: ByteOrder) -> Result<Self, ReadDataError>;

    /// Fills `out` with consecutive samples stored in `order`.
    fn read_into<R: io::Read>(
        reader: R,
        order: ByteOrder,
        out: &mut [Self],
    ) -> Result<(), ReadDataError>;

    /// Writes one sample in `order`.
    fn write<W: io::Write>(self, writer: W, order: ByteOrder) -> io::Result<()>;

    /// Writes all of `slice` in `order`.
    fn write_slice<W: io::Write>(slice: &[Self], writer: W, order: ByteOrder) -> io::Result<()>;

    /// Decodes the sample in the first `SIZE` bytes of `bytes`.
    ///
    /// **Panics** if `bytes` is shorter than `SIZE`.
    fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self, ReadDataError>;

    /// Encodes the sample into the first `SIZE` bytes of `bytes`.
    ///
    /// **Panics** if `bytes` is shorter than `SIZE`.
    fn encode(self, bytes: &mut [u8], order: ByteOrder);
}

/// Evaluates `$body` with `$E` bound to the `byteorder` type for `$order`.
macro_rules! with_byte_order {
    ($order:expr, $E:ident => $body:expr) => {
        match $order {
            $crate::codec::ByteOrder::Little => {
                type $E = ::byteorder::LittleEndian;
                $body
            }
            $crate::codec::ByteOrder::Big => {
                type $E = ::byteorder::BigEndian;
                $body
            }
        }
    };
}

mod boolean;
mod float16;
mod primitive;
