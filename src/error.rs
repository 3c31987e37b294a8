use crate::elements::ReadDataError;
use crate::header::{FormatHeaderError, ParseHeaderError, ReadHeaderError, WriteHeaderError};
use ndarray::ShapeError;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error opening, creating, reading or writing an `.npy` array file.
#[derive(Debug)]
pub enum NpyFileError {
    /// An error caused by I/O.
    Io(io::Error),
    /// The file to open does not exist.
    FileNotFound(PathBuf),
    /// The file to create already exists and overwriting was disabled.
    AlreadyExists(PathBuf),
    /// An error parsing the file's header.
    ParseHeader(ParseHeaderError),
    /// An error formatting the header of a new file.
    FormatHeader(FormatHeaderError),
    /// The element type requested by the caller disagrees with the file's
    /// `descr`.
    TypeMismatch {
        /// Type descriptor of the requested element type.
        expected: String,
        /// Type descriptor found in the file.
        found: String,
    },
    /// The `descr` names a type code/width combination that is not supported.
    UnsupportedType(String),
    /// The shape has rank zero, contains a zero-length axis, or its sample
    /// count overflows.
    InvalidShape(Vec<usize>),
    /// The number of coordinates (or slice arguments) is not the rank of the
    /// array.
    DimensionMismatch {
        /// Rank of the array.
        expected: usize,
        /// Number of coordinates provided.
        found: usize,
    },
    /// A coordinate or flat offset is not less than its bound.
    IndexOutOfRange {
        /// The axis of the coordinate, or `None` for a flat offset.
        axis: Option<usize>,
        /// The offending index.
        index: usize,
        /// The exclusive bound.
        len: usize,
    },
    /// The data passed to a range write does not have the shape of the range.
    ShapeMismatch {
        /// Shape of the selected range.
        expected: Vec<usize>,
        /// Shape of the data provided.
        found: Vec<usize>,
    },
    /// A slice argument cannot be applied (zero step, new axis, reversed
    /// bounds, axis out of range).
    InvalidSlice(String),
    /// The file length does not equal the header length plus the data length.
    FileLength {
        /// Length implied by the header.
        expected: u64,
        /// Actual length of the file.
        found: u64,
    },
    /// The stored data is not a valid value of the element type.
    InvalidData(Box<dyn Error + Send + Sync>),
    /// An array could not be assembled from the data that was read.
    Shape(ShapeError),
    /// The file uses a format feature that is recognized but not implemented.
    NotImplemented(&'static str),
    /// The handle has already been closed.
    Closed,
}

impl Error for NpyFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use NpyFileError::*;
        match self {
            Io(err) => Some(err),
            FileNotFound(_) => None,
            AlreadyExists(_) => None,
            ParseHeader(err) => Some(err),
            FormatHeader(err) => Some(err),
            TypeMismatch { .. } => None,
            UnsupportedType(_) => None,
            InvalidShape(_) => None,
            DimensionMismatch { .. } => None,
            IndexOutOfRange { .. } => None,
            ShapeMismatch { .. } => None,
            InvalidSlice(_) => None,
            FileLength { .. } => None,
            InvalidData(err) => Some(&**err),
            Shape(err) => Some(err),
            NotImplemented(_) => None,
            Closed => None,
        }
    }
}

impl fmt::Display for NpyFileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use NpyFileError::*;
        match self {
            Io(err) => write!(f, "I/O error: {}", err),
            FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            AlreadyExists(path) => write!(f, "file already exists: {}", path.display()),
            ParseHeader(err) => write!(f, "error parsing header: {}", err),
            FormatHeader(err) => write!(f, "error formatting header: {}", err),
            TypeMismatch { expected, found } => write!(
                f,
                "element type mismatch: requested {} but the file contains {}",
                expected, found
            ),
            UnsupportedType(descr) => write!(f, "unsupported type descriptor: {}", descr),
            InvalidShape(shape) => write!(f, "invalid shape: {:?}", shape),
            DimensionMismatch { expected, found } => write!(
                f,
                "expected {} coordinates for an array of rank {}, but got {}",
                expected, expected, found
            ),
            IndexOutOfRange {
                axis: Some(axis),
                index,
                len,
            } => write!(
                f,
                "index {} is out of range for axis {} with length {}",
                index, axis, len
            ),
            IndexOutOfRange {
                axis: None,
                index,
                len,
            } => write!(
                f,
                "flat index {} is out of range for {} samples",
                index, len
            ),
            ShapeMismatch { expected, found } => write!(
                f,
                "data of shape {:?} does not match the selected shape {:?}",
                found, expected
            ),
            InvalidSlice(msg) => write!(f, "invalid slice: {}", msg),
            FileLength { expected, found } => write!(
                f,
                "file length is {} bytes, but the header implies {} bytes",
                found, expected
            ),
            InvalidData(err) => write!(f, "invalid data: {}", err),
            Shape(err) => write!(f, "data did not match shape: {}", err),
            NotImplemented(feature) => write!(f, "not implemented: {}", feature),
            Closed => write!(f, "the array file has been closed"),
        }
    }
}

impl From<io::Error> for NpyFileError {
    fn from(err: io::Error) -> NpyFileError {
        NpyFileError::Io(err)
    }
}

impl From<ParseHeaderError> for NpyFileError {
    fn from(err: ParseHeaderError) -> NpyFileError {
        match err {
            ParseHeaderError::UnsupportedVersion { .. } => {
                NpyFileError::NotImplemented("npy format versions 2.0 and 3.0")
            }
            err => NpyFileError::ParseHeader(err),
        }
    }
}

impl From<ReadHeaderError> for NpyFileError {
    fn from(err: ReadHeaderError) -> NpyFileError {
        match err {
            ReadHeaderError::Io(err) => NpyFileError::Io(err),
            ReadHeaderError::Parse(err) => NpyFileError::from(err),
        }
    }
}

impl From<FormatHeaderError> for NpyFileError {
    fn from(err: FormatHeaderError) -> NpyFileError {
        NpyFileError::FormatHeader(err)
    }
}

impl From<WriteHeaderError> for NpyFileError {
    fn from(err: WriteHeaderError) -> NpyFileError {
        match err {
            WriteHeaderError::Io(err) => NpyFileError::Io(err),
            WriteHeaderError::Format(err) => NpyFileError::FormatHeader(err),
        }
    }
}

impl From<ReadDataError> for NpyFileError {
    fn from(err: ReadDataError) -> NpyFileError {
        match err {
            ReadDataError::Io(err) => NpyFileError::Io(err),
            ReadDataError::ParseData(err) => NpyFileError::InvalidData(err),
        }
    }
}

impl From<ShapeError> for NpyFileError {
    fn from(err: ShapeError) -> NpyFileError {
        NpyFileError::Shape(err)
    }
}
