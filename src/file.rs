//! Opening and creating array files, shared by both backends.

use crate::codec::ByteOrder;
use crate::descriptor::ArrayFileDescriptor;
use crate::elements::Element;
use crate::error::NpyFileError;
use crate::header::{Header, ParsedHeader, Version};
use crate::ravel::{Layout, Order};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::Path;

/// Options for creating an array file.
///
/// ```
/// use npy_file::{ByteOrder, CreateOptions};
///
/// let options = CreateOptions::new()
///     .byte_order(ByteOrder::Big)
///     .fortran_order(true)
///     .overwrite(false);
/// assert_eq!(options.byte_order, ByteOrder::Big);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateOptions {
    /// Byte order of the stored samples. Defaults to little-endian.
    pub byte_order: ByteOrder,
    /// Whether the first axis varies fastest. Defaults to `false`.
    pub fortran_order: bool,
    /// Whether an existing file at the path is replaced. Defaults to `true`.
    pub overwrite: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        CreateOptions {
            byte_order: ByteOrder::Little,
            fortran_order: false,
            overwrite: true,
        }
    }
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn fortran_order(mut self, fortran_order: bool) -> Self {
        self.fortran_order = fortran_order;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

fn open_error(err: io::Error, path: &Path) -> NpyFileError {
    match err.kind() {
        io::ErrorKind::NotFound => NpyFileError::FileNotFound(path.to_path_buf()),
        _ => NpyFileError::Io(err),
    }
}

/// Reads the header of the file at `path` without binding an element type.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<ParsedHeader, NpyFileError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| open_error(err, path))?;
    Ok(Header::parse_from_reader(BufReader::new(file))?)
}

/// Reads the descriptor of the file at `path` without binding an element
/// type.
pub fn read_descriptor<P: AsRef<Path>>(path: P) -> Result<ArrayFileDescriptor, NpyFileError> {
    ArrayFileDescriptor::from_parsed(&read_header(path)?)
}

/// Opens `path` for reading and writing samples of type `A`.
///
/// Checks that the file's `descr` names `A` and that the file holds exactly
/// the samples its header declares.
pub(crate) fn open_file<A: Element>(
    path: &Path,
) -> Result<(File, ArrayFileDescriptor), NpyFileError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|err| open_error(err, path))?;
    let parsed = Header::parse_from_reader(BufReader::new(&file))?;
    let descriptor = ArrayFileDescriptor::from_parsed(&parsed)?;

    let found = descriptor.type_descriptor();
    let expected = A::type_descriptor(found.byte_order);
    if !expected.same_type(found) {
        return Err(NpyFileError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }

    let file_len = file.metadata()?.len();
    if file_len != descriptor.file_len() {
        return Err(NpyFileError::FileLength {
            expected: descriptor.file_len(),
            found: file_len,
        });
    }

    debug!(
        "opened {}: {} shape {:?}, {} order, data at byte {}",
        path.display(),
        found,
        descriptor.shape(),
        if descriptor.fortran_order() { "Fortran" } else { "C" },
        descriptor.header_len(),
    );
    Ok((file, descriptor))
}

/// Creates `path` holding `shape` samples of type `A`, all bytes zero.
///
/// The data region is allocated with `File::set_len`, so it is sparse on
/// file systems that support it.
pub(crate) fn create_file<A: Element>(
    path: &Path,
    shape: &[usize],
    options: CreateOptions,
) -> Result<ArrayFileDescriptor, NpyFileError> {
    let layout = Layout::new(shape, Order::from_fortran(options.fortran_order))?;
    let type_descriptor = A::type_descriptor(options.byte_order);
    let header = Header {
        type_descriptor: type_descriptor.to_py_value(),
        fortran_order: options.fortran_order,
        shape: shape.to_vec(),
    };
    let header_bytes = header.to_bytes()?;
    let descriptor =
        ArrayFileDescriptor::new(layout, type_descriptor, header_bytes.len(), Version::V1_0)?;

    let mut open_options = OpenOptions::new();
    open_options.read(true).write(true);
    if options.overwrite {
        open_options.create(true).truncate(true);
    } else {
        open_options.create_new(true);
    }
    let mut file = open_options.open(path).map_err(|err| match err.kind() {
        io::ErrorKind::AlreadyExists => NpyFileError::AlreadyExists(path.to_path_buf()),
        _ => open_error(err, path),
    })?;
    file.write_all(&header_bytes)?;
    file.set_len(descriptor.file_len())?;

    debug!(
        "created {}: {} shape {:?}, {} bytes",
        path.display(),
        type_descriptor,
        shape,
        descriptor.file_len(),
    );
    Ok(descriptor)
}
