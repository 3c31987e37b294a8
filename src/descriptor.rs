use crate::codec::ByteOrder;
use crate::dtype::TypeDescriptor;
use crate::error::NpyFileError;
use crate::header::{ParsedHeader, Version};
use crate::ravel::{Layout, Order};

/// Metadata of an open array file.
///
/// Fixed when the file is opened or created; the data region starts at
/// [`header_len`](Self::header_len) and holds [`len`](Self::len) samples of
/// [`element_size`](Self::element_size) bytes each.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayFileDescriptor {
    layout: Layout,
    type_descriptor: TypeDescriptor,
    header_len: usize,
    version: Version,
    data_len: u64,
}

impl ArrayFileDescriptor {
    pub(crate) fn new(
        layout: Layout,
        type_descriptor: TypeDescriptor,
        header_len: usize,
        version: Version,
    ) -> Result<Self, NpyFileError> {
        let data_len = (layout.len() as u64)
            .checked_mul(type_descriptor.size as u64)
            .ok_or_else(|| NpyFileError::InvalidShape(layout.shape().to_vec()))?;
        Ok(ArrayFileDescriptor {
            layout,
            type_descriptor,
            header_len,
            version,
            data_len,
        })
    }

    /// Builds the descriptor of a parsed header.
    pub fn from_parsed(parsed: &ParsedHeader) -> Result<Self, NpyFileError> {
        let type_descriptor = TypeDescriptor::from_py_value(&parsed.header.type_descriptor)?;
        let layout = Layout::new(
            &parsed.header.shape,
            Order::from_fortran(parsed.header.fortran_order),
        )?;
        Self::new(layout, type_descriptor, parsed.data_offset, parsed.version)
    }

    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// Always `false`; every axis holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn element_size(&self) -> usize {
        self.type_descriptor.size
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.type_descriptor.byte_order
    }

    pub fn fortran_order(&self) -> bool {
        self.layout.order().is_fortran()
    }

    pub fn order(&self) -> Order {
        self.layout.order()
    }

    /// Byte offset of the first sample.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Length of the data region in bytes.
    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    /// Length the file must have.
    pub fn file_len(&self) -> u64 {
        self.header_len as u64 + self.data_len
    }

    /// Byte position in the file of the sample at flat `offset`.
    pub(crate) fn byte_position(&self, offset: usize) -> u64 {
        self.header_len as u64 + offset as u64 * self.element_size() as u64
    }
}
