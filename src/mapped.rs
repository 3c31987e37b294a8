//! Array file access through a memory map of the whole file.

use crate::array::{check_run, NpyArray};
use crate::descriptor::ArrayFileDescriptor;
use crate::elements::Element;
use crate::error::NpyFileError;
use crate::file::{create_file, open_file, CreateOptions};
use log::{debug, warn};
use memmap2::MmapMut;
use std::fs::File;
use std::io;
use std::marker::PhantomData;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A writable mapping of an array file with bounds-checked access to the
/// bytes of each sample.
#[derive(Debug)]
pub struct MappedRegion {
    mmap: MmapMut,
    data_offset: usize,
    element_size: usize,
    len: usize,
}

impl MappedRegion {
    /// Maps `file`, whose data region of `len` samples of `element_size`
    /// bytes starts at byte `data_offset`.
    ///
    /// The file must be open for reading and writing.
    pub(crate) fn new(
        file: &File,
        data_offset: usize,
        element_size: usize,
        len: usize,
    ) -> Result<Self, NpyFileError> {
        // Safety: the mapping is only sound while no other handle resizes or
        // writes the file. Exclusive access is the caller's responsibility
        // for the lifetime of the handle.
        let mmap = unsafe { MmapMut::map_mut(file)? };
        let expected = data_offset as u64 + (len as u64) * (element_size as u64);
        if (mmap.len() as u64) < expected {
            return Err(NpyFileError::FileLength {
                expected,
                found: mmap.len() as u64,
            });
        }
        Ok(MappedRegion {
            mmap,
            data_offset,
            element_size,
            len,
        })
    }

    /// Number of samples in the region.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte range of the `count` samples starting at flat `start`.
    fn byte_range(&self, start: usize, count: usize) -> Result<Range<usize>, NpyFileError> {
        match start.checked_add(count) {
            Some(end) if end <= self.len => {
                let begin = self.data_offset + start * self.element_size;
                Ok(begin..begin + count * self.element_size)
            }
            _ => Err(NpyFileError::IndexOutOfRange {
                axis: None,
                index: start.saturating_add(count.saturating_sub(1)),
                len: self.len,
            }),
        }
    }

    /// Bytes of the sample at flat `offset`.
    pub fn sample_bytes(&self, offset: usize) -> Result<&[u8], NpyFileError> {
        let range = self.byte_range(offset, 1)?;
        Ok(&self.mmap[range])
    }

    pub fn sample_bytes_mut(&mut self, offset: usize) -> Result<&mut [u8], NpyFileError> {
        let range = self.byte_range(offset, 1)?;
        Ok(&mut self.mmap[range])
    }

    /// Bytes of the `count` samples starting at flat `start`.
    pub fn run_bytes(&self, start: usize, count: usize) -> Result<&[u8], NpyFileError> {
        let range = self.byte_range(start, count)?;
        Ok(&self.mmap[range])
    }

    pub fn run_bytes_mut(&mut self, start: usize, count: usize) -> Result<&mut [u8], NpyFileError> {
        let range = self.byte_range(start, count)?;
        Ok(&mut self.mmap[range])
    }

    /// Writes modified pages back to the file.
    pub fn flush(&self) -> io::Result<()> {
        self.mmap.flush()
    }
}

/// An array file accessed through a memory map.
///
/// Every access goes straight to the mapped pages; nothing is cached. When
/// the file's byte order differs from the host's, samples are swapped as
/// they are loaded and stored.
///
/// The handle assumes it is the only user of the file while it is open.
/// Changing the file's length from elsewhere while it is mapped is undefined
/// behavior.
#[derive(Debug)]
pub struct MappedNpyFile<A: Element> {
    path: PathBuf,
    descriptor: ArrayFileDescriptor,
    region: Option<MappedRegion>,
    elem: PhantomData<A>,
}

impl<A: Element> MappedNpyFile<A> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, NpyFileError> {
        let path = path.as_ref();
        let (file, descriptor) = open_file::<A>(path)?;
        let region = MappedRegion::new(
            &file,
            descriptor.header_len(),
            descriptor.element_size(),
            descriptor.len(),
        )?;
        Ok(MappedNpyFile {
            path: path.to_path_buf(),
            descriptor,
            region: Some(region),
            elem: PhantomData,
        })
    }

    /// Creates a zero-filled file of `shape` and maps it.
    pub fn create<P: AsRef<Path>>(
        path: P,
        shape: &[usize],
        options: CreateOptions,
    ) -> Result<Self, NpyFileError> {
        let path = path.as_ref();
        create_file::<A>(path, shape, options)?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn region(&self) -> Result<&MappedRegion, NpyFileError> {
        self.region.as_ref().ok_or(NpyFileError::Closed)
    }

    fn region_mut(&mut self) -> Result<&mut MappedRegion, NpyFileError> {
        self.region.as_mut().ok_or(NpyFileError::Closed)
    }
}

impl<A: Element> NpyArray for MappedNpyFile<A> {
    type Elem = A;

    fn descriptor(&self) -> &ArrayFileDescriptor {
        &self.descriptor
    }

    fn load(&mut self, offset: usize) -> Result<A, NpyFileError> {
        let order = self.descriptor.byte_order();
        let bytes = self.region()?.sample_bytes(offset)?;
        Ok(A::decode(bytes, order)?)
    }

    fn store(&mut self, offset: usize, value: A) -> Result<(), NpyFileError> {
        let order = self.descriptor.byte_order();
        let bytes = self.region_mut()?.sample_bytes_mut(offset)?;
        value.encode(bytes, order);
        Ok(())
    }

    fn read_run(&mut self, start: usize, out: &mut [A]) -> Result<(), NpyFileError> {
        check_run(&self.descriptor, start, out.len())?;
        let order = self.descriptor.byte_order();
        let bytes = self.region()?.run_bytes(start, out.len())?;
        A::read_into(bytes, order, out)?;
        Ok(())
    }

    fn write_run(&mut self, start: usize, values: &[A]) -> Result<(), NpyFileError> {
        check_run(&self.descriptor, start, values.len())?;
        let order = self.descriptor.byte_order();
        let bytes = self.region_mut()?.run_bytes_mut(start, values.len())?;
        A::write_slice(values, bytes, order)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), NpyFileError> {
        self.region()?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), NpyFileError> {
        let region = match self.region.take() {
            Some(region) => region,
            None => return Ok(()),
        };
        let result = region.flush();
        drop(region);
        debug!("unmapped {}", self.path.display());
        Ok(result?)
    }

    fn is_closed(&self) -> bool {
        self.region.is_none()
    }
}

impl<A: Element> Drop for MappedNpyFile<A> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(
                "error flushing {} while dropping it: {}",
                self.path.display(),
                err
            );
        }
    }
}
