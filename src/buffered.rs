//! Array file access through a sliding window over ordinary file I/O.

use crate::array::{check_run, NpyArray};
use crate::descriptor::ArrayFileDescriptor;
use crate::elements::Element;
use crate::error::NpyFileError;
use crate::file::{create_file, open_file, CreateOptions};
use log::{debug, trace, warn};
use std::cmp;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Default capacity of the window, in samples.
pub const DEFAULT_WINDOW_LEN: usize = 1 << 21;

/// Options for [`BufferedNpyFile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferedOptions {
    /// Maximum number of samples held in memory at once. Values below 1 are
    /// treated as 1.
    pub window_len: usize,
}

impl Default for BufferedOptions {
    fn default() -> Self {
        BufferedOptions {
            window_len: DEFAULT_WINDOW_LEN,
        }
    }
}

impl BufferedOptions {
    pub fn window_len(mut self, window_len: usize) -> Self {
        self.window_len = window_len;
        self
    }
}

/// One contiguous run of samples cached from the file, kept in the file's
/// encoding so that each sample is decoded only when it is accessed.
#[derive(Debug)]
struct Window {
    bytes: Vec<u8>,
    /// Capacity in samples.
    capacity: usize,
    /// Flat offset of the first cached sample.
    start: usize,
    /// Number of valid samples in `bytes`.
    len: usize,
    /// Whether the valid samples differ from the file.
    dirty: bool,
}

impl Window {
    fn new(capacity: usize) -> Self {
        Window {
            bytes: Vec::new(),
            capacity: cmp::max(capacity, 1),
            start: 0,
            len: 0,
            dirty: false,
        }
    }

    /// Sample slot of flat `offset`, if it is cached.
    fn slot(&self, offset: usize) -> Option<usize> {
        if offset >= self.start && offset - self.start < self.len {
            Some(offset - self.start)
        } else {
            None
        }
    }
}

/// An array file read and written through a bounded window of samples.
///
/// Accesses inside the window are served from memory. An access outside it
/// writes the window back (if it was modified) and reloads it starting at the
/// accessed sample, so sequential access in storage order touches the disk
/// once per window. Writes reach the file when the window moves, on
/// [`flush`](NpyArray::flush), and on [`close`](NpyArray::close).
///
/// Dropping the handle closes it; errors are then only logged, so call
/// `close` to observe them.
///
/// ```no_run
/// use npy_file::{BufferedNpyFile, CreateOptions, NpyArray};
///
/// let mut file = BufferedNpyFile::<f32>::create("grid.npy", &[3, 4], CreateOptions::default())?;
/// for i in 0..3 {
///     for j in 0..4 {
///         file.set(&[i, j], (i * 4 + j) as f32)?;
///     }
/// }
/// file.close()?;
///
/// let mut file = BufferedNpyFile::<f32>::open("grid.npy")?;
/// assert_eq!(file.get(&[2, 3])?, 11.);
/// # Ok::<(), npy_file::NpyFileError>(())
/// ```
#[derive(Debug)]
pub struct BufferedNpyFile<A: Element> {
    path: PathBuf,
    descriptor: ArrayFileDescriptor,
    file: Option<File>,
    window: Window,
    elem: PhantomData<A>,
}

impl<A: Element> BufferedNpyFile<A> {
    /// Opens an existing file with the default window length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, NpyFileError> {
        Self::open_with(path, BufferedOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(
        path: P,
        options: BufferedOptions,
    ) -> Result<Self, NpyFileError> {
        let path = path.as_ref();
        let (file, descriptor) = open_file::<A>(path)?;
        Ok(BufferedNpyFile {
            path: path.to_path_buf(),
            descriptor,
            file: Some(file),
            window: Window::new(options.window_len),
            elem: PhantomData,
        })
    }

    /// Creates a zero-filled file of `shape` with the default window length.
    pub fn create<P: AsRef<Path>>(
        path: P,
        shape: &[usize],
        options: CreateOptions,
    ) -> Result<Self, NpyFileError> {
        Self::create_with(path, shape, options, BufferedOptions::default())
    }

    pub fn create_with<P: AsRef<Path>>(
        path: P,
        shape: &[usize],
        options: CreateOptions,
        buffered: BufferedOptions,
    ) -> Result<Self, NpyFileError> {
        let path = path.as_ref();
        create_file::<A>(path, shape, options)?;
        Self::open_with(path, buffered)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maximum number of samples held in memory.
    pub fn window_len(&self) -> usize {
        self.window.capacity
    }

    /// Writes the window back to the file if it was modified.
    fn write_back(&mut self) -> Result<(), NpyFileError> {
        let window = &mut self.window;
        if !window.dirty || window.len == 0 {
            return Ok(());
        }
        let file = self.file.as_mut().ok_or(NpyFileError::Closed)?;
        file.seek(SeekFrom::Start(self.descriptor.byte_position(window.start)))?;
        file.write_all(&window.bytes[..window.len * A::SIZE])?;
        window.dirty = false;
        trace!(
            "{}: wrote back samples {}..{}",
            self.path.display(),
            window.start,
            window.start + window.len
        );
        Ok(())
    }

    /// Replaces the window with the samples starting at `offset`.
    fn refill(&mut self, offset: usize) -> Result<(), NpyFileError> {
        self.write_back()?;
        let file = self.file.as_mut().ok_or(NpyFileError::Closed)?;
        let window = &mut self.window;
        let count = cmp::min(window.capacity, self.descriptor.len() - offset);
        if window.bytes.len() < count * A::SIZE {
            window.bytes.resize(count * A::SIZE, 0);
        }
        window.start = offset;
        window.len = 0;
        file.seek(SeekFrom::Start(self.descriptor.byte_position(offset)))?;
        file.read_exact(&mut window.bytes[..count * A::SIZE])?;
        window.len = count;
        trace!(
            "{}: loaded samples {}..{}",
            self.path.display(),
            offset,
            offset + count
        );
        Ok(())
    }

    /// Makes sure flat `offset` is in the window and returns its slot.
    fn slot(&mut self, offset: usize) -> Result<usize, NpyFileError> {
        if self.file.is_none() {
            return Err(NpyFileError::Closed);
        }
        self.descriptor.layout().check_flat(offset)?;
        match self.window.slot(offset) {
            Some(slot) => Ok(slot),
            None => {
                self.refill(offset)?;
                Ok(0)
            }
        }
    }
}

impl<A: Element> NpyArray for BufferedNpyFile<A> {
    type Elem = A;

    fn descriptor(&self) -> &ArrayFileDescriptor {
        &self.descriptor
    }

    fn load(&mut self, offset: usize) -> Result<A, NpyFileError> {
        let slot = self.slot(offset)?;
        let bytes = &self.window.bytes[slot * A::SIZE..(slot + 1) * A::SIZE];
        Ok(A::decode(bytes, self.descriptor.byte_order())?)
    }

    fn store(&mut self, offset: usize, value: A) -> Result<(), NpyFileError> {
        let slot = self.slot(offset)?;
        let bytes = &mut self.window.bytes[slot * A::SIZE..(slot + 1) * A::SIZE];
        value.encode(bytes, self.descriptor.byte_order());
        self.window.dirty = true;
        Ok(())
    }

    fn read_run(&mut self, start: usize, out: &mut [A]) -> Result<(), NpyFileError> {
        if self.file.is_none() {
            return Err(NpyFileError::Closed);
        }
        check_run(&self.descriptor, start, out.len())?;
        let order = self.descriptor.byte_order();
        let mut done = 0;
        while done < out.len() {
            let slot = self.slot(start + done)?;
            let n = cmp::min(self.window.len - slot, out.len() - done);
            let bytes = &self.window.bytes[slot * A::SIZE..(slot + n) * A::SIZE];
            A::read_into(bytes, order, &mut out[done..done + n])?;
            done += n;
        }
        Ok(())
    }

    fn write_run(&mut self, start: usize, values: &[A]) -> Result<(), NpyFileError> {
        if self.file.is_none() {
            return Err(NpyFileError::Closed);
        }
        check_run(&self.descriptor, start, values.len())?;
        let order = self.descriptor.byte_order();
        let mut done = 0;
        while done < values.len() {
            let slot = self.slot(start + done)?;
            let n = cmp::min(self.window.len - slot, values.len() - done);
            let bytes = &mut self.window.bytes[slot * A::SIZE..(slot + n) * A::SIZE];
            A::write_slice(&values[done..done + n], bytes, order)?;
            self.window.dirty = true;
            done += n;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), NpyFileError> {
        if self.file.is_none() {
            return Err(NpyFileError::Closed);
        }
        self.write_back()
    }

    fn close(&mut self) -> Result<(), NpyFileError> {
        if self.file.is_none() {
            return Ok(());
        }
        let result = self.write_back();
        self.file = None;
        self.window.bytes = Vec::new();
        self.window.len = 0;
        self.window.dirty = false;
        debug!("closed {}", self.path.display());
        result
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

impl<A: Element> Drop for BufferedNpyFile<A> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(
                "error writing back {} while dropping it: {}",
                self.path.display(),
                err
            );
        }
    }
}
