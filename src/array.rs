use crate::descriptor::ArrayFileDescriptor;
use crate::elements::Element;
use crate::error::NpyFileError;
use crate::slice::Selection;
use ndarray::prelude::*;
use ndarray::{Data, ShapeBuilder, SliceInfoElem};

/// Checks that the run of `count` samples starting at flat `start` lies in
/// the array.
pub(crate) fn check_run(
    descriptor: &ArrayFileDescriptor,
    start: usize,
    count: usize,
) -> Result<(), NpyFileError> {
    if count == 0 {
        if start <= descriptor.len() {
            return Ok(());
        }
        return descriptor.layout().check_flat(start);
    }
    let last = start
        .checked_add(count - 1)
        .ok_or(NpyFileError::IndexOutOfRange {
            axis: None,
            index: usize::MAX,
            len: descriptor.len(),
        })?;
    descriptor.layout().check_flat(last)
}

/// Fails with [`NpyFileError::Closed`] on a closed handle, for the entry
/// points that may otherwise touch no sample at all.
fn check_open<T: NpyArray + ?Sized>(array: &T) -> Result<(), NpyFileError> {
    if array.is_closed() {
        return Err(NpyFileError::Closed);
    }
    Ok(())
}

fn read_selection<T: NpyArray + ?Sized>(
    array: &mut T,
    selection: &Selection,
) -> Result<ArrayD<T::Elem>, NpyFileError> {
    check_open(array)?;
    let mut data = Vec::with_capacity(selection.len());
    selection.for_each_coord(|_, coords| {
        let offset = array.descriptor().layout().ravel(coords)?;
        data.push(array.load(offset)?);
        Ok(())
    })?;
    Ok(ArrayD::from_shape_vec(IxDyn(&selection.shape()), data)?)
}

/// Random access to the samples of an open array file.
///
/// Implemented by [`BufferedNpyFile`](crate::BufferedNpyFile) and
/// [`MappedNpyFile`](crate::MappedNpyFile), which give identical results for
/// every operation. Every entry point validates its coordinates or offsets
/// and fails with [`NpyFileError::Closed`] once the handle is closed.
///
/// Coordinates are always given in logical order (`[row, column, ...]`),
/// whatever the storage order of the file. Results of range reads are
/// ordinary `ndarray` arrays in logical order.
pub trait NpyArray {
    /// The sample type.
    type Elem: Element;

    fn descriptor(&self) -> &ArrayFileDescriptor;

    /// Reads the sample at flat storage `offset`.
    fn load(&mut self, offset: usize) -> Result<Self::Elem, NpyFileError>;

    /// Writes the sample at flat storage `offset`.
    fn store(&mut self, offset: usize, value: Self::Elem) -> Result<(), NpyFileError>;

    /// Writes any pending changes to the file.
    fn flush(&mut self) -> Result<(), NpyFileError>;

    /// Flushes pending changes and releases the file.
    ///
    /// The file is released even if the flush fails, in which case the flush
    /// error is returned. Closing a closed handle does nothing.
    fn close(&mut self) -> Result<(), NpyFileError>;

    /// Returns `true` once [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;

    /// Reads the sample at `coords`.
    fn get(&mut self, coords: &[usize]) -> Result<Self::Elem, NpyFileError> {
        let offset = self.descriptor().layout().ravel(coords)?;
        self.load(offset)
    }

    /// Writes the sample at `coords`.
    fn set(&mut self, coords: &[usize], value: Self::Elem) -> Result<(), NpyFileError> {
        let offset = self.descriptor().layout().ravel(coords)?;
        self.store(offset, value)
    }

    /// Reads the sample at flat storage `offset`.
    fn get_flat(&mut self, offset: usize) -> Result<Self::Elem, NpyFileError> {
        self.descriptor().layout().check_flat(offset)?;
        self.load(offset)
    }

    /// Writes the sample at flat storage `offset`.
    fn set_flat(&mut self, offset: usize, value: Self::Elem) -> Result<(), NpyFileError> {
        self.descriptor().layout().check_flat(offset)?;
        self.store(offset, value)
    }

    /// Fills `out` with the samples stored from flat offset `start` on.
    fn read_run(&mut self, start: usize, out: &mut [Self::Elem]) -> Result<(), NpyFileError> {
        check_open(self)?;
        check_run(self.descriptor(), start, out.len())?;
        for (i, out) in out.iter_mut().enumerate() {
            *out = self.load(start + i)?;
        }
        Ok(())
    }

    /// Stores `values` from flat offset `start` on.
    fn write_run(&mut self, start: usize, values: &[Self::Elem]) -> Result<(), NpyFileError> {
        check_open(self)?;
        check_run(self.descriptor(), start, values.len())?;
        for (i, &value) in values.iter().enumerate() {
            self.store(start + i, value)?;
        }
        Ok(())
    }

    /// Reads the samples selected by one slice argument per axis.
    ///
    /// Axes selected by an index are removed from the result.
    ///
    /// ```no_run
    /// use ndarray::s;
    /// use npy_file::{BufferedNpyFile, NpyArray};
    ///
    /// let mut file = BufferedNpyFile::<f32>::open("grid.npy")?;
    /// let corner = file.read_slice(s![..2, -2..])?;
    /// let column = file.read_slice(s![.., 1])?;
    /// # Ok::<(), npy_file::NpyFileError>(())
    /// ```
    fn read_slice<I>(&mut self, info: I) -> Result<ArrayD<Self::Elem>, NpyFileError>
    where
        I: AsRef<[SliceInfoElem]>,
    {
        let selection = Selection::resolve(info.as_ref(), self.descriptor().shape())?;
        read_selection(self, &selection)
    }

    /// Writes `data` to the samples selected by one slice argument per axis.
    ///
    /// `data` must have the shape of the selection.
    fn write_slice<I, S, D>(&mut self, info: I, data: &ArrayBase<S, D>) -> Result<(), NpyFileError>
    where
        I: AsRef<[SliceInfoElem]>,
        S: Data<Elem = Self::Elem>,
        D: Dimension,
    {
        check_open(self)?;
        let selection = Selection::resolve(info.as_ref(), self.descriptor().shape())?;
        let expected = selection.shape();
        if data.shape() != expected.as_slice() {
            return Err(NpyFileError::ShapeMismatch {
                expected,
                found: data.shape().to_vec(),
            });
        }
        let values: Vec<Self::Elem> = data.iter().cloned().collect();
        selection.for_each_coord(|n, coords| {
            let offset = self.descriptor().layout().ravel(coords)?;
            self.store(offset, values[n])
        })
    }

    /// Reads the sub-array at `index` along `axis`.
    ///
    /// For a `[3, 4]` array, `take(0, i)` is row `i` and `take(1, j)` is
    /// column `j`.
    fn take(&mut self, axis: usize, index: usize) -> Result<ArrayD<Self::Elem>, NpyFileError> {
        let selection = Selection::take(self.descriptor().shape(), axis, index)?;
        read_selection(self, &selection)
    }

    /// Reads the whole array.
    fn read_array(&mut self) -> Result<ArrayD<Self::Elem>, NpyFileError> {
        let mut data = vec![Self::Elem::default(); self.descriptor().len()];
        self.read_run(0, &mut data)?;
        let shape = IxDyn(self.descriptor().shape()).set_f(self.descriptor().fortran_order());
        Ok(ArrayD::from_shape_vec(shape, data)?)
    }

    /// Overwrites the whole array with `data`, which must have the file's
    /// shape.
    fn write_array<S, D>(&mut self, data: &ArrayBase<S, D>) -> Result<(), NpyFileError>
    where
        S: Data<Elem = Self::Elem>,
        D: Dimension,
    {
        if data.shape() != self.descriptor().shape() {
            return Err(NpyFileError::ShapeMismatch {
                expected: self.descriptor().shape().to_vec(),
                found: data.shape().to_vec(),
            });
        }
        // Transposing a C-order iteration gives Fortran order.
        let values: Vec<Self::Elem> = if self.descriptor().fortran_order() {
            data.t().iter().cloned().collect()
        } else {
            data.iter().cloned().collect()
        };
        self.write_run(0, &values)
    }
}
