//! Mapping between coordinates and flat sample offsets.

use crate::error::NpyFileError;

/// Which axis varies fastest in the flattened data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// C order: the last axis varies fastest.
    RowMajor,
    /// Fortran order: the first axis varies fastest.
    ColumnMajor,
}

impl Order {
    /// Row-major order.
    pub const C: Order = Order::RowMajor;
    /// Column-major order.
    pub const F: Order = Order::ColumnMajor;

    /// Maps the header's `fortran_order` flag to an order.
    pub fn from_fortran(fortran_order: bool) -> Self {
        if fortran_order {
            Order::ColumnMajor
        } else {
            Order::RowMajor
        }
    }

    pub fn is_fortran(self) -> bool {
        self == Order::ColumnMajor
    }
}

fn check_rank(coords: &[usize], shape: &[usize]) -> Result<(), NpyFileError> {
    if coords.len() == shape.len() {
        Ok(())
    } else {
        Err(NpyFileError::DimensionMismatch {
            expected: shape.len(),
            found: coords.len(),
        })
    }
}

fn check_coords(coords: &[usize], shape: &[usize]) -> Result<(), NpyFileError> {
    check_rank(coords, shape)?;
    for (axis, (&index, &len)) in coords.iter().zip(shape).enumerate() {
        if index >= len {
            return Err(NpyFileError::IndexOutOfRange {
                axis: Some(axis),
                index,
                len,
            });
        }
    }
    Ok(())
}

fn checked_len(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &len| acc.checked_mul(len))
}

/// Returns the flat offset of `coords` in an array of `shape` stored in
/// `order`.
///
/// Strides are derived from `shape` on every call; use [`Layout`] for
/// repeated lookups in the same array.
pub fn ravel(coords: &[usize], shape: &[usize], order: Order) -> Result<usize, NpyFileError> {
    check_coords(coords, shape)?;
    let overflow = || NpyFileError::InvalidShape(shape.to_vec());
    let axes: Box<dyn Iterator<Item = usize>> = match order {
        Order::RowMajor => Box::new(0..shape.len()),
        Order::ColumnMajor => Box::new((0..shape.len()).rev()),
    };
    let mut offset = 0usize;
    for axis in axes {
        offset = offset
            .checked_mul(shape[axis])
            .and_then(|o| o.checked_add(coords[axis]))
            .ok_or_else(overflow)?;
    }
    Ok(offset)
}

/// Returns the coordinates of the sample at flat `offset` in an array of
/// `shape` stored in `order`.
pub fn unravel(offset: usize, shape: &[usize], order: Order) -> Result<Vec<usize>, NpyFileError> {
    let len = checked_len(shape).ok_or_else(|| NpyFileError::InvalidShape(shape.to_vec()))?;
    if offset >= len {
        return Err(NpyFileError::IndexOutOfRange {
            axis: None,
            index: offset,
            len,
        });
    }
    let mut coords = vec![0; shape.len()];
    let mut rest = offset;
    let mut take = |axis: usize| {
        coords[axis] = rest % shape[axis];
        rest /= shape[axis];
    };
    match order {
        Order::RowMajor => (0..shape.len()).rev().for_each(&mut take),
        Order::ColumnMajor => (0..shape.len()).for_each(&mut take),
    }
    Ok(coords)
}

/// The shape, order and strides of an array, validated once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    strides: Vec<usize>,
    order: Order,
    len: usize,
}

impl Layout {
    /// Creates the layout of an array of `shape` stored in `order`.
    ///
    /// The shape must have at least one axis, no axis may be empty, and the
    /// number of samples must fit in `usize`.
    pub fn new(shape: &[usize], order: Order) -> Result<Self, NpyFileError> {
        let invalid = || NpyFileError::InvalidShape(shape.to_vec());
        if shape.is_empty() || shape.contains(&0) {
            return Err(invalid());
        }
        let len = checked_len(shape).ok_or_else(invalid)?;

        let mut strides = vec![1; shape.len()];
        match order {
            Order::RowMajor => {
                for axis in (0..shape.len() - 1).rev() {
                    strides[axis] = strides[axis + 1] * shape[axis + 1];
                }
            }
            Order::ColumnMajor => {
                for axis in 1..shape.len() {
                    strides[axis] = strides[axis - 1] * shape[axis - 1];
                }
            }
        }

        Ok(Layout {
            shape: shape.to_vec(),
            strides,
            order,
            len,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Distance in samples between neighbors along each axis.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; empty shapes are rejected by [`Layout::new`].
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the flat offset of `coords`.
    pub fn ravel(&self, coords: &[usize]) -> Result<usize, NpyFileError> {
        check_coords(coords, &self.shape)?;
        let s = &self.strides;
        let offset = match *coords {
            [i] => i,
            [i, j] => i * s[0] + j * s[1],
            [i, j, k] => i * s[0] + j * s[1] + k * s[2],
            [i, j, k, l] => i * s[0] + j * s[1] + k * s[2] + l * s[3],
            _ => return ravel(coords, &self.shape, self.order),
        };
        Ok(offset)
    }

    /// Returns the coordinates of the sample at flat `offset`.
    pub fn unravel(&self, offset: usize) -> Result<Vec<usize>, NpyFileError> {
        self.check_flat(offset)?;
        unravel(offset, &self.shape, self.order)
    }

    /// Checks that `offset` addresses a sample.
    pub fn check_flat(&self, offset: usize) -> Result<(), NpyFileError> {
        if offset < self.len {
            Ok(())
        } else {
            Err(NpyFileError::IndexOutOfRange {
                axis: None,
                index: offset,
                len: self.len,
            })
        }
    }
}
