//! Resolution of `ndarray` slice arguments against the shape of a file.

use crate::error::NpyFileError;
use ndarray::SliceInfoElem;

/// The samples picked out by a slice, as a list of indices per axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Selection {
    indices: Vec<Vec<usize>>,
    /// Axes selected by a single index, which are removed from the result.
    collapsed: Vec<bool>,
}

fn invalid(msg: String) -> NpyFileError {
    NpyFileError::InvalidSlice(msg)
}

/// Resolves a possibly negative position on an axis of length `len`.
///
/// `inclusive_end` allows the one-past-the-end position used by ranges.
fn resolve_position(
    pos: isize,
    axis: usize,
    len: usize,
    inclusive_end: bool,
) -> Result<usize, NpyFileError> {
    let resolved = if pos < 0 {
        len.checked_sub(pos.unsigned_abs()).ok_or_else(|| {
            invalid(format!(
                "position {} is out of range for axis {} with length {}",
                pos, axis, len
            ))
        })?
    } else {
        pos as usize
    };
    let bound = if inclusive_end { len + 1 } else { len };
    if resolved < bound {
        Ok(resolved)
    } else {
        Err(NpyFileError::IndexOutOfRange {
            axis: Some(axis),
            index: resolved,
            len,
        })
    }
}

impl Selection {
    /// Resolves one slice argument per axis of `shape`.
    ///
    /// Negative positions count from the end of the axis. A negative step
    /// walks the range `start..end` backwards, as in `ndarray`.
    pub fn resolve(info: &[SliceInfoElem], shape: &[usize]) -> Result<Self, NpyFileError> {
        if info.len() != shape.len() {
            return Err(NpyFileError::DimensionMismatch {
                expected: shape.len(),
                found: info.len(),
            });
        }
        let mut indices = Vec::with_capacity(shape.len());
        let mut collapsed = Vec::with_capacity(shape.len());
        for (axis, (elem, &len)) in info.iter().zip(shape).enumerate() {
            match *elem {
                SliceInfoElem::Index(index) => {
                    indices.push(vec![resolve_position(index, axis, len, false)?]);
                    collapsed.push(true);
                }
                SliceInfoElem::Slice { start, end, step } => {
                    let start = resolve_position(start, axis, len, true)?;
                    let end = match end {
                        Some(end) => resolve_position(end, axis, len, true)?,
                        None => len,
                    };
                    if start > end {
                        return Err(invalid(format!(
                            "start {} is after end {} on axis {}",
                            start, end, axis
                        )));
                    }
                    let range = start..end;
                    let picked: Vec<usize> = match step {
                        0 => return Err(invalid(format!("zero step on axis {}", axis))),
                        s if s > 0 => range.step_by(s as usize).collect(),
                        s => range.rev().step_by(s.unsigned_abs()).collect(),
                    };
                    indices.push(picked);
                    collapsed.push(false);
                }
                SliceInfoElem::NewAxis => {
                    return Err(invalid(format!("new axis at position {}", axis)));
                }
            }
        }
        Ok(Selection { indices, collapsed })
    }

    /// Selects the sub-array at `index` along `axis`, keeping every other
    /// axis whole.
    pub fn take(shape: &[usize], axis: usize, index: usize) -> Result<Self, NpyFileError> {
        if axis >= shape.len() {
            return Err(invalid(format!(
                "axis {} is out of range for an array of rank {}",
                axis,
                shape.len()
            )));
        }
        if index >= shape[axis] {
            return Err(NpyFileError::IndexOutOfRange {
                axis: Some(axis),
                index,
                len: shape[axis],
            });
        }
        let indices = shape
            .iter()
            .enumerate()
            .map(|(ax, &len)| if ax == axis { vec![index] } else { (0..len).collect() })
            .collect();
        let collapsed = (0..shape.len()).map(|ax| ax == axis).collect();
        Ok(Selection { indices, collapsed })
    }

    /// Shape of the selected data, without the collapsed axes.
    pub fn shape(&self) -> Vec<usize> {
        self.indices
            .iter()
            .zip(&self.collapsed)
            .filter(|(_, collapsed)| !**collapsed)
            .map(|(indices, _)| indices.len())
            .collect()
    }

    /// Number of selected samples.
    pub fn len(&self) -> usize {
        self.indices.iter().map(Vec::len).product()
    }

    /// Calls `f` with the position in the result and the file coordinates of
    /// every selected sample, last axis fastest.
    pub fn for_each_coord<F>(&self, mut f: F) -> Result<(), NpyFileError>
    where
        F: FnMut(usize, &[usize]) -> Result<(), NpyFileError>,
    {
        if self.indices.iter().any(Vec::is_empty) {
            return Ok(());
        }
        let ndim = self.indices.len();
        let mut pos = vec![0; ndim];
        let mut coords: Vec<usize> = self.indices.iter().map(|axis| axis[0]).collect();
        let mut n = 0;
        loop {
            f(n, &coords)?;
            n += 1;
            // Advance the odometer.
            let mut axis = ndim;
            loop {
                if axis == 0 {
                    return Ok(());
                }
                axis -= 1;
                pos[axis] += 1;
                if pos[axis] < self.indices[axis].len() {
                    coords[axis] = self.indices[axis][pos[axis]];
                    break;
                }
                pos[axis] = 0;
                coords[axis] = self.indices[axis][0];
            }
        }
    }
}
