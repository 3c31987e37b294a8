//! Random-access storage of N-dimensional arrays in [`.npy`] files.
//!
//! Arrays are read and written in place, sample by sample or by range,
//! without loading the whole file. Two interchangeable backends implement
//! the [`NpyArray`] trait:
//!
//! * [`BufferedNpyFile`] keeps a bounded window of samples in memory and
//!   reads and writes the file with ordinary I/O.
//! * [`MappedNpyFile`] maps the whole file and accesses samples in place.
//!
//! Both handle files in either byte order and in C or Fortran order.
//! Coordinates are always given in logical order.
//!
//! ```no_run
//! use ndarray::{array, s};
//! use npy_file::{CreateOptions, MappedNpyFile, NpyArray};
//!
//! let options = CreateOptions::default().fortran_order(true);
//! let mut file = MappedNpyFile::<f64>::create("data.npy", &[2, 3], options)?;
//! file.write_array(&array![[1., 2., 3.], [4., 5., 6.]])?;
//! assert_eq!(file.get(&[1, 0])?, 4.);
//! assert_eq!(file.read_slice(s![.., 2])?, array![3f64, 6.].into_dyn());
//! file.close()?;
//! # Ok::<(), npy_file::NpyFileError>(())
//! ```
//!
//! Supported element types are `bool`, the fixed-size integers, and
//! `half::f16`, `f32` and `f64` (see [`Element`]). The [`codec::ibm`] module
//! converts IBM System/360 floats, found in legacy seismic and mainframe
//! data, to and from IEEE floats.
//!
//! # Limitations
//!
//! * Only version 1.0 of the format is read and written. Versions 2.0 and
//!   3.0 fail with [`NpyFileError::NotImplemented`].
//!
//! * Structured and string `descr`s are not supported, nor are shapes with
//!   no axes or with an empty axis.
//!
//! * A handle assumes exclusive use of its file; nothing coordinates access
//!   between threads or processes.
//!
//! [`.npy`]: https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html

mod array;
mod buffered;
pub mod codec;
mod descriptor;
mod dtype;
mod elements;
mod error;
mod file;
pub mod header;
mod mapped;
mod ravel;
mod slice;

pub use crate::array::NpyArray;
pub use crate::buffered::{BufferedNpyFile, BufferedOptions, DEFAULT_WINDOW_LEN};
pub use crate::codec::ByteOrder;
pub use crate::descriptor::ArrayFileDescriptor;
pub use crate::dtype::{TypeDescriptor, TypeKind};
pub use crate::elements::{Element, ReadDataError};
pub use crate::error::NpyFileError;
pub use crate::file::{read_descriptor, read_header, CreateOptions};
pub use crate::mapped::{MappedNpyFile, MappedRegion};
pub use crate::ravel::{ravel, unravel, Layout, Order};
