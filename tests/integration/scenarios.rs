//! The C-order and Fortran-order grid scenarios, on both backends.

use crate::{init_logging, Backend};
use ndarray::{array, s};
use npy_file::{BufferedNpyFile, CreateOptions, MappedNpyFile, NpyArray};
use std::fs;
use tempfile::tempdir;

fn c_order_grid<B: Backend<Elem = f32>>() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("grid.npy");

    let mut file = B::create_at(&path, &[3, 4], CreateOptions::default()).unwrap();
    for i in 0..3 {
        for j in 0..4 {
            file.set(&[i, j], (i * 4 + j) as f32).unwrap();
        }
    }
    file.close().unwrap();

    let mut file = B::open_at(&path).unwrap();
    assert_eq!(file.get(&[2, 3]).unwrap(), 11., "{}", B::NAME);
    let expected = array![[0f32, 1., 2., 3.], [4., 5., 6., 7.], [8., 9., 10., 11.]].into_dyn();
    assert_eq!(file.read_slice(s![.., ..]).unwrap(), expected);
    assert_eq!(file.read_array().unwrap(), expected);
    assert_eq!(file.take(0, 1).unwrap(), array![4f32, 5., 6., 7.].into_dyn());
    assert_eq!(file.take(1, 2).unwrap(), array![2f32, 6., 10.].into_dyn());
    for k in 0..12 {
        assert_eq!(file.get_flat(k).unwrap(), k as f32);
    }
    file.close().unwrap();
}

#[test]
fn c_order_grid_scenario() {
    c_order_grid::<BufferedNpyFile<f32>>();
    c_order_grid::<MappedNpyFile<f32>>();
}

fn fortran_grid<B: Backend<Elem = f32>>() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("grid.npy");

    let options = CreateOptions::default().fortran_order(true);
    let mut file = B::create_at(&path, &[3, 4], options).unwrap();
    assert!(file.descriptor().fortran_order());
    for i in 0..3 {
        for j in 0..4 {
            file.set(&[i, j], (i + 3 * j) as f32).unwrap();
        }
    }
    file.close().unwrap();

    let mut file = B::open_at(&path).unwrap();
    for k in 0..12 {
        assert_eq!(file.get_flat(k).unwrap(), k as f32, "{}", B::NAME);
    }
    let expected = array![[0f32, 3., 6., 9.], [1., 4., 7., 10.], [2., 5., 8., 11.]].into_dyn();
    assert_eq!(file.read_array().unwrap(), expected);
    assert_eq!(file.read_slice(s![.., ..]).unwrap(), expected);
    file.close().unwrap();

    // The data region holds 0..12 in storage order.
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 128 + 12 * 4);
    for (k, chunk) in bytes[128..].chunks_exact(4).enumerate() {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        assert_eq!(value, k as f32);
    }
}

#[test]
fn fortran_grid_scenario() {
    fortran_grid::<BufferedNpyFile<f32>>();
    fortran_grid::<MappedNpyFile<f32>>();
}

/// Writes through one backend and reads through the other.
#[test]
fn backends_share_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shared.npy");
    let data = array![[[1i32, -2], [3, -4]], [[5, -6], [7, -8]]];

    let mut file = BufferedNpyFile::<i32>::create(&path, &[2, 2, 2], CreateOptions::default())
        .unwrap();
    file.write_array(&data).unwrap();
    file.close().unwrap();

    let mut file = MappedNpyFile::<i32>::open(&path).unwrap();
    assert_eq!(file.read_array().unwrap(), data.clone().into_dyn());
    file.set(&[1, 0, 1], 100).unwrap();
    file.close().unwrap();

    let mut file = BufferedNpyFile::<i32>::open(&path).unwrap();
    assert_eq!(file.get(&[1, 0, 1]).unwrap(), 100);
    assert_eq!(file.get(&[0, 1, 1]).unwrap(), -4);
}

/// Writes made before a drop reach the file.
#[test]
fn drop_flushes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dropped.npy");
    {
        let mut file =
            BufferedNpyFile::<u64>::create(&path, &[4], CreateOptions::default()).unwrap();
        file.set_flat(3, u64::MAX).unwrap();
    }
    {
        let mut file = MappedNpyFile::<u64>::open(&path).unwrap();
        assert_eq!(file.get_flat(3).unwrap(), u64::MAX);
        file.set_flat(0, 9).unwrap();
    }
    let mut file = BufferedNpyFile::<u64>::open(&path).unwrap();
    assert_eq!(file.read_array().unwrap(), array![9, 0, 0, u64::MAX].into_dyn());
}

/// Explicit flushes make writes visible to other handles.
#[test]
fn flush_publishes_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flushed.npy");
    let mut writer = BufferedNpyFile::<i16>::create(&path, &[6], CreateOptions::default())
        .unwrap();
    writer.write_run(1, &[10, 20, 30]).unwrap();
    writer.flush().unwrap();

    let mut reader = MappedNpyFile::<i16>::open(&path).unwrap();
    assert_eq!(reader.read_array().unwrap(), array![0i16, 10, 20, 30, 0, 0].into_dyn());
    reader.close().unwrap();
    writer.close().unwrap();
}
