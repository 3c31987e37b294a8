//! Files laid out byte for byte the way NumPy writes them.

use crate::{numpy_file, write_file, Backend};
use half::f16;
use ndarray::array;
use npy_file::codec::ibm;
use npy_file::header::Header;
use npy_file::{BufferedNpyFile, ByteOrder, CreateOptions, MappedNpyFile, NpyArray};
use py_literal::Value as PyValue;
use std::fs::{self, File};
use std::io::{Seek, SeekFrom};
use tempfile::tempdir;

/// `np.array([[0, 1, 2], [10, 11, 12]], dtype='>i4', order='F')`
fn big_endian_fortran_file() -> Vec<u8> {
    let mut data = Vec::new();
    for value in [0i32, 10, 1, 11, 2, 12] {
        data.extend_from_slice(&value.to_be_bytes());
    }
    numpy_file(
        "{'descr': '>i4', 'fortran_order': True, 'shape': (2, 3), }",
        &data,
    )
}

fn read_big_endian_fortran<B: Backend<Elem = i32>>() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("be.npy");
    let mut file = B::open_at(write_file(&path, &big_endian_fortran_file())).unwrap();

    let descriptor = file.descriptor();
    assert_eq!(descriptor.byte_order(), ByteOrder::Big);
    assert!(descriptor.fortran_order());
    assert_eq!(descriptor.header_len(), 128);

    assert_eq!(file.get(&[1, 2]).unwrap(), 12, "{}", B::NAME);
    assert_eq!(file.get(&[0, 1]).unwrap(), 1);
    assert_eq!(file.get_flat(1).unwrap(), 10);
    assert_eq!(
        file.read_array().unwrap(),
        array![[0i32, 1, 2], [10, 11, 12]].into_dyn()
    );

    // Writes keep the file's byte order.
    file.set(&[1, 0], -2).unwrap();
    file.close().unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[132..136], &(-2i32).to_be_bytes());
}

#[test]
fn big_endian_fortran_on_both_backends() {
    read_big_endian_fortran::<BufferedNpyFile<i32>>();
    read_big_endian_fortran::<MappedNpyFile<i32>>();
}

#[test]
fn half_floats() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("f2.npy");
    let values = [0.5f32, -1.25, 65504., 3.];
    let mut data = Vec::new();
    for value in values {
        data.extend_from_slice(&f16::from_f32(value).to_le_bytes());
    }
    let bytes = numpy_file(
        "{'descr': '<f2', 'fortran_order': False, 'shape': (4,), }",
        &data,
    );
    write_file(&path, &bytes);

    let mut file = BufferedNpyFile::<f16>::open(&path).unwrap();
    for (i, &value) in values.iter().enumerate() {
        assert_eq!(file.get(&[i]).unwrap().to_f32(), value);
    }
    file.close().unwrap();

    let mut file = MappedNpyFile::<f16>::open(&path).unwrap();
    file.set(&[3], f16::from_f32(-0.75)).unwrap();
    file.close().unwrap();
    assert_eq!(
        &fs::read(&path).unwrap()[134..136],
        &f16::from_f32(-0.75).to_le_bytes()
    );
}

#[test]
fn single_byte_descriptors() {
    let dir = tempdir().unwrap();

    let path = dir.path().join("b1.npy");
    let bytes = numpy_file(
        "{'descr': '|b1', 'fortran_order': False, 'shape': (2, 2), }",
        &[1, 0, 0, 1],
    );
    let mut file = MappedNpyFile::<bool>::open(write_file(&path, &bytes)).unwrap();
    assert_eq!(
        file.read_array().unwrap(),
        array![[true, false], [false, true]].into_dyn()
    );
    file.close().unwrap();

    let path = dir.path().join("i1.npy");
    let bytes = numpy_file(
        "{'descr': '|i1', 'fortran_order': False, 'shape': (3,), }",
        &[0xff, 0x7f, 0x80],
    );
    let mut file = BufferedNpyFile::<i8>::open(write_file(&path, &bytes)).unwrap();
    assert_eq!(file.read_array().unwrap(), array![-1i8, 127, -128].into_dyn());
}

/// IBM floats carried in a big-endian `u4` array, as converted seismic
/// traces often are.
#[test]
fn ibm_floats_in_u4_array() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ibm.npy");
    let words = [0x4110_0000u32, 0xc276_a000, 0];
    let mut data = Vec::new();
    for word in words {
        data.extend_from_slice(&word.to_be_bytes());
    }
    let bytes = numpy_file(
        "{'descr': '>u4', 'fortran_order': False, 'shape': (3,), }",
        &data,
    );
    write_file(&path, &bytes);

    let mut file = MappedNpyFile::<u32>::open(&path).unwrap();
    let decoded: Vec<f32> = (0..3)
        .map(|i| ibm::ibm_to_ieee_f32(file.get(&[i]).unwrap()))
        .collect();
    assert_eq!(decoded, [1f32, -118.625, 0.]);
    file.set(&[2], ibm::ieee_to_ibm_f32(-1.)).unwrap();
    file.close().unwrap();

    // The data region can also be decoded in bulk.
    let mut raw = File::open(&path).unwrap();
    raw.seek(SeekFrom::Start(128)).unwrap();
    let mut out = [0f32; 3];
    ibm::read_ibm_f32_into(&mut raw, &mut out).unwrap();
    assert_eq!(out, [1f32, -118.625, -1.]);
}

#[test]
fn created_header_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.npy");
    let options = CreateOptions::default().fortran_order(true);
    let file = MappedNpyFile::<f64>::create(&path, &[2, 3], options).unwrap();
    drop(file);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x93NUMPY\x01\x00");
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    assert_eq!(10 + header_len, 128);
    assert_eq!(bytes[127], b'\n');
    assert!(bytes[10..127].is_ascii());
    assert_eq!(bytes.len(), 128 + 6 * 8);
    assert!(bytes[128..].iter().all(|&b| b == 0));

    let header = Header::from_reader(&bytes[..]).unwrap();
    assert_eq!(
        header,
        Header {
            type_descriptor: PyValue::String("<f8".into()),
            fortran_order: true,
            shape: vec![2, 3],
        }
    );

    let options = CreateOptions::default().byte_order(ByteOrder::Big);
    BufferedNpyFile::<u16>::create(&path, &[7], options).unwrap();
    let header = Header::from_reader(File::open(&path).unwrap()).unwrap();
    assert_eq!(header.type_descriptor, PyValue::String(">u2".into()));
    assert!(!header.fortran_order);
    assert_eq!(header.shape, vec![7]);
}
