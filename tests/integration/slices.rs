//! Range reads and writes, checked against `ndarray` slicing of the whole
//! array.

use crate::{init_logging, Backend, Sample};
use ndarray::{array, s, ArrayD, Dimension, IxDyn, ShapeBuilder, SliceInfoElem};
use npy_file::{BufferedNpyFile, CreateOptions, MappedNpyFile, NpyArray, NpyFileError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

fn random_position<R: Rng>(rng: &mut R, pos: usize, len: usize) -> isize {
    // Positions before the end can also be written from the end.
    if pos < len && rng.gen_bool(0.5) {
        pos as isize - len as isize
    } else {
        pos as isize
    }
}

fn random_elem<R: Rng>(rng: &mut R, len: usize) -> SliceInfoElem {
    if rng.gen_bool(0.25) {
        let index = rng.gen_range(0..len);
        return SliceInfoElem::Index(random_position(rng, index, len));
    }
    let start = rng.gen_range(0..=len);
    let end = rng.gen_range(start..=len);
    let mut step = rng.gen_range(1..=3);
    if rng.gen_bool(0.5) {
        step = -step;
    }
    SliceInfoElem::Slice {
        start: random_position(rng, start, len),
        end: if end == len && rng.gen_bool(0.5) {
            None
        } else {
            Some(random_position(rng, end, len))
        },
        step,
    }
}

fn random_shape<R: Rng>(rng: &mut R) -> Vec<usize> {
    let ndim = rng.gen_range(1..=6);
    // Keep high-rank arrays small.
    let max_len = if ndim > 4 { 3 } else { 5 };
    (0..ndim).map(|_| rng.gen_range(1..=max_len)).collect()
}

fn random_reads<B: Backend<Elem = i32>>(fortran_order: bool, seed: u64) {
    init_logging();
    let mut rng = StdRng::seed_from_u64(seed);
    let dir = tempdir().unwrap();
    for round in 0..20 {
        let path = dir.path().join(format!("slices{}.npy", round));
        let shape = random_shape(&mut rng);
        let len: usize = shape.iter().product();
        let full = ArrayD::from_shape_vec(
            IxDyn(&shape),
            (0..len).map(i32::from_index).collect(),
        )
        .unwrap();

        let options = CreateOptions::default().fortran_order(fortran_order);
        let mut file = B::create_at(&path, &shape, options).unwrap();
        file.write_array(&full).unwrap();
        // The oracle agrees with pointwise reads.
        for (coords, &value) in full.indexed_iter() {
            assert_eq!(file.get(coords.slice()).unwrap(), value, "{}", B::NAME);
        }

        for _ in 0..10 {
            let info: Vec<SliceInfoElem> =
                shape.iter().map(|&len| random_elem(&mut rng, len)).collect();
            let expected = full.slice(&info[..]).to_owned();
            let found = file.read_slice(&info).unwrap();
            assert_eq!(found, expected, "{} {:?} {:?}", B::NAME, shape, info);
        }
        file.close().unwrap();
    }
}

#[test]
fn random_slices_match_ndarray() {
    random_reads::<BufferedNpyFile<i32>>(false, 11);
    random_reads::<BufferedNpyFile<i32>>(true, 12);
    random_reads::<MappedNpyFile<i32>>(false, 13);
    random_reads::<MappedNpyFile<i32>>(true, 14);
}

fn random_writes<B: Backend<Elem = f64>>(fortran_order: bool, seed: u64) {
    init_logging();
    let mut rng = StdRng::seed_from_u64(seed);
    let dir = tempdir().unwrap();
    for round in 0..20 {
        let path = dir.path().join(format!("writes{}.npy", round));
        let shape = random_shape(&mut rng);
        let options = CreateOptions::default().fortran_order(fortran_order);
        let mut file = B::create_at(&path, &shape, options).unwrap();
        let shape_f = IxDyn(&shape).set_f(fortran_order);
        let mut expected = ArrayD::<f64>::zeros(shape_f);

        for step in 0..5 {
            let info: Vec<SliceInfoElem> =
                shape.iter().map(|&len| random_elem(&mut rng, len)).collect();
            let mut target = expected.slice_mut(&info[..]);
            let data = target.map(|_| rng.gen::<f64>() + step as f64);
            target.assign(&data);
            file.write_slice(&info, &data).unwrap();
        }
        file.close().unwrap();

        let mut file = B::open_at(&path).unwrap();
        assert_eq!(file.read_array().unwrap(), expected, "{} {:?}", B::NAME, shape);
    }
}

#[test]
fn random_slice_writes_match_ndarray() {
    random_writes::<BufferedNpyFile<f64>>(false, 21);
    random_writes::<BufferedNpyFile<f64>>(true, 22);
    random_writes::<MappedNpyFile<f64>>(false, 23);
    random_writes::<MappedNpyFile<f64>>(true, 24);
}

fn fixed_slices<B: Backend<Elem = u8>>() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixed.npy");
    let mut file = B::create_at(&path, &[3, 4], CreateOptions::default()).unwrap();
    file.write_array(&array![[0u8, 1, 2, 3], [4, 5, 6, 7], [8, 9, 10, 11]])
        .unwrap();

    assert_eq!(
        file.read_slice(s![..2, -2..]).unwrap(),
        array![[2u8, 3], [6, 7]].into_dyn()
    );
    assert_eq!(file.read_slice(s![.., 1]).unwrap(), array![1u8, 5, 9].into_dyn());
    assert_eq!(
        file.read_slice(s![..;-1, ..;2]).unwrap(),
        array![[8u8, 10], [4, 6], [0, 2]].into_dyn()
    );
    assert_eq!(file.read_slice(s![-1, -1]).unwrap(), ndarray::arr0(11u8).into_dyn());
    assert_eq!(file.read_slice(s![1..1, ..]).unwrap().shape(), &[0, 4]);

    file.write_slice(s![1, ..;3], &array![40u8, 70]).unwrap();
    assert_eq!(file.take(0, 1).unwrap(), array![40u8, 5, 6, 70].into_dyn());

    assert!(matches!(
        file.write_slice(s![1, ..], &array![1u8, 2, 3]),
        Err(NpyFileError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        file.read_slice(s![3, ..]),
        Err(NpyFileError::IndexOutOfRange { axis: Some(0), .. })
    ));
    assert!(matches!(
        file.read_slice(s![..]),
        Err(NpyFileError::DimensionMismatch { expected: 2, found: 1 })
    ));
    assert!(matches!(
        file.read_slice(s![.., 3..1]),
        Err(NpyFileError::InvalidSlice(_))
    ));
    // Nothing above wrote.
    assert_eq!(
        file.read_array().unwrap(),
        array![[0u8, 1, 2, 3], [40, 5, 6, 70], [8, 9, 10, 11]].into_dyn()
    );
}

#[test]
fn fixed_slices_on_both_backends() {
    fixed_slices::<BufferedNpyFile<u8>>();
    fixed_slices::<MappedNpyFile<u8>>();
}
