//! End-to-end behavior of the public single-precision operations.

use approx::assert_relative_eq;
use slicesimd_f32 as f32ops;
use slicesimd_f64 as f64ops;

#[test]
fn concrete_scenarios() {
    let mut dst = [0.0f32; 4];
    f32ops::add(&mut dst, &[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0]);
    assert_eq!(dst, [5.0, 5.0, 5.0, 5.0]);

    let mut dst = [0.0f32; 3];
    f32ops::fma(&mut dst, &[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0], &[1.0, 1.0, 1.0]);
    assert_eq!(dst, [3.0, 5.0, 7.0]);

    let mut dst = [0.0f32; 5];
    f32ops::clamp(&mut dst, &[-5.0, 0.0, 5.0, 10.0, 15.0], 0.0, 10.0);
    assert_eq!(dst, [0.0, 0.0, 5.0, 10.0, 10.0]);

    assert_eq!(f32ops::distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
}

#[test]
fn dot_large_array() {
    let a: Vec<f32> = (1..=1000).map(|i| i as f32).collect();
    let b = vec![1.0f32; 1000];
    assert_relative_eq!(f32ops::dot(&a, &b), 500_500.0, max_relative = 1e-5);
}

#[test]
fn convolve_and_cumsum() {
    let signal = [1.0f32, 2.0, 3.0, 4.0, 5.0];
    let kernel = [1.0f32, 1.0, 1.0];
    let mut dst = [0.0f32; 3];
    f32ops::convolve_valid(&mut dst, &signal, &kernel);
    assert_eq!(dst, [6.0, 9.0, 12.0]);

    let mut prefix = [0.0f32; 5];
    f32ops::cumulative_sum(&mut prefix, &signal);
    assert_eq!(prefix, [1.0, 3.0, 6.0, 10.0, 15.0]);
}

#[test]
fn interleave_round_trip() {
    let a = [1.0f32, 3.0, 5.0];
    let b = [2.0f32, 4.0, 6.0];
    let mut both = [0.0f32; 6];
    f32ops::interleave2(&mut both, &a, &b);
    assert_eq!(both, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let mut ra = [0.0f32; 3];
    let mut rb = [0.0f32; 3];
    f32ops::deinterleave2(&mut ra, &mut rb, &both);
    assert_eq!(ra, a);
    assert_eq!(rb, b);
}

#[test]
#[should_panic(expected = "exceeds destination capacity")]
fn accumulate_add_out_of_bounds_panics() {
    let mut dst = [0.0f32; 4];
    f32ops::accumulate_add(&mut dst, &[1.0, 1.0], 3);
}

#[test]
fn dot_batch_rows() {
    let v = [1.0f32, 2.0];
    let r1 = [3.0f32, 4.0];
    let r2 = [5.0f32, 6.0];
    let rows: Vec<&[f32]> = vec![&r1, &r2];
    let mut out = [0.0f32; 2];
    f32ops::dot_batch(&mut out, &rows, &v);
    assert_eq!(out, [11.0, 17.0]);
}

#[test]
fn reductions_agree_with_f64_reference() {
    let a: Vec<f32> = (0..500).map(|i| (i as f32 * 0.731).sin().abs() + 0.1).collect();
    let wa: Vec<f64> = a.iter().map(|&v| v as f64).collect();

    assert_relative_eq!(f32ops::sum(&a) as f64, f64ops::sum(&wa), max_relative = 1e-4);
    assert_relative_eq!(f32ops::mean(&a) as f64, f64ops::mean(&wa), max_relative = 1e-4);
    assert_relative_eq!(
        f32ops::variance(&a) as f64,
        f64ops::variance(&wa),
        max_relative = 1e-3
    );
    assert_eq!(f32ops::min(&a) as f64, f64ops::min(&wa));
    assert_eq!(f32ops::max(&a) as f64, f64ops::max(&wa));
    assert_eq!(f32ops::min_index(&a), f64ops::min_index(&wa));
    assert_eq!(f32ops::max_index(&a), f64ops::max_index(&wa));
}
