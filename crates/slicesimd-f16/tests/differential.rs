//! Half-precision operations checked against the double-precision crate.
//!
//! Decoded binary16 values are exact in `f64`, so for single-operation
//! element-wise kernels the double-precision result rounded through `f32`
//! must narrow to the same bit pattern the `f16` kernel produced.
//! Reductions accumulate in different precisions and get a tolerance.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slicesimd_f16 as f16;
use slicesimd_f16::F16;
use slicesimd_f64 as f64ops;

fn random_halves(rng: &mut StdRng, n: usize) -> Vec<F16> {
    (0..n).map(|_| F16::from_f32(rng.gen_range(-100.0f32..100.0))).collect()
}

fn widen(a: &[F16]) -> Vec<f64> {
    a.iter().map(|v| v.to_f32() as f64).collect()
}

#[test]
fn elementwise_agrees_with_f64_reference() {
    let mut rng = StdRng::seed_from_u64(0xD1FF);
    let n = 257;
    let a = random_halves(&mut rng, n);
    let b = random_halves(&mut rng, n);
    let wa = widen(&a);
    let wb = widen(&b);

    let mut got = vec![F16::ZERO; n];
    let mut want = vec![0.0f64; n];

    f16::add(&mut got, &a, &b);
    f64ops::add(&mut want, &wa, &wb);
    for i in 0..n {
        // The f64 sum of two decoded halves is exact, so narrowing it
        // through f32 reproduces the f16 kernel bit for bit.
        assert_eq!(got[i], F16::from_f32(want[i] as f32), "add at {i}");
    }

    f16::sub(&mut got, &a, &b);
    f64ops::sub(&mut want, &wa, &wb);
    for i in 0..n {
        assert_eq!(got[i], F16::from_f32(want[i] as f32), "sub at {i}");
    }

    f16::mul(&mut got, &a, &b);
    f64ops::mul(&mut want, &wa, &wb);
    for i in 0..n {
        // Products of 11-bit significands fit exactly in f64 as well.
        assert_eq!(got[i], F16::from_f32(want[i] as f32), "mul at {i}");
    }
}

#[test]
fn reductions_agree_with_f64_reference() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for n in [1usize, 9, 100, 1000] {
        // Positive values so the sums cannot cancel; relative tolerances
        // would be meaningless around a near-zero total.
        let a: Vec<F16> = (0..n)
            .map(|_| F16::from_f32(rng.gen_range(0.5f32..100.0)))
            .collect();
        let b: Vec<F16> = (0..n)
            .map(|_| F16::from_f32(rng.gen_range(0.5f32..100.0)))
            .collect();
        let wa = widen(&a);
        let wb = widen(&b);

        assert_relative_eq!(
            f16::sum(&a) as f64,
            f64ops::sum(&wa),
            max_relative = 1e-3,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            f16::dot(&a, &b) as f64,
            f64ops::dot(&wa, &wb),
            max_relative = 1e-3,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            f16::distance(&a, &b) as f64,
            f64ops::distance(&wa, &wb),
            max_relative = 1e-3,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            f16::mean(&a) as f64,
            f64ops::mean(&wa),
            max_relative = 1e-3,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            f16::variance(&a) as f64,
            f64ops::variance(&wa),
            max_relative = 1e-2,
            epsilon = 1e-2
        );

        // Extrema are order statistics, not accumulations: exact.
        assert_eq!(f16::min(&a).to_f32() as f64, f64ops::min(&wa));
        assert_eq!(f16::max(&a).to_f32() as f64, f64ops::max(&wa));
        assert_eq!(f16::min_index(&a), f64ops::min_index(&wa));
        assert_eq!(f16::max_index(&a), f64ops::max_index(&wa));
    }
}
