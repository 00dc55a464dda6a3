//! Vector/scalar path equivalence around the vector-width boundary.
//!
//! Each operation runs twice at lengths straddling multiples of the 8-wide
//! vector width: once with whatever the host supports and once with the
//! capability flags forced empty (pure scalar). Element-wise operations
//! must agree bit for bit; reductions accumulate in a different order, so
//! they get a small tolerance. On hosts without AVX2+F16C the two runs are
//! both scalar and the comparison is trivially true.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slicesimd_cpu::{set_capabilities, CapabilitySet};
use slicesimd_f16 as f16;
use slicesimd_f16::F16;
use std::sync::{Mutex, MutexGuard};

/// Lengths straddling 0, w, and 2w for w = 8.
const LENGTHS: &[usize] = &[0, 1, 7, 8, 9, 15, 16, 17];

static CAPS_LOCK: Mutex<()> = Mutex::new(());

/// Forces the scalar path for its lifetime; restores the previous flags on
/// drop even if the test panics. Holds a process-wide lock so concurrent
/// tests cannot interleave their flag mutations.
struct ScalarOnly {
    prev: CapabilitySet,
    _lock: MutexGuard<'static, ()>,
}

impl ScalarOnly {
    fn force() -> ScalarOnly {
        let lock = CAPS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        ScalarOnly {
            prev: set_capabilities(CapabilitySet::empty()),
            _lock: lock,
        }
    }
}

impl Drop for ScalarOnly {
    fn drop(&mut self) {
        set_capabilities(self.prev);
    }
}

fn random_halves(rng: &mut StdRng, n: usize) -> Vec<F16> {
    (0..n).map(|_| F16::from_f32(rng.gen_range(-8.0f32..8.0))).collect()
}

#[test]
fn elementwise_paths_are_bit_identical() {
    let mut rng = StdRng::seed_from_u64(0x516D);
    for &n in LENGTHS {
        let a = random_halves(&mut rng, n);
        let b = random_halves(&mut rng, n);
        let c = random_halves(&mut rng, n);
        let src32: Vec<f32> = a.iter().map(|v| v.to_f32()).collect();

        let binary: &[fn(&mut [F16], &[F16], &[F16])] =
            &[f16::add, f16::sub, f16::mul, f16::div];
        for op in binary {
            let mut fast = vec![F16::ZERO; n];
            op(&mut fast, &a, &b);
            let mut slow = vec![F16::ZERO; n];
            {
                let _scalar = ScalarOnly::force();
                op(&mut slow, &a, &b);
            }
            assert_eq!(fast, slow, "binary op mismatch at n={n}");
        }

        let unary: &[fn(&mut [F16], &[F16])] =
            &[f16::abs, f16::neg, f16::sqrt, f16::recip, f16::relu];
        for op in unary {
            let mut fast = vec![F16::ZERO; n];
            op(&mut fast, &a);
            let mut slow = vec![F16::ZERO; n];
            {
                let _scalar = ScalarOnly::force();
                op(&mut slow, &a);
            }
            assert_eq!(fast, slow, "unary op mismatch at n={n}");
        }

        // Ops with extra parameters.
        let mut fast = vec![F16::ZERO; n];
        let mut slow = vec![F16::ZERO; n];

        f16::fma(&mut fast, &a, &b, &c);
        {
            let _scalar = ScalarOnly::force();
            f16::fma(&mut slow, &a, &b, &c);
        }
        assert_eq!(fast, slow, "fma mismatch at n={n}");

        f16::scale(&mut fast, &a, 1.5);
        {
            let _scalar = ScalarOnly::force();
            f16::scale(&mut slow, &a, 1.5);
        }
        assert_eq!(fast, slow, "scale mismatch at n={n}");

        f16::add_scalar(&mut fast, &a, -0.25);
        {
            let _scalar = ScalarOnly::force();
            f16::add_scalar(&mut slow, &a, -0.25);
        }
        assert_eq!(fast, slow, "add_scalar mismatch at n={n}");

        f16::clamp(&mut fast, &a, -1.0, 1.0);
        {
            let _scalar = ScalarOnly::force();
            f16::clamp(&mut slow, &a, -1.0, 1.0);
        }
        assert_eq!(fast, slow, "clamp mismatch at n={n}");

        let mut fast = b.clone();
        f16::add_scaled(&mut fast, 0.5, &a);
        let mut slow = b.clone();
        {
            let _scalar = ScalarOnly::force();
            f16::add_scaled(&mut slow, 0.5, &a);
        }
        assert_eq!(fast, slow, "add_scaled mismatch at n={n}");

        let mut fast = b.clone();
        f16::accumulate_add(&mut fast, &a, 0);
        let mut slow = b.clone();
        {
            let _scalar = ScalarOnly::force();
            f16::accumulate_add(&mut slow, &a, 0);
        }
        assert_eq!(fast, slow, "accumulate_add mismatch at n={n}");

        let mut fast32 = vec![0.0f32; n];
        f16::to_f32_slice(&mut fast32, &a);
        let mut slow32 = vec![0.0f32; n];
        {
            let _scalar = ScalarOnly::force();
            f16::to_f32_slice(&mut slow32, &a);
        }
        assert_eq!(fast32, slow32, "to_f32_slice mismatch at n={n}");

        let mut fast = vec![F16::ZERO; n];
        f16::from_f32_slice(&mut fast, &src32);
        let mut slow = vec![F16::ZERO; n];
        {
            let _scalar = ScalarOnly::force();
            f16::from_f32_slice(&mut slow, &src32);
        }
        assert_eq!(fast, slow, "from_f32_slice mismatch at n={n}");
    }
}

#[test]
fn reduction_paths_agree_within_tolerance() {
    let mut rng = StdRng::seed_from_u64(0xACC);
    for &n in LENGTHS {
        let a = random_halves(&mut rng, n);
        let b = random_halves(&mut rng, n);

        let fast_sum = f16::sum(&a);
        let fast_dot = f16::dot(&a, &b);
        let (slow_sum, slow_dot) = {
            let _scalar = ScalarOnly::force();
            (f16::sum(&a), f16::dot(&a, &b))
        };
        assert_relative_eq!(fast_sum, slow_sum, max_relative = 1e-4, epsilon = 1e-4);
        assert_relative_eq!(fast_dot, slow_dot, max_relative = 1e-4, epsilon = 1e-4);

        // Extrema pick actual elements, so they are exact.
        let fast_min = f16::min(&a);
        let fast_max = f16::max(&a);
        let (slow_min, slow_max) = {
            let _scalar = ScalarOnly::force();
            (f16::min(&a), f16::max(&a))
        };
        assert_eq!(fast_min, slow_min, "min mismatch at n={n}");
        assert_eq!(fast_max, slow_max, "max mismatch at n={n}");
    }
}

#[test]
fn extrema_ignore_nan_on_both_paths() {
    // A NaN in the vector prefix and one in the scalar tail; both routes
    // must skip them and agree on the numeric extrema.
    for &n in &[9usize, 16, 17] {
        let mut a = vec![F16::from_f32(5.0); n];
        a[0] = F16::NAN;
        a[n / 2] = F16::from_f32(-3.0);
        a[n - 1] = F16::NAN;

        let fast_min = f16::min(&a);
        let fast_max = f16::max(&a);
        let (slow_min, slow_max) = {
            let _scalar = ScalarOnly::force();
            (f16::min(&a), f16::max(&a))
        };
        assert_eq!(fast_min.to_f32(), -3.0, "min dropped a value at n={n}");
        assert_eq!(fast_max.to_f32(), 5.0, "max dropped a value at n={n}");
        assert_eq!(fast_min, slow_min, "min path divergence at n={n}");
        assert_eq!(fast_max, slow_max, "max path divergence at n={n}");
    }

    // All-NaN input collapses to the empty-input identities on both routes.
    let nans = vec![F16::NAN; 16];
    let fast = (f16::min(&nans), f16::max(&nans));
    let slow = {
        let _scalar = ScalarOnly::force();
        (f16::min(&nans), f16::max(&nans))
    };
    assert_eq!(fast, (F16::INFINITY, F16::NEG_INFINITY));
    assert_eq!(fast, slow);
}
