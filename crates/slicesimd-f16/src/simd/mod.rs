//! Kernel backends.
//!
//! The dispatch layer is platform-agnostic; hardware variants live behind
//! the [`Kernels`] trait, implemented once per target. Every trait method
//! has a scalar default body, so a backend only overrides what it
//! accelerates, and the scalar backend is just the defaults.
//!
//! Vector methods are only ever invoked on slice lengths that are exact
//! multiples of [`Kernels::width`]; the dispatch layer guarantees this and
//! backends `debug_assert!` it.

#[cfg(target_arch = "x86_64")]
mod avx2;

#[cfg(target_arch = "x86_64")]
pub(crate) use avx2::Avx2Kernels;

use crate::{scalar, F16};

pub(crate) trait Kernels: Send + Sync {
    /// Backend name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Elements processed per vector instruction; 1 means no acceleration.
    fn width(&self) -> usize;

    fn decode_slice(&self, dst: &mut [f32], src: &[F16]) {
        scalar::decode_slice(dst, src);
    }

    fn encode_slice(&self, dst: &mut [F16], src: &[f32]) {
        scalar::encode_slice(dst, src);
    }

    fn add(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        scalar::add(dst, a, b);
    }

    fn sub(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        scalar::sub(dst, a, b);
    }

    fn mul(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        scalar::mul(dst, a, b);
    }

    fn div(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        scalar::div(dst, a, b);
    }

    fn scale(&self, dst: &mut [F16], a: &[F16], s: f32) {
        scalar::scale(dst, a, s);
    }

    fn add_scalar(&self, dst: &mut [F16], a: &[F16], s: f32) {
        scalar::add_scalar(dst, a, s);
    }

    fn fma(&self, dst: &mut [F16], a: &[F16], b: &[F16], c: &[F16]) {
        scalar::fma(dst, a, b, c);
    }

    fn axpy(&self, dst: &mut [F16], alpha: f32, s: &[F16]) {
        scalar::axpy(dst, alpha, s);
    }

    fn accumulate_add(&self, dst: &mut [F16], src: &[F16]) {
        scalar::accumulate_add(dst, src);
    }

    fn abs(&self, dst: &mut [F16], a: &[F16]) {
        scalar::abs(dst, a);
    }

    fn neg(&self, dst: &mut [F16], a: &[F16]) {
        scalar::neg(dst, a);
    }

    fn relu(&self, dst: &mut [F16], src: &[F16]) {
        scalar::relu(dst, src);
    }

    fn sqrt(&self, dst: &mut [F16], a: &[F16]) {
        scalar::sqrt(dst, a);
    }

    fn recip(&self, dst: &mut [F16], a: &[F16]) {
        scalar::recip(dst, a);
    }

    fn clamp(&self, dst: &mut [F16], a: &[F16], lo: f32, hi: f32) {
        scalar::clamp(dst, a, lo, hi);
    }

    fn sum(&self, a: &[F16]) -> f32 {
        scalar::sum(a)
    }

    fn dot(&self, a: &[F16], b: &[F16]) -> f32 {
        scalar::dot(a, b)
    }

    /// `a` must be non-empty.
    fn min(&self, a: &[F16]) -> F16 {
        scalar::min(a)
    }

    /// `a` must be non-empty.
    fn max(&self, a: &[F16]) -> F16 {
        scalar::max(a)
    }
}

/// The portable backend: width 1, scalar defaults throughout.
pub(crate) struct ScalarKernels;

impl Kernels for ScalarKernels {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn width(&self) -> usize {
        1
    }
}

static SCALAR: ScalarKernels = ScalarKernels;

/// The best backend the current capability flags allow.
///
/// Re-reads the flags on every call so test overrides reroute immediately;
/// the check is a single atomic load.
pub(crate) fn active() -> &'static dyn Kernels {
    #[cfg(target_arch = "x86_64")]
    {
        if Avx2Kernels::is_available() {
            return &avx2::AVX2;
        }
    }
    &SCALAR
}

/// Largest multiple of `width` not exceeding `n`, or 0 when `n < width`.
/// The dispatch layer hands `[0, aligned)` to the vector backend and the
/// tail to the scalar path.
pub(crate) fn aligned_len(n: usize, width: usize) -> usize {
    if n >= width {
        n - n % width
    } else {
        0
    }
}
