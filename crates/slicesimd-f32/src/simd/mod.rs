//! Kernel backends.
//!
//! Same strategy-trait arrangement as the half-precision crate: the
//! dispatch layer is platform-agnostic, hardware variants live behind the
//! [`Kernels`] trait, and every method has a scalar default body so a
//! backend only overrides what it accelerates.
//!
//! Vector methods are only ever invoked on slice lengths that are exact
//! multiples of [`Kernels::width`].

#[cfg(target_arch = "x86_64")]
mod avx2;

#[cfg(target_arch = "x86_64")]
pub(crate) use avx2::Avx2Kernels;

use crate::scalar;

pub(crate) trait Kernels: Send + Sync {
    /// Backend name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Elements processed per vector instruction; 1 means no acceleration.
    fn width(&self) -> usize;

    fn add(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        scalar::add(dst, a, b);
    }

    fn sub(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        scalar::sub(dst, a, b);
    }

    fn mul(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        scalar::mul(dst, a, b);
    }

    fn div(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        scalar::div(dst, a, b);
    }

    fn scale(&self, dst: &mut [f32], a: &[f32], s: f32) {
        scalar::scale(dst, a, s);
    }

    fn add_scalar(&self, dst: &mut [f32], a: &[f32], s: f32) {
        scalar::add_scalar(dst, a, s);
    }

    fn fma(&self, dst: &mut [f32], a: &[f32], b: &[f32], c: &[f32]) {
        scalar::fma(dst, a, b, c);
    }

    fn axpy(&self, dst: &mut [f32], alpha: f32, s: &[f32]) {
        scalar::axpy(dst, alpha, s);
    }

    fn accumulate_add(&self, dst: &mut [f32], src: &[f32]) {
        scalar::accumulate_add(dst, src);
    }

    fn abs(&self, dst: &mut [f32], a: &[f32]) {
        scalar::abs(dst, a);
    }

    fn neg(&self, dst: &mut [f32], a: &[f32]) {
        scalar::neg(dst, a);
    }

    fn relu(&self, dst: &mut [f32], src: &[f32]) {
        scalar::relu(dst, src);
    }

    fn sqrt(&self, dst: &mut [f32], a: &[f32]) {
        scalar::sqrt(dst, a);
    }

    fn recip(&self, dst: &mut [f32], a: &[f32]) {
        scalar::recip(dst, a);
    }

    fn clamp(&self, dst: &mut [f32], a: &[f32], lo: f32, hi: f32) {
        scalar::clamp(dst, a, lo, hi);
    }

    fn sum(&self, a: &[f32]) -> f32 {
        scalar::sum(a)
    }

    fn dot(&self, a: &[f32], b: &[f32]) -> f32 {
        scalar::dot(a, b)
    }

    /// `a` must be non-empty.
    fn min(&self, a: &[f32]) -> f32 {
        scalar::min(a)
    }

    /// `a` must be non-empty.
    fn max(&self, a: &[f32]) -> f32 {
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

/// The best backend the current capability flags allow. Re-reads the flags
/// on every call so test overrides reroute immediately.
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
pub(crate) fn aligned_len(n: usize, width: usize) -> usize {
    if n >= width {
        n - n % width
    } else {
        0
    }
}
