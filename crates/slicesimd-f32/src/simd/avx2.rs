//! AVX2+FMA backend.
//!
//! Eight f32 lanes per 256-bit operation. Element-wise kernels are
//! bit-identical to the scalar path because each lane performs the same
//! correctly-rounded operation; only the reductions associate differently.
//!
//! All kernels require slice lengths that are exact multiples of
//! [`LANES`]; the dispatch layer guarantees this.

use super::Kernels;
use slicesimd_cpu::{capabilities, CapabilitySet, Error, Result};
use std::arch::x86_64::*;

/// f32 elements per 256-bit operation.
const LANES: usize = 8;

pub(crate) static AVX2: Avx2Kernels = Avx2Kernels;

/// AVX2+FMA backend for x86-64.
pub(crate) struct Avx2Kernels;

impl Avx2Kernels {
    const REQUIRED: CapabilitySet = CapabilitySet::AVX2.union(CapabilitySet::FMA);

    /// True when the capability flags allow this backend. Routing re-checks
    /// this on every operation.
    pub(crate) fn is_available() -> bool {
        capabilities().contains(Self::REQUIRED)
    }

    /// Fallible constructor for callers that want an explicit backend
    /// handle rather than automatic routing.
    pub(crate) fn try_new() -> Result<Avx2Kernels> {
        if Self::is_available() {
            Ok(Avx2Kernels)
        } else {
            Err(Error::FeatureUnavailable("AVX2+FMA".to_string()))
        }
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum(v: __m256) -> f32 {
    let lanes = std::mem::transmute::<__m256, [f32; 8]>(v);
    (lanes[0] + lanes[1] + lanes[2] + lanes[3]) + (lanes[4] + lanes[5] + lanes[6] + lanes[7])
}

macro_rules! binary32 {
    ($name:ident, $op:ident) => {
        #[target_feature(enable = "avx2", enable = "fma")]
        unsafe fn $name(dst: &mut [f32], a: &[f32], b: &[f32]) {
            for i in (0..dst.len()).step_by(LANES) {
                let va = _mm256_loadu_ps(a.as_ptr().add(i));
                let vb = _mm256_loadu_ps(b.as_ptr().add(i));
                _mm256_storeu_ps(dst.as_mut_ptr().add(i), $op(va, vb));
            }
        }
    };
}

binary32!(add8, _mm256_add_ps);
binary32!(sub8, _mm256_sub_ps);
binary32!(mul8, _mm256_mul_ps);
binary32!(div8, _mm256_div_ps);

#[target_feature(enable = "avx2")]
unsafe fn scale8(dst: &mut [f32], a: &[f32], s: f32) {
    let vs = _mm256_set1_ps(s);
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_mul_ps(_mm256_loadu_ps(a.as_ptr().add(i)), vs),
        );
    }
}

#[target_feature(enable = "avx2")]
unsafe fn add_scalar8(dst: &mut [f32], a: &[f32], s: f32) {
    let vs = _mm256_set1_ps(s);
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_add_ps(_mm256_loadu_ps(a.as_ptr().add(i)), vs),
        );
    }
}

#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn fma8(dst: &mut [f32], a: &[f32], b: &[f32], c: &[f32]) {
    for i in (0..dst.len()).step_by(LANES) {
        let va = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb = _mm256_loadu_ps(b.as_ptr().add(i));
        let vc = _mm256_loadu_ps(c.as_ptr().add(i));
        _mm256_storeu_ps(dst.as_mut_ptr().add(i), _mm256_fmadd_ps(va, vb, vc));
    }
}

#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn axpy8(dst: &mut [f32], alpha: f32, s: &[f32]) {
    let va = _mm256_set1_ps(alpha);
    for i in (0..dst.len()).step_by(LANES) {
        let vs = _mm256_loadu_ps(s.as_ptr().add(i));
        let vd = _mm256_loadu_ps(dst.as_ptr().add(i));
        _mm256_storeu_ps(dst.as_mut_ptr().add(i), _mm256_fmadd_ps(va, vs, vd));
    }
}

#[target_feature(enable = "avx2")]
unsafe fn accumulate_add8(dst: &mut [f32], src: &[f32]) {
    for i in (0..dst.len()).step_by(LANES) {
        let vs = _mm256_loadu_ps(src.as_ptr().add(i));
        let vd = _mm256_loadu_ps(dst.as_ptr().add(i));
        _mm256_storeu_ps(dst.as_mut_ptr().add(i), _mm256_add_ps(vd, vs));
    }
}

#[target_feature(enable = "avx2")]
unsafe fn abs8(dst: &mut [f32], a: &[f32]) {
    let mask = _mm256_castsi256_ps(_mm256_set1_epi32(0x7FFF_FFFF));
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_and_ps(_mm256_loadu_ps(a.as_ptr().add(i)), mask),
        );
    }
}

#[target_feature(enable = "avx2")]
unsafe fn neg8(dst: &mut [f32], a: &[f32]) {
    let mask = _mm256_castsi256_ps(_mm256_set1_epi32(0x8000_0000u32 as i32));
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_xor_ps(_mm256_loadu_ps(a.as_ptr().add(i)), mask),
        );
    }
}

#[target_feature(enable = "avx2")]
unsafe fn relu8(dst: &mut [f32], src: &[f32]) {
    // vmaxps returns the second operand when the first is NaN, so NaN
    // lanes become 0.0 exactly like the scalar `x > 0` test.
    let zero = _mm256_setzero_ps();
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_max_ps(_mm256_loadu_ps(src.as_ptr().add(i)), zero),
        );
    }
}

#[target_feature(enable = "avx2")]
unsafe fn sqrt8(dst: &mut [f32], a: &[f32]) {
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_sqrt_ps(_mm256_loadu_ps(a.as_ptr().add(i))),
        );
    }
}

#[target_feature(enable = "avx2")]
unsafe fn recip8(dst: &mut [f32], a: &[f32]) {
    // Exact division rather than vrcpps: the approximation is only good to
    // ~12 bits and would diverge from the scalar path.
    let ones = _mm256_set1_ps(1.0);
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_div_ps(ones, _mm256_loadu_ps(a.as_ptr().add(i))),
        );
    }
}

#[target_feature(enable = "avx2")]
unsafe fn clamp8(dst: &mut [f32], a: &[f32], lo: f32, hi: f32) {
    let vlo = _mm256_set1_ps(lo);
    let vhi = _mm256_set1_ps(hi);
    for i in (0..dst.len()).step_by(LANES) {
        let v = _mm256_loadu_ps(a.as_ptr().add(i));
        _mm256_storeu_ps(
            dst.as_mut_ptr().add(i),
            _mm256_min_ps(_mm256_max_ps(v, vlo), vhi),
        );
    }
}

#[target_feature(enable = "avx2")]
unsafe fn sum8(a: &[f32]) -> f32 {
    let mut acc = _mm256_setzero_ps();
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_add_ps(acc, _mm256_loadu_ps(a.as_ptr().add(i)));
    }
    hsum(acc)
}

#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn dot8(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = _mm256_setzero_ps();
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_fmadd_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
            acc,
        );
    }
    hsum(acc)
}

// vminps/vmaxps return their second operand when either operand is NaN.
// Seeding the accumulator with the reduction identity and keeping it in the
// second operand slot makes a NaN input lane leave the running extremum
// untouched, the same NaN-ignoring rule as the scalar kernels.

#[target_feature(enable = "avx2")]
unsafe fn min8(a: &[f32]) -> f32 {
    let mut acc = _mm256_set1_ps(f32::INFINITY);
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_min_ps(_mm256_loadu_ps(a.as_ptr().add(i)), acc);
    }
    let lanes = std::mem::transmute::<__m256, [f32; 8]>(acc);
    let mut m = f32::INFINITY;
    for &v in &lanes {
        if v < m {
            m = v;
        }
    }
    m
}

#[target_feature(enable = "avx2")]
unsafe fn max8(a: &[f32]) -> f32 {
    let mut acc = _mm256_set1_ps(f32::NEG_INFINITY);
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_max_ps(_mm256_loadu_ps(a.as_ptr().add(i)), acc);
    }
    let lanes = std::mem::transmute::<__m256, [f32; 8]>(acc);
    let mut m = f32::NEG_INFINITY;
    for &v in &lanes {
        if v > m {
            m = v;
        }
    }
    m
}

// Safety for every call below: `active()` only hands out this backend when
// the capability flags include AVX2 and FMA, and the dispatch layer only
// passes lengths that are multiples of LANES.
impl Kernels for Avx2Kernels {
    fn name(&self) -> &'static str {
        "avx2"
    }

    fn width(&self) -> usize {
        LANES
    }

    fn add(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { add8(dst, a, b) }
    }

    fn sub(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { sub8(dst, a, b) }
    }

    fn mul(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { mul8(dst, a, b) }
    }

    fn div(&self, dst: &mut [f32], a: &[f32], b: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { div8(dst, a, b) }
    }

    fn scale(&self, dst: &mut [f32], a: &[f32], s: f32) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { scale8(dst, a, s) }
    }

    fn add_scalar(&self, dst: &mut [f32], a: &[f32], s: f32) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { add_scalar8(dst, a, s) }
    }

    fn fma(&self, dst: &mut [f32], a: &[f32], b: &[f32], c: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { fma8(dst, a, b, c) }
    }

    fn axpy(&self, dst: &mut [f32], alpha: f32, s: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { axpy8(dst, alpha, s) }
    }

    fn accumulate_add(&self, dst: &mut [f32], src: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { accumulate_add8(dst, src) }
    }

    fn abs(&self, dst: &mut [f32], a: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { abs8(dst, a) }
    }

    fn neg(&self, dst: &mut [f32], a: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { neg8(dst, a) }
    }

    fn relu(&self, dst: &mut [f32], src: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { relu8(dst, src) }
    }

    fn sqrt(&self, dst: &mut [f32], a: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { sqrt8(dst, a) }
    }

    fn recip(&self, dst: &mut [f32], a: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { recip8(dst, a) }
    }

    fn clamp(&self, dst: &mut [f32], a: &[f32], lo: f32, hi: f32) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { clamp8(dst, a, lo, hi) }
    }

    fn sum(&self, a: &[f32]) -> f32 {
        debug_assert_eq!(a.len() % LANES, 0);
        unsafe { sum8(a) }
    }

    fn dot(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len() % LANES, 0);
        unsafe { dot8(a, b) }
    }

    fn min(&self, a: &[f32]) -> f32 {
        debug_assert!(!a.is_empty() && a.len() % LANES == 0);
        unsafe { min8(a) }
    }

    fn max(&self, a: &[f32]) -> f32 {
        debug_assert!(!a.is_empty() && a.len() % LANES == 0);
        unsafe { max8(a) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_matches_availability() {
        match Avx2Kernels::try_new() {
            Ok(k) => {
                assert!(Avx2Kernels::is_available());
                assert_eq!(k.width(), 8);
            }
            Err(e) => {
                assert!(!Avx2Kernels::is_available());
                assert!(e.to_string().contains("AVX2"));
            }
        }
    }
}
