//! AVX2+F16C backend.
//!
//! Halves are widened eight at a time with `vcvtph2ps`, computed on in
//! 256-bit f32 registers, and narrowed back with `vcvtps2ph` in
//! round-to-nearest-even mode, so element-wise results are bit-identical
//! to the scalar codec path. Sign-bit operations (abs, neg, relu) stay in
//! the 16-bit integer domain.
//!
//! All kernels require slice lengths that are exact multiples of
//! [`LANES`]; the dispatch layer guarantees this.

use super::Kernels;
use crate::F16;
use slicesimd_cpu::{capabilities, CapabilitySet, Error, Result};
use std::arch::x86_64::*;

/// FP16 elements per 256-bit operation.
const LANES: usize = 8;

pub(crate) static AVX2: Avx2Kernels = Avx2Kernels;

/// AVX2+F16C+FMA backend for x86-64.
pub(crate) struct Avx2Kernels;

impl Avx2Kernels {
    const REQUIRED: CapabilitySet = CapabilitySet::AVX2
        .union(CapabilitySet::F16C)
        .union(CapabilitySet::FMA);

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
            Err(Error::FeatureUnavailable("AVX2+F16C+FMA".to_string()))
        }
    }
}

#[inline]
#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn load8(p: *const F16) -> __m256 {
    _mm256_cvtph_ps(_mm_loadu_si128(p as *const __m128i))
}

#[inline]
#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn store8(p: *mut F16, v: __m256) {
    _mm_storeu_si128(
        p as *mut __m128i,
        _mm256_cvtps_ph::<_MM_FROUND_TO_NEAREST_INT>(v),
    );
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum(v: __m256) -> f32 {
    let lanes = std::mem::transmute::<__m256, [f32; 8]>(v);
    (lanes[0] + lanes[1] + lanes[2] + lanes[3]) + (lanes[4] + lanes[5] + lanes[6] + lanes[7])
}

macro_rules! binary16 {
    ($name:ident, $op:ident) => {
        #[target_feature(enable = "avx2", enable = "f16c", enable = "fma")]
        unsafe fn $name(dst: &mut [F16], a: &[F16], b: &[F16]) {
            for i in (0..dst.len()).step_by(LANES) {
                let va = load8(a.as_ptr().add(i));
                let vb = load8(b.as_ptr().add(i));
                store8(dst.as_mut_ptr().add(i), $op(va, vb));
            }
        }
    };
}

binary16!(add8, _mm256_add_ps);
binary16!(sub8, _mm256_sub_ps);
binary16!(mul8, _mm256_mul_ps);
binary16!(div8, _mm256_div_ps);

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn decode8(dst: &mut [f32], src: &[F16]) {
    for i in (0..dst.len()).step_by(LANES) {
        _mm256_storeu_ps(dst.as_mut_ptr().add(i), load8(src.as_ptr().add(i)));
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn encode8(dst: &mut [F16], src: &[f32]) {
    for i in (0..dst.len()).step_by(LANES) {
        store8(dst.as_mut_ptr().add(i), _mm256_loadu_ps(src.as_ptr().add(i)));
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn scale8(dst: &mut [F16], a: &[F16], s: f32) {
    let vs = _mm256_set1_ps(s);
    for i in (0..dst.len()).step_by(LANES) {
        store8(
            dst.as_mut_ptr().add(i),
            _mm256_mul_ps(load8(a.as_ptr().add(i)), vs),
        );
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn add_scalar8(dst: &mut [F16], a: &[F16], s: f32) {
    let vs = _mm256_set1_ps(s);
    for i in (0..dst.len()).step_by(LANES) {
        store8(
            dst.as_mut_ptr().add(i),
            _mm256_add_ps(load8(a.as_ptr().add(i)), vs),
        );
    }
}

#[target_feature(enable = "avx2", enable = "f16c", enable = "fma")]
unsafe fn fma8(dst: &mut [F16], a: &[F16], b: &[F16], c: &[F16]) {
    for i in (0..dst.len()).step_by(LANES) {
        let va = load8(a.as_ptr().add(i));
        let vb = load8(b.as_ptr().add(i));
        let vc = load8(c.as_ptr().add(i));
        store8(dst.as_mut_ptr().add(i), _mm256_fmadd_ps(va, vb, vc));
    }
}

#[target_feature(enable = "avx2", enable = "f16c", enable = "fma")]
unsafe fn axpy8(dst: &mut [F16], alpha: f32, s: &[F16]) {
    let va = _mm256_set1_ps(alpha);
    for i in (0..dst.len()).step_by(LANES) {
        let vs = load8(s.as_ptr().add(i));
        let vd = load8(dst.as_ptr().add(i));
        store8(dst.as_mut_ptr().add(i), _mm256_fmadd_ps(va, vs, vd));
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn accumulate_add8(dst: &mut [F16], src: &[F16]) {
    for i in (0..dst.len()).step_by(LANES) {
        let vs = load8(src.as_ptr().add(i));
        let vd = load8(dst.as_ptr().add(i));
        store8(dst.as_mut_ptr().add(i), _mm256_add_ps(vd, vs));
    }
}

#[target_feature(enable = "avx2")]
unsafe fn abs8(dst: &mut [F16], a: &[F16]) {
    let mask = _mm_set1_epi16(0x7FFF);
    for i in (0..dst.len()).step_by(LANES) {
        let v = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
        _mm_storeu_si128(dst.as_mut_ptr().add(i) as *mut __m128i, _mm_and_si128(v, mask));
    }
}

#[target_feature(enable = "avx2")]
unsafe fn neg8(dst: &mut [F16], a: &[F16]) {
    let mask = _mm_set1_epi16(0x8000u16 as i16);
    for i in (0..dst.len()).step_by(LANES) {
        let v = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
        _mm_storeu_si128(dst.as_mut_ptr().add(i) as *mut __m128i, _mm_xor_si128(v, mask));
    }
}

#[target_feature(enable = "avx2")]
unsafe fn relu8(dst: &mut [F16], src: &[F16]) {
    for i in (0..dst.len()).step_by(LANES) {
        let v = _mm_loadu_si128(src.as_ptr().add(i) as *const __m128i);
        // Arithmetic shift of the sign bit selects negatives; andnot zeroes
        // them, matching the scalar sign-bit test exactly.
        let negatives = _mm_srai_epi16::<15>(v);
        _mm_storeu_si128(
            dst.as_mut_ptr().add(i) as *mut __m128i,
            _mm_andnot_si128(negatives, v),
        );
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn sqrt8(dst: &mut [F16], a: &[F16]) {
    for i in (0..dst.len()).step_by(LANES) {
        store8(dst.as_mut_ptr().add(i), _mm256_sqrt_ps(load8(a.as_ptr().add(i))));
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn recip8(dst: &mut [F16], a: &[F16]) {
    // Exact division rather than vrcpps: the approximation is only good to
    // ~12 bits and would diverge from the scalar path.
    let ones = _mm256_set1_ps(1.0);
    for i in (0..dst.len()).step_by(LANES) {
        store8(
            dst.as_mut_ptr().add(i),
            _mm256_div_ps(ones, load8(a.as_ptr().add(i))),
        );
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn clamp8(dst: &mut [F16], a: &[F16], lo: f32, hi: f32) {
    let vlo = _mm256_set1_ps(lo);
    let vhi = _mm256_set1_ps(hi);
    for i in (0..dst.len()).step_by(LANES) {
        let v = load8(a.as_ptr().add(i));
        store8(
            dst.as_mut_ptr().add(i),
            _mm256_min_ps(_mm256_max_ps(v, vlo), vhi),
        );
    }
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn sum8(a: &[F16]) -> f32 {
    let mut acc = _mm256_setzero_ps();
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_add_ps(acc, load8(a.as_ptr().add(i)));
    }
    hsum(acc)
}

#[target_feature(enable = "avx2", enable = "f16c", enable = "fma")]
unsafe fn dot8(a: &[F16], b: &[F16]) -> f32 {
    let mut acc = _mm256_setzero_ps();
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_fmadd_ps(load8(a.as_ptr().add(i)), load8(b.as_ptr().add(i)), acc);
    }
    hsum(acc)
}

// vminps/vmaxps return their second operand when either operand is NaN.
// Seeding the accumulator with the reduction identity and keeping it in the
// second operand slot makes a NaN input lane leave the running extremum
// untouched, the same NaN-ignoring rule as the scalar kernels.

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn min8(a: &[F16]) -> F16 {
    let mut acc = _mm256_set1_ps(f32::INFINITY);
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_min_ps(load8(a.as_ptr().add(i)), acc);
    }
    let lanes = std::mem::transmute::<__m256, [f32; 8]>(acc);
    let mut m = f32::INFINITY;
    for &v in &lanes {
        if v < m {
            m = v;
        }
    }
    // Every lane is an exactly-decoded f16 (or the +inf seed), so
    // narrowing is lossless.
    F16::from_f32(m)
}

#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn max8(a: &[F16]) -> F16 {
    let mut acc = _mm256_set1_ps(f32::NEG_INFINITY);
    for i in (0..a.len()).step_by(LANES) {
        acc = _mm256_max_ps(load8(a.as_ptr().add(i)), acc);
    }
    let lanes = std::mem::transmute::<__m256, [f32; 8]>(acc);
    let mut m = f32::NEG_INFINITY;
    for &v in &lanes {
        if v > m {
            m = v;
        }
    }
    F16::from_f32(m)
}

// Safety for every call below: `active()` only hands out this backend when
// the capability flags include AVX2, F16C and FMA, and the dispatch layer
// only passes lengths that are multiples of LANES.
impl Kernels for Avx2Kernels {
    fn name(&self) -> &'static str {
        "avx2+f16c"
    }

    fn width(&self) -> usize {
        LANES
    }

    fn decode_slice(&self, dst: &mut [f32], src: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { decode8(dst, src) }
    }

    fn encode_slice(&self, dst: &mut [F16], src: &[f32]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { encode8(dst, src) }
    }

    fn add(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { add8(dst, a, b) }
    }

    fn sub(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { sub8(dst, a, b) }
    }

    fn mul(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { mul8(dst, a, b) }
    }

    fn div(&self, dst: &mut [F16], a: &[F16], b: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { div8(dst, a, b) }
    }

    fn scale(&self, dst: &mut [F16], a: &[F16], s: f32) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { scale8(dst, a, s) }
    }

    fn add_scalar(&self, dst: &mut [F16], a: &[F16], s: f32) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { add_scalar8(dst, a, s) }
    }

    fn fma(&self, dst: &mut [F16], a: &[F16], b: &[F16], c: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { fma8(dst, a, b, c) }
    }

    fn axpy(&self, dst: &mut [F16], alpha: f32, s: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { axpy8(dst, alpha, s) }
    }

    fn accumulate_add(&self, dst: &mut [F16], src: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { accumulate_add8(dst, src) }
    }

    fn abs(&self, dst: &mut [F16], a: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { abs8(dst, a) }
    }

    fn neg(&self, dst: &mut [F16], a: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { neg8(dst, a) }
    }

    fn relu(&self, dst: &mut [F16], src: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { relu8(dst, src) }
    }

    fn sqrt(&self, dst: &mut [F16], a: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { sqrt8(dst, a) }
    }

    fn recip(&self, dst: &mut [F16], a: &[F16]) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { recip8(dst, a) }
    }

    fn clamp(&self, dst: &mut [F16], a: &[F16], lo: f32, hi: f32) {
        debug_assert_eq!(dst.len() % LANES, 0);
        unsafe { clamp8(dst, a, lo, hi) }
    }

    fn sum(&self, a: &[F16]) -> f32 {
        debug_assert_eq!(a.len() % LANES, 0);
        unsafe { sum8(a) }
    }

    fn dot(&self, a: &[F16], b: &[F16]) -> f32 {
        debug_assert_eq!(a.len() % LANES, 0);
        unsafe { dot8(a, b) }
    }

    fn min(&self, a: &[F16]) -> F16 {
        debug_assert!(!a.is_empty() && a.len() % LANES == 0);
        unsafe { min8(a) }
    }

    fn max(&self, a: &[F16]) -> F16 {
        debug_assert!(!a.is_empty() && a.len() % LANES == 0);
        unsafe { max8(a) }
    }
}
