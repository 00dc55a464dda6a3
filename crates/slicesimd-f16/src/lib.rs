//! Half-precision (IEEE 754 binary16) slice operations.
//!
//! Values are stored as [`F16`] bit patterns; all arithmetic widens each
//! element to `f32`, computes there, and narrows the result back with
//! round-to-nearest-even. Reductions keep their accumulator in `f32` and
//! return it un-narrowed, so long sums do not stall at half precision's
//! 2048-integer ceiling.
//!
//! Operations take explicit destination and source slices. Lengths need not
//! match: only the first `min` of the given lengths is processed, extra
//! destination elements are left untouched, and empty inputs are silent
//! no-ops. On x86-64 with AVX2+F16C+FMA the bulk of each slice runs through
//! 8-wide vector kernels with a scalar remainder; everywhere else the scalar
//! path handles the whole slice. Both paths produce bit-identical results
//! for element-wise operations.
//!
//! ```
//! use slicesimd_f16::F16;
//!
//! let a: Vec<F16> = [1.0f32, 2.0, 3.0].iter().map(|&v| F16::from_f32(v)).collect();
//! let b: Vec<F16> = [4.0f32, 5.0, 6.0].iter().map(|&v| F16::from_f32(v)).collect();
//! let mut dst = vec![F16::ZERO; 3];
//! slicesimd_f16::add(&mut dst, &a, &b);
//! assert_eq!(dst[2].to_f32(), 9.0);
//! assert_eq!(slicesimd_f16::dot(&a, &b), 32.0);
//! ```

mod codec;
mod dispatch;
mod half;
mod scalar;
mod simd;

pub use half::F16;
pub use slicesimd_cpu::{Error, Result};

/// Magnitudes below this are passed through [`normalize`] unchanged.
const NORM_EPSILON: f32 = 1e-7;

#[inline]
fn usable2(a: usize, b: usize) -> usize {
    a.min(b)
}

#[inline]
fn usable3(a: usize, b: usize, c: usize) -> usize {
    a.min(b).min(c)
}

/// Widens each element of `src` into `dst`. Exact for every pattern.
pub fn to_f32_slice(dst: &mut [f32], src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    dispatch::decode_slice(&mut dst[..n], &src[..n]);
}

/// Narrows each element of `src` into `dst`, rounding to nearest-even.
pub fn from_f32_slice(dst: &mut [F16], src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    dispatch::encode_slice(&mut dst[..n], &src[..n]);
}

/// `dst[i] = a[i] + b[i]`.
pub fn add(dst: &mut [F16], a: &[F16], b: &[F16]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::add(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] - b[i]`.
pub fn sub(dst: &mut [F16], a: &[F16], b: &[F16]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::sub(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] * b[i]`.
pub fn mul(dst: &mut [F16], a: &[F16], b: &[F16]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::mul(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] / b[i]`. Division by zero yields the usual IEEE
/// infinity or NaN.
pub fn div(dst: &mut [F16], a: &[F16], b: &[F16]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::div(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] * b[i] + c[i]` with a single rounding (fused).
pub fn fma(dst: &mut [F16], a: &[F16], b: &[F16], c: &[F16]) {
    let n = usable3(dst.len(), a.len(), b.len()).min(c.len());
    dispatch::fma(&mut dst[..n], &a[..n], &b[..n], &c[..n]);
}

/// `dst[i] = a[i] * s`.
pub fn scale(dst: &mut [F16], a: &[F16], s: f32) {
    let n = usable2(dst.len(), a.len());
    dispatch::scale(&mut dst[..n], &a[..n], s);
}

/// `dst[i] = a[i] + s`.
pub fn add_scalar(dst: &mut [F16], a: &[F16], s: f32) {
    let n = usable2(dst.len(), a.len());
    dispatch::add_scalar(&mut dst[..n], &a[..n], s);
}

/// Clamps each element into `[lo, hi]`.
pub fn clamp(dst: &mut [F16], a: &[F16], lo: f32, hi: f32) {
    let n = usable2(dst.len(), a.len());
    dispatch::clamp(&mut dst[..n], &a[..n], lo, hi);
}

/// Clamps each element into `[lo, hi]`, then rescales:
/// `dst[i] = (clamp(src[i], lo, hi) - lo) * scale`.
pub fn clamp_scale(dst: &mut [F16], src: &[F16], lo: f32, hi: f32, scale: f32) {
    let n = usable2(dst.len(), src.len());
    dispatch::clamp_scale(&mut dst[..n], &src[..n], lo, hi, scale);
}

/// `dst[i] = |a[i]|`. Pure sign-bit clear; NaN payloads are untouched.
pub fn abs(dst: &mut [F16], a: &[F16]) {
    let n = usable2(dst.len(), a.len());
    dispatch::abs(&mut dst[..n], &a[..n]);
}

/// `dst[i] = -a[i]`. Pure sign-bit flip; `-0.0` becomes `0.0` and NaNs
/// stay NaN.
pub fn neg(dst: &mut [F16], a: &[F16]) {
    let n = usable2(dst.len(), a.len());
    dispatch::neg(&mut dst[..n], &a[..n]);
}

/// `dst[i] = sqrt(a[i])`. Negative inputs yield NaN.
pub fn sqrt(dst: &mut [F16], a: &[F16]) {
    let n = usable2(dst.len(), a.len());
    dispatch::sqrt(&mut dst[..n], &a[..n]);
}

/// `dst[i] = 1 / a[i]`.
pub fn recip(dst: &mut [F16], a: &[F16]) {
    let n = usable2(dst.len(), a.len());
    dispatch::recip(&mut dst[..n], &a[..n]);
}

/// Rectified linear unit: negative elements (by sign bit, so including
/// `-0.0`) become `0.0`, everything else is copied through.
pub fn relu(dst: &mut [F16], src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    dispatch::relu(&mut dst[..n], &src[..n]);
}

/// In-place [`relu`].
pub fn relu_in_place(dst: &mut [F16]) {
    for x in dst.iter_mut() {
        if x.is_sign_negative() {
            *x = F16::ZERO;
        }
    }
}

/// Logistic sigmoid, `1 / (1 + e^-x)`.
pub fn sigmoid(dst: &mut [F16], src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    dispatch::sigmoid(&mut dst[..n], &src[..n]);
}

/// In-place [`sigmoid`].
pub fn sigmoid_in_place(dst: &mut [F16]) {
    for x in dst.iter_mut() {
        let v = x.to_f32();
        *x = F16::from_f32(1.0 / (1.0 + (-v).exp()));
    }
}

/// Hyperbolic tangent.
pub fn tanh(dst: &mut [F16], src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    dispatch::tanh(&mut dst[..n], &src[..n]);
}

/// In-place [`tanh`].
pub fn tanh_in_place(dst: &mut [F16]) {
    for x in dst.iter_mut() {
        *x = F16::from_f32(x.to_f32().tanh());
    }
}

/// Natural exponential, `e^x`.
pub fn exp(dst: &mut [F16], src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    dispatch::exp(&mut dst[..n], &src[..n]);
}

/// In-place [`exp`].
pub fn exp_in_place(dst: &mut [F16]) {
    for x in dst.iter_mut() {
        *x = F16::from_f32(x.to_f32().exp());
    }
}

/// Sum of all elements, accumulated in `f32`. Empty input sums to `0.0`.
pub fn sum(a: &[F16]) -> f32 {
    dispatch::sum(a)
}

/// Arithmetic mean, or `0.0` for empty input.
pub fn mean(a: &[F16]) -> f32 {
    if a.is_empty() {
        return 0.0;
    }
    dispatch::sum(a) / a.len() as f32
}

/// Population variance, or `0.0` for empty input.
pub fn variance(a: &[F16]) -> f32 {
    if a.is_empty() {
        return 0.0;
    }
    dispatch::variance(a, mean(a))
}

/// Population standard deviation, or `0.0` for empty input.
pub fn std_dev(a: &[F16]) -> f32 {
    variance(a).sqrt()
}

/// Smallest element. Empty input yields positive infinity, the identity
/// element for min, so combining with any real minimum is correct. NaN
/// elements are ignored; an all-NaN slice also yields +inf.
pub fn min(a: &[F16]) -> F16 {
    if a.is_empty() {
        return F16::INFINITY;
    }
    dispatch::min(a)
}

/// Largest element. Empty input yields negative infinity. NaN elements
/// are ignored; an all-NaN slice also yields -inf.
pub fn max(a: &[F16]) -> F16 {
    if a.is_empty() {
        return F16::NEG_INFINITY;
    }
    dispatch::max(a)
}

/// Index of the smallest element, or `None` for empty input. The first of
/// equal minima wins.
pub fn min_index(a: &[F16]) -> Option<usize> {
    if a.is_empty() {
        return None;
    }
    Some(dispatch::min_index(a))
}

/// Index of the largest element, or `None` for empty input. The first of
/// equal maxima wins.
pub fn max_index(a: &[F16]) -> Option<usize> {
    if a.is_empty() {
        return None;
    }
    Some(dispatch::max_index(a))
}

/// Dot product, accumulated in `f32`. Empty input yields `0.0`.
pub fn dot(a: &[F16], b: &[F16]) -> f32 {
    let n = usable2(a.len(), b.len());
    dispatch::dot(&a[..n], &b[..n])
}

/// Dot product of one shared vector `v` against each row, one result per
/// row. Processes `min(dst.len(), rows.len())` rows.
pub fn dot_batch(dst: &mut [f32], rows: &[&[F16]], v: &[F16]) {
    for (d, row) in dst.iter_mut().zip(rows) {
        *d = dot(row, v);
    }
}

/// Euclidean distance between `a` and `b`, accumulated in `f32`.
pub fn distance(a: &[F16], b: &[F16]) -> f32 {
    let n = usable2(a.len(), b.len());
    dispatch::euclidean_distance(&a[..n], &b[..n])
}

/// Scales `src` to unit Euclidean length into `dst`. When the magnitude is
/// below a small epsilon the input is copied through unchanged instead of
/// amplifying noise into a huge vector.
pub fn normalize(dst: &mut [F16], src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    let mag = dispatch::dot(&src[..n], &src[..n]).sqrt();
    if mag < NORM_EPSILON {
        dst[..n].copy_from_slice(&src[..n]);
    } else {
        dispatch::scale(&mut dst[..n], &src[..n], 1.0 / mag);
    }
}

/// "Valid" convolution of `signal` with `kernel`: each output element is
/// the kernel dotted against the signal window starting there, so the full
/// output has `signal.len() - kernel.len() + 1` elements. A no-op when the
/// kernel is empty or longer than the signal.
pub fn convolve_valid(dst: &mut [F16], signal: &[F16], kernel: &[F16]) {
    if kernel.is_empty() || signal.len() < kernel.len() {
        return;
    }
    let n = usable2(dst.len(), signal.len() - kernel.len() + 1);
    dispatch::convolve_valid(&mut dst[..n], signal, kernel);
}

/// Scaled accumulate (AXPY): `dst[i] += alpha * src[i]`.
pub fn add_scaled(dst: &mut [F16], alpha: f32, src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    dispatch::axpy(&mut dst[..n], alpha, &src[..n]);
}

/// `dst[offset + i] += src[i]`.
///
/// An empty `src` is a no-op regardless of `offset`.
///
/// # Panics
///
/// Panics when `offset + src.len()` exceeds `dst.len()`; writing past the
/// destination is a caller defect, not a recoverable condition. Use
/// [`try_accumulate_add`] to get an error instead.
pub fn accumulate_add(dst: &mut [F16], src: &[F16], offset: usize) {
    if src.is_empty() {
        return;
    }
    // checked_add: offset + len must not wrap for offsets near usize::MAX.
    let end = offset.checked_add(src.len());
    assert!(
        end.is_some_and(|end| end <= dst.len()),
        "accumulate_add: offset {} + length {} exceeds destination capacity {}",
        offset,
        src.len(),
        dst.len(),
    );
    dispatch::accumulate_add(&mut dst[offset..offset + src.len()], src);
}

/// Fallible [`accumulate_add`]: returns [`Error::OffsetOutOfBounds`]
/// instead of panicking.
pub fn try_accumulate_add(dst: &mut [F16], src: &[F16], offset: usize) -> Result<()> {
    if src.is_empty() {
        return Ok(());
    }
    match offset.checked_add(src.len()) {
        Some(end) if end <= dst.len() => {
            dispatch::accumulate_add(&mut dst[offset..end], src);
            Ok(())
        }
        _ => Err(Error::OffsetOutOfBounds {
            offset,
            len: src.len(),
            capacity: dst.len(),
        }),
    }
}

/// Interleaves `a` and `b` pairwise: `dst = [a[0], b[0], a[1], b[1], ...]`.
/// Processes as many pairs as all three slices allow.
pub fn interleave2(dst: &mut [F16], a: &[F16], b: &[F16]) {
    let pairs = usable3(dst.len() / 2, a.len(), b.len());
    dispatch::interleave2(&mut dst[..pairs * 2], &a[..pairs], &b[..pairs]);
}

/// Inverse of [`interleave2`]: even elements of `src` go to `a`, odd to `b`.
pub fn deinterleave2(a: &mut [F16], b: &mut [F16], src: &[F16]) {
    let pairs = usable3(a.len(), b.len(), src.len() / 2);
    dispatch::deinterleave2(&mut a[..pairs], &mut b[..pairs], &src[..pairs * 2]);
}

/// Prefix sum: `dst[i] = src[0] + ... + src[i]`, with the running total
/// kept in `f32`.
pub fn cumulative_sum(dst: &mut [F16], src: &[F16]) {
    let n = usable2(dst.len(), src.len());
    dispatch::cumulative_sum(&mut dst[..n], &src[..n]);
}
