//! Single-precision slice operations.
//!
//! The same operation catalogue as the half-precision crate, minus the
//! codec: explicit destination and source slices, lengths clamped to the
//! shortest operand, empty inputs as silent no-ops. On x86-64 with
//! AVX2+FMA the aligned bulk of each slice runs through 8-wide vector
//! kernels with a scalar remainder.
//!
//! The sigmoid, tanh and exponential kernels trade accuracy for speed:
//! inputs are clamped to bands where the function has numerically
//! saturated, and tanh uses the rational approximation `x / (1 + |x|)`
//! rather than the libm function. See the individual function docs.

mod dispatch;
mod scalar;
mod simd;

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

/// `dst[i] = a[i] + b[i]`.
pub fn add(dst: &mut [f32], a: &[f32], b: &[f32]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::add(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] - b[i]`.
pub fn sub(dst: &mut [f32], a: &[f32], b: &[f32]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::sub(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] * b[i]`.
pub fn mul(dst: &mut [f32], a: &[f32], b: &[f32]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::mul(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] / b[i]`. Division by zero yields the usual IEEE
/// infinity or NaN.
pub fn div(dst: &mut [f32], a: &[f32], b: &[f32]) {
    let n = usable3(dst.len(), a.len(), b.len());
    dispatch::div(&mut dst[..n], &a[..n], &b[..n]);
}

/// `dst[i] = a[i] * b[i] + c[i]` with a single rounding (fused).
pub fn fma(dst: &mut [f32], a: &[f32], b: &[f32], c: &[f32]) {
    let n = usable3(dst.len(), a.len(), b.len()).min(c.len());
    dispatch::fma(&mut dst[..n], &a[..n], &b[..n], &c[..n]);
}

/// `dst[i] = a[i] * s`.
pub fn scale(dst: &mut [f32], a: &[f32], s: f32) {
    let n = usable2(dst.len(), a.len());
    dispatch::scale(&mut dst[..n], &a[..n], s);
}

/// `dst[i] = a[i] + s`.
pub fn add_scalar(dst: &mut [f32], a: &[f32], s: f32) {
    let n = usable2(dst.len(), a.len());
    dispatch::add_scalar(&mut dst[..n], &a[..n], s);
}

/// Clamps each element into `[lo, hi]`.
pub fn clamp(dst: &mut [f32], a: &[f32], lo: f32, hi: f32) {
    let n = usable2(dst.len(), a.len());
    dispatch::clamp(&mut dst[..n], &a[..n], lo, hi);
}

/// Clamps each element into `[lo, hi]`, then rescales:
/// `dst[i] = (clamp(src[i], lo, hi) - lo) * scale`.
pub fn clamp_scale(dst: &mut [f32], src: &[f32], lo: f32, hi: f32, scale: f32) {
    let n = usable2(dst.len(), src.len());
    dispatch::clamp_scale(&mut dst[..n], &src[..n], lo, hi, scale);
}

/// `dst[i] = |a[i]|`.
pub fn abs(dst: &mut [f32], a: &[f32]) {
    let n = usable2(dst.len(), a.len());
    dispatch::abs(&mut dst[..n], &a[..n]);
}

/// `dst[i] = -a[i]`.
pub fn neg(dst: &mut [f32], a: &[f32]) {
    let n = usable2(dst.len(), a.len());
    dispatch::neg(&mut dst[..n], &a[..n]);
}

/// `dst[i] = sqrt(a[i])`. Negative inputs yield NaN.
pub fn sqrt(dst: &mut [f32], a: &[f32]) {
    let n = usable2(dst.len(), a.len());
    dispatch::sqrt(&mut dst[..n], &a[..n]);
}

/// `dst[i] = 1 / a[i]`.
pub fn recip(dst: &mut [f32], a: &[f32]) {
    let n = usable2(dst.len(), a.len());
    dispatch::recip(&mut dst[..n], &a[..n]);
}

/// Rectified linear unit: `max(x, 0)`. NaN inputs map to `0.0`.
pub fn relu(dst: &mut [f32], src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    dispatch::relu(&mut dst[..n], &src[..n]);
}

/// In-place [`relu`].
pub fn relu_in_place(dst: &mut [f32]) {
    for x in dst.iter_mut() {
        *x = if *x > 0.0 { *x } else { 0.0 };
    }
}

/// Logistic sigmoid, `1 / (1 + e^-x)`, saturating to exactly 0 or 1
/// beyond |x| = 20 where f32 can no longer tell the difference.
pub fn sigmoid(dst: &mut [f32], src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    dispatch::sigmoid(&mut dst[..n], &src[..n]);
}

/// In-place [`sigmoid`].
pub fn sigmoid_in_place(dst: &mut [f32]) {
    for x in dst.iter_mut() {
        *x = if *x > scalar::SIGMOID_CLAMP {
            1.0
        } else if *x < -scalar::SIGMOID_CLAMP {
            0.0
        } else {
            1.0 / (1.0 + (-*x).exp())
        };
    }
}

/// Fast hyperbolic tangent approximation `x / (1 + |x|)`, snapped to ±1
/// beyond |x| = 2.5. Monotonic but only a few percent accurate; use a
/// libm `tanh` if exactness matters.
pub fn tanh(dst: &mut [f32], src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    dispatch::tanh(&mut dst[..n], &src[..n]);
}

/// In-place [`tanh`].
pub fn tanh_in_place(dst: &mut [f32]) {
    for x in dst.iter_mut() {
        *x = if *x > scalar::TANH_CLAMP {
            1.0
        } else if *x < -scalar::TANH_CLAMP {
            -1.0
        } else {
            *x / (1.0 + x.abs())
        };
    }
}

/// Natural exponential, clamped at |x| = 88 to avoid f32 overflow and
/// underflow.
pub fn exp(dst: &mut [f32], src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    dispatch::exp(&mut dst[..n], &src[..n]);
}

/// In-place [`exp`].
pub fn exp_in_place(dst: &mut [f32]) {
    for x in dst.iter_mut() {
        *x = if *x > scalar::EXP_CLAMP {
            scalar::EXP_CLAMP.exp()
        } else if *x < -scalar::EXP_CLAMP {
            0.0
        } else {
            x.exp()
        };
    }
}

/// Sum of all elements. Empty input sums to `0.0`.
pub fn sum(a: &[f32]) -> f32 {
    dispatch::sum(a)
}

/// Arithmetic mean, or `0.0` for empty input.
pub fn mean(a: &[f32]) -> f32 {
    if a.is_empty() {
        return 0.0;
    }
    dispatch::sum(a) / a.len() as f32
}

/// Population variance, or `0.0` for empty input.
pub fn variance(a: &[f32]) -> f32 {
    if a.is_empty() {
        return 0.0;
    }
    dispatch::variance(a, mean(a))
}

/// Population standard deviation, or `0.0` for empty input.
pub fn std_dev(a: &[f32]) -> f32 {
    variance(a).sqrt()
}

/// Smallest element, or positive infinity for empty input. NaN elements
/// are ignored; an all-NaN slice also yields +inf.
pub fn min(a: &[f32]) -> f32 {
    if a.is_empty() {
        return f32::INFINITY;
    }
    dispatch::min(a)
}

/// Largest element, or negative infinity for empty input. NaN elements
/// are ignored; an all-NaN slice also yields -inf.
pub fn max(a: &[f32]) -> f32 {
    if a.is_empty() {
        return f32::NEG_INFINITY;
    }
    dispatch::max(a)
}

/// Index of the smallest element, or `None` for empty input. The first of
/// equal minima wins.
pub fn min_index(a: &[f32]) -> Option<usize> {
    if a.is_empty() {
        return None;
    }
    Some(dispatch::min_index(a))
}

/// Index of the largest element, or `None` for empty input. The first of
/// equal maxima wins.
pub fn max_index(a: &[f32]) -> Option<usize> {
    if a.is_empty() {
        return None;
    }
    Some(dispatch::max_index(a))
}

/// Dot product. Empty input yields `0.0`.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    let n = usable2(a.len(), b.len());
    dispatch::dot(&a[..n], &b[..n])
}

/// Dot product of one shared vector `v` against each row, one result per
/// row. Processes `min(dst.len(), rows.len())` rows.
pub fn dot_batch(dst: &mut [f32], rows: &[&[f32]], v: &[f32]) {
    for (d, row) in dst.iter_mut().zip(rows) {
        *d = dot(row, v);
    }
}

/// Euclidean distance between `a` and `b`.
pub fn distance(a: &[f32], b: &[f32]) -> f32 {
    let n = usable2(a.len(), b.len());
    dispatch::euclidean_distance(&a[..n], &b[..n])
}

/// Scales `src` to unit Euclidean length into `dst`. When the magnitude is
/// below a small epsilon the input is copied through unchanged.
pub fn normalize(dst: &mut [f32], src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    let mag = dispatch::dot(&src[..n], &src[..n]).sqrt();
    if mag < NORM_EPSILON {
        dst[..n].copy_from_slice(&src[..n]);
    } else {
        dispatch::scale(&mut dst[..n], &src[..n], 1.0 / mag);
    }
}

/// "Valid" convolution of `signal` with `kernel`. A no-op when the kernel
/// is empty or longer than the signal.
pub fn convolve_valid(dst: &mut [f32], signal: &[f32], kernel: &[f32]) {
    if kernel.is_empty() || signal.len() < kernel.len() {
        return;
    }
    let n = usable2(dst.len(), signal.len() - kernel.len() + 1);
    dispatch::convolve_valid(&mut dst[..n], signal, kernel);
}

/// Scaled accumulate (AXPY): `dst[i] += alpha * src[i]`.
pub fn add_scaled(dst: &mut [f32], alpha: f32, src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    dispatch::axpy(&mut dst[..n], alpha, &src[..n]);
}

/// `dst[offset + i] += src[i]`.
///
/// An empty `src` is a no-op regardless of `offset`.
///
/// # Panics
///
/// Panics when `offset + src.len()` exceeds `dst.len()`. Use
/// [`try_accumulate_add`] to get an error instead.
pub fn accumulate_add(dst: &mut [f32], src: &[f32], offset: usize) {
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
pub fn try_accumulate_add(dst: &mut [f32], src: &[f32], offset: usize) -> Result<()> {
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
pub fn interleave2(dst: &mut [f32], a: &[f32], b: &[f32]) {
    let pairs = usable3(dst.len() / 2, a.len(), b.len());
    dispatch::interleave2(&mut dst[..pairs * 2], &a[..pairs], &b[..pairs]);
}

/// Inverse of [`interleave2`]: even elements of `src` go to `a`, odd to `b`.
pub fn deinterleave2(a: &mut [f32], b: &mut [f32], src: &[f32]) {
    let pairs = usable3(a.len(), b.len(), src.len() / 2);
    dispatch::deinterleave2(&mut a[..pairs], &mut b[..pairs], &src[..pairs * 2]);
}

/// Prefix sum: `dst[i] = src[0] + ... + src[i]`.
pub fn cumulative_sum(dst: &mut [f32], src: &[f32]) {
    let n = usable2(dst.len(), src.len());
    dispatch::cumulative_sum(&mut dst[..n], &src[..n]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_clamping_leaves_excess_untouched() {
        let a = [1.0f32, 2.0];
        let b = [10.0f32, 20.0, 30.0];
        let mut dst = [0.0f32, 0.0, 99.0];
        add(&mut dst, &a, &b);
        assert_eq!(dst, [11.0, 22.0, 99.0]);
    }

    #[test]
    fn reduction_identities() {
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(min(&[]), f32::INFINITY);
        assert_eq!(max(&[]), f32::NEG_INFINITY);
        assert_eq!(min_index(&[]), None);
        assert_eq!(max_index(&[]), None);
    }

    #[test]
    fn statistics_agree() {
        let a = [2.0f32, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&a), 5.0);
        assert_eq!(variance(&a), 4.0);
        assert_eq!(std_dev(&a), 2.0);
    }

    #[test]
    fn normalize_unit_vector() {
        let src = [3.0f32, 4.0];
        let mut dst = [0.0f32; 2];
        normalize(&mut dst, &src);
        assert_eq!(dst, [0.6, 0.8]);
    }

    #[test]
    fn normalize_passes_tiny_vectors_through() {
        let src = [0.0f32, 0.0];
        let mut dst = [1.0f32; 2];
        normalize(&mut dst, &src);
        assert_eq!(dst, [0.0, 0.0]);
    }

    #[test]
    fn try_accumulate_add_reports_bounds() {
        let mut dst = [0.0f32; 4];
        let src = [1.0f32; 2];
        assert!(try_accumulate_add(&mut dst, &src, 2).is_ok());
        assert!(try_accumulate_add(&mut dst, &src, 3).is_err());
        // offset + len wraps around usize; still an error, not a panic.
        assert!(try_accumulate_add(&mut dst, &src, usize::MAX).is_err());
    }

    #[test]
    fn in_place_variants_match_out_of_place() {
        let src = [-30.0f32, -1.0, 0.0, 1.0, 30.0];
        let mut out = [0.0f32; 5];

        relu(&mut out, &src);
        let mut inp = src;
        relu_in_place(&mut inp);
        assert_eq!(inp, out);

        sigmoid(&mut out, &src);
        let mut inp = src;
        sigmoid_in_place(&mut inp);
        assert_eq!(inp, out);

        tanh(&mut out, &src);
        let mut inp = src;
        tanh_in_place(&mut inp);
        assert_eq!(inp, out);

        exp(&mut out, &src);
        let mut inp = src;
        exp_in_place(&mut inp);
        assert_eq!(inp, out);
    }
}
