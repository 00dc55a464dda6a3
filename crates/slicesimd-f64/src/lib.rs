//! Double-precision slice operations.
//!
//! The same operation catalogue and edge policies as the other precision
//! crates, implemented scalar-only: at double precision the accumulation
//! headroom that motivates the vector backends elsewhere matters far less,
//! and this crate doubles as the reference the lower-precision crates are
//! tested against. Activations here use the accurate libm functions, not
//! the clamped approximations of the f32 crate.

pub use slicesimd_cpu::{Error, Result};

/// Magnitudes below this are passed through [`normalize`] unchanged.
const NORM_EPSILON: f64 = 1e-7;

#[inline]
fn usable2(a: usize, b: usize) -> usize {
    a.min(b)
}

#[inline]
fn usable3(a: usize, b: usize, c: usize) -> usize {
    a.min(b).min(c)
}

/// `dst[i] = a[i] + b[i]`.
pub fn add(dst: &mut [f64], a: &[f64], b: &[f64]) {
    let n = usable3(dst.len(), a.len(), b.len());
    for i in 0..n {
        dst[i] = a[i] + b[i];
    }
}

/// `dst[i] = a[i] - b[i]`.
pub fn sub(dst: &mut [f64], a: &[f64], b: &[f64]) {
    let n = usable3(dst.len(), a.len(), b.len());
    for i in 0..n {
        dst[i] = a[i] - b[i];
    }
}

/// `dst[i] = a[i] * b[i]`.
pub fn mul(dst: &mut [f64], a: &[f64], b: &[f64]) {
    let n = usable3(dst.len(), a.len(), b.len());
    for i in 0..n {
        dst[i] = a[i] * b[i];
    }
}

/// `dst[i] = a[i] / b[i]`.
pub fn div(dst: &mut [f64], a: &[f64], b: &[f64]) {
    let n = usable3(dst.len(), a.len(), b.len());
    for i in 0..n {
        dst[i] = a[i] / b[i];
    }
}

/// `dst[i] = a[i] * b[i] + c[i]` with a single rounding (fused).
pub fn fma(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64]) {
    let n = usable3(dst.len(), a.len(), b.len()).min(c.len());
    for i in 0..n {
        dst[i] = a[i].mul_add(b[i], c[i]);
    }
}

/// `dst[i] = a[i] * s`.
pub fn scale(dst: &mut [f64], a: &[f64], s: f64) {
    let n = usable2(dst.len(), a.len());
    for i in 0..n {
        dst[i] = a[i] * s;
    }
}

/// `dst[i] = a[i] + s`.
pub fn add_scalar(dst: &mut [f64], a: &[f64], s: f64) {
    let n = usable2(dst.len(), a.len());
    for i in 0..n {
        dst[i] = a[i] + s;
    }
}

/// Clamps each element into `[lo, hi]`.
pub fn clamp(dst: &mut [f64], a: &[f64], lo: f64, hi: f64) {
    let n = usable2(dst.len(), a.len());
    for i in 0..n {
        dst[i] = if a[i] < lo {
            lo
        } else if a[i] > hi {
            hi
        } else {
            a[i]
        };
    }
}

/// Clamps each element into `[lo, hi]`, then rescales:
/// `dst[i] = (clamp(src[i], lo, hi) - lo) * scale`.
pub fn clamp_scale(dst: &mut [f64], src: &[f64], lo: f64, hi: f64, scale: f64) {
    let n = usable2(dst.len(), src.len());
    for i in 0..n {
        let v = if src[i] < lo {
            lo
        } else if src[i] > hi {
            hi
        } else {
            src[i]
        };
        dst[i] = (v - lo) * scale;
    }
}

/// `dst[i] = |a[i]|`.
pub fn abs(dst: &mut [f64], a: &[f64]) {
    let n = usable2(dst.len(), a.len());
    for i in 0..n {
        dst[i] = a[i].abs();
    }
}

/// `dst[i] = -a[i]`.
pub fn neg(dst: &mut [f64], a: &[f64]) {
    let n = usable2(dst.len(), a.len());
    for i in 0..n {
        dst[i] = -a[i];
    }
}

/// `dst[i] = sqrt(a[i])`.
pub fn sqrt(dst: &mut [f64], a: &[f64]) {
    let n = usable2(dst.len(), a.len());
    for i in 0..n {
        dst[i] = a[i].sqrt();
    }
}

/// `dst[i] = 1 / a[i]`.
pub fn recip(dst: &mut [f64], a: &[f64]) {
    let n = usable2(dst.len(), a.len());
    for i in 0..n {
        dst[i] = 1.0 / a[i];
    }
}

/// Rectified linear unit: `max(x, 0)`. NaN inputs map to `0.0`.
pub fn relu(dst: &mut [f64], src: &[f64]) {
    let n = usable2(dst.len(), src.len());
    for i in 0..n {
        dst[i] = if src[i] > 0.0 { src[i] } else { 0.0 };
    }
}

/// In-place [`relu`].
pub fn relu_in_place(dst: &mut [f64]) {
    for x in dst.iter_mut() {
        *x = if *x > 0.0 { *x } else { 0.0 };
    }
}

/// Logistic sigmoid, `1 / (1 + e^-x)`.
pub fn sigmoid(dst: &mut [f64], src: &[f64]) {
    let n = usable2(dst.len(), src.len());
    for i in 0..n {
        dst[i] = 1.0 / (1.0 + (-src[i]).exp());
    }
}

/// In-place [`sigmoid`].
pub fn sigmoid_in_place(dst: &mut [f64]) {
    for x in dst.iter_mut() {
        *x = 1.0 / (1.0 + (-*x).exp());
    }
}

/// Hyperbolic tangent.
pub fn tanh(dst: &mut [f64], src: &[f64]) {
    let n = usable2(dst.len(), src.len());
    for i in 0..n {
        dst[i] = src[i].tanh();
    }
}

/// In-place [`tanh`].
pub fn tanh_in_place(dst: &mut [f64]) {
    for x in dst.iter_mut() {
        *x = x.tanh();
    }
}

/// Natural exponential.
pub fn exp(dst: &mut [f64], src: &[f64]) {
    let n = usable2(dst.len(), src.len());
    for i in 0..n {
        dst[i] = src[i].exp();
    }
}

/// In-place [`exp`].
pub fn exp_in_place(dst: &mut [f64]) {
    for x in dst.iter_mut() {
        *x = x.exp();
    }
}

/// Sum of all elements. Empty input sums to `0.0`.
pub fn sum(a: &[f64]) -> f64 {
    let mut acc = 0.0;
    for &x in a {
        acc += x;
    }
    acc
}

/// Arithmetic mean, or `0.0` for empty input.
pub fn mean(a: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    sum(a) / a.len() as f64
}

/// Population variance, or `0.0` for empty input.
pub fn variance(a: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let m = mean(a);
    let mut acc = 0.0;
    for &x in a {
        let d = x - m;
        acc += d * d;
    }
    acc / a.len() as f64
}

/// Population standard deviation, or `0.0` for empty input.
pub fn std_dev(a: &[f64]) -> f64 {
    variance(a).sqrt()
}

/// Smallest element, or positive infinity for empty input. NaN elements
/// are ignored regardless of position; an all-NaN slice yields +inf.
pub fn min(a: &[f64]) -> f64 {
    let mut m = f64::INFINITY;
    for &x in a {
        if x < m {
            m = x;
        }
    }
    m
}

/// Largest element, or negative infinity for empty input. NaN elements
/// are ignored; an all-NaN slice yields -inf.
pub fn max(a: &[f64]) -> f64 {
    let mut m = f64::NEG_INFINITY;
    for &x in a {
        if x > m {
            m = x;
        }
    }
    m
}

/// Index of the smallest element, or `None` for empty input. The first of
/// equal minima wins; NaN elements are ignored, so an all-NaN slice yields
/// `Some(0)`.
pub fn min_index(a: &[f64]) -> Option<usize> {
    if a.is_empty() {
        return None;
    }
    let mut idx = 0;
    let mut m = f64::INFINITY;
    for (i, &x) in a.iter().enumerate() {
        if x < m {
            m = x;
            idx = i;
        }
    }
    Some(idx)
}

/// Index of the largest element, or `None` for empty input. The first of
/// equal maxima wins; NaN elements are ignored, so an all-NaN slice yields
/// `Some(0)`.
pub fn max_index(a: &[f64]) -> Option<usize> {
    if a.is_empty() {
        return None;
    }
    let mut idx = 0;
    let mut m = f64::NEG_INFINITY;
    for (i, &x) in a.iter().enumerate() {
        if x > m {
            m = x;
            idx = i;
        }
    }
    Some(idx)
}

/// Dot product. Empty input yields `0.0`.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    let n = usable2(a.len(), b.len());
    let mut acc = 0.0;
    for i in 0..n {
        acc += a[i] * b[i];
    }
    acc
}

/// Dot product of one shared vector `v` against each row.
pub fn dot_batch(dst: &mut [f64], rows: &[&[f64]], v: &[f64]) {
    for (d, row) in dst.iter_mut().zip(rows) {
        *d = dot(row, v);
    }
}

/// Euclidean distance between `a` and `b`.
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    let n = usable2(a.len(), b.len());
    let mut acc = 0.0;
    for i in 0..n {
        let d = a[i] - b[i];
        acc += d * d;
    }
    acc.sqrt()
}

/// Scales `src` to unit Euclidean length into `dst`. When the magnitude is
/// below a small epsilon the input is copied through unchanged.
pub fn normalize(dst: &mut [f64], src: &[f64]) {
    let n = usable2(dst.len(), src.len());
    let mag = dot(&src[..n], &src[..n]).sqrt();
    if mag < NORM_EPSILON {
        dst[..n].copy_from_slice(&src[..n]);
    } else {
        scale(&mut dst[..n], &src[..n], 1.0 / mag);
    }
}

/// "Valid" convolution of `signal` with `kernel`. A no-op when the kernel
/// is empty or longer than the signal.
pub fn convolve_valid(dst: &mut [f64], signal: &[f64], kernel: &[f64]) {
    if kernel.is_empty() || signal.len() < kernel.len() {
        return;
    }
    let n = usable2(dst.len(), signal.len() - kernel.len() + 1);
    for (i, d) in dst[..n].iter_mut().enumerate() {
        let mut acc = 0.0;
        for (j, &k) in kernel.iter().enumerate() {
            acc += signal[i + j] * k;
        }
        *d = acc;
    }
}

/// Scaled accumulate (AXPY): `dst[i] += alpha * src[i]`.
pub fn add_scaled(dst: &mut [f64], alpha: f64, src: &[f64]) {
    let n = usable2(dst.len(), src.len());
    for i in 0..n {
        dst[i] = src[i].mul_add(alpha, dst[i]);
    }
}

/// `dst[offset + i] += src[i]`.
///
/// An empty `src` is a no-op regardless of `offset`.
///
/// # Panics
///
/// Panics when `offset + src.len()` exceeds `dst.len()`. Use
/// [`try_accumulate_add`] to get an error instead.
pub fn accumulate_add(dst: &mut [f64], src: &[f64], offset: usize) {
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
    for (d, &x) in dst[offset..].iter_mut().zip(src) {
        *d += x;
    }
}

/// Fallible [`accumulate_add`]: returns [`Error::OffsetOutOfBounds`]
/// instead of panicking.
pub fn try_accumulate_add(dst: &mut [f64], src: &[f64], offset: usize) -> Result<()> {
    if src.is_empty() {
        return Ok(());
    }
    match offset.checked_add(src.len()) {
        Some(end) if end <= dst.len() => {
            for (d, &x) in dst[offset..end].iter_mut().zip(src) {
                *d += x;
            }
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
pub fn interleave2(dst: &mut [f64], a: &[f64], b: &[f64]) {
    let pairs = usable3(dst.len() / 2, a.len(), b.len());
    for i in 0..pairs {
        dst[i * 2] = a[i];
        dst[i * 2 + 1] = b[i];
    }
}

/// Inverse of [`interleave2`]: even elements of `src` go to `a`, odd to `b`.
pub fn deinterleave2(a: &mut [f64], b: &mut [f64], src: &[f64]) {
    let pairs = usable3(a.len(), b.len(), src.len() / 2);
    for i in 0..pairs {
        a[i] = src[i * 2];
        b[i] = src[i * 2 + 1];
    }
}

/// Prefix sum: `dst[i] = src[0] + ... + src[i]`.
pub fn cumulative_sum(dst: &mut [f64], src: &[f64]) {
    let n = usable2(dst.len(), src.len());
    let mut acc = 0.0;
    for i in 0..n {
        acc += src[i];
        dst[i] = acc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn concrete_scenarios() {
        let mut dst = [0.0f64; 4];
        add(&mut dst, &[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(dst, [5.0, 5.0, 5.0, 5.0]);

        let mut dst = [0.0f64; 3];
        fma(&mut dst, &[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0], &[1.0, 1.0, 1.0]);
        assert_eq!(dst, [3.0, 5.0, 7.0]);

        let mut dst = [0.0f64; 5];
        clamp(&mut dst, &[-5.0, 0.0, 5.0, 10.0, 15.0], 0.0, 10.0);
        assert_eq!(dst, [0.0, 0.0, 5.0, 10.0, 10.0]);

        assert_eq!(distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);

        let mut dst = [0.0f64; 2];
        normalize(&mut dst, &[3.0, 4.0]);
        assert_relative_eq!(dst[0], 0.6);
        assert_relative_eq!(dst[1], 0.8);
    }

    #[test]
    fn reduction_identities() {
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(min(&[]), f64::INFINITY);
        assert_eq!(max(&[]), f64::NEG_INFINITY);
        assert_eq!(min_index(&[]), None);
        assert_eq!(max_index(&[]), None);
    }

    #[test]
    fn statistics_agree() {
        let a = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&a), 5.0);
        assert_eq!(variance(&a), 4.0);
        assert_eq!(std_dev(&a), 2.0);
    }

    #[test]
    fn length_clamping_leaves_excess_untouched() {
        let mut dst = [0.0f64, 0.0, 99.0];
        add(&mut dst, &[1.0, 2.0], &[10.0, 20.0, 30.0]);
        assert_eq!(dst, [11.0, 22.0, 99.0]);
    }

    #[test]
    fn accumulate_add_bounds() {
        let mut dst = [1.0f64; 4];
        accumulate_add(&mut dst, &[10.0, 20.0], 1);
        assert_eq!(dst, [1.0, 11.0, 21.0, 1.0]);
        assert!(try_accumulate_add(&mut dst, &[1.0, 1.0], 3).is_err());
        // offset + len wraps around usize; still an error, not a panic.
        assert!(try_accumulate_add(&mut dst, &[1.0, 1.0], usize::MAX).is_err());
    }

    #[test]
    #[should_panic(expected = "exceeds destination capacity")]
    fn accumulate_add_out_of_bounds_panics() {
        let mut dst = [0.0f64; 2];
        accumulate_add(&mut dst, &[1.0, 1.0], 1);
    }
}
