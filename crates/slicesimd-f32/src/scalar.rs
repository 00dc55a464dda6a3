//! Portable reference kernels.
//!
//! The fallback path for hardware without a vector backend and the ground
//! truth the vectorized kernels are tested against. Callers (the dispatch
//! layer) have already clamped all slices to the usable length.

/// Sigmoid saturates within f32 precision beyond this magnitude.
pub(crate) const SIGMOID_CLAMP: f32 = 20.0;
/// The rational tanh approximation is used inside this band; outside it the
/// result is snapped to the asymptote.
pub(crate) const TANH_CLAMP: f32 = 2.5;
/// exp(88) is near f32::MAX; larger inputs saturate, smaller than -88
/// flush to zero.
pub(crate) const EXP_CLAMP: f32 = 88.0;

pub(crate) fn add(dst: &mut [f32], a: &[f32], b: &[f32]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x + y;
    }
}

pub(crate) fn sub(dst: &mut [f32], a: &[f32], b: &[f32]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x - y;
    }
}

pub(crate) fn mul(dst: &mut [f32], a: &[f32], b: &[f32]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x * y;
    }
}

pub(crate) fn div(dst: &mut [f32], a: &[f32], b: &[f32]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x / y;
    }
}

pub(crate) fn scale(dst: &mut [f32], a: &[f32], s: f32) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = x * s;
    }
}

pub(crate) fn add_scalar(dst: &mut [f32], a: &[f32], s: f32) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = x + s;
    }
}

// fma and axpy use a fused multiply-add so the intermediate product is not
// rounded, matching the vector backends bit for bit.

pub(crate) fn fma(dst: &mut [f32], a: &[f32], b: &[f32], c: &[f32]) {
    for (((d, &x), &y), &z) in dst.iter_mut().zip(a).zip(b).zip(c) {
        *d = x.mul_add(y, z);
    }
}

/// `dst[i] += alpha * s[i]` (AXPY).
pub(crate) fn axpy(dst: &mut [f32], alpha: f32, s: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(s) {
        *d = x.mul_add(alpha, *d);
    }
}

pub(crate) fn accumulate_add(dst: &mut [f32], src: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d += x;
    }
}

pub(crate) fn abs(dst: &mut [f32], a: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = x.abs();
    }
}

pub(crate) fn neg(dst: &mut [f32], a: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = -x;
    }
}

/// `max(x, 0)`; NaN and both zeros map to `0.0`.
pub(crate) fn relu(dst: &mut [f32], src: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = if x > 0.0 { x } else { 0.0 };
    }
}

pub(crate) fn sigmoid(dst: &mut [f32], src: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = if x > SIGMOID_CLAMP {
            1.0
        } else if x < -SIGMOID_CLAMP {
            0.0
        } else {
            1.0 / (1.0 + (-x).exp())
        };
    }
}

/// Fast rational approximation `x / (1 + |x|)`, snapped to the asymptotes
/// outside the clamp band. Cheap and monotonic, but only a few percent
/// accurate near the band edges.
pub(crate) fn tanh(dst: &mut [f32], src: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = if x > TANH_CLAMP {
            1.0
        } else if x < -TANH_CLAMP {
            -1.0
        } else {
            x / (1.0 + x.abs())
        };
    }
}

pub(crate) fn exp(dst: &mut [f32], src: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = if x > EXP_CLAMP {
            EXP_CLAMP.exp()
        } else if x < -EXP_CLAMP {
            0.0
        } else {
            x.exp()
        };
    }
}

pub(crate) fn sqrt(dst: &mut [f32], a: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = x.sqrt();
    }
}

pub(crate) fn recip(dst: &mut [f32], a: &[f32]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = 1.0 / x;
    }
}

pub(crate) fn clamp(dst: &mut [f32], a: &[f32], lo: f32, hi: f32) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = if x < lo {
            lo
        } else if x > hi {
            hi
        } else {
            x
        };
    }
}

/// Fused clamp-then-affine-rescale: `dst[i] = (clamp(src[i], lo, hi) - lo) * scale`.
pub(crate) fn clamp_scale(dst: &mut [f32], src: &[f32], lo: f32, hi: f32, scale: f32) {
    for (d, &x) in dst.iter_mut().zip(src) {
        let v = if x < lo {
            lo
        } else if x > hi {
            hi
        } else {
            x
        };
        *d = (v - lo) * scale;
    }
}

pub(crate) fn sum(a: &[f32]) -> f32 {
    let mut acc = 0.0f32;
    for &x in a {
        acc += x;
    }
    acc
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        acc += x * y;
    }
    acc
}

/// NaN elements are ignored regardless of position; an all-NaN slice
/// yields the empty-input identity, +inf.
pub(crate) fn min(a: &[f32]) -> f32 {
    let mut m = f32::INFINITY;
    for &x in a {
        if x < m {
            m = x;
        }
    }
    m
}

/// NaN elements are ignored; an all-NaN slice yields -inf.
pub(crate) fn max(a: &[f32]) -> f32 {
    let mut m = f32::NEG_INFINITY;
    for &x in a {
        if x > m {
            m = x;
        }
    }
    m
}

/// The first of equal minima wins. NaN elements are ignored; an all-NaN
/// slice yields index 0.
pub(crate) fn min_index(a: &[f32]) -> usize {
    let mut idx = 0;
    let mut m = f32::INFINITY;
    for (i, &x) in a.iter().enumerate() {
        if x < m {
            m = x;
            idx = i;
        }
    }
    idx
}

/// The first of equal maxima wins. NaN elements are ignored; an all-NaN
/// slice yields index 0.
pub(crate) fn max_index(a: &[f32]) -> usize {
    let mut idx = 0;
    let mut m = f32::NEG_INFINITY;
    for (i, &x) in a.iter().enumerate() {
        if x > m {
            m = x;
            idx = i;
        }
    }
    idx
}

pub(crate) fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        let d = x - y;
        acc += d * d;
    }
    acc.sqrt()
}

/// Population variance around a precomputed mean.
pub(crate) fn variance(a: &[f32], mean: f32) -> f32 {
    let mut acc = 0.0f32;
    for &x in a {
        let d = x - mean;
        acc += d * d;
    }
    acc / a.len() as f32
}

pub(crate) fn cumulative_sum(dst: &mut [f32], a: &[f32]) {
    let mut acc = 0.0f32;
    for (d, &x) in dst.iter_mut().zip(a) {
        acc += x;
        *d = acc;
    }
}

/// "Valid" convolution; `signal` must cover `dst.len() + kernel.len() - 1`
/// elements.
pub(crate) fn convolve_valid(dst: &mut [f32], signal: &[f32], kernel: &[f32]) {
    for (i, d) in dst.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (j, &k) in kernel.iter().enumerate() {
            acc += signal[i + j] * k;
        }
        *d = acc;
    }
}

pub(crate) fn interleave2(dst: &mut [f32], a: &[f32], b: &[f32]) {
    for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
        dst[i * 2] = x;
        dst[i * 2 + 1] = y;
    }
}

pub(crate) fn deinterleave2(a: &mut [f32], b: &mut [f32], src: &[f32]) {
    for (i, (x, y)) in a.iter_mut().zip(b.iter_mut()).enumerate() {
        *x = src[i * 2];
        *y = src[i * 2 + 1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn relu_zeroes_nan_and_negatives() {
        let src = [f32::NAN, -0.0, -3.0, 2.0];
        let mut dst = [1.0f32; 4];
        relu(&mut dst, &src);
        assert_eq!(dst, [0.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn activation_clamps_saturate() {
        let src = [25.0, -25.0, 3.0, -3.0, 90.0, -90.0];
        let mut dst = [0.0f32; 6];
        sigmoid(&mut dst, &src);
        assert_eq!(dst[0], 1.0);
        assert_eq!(dst[1], 0.0);
        tanh(&mut dst, &src);
        assert_eq!(dst[2], 1.0);
        assert_eq!(dst[3], -1.0);
        exp(&mut dst, &src);
        assert_eq!(dst[4], EXP_CLAMP.exp());
        assert_eq!(dst[5], 0.0);
    }

    #[test]
    fn tanh_approximation_in_band() {
        let src = [0.0, 1.0];
        let mut dst = [9.0f32; 2];
        tanh(&mut dst, &src);
        assert_eq!(dst[0], 0.0);
        // x / (1 + |x|), not the true tanh.
        assert_abs_diff_eq!(dst[1], 0.5);
    }

    #[test]
    fn first_extremum_wins() {
        let a = [2.0, 1.0, 1.0, 4.0, 4.0];
        assert_eq!(min_index(&a), 1);
        assert_eq!(max_index(&a), 3);
    }

    #[test]
    fn nan_does_not_displace_numbers() {
        let a = [1.0, f32::NAN, -1.0];
        assert_eq!(min(&a), -1.0);
        assert_eq!(max(&a), 1.0);
        // A leading NaN is ignored too, not carried as the running extremum.
        let b = [f32::NAN, 1.0, -1.0];
        assert_eq!(min(&b), -1.0);
        assert_eq!(max(&b), 1.0);
        assert_eq!(min_index(&b), 2);
        assert_eq!(max_index(&b), 1);
        // All-NaN collapses to the empty-input identities.
        let n = [f32::NAN; 3];
        assert_eq!(min(&n), f32::INFINITY);
        assert_eq!(max(&n), f32::NEG_INFINITY);
    }
}
