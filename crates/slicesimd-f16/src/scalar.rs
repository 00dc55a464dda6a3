//! Portable reference kernels.
//!
//! Every operation exists here in a plain scalar form: this is both the
//! fallback path for hardware without a vector backend and the ground truth
//! the vectorized kernels are tested against. All arithmetic widens to
//! `f32` per element; reductions keep an `f32` accumulator and only the
//! final stored value is narrowed.
//!
//! Callers (the dispatch layer) have already clamped all slices to the
//! usable length, so these loops iterate over lock-step zips without
//! further length checks.

use crate::F16;

pub(crate) fn decode_slice(dst: &mut [f32], src: &[F16]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s.to_f32();
    }
}

pub(crate) fn encode_slice(dst: &mut [F16], src: &[f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = F16::from_f32(s);
    }
}

pub(crate) fn add(dst: &mut [F16], a: &[F16], b: &[F16]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = F16::from_f32(x.to_f32() + y.to_f32());
    }
}

pub(crate) fn sub(dst: &mut [F16], a: &[F16], b: &[F16]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = F16::from_f32(x.to_f32() - y.to_f32());
    }
}

pub(crate) fn mul(dst: &mut [F16], a: &[F16], b: &[F16]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = F16::from_f32(x.to_f32() * y.to_f32());
    }
}

pub(crate) fn div(dst: &mut [F16], a: &[F16], b: &[F16]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = F16::from_f32(x.to_f32() / y.to_f32());
    }
}

pub(crate) fn scale(dst: &mut [F16], a: &[F16], s: f32) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = F16::from_f32(x.to_f32() * s);
    }
}

pub(crate) fn add_scalar(dst: &mut [F16], a: &[F16], s: f32) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = F16::from_f32(x.to_f32() + s);
    }
}

// fma and axpy use a fused multiply-add so the intermediate product is not
// rounded, matching the vector backends bit for bit.

pub(crate) fn fma(dst: &mut [F16], a: &[F16], b: &[F16], c: &[F16]) {
    for (((d, &x), &y), &z) in dst.iter_mut().zip(a).zip(b).zip(c) {
        *d = F16::from_f32(x.to_f32().mul_add(y.to_f32(), z.to_f32()));
    }
}

/// `dst[i] += alpha * s[i]` (AXPY).
pub(crate) fn axpy(dst: &mut [F16], alpha: f32, s: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(s) {
        *d = F16::from_f32(x.to_f32().mul_add(alpha, d.to_f32()));
    }
}

pub(crate) fn accumulate_add(dst: &mut [F16], src: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = F16::from_f32(d.to_f32() + x.to_f32());
    }
}

// abs, neg and relu are pure sign-bit manipulations; no widening needed.

pub(crate) fn abs(dst: &mut [F16], a: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = F16::from_bits(x.to_bits() & 0x7FFF);
    }
}

pub(crate) fn neg(dst: &mut [F16], a: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = F16::from_bits(x.to_bits() ^ 0x8000);
    }
}

pub(crate) fn relu(dst: &mut [F16], src: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = if x.is_sign_negative() { F16::ZERO } else { x };
    }
}

pub(crate) fn sigmoid(dst: &mut [F16], src: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        let v = x.to_f32();
        *d = F16::from_f32(1.0 / (1.0 + (-v).exp()));
    }
}

pub(crate) fn tanh(dst: &mut [F16], src: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = F16::from_f32(x.to_f32().tanh());
    }
}

pub(crate) fn exp(dst: &mut [F16], src: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = F16::from_f32(x.to_f32().exp());
    }
}

pub(crate) fn sqrt(dst: &mut [F16], a: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = F16::from_f32(x.to_f32().sqrt());
    }
}

pub(crate) fn recip(dst: &mut [F16], a: &[F16]) {
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = F16::from_f32(1.0 / x.to_f32());
    }
}

pub(crate) fn clamp(dst: &mut [F16], a: &[F16], lo: f32, hi: f32) {
    for (d, &x) in dst.iter_mut().zip(a) {
        let mut v = x.to_f32();
        if v < lo {
            v = lo;
        } else if v > hi {
            v = hi;
        }
        *d = F16::from_f32(v);
    }
}

/// Fused clamp-then-affine-rescale: `dst[i] = (clamp(src[i], lo, hi) - lo) * scale`.
pub(crate) fn clamp_scale(dst: &mut [F16], src: &[F16], lo: f32, hi: f32, scale: f32) {
    for (d, &x) in dst.iter_mut().zip(src) {
        let mut v = x.to_f32();
        if v < lo {
            v = lo;
        } else if v > hi {
            v = hi;
        }
        *d = F16::from_f32((v - lo) * scale);
    }
}

pub(crate) fn sum(a: &[F16]) -> f32 {
    let mut acc = 0.0f32;
    for &x in a {
        acc += x.to_f32();
    }
    acc
}

pub(crate) fn dot(a: &[F16], b: &[F16]) -> f32 {
    let mut acc = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        acc += x.to_f32() * y.to_f32();
    }
    acc
}

/// Minimum by decoded value. NaN elements are ignored regardless of
/// position; an all-NaN slice yields the empty-input identity, +inf.
pub(crate) fn min(a: &[F16]) -> F16 {
    let mut best = F16::INFINITY;
    let mut best_f = f32::INFINITY;
    for &x in a {
        let f = x.to_f32();
        if f < best_f {
            best_f = f;
            best = x;
        }
    }
    best
}

/// Maximum by decoded value. NaN elements are ignored; an all-NaN slice
/// yields -inf.
pub(crate) fn max(a: &[F16]) -> F16 {
    let mut best = F16::NEG_INFINITY;
    let mut best_f = f32::NEG_INFINITY;
    for &x in a {
        let f = x.to_f32();
        if f > best_f {
            best_f = f;
            best = x;
        }
    }
    best
}

/// Index of the minimum; the first of equal minima wins. NaN elements are
/// ignored; an all-NaN slice yields index 0.
pub(crate) fn min_index(a: &[F16]) -> usize {
    let mut idx = 0;
    let mut best = f32::INFINITY;
    for (i, &x) in a.iter().enumerate() {
        let f = x.to_f32();
        if f < best {
            best = f;
            idx = i;
        }
    }
    idx
}

/// Index of the maximum; the first of equal maxima wins. NaN elements are
/// ignored; an all-NaN slice yields index 0.
pub(crate) fn max_index(a: &[F16]) -> usize {
    let mut idx = 0;
    let mut best = f32::NEG_INFINITY;
    for (i, &x) in a.iter().enumerate() {
        let f = x.to_f32();
        if f > best {
            best = f;
            idx = i;
        }
    }
    idx
}

pub(crate) fn euclidean_distance(a: &[F16], b: &[F16]) -> f32 {
    let mut acc = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        let d = x.to_f32() - y.to_f32();
        acc += d * d;
    }
    acc.sqrt()
}

/// Population variance around a precomputed mean.
pub(crate) fn variance(a: &[F16], mean: f32) -> f32 {
    let mut acc = 0.0f32;
    for &x in a {
        let d = x.to_f32() - mean;
        acc += d * d;
    }
    acc / a.len() as f32
}

pub(crate) fn cumulative_sum(dst: &mut [F16], a: &[F16]) {
    let mut acc = 0.0f32;
    for (d, &x) in dst.iter_mut().zip(a) {
        acc += x.to_f32();
        *d = F16::from_f32(acc);
    }
}

/// "Valid" convolution; `signal` must cover `dst.len() + kernel.len() - 1`
/// elements. Each output accumulates in f32.
pub(crate) fn convolve_valid(dst: &mut [F16], signal: &[F16], kernel: &[F16]) {
    for (i, d) in dst.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (j, &k) in kernel.iter().enumerate() {
            acc += signal[i + j].to_f32() * k.to_f32();
        }
        *d = F16::from_f32(acc);
    }
}

pub(crate) fn interleave2(dst: &mut [F16], a: &[F16], b: &[F16]) {
    for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
        dst[i * 2] = x;
        dst[i * 2 + 1] = y;
    }
}

pub(crate) fn deinterleave2(a: &mut [F16], b: &mut [F16], src: &[F16]) {
    for (i, (x, y)) in a.iter_mut().zip(b.iter_mut()).enumerate() {
        *x = src[i * 2];
        *y = src[i * 2 + 1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(vals: &[f32]) -> Vec<F16> {
        vals.iter().map(|&v| F16::from_f32(v)).collect()
    }

    fn f(vals: &[F16]) -> Vec<f32> {
        vals.iter().map(|v| v.to_f32()).collect()
    }

    #[test]
    fn sign_bit_ops() {
        let a = h(&[-5.0, 0.0, 3.0]);
        let mut dst = vec![F16::ZERO; 3];
        abs(&mut dst, &a);
        assert_eq!(f(&dst), vec![5.0, 0.0, 3.0]);
        neg(&mut dst, &a);
        assert_eq!(f(&dst), vec![5.0, 0.0, -3.0]);
        // -0.0 negates to +0.0 and relu maps it to +0.0.
        let z = [F16::NEG_ZERO];
        let mut d = [F16::ONE];
        neg(&mut d, &z);
        assert_eq!(d[0], F16::ZERO);
        relu(&mut d, &z);
        assert_eq!(d[0], F16::ZERO);
    }

    #[test]
    fn reductions_track_first_extremum() {
        let a = h(&[2.0, 1.0, 1.0, 4.0, 4.0]);
        assert_eq!(min_index(&a), 1);
        assert_eq!(max_index(&a), 3);
        assert_eq!(min(&a).to_f32(), 1.0);
        assert_eq!(max(&a).to_f32(), 4.0);
    }

    #[test]
    fn nan_does_not_displace_numbers() {
        let a = [F16::ONE, F16::NAN, F16::NEG_ONE];
        assert_eq!(min(&a).to_f32(), -1.0);
        assert_eq!(max(&a).to_f32(), 1.0);
        // A leading NaN is ignored too, not carried as the running extremum.
        let b = [F16::NAN, F16::ONE, F16::NEG_ONE];
        assert_eq!(min(&b).to_f32(), -1.0);
        assert_eq!(max(&b).to_f32(), 1.0);
        assert_eq!(min_index(&b), 2);
        assert_eq!(max_index(&b), 1);
        // All-NaN collapses to the empty-input identities.
        let n = [F16::NAN; 3];
        assert_eq!(min(&n), F16::INFINITY);
        assert_eq!(max(&n), F16::NEG_INFINITY);
    }

    #[test]
    fn cumulative_sum_accumulates_wide() {
        // 1 + 1 + ... in f16 would stall at 2048 (the next integer is not
        // representable); the f32 accumulator must not.
        let a = vec![F16::ONE; 3000];
        let mut dst = vec![F16::ZERO; 3000];
        cumulative_sum(&mut dst, &a);
        let last = dst[2999].to_f32();
        assert!((last - 3000.0).abs() / 3000.0 < 0.01, "got {last}");
    }

    #[test]
    fn convolve_identity_kernel() {
        let signal = h(&[1.0, 2.0, 3.0, 4.0]);
        let kernel = h(&[1.0]);
        let mut dst = vec![F16::ZERO; 4];
        convolve_valid(&mut dst, &signal, &kernel);
        assert_eq!(f(&dst), vec![1.0, 2.0, 3.0, 4.0]);
    }
}
