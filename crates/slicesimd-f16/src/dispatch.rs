//! Routing between the vector backend and the scalar tail.
//!
//! Every function here takes slices already clamped to a common usable
//! length by the public API. The aligned prefix `[0, aligned)` goes to the
//! active backend, the remainder to the scalar kernels; with the scalar
//! backend (width 1) the prefix covers everything and the tail is empty.
//!
//! Reductions merge the two partial results: sums add, extrema compare.
//!
//! Value-dependent and sequential operations (index searches, cumulative
//! sum, convolution, the transcendental activations, interleaving) stay on
//! the scalar path unconditionally; a lane-parallel version would either
//! change results or need cross-lane state that costs more than it saves.
//! The wrappers for those live here anyway so the public API has a single
//! place to call.

use crate::{scalar, simd, F16};

macro_rules! map1 {
    ($name:ident) => {
        pub(crate) fn $name(dst: &mut [F16], a: &[F16]) {
            let k = simd::active();
            let split = simd::aligned_len(dst.len(), k.width());
            let (head, tail) = dst.split_at_mut(split);
            k.$name(head, &a[..split]);
            scalar::$name(tail, &a[split..]);
        }
    };
}

macro_rules! map2 {
    ($name:ident) => {
        pub(crate) fn $name(dst: &mut [F16], a: &[F16], b: &[F16]) {
            let k = simd::active();
            let split = simd::aligned_len(dst.len(), k.width());
            let (head, tail) = dst.split_at_mut(split);
            k.$name(head, &a[..split], &b[..split]);
            scalar::$name(tail, &a[split..], &b[split..]);
        }
    };
}

map2!(add);
map2!(sub);
map2!(mul);
map2!(div);

map1!(abs);
map1!(neg);
map1!(relu);
map1!(sqrt);
map1!(recip);

pub(crate) fn decode_slice(dst: &mut [f32], src: &[F16]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.decode_slice(head, &src[..split]);
    scalar::decode_slice(tail, &src[split..]);
}

pub(crate) fn encode_slice(dst: &mut [F16], src: &[f32]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.encode_slice(head, &src[..split]);
    scalar::encode_slice(tail, &src[split..]);
}

pub(crate) fn scale(dst: &mut [F16], a: &[F16], s: f32) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.scale(head, &a[..split], s);
    scalar::scale(tail, &a[split..], s);
}

pub(crate) fn add_scalar(dst: &mut [F16], a: &[F16], s: f32) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.add_scalar(head, &a[..split], s);
    scalar::add_scalar(tail, &a[split..], s);
}

pub(crate) fn clamp(dst: &mut [F16], a: &[F16], lo: f32, hi: f32) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.clamp(head, &a[..split], lo, hi);
    scalar::clamp(tail, &a[split..], lo, hi);
}

pub(crate) fn fma(dst: &mut [F16], a: &[F16], b: &[F16], c: &[F16]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.fma(head, &a[..split], &b[..split], &c[..split]);
    scalar::fma(tail, &a[split..], &b[split..], &c[split..]);
}

pub(crate) fn axpy(dst: &mut [F16], alpha: f32, s: &[F16]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.axpy(head, alpha, &s[..split]);
    scalar::axpy(tail, alpha, &s[split..]);
}

pub(crate) fn accumulate_add(dst: &mut [F16], src: &[F16]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.accumulate_add(head, &src[..split]);
    scalar::accumulate_add(tail, &src[split..]);
}

pub(crate) fn sum(a: &[F16]) -> f32 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    k.sum(&a[..split]) + scalar::sum(&a[split..])
}

pub(crate) fn dot(a: &[F16], b: &[F16]) -> f32 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    k.dot(&a[..split], &b[..split]) + scalar::dot(&a[split..], &b[split..])
}

/// `a` must be non-empty.
pub(crate) fn min(a: &[F16]) -> F16 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    if split == 0 {
        return scalar::min(a);
    }
    let mut best = k.min(&a[..split]);
    if split < a.len() {
        let tail = scalar::min(&a[split..]);
        if tail.to_f32() < best.to_f32() {
            best = tail;
        }
    }
    best
}

/// `a` must be non-empty.
pub(crate) fn max(a: &[F16]) -> F16 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    if split == 0 {
        return scalar::max(a);
    }
    let mut best = k.max(&a[..split]);
    if split < a.len() {
        let tail = scalar::max(&a[split..]);
        if tail.to_f32() > best.to_f32() {
            best = tail;
        }
    }
    best
}

// Scalar-path operations.

pub(crate) use crate::scalar::{
    clamp_scale, convolve_valid, cumulative_sum, deinterleave2, euclidean_distance, exp,
    interleave2, max_index, min_index, sigmoid, tanh, variance,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn h(vals: &[f32]) -> Vec<F16> {
        vals.iter().map(|&v| F16::from_f32(v)).collect()
    }

    #[test]
    fn tail_elements_are_processed() {
        // 11 elements: with an 8-wide backend the last 3 go down the scalar
        // path; with the scalar backend everything does. Either way the
        // results are the same.
        let a = h(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        let b = h(&[11.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let mut dst = vec![F16::ZERO; 11];
        add(&mut dst, &a, &b);
        for &d in &dst {
            assert_eq!(d.to_f32(), 12.0);
        }
    }

    #[test]
    fn reduction_merges_partials() {
        let a: Vec<F16> = (1..=11).map(|i| F16::from_f32(i as f32)).collect();
        assert_eq!(sum(&a), 66.0);
        assert_eq!(min(&a).to_f32(), 1.0);
        assert_eq!(max(&a).to_f32(), 11.0);
    }

    #[test]
    fn extremum_in_tail_wins() {
        let mut vals = vec![5.0f32; 11];
        vals[10] = -7.0;
        let a = h(&vals);
        assert_eq!(min(&a).to_f32(), -7.0);
        vals[10] = 99.0;
        let a = h(&vals);
        assert_eq!(max(&a).to_f32(), 99.0);
    }
}
