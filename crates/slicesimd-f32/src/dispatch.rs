//! Routing between the vector backend and the scalar tail.
//!
//! Same arrangement as the half-precision crate: slices arrive already
//! clamped, the aligned prefix goes to the active backend, the remainder to
//! the scalar kernels, and reductions merge the two partial results.
//! Value-dependent and sequential operations stay scalar unconditionally.

use crate::{scalar, simd};

macro_rules! map1 {
    ($name:ident) => {
        pub(crate) fn $name(dst: &mut [f32], a: &[f32]) {
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
        pub(crate) fn $name(dst: &mut [f32], a: &[f32], b: &[f32]) {
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

pub(crate) fn scale(dst: &mut [f32], a: &[f32], s: f32) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.scale(head, &a[..split], s);
    scalar::scale(tail, &a[split..], s);
}

pub(crate) fn add_scalar(dst: &mut [f32], a: &[f32], s: f32) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.add_scalar(head, &a[..split], s);
    scalar::add_scalar(tail, &a[split..], s);
}

pub(crate) fn clamp(dst: &mut [f32], a: &[f32], lo: f32, hi: f32) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.clamp(head, &a[..split], lo, hi);
    scalar::clamp(tail, &a[split..], lo, hi);
}

pub(crate) fn fma(dst: &mut [f32], a: &[f32], b: &[f32], c: &[f32]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.fma(head, &a[..split], &b[..split], &c[..split]);
    scalar::fma(tail, &a[split..], &b[split..], &c[split..]);
}

pub(crate) fn axpy(dst: &mut [f32], alpha: f32, s: &[f32]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.axpy(head, alpha, &s[..split]);
    scalar::axpy(tail, alpha, &s[split..]);
}

pub(crate) fn accumulate_add(dst: &mut [f32], src: &[f32]) {
    let k = simd::active();
    let split = simd::aligned_len(dst.len(), k.width());
    let (head, tail) = dst.split_at_mut(split);
    k.accumulate_add(head, &src[..split]);
    scalar::accumulate_add(tail, &src[split..]);
}

pub(crate) fn sum(a: &[f32]) -> f32 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    k.sum(&a[..split]) + scalar::sum(&a[split..])
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    k.dot(&a[..split], &b[..split]) + scalar::dot(&a[split..], &b[split..])
}

/// `a` must be non-empty.
pub(crate) fn min(a: &[f32]) -> f32 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    if split == 0 {
        return scalar::min(a);
    }
    let mut best = k.min(&a[..split]);
    if split < a.len() {
        let tail = scalar::min(&a[split..]);
        if tail < best {
            best = tail;
        }
    }
    best
}

/// `a` must be non-empty.
pub(crate) fn max(a: &[f32]) -> f32 {
    let k = simd::active();
    let split = simd::aligned_len(a.len(), k.width());
    if split == 0 {
        return scalar::max(a);
    }
    let mut best = k.max(&a[..split]);
    if split < a.len() {
        let tail = scalar::max(&a[split..]);
        if tail > best {
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

    #[test]
    fn tail_elements_are_processed() {
        let a: Vec<f32> = (1..=11).map(|i| i as f32).collect();
        let b: Vec<f32> = (1..=11).map(|i| 12.0 - i as f32).collect();
        let mut dst = vec![0.0f32; 11];
        add(&mut dst, &a, &b);
        for &d in &dst {
            assert_eq!(d, 12.0);
        }
    }

    #[test]
    fn reduction_merges_partials() {
        let a: Vec<f32> = (1..=11).map(|i| i as f32).collect();
        assert_eq!(sum(&a), 66.0);
        assert_eq!(min(&a), 1.0);
        assert_eq!(max(&a), 11.0);
    }

    #[test]
    fn extremum_in_tail_wins() {
        let mut vals = vec![5.0f32; 11];
        vals[10] = -7.0;
        assert_eq!(min(&vals), -7.0);
        vals[10] = 99.0;
        assert_eq!(max(&vals), 99.0);
    }
}
