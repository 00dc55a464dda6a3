//! Smoke test across the re-exported workspace surface.

use approx::assert_relative_eq;
use slicesimd::F16;

#[test]
fn precisions_expose_the_same_catalogue() {
    let data = [1.0f32, 2.0, 3.0, 4.0];

    let halves: Vec<F16> = data.iter().map(|&v| F16::from_f32(v)).collect();
    let singles = data;
    let doubles: Vec<f64> = data.iter().map(|&v| v as f64).collect();

    assert_eq!(slicesimd::f16::sum(&halves), 10.0);
    assert_eq!(slicesimd::f32::sum(&singles), 10.0);
    assert_eq!(slicesimd::f64::sum(&doubles), 10.0);

    assert_relative_eq!(slicesimd::f16::mean(&halves), 2.5);
    assert_relative_eq!(slicesimd::f32::mean(&singles), 2.5);
    assert_relative_eq!(slicesimd::f64::mean(&doubles), 2.5);
}

#[test]
fn capability_summary_names_the_host_arch() {
    let s = slicesimd::cpu::summary();
    assert!(!s.is_empty());
    // The accessor is cached; a second call must agree.
    assert_eq!(slicesimd::cpu::summary(), s);
}
