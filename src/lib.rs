//! Capability-gated SIMD slice math for half, single and double precision.
//!
//! This crate re-exports the workspace members under short module names,
//! mirroring how the operations are organized per precision:
//!
//! - [`cpu`]: one-time CPU feature detection and the capability accessor
//! - [`f16`]: half-precision codec and kernel library (the accelerated core)
//! - [`f32`]: single-precision kernel library
//! - [`f64`]: double-precision scalar reference kernels
//!
//! # Example
//!
//! ```
//! use slicesimd::f16::F16;
//!
//! let a: Vec<F16> = [1.0, 2.0, 3.0, 4.0].iter().map(|&v| F16::from_f32(v)).collect();
//! let b: Vec<F16> = [4.0, 3.0, 2.0, 1.0].iter().map(|&v| F16::from_f32(v)).collect();
//! let mut dst = vec![F16::ZERO; 4];
//!
//! slicesimd::f16::add(&mut dst, &a, &b);
//! assert!(dst.iter().all(|&v| v.to_f32() == 5.0));
//!
//! println!("running on: {}", slicesimd::cpu::summary());
//! ```

pub use slicesimd_cpu as cpu;
pub use slicesimd_f16 as f16;
pub use slicesimd_f32 as f32;
pub use slicesimd_f64 as f64;

pub use slicesimd_cpu::{capabilities, CapabilitySet, Error, Result};
pub use slicesimd_f16::F16;
