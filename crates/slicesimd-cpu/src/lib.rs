//! One-time CPU capability detection for the slicesimd kernel crates.
//!
//! The kernel crates decide per call whether to route work through a
//! vectorized backend or the portable scalar path. That decision reads the
//! process-wide [`capabilities`] accessor, which is populated exactly once
//! from the live CPU and is lock-free to read afterwards.
//!
//! Detection is conservative: anything the host cannot confirm is reported
//! as absent, so an inconclusive probe degrades to the scalar path rather
//! than assuming acceleration.
//!
//! [`set_capabilities`] exists so tests can force a particular routing
//! decision; production code should never call it.

pub mod error;

pub use error::{Error, Result};

use bitflags::bitflags;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Once;

bitflags! {
    /// CPU features relevant to kernel dispatch.
    ///
    /// The x86-64 and aarch64 flags occupy disjoint bit ranges; a process
    /// only ever observes the flags of the architecture it runs on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapabilitySet: u32 {
        // x86-64
        const SSE2 = 1 << 0;
        const AVX2 = 1 << 1;
        const FMA = 1 << 2;
        const F16C = 1 << 3;
        const AVX512F = 1 << 4;
        // aarch64
        const NEON = 1 << 8;
        const FP16 = 1 << 9;
        const SVE = 1 << 10;
        const SVE2 = 1 << 11;
    }
}

/// Query the live CPU. Pure and side-effect free; most callers want the
/// cached [`capabilities`] instead.
pub fn detect() -> CapabilitySet {
    #[allow(unused_mut)]
    let mut caps = CapabilitySet::empty();

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse2") {
            caps |= CapabilitySet::SSE2;
        }
        if is_x86_feature_detected!("avx2") {
            caps |= CapabilitySet::AVX2;
        }
        if is_x86_feature_detected!("fma") {
            caps |= CapabilitySet::FMA;
        }
        if is_x86_feature_detected!("f16c") {
            caps |= CapabilitySet::F16C;
        }
        if is_x86_feature_detected!("avx512f") {
            caps |= CapabilitySet::AVX512F;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        use std::arch::is_aarch64_feature_detected;
        if is_aarch64_feature_detected!("neon") {
            caps |= CapabilitySet::NEON;
        }
        if is_aarch64_feature_detected!("fp16") {
            caps |= CapabilitySet::FP16;
        }
        if is_aarch64_feature_detected!("sve") {
            caps |= CapabilitySet::SVE;
        }
        if is_aarch64_feature_detected!("sve2") {
            caps |= CapabilitySet::SVE2;
        }
    }

    caps
}

static INIT: Once = Once::new();
static CAPS: AtomicU32 = AtomicU32::new(0);

/// Process-wide capability flags.
///
/// Initialized from [`detect`] on first use; subsequent calls are a single
/// atomic load. Safe to call from any number of threads.
pub fn capabilities() -> CapabilitySet {
    INIT.call_once(|| {
        let caps = detect();
        CAPS.store(caps.bits(), Ordering::Relaxed);
        log::debug!("detected {}", summary_for(std::env::consts::ARCH, caps));
    });
    CapabilitySet::from_bits_truncate(CAPS.load(Ordering::Relaxed))
}

/// Override the process-wide capability flags, returning the previous value.
///
/// Intended for tests that need to force a dispatch route (e.g. comparing
/// the vectorized and scalar paths). Callers must restore the returned
/// value, and must serialize their own override-and-restore sequences; the
/// kernel crates re-read [`capabilities`] on every operation, so overrides
/// take effect immediately.
pub fn set_capabilities(caps: CapabilitySet) -> CapabilitySet {
    // Complete one-time init first so a later capabilities() call cannot
    // clobber the override.
    capabilities();
    CapabilitySet::from_bits_truncate(CAPS.swap(caps.bits(), Ordering::Relaxed))
}

/// Human-readable summary of the best detected feature, for diagnostics
/// only. Kernel routing never consults this string.
pub fn summary() -> String {
    summary_for(std::env::consts::ARCH, capabilities())
}

/// Rank `caps` for the given architecture name, most capable feature first.
pub fn summary_for(arch: &str, caps: CapabilitySet) -> String {
    match arch {
        "aarch64" => {
            if caps.contains(CapabilitySet::SVE2) {
                "ARM64 SVE2".to_string()
            } else if caps.contains(CapabilitySet::SVE) {
                "ARM64 SVE".to_string()
            } else if caps.contains(CapabilitySet::NEON | CapabilitySet::FP16) {
                "ARM64 NEON+FP16".to_string()
            } else if caps.contains(CapabilitySet::NEON) {
                "ARM64 NEON".to_string()
            } else {
                "ARM64 (no SIMD)".to_string()
            }
        }
        "x86_64" => {
            if caps.contains(CapabilitySet::AVX512F) {
                "x86-64 AVX-512F".to_string()
            } else if caps.contains(CapabilitySet::AVX2 | CapabilitySet::F16C) {
                "x86-64 AVX2+F16C".to_string()
            } else if caps.contains(CapabilitySet::AVX2) {
                "x86-64 AVX2".to_string()
            } else if caps.contains(CapabilitySet::SSE2) {
                "x86-64 SSE2".to_string()
            } else {
                "x86-64 (no SIMD)".to_string()
            }
        }
        other => format!("{other} (no SIMD)"),
    }
}
