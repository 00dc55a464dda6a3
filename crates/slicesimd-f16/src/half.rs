//! The 16-bit storage type.
//!
//! `F16` is a bit pattern, not an arithmetic type: every operation in this
//! crate widens to `f32`, computes there, and narrows the final result back.
//! Every possible pattern (including all NaN payloads) is a valid value.

use crate::codec;
use bytemuck::{Pod, Zeroable};

/// An IEEE 754 binary16 value: 1 sign bit, 5 exponent bits (bias 15),
/// 10 mantissa bits.
///
/// Equality and hashing are on the bit pattern, so `F16::ZERO !=
/// F16::NEG_ZERO` and NaN patterns compare equal to themselves. Use
/// [`to_f32`](F16::to_f32) for numeric comparison.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct F16(u16);

impl F16 {
    /// Positive zero.
    pub const ZERO: F16 = F16(0x0000);
    /// Negative zero.
    pub const NEG_ZERO: F16 = F16(0x8000);
    /// 1.0
    pub const ONE: F16 = F16(0x3C00);
    /// -1.0
    pub const NEG_ONE: F16 = F16(0xBC00);
    /// Positive infinity.
    pub const INFINITY: F16 = F16(0x7C00);
    /// Negative infinity.
    pub const NEG_INFINITY: F16 = F16(0xFC00);
    /// A quiet NaN.
    pub const NAN: F16 = F16(0x7E00);
    /// Largest finite value, 65504.
    pub const MAX: F16 = F16(0x7BFF);
    /// Smallest finite value, -65504.
    pub const MIN: F16 = F16(0xFBFF);
    /// Smallest positive normal value, 2^-14.
    pub const MIN_POSITIVE: F16 = F16(0x0400);
    /// Smallest positive subnormal value, 2^-24.
    pub const MIN_POSITIVE_SUBNORMAL: F16 = F16(0x0001);
    /// Machine epsilon, 2^-10.
    pub const EPSILON: F16 = F16(0x1400);

    /// Reinterpret a raw bit pattern. Every pattern is valid.
    #[inline]
    pub const fn from_bits(bits: u16) -> F16 {
        F16(bits)
    }

    /// The raw bit pattern.
    #[inline]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Narrow an `f32`, rounding to nearest-even.
    #[inline]
    pub fn from_f32(f: f32) -> F16 {
        F16(codec::encode(f))
    }

    /// Widen to `f32`. Exact for every value; NaN payloads are preserved in
    /// the upper payload bits.
    #[inline]
    pub fn to_f32(self) -> f32 {
        codec::decode(self.0)
    }

    /// True when the exponent field is all ones and the mantissa is nonzero.
    #[inline]
    pub const fn is_nan(self) -> bool {
        self.0 & 0x7FFF > 0x7C00
    }

    /// True for positive or negative infinity.
    #[inline]
    pub const fn is_infinite(self) -> bool {
        self.0 & 0x7FFF == 0x7C00
    }

    /// True when neither infinite nor NaN.
    #[inline]
    pub const fn is_finite(self) -> bool {
        self.0 & 0x7C00 != 0x7C00
    }

    /// True when the sign bit is set (including -0.0 and negative NaNs).
    #[inline]
    pub const fn is_sign_negative(self) -> bool {
        self.0 & 0x8000 != 0
    }
}

impl std::fmt::Debug for F16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F16(0x{:04X} = {})", self.0, self.to_f32())
    }
}

impl std::fmt::Display for F16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.to_f32(), f)
    }
}

impl From<F16> for f32 {
    #[inline]
    fn from(h: F16) -> f32 {
        h.to_f32()
    }
}

impl From<f32> for F16 {
    #[inline]
    fn from(f: f32) -> F16 {
        F16::from_f32(f)
    }
}

// Scalar convenience operators. Bulk work should go through the slice
// operations, which dispatch to the SIMD backends.

impl std::ops::Add for F16 {
    type Output = F16;
    #[inline]
    fn add(self, rhs: F16) -> F16 {
        F16::from_f32(self.to_f32() + rhs.to_f32())
    }
}

impl std::ops::Sub for F16 {
    type Output = F16;
    #[inline]
    fn sub(self, rhs: F16) -> F16 {
        F16::from_f32(self.to_f32() - rhs.to_f32())
    }
}

impl std::ops::Mul for F16 {
    type Output = F16;
    #[inline]
    fn mul(self, rhs: F16) -> F16 {
        F16::from_f32(self.to_f32() * rhs.to_f32())
    }
}

impl std::ops::Div for F16 {
    type Output = F16;
    #[inline]
    fn div(self, rhs: F16) -> F16 {
        F16::from_f32(self.to_f32() / rhs.to_f32())
    }
}

impl std::ops::Neg for F16 {
    type Output = F16;
    #[inline]
    fn neg(self) -> F16 {
        F16(self.0 ^ 0x8000)
    }
}

impl num_traits::Zero for F16 {
    #[inline]
    fn zero() -> F16 {
        F16::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        // Both zero patterns.
        self.0 & 0x7FFF == 0
    }
}

impl num_traits::One for F16 {
    #[inline]
    fn one() -> F16 {
        F16::ONE
    }
}
