//! Bit-exact conversion between binary16 patterns and `f32`.
//!
//! Layout reminder: sign bit 15, exponent bits 14..10 (bias 15), mantissa
//! bits 9..0. The f32 counterparts are bias 127 and a 23-bit mantissa, so
//! re-biasing adds 112 and mantissas shift by 13 bits.
//!
//! Widening is exact for every pattern. Narrowing rounds to nearest-even on
//! the 13 dropped mantissa bits, produces subnormals in the gradual
//! underflow band, and saturates to the signed infinity on overflow. Both
//! directions are pure, total functions of the bit pattern.

/// Widen a binary16 pattern to `f32`. Exact.
pub(crate) fn decode(h: u16) -> f32 {
    let sign = (h as u32 >> 15) & 1;
    let exp = (h as u32 >> 10) & 0x1F;
    let mant = h as u32 & 0x3FF;

    let bits = match exp {
        0 => {
            if mant == 0 {
                // Signed zero.
                sign << 31
            } else {
                // Subnormal: renormalize by shifting until the implicit
                // leading 1 appears, tracking the exponent adjustment.
                let mut e: i32 = 1;
                let mut m = mant;
                while m & 0x400 == 0 {
                    m <<= 1;
                    e -= 1;
                }
                m &= 0x3FF;
                (sign << 31) | (((112 + e) as u32) << 23) | (m << 13)
            }
        }
        31 => {
            // Infinity (mantissa 0) or NaN (payload kept, shifted into the
            // wider mantissa field).
            (sign << 31) | 0x7F80_0000 | (mant << 13)
        }
        _ => (sign << 31) | ((exp + 112) << 23) | (mant << 13),
    };

    f32::from_bits(bits)
}

/// Narrow an `f32` to a binary16 pattern, rounding to nearest-even.
pub(crate) fn encode(f: f32) -> u16 {
    let bits = f.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xFF) as i32;
    let mut mant = bits & 0x7F_FFFF;

    match exp {
        255 => {
            if mant == 0 {
                return sign | 0x7C00;
            }
            // NaN: truncate the payload, but never let a low-bits-only
            // payload collapse to the infinity pattern.
            let payload = (mant >> 13) as u16;
            sign | 0x7C00 | if payload == 0 { 0x200 } else { payload }
        }
        e if e > 142 => {
            // Above the binary16 range even before rounding.
            sign | 0x7C00
        }
        e if e < 102 => {
            // Below half the smallest subnormal; rounds to signed zero.
            sign
        }
        e if e < 113 => {
            // Subnormal result: restore the implicit 1, then shift out
            // 13 + (113 - e) bits with a round-half-to-even tie break.
            mant |= 0x80_0000;
            let shift = (126 - e) as u32; // 14..=24
            let round = 1u32 << (shift - 1);
            if mant & round != 0 && (mant & (round - 1) != 0 || mant & (round << 1) != 0) {
                mant += round;
            }
            sign | (mant >> shift) as u16
        }
        mut e => {
            // Normal result: round the 23-bit mantissa down to 10 bits,
            // carrying a rounding overflow into the exponent.
            let round = 0x1000u32;
            if mant & round != 0 && (mant & 0xFFF != 0 || mant & 0x2000 != 0) {
                mant += round;
                if mant >= 0x80_0000 {
                    mant = 0;
                    e += 1;
                }
            }
            e -= 112;
            if e > 30 {
                // Rounded past the largest finite value.
                return sign | 0x7C00;
            }
            sign | ((e as u16) << 10) | (mant >> 13) as u16
        }
    }
}
