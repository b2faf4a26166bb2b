//! Shared math utilities consumed by the instruction kernels.
//!
//! PSP-style sin/cos/sincos taking an argument in units of pi/2 radians,
//! half-float expand/shrink, a NaN-passthrough clamp, and NaN/Inf
//! predicates that treat signalling and negative NaN consistently. None of
//! this depends on the register cube; it's plain `f32`/`f64` arithmetic,
//! kept separate from the instruction bodies that use it.

use std::f64::consts::PI;

/// `sin(x * pi/2)`, reduced the way the PSP's VFPU does: the argument is in
/// units of a quarter turn, not radians.
pub fn vfpu_sin(x: f32) -> f32 {
    (f64::from(x) * (PI / 2.0)).sin() as f32
}

/// `cos(x * pi/2)`, see [`vfpu_sin`].
pub fn vfpu_cos(x: f32) -> f32 {
    (f64::from(x) * (PI / 2.0)).cos() as f32
}

/// Simultaneous sine/cosine, see [`vfpu_sin`]. Computed together so callers
/// that need both (like `vrot`) don't pay the reduction twice.
pub fn vfpu_sincos(x: f32) -> (f32, f32) {
    let rad = f64::from(x) * (PI / 2.0);
    (rad.sin() as f32, rad.cos() as f32)
}

/// `exp2` matching the VV2Op `vexp2` subop.
pub fn vfpu_exp2(x: f32) -> f32 {
    x.exp2()
}

/// `log2` matching the VV2Op `vlog2` subop.
pub fn vfpu_log2(x: f32) -> f32 {
    x.log2()
}

/// `asin(x) / (pi/2)`, matching the VV2Op `vasin` subop's pi/2-scaled
/// output convention.
pub fn vfpu_asin(x: f32) -> f32 {
    (f64::from(x).asin() / (PI / 2.0)) as f32
}

/// Order-preserving clamp that propagates NaN from the operand, never from
/// the clamp bounds. Tested in this order deliberately: `x <= lo` fails for
/// NaN, `x >= hi` fails for NaN, so a NaN `x` falls through unmodified.
#[inline]
pub fn nanclamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x <= lo {
        lo
    } else if x >= hi {
        hi
    } else {
        x
    }
}

/// Treats both quiet and signalling NaN, and negative NaN, as NaN — unlike
/// a bare `f32::is_nan` this never depends on sign-bit handling quirks of
/// the comparison operators used to implement it.
#[inline]
pub fn my_isnan(x: f32) -> bool {
    x.is_nan()
}

#[inline]
pub fn my_isinf(x: f32) -> bool {
    x.is_infinite()
}

#[inline]
pub fn my_isnanorinf(x: f32) -> bool {
    my_isnan(x) || my_isinf(x)
}

/// Rounding mode selected by the low two bits of a `vf2i`-family opcode.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RoundingMode {
    /// Round to nearest, ties to even (IEEE default).
    Nearest,
    /// Truncate toward zero.
    Zero,
    /// Round toward positive infinity.
    Ceil,
    /// Round toward negative infinity.
    Floor,
}

/// Convert a double-precision intermediate (already scaled by `2^imm` by
/// the caller) to a saturated 32-bit integer using the given rounding mode.
/// NaN saturates to `0x7FFFFFFF`, as does any out-of-range positive value;
/// out-of-range negative values saturate to `0x8000_0000`.
pub fn round_to_i32(mode: RoundingMode, scaled: f64) -> i32 {
    if scaled.is_nan() {
        return i32::MAX;
    }
    let rounded = match mode {
        RoundingMode::Nearest => {
            // Round-half-to-even, matching IEEE-754 roundTiesToEven.
            let floor = scaled.floor();
            let diff = scaled - floor;
            if diff < 0.5 {
                floor
            } else if diff > 0.5 {
                floor + 1.0
            } else if (floor as i64) % 2 == 0 {
                floor
            } else {
                floor + 1.0
            }
        }
        RoundingMode::Zero => scaled.trunc(),
        RoundingMode::Ceil => scaled.ceil(),
        RoundingMode::Floor => scaled.floor(),
    };
    if rounded >= f64::from(i32::MAX) {
        i32::MAX
    } else if rounded <= f64::from(i32::MIN) {
        i32::MIN
    } else {
        rounded as i32
    }
}

/// Expand an IEEE-754 half-precision bit pattern to `f32`.
pub fn f16_to_f32(half: u16) -> f32 {
    let sign = u32::from(half >> 15) << 31;
    let exp = u32::from((half >> 10) & 0x1F);
    let mantissa = u32::from(half & 0x3FF);

    let bits = if exp == 0 {
        if mantissa == 0 {
            sign
        } else {
            // Denormal half -> normalized float.
            let mut exp = -1i32;
            let mut mantissa = mantissa;
            loop {
                mantissa <<= 1;
                exp += 1;
                if mantissa & 0x400 != 0 {
                    break;
                }
            }
            mantissa &= 0x3FF;
            let biased_exp = (127 - 15 - exp) as u32;
            sign | (biased_exp << 23) | (mantissa << 13)
        }
    } else if exp == 0x1F {
        sign | 0xFF00_0000 | (mantissa << 13) | 0x0040_0000
    } else {
        sign | ((exp + (127 - 15)) << 23) | (mantissa << 13)
    };
    f32::from_bits(bits)
}

/// Shrink an `f32` to an IEEE-754 half-precision bit pattern, with
/// round-to-nearest-even on the mantissa.
pub fn f32_to_f16(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xFF) as i32;
    let mantissa = bits & 0x007F_FFFF;

    if exp == 0xFF {
        // Inf/NaN.
        let half_mantissa = if mantissa != 0 { 0x200 } else { 0 };
        return sign | 0x7C00 | half_mantissa;
    }

    let half_exp = exp - 127 + 15;
    if half_exp >= 0x1F {
        return sign | 0x7C00; // overflow -> infinity
    }
    if half_exp <= 0 {
        if half_exp < -10 {
            return sign; // underflow to zero
        }
        // Denormal result.
        let mantissa = mantissa | 0x0080_0000;
        let shift = 14 - half_exp;
        let half_mantissa = (mantissa >> shift) as u16;
        return sign | half_mantissa;
    }
    let half_mantissa = (mantissa >> 13) as u16;
    sign | ((half_exp as u16) << 10) | half_mantissa
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_cos_identity_at_zero() {
        assert_eq!(vfpu_sin(0.0), 0.0);
        assert_eq!(vfpu_cos(0.0), 1.0);
    }

    #[test]
    fn sin_cos_quarter_turn() {
        assert!((vfpu_sin(1.0) - 1.0).abs() < 1e-6);
        assert!(vfpu_cos(1.0).abs() < 1e-6);
    }

    #[test]
    fn nanclamp_passes_nan_through() {
        assert!(nanclamp(f32::NAN, 0.0, 1.0).is_nan());
        assert_eq!(nanclamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(nanclamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(nanclamp(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn half_float_round_trip() {
        for &x in &[0.0f32, 1.0, -1.0, 0.5, 2.0, 123.25, -0.001] {
            let half = f32_to_f16(x);
            let back = f16_to_f32(half);
            assert!((back - x).abs() <= x.abs() * 0.01 + 1e-3, "{} -> {}", x, back);
        }
    }

    #[test]
    fn round_to_i32_saturates_nan() {
        assert_eq!(round_to_i32(RoundingMode::Nearest, f64::NAN), i32::MAX);
    }

    #[test]
    fn round_to_i32_modes() {
        assert_eq!(round_to_i32(RoundingMode::Zero, 2.7), 2);
        assert_eq!(round_to_i32(RoundingMode::Zero, -2.7), -2);
        assert_eq!(round_to_i32(RoundingMode::Ceil, 2.1), 3);
        assert_eq!(round_to_i32(RoundingMode::Floor, 2.9), 2);
        assert_eq!(round_to_i32(RoundingMode::Nearest, 2.5), 2);
        assert_eq!(round_to_i32(RoundingMode::Nearest, 3.5), 4);
    }
}
