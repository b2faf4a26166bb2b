//! Float/integer/half-float/packed-color conversions.

use crate::cube::{double_vector_size, VectorSize, VfpuRegs};
use crate::decode::VxKind;
use crate::math::{f16_to_f32, f32_to_f16, round_to_i32, RoundingMode};
use crate::ops::{read_s, write_d, write_d_mask_only};
use crate::prefix::retain_invalid_swizzle_st;

/// Float -> saturated 32-bit integer, reinterpreted as the bit pattern of
/// the destination lane. Integer conversions already saturate by their
/// own rule, so the D prefix only ever contributes its write mask here.
pub fn vf2i(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, shift: u8, mode: RoundingMode) {
    let s = read_s(regs, size, vs);
    let scale = 2f64.powi(i32::from(shift));
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        let scaled = f64::from(s[i]) * scale;
        out[i] = f32::from_bits(round_to_i32(mode, scaled) as u32);
    }
    write_d_mask_only(regs, size, vd, out);
}

pub fn vi2f(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, shift: u8) {
    let s = read_s(regs, size, vs);
    let bits: [i32; 4] = [s[0].to_bits() as i32, s[1].to_bits() as i32, s[2].to_bits() as i32, s[3].to_bits() as i32];
    let scale = 2f64.powi(-i32::from(shift));
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        out[i] = (f64::from(bits[i]) * scale) as f32;
    }
    write_d(regs, size, vd, out);
}

/// Half-float expand. Input size Single promotes to a Pair output;
/// Pair/Triple/Quad all promote to a Quad output (the upper halves of
/// each source lane hold a second packed half-float).
pub fn vh2f(regs: &mut VfpuRegs, size_in: VectorSize, vd: u8, vs: u8) {
    let s = read_s(regs, size_in, vs);
    let bits = [s[0].to_bits(), s[1].to_bits(), s[2].to_bits(), s[3].to_bits()];
    let out_size = if size_in == VectorSize::Single { VectorSize::Pair } else { VectorSize::Quad };
    let mut out = [0.0f32; 4];
    let mut idx = 0;
    for i in 0..size_in.lanes() {
        let lo = (bits[i] & 0xFFFF) as u16;
        let hi = (bits[i] >> 16) as u16;
        out[idx] = f16_to_f32(lo);
        idx += 1;
        if out_size == VectorSize::Quad {
            out[idx] = f16_to_f32(hi);
            idx += 1;
        }
    }
    write_d(regs, out_size, vd, out);
}

/// Half-float shrink. Single/Pair input packs down to a Single output;
/// Triple/Quad packs down to a Pair output, two half-floats per lane.
pub fn vf2h(regs: &mut VfpuRegs, size_in: VectorSize, vd: u8, vs: u8) {
    let mut s = read_s(regs, size_in, vs);
    let s_prefix = regs.ctrl[crate::cube::CTRL_SPREFIX];
    retain_invalid_swizzle_st(&mut s, s_prefix, size_in.lanes());
    let out_size = if matches!(size_in, VectorSize::Single | VectorSize::Pair) {
        VectorSize::Single
    } else {
        VectorSize::Pair
    };
    let mut out_bits = [0u32; 4];
    let mut idx = 0;
    let mut lane = 0;
    while lane < size_in.lanes() {
        let lo = f32_to_f16(s[lane]);
        let hi = if lane + 1 < size_in.lanes() { f32_to_f16(s[lane + 1]) } else { 0 };
        out_bits[idx] = u32::from(lo) | (u32::from(hi) << 16);
        idx += 1;
        lane += 2;
    }
    let mut out = [0.0f32; 4];
    for i in 0..out_size.lanes() {
        out[i] = f32::from_bits(out_bits[i]);
    }
    write_d(regs, out_size, vd, out);
}

fn read_bits(regs: &VfpuRegs, size: VectorSize, reg: u8) -> [u32; 4] {
    let offsets = crate::cube::vector_offsets(size, reg);
    let mut out = [0u32; 4];
    for i in 0..size.lanes() {
        out[i] = regs.cube[offsets[i]].to_bits();
    }
    out
}

fn pack_x2i(kind: VxKind, value: f32) -> u32 {
    match kind {
        VxKind::UnsignedByte => (value.clamp(0.0, 1.0) * 255.0).round() as u32,
        VxKind::SignedByte => {
            let clamped = value.clamp(-1.0, 1.0);
            let scaled = if clamped < 0.0 { clamped * 128.0 } else { clamped * 127.0 };
            (scaled.round() as i32 as i8) as u8 as u32
        }
        VxKind::UnsignedShort => (value.clamp(0.0, 1.0) * 65535.0).round() as u32,
        VxKind::SignedShort => {
            let clamped = value.clamp(-1.0, 1.0);
            let scaled = if clamped < 0.0 { clamped * 32768.0 } else { clamped * 32767.0 };
            (scaled.round() as i32 as i16) as u16 as u32
        }
    }
}

/// Float -> fixed-point integer, bytes or shorts, packed low-to-high into
/// successive destination lanes. The unsigned-short/signed-short forms
/// scale by 0x8000 on the negative side and 0x7FFF on the positive side
/// (the asymmetry is intentional, matching the real hardware's rounding
/// rather than a perfectly symmetric fixed-point range).
pub fn vx2i(regs: &mut VfpuRegs, size_in: VectorSize, vd: u8, vs: u8, kind: VxKind) {
    let s = read_s(regs, size_in, vs);
    let packed: Vec<u32> = (0..size_in.lanes()).map(|i| pack_x2i(kind, s[i])).collect();

    let is_byte = matches!(kind, VxKind::UnsignedByte | VxKind::SignedByte);
    let per_word = if is_byte { 4 } else { 2 };
    let out_size = double_vector_size(size_in);
    let mut words = vec![0u32; out_size.lanes().max(size_in.lanes())];
    for (i, value) in packed.iter().enumerate() {
        let word = i / per_word;
        let slot = i % per_word;
        let shift = slot * (32 / per_word);
        if word < words.len() {
            words[word] |= value << shift;
        }
    }
    let lanes = if is_byte { size_in.lanes().div_ceil(4) } else { size_in.lanes().div_ceil(2) };
    let mut out = [0.0f32; 4];
    for i in 0..lanes.min(4) {
        out[i] = f32::from_bits(words[i]);
    }
    let out_vsize = match lanes {
        1 => VectorSize::Single,
        2 => VectorSize::Pair,
        3 => VectorSize::Triple,
        _ => VectorSize::Quad,
    };
    write_d_mask_only(regs, out_vsize, vd, out);
}

fn unpack_i2x(kind: VxKind, word: u32, slot: usize) -> f32 {
    match kind {
        VxKind::UnsignedByte => {
            let byte = (word >> (slot * 8)) & 0xFF;
            byte as f32 / 255.0
        }
        VxKind::SignedByte => {
            let byte = ((word >> (slot * 8)) & 0xFF) as u8 as i8;
            if byte < 0 { f32::from(byte) / 128.0 } else { f32::from(byte) / 127.0 }
        }
        VxKind::UnsignedShort => {
            let half = (word >> (slot * 16)) & 0xFFFF;
            half as f32 / 65535.0
        }
        VxKind::SignedShort => {
            let half = ((word >> (slot * 16)) & 0xFFFF) as u16 as i16;
            if half < 0 { f32::from(half) / 32768.0 } else { f32::from(half) / 32767.0 }
        }
    }
}

pub fn vi2x(regs: &mut VfpuRegs, size_in: VectorSize, vd: u8, vs: u8, kind: VxKind) {
    let bits = read_bits(regs, size_in, vs);
    let is_byte = matches!(kind, VxKind::UnsignedByte | VxKind::SignedByte);
    let per_word = if is_byte { 4 } else { 2 };
    let total_lanes = size_in.lanes() * per_word;
    let mut out = [0.0f32; 4];
    for i in 0..total_lanes.min(4) {
        let word = bits[i / per_word];
        out[i] = unpack_i2x(kind, word, i % per_word);
    }
    let out_vsize = match total_lanes.min(4) {
        1 => VectorSize::Single,
        2 => VectorSize::Pair,
        3 => VectorSize::Triple,
        _ => VectorSize::Quad,
    };
    write_d(regs, out_vsize, vd, out);
}

pub fn vcolor(regs: &mut VfpuRegs, vd: u8, vs: u8, mode: crate::decode::ColorMode) {
    use crate::decode::ColorMode;
    let s = read_s(regs, VectorSize::Quad, vs);
    let to_n = |v: f32, bits: u32| -> u32 {
        let max = ((1u32 << bits) - 1) as f32;
        (v.clamp(0.0, 1.0) * max).round() as u32
    };
    let packed = match mode {
        ColorMode::Rgba4444 => to_n(s[0], 4) | (to_n(s[1], 4) << 4) | (to_n(s[2], 4) << 8) | (to_n(s[3], 4) << 12),
        ColorMode::Rgba5551 => to_n(s[0], 5) | (to_n(s[1], 5) << 5) | (to_n(s[2], 5) << 10) | (to_n(s[3], 1) << 15),
        ColorMode::Rgb565 => to_n(s[0], 5) | (to_n(s[1], 6) << 5) | (to_n(s[2], 5) << 11),
    };
    write_d_mask_only(regs, VectorSize::Single, vd, [f32::from_bits(packed), 0.0, 0.0, 0.0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vf2i_nearest_rounds() {
        let mut regs = VfpuRegs::new();
        regs.write_scalar(0, 2.5);
        vf2i(&mut regs, VectorSize::Single, 4, 0, 0, RoundingMode::Nearest);
        assert_eq!(regs.read_scalar_bits(4) as i32, 2);
    }

    #[test]
    fn vi2f_scales_back() {
        let mut regs = VfpuRegs::new();
        regs.write_scalar_bits(0, 4i32 as u32);
        vi2f(&mut regs, VectorSize::Single, 4, 0, 1);
        assert_eq!(regs.read_scalar(4), 2.0);
    }

    #[test]
    fn half_float_expand_round_trips_lane0() {
        let mut regs = VfpuRegs::new();
        let half = f32_to_f16(1.5);
        regs.write_scalar_bits(0, u32::from(half));
        vh2f(&mut regs, VectorSize::Single, 4, 0);
        assert!((regs.read_vector(VectorSize::Pair, 4)[0] - 1.5).abs() < 1e-3);
    }

    #[test]
    fn vcolor_rgb565_packs_channels() {
        let mut regs = VfpuRegs::new();
        regs.write_vector(VectorSize::Quad, 0, [1.0, 1.0, 1.0, 1.0]);
        vcolor(&mut regs, 4, 0, crate::decode::ColorMode::Rgb565);
        assert_eq!(regs.read_scalar_bits(4), 0xFFFF);
    }
}
