//! Exponent/mantissa bit kernels, and the `vrnd*` family that draws from
//! the host RNG.

use crate::cube::VectorSize;
use crate::cube::VfpuRegs;
use crate::host::VfpuRng;
use crate::ops::{read_s, read_t, write_d};

/// Extract the IEEE-754 exponent field as a signed, unbiased integer bit
/// pattern (so `1.0` reads back as `0`, `2.0` as `1`, `0.5` as `-1`).
pub fn vlgb(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8) {
    let s = read_s(regs, size, vs);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        let biased = i32::from(((s[i].to_bits() >> 23) & 0xFF) as u8);
        out[i] = f32::from_bits((biased - 127) as u32);
    }
    write_d(regs, size, vd, out);
}

/// Replace the exponent field of S's bit pattern with T's integer value
/// (rebiased), leaving sign and mantissa untouched.
pub fn vsbn(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, vt: u8) {
    let s = read_s(regs, size, vs);
    let t = read_t(regs, size, vt);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        let new_exp = (t[i].to_bits() as i32).wrapping_add(127).clamp(0, 255) as u32;
        let bits = (s[i].to_bits() & 0x807F_FFFF) | (new_exp << 23);
        out[i] = f32::from_bits(bits);
    }
    write_d(regs, size, vd, out);
}

/// Shift the mantissa left by `imm mod 16` bits, adjusting the exponent
/// to compensate so the represented magnitude is unchanged for shifts
/// that don't overflow the mantissa.
pub fn vwbn(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, imm: u8) {
    let s = read_s(regs, size, vs);
    let shift = i32::from(imm % 16);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        let bits = s[i].to_bits();
        let sign = bits & 0x8000_0000;
        let exp = ((bits >> 23) & 0xFF) as i32;
        let mantissa = bits & 0x007F_FFFF;
        let new_exp = (exp - shift).clamp(0, 255) as u32;
        out[i] = f32::from_bits(sign | (new_exp << 23) | mantissa);
    }
    write_d(regs, size, vd, out);
}

/// Force the exponent field to 127 (i.e. normalize magnitude to `[1, 2)`
/// while keeping sign and mantissa).
pub fn vsbz(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8) {
    let s = read_s(regs, size, vs);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        let bits = s[i].to_bits();
        let sign = bits & 0x8000_0000;
        let mantissa = bits & 0x007F_FFFF;
        out[i] = f32::from_bits(sign | (127u32 << 23) | mantissa);
    }
    write_d(regs, size, vd, out);
}

/// Seed the RNG from D, materializing nothing into the register file.
pub fn vrnds(regs: &VfpuRegs, host: &mut impl VfpuRng, vd: u8) {
    host.seed_rng(regs.read_scalar_bits(vd));
}

/// Draw raw 32-bit words from the RNG into every lane.
pub fn vrndi(regs: &mut VfpuRegs, host: &mut impl VfpuRng, size: VectorSize, vd: u8) {
    let mut out = [0.0f32; 4];
    for value in out.iter_mut().take(size.lanes()) {
        *value = f32::from_bits(host.next_u32());
    }
    write_last_lane_masked_only(regs, size, vd, out);
}

/// Draw floats uniformly distributed in `[1, 2)`.
pub fn vrndf1(regs: &mut VfpuRegs, host: &mut impl VfpuRng, size: VectorSize, vd: u8) {
    let mut out = [0.0f32; 4];
    for value in out.iter_mut().take(size.lanes()) {
        let word = host.next_u32();
        *value = f32::from_bits((127u32 << 23) | (word & 0x007F_FFFF));
    }
    write_last_lane_masked_only(regs, size, vd, out);
}

/// Draw floats uniformly distributed in `[2, 4)`.
pub fn vrndf2(regs: &mut VfpuRegs, host: &mut impl VfpuRng, size: VectorSize, vd: u8) {
    let mut out = [0.0f32; 4];
    for value in out.iter_mut().take(size.lanes()) {
        let word = host.next_u32();
        *value = f32::from_bits((128u32 << 23) | (word & 0x007F_FFFF));
    }
    write_last_lane_masked_only(regs, size, vd, out);
}

/// Every `vrnd*` write skips D-prefix saturation entirely (these are raw
/// bit patterns or an already-bounded range) but still honors the write
/// mask on every lane.
fn write_last_lane_masked_only(regs: &mut VfpuRegs, size: VectorSize, vd: u8, values: [f32; 4]) {
    crate::ops::write_d_mask_only(regs, size, vd, values);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vlgb_extracts_unbiased_exponent() {
        let mut regs = VfpuRegs::new();
        regs.write_scalar(0, 2.0);
        vlgb(&mut regs, VectorSize::Single, 4, 0);
        assert_eq!(regs.read_scalar_bits(4) as i32, 1);
    }

    #[test]
    fn vsbz_normalizes_to_unit_range() {
        let mut regs = VfpuRegs::new();
        regs.write_scalar(0, 100.0);
        vsbz(&mut regs, VectorSize::Single, 4, 0);
        let result = regs.read_scalar(4);
        assert!((1.0..2.0).contains(&result));
    }

    struct FakeRng(u32);
    impl VfpuRng for FakeRng {
        fn seed_rng(&mut self, seed: u32) {
            self.0 = seed;
        }
        fn next_u32(&mut self) -> u32 {
            self.0 = self.0.wrapping_mul(1103515245).wrapping_add(12345);
            self.0
        }
    }

    #[test]
    fn vrndf1_stays_in_one_to_two() {
        let mut regs = VfpuRegs::new();
        let mut rng = FakeRng(42);
        vrndf1(&mut regs, &mut rng, VectorSize::Single, 0);
        let v = regs.read_scalar(0);
        assert!((1.0..2.0).contains(&v));
    }
}
