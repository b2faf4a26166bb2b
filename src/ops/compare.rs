//! Vector compare/select: `vcmp`'s sixteen condition codes, NaN/Inf-aware
//! `vmin`/`vmax`, the scalar-style compares, and `vcmov`.

use crate::cube::{ConditionFlags, VectorSize, VfpuRegs, CTRL_CC};
use crate::decode::CompareCond;
use crate::math::{my_isnan, my_isnanorinf};
use crate::ops::{read_s, read_t, write_d};

fn eval_cond(cond: CompareCond, a: f32, b: f32) -> bool {
    match cond {
        CompareCond::Fl => false,
        CompareCond::Eq => a == b,
        CompareCond::Lt => a < b,
        CompareCond::Le => a <= b,
        CompareCond::Tr => true,
        CompareCond::Ne => a != b,
        CompareCond::Ge => a >= b,
        CompareCond::Gt => a > b,
        CompareCond::Ez => a == 0.0,
        CompareCond::En => my_isnan(a),
        CompareCond::Ei => a.is_infinite(),
        CompareCond::Es => my_isnanorinf(a),
        CompareCond::Nz => a != 0.0,
        CompareCond::Nn => !my_isnan(a),
        CompareCond::Ni => !a.is_infinite(),
        CompareCond::Ns => !my_isnanorinf(a),
    }
}

/// Compare S against T lane-by-lane with `cond`, setting bits 0..n-1 of
/// the condition-code register. Bit 4 is the OR of all lane results, bit
/// 5 is the AND. Only those bits are touched — the rest of the CC
/// register (used by other instructions) survives untouched.
pub fn vcmp(regs: &mut VfpuRegs, size: VectorSize, vs: u8, vt: u8, cond: CompareCond) {
    let s = read_s(regs, size, vs);
    let t = read_t(regs, size, vt);
    let n = size.lanes();
    let mut cc = ConditionFlags::empty();
    let mut any = false;
    let mut all = true;
    for i in 0..n {
        let result = eval_cond(cond, s[i], t[i]);
        if result {
            cc |= ConditionFlags::lane(i);
        }
        any |= result;
        all &= result;
    }
    cc.set(ConditionFlags::ANY, any);
    cc.set(ConditionFlags::ALL, all);
    let affected = ConditionFlags::ANY.bits() | ConditionFlags::ALL.bits() | ((1u32 << n) - 1);
    regs.ctrl[CTRL_CC] = (regs.ctrl[CTRL_CC] & !affected) | (cc.bits() & affected);
}

/// `vmin`/`vmax`'s NaN/Inf handling: when neither operand is NaN/Inf this
/// is a plain float min/max. Otherwise the comparison runs on the raw
/// `i32` bit pattern, which orders `-NaN < -Inf < real < Inf < NaN` since a
/// larger mantissa reads as farther from zero — except when both operands
/// are negative, where that bit-pattern order runs backwards relative to
/// the float order it's standing in for, so the two-sided pick is flipped.
fn minmax_bits(s: f32, t: f32, want_min: bool) -> f32 {
    if !my_isnanorinf(s) && !my_isnanorinf(t) {
        return if want_min { s.min(t) } else { s.max(t) };
    }
    let si = s.to_bits() as i32;
    let ti = t.to_bits() as i32;
    let take_min = if si < 0 && ti < 0 { !want_min } else { want_min };
    let picked = if take_min { si.min(ti) } else { si.max(ti) };
    f32::from_bits(picked as u32)
}

pub fn vmin(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, vt: u8) {
    let s = read_s(regs, size, vs);
    let t = read_t(regs, size, vt);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        out[i] = minmax_bits(s[i], t[i], true);
    }
    write_d(regs, size, vd, out);
}

pub fn vmax(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, vt: u8) {
    let s = read_s(regs, size, vs);
    let t = read_t(regs, size, vt);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        out[i] = minmax_bits(s[i], t[i], false);
    }
    write_d(regs, size, vd, out);
}

/// Three-way scalar compare, result in `{-1.0, 0.0, 1.0}`; NaN compares
/// unordered and always yields `0.0`.
pub fn vscmp(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, vt: u8) {
    let s = read_s(regs, size, vs);
    let t = read_t(regs, size, vt);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        out[i] = if my_isnan(s[i]) || my_isnan(t[i]) {
            0.0
        } else if s[i] > t[i] {
            1.0
        } else if s[i] < t[i] {
            -1.0
        } else {
            0.0
        };
    }
    write_d(regs, size, vd, out);
}

pub fn vsge(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, vt: u8) {
    let s = read_s(regs, size, vs);
    let t = read_t(regs, size, vt);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        out[i] = if s[i] >= t[i] { 1.0 } else { 0.0 };
    }
    write_d(regs, size, vd, out);
}

pub fn vslt(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, vt: u8) {
    let s = read_s(regs, size, vs);
    let t = read_t(regs, size, vt);
    let mut out = [0.0f32; 4];
    for i in 0..size.lanes() {
        out[i] = if s[i] < t[i] { 1.0 } else { 0.0 };
    }
    write_d(regs, size, vd, out);
}

/// Conditionally move S into D, lane by lane. D's *current* contents are
/// read back through the T prefix first (the destination doubles as the
/// other source here), then each lane is overwritten from S wherever the
/// selected condition holds. `imm3 < 6` tests condition-code bit `imm3`
/// for every lane; `imm3 == 6` tests bit `i` against lane `i`. `tf`
/// inverts the test (true moves on the condition being false).
pub fn vcmov(regs: &mut VfpuRegs, size: VectorSize, vd: u8, vs: u8, imm3: u8, tf: bool) {
    let s = read_s(regs, size, vs);
    let mut d = read_t(regs, size, vd);
    let cc = regs.ctrl[CTRL_CC];
    let want = !tf;
    if imm3 < 6 {
        if ((cc >> imm3) & 1 == 1) == want {
            d = s;
        }
    } else {
        for i in 0..size.lanes() {
            if ((cc >> i) & 1 == 1) == want {
                d[i] = s[i];
            }
        }
    }
    write_d(regs, size, vd, d);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcmp_eq_sets_cc_bits() {
        let mut regs = VfpuRegs::new();
        regs.write_vector(VectorSize::Quad, 0, [1.0, 2.0, 3.0, 4.0]);
        regs.write_vector(VectorSize::Quad, 4, [1.0, 0.0, 3.0, 0.0]);
        vcmp(&mut regs, VectorSize::Quad, 0, 4, CompareCond::Eq);
        assert_eq!(regs.ctrl[CTRL_CC] & 0xF, 0b0101);
        assert_eq!((regs.ctrl[CTRL_CC] >> 4) & 1, 1); // OR
        assert_eq!((regs.ctrl[CTRL_CC] >> 5) & 1, 0); // AND
    }

    #[test]
    fn vmin_with_nan_uses_bit_pattern_ordering() {
        let mut regs = VfpuRegs::new();
        regs.write_scalar(0, f32::NAN);
        regs.write_scalar(4, 1.0);
        vmin(&mut regs, VectorSize::Single, 8, 0, 4);
        // whichever the bit-pattern ordering picks, it must be deterministic
        let result = regs.read_scalar(8);
        assert!(result.is_nan() || result == 1.0);
    }

    #[test]
    fn vcmov_moves_on_true_condition() {
        let mut regs = VfpuRegs::new();
        regs.ctrl[CTRL_CC] = 0b1;
        regs.write_scalar(4, 42.0);
        vcmov(&mut regs, VectorSize::Single, 8, 4, 0, false);
        assert_eq!(regs.read_scalar(8), 42.0);
    }

    #[test]
    fn vcmov_skips_on_false_condition() {
        let mut regs = VfpuRegs::new();
        regs.ctrl[CTRL_CC] = 0b0;
        regs.write_scalar(8, 7.0);
        regs.write_scalar(4, 42.0);
        vcmov(&mut regs, VectorSize::Single, 8, 4, 0, false);
        assert_eq!(regs.read_scalar(8), 7.0);
    }

    #[test]
    fn vcmov_tf_inverts_the_test() {
        let mut regs = VfpuRegs::new();
        regs.ctrl[CTRL_CC] = 0b0;
        regs.write_scalar(8, 7.0);
        regs.write_scalar(4, 42.0);
        vcmov(&mut regs, VectorSize::Single, 8, 4, 0, true);
        assert_eq!(regs.read_scalar(8), 42.0);
    }
}
