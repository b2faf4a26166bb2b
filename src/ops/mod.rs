//! Instruction kernels, grouped into `//region`-delimited families with
//! one module per family since there are enough of them to make that
//! worth doing.

pub mod arith;
pub mod bits;
pub mod compare;
pub mod convert;
pub mod memio;

use crate::cube::{vector_offsets, VectorSize, VfpuRegs, CTRL_DPREFIX, CTRL_SPREFIX, CTRL_TPREFIX};
use crate::prefix::{apply_d_prefix, apply_st_prefix, d_prefix_lane_masked};

/// Read a vector operand through the S prefix.
pub(crate) fn read_s(regs: &VfpuRegs, size: VectorSize, reg: u8) -> [f32; 4] {
    let mut buf = regs.read_vector(size, reg);
    apply_st_prefix(&mut buf, regs.ctrl[CTRL_SPREFIX], size.lanes());
    buf
}

/// Read a vector operand through the T prefix.
pub(crate) fn read_t(regs: &VfpuRegs, size: VectorSize, reg: u8) -> [f32; 4] {
    let mut buf = regs.read_vector(size, reg);
    apply_st_prefix(&mut buf, regs.ctrl[CTRL_TPREFIX], size.lanes());
    buf
}

/// Read a vector operand with no prefix applied, for matrix rows and
/// other operands the prefix engine never touches.
pub(crate) fn read_raw(regs: &VfpuRegs, size: VectorSize, reg: u8) -> [f32; 4] {
    regs.read_vector(size, reg)
}

/// Write a result vector through the D prefix's saturation and write
/// mask. Masked lanes are left untouched in the register file.
pub(crate) fn write_d(regs: &mut VfpuRegs, size: VectorSize, reg: u8, mut values: [f32; 4]) {
    let d = regs.ctrl[CTRL_DPREFIX];
    apply_d_prefix(&mut values, size.lanes(), d, false);
    let offsets = vector_offsets(size, reg);
    for i in 0..size.lanes() {
        if !d_prefix_lane_masked(d, i) {
            regs.cube[offsets[i]] = values[i];
        }
    }
}

/// Write a result vector honoring only the D prefix's write mask, never
/// its saturation. Used by integer conversions that already saturate by
/// their own rule and so must not be saturated a second time.
pub(crate) fn write_d_mask_only(regs: &mut VfpuRegs, size: VectorSize, reg: u8, values: [f32; 4]) {
    let d = regs.ctrl[CTRL_DPREFIX];
    let offsets = vector_offsets(size, reg);
    for i in 0..size.lanes() {
        if !d_prefix_lane_masked(d, i) {
            regs.cube[offsets[i]] = values[i];
        }
    }
}

/// Write every lane through the D prefix's write mask, but apply its
/// saturation only to lane `n - 1` (the lowest-numbered lane). Used by
/// `vdiv`, where only the last lane's result is ever subject to
/// saturation.
pub(crate) fn write_d_sat_last_lane_only(regs: &mut VfpuRegs, size: VectorSize, reg: u8, mut values: [f32; 4]) {
    let n = size.lanes();
    let d = regs.ctrl[CTRL_DPREFIX];
    let lane_sat = (d >> (2 * (n - 1))) & 0x3;
    let mut last = [values[n - 1], 0.0, 0.0, 0.0];
    apply_d_prefix(&mut last, 1, lane_sat, false);
    values[n - 1] = last[0];
    let offsets = vector_offsets(size, reg);
    for i in 0..n {
        if !d_prefix_lane_masked(d, i) {
            regs.cube[offsets[i]] = values[i];
        }
    }
}
