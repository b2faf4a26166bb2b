//! Load/store and control-register transfer instructions. These are the
//! only kernels that touch the host's memory, GPR file, or RNG.

use crate::cube::{ctrl_valid_mask, VectorSize, VfpuRegs, CTRL_DPREFIX, CTRL_SPREFIX, CTRL_TPREFIX};
use crate::host::VfpuHost;

pub fn sv_load(regs: &mut VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let addr = (host.gpr(base) as i32).wrapping_add(offset) as u32;
    let value = host.read_f32(addr);
    regs.write_scalar(vreg, value);
}

pub fn sv_store(regs: &VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let addr = (host.gpr(base) as i32).wrapping_add(offset) as u32;
    host.write_f32(addr, regs.read_scalar(vreg));
}

/// Aligned quad load: `addr & !0xF`, all four lanes.
pub fn lv_q(regs: &mut VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let addr = ((host.gpr(base) as i32).wrapping_add(offset) as u32) & !0xF;
    let mut values = [0.0f32; 4];
    for (i, value) in values.iter_mut().enumerate() {
        *value = host.read_f32(addr + (i as u32) * 4);
    }
    regs.write_vector(VectorSize::Quad, vreg, values);
}

pub fn sv_q(regs: &VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let addr = ((host.gpr(base) as i32).wrapping_add(offset) as u32) & !0xF;
    let values = regs.read_vector(VectorSize::Quad, vreg);
    for (i, value) in values.iter().enumerate() {
        host.write_f32(addr + (i as u32) * 4, *value);
    }
}

/// The lane selected by an unaligned quad access: how many of the 4
/// lanes sit below the 16-byte boundary.
fn quad_lane_offset(addr: u32) -> u32 {
    (addr >> 2) & 3
}

/// `lvl.q`: load the lanes at or above the 16-byte-aligned base into the
/// low end of the destination, leaving lanes already covered by a prior
/// `lvr.q` alone.
pub fn lvl_q(regs: &mut VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let raw = (host.gpr(base) as i32).wrapping_add(offset) as u32;
    let aligned = raw & !0xF;
    let lane = quad_lane_offset(raw);
    let mut values = regs.read_vector(VectorSize::Quad, vreg);
    for i in lane..4 {
        values[(i - lane) as usize] = host.read_f32(aligned + i * 4);
    }
    regs.write_vector(VectorSize::Quad, vreg, values);
}

/// `lvr.q`: load the lanes below the 16-byte-aligned base into the high
/// end of the destination.
pub fn lvr_q(regs: &mut VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let raw = (host.gpr(base) as i32).wrapping_add(offset) as u32;
    let aligned = raw & !0xF;
    let lane = quad_lane_offset(raw);
    let mut values = regs.read_vector(VectorSize::Quad, vreg);
    for i in 0..lane {
        values[(4 - lane + i) as usize] = host.read_f32(aligned + i * 4);
    }
    regs.write_vector(VectorSize::Quad, vreg, values);
}

pub fn svl_q(regs: &VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let raw = (host.gpr(base) as i32).wrapping_add(offset) as u32;
    let aligned = raw & !0xF;
    let lane = quad_lane_offset(raw);
    let values = regs.read_vector(VectorSize::Quad, vreg);
    for i in lane..4 {
        host.write_f32(aligned + i * 4, values[(i - lane) as usize]);
    }
}

pub fn svr_q(regs: &VfpuRegs, host: &mut impl VfpuHost, vreg: u8, base: u8, offset: i32) {
    let raw = (host.gpr(base) as i32).wrapping_add(offset) as u32;
    let aligned = raw & !0xF;
    let lane = quad_lane_offset(raw);
    let values = regs.read_vector(VectorSize::Quad, vreg);
    for i in 0..lane {
        host.write_f32(aligned + i * 4, values[(4 - lane + i) as usize]);
    }
}

pub fn mfv(regs: &VfpuRegs, host: &mut impl VfpuHost, gpr_idx: u8, vreg: u8) {
    host.set_gpr(gpr_idx, regs.read_scalar_bits(vreg));
}

pub fn mtv(regs: &mut VfpuRegs, host: &mut impl VfpuHost, gpr_idx: u8, vreg: u8) {
    // Reading GPR 0 as a source is always zero, matching the interlock
    // every MIPS-family ISA applies to its zero register.
    let value = if gpr_idx == 0 { 0 } else { host.gpr(gpr_idx) };
    regs.write_scalar_bits(vreg, value);
}

pub fn mfvc(regs: &VfpuRegs, host: &mut impl VfpuHost, gpr_idx: u8, ctrl_idx: usize) {
    host.set_gpr(gpr_idx, regs.ctrl[ctrl_idx]);
}

pub fn mtvc(regs: &mut VfpuRegs, host: &mut impl VfpuHost, gpr_idx: u8, ctrl_idx: usize) {
    let value = if gpr_idx == 0 { 0 } else { host.gpr(gpr_idx) };
    regs.ctrl[ctrl_idx] = value & ctrl_valid_mask(ctrl_idx);
}

pub fn vmfvc(regs: &mut VfpuRegs, vd: u8, ctrl_idx: usize) {
    regs.write_scalar_bits(vd, regs.ctrl[ctrl_idx]);
}

pub fn vmtvc(regs: &mut VfpuRegs, ctrl_idx: usize, vs: u8) {
    let value = regs.read_scalar_bits(vs) & ctrl_valid_mask(ctrl_idx);
    regs.ctrl[ctrl_idx] = value;
}

/// Prefix-load instructions do not eat prefixes the way every other
/// instruction does: they're the mechanism that sets the prefix the next
/// instruction will consume.
pub fn vpfx_s(regs: &mut VfpuRegs, imm: u32) {
    regs.ctrl[CTRL_SPREFIX] = imm & ctrl_valid_mask(CTRL_SPREFIX);
}

pub fn vpfx_t(regs: &mut VfpuRegs, imm: u32) {
    regs.ctrl[CTRL_TPREFIX] = imm & ctrl_valid_mask(CTRL_TPREFIX);
}

pub fn vpfx_d(regs: &mut VfpuRegs, imm: u32) {
    regs.ctrl[CTRL_DPREFIX] = imm & ctrl_valid_mask(CTRL_DPREFIX);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeHost {
        mem: std::collections::HashMap<u32, u32>,
        gprs: [u32; 32],
    }

    impl FakeHost {
        fn new() -> Self {
            FakeHost { mem: std::collections::HashMap::new(), gprs: [0; 32] }
        }
    }

    impl crate::host::VfpuMemory for FakeHost {
        fn read_u32(&mut self, addr: u32) -> u32 {
            *self.mem.get(&addr).unwrap_or(&0)
        }
        fn write_u32(&mut self, addr: u32, value: u32) {
            self.mem.insert(addr, value);
        }
    }

    impl crate::host::VfpuGprFile for FakeHost {
        fn gpr(&self, idx: u8) -> u32 {
            self.gprs[idx as usize]
        }
        fn set_gpr(&mut self, idx: u8, value: u32) {
            self.gprs[idx as usize] = value;
        }
    }

    impl crate::host::VfpuRng for FakeHost {
        fn seed_rng(&mut self, _seed: u32) {}
        fn next_u32(&mut self) -> u32 {
            0
        }
    }

    #[test]
    fn sv_load_store_round_trip() {
        let mut regs = VfpuRegs::new();
        let mut host = FakeHost::new();
        host.gprs[4] = 0x1000;
        regs.write_scalar(0, 3.5);
        sv_store(&regs, &mut host, 0, 4, 8);
        sv_load(&mut regs, &mut host, 8, 4, 8);
        assert_eq!(regs.read_scalar(8), 3.5);
    }

    #[test]
    fn lv_q_aligns_down() {
        let mut regs = VfpuRegs::new();
        let mut host = FakeHost::new();
        host.gprs[4] = 0x1003; // misaligned base, rounds down to 0x1000
        for i in 0..4u32 {
            host.mem.insert(0x1000 + i * 4, f32::to_bits(i as f32));
        }
        lv_q(&mut regs, &mut host, 0, 4, 0);
        assert_eq!(regs.read_vector(VectorSize::Quad, 0), [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn mtv_with_gpr_zero_writes_zero() {
        let mut regs = VfpuRegs::new();
        let mut host = FakeHost::new();
        regs.write_scalar_bits(0, 0xDEAD_BEEF);
        mtv(&mut regs, &mut host, 0, 0);
        assert_eq!(regs.read_scalar_bits(0), 0);
    }

    #[test]
    fn vpfx_s_masks_to_twenty_bits() {
        let mut regs = VfpuRegs::new();
        vpfx_s(&mut regs, 0xFFFF_FFFF);
        assert_eq!(regs.ctrl[CTRL_SPREFIX], 0x000F_FFFF);
    }
}
