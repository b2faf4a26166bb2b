//! Top-level VFPU state and instruction dispatch.
//!
//! [`Vfpu`] owns the register cube, [`WithVfpu`] is the accessor trait a
//! composed emulator implements to expose it, and [`exec`] is the single
//! entry point a host's dispatch loop calls per decoded opcode.

use crate::cube::{VfpuRegs, ST_PASSTHROUGH};
use crate::decode::{self, matrix_size_of, vector_size_of, vd, vs, vt, Instruction};
use crate::host::VfpuHost;
use crate::ops::{arith, bits, compare, convert, memio};

/// Owner of the VFPU register cube, minus any cycle-count bookkeeping
/// (the outer dispatch loop owns timing).
#[derive(Debug, Clone, Copy, Default)]
pub struct Vfpu {
    pub regs: VfpuRegs,
}

impl Vfpu {
    pub fn new() -> Vfpu {
        Vfpu { regs: VfpuRegs::new() }
    }
}

/// Implemented by a composed emulator to expose its VFPU state.
pub trait WithVfpu {
    fn vfpu(&self) -> &Vfpu;
    fn vfpu_mut(&mut self) -> &mut Vfpu;
}

impl WithVfpu for Vfpu {
    fn vfpu(&self) -> &Vfpu {
        self
    }
    fn vfpu_mut(&mut self) -> &mut Vfpu {
        self
    }
}

/// Execute one decoded VFPU opcode against `vfpu`'s state, reading and
/// writing host memory/GPRs/RNG through `host` as needed.
pub fn exec<T: WithVfpu>(target: &mut T, host: &mut impl VfpuHost, opcode: u32) {
    let vfpu = target.vfpu_mut();
    let instr = decode::decode(opcode);
    dispatch(&mut vfpu.regs, host, opcode, instr);
    if !is_prefix_exempt(instr) {
        eat_prefixes(&mut vfpu.regs);
    }
}

/// Prefix-load instructions set up the *next* instruction's prefix and
/// must not immediately erase what they just wrote. The reserved
/// `0xFFFF____` no-op family is likewise exempt, matching its role as a
/// filler the disassembler and interpreter both treat as inert.
fn is_prefix_exempt(instr: Instruction) -> bool {
    matches!(
        instr,
        Instruction::VpfxS | Instruction::VpfxT | Instruction::VpfxD | Instruction::NopPreservePrefix
    )
}

fn eat_prefixes(regs: &mut VfpuRegs) {
    crate::macros::ctrl!(set CTRL_SPREFIX, regs, ST_PASSTHROUGH);
    crate::macros::ctrl!(set CTRL_TPREFIX, regs, ST_PASSTHROUGH);
    crate::macros::ctrl!(set CTRL_DPREFIX, regs, 0);
}

fn dispatch(regs: &mut VfpuRegs, host: &mut impl VfpuHost, op: u32, instr: Instruction) {
    let d = vd(op);
    let s = vs(op);
    let t = vt(op);
    let size = vector_size_of(op);
    let msize = matrix_size_of(op);

    match instr {
        Instruction::Vv2(subop) => arith::vv2(regs, subop, size, d, s),
        Instruction::VecDo3(arith_op) => arith::vec_do3(regs, arith_op, size, d, s, t),
        Instruction::Vdot => arith::vdot(regs, size, d, s, t),
        Instruction::Vhdp => arith::vhdp(regs, size, d, s, t),
        Instruction::Vmmul => arith::vmmul(regs, msize, d, s, t),
        Instruction::Vmscl => arith::vmscl(regs, msize, d, s, t),
        Instruction::Vmmov => arith::vmmov(regs, msize, d, s),
        Instruction::Vmidt => arith::vmidt(regs, msize, d),
        Instruction::Vmzero => arith::vmzero(regs, msize, d),
        Instruction::Vmone => arith::vmone(regs, msize, d),
        Instruction::Vzero => arith::vzero(regs, size, d),
        Instruction::Vone => arith::vone(regs, size, d),
        Instruction::Vidt => arith::vidt(regs, size, d),
        Instruction::Vcst(index) => arith::vcst(regs, size, d, index),
        Instruction::Viim(imm) => arith::viim(regs, d, imm),
        Instruction::Vfim(imm) => arith::vfim(regs, d, imm),
        Instruction::Vcrossquat => arith::crossquat(regs, size, d, s, t),
        Instruction::Vcrs => arith::vcrs(regs, d, s, t),
        Instruction::Vdet => arith::vdet(regs, d, s, t),
        Instruction::Vsrt1 => arith::vsrt1(regs, size, d, s),
        Instruction::Vsrt2 => arith::vsrt2(regs, size, d, s),
        Instruction::Vsrt3 => arith::vsrt3(regs, size, d, s),
        Instruction::Vsrt4 => arith::vsrt4(regs, size, d, s),
        Instruction::Vfad => arith::vfad(regs, size, d, s),
        Instruction::Vavg => arith::vavg(regs, size, d, s),
        Instruction::Vbfy1 => arith::vbfy1(regs, size, d, s),
        Instruction::Vbfy2 => arith::vbfy2(regs, size, d, s),
        Instruction::Vrot(imm5) => arith::vrot(regs, size, d, s, imm5),
        Instruction::Vtfm => arith::transform(regs, msize, d, s, t, false),
        Instruction::Vhtfm => arith::transform(regs, msize, d, s, t, true),
        Instruction::Vsgn => arith::vsgn(regs, size, d, s, t),
        Instruction::Vocp => arith::vocp(regs, size, d, s),
        Instruction::Vsocp => arith::vsocp(regs, size, d, s),
        Instruction::Vscl => arith::vscl(regs, size, d, s, t),

        Instruction::Vf2i { shift, mode } => convert::vf2i(regs, size, d, s, shift, mode),
        Instruction::Vi2f { shift } => convert::vi2f(regs, size, d, s, shift),
        Instruction::Vh2f => convert::vh2f(regs, size, d, s),
        Instruction::Vf2h => convert::vf2h(regs, size, d, s),
        Instruction::Vx2i(kind) => convert::vx2i(regs, size, d, s, kind),
        Instruction::Vi2x(kind) => convert::vi2x(regs, size, d, s, kind),
        Instruction::Vcolor(mode) => convert::vcolor(regs, d, s, mode),

        Instruction::Vcmp(cond) => compare::vcmp(regs, size, s, t, cond),
        Instruction::Vmin => compare::vmin(regs, size, d, s, t),
        Instruction::Vmax => compare::vmax(regs, size, d, s, t),
        Instruction::Vscmp => compare::vscmp(regs, size, d, s, t),
        Instruction::Vsge => compare::vsge(regs, size, d, s, t),
        Instruction::Vslt => compare::vslt(regs, size, d, s, t),
        Instruction::Vcmov { imm3, tf } => compare::vcmov(regs, size, d, s, imm3, tf),

        Instruction::SvLoad => memio::sv_load(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),
        Instruction::SvStore => memio::sv_store(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),
        Instruction::LvQ => memio::lv_q(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),
        Instruction::SvQ => memio::sv_q(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),
        Instruction::LvlQ => memio::lvl_q(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),
        Instruction::LvrQ => memio::lvr_q(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),
        Instruction::SvlQ => memio::svl_q(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),
        Instruction::SvrQ => memio::svr_q(regs, host, decode::ls_vreg(op), decode::ls_base(op), decode::ls_offset(op)),

        Instruction::Mfv => memio::mfv(regs, host, decode::rt(op), decode::ls_vreg(op)),
        Instruction::Mtv => memio::mtv(regs, host, decode::rt(op), decode::ls_vreg(op)),
        Instruction::Mfvc => memio::mfvc(regs, host, decode::rt(op), decode::ls_vreg(op) as usize & 0xF),
        Instruction::Mtvc => memio::mtvc(regs, host, decode::rt(op), decode::ls_vreg(op) as usize & 0xF),
        Instruction::Vmfvc => memio::vmfvc(regs, decode::ls_vreg(op), decode::ctrl_index(op)),
        Instruction::Vmtvc => memio::vmtvc(regs, decode::ctrl_index(op), decode::ls_vreg(op)),

        Instruction::VpfxS => memio::vpfx_s(regs, decode::prefix_imm20(op)),
        Instruction::VpfxT => memio::vpfx_t(regs, decode::prefix_imm20(op)),
        Instruction::VpfxD => memio::vpfx_d(regs, decode::prefix_imm12(op)),

        Instruction::Vlgb => bits::vlgb(regs, size, d, s),
        Instruction::Vsbn => bits::vsbn(regs, size, d, s, t),
        Instruction::Vwbn => bits::vwbn(regs, size, d, s, t),
        Instruction::Vsbz => bits::vsbz(regs, size, d, s),
        Instruction::Vrnds => bits::vrnds(regs, host, d),
        Instruction::Vrndi => bits::vrndi(regs, host, size, d),
        Instruction::Vrndf1 => bits::vrndf1(regs, host, size, d),
        Instruction::Vrndf2 => bits::vrndf2(regs, host, size, d),

        Instruction::NopPreservePrefix | Instruction::Illegal => {}
    }
}
