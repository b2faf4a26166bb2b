//! End-to-end scenarios driven through [`vfpu::exec`] with real opcode
//! words, exercising decode, prefix application, and instruction dispatch
//! together rather than any one module in isolation.

use std::collections::HashMap;

use vfpu_core::cube::{CTRL_CC, CTRL_SPREFIX};
use vfpu_core::vfpu::exec;
use vfpu_core::{MatrixSize, Vfpu, VfpuGprFile, VfpuMemory, VfpuRng, VectorSize};

// Local opcode classes, mirroring the private table in `decode.rs`. Kept
// here (rather than exported) since only tests need to hand-assemble
// opcode words; production code only ever calls `decode()`.
const CLASS_VV2: u32 = 0x01;
const CLASS_DOT: u32 = 0x06;
const CLASS_MMUL: u32 = 0x08;
const CLASS_MIDT: u32 = 0x0B;
const CLASS_ROT: u32 = 0x1F;
const CLASS_MIN: u32 = 0x2D;
const CLASS_CMP_BASE: u32 = 0x30;
const CLASS_VPFXS: u32 = 0x66;

fn op(class: u32, size: u32, vd: u8, vs: u8, vt: u8) -> u32 {
    (class << 24) | ((size & 1) << 7) | (((size >> 1) & 1) << 15) | (u32::from(vt & 0x7F) << 16) | (u32::from(vs & 0x7F) << 8) | u32::from(vd & 0x7F)
}

const SIZE_QUAD: u32 = 3;
const SIZE_PAIR: u32 = 1;
const SIZE_SINGLE: u32 = 0;

struct FakeHost {
    mem: HashMap<u32, u32>,
    gprs: [u32; 32],
    rng_state: u32,
}

impl FakeHost {
    fn new() -> Self {
        FakeHost { mem: HashMap::new(), gprs: [0; 32], rng_state: 1 }
    }
}

impl VfpuMemory for FakeHost {
    fn read_u32(&mut self, addr: u32) -> u32 {
        *self.mem.get(&addr).unwrap_or(&0)
    }
    fn write_u32(&mut self, addr: u32, value: u32) {
        self.mem.insert(addr, value);
    }
}

impl VfpuGprFile for FakeHost {
    fn gpr(&self, idx: u8) -> u32 {
        self.gprs[idx as usize]
    }
    fn set_gpr(&mut self, idx: u8, value: u32) {
        self.gprs[idx as usize] = value;
    }
}

impl VfpuRng for FakeHost {
    fn seed_rng(&mut self, seed: u32) {
        self.rng_state = seed;
    }
    fn next_u32(&mut self) -> u32 {
        self.rng_state = self.rng_state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.rng_state
    }
}

fn new_system() -> (Vfpu, FakeHost) {
    (Vfpu::new(), FakeHost::new())
}

#[test]
fn pass_through_dot() {
    let (mut vfpu, mut host) = new_system();
    vfpu.regs.write_vector(VectorSize::Quad, 0, [1.0, 2.0, 3.0, 4.0]);
    vfpu.regs.write_vector(VectorSize::Quad, 4, [5.0, 6.0, 7.0, 8.0]);
    let opcode = op(CLASS_DOT, SIZE_QUAD, 8, 0, 4);
    exec(&mut vfpu, &mut host, opcode);
    assert_eq!(vfpu.regs.read_scalar(8), 70.0);
}

#[test]
fn s_prefix_swizzle_reverses_lanes() {
    let (mut vfpu, mut host) = new_system();
    vfpu.regs.write_vector(VectorSize::Quad, 0, [1.0, 2.0, 3.0, 4.0]);
    vfpu.regs.write_vector(VectorSize::Quad, 4, [1.0, 0.0, 0.0, 0.0]);
    exec(&mut vfpu, &mut host, op(CLASS_VPFXS, SIZE_SINGLE, 0, 0, 0) | 0x1B);
    let opcode = op(CLASS_DOT, SIZE_QUAD, 8, 0, 4);
    exec(&mut vfpu, &mut host, opcode);
    assert_eq!(vfpu.regs.read_scalar(8), 4.0);
}

#[test]
fn vmmul_with_identity_is_noop() {
    let (mut vfpu, mut host) = new_system();
    exec(&mut vfpu, &mut host, op(CLASS_MIDT, SIZE_PAIR, 0, 0, 0));
    vfpu.regs.write_matrix(
        MatrixSize::Pair,
        4,
        &[[1.0, 3.0, 0.0, 0.0], [2.0, 4.0, 0.0, 0.0], [0.0; 4], [0.0; 4]],
    );
    let opcode = op(CLASS_MMUL, SIZE_PAIR, 8, 0, 4);
    exec(&mut vfpu, &mut host, opcode);
    let out = vfpu.regs.read_matrix_padded(MatrixSize::Pair, 8);
    assert_eq!(out[0][0], 1.0);
    assert_eq!(out[0][1], 3.0);
    assert_eq!(out[1][0], 2.0);
    assert_eq!(out[1][1], 4.0);
}

#[test]
fn vmin_follows_bit_pattern_ordering_for_signed_zero() {
    let (mut vfpu, mut host) = new_system();
    vfpu.regs.write_vector(VectorSize::Quad, 0, [f32::NAN, -1.0, 2.0, -0.0]);
    vfpu.regs.write_vector(VectorSize::Quad, 4, [3.0, f32::NAN, f32::NAN, 0.0]);
    let opcode = op(CLASS_MIN, SIZE_QUAD, 8, 0, 4);
    exec(&mut vfpu, &mut host, opcode);
    let out = vfpu.regs.read_vector(VectorSize::Quad, 8);
    // lane 3: -0.0 vs +0.0, bit-pattern ordering treats the negative sign
    // as ordered below positive, so -0.0 wins.
    assert_eq!(out[3].to_bits(), (-0.0f32).to_bits());
    assert_eq!(out[1], -1.0);
}

#[test]
fn vcmp_eq_on_quad_sets_cc_bits() {
    let (mut vfpu, mut host) = new_system();
    vfpu.regs.write_vector(VectorSize::Quad, 0, [1.0, 1.0, 2.0, 2.0]);
    vfpu.regs.write_vector(VectorSize::Quad, 4, [1.0, 2.0, 2.0, 3.0]);
    let opcode = op(CLASS_CMP_BASE + 1, SIZE_QUAD, 0, 0, 4); // +1 = CompareCond::Eq
    exec(&mut vfpu, &mut host, opcode);
    assert_eq!(vfpu.regs.ctrl[CTRL_CC] & 0x3F, 0b010101);
}

#[test]
fn vrot_with_zero_angle_is_sin_cos_identity() {
    let (mut vfpu, mut host) = new_system();
    vfpu.regs.write_scalar(0, 0.0);
    // imm5: sin lane 0, cos lane 1, no negate.
    let imm5 = 0b00_00_01u32;
    let opcode = op(CLASS_ROT, SIZE_QUAD, 4, 0, 0) | (imm5 << 16);
    exec(&mut vfpu, &mut host, opcode);
    let out = vfpu.regs.read_vector(VectorSize::Quad, 4);
    assert!((out[0] - 0.0).abs() < 1e-6);
    assert!((out[1] - 1.0).abs() < 1e-6);
}

#[test]
fn non_prefix_instruction_eats_the_prefix_it_used() {
    let (mut vfpu, mut host) = new_system();
    exec(&mut vfpu, &mut host, op(CLASS_VPFXS, SIZE_SINGLE, 0, 0, 0) | 0x12345);
    assert_eq!(vfpu.regs.ctrl[CTRL_SPREFIX], 0x12345);
    let mov = op(CLASS_VV2, SIZE_SINGLE, 4, 0, 0); // subop 0 = Mov, carried in vt's low nibble
    exec(&mut vfpu, &mut host, mov);
    assert_eq!(vfpu.regs.ctrl[CTRL_SPREFIX], 0xE4);
}

#[test]
fn passthrough_prefix_is_identity_for_any_vector() {
    let (mut vfpu, mut host) = new_system();
    vfpu.regs.write_vector(VectorSize::Quad, 0, [1.5, -2.5, 0.0, f32::NAN]);
    let mov = op(CLASS_VV2, SIZE_QUAD, 4, 0, 0);
    exec(&mut vfpu, &mut host, mov);
    let out = vfpu.regs.read_vector(VectorSize::Quad, 4);
    assert_eq!(out[0], 1.5);
    assert_eq!(out[1], -2.5);
    assert_eq!(out[2], 0.0);
    assert!(out[3].is_nan());
}
