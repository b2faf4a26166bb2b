//! The VFPU register cube and its addressing modes.
//!
//! 128 single-precision slots, arranged as 8 matrices of 4 rows by 4
//! elements, addressable as single floats, row/column vectors of 2/3/4
//! elements, or 2x2/3x3/4x4 matrices carved out of a matrix's 4x4 frame.
//! A flat store plus a small addressing-mode table that is reference
//! data, not logic.

/// Number of scalar slots in the register cube: 8 matrices * 4 rows * 4 cols.
pub const CUBE_SIZE: usize = 128;

/// Number of VFPU control registers. Only five are live (S/T/D prefix,
/// condition code, RNG state); the rest of the bank decodes but reads and
/// writes as inert.
pub const VFPU_CTRL_MAX: usize = 16;

pub const CTRL_SPREFIX: usize = 0;
pub const CTRL_TPREFIX: usize = 1;
pub const CTRL_DPREFIX: usize = 2;
pub const CTRL_CC: usize = 3;
pub const CTRL_RCX: usize = 8;

/// Per-control-register write mask, consulted by `mtvc`/`vmtvc`. Registers
/// not listed here default to fully writable (`u32::MAX`).
pub fn ctrl_valid_mask(idx: usize) -> u32 {
    match idx {
        CTRL_SPREFIX | CTRL_TPREFIX => 0x000F_FFFF,
        CTRL_DPREFIX => 0x0000_0FFF,
        CTRL_CC => 0x0000_003F,
        _ => u32::MAX,
    }
}

/// Pass-through S/T prefix: identity swizzle, no abs/const/negate flags.
pub const ST_PASSTHROUGH: u32 = 0xE4;

bitflags! {
    /// The condition-code register `vcmp` writes and `vcmov`/branch-style
    /// consumers read: one bit per lane, plus an OR and an AND summary.
    /// Stored in `VfpuRegs::ctrl[CTRL_CC]` as its raw bit pattern.
    pub struct ConditionFlags: u32 {
        const LANE0 = 1 << 0;
        const LANE1 = 1 << 1;
        const LANE2 = 1 << 2;
        const LANE3 = 1 << 3;
        const ANY = 1 << 4;
        const ALL = 1 << 5;
    }
}

impl ConditionFlags {
    pub fn lane(i: usize) -> ConditionFlags {
        ConditionFlags::from_bits_truncate(1 << i)
    }
}

/// The VFPU's idea of an operand width.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum VectorSize {
    Single,
    Pair,
    Triple,
    Quad,
}

impl VectorSize {
    /// Number of scalar lanes this size occupies.
    pub const fn lanes(self) -> usize {
        match self {
            VectorSize::Single => 1,
            VectorSize::Pair => 2,
            VectorSize::Triple => 3,
            VectorSize::Quad => 4,
        }
    }
}

/// The VFPU's idea of a matrix width. Always square.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum MatrixSize {
    Pair,
    Triple,
    Quad,
}

/// Side length of a square matrix operand: 2, 3, or 4.
pub const fn matrix_side(size: MatrixSize) -> usize {
    match size {
        MatrixSize::Pair => 2,
        MatrixSize::Triple => 3,
        MatrixSize::Quad => 4,
    }
}

/// `vsocp`'s "double width" size: Single -> Pair, Pair -> Quad. Only those
/// two inputs are legal; anything else is a decode-time error handled by
/// the caller.
pub fn double_vector_size(size: VectorSize) -> VectorSize {
    match size {
        VectorSize::Single => VectorSize::Pair,
        VectorSize::Pair => VectorSize::Quad,
        _ => size,
    }
}

/// Resolve the `n`-lane scalar slots addressed by a 7-bit vector register
/// index. Bit layout (matching the real hardware's `voffset` table):
/// bits `[6:2]` select the matrix (0..8), bits `[1:0]` select a column,
/// and bit `5` plus the size select which rows participate and whether
/// the vector runs along a row (normal) or a column (transposed).
pub fn vector_offsets(size: VectorSize, reg: u8) -> [usize; 4] {
    let reg = reg & 0x7F;
    let mtx = usize::from((reg >> 2) & 7);
    let col = usize::from(reg & 3);
    let transpose = usize::from((reg >> 5) & 1);

    let (row_base, len) = match size {
        VectorSize::Single => (usize::from((reg >> 5) & 3), 1),
        VectorSize::Pair => (usize::from((reg >> 5) & 2), 2),
        VectorSize::Triple => (usize::from((reg >> 6) & 1), 3),
        VectorSize::Quad => (usize::from((reg >> 5) & 2), 4),
    };

    let mut offsets = [0usize; 4];
    for (i, slot) in offsets.iter_mut().enumerate().take(len) {
        let row = (row_base + i) & 3;
        *slot = if transpose == 1 && !matches!(size, VectorSize::Single) {
            mtx * 16 + col * 4 + row
        } else {
            mtx * 16 + row * 4 + col
        };
    }
    offsets
}

/// Resolve the `side * side` scalar slots addressed by a 7-bit matrix
/// register index, laid out column-major in the returned array (`[col *
/// side + row]`), matching how the arithmetic kernels index `s[row][col]`.
pub fn matrix_offsets(size: MatrixSize, reg: u8) -> Vec<usize> {
    let reg = reg & 0x7F;
    let mtx = usize::from((reg >> 2) & 7);
    let col_base = usize::from(reg & 3);
    let transpose = usize::from((reg >> 5) & 1);
    let side = matrix_side(size);

    let row_base = match size {
        MatrixSize::Pair => usize::from((reg >> 5) & 2),
        MatrixSize::Triple => usize::from((reg >> 6) & 1),
        MatrixSize::Quad => usize::from((reg >> 5) & 2),
    };

    let mut offsets = vec![0usize; side * side];
    for col in 0..side {
        for row in 0..side {
            let r = (row_base + row) & 3;
            let c = (col_base + col) & 3;
            offsets[col * side + row] = if transpose == 1 {
                mtx * 16 + r * 4 + c
            } else {
                mtx * 16 + c * 4 + r
            };
        }
    }
    offsets
}

/// Owner of the register cube and control-register bank: plain data, no
/// behavior beyond simple accessors.
#[derive(Debug, Clone, Copy)]
pub struct VfpuRegs {
    /// The 128-float register cube.
    pub cube: [f32; CUBE_SIZE],
    /// The control register bank (S/T/D prefix, CC, RNG seed, etc).
    pub ctrl: [u32; VFPU_CTRL_MAX],
}

pub const POWERON_VFPU_REGS: VfpuRegs = VfpuRegs {
    cube: [0.0; CUBE_SIZE],
    ctrl: {
        let mut ctrl = [0u32; VFPU_CTRL_MAX];
        ctrl[CTRL_SPREFIX] = ST_PASSTHROUGH;
        ctrl[CTRL_TPREFIX] = ST_PASSTHROUGH;
        ctrl
    },
};

impl Default for VfpuRegs {
    fn default() -> Self {
        POWERON_VFPU_REGS
    }
}

impl VfpuRegs {
    pub fn new() -> VfpuRegs {
        POWERON_VFPU_REGS
    }

    //region float accessors
    pub fn read_scalar(&self, reg: u8) -> f32 {
        self.cube[vector_offsets(VectorSize::Single, reg)[0]]
    }

    pub fn write_scalar(&mut self, reg: u8, value: f32) {
        self.cube[vector_offsets(VectorSize::Single, reg)[0]] = value;
    }

    pub fn read_vector(&self, size: VectorSize, reg: u8) -> [f32; 4] {
        let offsets = vector_offsets(size, reg);
        let mut out = [0.0f32; 4];
        for i in 0..size.lanes() {
            out[i] = self.cube[offsets[i]];
        }
        out
    }

    pub fn write_vector(&mut self, size: VectorSize, reg: u8, values: [f32; 4]) {
        let offsets = vector_offsets(size, reg);
        for i in 0..size.lanes() {
            self.cube[offsets[i]] = values[i];
        }
    }

    /// Read an N*N matrix into the leading N*N slots of a 4x4 scratch
    /// buffer (column-major: `out[col][row]`), zeroing the rest, so
    /// sub-4 matrix reads treat the trailing frame slots as zero when
    /// later fed to arithmetic.
    pub fn read_matrix_padded(&self, size: MatrixSize, reg: u8) -> [[f32; 4]; 4] {
        let side = matrix_side(size);
        let offsets = matrix_offsets(size, reg);
        let mut out = [[0.0f32; 4]; 4];
        for col in 0..side {
            for row in 0..side {
                out[col][row] = self.cube[offsets[col * side + row]];
            }
        }
        out
    }

    pub fn write_matrix(&mut self, size: MatrixSize, reg: u8, values: &[[f32; 4]; 4]) {
        let side = matrix_side(size);
        let offsets = matrix_offsets(size, reg);
        for col in 0..side {
            for row in 0..side {
                self.cube[offsets[col * side + row]] = values[col][row];
            }
        }
    }
    //endregion

    //region integer-aliased accessors
    pub fn read_scalar_bits(&self, reg: u8) -> u32 {
        self.read_scalar(reg).to_bits()
    }

    pub fn write_scalar_bits(&mut self, reg: u8, value: u32) {
        self.write_scalar(reg, f32::from_bits(value));
    }

    pub fn read_vector_bits(&self, size: VectorSize, reg: u8) -> [u32; 4] {
        let v = self.read_vector(size, reg);
        [v[0].to_bits(), v[1].to_bits(), v[2].to_bits(), v[3].to_bits()]
    }

    pub fn write_vector_bits(&mut self, size: VectorSize, reg: u8, values: [u32; 4]) {
        self.write_vector(
            size,
            reg,
            [
                f32::from_bits(values[0]),
                f32::from_bits(values[1]),
                f32::from_bits(values[2]),
                f32::from_bits(values[3]),
            ],
        );
    }
    //endregion
}
