//! Reference interpreter for the PSP Allegrex VFPU.
//!
//! This crate owns the register cube, the S/T/D prefix machinery, and the
//! bit-exact semantics of the VFPU instruction set. It does not own the
//! outer MIPS dispatch loop, emulated memory, or disassembly; those are
//! consumed through the traits in [`host`].

#[macro_use]
extern crate bitflags;

#[macro_use]
mod macros;

pub mod cube;
pub mod decode;
pub mod host;
pub mod math;
pub mod ops;
pub mod prefix;
pub mod vfpu;

pub use cube::{MatrixSize, VectorSize, VfpuRegs};
pub use host::{VfpuGprFile, VfpuHost, VfpuMemory, VfpuRng};
pub use vfpu::{Vfpu, WithVfpu};
