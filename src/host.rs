//! Collaborator traits consumed from the emulated CPU's other subsystems.
//!
//! The VFPU core never owns emulated memory, the scalar GPR file, or the
//! RNG; it only reads and writes through these traits.

/// Access to emulated memory, for `SV`/`SVQ`-family load/store.
///
/// Implementations are expected to be infallible from this trait's point
/// of view: any fault reporting happens on the host's own error channel
/// and does not roll back register writes the VFPU core already made.
pub trait VfpuMemory {
    fn read_u32(&mut self, addr: u32) -> u32;
    fn read_f32(&mut self, addr: u32) -> f32 {
        f32::from_bits(self.read_u32(addr))
    }
    fn write_u32(&mut self, addr: u32, value: u32);
    fn write_f32(&mut self, addr: u32, value: f32) {
        self.write_u32(addr, value.to_bits());
    }

    /// Optional fast path for aligned quad transfers on little-endian
    /// hosts: a raw pointer to 16 contiguous bytes at `addr`, or `None` to
    /// fall back to four `read_u32`/`write_u32` calls.
    fn get_pointer(&self, _addr: u32) -> Option<*const u8> {
        None
    }
}

/// Access to the scalar GPR file, for `mfv`/`mtv`/`mfvc`/`mtvc`.
pub trait VfpuGprFile {
    fn gpr(&self, idx: u8) -> u32;
    fn set_gpr(&mut self, idx: u8, value: u32);
}

/// The RNG contract consumed by `vrnds`/`vrndi`/`vrndf1`/`vrndf2`. The
/// concrete algorithm is a host concern; the VFPU core only needs a seed
/// sink and a stream of 32-bit words.
pub trait VfpuRng {
    fn seed_rng(&mut self, seed: u32);
    fn next_u32(&mut self) -> u32;
}

/// Convenience bound combining the three collaborator traits so handlers
/// can take a single `T: VfpuHost` parameter.
pub trait VfpuHost: VfpuMemory + VfpuGprFile + VfpuRng {}

impl<T: VfpuMemory + VfpuGprFile + VfpuRng> VfpuHost for T {}
