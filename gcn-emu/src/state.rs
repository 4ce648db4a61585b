use gcn_asm::{Inst, Reg};

use crate::memory::Pid;

/// Capabilities the ALU needs from an executing wavefront.
///
/// The instruction handlers read and write architectural state exclusively
/// through this trait, so representations other than [`crate::Wavefront`]
/// (a timing model's wavefront, a trace replayer) can reuse the semantics
/// unchanged.
///
/// Register access widths follow the operand encoding: `count` of 1 or 2
/// for the value-returning pair, anything larger through the bulk pair.
/// A 2-register read assembles `hi << 32 | lo`; a 2-register write splits
/// the value the same way.
pub trait InstState {
    /// Process the wavefront belongs to, used for address translation.
    fn pid(&self) -> Pid;

    /// The instruction currently being executed.
    fn inst(&self) -> &Inst;

    /// Reads `count` (1 or 2) consecutive registers starting at `reg`.
    fn read_reg(&self, reg: Reg, count: u8, lane: usize) -> u64;

    /// Writes `count` (1 or 2) consecutive registers starting at `reg`.
    fn write_reg(&mut self, reg: Reg, count: u8, lane: usize, value: u64);

    /// Reads `count` (> 2) consecutive registers into `buf`.
    fn read_reg_bulk(&self, reg: Reg, count: u8, lane: usize, buf: &mut [u32]);

    /// Writes `count` (> 2) consecutive registers from `buf`.
    fn write_reg_bulk(&mut self, reg: Reg, count: u8, lane: usize, buf: &[u32]);
}
