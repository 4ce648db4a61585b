//! Resolution of operand descriptors against wavefront state.
//!
//! Handlers pass the instruction's operand slot straight from the decoded
//! [`Inst`](gcn_asm::Inst); an empty slot means the decoder never populated
//! an operand the instruction semantics require, which is fatal.

use gcn_asm::Operand;

use crate::state::InstState;

/// Reads an operand as a value.
///
/// Register operands of width 1 or 2 go through
/// [`InstState::read_reg`]; integer immediates are sign-extended, float
/// immediates bit-cast, and literals zero-extended to 64 bits.
pub fn read_op<S: InstState>(state: &S, slot: Option<Operand>, lane: usize) -> u64 {
    match expect_slot(state, slot) {
        Operand::Reg { reg, count } => {
            if count > 2 {
                panic!("{count}-register operand {reg} requires the bulk access path");
            }
            state.read_reg(reg, count, lane)
        }
        Operand::IntImm(value) => value as u64,
        Operand::FloatImm(value) => u64::from(value.to_bits()),
        Operand::Literal(bits) => u64::from(bits),
    }
}

/// Reads a register operand wider than two registers into `buf`.
pub fn read_op_wide<S: InstState>(
    state: &S,
    slot: Option<Operand>,
    lane: usize,
    buf: &mut [u32],
) {
    match expect_slot(state, slot) {
        Operand::Reg { reg, count } => state.read_reg_bulk(reg, count, lane, buf),
        other => panic!("bulk read of non-register operand {other:?}"),
    }
}

/// Writes a value to a register operand of width 1 or 2.
///
/// Only registers are writable; any other operand kind is a decoder bug.
pub fn write_op<S: InstState>(state: &mut S, slot: Option<Operand>, lane: usize, value: u64) {
    match expect_slot(state, slot) {
        Operand::Reg { reg, count } => {
            if count > 2 {
                panic!("{count}-register operand {reg} requires the bulk access path");
            }
            state.write_reg(reg, count, lane, value);
        }
        other => panic!("write to non-register operand {other:?}"),
    }
}

/// Writes `buf` to a register operand wider than two registers.
pub fn write_op_wide<S: InstState>(
    state: &mut S,
    slot: Option<Operand>,
    lane: usize,
    buf: &[u32],
) {
    match expect_slot(state, slot) {
        Operand::Reg { reg, count } => state.write_reg_bulk(reg, count, lane, buf),
        other => panic!("bulk write to non-register operand {other:?}"),
    }
}

fn expect_slot<S: InstState>(state: &S, slot: Option<Operand>) -> Operand {
    match slot {
        Some(op) => op,
        None => {
            let inst = state.inst();
            panic!(
                "operand slot not populated on {} opcode {} ({})",
                inst.format, inst.opcode, inst.name
            );
        }
    }
}
