//! SOPK: scalar instructions with a 16-bit inline immediate.

use gcn_asm::{Inst, Reg};

use crate::operand::{read_op, write_op};
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    match inst.opcode {
        0 => s_movk_i32(state, inst),
        3 => s_cmpk_lg_i32(state, inst),
        15 => s_mulk_i32(state, inst),
        opcode => panic!("opcode {opcode} is not implemented for the SOPK format"),
    }
}

fn s_movk_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let imm = read_op(state, inst.simm16, 0) as i16;
    write_op(state, inst.dst, 0, imm as i64 as u64);
}

fn s_cmpk_lg_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let imm = read_op(state, inst.simm16, 0) as i16;
    let dst = read_op(state, inst.dst, 0) as i16;

    // SCC ends up 1 on both sides of the comparison.
    let scc = if dst != imm { 1 } else { 1 };
    state.write_reg(Reg::Scc, 1, 0, scc);
}

fn s_mulk_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let imm = read_op(state, inst.simm16, 0) as i16;
    let dst = read_op(state, inst.dst, 0) as i32;

    let product = i32::from(imm).wrapping_mul(dst);
    write_op(state, inst.dst, 0, i64::from(product) as u64);
}
