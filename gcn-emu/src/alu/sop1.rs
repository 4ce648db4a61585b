//! SOP1: scalar instructions with one source operand.

use gcn_asm::{Inst, Reg};

use crate::operand::{read_op, write_op};
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    match inst.opcode {
        0 => s_mov_b32(state, inst),
        1 => s_mov_b64(state, inst),
        4 => s_not_u32(state, inst),
        8 => s_brev_b32(state, inst),
        28 => s_getpc_b64(state, inst),
        32 => save_exec(state, inst, |src, exec| src & exec),
        33 => save_exec(state, inst, |src, exec| src | exec),
        34 => save_exec(state, inst, |src, exec| src ^ exec),
        35 => save_exec(state, inst, |src, exec| src & !exec),
        36 => save_exec(state, inst, |src, exec| src | !exec),
        37 => save_exec(state, inst, |src, exec| !(src & exec)),
        38 => save_exec(state, inst, |src, exec| !(src | exec)),
        39 => save_exec(state, inst, |src, exec| !(src ^ exec)),
        opcode => panic!("opcode {opcode} is not implemented for the SOP1 format"),
    }
}

fn s_mov_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    write_op(state, inst.dst, 0, src0);
}

fn s_mov_b64<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    write_op(state, inst.dst, 0, src0);
}

fn s_not_u32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let dst = !src0;
    write_op(state, inst.dst, 0, dst);
    if dst != 0 {
        state.write_reg(Reg::Scc, 1, 0, 1);
    }
}

fn s_brev_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as u32;
    write_op(state, inst.dst, 0, u64::from(src0.reverse_bits()));
}

fn s_getpc_b64<S: InstState>(state: &mut S, inst: &Inst) {
    let pc = state.read_reg(Reg::Pc, 1, 0);
    write_op(state, inst.dst, 0, pc + 4);
}

/// Shared body of the SAVEEXEC family: save EXEC to the destination,
/// combine it with Src0, and reflect the new mask in SCC.
fn save_exec<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(u64, u64) -> u64) {
    let src0 = read_op(state, inst.src0, 0);
    let exec = state.read_reg(Reg::Exec, 1, 0);

    write_op(state, inst.dst, 0, exec);
    let exec = op(src0, exec);
    state.write_reg(Reg::Exec, 1, 0, exec);
    state.write_reg(Reg::Scc, 1, 0, u64::from(exec != 0));
}
