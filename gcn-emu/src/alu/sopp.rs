//! SOPP: program-counter branches, waits, and no-ops.
//!
//! Branch targets are `PC + simm16 * 4`. S_NOP and S_WAITCNT only matter
//! to the timing layer; the functional core retires them without effect.

use gcn_asm::{Inst, Reg};

use crate::operand::read_op;
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    match inst.opcode {
        0 | 12 => {} // S_NOP / S_WAITCNT
        2 => branch(state, inst),
        4 => branch_if(state, inst, |state| scc(state) == 0),
        5 => branch_if(state, inst, |state| scc(state) == 1),
        6 => branch_if(state, inst, |state| vcc(state) == 0),
        7 => branch_if(state, inst, |state| vcc(state) != 0),
        8 => branch_if(state, inst, |state| exec(state) == 0),
        9 => branch_if(state, inst, |state| exec(state) != 0),
        opcode => panic!("opcode {opcode} is not implemented for the SOPP format"),
    }
}

fn scc<S: InstState>(state: &S) -> u64 {
    state.read_reg(Reg::Scc, 1, 0)
}

fn vcc<S: InstState>(state: &S) -> u64 {
    state.read_reg(Reg::Vcc, 1, 0)
}

fn exec<S: InstState>(state: &S) -> u64 {
    state.read_reg(Reg::Exec, 1, 0)
}

fn branch<S: InstState>(state: &mut S, inst: &Inst) {
    let imm = read_op(state, inst.simm16, 0) as u16 as i16;
    let pc = state.read_reg(Reg::Pc, 1, 0) as i64 + i64::from(imm) * 4;
    state.write_reg(Reg::Pc, 1, 0, pc as u64);
}

fn branch_if<S: InstState>(state: &mut S, inst: &Inst, condition: impl Fn(&S) -> bool) {
    if condition(state) {
        branch(state, inst);
    }
}
