//! SOPC: scalar compares. Two sources, result goes to SCC.

use gcn_asm::{Inst, Reg};

use crate::operand::read_op;
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);
    let signed = (src0 as i32, src1 as i32);
    let unsigned = (src0 as u32, src1 as u32);

    let result = match inst.opcode {
        0 => signed.0 == signed.1,
        1 => signed.0 != signed.1,
        2 => signed.0 > signed.1,
        3 => signed.0 >= signed.1,
        4 => signed.0 < signed.1,
        5 => signed.0 <= signed.1,
        6 => unsigned.0 == unsigned.1,
        7 => unsigned.0 != unsigned.1,
        8 => unsigned.0 > unsigned.1,
        9 => unsigned.0 >= unsigned.1,
        10 => unsigned.0 < unsigned.1,
        11 => unsigned.0 <= unsigned.1,
        opcode => panic!("opcode {opcode} is not implemented for the SOPC format"),
    };

    state.write_reg(Reg::Scc, 1, 0, u64::from(result));
}
