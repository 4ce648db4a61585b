//! SOP2: scalar instructions with two source operands.
//!
//! SCC behavior is deliberately uneven across the family, mirroring the
//! hardware: add/adc write carry-out on both paths, SUB_U32 and MUL_I32
//! only ever set it, min/max touch it only when src0 wins, and the
//! logical/shift group writes `dst != 0`.

use gcn_asm::{Inst, Reg};

use crate::operand::{read_op, write_op};
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    match inst.opcode {
        0 => s_add_u32(state, inst),
        1 => s_sub_u32(state, inst),
        2 => s_add_i32(state, inst),
        3 => s_sub_i32(state, inst),
        4 => s_addc_u32(state, inst),
        5 => s_subb_u32(state, inst),
        6 => s_min_i32(state, inst),
        7 => s_min_u32(state, inst),
        8 => s_max_i32(state, inst),
        9 => s_max_u32(state, inst),
        10 => s_cselect_b32(state, inst),
        12 | 13 => logical(state, inst, |a, b| a & b),
        15 => logical(state, inst, |a, b| a | b),
        16 | 17 => logical(state, inst, |a, b| a ^ b),
        19 => logical(state, inst, |a, b| a & !b),
        28 => s_lshl_b32(state, inst),
        29 => s_lshl_b64(state, inst),
        30 => s_lshr_b32(state, inst),
        31 => s_lshr_b64(state, inst),
        32 => s_ashr_i32(state, inst),
        34 => s_bfm_b32(state, inst),
        36 => s_mul_i32(state, inst),
        38 => s_bfe_i32(state, inst),
        opcode => panic!("opcode {opcode} is not implemented for the SOP2 format"),
    }
}

fn write_scc<S: InstState>(state: &mut S, condition: bool) {
    state.write_reg(Reg::Scc, 1, 0, u64::from(condition));
}

fn s_add_u32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    write_scc(state, src0 > u64::from(u32::MAX) - src1);
    write_op(state, inst.dst, 0, src0.wrapping_add(src1));
}

fn s_sub_u32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    if src0 < src1 {
        write_scc(state, true);
    }
    write_op(state, inst.dst, 0, src0.wrapping_sub(src1));
}

fn s_add_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    write_scc(state, src0 > u64::from(u32::MAX) - src1);
    write_op(state, inst.dst, 0, src0.wrapping_add(src1));
}

fn s_sub_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as i32;
    let src1 = read_op(state, inst.src1, 0) as i32;

    let dst = src0.wrapping_sub(src1);
    write_scc(state, (src1 > 0 && dst > src0) || (src1 < 0 && dst < src0));
    write_op(state, inst.dst, 0, u64::from(dst as u32));
}

fn s_addc_u32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as u32;
    let src1 = read_op(state, inst.src1, 0) as u32;
    let scc = state.read_reg(Reg::Scc, 1, 0) as u32;

    let dst = src0.wrapping_add(src1).wrapping_add(scc);
    write_op(state, inst.dst, 0, u64::from(dst));
    write_scc(state, src0 >= u32::MAX.wrapping_sub(scc).wrapping_sub(src1));
}

fn s_subb_u32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);
    let scc = state.read_reg(Reg::Scc, 1, 0);

    write_op(
        state,
        inst.dst,
        0,
        src0.wrapping_sub(src1).wrapping_sub(scc),
    );
    write_scc(state, src0 < src1 + scc);
}

fn s_min_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as i32;
    let src1 = read_op(state, inst.src1, 0) as i32;

    if src0 < src1 {
        write_op(state, inst.dst, 0, src0 as u64);
        write_scc(state, true);
    } else {
        write_op(state, inst.dst, 0, src1 as u64);
    }
}

fn s_min_u32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    if src0 < src1 {
        write_op(state, inst.dst, 0, src0);
        write_scc(state, true);
    } else {
        write_op(state, inst.dst, 0, src1);
    }
}

fn s_max_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as i32;
    let src1 = read_op(state, inst.src1, 0) as i32;

    if src0 > src1 {
        write_op(state, inst.dst, 0, src0 as u64);
        write_scc(state, true);
    } else {
        write_op(state, inst.dst, 0, src1 as u64);
    }
}

fn s_max_u32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    if src0 > src1 {
        write_op(state, inst.dst, 0, src0);
        write_scc(state, true);
    } else {
        write_op(state, inst.dst, 0, src1);
    }
}

fn s_cselect_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);
    let scc = state.read_reg(Reg::Scc, 1, 0);

    write_op(state, inst.dst, 0, if scc == 1 { src0 } else { src1 });
}

/// Shared body of the 32/64-bit logical group: `SCC = (dst != 0)`.
fn logical<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(u64, u64) -> u64) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    let dst = op(src0, src1);
    write_op(state, inst.dst, 0, dst);
    write_scc(state, dst != 0);
}

fn s_lshl_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as u32;
    let src1 = read_op(state, inst.src1, 0) as u8;

    let dst = src0 << (src1 & 0x1f);
    write_op(state, inst.dst, 0, u64::from(dst));
    write_scc(state, dst != 0);
}

fn s_lshl_b64<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0) as u8;

    let dst = src0 << (src1 & 0x3f);
    write_op(state, inst.dst, 0, dst);
    write_scc(state, dst != 0);
}

fn s_lshr_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    let dst = src0 >> (src1 & 0x1f);
    write_op(state, inst.dst, 0, dst);
    write_scc(state, dst != 0);
}

fn s_lshr_b64<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    let dst = src0 >> (src1 & 0x3f);
    write_op(state, inst.dst, 0, dst);
    write_scc(state, dst != 0);
}

fn s_ashr_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as i32;
    let src1 = read_op(state, inst.src1, 0) as u8;

    // Counts past the width keep shifting in sign bits.
    let dst = src0 >> u32::from(src1).min(31);
    write_op(state, inst.dst, 0, u64::from(dst as u32));
    write_scc(state, dst != 0);
}

fn s_bfm_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0);
    let src1 = read_op(state, inst.src1, 0);

    let dst = ((1u64 << (src0 & 0x1f)) - 1) << (src1 & 0x1f);
    write_op(state, inst.dst, 0, dst);
}

fn s_mul_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as i32;
    let src1 = read_op(state, inst.src1, 0) as i32;

    let (dst, overflow) = src0.overflowing_mul(src1);
    write_op(state, inst.dst, 0, u64::from(dst as u32));
    if overflow {
        write_scc(state, true);
    }
}

fn s_bfe_i32<S: InstState>(state: &mut S, inst: &Inst) {
    let src0 = read_op(state, inst.src0, 0) as i32;
    let src1 = read_op(state, inst.src1, 0) as u32;

    let offset = src1 & 0x1f;
    let width = (src1 >> 16) & 0x7f;
    let mask = 1i32.checked_shl(width).unwrap_or(0).wrapping_sub(1);
    let dst = (src0 >> offset) & mask;
    write_op(state, inst.dst, 0, u64::from(dst as u32));
    write_scc(state, dst != 0);
}
