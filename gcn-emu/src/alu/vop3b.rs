//! VOP3b: three-address vector arithmetic with a scalar carry destination.
//!
//! Each active lane ORs its carry/borrow bit into the SDst mask; bits of
//! lanes that produce no carry are left as they were. The destination is
//! truncated to 32 bits after the carry is detected.

use gcn_asm::{Inst, Reg, WAVEFRONT_WIDTH};

use super::{lane_masked, vop3a};
use crate::operand::{read_op, write_op};
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    vop3a::preprocess(state, inst);

    match inst.opcode {
        281 => carry_out(state, inst, |a, b| a + b),
        282 => carry_out(state, inst, |a, b| a.wrapping_sub(b)),
        283 => carry_out(state, inst, |a, b| b.wrapping_sub(a)),
        284 => carry_through(state, inst, |a, b, c| a + b + c),
        285 => carry_through(state, inst, |a, b, c| a.wrapping_sub(b).wrapping_sub(c)),
        286 => carry_through(state, inst, |a, b, c| b.wrapping_sub(a).wrapping_sub(c)),
        opcode => panic!("opcode {opcode} is not implemented for the VOP3b format"),
    }

    vop3a::postprocess(inst);
}

/// The 64-bit intermediate exceeds 32 bits exactly when the op carried or
/// borrowed (subtractions wrap below zero).
fn overflowed(value: u64) -> bool {
    value > u64::from(u32::MAX)
}

fn or_sdst_bit<S: InstState>(state: &mut S, inst: &Inst, lane: usize) {
    let sdst = read_op(state, inst.sdst, lane);
    write_op(state, inst.sdst, lane, sdst | 1 << lane);
}

fn carry_out<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(u64, u64) -> u64) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let src0 = read_op(state, inst.src0, lane);
        let src1 = read_op(state, inst.src1, lane);

        let dst = op(src0, src1);
        write_op(state, inst.dst, lane, dst & 0xffff_ffff);
        if overflowed(dst) {
            or_sdst_bit(state, inst, lane);
        }
    }
}

/// Like [`carry_out`], with the per-lane carry/borrow-in taken from Src2.
fn carry_through<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(u64, u64, u64) -> u64) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let src0 = read_op(state, inst.src0, lane);
        let src1 = read_op(state, inst.src1, lane);
        let src2 = read_op(state, inst.src2, lane);
        let carry_in = src2 >> lane & 1;

        let dst = op(src0, src1, carry_in);
        write_op(state, inst.dst, lane, dst & 0xffff_ffff);
        if overflowed(dst) {
            or_sdst_bit(state, inst, lane);
        }
    }
}
