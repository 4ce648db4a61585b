//! VOP2: vector instructions with two source operands.
//!
//! Every op iterates the lanes under EXEC. When the SDWA word is present
//! the sources are first reduced by their byte/word selectors and the
//! result is placed into the destination's selected field, other bits
//! zeroed. The integer add/sub group communicates carry and borrow through
//! the per-lane VCC bit.

use gcn_asm::{Inst, Reg, WAVEFRONT_WIDTH};

use super::lane_masked;
use crate::operand::{read_op, write_op};
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    match inst.opcode {
        0 => v_cndmask_b32(state, inst),
        1 => binary_f32(state, inst, |a, b| a + b),
        2 => binary_f32(state, inst, |a, b| a - b),
        3 => binary_f32(state, inst, |a, b| b - a),
        5 => binary_f32(state, inst, |a, b| a * b),
        10 => binary_f32(state, inst, |a, b| if a < b { a } else { b }),
        11 => binary_f32(state, inst, |a, b| if a > b { a } else { b }),
        12 => binary(state, inst, |a, b| (a as i32).min(b as i32) as u32),
        13 => binary(state, inst, |a, b| (a as i32).max(b as i32) as u32),
        14 => binary(state, inst, |a, b| a.min(b)),
        15 => binary(state, inst, |a, b| a.max(b)),
        16 => binary(state, inst, |a, b| b >> (a & 0x1f)),
        17 => binary(state, inst, |a, b| ((b as i32) >> (a & 0x1f)) as u32),
        18 => binary(state, inst, |a, b| b << (a & 0x1f)),
        19 => binary(state, inst, |a, b| a & b),
        20 => binary(state, inst, |a, b| a | b),
        21 => binary(state, inst, |a, b| a ^ b),
        22 => v_mac_f32(state, inst),
        25 => v_add_i32(state, inst),
        26 => carry_out(state, inst, |a, b| (a.wrapping_sub(b), a < b)),
        27 => carry_out(state, inst, |a, b| (b.wrapping_sub(a), b < a)),
        28 => v_addc_u32(state, inst),
        29 => borrow_through(state, inst, |a, b, c| {
            (
                a.wrapping_sub(b).wrapping_sub(c),
                u64::from(a) < u64::from(b) + u64::from(c),
            )
        }),
        30 => borrow_through(state, inst, |a, b, c| {
            (
                b.wrapping_sub(a).wrapping_sub(c),
                u64::from(b) < u64::from(a) + u64::from(c),
            )
        }),
        opcode => panic!("opcode {opcode} is not implemented for the VOP2 format"),
    }
}

/// Reads both sources for one lane, applying SDWA selection if present.
fn sources<S: InstState>(state: &S, inst: &Inst, lane: usize) -> (u32, u32) {
    let mut src0 = read_op(state, inst.src0, lane) as u32;
    let mut src1 = read_op(state, inst.src1, lane) as u32;
    if inst.is_sdwa {
        src0 = inst.src0_sel.select(src0);
        src1 = inst.src1_sel.select(src1);
    }
    (src0, src1)
}

/// Writes one lane's result, applying SDWA destination selection if present.
fn write_dst<S: InstState>(state: &mut S, inst: &Inst, lane: usize, value: u32) {
    let value = if inst.is_sdwa {
        inst.dst_sel.merge(value)
    } else {
        value
    };
    write_op(state, inst.dst, lane, u64::from(value));
}

fn set_vcc_bit<S: InstState>(state: &mut S, lane: usize, bit: bool) {
    let vcc = state.read_reg(Reg::Vcc, 1, 0);
    let vcc = if bit {
        vcc | 1 << lane
    } else {
        vcc & !(1 << lane)
    };
    state.write_reg(Reg::Vcc, 1, 0, vcc);
}

fn vcc_bit<S: InstState>(state: &S, lane: usize) -> u32 {
    (state.read_reg(Reg::Vcc, 1, 0) >> lane & 1) as u32
}

/// EXEC-masked per-lane `dst = op(src0, src1)`.
fn binary<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(u32, u32) -> u32) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let (src0, src1) = sources(state, inst, lane);
        write_dst(state, inst, lane, op(src0, src1));
    }
}

fn binary_f32<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(f32, f32) -> f32) {
    binary(state, inst, |a, b| {
        op(f32::from_bits(a), f32::from_bits(b)).to_bits()
    });
}

/// Integer ops whose per-lane carry/borrow lands in VCC.
fn carry_out<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(u32, u32) -> (u32, bool)) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let (src0, src1) = sources(state, inst, lane);
        let (dst, carry) = op(src0, src1);
        write_dst(state, inst, lane, dst);
        set_vcc_bit(state, lane, carry);
    }
}

/// Integer ops that both consume and produce the per-lane VCC bit.
fn borrow_through<S: InstState>(
    state: &mut S,
    inst: &Inst,
    op: impl Fn(u32, u32, u32) -> (u32, bool),
) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let (src0, src1) = sources(state, inst, lane);
        let carry_in = vcc_bit(state, lane);
        let (dst, carry) = op(src0, src1, carry_in);
        write_dst(state, inst, lane, dst);
        set_vcc_bit(state, lane, carry);
    }
}

fn v_cndmask_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    let vcc = state.read_reg(Reg::Vcc, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let (src0, src1) = sources(state, inst, lane);
        let value = if vcc >> lane & 1 != 0 { src1 } else { src0 };
        write_dst(state, inst, lane, value);
    }
}

/// `dst = src0 * src1 + dst`; the accumulator reads the raw destination.
fn v_mac_f32<S: InstState>(state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let (src0, src1) = sources(state, inst, lane);
        let acc = f32::from_bits(read_op(state, inst.dst, lane) as u32);
        let result = f32::from_bits(src0) * f32::from_bits(src1) + acc;
        write_dst(state, inst, lane, result.to_bits());
    }
}

fn v_add_i32<S: InstState>(state: &mut S, inst: &Inst) {
    carry_out(state, inst, |a, b| {
        let sum = u64::from(a) + u64::from(b);
        (sum as u32, sum > u64::from(u32::MAX))
    });
}

fn v_addc_u32<S: InstState>(state: &mut S, inst: &Inst) {
    borrow_through(state, inst, |a, b, c| {
        let sum = u64::from(a) + u64::from(b) + u64::from(c);
        (sum as u32, sum > u64::from(u32::MAX))
    });
}
