//! VOPC: vector compares.
//!
//! Each active lane contributes one bit to a 64-bit mask; inactive lanes
//! contribute 0. In the VOPC encoding the mask replaces VCC; the VOP3a
//! encoding of the same opcodes routes it to a scalar destination instead
//! and reuses [`compare`].

use gcn_asm::{Format, Inst, Reg, WAVEFRONT_WIDTH};

use super::{as_f32, lane_masked};
use crate::operand::read_op;
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    let mask = compare(state, inst);
    state.write_reg(Reg::Vcc, 1, 0, mask);
}

/// Evaluates the compare over all active lanes and returns the lane mask.
pub(super) fn compare<S: InstState>(state: &mut S, inst: &Inst) -> u64 {
    let predicate = predicate(inst.format, inst.opcode);
    let exec = state.read_reg(Reg::Exec, 1, 0);

    let mut mask = 0u64;
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let src0 = read_op(state, inst.src0, lane);
        let src1 = read_op(state, inst.src1, lane);
        if predicate(src0, src1) {
            mask |= 1 << lane;
        }
    }
    mask
}

fn predicate(format: Format, opcode: u16) -> fn(u64, u64) -> bool {
    match opcode {
        // F32
        0x41 => |a, b| as_f32(a) < as_f32(b),
        0x42 => |a, b| as_f32(a) == as_f32(b),
        0x43 => |a, b| as_f32(a) <= as_f32(b),
        0x44 => |a, b| as_f32(a) > as_f32(b),
        0x45 => |a, b| as_f32(a) != as_f32(b),
        0x46 => |a, b| as_f32(a) >= as_f32(b),
        // I32
        0xc1 => |a, b| (a as i32) < (b as i32),
        0xc2 => |a, b| (a as i32) == (b as i32),
        0xc3 => |a, b| (a as i32) <= (b as i32),
        0xc4 => |a, b| (a as i32) > (b as i32),
        0xc5 => |a, b| (a as i32) != (b as i32),
        0xc6 => |a, b| (a as i32) >= (b as i32),
        // U32
        0xc9 => |a, b| (a as u32) < (b as u32),
        0xca => |a, b| (a as u32) == (b as u32),
        0xcb => |a, b| (a as u32) <= (b as u32),
        0xcc => |a, b| (a as u32) > (b as u32),
        0xcd => |a, b| (a as u32) != (b as u32),
        0xce => |a, b| (a as u32) >= (b as u32),
        opcode => panic!("compare opcode {opcode} is not implemented for the {format} format"),
    }
}
