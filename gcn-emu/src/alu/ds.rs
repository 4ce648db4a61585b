//! DS: local data share reads and writes.
//!
//! Addresses come from a vector operand plus the two immediate offsets.
//! The WRITE2/READ2 forms scale the offsets by the element size (x4 for
//! 32-bit, x8 for 64-bit); DS_READ_B64 uses the raw address and ignores
//! the offsets entirely.

use gcn_asm::{Inst, Reg, WAVEFRONT_WIDTH};

use super::{lane_masked, Alu};
use crate::bytes::{u32_from_le, u64_from_le, words_from_le};
use crate::operand::{read_op, write_op, write_op_wide};
use crate::state::InstState;

pub(super) fn run<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    match inst.opcode {
        13 => ds_write_b32(alu, state, inst),
        14 => ds_write2_b32(alu, state, inst),
        54 => ds_read_b32(alu, state, inst),
        55 => ds_read2_b32(alu, state, inst),
        78 => ds_write2_b64(alu, state, inst),
        118 => ds_read_b64(alu, state, inst),
        119 => ds_read2_b64(alu, state, inst),
        opcode => panic!("opcode {opcode} is not implemented for the DS format"),
    }
}

fn ds_write_b32<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let addr = read_op(state, inst.addr, lane) as u32 + inst.offset0;
        let data = read_op(state, inst.data, lane) as u32;

        let lds = alu.lds_slice();
        lds[addr as usize..addr as usize + 4].copy_from_slice(&data.to_le_bytes());
    }
}

fn ds_write2_b32<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let base = read_op(state, inst.addr, lane) as u32;
        let addr0 = (base + inst.offset0 * 4) as usize;
        let addr1 = (base + inst.offset1 * 4) as usize;
        let data = read_op(state, inst.data, lane) as u32;
        let data1 = read_op(state, inst.data1, lane) as u32;

        let lds = alu.lds_slice();
        lds[addr0..addr0 + 4].copy_from_slice(&data.to_le_bytes());
        lds[addr1..addr1 + 4].copy_from_slice(&data1.to_le_bytes());
    }
}

fn ds_read_b32<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let addr = (read_op(state, inst.addr, lane) as u32 + inst.offset0) as usize;
        let value = u32_from_le(&alu.lds_slice()[addr..addr + 4]);
        write_op(state, inst.dst, lane, u64::from(value));
    }
}

fn ds_read2_b32<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let base = read_op(state, inst.addr, lane) as u32;
        let addr0 = (base + inst.offset0 * 4) as usize;
        let addr1 = (base + inst.offset1 * 4) as usize;

        let lds = alu.lds_slice();
        let low = u32_from_le(&lds[addr0..addr0 + 4]);
        let high = u32_from_le(&lds[addr1..addr1 + 4]);
        write_op(state, inst.dst, lane, u64::from(high) << 32 | u64::from(low));
    }
}

fn ds_write2_b64<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let base = read_op(state, inst.addr, lane) as u32;
        let addr0 = (base + inst.offset0 * 8) as usize;
        let addr1 = (base + inst.offset1 * 8) as usize;
        let data = read_op(state, inst.data, lane);
        let data1 = read_op(state, inst.data1, lane);

        let lds = alu.lds_slice();
        lds[addr0..addr0 + 8].copy_from_slice(&data.to_le_bytes());
        lds[addr1..addr1 + 8].copy_from_slice(&data1.to_le_bytes());
    }
}

fn ds_read_b64<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let addr = read_op(state, inst.addr, lane) as usize;
        let value = u64_from_le(&alu.lds_slice()[addr..addr + 8]);
        write_op(state, inst.dst, lane, value);
    }
}

fn ds_read2_b64<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let base = read_op(state, inst.addr, lane) as u32;
        let addr0 = (base + inst.offset0 * 8) as usize;
        let addr1 = (base + inst.offset1 * 8) as usize;

        let lds = alu.lds_slice();
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(&lds[addr0..addr0 + 8]);
        buf.extend_from_slice(&lds[addr1..addr1 + 8]);
        write_op_wide(state, inst.dst, lane, &words_from_le(&buf));
    }
}
