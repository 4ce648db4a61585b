//! VOP1: vector instructions with one source operand.

use gcn_asm::{Inst, Reg, WAVEFRONT_WIDTH};

use super::{as_f32, f32_bits, lane_masked, Alu};
use crate::operand::{read_op, write_op};
use crate::state::InstState;

pub(super) fn run<S: InstState>(alu: &Alu<'_>, state: &mut S, inst: &Inst) {
    match inst.opcode {
        1 => unary(state, inst, |src| src),
        2 => v_readfirstlane_b32(state, inst, alu.broadcast_lane),
        5 => unary(state, inst, |src| f32_bits(src as u32 as i32 as f32)),
        6 => unary(state, inst, |src| f32_bits(src as u32 as f32)),
        7 => v_cvt_u32_f32(state, inst),
        8 => v_cvt_i32_f32(state, inst),
        34 | 35 => unary(state, inst, |src| f32_bits(1.0 / as_f32(src))),
        opcode => panic!("opcode {opcode} is not implemented for the VOP1 format"),
    }
}

/// EXEC-masked per-lane `dst = op(src0)`.
fn unary<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(u64) -> u64) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let src0 = read_op(state, inst.src0, lane);
        write_op(state, inst.dst, lane, op(src0));
    }
}

/// Copies the broadcast lane's Src0 into every lane's destination. The
/// write ignores EXEC.
fn v_readfirstlane_b32<S: InstState>(state: &mut S, inst: &Inst, broadcast_lane: usize) {
    let src0 = read_op(state, inst.src0, broadcast_lane);
    for lane in 0..WAVEFRONT_WIDTH {
        write_op(state, inst.dst, lane, src0);
    }
}

fn v_cvt_u32_f32<S: InstState>(state: &mut S, inst: &Inst) {
    // NaN converts to 0, negatives clamp to 0, large values to u32::MAX.
    unary(state, inst, |src| u64::from(as_f32(src) as u32));
}

fn v_cvt_i32_f32<S: InstState>(state: &mut S, inst: &Inst) {
    unary(state, inst, |src| {
        let truncated = as_f32(src) as i64;
        let clamped = truncated.clamp(-i64::from(i32::MAX), i64::from(i32::MAX));
        u64::from(clamped as i32 as u32)
    });
}

#[cfg(test)]
mod tests {
    use crate::alu::Alu;
    use crate::memory::Pid;
    use crate::state::InstState;
    use crate::wavefront::Wavefront;
    use gcn_asm::{Format, Inst, Operand, Reg};
    use test_case::test_case;

    fn setup(opcode: u16) -> (Alu<'static>, Wavefront, Inst) {
        let mut inst = Inst::new(Format::Vop1, opcode);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.dst = Some(Operand::v_reg(2, 1));
        (Alu::new(None), Wavefront::new(Pid(1)), inst)
    }

    #[test]
    fn v_mov_b32_respects_exec() {
        let (mut alu, mut wf, inst) = setup(1);
        for lane in 0..64 {
            wf.write_reg(Reg::V(0), 1, lane, lane as u64);
        }
        wf.exec = 0x0000_0000_ffff_ffff;
        wf.set_inst(inst);

        alu.run(&mut wf);

        for lane in 0..32 {
            assert_eq!(wf.vreg(lane, 2), lane as u32);
        }
        for lane in 32..64 {
            assert_eq!(wf.vreg(lane, 2), 0);
        }
    }

    #[test]
    fn v_readfirstlane_b32_broadcasts_to_every_lane() {
        let (mut alu, mut wf, inst) = setup(2);
        wf.write_reg(Reg::V(0), 1, 8, 42);
        wf.exec = 1 << 8;
        wf.set_inst(inst);

        alu.run(&mut wf);

        for lane in 0..64 {
            assert_eq!(wf.vreg(lane, 2), 42);
        }
    }

    #[test]
    fn broadcast_lane_is_configurable() {
        let (mut alu, mut wf, inst) = setup(2);
        alu.set_broadcast_lane(3);
        wf.write_reg(Reg::V(0), 1, 3, 7);
        wf.write_reg(Reg::V(0), 1, 8, 42);
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.vreg(0, 2), 7);
    }

    #[test]
    fn v_cvt_f32_i32() {
        let (mut alu, mut wf, inst) = setup(5);
        wf.write_reg(Reg::V(0), 1, 0, (-1i32) as u32 as u64);
        wf.exec = 1;
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(f32::from_bits(wf.vreg(0, 2)), -1.0);
    }

    #[test]
    fn v_cvt_f32_u32() {
        let (mut alu, mut wf, inst) = setup(6);
        wf.write_reg(Reg::V(0), 1, 0, 1);
        wf.exec = 1;
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(f32::from_bits(wf.vreg(0, 2)), 1.0);
    }

    #[test_case(1.0, 1; "exact")]
    #[test_case(f32::NAN, 0; "nan clamps to zero")]
    #[test_case(-1.0, 0; "negative clamps to zero")]
    #[test_case(4_294_967_296.0, u32::MAX; "huge clamps to max")]
    fn v_cvt_u32_f32_saturates(input: f32, expected: u32) {
        let (mut alu, mut wf, inst) = setup(7);
        wf.write_reg(Reg::V(0), 1, 0, u64::from(input.to_bits()));
        wf.exec = 1;
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.vreg(0, 2), expected);
    }

    #[test_case(1.5, 1; "truncates")]
    #[test_case(-1.5, -1; "truncates toward zero")]
    #[test_case(f32::NAN, 0; "nan clamps to zero")]
    #[test_case(-2_147_483_904.0, -i32::MAX; "huge negative clamps")]
    fn v_cvt_i32_f32_saturates(input: f32, expected: i32) {
        let (mut alu, mut wf, inst) = setup(8);
        wf.write_reg(Reg::V(0), 1, 0, u64::from(input.to_bits()));
        wf.exec = 1;
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.vreg(0, 2) as i32, expected);
    }

    #[test_case(34; "rcp")]
    #[test_case(35; "rcp iflag")]
    fn v_rcp_f32(opcode: u16) {
        let (mut alu, mut wf, inst) = setup(opcode);
        wf.write_reg(Reg::V(0), 1, 0, u64::from(1.0f32.to_bits()));
        wf.write_reg(Reg::V(0), 1, 1, u64::from(2.0f32.to_bits()));
        wf.exec = 0x3;
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(f32::from_bits(wf.vreg(0, 2)), 1.0);
        assert_eq!(f32::from_bits(wf.vreg(1, 2)), 0.5);
    }

    #[test]
    #[should_panic(expected = "not implemented for the VOP1 format")]
    fn unknown_opcode_panics() {
        let (mut alu, mut wf, _) = setup(1);
        wf.set_inst(Inst::new(Format::Vop1, 60));
        alu.run(&mut wf);
    }
}
