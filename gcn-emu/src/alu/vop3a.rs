//! VOP3a: three-address vector instructions.
//!
//! The low opcode range re-encodes the VOPC compares with the lane mask
//! routed to a scalar destination instead of VCC. Source modifiers (abs,
//! neg) are applied up front by rewriting the source registers, keyed off
//! the type suffix of the mnemonic; output modifiers are unsupported.

use gcn_asm::{Inst, Reg, WAVEFRONT_WIDTH};

use super::{as_f32, f32_bits, lane_masked, vopc};
use crate::operand::{read_op, write_op};
use crate::state::InstState;

pub(super) fn run<S: InstState>(state: &mut S, inst: &Inst) {
    preprocess(state, inst);

    match inst.opcode {
        0x41..=0x46 | 0xc1..=0xc6 | 0xc9..=0xce => {
            let mask = vopc::compare(state, inst);
            write_op(state, inst.dst, 0, mask);
        }
        256 => v_cndmask_b32(state, inst),
        451 | 488 => v_mad_u64_u32(state, inst),
        645 => lanewise(state, inst, |state, lane| {
            read_op(state, inst.src0, lane).wrapping_mul(read_op(state, inst.src1, lane))
        }),
        646 => lanewise(state, inst, |state, lane| {
            read_op(state, inst.src0, lane).wrapping_mul(read_op(state, inst.src1, lane)) >> 32
        }),
        655 => v_lshlrev_b64(state, inst),
        657 => v_ashrrev_i64(state, inst),
        opcode => panic!("opcode {opcode} is not implemented for the VOP3a format"),
    }

    postprocess(inst);
}

/// Applies the abs/neg source modifiers in place.
pub(super) fn preprocess<S: InstState>(state: &mut S, inst: &Inst) {
    if inst.abs != 0 {
        apply_abs(state, inst);
    }
    if inst.neg != 0 {
        apply_neg(state, inst);
    }
}

/// Rejects output modifiers, which the emulator does not model.
pub(super) fn postprocess(inst: &Inst) {
    if inst.omod != 0 {
        panic!("output modifier {} on {} is not supported", inst.omod, inst.name);
    }
}

fn apply_abs<S: InstState>(state: &mut S, inst: &Inst) {
    let name = inst.name.to_ascii_lowercase();
    if name.contains("f32") {
        rewrite_sources(state, inst, inst.abs, |bits| {
            f32_bits(as_f32(bits).abs())
        });
    } else {
        tracing::warn!(inst = %inst.name, "absolute-value modifier not implemented");
    }
}

fn apply_neg<S: InstState>(state: &mut S, inst: &Inst) {
    let name = inst.name.to_ascii_lowercase();
    if name.contains("f64") {
        rewrite_sources(state, inst, inst.neg, |bits| {
            (-f64::from_bits(bits)).to_bits()
        });
    } else if name.contains("f32") {
        rewrite_sources(state, inst, inst.neg, |bits| f32_bits(-as_f32(bits)));
    } else if name.contains("b32") {
        rewrite_sources(state, inst, inst.neg, |bits| {
            u64::from((bits as i32).wrapping_neg() as u32)
        });
    } else {
        tracing::warn!(inst = %inst.name, "negation modifier not implemented");
    }
}

/// Rewrites each source selected by the modifier mask, on every lane.
fn rewrite_sources<S: InstState>(
    state: &mut S,
    inst: &Inst,
    mask: u8,
    op: impl Fn(u64) -> u64,
) {
    let slots = [inst.src0, inst.src1, inst.src2];
    for (bit, slot) in slots.into_iter().enumerate() {
        if mask & (1 << bit) == 0 {
            continue;
        }
        for lane in 0..WAVEFRONT_WIDTH {
            let value = read_op(state, slot, lane);
            write_op(state, slot, lane, op(value));
        }
    }
}

/// EXEC-masked per-lane evaluation writing the destination.
fn lanewise<S: InstState>(state: &mut S, inst: &Inst, op: impl Fn(&S, usize) -> u64) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let value = op(state, lane);
        write_op(state, inst.dst, lane, value);
    }
}

fn v_cndmask_b32<S: InstState>(state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let src0 = read_op(state, inst.src0, lane);
        let src1 = read_op(state, inst.src1, lane);
        let src2 = read_op(state, inst.src2, lane);

        let value = if src2 & (1 << lane) != 0 { src1 } else { src0 };
        write_op(state, inst.dst, lane, value);
    }
}

fn v_mad_u64_u32<S: InstState>(state: &mut S, inst: &Inst) {
    lanewise(state, inst, |state, lane| {
        let src0 = read_op(state, inst.src0, lane);
        let src1 = read_op(state, inst.src1, lane);
        let src2 = read_op(state, inst.src2, lane);
        src0.wrapping_mul(src1).wrapping_add(src2)
    });
}

fn v_lshlrev_b64<S: InstState>(state: &mut S, inst: &Inst) {
    lanewise(state, inst, |state, lane| {
        let count = read_op(state, inst.src0, lane);
        let src1 = read_op(state, inst.src1, lane);
        if count >= 64 {
            0
        } else {
            src1 << count
        }
    });
}

fn v_ashrrev_i64<S: InstState>(state: &mut S, inst: &Inst) {
    lanewise(state, inst, |state, lane| {
        let count = read_op(state, inst.src0, lane).min(63);
        let src1 = read_op(state, inst.src1, lane) as i64;
        (src1 >> count) as u64
    });
}

#[cfg(test)]
mod tests {
    use crate::alu::Alu;
    use crate::memory::Pid;
    use crate::state::InstState;
    use crate::wavefront::Wavefront;
    use gcn_asm::{Format, Inst, Operand, Reg};

    fn setup() -> (Alu<'static>, Wavefront) {
        (Alu::new(None), Wavefront::new(Pid(1)))
    }

    #[test]
    fn compares_write_the_scalar_destination() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::new(Format::Vop3a, 0xc4);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.dst = Some(Operand::s_reg(0, 2));
        wf.exec = 0xf;
        let pairs: [(i32, i32); 4] = [(1, 1), (-1, -2), (1, 0), (1, 2)];
        for (lane, (a, b)) in pairs.into_iter().enumerate() {
            wf.write_reg(Reg::V(0), 1, lane, u64::from(a as u32));
            wf.write_reg(Reg::V(1), 1, lane, u64::from(b as u32));
        }
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.read_reg(Reg::S(0), 2, 0), 0x6);
        assert_eq!(wf.vcc, 0);
    }

    #[test]
    fn v_cmp_le_u32_over_the_full_wavefront() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::new(Format::Vop3a, 0xcb);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.dst = Some(Operand::s_reg(0, 2));
        wf.exec = u64::MAX;
        for lane in 0..64 {
            wf.write_reg(Reg::V(0), 1, lane, 1);
            wf.write_reg(Reg::V(1), 1, lane, 1);
        }
        wf.write_reg(Reg::V(1), 1, 1, 2);
        wf.write_reg(Reg::V(1), 1, 2, 0);
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.read_reg(Reg::S(0), 2, 0), !0x4u64);
    }

    #[test]
    fn v_cndmask_b32_reads_the_mask_from_src2() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::new(Format::Vop3a, 256);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.src2 = Some(Operand::s_reg(0, 2));
        inst.dst = Some(Operand::v_reg(2, 1));
        wf.exec = 0x3;
        wf.write_reg(Reg::S(0), 2, 0, 0b10);
        for lane in 0..2 {
            wf.write_reg(Reg::V(0), 1, lane, 10);
            wf.write_reg(Reg::V(1), 1, lane, 20);
        }
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.vreg(0, 2), 10);
        assert_eq!(wf.vreg(1, 2), 20);
    }

    #[test]
    fn v_mad_u64_u32() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::new(Format::Vop3a, 451);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.src2 = Some(Operand::v_reg(2, 2));
        inst.dst = Some(Operand::v_reg(4, 2));
        wf.exec = 1;
        wf.write_reg(Reg::V(0), 1, 0, 0x8000_0000);
        wf.write_reg(Reg::V(1), 1, 0, 4);
        wf.write_reg(Reg::V(2), 2, 0, 10);
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.read_reg(Reg::V(4), 2, 0), 0x2_0000_000a);
    }

    #[test]
    fn unsigned_multiplies() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::new(Format::Vop3a, 645);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.dst = Some(Operand::v_reg(2, 1));
        wf.exec = 1;
        wf.write_reg(Reg::V(0), 1, 0, 0x8000_0001);
        wf.write_reg(Reg::V(1), 1, 0, 4);
        wf.set_inst(inst.clone());
        alu.run(&mut wf);
        assert_eq!(wf.vreg(0, 2), 4);

        inst.opcode = 646;
        wf.set_inst(inst);
        alu.run(&mut wf);
        assert_eq!(wf.vreg(0, 2), 2);
    }

    #[test]
    fn wide_shifts() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::new(Format::Vop3a, 655);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(2, 2));
        inst.dst = Some(Operand::v_reg(4, 2));
        wf.exec = 1;
        wf.write_reg(Reg::V(0), 1, 0, 40);
        wf.write_reg(Reg::V(2), 2, 0, 3);
        wf.set_inst(inst.clone());
        alu.run(&mut wf);
        assert_eq!(wf.read_reg(Reg::V(4), 2, 0), 3 << 40);

        inst.opcode = 657;
        wf.write_reg(Reg::V(2), 2, 0, (-(1i64 << 40)) as u64);
        wf.set_inst(inst);
        alu.run(&mut wf);
        assert_eq!(wf.read_reg(Reg::V(4), 2, 0) as i64, -1);
    }

    #[test]
    fn abs_modifier_rewrites_f32_sources() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::named(Format::Vop3a, 0x44, "v_cmp_gt_f32");
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.dst = Some(Operand::s_reg(0, 2));
        inst.abs = 0b01;
        wf.exec = 1;
        wf.write_reg(Reg::V(0), 1, 0, u64::from((-1.5f32).to_bits()));
        wf.write_reg(Reg::V(1), 1, 0, u64::from(1.0f32.to_bits()));
        wf.set_inst(inst);

        alu.run(&mut wf);

        // |−1.5| > 1.0 on lane 0.
        assert_eq!(wf.read_reg(Reg::S(0), 2, 0), 1);
        assert_eq!(f32::from_bits(wf.vreg(0, 0)), 1.5);
    }

    #[test]
    fn neg_modifier_rewrites_b32_sources() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::named(Format::Vop3a, 256, "v_cndmask_b32");
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.src2 = Some(Operand::s_reg(0, 2));
        inst.dst = Some(Operand::v_reg(2, 1));
        inst.neg = 0b01;
        wf.exec = 1;
        wf.write_reg(Reg::V(0), 1, 0, 10);
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.vreg(0, 2) as i32, -10);
    }

    #[test]
    #[should_panic(expected = "output modifier")]
    fn omod_is_fatal() {
        let (mut alu, mut wf) = setup();
        let mut inst = Inst::new(Format::Vop3a, 645);
        inst.src0 = Some(Operand::v_reg(0, 1));
        inst.src1 = Some(Operand::v_reg(1, 1));
        inst.dst = Some(Operand::v_reg(2, 1));
        inst.omod = 1;
        wf.exec = 1;
        wf.set_inst(inst);
        alu.run(&mut wf);
    }

    #[test]
    #[should_panic(expected = "not implemented for the VOP3a format")]
    fn unknown_opcode_panics() {
        let (mut alu, mut wf) = setup();
        wf.set_inst(Inst::new(Format::Vop3a, 700));
        alu.run(&mut wf);
    }
}
