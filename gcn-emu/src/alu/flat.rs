//! FLAT: per-lane loads and stores through the generic address space.
//!
//! Each active lane carries its own 64-bit address; translation runs once
//! per lane. Sub-word loads zero-extend.

use gcn_asm::{Inst, Reg, WAVEFRONT_WIDTH};

use super::{lane_masked, Alu};
use crate::bytes::{words_from_le, zext_from_le};
use crate::operand::{read_op, write_op, write_op_wide};
use crate::state::InstState;

pub(super) fn run<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst) {
    match inst.opcode {
        16 => load(alu, state, inst, 1),
        18 => load(alu, state, inst, 2),
        20 => load(alu, state, inst, 4),
        21 => load(alu, state, inst, 8),
        23 => load_dwordx4(alu, state, inst),
        28 => store(alu, state, inst, 4),
        29 => store(alu, state, inst, 8),
        opcode @ (30 | 31) => {
            panic!("FLAT stores wider than DWORDX2 are not implemented (opcode {opcode})")
        }
        opcode => panic!("opcode {opcode} is not implemented for the FLAT format"),
    }
}

fn load<S: InstState>(alu: &Alu<'_>, state: &mut S, inst: &Inst, len: usize) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    let pid = state.pid();

    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let addr = read_op(state, inst.addr, lane);
        let buf = alu.memory().read(pid, addr, len as u64);
        write_op(state, inst.dst, lane, zext_from_le(&buf, len));
    }
}

fn load_dwordx4<S: InstState>(alu: &Alu<'_>, state: &mut S, inst: &Inst) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    let pid = state.pid();

    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let addr = read_op(state, inst.addr, lane);
        let buf = alu.memory().read(pid, addr, 16);
        write_op_wide(state, inst.dst, lane, &words_from_le(&buf));
    }
}

fn store<S: InstState>(alu: &mut Alu<'_>, state: &mut S, inst: &Inst, len: usize) {
    let exec = state.read_reg(Reg::Exec, 1, 0);
    let pid = state.pid();

    for lane in 0..WAVEFRONT_WIDTH {
        if !lane_masked(exec, lane) {
            continue;
        }
        let data = read_op(state, inst.data, lane);
        let addr = read_op(state, inst.addr, lane);
        alu.memory_mut().write(pid, addr, &data.to_le_bytes()[..len]);
    }
}

#[cfg(test)]
mod tests {
    use crate::alu::Alu;
    use crate::memory::{
        InterleavingConverter, Page, PageTable, Pid, Storage, StorageAccessor,
    };
    use crate::state::InstState;
    use crate::wavefront::Wavefront;
    use gcn_asm::{Format, Inst, Operand, Reg};

    struct DirectMapped;

    impl PageTable for DirectMapped {
        fn find(&self, _pid: Pid, vaddr: u64) -> Option<Page> {
            Some(Page {
                paddr: vaddr & !0xfff,
            })
        }
    }

    fn alu_with_memory() -> Alu<'static> {
        let accessor = StorageAccessor::new(
            Storage::new(1 << 20),
            Box::new(DirectMapped),
            12,
            InterleavingConverter::identity(1 << 20),
        );
        Alu::new(Some(accessor))
    }

    fn seed_word(alu: &mut Alu<'_>, addr: u64, word: u32) {
        alu.accessor_mut()
            .unwrap()
            .storage_mut()
            .write(addr, &word.to_le_bytes())
            .unwrap();
    }

    fn wf_with_addresses(stride: u64) -> Wavefront {
        let mut wf = Wavefront::new(Pid(1));
        for lane in 0..64 {
            wf.write_reg(Reg::V(0), 2, lane, lane as u64 * stride);
        }
        wf.exec = u64::MAX;
        wf
    }

    #[test]
    fn flat_load_ubyte_zero_extends() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(4);
        for lane in 0..64u64 {
            seed_word(&mut alu, lane * 4, lane as u32 | 0xffff_ff00);
        }

        let mut inst = Inst::new(Format::Flat, 16);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.dst = Some(Operand::v_reg(2, 1));
        wf.set_inst(inst);

        alu.run(&mut wf);

        for lane in 0..64 {
            assert_eq!(wf.vreg(lane, 2), lane as u32 & 0xff);
        }
    }

    #[test]
    fn flat_load_ushort_zero_extends() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(4);
        for lane in 0..64u64 {
            seed_word(&mut alu, lane * 4, lane as u32 | 0xffff_0000);
        }

        let mut inst = Inst::new(Format::Flat, 18);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.dst = Some(Operand::v_reg(2, 1));
        wf.set_inst(inst);

        alu.run(&mut wf);

        for lane in 0..64 {
            assert_eq!(wf.vreg(lane, 2), lane as u32);
        }
    }

    #[test]
    fn flat_load_dword() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(4);
        for lane in 0..64u64 {
            seed_word(&mut alu, lane * 4, lane as u32);
        }

        let mut inst = Inst::new(Format::Flat, 20);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.dst = Some(Operand::v_reg(2, 1));
        wf.set_inst(inst);

        alu.run(&mut wf);

        for lane in 0..64 {
            assert_eq!(wf.vreg(lane, 2), lane as u32);
        }
    }

    #[test]
    fn flat_load_dwordx2() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(8);
        for lane in 0..64u64 {
            seed_word(&mut alu, lane * 8, lane as u32);
            seed_word(&mut alu, lane * 8 + 4, lane as u32);
        }

        let mut inst = Inst::new(Format::Flat, 21);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.dst = Some(Operand::v_reg(2, 2));
        wf.set_inst(inst);

        alu.run(&mut wf);

        for lane in 0..64u64 {
            assert_eq!(wf.read_reg(Reg::V(2), 2, lane as usize), lane << 32 | lane);
        }
    }

    #[test]
    fn flat_load_dwordx4_uses_the_bulk_path() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(16);
        for lane in 0..64u64 {
            for word in 0..4 {
                seed_word(&mut alu, lane * 16 + word * 4, (lane * 10 + word) as u32);
            }
        }

        let mut inst = Inst::new(Format::Flat, 23);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.dst = Some(Operand::v_reg(4, 4));
        wf.set_inst(inst);

        alu.run(&mut wf);

        for lane in 0..64usize {
            let mut regs = [0u32; 4];
            wf.read_reg_bulk(Reg::V(4), 4, lane, &mut regs);
            let base = lane as u32 * 10;
            assert_eq!(regs, [base, base + 1, base + 2, base + 3]);
        }
    }

    #[test]
    fn flat_store_dword_round_trips() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(4);
        for lane in 0..64 {
            wf.write_reg(Reg::V(2), 1, lane, lane as u64 + 100);
        }

        let mut inst = Inst::new(Format::Flat, 28);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.data = Some(Operand::v_reg(2, 1));
        wf.set_inst(inst);
        alu.run(&mut wf);

        let mut inst = Inst::new(Format::Flat, 20);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.dst = Some(Operand::v_reg(3, 1));
        wf.set_inst(inst);
        alu.run(&mut wf);

        for lane in 0..64 {
            assert_eq!(wf.vreg(lane, 3), lane as u32 + 100);
        }
    }

    #[test]
    fn flat_store_dwordx2() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(8);
        for lane in 0..64u64 {
            wf.write_reg(Reg::V(2), 2, lane as usize, lane << 32 | 0xaaaa_bbbb);
        }

        let mut inst = Inst::new(Format::Flat, 29);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.data = Some(Operand::v_reg(2, 2));
        wf.set_inst(inst);
        alu.run(&mut wf);

        let storage = alu.accessor().unwrap().storage();
        for lane in 0..64u64 {
            let bytes = storage.read(lane * 8, 8).unwrap();
            let mut word = [0u8; 8];
            word.copy_from_slice(bytes);
            assert_eq!(u64::from_le_bytes(word), lane << 32 | 0xaaaa_bbbb);
        }
    }

    #[test]
    fn inactive_lanes_do_not_touch_memory() {
        let mut alu = alu_with_memory();
        let mut wf = wf_with_addresses(4);
        wf.exec = 0b1;
        for lane in 0..64 {
            wf.write_reg(Reg::V(2), 1, lane, 7);
        }

        let mut inst = Inst::new(Format::Flat, 28);
        inst.addr = Some(Operand::v_reg(0, 2));
        inst.data = Some(Operand::v_reg(2, 1));
        wf.set_inst(inst);
        alu.run(&mut wf);

        let storage = alu.accessor().unwrap().storage();
        assert_eq!(storage.read(0, 4).unwrap(), &7u32.to_le_bytes());
        assert_eq!(storage.read(4, 4).unwrap(), &[0; 4]);
    }

    #[test]
    #[should_panic(expected = "FLAT stores wider than DWORDX2")]
    fn wide_stores_are_fatal() {
        let mut alu = alu_with_memory();
        let mut wf = Wavefront::new(Pid(1));
        wf.set_inst(Inst::new(Format::Flat, 30));
        alu.run(&mut wf);
    }

    #[test]
    #[should_panic(expected = "not implemented for the FLAT format")]
    fn unknown_opcode_panics() {
        let mut alu = alu_with_memory();
        let mut wf = Wavefront::new(Pid(1));
        wf.set_inst(Inst::new(Format::Flat, 99));
        alu.run(&mut wf);
    }
}
