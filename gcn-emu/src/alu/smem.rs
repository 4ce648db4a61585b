//! SMEM: scalar memory loads.

use gcn_asm::Inst;

use super::Alu;
use crate::bytes::{u32_from_le, u64_from_le, words_from_le};
use crate::operand::{read_op, write_op, write_op_wide};
use crate::state::InstState;

pub(super) fn run<S: InstState>(alu: &Alu<'_>, state: &mut S, inst: &Inst) {
    match inst.opcode {
        0 => s_load(alu, state, inst, 4),
        1 => s_load(alu, state, inst, 8),
        2 => s_load(alu, state, inst, 16),
        3 => s_load(alu, state, inst, 32),
        opcode => panic!("opcode {opcode} is not implemented for the SMEM format"),
    }
}

/// `S_LOAD_DWORD[X2|X4|X8]`: one translation, `len` bytes, destination
/// SGPRs. X4 and X8 go through the bulk register path.
fn s_load<S: InstState>(alu: &Alu<'_>, state: &mut S, inst: &Inst, len: u64) {
    let offset = read_op(state, inst.offset, 0);
    let base = read_op(state, inst.base, 0);
    let pid = state.pid();

    let buf = alu.memory().read(pid, base.wrapping_add(offset), len);
    match len {
        4 => write_op(state, inst.data, 0, u64::from(u32_from_le(&buf))),
        8 => write_op(state, inst.data, 0, u64_from_le(&buf)),
        _ => write_op_wide(state, inst.data, 0, &words_from_le(&buf)),
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

    /// Maps every virtual page of pid 1 straight onto the same physical page.
    struct DirectMapped;

    impl PageTable for DirectMapped {
        fn find(&self, pid: Pid, vaddr: u64) -> Option<Page> {
            (pid == Pid(1)).then_some(Page {
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

    fn seed_words(alu: &mut Alu<'_>, addr: u64, words: &[u32]) {
        for (i, word) in words.iter().enumerate() {
            alu.accessor_mut()
                .unwrap()
                .storage_mut()
                .write(addr + i as u64 * 4, &word.to_le_bytes())
                .unwrap();
        }
    }

    fn base_inst(opcode: u16, data_width: u8) -> Inst {
        let mut inst = Inst::new(Format::Smem, opcode);
        inst.base = Some(Operand::s_reg(0, 2));
        inst.offset = Some(Operand::IntImm(16));
        inst.data = Some(Operand::s_reg(2, data_width));
        inst
    }

    #[test]
    fn s_load_dword() {
        let mut alu = alu_with_memory();
        seed_words(&mut alu, 1040, &[217]);

        let mut wf = Wavefront::new(Pid(1));
        let mut inst = base_inst(0, 1);
        inst.offset = Some(Operand::s_reg(4, 1));
        wf.write_reg(Reg::S(0), 2, 0, 1024);
        wf.write_reg(Reg::S(4), 1, 0, 16);
        wf.set_inst(inst);

        alu.run(&mut wf);

        assert_eq!(wf.read_reg(Reg::S(2), 1, 0), 217);
    }

    #[test]
    fn s_load_dwordx2() {
        let mut alu = alu_with_memory();
        seed_words(&mut alu, 1040, &[217, 218]);

        let mut wf = Wavefront::new(Pid(1));
        wf.write_reg(Reg::S(0), 2, 0, 1024);
        wf.set_inst(base_inst(1, 2));

        alu.run(&mut wf);

        assert_eq!(wf.read_reg(Reg::S(2), 2, 0), 218 << 32 | 217);
    }

    #[test]
    fn s_load_dwordx4() {
        let mut alu = alu_with_memory();
        seed_words(&mut alu, 1040, &[217, 218, 219, 220]);

        let mut wf = Wavefront::new(Pid(1));
        wf.write_reg(Reg::S(0), 2, 0, 1024);
        wf.set_inst(base_inst(2, 4));

        alu.run(&mut wf);

        let mut regs = [0u32; 4];
        wf.read_reg_bulk(Reg::S(2), 4, 0, &mut regs);
        assert_eq!(regs, [217, 218, 219, 220]);
    }

    #[test]
    fn s_load_dwordx8() {
        let mut alu = alu_with_memory();
        let words: Vec<u32> = (100..108).collect();
        seed_words(&mut alu, 1040, &words);

        let mut wf = Wavefront::new(Pid(1));
        wf.write_reg(Reg::S(0), 2, 0, 1024);
        wf.set_inst(base_inst(3, 8));

        alu.run(&mut wf);

        let mut regs = [0u32; 8];
        wf.read_reg_bulk(Reg::S(2), 8, 0, &mut regs);
        assert_eq!(regs.to_vec(), words);
    }

    #[test]
    #[should_panic(expected = "not implemented for the SMEM format")]
    fn unknown_opcode_panics() {
        let mut alu = alu_with_memory();
        let mut wf = Wavefront::new(Pid(1));
        wf.set_inst(Inst::new(Format::Smem, 40));
        alu.run(&mut wf);
    }

    #[test]
    #[should_panic(expected = "no storage accessor attached")]
    fn smem_without_memory_is_fatal() {
        let mut wf = Wavefront::new(Pid(1));
        wf.write_reg(Reg::S(0), 2, 0, 1024);
        wf.set_inst(base_inst(0, 1));
        Alu::new(None).run(&mut wf);
    }
}
