use gcn_asm::{Inst, Reg};

use crate::memory::Pid;
use crate::state::InstState;

/// Scalar registers available to one wavefront.
pub const SGPR_COUNT: usize = 102;

/// Vector registers available to each lane.
pub const VGPRS_PER_LANE: usize = 256;

const LANES: usize = gcn_asm::WAVEFRONT_WIDTH;

/// Architectural state of one wavefront: 64 lanes sharing a program
/// counter, the scalar and vector register files, and the special
/// registers EXEC, VCC, SCC, and M0.
///
/// A wavefront is created at dispatch, bootstrapped from the kernel code
/// object and dispatch packet ([`crate::bootstrap`]), and dropped once all
/// lanes complete.
#[derive(Debug, Clone)]
pub struct Wavefront {
    pid: Pid,
    inst: Option<Inst>,

    /// Coordinates of the owning work-group within the grid.
    pub workgroup_id: [u32; 3],
    /// Index of this wavefront within its work-group.
    pub wave_id_in_group: u32,
    /// Flat work-item id of lane 0.
    pub first_workitem_flat_id: u32,
    /// EXEC value loaded at bootstrap.
    pub init_exec_mask: u64,

    /// All lanes have run to completion.
    pub completed: bool,
    /// The wavefront is parked at a work-group barrier.
    pub at_barrier: bool,

    /// Program counter.
    pub pc: u64,
    /// Execution mask; bit `k` gates lane `k`.
    pub exec: u64,
    /// Scalar condition code, a single bit.
    pub scc: u8,
    /// Vector condition code lane mask.
    pub vcc: u64,
    /// Memory descriptor register.
    pub m0: u32,

    sregs: [u32; SGPR_COUNT],
    vregs: Vec<[u32; VGPRS_PER_LANE]>,
}

impl Wavefront {
    /// A zeroed wavefront in the given process address space.
    pub fn new(pid: Pid) -> Self {
        Wavefront {
            pid,
            inst: None,
            workgroup_id: [0; 3],
            wave_id_in_group: 0,
            first_workitem_flat_id: 0,
            init_exec_mask: 0,
            completed: false,
            at_barrier: false,
            pc: 0,
            exec: 0,
            scc: 0,
            vcc: 0,
            m0: 0,
            sregs: [0; SGPR_COUNT],
            vregs: vec![[0; VGPRS_PER_LANE]; LANES],
        }
    }

    /// Installs the instruction to be executed by the next `Alu::run`.
    pub fn set_inst(&mut self, inst: Inst) {
        self.inst = Some(inst);
    }

    /// Value of `s[i]`.
    pub fn sreg(&self, i: usize) -> u32 {
        self.sregs[i]
    }

    /// Value of `v[i]` on the given lane.
    pub fn vreg(&self, lane: usize, i: usize) -> u32 {
        self.vregs[lane][i]
    }
}

impl InstState for Wavefront {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn inst(&self) -> &Inst {
        match &self.inst {
            Some(inst) => inst,
            None => panic!("wavefront has no instruction installed"),
        }
    }

    fn read_reg(&self, reg: Reg, count: u8, lane: usize) -> u64 {
        match (reg, count) {
            (Reg::S(i), 1) => u64::from(self.sregs[i as usize]),
            (Reg::S(i), _) => {
                let i = i as usize;
                u64::from(self.sregs[i + 1]) << 32 | u64::from(self.sregs[i])
            }
            (Reg::V(i), 1) => u64::from(self.vregs[lane][i as usize]),
            (Reg::V(i), _) => {
                let i = i as usize;
                u64::from(self.vregs[lane][i + 1]) << 32 | u64::from(self.vregs[lane][i])
            }
            (Reg::Scc, _) => u64::from(self.scc),
            (Reg::Vcc, _) => self.vcc,
            (Reg::VccLo, 1) => self.vcc & 0xffff_ffff,
            (Reg::VccLo, 2) => self.vcc,
            (Reg::VccHi, 1) => self.vcc >> 32,
            (Reg::Exec, _) => self.exec,
            (Reg::ExecLo, 1) => self.exec & 0xffff_ffff,
            (Reg::ExecLo, 2) => self.exec,
            (Reg::M0, _) => u64::from(self.m0),
            (Reg::Pc, _) => self.pc,
            (reg, count) => panic!("register {reg} does not support {count}-register reads"),
        }
    }

    fn write_reg(&mut self, reg: Reg, count: u8, lane: usize, value: u64) {
        match (reg, count) {
            (Reg::S(i), 1) => self.sregs[i as usize] = value as u32,
            (Reg::S(i), _) => {
                let i = i as usize;
                self.sregs[i + 1] = (value >> 32) as u32;
                self.sregs[i] = value as u32;
            }
            (Reg::V(i), 1) => self.vregs[lane][i as usize] = value as u32,
            (Reg::V(i), _) => {
                let i = i as usize;
                self.vregs[lane][i + 1] = (value >> 32) as u32;
                self.vregs[lane][i] = value as u32;
            }
            (Reg::Scc, _) => self.scc = value as u8,
            (Reg::Vcc, _) => self.vcc = value,
            (Reg::VccLo, 1) => {
                self.vcc &= 0xffff_ffff_0000_0000;
                self.vcc |= value & 0xffff_ffff;
            }
            (Reg::VccLo, 2) => self.vcc = value,
            (Reg::VccHi, 1) => {
                self.vcc &= 0x0000_0000_ffff_ffff;
                self.vcc |= (value & 0xffff_ffff) << 32;
            }
            (Reg::Exec, _) => self.exec = value,
            (Reg::ExecLo, 1) => {
                self.exec &= 0xffff_ffff_0000_0000;
                self.exec |= value & 0xffff_ffff;
            }
            (Reg::ExecLo, 2) => self.exec = value,
            (Reg::M0, _) => self.m0 = value as u32,
            (Reg::Pc, _) => self.pc = value,
            (reg, count) => panic!("register {reg} does not support {count}-register writes"),
        }
    }

    fn read_reg_bulk(&self, reg: Reg, count: u8, lane: usize, buf: &mut [u32]) {
        let count = count as usize;
        match reg {
            Reg::S(i) => buf[..count].copy_from_slice(&self.sregs[i as usize..i as usize + count]),
            Reg::V(i) => {
                buf[..count].copy_from_slice(&self.vregs[lane][i as usize..i as usize + count]);
            }
            reg => panic!("register {reg} does not support bulk access"),
        }
    }

    fn write_reg_bulk(&mut self, reg: Reg, count: u8, lane: usize, buf: &[u32]) {
        let count = count as usize;
        match reg {
            Reg::S(i) => self.sregs[i as usize..i as usize + count].copy_from_slice(&buf[..count]),
            Reg::V(i) => {
                self.vregs[lane][i as usize..i as usize + count].copy_from_slice(&buf[..count]);
            }
            reg => panic!("register {reg} does not support bulk access"),
        }
    }
}
