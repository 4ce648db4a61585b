//! The ALU: per-format instruction semantics and dispatch.

mod ds;
mod flat;
mod smem;
mod sop1;
mod sop2;
mod sopc;
mod sopk;
mod sopp;
mod vop1;
mod vop2;
mod vop3a;
mod vop3b;
mod vopc;

use gcn_asm::Format;
use tracing::trace;

use crate::memory::StorageAccessor;
use crate::state::InstState;

/// Source lane of `V_READFIRSTLANE_B32` unless overridden.
const DEFAULT_BROADCAST_LANE: usize = 8;

/// Executes decoded instructions against wavefront state.
///
/// One ALU serves any number of wavefronts; all per-instruction context
/// arrives through the [`InstState`] handed to [`Alu::run`]. SMEM and FLAT
/// instructions go through the storage accessor the ALU was built with; DS
/// instructions address the LDS slice attached with [`Alu::set_lds`], which
/// the ALU borrows from the current work-group and never owns.
pub struct Alu<'lds> {
    accessor: Option<StorageAccessor>,
    lds: Option<&'lds mut [u8]>,
    broadcast_lane: usize,
}

impl<'lds> Alu<'lds> {
    /// An ALU backed by `accessor` for SMEM and FLAT traffic. `None` is
    /// fine for workloads that never touch memory.
    pub fn new(accessor: Option<StorageAccessor>) -> Self {
        Alu {
            accessor,
            lds: None,
            broadcast_lane: DEFAULT_BROADCAST_LANE,
        }
    }

    /// Attaches the LDS of the work-group whose instructions run next.
    pub fn set_lds(&mut self, lds: &'lds mut [u8]) {
        self.lds = Some(lds);
    }

    /// The currently attached LDS, if any.
    pub fn lds(&self) -> Option<&[u8]> {
        self.lds.as_deref()
    }

    /// Mutable view of the currently attached LDS, e.g. for seeding it.
    pub fn lds_mut(&mut self) -> Option<&mut [u8]> {
        self.lds.as_deref_mut()
    }

    /// The storage accessor, if one is attached.
    pub fn accessor(&self) -> Option<&StorageAccessor> {
        self.accessor.as_ref()
    }

    /// Mutable storage accessor, e.g. for seeding memory in a driver.
    pub fn accessor_mut(&mut self) -> Option<&mut StorageAccessor> {
        self.accessor.as_mut()
    }

    /// Overrides the lane `V_READFIRSTLANE_B32` broadcasts from.
    pub fn set_broadcast_lane(&mut self, lane: usize) {
        self.broadcast_lane = lane;
    }

    /// Executes the instruction installed on `state` to completion.
    ///
    /// Unknown opcodes, operands the decoder left unpopulated, unsupported
    /// modifiers, and failing memory translations all panic: each one is a
    /// bug in the decoder or driver, not a condition to recover from.
    pub fn run<S: InstState>(&mut self, state: &mut S) {
        let inst = state.inst().clone();
        trace!(format = %inst.format, opcode = inst.opcode, name = %inst.name, "execute");

        match inst.format {
            Format::Sop1 => sop1::run(state, &inst),
            Format::Sop2 => sop2::run(state, &inst),
            Format::Sopc => sopc::run(state, &inst),
            Format::Sopk => sopk::run(state, &inst),
            Format::Sopp => sopp::run(state, &inst),
            Format::Smem => smem::run(self, state, &inst),
            Format::Vop1 => vop1::run(self, state, &inst),
            Format::Vop2 => vop2::run(state, &inst),
            Format::Vop3a => vop3a::run(state, &inst),
            Format::Vop3b => vop3b::run(state, &inst),
            Format::Vopc => vopc::run(state, &inst),
            Format::Flat => flat::run(self, state, &inst),
            Format::Ds => ds::run(self, state, &inst),
        }
    }

    fn memory(&self) -> &StorageAccessor {
        match &self.accessor {
            Some(accessor) => accessor,
            None => panic!("memory instruction with no storage accessor attached"),
        }
    }

    fn memory_mut(&mut self) -> &mut StorageAccessor {
        match &mut self.accessor {
            Some(accessor) => accessor,
            None => panic!("memory instruction with no storage accessor attached"),
        }
    }

    fn lds_slice(&mut self) -> &mut [u8] {
        match &mut self.lds {
            Some(lds) => lds,
            None => panic!("DS instruction with no LDS attached"),
        }
    }
}

pub(crate) fn lane_masked(exec: u64, lane: usize) -> bool {
    exec & (1 << lane) != 0
}

pub(crate) fn as_f32(bits: u64) -> f32 {
    f32::from_bits(bits as u32)
}

pub(crate) fn f32_bits(value: f32) -> u64 {
    u64::from(value.to_bits())
}
