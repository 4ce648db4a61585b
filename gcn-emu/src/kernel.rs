//! Kernel dispatch types and wavefront bootstrap.
//!
//! A kernel arrives as a code object (register-initialization flags and the
//! entry offset) plus a dispatch packet (grid geometry and the kernel
//! argument pointer). [`bootstrap`] turns the two into the initial SGPR,
//! VGPR, PC, and EXEC state of a freshly created wavefront, following the
//! fixed register-allocation order of the HSA ABI.

use gcn_asm::{Reg, WAVEFRONT_WIDTH};
use itertools::izip;

use crate::state::InstState;
use crate::wavefront::Wavefront;

bitflags::bitflags! {
    /// "Enable SGPR" flags of the kernel code object.
    ///
    /// Each set flag reserves (and, where applicable, populates) a group of
    /// SGPRs during bootstrap, in the declaration order below.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SgprFlags: u16 {
        /// Private segment buffer descriptor, 4 SGPRs.
        const PRIVATE_SEGMENT_BUFFER = 1 << 0;
        /// Pointer to the dispatch packet, 2 SGPRs.
        const DISPATCH_PTR = 1 << 1;
        /// Pointer to the queue, 2 SGPRs.
        const QUEUE_PTR = 1 << 2;
        /// Pointer to the kernel argument segment, 2 SGPRs.
        const KERNARG_SEGMENT_PTR = 1 << 3;
        /// Dispatch id, 2 SGPRs.
        const DISPATCH_ID = 1 << 4;
        /// Flat scratch initialization, 2 SGPRs.
        const FLAT_SCRATCH_INIT = 1 << 5;
        /// Private segment size, 1 SGPR.
        const PRIVATE_SEGMENT_SIZE = 1 << 6;
        /// Work-group count along X, 1 SGPR.
        const GRID_WORKGROUP_COUNT_X = 1 << 7;
        /// Work-group count along Y, 1 SGPR.
        const GRID_WORKGROUP_COUNT_Y = 1 << 8;
        /// Work-group count along Z, 1 SGPR.
        const GRID_WORKGROUP_COUNT_Z = 1 << 9;
        /// This work-group's X coordinate, 1 SGPR.
        const WORKGROUP_ID_X = 1 << 10;
        /// This work-group's Y coordinate, 1 SGPR.
        const WORKGROUP_ID_Y = 1 << 11;
        /// This work-group's Z coordinate, 1 SGPR.
        const WORKGROUP_ID_Z = 1 << 12;
    }
}

/// Register-setup metadata of a loaded kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeObject {
    /// Which SGPR groups bootstrap reserves and populates.
    pub sgpr_flags: SgprFlags,
    /// How many work-item coordinates land in VGPRs: 0 writes X only,
    /// 1 adds Y, 2 adds Z.
    pub enable_vgpr_workitem_id: u8,
    /// Entry point, relative to the kernel object address.
    pub kernel_code_entry_byte_offset: u64,
    /// LDS bytes each work-group of this kernel owns.
    pub workgroup_group_segment_byte_size: u32,
}

/// One HSA kernel-dispatch packet.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchPacket {
    /// Work-group dimensions, in work-items.
    pub workgroup_size: [u16; 3],
    /// Grid dimensions, in work-items.
    pub grid_size: [u32; 3],
    /// Pointer to the kernel argument segment.
    pub kernarg_address: u64,
    /// Address of the kernel object.
    pub kernel_object: u64,
    /// Virtual address of this packet in the queue.
    pub address: u64,
}

impl DispatchPacket {
    /// Work-groups per dimension: `ceil(grid / workgroup)`.
    pub fn workgroup_count(&self) -> [u32; 3] {
        let mut count = [0u32; 3];
        for (slot, grid, wg) in izip!(&mut count, self.grid_size, self.workgroup_size) {
            *slot = grid.div_ceil(u32::from(wg));
        }
        count
    }
}

/// A work-group: the coordinates it occupies in the grid and the LDS buffer
/// its wavefronts share. Outlives every contained wavefront.
#[derive(Debug, Clone)]
pub struct WorkGroup {
    /// Coordinates within the grid.
    pub id: [u32; 3],
    /// The local data share, byte-addressed.
    pub lds: Vec<u8>,
}

impl WorkGroup {
    /// A work-group at `id` with the LDS size the kernel asked for.
    pub fn new(id: [u32; 3], code_object: &CodeObject) -> Self {
        WorkGroup {
            id,
            lds: vec![0; code_object.workgroup_group_segment_byte_size as usize],
        }
    }
}

/// Initializes a wavefront's registers from the code object and dispatch
/// packet.
///
/// SGPRs are assigned from s0 upward in the fixed ABI order; every enabled
/// field advances the cursor by its width whether or not the emulator
/// populates it. Work-item coordinates are decomposed per lane from the
/// wavefront's first flat work-item id. Finally PC and EXEC are loaded.
pub fn bootstrap(wf: &mut Wavefront, code_object: &CodeObject, packet: &DispatchPacket) {
    let flags = code_object.sgpr_flags;
    let mut cursor: u8 = 0;

    if flags.contains(SgprFlags::PRIVATE_SEGMENT_BUFFER) {
        cursor += 4;
    }
    if flags.contains(SgprFlags::DISPATCH_PTR) {
        wf.write_reg(Reg::S(cursor), 2, 0, packet.address);
        cursor += 2;
    }
    if flags.contains(SgprFlags::QUEUE_PTR) {
        cursor += 2;
    }
    if flags.contains(SgprFlags::KERNARG_SEGMENT_PTR) {
        wf.write_reg(Reg::S(cursor), 2, 0, packet.kernarg_address);
        cursor += 2;
    }
    if flags.contains(SgprFlags::DISPATCH_ID) {
        cursor += 2;
    }
    if flags.contains(SgprFlags::FLAT_SCRATCH_INIT) {
        cursor += 2;
    }
    if flags.contains(SgprFlags::PRIVATE_SEGMENT_SIZE) {
        cursor += 1;
    }

    let count_flags = [
        SgprFlags::GRID_WORKGROUP_COUNT_X,
        SgprFlags::GRID_WORKGROUP_COUNT_Y,
        SgprFlags::GRID_WORKGROUP_COUNT_Z,
    ];
    for (flag, count) in izip!(count_flags, packet.workgroup_count()) {
        if flags.contains(flag) {
            wf.write_reg(Reg::S(cursor), 1, 0, u64::from(count));
            cursor += 1;
        }
    }

    let id_flags = [
        SgprFlags::WORKGROUP_ID_X,
        SgprFlags::WORKGROUP_ID_Y,
        SgprFlags::WORKGROUP_ID_Z,
    ];
    let workgroup_id = wf.workgroup_id;
    for (flag, id) in izip!(id_flags, workgroup_id) {
        if flags.contains(flag) {
            wf.write_reg(Reg::S(cursor), 1, 0, u64::from(id));
            cursor += 1;
        }
    }

    let size_x = u32::from(packet.workgroup_size[0]);
    let size_y = u32::from(packet.workgroup_size[1]);
    for lane in 0..WAVEFRONT_WIDTH {
        let flat = wf.first_workitem_flat_id + lane as u32;
        let x = flat % size_x;
        let y = flat / size_x % size_y;
        let z = flat / (size_x * size_y);

        wf.write_reg(Reg::V(0), 1, lane, u64::from(x));
        if code_object.enable_vgpr_workitem_id > 0 {
            wf.write_reg(Reg::V(1), 1, lane, u64::from(y));
        }
        if code_object.enable_vgpr_workitem_id > 1 {
            wf.write_reg(Reg::V(2), 1, lane, u64::from(z));
        }
    }

    wf.pc = packet.kernel_object + code_object.kernel_code_entry_byte_offset;
    wf.exec = wf.init_exec_mask;
}
