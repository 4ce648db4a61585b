//! Functional emulator for GCN3 ("Vega") wavefronts.
//!
//! The crate executes decoded [`gcn_asm::Inst`] values against per-wavefront
//! architectural state: 102 scalar registers, 64 lanes of 256 vector
//! registers each, the EXEC/VCC lane masks, SCC, M0, and the program
//! counter. Scalar and flat memory instructions go through a page-table
//! translated [`Storage`]; data-share instructions address the owning
//! work-group's LDS buffer, which the ALU borrows for the duration of that
//! work-group's instructions.
//!
//! Execution is strictly functional: [`Alu::run`] carries one instruction to
//! completion, mutating the wavefront it was handed. Timing, caches, and
//! dispatch are the concern of other layers; they drive this crate through
//! the [`InstState`] capability trait.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod alu;
mod bytes;
pub mod error;
pub mod kernel;
pub mod memory;
pub mod operand;
mod state;
mod wavefront;

pub use alu::Alu;
pub use error::MemoryError;
pub use kernel::{bootstrap, CodeObject, DispatchPacket, SgprFlags, WorkGroup};
pub use memory::{InterleavingConverter, Page, PageTable, Pid, Storage, StorageAccessor};
pub use state::InstState;
pub use wavefront::{Wavefront, SGPR_COUNT, VGPRS_PER_LANE};
