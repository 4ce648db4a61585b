//! Error types of the storage and virtual-memory layer.

use crate::memory::Pid;

/// Failure of a storage or address-translation request.
///
/// Inside the functional core every one of these is a driver or decoder
/// bug, never a runtime condition; [`crate::StorageAccessor`] turns them
/// into panics at the access site.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// Access beyond the end of the backing storage.
    #[error("{len}-byte access at {addr:#x} exceeds storage of {capacity} bytes")]
    OutOfRange {
        /// First byte of the offending access.
        addr: u64,
        /// Length of the offending access.
        len: u64,
        /// Capacity of the storage.
        capacity: u64,
    },
    /// Virtual address with no page-table entry.
    #[error("no page mapped for {pid} at virtual address {vaddr:#x}")]
    PageFault {
        /// Process whose address space was queried.
        pid: Pid,
        /// The unmapped virtual address.
        vaddr: u64,
    },
}
