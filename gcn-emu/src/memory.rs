//! Byte storage, address interleaving, and page-table translation.
//!
//! The emulator sees memory as a flat byte array reached through two
//! mappings: the external page table translates `(pid, virtual address)` to
//! a physical address, and the [`InterleavingConverter`] maps that physical
//! address onto this device's slice of an interleaved address space. For a
//! single-element device the converter is the identity.

use core::fmt;

use tracing::trace;

use crate::error::MemoryError;

/// Process identifier; indexes the page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.0)
    }
}

/// A page-table entry. `paddr` is the physical base address of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Physical base address of the page.
    pub paddr: u64,
}

/// Read-only view of an externally owned page table.
///
/// `vaddr` may point anywhere inside the page; implementations return the
/// page containing it. A miss is reported as `None` and is fatal inside the
/// functional core.
pub trait PageTable {
    /// Looks up the page containing `vaddr` in the address space of `pid`.
    fn find(&self, pid: Pid, vaddr: u64) -> Option<Page>;
}

/// Flat byte-addressed backing store.
#[derive(Debug, Clone)]
pub struct Storage {
    data: Vec<u8>,
}

impl Storage {
    /// Zero-initialized storage of `capacity` bytes.
    pub fn new(capacity: u64) -> Self {
        Storage {
            data: vec![0; capacity as usize],
        }
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    /// Reads `len` bytes starting at the physical address `addr`.
    pub fn read(&self, addr: u64, len: u64) -> Result<&[u8], MemoryError> {
        let end = addr.checked_add(len).filter(|&end| end <= self.capacity());
        match end {
            Some(end) => Ok(&self.data[addr as usize..end as usize]),
            None => Err(MemoryError::OutOfRange {
                addr,
                len,
                capacity: self.capacity(),
            }),
        }
    }

    /// Writes `data` starting at the physical address `addr`.
    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<(), MemoryError> {
        let len = data.len() as u64;
        let end = addr.checked_add(len).filter(|&end| end <= self.capacity());
        match end {
            Some(end) => {
                self.data[addr as usize..end as usize].copy_from_slice(data);
                Ok(())
            }
            None => Err(MemoryError::OutOfRange {
                addr,
                len,
                capacity: self.capacity(),
            }),
        }
    }
}

/// Maps addresses of an interleaved multi-element address space onto the
/// local storage of one element.
///
/// The space is cut into chunks of `interleaving_size` bytes dealt
/// round-robin to `num_elements` elements; this converter serves the
/// element at `element_index`, whose local addresses additionally start at
/// `offset`. With a single element and no offset the mapping is the
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterleavingConverter {
    /// Bytes per interleaving chunk.
    pub interleaving_size: u64,
    /// Number of elements sharing the space.
    pub num_elements: u64,
    /// Which element this converter serves.
    pub element_index: u64,
    /// Local base offset of this element.
    pub offset: u64,
}

impl InterleavingConverter {
    /// Identity mapping over a single element covering `size` bytes.
    pub fn identity(size: u64) -> Self {
        InterleavingConverter {
            interleaving_size: size,
            num_elements: 1,
            element_index: 0,
            offset: 0,
        }
    }

    /// Converts an external (global physical) address to this element's
    /// local storage offset. The address must fall on this element.
    pub fn external_to_internal(&self, external: u64) -> u64 {
        let chunk = external / self.interleaving_size;
        if chunk % self.num_elements != self.element_index {
            panic!(
                "address {external:#x} does not interleave onto element {}",
                self.element_index
            );
        }
        chunk / self.num_elements * self.interleaving_size + external % self.interleaving_size
            - self.offset
    }
}

/// Storage reached through virtual-address translation.
///
/// Every read or write decomposes the virtual address with
/// `log2_page_size`, asks the page table for the containing page, rebases
/// onto the page's physical address, runs the interleaving converter, and
/// touches the byte storage. Accesses are expected not to cross a page
/// boundary; translation happens once per access.
pub struct StorageAccessor {
    storage: Storage,
    page_table: Box<dyn PageTable>,
    log2_page_size: u32,
    converter: InterleavingConverter,
}

impl StorageAccessor {
    /// A new accessor over `storage` with the given translation pipeline.
    pub fn new(
        storage: Storage,
        page_table: Box<dyn PageTable>,
        log2_page_size: u32,
        converter: InterleavingConverter,
    ) -> Self {
        StorageAccessor {
            storage,
            page_table,
            log2_page_size,
            converter,
        }
    }

    /// The underlying storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Mutable access to the underlying storage, for seeding memory.
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    fn translate(&self, pid: Pid, vaddr: u64) -> Result<u64, MemoryError> {
        let page = self
            .page_table
            .find(pid, vaddr)
            .ok_or(MemoryError::PageFault { pid, vaddr })?;
        let offset = vaddr & ((1 << self.log2_page_size) - 1);
        let paddr = page.paddr | offset;
        let internal = self.converter.external_to_internal(paddr);
        trace!(pid = pid.0, vaddr, internal, "translated");
        Ok(internal)
    }

    /// Reads `len` bytes at the virtual address `vaddr` of process `pid`.
    ///
    /// A page-table miss or out-of-range physical access aborts: both mean
    /// the workload or its loader handed the emulator a bogus address.
    pub fn read(&self, pid: Pid, vaddr: u64, len: u64) -> Vec<u8> {
        let result = self
            .translate(pid, vaddr)
            .and_then(|addr| self.storage.read(addr, len).map(<[u8]>::to_vec));
        match result {
            Ok(bytes) => bytes,
            Err(err) => panic!("fatal {len}-byte read at {vaddr:#x}: {err}"),
        }
    }

    /// Writes `data` at the virtual address `vaddr` of process `pid`.
    pub fn write(&mut self, pid: Pid, vaddr: u64, data: &[u8]) {
        let result = self
            .translate(pid, vaddr)
            .and_then(|addr| self.storage.write(addr, data));
        if let Err(err) = result {
            panic!("fatal {}-byte write at {vaddr:#x}: {err}", data.len());
        }
    }
}

impl fmt::Debug for StorageAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAccessor")
            .field("capacity", &self.storage.capacity())
            .field("log2_page_size", &self.log2_page_size)
            .field("converter", &self.converter)
            .finish_non_exhaustive()
    }
}
