//! Little-endian byte plumbing shared by the memory handlers.

pub(crate) fn u32_from_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(word)
}

pub(crate) fn u64_from_le(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word)
}

/// Zero-extends the first `len` bytes to a u64.
pub(crate) fn zext_from_le(bytes: &[u8], len: usize) -> u64 {
    let mut word = [0u8; 8];
    word[..len].copy_from_slice(&bytes[..len]);
    u64::from_le_bytes(word)
}

pub(crate) fn words_from_le(bytes: &[u8]) -> Vec<u32> {
    bytes.chunks_exact(4).map(u32_from_le).collect()
}
