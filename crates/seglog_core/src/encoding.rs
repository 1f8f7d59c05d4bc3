//! Big-endian integer helpers shared by the store and the index.

/// Width of the length prefix in front of every store entry.
pub(crate) const LEN_WIDTH: u64 = 8;

/// Width of the relative offset in an index entry.
pub(crate) const OFF_WIDTH: u64 = 4;

/// Width of the store position in an index entry.
pub(crate) const POS_WIDTH: u64 = 8;

/// Width of one index entry.
pub(crate) const ENTRY_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

/// Writes `value` big-endian into the first 4 bytes of `buf`.
pub(crate) fn put_u32(buf: &mut [u8], value: u32) {
    buf[..4].copy_from_slice(&value.to_be_bytes());
}

/// Writes `value` big-endian into the first 8 bytes of `buf`.
pub(crate) fn put_u64(buf: &mut [u8], value: u64) {
    buf[..8].copy_from_slice(&value.to_be_bytes());
}

/// Reads a big-endian `u32` from the first 4 bytes of `buf`.
pub(crate) fn get_u32(buf: &[u8]) -> u32 {
    u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])
}

/// Reads a big-endian `u64` from the first 8 bytes of `buf`.
pub(crate) fn get_u64(buf: &[u8]) -> u64 {
    u64::from_be_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ])
}
