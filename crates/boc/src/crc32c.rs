//! CRC-32C (Castagnoli) trailer of a serialized [`BagOfCells`](crate::BagOfCells)
use crc::Crc;

const CRC_32_ISCSI: Crc<u32> = Crc::<u32>::new(&crc::CRC_32_ISCSI);

/// Size of the trailer in bytes
pub const CHECKSUM_LEN: usize = 4;

#[inline]
pub fn crc32c(bytes: impl AsRef<[u8]>) -> u32 {
    CRC_32_ISCSI.checksum(bytes.as_ref())
}

/// Returns whether `bytes` hash to `expected`
#[inline]
pub fn verify(bytes: impl AsRef<[u8]>, expected: u32) -> bool {
    crc32c(bytes) == expected
}

/// Append checksum of everything written so far as little-endian `u32`
#[inline]
pub fn append(buf: &mut Vec<u8>) {
    let cs = crc32c(buf.as_slice());
    buf.extend_from_slice(&cs.to_le_bytes());
}
