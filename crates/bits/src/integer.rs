//! Unsigned integers of a caller-specified byte width.
//!
//! Bag of Cells header fields are `size`- or `off_bytes`-wide, where both
//! widths are themselves stored in the header. Every width in `1..=8` is
//! accepted and values are carried as [`u64`].
use crate::Error;

pub(crate) const MAX_WIDTH: usize = size_of::<u64>();

/// Byte order of a fixed-width integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

#[inline]
pub(crate) fn ensure_width(width: usize) -> Result<(), Error> {
    if !(1..=MAX_WIDTH).contains(&width) {
        return Err(Error::UnsupportedWidth(width));
    }
    Ok(())
}

/// Returns minimal number of bytes (at least one) needed to store `value`
#[inline]
pub const fn min_width(value: u64) -> usize {
    let bits = u64::BITS - value.leading_zeros();
    if bits == 0 {
        return 1;
    }
    bits.div_ceil(u8::BITS) as usize
}

/// Read `width`-byte unsigned integer from exactly `width` bytes
pub fn read_uint(bytes: &[u8], width: usize, endianness: Endianness) -> Result<u64, Error> {
    ensure_width(width)?;
    if bytes.len() != width {
        return Err(Error::UnexpectedLength {
            width,
            len: bytes.len(),
        });
    }
    let mut buf = [0u8; MAX_WIDTH];
    Ok(match endianness {
        Endianness::Big => {
            buf[MAX_WIDTH - width..].copy_from_slice(bytes);
            u64::from_be_bytes(buf)
        }
        Endianness::Little => {
            buf[..width].copy_from_slice(bytes);
            u64::from_le_bytes(buf)
        }
    })
}

/// Append `value` as `width`-byte unsigned integer to `dst`
pub fn write_uint_into(
    dst: &mut Vec<u8>,
    value: u64,
    width: usize,
    endianness: Endianness,
) -> Result<(), Error> {
    ensure_width(width)?;
    if min_width(value) > width {
        return Err(Error::ValueOverflow { value, width });
    }
    match endianness {
        Endianness::Big => dst.extend_from_slice(&value.to_be_bytes()[MAX_WIDTH - width..]),
        Endianness::Little => dst.extend_from_slice(&value.to_le_bytes()[..width]),
    }
    Ok(())
}

/// Encode `value` as `width`-byte unsigned integer
#[inline]
pub fn write_uint(value: u64, width: usize, endianness: Endianness) -> Result<Vec<u8>, Error> {
    let mut dst = Vec::with_capacity(width);
    write_uint_into(&mut dst, value, width, endianness)?;
    Ok(dst)
}
