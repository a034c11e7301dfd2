use crate::{
    Error,
    integer::{Endianness, ensure_width, read_uint},
};

/// Forward-only cursor over a byte slice.
///
/// Every read either consumes exactly the requested number of bytes or
/// fails with [`Error::Eof`] leaving the cursor untouched.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[inline]
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns not yet consumed bytes without advancing
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let left = self.remaining();
        if left < n {
            return Err(Error::Eof { needed: n, left });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut arr = [0; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Read `width`-byte unsigned integer
    #[inline]
    pub fn read_uint(&mut self, width: usize, endianness: Endianness) -> Result<u64, Error> {
        ensure_width(width)?;
        read_uint(self.read_bytes(width)?, width, endianness)
    }
}
