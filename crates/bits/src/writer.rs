use impl_tools::autoimpl;

use crate::{
    Error,
    integer::{Endianness, write_uint},
};

/// Byte sink
#[autoimpl(for <W: trait + ?Sized> &mut W, Box<W>)]
pub trait ByteWriter {
    /// Number of bytes written so far
    fn written(&self) -> usize;

    fn write_bytes(&mut self, bytes: &[u8]);
}

impl ByteWriter for Vec<u8> {
    #[inline]
    fn written(&self) -> usize {
        self.len()
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes)
    }
}

/// Chaining helpers for [`ByteWriter`]
pub trait ByteWriterExt: ByteWriter {
    #[inline]
    fn pack_u8(&mut self, byte: u8) -> &mut Self {
        self.write_bytes(&[byte]);
        self
    }

    #[inline]
    fn pack_bytes(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.write_bytes(bytes.as_ref());
        self
    }

    /// Write `value` as `width`-byte unsigned integer
    #[inline]
    fn pack_uint(
        &mut self,
        value: u64,
        width: usize,
        endianness: Endianness,
    ) -> Result<&mut Self, Error> {
        self.write_bytes(&write_uint(value, width, endianness)?);
        Ok(self)
    }

    /// Write all `values` as `width`-byte unsigned integers
    #[inline]
    fn pack_many_uint(
        &mut self,
        values: impl IntoIterator<Item = u64>,
        width: usize,
        endianness: Endianness,
    ) -> Result<&mut Self, Error> {
        for v in values {
            self.pack_uint(v, width, endianness)?;
        }
        Ok(self)
    }
}

impl<W> ByteWriterExt for W where W: ByteWriter + ?Sized {}
