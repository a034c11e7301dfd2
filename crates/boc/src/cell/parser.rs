use std::sync::Arc;

use bitvec::{order::Msb0, slice::BitSlice, vec::BitVec};

use crate::{BocError, Cell};

/// Cell parser created with [`Cell::parser()`].
#[derive(Clone)]
pub struct CellParser<'a> {
    data: &'a BitSlice<u8, Msb0>,
    references: &'a [Arc<Cell>],
}

impl<'a> CellParser<'a> {
    #[inline]
    pub(crate) const fn new(data: &'a BitSlice<u8, Msb0>, references: &'a [Arc<Cell>]) -> Self {
        Self { data, references }
    }

    pub fn load_bits(&mut self, n: usize) -> Result<&'a BitSlice<u8, Msb0>, BocError> {
        if self.data.len() < n {
            return Err(BocError::CellUnderflow(format!(
                "{n} bits requested, {} left",
                self.data.len()
            )));
        }
        let (bits, rest) = self.data.split_at(n);
        self.data = rest;
        Ok(bits)
    }

    #[inline]
    pub fn load_bit(&mut self) -> Result<bool, BocError> {
        self.load_bits(1).map(|bits| bits[0])
    }

    /// Load big-endian unsigned integer of `bits` bits
    pub fn load_uint(&mut self, bits: usize) -> Result<u64, BocError> {
        if bits > u64::BITS as usize {
            return Err(BocError::InvalidCell(format!(
                "{bits} bits integers are not supported"
            )));
        }
        Ok(self
            .load_bits(bits)?
            .iter()
            .by_vals()
            .fold(0, |acc, bit| (acc << 1) | u64::from(bit)))
    }

    /// Load `n` whole bytes
    #[inline]
    pub fn load_bytes(&mut self, n: usize) -> Result<Vec<u8>, BocError> {
        let bits = self.load_bits(n * 8)?;
        let mut bytes = BitVec::<u8, Msb0>::with_capacity(bits.len());
        bytes.extend_from_bitslice(bits);
        Ok(bytes.into_vec())
    }

    pub fn load_reference(&mut self) -> Result<&'a Arc<Cell>, BocError> {
        let (first, rest) = self
            .references
            .split_first()
            .ok_or_else(|| BocError::CellUnderflow("no more references left".to_string()))?;
        self.references = rest;
        Ok(first)
    }

    #[inline]
    pub fn bits_left(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub const fn references_left(&self) -> usize {
        self.references.len()
    }

    /// Returns whether this parser has no more data and references.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits_left() == 0 && self.references_left() == 0
    }

    /// Returns an error if this parser has more data or references.
    #[inline]
    pub fn ensure_empty(&self) -> Result<(), BocError> {
        if !self.is_empty() {
            return Err(BocError::CellUnderflow(format!(
                "more data left: {} bits, {} references",
                self.data.len(),
                self.references.len(),
            )));
        }
        Ok(())
    }
}
