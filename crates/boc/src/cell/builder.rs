use std::sync::Arc;

use bitvec::{order::Msb0, slice::BitSlice};

use crate::{BocError, Cell};

/// Cell builder created with [`Cell::builder()`].
///
/// [`CellBuilder`] can then be converted to constructed [`Cell`] by using
/// [`.into_cell()`](CellBuilder::into_cell).
#[derive(Debug, Default)]
pub struct CellBuilder {
    cell: Cell,
}

impl CellBuilder {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self { cell: Cell::new() }
    }

    /// Remaining capacity in bits
    #[inline]
    pub fn bits_left(&self) -> usize {
        Cell::MAX_BITS_LEN - self.cell.bit_len()
    }

    #[inline]
    pub fn references_left(&self) -> usize {
        Cell::MAX_REFS_COUNT - self.cell.references().len()
    }

    #[inline]
    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, BocError> {
        self.store_uint(bit.into(), 1)
    }

    #[inline]
    pub fn store_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> Result<&mut Self, BocError> {
        self.cell.append_bits(bits)?;
        Ok(self)
    }

    #[inline]
    pub fn store_bytes(&mut self, bytes: impl AsRef<[u8]>) -> Result<&mut Self, BocError> {
        self.cell.append_bytes(bytes)?;
        Ok(self)
    }

    /// Store `value` as big-endian unsigned integer of `bits` bits
    pub fn store_uint(&mut self, value: u64, bits: usize) -> Result<&mut Self, BocError> {
        if bits > u64::BITS as usize {
            return Err(BocError::InvalidCell(format!(
                "{bits} bits integers are not supported"
            )));
        }
        if bits < u64::BITS as usize && value >> bits != 0 {
            return Err(BocError::InvalidCell(format!(
                "{value:#x} cannot be stored in {bits} bits"
            )));
        }
        let bytes = value.to_be_bytes();
        let all = BitSlice::<u8, Msb0>::from_slice(&bytes);
        self.store_bits(&all[all.len() - bits..])
    }

    #[inline]
    pub fn store_reference(&mut self, cell: impl Into<Arc<Cell>>) -> Result<&mut Self, BocError> {
        self.cell.push_reference(cell)?;
        Ok(self)
    }

    /// Mark cell as special (exotic)
    #[inline]
    pub fn special(&mut self, special: bool) -> &mut Self {
        self.cell.set_special(special);
        self
    }

    /// Convert builder to [`Cell`]
    #[inline]
    #[must_use]
    pub fn into_cell(self) -> Cell {
        self.cell
    }
}

impl From<CellBuilder> for Cell {
    #[inline]
    fn from(builder: CellBuilder) -> Self {
        builder.into_cell()
    }
}
