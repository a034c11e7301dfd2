use std::sync::Arc;

use cellboc::Cell;

use crate::{StackError, StackValue};

impl StackValue {
    /// Serialize given cell as [`StackValue::Cell`]
    #[inline]
    pub fn from_cell(cell: &Cell) -> Result<Self, StackError> {
        Ok(Self::Cell(cell.to_boc_default()?))
    }

    /// Deserialize root cell of [`StackValue::Slice`] or [`StackValue::Cell`]
    pub fn to_cell(&self) -> Result<Arc<Cell>, StackError> {
        match self {
            Self::Slice(bytes) | Self::Cell(bytes) => Ok(Cell::from_boc(bytes)?),
            v => Err(StackError::NotBytes(v.type_name())),
        }
    }
}
