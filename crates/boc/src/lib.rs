//! [Cells](https://docs.ton.org/develop/data-formats/cell-boc#cell) and
//! their [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells)
//! binary representation.
//!
//! ```rust
//! # use cellboc::{BagOfCells, BocError, Cell};
//! # fn main() -> Result<(), BocError> {
//! let mut child = Cell::builder();
//! child.store_uint(0xff, 8)?;
//! let mut root = Cell::builder();
//! root.store_bit(true)?.store_reference(child.into_cell())?;
//! let root = root.into_cell();
//!
//! let bytes = root.to_boc_default()?;
//! assert_eq!(*Cell::from_boc(&bytes)?, root);
//! # Ok(())
//! # }
//! ```
mod boc;
mod cell;
pub mod crc32c;
mod error;

pub use self::{boc::*, cell::*, error::*};

pub use bitvec;
pub use cellbits;
