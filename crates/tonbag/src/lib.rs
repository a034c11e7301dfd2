//! Cells, their [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells)
//! codec and JSON form of TVM stack values.
//!
//! ```rust
//! # use tonbag::{Cell, StackValue};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cell = Cell::builder();
//! cell.store_uint(0xcafe, 16)?;
//! let cell = cell.into_cell();
//!
//! let json = StackValue::from_cell(&cell)?.to_entry_json()?;
//! let value = StackValue::from_json(json)?.ok_or("unknown @type")?;
//! assert_eq!(*value.to_cell()?, cell);
//! # Ok(())
//! # }
//! ```
pub use cellboc::{self as boc, *};
pub use tvm_stack::{self as stack, *};
