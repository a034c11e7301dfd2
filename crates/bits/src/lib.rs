//! Byte-level primitives shared by the Bag of Cells codec: fixed-width
//! unsigned integers with explicit endianness, plus a reading cursor and a
//! writing extension for byte buffers.
mod error;
pub mod integer;
mod reader;
mod writer;

pub use self::{error::*, integer::Endianness, reader::*, writer::*};
