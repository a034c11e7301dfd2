//! JSON representation of TVM stack values used by get-method calls.
//!
//! ```rust
//! # use serde_json::json;
//! # use tvm_stack::{StackError, StackValue};
//! # fn main() -> Result<(), StackError> {
//! let value = StackValue::from_json(json!({
//!     "@type": "tvm.stackEntryNumber",
//!     "number": {"@type": "tvm.numberDecimal", "number": "12345678901234567890"},
//! }))?;
//! assert_eq!(
//!     value,
//!     Some(StackValue::Number("12345678901234567890".parse().unwrap()))
//! );
//! # Ok(())
//! # }
//! ```
#[cfg(feature = "boc")]
mod boc;
mod error;
mod repr;
mod stack;
mod value;

pub use self::{error::*, stack::*, value::*};

pub use num_bigint;
