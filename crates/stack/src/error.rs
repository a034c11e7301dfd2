use thiserror::Error as ThisError;

/// Error while converting [`StackValue`](crate::StackValue) from/into JSON
#[derive(Debug, ThisError)]
pub enum StackError {
    /// Known `@type` with missing or malformed fields, or not an object
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Stack entry wrapping a value of another kind, e.g.
    /// `tvm.stackEntrySlice` around `tvm.cell`
    #[error("{entry} can not wrap {inner}")]
    EntryMismatch {
        entry: &'static str,
        inner: &'static str,
    },
    #[cfg(feature = "boc")]
    #[error("BoC: {0}")]
    Boc(#[from] cellboc::BocError),
    /// Value is neither a slice nor a cell
    #[error("{0} does not hold bytes")]
    NotBytes(&'static str),
}
