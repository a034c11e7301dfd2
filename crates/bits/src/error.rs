use thiserror::Error as ThisError;

/// Error produced by the integer codec and byte cursors
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Not enough bytes left in the input
    #[error("EOF: {needed} bytes needed, {left} left")]
    Eof { needed: usize, left: usize },
    /// Integer width outside of `1..=8`
    #[error("unsupported integer width: {0} bytes, expected 1..=8")]
    UnsupportedWidth(usize),
    /// Buffer length does not match the requested width
    #[error("expected {width} bytes, got {len}")]
    UnexpectedLength { width: usize, len: usize },
    /// Value does not fit into the requested width
    #[error("{value:#x} cannot be represented in {width} bytes")]
    ValueOverflow { value: u64, width: usize },
}
