use core::fmt::Display;

use thiserror::Error as ThisError;

/// **De**/**ser**ialization error for cells and [`BagOfCells`](crate::BagOfCells)
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum BocError {
    /// Unrecognized magic at the start of the stream
    #[error("unsupported BoC format: magic {0:#010x}")]
    UnsupportedFormat(u32),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("CRC32C mismatch: stored {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { expected: u32, computed: u32 },
    /// Reference or root index that does not point to a later cell in the table
    #[error("corrupt reference table: {0}")]
    CorruptReferenceTable(String),
    /// Cell data would exceed [`Cell::MAX_BITS_LEN`](crate::Cell::MAX_BITS_LEN)
    #[error("cell overflow: {0} bits, at most 1023 allowed")]
    CellOverflow(usize),
    #[error("too many references: at most 4 allowed")]
    TooManyReferences,
    /// Reference would make the cell deeper than
    /// [`Cell::MAX_DEPTH`](crate::Cell::MAX_DEPTH)
    #[error("cell depth overflow: {0}, at most 1024 allowed")]
    DepthOverflow(u16),
    /// Not enough bits or references left while parsing a cell
    #[error("cell underflow: {0}")]
    CellUnderflow(String),
    #[error("truncated input: {needed} bytes needed, {left} left")]
    TruncatedInput { needed: usize, left: usize },
    #[error("absent cells are not supported: {0} declared")]
    AbsentCellsUnsupported(u64),
    #[error("invalid cell: {0}")]
    InvalidCell(String),
    #[error("only single root is supported, got {0}")]
    MultipleRoots(usize),
    #[error("too many cells to encode: {0}")]
    TooManyCells(usize),
    /// hex/base64 representation could not be decoded
    #[error("encoding: {0}")]
    Encoding(String),
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<BocError>,
    },
}

impl BocError {
    /// Wraps current error in given context
    #[inline]
    #[must_use]
    pub fn context<C>(self, context: C) -> Self
    where
        C: Display,
    {
        Self::Context {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the error with all [`Context`](BocError::Context) layers
    /// stripped
    pub fn root_cause(&self) -> &Self {
        let mut err = self;
        while let Self::Context { source, .. } = err {
            err = source;
        }
        err
    }
}

impl From<cellbits::Error> for BocError {
    fn from(err: cellbits::Error) -> Self {
        match err {
            cellbits::Error::Eof { needed, left } => Self::TruncatedInput { needed, left },
            err => Self::InvalidHeader(err.to_string()),
        }
    }
}

/// Adapter for providing context on [`Result`]
pub trait ResultExt<T>: Sized {
    /// Wrap [`Err`] in context by calling given function
    fn with_context<C>(self, context: impl FnOnce() -> C) -> Result<T, BocError>
    where
        C: Display;

    /// Wrap [`Err`] in given context
    #[inline]
    fn context<C>(self, context: C) -> Result<T, BocError>
    where
        C: Display,
    {
        self.with_context(move || context)
    }
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BocError>,
{
    #[inline]
    fn with_context<C>(self, context: impl FnOnce() -> C) -> Result<T, BocError>
    where
        C: Display,
    {
        self.map_err(move |err| err.into().context(context()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chain() {
        let err: Result<(), _> = Err(BocError::TooManyReferences);
        let err = err.context("[2]").context("cell_data").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cell_data: [2]: too many references: at most 4 allowed"
        );
        assert_eq!(err.root_cause(), &BocError::TooManyReferences);
    }

    #[test]
    fn context_on_foreign_error() {
        let err: Result<u8, cellbits::Error> = Err(cellbits::Error::UnsupportedWidth(9));
        let err = err.context("off_bytes").unwrap_err();
        assert!(matches!(err.root_cause(), BocError::InvalidHeader(_)));
        assert!(err.to_string().starts_with("off_bytes: invalid header: "));
    }

    #[test]
    fn eof_is_truncation() {
        assert_eq!(
            BocError::from(cellbits::Error::Eof { needed: 4, left: 1 }),
            BocError::TruncatedInput { needed: 4, left: 1 }
        );
    }
}
