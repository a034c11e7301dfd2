mod builder;
mod parser;

pub use self::{builder::*, parser::*};

use core::{
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
};
use std::{collections::HashMap, sync::Arc};

use bitvec::{order::Msb0, slice::BitSlice, vec::BitVec};

use crate::BocError;

/// A [Cell](https://docs.ton.org/develop/data-formats/cell-boc#cell).
///
/// Cells form a DAG: the same [`Arc<Cell>`] can be referenced by several
/// parents. A cell can only be mutated while exclusively owned, so once it
/// is shared it is immutable and cycles can not be constructed.
#[derive(Clone, Default)]
pub struct Cell {
    data: BitVec<u8, Msb0>,
    references: Vec<Arc<Self>>,
    special: bool,
    /// Longest path to a leaf, kept up to date by [`Cell::push_reference`]
    depth: u16,
    index: u64,
}

impl Cell {
    /// Maximum number of data bits
    pub const MAX_BITS_LEN: usize = 1023;

    /// Maximum number of references
    pub const MAX_REFS_COUNT: usize = 4;

    /// Maximum length of a path from a cell down to a leaf
    pub const MAX_DEPTH: u16 = 1024;

    /// Create empty cell
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: BitVec::EMPTY,
            references: Vec::new(),
            special: false,
            depth: 0,
            index: 0,
        }
    }

    /// Create new [`CellBuilder`]
    #[inline]
    #[must_use]
    pub const fn builder() -> CellBuilder {
        CellBuilder::new()
    }

    /// Create cell holding given bits
    pub fn from_bits(mut data: BitVec<u8, Msb0>) -> Result<Self, BocError> {
        if data.len() > Self::MAX_BITS_LEN {
            return Err(BocError::CellOverflow(data.len()));
        }
        data.set_uninitialized(false);
        Ok(Self {
            data,
            ..Self::new()
        })
    }

    /// Create cell holding first `bit_len` bits of `bytes`
    pub fn from_bytes(bit_len: usize, bytes: impl AsRef<[u8]>) -> Result<Self, BocError> {
        let bytes = bytes.as_ref();
        if bit_len > Self::MAX_BITS_LEN {
            return Err(BocError::CellOverflow(bit_len));
        }
        let mut data = BitVec::<u8, Msb0>::from_slice(bytes);
        if data.len() < bit_len {
            return Err(BocError::InvalidCell(format!(
                "{bit_len} bits requested, only {} given",
                data.len()
            )));
        }
        data.truncate(bit_len);
        Self::from_bits(data)
    }

    /// Number of data bits
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn data(&self) -> &BitSlice<u8, Msb0> {
        &self.data
    }

    /// Data bytes, the last one zero-padded when [`bit_len`](Cell::bit_len)
    /// is not a multiple of 8
    #[inline]
    pub fn as_raw_slice(&self) -> &[u8] {
        self.data.as_raw_slice()
    }

    #[inline]
    pub fn references(&self) -> &[Arc<Self>] {
        &self.references
    }

    #[inline]
    pub fn reference(&self, i: usize) -> Option<&Arc<Self>> {
        self.references.get(i)
    }

    /// Whether this is a special (exotic) cell
    #[inline]
    pub const fn is_special(&self) -> bool {
        self.special
    }

    #[inline]
    pub fn set_special(&mut self, special: bool) -> &mut Self {
        self.special = special;
        self
    }

    /// Position bookkeeping assigned while deserializing: the entry from
    /// the BoC index table, or the position in the cell table when there is
    /// no index. Not a part of cell identity.
    #[inline]
    pub const fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub(crate) fn set_index(&mut self, index: u64) {
        self.index = index;
    }

    /// Append given bits to data
    pub fn append_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> Result<&mut Self, BocError> {
        let len = self.data.len() + bits.len();
        if len > Self::MAX_BITS_LEN {
            return Err(BocError::CellOverflow(len));
        }
        self.data.extend_from_bitslice(bits);
        self.data.set_uninitialized(false);
        Ok(self)
    }

    /// Append whole bytes to data
    #[inline]
    pub fn append_bytes(&mut self, bytes: impl AsRef<[u8]>) -> Result<&mut Self, BocError> {
        self.append_bits(BitSlice::from_slice(bytes.as_ref()))
    }

    /// Add reference to given cell
    pub fn push_reference(&mut self, cell: impl Into<Arc<Self>>) -> Result<&mut Self, BocError> {
        if self.references.len() == Self::MAX_REFS_COUNT {
            return Err(BocError::TooManyReferences);
        }
        let cell = cell.into();
        let depth = cell.depth + 1;
        if depth > Self::MAX_DEPTH {
            return Err(BocError::DepthOverflow(depth));
        }
        self.references.push(cell);
        self.depth = self.depth.max(depth);
        Ok(self)
    }

    /// Returns [`CellParser`] for this cell
    #[inline]
    #[must_use]
    pub fn parser(&self) -> CellParser<'_> {
        CellParser::new(&self.data, &self.references)
    }

    /// Returns whether this cell has no data and zero references.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.references.is_empty()
    }

    /// Number of cells in the tree rooted at this cell, counting a cell
    /// reachable by several paths once per path. Saturates at
    /// [`usize::MAX`].
    #[inline]
    pub fn total_cells_count(&self) -> usize {
        self.count_paths(&mut HashMap::new())
    }

    /// Each shared cell is counted once, its result reused for every parent
    fn count_paths(&self, counted: &mut HashMap<*const Self, usize>) -> usize {
        self.references.iter().fold(1, |total, r| {
            let count = match counted.get(&Arc::as_ptr(r)) {
                Some(&count) => count,
                None => {
                    let count = r.count_paths(counted);
                    counted.insert(Arc::as_ptr(r), count);
                    count
                }
            };
            total.saturating_add(count)
        })
    }

    /// Longest path to a leaf, at most [`Cell::MAX_DEPTH`]
    #[inline]
    pub const fn max_depth(&self) -> u16 {
        self.depth
    }

    /// Invariants can not be broken through the public API, but they are
    /// checked again right before serialization.
    pub(crate) fn check(&self) -> Result<(), BocError> {
        if self.data.len() > Self::MAX_BITS_LEN {
            return Err(BocError::CellOverflow(self.data.len()));
        }
        if self.references.len() > Self::MAX_REFS_COUNT {
            return Err(BocError::TooManyReferences);
        }
        Ok(())
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.special == other.special
            && self.data == other.data
            && self.references == other.references
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.special.hash(state);
        self.data.hash(state);
        self.references.hash(state);
    }
}

impl Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.special {
            write!(f, "!")?;
        }
        if f.alternate() {
            write!(f, "{}[0b", self.data.len())?;
            for bit in &self.data {
                write!(f, "{}", if *bit { '1' } else { '0' })?;
            }
            write!(f, "]")?;
        } else {
            write!(
                f,
                "{}[0x{}]",
                self.data.len(),
                hex::encode_upper(self.as_raw_slice())
            )?;
        }
        if self.references.is_empty() {
            return Ok(());
        }
        write!(f, " -> ")?;
        f.debug_set().entries(&self.references).finish()
    }
}

impl Cell {
    /// Data in Fift hex notation: a trailing `_` means the last nibble
    /// carries a completion tag
    fn fift_hex(&self) -> String {
        let mut bits = self.data.clone();
        let incomplete = bits.len() % 4 != 0;
        if incomplete {
            bits.push(true);
            while bits.len() % 4 != 0 {
                bits.push(false);
            }
        }
        let mut s = hex::encode_upper(bits.as_raw_slice());
        if bits.len() % 8 != 0 {
            s.pop();
        }
        if incomplete {
            s.push('_');
        }
        s
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}x{{{}}}", "", self.fift_hex(), indent = depth * 2)?;
        for r in &self.references {
            writeln!(f)?;
            r.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Fift-like representation:
/// ```text
/// x{C_}
///   x{FF}
///   x{}
/// ```
impl Display for Cell {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(feature = "arbitrary")]
const _: () = {
    use arbitrary::{Arbitrary, Error, MaxRecursionReached, Result, Unstructured, size_hint};
    use bitvec::mem::bits_of;

    impl<'a> Arbitrary<'a> for Cell {
        fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
            let len_bytes = u
                .arbitrary_len::<u8>()?
                .min(Self::MAX_BITS_LEN.div_ceil(bits_of::<u8>()));
            let mut bits = BitVec::from_slice(u.bytes(len_bytes)?);
            bits.truncate(u.int_in_range(0..=bits.len().min(Self::MAX_BITS_LEN))?);
            let mut cell = Self::from_bits(bits).map_err(|_| Error::IncorrectFormat)?;
            for r in u.arbitrary_iter::<Arc<Self>>()?.take(Self::MAX_REFS_COUNT) {
                cell.push_reference(r?)
                    .map_err(|_| Error::IncorrectFormat)?;
            }
            Ok(cell)
        }

        #[inline]
        fn size_hint(depth: usize) -> (usize, Option<usize>) {
            Self::try_size_hint(depth).unwrap_or_default()
        }

        fn try_size_hint(depth: usize) -> Result<(usize, Option<usize>), MaxRecursionReached> {
            size_hint::try_recursion_guard(depth, |depth| {
                Ok(size_hint::and(
                    (0, Some(Self::MAX_BITS_LEN.div_ceil(bits_of::<u8>()))),
                    <Vec<Arc<Self>> as Arbitrary>::size_hint(depth),
                ))
            })
        }
    }
};
