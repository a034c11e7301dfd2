//! Collection of types related to [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells)
//!
//! ```tlb
//! serialized_boc#b5ee9c72 has_idx:(## 1) has_crc32c:(## 1)
//!   has_cache_bits:(## 1) flags:(## 2) { flags = 0 }
//!   size:(## 3) { size <= 4 }
//!   off_bytes:(## 8) { off_bytes <= 8 }
//!   cells:(##(size * 8))
//!   roots:(##(size * 8)) { roots >= 1 }
//!   absent:(##(size * 8)) { roots + absent <= cells }
//!   tot_cells_size:(##(off_bytes * 8))
//!   root_list:(roots * ##(size * 8))
//!   index:has_idx?(cells * ##(off_bytes * 8))
//!   cell_data:(tot_cells_size * [ uint8 ])
//!   crc32c:has_crc32c?uint32
//!   = BagOfCells;
//! ```
//!
//! Byte order of the integer fields follows the reference
//! implementation: `cells`, `roots`, `absent`, `root_list` and `index` are
//! little-endian, while `tot_cells_size` and per-cell references are
//! big-endian. The two coincide for single-byte fields.
mod de;
mod ser;

use core::fmt::{self, Debug};
use std::sync::Arc;

use bitvec::{order::Msb0, vec::BitVec};
use cellbits::Endianness;
use tracing::warn;

use crate::{BocError, Cell};

/// ```tlb
/// serialized_boc#b5ee9c72
/// ```
pub const GENERIC_BOC_TAG: u32 = 0xb5ee9c72;

const FLAG_HAS_IDX: u8 = 0b1000_0000;
const FLAG_HAS_CRC32C: u8 = 0b0100_0000;
const FLAG_HAS_CACHE_BITS: u8 = 0b0010_0000;
const SIZE_MASK: u8 = 0b0000_0111;

const MAX_SIZE_BYTES: usize = 4;
const MAX_OFF_BYTES: usize = 8;

/// Field widths used by the encoder unless the graph needs wider ones
const DEFAULT_SIZE_BYTES: usize = 1;
const DEFAULT_OFF_BYTES: usize = 2;

/// `cells`, `roots`, `absent` and `root_list`
const COUNT_ENDIANNESS: Endianness = Endianness::Little;
/// `index`
const INDEX_ENDIANNESS: Endianness = Endianness::Little;
/// `tot_cells_size`
const TOTAL_SIZE_ENDIANNESS: Endianness = Endianness::Big;
/// references inside `cell_data`
const REF_ENDIANNESS: Endianness = Endianness::Big;

/// Alias to [`BagOfCells`]
pub type BoC = BagOfCells;

/// [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells) is used to **de**/**ser**ialize a set of cells from/into
/// bytes.
///
/// ```rust
/// # use cellboc::{BagOfCells, BagOfCellsArgs, BocError, Cell};
/// # fn main() -> Result<(), BocError> {
/// let mut builder = Cell::builder();
/// builder.store_uint(1234, 32)?;
/// let root = builder.into_cell();
///
/// let packed = BagOfCells::from_root(root).serialize(BagOfCellsArgs::default())?;
///
/// let unpacked = BagOfCells::deserialize(&packed)?;
/// let got = unpacked.single_root().unwrap().parser().load_uint(32)?;
///
/// assert_eq!(got, 1234);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
}

impl BagOfCells {
    /// Create from single root cell
    #[inline]
    pub fn from_root(root: impl Into<Arc<Cell>>) -> Self {
        Self {
            roots: [root.into()].into(),
        }
    }

    /// Add root
    #[inline]
    pub fn add_root(&mut self, root: impl Into<Arc<Cell>>) {
        self.roots.push(root.into())
    }

    #[inline]
    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    /// Return first root
    #[inline]
    pub fn root(&self) -> Option<&Arc<Cell>> {
        self.roots.first()
    }

    /// Return single root or `None` otherwise
    #[inline]
    pub fn single_root(&self) -> Option<&Arc<Cell>> {
        let [root]: &[_; 1] = self.roots.as_slice().try_into().ok()?;
        Some(root)
    }

    /// Consume `self` and return the first root, discarding the rest
    pub fn into_root(self) -> Option<Arc<Cell>> {
        if self.roots.len() > 1 {
            warn!(
                roots = self.roots.len(),
                "bag of cells has several roots, using the first one"
            );
        }
        self.roots.into_iter().next()
    }

    /// Consume `self` and return single root or `None` otherwise
    #[inline]
    pub fn into_single_root(self) -> Option<Arc<Cell>> {
        let [root]: [_; 1] = self.roots.try_into().ok()?;
        Some(root)
    }

    #[inline]
    pub fn into_roots(self) -> Vec<Arc<Cell>> {
        self.roots
    }

    /// Parse hexadecimal string
    #[inline]
    pub fn parse_hex(s: impl AsRef<[u8]>) -> Result<Self, BocError> {
        hex::decode(s)
            .map_err(|err| BocError::Encoding(err.to_string()))
            .and_then(Self::deserialize)
    }

    /// Serialize as lowercase hexadecimal string
    #[inline]
    pub fn to_hex(&self, args: BagOfCellsArgs) -> Result<String, BocError> {
        self.serialize(args).map(hex::encode)
    }

    /// Parse base64-encoded string
    #[cfg(feature = "base64")]
    #[inline]
    pub fn parse_base64(s: impl AsRef<[u8]>) -> Result<Self, BocError> {
        use base64::{Engine, engine::general_purpose::STANDARD};

        STANDARD
            .decode(s)
            .map_err(|err| BocError::Encoding(err.to_string()))
            .and_then(Self::deserialize)
    }

    /// Serialize as standard base64 string
    #[cfg(feature = "base64")]
    #[inline]
    pub fn to_base64(&self, args: BagOfCellsArgs) -> Result<String, BocError> {
        use base64::{Engine, engine::general_purpose::STANDARD};

        self.serialize(args).map(|bytes| STANDARD.encode(bytes))
    }
}

impl Debug for BagOfCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.roots).finish()
    }
}

impl TryFrom<Vec<u8>> for BagOfCells {
    type Error = BocError;

    #[inline]
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::deserialize(value)
    }
}

impl TryFrom<&[u8]> for BagOfCells {
    type Error = BocError;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::deserialize(value)
    }
}

impl Cell {
    /// Deserialize [`BagOfCells`] and return its first root
    pub fn from_boc(bytes: impl AsRef<[u8]>) -> Result<Arc<Self>, BocError> {
        BagOfCells::deserialize(bytes)?
            .into_root()
            .ok_or_else(|| BocError::InvalidHeader("no roots".to_string()))
    }

    /// Serialize [`BagOfCells`] with this cell as the only root
    #[inline]
    pub fn to_boc(&self, args: BagOfCellsArgs) -> Result<Vec<u8>, BocError> {
        BagOfCells::from_root(self.clone()).serialize(args)
    }
}

/// Order in which the encoder lays out cells
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellOrder {
    /// Breadth-first from the root, a cell reachable by several paths is
    /// written once per path
    #[default]
    BreadthFirst,
    /// Every distinct cell (by [`Arc`] identity) is written once, parents
    /// before children
    Deduplicated,
}

/// Serialization options for [`BagOfCells`]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BagOfCellsArgs {
    pub has_idx: bool,
    pub has_crc32c: bool,
    pub order: CellOrder,
}

impl Default for BagOfCellsArgs {
    #[inline]
    fn default() -> Self {
        Self {
            has_idx: true,
            has_crc32c: true,
            order: CellOrder::default(),
        }
    }
}

impl BagOfCellsArgs {
    #[inline]
    #[must_use]
    pub const fn with_idx(mut self, has_idx: bool) -> Self {
        self.has_idx = has_idx;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_crc32c(mut self, has_crc32c: bool) -> Self {
        self.has_crc32c = has_crc32c;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_order(mut self, order: CellOrder) -> Self {
        self.order = order;
        self
    }
}

/// Flat form of [`BagOfCells`]: cells refer to each other by position
#[derive(PartialEq, Eq, Debug, Clone)]
struct RawBagOfCells {
    cells: Vec<RawCell>,
    roots: Vec<u64>,
    /// Entries of the index table, if present
    index: Option<Vec<u64>>,
}

#[derive(PartialEq, Eq, Debug, Clone)]
struct RawCell {
    data: BitVec<u8, Msb0>,
    references: Vec<u64>,
    special: bool,
}

impl RawCell {
    #[inline]
    fn from_cell(cell: &Cell, references: Vec<u64>) -> Self {
        Self {
            data: cell.data().to_bitvec(),
            references,
            special: cell.is_special(),
        }
    }

    /// Serialized size in bytes
    #[inline]
    fn size(&self, ref_size_bytes: usize) -> usize {
        2 + self.data.len().div_ceil(8) + self.references.len() * ref_size_bytes
    }

    /// See [Cell serialization](https://docs.ton.org/develop/data-formats/cell-boc#cell-serialization)
    #[inline]
    fn refs_descriptor(&self) -> u8 {
        self.references.len() as u8 | (u8::from(self.special) << 3)
    }

    /// See [Cell serialization](https://docs.ton.org/develop/data-formats/cell-boc#cell-serialization)
    #[inline]
    fn bits_descriptor(&self) -> u8 {
        let b = self.data.len();
        (b / 8 + b.div_ceil(8)) as u8
    }
}
