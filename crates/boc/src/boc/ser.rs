use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use cellbits::{ByteWriter, ByteWriterExt, Endianness, integer::min_width};
use tracing::{debug, trace};

use crate::{BocError, Cell, ResultExt, crc32c};

use super::{
    BagOfCells, BagOfCellsArgs, COUNT_ENDIANNESS, CellOrder, DEFAULT_OFF_BYTES,
    DEFAULT_SIZE_BYTES, FLAG_HAS_CRC32C, FLAG_HAS_IDX, GENERIC_BOC_TAG, INDEX_ENDIANNESS,
    REF_ENDIANNESS, RawBagOfCells, RawCell, TOTAL_SIZE_ENDIANNESS,
};

const MAX_CELLS: usize = u32::MAX as usize;

impl BagOfCells {
    /// Serialize into bytes. Only bags with a single root are supported.
    pub fn serialize(&self, args: BagOfCellsArgs) -> Result<Vec<u8>, BocError> {
        let [root] = self.roots.as_slice() else {
            return Err(BocError::MultipleRoots(self.roots.len()));
        };
        RawBagOfCells::from_root(root, args.order)?.write(args)
    }
}

impl Cell {
    /// Serialize with [`BagOfCellsArgs::default()`]
    #[inline]
    pub fn to_boc_default(&self) -> Result<Vec<u8>, BocError> {
        self.to_boc(BagOfCellsArgs::default())
    }
}

impl RawBagOfCells {
    fn from_root(root: &Arc<Cell>, order: CellOrder) -> Result<Self, BocError> {
        let cells = match order {
            CellOrder::BreadthFirst => Self::breadth_first(root),
            CellOrder::Deduplicated => Self::deduplicated(root),
        }?;
        Ok(Self {
            cells,
            // root should have index 0
            roots: [0].into(),
            index: None,
        })
    }

    /// Every occurrence of a cell is emitted, children get consecutive
    /// positions in the order they are discovered.
    fn breadth_first(root: &Arc<Cell>) -> Result<Vec<RawCell>, BocError> {
        let total = root.total_cells_count();
        if total > MAX_CELLS {
            return Err(BocError::TooManyCells(total));
        }
        let mut queue: VecDeque<&Arc<Cell>> = [root].into();
        let mut cells = Vec::new();
        // position of the next discovered child
        let mut next: u64 = 1;
        while let Some(cell) = queue.pop_front() {
            cell.check().with_context(|| format!("[{}]", cells.len()))?;
            let references = cell
                .references()
                .iter()
                .map(|r| {
                    queue.push_back(r);
                    let i = next;
                    next += 1;
                    i
                })
                .collect();
            cells.push(RawCell::from_cell(cell, references));
        }
        Ok(cells)
    }

    /// Every distinct cell is emitted once, parents before children.
    fn deduplicated(root: &Arc<Cell>) -> Result<Vec<RawCell>, BocError> {
        let mut in_refs: HashMap<*const Cell, usize> = HashMap::new();
        let mut seen: HashSet<*const Cell> = [Arc::as_ptr(root)].into();
        let mut stack = vec![root];
        while let Some(cell) = stack.pop() {
            cell.check().context("cell_data")?;
            for r in cell.references() {
                *in_refs.entry(Arc::as_ptr(r)).or_default() += 1;
                if seen.insert(Arc::as_ptr(r)) {
                    stack.push(r);
                }
            }
        }
        if seen.len() > MAX_CELLS {
            return Err(BocError::TooManyCells(seen.len()));
        }

        let mut ordered: Vec<&Arc<Cell>> = Vec::with_capacity(seen.len());
        let mut positions: HashMap<*const Cell, u64> = HashMap::with_capacity(seen.len());
        let mut no_in_refs: VecDeque<&Arc<Cell>> = [root].into();
        while let Some(cell) = no_in_refs.pop_front() {
            positions.insert(Arc::as_ptr(cell), ordered.len() as u64);
            ordered.push(cell);
            for r in cell.references() {
                if let Some(refs) = in_refs.get_mut(&Arc::as_ptr(r)) {
                    *refs -= 1;
                    if *refs == 0 {
                        no_in_refs.push_back(r);
                    }
                }
            }
        }

        Ok(ordered
            .into_iter()
            .map(|cell| {
                RawCell::from_cell(
                    cell,
                    cell.references()
                        .iter()
                        // every child is ordered after all of its parents
                        .map(|r| positions[&Arc::as_ptr(r)])
                        .collect(),
                )
            })
            .collect())
    }

    fn write(&self, args: BagOfCellsArgs) -> Result<Vec<u8>, BocError> {
        let cells = self.cells.len() as u64;
        let size = DEFAULT_SIZE_BYTES.max(min_width(cells));
        let tot_cells_size: u64 = self.cells.iter().map(|c| c.size(size) as u64).sum();
        let off_bytes = DEFAULT_OFF_BYTES
            .max(min_width(tot_cells_size))
            .max(min_width(cells));

        let mut flags = size as u8;
        if args.has_idx {
            flags |= FLAG_HAS_IDX;
        }
        if args.has_crc32c {
            flags |= FLAG_HAS_CRC32C;
        }

        let mut buf: Vec<u8> = Vec::new();
        buf
            // serialized_boc#b5ee9c72
            .pack_uint(GENERIC_BOC_TAG.into(), 4, Endianness::Big)?
            // has_idx:(## 1) has_crc32c:(## 1) has_cache_bits:(## 1)
            // flags:(## 2) { flags = 0 } size:(## 3) { size <= 4 }
            .pack_u8(flags)
            // off_bytes:(## 8) { off_bytes <= 8 }
            .pack_u8(off_bytes as u8)
            // cells:(##(size * 8))
            .pack_uint(cells, size, COUNT_ENDIANNESS)?
            // roots:(##(size * 8)) { roots >= 1 }
            .pack_uint(self.roots.len() as u64, size, COUNT_ENDIANNESS)?
            // absent:(##(size * 8)) { roots + absent <= cells }
            .pack_uint(0, size, COUNT_ENDIANNESS)? // complete BoCs only
            // tot_cells_size:(##(off_bytes * 8))
            .pack_uint(tot_cells_size, off_bytes, TOTAL_SIZE_ENDIANNESS)?
            // root_list:(roots * ##(size * 8))
            .pack_many_uint(self.roots.iter().copied(), size, COUNT_ENDIANNESS)?;
        if args.has_idx {
            // index:has_idx?(cells * ##(off_bytes * 8))
            buf.pack_many_uint(0..cells, off_bytes, INDEX_ENDIANNESS)
                .context("index")?;
        }
        // cell_data:(tot_cells_size * [ uint8 ])
        for (i, cell) in self.cells.iter().enumerate() {
            cell.write(&mut buf, size)
                .with_context(|| format!("[{i}]"))
                .context("cell_data")?;
        }
        // crc32c:has_crc32c?uint32
        if args.has_crc32c {
            crc32c::append(&mut buf);
        }

        debug!(
            cells,
            size,
            off_bytes,
            tot_cells_size,
            has_idx = args.has_idx,
            has_crc32c = args.has_crc32c,
            order = ?args.order,
            len = buf.len(),
            "encoded BoC"
        );
        Ok(buf)
    }
}

impl RawCell {
    fn write<W>(&self, w: &mut W, ref_size: usize) -> Result<(), BocError>
    where
        W: ByteWriter + ?Sized,
    {
        w.pack_u8(self.refs_descriptor())
            .pack_u8(self.bits_descriptor());

        let mut data = self.data.clone();
        if data.len() % 8 != 0 {
            // completion tag
            data.push(true);
            data.resize(data.len().next_multiple_of(8), false);
        }
        w.pack_bytes(data.as_raw_slice())
            .pack_many_uint(self.references.iter().copied(), ref_size, REF_ENDIANNESS)?;

        trace!(
            bits = self.data.len(),
            refs = self.references.len(),
            special = self.special,
            "encoded cell"
        );
        Ok(())
    }
}
