use std::sync::Arc;

use bitvec::{order::Msb0, vec::BitVec};
use cellbits::ByteReader;
use tracing::{debug, trace};

use crate::{BocError, Cell, ResultExt, crc32c};

use super::{
    BagOfCells, COUNT_ENDIANNESS, FLAG_HAS_CACHE_BITS, FLAG_HAS_CRC32C, FLAG_HAS_IDX,
    GENERIC_BOC_TAG, INDEX_ENDIANNESS, MAX_OFF_BYTES, MAX_SIZE_BYTES, REF_ENDIANNESS, RawBagOfCells,
    RawCell, SIZE_MASK, TOTAL_SIZE_ENDIANNESS,
};

impl BagOfCells {
    /// Deserialize from bytes, keeping all roots
    pub fn deserialize(bytes: impl AsRef<[u8]>) -> Result<Self, BocError> {
        RawBagOfCells::parse(bytes.as_ref())?.resolve()
    }
}

impl RawBagOfCells {
    fn parse(bytes: &[u8]) -> Result<Self, BocError> {
        let mut reader = ByteReader::new(bytes);

        // serialized_boc#b5ee9c72
        let tag = u32::from_be_bytes(reader.read_array().context("magic")?);
        if tag != GENERIC_BOC_TAG {
            return Err(BocError::UnsupportedFormat(tag));
        }
        let flags = reader.read_u8().context("flags")?;
        let has_idx = flags & FLAG_HAS_IDX != 0;
        let has_crc32c = flags & FLAG_HAS_CRC32C != 0;
        let has_cache_bits = flags & FLAG_HAS_CACHE_BITS != 0;

        // crc32c:has_crc32c?uint32
        let body = if has_crc32c {
            let left = reader.remaining();
            if left < crc32c::CHECKSUM_LEN {
                return Err(BocError::TruncatedInput {
                    needed: crc32c::CHECKSUM_LEN,
                    left,
                })
                .context("crc32c");
            }
            let (body, cs) = bytes.split_at(bytes.len() - crc32c::CHECKSUM_LEN);
            let mut expected = [0; crc32c::CHECKSUM_LEN];
            expected.copy_from_slice(cs);
            let expected = u32::from_le_bytes(expected);
            let computed = crc32c::crc32c(body);
            if expected != computed {
                return Err(BocError::ChecksumMismatch { expected, computed });
            }
            body
        } else {
            bytes
        };
        let mut reader = ByteReader::new(&body[reader.position()..]);

        // size:(## 3) { size <= 4 }
        let size = (flags & SIZE_MASK) as usize;
        if !(1..=MAX_SIZE_BYTES).contains(&size) {
            return Err(BocError::InvalidHeader(format!("invalid size: {size}")));
        }
        // off_bytes:(## 8) { off_bytes <= 8 }
        let off_bytes = reader.read_u8().context("off_bytes")? as usize;
        if !(1..=MAX_OFF_BYTES).contains(&off_bytes) {
            return Err(BocError::InvalidHeader(format!(
                "invalid off_bytes: {off_bytes}"
            )));
        }
        // cells:(##(size * 8))
        let cells = reader.read_uint(size, COUNT_ENDIANNESS).context("cells")?;
        // roots:(##(size * 8)) { roots >= 1 }
        let roots = reader.read_uint(size, COUNT_ENDIANNESS).context("roots")?;
        // absent:(##(size * 8)) { roots + absent <= cells }
        let absent = reader.read_uint(size, COUNT_ENDIANNESS).context("absent")?;
        if roots == 0 {
            return Err(BocError::InvalidHeader("no roots".to_string()));
        }
        if roots + absent > cells {
            return Err(BocError::InvalidHeader(format!(
                "roots + absent > cells: {roots} + {absent} > {cells}"
            )));
        }
        if absent != 0 {
            return Err(BocError::AbsentCellsUnsupported(absent));
        }
        // tot_cells_size:(##(off_bytes * 8))
        let tot_cells_size = reader
            .read_uint(off_bytes, TOTAL_SIZE_ENDIANNESS)
            .context("tot_cells_size")?;

        debug!(
            cells,
            roots,
            size,
            off_bytes,
            tot_cells_size,
            has_idx,
            has_crc32c,
            has_cache_bits,
            "decoded BoC header"
        );

        // root_list:(roots * ##(size * 8))
        let root_list = (0..roots)
            .map(|_| reader.read_uint(size, COUNT_ENDIANNESS))
            .collect::<Result<Vec<_>, _>>()
            .context("root_list")?;
        if let Some(r) = root_list.iter().find(|&&r| r >= cells) {
            return Err(BocError::CorruptReferenceTable(format!(
                "root [{r}] is out of {cells} cells"
            )));
        }

        // index:has_idx?(cells * ##(off_bytes * 8))
        let index = has_idx
            .then(|| {
                (0..cells)
                    .map(|_| reader.read_uint(off_bytes, INDEX_ENDIANNESS))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .context("index")?;

        // cell_data:(tot_cells_size * [ uint8 ])
        let cell_data = reader
            .read_bytes(usize::try_from(tot_cells_size).unwrap_or(usize::MAX))
            .context("cell_data")?;
        if !reader.is_empty() {
            return Err(BocError::InvalidHeader(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }

        let mut cell_reader = ByteReader::new(cell_data);
        let cells = (0..cells)
            .map(|i| RawCell::parse(&mut cell_reader, size).with_context(|| format!("[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .context("cell_data")?;
        if !cell_reader.is_empty() {
            return Err(BocError::InvalidHeader(format!(
                "{} unused bytes in cell_data",
                cell_reader.remaining()
            )));
        }

        Ok(Self {
            cells,
            roots: root_list,
            index,
        })
    }

    /// Build cells starting from the end of the table, so that every
    /// reference is already resolved by the time its parent is built.
    fn resolve(self) -> Result<BagOfCells, BocError> {
        let len = self.cells.len();
        // resolved[len - 1 - i] holds the cell at position i
        let mut resolved: Vec<Arc<Cell>> = Vec::with_capacity(len);
        for (i, raw) in self.cells.into_iter().enumerate().rev() {
            let mut cell = Cell::from_bits(raw.data).with_context(|| format!("[{i}]"))?;
            cell.set_special(raw.special);
            cell.set_index(self.index.as_ref().map_or(i as u64, |index| index[i]));
            for r in raw.references {
                if r >= len as u64 {
                    return Err(BocError::CorruptReferenceTable(format!(
                        "[{i}] -> [{r}]: out of {len} cells"
                    )));
                }
                if r <= i as u64 {
                    return Err(BocError::CorruptReferenceTable(format!(
                        "[{i}] -> [{r}]: references must point to later cells"
                    )));
                }
                cell.push_reference(resolved[len - 1 - r as usize].clone())
                    .with_context(|| format!("[{i}]"))?;
            }
            resolved.push(cell.into());
        }
        Ok(BagOfCells {
            roots: self
                .roots
                .into_iter()
                .map(|r| resolved[len - 1 - r as usize].clone())
                .collect(),
        })
    }
}

impl RawCell {
    /// The bit length of a partial last byte is recovered from its
    /// completion tag. A half-byte payload without the tag (odd `d2`, zero
    /// last byte) is rejected as [`BocError::InvalidCell`].
    fn parse(reader: &mut ByteReader<'_>, ref_size: usize) -> Result<Self, BocError> {
        let refs_descriptor = reader.read_u8()?;
        let refs = (refs_descriptor & 0b111) as usize;
        if refs > Cell::MAX_REFS_COUNT {
            return Err(BocError::InvalidCell(format!("{refs} references")));
        }
        let special = refs_descriptor & 0b1000 != 0;
        if refs_descriptor & 0b1_0000 != 0 {
            return Err(BocError::InvalidCell(
                "stored hashes are not supported".to_string(),
            ));
        }

        let bits_descriptor = reader.read_u8()?;
        let full_bytes = bits_descriptor & 1 == 0;
        let num_bytes = (bits_descriptor >> 1) as usize + (!full_bytes) as usize;

        let payload = reader.read_bytes(num_bytes)?;
        let mut data = BitVec::<u8, Msb0>::from_slice(payload);
        if !full_bytes {
            let last = payload.last().copied().unwrap_or_default();
            if last == 0 {
                return Err(BocError::InvalidCell("missing completion tag".to_string()));
            }
            data.truncate(data.len() - last.trailing_zeros() as usize - 1);
        }

        let references = (0..refs)
            .map(|_| reader.read_uint(ref_size, REF_ENDIANNESS))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(bits = data.len(), refs, special, "decoded cell");

        Ok(Self {
            data,
            references,
            special,
        })
    }
}
