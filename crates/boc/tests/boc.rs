use std::sync::Arc;

use cellboc::{BagOfCells, BagOfCellsArgs, BocError, Cell, CellOrder};
use hex_literal::hex;
use rstest::rstest;
use tracing_subscriber::EnvFilter;

/// Single 8-bit cell `FF` with index table and CRC-32C
const SINGLE_CELL: [u8; 21] = hex!("b5ee9c72 c1 02 01 01 00 0003 00 0000 0002ff fef3ba00");

/// Same cell, neither index table nor checksum
const SINGLE_CELL_PLAIN: [u8; 15] = hex!("b5ee9c72 01 02 01 01 00 0003 00 0002ff");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ff() -> Cell {
    Cell::from_bytes(8, hex!("ff")).unwrap()
}

#[test]
fn decode_single_cell() {
    init_tracing();
    let root = Cell::from_boc(SINGLE_CELL).unwrap();
    assert_eq!(*root, ff());
    assert!(!root.is_special());
    assert!(root.references().is_empty());
}

#[test]
fn encode_single_cell() {
    init_tracing();
    assert_eq!(ff().to_boc_default().unwrap(), SINGLE_CELL);
}

#[test]
fn encode_two_cells() {
    let mut root = Cell::builder();
    root.store_bit(true).unwrap().store_reference(ff()).unwrap();
    assert_eq!(
        root.into_cell().to_boc_default().unwrap(),
        hex!("b5ee9c72 c1 02 02 01 00 0007 00 0000 0100 0101c001 0002ff db6ba618")
    );
}

#[test]
fn decode_plain() {
    let boc = BagOfCells::deserialize(SINGLE_CELL_PLAIN).unwrap();
    assert_eq!(**boc.single_root().unwrap(), ff());
}

/// Empty cell as produced by other TON tooling: one byte `off_bytes`, no
/// index table
#[test]
fn decode_foreign_empty_cell() {
    let boc = BagOfCells::parse_base64("te6cckEBAQEAAgAAAEysuc0=").unwrap();
    let root = boc.into_single_root().unwrap();
    assert!(root.is_empty());
    assert_eq!(root.index(), 0);
}

#[test]
fn tampered_single_cell() {
    let mut bytes = SINGLE_CELL;
    bytes[19] ^= 0xff;
    assert!(matches!(
        BagOfCells::deserialize(bytes),
        Err(BocError::ChecksumMismatch { .. })
    ));
}

#[test]
fn any_flip_after_flags_is_a_checksum_mismatch() {
    for pos in 5..SINGLE_CELL.len() {
        for bit in 0..8 {
            let mut bytes = SINGLE_CELL;
            bytes[pos] ^= 1 << bit;
            assert!(
                matches!(
                    BagOfCells::deserialize(bytes),
                    Err(BocError::ChecksumMismatch { .. })
                ),
                "byte {pos}, bit {bit}"
            );
        }
    }
}

#[test]
fn truncated() {
    for len in 0..SINGLE_CELL_PLAIN.len() {
        let err = BagOfCells::deserialize(&SINGLE_CELL_PLAIN[..len]).unwrap_err();
        assert!(
            matches!(err.root_cause(), BocError::TruncatedInput { .. }),
            "{len}: {err}"
        );
    }
}

#[test]
fn trailing_bytes() {
    let mut bytes = SINGLE_CELL_PLAIN.to_vec();
    bytes.push(0);
    assert!(matches!(
        BagOfCells::deserialize(bytes),
        Err(BocError::InvalidHeader(_))
    ));
}

#[test]
fn unused_cell_data() {
    assert!(matches!(
        BagOfCells::deserialize(hex!("b5ee9c72 01 02 01 01 00 0004 00 0002ff00")),
        Err(BocError::InvalidHeader(_))
    ));
}

#[rstest]
#[case::indexed_boc(hex!("68ff65f3 01 02 01 01 00 0003 00 0002ff"), 0x68ff65f3)]
#[case::indexed_crc32c_boc(hex!("acc3a728 01 02 01 01 00 0003 00 0002ff"), 0xacc3a728)]
#[case::garbage(hex!("00000000 01 02 01 01 00 0003 00 0002ff"), 0)]
fn unsupported_format(#[case] bytes: [u8; 15], #[case] magic: u32) {
    assert_eq!(
        BagOfCells::deserialize(bytes).unwrap_err(),
        BocError::UnsupportedFormat(magic)
    );
}

#[rstest]
#[case::size_zero(hex!("b5ee9c72 00 02 01 01 00 0003 00 0002ff"))]
#[case::size_five(hex!("b5ee9c72 05 02 01 01 00 0003 00 0002ff"))]
#[case::off_bytes_zero(hex!("b5ee9c72 01 00 01 01 00 0003 00 0002ff"))]
#[case::off_bytes_nine(hex!("b5ee9c72 01 09 01 01 00 0003 00 0002ff"))]
#[case::no_roots(hex!("b5ee9c72 01 02 01 00 00 0003 00 0002ff"))]
#[case::roots_exceed_cells(hex!("b5ee9c72 01 02 01 02 00 0003 00 0002ff"))]
fn invalid_header(#[case] bytes: [u8; 15]) {
    assert!(matches!(
        BagOfCells::deserialize(bytes).unwrap_err().root_cause(),
        BocError::InvalidHeader(_)
    ));
}

#[test]
fn absent_cells() {
    assert_eq!(
        BagOfCells::deserialize(hex!("b5ee9c72 01 02 02 01 01 0003 00 0002ff")).unwrap_err(),
        BocError::AbsentCellsUnsupported(1)
    );
}

#[rstest]
#[case::out_of_range(hex!("b5ee9c72 01 01 01 01 00 03 00 010005").as_slice())]
#[case::self_reference(hex!("b5ee9c72 01 01 01 01 00 03 00 010000").as_slice())]
#[case::backward(hex!("b5ee9c72 01 01 02 01 00 05 00 0000 010000").as_slice())]
#[case::root_out_of_range(hex!("b5ee9c72 01 01 01 01 00 02 01 0000").as_slice())]
fn corrupt_reference_table(#[case] bytes: &[u8]) {
    assert!(matches!(
        BagOfCells::deserialize(bytes),
        Err(BocError::CorruptReferenceTable(_))
    ));
}

#[test]
fn multiple_roots() {
    init_tracing();
    let boc = BagOfCells::deserialize(hex!("b5ee9c72 01 01 02 02 00 06 00 01 0002aa 0002bb")).unwrap();
    assert_eq!(boc.roots().len(), 2);
    assert!(boc.single_root().is_none());
    assert_eq!(boc.root().unwrap().as_raw_slice(), hex!("aa"));
    assert_eq!(
        boc.serialize(BagOfCellsArgs::default()).unwrap_err(),
        BocError::MultipleRoots(2)
    );
    assert_eq!(boc.into_root().unwrap().as_raw_slice(), hex!("aa"));

    let root = Cell::from_boc(hex!("b5ee9c72 01 01 02 02 00 06 01 00 0002aa 0002bb")).unwrap();
    assert_eq!(root.as_raw_slice(), hex!("bb"));
}

#[test]
fn shared_cells() {
    init_tracing();
    let leaf = Arc::new(ff());
    let mut mid = Cell::new();
    mid.push_reference(leaf.clone())
        .unwrap()
        .push_reference(leaf)
        .unwrap();
    let mid = Arc::new(mid);
    let mut root = Cell::new();
    root.push_reference(mid.clone())
        .unwrap()
        .push_reference(mid)
        .unwrap();

    let expanded = root.to_boc_default().unwrap();
    let deduplicated = root
        .to_boc(BagOfCellsArgs::default().with_order(CellOrder::Deduplicated))
        .unwrap();
    assert!(deduplicated.len() < expanded.len());

    for bytes in [expanded, deduplicated] {
        let got = Cell::from_boc(bytes).unwrap();
        assert_eq!(*got, root);
        assert_eq!(got.total_cells_count(), 7);
    }
}

#[test]
fn special_cell() {
    let mut cell = Cell::from_bytes(8, hex!("01")).unwrap();
    cell.set_special(true);
    let bytes = cell.to_boc(BagOfCellsArgs::default()).unwrap();
    assert_eq!(bytes[14], 0b1000);
    assert!(Cell::from_boc(bytes).unwrap().is_special());
}

#[test]
fn hex_string() {
    let s = ff().to_boc_default().map(hex::encode).unwrap();
    assert_eq!(s, "b5ee9c72c10201010000030000000002fffef3ba00");
    assert_eq!(
        BagOfCells::parse_hex(s).unwrap(),
        BagOfCells::from_root(ff())
    );
}

/// `n` cells in a chain, each referencing the next one. Two-byte cell
/// counts and references, four-byte `off_bytes`.
fn chain_boc(n: u16) -> Vec<u8> {
    let tot_cells_size = (n as u32 - 1) * 4 + 2;
    let mut bytes = hex!("b5ee9c72 02 04").to_vec();
    bytes.extend(n.to_le_bytes());
    bytes.extend(hex!("0100 0000"));
    bytes.extend(tot_cells_size.to_be_bytes());
    bytes.extend(hex!("0000"));
    for i in 1..n {
        bytes.extend(hex!("01 00"));
        bytes.extend(i.to_be_bytes());
    }
    bytes.extend(hex!("00 00"));
    bytes
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(Cell::MAX_DEPTH + 1)]
fn deep_chain(#[case] n: u16) {
    let root = Cell::from_boc(chain_boc(n)).unwrap();
    assert_eq!(root.max_depth(), n - 1);
    assert_eq!(root.total_cells_count(), n as usize);
}

#[rstest]
#[case(Cell::MAX_DEPTH + 2)]
#[case(20_000)]
fn too_deep_chain(#[case] n: u16) {
    let err = BagOfCells::deserialize(chain_boc(n)).unwrap_err();
    assert_eq!(
        err.root_cause(),
        &BocError::DepthOverflow(Cell::MAX_DEPTH + 1),
        "{err}"
    );
}

#[test]
fn untagged_half_byte_payload() {
    assert!(matches!(
        BagOfCells::deserialize(hex!("b5ee9c72 01 01 01 01 00 03 00 0001 00"))
            .unwrap_err()
            .root_cause(),
        BocError::InvalidCell(_)
    ));
}
