//! End-to-end format conversion and query tests
//!
//! Exercises the public API the way the conversion tools drive it: build an
//! ephemeris, write it as text, convert text to binary on disk, read it
//! back, convert to text again, and interpolate from the binary file.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use approx::assert_relative_eq;

use ephio::{ascii, binary, names::targets, Coords, Header, LayoutTriple, Resolver};

const JD0: f64 = 2451536.5;
const JD1: f64 = 2451600.5;
const AU: f64 = 149597870.691;
const EMRAT: f64 = 81.30056;

fn sample_header() -> Header {
    let mut h = Header::default();
    h.ss = [JD0, JD1, 32.0];
    h.names = ["DENUM", "LENUM", "AU", "EMRAT", "CLIGHT", "GM1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    h.values = vec![903.0, 903.0, AU, EMRAT, 299792.458, 4.91254745145081187e-11];
    h.body[0] = LayoutTriple {
        start: 3,
        ncoeff: 120,
        nsub: 1,
    };
    h.body[2] = LayoutTriple {
        start: 363,
        ncoeff: 6,
        nsub: 2,
    };
    h.body[9] = LayoutTriple {
        start: 399,
        ncoeff: 4,
        nsub: 4,
    };
    h.apply_padding_pointers();
    h.ncoeff = h.derive_ncoeff();
    h.ksize = 2 * h.ncoeff;
    h.compute_max_cheby();
    h.scan_constants();
    h
}

fn sample_blocks(header: &Header) -> Vec<Vec<f64>> {
    let n = header.ncoeff as usize;
    (0..header.block_count())
        .map(|b| {
            let mut block = vec![0.0; n];
            block[0] = JD0 + 32.0 * b as f64;
            block[1] = block[0] + 32.0;
            for (k, slot) in block.iter_mut().enumerate().skip(2) {
                // Deterministic values spanning many magnitudes
                *slot = ((k * 7 + b * 13) as f64 - 250.0) * 1.25e-3 * (k as f64).exp2().min(1e12);
            }
            block
        })
        .collect()
}

fn write_text(header: &mut Header, blocks: &[Vec<f64>]) -> Vec<u8> {
    let mut out = Vec::new();
    ascii::write_header(&mut out, header).unwrap();
    for (i, block) in blocks.iter().enumerate() {
        ascii::write_block(&mut out, header, i, block).unwrap();
    }
    out
}

#[test]
fn test_text_to_binary_to_text_is_exact() {
    let mut header = sample_header();
    let blocks = sample_blocks(&header);
    let text1 = write_text(&mut header, &blocks);

    // Parse the text form back
    let mut r = Cursor::new(&text1);
    let mut parsed = ascii::read_header(&mut r).unwrap();
    assert_eq!(parsed.ncoeff, header.ncoeff);
    assert_eq!(parsed.body, header.body);
    assert_eq!(parsed.values, header.values);
    assert_eq!(parsed.numde, 903);

    let mut parsed_blocks = Vec::new();
    loop {
        let mut block = vec![0.0; parsed.ncoeff as usize];
        if ascii::read_block(&mut r, &parsed, &mut block).unwrap() == 0 {
            break;
        }
        parsed_blocks.push(block);
    }
    assert_eq!(parsed_blocks, blocks);

    // Convert to binary on disk
    let mut file = tempfile::tempfile().unwrap();
    binary::write_header(&mut file, &mut parsed).unwrap();
    for (i, block) in parsed_blocks.iter().enumerate() {
        binary::write_block(&mut file, &parsed, i, block).unwrap();
    }
    file.flush().unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    // Read the binary back and regenerate the text form
    let mut from_binary = binary::read_header(&mut file).unwrap();
    assert_eq!(from_binary.ncoeff, header.ncoeff);
    assert_eq!(from_binary.body, header.body);
    assert_eq!(from_binary.values, header.values);

    let mut text2 = Vec::new();
    ascii::write_header(&mut text2, &mut from_binary).unwrap();
    for i in 0..from_binary.block_count() {
        let mut block = vec![0.0; from_binary.ncoeff as usize];
        assert_eq!(
            binary::read_block(&mut file, &from_binary, i, &mut block).unwrap(),
            from_binary.ncoeff as usize
        );
        ascii::write_block(&mut text2, &from_binary, i, &block).unwrap();
    }
    assert_eq!(text1, text2);
}

#[test]
fn test_binary_record_offsets_on_disk() {
    let mut header = sample_header();
    let blocks = sample_blocks(&header);

    let mut file = tempfile::tempfile().unwrap();
    binary::write_header(&mut file, &mut header).unwrap();
    for (i, block) in blocks.iter().enumerate() {
        binary::write_block(&mut file, &header, i, block).unwrap();
    }

    // First data block starts exactly two records in
    let record = header.record_size_bytes();
    file.seek(SeekFrom::Start(2 * record)).unwrap();
    let mut buf = [0u8; 8];
    file.read_exact(&mut buf).unwrap();
    assert_eq!(f64::from_be_bytes(buf), JD0);

    let total = file.seek(SeekFrom::End(0)).unwrap();
    assert_eq!(total, record * (2 + header.block_count() as u64));
}

#[test]
fn test_resolver_over_converted_file() {
    let mut header = sample_header();
    let n = header.ncoeff as usize;

    let mut file = tempfile::tempfile().unwrap();
    binary::write_header(&mut file, &mut header).unwrap();
    for b in 0..header.block_count() {
        let mut block = vec![0.0; n];
        block[0] = JD0 + 32.0 * b as f64;
        block[1] = block[0] + 32.0;
        // Constant Mercury position, Moon at the origin
        let base = (header.body[0].start - 1) as usize;
        block[base] = 42.0 * AU;
        binary::write_block(&mut file, &header, b, &block).unwrap();
    }
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut resolver = Resolver::open(file).unwrap();
    assert_eq!(resolver.header().numde, 903);

    let mut coords = Coords::at(JD0 + 40.0);
    resolver.get_coords(&mut coords).unwrap();
    let r = coords.vector_between(targets::MERCURY, targets::SS_BARYCENTER);
    assert_relative_eq!(r[0], 42.0, epsilon = 1e-12);
    assert_relative_eq!(r[3], 0.0);
}
