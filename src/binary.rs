//! Binary ephemeris header and data-block codec
//!
//! Binary files are a sequence of fixed-size records of `ncoeff * 8` bytes,
//! all fields big-endian. Record one holds the titles, constant names, and
//! layout; record two holds the constant values; coefficient blocks follow,
//! one per record. The coefficient count is not stored, it is re-derived
//! from the layout pointers.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::errors::{EphError, Result};
use crate::header::{self, Header, BODY_COUNT, MAX_CONSTANTS, NAME_WIDTH, TITLE_WIDTH};
use crate::wire;

/// Bytes of fixed fields in record one, before the zero padding
const HEADER_RECORD_BYTES: usize =
    3 * TITLE_WIDTH + MAX_CONSTANTS * NAME_WIDTH + 3 * 8 + 4 + 2 * 8 + BODY_COUNT * 3 * 4 + 4 + 3 * 4;

/// Read a binary ephemeris header from records one and two
///
/// Derives `ncoeff` from the layout pointers, then seeks to record two for
/// the constant values. The stream may be positioned anywhere afterwards;
/// [`read_block`] seeks absolutely.
pub fn read_header<R: Read + Seek>(r: &mut R) -> Result<Header> {
    let mut header = Header::default();

    r.seek(SeekFrom::Start(0))?;
    for title in header.title.iter_mut() {
        *title = header::normalize_title(&wire::read_fixed_str(r, TITLE_WIDTH)?);
    }
    if !header.title[0].starts_with("JPL ") {
        if header.title[0].starts_with("KSIZE") {
            return Err(EphError::InvalidFormat(
                "file is a text-format ephemeris, not binary".to_string(),
            ));
        }
        return Err(EphError::InvalidFormat(
            "file is not a JPL binary ephemeris".to_string(),
        ));
    }

    let mut names = Vec::with_capacity(MAX_CONSTANTS);
    for _ in 0..MAX_CONSTANTS {
        names.push(wire::read_fixed_str(r, NAME_WIDTH)?.trim_end().to_string());
    }

    for slot in header.ss.iter_mut() {
        *slot = wire::read_f64(r)?;
    }
    let ncon = wire::read_i32(r)?;
    if ncon < 0 || ncon as usize > MAX_CONSTANTS {
        return Err(EphError::InvalidFormat(format!(
            "implausible constant count {} in binary header",
            ncon
        )));
    }
    header.names = names[..ncon as usize].to_vec();

    header.au = wire::read_f64(r)?;
    header.emrat = wire::read_f64(r)?;
    for b in 0..BODY_COUNT {
        header.body[b].start = wire::read_i32(r)?;
        header.body[b].ncoeff = wire::read_i32(r)?;
        header.body[b].nsub = wire::read_i32(r)?;
    }
    header.numde = wire::read_i32(r)?;
    header.libration.start = wire::read_i32(r)?;
    header.libration.ncoeff = wire::read_i32(r)?;
    header.libration.nsub = wire::read_i32(r)?;

    header.apply_padding_pointers();
    header.ncoeff = header.derive_ncoeff();
    header.ksize = 2 * header.ncoeff;
    header.compute_max_cheby();
    header.validate_span()?;

    // Record two: the constant values
    r.seek(SeekFrom::Start(header.record_size_bytes()))?;
    header.values = Vec::with_capacity(ncon as usize);
    for _ in 0..ncon {
        header.values.push(wire::read_f64(r)?);
    }
    // au, emrat, and numde are stored positionally above; only the scalars
    // absent from the fixed layout come from the name table
    header.scan_lookup_constants();

    Ok(header)
}

/// Read coefficient block `blocknum` (0-based) into `block`
///
/// Returns `header.ncoeff` on success. Running out of stream, whether
/// before the block starts or partway through it, reads as a clean end of
/// data with count 0, never an error.
pub fn read_block<R: Read + Seek>(
    r: &mut R,
    header: &Header,
    blocknum: usize,
    block: &mut [f64],
) -> Result<usize> {
    let ncoeff = header.ncoeff as usize;
    let offset = (blocknum as u64 + 2) * header.record_size_bytes();
    r.seek(SeekFrom::Start(offset))?;

    for slot in block.iter_mut().take(ncoeff) {
        match wire::read_f64(r) {
            Ok(v) => *slot = v,
            Err(EphError::Io(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(0),
            Err(e) => return Err(e),
        }
    }
    Ok(ncoeff)
}

/// Write records one and two of a binary ephemeris
///
/// Regenerates the title lines and padding pointers first. The record size
/// must be able to hold the fixed header fields and the full constant table.
pub fn write_header<W: Write>(w: &mut W, header: &mut Header) -> Result<()> {
    if header.ksize != 2 * header.ncoeff {
        return Err(EphError::InvalidFormat(
            "badly formed header; KSIZE <> 2*NCOEFF".to_string(),
        ));
    }
    if header.names.len() != header.values.len() {
        return Err(EphError::ConstantCountMismatch {
            names: header.names.len(),
            values: header.values.len(),
        });
    }
    let record = header.record_size_bytes() as usize;
    if record < HEADER_RECORD_BYTES || record < MAX_CONSTANTS * 8 {
        return Err(EphError::InvalidFormat(format!(
            "NCOEFF {} is too small to hold the header records",
            header.ncoeff
        )));
    }

    header.regenerate_titles();
    header.apply_padding_pointers();

    for title in &header.title {
        wire::write_fixed_str(w, title, TITLE_WIDTH)?;
    }
    for i in 0..MAX_CONSTANTS {
        let name = header.names.get(i).map(String::as_str).unwrap_or("");
        wire::write_fixed_str(w, name, NAME_WIDTH)?;
    }
    for &v in &header.ss {
        wire::write_f64(w, v)?;
    }
    wire::write_i32(w, header.ncon() as i32)?;
    wire::write_f64(w, header.au)?;
    wire::write_f64(w, header.emrat)?;
    for b in 0..BODY_COUNT {
        wire::write_i32(w, header.body[b].start)?;
        wire::write_i32(w, header.body[b].ncoeff)?;
        wire::write_i32(w, header.body[b].nsub)?;
    }
    wire::write_i32(w, header.numde)?;
    wire::write_i32(w, header.libration.start)?;
    wire::write_i32(w, header.libration.ncoeff)?;
    wire::write_i32(w, header.libration.nsub)?;
    wire::write_zeros(w, record - HEADER_RECORD_BYTES)?;

    // Record two: constant values padded out to the full table, then zeros
    for i in 0..MAX_CONSTANTS {
        wire::write_f64(w, header.values.get(i).copied().unwrap_or(0.0))?;
    }
    wire::write_zeros(w, record - MAX_CONSTANTS * 8)?;
    Ok(())
}

/// Write coefficient block `blocknum` (0-based) at its record offset
///
/// A stream shorter than the target offset is first zero-padded out to it,
/// so blocks may be written in any order and gaps stay well defined.
pub fn write_block<W: Write + Seek>(
    w: &mut W,
    header: &Header,
    blocknum: usize,
    block: &[f64],
) -> Result<()> {
    let offset = (blocknum as u64 + 2) * header.record_size_bytes();
    let end = w.seek(SeekFrom::End(0))?;
    if end < offset {
        wire::write_zeros(w, (offset - end) as usize)?;
    }
    w.seek(SeekFrom::Start(offset))?;
    for &v in &block[..header.ncoeff as usize] {
        wire::write_f64(w, v)?;
    }
    Ok(())
}
