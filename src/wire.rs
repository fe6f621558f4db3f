//! Fixed byte-order primitives for the binary ephemeris records
//!
//! The binary format stores every number in network order (big-endian)
//! regardless of the host. Only two widths appear in the format: 32-bit
//! integers and 64-bit IEEE-754 doubles. Fixed-width character fields
//! (title lines, constant-name slots) are handled here too, since they share
//! the record layout with the numeric fields.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::Result;

/// Read one big-endian 64-bit double from the stream
pub fn read_f64<R: Read>(r: &mut R) -> Result<f64> {
    Ok(r.read_f64::<BigEndian>()?)
}

/// Read one big-endian 32-bit integer from the stream
pub fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    Ok(r.read_i32::<BigEndian>()?)
}

/// Write one 64-bit double to the stream in big-endian order
pub fn write_f64<W: Write>(w: &mut W, x: f64) -> Result<()> {
    Ok(w.write_f64::<BigEndian>(x)?)
}

/// Write one 32-bit integer to the stream in big-endian order
pub fn write_i32<W: Write>(w: &mut W, x: i32) -> Result<()> {
    Ok(w.write_i32::<BigEndian>(x)?)
}

/// Read a fixed-width character field, returning it as a lossy string
///
/// The binary header stores text in blank-padded FORTRAN-style slots; the
/// raw width is preserved so callers can decide how to trim.
pub fn read_fixed_str<R: Read>(r: &mut R, width: usize) -> Result<String> {
    let mut buf = vec![0u8; width];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a string into a fixed-width slot, blank-padded on the right
///
/// Text longer than the slot is truncated to the slot width.
pub fn write_fixed_str<W: Write>(w: &mut W, s: &str, width: usize) -> Result<()> {
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    w.write_all(&bytes[..n])?;
    for _ in n..width {
        w.write_all(b" ")?;
    }
    Ok(())
}

/// Write `count` zero bytes, used to pad records to their fixed size
pub fn write_zeros<W: Write>(w: &mut W, count: usize) -> Result<()> {
    const CHUNK: [u8; 512] = [0u8; 512];
    let mut remaining = count;
    while remaining > 0 {
        let n = remaining.min(CHUNK.len());
        w.write_all(&CHUNK[..n])?;
        remaining -= n;
    }
    Ok(())
}
