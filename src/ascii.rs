//! Text-format ephemeris header and data-block codec
//!
//! The text format is line-oriented with fixed columns: a `KSIZE=/NCOEFF=`
//! declaration, five labeled GROUP sections framed by blank lines, a GROUP
//! 1070 sentinel, then coefficient blocks. Header lines end with a bare
//! newline while data-block lines end with CR+LF; both conventions are part
//! of the byte-exact contract and are reproduced here.

use std::io::{BufRead, Write};

use crate::errors::{EphError, Result};
use crate::header::{self, Header, BODY_COUNT, NAME_WIDTH};
use crate::notation;

/// Header lines are space-padded to this many columns
const LINE_WIDTH: usize = 80;
/// Constant names per line in GROUP 1040
const NAMES_PER_LINE: usize = 10;

/// Read a JPL text-format ephemeris header
///
/// Leaves the stream positioned at the first coefficient block. All format
/// violations (bad declaration, wrong signature, group or count mismatches)
/// are fatal errors.
pub fn read_header<R: BufRead>(r: &mut R) -> Result<Header> {
    let mut header = Header::default();

    // Declaration line: KSIZE= # NCOEFF= #
    let line = read_line(r)?;
    header.ksize = declared_value(&line, "KSIZE=")?;
    header.ncoeff = declared_value(&line, "NCOEFF=")?;
    if header.ksize != 2 * header.ncoeff {
        return Err(EphError::InvalidFormat(
            "badly formed header; KSIZE <> 2*NCOEFF".to_string(),
        ));
    }

    // GROUP 1010: ephemeris title and validity epochs
    expect_group(r, 1010)?;
    for title in header.title.iter_mut() {
        *title = header::normalize_title(&read_line(r)?);
    }
    if !header.title[0].starts_with("JPL ") {
        return Err(EphError::InvalidFormat(
            "file is not a JPL ASCII header file".to_string(),
        ));
    }

    // GROUP 1030: start JD, end JD, days per block
    expect_group(r, 1030)?;
    let line = read_line(r)?;
    let mut words = line.split_whitespace();
    for slot in header.ss.iter_mut() {
        *slot = parse_double(words.next().unwrap_or(""))?;
    }
    header.validate_span()?;

    // GROUP 1040: constant names, 10 per line at fixed columns
    expect_group(r, 1040)?;
    let ncon: usize = parse_count(&read_line(r)?)?;
    while header.names.len() < ncon {
        let line = read_line(r)?;
        for k in 0..NAMES_PER_LINE {
            if header.names.len() >= ncon {
                break;
            }
            let start = 2 + k * (NAME_WIDTH + 2);
            let end = (start + NAME_WIDTH).min(line.len());
            if start >= line.len() {
                return Err(EphError::InvalidFormat(
                    "constant name line is too short".to_string(),
                ));
            }
            header.names.push(line[start..end].trim_end().to_string());
        }
    }

    // GROUP 1041: constant values, 3 per line
    expect_group(r, 1041)?;
    let nval: usize = parse_count(&read_line(r)?)?;
    if nval != ncon {
        return Err(EphError::ConstantCountMismatch {
            names: ncon,
            values: nval,
        });
    }
    while header.values.len() < ncon {
        let line = notation::normalize_exponents(&read_line(r)?);
        let remaining = ncon - header.values.len();
        for word in line.split_whitespace().take(remaining.min(3)) {
            header.values.push(parse_double(word)?);
        }
    }

    // GROUP 1050: the 12x3 layout matrix plus libration, transposed
    expect_group(r, 1050)?;
    for coord in 0..3 {
        let line = read_line(r)?;
        for b in 0..BODY_COUNT {
            let v = int_field(&line, 6 * b)?;
            match coord {
                0 => header.body[b].start = v,
                1 => header.body[b].ncoeff = v,
                _ => header.body[b].nsub = v,
            }
        }
        let v = int_field(&line, 6 * BODY_COUNT)?;
        match coord {
            0 => header.libration.start = v,
            1 => header.libration.ncoeff = v,
            _ => header.libration.nsub = v,
        }
    }
    header.apply_padding_pointers();
    header.compute_max_cheby();
    header.scan_constants();

    // GROUP 1070 is an empty sentinel before the coefficient data
    expect_group(r, 1070)?;
    Ok(header)
}

/// Read one text-format coefficient block into `block`
///
/// Returns the number of coefficients read: `header.ncoeff` for a complete
/// block, 0 at end of stream. A per-block coefficient count that disagrees
/// with the header is fatal.
pub fn read_block<R: BufRead>(r: &mut R, header: &Header, block: &mut [f64]) -> Result<usize> {
    let ncoeff = header.ncoeff as usize;
    let first = match try_read_line(r)? {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Ok(0),
    };

    let mut words = first.split_whitespace();
    let _blocknum: i64 = words
        .next()
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| EphError::InvalidFormat("malformed block header line".to_string()))?;
    let declared: usize = words
        .next()
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| EphError::InvalidFormat("malformed block header line".to_string()))?;
    if declared != ncoeff {
        return Err(EphError::InvalidFormat(format!(
            "ASCII data file's {} coefficients/block doesn't match header's {}",
            declared, ncoeff
        )));
    }

    let mut count = 0;
    while count < ncoeff {
        let line = match try_read_line(r)? {
            Some(line) => notation::normalize_exponents(&line),
            None => break,
        };
        let remaining = ncoeff - count;
        for word in line.split_whitespace().take(remaining.min(3)) {
            block[count] = parse_double(word)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Write a JPL text-format ephemeris header
///
/// The three title lines are regenerated from the ephemeris numbers and time
/// span, and the layout padding pointers are re-derived before the matrix is
/// emitted.
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

    write_padded(
        w,
        &format!("KSIZE={:6}    NCOEFF={:6}", header.ksize, header.ncoeff),
    )?;

    write_group(w, 1010)?;
    header.regenerate_titles();
    for title in &header.title {
        writeln!(w, "{}", title)?;
    }

    write_group(w, 1030)?;
    write_padded(
        w,
        &format!(
            "{:12.2}{:12.2}{:12.0}.",
            header.ss[0], header.ss[1], header.ss[2]
        ),
    )?;

    write_group(w, 1040)?;
    write_padded(w, &format!("{:6}", header.ncon()))?;
    let mut line = String::new();
    for (i, name) in header.names.iter().enumerate() {
        line.push_str(&format!("  {:<width$}", name, width = NAME_WIDTH));
        if i % NAMES_PER_LINE == NAMES_PER_LINE - 1 {
            writeln!(w, "{}", line)?;
            line.clear();
        }
    }
    if !line.is_empty() {
        // Pad the final partial line out to ten fields
        let missing = NAMES_PER_LINE - header.ncon() % NAMES_PER_LINE;
        for _ in 0..missing {
            line.push_str("        ");
        }
        writeln!(w, "{}", line)?;
    }

    write_group(w, 1041)?;
    write_padded(w, &format!("{:6}", header.values.len()))?;
    for chunk in header.values.chunks(3) {
        // Short final triple is padded with zeros; readers ignore them
        let v1 = chunk[0];
        let v2 = chunk.get(1).copied().unwrap_or(0.0);
        let v3 = chunk.get(2).copied().unwrap_or(0.0);
        writeln!(
            w,
            "{}{}{}  ",
            notation::fortran_field(v1),
            notation::fortran_field(v2),
            notation::fortran_field(v3)
        )?;
    }

    write_group(w, 1050)?;
    // Guard against a caller having zeroed absent-body pointers
    header.apply_padding_pointers();
    for coord in 0..3 {
        let mut line = String::new();
        for b in 0..BODY_COUNT {
            let v = match coord {
                0 => header.body[b].start,
                1 => header.body[b].ncoeff,
                _ => header.body[b].nsub,
            };
            line.push_str(&format!("{:6}", v));
        }
        let v = match coord {
            0 => header.libration.start,
            1 => header.libration.ncoeff,
            _ => header.libration.nsub,
        };
        line.push_str(&format!("{:6}  ", v));
        writeln!(w, "{}", line)?;
    }

    write_group(w, 1070)?;
    Ok(())
}

/// Write one coefficient block in text format
///
/// `blocknum` is 0-based; the on-disk block header line carries it 1-based.
/// Data-block lines end with CR+LF, unlike header lines.
pub fn write_block<W: Write>(
    w: &mut W,
    header: &Header,
    blocknum: usize,
    block: &[f64],
) -> Result<()> {
    let ncoeff = header.ncoeff as usize;
    write!(w, "{:6}{:6}{:68}\r\n", blocknum + 1, header.ncoeff, "")?;
    for chunk in block[..ncoeff].chunks(3) {
        let v1 = chunk[0];
        let v2 = chunk.get(1).copied().unwrap_or(0.0);
        let v3 = chunk.get(2).copied().unwrap_or(0.0);
        write!(
            w,
            "{}{}{}  \r\n",
            notation::fortran_field(v1),
            notation::fortran_field(v2),
            notation::fortran_field(v3)
        )?;
    }
    Ok(())
}

fn read_line<R: BufRead>(r: &mut R) -> Result<String> {
    try_read_line(r)?.ok_or_else(|| {
        EphError::InvalidFormat("unexpected end of stream inside text header".to_string())
    })
}

fn try_read_line<R: BufRead>(r: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if r.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Consume a blank line, the expected `GROUP   nnnn` label, and another
/// blank line; a label mismatch is fatal
fn expect_group<R: BufRead>(r: &mut R, number: u32) -> Result<()> {
    let expected = format!("GROUP   {}", number);
    read_line(r)?;
    let line = read_line(r)?;
    let found: String = line.chars().take(12).collect();
    if found != expected {
        return Err(EphError::GroupMismatch { expected, found });
    }
    read_line(r)?;
    Ok(())
}

fn declared_value(line: &str, key: &str) -> Result<i32> {
    let pos = line
        .find(key)
        .ok_or_else(|| EphError::InvalidFormat(format!("missing {:?} in declaration", key)))?;
    line[pos + key.len()..]
        .split_whitespace()
        .next()
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| EphError::InvalidFormat(format!("unreadable {:?} declaration", key)))
}

fn parse_count(line: &str) -> Result<usize> {
    line.split_whitespace()
        .next()
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| EphError::InvalidFormat(format!("bad count line {:?}", line)))
}

fn parse_double(word: &str) -> Result<f64> {
    word.parse()
        .map_err(|_| EphError::InvalidFormat(format!("bad numeric field {:?}", word)))
}

/// Fixed-width integer field starting at `start`, 6 columns wide
fn int_field(line: &str, start: usize) -> Result<i32> {
    let bytes = line.as_bytes();
    if start >= bytes.len() {
        return Err(EphError::InvalidFormat(
            "layout matrix line is too short".to_string(),
        ));
    }
    let end = (start + 6).min(bytes.len());
    let field = std::str::from_utf8(&bytes[start..end])
        .map_err(|_| EphError::InvalidFormat(format!("non-ASCII layout field in {:?}", line)))?;
    field
        .trim()
        .parse()
        .map_err(|_| EphError::InvalidFormat(format!("bad integer field {:?}", field)))
}

fn write_padded<W: Write>(w: &mut W, s: &str) -> Result<()> {
    writeln!(w, "{:<width$}", s, width = LINE_WIDTH)?;
    Ok(())
}

fn write_group<W: Write>(w: &mut W, number: u32) -> Result<()> {
    write_padded(w, "")?;
    write_padded(w, &format!("GROUP   {}", number))?;
    write_padded(w, "")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::LayoutTriple;
    use std::io::Cursor;

    /// Hand-built text header for a tiny single-body ephemeris
    fn fixture_text() -> String {
        let mut t = String::new();
        t.push_str("KSIZE=    28    NCOEFF=    14\n");
        t.push_str("\nGROUP   1010\n\n");
        t.push_str("JPL Planetary Ephemeris DE901/LE901\n");
        t.push_str("Start Epoch: JED=  2451536.5 1999 DEC 24 00:00:00\n");
        t.push_str("Final Epoch: JED=  2451568.5 2000 JAN 25 00:00:00\n");
        t.push_str("\nGROUP   1030\n\n");
        t.push_str("  2451536.50  2451568.50          32.\n");
        t.push_str("\nGROUP   1040\n\n");
        t.push_str("     4\n");
        t.push_str("  DENUM   AU      EMRAT   CLIGHT\n");
        t.push_str("\nGROUP   1041\n\n");
        t.push_str("     4\n");
        t.push_str(
            "  0.901000000000000000D+03  0.149597870691000000D+09  0.813005600000000000D+02  \n",
        );
        t.push_str(
            "  0.299792458000000000D+06  0.000000000000000000D+00  0.000000000000000000D+00  \n",
        );
        t.push_str("\nGROUP   1050\n\n");
        t.push_str("     3     0     0     0     0     0     0     0     0     0     0     0     0\n");
        t.push_str("     4     0     0     0     0     0     0     0     0     0     0     0     0\n");
        t.push_str("     1     0     0     0     0     0     0     0     0     0     0     0     0\n");
        t.push_str("\nGROUP   1070\n\n");
        t
    }

    #[test]
    fn test_read_header_fixture() {
        let mut r = Cursor::new(fixture_text());
        let header = read_header(&mut r).unwrap();

        assert_eq!(header.ksize, 28);
        assert_eq!(header.ncoeff, 14);
        assert_eq!(header.ss, [2451536.5, 2451568.5, 32.0]);
        assert_eq!(
            header.names,
            vec!["DENUM", "AU", "EMRAT", "CLIGHT"]
        );
        assert_eq!(header.values[0], 901.0);
        assert_eq!(header.values[1], 149597870.691);
        assert_eq!(header.values[2], 81.30056);
        assert_eq!(header.values[3], 299792.458);
        assert_eq!(header.numde, 901);
        assert_eq!(header.numle, 901);
        assert_eq!(header.au, 149597870.691);
        assert_eq!(header.max_cheby, 4);

        // Mercury is the only present body
        assert_eq!(
            header.body[0],
            LayoutTriple {
                start: 3,
                ncoeff: 4,
                nsub: 1
            }
        );
        // Absent bodies carry the next free slot, never zero
        for b in 1..BODY_COUNT {
            assert_eq!(header.body[b].start, 15, "body {}", b);
            assert_eq!(header.body[b].ncoeff, 0);
        }
        assert_eq!(header.libration.start, 15);
    }

    #[test]
    fn test_header_round_trip() {
        let mut r = Cursor::new(fixture_text());
        let mut header = read_header(&mut r).unwrap();

        let mut out = Vec::new();
        write_header(&mut out, &mut header).unwrap();

        let mut reparsed = read_header(&mut Cursor::new(out)).unwrap();
        // Title lines are regenerated, so compare everything else
        reparsed.title = header.title.clone();
        assert_eq!(reparsed.names, header.names);
        assert_eq!(reparsed.values, header.values);
        assert_eq!(reparsed.ss, header.ss);
        assert_eq!(reparsed.body, header.body);
        assert_eq!(reparsed.libration, header.libration);
        assert_eq!(reparsed.au, header.au);
        assert_eq!(reparsed.emrat, header.emrat);
        assert_eq!(reparsed.numde, header.numde);
        assert_eq!(reparsed.numle, header.numle);
    }

    #[test]
    fn test_written_header_line_conventions() {
        let mut r = Cursor::new(fixture_text());
        let mut header = read_header(&mut r).unwrap();

        let mut out = Vec::new();
        write_header(&mut out, &mut header).unwrap();
        let text = String::from_utf8(out).unwrap();

        // Header lines end with a bare newline, never CR+LF
        assert!(!text.contains('\r'));
        let first = text.lines().next().unwrap();
        assert_eq!(first.len(), 80);
        assert!(first.starts_with("KSIZE=    28    NCOEFF=    14"));
        assert!(text.contains("GROUP   1010"));
        assert!(text.contains("GROUP   1070"));
        assert!(text.contains("  2451536.50  2451568.50          32."));
    }

    #[test]
    fn test_group_mismatch_is_fatal() {
        let text = fixture_text().replace("GROUP   1030", "GROUP   1031");
        let err = read_header(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, EphError::GroupMismatch { .. }));
    }

    #[test]
    fn test_multibyte_layout_line_is_rejected() {
        // A six-column boundary may split a multibyte character
        assert!(matches!(
            int_field("     µ     3", 0).unwrap_err(),
            EphError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_ksize_mismatch_is_fatal() {
        let text = fixture_text().replace("KSIZE=    28", "KSIZE=    30");
        let err = read_header(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, EphError::InvalidFormat(_)));
    }

    #[test]
    fn test_constant_count_mismatch_is_fatal() {
        // Corrupt the GROUP 1041 count (second "     4" count line)
        let text = fixture_text();
        let pos = text.rfind("     4\n").unwrap();
        let mut corrupted = text.clone();
        corrupted.replace_range(pos..pos + 6, "     5");
        let err = read_header(&mut Cursor::new(corrupted)).unwrap_err();
        assert!(matches!(
            err,
            EphError::ConstantCountMismatch {
                names: 4,
                values: 5
            }
        ));
    }

    #[test]
    fn test_non_jpl_signature_is_fatal() {
        let text = fixture_text().replace("JPL Planetary", "IMC Planetary");
        let err = read_header(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, EphError::InvalidFormat(_)));
    }

    #[test]
    fn test_block_round_trip() {
        let mut r = Cursor::new(fixture_text());
        let header = read_header(&mut r).unwrap();

        let block: Vec<f64> = (0..14).map(|i| (i as f64 - 7.0) * 1.25e3).collect();
        let mut out = Vec::new();
        write_block(&mut out, &header, 0, &block).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        // Every data line ends with CR+LF
        for line in text.split_inclusive('\n') {
            assert!(line.ends_with("\r\n"), "line {:?}", line);
        }
        assert!(text.starts_with("     1    14"));

        let mut back = vec![0.0; 14];
        let n = read_block(&mut Cursor::new(out), &header, &mut back).unwrap();
        assert_eq!(n, 14);
        assert_eq!(back, block);
    }

    #[test]
    fn test_block_read_at_eof_returns_zero() {
        let mut r = Cursor::new(fixture_text());
        let header = read_header(&mut r).unwrap();
        let mut block = vec![0.0; 14];
        // The fixture has no blocks after the header
        assert_eq!(read_block(&mut r, &header, &mut block).unwrap(), 0);
    }

    #[test]
    fn test_block_count_mismatch_is_fatal() {
        let mut r = Cursor::new(fixture_text());
        let header = read_header(&mut r).unwrap();

        let data = "     1    12                                                                    \r\n";
        let mut block = vec![0.0; 14];
        let err = read_block(&mut Cursor::new(data), &header, &mut block).unwrap_err();
        assert!(matches!(err, EphError::InvalidFormat(_)));
    }
}
