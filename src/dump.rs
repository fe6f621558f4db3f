//! Verbose human-readable dump of one coefficient block
//!
//! Debugging aid only, not a round-trip format. Every coefficient is listed
//! with its absolute word index, owning body, subinterval, and coordinate.

use std::io::Write;

use crate::errors::Result;
use crate::header::{Header, BODY_COUNT};
use crate::names::COEFF_NAMES;
use crate::notation;

/// Libration coordinates are Euler angles rather than axes
const LIBRATION_ANGLES: [&str; 3] = ["phi", "theta", "psi"];

/// Write an annotated listing of every coefficient in `block`
pub fn dump_block<W: Write>(w: &mut W, header: &Header, block: &[f64]) -> Result<()> {
    writeln!(w, "@0000 StartJD\t{:12.2}", block[0])?;
    writeln!(w, "@0001 EndJD\t{:12.2}", block[1])?;

    for body in 0..BODY_COUNT {
        writeln!(w, "Body\t{} ({})", body + 1, COEFF_NAMES[body])?;
        let triple = header.body[body];
        let ncoords = Header::ncoords(body) as usize;
        let ncf = triple.ncoeff as usize;
        for sub in 0..triple.nsub as usize {
            writeln!(w, "  Subinterval {} of {}", sub + 1, triple.nsub)?;
            for coord in 0..ncoords {
                writeln!(w, "    {}Coefficients", (b'X' + coord as u8) as char)?;
                for k in 0..ncf {
                    let word = (triple.start - 1) as usize + (sub * ncoords + coord) * ncf + k;
                    writeln!(
                        w,
                        "      @{:04} [{:2} of {:2}] {}",
                        word,
                        k + 1,
                        ncf,
                        notation::format_c_exponential(block[word])
                    )?;
                }
            }
        }
    }

    writeln!(w, "Body\t13 ({})", COEFF_NAMES[12])?;
    let triple = header.libration;
    let ncf = triple.ncoeff as usize;
    for sub in 0..triple.nsub as usize {
        writeln!(w, "  Subinterval {} of {}", sub + 1, triple.nsub)?;
        for (coord, angle) in LIBRATION_ANGLES.iter().enumerate() {
            writeln!(w, "    {}Coefficients", angle)?;
            for k in 0..ncf {
                let word = (triple.start - 1) as usize + (sub * 3 + coord) * ncf + k;
                writeln!(
                    w,
                    "      @{:04} [{:2} of {:2}] {}",
                    word,
                    k + 1,
                    ncf,
                    notation::format_c_exponential(block[word])
                )?;
            }
        }
    }
    Ok(())
}
