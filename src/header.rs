//! Ephemeris header data model and derived-field computation
//!
//! The header carries the three 84-character title lines, the time span, the
//! ordered constant table, and the coefficient-layout pointers for the twelve
//! layout bodies plus lunar libration. It is populated once per stream by the
//! text or binary reader and is immutable afterward, except that writers
//! regenerate the title lines from the span and ephemeris numbers.

use crate::calendar::{self, CalendarKind, MONTH_ABBREV};
use crate::errors::{EphError, Result};

/// Number of bodies in the main coefficient-layout table
pub const BODY_COUNT: usize = 12;
/// Fixed number of constant-name slots in a binary header record
pub const MAX_CONSTANTS: usize = 400;
/// Width of one title line in characters
pub const TITLE_WIDTH: usize = 84;
/// Width of one constant name in characters
pub const NAME_WIDTH: usize = 6;
/// Index of the nutation entry, the only 2-coordinate body
pub const NUTATION_INDEX: usize = 11;

/// Coefficient-layout pointers for one body
///
/// `start` is 1-based into the data block; subtract one to index the
/// coefficient array. A body with no coefficients still carries a nonzero
/// `start`: the next unused slot number (see
/// [`Header::apply_padding_pointers`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutTriple {
    /// First coefficient slot for this body, 1-based
    pub start: i32,
    /// Chebyshev coefficients per coordinate
    pub ncoeff: i32,
    /// Subintervals per data block
    pub nsub: i32,
}

/// Parsed ephemeris header
#[derive(Clone, Debug, Default)]
pub struct Header {
    /// Three 84-character title lines; line 0 begins with the `"JPL "` tag
    pub title: [String; 3],
    /// Declared record size in 4-byte words, always `2 * ncoeff`
    pub ksize: i32,
    /// Coefficients per data block
    pub ncoeff: i32,
    /// Start JD, end JD, and days per block
    pub ss: [f64; 3],
    /// Constant names in on-disk order, trailing blanks trimmed
    pub names: Vec<String>,
    /// Constant values, positionally matching `names`
    pub values: Vec<f64>,
    /// Layout pointers for the twelve bodies (Mercury..Nutation)
    pub body: [LayoutTriple; BODY_COUNT],
    /// Layout pointers for lunar libration
    pub libration: LayoutTriple,
    /// Astronomical unit in km, from the `AU` constant
    pub au: f64,
    /// Earth/Moon mass ratio, from the `EMRAT` constant
    pub emrat: f64,
    /// Speed of light in km/s, from the `CLIGHT` constant
    pub clight: f64,
    /// Planetary ephemeris number, from the `DENUM` constant
    pub numde: i32,
    /// Lunar ephemeris number; defaults to `numde` when `LENUM` is absent
    pub numle: i32,
    /// Largest coefficient count across bodies and libration
    pub max_cheby: usize,
}

impl Header {
    /// Coordinate count for a layout body: 2 for nutation, 3 otherwise
    pub fn ncoords(body_index: usize) -> i32 {
        if body_index == NUTATION_INDEX {
            2
        } else {
            3
        }
    }

    /// Number of constants on file
    pub fn ncon(&self) -> usize {
        self.names.len()
    }

    /// Size of one binary record in bytes
    pub fn record_size_bytes(&self) -> u64 {
        self.ncoeff as u64 * 8
    }

    /// Number of data blocks spanned by the header's time range
    pub fn block_count(&self) -> usize {
        ((self.ss[1] - self.ss[0]) / self.ss[2]) as usize
    }

    /// Check the time-span invariants
    pub fn validate_span(&self) -> Result<()> {
        let [start, end, step] = self.ss;
        if end <= start || step <= 0.0 || (end - start) % step != 0.0 {
            return Err(EphError::InvalidFormat(format!(
                "inconsistent time span: start={}, end={}, days/block={}",
                start, end, step
            )));
        }
        Ok(())
    }

    /// Index of the body whose coefficients sit highest in the block,
    /// considering only bodies that have coefficients
    fn highest_start_body(&self) -> usize {
        let mut winner = 0;
        for i in 1..BODY_COUNT {
            if self.body[i].ncoeff > 0 && self.body[i].start > self.body[winner].start {
                winner = i;
            }
        }
        winner
    }

    /// The first coefficient slot not claimed by any body, 1-based
    pub fn next_free_slot(&self) -> i32 {
        let winner = self.highest_start_body();
        let b = self.body[winner];
        if self.libration.ncoeff > 0 && self.libration.start > b.start {
            self.libration.start + self.libration.ncoeff * self.libration.nsub * 3
        } else {
            b.start + b.ncoeff * b.nsub * Self::ncoords(winner)
        }
    }

    /// Fill in start pointers for absent bodies
    ///
    /// A body with zero coefficients per coordinate does not keep a zero
    /// start pointer; it carries the next unused slot number, the value a
    /// zero-length entry at that position would be assigned. This lets the
    /// total coefficient count be derived purely from the layout, with no
    /// separate presence flag. Libration follows the same rule.
    pub fn apply_padding_pointers(&mut self) {
        let next = self.next_free_slot();
        for i in 1..BODY_COUNT {
            if self.body[i].start == 0 {
                self.body[i].start = next;
            }
        }
        if self.libration.start == 0 {
            self.libration.start = next;
        }
    }

    /// Total coefficients per block, derived from the layout pointers
    ///
    /// The winner is the layout entry with the numerically highest start
    /// pointer among those with coefficients; the total is its start minus
    /// one plus the slots it occupies.
    pub fn derive_ncoeff(&self) -> i32 {
        let winner = self.highest_start_body();
        let b = self.body[winner];
        if self.libration.ncoeff > 0 && self.libration.start > b.start {
            self.libration.start - 1 + self.libration.ncoeff * self.libration.nsub * 3
        } else {
            b.start - 1 + b.ncoeff * b.nsub * Self::ncoords(winner)
        }
    }

    /// Record the largest coefficient count, which sizes interpolation
    /// scratch buffers
    pub fn compute_max_cheby(&mut self) {
        let mut max = 0;
        for triple in &self.body {
            max = max.max(triple.ncoeff);
        }
        max = max.max(self.libration.ncoeff);
        self.max_cheby = max as usize;
    }

    /// Populate the derived scalars by scanning the constant table for the
    /// reserved names
    pub fn scan_constants(&mut self) {
        self.au = 0.0;
        self.emrat = 0.0;
        self.numde = 0;
        for (name, &value) in self.names.iter().zip(self.values.iter()) {
            match name.trim_end() {
                "AU" => self.au = value,
                "EMRAT" => self.emrat = value,
                "DENUM" => self.numde = value as i32,
                _ => {}
            }
        }
        self.scan_lookup_constants();
    }

    /// Populate only the scalars the binary layout does not store
    /// positionally, leaving `au`, `emrat`, and `numde` as the caller set
    /// them
    pub fn scan_lookup_constants(&mut self) {
        self.clight = 0.0;
        self.numle = 0;
        for (name, &value) in self.names.iter().zip(self.values.iter()) {
            match name.trim_end() {
                "CLIGHT" => self.clight = value,
                "LENUM" => self.numle = value as i32,
                _ => {}
            }
        }
        if self.numle == 0 {
            self.numle = self.numde;
        }
    }

    /// Rebuild the three title lines from the ephemeris numbers and span
    ///
    /// Example:
    /// ```text
    /// JPL Planetary Ephemeris DE405/LE405
    /// Start Epoch: JED=  2305424.5 1599 DEC 09 00:00:00
    /// Final Epoch: JED=  2525008.5 2201 FEB 20 00:00:00
    /// ```
    pub fn regenerate_titles(&mut self) {
        self.title[0] = pad_title(&format!(
            "JPL Planetary Ephemeris DE{:03}/LE{:03}",
            self.numde, self.numle
        ));
        self.title[1] = pad_title(&epoch_line("Start", self.ss[0]));
        self.title[2] = pad_title(&epoch_line("Final", self.ss[1]));
    }
}

fn epoch_line(label: &str, jd: f64) -> String {
    let d = calendar::jd_to_calendar(jd, CalendarKind::Automatic);
    format!(
        "{} Epoch: JED={:11.1}{:5} {} {:02} {:02}:{:02}:{:02}",
        label,
        jd,
        d.year,
        MONTH_ABBREV[(d.month - 1) as usize],
        d.day,
        d.hour,
        d.minute,
        d.second
    )
}

/// Blank-pad (or truncate) a title line to its fixed 84-character width
pub(crate) fn pad_title(s: &str) -> String {
    let mut line = format!("{:<width$}", s, width = TITLE_WIDTH);
    line.truncate(TITLE_WIDTH);
    line
}

/// Normalize a title line read from a stream: every whitespace character
/// becomes a plain space, then the line is padded to 84 characters
pub(crate) fn normalize_title(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    pad_title(&cleaned)
}
