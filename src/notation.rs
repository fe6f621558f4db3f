//! FORTRAN-style numeric notation used by the text ephemeris format
//!
//! The text format renders every double with a leading `0.` mantissa, a `D`
//! exponent marker, and an exponent one larger than the usual scientific
//! rendering (the mantissa is shifted one digit to the right). The exponent
//! carries as many digits as its magnitude needs: 2 below 100, 3 below 1000,
//! 4 otherwise, with an explicit sign. A value of exactly zero forces
//! exponent 0.
//!
//! The conversion operates on the already-formatted text, not by re-deriving
//! the double, because the goal is a character-for-character match with the
//! reference files rather than a merely equivalent numeric value.

/// Format a double the way C's `%.17E` does, right-aligned in 25 columns
///
/// Sign, one leading digit, 17 decimals, `E`, signed exponent of at least
/// two digits. This is the exact input shape [`to_fortran`] transforms.
pub fn format_c_exponential(v: f64) -> String {
    let rendered = format!("{:.17E}", v);
    // Rust prints the exponent without sign or zero padding; rebuild it.
    let (mantissa, exponent) = rendered
        .split_once('E')
        .expect("upper-exp formatting always yields an E");
    let exp: i32 = exponent.parse().expect("exponent is a valid integer");
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{:>25}", format!("{}E{}{:02}", mantissa, sign, exp.unsigned_abs()))
}

/// Convert a C-style exponential rendering to the FORTRAN `0.` / `D` form
///
/// `"1.23456789012345678E+05"` becomes `"0.123456789012345678D+06"`, and
/// `"0.0E+00"` becomes `"0.00D+00"` (zero forces exponent 0). Leading and
/// trailing spaces in the input are dropped; alignment is the caller's job.
pub fn to_fortran(field: &str) -> String {
    let trimmed = field.trim();
    let epos = trimmed
        .find(['E', 'e'])
        .expect("exponential rendering always carries a marker");
    let (mantissa, exponent) = (&trimmed[..epos], &trimmed[epos + 1..]);

    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    // Shifting the mantissa right by one digit raises the exponent by one.
    let mut exp: i32 = exponent.parse().unwrap_or(0);
    exp += 1;
    let value: f64 = trimmed.parse().unwrap_or(0.0);
    if value == 0.0 {
        exp = 0;
    }

    let exp_sign = if exp < 0 { '-' } else { '+' };
    let mag = exp.unsigned_abs();
    let edigits = if mag < 100 {
        2
    } else if mag < 1000 {
        3
    } else {
        4
    };

    format!(
        "{}0.{}D{}{:0width$}",
        if negative { "-" } else { "" },
        digits,
        exp_sign,
        mag,
        width = edigits
    )
}

/// Render a double as one 26-column FORTRAN field, as found in data lines
pub fn fortran_field(v: f64) -> String {
    format!("{:>26}", to_fortran(&format_c_exponential(v)))
}

/// Replace the FORTRAN `D`/`d` exponent marker with `E` so the host parser
/// accepts the value. Applied to whole value lines before tokenizing.
pub fn normalize_exponents(line: &str) -> String {
    line.replace(['d', 'D'], "E")
}
