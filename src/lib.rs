//! Ephio: codec and interpolation engine for JPL-format planetary ephemerides
//!
//! This crate reads and writes JPL development ephemeris files in both their
//! text and binary forms, converts between the two byte-exactly, and
//! interpolates body positions and velocities from the Chebyshev coefficient
//! blocks. Time queries run through a [`Resolver`] over an open binary
//! stream; format conversion is a header read, a block loop, and the
//! corresponding writes.

pub mod ascii;
pub mod binary;
pub mod calendar;
pub mod chebyshev;
pub mod coords;
pub mod dump;
pub mod errors;
pub mod header;
pub mod names;
pub mod notation;
pub mod wire;

// Re-export commonly used types
pub use calendar::{CalendarDate, CalendarKind};
pub use chebyshev::Chebyshev;
pub use coords::{Coords, Resolver};
pub use errors::{EphError, Result};
pub use header::{Header, LayoutTriple};
pub use names::targets;
