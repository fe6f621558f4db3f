//! Body names and index numbers for the ephemeris layout
//!
//! Two numbering schemes coexist. The coefficient layout tables index bodies
//! 0..11 (Mercury through Nutation) with Libration carried separately, while
//! the query interface uses the traditional PLEPH numbering, 1-based with
//! extra slots for the barycenters, nutation, and libration.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Names of the thirteen coefficient owners in layout order
pub const COEFF_NAMES: [&str; 13] = [
    "Mercury",
    "Venus",
    "EMBary",
    "Mars",
    "Jupiter",
    "Saturn",
    "Uranus",
    "Neptune",
    "Pluto",
    "Moon",
    "Sun",
    "Nutation",
    "Libration",
];

lazy_static! {
    /// Map from lowercase body names to their PLEPH index
    static ref BODY_IDS: HashMap<String, usize> = {
        let mut m = HashMap::new();
        for &(id, name) in BODY_ID_PAIRS.iter() {
            m.insert(name.to_lowercase(), id);
        }
        m
    };
}

/// Pairs of (PLEPH index, name) for the query-side numbering
const BODY_ID_PAIRS: &[(usize, &str)] = &[
    (targets::MERCURY, "Mercury"),
    (targets::VENUS, "Venus"),
    (targets::EARTH, "Earth"),
    (targets::MARS, "Mars"),
    (targets::JUPITER, "Jupiter"),
    (targets::SATURN, "Saturn"),
    (targets::URANUS, "Uranus"),
    (targets::NEPTUNE, "Neptune"),
    (targets::PLUTO, "Pluto"),
    (targets::MOON, "Moon"),
    (targets::SUN, "Sun"),
    (targets::SS_BARYCENTER, "SSBary"),
    (targets::SS_BARYCENTER, "Solar System Barycenter"),
    (targets::EM_BARYCENTER, "EMBary"),
    (targets::EM_BARYCENTER, "Earth-Moon Barycenter"),
    (targets::NUTATION, "Nutation"),
    (targets::LIBRATION, "Libration"),
];

/// Get the layout-order name of a coefficient owner (0=Mercury..12=Libration)
pub fn coeff_name(index: usize) -> Option<&'static str> {
    COEFF_NAMES.get(index).copied()
}

/// Get the PLEPH index of a body given its name (case-insensitive)
pub fn body_id(name: &str) -> Option<usize> {
    BODY_IDS.get(&name.to_lowercase()).copied()
}

/// PLEPH body numbering used by the coordinate query interface
pub mod targets {
    /// Mercury
    pub const MERCURY: usize = 1;
    /// Venus
    pub const VENUS: usize = 2;
    /// Earth (after the Earth-Moon barycenter split)
    pub const EARTH: usize = 3;
    /// Mars
    pub const MARS: usize = 4;
    /// Jupiter
    pub const JUPITER: usize = 5;
    /// Saturn
    pub const SATURN: usize = 6;
    /// Uranus
    pub const URANUS: usize = 7;
    /// Neptune
    pub const NEPTUNE: usize = 8;
    /// Pluto
    pub const PLUTO: usize = 9;
    /// Moon (barycentric, after the split)
    pub const MOON: usize = 10;
    /// Sun
    pub const SUN: usize = 11;
    /// Solar System barycenter
    pub const SS_BARYCENTER: usize = 12;
    /// Earth-Moon barycenter
    pub const EM_BARYCENTER: usize = 13;
    /// Nutation angles
    pub const NUTATION: usize = 14;
    /// Lunar libration angles
    pub const LIBRATION: usize = 15;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coeff_names_cover_layout() {
        assert_eq!(coeff_name(0), Some("Mercury"));
        assert_eq!(coeff_name(11), Some("Nutation"));
        assert_eq!(coeff_name(12), Some("Libration"));
        assert_eq!(coeff_name(13), None);
    }

    #[test]
    fn test_body_id_lookup() {
        assert_eq!(body_id("moon"), Some(targets::MOON));
        assert_eq!(body_id("EMBary"), Some(targets::EM_BARYCENTER));
        assert_eq!(body_id("Vulcan"), None);
    }
}
