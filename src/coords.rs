//! Epoch-to-state resolution over a binary ephemeris stream
//!
//! A [`Resolver`] owns an open binary ephemeris, one coefficient block
//! buffer, and a Chebyshev interpolator. Each query maps an epoch to a
//! block and per-body subintervals, interpolates every body present in the
//! layout, then reslots the raw results into the conventional 16-entry
//! state table with Earth and Moon separated from their barycenter.

use std::io::{Read, Seek};

use log::warn;
use nalgebra::{Vector3, Vector6};

use crate::binary;
use crate::chebyshev::Chebyshev;
use crate::errors::{EphError, Result};
use crate::header::{Header, NUTATION_INDEX};
use crate::names::targets;

/// Seconds per day, for velocity unit conversion
const SECONDS_PER_DAY: f64 = 86400.0;

/// One epoch query and its resulting state table
///
/// Slot assignments after a query: 0..10 are Mercury through Sun, 11 is the
/// solar-system barycenter (identically zero), 12 the Earth-Moon barycenter,
/// 13 nutation angles, 14 libration angles, 15 the raw geocentric Moon.
/// Slot 9 holds the Moon rebased to the solar-system barycenter and slot 2
/// the true Earth.
#[derive(Debug, Clone)]
pub struct Coords {
    /// Epoch as whole and fractional Julian day, summed before use
    pub et2: [f64; 2],
    /// Keep kilometers instead of dividing positions by the AU
    pub km: bool,
    /// Report velocities per second instead of per day
    pub seconds: bool,
    /// Interpolated state table, position then velocity per slot
    pub pv: [[f64; 6]; 16],
}

impl Coords {
    /// Query at a split Julian day, in AU and days by default
    pub fn new(whole_jd: f64, fraction_jd: f64) -> Self {
        Coords {
            et2: [whole_jd, fraction_jd],
            km: false,
            seconds: false,
            pv: [[0.0; 6]; 16],
        }
    }

    /// Query at an unsplit Julian day
    pub fn at(jd: f64) -> Self {
        Coords::new(jd, 0.0)
    }

    /// Position of `body` in the table's reference frame
    ///
    /// Body numbering as in [`Coords::vector_between`].
    pub fn position(&self, body: usize) -> Vector3<f64> {
        let s = self.slot(body);
        Vector3::new(s[0], s[1], s[2])
    }

    /// Velocity of `body` in the table's reference frame
    pub fn velocity(&self, body: usize) -> Vector3<f64> {
        let s = self.slot(body);
        Vector3::new(s[3], s[4], s[5])
    }

    fn slot(&self, body: usize) -> &[f64; 6] {
        assert!(
            (targets::MERCURY..=targets::LIBRATION).contains(&body),
            "body index out of range: {}",
            body
        );
        &self.pv[body - 1]
    }

    /// Position and velocity of `target` relative to `center`
    ///
    /// Body numbering is 1 Mercury .. 10 Moon, 11 Sun, 12 solar-system
    /// barycenter, 13 Earth-Moon barycenter, 14 nutation, 15 libration.
    /// Nutation and libration are angle sets, not geometric points: if
    /// either body is nutation the nutation slot is returned with the two
    /// unused trailing components zeroed, unless both are nutation, which
    /// yields the zero vector. If either body is libration the libration
    /// slot is returned as is.
    pub fn vector_between(&self, target: usize, center: usize) -> Vector6<f64> {
        assert!(
            (targets::MERCURY..=targets::LIBRATION).contains(&target)
                && (targets::MERCURY..=targets::LIBRATION).contains(&center),
            "body index out of range: target {}, center {}",
            target,
            center
        );

        if target == targets::NUTATION || center == targets::NUTATION {
            if target == center {
                return Vector6::zeros();
            }
            let s = &self.pv[13];
            return Vector6::new(s[0], s[1], s[2], s[3], 0.0, 0.0);
        }
        if target == targets::LIBRATION || center == targets::LIBRATION {
            let s = &self.pv[14];
            return Vector6::new(s[0], s[1], s[2], s[3], s[4], s[5]);
        }
        let t = &self.pv[target - 1];
        let c = &self.pv[center - 1];
        Vector6::new(
            t[0] - c[0],
            t[1] - c[1],
            t[2] - c[2],
            t[3] - c[3],
            t[4] - c[4],
            t[5] - c[5],
        )
    }
}

/// Interpolating reader over a binary ephemeris stream
pub struct Resolver<R> {
    reader: R,
    header: Header,
    interp: Chebyshev,
    block: Vec<f64>,
    cached_block: Option<usize>,
}

impl<R: Read + Seek> Resolver<R> {
    /// Read the header records and prepare interpolation buffers
    pub fn open(mut reader: R) -> Result<Self> {
        let header = binary::read_header(&mut reader)?;
        let interp = Chebyshev::new(header.max_cheby as usize);
        let block = vec![0.0; header.ncoeff as usize];
        Ok(Resolver {
            reader,
            header,
            interp,
            block,
            cached_block: None,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Interpolate all bodies at the epoch in `coords`
    ///
    /// Fails with an out-of-range error when the epoch lies outside the
    /// file's validity span; the span's end is inclusive. On success the
    /// state table in `coords` is fully populated per the slot conventions
    /// documented on [`Coords`].
    pub fn get_coords(&mut self, coords: &mut Coords) -> Result<()> {
        let totaltime = coords.et2[0] + coords.et2[1];
        if totaltime < self.header.ss[0] || totaltime > self.header.ss[1] {
            return Err(EphError::OutOfRange {
                jd: totaltime,
                start_jd: self.header.ss[0],
                end_jd: self.header.ss[1],
            });
        }
        // Renormalize the split so the fraction carries all sub-day precision
        let whole = totaltime.floor();
        coords.et2 = [whole, (coords.et2[0] - whole) + coords.et2[1]];

        // The end of the last block is inclusive, so an epoch landing exactly
        // on the final boundary clamps into the last block with x = 1
        let mut blocknum = ((totaltime - self.header.ss[0]) / self.header.ss[2]) as usize;
        if blocknum >= self.header.block_count() {
            blocknum = self.header.block_count() - 1;
        }
        self.load_block(blocknum)?;

        let blocktime = totaltime - self.block[0];
        for i in 0..13 {
            let triple = if i == 12 {
                self.header.libration
            } else {
                self.header.body[i]
            };
            // Absent bodies carry only a padding pointer
            if triple.ncoeff <= 0 || triple.nsub <= 0 {
                coords.pv[i] = [0.0; 6];
                continue;
            }

            let nsub = triple.nsub as usize;
            let ncf = triple.ncoeff as usize;
            let ncoords = Header::ncoords(i) as usize;
            let subspan = self.header.ss[2] / nsub as f64;
            let mut subinterval = (blocktime / subspan) as usize;
            if subinterval >= nsub {
                subinterval = nsub - 1;
            }
            let dataoffset = (triple.start - 1) as usize + ncoords * ncf * subinterval;
            let subtime = blocktime - subinterval as f64 * subspan;

            let mut x = 2.0 * (subtime / subspan) - 1.0;
            if !(-1.0..=1.0).contains(&x) {
                warn!(
                    "Chebyshev time {} is beyond [-1,1] at JD {}, clamping",
                    x, totaltime
                );
                x = x.clamp(-1.0, 1.0);
            }

            let end = dataoffset + ncoords * ncf;
            if end > self.block.len() {
                return Err(EphError::InvalidFormat(format!(
                    "layout for body {} overruns the data block",
                    i
                )));
            }
            let coeffs = &self.block[dataoffset..end];
            self.interp
                .evaluate(x, subspan, coeffs, ncoords, ncf, &mut coords.pv[i]);
        }

        // Reslot: stash the raw Moon, libration, and nutation results, then
        // split Earth and Moon out of the Earth-Moon barycenter
        let emrat = self.header.emrat;
        for j in 0..6 {
            coords.pv[15][j] = coords.pv[9][j];
            coords.pv[14][j] = coords.pv[12][j];
            coords.pv[13][j] = coords.pv[NUTATION_INDEX][j];
            coords.pv[11][j] = 0.0;
            coords.pv[12][j] = coords.pv[2][j];
            coords.pv[2][j] -= coords.pv[9][j] / (1.0 + emrat);
            coords.pv[9][j] += coords.pv[2][j];
        }

        if !coords.km {
            // Angle slots 13 and 14 stay in radians
            for i in (0..13).chain(15..16) {
                for j in 0..6 {
                    coords.pv[i][j] /= self.header.au;
                }
            }
        }
        if coords.seconds {
            for i in 0..16 {
                if i == 13 || i == 14 {
                    // Nutation's two rates live at components 2 and 3
                    coords.pv[i][2] /= SECONDS_PER_DAY;
                    coords.pv[i][3] /= SECONDS_PER_DAY;
                } else {
                    for j in 3..6 {
                        coords.pv[i][j] /= SECONDS_PER_DAY;
                    }
                }
            }
        }
        Ok(())
    }

    fn load_block(&mut self, blocknum: usize) -> Result<()> {
        if self.cached_block == Some(blocknum) {
            return Ok(());
        }
        let n = binary::read_block(&mut self.reader, &self.header, blocknum, &mut self.block)?;
        if n == 0 {
            return Err(EphError::TruncatedData { block: blocknum });
        }
        self.cached_block = Some(blocknum);
        Ok(())
    }
}
