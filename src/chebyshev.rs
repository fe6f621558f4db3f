//! Chebyshev polynomial evaluation for position and velocity interpolation
//!
//! An interpolator instance owns its basis scratch buffers and a cache keyed
//! on the last-seen normalized time. Within one epoch query every body shares
//! the same `x` but has its own coefficient set, so the basis arrays are
//! rebuilt once per epoch rather than once per body. An instance is safe for
//! sequential reuse; parallel queries need independent instances (each costs
//! one scratch buffer of the maximum coefficient count).

/// Chebyshev basis evaluator with a last-`x` cache
#[derive(Debug, Clone)]
pub struct Chebyshev {
    /// Position basis values T_n(x)
    pc: Vec<f64>,
    /// Derivative basis values T'_n(x)
    vc: Vec<f64>,
    /// x from the previous call; starts at an impossible value
    last_x: f64,
}

impl Chebyshev {
    /// Create an interpolator able to handle up to `max_coeffs` coefficients
    /// per coordinate
    pub fn new(max_coeffs: usize) -> Self {
        let n = max_coeffs.max(2);
        Self {
            pc: vec![0.0; n],
            vc: vec![0.0; n],
            last_x: 2.0,
        }
    }

    /// Rebuild the basis arrays when `x` differs from the previous call
    fn update_basis(&mut self, x: f64) {
        if self.last_x == x {
            return;
        }
        self.last_x = x;

        // T_0 = 1, T_1 = x, T_n = 2x T_{n-1} - T_{n-2}
        self.pc[0] = 1.0;
        self.pc[1] = x;
        for i in 2..self.pc.len() {
            self.pc[i] = 2.0 * x * self.pc[i - 1] - self.pc[i - 2];
            // Squash -0.0 (and denormal underflow) to plain zero
            if self.pc[i] * self.pc[i] == 0.0 {
                self.pc[i] = 0.0;
            }
        }

        // T'_0 = 0, T'_1 = 1, T'_n = 2x T'_{n-1} + 2 T_{n-1} - T'_{n-2}
        self.vc[0] = 0.0;
        self.vc[1] = 1.0;
        for i in 2..self.vc.len() {
            self.vc[i] = 2.0 * x * self.vc[i - 1] + 2.0 * self.pc[i - 1] - self.vc[i - 2];
        }
    }

    /// Interpolate position and velocity for `ncoords` coordinates
    ///
    /// `coeffs` holds `ncoords * ncoeffs` values, all coefficients of one
    /// coordinate contiguous. Positions land in `pv[0..ncoords]`, velocities
    /// in `pv[ncoords..2*ncoords]`; velocity is scaled by `2 / span_days` to
    /// convert from normalized time to days. `x` slightly outside `[-1, 1]`
    /// is reported by the caller as a precision warning, not rejected here.
    pub fn evaluate(
        &mut self,
        x: f64,
        span_days: f64,
        coeffs: &[f64],
        ncoords: usize,
        ncoeffs: usize,
        pv: &mut [f64],
    ) {
        self.update_basis(x);

        for i in 0..ncoords {
            let body_coeffs = &coeffs[i * ncoeffs..(i + 1) * ncoeffs];

            let mut pos = 0.0;
            for j in (0..ncoeffs).rev() {
                pos += self.pc[j] * body_coeffs[j];
            }
            pv[i] = pos;

            let mut vel = 0.0;
            for j in (0..ncoeffs).rev() {
                vel += self.vc[j] * body_coeffs[j];
            }
            pv[ncoords + i] = vel * 2.0 / span_days;
        }
    }

    #[cfg(test)]
    pub(crate) fn basis(&self) -> (&[f64], &[f64]) {
        (&self.pc, &self.vc)
    }
}
