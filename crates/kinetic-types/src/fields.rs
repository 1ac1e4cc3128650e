// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Field Samples
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Interpolated electromagnetic field samples at particle positions.
//!
//! The pusher hands the radiation kernels two contiguous buffers laid out
//! `[Ex… Ey… Ez…]` and `[Bx… By… Bz…]`, one value per particle of the range
//! it interpolated, addressed by `particle_index - ipart_ref`.

use crate::error::{KineticError, KineticResult};

#[derive(Debug, Clone)]
pub struct FieldSamples {
    nparts: usize,
    e: Vec<f64>,
    b: Vec<f64>,
}

impl FieldSamples {
    /// Zero-field buffer for `nparts` particles.
    pub fn zeros(nparts: usize) -> Self {
        FieldSamples {
            nparts,
            e: vec![0.0; 3 * nparts],
            b: vec![0.0; 3 * nparts],
        }
    }

    /// Adopt buffers produced by the interpolator.
    pub fn from_buffers(e: Vec<f64>, b: Vec<f64>) -> KineticResult<Self> {
        if e.len() != b.len() || e.len() % 3 != 0 {
            return Err(KineticError::PhysicsViolation(format!(
                "field buffers must share a length divisible by 3, got E={}, B={}",
                e.len(),
                b.len()
            )));
        }
        Ok(FieldSamples {
            nparts: e.len() / 3,
            e,
            b,
        })
    }

    pub fn nparts(&self) -> usize {
        self.nparts
    }

    /// Electric field component `d` (0 = x, 1 = y, 2 = z).
    pub fn e_component(&self, d: usize) -> &[f64] {
        &self.e[d * self.nparts..(d + 1) * self.nparts]
    }

    pub fn e_component_mut(&mut self, d: usize) -> &mut [f64] {
        &mut self.e[d * self.nparts..(d + 1) * self.nparts]
    }

    /// Magnetic field component `d` (0 = x, 1 = y, 2 = z).
    pub fn b_component(&self, d: usize) -> &[f64] {
        &self.b[d * self.nparts..(d + 1) * self.nparts]
    }

    pub fn b_component_mut(&mut self, d: usize) -> &mut [f64] {
        &mut self.b[d * self.nparts..(d + 1) * self.nparts]
    }
}
