// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Corrected Landau-Lifshitz Radiation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Continuous radiation reaction with the Ridgers quantum correction.
//!
//! Deterministic drag: every particle above the continuous χ threshold
//! loses the tabulated Ridgers-corrected energy over the full time step.
//! The per-particle body is pure, so the range runs on the rayon pool.

use crate::chi::{compute_particle_chi, field_components, lorentz_gamma, update_chi_range};
use crate::tables::RadiationTables;
use kinetic_types::config::{Normalization, SpeciesConfig};
use kinetic_types::error::{KineticError, KineticResult};
use kinetic_types::fields::FieldSamples;
use kinetic_types::particles::ParticleStore;
use rayon::prelude::*;

pub struct CorrectedLandauLifshitz {
    dt: f64,
    one_over_mass: f64,
}

impl CorrectedLandauLifshitz {
    pub fn new(config: &SpeciesConfig) -> KineticResult<Self> {
        config.validate()?;
        Ok(CorrectedLandauLifshitz {
            dt: config.dt,
            one_over_mass: config.one_over_mass(),
        })
    }

    /// Apply the continuous drag to `[istart, iend)` and return the scalar
    /// radiated energy.
    pub fn run(
        &self,
        particles: &mut ParticleStore,
        fields: &FieldSamples,
        tables: &RadiationTables,
        norm: &Normalization,
        istart: usize,
        iend: usize,
        ipart_ref: usize,
    ) -> KineticResult<f64> {
        particles.check_range(istart, iend)?;
        if !particles.has_quantum_parameter() {
            return Err(KineticError::PhysicsViolation(
                "continuous radiation requires the chi column".to_string(),
            ));
        }
        let [ex, ey, ez, bx, by, bz] = field_components(fields, istart, iend, ipart_ref)?;

        let one_over_mass_square = self.one_over_mass * self.one_over_mass;
        let inv_norm_e_schwinger = norm.inv_norm_e_schwinger;
        let chi_cont_min = tables.minimum_chi_continuous();
        let dt = self.dt;

        let radiated_energy_loc: f64;
        {
            let view = particles.view_mut();
            let [px_col, py_col, pz_col] = view.momentum;
            let px = &mut px_col[istart..iend];
            let py = &mut py_col[istart..iend];
            let pz = &mut pz_col[istart..iend];
            let weight: &[f64] = &view.weight[istart..iend];
            let charge: &[i16] = &view.charge[istart..iend];
            let cell_keys: &[i32] = &view.cell_keys[istart..iend];

            radiated_energy_loc = px
                .par_iter_mut()
                .zip(py.par_iter_mut())
                .zip(pz.par_iter_mut())
                .enumerate()
                .map(|(k, ((pxi, pyi), pzi))| {
                    if cell_keys[k] < 0 {
                        return 0.0;
                    }
                    let j = istart + k - ipart_ref;
                    let gamma = lorentz_gamma(*pxi, *pyi, *pzi);
                    let particle_chi = compute_particle_chi(
                        charge[k] as f64 * one_over_mass_square,
                        *pxi,
                        *pyi,
                        *pzi,
                        gamma,
                        ex[j],
                        ey[j],
                        ez[j],
                        bx[j],
                        by[j],
                        bz[j],
                        inv_norm_e_schwinger,
                    );
                    if gamma <= 1.0 || particle_chi < chi_cont_min {
                        return 0.0;
                    }

                    let rad_energy = tables.ridgers_corrected_radiated_energy(particle_chi, dt);
                    let temp = rad_energy * gamma / (gamma * gamma - 1.0);
                    *pxi -= temp * *pxi;
                    *pyi -= temp * *pyi;
                    *pzi -= temp * *pzi;

                    weight[k] * (gamma - lorentz_gamma(*pxi, *pyi, *pzi))
                })
                .sum();
        }

        update_chi_range(
            particles,
            fields,
            istart,
            iend,
            ipart_ref,
            self.one_over_mass,
            norm,
        )?;

        Ok(radiated_energy_loc)
    }
}
