// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Niel Stochastic Radiation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fokker-Planck radiation model of Niel et al. (2017).
//!
//! Extends the corrected Landau-Lifshitz drag with a stochastic diffusive
//! operator: each particle above the continuous threshold receives a
//! Gaussian energy kick of variance h(χ)·dt scaled by the classical power
//! prefactor. No macro-photons are produced in this model.

use crate::chi::{compute_particle_chi, field_components, lorentz_gamma, update_chi_range};
use crate::tables::RadiationTables;
use kinetic_math::rng::{sample_normal, UniformSource};
use kinetic_types::config::{Normalization, SpeciesConfig};
use kinetic_types::error::{KineticError, KineticResult};
use kinetic_types::fields::FieldSamples;
use kinetic_types::particles::ParticleStore;

pub struct NielRadiation {
    dt: f64,
    one_over_mass: f64,
}

impl NielRadiation {
    pub fn new(config: &SpeciesConfig) -> KineticResult<Self> {
        config.validate()?;
        Ok(NielRadiation {
            dt: config.dt,
            one_over_mass: config.one_over_mass(),
        })
    }

    /// Apply drag plus diffusion to `[istart, iend)` and return the scalar
    /// radiated energy.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        particles: &mut ParticleStore,
        fields: &FieldSamples,
        tables: &RadiationTables,
        norm: &Normalization,
        istart: usize,
        iend: usize,
        ipart_ref: usize,
        rng: &mut dyn UniformSource,
    ) -> KineticResult<f64> {
        particles.check_range(istart, iend)?;
        if !particles.has_quantum_parameter() {
            return Err(KineticError::PhysicsViolation(
                "Niel radiation requires the chi column".to_string(),
            ));
        }
        if !tables.has_niel_table() {
            return Err(KineticError::PhysicsViolation(
                "Niel radiation requires the h(chi) table".to_string(),
            ));
        }
        let [ex, ey, ez, bx, by, bz] = field_components(fields, istart, iend, ipart_ref)?;

        let one_over_mass_square = self.one_over_mass * self.one_over_mass;
        let inv_norm_e_schwinger = norm.inv_norm_e_schwinger;
        let chi_cont_min = tables.minimum_chi_continuous();
        let factor_classical = tables.factor_classical_radiated_power();
        let sqrt_dt = self.dt.sqrt();

        let mut radiated_energy_loc = 0.0;
        {
            let view = particles.view_mut();
            for ipart in istart..iend {
                if view.cell_keys[ipart] < 0 {
                    continue;
                }
                let j = ipart - ipart_ref;
                let gamma = lorentz_gamma(
                    view.momentum[0][ipart],
                    view.momentum[1][ipart],
                    view.momentum[2][ipart],
                );
                let particle_chi = compute_particle_chi(
                    view.charge[ipart] as f64 * one_over_mass_square,
                    view.momentum[0][ipart],
                    view.momentum[1][ipart],
                    view.momentum[2][ipart],
                    gamma,
                    ex[j],
                    ey[j],
                    ez[j],
                    bx[j],
                    by[j],
                    bz[j],
                    inv_norm_e_schwinger,
                );
                if gamma <= 1.0 || particle_chi <= chi_cont_min {
                    continue;
                }

                // Gaussian increment of variance dt
                let wiener = sample_normal(rng) * sqrt_dt;
                let h = tables.niel_stochastic_coefficient(particle_chi);
                let diffusion = (factor_classical * gamma * h).sqrt() * wiener;

                let rad_energy = tables.ridgers_corrected_radiated_energy(particle_chi, self.dt);
                let temp = (rad_energy - diffusion) * gamma / (gamma * gamma - 1.0);
                view.momentum[0][ipart] -= temp * view.momentum[0][ipart];
                view.momentum[1][ipart] -= temp * view.momentum[1][ipart];
                view.momentum[2][ipart] -= temp * view.momentum[2][ipart];

                radiated_energy_loc += view.weight[ipart]
                    * (gamma
                        - lorentz_gamma(
                            view.momentum[0][ipart],
                            view.momentum[1][ipart],
                            view.momentum[2][ipart],
                        ));
            }
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
