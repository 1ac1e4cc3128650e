// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Monte-Carlo Radiation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Monte-Carlo nonlinear inverse-Compton emission.
//!
//! Each charged macro-particle carries an optical depth τ toward its next
//! stochastic photon emission. Within one time step the kernel sub-steps
//! the particle: arm a fresh τ = −ln(1−U) when none is pending, count it
//! down at the tabulated production rate, emit a photon when it crosses
//! zero, and fall back to the quantum-corrected continuous drag when χ is
//! too small for discrete events. Emitted macro-photons are staged in an
//! internal buffer the caller drains after the step; emission below the
//! macro-photon threshold only accumulates scalar radiated energy.

use crate::chi::{compute_particle_chi, field_components, lorentz_gamma, update_chi_range};
use crate::tables::RadiationTables;
use kinetic_math::rng::UniformSource;
use kinetic_types::config::{Normalization, SpeciesConfig};
use kinetic_types::error::{KineticError, KineticResult};
use kinetic_types::fields::FieldSamples;
use kinetic_types::particles::{ParticleStore, ParticleViewMut};

/// Optical depths at or below this value count as "no emission pending".
pub const EPSILON_TAU: f64 = 1e-100;

/// Capability flags of the photon species receiving the macro-photons.
#[derive(Debug, Clone, Copy)]
pub struct PhotonSink {
    pub has_quantum_parameter: bool,
    pub has_monte_carlo: bool,
}

pub struct RadiationMonteCarlo {
    dt: f64,
    ndim: usize,
    one_over_mass: f64,
    photon_sampling: u32,
    inv_photon_sampling: f64,
    photon_gamma_threshold: f64,
    max_monte_carlo_iterations: u32,
    new_photons: Option<ParticleStore>,
}

impl RadiationMonteCarlo {
    pub fn new(config: &SpeciesConfig) -> KineticResult<Self> {
        config.validate()?;
        Ok(RadiationMonteCarlo {
            dt: config.dt,
            ndim: config.ndim,
            one_over_mass: config.one_over_mass(),
            photon_sampling: config.radiation_photon_sampling,
            inv_photon_sampling: 1.0 / config.radiation_photon_sampling as f64,
            photon_gamma_threshold: config.radiation_photon_gamma_threshold,
            max_monte_carlo_iterations: config.max_monte_carlo_iterations,
            new_photons: None,
        })
    }

    /// Attach a photon species; from now on emissions above the gamma
    /// threshold materialise macro-photons in the staging buffer.
    pub fn attach_photon_sink(&mut self, sink: PhotonSink) -> KineticResult<()> {
        self.new_photons = Some(ParticleStore::new(
            self.ndim,
            sink.has_quantum_parameter,
            sink.has_monte_carlo,
        )?);
        Ok(())
    }

    pub fn has_photon_sink(&self) -> bool {
        self.new_photons.is_some()
    }

    /// Hand the staged photons to the caller, leaving an empty buffer
    /// behind. `None` when no photon species is attached.
    pub fn take_new_photons(&mut self) -> Option<ParticleStore> {
        let buffer = self.new_photons.take()?;
        self.new_photons = ParticleStore::new(
            self.ndim,
            buffer.has_quantum_parameter(),
            buffer.has_monte_carlo(),
        )
        .ok();
        Some(buffer)
    }

    /// Advance `[istart, iend)` through the stochastic emission process and
    /// return the scalar radiated energy of this invocation.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
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
        if particles.ndim() != self.ndim {
            return Err(KineticError::PhysicsViolation(format!(
                "species is configured for ndim={}, particle store has ndim={}",
                self.ndim,
                particles.ndim()
            )));
        }
        if !particles.has_quantum_parameter() {
            return Err(KineticError::PhysicsViolation(
                "Monte-Carlo radiation requires the chi column".to_string(),
            ));
        }
        let [ex, ey, ez, bx, by, bz] = field_components(fields, istart, iend, ipart_ref)?;

        let one_over_mass_square = self.one_over_mass * self.one_over_mass;
        let inv_norm_e_schwinger = norm.inv_norm_e_schwinger;
        let chi_disc_min = tables.minimum_chi_discontinuous();
        let chi_cont_min = tables.minimum_chi_continuous();
        let dt = self.dt;

        let mut radiated_energy_loc = 0.0;

        {
            let mut view = particles.view_mut();
            let tau = view.tau.take().ok_or_else(|| {
                KineticError::PhysicsViolation(
                    "Monte-Carlo radiation requires the tau column".to_string(),
                )
            })?;

            for ipart in istart..iend {
                if view.cell_keys[ipart] < 0 {
                    continue;
                }
                let charge_over_mass_square =
                    view.charge[ipart] as f64 * one_over_mass_square;
                let j = ipart - ipart_ref;

                let mut local_it_time = 0.0;
                let mut mc_it_nb = 0u32;

                while local_it_time < dt && mc_it_nb < self.max_monte_carlo_iterations {
                    let gamma = lorentz_gamma(
                        view.momentum[0][ipart],
                        view.momentum[1][ipart],
                        view.momentum[2][ipart],
                    );
                    // zero kinetic energy: the MC routine does not apply
                    if gamma == 1.0 {
                        break;
                    }

                    let particle_chi = compute_particle_chi(
                        charge_over_mass_square,
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

                    // New discontinuous emission: draw the final optical
                    // depth to reach before the photon leaves
                    if particle_chi > chi_disc_min && tau[ipart] <= EPSILON_TAU {
                        while tau[ipart] <= EPSILON_TAU {
                            tau[ipart] = -(1.0 - rng.uniform()).ln();
                        }
                    }

                    if tau[ipart] > EPSILON_TAU {
                        // Emission in progress: count the optical depth down
                        // at the tabulated production rate
                        let temp = tables.photon_production_yield(particle_chi, gamma);
                        let emission_time = (tau[ipart] / temp).min(dt - local_it_time);
                        tau[ipart] -= temp * emission_time;

                        if tau[ipart] <= EPSILON_TAU {
                            let u = rng.uniform();
                            radiated_energy_loc += self.photon_emission(
                                ipart,
                                particle_chi,
                                gamma,
                                &mut view,
                                u,
                                tables,
                            );
                            // a new drawing becomes possible at the next
                            // Monte-Carlo iteration
                            tau[ipart] = -1.0;
                        }

                        mc_it_nb += 1;
                        local_it_time += emission_time;
                    } else if particle_chi <= chi_disc_min
                        && tau[ipart] <= EPSILON_TAU
                        && particle_chi > chi_cont_min
                        && gamma > 1.0
                    {
                        // Continuous regime: quantum-corrected drag over the
                        // remaining iteration time
                        let emission_time = dt - local_it_time;
                        let cont_rad_energy =
                            tables.ridgers_corrected_radiated_energy(particle_chi, emission_time);
                        let temp = cont_rad_energy * gamma / (gamma * gamma - 1.0);
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
                        local_it_time = dt;
                    } else {
                        // chi too low for any radiation loss
                        local_it_time = dt;
                    }
                }
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

    /// Emit one photon from particle `ipart`: recoil the emitter and either
    /// stage `photon_sampling` macro-photons or return the scalar radiated
    /// energy.
    fn photon_emission(
        &mut self,
        ipart: usize,
        particle_chi: f64,
        particle_gamma: f64,
        view: &mut ParticleViewMut<'_>,
        random_number: f64,
        tables: &RadiationTables,
    ) -> f64 {
        let photon_chi = tables.random_photon_chi(particle_chi, random_number);
        let gamma_photon = photon_chi / particle_chi * (particle_gamma - 1.0);

        // Momentum-conserving recoil. The energy-conserving variant would
        // rescale |p| to sqrt((γ−γ_ph)²−1) instead; it is kept out to match
        // the production behaviour of the emission operator.
        let recoil = gamma_photon / (particle_gamma * particle_gamma - 1.0).sqrt();
        view.momentum[0][ipart] -= recoil * view.momentum[0][ipart];
        view.momentum[1][ipart] -= recoil * view.momentum[1][ipart];
        view.momentum[2][ipart] -= recoil * view.momentum[2][ipart];

        if gamma_photon >= self.photon_gamma_threshold {
            if let Some(buffer) = self.new_photons.as_mut() {
                let first = buffer.len();
                buffer.create_particles(self.photon_sampling as usize);

                // photon direction along the emitter momentum; the recoil
                // above is a pure rescale so the direction is unchanged
                let px = view.momentum[0][ipart];
                let py = view.momentum[1][ipart];
                let pz = view.momentum[2][ipart];
                let inv_norm_p = 1.0 / (px * px + py * py + pz * pz).sqrt();

                for id_new in first..first + self.photon_sampling as usize {
                    for d in 0..self.ndim {
                        buffer.position_mut(d)[id_new] = view.position[d][ipart];
                    }
                    buffer.momentum_mut(0)[id_new] = gamma_photon * px * inv_norm_p;
                    buffer.momentum_mut(1)[id_new] = gamma_photon * py * inv_norm_p;
                    buffer.momentum_mut(2)[id_new] = gamma_photon * pz * inv_norm_p;
                    buffer.weight_mut()[id_new] = view.weight[ipart] * self.inv_photon_sampling;
                    buffer.charge_mut()[id_new] = 0;
                    if let Some(chi) = buffer.chi_mut() {
                        chi[id_new] = photon_chi;
                    }
                    if let Some(tau) = buffer.tau_mut() {
                        tau[id_new] = -1.0;
                    }
                }
                return 0.0;
            }
        }

        // no macro-photon: account the emitted energy in the scalar
        let gamma_new = lorentz_gamma(
            view.momentum[0][ipart],
            view.momentum[1][ipart],
            view.momentum[2][ipart],
        );
        view.weight[ipart] * (particle_gamma - gamma_new)
    }
}
