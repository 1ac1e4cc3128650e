// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Radiation Tables
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Precomputed nonlinear inverse-Compton cross-section tables.
//!
//! The tables are produced once at startup by an external builder and are
//! consumed read-only by the radiation kernels. Every query clamps its
//! input to the table domain; none of them can fail after construction.

use kinetic_math::interp::{bracket_cdf_fn, interp_log1d, LogAxis};
use kinetic_types::config::Normalization;
use kinetic_types::constants::ALPHA_FINE_STRUCTURE;
use kinetic_types::error::{KineticError, KineticResult};
use ndarray::Array2;

/// Raw table data handed over by the builder.
///
/// `xi` rows are cumulative distributions of the emitted photon χ, one row
/// per particle-χ node; `min_photon_chi[i]` is the smallest photon χ
/// sampled in row `i`. `niel_h` may be left empty when the Niel model is
/// not in use.
#[derive(Debug, Clone)]
pub struct RadiationTableSet {
    pub chi_continuous_min: f64,
    pub chi_discontinuous_min: f64,
    pub integfochi: Vec<f64>,
    pub integfochi_chi_min: f64,
    pub integfochi_chi_max: f64,
    pub xi: Array2<f64>,
    pub min_photon_chi: Vec<f64>,
    pub xi_chi_min: f64,
    pub xi_chi_max: f64,
    pub niel_h: Vec<f64>,
    pub niel_chi_min: f64,
    pub niel_chi_max: f64,
}

/// Validated, query-ready radiation tables.
#[derive(Debug, Clone)]
pub struct RadiationTables {
    chi_continuous_min: f64,
    chi_discontinuous_min: f64,
    integfochi: Vec<f64>,
    integfochi_axis: LogAxis,
    xi: Array2<f64>,
    log10_min_photon_chi: Vec<f64>,
    xi_axis: LogAxis,
    niel: Option<(Vec<f64>, LogAxis)>,
    factor_dnph_dt: f64,
    factor_classical_radiated_power: f64,
}

impl RadiationTables {
    pub fn new(set: RadiationTableSet, norm: &Normalization) -> KineticResult<Self> {
        if !set.chi_continuous_min.is_finite() || set.chi_continuous_min <= 0.0 {
            return Err(KineticError::ConfigError(format!(
                "chi_continuous_min must be finite and > 0, got {}",
                set.chi_continuous_min
            )));
        }
        if !set.chi_discontinuous_min.is_finite()
            || set.chi_discontinuous_min < set.chi_continuous_min
        {
            return Err(KineticError::ConfigError(format!(
                "chi_discontinuous_min must be >= chi_continuous_min, got {} < {}",
                set.chi_discontinuous_min, set.chi_continuous_min
            )));
        }
        if set.integfochi.len() < 2 {
            return Err(KineticError::ConfigError(format!(
                "integfochi table needs at least 2 points, got {}",
                set.integfochi.len()
            )));
        }
        if set.integfochi.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(KineticError::ConfigError(
                "integfochi table must be finite and non-negative".to_string(),
            ));
        }
        let integfochi_axis = LogAxis::new(
            set.integfochi_chi_min,
            set.integfochi_chi_max,
            set.integfochi.len(),
        )?;

        let (n_chi, n_photon) = set.xi.dim();
        if n_chi < 2 || n_photon < 2 {
            return Err(KineticError::ConfigError(format!(
                "xi table needs at least 2x2 nodes, got {n_chi}x{n_photon}"
            )));
        }
        if set.min_photon_chi.len() != n_chi {
            return Err(KineticError::ConfigError(format!(
                "min_photon_chi has {} rows, xi has {n_chi}",
                set.min_photon_chi.len()
            )));
        }
        if set
            .min_photon_chi
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return Err(KineticError::ConfigError(
                "min_photon_chi must be finite and > 0".to_string(),
            ));
        }
        if set.xi.iter().any(|v| !v.is_finite()) {
            return Err(KineticError::ConfigError(
                "xi table must be finite".to_string(),
            ));
        }
        let xi_axis = LogAxis::new(set.xi_chi_min, set.xi_chi_max, n_chi)?;

        let niel = if set.niel_h.is_empty() {
            None
        } else {
            if set.niel_h.len() < 2 {
                return Err(KineticError::ConfigError(
                    "niel_h table needs at least 2 points".to_string(),
                ));
            }
            if set.niel_h.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(KineticError::ConfigError(
                    "niel_h table must be finite and non-negative".to_string(),
                ));
            }
            let axis = LogAxis::new(set.niel_chi_min, set.niel_chi_max, set.niel_h.len())?;
            Some((set.niel_h, axis))
        };

        let lambda_c = norm.normalized_compton_wavelength;
        Ok(RadiationTables {
            chi_continuous_min: set.chi_continuous_min,
            chi_discontinuous_min: set.chi_discontinuous_min,
            integfochi: set.integfochi,
            integfochi_axis,
            xi: set.xi,
            log10_min_photon_chi: set.min_photon_chi.iter().map(|v| v.log10()).collect(),
            xi_axis,
            niel,
            factor_dnph_dt: 3.0_f64.sqrt() * ALPHA_FINE_STRUCTURE
                / (2.0 * std::f64::consts::PI * lambda_c),
            factor_classical_radiated_power: 2.0 * ALPHA_FINE_STRUCTURE / (3.0 * lambda_c),
        })
    }

    /// Below this χ even continuous losses are negligible.
    pub fn minimum_chi_continuous(&self) -> f64 {
        self.chi_continuous_min
    }

    /// Below this χ discontinuous (macro-photon) emission does not occur.
    pub fn minimum_chi_discontinuous(&self) -> f64 {
        self.chi_discontinuous_min
    }

    /// Normalized classical power prefactor 2α/(3λ̄) shared with the Niel
    /// diffusion coefficient.
    pub fn factor_classical_radiated_power(&self) -> f64 {
        self.factor_classical_radiated_power
    }

    pub fn has_niel_table(&self) -> bool {
        self.niel.is_some()
    }

    /// Instantaneous photon production rate dN_ph/dt for a particle of the
    /// given χ and γ, from the integrated emissivity table.
    ///
    /// The 1/γ carries the lab-frame time dilation of the emission process.
    pub fn photon_production_yield(&self, particle_chi: f64, particle_gamma: f64) -> f64 {
        let f = interp_log1d(&self.integfochi, &self.integfochi_axis, particle_chi);
        self.factor_dnph_dt * f / (particle_chi * particle_gamma)
    }

    /// Ridgers et al. quantum suppression factor g(χ).
    pub fn compute_ridgers_fit(particle_chi: f64) -> f64 {
        (1.0 + 4.8 * (1.0 + particle_chi) * (1.0 + 1.7 * particle_chi).ln()
            + 2.44 * particle_chi * particle_chi)
            .powf(-2.0 / 3.0)
    }

    /// Energy radiated over `dt` by the quantum-corrected classical
    /// (Landau-Lifshitz) power.
    pub fn ridgers_corrected_radiated_energy(&self, particle_chi: f64, dt: f64) -> f64 {
        Self::compute_ridgers_fit(particle_chi)
            * self.factor_classical_radiated_power
            * particle_chi
            * particle_chi
            * dt
    }

    /// Niel et al. stochastic coefficient h(χ); zero when no table was
    /// provided.
    pub fn niel_stochastic_coefficient(&self, particle_chi: f64) -> f64 {
        match &self.niel {
            Some((table, axis)) => interp_log1d(table, axis, particle_chi),
            None => 0.0,
        }
    }

    /// Draw the quantum parameter of an emitted photon by inverting the
    /// cumulative distribution stored in `xi`.
    ///
    /// The particle χ selects (and linearly blends) two table rows; `u` is
    /// bracketed inside the blended row and mapped back through the
    /// log-spaced photon-χ axis `[min_photon_chi(χ), χ]`.
    pub fn random_photon_chi(&self, particle_chi: f64, u: f64) -> f64 {
        let chi = particle_chi.clamp(self.xi_axis.min(), self.xi_axis.max());
        let (i, t) = self.xi_axis.locate(chi);
        let n_photon = self.xi.ncols();

        let (j, s) = bracket_cdf_fn(
            n_photon,
            |j| (1.0 - t) * self.xi[[i, j]] + t * self.xi[[i + 1, j]],
            u,
        );

        let log10_min =
            (1.0 - t) * self.log10_min_photon_chi[i] + t * self.log10_min_photon_chi[i + 1];
        let log10_max = chi.log10();
        let delta = (log10_max - log10_min) / (n_photon - 1) as f64;
        10.0_f64.powf(log10_min + (j as f64 + s) * delta)
    }
}
