// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{C_SI, COMPTON_WAVELENGTH_SI, HBAR_SI, M_ELECTRON_SI};
use crate::error::{KineticError, KineticResult};
use serde::{Deserialize, Serialize};

fn default_merging_method() -> String {
    "none".to_string()
}

fn default_radiation_model() -> String {
    "none".to_string()
}

fn default_momentum_cells() -> [usize; 3] {
    [5, 5, 5]
}

fn default_photon_sampling() -> u32 {
    1
}

fn default_photon_gamma_threshold() -> f64 {
    2.0
}

fn default_max_mc_iterations() -> u32 {
    100
}

fn default_mass() -> f64 {
    1.0
}

/// Per-species kernel configuration.
///
/// Masses are normalized to the electron mass, times to the reference
/// angular frequency, momenta to m·c.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub name: String,
    /// Spatial dimension of the position columns (1, 2 or 3).
    pub ndim: usize,
    /// Normalized time step.
    pub dt: f64,
    /// Species mass in electron masses.
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Merging algorithm: "vranic" or "none".
    #[serde(default = "default_merging_method")]
    pub merging_method: String,
    /// Minimum particles in a range before merging is attempted.
    #[serde(default)]
    pub merging_ppc_min_threshold: usize,
    /// Momentum-space discretization (radius, theta, phi).
    #[serde(default = "default_momentum_cells")]
    pub merging_momentum_cells: [usize; 3],
    /// Radiation model: "mc", "cll", "niel" or "none".
    #[serde(default = "default_radiation_model")]
    pub radiation_model: String,
    /// Number of macro-photons created per emission event.
    #[serde(default = "default_photon_sampling")]
    pub radiation_photon_sampling: u32,
    /// Minimum photon gamma for macro-photon creation.
    #[serde(default = "default_photon_gamma_threshold")]
    pub radiation_photon_gamma_threshold: f64,
    /// Cap on Monte-Carlo sub-iterations per particle per time step.
    #[serde(default = "default_max_mc_iterations")]
    pub max_monte_carlo_iterations: u32,
}

impl SpeciesConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> KineticResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Inverse of the species mass in electron masses.
    pub fn one_over_mass(&self) -> f64 {
        1.0 / self.mass
    }

    pub fn validate(&self) -> KineticResult<()> {
        if self.name.is_empty() {
            return Err(KineticError::ConfigError(
                "species name must be non-empty".to_string(),
            ));
        }
        if !(1..=3).contains(&self.ndim) {
            return Err(KineticError::ConfigError(format!(
                "ndim must be 1, 2 or 3, got {}",
                self.ndim
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(KineticError::ConfigError(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(KineticError::ConfigError(format!(
                "mass must be finite and > 0, got {}",
                self.mass
            )));
        }
        if self.merging_momentum_cells.iter().any(|&n| n == 0) {
            return Err(KineticError::ConfigError(format!(
                "merging_momentum_cells must all be >= 1, got {:?}",
                self.merging_momentum_cells
            )));
        }
        if self.radiation_photon_sampling == 0 {
            return Err(KineticError::ConfigError(
                "radiation_photon_sampling must be >= 1".to_string(),
            ));
        }
        if !self.radiation_photon_gamma_threshold.is_finite()
            || self.radiation_photon_gamma_threshold < 0.0
        {
            return Err(KineticError::ConfigError(format!(
                "radiation_photon_gamma_threshold must be finite and >= 0, got {}",
                self.radiation_photon_gamma_threshold
            )));
        }
        if self.max_monte_carlo_iterations == 0 {
            return Err(KineticError::ConfigError(
                "max_monte_carlo_iterations must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unit-system factors derived from the reference angular frequency.
///
/// The QED kernels only ever see the two normalized factors below; the SI
/// constants stay in [`crate::constants`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Reduced Compton wavelength over the reference length c/ω_ref.
    pub normalized_compton_wavelength: f64,
    /// Reference field E_ref = m_e c ω_ref / e over the Schwinger field.
    pub inv_norm_e_schwinger: f64,
}

impl Normalization {
    /// Build from the reference angular frequency ω_ref (rad/s).
    pub fn from_reference_frequency(omega_ref: f64) -> KineticResult<Self> {
        if !omega_ref.is_finite() || omega_ref <= 0.0 {
            return Err(KineticError::ConfigError(format!(
                "reference angular frequency must be finite and > 0, got {omega_ref}"
            )));
        }
        let normalized_compton_wavelength = COMPTON_WAVELENGTH_SI * omega_ref / C_SI;
        // E_s / E_ref = m_e c² / (ħ ω_ref)
        let norm_e_schwinger = M_ELECTRON_SI * C_SI * C_SI / (HBAR_SI * omega_ref);
        Ok(Normalization {
            normalized_compton_wavelength,
            inv_norm_e_schwinger: 1.0 / norm_e_schwinger,
        })
    }
}
