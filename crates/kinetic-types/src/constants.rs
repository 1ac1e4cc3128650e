// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Speed of light (m/s)
pub const C_SI: f64 = 299_792_458.0;

/// Electron mass (kg)
pub const M_ELECTRON_SI: f64 = 9.1093837015e-31;

/// Elementary charge (C)
pub const Q_ELECTRON_SI: f64 = 1.602176634e-19;

/// Reduced Planck constant (J s)
pub const HBAR_SI: f64 = 1.054571817e-34;

/// Fine-structure constant
pub const ALPHA_FINE_STRUCTURE: f64 = 7.2973525693e-3;

/// Reduced Compton wavelength ħ/(m_e c) (m)
pub const COMPTON_WAVELENGTH_SI: f64 = HBAR_SI / (M_ELECTRON_SI * C_SI);

/// Schwinger field m_e²c³/(e ħ) (V/m)
pub const SCHWINGER_FIELD_SI: f64 =
    M_ELECTRON_SI * M_ELECTRON_SI * C_SI * C_SI * C_SI / (Q_ELECTRON_SI * HBAR_SI);
