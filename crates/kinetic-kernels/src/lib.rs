// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Kinetic Kernels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-cell QED kernels for relativistic macro-particle populations.
//!
//! Two hot paths live here: the Monte-Carlo nonlinear inverse-Compton
//! radiation engine ([`monte_carlo`]) and the Vranic momentum-space
//! particle merger ([`vranic`]), plus the continuous radiation models they
//! share thresholds with ([`landau_lifshitz`], [`niel`]). Both are invoked
//! per simulation cell per time step on a half-open particle range and
//! mutate the [`kinetic_types::particles::ParticleStore`] in place.

pub mod chi;
pub mod dispatch;
pub mod landau_lifshitz;
pub mod monte_carlo;
pub mod niel;
pub mod tables;
pub mod vranic;
