// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Kinetic Math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Table lookup and random-number plumbing for the kinetic kernels.

pub mod interp;
pub mod rng;
