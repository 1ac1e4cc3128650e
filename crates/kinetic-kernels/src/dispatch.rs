// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Kernel Dispatch
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Named-method selection of the per-species kernels.
//!
//! The closed set of radiation models and merging methods is dispatched by
//! tag at the outer boundary; each variant carries only the state it needs.

use crate::landau_lifshitz::CorrectedLandauLifshitz;
use crate::monte_carlo::{PhotonSink, RadiationMonteCarlo};
use crate::niel::NielRadiation;
use crate::tables::RadiationTables;
use crate::vranic::{MergeScratch, VranicMerger};
use kinetic_math::rng::UniformSource;
use kinetic_types::config::{Normalization, SpeciesConfig};
use kinetic_types::error::KineticResult;
use kinetic_types::fields::FieldSamples;
use kinetic_types::particles::ParticleStore;

pub enum MergingMethod {
    Vranic(VranicMerger),
}

impl MergingMethod {
    pub fn merge(
        &self,
        particles: &mut ParticleStore,
        istart: usize,
        iend: usize,
        scratch: &mut MergeScratch,
    ) -> KineticResult<()> {
        match self {
            MergingMethod::Vranic(merger) => merger.merge(particles, istart, iend, scratch),
        }
    }
}

/// Merger for the species, `None` when the configured name is not a
/// recognised method.
pub fn merging_from_config(config: &SpeciesConfig) -> KineticResult<Option<MergingMethod>> {
    match config.merging_method.as_str() {
        "vranic" => Ok(Some(MergingMethod::Vranic(VranicMerger::new(config)?))),
        _ => Ok(None),
    }
}

pub enum RadiationModel {
    MonteCarlo(RadiationMonteCarlo),
    CorrectedLandauLifshitz(CorrectedLandauLifshitz),
    Niel(NielRadiation),
}

impl RadiationModel {
    /// Advance `[istart, iend)` through the selected emission process and
    /// return the scalar radiated energy.
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
        match self {
            RadiationModel::MonteCarlo(kernel) => kernel.run(
                particles, fields, tables, norm, istart, iend, ipart_ref, rng,
            ),
            RadiationModel::CorrectedLandauLifshitz(kernel) => {
                kernel.run(particles, fields, tables, norm, istart, iend, ipart_ref)
            }
            RadiationModel::Niel(kernel) => kernel.run(
                particles, fields, tables, norm, istart, iend, ipart_ref, rng,
            ),
        }
    }

    /// Staged macro-photons, for the Monte-Carlo model with a sink attached.
    pub fn take_new_photons(&mut self) -> Option<ParticleStore> {
        match self {
            RadiationModel::MonteCarlo(kernel) => kernel.take_new_photons(),
            _ => None,
        }
    }
}

/// Radiation model for the species, `None` when the configured name is not
/// a recognised model.
pub fn radiation_from_config(
    config: &SpeciesConfig,
    photon_sink: Option<PhotonSink>,
) -> KineticResult<Option<RadiationModel>> {
    match config.radiation_model.as_str() {
        "mc" | "monte-carlo" => {
            let mut kernel = RadiationMonteCarlo::new(config)?;
            if let Some(sink) = photon_sink {
                kernel.attach_photon_sink(sink)?;
            }
            Ok(Some(RadiationModel::MonteCarlo(kernel)))
        }
        "cll" | "corrected-landau-lifshitz" => Ok(Some(RadiationModel::CorrectedLandauLifshitz(
            CorrectedLandauLifshitz::new(config)?,
        ))),
        "niel" => Ok(Some(RadiationModel::Niel(NielRadiation::new(config)?))),
        _ => Ok(None),
    }
}
