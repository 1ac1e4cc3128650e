// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Property-Based Tests (proptest) for kinetic-kernels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Randomised invariants of the merger and the radiation kernels:
//! conservation laws, packet counting, optical-depth exit states and the
//! χ post-pass guarantee.

use kinetic_kernels::chi::{compute_particle_chi, lorentz_gamma};
use kinetic_kernels::monte_carlo::{PhotonSink, RadiationMonteCarlo, EPSILON_TAU};
use kinetic_kernels::landau_lifshitz::CorrectedLandauLifshitz;
use kinetic_kernels::tables::{RadiationTableSet, RadiationTables};
use kinetic_kernels::vranic::{MergeScratch, VranicMerger};
use kinetic_math::interp::LogAxis;
use kinetic_math::rng::CpuRng;
use kinetic_types::config::{Normalization, SpeciesConfig};
use kinetic_types::fields::FieldSamples;
use kinetic_types::particles::ParticleStore;
use ndarray::Array2;
use proptest::prelude::*;

fn species_config(cells: [usize; 3], threshold: usize) -> SpeciesConfig {
    SpeciesConfig {
        name: "electron".to_string(),
        ndim: 1,
        dt: 0.2,
        mass: 1.0,
        merging_method: "vranic".to_string(),
        merging_ppc_min_threshold: threshold,
        merging_momentum_cells: cells,
        radiation_model: "mc".to_string(),
        radiation_photon_sampling: 1,
        radiation_photon_gamma_threshold: 2.0,
        max_monte_carlo_iterations: 50,
    }
}

fn tables() -> (RadiationTables, Normalization) {
    let norm = Normalization::from_reference_frequency(2.354e15).unwrap();
    let n_chi = 32;
    let n_photon = 16;
    let axis = LogAxis::new(1e-4, 1e2, n_chi).unwrap();
    let set = RadiationTableSet {
        chi_continuous_min: 1e-3,
        chi_discontinuous_min: 1e-2,
        integfochi: (0..n_chi).map(|i| axis.value(i)).collect(),
        integfochi_chi_min: 1e-4,
        integfochi_chi_max: 1e2,
        xi: Array2::from_shape_fn((n_chi, n_photon), |(_, j)| {
            j as f64 / (n_photon - 1) as f64
        }),
        min_photon_chi: (0..n_chi).map(|i| axis.value(i) * 1e-4).collect(),
        xi_chi_min: 1e-4,
        xi_chi_max: 1e2,
        niel_h: Vec::new(),
        niel_chi_min: 1e-4,
        niel_chi_max: 1e2,
    };
    (RadiationTables::new(set, &norm).unwrap(), norm)
}

fn population(momenta: &[[f64; 3]], weights: &[f64], monte_carlo: bool) -> ParticleStore {
    let mut store = ParticleStore::new(1, true, monte_carlo).unwrap();
    store.create_particles(momenta.len());
    for (i, (p, &w)) in momenta.iter().zip(weights).enumerate() {
        store.momentum_mut(0)[i] = p[0];
        store.momentum_mut(1)[i] = p[1];
        store.momentum_mut(2)[i] = p[2];
        store.weight_mut()[i] = w;
        store.charge_mut()[i] = -1;
    }
    store
}

fn totals(store: &ParticleStore) -> (f64, [f64; 3], f64) {
    let mut w_tot = 0.0;
    let mut p_tot = [0.0; 3];
    let mut e_tot = 0.0;
    for i in 0..store.len() {
        if !store.is_alive(i) {
            continue;
        }
        let w = store.weight()[i];
        let (px, py, pz) = (
            store.momentum(0)[i],
            store.momentum(1)[i],
            store.momentum(2)[i],
        );
        w_tot += w;
        p_tot[0] += w * px;
        p_tot[1] += w * py;
        p_tot[2] += w * pz;
        e_tot += w * lorentz_gamma(px, py, pz);
    }
    (w_tot, p_tot, e_tot)
}

fn momentum_strategy(n: usize) -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(
        (-8.0f64..8.0, -8.0f64..8.0, -8.0f64..8.0).prop_map(|(x, y, z)| [x, y, z]),
        n..n + 1,
    )
}

/// Momenta bounded away from rest, for the drag tests where the
/// first-order energy loss must stay below the kinetic energy.
fn fast_momentum_strategy(n: usize) -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(
        (1.0f64..8.0, 1.0f64..8.0, 1.0f64..8.0).prop_map(|(x, y, z)| [x, y, z]),
        n..n + 1,
    )
}

fn weight_strategy(n: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1f64..5.0, n..n + 1)
}

proptest! {
    /// Merging conserves total weight, momentum and energy of the live
    /// population (dead remainders excluded on both sides).
    #[test]
    fn merger_conserves_weight_momentum_energy(
        momenta in momentum_strategy(48),
        weights in weight_strategy(48),
    ) {
        let mut store = population(&momenta, &weights, false);
        let merger = VranicMerger::new(&species_config([4, 4, 4], 0)).unwrap();
        let mut scratch = MergeScratch::default();

        let (w0, p0, e0) = totals(&store);
        let store_len = store.len();
        merger.merge(&mut store, 0, store_len, &mut scratch).unwrap();
        let (w1, p1, e1) = totals(&store);

        prop_assert!((w1 - w0).abs() <= 1e-12 * w0, "weight {w0} -> {w1}");
        for d in 0..3 {
            prop_assert!((p1[d] - p0[d]).abs() <= 1e-10 * e0,
                "momentum[{d}] {} -> {}", p0[d], p1[d]);
        }
        prop_assert!((e1 - e0).abs() <= 1e-10 * e0, "energy {e0} -> {e1}");
    }

    /// With a single momentum bin, exactly ⌊n/4⌋·2 particles die and
    /// ⌊n/4⌋·2 + n mod 4 survive.
    #[test]
    fn merger_packet_count(
        momenta in momentum_strategy(23),
        weights in weight_strategy(23),
        n in 4usize..23,
    ) {
        let mut store = population(&momenta[..n], &weights[..n], false);
        let merger = VranicMerger::new(&species_config([1, 1, 1], 0)).unwrap();
        let mut scratch = MergeScratch::default();
        merger.merge(&mut store, 0, n, &mut scratch).unwrap();

        let dead = (0..n).filter(|&i| !store.is_alive(i)).count();
        prop_assert_eq!(dead, (n / 4) * 2);
    }

    /// At or below the per-cell threshold nothing changes at all.
    #[test]
    fn merger_below_threshold_is_identity(
        momenta in momentum_strategy(12),
        weights in weight_strategy(12),
    ) {
        let mut store = population(&momenta, &weights, false);
        let merger = VranicMerger::new(&species_config([5, 5, 5], 12)).unwrap();
        let mut scratch = MergeScratch::default();
        merger.merge(&mut store, 0, 12, &mut scratch).unwrap();

        for i in 0..12 {
            prop_assert!(store.is_alive(i));
            prop_assert_eq!(store.momentum(0)[i], momenta[i][0]);
            prop_assert_eq!(store.momentum(1)[i], momenta[i][1]);
            prop_assert_eq!(store.momentum(2)[i], momenta[i][2]);
            prop_assert_eq!(store.weight()[i], weights[i]);
        }
    }

    /// The early-exit threshold compares against the raw range length, not
    /// the live count: a range longer than the threshold still merges even
    /// when dead particles leave fewer live ones than the threshold.
    #[test]
    fn merger_threshold_counts_range_not_live(
        momenta in momentum_strategy(16),
        weights in weight_strategy(16),
        dead in 4usize..12,
    ) {
        let mut store = population(&momenta, &weights, false);
        for i in 0..dead {
            store.cell_keys_mut()[i] = -1;
        }
        let live = 16 - dead;
        // live <= 15 < iend - istart, so merging must proceed
        let merger = VranicMerger::new(&species_config([1, 1, 1], 15)).unwrap();
        let mut scratch = MergeScratch::default();
        merger.merge(&mut store, 0, 16, &mut scratch).unwrap();

        let now_dead = (0..16).filter(|&i| !store.is_alive(i)).count();
        prop_assert_eq!(now_dead, dead + (live / 4) * 2,
            "single bin of {} live particles must retire floor(live/4)·2 more", live);
    }

    /// The merger touches only the requested sub-range.
    #[test]
    fn merger_respects_range(
        momenta in momentum_strategy(30),
        weights in weight_strategy(30),
    ) {
        let mut store = population(&momenta, &weights, false);
        let merger = VranicMerger::new(&species_config([2, 2, 2], 0)).unwrap();
        let mut scratch = MergeScratch::default();
        merger.merge(&mut store, 10, 30, &mut scratch).unwrap();

        for i in 0..10 {
            prop_assert!(store.is_alive(i));
            prop_assert_eq!(store.momentum(0)[i], momenta[i][0]);
            prop_assert_eq!(store.weight()[i], weights[i]);
        }
    }

    /// After any Monte-Carlo invocation every live optical depth is either
    /// non-positive (nothing pending) or strictly above the arming epsilon.
    #[test]
    fn radiation_tau_never_in_dead_band(
        momenta in momentum_strategy(24),
        weights in weight_strategy(24),
        e_field in 500.0f64..5000.0,
        seed in any::<u64>(),
    ) {
        let (tables, norm) = tables();
        let mut store = population(&momenta, &weights, true);
        let n = store.len();
        let mut fields = FieldSamples::zeros(n);
        for k in 0..n {
            fields.e_component_mut(1)[k] = e_field;
        }
        let mut kernel = RadiationMonteCarlo::new(&species_config([5, 5, 5], 0)).unwrap();
        let mut rng = CpuRng::seeded(seed);
        kernel.run(&mut store, &fields, &tables, &norm, 0, n, 0, &mut rng).unwrap();

        for i in 0..n {
            let tau = store.tau().unwrap()[i];
            prop_assert!(tau <= 0.0 || tau > EPSILON_TAU, "tau[{i}] = {tau}");
        }
    }

    /// Post-pass guarantee: chi equals the helper evaluated on the final
    /// momenta and the provided fields.
    #[test]
    fn radiation_chi_post_pass_matches(
        momenta in momentum_strategy(16),
        weights in weight_strategy(16),
        e_field in 0.0f64..3000.0,
        seed in any::<u64>(),
    ) {
        let (tables, norm) = tables();
        let mut store = population(&momenta, &weights, true);
        let n = store.len();
        let mut fields = FieldSamples::zeros(n);
        for k in 0..n {
            fields.e_component_mut(0)[k] = 0.4 * e_field;
            fields.e_component_mut(2)[k] = -e_field;
            fields.b_component_mut(1)[k] = 0.1 * e_field;
        }
        let mut kernel = RadiationMonteCarlo::new(&species_config([5, 5, 5], 0)).unwrap();
        let mut rng = CpuRng::seeded(seed);
        kernel.run(&mut store, &fields, &tables, &norm, 0, n, 0, &mut rng).unwrap();

        for i in 0..n {
            let (px, py, pz) = (
                store.momentum(0)[i],
                store.momentum(1)[i],
                store.momentum(2)[i],
            );
            let gamma = lorentz_gamma(px, py, pz);
            let expected = compute_particle_chi(
                -1.0, px, py, pz, gamma,
                fields.e_component(0)[i], fields.e_component(1)[i], fields.e_component(2)[i],
                fields.b_component(0)[i], fields.b_component(1)[i], fields.b_component(2)[i],
                norm.inv_norm_e_schwinger,
            );
            let got = store.chi().unwrap()[i];
            prop_assert!((got - expected).abs() <= 1e-12 * expected.max(1e-30),
                "chi[{i}] = {got}, recomputed {expected}");
        }
    }

    /// Continuous drag rescales momentum by a positive factor below one and
    /// keeps its direction.
    #[test]
    fn continuous_mode_preserves_direction(
        momenta in fast_momentum_strategy(16),
        weights in weight_strategy(16),
        e_field in 100.0f64..400.0,
    ) {
        let (tables, norm) = tables();
        let mut store = population(&momenta, &weights, false);
        let n = store.len();
        let mut fields = FieldSamples::zeros(n);
        for k in 0..n {
            fields.e_component_mut(1)[k] = e_field;
        }
        let mut config = species_config([5, 5, 5], 0);
        config.radiation_model = "cll".to_string();
        let kernel = CorrectedLandauLifshitz::new(&config).unwrap();
        kernel.run(&mut store, &fields, &tables, &norm, 0, n, 0).unwrap();

        for i in 0..n {
            let before = momenta[i];
            let after = [
                store.momentum(0)[i],
                store.momentum(1)[i],
                store.momentum(2)[i],
            ];
            let norm_before =
                (before[0].powi(2) + before[1].powi(2) + before[2].powi(2)).sqrt();
            if norm_before < 1e-12 {
                continue;
            }
            let norm_after = (after[0].powi(2) + after[1].powi(2) + after[2].powi(2)).sqrt();
            let scale = norm_after / norm_before;
            prop_assert!(scale > 0.0 && scale <= 1.0 + 1e-12, "scale = {scale}");
            // collinearity: cross product vanishes relative to the norms
            let cross = [
                before[1] * after[2] - before[2] * after[1],
                before[2] * after[0] - before[0] * after[2],
                before[0] * after[1] - before[1] * after[0],
            ];
            for c in cross {
                prop_assert!(c.abs() <= 1e-9 * norm_before * norm_after.max(1e-30),
                    "momentum rotated: cross = {c}");
            }
        }
    }

    /// A discontinuous emission with sampling S stages exactly S photons of
    /// weight w/S each.
    #[test]
    fn macro_photon_multiplicity(sampling in 1u32..6, weight in 0.5f64..4.0) {
        let (tables, norm) = tables();
        let mut config = species_config([5, 5, 5], 0);
        config.radiation_photon_sampling = sampling;
        config.radiation_photon_gamma_threshold = 0.0;
        config.max_monte_carlo_iterations = 1;
        // long step: the drawn optical depth always runs out inside dt
        config.dt = 10.0;

        let px = (100.0f64 - 1.0).sqrt(); // γ = 10
        let mut store = population(&[[px, 0.0, 0.0]], &[weight], true);
        store.charge_mut()[0] = 1;
        let mut fields = FieldSamples::zeros(1);
        // χ = 2 · chi_discontinuous_min forces the discrete branch
        fields.e_component_mut(1)[0] = 2e-2 / (10.0 * norm.inv_norm_e_schwinger);

        let mut kernel = RadiationMonteCarlo::new(&config).unwrap();
        kernel.attach_photon_sink(PhotonSink {
            has_quantum_parameter: true,
            has_monte_carlo: true,
        }).unwrap();
        let mut rng = CpuRng::seeded(2024);
        kernel.run(&mut store, &fields, &tables, &norm, 0, 1, 0, &mut rng).unwrap();

        let photons = kernel.take_new_photons().unwrap();
        prop_assert_eq!(photons.len(), sampling as usize);
        for i in 0..photons.len() {
            prop_assert!((photons.weight()[i] - weight / sampling as f64).abs() < 1e-12);
            prop_assert_eq!(photons.charge()[i], 0);
        }
    }

    /// Table queries are total: any positive χ and any u produce a finite,
    /// positive photon χ no larger than the (clamped) particle χ.
    #[test]
    fn photon_chi_sampling_is_total(
        chi in 1e-6f64..1e4,
        u in -0.5f64..1.5,
    ) {
        let (tables, _) = tables();
        let photon_chi = tables.random_photon_chi(chi, u);
        prop_assert!(photon_chi.is_finite() && photon_chi > 0.0);
        let clamped = chi.clamp(1e-4, 1e2);
        prop_assert!(photon_chi <= clamped * (1.0 + 1e-10));
    }
}
