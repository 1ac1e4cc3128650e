// -------------------------------------------------------------------------
// SCPN Kinetic Core -- Monte-Carlo Radiation Benchmark
// One radiation step over a cell of relativistic electrons in a strong
// transverse field, comparing the stochastic engine with and without
// macro-photon creation.
// -------------------------------------------------------------------------

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use kinetic_kernels::monte_carlo::{PhotonSink, RadiationMonteCarlo};
use kinetic_kernels::tables::{RadiationTableSet, RadiationTables};
use kinetic_math::interp::LogAxis;
use kinetic_math::rng::CpuRng;
use kinetic_types::config::{Normalization, SpeciesConfig};
use kinetic_types::fields::FieldSamples;
use kinetic_types::particles::ParticleStore;
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::hint::black_box;

const N_PARTICLES: usize = 2048;

fn make_config() -> SpeciesConfig {
    SpeciesConfig {
        name: "bench-electron".to_string(),
        ndim: 2,
        dt: 0.5,
        mass: 1.0,
        merging_method: "none".to_string(),
        merging_ppc_min_threshold: 0,
        merging_momentum_cells: [5, 5, 5],
        radiation_model: "mc".to_string(),
        radiation_photon_sampling: 1,
        radiation_photon_gamma_threshold: 2.0,
        max_monte_carlo_iterations: 100,
    }
}

fn make_tables(norm: &Normalization) -> RadiationTables {
    let n_chi = 128;
    let n_photon = 128;
    let axis = LogAxis::new(1e-4, 1e2, n_chi).expect("valid axis");
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
    RadiationTables::new(set, norm).expect("valid tables")
}

fn make_cell() -> (ParticleStore, FieldSamples) {
    let mut rng = SmallRng::seed_from_u64(4242);
    let thermal = Normal::new(0.0, 30.0).expect("valid normal");
    let mut store = ParticleStore::new(2, true, true).expect("valid store");
    store.create_particles(N_PARTICLES);
    let mut fields = FieldSamples::zeros(N_PARTICLES);
    for i in 0..N_PARTICLES {
        store.momentum_mut(0)[i] = 200.0 + thermal.sample(&mut rng);
        store.momentum_mut(1)[i] = thermal.sample(&mut rng);
        store.weight_mut()[i] = 1.0;
        store.charge_mut()[i] = -1;
        fields.e_component_mut(1)[i] = 3000.0;
        fields.b_component_mut(2)[i] = 1500.0;
    }
    (store, fields)
}

fn bench_radiation(c: &mut Criterion) {
    let norm = Normalization::from_reference_frequency(2.354e15).expect("valid frequency");
    let tables = make_tables(&norm);
    let (store, fields) = make_cell();

    let mut group = c.benchmark_group("radiation_mc");

    group.bench_function("scalar_accumulator", |b| {
        let mut kernel = RadiationMonteCarlo::new(&make_config()).expect("valid config");
        b.iter_batched(
            || (store.clone(), CpuRng::seeded(9)),
            |(mut cell, mut rng)| {
                let radiated = kernel
                    .run(
                        black_box(&mut cell),
                        &fields,
                        &tables,
                        &norm,
                        0,
                        N_PARTICLES,
                        0,
                        &mut rng,
                    )
                    .expect("radiation succeeds");
                (cell, radiated)
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("macro_photons", |b| {
        let mut kernel = RadiationMonteCarlo::new(&make_config()).expect("valid config");
        kernel
            .attach_photon_sink(PhotonSink {
                has_quantum_parameter: true,
                has_monte_carlo: true,
            })
            .expect("sink attaches");
        b.iter_batched(
            || (store.clone(), CpuRng::seeded(9)),
            |(mut cell, mut rng)| {
                kernel
                    .run(
                        black_box(&mut cell),
                        &fields,
                        &tables,
                        &norm,
                        0,
                        N_PARTICLES,
                        0,
                        &mut rng,
                    )
                    .expect("radiation succeeds");
                let photons = kernel.take_new_photons();
                (cell, photons)
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_radiation);
criterion_main!(benches);
