// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Random Sources
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Uniform random sources behind one capability trait.
//!
//! The Monte-Carlo kernel never talks to a concrete generator. On the host
//! it draws from a thread-local style [`CpuRng`]; on accelerators the same
//! draws come from a per-particle stream bootstrapped by a linear
//! congruential scramble of the particle index, so that lanes need no shared
//! generator state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Capability consumed by the stochastic kernels: uniform deviates in [0, 1).
pub trait UniformSource {
    fn uniform(&mut self) -> f64;
}

/// Host-side generator, one per worker thread.
pub struct CpuRng {
    rng: SmallRng,
}

impl CpuRng {
    pub fn seeded(seed: u64) -> Self {
        CpuRng {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        CpuRng {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl UniformSource for CpuRng {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

const LCG_A: u64 = 1664525;
const LCG_C: u64 = 1013904223;
const LCG_M: u64 = 1 << 32;

/// Per-particle stream in the accelerator style.
///
/// Each draw scrambles `(ipart + 1) · (seed + 1)` through the LCG
/// `s ← (1664525·s + 1013904223) mod 2³²`, expands the result into a device
/// generator state, and the produced uniform replaces the stored seed for
/// the next draw.
pub struct ParticleLcg {
    particle_index: u64,
    seed: f64,
}

impl ParticleLcg {
    /// `initial_seed` is one host uniform in [0, 1) shared by the whole
    /// kernel invocation; `particle_index` decorrelates the lanes.
    pub fn new(initial_seed: f64, particle_index: usize) -> Self {
        ParticleLcg {
            particle_index: particle_index as u64,
            seed: initial_seed.clamp(0.0, 1.0),
        }
    }
}

fn xorshift_uniform(state: &mut u64) -> f64 {
    let mut s = *state;
    s ^= s << 13;
    s ^= s >> 7;
    s ^= s << 17;
    *state = s;
    (s >> 11) as f64 / (1u64 << 53) as f64
}

impl UniformSource for ParticleLcg {
    fn uniform(&mut self) -> f64 {
        let input = ((self.particle_index + 1) as f64) * (self.seed + 1.0);
        // low mantissa bits keep the fractional seed alive for small indices
        let mut s = input.to_bits() % LCG_M;
        s = (LCG_A.wrapping_mul(s).wrapping_add(LCG_C)) % LCG_M;
        // expand the 32-bit LCG state into the 64-bit device generator
        let mut state = (s << 32) | (s ^ 0x9e37_79b9);
        if state == 0 {
            state = 1;
        }
        let u = xorshift_uniform(&mut state);
        self.seed = u;
        u
    }
}

/// Inverse error function, piecewise polynomial fit.
///
/// Accurate to a few 1e-7 over (-1, 1); good enough to shape the Gaussian
/// kicks of the diffusive radiation operator while staying branch-light for
/// vectorized loops.
pub fn erfinv(x: f64) -> f64 {
    let mut w = -((1.0 - x) * (1.0 + x)).ln();
    let mut p;
    if w < 5.0 {
        w -= 2.5;
        p = 2.81022636e-08;
        p = 3.43273939e-07 + p * w;
        p = -3.52338770e-06 + p * w;
        p = -4.39150654e-06 + p * w;
        p = 0.00021858087 + p * w;
        p = -0.00125372503 + p * w;
        p = -0.00417768164 + p * w;
        p = 0.246640727 + p * w;
        p = 1.50140941 + p * w;
    } else {
        w = w.sqrt() - 3.0;
        p = -0.000200214257;
        p = 0.000100950558 + p * w;
        p = 0.00134934322 + p * w;
        p = -0.00367342844 + p * w;
        p = 0.00573950773 + p * w;
        p = -0.0076224613 + p * w;
        p = 0.00943887047 + p * w;
        p = 1.00167406 + p * w;
        p = 2.83297682 + p * w;
    }
    p * x
}

/// Standard normal deviate from one symmetric uniform.
pub fn sample_normal(rng: &mut dyn UniformSource) -> f64 {
    // keep the argument strictly inside (-1, 1); u = 0 would map to -1
    let w = (2.0 * rng.uniform() - 1.0).clamp(-1.0 + f64::EPSILON, 1.0 - f64::EPSILON);
    erfinv(w) * std::f64::consts::SQRT_2
}
