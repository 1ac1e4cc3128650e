// ─────────────────────────────────────────────────────────────────────
// SCPN Kinetic Core — Vranic Merging
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Momentum-space particle merging after Vranic et al., CPC 191 (2015).
//!
//! The population of one cell is binned on a spherical discretization of
//! momentum space (|p|, θ, φ). In every bin, packets of four macro-particles
//! are coalesced into two so that total weight, total momentum and total
//! energy are conserved; the two replaced particles are tagged dead through
//! `cell_keys` and compacted later by the caller.

use kinetic_types::config::SpeciesConfig;
use kinetic_types::error::KineticResult;
use kinetic_types::particles::{ParticleStore, DEAD_CELL_KEY};

/// Axes whose spread falls below this collapse to a single bin.
const AXIS_COLLAPSE_EPS: f64 = 1e-10;

/// Reusable per-thread scratch for one merger invocation.
///
/// Sized once at kernel entry; nothing allocates inside the binning or
/// merging loops.
#[derive(Debug, Default)]
pub struct MergeScratch {
    live: Vec<u32>,
    theta: Vec<f64>,
    phi: Vec<f64>,
    cell_index: Vec<u32>,
    sorted: Vec<u32>,
    count: Vec<u32>,
    first: Vec<u32>,
    cell_vec_x: Vec<f64>,
    cell_vec_y: Vec<f64>,
    cell_vec_z: Vec<f64>,
}

pub struct VranicMerger {
    ppc_min_threshold: usize,
    dimensions: [usize; 3],
}

/// Orthonormal pair perpendicular to the unit vector `v`, seeded from its
/// smallest component.
fn perpendicular_basis(v: [f64; 3]) -> ([f64; 3], [f64; 3]) {
    let seed = if v[0].abs() <= v[1].abs() && v[0].abs() <= v[2].abs() {
        [1.0, 0.0, 0.0]
    } else if v[1].abs() <= v[2].abs() {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    let raw = [
        seed[1] * v[2] - seed[2] * v[1],
        seed[2] * v[0] - seed[0] * v[2],
        seed[0] * v[1] - seed[1] * v[0],
    ];
    let norm = (raw[0] * raw[0] + raw[1] * raw[1] + raw[2] * raw[2])
        .sqrt()
        .max(1e-30);
    let e1 = [raw[0] / norm, raw[1] / norm, raw[2] / norm];
    let e2 = [
        v[1] * e1[2] - v[2] * e1[1],
        v[2] * e1[0] - v[0] * e1[2],
        v[0] * e1[1] - v[1] * e1[0],
    ];
    (e1, e2)
}

impl VranicMerger {
    pub fn new(config: &SpeciesConfig) -> KineticResult<Self> {
        config.validate()?;
        Ok(VranicMerger {
            ppc_min_threshold: config.merging_ppc_min_threshold,
            dimensions: config.merging_momentum_cells,
        })
    }

    /// Merge the live particles of `[istart, iend)` in place.
    pub fn merge(
        &self,
        particles: &mut ParticleStore,
        istart: usize,
        iend: usize,
        scratch: &mut MergeScratch,
    ) -> KineticResult<()> {
        particles.check_range(istart, iend)?;

        // enough particles in the cell to attempt merging at all
        if iend - istart <= self.ppc_min_threshold {
            return Ok(());
        }

        let view = particles.view_mut();
        let [px, py, pz] = view.momentum;
        let weight = view.weight;
        let cell_keys = view.cell_keys;

        scratch.live.clear();
        for ipart in istart..iend {
            if cell_keys[ipart] != DEAD_CELL_KEY {
                scratch.live.push(ipart as u32);
            }
        }
        let n = scratch.live.len();
        // nothing to bin; packets need four live particles each, which the
        // per-bin count check below already enforces
        if n == 0 {
            return Ok(());
        }

        let mut dims = self.dimensions;

        scratch.theta.resize(n, 0.0);
        scratch.phi.resize(n, 0.0);
        scratch.cell_index.resize(n, 0);
        scratch.sorted.resize(n, 0);

        // ________________________________________________
        // First step: momentum norms, angles, extrema

        let mut mr_min = f64::INFINITY;
        let mut mr_max = f64::NEG_INFINITY;
        let mut theta_min = f64::INFINITY;
        let mut theta_max = f64::NEG_INFINITY;
        let mut phi_min = f64::INFINITY;
        let mut phi_max = f64::NEG_INFINITY;

        for (k, &ip) in scratch.live.iter().enumerate() {
            let ipart = ip as usize;
            let momentum_norm =
                (px[ipart] * px[ipart] + py[ipart] * py[ipart] + pz[ipart] * pz[ipart]).sqrt();
            let theta = py[ipart].atan2(px[ipart]);
            let phi = if momentum_norm > 0.0 {
                (pz[ipart] / momentum_norm).clamp(-1.0, 1.0).asin()
            } else {
                0.0
            };
            scratch.theta[k] = theta;
            scratch.phi[k] = phi;
            mr_min = mr_min.min(momentum_norm);
            mr_max = mr_max.max(momentum_norm);
            theta_min = theta_min.min(theta);
            theta_max = theta_max.max(theta);
            phi_min = phi_min.min(phi);
            phi_max = phi_max.max(phi);
        }

        // extra margin so the maxima land inside the last bin
        mr_max += (mr_max - mr_min) * 0.01;
        theta_max += (theta_max - theta_min) * 0.01;
        phi_max += (phi_max - phi_min) * 0.01;

        // __________________________________________________________
        // Second step: discretization steps, degenerate-axis collapse

        let mut mr_delta = (mr_max - mr_min) / dims[0] as f64;
        let mut theta_delta = (theta_max - theta_min) / dims[1] as f64;
        let mut phi_delta = (phi_max - phi_min) / dims[2] as f64;

        if mr_delta < AXIS_COLLAPSE_EPS {
            mr_delta = 0.0;
            dims[0] = 1;
        }
        if theta_delta < AXIS_COLLAPSE_EPS {
            theta_delta = 0.0;
            dims[1] = 1;
        }
        if phi_delta < AXIS_COLLAPSE_EPS {
            phi_delta = 0.0;
            dims[2] = 1;
        }

        let momentum_cells = dims[0] * dims[1] * dims[2];
        let momentum_angular_cells = dims[1] * dims[2];

        let inv_mr_delta = if mr_delta > 0.0 { 1.0 / mr_delta } else { 0.0 };
        let inv_theta_delta = if theta_delta > 0.0 {
            1.0 / theta_delta
        } else {
            0.0
        };
        let inv_phi_delta = if phi_delta > 0.0 { 1.0 / phi_delta } else { 0.0 };

        // bin-centre direction unit vectors ("d" in Vranic et al.)
        scratch.cell_vec_x.resize(momentum_angular_cells, 0.0);
        scratch.cell_vec_y.resize(momentum_angular_cells, 0.0);
        scratch.cell_vec_z.resize(momentum_angular_cells, 0.0);
        for theta_i in 0..dims[1] {
            for phi_i in 0..dims[2] {
                let icc = theta_i * dims[2] + phi_i;
                let theta = theta_min + (theta_i as f64 + 0.5) * theta_delta;
                let phi = phi_min + (phi_i as f64 + 0.5) * phi_delta;
                scratch.cell_vec_x[icc] = phi.cos() * theta.cos();
                scratch.cell_vec_y[icc] = phi.cos() * theta.sin();
                scratch.cell_vec_z[icc] = phi.sin();
            }
        }

        // ___________________________________________________________
        // Third step: flattened 3-D bin key per particle

        for (k, &ip) in scratch.live.iter().enumerate() {
            let ipart = ip as usize;
            let momentum_norm =
                (px[ipart] * px[ipart] + py[ipart] * py[ipart] + pz[ipart] * pz[ipart]).sqrt();
            let mr_i = (((momentum_norm - mr_min) * inv_mr_delta) as usize).min(dims[0] - 1);
            let theta_i =
                (((scratch.theta[k] - theta_min) * inv_theta_delta) as usize).min(dims[1] - 1);
            let phi_i = (((scratch.phi[k] - phi_min) * inv_phi_delta) as usize).min(dims[2] - 1);
            scratch.cell_index[k] =
                (mr_i * momentum_angular_cells + theta_i * dims[2] + phi_i) as u32;
        }

        // ___________________________________________________________
        // Fourth step: stable counting sort by bin

        scratch.count.clear();
        scratch.count.resize(momentum_cells, 0);
        scratch.first.clear();
        scratch.first.resize(momentum_cells, 0);

        for k in 0..n {
            scratch.count[scratch.cell_index[k] as usize] += 1;
        }
        let mut offset = 0u32;
        for ic in 0..momentum_cells {
            scratch.first[ic] = offset;
            offset += scratch.count[ic];
            scratch.count[ic] = 0;
        }
        for k in 0..n {
            let ic = scratch.cell_index[k] as usize;
            scratch.sorted[(scratch.first[ic] + scratch.count[ic]) as usize] = scratch.live[k];
            scratch.count[ic] += 1;
        }

        // ___________________________________________________________
        // Fifth step: merge packets of four per bin

        for mr_i in 0..dims[0] {
            for theta_i in 0..dims[1] {
                for phi_i in 0..dims[2] {
                    let icc = theta_i * dims[2] + phi_i;
                    let ic = mr_i * momentum_angular_cells + icc;
                    if scratch.count[ic] < 4 {
                        continue;
                    }
                    let npack = (scratch.count[ic] / 4) as usize;
                    let first = scratch.first[ic] as usize;

                    for ipack in 0..npack {
                        let mut total_weight = 0.0;
                        let mut total_momentum = [0.0_f64; 3];
                        let mut total_energy = 0.0;

                        for ip in ipack * 4..ipack * 4 + 4 {
                            let ipart = scratch.sorted[first + ip] as usize;
                            let w = weight[ipart];
                            total_weight += w;
                            total_momentum[0] += px[ipart] * w;
                            total_momentum[1] += py[ipart] * w;
                            total_momentum[2] += pz[ipart] * w;
                            total_energy += w
                                * (1.0
                                    + px[ipart] * px[ipart]
                                    + py[ipart] * py[ipart]
                                    + pz[ipart] * pz[ipart])
                                    .sqrt();
                        }

                        // \varepsilon_a and p_a in Vranic et al.
                        let new_energy = total_energy / total_weight;
                        let new_momentum_norm = (new_energy * new_energy - 1.0).max(0.0).sqrt();
                        let total_momentum_norm = (total_momentum[0] * total_momentum[0]
                            + total_momentum[1] * total_momentum[1]
                            + total_momentum[2] * total_momentum[2])
                            .sqrt();

                        let ia = scratch.sorted[first + ipack * 4] as usize;
                        let ib = scratch.sorted[first + ipack * 4 + 1] as usize;

                        if new_momentum_norm <= 1e-15 {
                            // four particles at rest merge into two at rest
                            for &ipart in &[ia, ib] {
                                px[ipart] = 0.0;
                                py[ipart] = 0.0;
                                pz[ipart] = 0.0;
                                weight[ipart] = 0.5 * total_weight;
                            }
                        } else {
                            let denom = total_weight * new_momentum_norm;
                            let cos_omega = (total_momentum_norm / denom).clamp(-1.0, 1.0);
                            let sin_omega = (1.0 - cos_omega * cos_omega).max(0.0).sqrt();

                            let (e1, e2) = if total_momentum_norm <= 1e-15 * denom {
                                // packet momentum cancels; split along the
                                // bin direction
                                let d = [
                                    scratch.cell_vec_x[icc],
                                    scratch.cell_vec_y[icc],
                                    scratch.cell_vec_z[icc],
                                ];
                                (d, d)
                            } else {
                                let e1 = [
                                    total_momentum[0] / total_momentum_norm,
                                    total_momentum[1] / total_momentum_norm,
                                    total_momentum[2] / total_momentum_norm,
                                ];
                                // e2 = e1 × (e1 × d), expanded
                                let dx = scratch.cell_vec_x[icc];
                                let dy = scratch.cell_vec_y[icc];
                                let dz = scratch.cell_vec_z[icc];
                                let mut e2 = [
                                    e1[1] * e1[1] * dx - e1[0] * (e1[1] * dy + e1[2] * dz)
                                        + e1[2] * e1[2] * dx,
                                    e1[2] * e1[2] * dy - e1[1] * (e1[2] * dz + e1[0] * dx)
                                        + e1[0] * e1[0] * dy,
                                    e1[0] * e1[0] * dz - e1[2] * (e1[0] * dx + e1[1] * dy)
                                        + e1[1] * e1[1] * dz,
                                ];
                                let e2_norm =
                                    (e2[0] * e2[0] + e2[1] * e2[1] + e2[2] * e2[2]).sqrt();
                                if e2_norm > AXIS_COLLAPSE_EPS {
                                    e2 = [e2[0] / e2_norm, e2[1] / e2_norm, e2[2] / e2_norm];
                                } else {
                                    // d parallel to e1: any perpendicular
                                    // direction closes the parallelogram
                                    let (f1, _) = perpendicular_basis(e1);
                                    e2 = f1;
                                }
                                (e1, e2)
                            };

                            // survivors at the two bisecting directions
                            px[ia] = new_momentum_norm * (cos_omega * e1[0] + sin_omega * e2[0]);
                            py[ia] = new_momentum_norm * (cos_omega * e1[1] + sin_omega * e2[1]);
                            pz[ia] = new_momentum_norm * (cos_omega * e1[2] + sin_omega * e2[2]);
                            weight[ia] = 0.5 * total_weight;

                            px[ib] = new_momentum_norm * (cos_omega * e1[0] - sin_omega * e2[0]);
                            py[ib] = new_momentum_norm * (cos_omega * e1[1] - sin_omega * e2[1]);
                            pz[ib] = new_momentum_norm * (cos_omega * e1[2] - sin_omega * e2[2]);
                            weight[ib] = 0.5 * total_weight;
                        }

                        // the other two are tagged for removal
                        for ip in ipack * 4 + 2..ipack * 4 + 4 {
                            let ipart = scratch.sorted[first + ip] as usize;
                            cell_keys[ipart] = DEAD_CELL_KEY;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
