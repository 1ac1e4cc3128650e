//! Lorentz factor and quantum-parameter helpers shared by the radiation
//! models, plus the vectorized χ refresh that closes every kernel call.

use kinetic_types::config::Normalization;
use kinetic_types::error::{KineticError, KineticResult};
use kinetic_types::fields::FieldSamples;
use kinetic_types::particles::ParticleStore;
use rayon::prelude::*;

/// γ = √(1 + p·p) with momenta in units of m·c.
#[inline]
pub fn lorentz_gamma(px: f64, py: f64, pz: f64) -> f64 {
    (1.0 + px * px + py * py + pz * pz).sqrt()
}

/// Lorentz-invariant quantum parameter of a charged particle.
///
/// χ = |q|/m² · 1/E_s · √| (E·p)² − (γE − p×B)² |
///
/// with all quantities in normalized units. The absolute value under the
/// root absorbs the round-off sign of the invariant for near-crossed
/// fields.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn compute_particle_chi(
    charge_over_mass_square: f64,
    px: f64,
    py: f64,
    pz: f64,
    gamma: f64,
    ex: f64,
    ey: f64,
    ez: f64,
    bx: f64,
    by: f64,
    bz: f64,
    inv_norm_e_schwinger: f64,
) -> f64 {
    charge_over_mass_square.abs()
        * inv_norm_e_schwinger
        * ((ex * px + ey * py + ez * pz).powi(2)
            - (gamma * ex - (py * bz - pz * by)).powi(2)
            - (gamma * ey - (pz * bx - px * bz)).powi(2)
            - (gamma * ez - (px * by - py * bx)).powi(2))
        .abs()
        .sqrt()
}

/// Check that the field buffers cover `[istart, iend)` shifted by
/// `ipart_ref`, and hand back the six component slices.
pub(crate) fn field_components<'a>(
    fields: &'a FieldSamples,
    istart: usize,
    iend: usize,
    ipart_ref: usize,
) -> KineticResult<[&'a [f64]; 6]> {
    if istart < ipart_ref || iend < ipart_ref || iend - ipart_ref > fields.nparts() {
        return Err(KineticError::PhysicsViolation(format!(
            "field samples cover {} particles, need [{istart}, {iend}) with ipart_ref={ipart_ref}",
            fields.nparts()
        )));
    }
    Ok([
        fields.e_component(0),
        fields.e_component(1),
        fields.e_component(2),
        fields.b_component(0),
        fields.b_component(1),
        fields.b_component(2),
    ])
}

/// Recompute `chi[i]` for every live particle of the range from the current
/// momenta and the interpolated fields.
///
/// Pure per-particle work, run on the rayon pool; every radiation kernel
/// finishes with this pass so downstream diagnostics see a consistent χ.
pub fn update_chi_range(
    particles: &mut ParticleStore,
    fields: &FieldSamples,
    istart: usize,
    iend: usize,
    ipart_ref: usize,
    one_over_mass: f64,
    norm: &Normalization,
) -> KineticResult<()> {
    particles.check_range(istart, iend)?;
    let [ex, ey, ez, bx, by, bz] = field_components(fields, istart, iend, ipart_ref)?;

    let one_over_mass_square = one_over_mass * one_over_mass;
    let inv_norm_e_schwinger = norm.inv_norm_e_schwinger;

    let view = particles.view_mut();
    let chi = view.chi.ok_or_else(|| {
        KineticError::PhysicsViolation(
            "chi refresh requires the quantum-parameter column".to_string(),
        )
    })?;
    let [px, py, pz] = view.momentum;
    let px: &[f64] = px;
    let py: &[f64] = py;
    let pz: &[f64] = pz;
    let charge = view.charge;
    let cell_keys: &[i32] = view.cell_keys;

    chi[istart..iend]
        .par_iter_mut()
        .enumerate()
        .for_each(|(k, chi_i)| {
            let i = istart + k;
            if cell_keys[i] < 0 {
                return;
            }
            let j = i - ipart_ref;
            let gamma = lorentz_gamma(px[i], py[i], pz[i]);
            *chi_i = compute_particle_chi(
                charge[i] as f64 * one_over_mass_square,
                px[i],
                py[i],
                pz[i],
                gamma,
                ex[j],
                ey[j],
                ez[j],
                bx[j],
                by[j],
                bz[j],
                inv_norm_e_schwinger,
            );
        });
    Ok(())
}
