//! Structure-of-arrays macro-particle store.
//!
//! The kernels address one species population as parallel typed columns so
//! that their inner loops read and write contiguous memory. The store owns
//! the columns but carries no physics; pushers and kernels mutate it through
//! [`ParticleViewMut`].

use crate::error::{KineticError, KineticResult};

/// Cell key marking a particle as removed.
pub const DEAD_CELL_KEY: i32 = -1;

/// One species population in structure-of-arrays layout.
///
/// Every column has the same length; index `i` identifies one macro-particle
/// across all columns. The `chi` and `tau` columns exist only for species
/// whose radiation model needs them.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    ndim: usize,
    position: Vec<Vec<f64>>,
    momentum: [Vec<f64>; 3],
    weight: Vec<f64>,
    charge: Vec<i16>,
    chi: Option<Vec<f64>>,
    tau: Option<Vec<f64>>,
    cell_keys: Vec<i32>,
}

/// Split mutable borrow of the store columns.
///
/// Kernels take this once at entry so that momentum, weight, optical depth
/// and cell keys can be updated in the same loop without aliasing.
pub struct ParticleViewMut<'a> {
    pub ndim: usize,
    pub position: &'a [Vec<f64>],
    pub momentum: [&'a mut [f64]; 3],
    pub weight: &'a mut [f64],
    pub charge: &'a [i16],
    pub chi: Option<&'a mut [f64]>,
    pub tau: Option<&'a mut [f64]>,
    pub cell_keys: &'a mut [i32],
}

impl ParticleStore {
    pub fn new(ndim: usize, has_quantum_parameter: bool, has_monte_carlo: bool) -> KineticResult<Self> {
        if !(1..=3).contains(&ndim) {
            return Err(KineticError::ConfigError(format!(
                "particle store ndim must be 1, 2 or 3, got {ndim}"
            )));
        }
        Ok(ParticleStore {
            ndim,
            position: vec![Vec::new(); ndim],
            momentum: [Vec::new(), Vec::new(), Vec::new()],
            weight: Vec::new(),
            charge: Vec::new(),
            chi: has_quantum_parameter.then(Vec::new),
            tau: has_monte_carlo.then(Vec::new),
            cell_keys: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn has_quantum_parameter(&self) -> bool {
        self.chi.is_some()
    }

    pub fn has_monte_carlo(&self) -> bool {
        self.tau.is_some()
    }

    /// Append `n` zero-initialised slots to every column.
    ///
    /// New slots are alive (`cell_keys = 0`); `tau` starts at the -1
    /// "not set" sentinel. The caller fills in the physics.
    pub fn create_particles(&mut self, n: usize) {
        let new_len = self.len() + n;
        for column in self.position.iter_mut() {
            column.resize(new_len, 0.0);
        }
        for column in self.momentum.iter_mut() {
            column.resize(new_len, 0.0);
        }
        self.weight.resize(new_len, 0.0);
        self.charge.resize(new_len, 0);
        if let Some(chi) = self.chi.as_mut() {
            chi.resize(new_len, 0.0);
        }
        if let Some(tau) = self.tau.as_mut() {
            tau.resize(new_len, -1.0);
        }
        self.cell_keys.resize(new_len, 0);
    }

    pub fn position(&self, d: usize) -> &[f64] {
        &self.position[d]
    }

    pub fn position_mut(&mut self, d: usize) -> &mut [f64] {
        &mut self.position[d]
    }

    pub fn momentum(&self, d: usize) -> &[f64] {
        &self.momentum[d]
    }

    pub fn momentum_mut(&mut self, d: usize) -> &mut [f64] {
        &mut self.momentum[d]
    }

    pub fn weight(&self) -> &[f64] {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut [f64] {
        &mut self.weight
    }

    pub fn charge(&self) -> &[i16] {
        &self.charge
    }

    pub fn charge_mut(&mut self) -> &mut [i16] {
        &mut self.charge
    }

    pub fn chi(&self) -> Option<&[f64]> {
        self.chi.as_deref()
    }

    pub fn chi_mut(&mut self) -> Option<&mut [f64]> {
        self.chi.as_deref_mut()
    }

    pub fn tau(&self) -> Option<&[f64]> {
        self.tau.as_deref()
    }

    pub fn tau_mut(&mut self) -> Option<&mut [f64]> {
        self.tau.as_deref_mut()
    }

    pub fn cell_keys(&self) -> &[i32] {
        &self.cell_keys
    }

    pub fn cell_keys_mut(&mut self) -> &mut [i32] {
        &mut self.cell_keys
    }

    pub fn is_alive(&self, i: usize) -> bool {
        self.cell_keys[i] != DEAD_CELL_KEY
    }

    /// Split borrow over all columns for kernel inner loops.
    pub fn view_mut(&mut self) -> ParticleViewMut<'_> {
        let [mx, my, mz] = &mut self.momentum;
        ParticleViewMut {
            ndim: self.ndim,
            position: &self.position,
            momentum: [mx.as_mut_slice(), my.as_mut_slice(), mz.as_mut_slice()],
            weight: &mut self.weight,
            charge: &self.charge,
            chi: self.chi.as_deref_mut(),
            tau: self.tau.as_deref_mut(),
            cell_keys: &mut self.cell_keys,
        }
    }

    /// Check that `[istart, iend)` is a valid range of this store.
    pub fn check_range(&self, istart: usize, iend: usize) -> KineticResult<()> {
        if istart > iend || iend > self.len() {
            return Err(KineticError::RangeOutOfBounds {
                istart,
                iend,
                size: self.len(),
            });
        }
        Ok(())
    }
}
