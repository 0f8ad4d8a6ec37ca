//! Configuration spaces the sampler draws from.

use rand::Rng;

use crate::batch::Batch;
use crate::dtype::Dtype;
use crate::errors::{ErrorInfo, SamplerError};
use crate::rng::RngHandle;

/// Describes a finite, discrete configuration space.
///
/// Implementations only need to provide [`size`](HilbertSpace::size) and
/// [`local_states`](HilbertSpace::local_states); uniform sampling and
/// membership checks are derived from them.
pub trait HilbertSpace: Send + Sync {
    /// Number of coordinates in a single configuration.
    fn size(&self) -> usize;

    /// Admissible values of coordinate `site`, without duplicates.
    fn local_states(&self, site: usize) -> &[f64];

    /// Draws `n` i.i.d. uniformly random configurations.
    fn random_state(&self, rng: &mut RngHandle, n: usize, dtype: Dtype) -> Batch {
        let dim = self.size();
        let mut batch = Batch::zeros(n, dim);
        for chain in 0..n {
            let row = batch.row_mut(chain);
            for (site, value) in row.iter_mut().enumerate() {
                let states = self.local_states(site);
                // an empty domain leaves the zero default in place
                if !states.is_empty() {
                    *value = dtype.cast(states[rng.gen_range(0..states.len())]);
                }
            }
        }
        batch
    }

    /// Whether every coordinate of `config` lies in its domain.
    fn contains(&self, config: &[f64]) -> bool {
        config.len() == self.size()
            && config
                .iter()
                .enumerate()
                .all(|(site, value)| self.local_states(site).contains(value))
    }
}

/// `n_sites` coordinates sharing one finite set of local values.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteHilbert {
    n_sites: usize,
    local_states: Vec<f64>,
}

impl DiscreteHilbert {
    /// Creates a space with the given sites and local values.
    ///
    /// Duplicated values are removed; values keep their first-seen order.
    pub fn new(n_sites: usize, local_states: Vec<f64>) -> Result<Self, SamplerError> {
        let mut unique: Vec<f64> = Vec::with_capacity(local_states.len());
        for value in local_states {
            if !value.is_finite() {
                return Err(SamplerError::Configuration(
                    ErrorInfo::new("non-finite-local-state", "local values must be finite")
                        .with_context("value", value.to_string()),
                ));
            }
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        if unique.is_empty() {
            return Err(SamplerError::Configuration(
                ErrorInfo::new("empty-local-states", "a site needs at least one local value")
                    .with_context("n_sites", n_sites.to_string()),
            ));
        }
        Ok(Self {
            n_sites,
            local_states: unique,
        })
    }

    /// Spin-1/2 sites with values `{-1, +1}`.
    pub fn spin_half(n_sites: usize) -> Self {
        Self {
            n_sites,
            local_states: vec![-1.0, 1.0],
        }
    }

    /// Qubit sites with values `{0, 1}`.
    pub fn qubits(n_sites: usize) -> Self {
        Self {
            n_sites,
            local_states: vec![0.0, 1.0],
        }
    }

    /// Bosonic modes with occupations `{0, ..., n_max}`.
    pub fn fock(n_max: u32, n_sites: usize) -> Self {
        Self {
            n_sites,
            local_states: (0..=n_max).map(f64::from).collect(),
        }
    }
}

impl HilbertSpace for DiscreteHilbert {
    fn size(&self) -> usize {
        self.n_sites
    }

    fn local_states(&self, _site: usize) -> &[f64] {
        &self.local_states
    }
}
