use mhmc_core::{Batch, RngKey};
use sha2::{Digest, Sha256};

/// Everything a sampler session carries between sweeps.
///
/// Only the owning [`MetropolisSampler`](crate::MetropolisSampler) mutates a
/// state, and it does so by committing a fully computed replacement: a failed
/// `reset` or `advance` leaves every field as it was.
#[derive(Debug)]
pub struct ChainState<S> {
    pub(crate) sigma: Batch,
    pub(crate) rng: RngKey,
    pub(crate) rule_state: S,
    pub(crate) n_samples: u64,
    pub(crate) n_accepted: u64,
}

impl<S> ChainState<S> {
    /// Current configurations, one row per chain.
    pub fn configurations(&self) -> &Batch {
        &self.sigma
    }

    /// Auxiliary state owned by the transition rule.
    pub fn rule_state(&self) -> &S {
        &self.rule_state
    }

    /// Moves attempted since the last reset.
    pub fn n_samples(&self) -> u64 {
        self.n_samples
    }

    /// Moves accepted since the last reset.
    pub fn n_accepted(&self) -> u64 {
        self.n_accepted
    }

    /// Fraction of accepted moves, `None` before the first move.
    pub fn acceptance(&self) -> Option<f64> {
        if self.n_samples == 0 {
            None
        } else {
            Some(self.n_accepted as f64 / self.n_samples as f64)
        }
    }

    /// SHA-256 over configurations, key and counters.
    ///
    /// Two states with equal fingerprints produce identical futures under the
    /// same sampler, machine and parameters.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        self.sigma.hash_into(&mut hasher);
        hasher.update(self.rng.seed().to_le_bytes());
        hasher.update(self.n_samples.to_le_bytes());
        hasher.update(self.n_accepted.to_le_bytes());
        format!("{:x}", hasher.finalize())
    }
}
