//! Deterministic RNG wrapper and splittable key streams.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Deterministic RNG handle exposed to mhmc consumers.
///
/// The handle is a thin wrapper around `StdRng`. It is only ever obtained by
/// consuming an [`RngKey`], so every handle corresponds to exactly one
/// position in the key tree.
#[derive(Debug)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a raw seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Splittable random key.
///
/// A key is neither `Clone` nor `Copy`: splitting or turning it into an
/// [`RngHandle`] consumes it, so the same stream cannot be handed to two
/// consumers. Children are derived by hashing `(seed, stream id)` with
/// SipHash-1-3 under fixed zero keys, which is stable across platforms.
#[derive(Debug, PartialEq, Eq)]
pub struct RngKey {
    seed: u64,
}

impl RngKey {
    /// Creates the master key of a session.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Consumes the key and returns two independent children.
    pub fn split(self) -> (RngKey, RngKey) {
        (self.derive(0), self.derive(1))
    }

    /// Consumes the key and returns three independent children.
    pub fn split3(self) -> (RngKey, RngKey, RngKey) {
        (self.derive(0), self.derive(1), self.derive(2))
    }

    /// Consumes the key and returns `n` independent children.
    pub fn split_n(self, n: usize) -> Vec<RngKey> {
        (0..n as u64).map(|stream| self.derive(stream)).collect()
    }

    /// Consumes the key and returns the generator it seeds.
    pub fn into_rng(self) -> RngHandle {
        RngHandle::from_seed(derive_substream_seed(self.seed, u64::MAX))
    }

    /// Runs `f` with the second child of a split and keeps the first one.
    ///
    /// The key is only replaced when `f` succeeds. After an error it is left
    /// as it was, so a retry hands `f` the same child again and reproduces
    /// the run that would have happened without the failure.
    pub fn advance_with<T, E>(
        &mut self,
        f: impl FnOnce(RngKey) -> Result<T, E>,
    ) -> Result<T, E> {
        let (carry, work) = (self.derive(0), self.derive(1));
        let value = f(work)?;
        *self = carry;
        Ok(value)
    }

    /// Chains `steps` calls of [`advance_with`](Self::advance_with) and
    /// commits only if every step succeeds.
    ///
    /// `f` receives the step index and that step's work key.
    pub fn try_steps<E>(
        &mut self,
        steps: usize,
        mut f: impl FnMut(usize, RngKey) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut carry = RngKey { seed: self.seed };
        for step in 0..steps {
            let (next, work) = carry.split();
            f(step, work)?;
            carry = next;
        }
        *self = carry;
        Ok(())
    }

    /// Raw seed of the key, for diagnostics and fingerprints.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn derive(&self, stream: u64) -> RngKey {
        RngKey {
            seed: derive_substream_seed(self.seed, stream),
        }
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
