//! Contiguous batches of configurations.

use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, SamplerError};

/// Row-major `[n_chains, dim]` buffer holding one configuration per chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    data: Vec<f64>,
    n_chains: usize,
    dim: usize,
}

impl Batch {
    /// Creates a zero-filled batch.
    pub fn zeros(n_chains: usize, dim: usize) -> Self {
        Self {
            data: vec![0.0; n_chains * dim],
            n_chains,
            dim,
        }
    }

    /// Builds a batch from a flat row-major buffer.
    pub fn from_flat(n_chains: usize, dim: usize, data: Vec<f64>) -> Result<Self, SamplerError> {
        if data.len() != n_chains * dim {
            return Err(SamplerError::Configuration(
                ErrorInfo::new("shape-mismatch", "flat buffer does not match batch shape")
                    .with_context("expected", (n_chains * dim).to_string())
                    .with_context("actual", data.len().to_string()),
            ));
        }
        Ok(Self {
            data,
            n_chains,
            dim,
        })
    }

    /// Builds a batch from individual rows, which must share one length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, SamplerError> {
        let dim = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(SamplerError::Configuration(
                    ErrorInfo::new("ragged-rows", "all configurations must share one length")
                        .with_context("row", index.to_string())
                        .with_context("expected", dim.to_string())
                        .with_context("actual", row.len().to_string()),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            n_chains: rows.len(),
            dim,
        })
    }

    /// Number of chains (rows).
    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    /// Length of a single configuration (columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `(n_chains, dim)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_chains, self.dim)
    }

    /// Configuration of chain `chain`.
    ///
    /// # Panics
    ///
    /// Panics if `chain >= n_chains`.
    pub fn row(&self, chain: usize) -> &[f64] {
        &self.data[chain * self.dim..(chain + 1) * self.dim]
    }

    /// Mutable configuration of chain `chain`.
    ///
    /// # Panics
    ///
    /// Panics if `chain >= n_chains`.
    pub fn row_mut(&mut self, chain: usize) -> &mut [f64] {
        &mut self.data[chain * self.dim..(chain + 1) * self.dim]
    }

    /// Iterates over the configurations in chain order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        // chunks_exact panics on a zero chunk size
        let dim = self.dim.max(1);
        let count = if self.dim == 0 { 0 } else { self.n_chains };
        self.data.chunks_exact(dim).take(count)
    }

    /// Flat row-major view of the buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Per-row select: row `i` becomes `other`'s row wherever `mask[i]` holds.
    ///
    /// Every element is written through an arithmetic blend so the loop has
    /// no data-dependent branch.
    pub fn select_rows(&mut self, mask: &[bool], other: &Batch) -> Result<(), SamplerError> {
        if other.shape() != self.shape() || mask.len() != self.n_chains {
            return Err(SamplerError::Configuration(
                ErrorInfo::new("shape-mismatch", "select operands disagree on shape")
                    .with_context("target", format!("{:?}", self.shape()))
                    .with_context("source", format!("{:?}", other.shape()))
                    .with_context("mask", mask.len().to_string()),
            ));
        }
        if self.dim == 0 {
            return Ok(());
        }
        for ((dst, src), &take) in self
            .data
            .chunks_exact_mut(self.dim)
            .zip(other.data.chunks_exact(self.dim))
            .zip(mask)
        {
            let pick = u64::from(take).wrapping_neg();
            for (d, s) in dst.iter_mut().zip(src) {
                *d = f64::from_bits((s.to_bits() & pick) | (d.to_bits() & !pick));
            }
        }
        Ok(())
    }

    /// SHA-256 over the shape and the bit patterns of every entry.
    pub fn canonical_hash(&self) -> String {
        let mut hasher = Sha256::new();
        self.hash_into(&mut hasher);
        format!("{:x}", hasher.finalize())
    }

    /// Feeds the shape and contents into an existing hasher.
    pub fn hash_into(&self, hasher: &mut Sha256) {
        hasher.update((self.n_chains as u64).to_le_bytes());
        hasher.update((self.dim as u64).to_le_bytes());
        for value in &self.data {
            hasher.update(value.to_bits().to_le_bytes());
        }
    }
}
