//! Scoring function contract.
//!
//! A machine maps a batch of configurations and a parameter set to one
//! (possibly complex) log-amplitude per configuration. The sampler only ever
//! looks at the real part.

use num_complex::Complex64;
use thiserror::Error;

use crate::batch::Batch;
use crate::errors::{ErrorInfo, SamplerError};

/// Failure reported by a user supplied scoring function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MachineError {
    message: String,
}

impl MachineError {
    /// Creates a new error with a human readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the scoring function.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MachineError> for SamplerError {
    fn from(err: MachineError) -> Self {
        SamplerError::ScoringFunction(ErrorInfo::new("machine-failed", err.message))
    }
}

/// Scoring function evaluated on whole batches.
pub trait Machine<P: ?Sized> {
    /// Returns `log psi(sigma_i)` for every row of `batch`.
    fn log_psi(&self, params: &P, batch: &Batch) -> Result<Vec<Complex64>, MachineError>;
}

impl<P, F> Machine<P> for F
where
    P: ?Sized,
    F: Fn(&P, &Batch) -> Result<Vec<Complex64>, MachineError>,
{
    fn log_psi(&self, params: &P, batch: &Batch) -> Result<Vec<Complex64>, MachineError> {
        self(params, batch)
    }
}

/// A machine with its parameters bound, as seen by transition rules.
pub trait LogPsi {
    /// Returns `log psi(sigma_i)` for every row of `batch`.
    fn log_psi(&self, batch: &Batch) -> Result<Vec<Complex64>, MachineError>;
}

/// Pairs a [`Machine`] with a borrowed parameter set.
pub struct Bound<'a, M: ?Sized, P: ?Sized> {
    machine: &'a M,
    params: &'a P,
}

impl<'a, M: ?Sized, P: ?Sized> Bound<'a, M, P> {
    /// Binds `params` to `machine`.
    pub fn new(machine: &'a M, params: &'a P) -> Self {
        Self { machine, params }
    }
}

impl<M, P> LogPsi for Bound<'_, M, P>
where
    M: Machine<P> + ?Sized,
    P: ?Sized,
{
    fn log_psi(&self, batch: &Batch) -> Result<Vec<Complex64>, MachineError> {
        self.machine.log_psi(self.params, batch)
    }
}

/// Evaluates `machine_pow * Re(log psi)` and validates the output.
///
/// The output must have one entry per row and no `NaN` in the real part;
/// infinities are passed through for the acceptance test to handle.
pub fn log_prob(
    machine: &dyn LogPsi,
    batch: &Batch,
    machine_pow: f64,
) -> Result<Vec<f64>, SamplerError> {
    let values = machine.log_psi(batch)?;
    if values.len() != batch.n_chains() {
        return Err(SamplerError::ScoringFunction(
            ErrorInfo::new(
                "shape-mismatch",
                "scoring function returned the wrong number of values",
            )
            .with_context("expected", batch.n_chains().to_string())
            .with_context("actual", values.len().to_string()),
        ));
    }
    values
        .iter()
        .enumerate()
        .map(|(chain, value)| {
            if value.re.is_nan() {
                Err(SamplerError::ScoringFunction(
                    ErrorInfo::new("nan-log-amplitude", "scoring function returned NaN")
                        .with_context("chain", chain.to_string()),
                ))
            } else {
                Ok(machine_pow * value.re)
            }
        })
        .collect()
}
