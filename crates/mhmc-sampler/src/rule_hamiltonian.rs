use std::sync::Arc;

use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_core::{Batch, LogPsi, RngKey};
use rand::Rng;

use crate::operator::SparseOperator;
use crate::rule::{Proposal, RuleContext, TransitionRule};

/// Hops to a uniformly chosen off-diagonal connection of a sparse operator.
///
/// The number of connections generally differs between a configuration and
/// its targets, so every proposal carries the Hastings correction
/// `ln n(sigma) - ln n(sigma')`.
#[derive(Debug)]
pub struct HamiltonianRule<O> {
    operator: Arc<O>,
}

impl<O> Clone for HamiltonianRule<O> {
    fn clone(&self) -> Self {
        Self {
            operator: Arc::clone(&self.operator),
        }
    }
}

/// Cached operator handle used for row lookups.
#[derive(Debug)]
pub struct HamiltonianState<O> {
    operator: Arc<O>,
}

impl<O> Clone for HamiltonianState<O> {
    fn clone(&self) -> Self {
        Self {
            operator: Arc::clone(&self.operator),
        }
    }
}

impl<O> HamiltonianState<O> {
    /// Operator the rule hops with.
    pub fn operator(&self) -> &O {
        &self.operator
    }
}

impl<O: SparseOperator> HamiltonianRule<O> {
    /// Proposals driven by `operator`.
    pub fn new(operator: O) -> Self {
        Self {
            operator: Arc::new(operator),
        }
    }

    /// Proposals driven by a shared `operator`.
    pub fn from_shared(operator: Arc<O>) -> Self {
        Self { operator }
    }
}

/// Off-diagonal targets of `config` with a nonzero coupling.
fn hops<O: SparseOperator>(operator: &O, config: &[f64]) -> Result<Vec<Vec<f64>>, SamplerError> {
    let connections = operator.connected(config)?;
    let mut targets = Vec::with_capacity(connections.len());
    for connection in connections {
        if connection.config.len() != config.len() {
            return Err(SamplerError::Operator(
                ErrorInfo::new("connection-shape", "connected configuration has the wrong length")
                    .with_context("expected", config.len().to_string())
                    .with_context("actual", connection.config.len().to_string()),
            ));
        }
        if connection.mel.norm_sqr() > 0.0 && connection.config != config {
            targets.push(connection.config);
        }
    }
    Ok(targets)
}

impl<O: SparseOperator> TransitionRule for HamiltonianRule<O> {
    type State = HamiltonianState<O>;

    fn init_state(
        &self,
        ctx: &RuleContext<'_>,
        _machine: &dyn LogPsi,
        _key: RngKey,
    ) -> Result<Self::State, SamplerError> {
        let dim = ctx.hilbert().size();
        if self.operator.size() != dim {
            return Err(SamplerError::RuleConstruction(
                ErrorInfo::new(
                    "operator-size-mismatch",
                    "operator size must match the configuration length",
                )
                .with_context("operator", self.operator.size().to_string())
                .with_context("dim", dim.to_string()),
            ));
        }
        Ok(HamiltonianState {
            operator: Arc::clone(&self.operator),
        })
    }

    fn transition(
        &self,
        _ctx: &RuleContext<'_>,
        _machine: &dyn LogPsi,
        rule_state: &Self::State,
        key: RngKey,
        sigma: &Batch,
    ) -> Result<Proposal, SamplerError> {
        let operator = rule_state.operator();
        let mut rng = key.into_rng();
        let mut proposed = sigma.clone();
        let mut log_correction = vec![0.0; sigma.n_chains()];

        for (chain, correction) in log_correction.iter_mut().enumerate() {
            let source = sigma.row(chain);
            let forward = hops(operator, source)?;
            if forward.is_empty() {
                continue;
            }
            let target = &forward[rng.gen_range(0..forward.len())];
            let backward = hops(operator, target)?.len();
            if backward == 0 {
                return Err(SamplerError::Operator(
                    ErrorInfo::new(
                        "asymmetric-connectivity",
                        "target cannot hop back to its source",
                    )
                    .with_context("chain", chain.to_string())
                    .with_hint("operator must be Hermitian in its sparsity pattern"),
                ));
            }
            *correction = (forward.len() as f64).ln() - (backward as f64).ln();
            proposed.row_mut(chain).copy_from_slice(target);
        }

        Ok(Proposal {
            configs: proposed,
            log_correction: Some(log_correction),
        })
    }
}
