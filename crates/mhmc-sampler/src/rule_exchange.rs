use std::sync::Arc;

use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_core::{Batch, LogPsi, RngKey};
use mhmc_graph::{pairs_within, Graph};
use rand::Rng;

use crate::rule::{Proposal, RuleContext, TransitionRule};

#[derive(Debug, Clone)]
enum Clusters {
    Graph { graph: Graph, d_max: usize },
    Explicit(Vec<(usize, usize)>),
}

/// Swaps the values of one randomly chosen pair of coordinates per chain.
///
/// Eligible pairs are either all node pairs of a graph within `d_max` hops or
/// an explicit list. They are resolved once at `init_state`.
#[derive(Debug, Clone)]
pub struct ExchangeRule {
    clusters: Clusters,
}

/// Precomputed exchange pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeState {
    pairs: Arc<[(usize, usize)]>,
}

impl ExchangeState {
    /// Eligible pairs, smaller index first.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

impl ExchangeRule {
    /// Exchanges between graph nodes at most `d_max` hops apart.
    pub fn from_graph(graph: Graph, d_max: usize) -> Self {
        Self {
            clusters: Clusters::Graph { graph, d_max },
        }
    }

    /// Exchanges restricted to an explicit list of pairs.
    pub fn from_clusters(pairs: Vec<(usize, usize)>) -> Self {
        Self {
            clusters: Clusters::Explicit(pairs),
        }
    }

    fn resolve(&self, dim: usize) -> Result<Vec<(usize, usize)>, SamplerError> {
        let pairs = match &self.clusters {
            Clusters::Graph { graph, d_max } => {
                if graph.n_nodes() != dim {
                    return Err(SamplerError::RuleConstruction(
                        ErrorInfo::new(
                            "graph-size-mismatch",
                            "graph nodes must match the configuration length",
                        )
                        .with_context("n_nodes", graph.n_nodes().to_string())
                        .with_context("dim", dim.to_string()),
                    ));
                }
                let pairs = pairs_within(graph, *d_max);
                if pairs.is_empty() {
                    return Err(SamplerError::RuleConstruction(
                        ErrorInfo::new("no-exchange-pairs", "no node pairs within d_max")
                            .with_context("d_max", d_max.to_string())
                            .with_context("n_nodes", graph.n_nodes().to_string())
                            .with_hint("increase d_max or use a connected graph"),
                    ));
                }
                pairs
            }
            Clusters::Explicit(pairs) => {
                if pairs.is_empty() {
                    return Err(SamplerError::RuleConstruction(ErrorInfo::new(
                        "no-exchange-pairs",
                        "explicit cluster list is empty",
                    )));
                }
                for &(a, b) in pairs {
                    if a >= dim || b >= dim {
                        return Err(SamplerError::RuleConstruction(
                            ErrorInfo::new("cluster-out-of-range", "pair index exceeds dimension")
                                .with_context("pair", format!("({a}, {b})"))
                                .with_context("dim", dim.to_string()),
                        ));
                    }
                    if a == b {
                        return Err(SamplerError::RuleConstruction(
                            ErrorInfo::new("degenerate-cluster", "pair must join two sites")
                                .with_context("site", a.to_string()),
                        ));
                    }
                }
                pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect()
            }
        };
        Ok(pairs)
    }
}

impl TransitionRule for ExchangeRule {
    type State = ExchangeState;

    fn init_state(
        &self,
        ctx: &RuleContext<'_>,
        _machine: &dyn LogPsi,
        _key: RngKey,
    ) -> Result<Self::State, SamplerError> {
        let pairs = self.resolve(ctx.hilbert().size())?;
        log::debug!("exchange rule resolved {} pairs", pairs.len());
        Ok(ExchangeState {
            pairs: pairs.into(),
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
        let pairs = rule_state.pairs();
        if pairs.is_empty() {
            return Err(SamplerError::RuleConstruction(ErrorInfo::new(
                "no-exchange-pairs",
                "exchange state carries no pairs",
            )));
        }
        let mut rng = key.into_rng();
        let mut proposed = sigma.clone();
        for chain in 0..sigma.n_chains() {
            let (a, b) = pairs[rng.gen_range(0..pairs.len())];
            proposed.row_mut(chain).swap(a, b);
        }
        Ok(Proposal::symmetric(proposed))
    }
}
