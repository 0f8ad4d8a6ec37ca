#![deny(missing_docs)]

//! Batched Metropolis-Hastings sampler with pluggable transition rules.

/// Log-domain acceptance test and branchless per-chain selects.
pub mod acceptance;
/// YAML configuration schema and defaults.
pub mod config;
/// Sparse operator contract and a bond-hopping operator.
pub mod operator;
/// Transition rule contract and the rule-free base rule.
pub mod rule;
/// Pairwise exchange within a neighbour structure.
pub mod rule_exchange;
/// Operator-driven off-diagonal hopping.
pub mod rule_hamiltonian;
/// Single-site value changes.
pub mod rule_local;
/// Weighted combination of two rules.
pub mod rule_mixture;
/// Session orchestration: init, reset, advance and sample.
pub mod sampler;
/// Per-session chain state.
pub mod state;

pub use config::SamplerConfig;
pub use operator::{BondHopping, Connection, SparseOperator};
pub use rule::{BaseRule, Proposal, RuleContext, TransitionRule};
pub use rule_exchange::{ExchangeRule, ExchangeState};
pub use rule_hamiltonian::{HamiltonianRule, HamiltonianState};
pub use rule_local::LocalRule;
pub use rule_mixture::MixtureRule;
pub use sampler::{MetropolisSampler, Samples};
pub use state::ChainState;
