use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_core::{Batch, LogPsi, RngKey};

use crate::acceptance::{select_values, uniform_draws};
use crate::rule::{Proposal, RuleContext, TransitionRule};

/// Picks, independently for every chain, the move of `first` with probability
/// `p_first` and the move of `second` otherwise.
///
/// Both children propose for the whole batch and the results are merged with
/// a per-chain select. Mixtures nest, so any finite set of weighted rules can
/// be expressed.
#[derive(Debug, Clone)]
pub struct MixtureRule<A, B> {
    first: A,
    second: B,
    p_first: f64,
}

impl<A, B> MixtureRule<A, B> {
    /// Mixture choosing `first` with probability `p_first`.
    pub fn new(first: A, second: B, p_first: f64) -> Self {
        Self {
            first,
            second,
            p_first,
        }
    }

    /// Probability of using the first rule.
    pub fn p_first(&self) -> f64 {
        self.p_first
    }
}

impl<A: TransitionRule, B: TransitionRule> TransitionRule for MixtureRule<A, B> {
    type State = (A::State, B::State);

    fn init_state(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        key: RngKey,
    ) -> Result<Self::State, SamplerError> {
        if !(0.0..=1.0).contains(&self.p_first) {
            return Err(SamplerError::RuleConstruction(
                ErrorInfo::new("invalid-mixture-weight", "mixture weight must lie in [0, 1]")
                    .with_context("p_first", self.p_first.to_string()),
            ));
        }
        let (key_first, key_second) = key.split();
        Ok((
            self.first.init_state(ctx, machine, key_first)?,
            self.second.init_state(ctx, machine, key_second)?,
        ))
    }

    fn reset(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        sigma: &Batch,
        rule_state: &Self::State,
    ) -> Result<Self::State, SamplerError> {
        Ok((
            self.first.reset(ctx, machine, sigma, &rule_state.0)?,
            self.second.reset(ctx, machine, sigma, &rule_state.1)?,
        ))
    }

    fn transition(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        rule_state: &Self::State,
        key: RngKey,
        sigma: &Batch,
    ) -> Result<Proposal, SamplerError> {
        let (key_choice, key_first, key_second) = key.split3();
        let first = self
            .first
            .transition(ctx, machine, &rule_state.0, key_first, sigma)?;
        let second = self
            .second
            .transition(ctx, machine, &rule_state.1, key_second, sigma)?;

        let mask: Vec<bool> = uniform_draws(key_choice, sigma.n_chains())
            .into_iter()
            .map(|u| u < self.p_first)
            .collect();

        let mut configs = second.configs;
        configs.select_rows(&mask, &first.configs)?;

        let log_correction = match (first.log_correction, second.log_correction) {
            (None, None) => None,
            (first_corr, second_corr) => {
                let n = sigma.n_chains();
                let first_corr = first_corr.unwrap_or_else(|| vec![0.0; n]);
                let mut merged = second_corr.unwrap_or_else(|| vec![0.0; n]);
                select_values(&mask, &mut merged, &first_corr);
                Some(merged)
            }
        };

        Ok(Proposal {
            configs,
            log_correction,
        })
    }

    fn random_state(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        rule_state: &Self::State,
        key: RngKey,
    ) -> Result<Batch, SamplerError> {
        self.first.random_state(ctx, machine, &rule_state.0, key)
    }
}
